//! Destination path computation. Pure: no filesystem access.

use std::path::{Component, Path, PathBuf};

/// Compute where the mock for `name` (declared in `source_path`) is written.
///
/// The directory of `source_path` relative to `search_root` is reproduced
/// under `output_root`; the file is `mock_<snake_case name>.go`. A source
/// outside the search root lands directly under `output_root`.
pub fn resolve_destination(
    search_root: &Path,
    output_root: &Path,
    source_path: &Path,
    name: &str,
) -> PathBuf {
    let source_dir = source_path.parent().unwrap_or_else(|| Path::new(""));
    let mut destination = output_root.to_path_buf();
    if let Some(relative) =
        relative_dir(search_root, source_dir).filter(|r| !r.as_os_str().is_empty())
    {
        destination.push(relative);
    }
    destination.push(format!("mock_{}.go", snake_case(name)));
    destination
}

/// `dir` relative to `root`, ignoring `.` components on both sides.
fn relative_dir(root: &Path, dir: &Path) -> Option<PathBuf> {
    let root = normalized(root);
    let dir = normalized(dir);
    dir.strip_prefix(&root).ok().map(Path::to_path_buf)
}

fn normalized(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// `HTTPClient` -> `http_client`, `UserStore` -> `user_store`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
