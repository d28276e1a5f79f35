//! Deepmock library exports for testing

pub mod coordinator;
pub mod core;
pub mod generator;
pub mod tui;

#[cfg(test)]
pub mod test_support;
