//! Mirage library exports for testing

pub mod core;
pub mod inference;
pub mod shell;

#[cfg(test)]
pub mod test_support;
