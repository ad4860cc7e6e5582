/// Error type shared by all handlers and its HTTP mapping
pub mod error_handling;
