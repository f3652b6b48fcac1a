// Library exports for mailsweep crate
// This allows tests and other crates to use the modules

pub mod classifier;
pub mod config;
pub mod extractor;
pub mod gmail_client;
pub mod processor;
