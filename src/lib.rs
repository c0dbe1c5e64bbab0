pub mod bridge;
pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod scanner;

pub use error::Error;
