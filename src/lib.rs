pub mod config;
pub mod error;
pub mod generator;
pub mod history;
pub mod http;
pub mod identity;
pub mod logger;
pub mod server;
pub mod stats;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use error::{ErrorKind, PostbenchError, Result};
pub use identity::OwnerId;
