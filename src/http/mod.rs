pub mod client;
pub mod headers;
pub mod normalizer;
pub mod request;
pub mod response;
pub mod types;

// Re-export commonly used types for convenient access
pub use client::Client;
pub use headers::{HeaderInput, HeaderList, HeaderPair};
pub use normalizer::Normalizer;
pub use request::{NormalizedRequest, RequestDescriptor};
pub use response::{ExecutionResult, ResponseBody};
pub use types::{Method, Status};
