pub mod client;
pub mod credentials;
pub mod error;
pub mod prompt;

pub use client::{parse_classification, Classification, Classifier};
pub use credentials::resolve_api_key;
pub use error::ClassifyError;
pub use prompt::PromptVariant;
