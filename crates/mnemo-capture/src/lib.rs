pub mod error;
pub mod extract;
pub mod gate;
pub mod transcript;

pub use error::CaptureError;
pub use extract::{extract_exchange, extract_from_file, NormalizedExchange};
pub use gate::worth_classifying;
