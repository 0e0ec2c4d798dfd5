pub mod engine;
pub mod error;
pub mod ledger;

pub use engine::{hostname, open_or_clone, PullReport, PushReport, SyncEngine};
pub use error::SyncError;
pub use ledger::{content_hash, DivergenceLedger};
