pub mod config;
pub mod cursor;
pub mod error;
pub mod merge;
pub mod model;
pub mod store;

pub use config::Settings;
pub use cursor::CursorStore;
pub use error::CoreError;
pub use store::MemoryStore;
