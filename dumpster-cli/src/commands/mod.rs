//! CLI command implementations

pub mod status;
pub mod sync;

pub use status::StatusArgs;
pub use sync::SyncArgs;
