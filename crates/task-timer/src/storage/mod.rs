//! Storage layer for task persistence.

mod atomic;
mod file;
mod traits;

pub use atomic::atomic_write;
pub use file::FileStorage;
pub use traits::Storage;
