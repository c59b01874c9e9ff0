//! Filesystem adapters.

mod local;

pub use local::LocalFilesystem;
pub(crate) use local::write_atomic;
