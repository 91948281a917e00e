//! Batch processing: extraction and counting over a set of files

pub mod processor;
pub mod session;

pub use processor::{Batch, BatchProcessor, FileEvent};
pub use session::Session;
