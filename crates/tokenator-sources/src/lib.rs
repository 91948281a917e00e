pub mod collection;
pub mod docx;
pub mod extractor;
pub mod pdf;
pub mod text;

pub use collection::{collect_paths, load_inputs};
pub use extractor::{Extractor, ExtractorRegistry};
