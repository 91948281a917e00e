//! Extractor trait and extension dispatch

use async_trait::async_trait;
use tokenator_core::{CoreError, InputFile, Result};

use crate::docx::DocxExtractor;
use crate::pdf::PdfExtractor;
use crate::text::TextExtractor;

/// Converts one document format into plain text
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Lowercase extensions this extractor accepts
    fn extensions(&self) -> &'static [&'static str];

    /// Extract text from the file's bytes
    async fn extract(&self, file: &InputFile) -> Result<String>;

    fn can_handle(&self, extension: &str) -> bool {
        self.extensions().contains(&extension)
    }
}

/// Dispatches files to extractors by extension
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Box::new(TextExtractor),
                Box::new(PdfExtractor),
                Box::new(DocxExtractor),
            ],
        }
    }

    /// Fails with `UnsupportedFormat` before touching the bytes when no
    /// extractor accepts the extension
    pub async fn extract(&self, file: &InputFile) -> Result<String> {
        let extractor = self.find(file)?;
        extractor.extract(file).await
    }

    pub fn is_supported(&self, file_name: &str) -> bool {
        let probe = InputFile::new(file_name, Vec::new());
        self.find(&probe).is_ok()
    }

    fn find(&self, file: &InputFile) -> Result<&dyn Extractor> {
        let extension = file
            .extension()
            .ok_or_else(|| CoreError::UnsupportedFormat(file.name.clone()))?;

        self.extractors
            .iter()
            .find(|e| e.can_handle(&extension))
            .map(|e| &**e)
            .ok_or(CoreError::UnsupportedFormat(extension))
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatches_text_case_insensitive() {
        let registry = ExtractorRegistry::new();

        let text = registry
            .extract(&InputFile::new("NOTES.MD", "# Title"))
            .await
            .unwrap();
        assert_eq!(text, "# Title");
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let registry = ExtractorRegistry::new();

        let err = registry
            .extract(&InputFile::new("report.xyz", "irrelevant"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedFormat(ext) if ext == "xyz"));

        let err = registry
            .extract(&InputFile::new("Makefile", "all:"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_is_supported() {
        let registry = ExtractorRegistry::new();
        for name in ["a.txt", "a.md", "a.pdf", "a.docx", "A.DOCX"] {
            assert!(registry.is_supported(name), "{name}");
        }
        for name in ["a.doc", "a.xyz", "a", "a.rtf"] {
            assert!(!registry.is_supported(name), "{name}");
        }
    }
}
