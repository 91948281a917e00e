use async_trait::async_trait;
use tokenator_core::{InputFile, Result};

use crate::extractor::Extractor;

const BOM: char = '\u{feff}';

/// Plain text and Markdown, decoded as UTF-8
pub struct TextExtractor;

#[async_trait]
impl Extractor for TextExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["txt", "md"]
    }

    async fn extract(&self, file: &InputFile) -> Result<String> {
        let text = String::from_utf8_lossy(&file.bytes);
        Ok(text.strip_prefix(BOM).unwrap_or(&*text).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_utf8() {
        let file = InputFile::new("a.txt", "héllo\r\n  world ");
        let text = TextExtractor.extract(&file).await.unwrap();
        // No whitespace normalization
        assert_eq!(text, "héllo\r\n  world ");
    }

    #[tokio::test]
    async fn test_strips_bom_and_replaces_invalid_bytes() {
        let mut bytes = "\u{feff}ok".as_bytes().to_vec();
        bytes.push(0xff);
        let text = TextExtractor
            .extract(&InputFile::new("a.md", bytes))
            .await
            .unwrap();
        assert_eq!(text, "ok\u{fffd}");
    }
}
