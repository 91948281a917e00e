use std::io::{Cursor, Read};

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;
use tokenator_core::{CoreError, InputFile, Result};
use zip::ZipArchive;

use crate::extractor::Extractor;

const DOCUMENT_PART: &str = "word/document.xml";

/// Raw paragraph text of a Word document
///
/// Each paragraph is followed by a blank line. Styling and images are
/// dropped; table cells come out as ordinary paragraphs.
pub struct DocxExtractor;

#[async_trait]
impl Extractor for DocxExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["docx"]
    }

    async fn extract(&self, file: &InputFile) -> Result<String> {
        let name = file.name.clone();
        let bytes = file.bytes.clone();

        tokio::task::spawn_blocking(move || extract_docx_text(&name, bytes))
            .await
            .map_err(|e| CoreError::extraction(&file.name, e))?
    }
}

fn extract_docx_text(name: &str, bytes: Vec<u8>) -> Result<String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| CoreError::extraction(name, e))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| CoreError::extraction(name, format!("{}: {}", DOCUMENT_PART, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| CoreError::extraction(name, e))?;

    paragraph_text(&xml).map_err(|e| CoreError::extraction(name, e))
}

fn paragraph_text(xml: &str) -> std::result::Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;
    // <w:tab/> inside <w:tabs> is a tab stop definition, not content
    let mut in_tab_stops = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:tabs" => in_tab_stops = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:tabs" => in_tab_stops = false,
                b"w:p" => out.push_str("\n\n"),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" if !in_tab_stops => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                b"w:p" => out.push_str("\n\n"),
                _ => {}
            },
            Event::Text(t) if in_text => out.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}
