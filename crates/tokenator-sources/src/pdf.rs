use std::collections::BTreeMap;

use async_trait::async_trait;
use lopdf::content::Content;
use lopdf::{Document, Encoding, Object, ObjectId};
use tokenator_core::{CoreError, InputFile, Result};
use tracing::debug;

use crate::extractor::Extractor;

/// PDF text, page by page
///
/// Fragments of one page are joined with single spaces and every page ends
/// with a newline. No de-hyphenation or layout reconstruction.
pub struct PdfExtractor;

#[async_trait]
impl Extractor for PdfExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    async fn extract(&self, file: &InputFile) -> Result<String> {
        let name = file.name.clone();
        let bytes = file.bytes.clone();

        tokio::task::spawn_blocking(move || extract_pdf_text(&name, &bytes))
            .await
            .map_err(|e| CoreError::extraction(&file.name, e))?
    }
}

fn extract_pdf_text(name: &str, bytes: &[u8]) -> Result<String> {
    let document = Document::load_mem(bytes).map_err(|e| CoreError::extraction(name, e))?;
    let pages = document.get_pages();
    debug!("Extracting {} pages from {}", pages.len(), name);

    let mut text = String::new();
    // get_pages is keyed by page number, so this walks pages in order
    for (page_number, page_id) in &pages {
        let fragments = page_fragments(&document, *page_id)
            .map_err(|e| CoreError::extraction(name, format!("page {}: {}", page_number, e)))?;

        text.push_str(&fragments.join(" "));
        text.push('\n');
    }

    Ok(text)
}

/// One fragment per `Tj`/`TJ` run, decoded with the font selected by the last `Tf`
fn page_fragments(document: &Document, page_id: ObjectId) -> lopdf::Result<Vec<String>> {
    let encodings = document
        .get_page_fonts(page_id)?
        .into_iter()
        .map(|(name, font)| font.get_font_encoding(document).map(|encoding| (name, encoding)))
        .collect::<lopdf::Result<BTreeMap<Vec<u8>, Encoding>>>()?;
    let content = Content::decode(&document.get_page_content(page_id)?)?;

    let mut fragments = Vec::new();
    let mut current = None;
    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                current = match operation.operands.first() {
                    Some(font) => encodings.get(font.as_name()?),
                    None => None,
                };
            }
            "Tj" | "TJ" => {
                let Some(encoding) = current else {
                    debug!("Skipping text run without a known font");
                    continue;
                };
                let mut run = String::new();
                collect_run(&mut run, encoding, &operation.operands)?;
                let run = run.trim();
                if !run.is_empty() {
                    fragments.push(run.to_string());
                }
            }
            _ => {}
        }
    }

    Ok(fragments)
}

fn collect_run(run: &mut String, encoding: &Encoding, operands: &[Object]) -> lopdf::Result<()> {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => run.push_str(&Document::decode_text(encoding, bytes)?),
            Object::Array(items) => collect_run(run, encoding, items)?,
            // Large negative kerning inside TJ is a word gap
            Object::Integer(offset) if *offset < -100 => run.push(' '),
            Object::Real(offset) if *offset < -100.0 => run.push(' '),
            _ => {}
        }
    }
    Ok(())
}
