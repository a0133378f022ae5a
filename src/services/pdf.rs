use anyhow::{Context, Result};
use std::time::Duration;

pub const PDF_MIME_TYPE: &str = "application/pdf";

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(120);

/// Page separator emitted by pdftotext.
const FORM_FEED: char = '\x0C';

/// Accepts `application/pdf`, or a generic octet stream named `*.pdf`.
pub fn is_pdf(content_type: &str, filename: &str) -> bool {
    if content_type == PDF_MIME_TYPE {
        return true;
    }
    content_type == "application/octet-stream"
        && filename
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
}

/// Extracts the text of every page, in page order.
///
/// Blank pages come back as empty strings so that a page's position in the
/// returned vector is always its page number minus one. Extraction is CPU
/// bound and runs on the blocking pool.
pub async fn extract_pages(pdf_bytes: Vec<u8>) -> Result<Vec<String>> {
    let size = pdf_bytes.len();
    tracing::info!("extract_pages: starting extraction ({size} bytes)");

    let handle = tokio::task::spawn_blocking(move || extract_pages_sync(&pdf_bytes));

    let pages = match tokio::time::timeout(EXTRACTION_TIMEOUT, handle).await {
        Ok(join_result) => join_result.context("PDF extraction task panicked")??,
        Err(_) => anyhow::bail!(
            "PDF extraction timed out after {}s",
            EXTRACTION_TIMEOUT.as_secs()
        ),
    };

    tracing::info!("extract_pages: extracted {} pages", pages.len());
    Ok(pages)
}

fn extract_pages_sync(bytes: &[u8]) -> Result<Vec<String>> {
    // pdftotext (poppler) copes better with complex layouts; pdf_extract is
    // the pure-Rust fallback.
    match extract_pdftotext(bytes) {
        Ok(text) if !text.trim().is_empty() => {
            tracing::debug!("PDF extracted via pdftotext ({} chars)", text.len());
            return Ok(split_pages(&text));
        }
        Ok(_) => tracing::warn!("pdftotext returned empty text, falling back to pdf_extract"),
        Err(e) => tracing::warn!("pdftotext failed ({e:#}), falling back to pdf_extract"),
    }

    pdf_extract::extract_text_from_mem_by_pages(bytes).context("Failed to extract text from PDF")
}

fn extract_pdftotext(bytes: &[u8]) -> Result<String> {
    use std::io::Write;
    use std::process::Command;

    let mut tmp = tempfile::NamedTempFile::new().context("Failed to create temp file")?;
    tmp.write_all(bytes)
        .context("Failed to write PDF to temp file")?;
    tmp.flush()?;

    let output = Command::new("pdftotext")
        .arg("-layout")
        .arg(tmp.path())
        .arg("-")
        .output()
        .context("Failed to run pdftotext, is poppler-utils installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("pdftotext exited with {}: {stderr}", output.status);
    }

    String::from_utf8(output.stdout).context("pdftotext output is not valid UTF-8")
}

/// Splits form-feed separated text into pages. pdftotext terminates every
/// page with a form feed, so a trailing empty segment is not a page.
pub fn split_pages(text: &str) -> Vec<String> {
    let mut pages: Vec<String> = text.split(FORM_FEED).map(str::to_string).collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}
