use std::fs::{self, File};
use std::io::Read;
use std::panic::{self, AssertUnwindSafe};
use std::process::Command;

use anyhow::{anyhow, bail};

use super::*;

/// Turns one PDF file into raw text.
pub(super) trait TextExtractor {
    fn name(&self) -> &'static str;

    fn extract_text(&self, pdf_path: &Path) -> Result<String>;
}

pub(super) fn text_extractor_for(backend: TextBackend) -> Box<dyn TextExtractor> {
    match backend {
        TextBackend::PdfExtract => Box::new(PdfExtractBackend),
        TextBackend::Pdftotext => Box::new(PdftotextBackend),
    }
}

#[derive(Debug, Default)]
pub(super) struct PdfExtractBackend;

impl TextExtractor for PdfExtractBackend {
    fn name(&self) -> &'static str {
        TextBackend::PdfExtract.as_str()
    }

    fn extract_text(&self, pdf_path: &Path) -> Result<String> {
        let bytes = fs::read(pdf_path)
            .with_context(|| format!("failed to read {}", pdf_path.display()))?;

        // pdf-extract panics on some malformed fonts and streams.
        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(&bytes)));

        match outcome {
            Ok(Ok(text)) => Ok(normalize_text(&text)),
            Ok(Err(error)) => Err(anyhow!(
                "pdf-extract failed for {}: {}",
                pdf_path.display(),
                error
            )),
            Err(_) => bail!("pdf-extract panicked while reading {}", pdf_path.display()),
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct PdftotextBackend;

impl TextExtractor for PdftotextBackend {
    fn name(&self) -> &'static str {
        TextBackend::Pdftotext.as_str()
    }

    fn extract_text(&self, pdf_path: &Path) -> Result<String> {
        let pages = extract_pages_with_pdftotext(pdf_path)?;
        Ok(normalize_text(&pages.join("\n")))
    }
}

fn extract_pages_with_pdftotext(pdf_path: &Path) -> Result<Vec<String>> {
    let output = Command::new("pdftotext")
        .arg("-layout")
        .arg("-enc")
        .arg("UTF-8")
        .arg(pdf_path)
        .arg("-")
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    Ok(split_pages(&raw))
}

fn split_pages(raw: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    while let Some(last_page) = pages.last() {
        if last_page.trim().is_empty() {
            pages.pop();
            continue;
        }
        break;
    }

    pages
}

pub(super) fn normalize_text(raw: &str) -> String {
    raw.replace('\u{0000}', "")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{00A0}', " ")
}

/// Checks the `%PDF-` signature within the first kilobyte, where readers tolerate leading junk.
pub(super) fn has_pdf_header(pdf_path: &Path) -> Result<bool> {
    let mut file =
        File::open(pdf_path).with_context(|| format!("failed to open {}", pdf_path.display()))?;

    let mut buf = Vec::with_capacity(1024);
    file.by_ref()
        .take(1024)
        .read_to_end(&mut buf)
        .with_context(|| format!("failed to read {}", pdf_path.display()))?;

    Ok(buf.windows(5).any(|window| window == b"%PDF-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_pages_drops_trailing_empty_pages() {
        let pages = split_pages("first\u{000C}second\u{0000}\u{000C}  \n\u{000C}");
        assert_eq!(pages, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn normalize_text_unifies_line_endings() {
        assert_eq!(
            normalize_text("Name of\rInstitution\r\nnext\u{00A0}cell"),
            "Name of\nInstitution\nnext cell"
        );
    }

    #[test]
    fn pdf_extract_backend_rejects_non_pdf_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"this is not a pdf at all").expect("write");

        assert!(PdfExtractBackend.extract_text(&path).is_err());
        assert!(!has_pdf_header(&path).expect("header check"));
    }
}
