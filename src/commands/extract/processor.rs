use anyhow::bail;

use crate::commands::inventory::discover_pdfs;
use crate::model::RunCounts;
use crate::util::sha256_file;

use super::*;

#[derive(Debug, Default)]
pub(super) struct ProcessedBatch {
    pub(super) records: Vec<ApplicantRecord>,
    pub(super) outcomes: Vec<FileOutcome>,
    pub(super) pdf_count: usize,
    pub(super) non_pdf_count: usize,
}

impl ProcessedBatch {
    /// PDFs that were found but produced no record.
    pub(super) fn skipped_count(&self) -> usize {
        self.pdf_count - self.records.len()
    }

    pub(super) fn counts(&self) -> RunCounts {
        RunCounts {
            pdf_count: self.pdf_count,
            extracted_count: self.records.len(),
            skipped_count: self.skipped_count(),
            non_pdf_count: self.non_pdf_count,
        }
    }
}

/// Runs every PDF in `directory` through the text backend and the field rules, in path order.
/// Files that cannot be read are skipped with a warning; only a bad directory is an error.
/// Outcomes cover every discovered file, PDF or not, in path order.
pub(super) fn process_directory(
    directory: &Path,
    recursive: bool,
    text_extractor: &dyn TextExtractor,
    fields: &FieldExtractor,
) -> Result<ProcessedBatch> {
    let discovery = discover_pdfs(directory, recursive)?;
    let mut batch = ProcessedBatch {
        pdf_count: discovery.pdfs.len(),
        non_pdf_count: discovery.non_pdfs.len(),
        ..ProcessedBatch::default()
    };

    info!(
        directory = %directory.display(),
        pdf_count = batch.pdf_count,
        backend = text_extractor.name(),
        "processing directory"
    );

    let mut files = discovery
        .pdfs
        .into_iter()
        .map(|path| (path, true))
        .chain(discovery.non_pdfs.into_iter().map(|path| (path, false)))
        .collect::<Vec<(PathBuf, bool)>>();
    files.sort();

    for (path, is_pdf) in &files {
        let filename = file_name_string(path);

        if !is_pdf {
            warn!(path = %path.display(), "skipping non-PDF file");
            batch.outcomes.push(FileOutcome {
                filename,
                sha256: None,
                status: FileStatus::Skipped,
                missing_fields: Vec::new(),
                warning: Some("not a PDF file".to_string()),
            });
            continue;
        }

        info!(path = %path.display(), "reading file");

        let sha256 = sha256_file(path).ok();
        match process_pdf(path, &filename, text_extractor, fields) {
            Ok(record) => {
                let missing_fields = record.missing_fields();
                if !missing_fields.is_empty() {
                    debug!(
                        file = %filename,
                        missing = %missing_fields.join(","),
                        "fields not found"
                    );
                }
                batch.outcomes.push(FileOutcome {
                    filename,
                    sha256,
                    status: FileStatus::Extracted,
                    missing_fields,
                    warning: None,
                });
                batch.records.push(record);
            }
            Err(error) => {
                warn!(file = %filename, error = %format!("{error:#}"), "skipping unreadable file");
                batch.outcomes.push(FileOutcome {
                    filename,
                    sha256,
                    status: FileStatus::Skipped,
                    missing_fields: Vec::new(),
                    warning: Some(format!("{error:#}")),
                });
            }
        }
    }

    Ok(batch)
}

fn process_pdf(
    path: &Path,
    filename: &str,
    text_extractor: &dyn TextExtractor,
    fields: &FieldExtractor,
) -> Result<ApplicantRecord> {
    if !has_pdf_header(path)? {
        bail!("missing %PDF- header in {}", path.display());
    }

    let text = text_extractor.extract_text(path)?;
    Ok(fields.extract(filename, &text))
}
