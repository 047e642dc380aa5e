use crate::model::CSV_HEADERS;
use crate::util::ensure_parent_directory;

use super::*;

/// Writes the header and one row per record, truncating any existing file at `output_path`.
pub(super) fn write_applicant_csv(output_path: &Path, records: &[ApplicantRecord]) -> Result<()> {
    ensure_parent_directory(output_path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output_path)
        .with_context(|| format!("failed to create csv file: {}", output_path.display()))?;

    writer
        .write_record(CSV_HEADERS)
        .with_context(|| format!("failed to write csv header: {}", output_path.display()))?;

    for record in records {
        writer.serialize(record).with_context(|| {
            format!(
                "failed to write csv row for {}: {}",
                record.filename,
                output_path.display()
            )
        })?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to finalize csv file: {}", output_path.display()))?;

    Ok(())
}
