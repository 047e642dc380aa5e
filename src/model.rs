use serde::{Serialize, Serializer};

/// Column order of the CSV report. Must match the field order of [`ApplicantRecord`].
pub const CSV_HEADERS: [&str; 8] = [
    "filename",
    "name",
    "serial_number",
    "undergraduate_gpa",
    "postgraduate_gpa",
    "institutions",
    "international_publications",
    "national_publications",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicantRecord {
    pub filename: String,
    pub name: Option<String>,
    pub serial_number: Option<String>,
    #[serde(serialize_with = "serialize_gpa")]
    pub undergraduate_gpa: Option<f64>,
    #[serde(serialize_with = "serialize_gpa")]
    pub postgraduate_gpa: Option<f64>,
    pub institutions: String,
    pub international_publications: u32,
    pub national_publications: u32,
}

impl ApplicantRecord {
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name".to_string());
        }
        if self.serial_number.is_none() {
            missing.push("serial_number".to_string());
        }
        if self.undergraduate_gpa.is_none() {
            missing.push("undergraduate_gpa".to_string());
        }
        if self.postgraduate_gpa.is_none() {
            missing.push("postgraduate_gpa".to_string());
        }
        if self.institutions.is_empty() {
            missing.push("institutions".to_string());
        }
        missing
    }
}

fn serialize_gpa<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(gpa) => serializer.serialize_str(&format!("{gpa:.2}")),
        None => serializer.serialize_str(""),
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DegreeLevel {
    Undergraduate,
    Postgraduate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EducationEntry {
    pub level: DegreeLevel,
    pub institution: Option<String>,
    pub gpa: Option<f64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Extracted,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub filename: String,
    pub sha256: Option<String>,
    pub status: FileStatus,
    pub missing_fields: Vec<String>,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunCounts {
    /// `.pdf` files found in the source directory.
    pub pdf_count: usize,
    pub extracted_count: usize,
    /// PDFs that could not be read; `extracted_count + skipped_count == pdf_count`.
    pub skipped_count: usize,
    pub non_pdf_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub report_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub source_directory: String,
    pub output_path: String,
    pub backend: String,
    pub counts: RunCounts,
    pub files: Vec<FileOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PdfEntry {
    pub filename: String,
    pub serial_number: Option<String>,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub pdf_count: usize,
    pub pdfs: Vec<PdfEntry>,
}
