use super::*;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(super) enum PublicationScope {
    International,
    National,
}

/// Compiled field rules. Every rule is a pure function of the document text (and filename), so a
/// field that cannot be located just comes back empty.
#[derive(Debug)]
pub struct FieldExtractor {
    name_line: Regex,
    serial_filename: Regex,
    serial_label: Regex,
    international_publications: Regex,
    national_publications: Regex,
    education: EducationParser,
}

impl FieldExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            name_line: Regex::new(
                r"(?im)^[ \t]*(?:(?:applicant(?:'s)?|candidate(?:'s)?|full)[ \t]+)?name[ \t]*:[ \t]*(.*)$",
            )
            .context("failed to compile name regex")?,
            serial_filename: Regex::new(r"(?i)erecruitment-submission-(\d+)\.pdf$")
                .context("failed to compile submission filename regex")?,
            serial_label: Regex::new(
                r"(?im)\b(?:serial[ \t]*(?:no\b\.?|number\b|#)|submission[ \t]*(?:no\b\.?|number\b|#|id\b)|application[ \t]*(?:no\b\.?|number\b|id\b))[ \t]*[:#]?[ \t]*([A-Za-z0-9][A-Za-z0-9-]*)",
            )
            .context("failed to compile serial number regex")?,
            international_publications: publication_regex("International")?,
            national_publications: publication_regex("National")?,
            education: EducationParser::new()?,
        })
    }

    /// Builds the record for one document.
    pub(super) fn extract(&self, filename: &str, text: &str) -> ApplicantRecord {
        let entries = self.education_entries(text);

        ApplicantRecord {
            filename: filename.to_string(),
            name: self.name(text),
            serial_number: self.serial_number(filename, text),
            undergraduate_gpa: average_gpa(&entries, DegreeLevel::Undergraduate),
            postgraduate_gpa: average_gpa(&entries, DegreeLevel::Postgraduate),
            institutions: combined_institutions(&entries),
            international_publications: self
                .publication_count(text, PublicationScope::International),
            national_publications: self.publication_count(text, PublicationScope::National),
        }
    }

    pub(super) fn name(&self, text: &str) -> Option<String> {
        let lines = text.lines().collect::<Vec<&str>>();

        for (index, line) in lines.iter().enumerate() {
            let Some(captures) = self.name_line.captures(line) else {
                continue;
            };

            let inline = captures
                .get(1)
                .map(|value| condense_whitespace(value.as_str()))
                .unwrap_or_default();
            if !inline.is_empty() {
                return Some(inline);
            }

            return lines[index + 1..]
                .iter()
                .map(|next| condense_whitespace(next))
                .find(|next| !next.is_empty());
        }

        None
    }

    pub(super) fn serial_number(&self, filename: &str, text: &str) -> Option<String> {
        self.serial_number_from_filename(filename).or_else(|| {
            self.serial_label
                .captures_iter(text)
                .filter_map(|captures| captures.get(1))
                .map(|value| value.as_str())
                .find(|value| value.chars().any(|character| character.is_ascii_digit()))
                .map(ToOwned::to_owned)
        })
    }

    pub fn serial_number_from_filename(&self, filename: &str) -> Option<String> {
        self.serial_filename
            .captures(filename)
            .and_then(|captures| captures.get(1))
            .map(|value| value.as_str().to_string())
    }

    pub(super) fn publication_count(&self, text: &str, scope: PublicationScope) -> u32 {
        let pattern = match scope {
            PublicationScope::International => &self.international_publications,
            PublicationScope::National => &self.national_publications,
        };

        pattern
            .captures(text)
            .and_then(|captures| captures.get(1))
            .and_then(|value| value.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    }

    pub(super) fn education_entries(&self, text: &str) -> Vec<EducationEntry> {
        self.education.parse_entries(text)
    }
}

fn publication_regex(scope: &str) -> Result<Regex> {
    Regex::new(&format!(
        r"(?i)No\.?\s*of\s*Publications?\s*\(?\s*{scope}\s*\)?\s*:\s*(\d+)"
    ))
    .with_context(|| format!("failed to compile {scope} publication regex"))
}
