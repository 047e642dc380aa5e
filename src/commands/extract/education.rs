use std::collections::HashSet;

use super::*;

/// Upper bound on the lines a single education row may span after its level label.
const MAX_ROW_CONTINUATION_LINES: usize = 6;

const TARGET_GPA_SCALE: f64 = 4.0;

/// Subject words that end a walk back from an institution keyword, e.g. "Engineering" in
/// "B.Sc in Civil Engineering Dhaka College".
const SUBJECT_WORDS: &[&str] = &[
    "accounting",
    "agriculture",
    "arts",
    "biology",
    "chemistry",
    "commerce",
    "economics",
    "engineering",
    "english",
    "finance",
    "law",
    "literature",
    "management",
    "marketing",
    "mathematics",
    "medicine",
    "pharmacy",
    "physics",
    "science",
    "sciences",
    "statistics",
];

/// Result-column words that end a walk forward from an institution keyword.
const RESULT_WORDS: &[&str] = &[
    "appeared", "cgpa", "class", "division", "first", "gpa", "passed", "result", "second", "third",
];

/// Lowercase words allowed inside a name after the keyword ("University of Dhaka").
const NAME_CONNECTORS: &[&str] = &["of", "and", "for", "&", "the"];

#[derive(Debug)]
pub(super) struct EducationParser {
    undergraduate_label: Regex,
    postgraduate_label: Regex,
    other_level_label: Regex,
    scored_gpa: Regex,
    bare_gpa: Regex,
    institution_keyword: Regex,
    institution_label: Regex,
    year_token: Regex,
    degree_token: Regex,
    cell_split: Regex,
}

#[derive(Debug)]
struct RowDraft {
    level: Option<DegreeLevel>,
    label_len: usize,
    lines: Vec<String>,
}

impl EducationParser {
    pub(super) fn new() -> Result<Self> {
        Ok(Self {
            postgraduate_label: Regex::new(
                r"(?i)^(?:post[ -]?graduation|post[ -]?graduate|masters?)\b",
            )
            .context("failed to compile postgraduate label regex")?,
            undergraduate_label: Regex::new(
                r"(?i)^(?:graduation|under[ -]?graduation|under[ -]?graduate|bachelors?)\b",
            )
            .context("failed to compile undergraduate label regex")?,
            other_level_label: Regex::new(
                r"(?i)^(?:ssc|hsc|secondary|higher secondary|o[ -]level|a[ -]level|ph\.?\s?d|doctorate|diploma)\b",
            )
            .context("failed to compile other level label regex")?,
            scored_gpa: Regex::new(
                r"(?i)\b(\d{1,2}(?:\.\d+)?)\s*(?:out\s+of|/)\s*(\d{1,3}(?:\.\d+)?)\b",
            )
            .context("failed to compile scored GPA regex")?,
            bare_gpa: Regex::new(r"(?i)\b(?:c?gpa|result)\s*[:=]?\s*(\d+\.\d+)\b")
                .context("failed to compile bare GPA regex")?,
            institution_keyword: Regex::new(
                r"(?i)\b(?:university|college|institute|institution|school|academy|polytechnic)\b",
            )
            .context("failed to compile institution keyword regex")?,
            institution_label: Regex::new(r"(?i)^(?:name\s+of\s+)?institut(?:e|ion)\s*:\s*(.+)$")
                .context("failed to compile institution label regex")?,
            year_token: Regex::new(r"\b(?:19|20)\d{2}\b")
                .context("failed to compile year regex")?,
            degree_token: Regex::new(
                r"(?i)^(?:[bm]\.?\s?(?:sc|a|s|com|eng|tech|phil|ed)\.?|bba|mba|bsc|msc|llb|llm|mbbs|ph\.?d\.?|hons\.?|\(hons\.?\))$",
            )
            .context("failed to compile degree token regex")?,
            cell_split: Regex::new(r"\t+|\s{2,}").context("failed to compile cell split regex")?,
        })
    }

    /// Splits the education table into rows keyed by level and reads each row's GPA and
    /// institution. Rows for levels other than undergraduate/postgraduate are dropped.
    pub(super) fn parse_entries(&self, text: &str) -> Vec<EducationEntry> {
        let mut drafts = Vec::<RowDraft>::new();
        let mut active: Option<RowDraft> = None;

        for line in text.lines() {
            let trimmed = line.trim();

            if let Some((level, label_len)) = self.level_label(trimmed) {
                if let Some(done) = active.take() {
                    drafts.push(done);
                }
                active = Some(RowDraft {
                    level,
                    label_len,
                    lines: vec![trimmed.to_string()],
                });
                continue;
            }

            let Some(row) = active.as_mut() else {
                continue;
            };
            if row.lines.len() > MAX_ROW_CONTINUATION_LINES {
                if let Some(done) = active.take() {
                    drafts.push(done);
                }
                continue;
            }
            if !trimmed.is_empty() {
                row.lines.push(trimmed.to_string());
            }
        }

        if let Some(done) = active.take() {
            drafts.push(done);
        }

        drafts
            .into_iter()
            .filter_map(|draft| {
                let level = draft.level?;
                Some(EducationEntry {
                    level,
                    institution: self.row_institution(&draft),
                    gpa: self.row_gpa(&draft),
                })
            })
            .collect()
    }

    /// Returns the level (None for ignored levels) and the byte length of the label prefix.
    fn level_label(&self, line: &str) -> Option<(Option<DegreeLevel>, usize)> {
        if let Some(found) = self.postgraduate_label.find(line) {
            return Some((Some(DegreeLevel::Postgraduate), found.end()));
        }
        if let Some(found) = self.undergraduate_label.find(line) {
            return Some((Some(DegreeLevel::Undergraduate), found.end()));
        }
        self.other_level_label
            .find(line)
            .map(|found| (None, found.end()))
    }

    fn row_gpa(&self, row: &RowDraft) -> Option<f64> {
        let joined = row.lines.join("\n");
        parse_gpa(&joined, &self.scored_gpa, &self.bare_gpa)
    }

    fn row_institution(&self, row: &RowDraft) -> Option<String> {
        for (index, line) in row.lines.iter().enumerate() {
            let body = if index == 0 {
                line.get(row.label_len..).unwrap_or_default()
            } else {
                line.as_str()
            };

            for cell in self.cell_split.split(body) {
                if !self.institution_keyword.is_match(cell) {
                    continue;
                }
                if self.institution_label.is_match(cell.trim()) {
                    continue;
                }
                let cleaned = self.clean_institution_cell(cell);
                if !cleaned.is_empty() {
                    return Some(cleaned);
                }
            }
        }

        row.lines.iter().find_map(|line| {
            self.institution_label
                .captures(line)
                .and_then(|captures| captures.get(1))
                .map(|value| condense_whitespace(value.as_str()))
                .filter(|value| !value.is_empty())
        })
    }

    fn clean_institution_cell(&self, cell: &str) -> String {
        let without_scores = self.scored_gpa.replace_all(cell, " ");
        let without_bare = self.bare_gpa.replace_all(&without_scores, " ");
        let without_years = self.year_token.replace_all(&without_bare, " ");
        self.institution_phrase(&condense_whitespace(&without_years))
    }

    /// Cuts a cell down to the name around the first institution keyword. Single-space text
    /// layers glue the degree column onto the institution ("B.Sc in CSE University of Dhaka"),
    /// so the walk back stops at degree tokens, subjects, and the word following "in".
    fn institution_phrase(&self, cell: &str) -> String {
        let words = cell
            .split_whitespace()
            .map(|word| word.trim_matches(|character: char| character == ',' || character == '|'))
            .filter(|word| !word.is_empty() && *word != "-")
            .collect::<Vec<&str>>();

        let Some(keyword_index) = words
            .iter()
            .position(|word| self.institution_keyword.is_match(word))
        else {
            return words.join(" ");
        };

        let mut start = keyword_index;
        while start > 0 {
            let candidate = words[start - 1];
            let after_in = start >= 2 && is_subject_preposition(words[start - 2]);
            if !starts_uppercase(candidate)
                || self.degree_token.is_match(candidate)
                || SUBJECT_WORDS.contains(&candidate.to_ascii_lowercase().as_str())
                || after_in
            {
                break;
            }
            start -= 1;
        }

        let mut end = keyword_index + 1;
        while end < words.len() {
            let candidate = words[end];
            if self.degree_token.is_match(candidate)
                || RESULT_WORDS.contains(&candidate.to_ascii_lowercase().as_str())
            {
                break;
            }
            if starts_uppercase(candidate) {
                end += 1;
                continue;
            }
            let joins_next = NAME_CONNECTORS.contains(&candidate.to_ascii_lowercase().as_str())
                && words.get(end + 1).map(|next| starts_uppercase(next)).unwrap_or(false);
            if !joins_next {
                break;
            }
            end += 1;
        }

        words[start..end].join(" ")
    }
}

fn starts_uppercase(word: &str) -> bool {
    word.chars()
        .next()
        .map(|character| character.is_uppercase())
        .unwrap_or(false)
}

fn is_subject_preposition(word: &str) -> bool {
    word.eq_ignore_ascii_case("in") || word.eq_ignore_ascii_case("on")
}

/// Reads the GPA in `text` and rescales it to the 4-point scale. An "x out of y" score wins over
/// an "x/y" one; slash pairs that belong to a date such as `01/05/2014` are ignored.
pub(super) fn parse_gpa(text: &str, scored: &Regex, bare: &Regex) -> Option<f64> {
    let mut slash_score = None;

    for captures in scored.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if is_date_fragment(text, whole.start(), whole.end()) {
            continue;
        }

        let gpa = captures.get(1).and_then(|value| value.as_str().parse::<f64>().ok());
        let scale = captures.get(2).and_then(|value| value.as_str().parse::<f64>().ok());
        let (Some(gpa), Some(scale)) = (gpa, scale) else {
            continue;
        };
        let Some(normalized) = normalize_gpa(gpa, scale) else {
            continue;
        };

        if whole.as_str().contains('/') {
            slash_score.get_or_insert(normalized);
        } else {
            return Some(normalized);
        }
    }

    if slash_score.is_some() {
        return slash_score;
    }

    bare.captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|value| value.as_str().parse::<f64>().ok())
        .filter(|gpa| (0.0..=TARGET_GPA_SCALE).contains(gpa))
}

/// True when the match at `start..end` is glued to another `/<digit>` or `<digit>/` part.
fn is_date_fragment(text: &str, start: usize, end: usize) -> bool {
    let mut after = text[end..].chars();
    let continues = after.next() == Some('/')
        && after
            .next()
            .map(|character| character.is_ascii_digit())
            .unwrap_or(false);

    let mut before = text[..start].chars().rev();
    let follows = before.next() == Some('/')
        && before
            .next()
            .map(|character| character.is_ascii_digit())
            .unwrap_or(false);

    continues || follows
}

pub(super) fn normalize_gpa(gpa: f64, scale: f64) -> Option<f64> {
    if !gpa.is_finite() || !scale.is_finite() || scale <= 0.0 || gpa < 0.0 || gpa > scale {
        return None;
    }

    if scale == TARGET_GPA_SCALE {
        Some(gpa)
    } else {
        Some(gpa / scale * TARGET_GPA_SCALE)
    }
}

/// Arithmetic mean of every GPA found for `level`.
pub(super) fn average_gpa(entries: &[EducationEntry], level: DegreeLevel) -> Option<f64> {
    let values = entries
        .iter()
        .filter(|entry| entry.level == level)
        .filter_map(|entry| entry.gpa)
        .collect::<Vec<f64>>();

    if values.is_empty() {
        return None;
    }

    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Distinct institutions, undergraduate first, each level in document order.
pub(super) fn combined_institutions(entries: &[EducationEntry]) -> String {
    let mut seen = HashSet::<String>::new();
    let mut names = Vec::<String>::new();

    for level in [DegreeLevel::Undergraduate, DegreeLevel::Postgraduate] {
        for entry in entries.iter().filter(|entry| entry.level == level) {
            let Some(institution) = entry.institution.as_ref() else {
                continue;
            };
            if seen.insert(institution.to_ascii_lowercase()) {
                names.push(institution.clone());
            }
        }
    }

    names.join("; ")
}
