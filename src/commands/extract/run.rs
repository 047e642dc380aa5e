use std::io::{self, BufRead, Write};

use anyhow::bail;
use chrono::Utc;

use crate::commands::inventory::ensure_source_directory;
use crate::model::RunReport;
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty};

use super::*;

pub fn run(args: ExtractArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let directory = match args.directory.clone() {
        Some(directory) => directory,
        None => prompt_for_directory()?,
    };
    ensure_source_directory(&directory)?;

    info!(directory = %directory.display(), run_id = %run_id, "starting extraction");

    let fields = FieldExtractor::new()?;
    let text_extractor = text_extractor_for(args.backend);
    let batch = process_directory(&directory, args.recursive, text_extractor.as_ref(), &fields)?;

    write_applicant_csv(&args.output, &batch.records)?;
    info!(
        path = %args.output.display(),
        rows = batch.records.len(),
        skipped = batch.skipped_count(),
        non_pdf = batch.non_pdf_count,
        "wrote applicant csv"
    );

    if let Some(report_path) = &args.report_path {
        let report = RunReport {
            report_version: 1,
            run_id,
            started_at,
            finished_at: now_utc_string(),
            source_directory: directory.display().to_string(),
            output_path: args.output.display().to_string(),
            backend: args.backend.as_str().to_string(),
            counts: batch.counts(),
            files: batch.outcomes,
        };
        write_json_pretty(report_path, &report)?;
        info!(path = %report_path.display(), "wrote run report");
    }

    Ok(())
}

fn prompt_for_directory() -> Result<PathBuf> {
    let stdin = io::stdin();
    let mut stderr = io::stderr();
    read_directory_answer(&mut stdin.lock(), &mut stderr)
}

fn read_directory_answer(input: &mut impl BufRead, prompt: &mut impl Write) -> Result<PathBuf> {
    write!(prompt, "Enter the path to the folder containing PDF files: ")
        .context("failed to write directory prompt")?;
    prompt.flush().context("failed to flush directory prompt")?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read directory path from stdin")?;

    let trimmed = answer
        .trim()
        .trim_matches(|character: char| character == '"' || character == '\'');
    if trimmed.is_empty() {
        bail!("no directory path was given");
    }

    Ok(PathBuf::from(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_directory_answer_trims_quotes_and_newline() {
        let mut input = io::Cursor::new(b"  \"/data/cvs\"  \n".to_vec());
        let mut prompt = Vec::new();

        let path = read_directory_answer(&mut input, &mut prompt).expect("answer");
        assert_eq!(path, PathBuf::from("/data/cvs"));
        assert!(String::from_utf8_lossy(&prompt).contains("folder containing PDF files"));
    }

    #[test]
    fn read_directory_answer_rejects_blank_input() {
        let mut input = io::Cursor::new(b"\n".to_vec());
        let mut prompt = Vec::new();

        assert!(read_directory_answer(&mut input, &mut prompt).is_err());
    }
}
