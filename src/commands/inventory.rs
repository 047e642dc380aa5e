use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::cli::InventoryArgs;
use crate::commands::extract::FieldExtractor;
use crate::model::{InventoryManifest, PdfEntry};
use crate::util::{file_name_string, now_utc_string, sha256_file, write_json_pretty};

/// Result of scanning a directory: PDF candidates plus other regular files that were passed over.
#[derive(Debug, Default)]
pub struct Discovery {
    pub pdfs: Vec<PathBuf>,
    pub non_pdfs: Vec<PathBuf>,
}

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.directory, args.recursive)?;

    if args.dry_run {
        info!(
            pdf_count = manifest.pdf_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    write_json_pretty(&args.manifest_path, &manifest)?;
    info!(path = %args.manifest_path.display(), "wrote inventory manifest");
    info!(pdf_count = manifest.pdf_count, "inventory completed");

    Ok(())
}

pub fn build_manifest(directory: &Path, recursive: bool) -> Result<InventoryManifest> {
    let extractor = FieldExtractor::new()?;
    let discovery = discover_pdfs(directory, recursive)?;

    let mut pdfs = Vec::with_capacity(discovery.pdfs.len());
    for path in discovery.pdfs {
        let filename = file_name_string(&path);
        let serial_number = extractor.serial_number_from_filename(&filename);
        let sha256 = sha256_file(&path)?;

        pdfs.push(PdfEntry {
            filename,
            serial_number,
            sha256,
        });
    }

    Ok(InventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: directory.display().to_string(),
        pdf_count: pdfs.len(),
        pdfs,
    })
}

pub fn ensure_source_directory(directory: &Path) -> Result<()> {
    if directory.as_os_str().is_empty() {
        bail!("no directory path was given");
    }
    if !directory.exists() {
        bail!("directory does not exist: {}", directory.display());
    }
    if !directory.is_dir() {
        bail!("path is not a directory: {}", directory.display());
    }
    Ok(())
}

/// Lists regular files under `directory`, splitting `.pdf` files from the rest. Both lists are
/// sorted by path.
pub fn discover_pdfs(directory: &Path, recursive: bool) -> Result<Discovery> {
    ensure_source_directory(directory)?;

    let files = if recursive {
        walk_files(directory)?
    } else {
        list_files(directory)?
    };

    let mut discovery = Discovery::default();
    for path in files {
        if has_pdf_extension(&path) {
            discovery.pdfs.push(path);
        } else {
            debug!(path = %path.display(), "ignoring non-PDF file");
            discovery.non_pdfs.push(path);
        }
    }

    discovery.pdfs.sort();
    discovery.non_pdfs.sort();
    Ok(discovery)
}

fn list_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let entries = fs::read_dir(directory)
        .with_context(|| format!("failed to read {}", directory.display()))?;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(directory = %directory.display(), error = %error, "skipping unreadable entry");
                continue;
            }
        };

        // Follows symlinks so linked PDFs are picked up.
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }

    Ok(files)
}

fn walk_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(directory).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                let location = error
                    .path()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| directory.display().to_string());
                warn!(path = %location, error = %error, "skipping unreadable entry");
                continue;
            }
        };

        if entry.path().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
