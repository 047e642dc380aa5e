use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::cli::{ExtractArgs, TextBackend};
use crate::model::{ApplicantRecord, DegreeLevel, EducationEntry, FileOutcome, FileStatus};
use crate::util::{condense_whitespace, file_name_string};

mod education;
mod export;
mod processor;
mod rules;
mod run;
mod text_layer;

pub use rules::FieldExtractor;
pub use run::run;

use education::*;
use export::*;
use processor::*;
use text_layer::*;
