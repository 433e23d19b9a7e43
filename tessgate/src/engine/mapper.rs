use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{Result, TessgateError};

use super::types::EngineOutcome;

static RE_VERSION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^tesseract\s+(.*)$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageList {
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub text: String,
}

/// Non-zero exits never yield a payload: stderr becomes the failure message.
fn authoritative_stdout(outcome: &EngineOutcome) -> Result<String> {
    if outcome.is_success() {
        Ok(outcome.stdout_text().into_owned())
    } else {
        Err(TessgateError::EngineFailure(
            outcome.stderr_text().into_owned(),
        ))
    }
}

/// Project `--version` output: first line is `tesseract <version>`, the rest
/// are build options (library versions, SIMD support, ...).
pub fn map_version(outcome: &EngineOutcome) -> Result<VersionInfo> {
    let stdout = authoritative_stdout(outcome)?;
    let mut lines = stdout.trim().lines();

    let version = lines
        .next()
        .map(|first| RE_VERSION_LINE.replace(first.trim(), "$1").into_owned())
        .unwrap_or_default();

    let options = lines
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    Ok(VersionInfo { version, options })
}

/// Project `--list-langs` output, skipping the header line the engine prints first.
pub fn map_languages(outcome: &EngineOutcome) -> Result<LanguageList> {
    let stdout = authoritative_stdout(outcome)?;

    let languages = stdout
        .trim()
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    Ok(LanguageList { languages })
}

pub fn map_extraction(outcome: &EngineOutcome) -> Result<ExtractionResult> {
    let stdout = authoritative_stdout(outcome)?;
    Ok(ExtractionResult {
        text: stdout.trim().to_string(),
    })
}
