use std::time::Duration;

use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::Result;

use super::mapper::{map_extraction, map_languages, map_version};
use super::mapper::{ExtractionResult, LanguageList, VersionInfo};
use super::runner::PipelineRunner;
use super::types::{EngineInvocation, EngineOutcome, RawImage};

/// The Tesseract command line, one short-lived process per call.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    runner: PipelineRunner,
    default_language: String,
}

impl TesseractEngine {
    pub fn new(config: &EngineConfig) -> Self {
        let runner = PipelineRunner::new(config.binary.clone())
            .with_timeout(config.timeout_secs.map(Duration::from_secs));

        Self {
            runner,
            default_language: config.default_language.clone(),
        }
    }

    pub fn binary(&self) -> &str {
        self.runner.program()
    }

    /// Run `--version` once and report whether the engine could be started.
    pub async fn probe(&self) -> bool {
        match self.version().await {
            Ok(info) => {
                info!(version = %info.version, binary = %self.binary(), "OCR engine available");
                true
            }
            Err(e) => {
                warn!(binary = %self.binary(), error = %e, "OCR engine unavailable");
                false
            }
        }
    }

    pub async fn version(&self) -> Result<VersionInfo> {
        let outcome = self
            .invoke(EngineInvocation::without_input(["--version"]))
            .await?;
        map_version(&outcome)
    }

    pub async fn languages(&self) -> Result<LanguageList> {
        let outcome = self
            .invoke(EngineInvocation::without_input(["--list-langs"]))
            .await?;
        map_languages(&outcome)
    }

    /// Recognise `image` read from stdin, writing plain text to stdout.
    ///
    /// `lang` falls back to the configured default when absent or blank.
    pub async fn extract_text(
        &self,
        image: RawImage,
        lang: Option<&str>,
    ) -> Result<ExtractionResult> {
        let lang = lang
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.default_language.as_str());

        let outcome = self
            .invoke(EngineInvocation::new(
                ["stdin", "stdout", "-l", lang, "txt"],
                image,
            ))
            .await?;
        map_extraction(&outcome)
    }

    async fn invoke(&self, invocation: EngineInvocation) -> Result<EngineOutcome> {
        let outcome = self.runner.run(invocation).await?;
        if !outcome.is_success() {
            warn!(
                exit_code = outcome.exit_code,
                stderr = %outcome.stderr_text().trim(),
                "OCR engine exited with failure"
            );
        }
        Ok(outcome)
    }
}
