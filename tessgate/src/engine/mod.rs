//! OCR engine module
//!
//! Drives the external Tesseract binary as a subprocess.
//!
//! # Architecture
//!
//! - `PipelineRunner` spawns the binary, streams the image into stdin and
//!   drains stdout/stderr concurrently into an `EngineOutcome`
//! - the mapper functions project an outcome into `VersionInfo`,
//!   `LanguageList` or `ExtractionResult`, or an engine failure carrying stderr
//! - `TesseractEngine` owns the configured binary and builds the argument
//!   lists for each operation
//!
//! # Usage
//!
//! ```rust,ignore
//! let engine = TesseractEngine::new(&config.engine);
//! let result = engine.extract_text(image, Some("eng")).await?;
//! ```

mod mapper;
mod provider;
mod runner;
mod types;

pub use mapper::{
    map_extraction, map_languages, map_version, ExtractionResult, LanguageList, VersionInfo,
};
pub use provider::TesseractEngine;
pub use runner::PipelineRunner;
pub use types::{EngineInvocation, EngineOutcome, RawImage};
