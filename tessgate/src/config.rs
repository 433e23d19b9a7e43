use serde::Deserialize;
use std::env;
use std::path::PathBuf;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// Default request body ceiling, matching `100kb`.
pub const DEFAULT_UPLOAD_LIMIT: usize = 100 * 1024;

/// Parse a human byte size such as `100kb`, `2mb` or `4096`.
///
/// Units are 1024-based and case-insensitive. A bare number is a byte count.
pub fn parse_byte_size(raw: &str) -> Option<usize> {
    let value = raw.trim().to_lowercase();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f64 = number.parse().ok()?;

    let multiplier: f64 = match unit.trim() {
        "" | "b" => 1.0,
        "kb" => 1024.0,
        "mb" => 1024.0 * 1024.0,
        "gb" => 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };

    Some((number * multiplier).floor() as usize)
}

fn parse_upload_limit() -> usize {
    match env::var("UPLOAD_LIMIT") {
        Ok(val) => parse_byte_size(&val).unwrap_or_else(|| {
            tracing::warn!(
                "Invalid value '{}' for UPLOAD_LIMIT. Using default of {} bytes.",
                val,
                DEFAULT_UPLOAD_LIMIT
            );
            DEFAULT_UPLOAD_LIMIT
        }),
        Err(_) => DEFAULT_UPLOAD_LIMIT,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body size in bytes.
    pub upload_limit: usize,
    /// Directory that receives multipart uploads until they are read back.
    pub upload_dir: PathBuf,
}

/// Settings for the external OCR engine binary.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub binary: String,
    pub default_language: String,
    /// Upper bound on a single engine run. `None` lets the engine run to completion.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    pub timeout_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            default_language: "eng".to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("APP_PORT", 3000),
                upload_limit: parse_upload_limit(),
                upload_dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| env::temp_dir()),
            },
            engine: EngineConfig {
                binary: env::var("TESSERACT_BIN").unwrap_or_else(|_| "tesseract".to_string()),
                default_language: env::var("OCR_DEFAULT_LANGUAGE")
                    .unwrap_or_else(|_| "eng".to_string()),
                timeout_secs: parse_env_opt("ENGINE_TIMEOUT_SECS"),
            },
            fetch: FetchConfig {
                timeout_secs: parse_env_opt("FETCH_TIMEOUT_SECS"),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
