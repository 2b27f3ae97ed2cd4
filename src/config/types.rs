// Configuration types module
// Defines launcher settings, the server value and per-resource configuration

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use hyper::header::{HeaderName, HeaderValue};
use hyper::{HeaderMap, StatusCode};
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Launcher settings, layered from defaults, `origin.toml`, `ORIGIN_*`
/// environment variables and command-line overrides
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Path of the JSON configuration document
    pub config_path: String,
    /// Name of the process whose section of the document is served
    pub process: String,
    /// Address to bind; the port comes from the document
    pub host: String,
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    pub access_log_format: String,
}

/// Where the origin listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Method -> absolute path -> resource configuration, as found in the
/// document's `actions` section
pub type Actions = BTreeMap<String, BTreeMap<String, RawResourceConfig>>;

/// Resource configuration exactly as written in the document.
///
/// Every field is optional here; [`ResourceConfig::from_raw`] applies the
/// defaults and validates.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawResourceConfig {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status_code: Option<u16>,
    #[serde(default)]
    pub headers: HashMap<String, ScalarValue>,
    pub content_length: Option<u64>,
    pub num_chunks: Option<u64>,
    pub chunk_size_bytes: Option<u64>,
    pub chunk_byte_value: Option<u8>,
    #[serde(default, alias = "patterned_chunks", deserialize_with = "de_flag")]
    pub patterned: Option<bool>,
    #[serde(alias = "delay_first_chunk_sec")]
    pub delay_first_chunk: Option<f64>,
    #[serde(alias = "delay_between_chunk_sec")]
    pub delay_between_chunks: Option<f64>,
}

/// Header values may be written as strings, numbers or booleans
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ScalarValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Accepts `true`/`false` or the strings `"true"`/`"false"`
fn de_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Str(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => None,
        Some(Flag::Bool(b)) => Some(b),
        Some(Flag::Str(s)) => Some(s.eq_ignore_ascii_case("true")),
    })
}

/// Which responder serves a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Fixed,
    Chunked,
}

impl ResourceKind {
    fn parse(kind: &str) -> Option<Self> {
        match kind {
            "fixed" | "nonchunkedresponse" => Some(Self::Fixed),
            "chunked" | "chunkedresponse" => Some(Self::Chunked),
            _ => None,
        }
    }
}

/// Validated resource configuration with all defaults applied
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub kind: ResourceKind,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub content_length: u64,
    pub num_chunks: u64,
    pub chunk_size_bytes: u64,
    pub chunk_byte_value: u8,
    pub patterned: bool,
    pub delay_first_chunk: Duration,
    pub delay_between_chunks: Duration,
}

const DEFAULT_CONTENT_LENGTH: u64 = 1000;
const DEFAULT_CHUNK_SIZE: u64 = 1024;
const DEFAULT_CHUNK_BYTE: u8 = 42;

/// Largest fixed body or single chunk a resource may declare (1 GiB).
/// Both are allocated in full, at startup or per chunk.
pub const MAX_BODY_LEN: u64 = 1 << 30;

impl ResourceConfig {
    /// Apply defaults to a raw resource and validate it.
    ///
    /// `method` and `path` are only used to name the resource in errors.
    pub fn from_raw(method: &str, path: &str, raw: &RawResourceConfig) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidResource {
            method: method.to_string(),
            path: path.to_string(),
            reason,
        };

        let kind = match raw.kind.as_deref() {
            None => {
                return Err(ConfigError::MissingType {
                    method: method.to_string(),
                    path: path.to_string(),
                })
            }
            Some(kind) => ResourceKind::parse(kind).ok_or_else(|| ConfigError::UnknownType {
                method: method.to_string(),
                path: path.to_string(),
                kind: kind.to_string(),
            })?,
        };

        let status = StatusCode::from_u16(raw.status_code.unwrap_or(200))
            .map_err(|e| invalid(format!("invalid status_code: {e}")))?;

        let mut headers = HeaderMap::with_capacity(raw.headers.len());
        for (name, value) in &raw.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| invalid(format!("invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(&value.to_string())
                .map_err(|e| invalid(format!("invalid value for header '{name}': {e}")))?;
            headers.insert(name, value);
        }

        let num_chunks = raw.num_chunks.unwrap_or(0);
        let chunk_size_bytes = raw.chunk_size_bytes.unwrap_or(DEFAULT_CHUNK_SIZE);
        if kind == ResourceKind::Chunked && num_chunks > 0 && chunk_size_bytes == 0 {
            return Err(invalid("chunk_size_bytes must be positive".to_string()));
        }
        if kind == ResourceKind::Chunked && num_chunks.checked_mul(chunk_size_bytes).is_none() {
            return Err(invalid("num_chunks * chunk_size_bytes overflows".to_string()));
        }

        if kind == ResourceKind::Chunked && chunk_size_bytes > MAX_BODY_LEN {
            return Err(invalid(format!(
                "chunk_size_bytes {chunk_size_bytes} exceeds the {MAX_BODY_LEN} byte limit"
            )));
        }

        let content_length = raw.content_length.unwrap_or(DEFAULT_CONTENT_LENGTH);
        if kind == ResourceKind::Fixed && content_length > MAX_BODY_LEN {
            return Err(invalid(format!(
                "content_length {content_length} exceeds the {MAX_BODY_LEN} byte limit"
            )));
        }

        Ok(Self {
            kind,
            status,
            headers,
            content_length,
            num_chunks,
            chunk_size_bytes,
            chunk_byte_value: raw.chunk_byte_value.unwrap_or(DEFAULT_CHUNK_BYTE),
            patterned: raw.patterned.unwrap_or(kind == ResourceKind::Fixed),
            delay_first_chunk: parse_delay(raw.delay_first_chunk).map_err(invalid)?,
            delay_between_chunks: parse_delay(raw.delay_between_chunks).map_err(invalid)?,
        })
    }
}

/// Delays are written in (possibly fractional) seconds
fn parse_delay(seconds: Option<f64>) -> Result<Duration, String> {
    let Some(seconds) = seconds else {
        return Ok(Duration::ZERO);
    };
    Duration::try_from_secs_f64(seconds).map_err(|e| format!("invalid delay {seconds}: {e}"))
}
