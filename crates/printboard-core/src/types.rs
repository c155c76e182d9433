//! Core types for Printboard

use serde::{Deserialize, Serialize};

/// Sentinel for a probe whose capability is missing entirely.
pub const UNSUPPORTED: &str = "unsupported";
/// Sentinel for a value the platform refused to disclose.
pub const UNKNOWN: &str = "unknown";
pub const CANVAS_NOT_SUPPORTED: &str = "canvas-not-supported";
pub const AUDIO_NOT_SUPPORTED: &str = "audio-not-supported";

/// Raw environment measurements. Recomputed on every collection and never
/// stored; only the `Details` projection leaves the client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSet {
    pub user_agent: String,
    pub language: String,
    pub platform: String,
    pub screen_width: String,
    pub screen_height: String,
    pub color_depth: String,
    pub timezone: String,
    pub touch_support: bool,
    pub cookies_enabled: bool,
    /// Raw canvas output (a data URL) or `CANVAS_NOT_SUPPORTED`.
    pub canvas: String,
    pub webgl_vendor: String,
    pub webgl_renderer: String,
    /// Raw audio output (comma-joined frequency bins) or `AUDIO_NOT_SUPPORTED`.
    pub audio: String,
    pub fonts: Vec<String>,
}

impl SignalSet {
    pub fn screen_size(&self) -> String {
        format!("{}x{}", self.screen_width, self.screen_height)
    }

    pub fn color_depth_label(&self) -> String {
        format!("{}-bit", self.color_depth)
    }
}

/// Fixed projection of a signal set shown to other viewers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    pub browser: String,
    pub os: String,
    pub screen_size: String,
    pub color_depth: String,
    pub timezone: String,
    pub language: String,
    pub canvas_hash: String,
    pub webgl_vendor: String,
    pub webgl_renderer: String,
    pub audio_hash: String,
}

/// The derived identity record. Only `timestamp` changes after derivation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub id: String,
    pub moniker: String,
    pub emoji: String,
    /// Milliseconds since the Unix epoch of the last registration.
    #[serde(default)]
    pub timestamp: i64,
    pub details: Details,
}

impl Fingerprint {
    /// Rewrite the id to the lowercase hyphenated UUID form, so every
    /// spelling of one UUID maps to the same registry key. Anything that is
    /// not a UUID is rejected before it reaches a backend.
    pub fn normalized(mut self) -> Result<Self, String> {
        let id = uuid::Uuid::parse_str(&self.id)
            .map_err(|e| format!("id {:?} is not a UUID: {}", self.id, e))?;
        self.id = id.hyphenated().to_string();
        Ok(self)
    }

    /// First 8 characters of the id followed by an ellipsis.
    pub fn short_id(&self) -> String {
        let head: String = self.id.chars().take(8).collect();
        format!("{}...", head)
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Which registry backend is serving requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    #[serde(rename = "database")]
    Durable,
    #[serde(rename = "memory")]
    InMemory,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Durable => "database",
            BackendKind::InMemory => "memory",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bind mode for the server
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    Loopback,
    #[default]
    Lan,
}

impl BindMode {
    pub fn to_addr(&self) -> &str {
        match self {
            BindMode::Loopback => "127.0.0.1",
            BindMode::Lan => "0.0.0.0",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "loopback" | "localhost" | "127.0.0.1" => BindMode::Loopback,
            _ => BindMode::Lan,
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Render an epoch-millisecond timestamp as an RFC 3339 string with
/// millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn iso_timestamp(millis: i64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
        .unwrap_or_else(|| millis.to_string())
}
