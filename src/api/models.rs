use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Phase, ProgressSnapshot};

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

/// Response from the POST /download endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub download_id: String,
    #[serde(default)]
    pub check_progress: String,
    #[serde(default)]
    pub download_url: String,
}

/// Envelope around one progress report
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressResponse {
    pub status: String,
    pub progress: RawProgress,
}

/// Wire form of a progress report. The server is sloppy about types
/// (percent usually arrives as a string), so every field tolerates being
/// missing or malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProgress {
    #[serde(rename = "status", default)]
    pub phase: Phase,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub percent: f32,
    #[serde(default)]
    pub downloaded_bytes: u64,
    #[serde(default)]
    pub total_bytes: u64,
    #[serde(default = "default_speed")]
    pub speed: String,
    #[serde(default = "default_eta")]
    pub eta: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl RawProgress {
    /// Build a fresh snapshot. No field survives from any previous poll.
    pub fn into_snapshot(self) -> ProgressSnapshot {
        ProgressSnapshot {
            phase: self.phase,
            percent: self.percent,
            downloaded_bytes: self.downloaded_bytes,
            total_bytes: self.total_bytes,
            speed: self.speed,
            eta: self.eta,
            title: self.title,
            message: self.message,
        }
    }
}

fn default_speed() -> String {
    "0 B/s".to_string()
}

fn default_eta() -> String {
    "Unknown".to_string()
}

/// Accept percent as a number, a stringified number (with or without a
/// trailing '%'), or anything else, which normalizes to 0.
fn lenient_percent<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let percent = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s
            .trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(percent.max(0.0) as f32)
}

/// Response from the POST /check-url endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CheckUrlResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub info: Option<VideoInfo>,
}

/// Metadata the server extracts before any download starts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub duration_seconds: u64,
    #[serde(default)]
    pub uploader: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub warning: Option<String>,
}

/// One past download, as returned by GET /get-history
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub size_mb: f64,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    pub status: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// One finished MP3 on the server, as returned by GET /list-files
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteFile {
    pub name: String,
    #[serde(default)]
    pub size_mb: f64,
    #[serde(default)]
    pub modified: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileListResponse {
    pub status: String,
    #[serde(default)]
    pub files: Vec<RemoteFile>,
    #[serde(default)]
    pub total_size_mb: f64,
}

/// Minimal `{status, message}` envelope used by several endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RawProgress {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_percent_as_string() {
        let raw = parse(r#"{"status":"downloading","percent":"42.5"}"#);
        assert_eq!(raw.percent, 42.5);
        assert_eq!(raw.phase, Phase::Downloading);
    }

    #[test]
    fn test_percent_with_suffix_and_as_number() {
        assert_eq!(parse(r#"{"status":"downloading","percent":"87%"}"#).percent, 87.0);
        assert_eq!(parse(r#"{"status":"starting","percent":0}"#).percent, 0.0);
        assert_eq!(parse(r#"{"status":"completed","percent":100}"#).percent, 100.0);
    }

    #[test]
    fn test_percent_missing_or_garbage_defaults_to_zero() {
        assert_eq!(parse(r#"{"status":"downloading"}"#).percent, 0.0);
        assert_eq!(parse(r#"{"status":"downloading","percent":"N/A"}"#).percent, 0.0);
        assert_eq!(parse(r#"{"status":"downloading","percent":null}"#).percent, 0.0);
        assert_eq!(parse(r#"{"status":"downloading","percent":"-3"}"#).percent, 0.0);
    }

    #[test]
    fn test_unrecognized_phase_maps_to_unknown() {
        let raw = parse(r#"{"status":"postprocessing","percent":"90"}"#);
        assert_eq!(raw.phase, Phase::Unknown);
    }

    #[test]
    fn test_field_defaults() {
        let raw = parse(r#"{"status":"starting"}"#);
        assert_eq!(raw.speed, "0 B/s");
        assert_eq!(raw.eta, "Unknown");
        assert_eq!(raw.downloaded_bytes, 0);
        assert!(raw.message.is_none());
        assert!(raw.title.is_empty());
    }

    #[test]
    fn test_snapshot_carries_every_field() {
        let raw = parse(
            r#"{"status":"converting","percent":"95.5","downloaded_bytes":900,
                "total_bytes":1000,"speed":"1.2 MB/s","eta":"00:02",
                "title":"Some Song","message":"almost there"}"#,
        );
        let snapshot = raw.into_snapshot();
        assert_eq!(snapshot.phase, Phase::Converting);
        assert_eq!(snapshot.percent, 95.5);
        assert_eq!(snapshot.downloaded_bytes, 900);
        assert_eq!(snapshot.total_bytes, 1000);
        assert_eq!(snapshot.speed, "1.2 MB/s");
        assert_eq!(snapshot.eta, "00:02");
        assert_eq!(snapshot.title, "Some Song");
        assert_eq!(snapshot.message.as_deref(), Some("almost there"));
    }
}
