use serde::{Deserialize, Serialize};

use super::error::AppError;

/// Server-issued identifier for one in-progress conversion. Opaque to the
/// client; the only guarantee is that it is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Result<Self, AppError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AppError::EmptyJobHandle);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Conversion phases reported by the status endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Queued,
    Starting,
    Downloading,
    Converting,
    Completed,
    Error,
    /// Anything the server sends that we don't recognize.
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Queued => "queued",
            Phase::Starting => "starting",
            Phase::Downloading => "downloading",
            Phase::Converting => "converting",
            Phase::Completed => "completed",
            Phase::Error => "error",
            Phase::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Point-in-time status of a job, rebuilt from scratch on every poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub phase: Phase,
    /// 0-100. The server usually sends this as a string; malformed or
    /// missing values normalize to 0.
    pub percent: f32,
    pub downloaded_bytes: u64,
    pub total_bytes: u64,
    pub speed: String,
    pub eta: String,
    pub title: String,
    pub message: Option<String>,
}

impl ProgressSnapshot {
    /// True once the server reports the job done, or the percent crosses
    /// 100 while the phase string lags behind.
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Completed || self.percent >= 100.0
    }
}

/// Locator for a finished MP3, derived from the job handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReference {
    pub job: JobHandle,
    pub url: String,
    pub suggested_filename: String,
}

/// Target bitrates the service accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Quality {
    Kbps128,
    #[default]
    Kbps192,
    Kbps320,
}

impl Quality {
    pub fn from_kbps(kbps: u32) -> Option<Self> {
        match kbps {
            128 => Some(Quality::Kbps128),
            192 => Some(Quality::Kbps192),
            320 => Some(Quality::Kbps320),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Kbps128 => "128",
            Quality::Kbps192 => "192",
            Quality::Kbps320 => "320",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_handle_rejects_empty() {
        assert!(JobHandle::new("").is_err());
        assert!(JobHandle::new("   ").is_err());
        assert_eq!(JobHandle::new("abc123").unwrap().as_str(), "abc123");
    }

    #[test]
    fn test_quality_mapping() {
        assert_eq!(Quality::from_kbps(192), Some(Quality::Kbps192));
        assert_eq!(Quality::from_kbps(64), None);
        assert_eq!(Quality::Kbps320.as_str(), "320");
    }

    #[test]
    fn test_percent_over_100_counts_as_complete() {
        let snapshot = ProgressSnapshot {
            phase: Phase::Converting,
            percent: 100.0,
            downloaded_bytes: 0,
            total_bytes: 0,
            speed: "0 B/s".to_string(),
            eta: "Unknown".to_string(),
            title: String::new(),
            message: None,
        };
        assert!(snapshot.is_complete());
    }
}
