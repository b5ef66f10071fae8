//! Client engine for a YouTube-to-MP3 conversion service.
//!
//! The server does the fetching and transcoding; this crate submits URLs,
//! polls the job's progress endpoint until a terminal state, and emits
//! normalized events for whatever front end sits on top.

pub mod api;
pub mod application;
pub mod domain;
pub mod utils;

pub use api::{ApiClient, ApiConfig};
pub use application::{MonitorConfig, MonitorEvent, ProgressMonitor};
pub use domain::{
    AppError, FileReference, JobHandle, MonitorError, Phase, ProgressSnapshot, Quality,
};
