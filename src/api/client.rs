use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::domain::{FileReference, JobHandle, Quality};
use crate::utils::{get_timestamp, suggested_filename};

use super::models::{
    ApiConfig, CheckUrlResponse, FileListResponse, HistoryEntry, HistoryResponse,
    ProgressResponse, RawProgress, RemoteFile, StatusMessage, SubmitResponse, VideoInfo,
};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    Api(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Download not found or expired")]
    NotFound,
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Pull the server's error message out of a failing response, falling
    /// back to the HTTP status line.
    async fn error_from(response: Response) -> ApiError {
        let status = response.status();
        match response.json::<StatusMessage>().await {
            Ok(body) if !body.message.is_empty() => ApiError::Api(body.message),
            _ => ApiError::Api(format!("Request failed: {}", status)),
        }
    }

    /// Submit a URL for conversion. The server answers with the job id used
    /// for all subsequent progress polls.
    pub async fn submit(&self, url: &str, quality: Quality) -> Result<JobHandle> {
        let response = self
            .http
            .post(self.endpoint("download"))
            .json(&json!({ "url": url, "quality": quality.as_str() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        if body.status != "started" {
            let message = if body.message.is_empty() {
                format!("Unexpected submit status: {}", body.status)
            } else {
                body.message
            };
            return Err(ApiError::Api(message));
        }

        debug!("submitted, job id {}", body.download_id);
        JobHandle::new(body.download_id)
            .map_err(|_| ApiError::InvalidResponse("Server issued an empty download id".to_string()))
    }

    /// One progress poll. A 404 comes back as `ApiError::NotFound` so the
    /// monitor can apply its grace-window policy; transport problems stay
    /// `ApiError::Request`.
    pub async fn status(&self, job: &JobHandle) -> Result<RawProgress> {
        let url = format!(
            "{}?t={}",
            self.endpoint(&format!("progress/{}", job.as_str())),
            get_timestamp()
        );
        let response = self.http.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: ProgressResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        Ok(body.progress)
    }

    /// Locator for the finished MP3. Derived locally; the server serves it
    /// at /download-file/<id> once the conversion is done.
    pub fn file_reference(&self, job: &JobHandle, title: Option<&str>) -> FileReference {
        FileReference {
            job: job.clone(),
            url: self.endpoint(&format!("download-file/{}", job.as_str())),
            suggested_filename: suggested_filename(title.unwrap_or("audio")),
        }
    }

    /// Fetch title, duration and uploader for a URL before committing to a
    /// download.
    pub async fn check_url(&self, url: &str) -> Result<VideoInfo> {
        let response = self
            .http
            .post(self.endpoint("check-url"))
            .json(&json!({ "url": url }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: CheckUrlResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        body.info
            .ok_or_else(|| ApiError::InvalidResponse("Missing video info".to_string()))
    }

    /// Past downloads recorded by the server.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let response = self.http.get(self.endpoint("get-history")).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: HistoryResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        Ok(body.history)
    }

    pub async fn clear_history(&self) -> Result<()> {
        let response = self.http.post(self.endpoint("clear-history")).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }

    /// Finished MP3s still on the server.
    pub async fn list_files(&self) -> Result<Vec<RemoteFile>> {
        let response = self.http.get(self.endpoint("list-files")).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: FileListResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        Ok(body.files)
    }

    pub async fn delete_file(&self, filename: &str) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint("delete-file"))
            .json(&json!({ "filename": filename }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }
}
