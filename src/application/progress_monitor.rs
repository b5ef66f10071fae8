use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{stream::BoxStream, StreamExt};
use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    api::{ApiClient, ApiError},
    domain::{AppError, FileReference, JobHandle, MonitorError, Phase, ProgressSnapshot, Quality},
    utils::sanitize_url,
};

const DEFAULT_JOB_ERROR: &str = "Download failed";

/// Signals emitted to the UI collaborator. Rendering is entirely the
/// receiver's concern; the monitor never touches presentation state.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    Started(JobHandle),
    Progress(ProgressSnapshot),
    Completed(FileReference),
    Failed(MonitorError),
    Cancelled,
}

impl MonitorEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MonitorEvent::Completed(_) | MonitorEvent::Failed(_) | MonitorEvent::Cancelled
        )
    }
}

/// Polling policy. Defaults match the deployed service: one poll per second,
/// five not-found responses tolerated while the server registers the job,
/// and a hard stop after five minutes without a terminal state.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    pub grace_window: u32,
    pub max_attempts: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            grace_window: 5,
            max_attempts: 300,
        }
    }
}

/// Tracks one conversion job at a time against the remote status endpoint.
///
/// Polls are serialized: each request must resolve before the next delay
/// starts, so a slow server response delays the next poll instead of
/// overlapping it.
pub struct ProgressMonitor {
    api_client: ApiClient,
    config: MonitorConfig,
    events: UnboundedSender<MonitorEvent>,
    active: Option<ActiveRun>,
}

struct ActiveRun {
    job: JobHandle,
    task: tokio::task::JoinHandle<()>,
    /// Set by whichever side delivers the terminal signal, so a racing
    /// cancel() can never add a second one.
    settled: Arc<AtomicBool>,
}

impl ProgressMonitor {
    pub fn new(
        api_client: ApiClient,
        config: MonitorConfig,
        events: UnboundedSender<MonitorEvent>,
    ) -> Self {
        Self {
            api_client,
            config,
            events,
            active: None,
        }
    }

    /// Validate a YouTube URL and submit it for conversion, returning the
    /// handle to monitor.
    pub async fn submit(&self, url: &str, quality: Quality) -> Result<JobHandle, AppError> {
        let clean = sanitize_url(url).ok_or(AppError::InvalidUrl)?;
        info!("submitting {} at {} kbps", clean, quality.as_str());

        self.api_client
            .submit(&clean, quality)
            .await
            .map_err(|e| AppError::Api(e.to_string()))
    }

    /// Begin tracking a job. Replaces any run already in progress: the old
    /// poll task is aborted before the new one spawns, so two timers never
    /// coexist.
    pub fn start(&mut self, job: JobHandle) {
        if let Some(previous) = self.active.take() {
            previous.task.abort();
            debug!("replaced active monitor for {}", previous.job);
        }

        let mut stream = self.poll_stream(job.clone());
        let events = self.events.clone();
        let settled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&settled);

        let task = tokio::spawn(async move {
            while let Some(event) = stream.next().await {
                if event.is_terminal() {
                    // First to flip the flag owns the terminal signal.
                    if !flag.swap(true, Ordering::SeqCst) {
                        let _ = events.send(event);
                    }
                    break;
                }
                if flag.load(Ordering::SeqCst) || events.send(event).is_err() {
                    break;
                }
            }
        });

        self.active = Some(ActiveRun { job, task, settled });
    }

    /// Stop tracking immediately. Safe to call when nothing is running; a
    /// second call is a no-op, and `Cancelled` is never emitted once a
    /// terminal signal has already gone out.
    pub fn cancel(&mut self) {
        let Some(run) = self.active.take() else {
            return;
        };

        run.task.abort();
        if !run.settled.swap(true, Ordering::SeqCst) {
            info!("cancelled monitor for {}", run.job);
            let _ = self.events.send(MonitorEvent::Cancelled);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .map(|run| !run.task.is_finished())
            .unwrap_or(false)
    }

    pub fn current_job(&self) -> Option<&JobHandle> {
        self.active.as_ref().map(|run| &run.job)
    }

    /// The polling loop as an event stream: `Started`, then one event per
    /// meaningful poll, ending with exactly one terminal event. Transient
    /// trouble (network hiccups, early not-founds) produces no event at all.
    pub fn poll_stream(&self, job: JobHandle) -> BoxStream<'static, MonitorEvent> {
        futures::stream::unfold(
            PollState::Start {
                client: self.api_client.clone(),
                config: self.config.clone(),
                job,
            },
            |state| async move {
                match state {
                    PollState::Start {
                        client,
                        config,
                        job,
                    } => Some((
                        MonitorEvent::Started(job.clone()),
                        PollState::Polling {
                            client,
                            config,
                            job,
                            attempts: 0,
                            last_title: None,
                        },
                    )),
                    PollState::Polling {
                        client,
                        config,
                        job,
                        mut attempts,
                        mut last_title,
                    } => loop {
                        if attempts >= config.max_attempts {
                            warn!("{}: no terminal state after {} polls", job, attempts);
                            return Some((
                                MonitorEvent::Failed(MonitorError::TimedOut),
                                PollState::Finished,
                            ));
                        }

                        tokio::time::sleep(config.poll_interval).await;
                        attempts += 1;

                        match client.status(&job).await {
                            Ok(raw) => {
                                let snapshot = raw.into_snapshot();
                                if !snapshot.title.is_empty() {
                                    last_title = Some(snapshot.title.clone());
                                }

                                if snapshot.phase == Phase::Error {
                                    let message = snapshot
                                        .message
                                        .clone()
                                        .unwrap_or_else(|| DEFAULT_JOB_ERROR.to_string());
                                    warn!("{}: server reported failure: {}", job, message);
                                    return Some((
                                        MonitorEvent::Failed(MonitorError::Job(message)),
                                        PollState::Finished,
                                    ));
                                }

                                if snapshot.is_complete() {
                                    info!("{}: completed after {} polls", job, attempts);
                                    let file =
                                        client.file_reference(&job, last_title.as_deref());
                                    return Some((
                                        MonitorEvent::Completed(file),
                                        PollState::Finished,
                                    ));
                                }

                                return Some((
                                    MonitorEvent::Progress(snapshot),
                                    PollState::Polling {
                                        client,
                                        config,
                                        job,
                                        attempts,
                                        last_title,
                                    },
                                ));
                            }
                            Err(ApiError::NotFound) if attempts > config.grace_window => {
                                warn!("{}: still unknown after {} polls, giving up", job, attempts);
                                return Some((
                                    MonitorEvent::Failed(MonitorError::SessionLost),
                                    PollState::Finished,
                                ));
                            }
                            Err(ApiError::NotFound) => {
                                debug!("{}: not registered yet (poll {})", job, attempts);
                            }
                            Err(e) => {
                                // A flaky connection is not a failed download.
                                debug!("{}: transient poll error: {}", job, e);
                            }
                        }
                    },
                    PollState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        if let Some(run) = self.active.take() {
            run.task.abort();
        }
    }
}

enum PollState {
    Start {
        client: ApiClient,
        config: MonitorConfig,
        job: JobHandle,
    },
    Polling {
        client: ApiClient,
        config: MonitorConfig,
        job: JobHandle,
        attempts: u32,
        last_title: Option<String>,
    },
    Finished,
}
