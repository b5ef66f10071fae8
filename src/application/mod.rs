pub mod progress_monitor;

pub use progress_monitor::{MonitorConfig, MonitorEvent, ProgressMonitor};
