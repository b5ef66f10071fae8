use clap::Parser;
use tokio::sync::mpsc;

use ytmp3_client::{
    ApiClient, ApiConfig, MonitorConfig, MonitorEvent, ProgressMonitor, Quality,
};

/// Command-line client for a YouTube-to-MP3 conversion server.
#[derive(Parser, Debug)]
#[command(name = "ytmp3", version, about)]
struct Args {
    /// YouTube video, shorts, or playlist URL
    url: String,

    /// Target bitrate in kbps (128, 192 or 320)
    #[arg(short, long, default_value_t = 192, env = "YTMP3_QUALITY")]
    quality: u32,

    /// Base URL of the conversion server
    #[arg(short, long, default_value = "http://127.0.0.1:5000", env = "YTMP3_SERVER")]
    server: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let quality = match Quality::from_kbps(args.quality) {
        Some(quality) => quality,
        None => {
            eprintln!("Unsupported quality: {} kbps (use 128, 192 or 320)", args.quality);
            std::process::exit(2);
        }
    };

    let api_client = ApiClient::new(ApiConfig {
        base_url: args.server,
    });

    match api_client.check_url(&args.url).await {
        Ok(info) => println!("{} ({}) by {}", info.title, info.duration, info.uploader),
        Err(e) => eprintln!("Could not fetch video info: {}", e),
    }

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let mut monitor = ProgressMonitor::new(api_client, MonitorConfig::default(), events_tx);

    let job = match monitor.submit(&args.url, quality).await {
        Ok(job) => job,
        Err(e) => {
            eprintln!("Submit failed: {}", e);
            std::process::exit(1);
        }
    };
    monitor.start(job);

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else { break };
                match event {
                    MonitorEvent::Started(job) => println!("Tracking download {}", job),
                    MonitorEvent::Progress(snapshot) => println!(
                        "{}: {:.1}% at {} (ETA {})",
                        snapshot.phase, snapshot.percent, snapshot.speed, snapshot.eta
                    ),
                    MonitorEvent::Completed(file) => {
                        println!("Done: {} -> {}", file.suggested_filename, file.url);
                        break;
                    }
                    MonitorEvent::Failed(e) => {
                        eprintln!("Failed: {}", e);
                        std::process::exit(1);
                    }
                    MonitorEvent::Cancelled => {
                        println!("Cancelled");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                monitor.cancel();
            }
        }
    }
}
