use std::path::PathBuf;
use std::process;

use clap::Parser;

use pageshot::{async_api, CaptureConfig, Error, Viewport, DEFAULT_USER_AGENT};

/// Capture a full-page screenshot of a single web page.
#[derive(Parser, Debug)]
#[command(name = "pageshot", version, about)]
struct Args {
    /// Page to render
    #[arg(long, default_value = "https://news.google.com/home")]
    url: String,

    /// Destination for the PNG image; parent directories are created
    #[arg(long, default_value = "ss/screenshot.png")]
    output: PathBuf,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Maximum time to wait for navigation to settle, in milliseconds
    #[arg(long, default_value_t = 30_000)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = CaptureConfig {
        target_url: args.url,
        output_path: args.output,
        viewport: Viewport {
            width: args.width,
            height: args.height,
        },
        timeout_ms: args.timeout_ms,
        user_agent: DEFAULT_USER_AGENT.to_string(),
    };

    println!("Capturing {} ...", config.target_url);

    match async_api::capture(config).await {
        Ok(shot) => {
            println!("Screenshot saved to {}", shot.path.display());
            println!("File size: {} KB", shot.size_bytes / 1024);
        }
        Err(err) => {
            eprintln!("Capture failed: {}", err);
            match &err {
                Error::NavigationTimeout { .. } => {
                    eprintln!("The page took too long to settle; a larger --timeout-ms may help.")
                }
                Error::Network(_) => {
                    eprintln!("The target host could not be reached; check the URL and connectivity.")
                }
                Error::Resource(_) => {
                    eprintln!("The browser could not be started; is Chrome or Chromium installed?")
                }
                Error::Config(_) | Error::Io(_) | Error::Unexpected(_) => {}
            }
            process::exit(1);
        }
    }
}
