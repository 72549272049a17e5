use anyhow::Result;
use clap::Parser;
use s3_image_sizer::app::App;
use s3_image_sizer::models::{Config, Event};
use s3_image_sizer::telemetry;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "s3-image-sizer")]
#[command(about = "Resize and center-crop every image in an S3 folder")]
struct CliArgs {
    /// Bucket holding the images.
    #[arg(long, required_unless_present = "event")]
    bucket: Option<String>,

    /// Folder prefix to process, ending in '/'.
    #[arg(long, required_unless_present = "event")]
    folder: Option<String>,

    /// Target width in pixels.
    #[arg(long, required_unless_present = "event", allow_negative_numbers = true)]
    width: Option<i64>,

    /// Target height in pixels.
    #[arg(long, required_unless_present = "event", allow_negative_numbers = true)]
    height: Option<i64>,

    /// Read the job from a JSON event file instead of flags.
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = ["bucket", "folder", "width", "height"]
    )]
    event: Option<PathBuf>,

    /// Print the job report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

impl CliArgs {
    fn into_event(self) -> s3_image_sizer::Result<Event> {
        match self.event {
            Some(path) => Event::from_json_file(&path),
            None => Ok(Event {
                bucket: self.bucket.unwrap_or_default(),
                folder: self.folder.unwrap_or_default(),
                width: self.width.unwrap_or_default(),
                height: self.height.unwrap_or_default(),
            }),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();

    info!("Starting s3-image-sizer");

    let args = CliArgs::parse();
    let print_json = args.json;
    let event = args.into_event()?;

    let config = Config::from_env()?;
    let app = match App::new(&config).await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    match app.run(event).await {
        Ok(report) => {
            if print_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            if report.has_failures() {
                error!("Job finished with failures: {}", report.message());
                std::process::exit(1);
            }
            info!("Job completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Job failed: {}", e);
            std::process::exit(1);
        }
    }
}
