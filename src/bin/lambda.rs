use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use s3_image_sizer::app::App;
use s3_image_sizer::models::{Config, Event, JobReport};
use s3_image_sizer::telemetry;
use tracing::{error, info};

async fn function_handler(event: LambdaEvent<Event>, app: &App) -> Result<JobReport, Error> {
    let (payload, context) = event.into_parts();
    info!("Handling request {}", context.request_id);

    match app.run(payload).await {
        Ok(report) => Ok(report),
        Err(e) => {
            error!("Job failed: {}", e);
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init_lambda();

    let config = Config::from_env()?;
    let app = App::new(&config).await?;

    run(service_fn(|event| function_handler(event, &app))).await
}
