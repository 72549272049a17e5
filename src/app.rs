//! Job orchestration: list a folder, size every image in it, upload results.

use crate::image::format::is_supported_key;
use crate::image::{ImageProcessor, ImageService};
use crate::models::{Config, Event, Job, JobReport, ObjectOutcome};
use crate::storage::{ObjectStore, S3ObjectStore};
use crate::{Error, Result};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Runs resize jobs against an object store.
pub struct App {
    store: Box<dyn ObjectStore>,
    image: Box<dyn ImageService>,
    dry_run: bool,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub store: Box<dyn ObjectStore>,
    pub image: Box<dyn ImageService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_services(services: AppServices, dry_run: bool) -> Self {
        Self {
            store: services.store,
            image: services.image,
            dry_run,
        }
    }

    /// Construct an app backed by S3 from `config`.
    pub async fn new(config: &Config) -> Result<Self> {
        let store = Box::new(S3ObjectStore::new(config).await);
        let image = Box::new(ImageProcessor::from_config(config));

        if config.dry_run {
            info!("DRY_RUN enabled, uploads will be skipped");
        }

        Ok(Self::with_services(AppServices { store, image }, config.dry_run))
    }

    /// Run one job. Only an invalid event or a failed/empty listing is an
    /// error; per-object failures are recorded in the returned report.
    pub async fn run(&self, event: Event) -> Result<JobReport> {
        let job = event.validate()?;
        let job_id = Uuid::new_v4();

        info!(
            "[{}] Resizing images in the bucket {:?} for the folder {:?} to the size {}",
            job_id, job.bucket, job.folder, job.target
        );

        let keys = self.store.list_objects(&job.bucket, &job.folder).await?;
        if keys.is_empty() {
            return Err(Error::Listing(format!(
                "Folder path {:?} in bucket {:?} doesn't exist",
                job.folder, job.bucket
            )));
        }

        let mut report = JobReport::new(job_id, &job, self.dry_run);

        for key in keys {
            if !is_supported_key(&key) {
                info!("[{}] File not an image, skip: {}", job_id, key);
                report.record(ObjectOutcome::Skipped {
                    key,
                    reason: "unsupported file extension".to_string(),
                });
                continue;
            }

            info!("[{}] Process image file: {}", job_id, key);
            let output_key = job.output_key(&key);
            if report.has_output_key(&output_key) {
                warn!(
                    "[{}] {} maps to {}, which an earlier file in this job already wrote; it will be overwritten",
                    job_id, key, output_key
                );
            }
            let outcome = match self.process_object(&job, &key, output_key).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("[{}] Failed to process {}: {}", job_id, key, e);
                    ObjectOutcome::failed(&key, &e)
                }
            };
            report.record(outcome);
        }

        if report.has_failures() {
            warn!("[{}] {}", job_id, report.message());
        } else {
            info!("[{}] {}", job_id, report.message());
        }

        Ok(report)
    }

    async fn process_object(
        &self,
        job: &Job,
        key: &str,
        output_key: String,
    ) -> Result<ObjectOutcome> {
        let data = self.store.download(&job.bucket, key).await?;

        let processed = self.image.process_image(&data, job.target).await?;
        info!(
            "-- Sized {}x{} source to {}x{} ({} bytes)",
            processed.source_width,
            processed.source_height,
            processed.width,
            processed.height,
            processed.data.len()
        );

        if self.dry_run {
            info!("-- Dry run, not saving file to: {}", output_key);
        } else {
            let location = self
                .store
                .upload(&job.bucket, &output_key, &processed.data, processed.content_type)
                .await?;
            info!("-- Successfully uploaded to: {}", location);
        }

        Ok(ObjectOutcome::Processed {
            key: key.to_string(),
            output_key,
            width: processed.width,
            height: processed.height,
        })
    }
}
