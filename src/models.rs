//! Data models and structures
//!
//! Defines the job description received from the trigger, the validated job,
//! the per-object report handed back to the caller, and runtime configuration.

use crate::image::format::output_file_name;
use crate::{Error, Result};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// Exact output size required after resize and crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDimensions {
    pub width: u32,
    pub height: u32,
}

impl TargetDimensions {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Validation(format!(
                "target dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for TargetDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Raw job description as delivered by the trigger.
///
/// Missing fields deserialize to their zero values so that [`Event::validate`]
/// can report them by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub bucket: String,
    pub folder: String,
    pub width: i64,
    pub height: i64,
}

impl Event {
    /// Load an event from a JSON file. A payload whose fields have the wrong
    /// type is a validation failure, like a missing field.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| {
            Error::Validation(format!("malformed event in {}: {}", path.display(), e))
        })
    }

    pub fn validate(&self) -> Result<Job> {
        if self.bucket.is_empty() {
            return Err(Error::Validation(
                "'bucket' has not been set in the event".to_string(),
            ));
        }

        if self.folder.is_empty() {
            return Err(Error::Validation(
                "'folder' has not been set in the event".to_string(),
            ));
        }

        if !self.folder.ends_with('/') {
            return Err(Error::Validation(format!(
                "'folder' '{}' must end with a trailing forward slash (/)",
                self.folder
            )));
        }

        let width = positive_dimension("width", self.width)?;
        let height = positive_dimension("height", self.height)?;

        Ok(Job {
            bucket: self.bucket.clone(),
            folder: self.folder.clone(),
            target: TargetDimensions::new(width, height)?,
        })
    }
}

fn positive_dimension(field: &str, value: i64) -> Result<u32> {
    if value == 0 {
        return Err(Error::Validation(format!(
            "'{}' has not been set in the event",
            field
        )));
    }

    u32::try_from(value).map_err(|_| {
        Error::Validation(format!(
            "'{}' must be a positive integer, got {}",
            field, value
        ))
    })
}

/// A validated job: every field is known to be usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub bucket: String,
    pub folder: String,
    pub target: TargetDimensions,
}

impl Job {
    /// Destination key for a processed object, e.g.
    /// `banners/photo.png` -> `banners/1100x250/photo.jpg`.
    pub fn output_key(&self, source_key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.folder.trim_end_matches('/'),
            self.target,
            output_file_name(source_key)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ObjectOutcome {
    Processed {
        key: String,
        output_key: String,
        width: u32,
        height: u32,
    },
    Skipped {
        key: String,
        reason: String,
    },
    Failed {
        key: String,
        kind: String,
        error: String,
    },
}

impl ObjectOutcome {
    pub fn failed(key: &str, error: &Error) -> Self {
        ObjectOutcome::Failed {
            key: key.to_string(),
            kind: error.kind().to_string(),
            error: error.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            ObjectOutcome::Processed { key, .. }
            | ObjectOutcome::Skipped { key, .. }
            | ObjectOutcome::Failed { key, .. } => key,
        }
    }
}

/// Result of one job run, one outcome per listed object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub job_id: Uuid,
    pub bucket: String,
    pub folder: String,
    pub target: TargetDimensions,
    pub dry_run: bool,
    pub outcomes: Vec<ObjectOutcome>,
}

impl JobReport {
    pub fn new(job_id: Uuid, job: &Job, dry_run: bool) -> Self {
        Self {
            job_id,
            bucket: job.bucket.clone(),
            folder: job.folder.clone(),
            target: job.target,
            dry_run,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: ObjectOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn processed(&self) -> usize {
        self.count(|o| matches!(o, ObjectOutcome::Processed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ObjectOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ObjectOutcome::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn message(&self) -> String {
        format!(
            "Resized {} of {} images in {:?} to {} ({} skipped, {} failed)",
            self.processed(),
            self.outcomes.len(),
            self.folder,
            self.target,
            self.skipped(),
            self.failed()
        )
    }

    /// Whether an earlier object in this job already produced `output_key`.
    pub fn has_output_key(&self, output_key: &str) -> bool {
        self.outcomes.iter().any(|o| {
            matches!(o, ObjectOutcome::Processed { output_key: existing, .. } if existing == output_key)
        })
    }

    fn count(&self, predicate: impl Fn(&ObjectOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(o)).count()
    }
}

// Configuration
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

#[derive(Debug, Clone)]
pub struct Config {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub jpeg_quality: u8,
    pub resize_filter: FilterType,
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: None,
            endpoint_url: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            resize_filter: FilterType::Lanczos3,
            dry_run: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let jpeg_quality = match var("JPEG_QUALITY") {
            Some(raw) => parse_jpeg_quality(&raw)?,
            None => DEFAULT_JPEG_QUALITY,
        };

        let resize_filter = match var("RESIZE_FILTER") {
            Some(raw) => parse_filter(&raw)?,
            None => FilterType::Lanczos3,
        };

        let dry_run = var("DRY_RUN")
            .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            region: var("REGION_NAME").or_else(|| var("AWS_REGION")),
            endpoint_url: var("S3_ENDPOINT_URL"),
            jpeg_quality,
            resize_filter,
            dry_run,
        })
    }
}

fn parse_jpeg_quality(raw: &str) -> Result<u8> {
    match raw.trim().parse::<u8>() {
        Ok(quality) if (1..=100).contains(&quality) => Ok(quality),
        _ => Err(Error::Config(format!(
            "JPEG_QUALITY must be an integer between 1 and 100, got '{}'",
            raw
        ))),
    }
}

fn parse_filter(raw: &str) -> Result<FilterType> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "nearest" => Ok(FilterType::Nearest),
        "triangle" => Ok(FilterType::Triangle),
        "catmullrom" => Ok(FilterType::CatmullRom),
        "gaussian" => Ok(FilterType::Gaussian),
        "lanczos3" => Ok(FilterType::Lanczos3),
        other => Err(Error::Config(format!(
            "Unknown RESIZE_FILTER '{}'. Expected one of: nearest, triangle, catmullrom, gaussian, lanczos3",
            other
        ))),
    }
}
