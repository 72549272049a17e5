//! Batch resizer for images stored in S3
//!
//! Lists the images directly under a bucket folder, resizes and center-crops
//! each one to exact target dimensions, and uploads the JPEG result to a
//! `<folder>/<width>x<height>/` sub-folder.

pub mod app;
pub mod error;
pub mod image;
pub mod models;
pub mod storage;
pub mod telemetry;

pub use error::{Error, Result};
