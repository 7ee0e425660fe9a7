//! `globalforms` - Intake service for international student request forms
//!
//! This library provides the per-form validation rules, the `SQLite` request
//! store, the upload store, the axum REST API that ties them together, and a
//! reqwest client for talking to a running server.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod logging;
pub mod server;
pub mod storage;
pub mod submission;
pub mod uploads;

pub use client::{FileUpload, PortalClient};
pub use config::Config;
pub use error::{Error, Result};
pub use forms::{FieldErrors, FormKind};
pub use logging::init_logging;
pub use storage::{Storage, StorageStats};
pub use submission::{Attachment, NewSubmission, Submission};
pub use uploads::UploadStore;
