//! Typed HTTP client for the release-management API.
//!
//! [`api::ApiClient`] wraps every endpoint; [`upload::UploadQueue`] uploads
//! a batch of page files strictly one after another.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod upload;
