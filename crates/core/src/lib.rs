//! Domain primitives shared by the database, API and client crates.
//!
//! Nothing in here touches the network or the database: status enums,
//! field validation, page payload decoding, checksums and the release
//! archive builder.

pub mod archive;
pub mod download_key;
pub mod error;
pub mod hashing;
pub mod listing;
pub mod naming;
pub mod page_image;
pub mod status;
pub mod types;
