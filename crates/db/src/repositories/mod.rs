//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Plain keyed access goes through
//! [`RecordStore`](crate::store::RecordStore); scoped lookups, listings and
//! cascades are written out here.

pub mod archive_repo;
pub mod page_repo;
pub mod project_repo;
pub mod release_repo;

pub use archive_repo::ArchiveRepo;
pub use page_repo::PageRepo;
pub use project_repo::ProjectRepo;
pub use release_repo::ReleaseRepo;
