//! Integration tests for the generic record store and the repositories.
//!
//! Exercises the repository layer against a real database:
//! - Store get/save/update/delete on every table
//! - Parent scoping of releases and pages
//! - Cascade delete counts and effects
//! - Unique constraint violations

use assert_matches::assert_matches;
use chrono::Utc;
use ims_core::listing::ListOrder;
use ims_core::page_image::PageMimeType;
use ims_core::status::{ProjectStatus, ReleaseStatus};
use ims_db::models::archive::ArchiveFields;
use ims_db::models::page::PageFields;
use ims_db::models::project::{Project, ProjectInput};
use ims_db::models::release::{Release, ReleaseFields};
use ims_db::models::CascadeSummary;
use ims_db::repositories::{ArchiveRepo, PageRepo, ProjectRepo, ReleaseRepo};
use ims_db::store::RecordStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_project(slug: &str) -> ProjectInput {
    ProjectInput {
        name: format!("Project {slug}"),
        project_name: slug.to_string(),
        description: String::new(),
        status: ProjectStatus::Ongoing,
    }
}

fn new_release(project_id: i64, chapter: &str, version: i32) -> ReleaseFields {
    ReleaseFields {
        project_id,
        chapter: chapter.to_string(),
        version,
        status: ReleaseStatus::Draft,
        released_on: Utc::now(),
    }
}

fn new_page(release_id: i64, name: &str, contents: &[u8]) -> PageFields {
    PageFields {
        release_id,
        name: name.to_string(),
        mime_type: PageMimeType::Png,
        size: contents.len() as i64,
        width: 1,
        height: 1,
        checksum: ims_core::hashing::sha256_hex(contents),
        contents: contents.to_vec(),
    }
}

async fn seed_release(pool: &PgPool, slug: &str) -> (Project, Release) {
    let project = ProjectRepo::create(pool, &new_project(slug)).await.unwrap();
    let release = ReleaseRepo::create(pool, &new_release(project.id, "1", 1))
        .await
        .unwrap()
        .expect("project exists");
    (project, release)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

// ---------------------------------------------------------------------------
// Record store
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn store_assigns_increasing_ids(pool: PgPool) {
    let first = RecordStore::save(&pool, &new_project("a")).await.unwrap();
    let second = RecordStore::save(&pool, &new_project("b")).await.unwrap();
    assert!(second > first);

    let fetched: Project = RecordStore::get(&pool, first).await.unwrap().unwrap();
    assert_eq!(fetched.project_name, "a");
}

#[sqlx::test(migrations = "./migrations")]
async fn store_reports_missing_ids(pool: PgPool) {
    let missing: Option<Project> = RecordStore::get(&pool, 999_999).await.unwrap();
    assert!(missing.is_none());

    let updated = RecordStore::update(&pool, 999_999, &new_project("x")).await.unwrap();
    assert!(updated.is_none());

    let deleted = RecordStore::delete::<Project, _>(&pool, 999_999).await.unwrap();
    assert!(!deleted);
}

#[sqlx::test(migrations = "./migrations")]
async fn store_update_replaces_all_fields(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("before")).await.unwrap();

    let input = ProjectInput {
        name: "After".into(),
        project_name: "after".into(),
        description: "desc".into(),
        status: ProjectStatus::Published,
    };
    let updated = ProjectRepo::update(&pool, project.id, &input)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.id, project.id);
    assert_eq!(updated.name, "After");
    assert_eq!(updated.project_name, "after");
    assert_eq!(updated.description, "desc");
    assert_eq!(updated.status, ProjectStatus::Published);
    assert_eq!(updated.created_at, project.created_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn store_deletes_one_row(pool: PgPool) {
    let keep = ProjectRepo::create(&pool, &new_project("keep")).await.unwrap();
    let drop = ProjectRepo::create(&pool, &new_project("drop")).await.unwrap();

    assert!(RecordStore::delete::<Project, _>(&pool, drop.id).await.unwrap());
    assert!(ProjectRepo::find_by_id(&pool, drop.id).await.unwrap().is_none());
    assert!(ProjectRepo::find_by_id(&pool, keep.id).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_project_name_or_slug_fails(pool: PgPool) {
    ProjectRepo::create(&pool, &new_project("foo")).await.unwrap();

    let same_slug = ProjectInput {
        name: "Other".into(),
        ..new_project("foo")
    };
    let err = ProjectRepo::create(&pool, &same_slug).await.unwrap_err();
    assert!(is_unique_violation(&err), "got {err:?}");

    let same_name = ProjectInput {
        project_name: "other".into(),
        ..new_project("foo")
    };
    let err = ProjectRepo::create(&pool, &same_name).await.unwrap_err();
    assert!(is_unique_violation(&err), "got {err:?}");
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_release_key_fails(pool: PgPool) {
    let (project, _) = seed_release(&pool, "foo").await;

    let err = ReleaseRepo::create(&pool, &new_release(project.id, "1", 1))
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err));

    let other_version = ReleaseRepo::create(&pool, &new_release(project.id, "1", 2))
        .await
        .unwrap();
    assert!(other_version.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn second_archive_for_release_fails(pool: PgPool) {
    let (project, release) = seed_release(&pool, "foo").await;
    let page = PageRepo::create(&pool, project.id, &new_page(release.id, "001", b"a"))
        .await
        .unwrap()
        .unwrap();

    let fields = ArchiveFields {
        release_id: release.id,
        page_ids: vec![page.id],
        size: 1,
        bundle_size: 3,
        checksum: "abc".into(),
        contents: vec![1, 2, 3],
    };
    ArchiveRepo::create(&pool, project.id, &fields).await.unwrap().unwrap();
    let err = ArchiveRepo::create(&pool, project.id, &fields).await.unwrap_err();
    assert!(is_unique_violation(&err));

    assert!(ArchiveRepo::delete_by_release(&pool, release.id).await.unwrap());
    assert!(ArchiveRepo::create(&pool, project.id, &fields).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Scoping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn child_create_under_missing_parent_returns_none(pool: PgPool) {
    assert!(ReleaseRepo::create(&pool, &new_release(999_999, "1", 1))
        .await
        .unwrap()
        .is_none());

    let (project, release) = seed_release(&pool, "foo").await;
    let other = ProjectRepo::create(&pool, &new_project("bar")).await.unwrap();

    // Right release, wrong project.
    assert!(PageRepo::create(&pool, other.id, &new_page(release.id, "001", b"a"))
        .await
        .unwrap()
        .is_none());
    assert!(PageRepo::create(&pool, project.id, &new_page(release.id, "001", b"a"))
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn scoped_lookups_hide_other_parents(pool: PgPool) {
    let (project_a, release_a) = seed_release(&pool, "a").await;
    let (project_b, release_b) = seed_release(&pool, "b").await;
    let page_b = PageRepo::create(&pool, project_b.id, &new_page(release_b.id, "001", b"b"))
        .await
        .unwrap()
        .unwrap();

    assert!(ReleaseRepo::find_scoped(&pool, project_a.id, release_b.id)
        .await
        .unwrap()
        .is_none());
    assert!(PageRepo::find_scoped(&pool, release_a.id, page_b.id)
        .await
        .unwrap()
        .is_none());
    assert!(!PageRepo::delete(&pool, release_a.id, page_b.id).await.unwrap());
    assert!(ReleaseRepo::delete(&pool, project_a.id, release_b.id)
        .await
        .unwrap()
        .is_none());

    let blobs = PageRepo::find_blobs(&pool, release_a.id, &[page_b.id]).await.unwrap();
    assert!(blobs.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn releases_list_by_release_date(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("foo")).await.unwrap();
    let mut early = new_release(project.id, "1", 1);
    early.released_on = Utc::now() - chrono::Duration::days(2);
    let early = ReleaseRepo::create(&pool, &early).await.unwrap().unwrap();
    let late = ReleaseRepo::create(&pool, &new_release(project.id, "2", 1))
        .await
        .unwrap()
        .unwrap();

    let newest = ReleaseRepo::list_by_project(&pool, project.id, ListOrder::Newest)
        .await
        .unwrap();
    let ids: Vec<_> = newest.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![late.id, early.id]);

    let oldest = ReleaseRepo::list_by_project(&pool, project.id, ListOrder::Oldest)
        .await
        .unwrap();
    let ids: Vec<_> = oldest.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn release_found_by_download_key(pool: PgPool) {
    let (_, release) = seed_release(&pool, "foo-slug").await;

    let found = ReleaseRepo::find_by_key(&pool, "foo-slug", "1", 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, release.id);
    assert!(ReleaseRepo::find_by_key(&pool, "foo-slug", "1", 2)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn page_blob_lookup_by_name(pool: PgPool) {
    let (project, release) = seed_release(&pool, "foo").await;
    PageRepo::create(&pool, project.id, &new_page(release.id, "001", b"stem"))
        .await
        .unwrap();
    PageRepo::create(&pool, project.id, &new_page(release.id, "001.png", b"full"))
        .await
        .unwrap();

    let blob = PageRepo::find_blob_by_name(&pool, release.id, "001", "001.png")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(blob.contents, b"full");

    let blob = PageRepo::find_blob_by_name(&pool, release.id, "001", "001.jpg")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(blob.contents, b"stem");
}

// ---------------------------------------------------------------------------
// Cascades
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn project_delete_cascades_to_everything(pool: PgPool) {
    let (project, release) = seed_release(&pool, "foo").await;
    let second = ReleaseRepo::create(&pool, &new_release(project.id, "2", 1))
        .await
        .unwrap()
        .unwrap();
    let mut page_ids = Vec::new();
    for name in ["001", "002", "003"] {
        let page = PageRepo::create(&pool, project.id, &new_page(release.id, name, b"x"))
            .await
            .unwrap()
            .unwrap();
        page_ids.push(page.id);
    }
    let archive = ArchiveFields {
        release_id: release.id,
        page_ids: page_ids.clone(),
        size: 3,
        bundle_size: 1,
        checksum: "abc".into(),
        contents: vec![0],
    };
    ArchiveRepo::create(&pool, project.id, &archive).await.unwrap().unwrap();

    let summary = ProjectRepo::delete(&pool, project.id).await.unwrap();
    assert_matches!(
        summary,
        Some(CascadeSummary { releases: 2, pages: 3, archives: 1 })
    );

    assert!(ProjectRepo::find_by_id(&pool, project.id).await.unwrap().is_none());
    for id in [release.id, second.id] {
        let gone: Option<Release> = RecordStore::get(&pool, id).await.unwrap();
        assert!(gone.is_none());
    }
    assert!(PageRepo::list_by_release(&pool, release.id).await.unwrap().is_empty());
    assert!(ArchiveRepo::find_by_release(&pool, release.id).await.unwrap().is_none());

    assert!(ProjectRepo::delete(&pool, project.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn release_delete_cascades_to_pages_and_archive(pool: PgPool) {
    let (project, release) = seed_release(&pool, "foo").await;
    let page = PageRepo::create(&pool, project.id, &new_page(release.id, "001", b"x"))
        .await
        .unwrap()
        .unwrap();
    let archive = ArchiveFields {
        release_id: release.id,
        page_ids: vec![page.id],
        size: 1,
        bundle_size: 1,
        checksum: "abc".into(),
        contents: vec![0],
    };
    ArchiveRepo::create(&pool, project.id, &archive).await.unwrap().unwrap();

    let summary = ReleaseRepo::delete(&pool, project.id, release.id).await.unwrap();
    assert_eq!(
        summary,
        Some(CascadeSummary { releases: 1, pages: 1, archives: 1 })
    );

    assert!(PageRepo::find_scoped(&pool, release.id, page.id).await.unwrap().is_none());
    assert!(ArchiveRepo::find_contents(&pool, release.id).await.unwrap().is_none());
    assert!(ProjectRepo::find_by_id(&pool, project.id).await.unwrap().is_some());
}
