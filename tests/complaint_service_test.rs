//! Complaint service tests: visibility and admin-only actions.

mod common;

use std::sync::Arc;

use chrono::Utc;
use mockall::predicate::eq;
use uuid::Uuid;

use common::{actor, MockRepos};
use posyandu_api::domain::{
    Complaint, ComplaintCategory, ComplaintQuery, ComplaintStatus, NewComplaint,
    Priority, UserRole,
};
use posyandu_api::errors::AppError;
use posyandu_api::infra::storage::MockFileStorage;
use posyandu_api::services::{ComplaintManager, ComplaintService, ImageUpload};
use posyandu_api::types::PaginationParams;

fn complaint(id: i64, owner: Uuid) -> Complaint {
    Complaint {
        id,
        user_id: owner,
        kategori: ComplaintCategory::Error,
        prioritas: Priority::Sedang,
        judul: "Tombol simpan tidak bekerja".into(),
        deskripsi: "Tidak terjadi apa-apa setelah menekan simpan".into(),
        langkah_reproduksi: None,
        browser_info: None,
        status: ComplaintStatus::Pending,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn service(repos: MockRepos, storage: MockFileStorage) -> ComplaintManager<common::TestUnitOfWork> {
    ComplaintManager::new(repos.into_uow(), Arc::new(storage))
}

#[tokio::test]
async fn test_kader_list_is_scoped_to_own_tickets() {
    let kader = actor(UserRole::Kader);
    let kader_id = kader.id;

    let mut repos = MockRepos::default();
    repos
        .complaints
        .expect_list()
        .withf(move |query, _| query.owner == Some(kader_id))
        .times(1)
        .returning(|_, _| Ok((Vec::new(), 0)));

    let page = service(repos, MockFileStorage::new())
        .list(&kader, ComplaintQuery::default(), PaginationParams::new(None, None, 10))
        .await
        .expect("list succeeds");

    assert_eq!(page.meta.total, 0);
}

#[tokio::test]
async fn test_admin_list_is_unscoped() {
    let admin = actor(UserRole::Admin);

    let mut repos = MockRepos::default();
    repos
        .complaints
        .expect_list()
        .withf(|query, _| query.owner.is_none())
        .times(1)
        .returning(|_, _| Ok((Vec::new(), 0)));

    let result = service(repos, MockFileStorage::new())
        .list(&admin, ComplaintQuery::default(), PaginationParams::new(None, None, 10))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_kader_cannot_delete_another_users_ticket() {
    let kader = actor(UserRole::Kader);
    let stranger = Uuid::new_v4();

    let mut repos = MockRepos::default();
    repos
        .complaints
        .expect_find_by_id()
        .with(eq(7))
        .returning(move |id| Ok(Some(complaint(id, stranger))));
    repos.complaints.expect_soft_delete().times(0);

    let result = service(repos, MockFileStorage::new()).delete(&kader, 7).await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_owner_soft_deletes_own_ticket() {
    let kader = actor(UserRole::Kader);
    let kader_id = kader.id;

    let mut repos = MockRepos::default();
    repos
        .complaints
        .expect_find_by_id()
        .returning(move |id| Ok(Some(complaint(id, kader_id))));
    repos
        .complaints
        .expect_soft_delete()
        .with(eq(7))
        .times(1)
        .returning(|_| Ok(()));

    let result = service(repos, MockFileStorage::new()).delete(&kader, 7).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_status_change_is_admin_only() {
    let kader = actor(UserRole::Kader);

    let mut repos = MockRepos::default();
    repos.complaints.expect_update_status().times(0);

    let result = service(repos, MockFileStorage::new())
        .update_status(&kader, 1, ComplaintStatus::Resolved)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_stats_fold_counts_for_admin() {
    let admin = actor(UserRole::Admin);

    let mut repos = MockRepos::default();
    repos.complaints.expect_count_by_status().returning(|| {
        Ok(vec![
            (ComplaintStatus::Pending, 3),
            (ComplaintStatus::Resolved, 2),
        ])
    });

    let stats = service(repos, MockFileStorage::new())
        .stats(&admin)
        .await
        .expect("stats");

    assert_eq!(stats.pending, 3);
    assert_eq!(stats.resolved, 2);
    assert_eq!(stats.in_progress, 0);
    assert_eq!(stats.total, 5);
}

#[tokio::test]
async fn test_failed_insert_discards_stored_images() {
    let kader = actor(UserRole::Kader);

    let mut storage = MockFileStorage::new();
    storage
        .expect_put()
        .times(1)
        .returning(|dir, ext, _| Ok(format!("{dir}/shot.{ext}")));
    storage
        .expect_remove()
        .withf(|path: &str| path.ends_with("shot.png"))
        .times(1)
        .returning(|_| Ok(()));

    let mut repos = MockRepos::default();
    repos
        .complaints
        .expect_create()
        .times(1)
        .returning(|_, _, _| Err(AppError::internal("insert failed")));

    let result = service(repos, storage)
        .create(
            &kader,
            NewComplaint {
                kategori: ComplaintCategory::Tampilan,
                prioritas: Priority::Rendah,
                judul: "Teks terpotong".into(),
                deskripsi: "Nama panjang terpotong di tabel peserta".into(),
                langkah_reproduksi: None,
                browser_info: Some("Firefox".into()),
            },
            vec![ImageUpload {
                content_type: Some("image/png".into()),
                bytes: vec![0; 16],
            }],
        )
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
}
