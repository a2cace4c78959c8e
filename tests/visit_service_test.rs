//! Visit service tests: the examination table follows the participant's
//! kategori, and updates never write the participant row.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

use common::rows::{
    inserted_tables, joined, kunjungan_balita_row, kunjungan_row, no_rows, peserta_row,
    statement_log, test_cipher, updated_tables,
};
use common::{actor, MockRepos};
use posyandu_api::domain::{
    Kategori, Lokasi, NewVisit, UserRole, VisitDetail, VisitDetailFields, VisitPatch,
};
use posyandu_api::errors::AppError;
use posyandu_api::infra::Persistence;
use posyandu_api::services::{VisitManager, VisitService};

fn manager(conn: &Arc<DatabaseConnection>) -> VisitManager<Persistence> {
    VisitManager::new(Arc::new(Persistence::new(conn.clone(), test_cipher())))
}

fn new_visit(peserta_id: i64) -> NewVisit {
    NewVisit {
        peserta_id,
        tanggal_kunjungan: NaiveDate::from_ymd_opt(2026, 5, 2).expect("valid date"),
        berat_badan: Some(9.4),
        rujuk: false,
        lokasi: Lokasi::Posyandu,
        created_by: None,
    }
}

fn balita_fields() -> VisitDetailFields {
    VisitDetailFields {
        umur_bulan: Some(14),
        kolesterol: Some(190.0),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_picks_detail_table_from_participant_kategori() {
    let conn = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![peserta_row(3, Kategori::Balita)]])
            .append_query_results([vec![kunjungan_row(11, 3, 9.4)]])
            .append_query_results([vec![kunjungan_balita_row(11, 14)]])
            .into_connection(),
    );
    let visits = manager(&conn);
    let kader = actor(UserRole::Kader);

    let created = visits
        .create(&kader, new_visit(3), balita_fields())
        .await
        .expect("create visit");

    assert_eq!(created.visit.id, 11);
    assert_eq!(created.peserta.kategori, Kategori::Balita);
    match created.detail {
        Some(VisitDetail::Balita(exam)) => assert_eq!(exam.umur_bulan, Some(14)),
        other => panic!("expected balita detail, got {other:?}"),
    }
    drop(visits);

    let log = statement_log(conn);
    let txn = log.last().expect("transaction logged");
    assert_eq!(txn.last().map(String::as_str), Some("COMMIT"));
    assert_eq!(inserted_tables(txn), vec!["kunjungan", "kunjungan_balita"]);
    assert!(updated_tables(txn).is_empty());
}

#[tokio::test]
async fn test_create_for_unknown_participant_is_a_field_error() {
    let conn = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([no_rows()])
            .into_connection(),
    );
    let visits = manager(&conn);

    let result = visits
        .create(&actor(UserRole::Kader), new_visit(404), balita_fields())
        .await;

    match result {
        Err(AppError::Validation(errors)) => assert!(errors.contains_key("peserta_id")),
        other => panic!("expected validation error, got {other:?}"),
    }
    drop(visits);

    let log = statement_log(conn);
    let txn = log.last().expect("transaction logged");
    assert_eq!(txn.last().map(String::as_str), Some("ROLLBACK"));
    assert!(inserted_tables(txn).is_empty());
}

#[tokio::test]
async fn test_update_writes_visit_and_detail_but_never_the_participant() {
    let conn = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            // visit with its participant, inside the transaction
            .append_query_results([vec![joined(
                kunjungan_row(11, 3, 9.4),
                peserta_row(3, Kategori::Balita),
            )]])
            .append_query_results([vec![kunjungan_row(11, 3, 9.4)]])
            .append_query_results([vec![kunjungan_row(11, 3, 10.1)]])
            .append_query_results([vec![kunjungan_balita_row(11, 14)]])
            .append_query_results([vec![kunjungan_balita_row(11, 15)]])
            // reload after commit
            .append_query_results([vec![joined(
                kunjungan_row(11, 3, 10.1),
                peserta_row(3, Kategori::Balita),
            )]])
            .append_query_results([vec![kunjungan_balita_row(11, 15)]])
            .into_connection(),
    );
    let visits = manager(&conn);

    let updated = visits
        .update(
            11,
            VisitPatch {
                berat_badan: Some(10.1),
                ..Default::default()
            },
            VisitDetailFields {
                umur_bulan: Some(15),
                ..Default::default()
            },
        )
        .await
        .expect("update visit");

    assert_eq!(updated.visit.berat_badan, Some(10.1));
    assert_eq!(updated.peserta.kategori, Kategori::Balita);
    drop(visits);

    let log = statement_log(conn);
    let statements = log.concat();
    assert_eq!(updated_tables(&statements), vec!["kunjungan", "kunjungan_balita"]);
    assert!(inserted_tables(&statements).is_empty());
    assert!(log.iter().any(|txn| txn.last().map(String::as_str) == Some("COMMIT")));
}

#[tokio::test]
async fn test_get_missing_visit_is_not_found() {
    let mut repos = MockRepos::default();
    repos.visits.expect_find_details().returning(|_| Ok(None));

    let result = VisitManager::new(repos.into_uow()).get(77).await;

    assert!(matches!(result, Err(AppError::NotFound("Kunjungan"))));
}

#[tokio::test]
async fn test_delete_goes_straight_to_the_store() {
    let mut repos = MockRepos::default();
    repos
        .visits
        .expect_delete()
        .withf(|id| *id == 11)
        .times(1)
        .returning(|_| Ok(()));

    VisitManager::new(repos.into_uow())
        .delete(11)
        .await
        .expect("delete visit");
}
