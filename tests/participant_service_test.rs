//! Participant service tests: category validation, NIK uniqueness,
//! transactional master+extension writes and bulk deletion.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult,
    Statement,
};
use uuid::Uuid;

use common::rows::{
    inserted_tables, no_rows, peserta_dewasa_row, peserta_row, statement_log, test_cipher,
};
use common::{actor, MockRepos, TEST_NIK};
use posyandu_api::config::Config;
use posyandu_api::domain::{
    ExtensionFields, JenisKelamin, Kategori, Lokasi, NewParticipant, NewVisit, Nik, Participant,
    ParticipantPatch, UserRole, VisitDetailFields,
};
use posyandu_api::errors::AppError;
use posyandu_api::infra::{Database, FieldCipher, Persistence};
use posyandu_api::services::{
    AuthService, Authenticator, ParticipantManager, ParticipantService, Registration,
    VisitManager, VisitService,
};

fn new_lansia(nik: &str) -> NewParticipant {
    NewParticipant {
        nik: Nik::parse(nik).expect("valid nik"),
        nama: "Mbah Karto".into(),
        kategori: Kategori::Lansia,
        tanggal_lahir: NaiveDate::from_ymd_opt(1950, 8, 17).expect("valid date"),
        jenis_kelamin: JenisKelamin::LakiLaki,
        alamat: Some("Jl. Melati 3".into()),
        rt: Some("003".into()),
        rw: Some("001".into()),
        telepon: None,
        kepesertaan_bpjs: false,
        nomor_bpjs: None,
    }
}

fn lansia_fields() -> ExtensionFields {
    ExtensionFields {
        pekerjaan: Some("Petani".into()),
        merokok: Some(true),
        ..Default::default()
    }
}

fn existing(id: i64) -> Participant {
    let new = new_lansia(TEST_NIK);
    Participant {
        id,
        nik: TEST_NIK.into(),
        nama: new.nama,
        kategori: new.kategori,
        tanggal_lahir: new.tanggal_lahir,
        jenis_kelamin: new.jenis_kelamin,
        alamat: new.alamat,
        rt: new.rt,
        rw: new.rw,
        telepon: None,
        kepesertaan_bpjs: false,
        nomor_bpjs: None,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

fn mock_persistence(db: MockDatabase) -> Arc<Persistence> {
    let config = Config::for_tests();
    Arc::new(Persistence::new(
        db.into_connection(),
        FieldCipher::new(config.field_encryption_key()),
    ))
}

#[tokio::test]
async fn test_missing_category_field_is_rejected_before_any_query() {
    let mut repos = MockRepos::default();
    repos.participants.expect_find_by_nik_hash().times(0);

    let result = ParticipantManager::new(repos.into_uow())
        .create(new_lansia(TEST_NIK), ExtensionFields::default())
        .await;

    match result {
        Err(AppError::Validation(errors)) => assert!(errors.contains_key("pekerjaan")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_duplicate_nik_is_a_field_error() {
    let mut repos = MockRepos::default();
    repos
        .participants
        .expect_find_by_nik_hash()
        .returning(|_| Ok(Some(existing(1))));

    let result = ParticipantManager::new(repos.into_uow())
        .create(new_lansia(TEST_NIK), lansia_fields())
        .await;

    match result {
        Err(AppError::Validation(errors)) => {
            assert_eq!(errors["nik"], vec!["NIK sudah terdaftar dalam sistem".to_string()])
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_keeps_own_nik() {
    let mut repos = MockRepos::default();
    repos
        .participants
        .expect_find_by_id()
        .returning(|id| Ok(Some(existing(id))));
    repos
        .participants
        .expect_find_by_nik_hash()
        .returning(|_| Ok(Some(existing(4))));

    // Passing the NIK check moves on to the transaction, which the mock refuses
    let result = ParticipantManager::new(repos.into_uow())
        .update(
            4,
            ParticipantPatch {
                nik: Some(Nik::parse(TEST_NIK).expect("valid nik")),
                ..Default::default()
            },
            ExtensionFields::default(),
        )
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[tokio::test]
async fn test_empty_bulk_delete_is_rejected() {
    let mut repos = MockRepos::default();
    repos.participants.expect_bulk_delete().times(0);

    let result = ParticipantManager::new(repos.into_uow())
        .bulk_delete(Vec::new())
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_latest_visit_of_unknown_participant_is_not_found() {
    let mut repos = MockRepos::default();
    repos.participants.expect_find_by_id().returning(|_| Ok(None));
    repos.visits.expect_latest_for_participant().times(0);

    let result = ParticipantManager::new(repos.into_uow())
        .latest_visit(99)
        .await;

    assert!(matches!(result, Err(AppError::NotFound("Peserta"))));
}

#[tokio::test]
async fn test_bulk_delete_counts_only_existing_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
        last_insert_id: 0,
        rows_affected: 2,
    }]);

    let deleted = ParticipantManager::new(mock_persistence(db))
        .bulk_delete(vec![1, 2, 404])
        .await
        .expect("bulk delete");

    assert_eq!(deleted, 2);
}

#[tokio::test]
async fn test_failed_master_insert_rolls_back_as_transaction_failure() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([no_rows()])
        .append_query_errors([DbErr::Custom("insert failed".into())]);

    let result = ParticipantManager::new(mock_persistence(db))
        .create(new_lansia(TEST_NIK), lansia_fields())
        .await;

    assert!(matches!(result, Err(AppError::TransactionFailed(_))));
}

#[tokio::test]
async fn test_create_writes_master_then_exactly_one_extension_row() {
    let conn = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([no_rows()])
            .append_query_results([vec![peserta_row(7, Kategori::Lansia)]])
            .append_query_results([vec![peserta_dewasa_row(7)]])
            .into_connection(),
    );
    let uow = Arc::new(Persistence::new(conn.clone(), test_cipher()));
    let manager = ParticipantManager::new(uow);

    let created = manager
        .create(new_lansia(TEST_NIK), lansia_fields())
        .await
        .expect("create");
    assert_eq!(created.participant.id, 7);
    drop(manager);

    let log = statement_log(conn);
    let txn = log.last().expect("transaction logged");
    assert_eq!(txn.first().map(String::as_str), Some("BEGIN"));
    assert_eq!(txn.last().map(String::as_str), Some("COMMIT"));
    assert_eq!(inserted_tables(txn), vec!["peserta", "peserta_dewasa"]);
    assert_eq!(inserted_tables(&log.concat()).len(), 2);
}

#[tokio::test]
async fn test_failed_extension_insert_rolls_back_the_master_row() {
    let conn = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([no_rows()])
            .append_query_results([vec![peserta_row(7, Kategori::Lansia)]])
            .append_query_errors([DbErr::Custom("peserta_dewasa insert failed".into())])
            .into_connection(),
    );
    let uow = Arc::new(Persistence::new(conn.clone(), test_cipher()));
    let manager = ParticipantManager::new(uow);

    let result = manager.create(new_lansia(TEST_NIK), lansia_fields()).await;
    assert!(matches!(result, Err(AppError::TransactionFailed(_))));
    drop(manager);

    let log = statement_log(conn);
    let txn = log.last().expect("transaction logged");
    assert_eq!(inserted_tables(txn), vec!["peserta", "peserta_dewasa"]);
    assert_eq!(txn.last().map(String::as_str), Some("ROLLBACK"));
    assert!(!log.concat().iter().any(|sql| sql == "COMMIT"));
}

async fn count_rows(conn: &DatabaseConnection, table: &str, key: &str, id: i64) -> i64 {
    let sql = format!("SELECT COUNT(*) AS n FROM {table} WHERE {key} = $1");
    conn.query_one(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        sql,
        [id.into()],
    ))
    .await
    .expect("count query")
    .expect("count row")
    .try_get::<i64>("", "n")
    .expect("count column")
}

/// Deleting a participant removes its extension, visits and visit details.
///
/// Run with `DATABASE_URL` pointing at a disposable Postgres database.
#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn test_participant_delete_cascades_in_postgres() {
    let config = Config::from_env();
    let db = Database::connect(&config)
        .await
        .expect("connect");
    let uow = Arc::new(Persistence::new(
        db.get_connection(),
        FieldCipher::new(config.field_encryption_key()),
    ));

    let suffix = Uuid::new_v4().as_u128() % 1_000_000_000;
    let kader_nik = format!("3201{:012}", suffix);
    let peserta_nik = format!("3202{:012}", suffix);

    let session = Authenticator::new(uow.clone(), config.clone())
        .register(Registration {
            name: "Kader Uji".into(),
            email: format!("kader{}@posyandu.id", suffix),
            password: "rahasia123".into(),
            nik: Nik::parse(&kader_nik).expect("valid nik"),
            phone_number: None,
        })
        .await
        .expect("register");
    let mut kader = actor(UserRole::Kader);
    kader.id = session.user.id;

    let participants = ParticipantManager::new(uow.clone());
    let created = participants
        .create(new_lansia(&peserta_nik), lansia_fields())
        .await
        .expect("create participant");
    let peserta_id = created.participant.id;

    let visits = VisitManager::new(uow.clone());
    let visit = visits
        .create(
            &kader,
            NewVisit {
                peserta_id,
                tanggal_kunjungan: NaiveDate::from_ymd_opt(2026, 5, 2).expect("valid date"),
                berat_badan: Some(61.5),
                rujuk: false,
                lokasi: Lokasi::Posyandu,
                created_by: None,
            },
            VisitDetailFields {
                tekanan_darah: Some("130/85".into()),
                ..Default::default()
            },
        )
        .await
        .expect("create visit");

    let conn = db.get_connection();
    let visit_id = visit.visit.id;
    assert_eq!(count_rows(&conn, "peserta_dewasa", "peserta_id", peserta_id).await, 1);
    assert_eq!(count_rows(&conn, "kunjungan_dewasa", "id", visit_id).await, 1);

    participants.delete(peserta_id).await.expect("delete");

    assert_eq!(count_rows(&conn, "peserta", "id", peserta_id).await, 0);
    assert_eq!(count_rows(&conn, "peserta_dewasa", "peserta_id", peserta_id).await, 0);
    assert_eq!(count_rows(&conn, "kunjungan", "id", visit_id).await, 0);
    assert_eq!(count_rows(&conn, "kunjungan_dewasa", "id", visit_id).await, 0);

    assert!(matches!(
        participants.get(peserta_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        visits.get(visit_id).await,
        Err(AppError::NotFound(_))
    ));
}
