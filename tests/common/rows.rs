//! `MockDatabase` rows shaped like the posyandu tables, plus access to the
//! statements a mock connection recorded.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseConnection, Value};

use posyandu_api::config::Config;
use posyandu_api::domain::{hash_nik, Kategori};
use posyandu_api::infra::FieldCipher;

use super::TEST_NIK;

pub type Row = BTreeMap<String, Value>;

fn row(columns: Vec<(&str, Value)>) -> Row {
    columns
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

pub fn no_rows() -> Vec<Row> {
    Vec::new()
}

pub fn test_cipher() -> FieldCipher {
    FieldCipher::new(Config::for_tests().field_encryption_key())
}

/// A `find_also_related` row: left model under `A_`, right model under `B_`.
pub fn joined(left: Row, right: Row) -> Row {
    let left = left.into_iter().map(|(k, v)| (format!("A_{k}"), v));
    let right = right.into_iter().map(|(k, v)| (format!("B_{k}"), v));
    left.chain(right).collect()
}

pub fn peserta_row(id: i64, kategori: Kategori) -> Row {
    let nik = test_cipher().encrypt(TEST_NIK).expect("encrypt nik");
    row(vec![
        ("id", id.into()),
        ("nik", nik.into()),
        ("nik_hash", hash_nik(TEST_NIK).into()),
        ("nama", "Nur Aini".into()),
        ("kategori", kategori.as_str().into()),
        (
            "tanggal_lahir",
            NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date").into(),
        ),
        ("jenis_kelamin", "Perempuan".into()),
        ("alamat", Some("Jl. Kenanga 7".to_string()).into()),
        ("rt", Some("002".to_string()).into()),
        ("rw", Some("004".to_string()).into()),
        ("telepon", Option::<String>::None.into()),
        ("kepesertaan_bpjs", false.into()),
        ("nomor_bpjs", Option::<String>::None.into()),
        ("created_at", Utc::now().into()),
        ("updated_at", Utc::now().into()),
    ])
}

pub fn peserta_dewasa_row(peserta_id: i64) -> Row {
    row(vec![
        ("peserta_id", peserta_id.into()),
        ("pekerjaan", Some("Petani".to_string()).into()),
        ("status_perkawinan", Option::<String>::None.into()),
        ("riwayat_diri", Option::<serde_json::Value>::None.into()),
        ("merokok", true.into()),
        ("konsumsi_gula", false.into()),
        ("konsumsi_garam", false.into()),
        ("konsumsi_lemak", false.into()),
    ])
}

pub fn kunjungan_row(id: i64, peserta_id: i64, berat_badan: f64) -> Row {
    row(vec![
        ("id", id.into()),
        ("peserta_id", peserta_id.into()),
        (
            "tanggal_kunjungan",
            NaiveDate::from_ymd_opt(2026, 5, 2).expect("valid date").into(),
        ),
        ("berat_badan", Some(berat_badan).into()),
        ("rujuk", false.into()),
        ("lokasi", "posyandu".into()),
        ("created_by", Option::<uuid::Uuid>::None.into()),
        ("created_at", Utc::now().into()),
        ("updated_at", Utc::now().into()),
    ])
}

pub fn kunjungan_balita_row(id: i64, umur_bulan: i32) -> Row {
    row(vec![
        ("id", id.into()),
        ("umur_bulan", Some(umur_bulan).into()),
        ("kesimpulan_bb", Option::<String>::None.into()),
        ("panjang_badan", Option::<f64>::None.into()),
        ("lingkar_kepala", Option::<f64>::None.into()),
        ("lingkar_lengan", Option::<f64>::None.into()),
        ("skrining_tbc", Option::<serde_json::Value>::None.into()),
        ("balita_mendapatkan", Option::<serde_json::Value>::None.into()),
        ("edukasi_konseling", Option::<serde_json::Value>::None.into()),
        ("ada_gejala_sakit", false.into()),
    ])
}

/// SQL of every logged transaction, in order. A statement outside a
/// transaction is logged on its own.
///
/// Panics while anything else still holds the connection.
pub fn statement_log(conn: Arc<DatabaseConnection>) -> Vec<Vec<String>> {
    let conn = Arc::try_unwrap(conn)
        .unwrap_or_else(|_| panic!("mock connection is still shared"));
    conn.into_transaction_log()
        .iter()
        .map(|tx| tx.statements().iter().map(|s| s.sql.clone()).collect())
        .collect()
}

/// Tables written by `INSERT` statements, in order.
pub fn inserted_tables(statements: &[String]) -> Vec<String> {
    statements
        .iter()
        .filter_map(|sql| sql.strip_prefix("INSERT INTO \""))
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}

/// Tables written by `UPDATE` statements, in order.
pub fn updated_tables(statements: &[String]) -> Vec<String> {
    statements
        .iter()
        .filter_map(|sql| sql.strip_prefix("UPDATE \""))
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}
