//! Visit (kunjungan) aggregate: a dated check-up plus one category-specific
//! examination record keyed by the visit id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::kategori::{DetailShape, Kategori};
use crate::errors::AppError;

/// Where the examination took place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Lokasi {
    #[default]
    Posyandu,
    KunjunganRumah,
}

impl Lokasi {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lokasi::Posyandu => "posyandu",
            Lokasi::KunjunganRumah => "kunjungan_rumah",
        }
    }
}

impl FromStr for Lokasi {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "posyandu" => Ok(Lokasi::Posyandu),
            "kunjungan_rumah" => Ok(Lokasi::KunjunganRumah),
            other => Err(AppError::internal(format!("unknown lokasi {other}"))),
        }
    }
}

string_enum!(
    /// Weight trend of an infant since the previous weighing.
    KesimpulanBb { Naik => "NAIK", TidakNaik => "TIDAK NAIK", Bgm => "BGM" }
);

string_enum!(
    /// Body mass index class.
    Imt {
        SangatKurus => "sangat_kurus",
        Kurus => "kurus",
        Normal => "normal",
        Gemuk => "gemuk",
        Obesitas => "obesitas",
    }
);

string_enum!(
    /// Outcome of a vision or hearing screen.
    HasilTes { Normal => "normal", Gangguan => "gangguan" }
);

string_enum!(
    /// Activities-of-daily-living independence level.
    TingkatKemandirian {
        Mandiri => "mandiri",
        Ringan => "ringan",
        Sedang => "sedang",
        Berat => "berat",
        Total => "total",
    }
);

/// Visit master record.
#[derive(Debug, Clone, Serialize)]
pub struct Visit {
    pub id: i64,
    pub peserta_id: i64,
    pub tanggal_kunjungan: NaiveDate,
    pub berat_badan: Option<f64>,
    pub rujuk: bool,
    pub lokasi: Lokasi,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BumilExam {
    pub umur_kehamilan: Option<i32>,
    pub lila: Option<f64>,
    pub tekanan_darah: Option<String>,
    pub skrining_tbc: Option<Value>,
    pub tablet_darah: bool,
    pub asi_eksklusif: bool,
    pub mt_bumil_kek: bool,
    pub kelas_bumil: bool,
    pub penyuluhan: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BalitaExam {
    pub umur_bulan: Option<i32>,
    pub kesimpulan_bb: Option<KesimpulanBb>,
    pub panjang_badan: Option<f64>,
    pub lingkar_kepala: Option<f64>,
    pub lingkar_lengan: Option<f64>,
    pub skrining_tbc: Option<Value>,
    pub balita_mendapatkan: Option<Value>,
    pub edukasi_konseling: Option<Value>,
    pub ada_gejala_sakit: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RemajaExam {
    pub tinggi_badan: Option<f64>,
    pub imt: Option<Imt>,
    pub lingkar_perut: Option<f64>,
    pub tekanan_darah: Option<String>,
    pub gula_darah: Option<f64>,
    pub kadar_hb: Option<String>,
    pub skrining_tbc: Option<Value>,
    pub skrining_mental: Option<Value>,
    pub edukasi: Option<Value>,
}

/// Adult examination, shared by working-age and elderly participants.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DewasaExam {
    pub tinggi_badan: Option<f64>,
    pub imt: Option<Imt>,
    pub lingkar_perut: Option<f64>,
    pub tekanan_darah: Option<String>,
    pub gula_darah: Option<f64>,
    pub asam_urat: Option<f64>,
    pub kolesterol: Option<f64>,
    pub tes_mata: Option<HasilTes>,
    pub tes_telinga: Option<HasilTes>,
    pub skrining_tbc: Option<Value>,
    pub skrining_puma: Option<Value>,
    pub jumlah_skor_puma: Option<i32>,
    pub alat_kontrasepsi: Option<String>,
    pub adl: Option<Value>,
    pub jumlah_skor_adl: Option<i32>,
    pub tingkat_kemandirian: Option<TingkatKemandirian>,
    pub edukasi: Option<Value>,
}

/// The one examination record attached to a visit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VisitDetail {
    Bumil(BumilExam),
    Balita(BalitaExam),
    Remaja(RemajaExam),
    Dewasa(DewasaExam),
}

/// Every examination field a request may carry, as a flat partial record.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct VisitDetailFields {
    pub umur_kehamilan: Option<i32>,
    pub lila: Option<f64>,
    #[schema(example = "120/80")]
    pub tekanan_darah: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub skrining_tbc: Option<Value>,
    pub tablet_darah: Option<bool>,
    pub asi_eksklusif: Option<bool>,
    pub mt_bumil_kek: Option<bool>,
    pub kelas_bumil: Option<bool>,
    #[schema(value_type = Option<Object>)]
    pub penyuluhan: Option<Value>,
    pub umur_bulan: Option<i32>,
    pub kesimpulan_bb: Option<KesimpulanBb>,
    pub panjang_badan: Option<f64>,
    pub lingkar_kepala: Option<f64>,
    pub lingkar_lengan: Option<f64>,
    #[schema(value_type = Option<Object>)]
    pub balita_mendapatkan: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub edukasi_konseling: Option<Value>,
    pub ada_gejala_sakit: Option<bool>,
    pub tinggi_badan: Option<f64>,
    pub imt: Option<Imt>,
    pub lingkar_perut: Option<f64>,
    pub gula_darah: Option<f64>,
    pub kadar_hb: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub skrining_mental: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub edukasi: Option<Value>,
    pub asam_urat: Option<f64>,
    pub kolesterol: Option<f64>,
    pub tes_mata: Option<HasilTes>,
    pub tes_telinga: Option<HasilTes>,
    #[schema(value_type = Option<Object>)]
    pub skrining_puma: Option<Value>,
    pub jumlah_skor_puma: Option<i32>,
    pub alat_kontrasepsi: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub adl: Option<Value>,
    pub jumlah_skor_adl: Option<i32>,
    pub tingkat_kemandirian: Option<TingkatKemandirian>,
}

impl BumilExam {
    pub fn apply(&mut self, fields: &VisitDetailFields) {
        overwrite_present!(self, fields;
            opt: [umur_kehamilan, lila, tekanan_darah, skrining_tbc, penyuluhan];
            flag: [tablet_darah, asi_eksklusif, mt_bumil_kek, kelas_bumil]);
    }
}

impl BalitaExam {
    pub fn apply(&mut self, fields: &VisitDetailFields) {
        overwrite_present!(self, fields;
            opt: [umur_bulan, kesimpulan_bb, panjang_badan, lingkar_kepala, lingkar_lengan,
                  skrining_tbc, balita_mendapatkan, edukasi_konseling];
            flag: [ada_gejala_sakit]);
    }
}

impl RemajaExam {
    pub fn apply(&mut self, fields: &VisitDetailFields) {
        overwrite_present!(self, fields;
            opt: [tinggi_badan, imt, lingkar_perut, tekanan_darah, gula_darah, kadar_hb,
                  skrining_tbc, skrining_mental, edukasi];
            flag: []);
    }
}

impl DewasaExam {
    pub fn apply(&mut self, fields: &VisitDetailFields) {
        overwrite_present!(self, fields;
            opt: [tinggi_badan, imt, lingkar_perut, tekanan_darah, gula_darah, asam_urat,
                  kolesterol, tes_mata, tes_telinga, skrining_tbc, skrining_puma,
                  jumlah_skor_puma, alat_kontrasepsi, adl, jumlah_skor_adl,
                  tingkat_kemandirian, edukasi];
            flag: []);
    }
}

impl VisitDetail {
    pub fn empty(shape: DetailShape) -> Self {
        match shape {
            DetailShape::Bumil => Self::Bumil(BumilExam::default()),
            DetailShape::Balita => Self::Balita(BalitaExam::default()),
            DetailShape::Remaja => Self::Remaja(RemajaExam::default()),
            DetailShape::Dewasa => Self::Dewasa(DewasaExam::default()),
        }
    }

    /// Examination record for a visit by a participant of `kategori`.
    pub fn build(kategori: Kategori, fields: &VisitDetailFields) -> Self {
        let mut detail = Self::empty(kategori.shape());
        detail.apply(fields);
        detail
    }

    pub fn apply(&mut self, fields: &VisitDetailFields) {
        match self {
            Self::Bumil(exam) => exam.apply(fields),
            Self::Balita(exam) => exam.apply(fields),
            Self::Remaja(exam) => exam.apply(fields),
            Self::Dewasa(exam) => exam.apply(fields),
        }
    }

    pub fn shape(&self) -> DetailShape {
        match self {
            Self::Bumil(_) => DetailShape::Bumil,
            Self::Balita(_) => DetailShape::Balita,
            Self::Remaja(_) => DetailShape::Remaja,
            Self::Dewasa(_) => DetailShape::Dewasa,
        }
    }
}

/// Master fields of a visit to record.
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub peserta_id: i64,
    pub tanggal_kunjungan: NaiveDate,
    pub berat_badan: Option<f64>,
    pub rujuk: bool,
    pub lokasi: Lokasi,
    pub created_by: Option<Uuid>,
}

/// Partial update of visit master fields.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct VisitPatch {
    pub tanggal_kunjungan: Option<NaiveDate>,
    pub berat_badan: Option<f64>,
    pub rujuk: Option<bool>,
    pub lokasi: Option<Lokasi>,
}

/// Minimal participant reference embedded in visit responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantRef {
    pub id: i64,
    pub nama: String,
    pub kategori: Kategori,
}

/// Visit with its participant and examination record.
#[derive(Debug, Clone, Serialize)]
pub struct VisitDetails {
    #[serde(flatten)]
    pub visit: Visit,
    pub peserta: ParticipantRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<VisitDetail>,
}

/// Visit list filters. Date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct VisitQuery {
    pub peserta_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Most recent visit of a participant, detail merged with body weight.
#[derive(Debug, Clone, Serialize)]
pub struct LatestVisit {
    pub id: i64,
    pub peserta_id: i64,
    pub tanggal_kunjungan: NaiveDate,
    pub lokasi_pemeriksaan: Lokasi,
    pub kategori: Kategori,
    pub detail: Value,
}

impl LatestVisit {
    pub fn new(visit: Visit, kategori: Kategori, detail: Option<VisitDetail>) -> Self {
        let mut merged = detail
            .and_then(|d| serde_json::to_value(d).ok())
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(Default::default()));
        if let Value::Object(map) = &mut merged {
            map.insert("berat_badan".to_string(), serde_json::json!(visit.berat_badan));
        }
        Self {
            id: visit.id,
            peserta_id: visit.peserta_id,
            tanggal_kunjungan: visit.tanggal_kunjungan,
            lokasi_pemeriksaan: visit.lokasi,
            kategori,
            detail: merged,
        }
    }
}
