//! Participant (peserta) aggregate: a master record plus exactly one
//! category-specific extension.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::kategori::{DetailShape, JenisKelamin, Kategori};
use super::nik::Nik;
use crate::errors::{AppError, AppResult, FieldErrors};

/// Participant master record with NIK and phone decrypted.
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub id: i64,
    pub nik: String,
    pub nama: String,
    pub kategori: Kategori,
    pub tanggal_lahir: NaiveDate,
    pub jenis_kelamin: JenisKelamin,
    pub alamat: Option<String>,
    pub rt: Option<String>,
    pub rw: Option<String>,
    pub telepon: Option<String>,
    pub kepesertaan_bpjs: bool,
    pub nomor_bpjs: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pregnancy profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BumilProfile {
    pub nama_suami: Option<String>,
    pub hamil_anak_ke: Option<i32>,
    pub jarak_anak: Option<String>,
    pub bb_sebelum_hamil: Option<f64>,
    pub tinggi_badan: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BalitaProfile {
    pub nama_ortu: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RemajaProfile {
    pub nama_ortu: Option<String>,
    pub riwayat_keluarga: Option<Value>,
    pub perilaku_berisiko: Option<Value>,
}

/// Adult profile, shared by working-age and elderly participants.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DewasaProfile {
    pub pekerjaan: Option<String>,
    pub status_perkawinan: Option<String>,
    pub riwayat_diri: Option<Value>,
    pub merokok: bool,
    pub konsumsi_gula: bool,
    pub konsumsi_garam: bool,
    pub konsumsi_lemak: bool,
}

/// The one extension row attached to a participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParticipantExtension {
    Bumil(BumilProfile),
    Balita(BalitaProfile),
    Remaja(RemajaProfile),
    Dewasa(DewasaProfile),
}

/// Every category-specific field a request may carry. Used both to build a
/// new extension and as a partial update of an existing one; fields that do
/// not belong to the participant's category are ignored.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ExtensionFields {
    #[schema(example = "Budi Santoso")]
    pub nama_suami: Option<String>,
    pub hamil_anak_ke: Option<i32>,
    pub jarak_anak: Option<String>,
    pub bb_sebelum_hamil: Option<f64>,
    pub tinggi_badan: Option<f64>,
    pub nama_ortu: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub riwayat_keluarga: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub perilaku_berisiko: Option<Value>,
    pub pekerjaan: Option<String>,
    pub status_perkawinan: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub riwayat_diri: Option<Value>,
    pub merokok: Option<bool>,
    pub konsumsi_gula: Option<bool>,
    pub konsumsi_garam: Option<bool>,
    pub konsumsi_lemak: Option<bool>,
}

impl BumilProfile {
    pub fn apply(&mut self, fields: &ExtensionFields) {
        overwrite_present!(self, fields;
            opt: [nama_suami, hamil_anak_ke, jarak_anak, bb_sebelum_hamil, tinggi_badan];
            flag: []);
    }
}

impl BalitaProfile {
    pub fn apply(&mut self, fields: &ExtensionFields) {
        overwrite_present!(self, fields; opt: [nama_ortu]; flag: []);
    }
}

impl RemajaProfile {
    pub fn apply(&mut self, fields: &ExtensionFields) {
        overwrite_present!(self, fields;
            opt: [nama_ortu, riwayat_keluarga, perilaku_berisiko];
            flag: []);
    }
}

impl DewasaProfile {
    pub fn apply(&mut self, fields: &ExtensionFields) {
        overwrite_present!(self, fields;
            opt: [pekerjaan, status_perkawinan, riwayat_diri];
            flag: [merokok, konsumsi_gula, konsumsi_garam, konsumsi_lemak]);
    }
}

impl ParticipantExtension {
    /// Empty extension of the given shape.
    pub fn empty(shape: DetailShape) -> Self {
        match shape {
            DetailShape::Bumil => Self::Bumil(BumilProfile::default()),
            DetailShape::Balita => Self::Balita(BalitaProfile::default()),
            DetailShape::Remaja => Self::Remaja(RemajaProfile::default()),
            DetailShape::Dewasa => Self::Dewasa(DewasaProfile::default()),
        }
    }

    /// Build the extension for a new participant of `kategori`, enforcing the
    /// fields each category requires.
    pub fn build(kategori: Kategori, fields: &ExtensionFields) -> AppResult<Self> {
        let mut errors = FieldErrors::new();
        let mut require = |field: &str, value: &Option<String>| {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                errors.entry(field.to_string()).or_default().push(format!(
                    "Kolom {} wajib diisi untuk kategori {}",
                    field, kategori
                ));
            }
        };
        match kategori {
            Kategori::Bumil => require("nama_suami", &fields.nama_suami),
            Kategori::Balita | Kategori::Remaja => require("nama_ortu", &fields.nama_ortu),
            Kategori::Produktif | Kategori::Lansia => require("pekerjaan", &fields.pekerjaan),
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let mut extension = Self::empty(kategori.shape());
        extension.apply(fields);
        Ok(extension)
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, fields: &ExtensionFields) {
        match self {
            Self::Bumil(profile) => profile.apply(fields),
            Self::Balita(profile) => profile.apply(fields),
            Self::Remaja(profile) => profile.apply(fields),
            Self::Dewasa(profile) => profile.apply(fields),
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

/// Master fields of a participant to register.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub nik: Nik,
    pub nama: String,
    pub kategori: Kategori,
    pub tanggal_lahir: NaiveDate,
    pub jenis_kelamin: JenisKelamin,
    pub alamat: Option<String>,
    pub rt: Option<String>,
    pub rw: Option<String>,
    pub telepon: Option<String>,
    pub kepesertaan_bpjs: bool,
    pub nomor_bpjs: Option<String>,
}

/// Partial update of master fields. Category is not updatable.
#[derive(Debug, Clone, Default)]
pub struct ParticipantPatch {
    pub nik: Option<Nik>,
    pub nama: Option<String>,
    pub tanggal_lahir: Option<NaiveDate>,
    pub jenis_kelamin: Option<JenisKelamin>,
    pub alamat: Option<String>,
    pub rt: Option<String>,
    pub rw: Option<String>,
    pub telepon: Option<String>,
    pub kepesertaan_bpjs: Option<bool>,
    pub nomor_bpjs: Option<String>,
}

/// Participant with its extension and the date of the latest visit.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantDetails {
    #[serde(flatten)]
    pub participant: Participant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<ParticipantExtension>,
    pub last_visit_date: Option<NaiveDate>,
}

/// Short row used by pickers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantSummary {
    pub id: i64,
    pub nama: String,
    pub nik: String,
    pub kategori: Kategori,
    pub jenis_kelamin: JenisKelamin,
}

// =============================================================================
// Listing
// =============================================================================

/// Sortable participant columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantSort {
    Nama,
    TanggalLahir,
    #[default]
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Server-side participant filters.
#[derive(Debug, Clone, Default)]
pub struct ParticipantQuery {
    pub search: Option<String>,
    pub kategori: Option<Kategori>,
    pub jenis_kelamin: Option<JenisKelamin>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub rt: Option<String>,
    pub rw: Option<String>,
    pub sort_by: ParticipantSort,
    pub sort_order: SortOrder,
}

/// Birth date window equivalent to an age range on `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BirthDateBounds {
    /// Born on or before this date (from `min_age`)
    pub born_on_or_before: Option<NaiveDate>,
    /// Born on or after this date (from `max_age`)
    pub born_on_or_after: Option<NaiveDate>,
}

impl ParticipantQuery {
    /// Translate the age filters into date-of-birth bounds relative to `today`.
    pub fn birth_date_bounds(&self, today: NaiveDate) -> BirthDateBounds {
        let years_ago =
            |years: u32| today.checked_sub_months(Months::new(years.saturating_mul(12)));
        BirthDateBounds {
            born_on_or_before: self.min_age.and_then(years_ago),
            born_on_or_after: self.max_age.and_then(years_ago),
        }
    }
}

/// Columns a caller may project a participant listing onto.
pub const PROJECTABLE_FIELDS: &[&str] = &[
    "id",
    "nama",
    "nik",
    "kategori",
    "jenis_kelamin",
    "tanggal_lahir",
    "telepon",
    "rt",
    "rw",
    "created_at",
];

/// Parse a comma separated `fields` parameter, keeping only allowed columns.
/// Returns `None` when nothing usable was requested.
pub fn parse_projection(raw: Option<&str>) -> Option<Vec<&'static str>> {
    let raw = raw?;
    let selected: Vec<&'static str> = PROJECTABLE_FIELDS
        .iter()
        .copied()
        .filter(|allowed| raw.split(',').any(|f| f.trim() == *allowed))
        .collect();
    (!selected.is_empty()).then_some(selected)
}

/// Keep only `fields` (plus `last_visit_date`) of a serialized participant.
pub fn project(value: Value, fields: &[&str]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| key == "last_visit_date" || fields.contains(&key.as_str()))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bumil_requires_husband_name() {
        let err = ParticipantExtension::build(Kategori::Bumil, &ExtensionFields::default())
            .unwrap_err();
        match err {
            AppError::Validation(errors) => assert!(errors.contains_key("nama_suami")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let fields = ExtensionFields {
            nama_ortu: Some("   ".into()),
            ..Default::default()
        };
        assert!(ParticipantExtension::build(Kategori::Remaja, &fields).is_err());
    }

    #[test]
    fn each_category_builds_its_own_shape() {
        let fields = ExtensionFields {
            nama_suami: Some("Budi".into()),
            nama_ortu: Some("Ani".into()),
            pekerjaan: Some("Petani".into()),
            merokok: Some(true),
            ..Default::default()
        };
        for kategori in Kategori::ALL {
            let extension = ParticipantExtension::build(kategori, &fields).unwrap();
            assert_eq!(extension.shape(), kategori.shape());
        }
    }

    #[test]
    fn build_ignores_fields_of_other_categories() {
        let fields = ExtensionFields {
            nama_ortu: Some("Ani".into()),
            nama_suami: Some("Budi".into()),
            ..Default::default()
        };
        let extension = ParticipantExtension::build(Kategori::Balita, &fields).unwrap();
        assert_eq!(
            extension,
            ParticipantExtension::Balita(BalitaProfile {
                nama_ortu: Some("Ani".into())
            })
        );
    }

    #[test]
    fn apply_is_partial() {
        let mut extension = ParticipantExtension::Dewasa(DewasaProfile {
            pekerjaan: Some("Guru".into()),
            status_perkawinan: Some("Kawin".into()),
            merokok: true,
            ..Default::default()
        });
        extension.apply(&ExtensionFields {
            pekerjaan: Some("Pensiunan".into()),
            konsumsi_garam: Some(true),
            ..Default::default()
        });
        match extension {
            ParticipantExtension::Dewasa(profile) => {
                assert_eq!(profile.pekerjaan.as_deref(), Some("Pensiunan"));
                assert_eq!(profile.status_perkawinan.as_deref(), Some("Kawin"));
                assert!(profile.merokok);
                assert!(profile.konsumsi_garam);
            }
            other => panic!("shape changed: {other:?}"),
        }
    }

    #[test]
    fn age_range_becomes_birth_date_window() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        let query = ParticipantQuery {
            min_age: Some(5),
            max_age: Some(60),
            ..Default::default()
        };
        let bounds = query.birth_date_bounds(today);
        assert_eq!(bounds.born_on_or_before, NaiveDate::from_ymd_opt(2021, 6, 15));
        assert_eq!(bounds.born_on_or_after, NaiveDate::from_ymd_opt(1966, 6, 15));
    }

    #[test]
    fn leap_day_age_bound_clamps() {
        let today = NaiveDate::from_ymd_opt(2028, 2, 29).unwrap();
        let query = ParticipantQuery {
            min_age: Some(1),
            ..Default::default()
        };
        assert_eq!(
            query.birth_date_bounds(today).born_on_or_before,
            NaiveDate::from_ymd_opt(2027, 2, 28)
        );
    }

    #[test]
    fn projection_keeps_only_allowed_fields() {
        assert_eq!(
            parse_projection(Some("nama, nik,password,alamat")),
            Some(vec!["nama", "nik"])
        );
        assert_eq!(parse_projection(Some("password")), None);
        assert_eq!(parse_projection(None), None);

        let row = json!({"id": 1, "nama": "Ani", "nik": "1", "alamat": "x", "last_visit_date": null});
        assert_eq!(
            project(row, &["nama"]),
            json!({"nama": "Ani", "last_visit_date": null})
        );
    }
}
