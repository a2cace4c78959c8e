//! Life-stage category and the fixed category -> detail shape mapping.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::AppError;

/// Life-stage category of a participant. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Kategori {
    /// Pregnant women
    Bumil,
    /// Infants and toddlers
    Balita,
    /// Adolescents
    Remaja,
    /// Working-age adults
    Produktif,
    /// Elderly
    Lansia,
}

/// Which extension/detail table a category's rows live in.
///
/// Working-age adults and the elderly share the adult shape for both
/// participants and visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailShape {
    Bumil,
    Balita,
    Remaja,
    Dewasa,
}

impl Kategori {
    pub const ALL: [Kategori; 5] = [
        Kategori::Bumil,
        Kategori::Balita,
        Kategori::Remaja,
        Kategori::Produktif,
        Kategori::Lansia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kategori::Bumil => "bumil",
            Kategori::Balita => "balita",
            Kategori::Remaja => "remaja",
            Kategori::Produktif => "produktif",
            Kategori::Lansia => "lansia",
        }
    }

    /// The single place categories are mapped onto detail tables.
    pub fn shape(&self) -> DetailShape {
        match self {
            Kategori::Bumil => DetailShape::Bumil,
            Kategori::Balita => DetailShape::Balita,
            Kategori::Remaja => DetailShape::Remaja,
            Kategori::Produktif | Kategori::Lansia => DetailShape::Dewasa,
        }
    }
}

impl std::fmt::Display for Kategori {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kategori {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kategori::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AppError::validation("kategori", format!("Kategori tidak dikenal: {}", s)))
    }
}

/// Sex as recorded on a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum JenisKelamin {
    #[serde(rename = "Laki-Laki")]
    LakiLaki,
    #[serde(rename = "Perempuan")]
    Perempuan,
}

impl JenisKelamin {
    pub fn as_str(&self) -> &'static str {
        match self {
            JenisKelamin::LakiLaki => "Laki-Laki",
            JenisKelamin::Perempuan => "Perempuan",
        }
    }

    /// Map the short filter code `L`/`P` to the stored label.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "L" => Some(JenisKelamin::LakiLaki),
            "P" => Some(JenisKelamin::Perempuan),
            _ => None,
        }
    }
}

impl FromStr for JenisKelamin {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Laki-Laki" => Ok(JenisKelamin::LakiLaki),
            "Perempuan" => Ok(JenisKelamin::Perempuan),
            other => Err(AppError::validation(
                "jenis_kelamin",
                format!("Jenis kelamin tidak dikenal: {}", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_a_shape() {
        let shapes: Vec<DetailShape> = Kategori::ALL.iter().map(Kategori::shape).collect();
        assert_eq!(
            shapes,
            vec![
                DetailShape::Bumil,
                DetailShape::Balita,
                DetailShape::Remaja,
                DetailShape::Dewasa,
                DetailShape::Dewasa,
            ]
        );
    }

    #[test]
    fn categories_round_trip_through_strings() {
        for kategori in Kategori::ALL {
            assert_eq!(kategori.as_str().parse::<Kategori>().unwrap(), kategori);
        }
        assert!("dewasa".parse::<Kategori>().is_err());
    }

    #[test]
    fn gender_codes_map_to_labels() {
        assert_eq!(JenisKelamin::from_code("L"), Some(JenisKelamin::LakiLaki));
        assert_eq!(JenisKelamin::from_code("p"), Some(JenisKelamin::Perempuan));
        assert_eq!(JenisKelamin::from_code("X"), None);
        assert_eq!(
            serde_json::to_string(&JenisKelamin::LakiLaki).unwrap(),
            "\"Laki-Laki\""
        );
    }
}
