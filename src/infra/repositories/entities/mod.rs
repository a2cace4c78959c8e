//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! Category-specific tables convert to and from the matching domain variant.

pub mod access_token;
pub mod kunjungan;
pub mod kunjungan_balita;
pub mod kunjungan_bumil;
pub mod kunjungan_dewasa;
pub mod kunjungan_remaja;
pub mod pengaduan;
pub mod pengaduan_image;
pub mod pengaduan_response;
pub mod peserta;
pub mod peserta_balita;
pub mod peserta_bumil;
pub mod peserta_dewasa;
pub mod peserta_remaja;
pub mod user;

use std::str::FromStr;

use crate::errors::{AppError, AppResult};

/// Parse an optional string column into its domain enum.
pub(crate) fn parse_opt<T>(raw: Option<&str>) -> AppResult<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    raw.map(str::parse).transpose()
}
