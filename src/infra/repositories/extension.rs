//! Load, insert and save of the one category-specific row attached to a
//! participant or a visit.
//!
//! The table is chosen by exhaustive matching on [`DetailShape`], so a new
//! shape cannot be added without handling it here.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait};

use super::entities::{
    kunjungan_balita, kunjungan_bumil, kunjungan_dewasa, kunjungan_remaja, peserta_balita,
    peserta_bumil, peserta_dewasa, peserta_remaja,
};
use crate::domain::participant::{BalitaProfile, BumilProfile, DewasaProfile, RemajaProfile};
use crate::domain::visit::{BalitaExam, BumilExam, DewasaExam, RemajaExam};
use crate::domain::{DetailShape, ParticipantExtension, VisitDetail};
use crate::errors::AppResult;

/// A detail record keyed by the id of the master row it extends.
#[async_trait]
pub trait CategoryExtension: Sized + Send + Sync {
    /// Fetch the detail row of `shape` for `owner`, touching no other table.
    async fn load<C>(conn: &C, owner: i64, shape: DetailShape) -> AppResult<Option<Self>>
    where
        C: ConnectionTrait + Sync;

    /// Insert this detail for `owner`.
    async fn insert<C>(&self, conn: &C, owner: i64) -> AppResult<()>
    where
        C: ConnectionTrait + Sync;

    /// Overwrite the existing detail row of `owner`.
    async fn save<C>(&self, conn: &C, owner: i64) -> AppResult<()>
    where
        C: ConnectionTrait + Sync;
}

#[async_trait]
impl CategoryExtension for ParticipantExtension {
    async fn load<C>(conn: &C, owner: i64, shape: DetailShape) -> AppResult<Option<Self>>
    where
        C: ConnectionTrait + Sync,
    {
        let extension = match shape {
            DetailShape::Bumil => peserta_bumil::Entity::find_by_id(owner)
                .one(conn)
                .await?
                .map(|m| Self::Bumil(BumilProfile::from(m))),
            DetailShape::Balita => peserta_balita::Entity::find_by_id(owner)
                .one(conn)
                .await?
                .map(|m| Self::Balita(BalitaProfile::from(m))),
            DetailShape::Remaja => peserta_remaja::Entity::find_by_id(owner)
                .one(conn)
                .await?
                .map(|m| Self::Remaja(RemajaProfile::from(m))),
            DetailShape::Dewasa => peserta_dewasa::Entity::find_by_id(owner)
                .one(conn)
                .await?
                .map(|m| Self::Dewasa(DewasaProfile::from(m))),
        };
        Ok(extension)
    }

    async fn insert<C>(&self, conn: &C, owner: i64) -> AppResult<()>
    where
        C: ConnectionTrait + Sync,
    {
        match self {
            Self::Bumil(p) => {
                peserta_bumil::ActiveModel::from_profile(owner, p)
                    .insert(conn)
                    .await?;
            }
            Self::Balita(p) => {
                peserta_balita::ActiveModel::from_profile(owner, p)
                    .insert(conn)
                    .await?;
            }
            Self::Remaja(p) => {
                peserta_remaja::ActiveModel::from_profile(owner, p)
                    .insert(conn)
                    .await?;
            }
            Self::Dewasa(p) => {
                peserta_dewasa::ActiveModel::from_profile(owner, p)
                    .insert(conn)
                    .await?;
            }
        }
        Ok(())
    }

    async fn save<C>(&self, conn: &C, owner: i64) -> AppResult<()>
    where
        C: ConnectionTrait + Sync,
    {
        match self {
            Self::Bumil(p) => {
                peserta_bumil::ActiveModel::from_profile(owner, p)
                    .update(conn)
                    .await?;
            }
            Self::Balita(p) => {
                peserta_balita::ActiveModel::from_profile(owner, p)
                    .update(conn)
                    .await?;
            }
            Self::Remaja(p) => {
                peserta_remaja::ActiveModel::from_profile(owner, p)
                    .update(conn)
                    .await?;
            }
            Self::Dewasa(p) => {
                peserta_dewasa::ActiveModel::from_profile(owner, p)
                    .update(conn)
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryExtension for VisitDetail {
    async fn load<C>(conn: &C, owner: i64, shape: DetailShape) -> AppResult<Option<Self>>
    where
        C: ConnectionTrait + Sync,
    {
        let detail = match shape {
            DetailShape::Bumil => kunjungan_bumil::Entity::find_by_id(owner)
                .one(conn)
                .await?
                .map(|m| Self::Bumil(BumilExam::from(m))),
            DetailShape::Balita => kunjungan_balita::Entity::find_by_id(owner)
                .one(conn)
                .await?
                .map(BalitaExam::try_from)
                .transpose()?
                .map(Self::Balita),
            DetailShape::Remaja => kunjungan_remaja::Entity::find_by_id(owner)
                .one(conn)
                .await?
                .map(RemajaExam::try_from)
                .transpose()?
                .map(Self::Remaja),
            DetailShape::Dewasa => kunjungan_dewasa::Entity::find_by_id(owner)
                .one(conn)
                .await?
                .map(DewasaExam::try_from)
                .transpose()?
                .map(Self::Dewasa),
        };
        Ok(detail)
    }

    async fn insert<C>(&self, conn: &C, owner: i64) -> AppResult<()>
    where
        C: ConnectionTrait + Sync,
    {
        match self {
            Self::Bumil(e) => {
                kunjungan_bumil::ActiveModel::from_exam(owner, e)
                    .insert(conn)
                    .await?;
            }
            Self::Balita(e) => {
                kunjungan_balita::ActiveModel::from_exam(owner, e)
                    .insert(conn)
                    .await?;
            }
            Self::Remaja(e) => {
                kunjungan_remaja::ActiveModel::from_exam(owner, e)
                    .insert(conn)
                    .await?;
            }
            Self::Dewasa(e) => {
                kunjungan_dewasa::ActiveModel::from_exam(owner, e)
                    .insert(conn)
                    .await?;
            }
        }
        Ok(())
    }

    async fn save<C>(&self, conn: &C, owner: i64) -> AppResult<()>
    where
        C: ConnectionTrait + Sync,
    {
        match self {
            Self::Bumil(e) => {
                kunjungan_bumil::ActiveModel::from_exam(owner, e)
                    .update(conn)
                    .await?;
            }
            Self::Balita(e) => {
                kunjungan_balita::ActiveModel::from_exam(owner, e)
                    .update(conn)
                    .await?;
            }
            Self::Remaja(e) => {
                kunjungan_remaja::ActiveModel::from_exam(owner, e)
                    .update(conn)
                    .await?;
            }
            Self::Dewasa(e) => {
                kunjungan_dewasa::ActiveModel::from_exam(owner, e)
                    .update(conn)
                    .await?;
            }
        }
        Ok(())
    }
}

/// Apply `patch` to the existing detail of `owner`. Returns `false` and writes
/// nothing when the owner has no detail row.
pub async fn update_extension<E, C, F>(
    conn: &C,
    owner: i64,
    shape: DetailShape,
    patch: F,
) -> AppResult<bool>
where
    E: CategoryExtension,
    C: ConnectionTrait + Sync,
    F: FnOnce(&mut E),
{
    let Some(mut current) = E::load(conn, owner, shape).await? else {
        tracing::debug!(owner, ?shape, "No detail row to update");
        return Ok(false);
    };
    patch(&mut current);
    current.save(conn, owner).await?;
    Ok(true)
}

