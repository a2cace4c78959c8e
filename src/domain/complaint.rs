//! Complaint (pengaduan) ticket aggregate with images and an admin reply thread.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::CurrentUser;
use crate::errors::{AppError, AppResult};

string_enum!(
    /// What the complaint is about.
    ComplaintCategory {
        Error => "error",
        Tampilan => "tampilan",
        Data => "data",
        Performa => "performa",
        Lainnya => "lainnya",
    }
);

string_enum!(
    Priority { Rendah => "rendah", Sedang => "sedang", Tinggi => "tinggi" }
);

string_enum!(
    /// Ticket state. Any state may move to any other.
    ComplaintStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Resolved => "resolved",
        Rejected => "rejected",
    }
);

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
        ComplaintStatus::Rejected,
    ];
}

/// Complaint master record.
#[derive(Debug, Clone, Serialize)]
pub struct Complaint {
    pub id: i64,
    pub user_id: Uuid,
    pub kategori: ComplaintCategory,
    pub prioritas: Priority,
    pub judul: String,
    pub deskripsi: String,
    pub langkah_reproduksi: Option<String>,
    pub browser_info: Option<String>,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// Admins see every ticket; everyone else only their own.
    pub fn ensure_visible_to(&self, actor: &CurrentUser) -> AppResult<()> {
        if actor.is_admin() || self.user_id == actor.id {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub kategori: ComplaintCategory,
    pub prioritas: Priority,
    pub judul: String,
    pub deskripsi: String,
    pub langkah_reproduksi: Option<String>,
    pub browser_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
}

/// One admin reply.
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintResponse {
    pub id: i64,
    pub admin: Option<UserRef>,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

/// Row of the complaint listing.
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintListItem {
    #[serde(flatten)]
    pub complaint: Complaint,
    pub user: Option<UserRef>,
    pub images: Vec<String>,
    pub responses_count: u64,
}

/// Complaint with images and the reply thread, oldest reply first.
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintDetails {
    #[serde(flatten)]
    pub complaint: Complaint,
    pub user: Option<UserRef>,
    pub images: Vec<String>,
    pub responses: Vec<ComplaintResponse>,
}

/// Listing filters. `owner` is forced for non-admin callers.
#[derive(Debug, Clone, Default)]
pub struct ComplaintQuery {
    pub owner: Option<Uuid>,
    pub status: Option<ComplaintStatus>,
    pub kategori: Option<ComplaintCategory>,
    pub search: Option<String>,
}

impl ComplaintQuery {
    /// Restrict the query to what `actor` may see.
    pub fn scoped_to(mut self, actor: &CurrentUser) -> Self {
        if !actor.is_admin() {
            self.owner = Some(actor.id);
        }
        self
    }
}

/// Ticket counts per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ComplaintStats {
    pub pending: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub rejected: u64,
    pub total: u64,
}

impl ComplaintStats {
    pub fn from_counts(counts: impl IntoIterator<Item = (ComplaintStatus, u64)>) -> Self {
        let mut stats = Self::default();
        for (status, count) in counts {
            match status {
                ComplaintStatus::Pending => stats.pending += count,
                ComplaintStatus::InProgress => stats.in_progress += count,
                ComplaintStatus::Resolved => stats.resolved += count,
                ComplaintStatus::Rejected => stats.rejected += count,
            }
            stats.total += count;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;

    fn actor(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "kader@posyandu.id".into(),
            role,
            token_id: Uuid::new_v4(),
        }
    }

    fn complaint(owner: Uuid) -> Complaint {
        Complaint {
            id: 1,
            user_id: owner,
            kategori: ComplaintCategory::Error,
            prioritas: Priority::Tinggi,
            judul: "Gagal simpan".into(),
            deskripsi: "Tombol simpan tidak merespon".into(),
            langkah_reproduksi: None,
            browser_info: None,
            status: ComplaintStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn kader_sees_only_own_tickets() {
        let kader = actor(UserRole::Kader);
        assert!(complaint(kader.id).ensure_visible_to(&kader).is_ok());
        assert!(matches!(
            complaint(Uuid::new_v4()).ensure_visible_to(&kader),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn admin_sees_everything() {
        let admin = actor(UserRole::Admin);
        assert!(complaint(Uuid::new_v4()).ensure_visible_to(&admin).is_ok());
        assert_eq!(ComplaintQuery::default().scoped_to(&admin).owner, None);
    }

    #[test]
    fn listing_is_scoped_for_kader() {
        let kader = actor(UserRole::Kader);
        let query = ComplaintQuery {
            owner: Some(Uuid::new_v4()),
            ..Default::default()
        }
        .scoped_to(&kader);
        assert_eq!(query.owner, Some(kader.id));
    }

    #[test]
    fn stats_sum_to_total() {
        let stats = ComplaintStats::from_counts([
            (ComplaintStatus::Pending, 3),
            (ComplaintStatus::Resolved, 2),
            (ComplaintStatus::Rejected, 1),
        ]);
        assert_eq!(
            stats,
            ComplaintStats {
                pending: 3,
                in_progress: 0,
                resolved: 2,
                rejected: 1,
                total: 6
            }
        );
    }

    #[test]
    fn status_strings_match_storage() {
        assert_eq!(ComplaintStatus::InProgress.as_str(), "in_progress");
        assert_eq!(
            "resolved".parse::<ComplaintStatus>().unwrap(),
            ComplaintStatus::Resolved
        );
    }
}
