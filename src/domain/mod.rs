//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.
//!
//! Participants and visits are modelled as a master record plus a closed
//! tagged union of category-specific details; every category is handled by
//! exhaustive matching on [`Kategori`].

/// Copy every `Some` field of a flat partial record onto a detail struct.
/// `opt` targets are `Option<T>` fields, `flag` targets are plain `bool`s.
macro_rules! overwrite_present {
    ($target:expr, $patch:expr; opt: [$($opt:ident),* $(,)?]; flag: [$($flag:ident),* $(,)?]) => {{
        $(
            if let Some(value) = &$patch.$opt {
                $target.$opt = Some(value.clone());
            }
        )*
        $(
            if let Some(value) = $patch.$flag {
                $target.$flag = value;
            }
        )*
    }};
}

/// Declares a closed enum stored and serialized as fixed strings.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq,
            ::serde::Serialize, ::serde::Deserialize, ::utoipa::ToSchema,
        )]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self { $($name::$variant => $text),+ }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::errors::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::errors::AppError::internal(format!(
                        concat!("unknown ", stringify!($name), " value {}"),
                        other
                    ))),
                }
            }
        }
    };
}

pub mod complaint;
pub mod identifier;
pub mod kategori;
pub mod lockout;
pub mod nik;
pub mod participant;
pub mod password;
pub mod report;
pub mod user;
pub mod visit;

pub use complaint::{
    Complaint, ComplaintCategory, ComplaintDetails, ComplaintListItem, ComplaintQuery,
    ComplaintResponse, ComplaintStats, ComplaintStatus, NewComplaint, Priority, UserRef,
};
pub use identifier::LoginIdentifier;
pub use kategori::{DetailShape, JenisKelamin, Kategori};
pub use lockout::{FailureOutcome, LockoutPolicy, LoginState};
pub use nik::{hash_nik, Nik};
pub use participant::{
    ExtensionFields, NewParticipant, Participant, ParticipantDetails, ParticipantExtension,
    ParticipantPatch, ParticipantQuery, ParticipantSort, ParticipantSummary, SortOrder,
};
pub use password::Password;
pub use report::{CategoryCounts, DashboardStats, MonthlyRegistrations, MonthlyVisits};
pub use user::{CurrentUser, NewUser, ProfileUpdate, User, UserResponse, UserRole};
pub use visit::{
    LatestVisit, Lokasi, NewVisit, ParticipantRef, Visit, VisitDetail, VisitDetailFields,
    VisitDetails, VisitPatch, VisitQuery,
};
