//! Custom request extractors that report failures in the error envelope.

mod query;
mod validated_json;

pub use query::QueryParams;
pub use validated_json::{into_app_error, ValidatedJson};
