//! Runtime settings from the environment plus the fixed limits the
//! services enforce (paging, lockout, rate limits, upload sizes).

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
