//! Posyandu API - record keeping for community health posts.
//!
//! Kader (volunteers) and admins register participants across six life-stage
//! categories, record visits with category-specific examination data, handle
//! complaint tickets and read dashboard aggregates.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and rules
//! - **services**: Use cases over the unit of work
//! - **infra**: Database, Redis, encryption and file storage
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Create the administrator account
//! cargo run -- seed-admin --email admin@posyandu.id
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Kategori, Nik, Password, User, UserRole};
pub use errors::{AppError, AppResult};
