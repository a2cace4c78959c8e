//! Seed command - Administrator account bootstrap.

use std::sync::Arc;

use crate::cli::args::SeedAdminArgs;
use crate::config::Config;
use crate::domain::{NewUser, Nik, Password, UserRole};
use crate::errors::AppResult;
use crate::infra::{Database, FieldCipher, Persistence, UnitOfWork};

/// Execute the seed-admin command.
///
/// Re-running it against an existing email only resets that account's password.
pub async fn execute(args: SeedAdminArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let uow = Arc::new(Persistence::new(
        db.get_connection(),
        FieldCipher::new(config.field_encryption_key()),
    ));

    let email = args.email.trim().to_lowercase();
    let password_hash = Password::new(&args.password)?.into_string();
    let users = uow.users();

    if let Some(existing) = users.find_by_email(&email).await? {
        users.update_password(existing.id, password_hash).await?;
        tracing::info!(user_id = %existing.id, email = %email, "Administrator password reset");
        return Ok(());
    }

    let nik = Nik::parse(&args.nik)?;
    let admin = users
        .create(NewUser {
            name: args.name,
            email,
            password_hash,
            role: UserRole::Admin,
            nik: nik.as_str().to_string(),
            nik_hash: nik.hash(),
            phone_number: Some(args.phone_number),
        })
        .await?;

    tracing::info!(user_id = %admin.id, email = %admin.email, "Administrator created");
    Ok(())
}
