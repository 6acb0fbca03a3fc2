use anyhow::Context;

use crate::DatabaseChoice;

pub fn check() -> anyhow::Result<()> {
    let config = spanwright_core::load_secure_config().context("configuration check failed")?;
    println!("✓ {}", config.summary());
    Ok(())
}

pub fn dsn(database: DatabaseChoice) -> anyhow::Result<()> {
    let config = spanwright_core::load_secure_config()?;
    let db = match database {
        DatabaseChoice::Primary => config.primary_database(),
        DatabaseChoice::Secondary => config
            .secondary_database()
            .context("SECONDARY_DATABASE_ID is not set")?,
    };
    println!("{}", db.resource_path()?);
    Ok(())
}
