//! Accounts table schema

use sqlx::PgPool;

/// Create the accounts table if it does not exist yet
pub const CREATE_ACCOUNTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id VARCHAR(255) PRIMARY KEY,
        balance DECIMAL(10, 2) NOT NULL CHECK (balance >= 0)
    )
"#;

/// Ensure the ledger schema exists.
///
/// Safe to run on every start. Errors are returned to the caller untouched:
/// a store that cannot hold the table must stop startup.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing ledger schema...");

    sqlx::query(CREATE_ACCOUNTS_TABLE).execute(pool).await?;

    tracing::info!("Ledger schema ready");
    Ok(())
}
