//! NmsPrime inventory adapter (PostgreSQL).
//!
//! Modems live in the `nmsprime` schema; a modem row joins against
//! `provbase` for the shared domain name and read-only community. Soft
//! deleted rows carry a `deleted_at` timestamp and are skipped.

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::info;

use crate::config::DbConfig;

use super::HostRecord;

pub async fn connect(config: &DbConfig) -> Result<PgPool> {
    info!("connecting to NmsPrime database {} on {}", config.name, config.host);

    let options = PgConnectOptions::new()
        .host(&config.host)
        .username(&config.user)
        .password(&config.pass)
        .database(&config.name)
        .options([("search_path", "nmsprime")]);

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to database at {}", config.host))?;

    Ok(pool)
}

pub async fn fetch(pool: &PgPool, modem: Option<u32>) -> Result<Vec<HostRecord>> {
    let rows = match modem {
        Some(id) => {
            sqlx::query(
                r#"SELECT CONCAT(modem.hostname, '.', provbase.domain_name),
                          provbase.ro_community,
                          CONCAT(modem.hostname, '.', provbase.domain_name)
                   FROM modem, provbase
                   WHERE modem.deleted_at IS NULL
                     AND provbase.deleted_at IS NULL
                     AND modem.hostname = $1"#,
            )
            .bind(format!("cm-{}", id))
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(
                r#"SELECT COALESCE(host(modem.ipv4), CONCAT(modem.hostname, '.', provbase.domain_name)),
                          provbase.ro_community,
                          CONCAT(modem.hostname, '.', provbase.domain_name)
                   FROM modem, provbase
                   WHERE modem.deleted_at IS NULL
                     AND provbase.deleted_at IS NULL
                     AND modem.hostname LIKE 'cm-%'"#,
            )
            .fetch_all(pool)
            .await
        }
    }
    .context("modem inventory query failed")?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        records.push(HostRecord {
            transport: row.try_get(0)?,
            community: row.try_get(1)?,
            report_name: row.try_get(2)?,
        });
    }

    info!("inventory returned {} modems", records.len());
    Ok(records)
}
