//! Cacti inventory adapter (MySQL).
//!
//! Cacti keeps the polled host list in its `host` table; cable modems are
//! the rows whose hostname carries the `cm-` prefix. The hostname doubles as
//! the report name.

use anyhow::{Context, Result};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::Row;
use tracing::info;

use crate::config::DbConfig;

use super::HostRecord;

pub async fn connect(config: &DbConfig) -> Result<MySqlPool> {
    info!("connecting to Cacti database {} on {}", config.name, config.host);

    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .username(&config.user)
        .password(&config.pass)
        .database(&config.name);

    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to database at {}", config.host))?;

    Ok(pool)
}

pub async fn fetch(pool: &MySqlPool, modem: Option<u32>) -> Result<Vec<HostRecord>> {
    let rows = match modem {
        Some(id) => {
            sqlx::query(
                "SELECT hostname, snmp_community FROM host WHERE hostname = ? ORDER BY hostname",
            )
            .bind(format!("cm-{}", id))
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(
                "SELECT hostname, snmp_community FROM host WHERE hostname LIKE 'cm-%' ORDER BY hostname",
            )
            .fetch_all(pool)
            .await
        }
    }
    .context("modem inventory query failed")?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let hostname: String = row.try_get(0)?;
        records.push(HostRecord {
            transport: hostname.clone(),
            community: row.try_get(1)?,
            report_name: hostname,
        });
    }

    info!("inventory returned {} modems", records.len());
    Ok(records)
}
