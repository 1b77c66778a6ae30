//! Inventory access layer using SQLx.
//!
//! One query per poll cycle against the configured backend, yielding the
//! ordered list of cable-modem hosts to poll. Both backends produce the same
//! record shape; cable modems are identified by the `cm-` hostname prefix
//! convention and tombstoned rows are excluded.

pub mod cacti;
pub mod nmsprime;

use anyhow::Result;

use crate::config::{Backend, DbConfig};

/// One modem to poll: where to reach it, how to authenticate, and what to
/// call its report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Transport address: an IP address or resolvable host name.
    pub transport: String,
    /// SNMPv2c read-only community string.
    pub community: String,
    /// Per-modem report file name (bulk mode); unused in analysis mode.
    pub report_name: String,
}

/// A connected inventory backend.
#[derive(Debug)]
pub enum Inventory {
    NmsPrime(sqlx::PgPool),
    Cacti(sqlx::MySqlPool),
}

impl Inventory {
    /// Connect to the selected backend. Connection failure is fatal for the
    /// poll cycle.
    pub async fn connect(backend: Backend, config: &DbConfig) -> Result<Inventory> {
        match backend {
            Backend::NmsPrime => Ok(Inventory::NmsPrime(nmsprime::connect(config).await?)),
            Backend::Cacti => Ok(Inventory::Cacti(cacti::connect(config).await?)),
        }
    }

    /// Fetch the modem list, optionally restricted to a single modem id.
    pub async fn fetch(&self, modem: Option<u32>) -> Result<Vec<HostRecord>> {
        match self {
            Inventory::NmsPrime(pool) => nmsprime::fetch(pool, modem).await,
            Inventory::Cacti(pool) => cacti::fetch(pool, modem).await,
        }
    }
}
