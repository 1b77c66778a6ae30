//! Modempoller - DOCSIS cable modem fleet poller
//!
//! Polls a fleet of DOCSIS cable modems over SNMPv2c for a fixed catalog of
//! operational metrics (system info, downstream/upstream channel tables,
//! DOCSIS 3.0/3.1 variants, OFDM sub-carrier and per-profile statistics) and
//! writes per-modem textual reports for an external time-series collector.
//! The modem set comes from a relational inventory database queried once at
//! start-up.

pub mod catalog;
pub mod config;
pub mod db;
pub mod poller;
pub mod snmp;
pub mod util;

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
