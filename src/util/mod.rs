//! Utility functions shared across the application.

pub mod dns;

use nix::sys::resource::{setrlimit, Resource};
use tracing::warn;

/// Open-file limit requested for a full-fleet cycle: one socket per modem
/// plus one report file per modem.
const NOFILE_LIMIT: u64 = 1024 * 1024;

/// Raise the open-file rlimit, soft and hard. Failure is survivable; small
/// fleets fit in the default limit.
pub fn raise_nofile_limit() {
    if let Err(e) = setrlimit(Resource::RLIMIT_NOFILE, NOFILE_LIMIT, NOFILE_LIMIT) {
        warn!(error = %e, "cannot raise open-file limit; superuser privileges are needed");
        warn!("polling more than ~1000 modems will likely exhaust file descriptors");
    }
}
