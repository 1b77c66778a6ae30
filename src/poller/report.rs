//! Per-modem report output.
//!
//! One line per varbinding in numeric canonical form. In bulk mode every
//! modem gets an exclusive file whose first line names the source address
//! for the downstream collector; in analysis mode everything goes to the
//! shared stdout, interleaved at line granularity.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::snmp::pdu::{oid_to_string, VarBind};

/// Where report lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Verbose catalog, shared stdout.
    Analysis,
    /// Terse catalog, one file per modem.
    Bulk,
}

/// A modem's report destination.
#[derive(Debug)]
pub enum ReportSink {
    Stdout,
    File(BufWriter<File>),
}

impl ReportSink {
    pub fn stdout() -> ReportSink {
        ReportSink::Stdout
    }

    /// Create (truncate) the per-modem report file.
    pub fn file(path: &Path) -> io::Result<ReportSink> {
        Ok(ReportSink::File(BufWriter::new(File::create(path)?)))
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        match self {
            ReportSink::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(line.as_bytes())?;
                out.write_all(b"\n")
            }
            ReportSink::File(writer) => {
                writer.write_all(line.as_bytes())?;
                writer.write_all(b"\n")
            }
        }
    }

    /// Sentinel first line identifying the source modem.
    pub fn write_address_header(&mut self, transport: &str) -> io::Result<()> {
        self.write_line(&format!("ipv4:{}", transport))
    }

    /// Append every varbinding of a response, in PDU order.
    pub fn write_varbinds(&mut self, varbinds: &[VarBind]) -> io::Result<()> {
        for vb in varbinds {
            self.write_line(&format!("{} = {}", oid_to_string(&vb.name), vb.value))?;
        }
        Ok(())
    }

    /// One line for an SNMP protocol error, naming the failing OID when the
    /// error index resolves to one.
    pub fn write_error(
        &mut self,
        peer: &str,
        oid: Option<&[u32]>,
        message: &str,
    ) -> io::Result<()> {
        let name = match oid {
            Some(oid) => oid_to_string(oid),
            None => "(none)".to_string(),
        };
        self.write_line(&format!("ERROR: {}: {}: {}", peer, name, message))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            ReportSink::Stdout => io::stdout().flush(),
            ReportSink::File(writer) => writer.flush(),
        }
    }
}
