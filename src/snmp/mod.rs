//! SNMPv2c wire layer.
//!
//! A self-contained codec and session layer: BER primitives, the SNMPv2c
//! message/PDU model, and a per-host session with request-id correlation and
//! retransmission. The poller core drives sessions through an event loop and
//! never touches the encoding directly.

pub mod ber;
pub mod pdu;
pub mod session;

pub use pdu::{error_message, oid_to_string, Pdu, PduType, Value, VarBind};
pub use session::{Session, SNMP_PORT};

/// Wire-layer failures: socket errors and malformed BER.
#[derive(Debug, thiserror::Error)]
pub enum SnmpError {
    #[error("truncated BER element at offset {0}")]
    Truncated(usize),
    #[error("bad BER length at offset {0}")]
    BadLength(usize),
    #[error("unexpected tag {tag:#04x} at offset {offset}")]
    UnexpectedTag { tag: u8, offset: usize },
    #[error("integer out of range")]
    IntegerRange,
    #[error("malformed object identifier")]
    MalformedOid,
    #[error("unsupported PDU type {0:#04x}")]
    UnsupportedPduType(u8),
    #[error("unsupported SNMP version {0}")]
    UnsupportedVersion(i64),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
