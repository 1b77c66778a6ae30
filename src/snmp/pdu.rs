//! SNMPv2c message and PDU model.
//!
//! A community-string message wrapping one PDU; values carry the SMIv2 type
//! palette. Rendering follows the numeric canonical form the downstream
//! collector consumes: numeric OIDs, numeric timeticks, unbounded hex width.

use std::fmt;

use super::ber::{self, Reader};
use super::SnmpError;

/// SNMPv2c version field value.
pub const VERSION_2C: i64 = 1;

/// PDU type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduType {
    Get,
    GetNext,
    Response,
    GetBulk,
}

impl PduType {
    pub fn tag(self) -> u8 {
        match self {
            PduType::Get => 0xa0,
            PduType::GetNext => 0xa1,
            PduType::Response => 0xa2,
            PduType::GetBulk => 0xa5,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, SnmpError> {
        match tag {
            0xa0 => Ok(PduType::Get),
            0xa1 => Ok(PduType::GetNext),
            0xa2 => Ok(PduType::Response),
            0xa5 => Ok(PduType::GetBulk),
            other => Err(SnmpError::UnsupportedPduType(other)),
        }
    }
}

/// A decoded variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    OctetString(Vec<u8>),
    Null,
    ObjectId(Vec<u32>),
    IpAddress([u8; 4]),
    Counter32(u32),
    Gauge32(u32),
    TimeTicks(u32),
    Opaque(Vec<u8>),
    Counter64(u64),
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

/// One `(name, value)` binding in a PDU.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBind {
    pub name: Vec<u32>,
    pub value: Value,
}

impl VarBind {
    pub fn null(name: Vec<u32>) -> Self {
        VarBind { name, value: Value::Null }
    }
}

/// One SNMP PDU.
///
/// For GETBULK the `error_status` field carries non-repeaters and
/// `error_index` carries max-repetitions, as on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    pub kind: PduType,
    pub request_id: i32,
    pub error_status: i32,
    pub error_index: i32,
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    /// A GETNEXT over the given column set.
    pub fn get_next(oids: Vec<Vec<u32>>) -> Pdu {
        Pdu {
            kind: PduType::GetNext,
            request_id: 0,
            error_status: 0,
            error_index: 0,
            varbinds: oids.into_iter().map(VarBind::null).collect(),
        }
    }

    /// A GETBULK with `non-repeaters = 0` over the given column set.
    pub fn get_bulk(max_repetitions: u32, oids: Vec<Vec<u32>>) -> Pdu {
        Pdu {
            kind: PduType::GetBulk,
            request_id: 0,
            error_status: 0,
            error_index: max_repetitions as i32,
            varbinds: oids.into_iter().map(VarBind::null).collect(),
        }
    }

    /// A response to `request_id` carrying the given bindings.
    pub fn response(request_id: i32, varbinds: Vec<VarBind>) -> Pdu {
        Pdu {
            kind: PduType::Response,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds,
        }
    }

    /// GETBULK max-repetitions view of the on-wire field.
    pub fn max_repetitions(&self) -> u32 {
        self.error_index.max(0) as u32
    }

    /// Encode as a complete SNMPv2c message.
    pub fn encode(&self, community: &str) -> Vec<u8> {
        let mut varbind_list = Vec::new();
        for vb in &self.varbinds {
            let mut binding = Vec::new();
            ber::write_oid(&mut binding, &vb.name);
            encode_value(&mut binding, &vb.value);
            ber::write_tlv(&mut varbind_list, ber::TAG_SEQUENCE, &binding);
        }

        let mut pdu = Vec::new();
        ber::write_integer(&mut pdu, self.request_id as i64);
        ber::write_integer(&mut pdu, self.error_status as i64);
        ber::write_integer(&mut pdu, self.error_index as i64);
        ber::write_tlv(&mut pdu, ber::TAG_SEQUENCE, &varbind_list);

        let mut message = Vec::new();
        ber::write_integer(&mut message, VERSION_2C);
        ber::write_tlv(&mut message, ber::TAG_OCTET_STRING, community.as_bytes());
        ber::write_tlv(&mut message, self.kind.tag(), &pdu);

        let mut datagram = Vec::new();
        ber::write_tlv(&mut datagram, ber::TAG_SEQUENCE, &message);
        datagram
    }

    /// Decode a datagram into `(community, pdu)`.
    pub fn decode(datagram: &[u8]) -> Result<(Vec<u8>, Pdu), SnmpError> {
        let mut outer = Reader::new(datagram);
        let message = outer.expect(ber::TAG_SEQUENCE)?;

        let mut r = Reader::new(message);
        let version = r.integer()?;
        if version != VERSION_2C {
            return Err(SnmpError::UnsupportedVersion(version));
        }
        let community = r.octet_string()?.to_vec();
        let (pdu_tag, pdu_content) = r.tlv()?;
        let kind = PduType::from_tag(pdu_tag)?;

        let mut r = Reader::new(pdu_content);
        let request_id = r.integer()? as i32;
        let error_status = r.integer()? as i32;
        let error_index = r.integer()? as i32;
        let varbind_list = r.expect(ber::TAG_SEQUENCE)?;

        let mut varbinds = Vec::new();
        let mut r = Reader::new(varbind_list);
        while !r.is_empty() {
            let binding = r.expect(ber::TAG_SEQUENCE)?;
            let mut vr = Reader::new(binding);
            let name = vr.oid()?;
            let (tag, content) = vr.tlv()?;
            let value = decode_value(tag, content)?;
            varbinds.push(VarBind { name, value });
        }

        Ok((community, Pdu { kind, request_id, error_status, error_index, varbinds }))
    }
}

fn encode_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(v) => ber::write_integer(out, *v),
        Value::OctetString(bytes) => ber::write_tlv(out, ber::TAG_OCTET_STRING, bytes),
        Value::Null => ber::write_tlv(out, ber::TAG_NULL, &[]),
        Value::ObjectId(oid) => ber::write_oid(out, oid),
        Value::IpAddress(octets) => ber::write_tlv(out, ber::TAG_IP_ADDRESS, octets),
        Value::Counter32(v) => ber::write_unsigned(out, ber::TAG_COUNTER32, *v as u64),
        Value::Gauge32(v) => ber::write_unsigned(out, ber::TAG_GAUGE32, *v as u64),
        Value::TimeTicks(v) => ber::write_unsigned(out, ber::TAG_TIMETICKS, *v as u64),
        Value::Opaque(bytes) => ber::write_tlv(out, ber::TAG_OPAQUE, bytes),
        Value::Counter64(v) => ber::write_unsigned(out, ber::TAG_COUNTER64, *v),
        Value::NoSuchObject => ber::write_tlv(out, ber::TAG_NO_SUCH_OBJECT, &[]),
        Value::NoSuchInstance => ber::write_tlv(out, ber::TAG_NO_SUCH_INSTANCE, &[]),
        Value::EndOfMibView => ber::write_tlv(out, ber::TAG_END_OF_MIB_VIEW, &[]),
    }
}

fn decode_value(tag: u8, content: &[u8]) -> Result<Value, SnmpError> {
    Ok(match tag {
        ber::TAG_INTEGER => Value::Integer(ber::decode_integer(content)?),
        ber::TAG_OCTET_STRING => Value::OctetString(content.to_vec()),
        ber::TAG_NULL => Value::Null,
        ber::TAG_OBJECT_ID => Value::ObjectId(ber::decode_oid(content)?),
        ber::TAG_IP_ADDRESS => {
            if content.len() != 4 {
                return Err(SnmpError::BadLength(0));
            }
            Value::IpAddress([content[0], content[1], content[2], content[3]])
        }
        ber::TAG_COUNTER32 => Value::Counter32(ber::decode_unsigned(content)? as u32),
        ber::TAG_GAUGE32 => Value::Gauge32(ber::decode_unsigned(content)? as u32),
        ber::TAG_TIMETICKS => Value::TimeTicks(ber::decode_unsigned(content)? as u32),
        ber::TAG_OPAQUE => Value::Opaque(content.to_vec()),
        ber::TAG_COUNTER64 => Value::Counter64(ber::decode_unsigned(content)?),
        ber::TAG_NO_SUCH_OBJECT => Value::NoSuchObject,
        ber::TAG_NO_SUCH_INSTANCE => Value::NoSuchInstance,
        ber::TAG_END_OF_MIB_VIEW => Value::EndOfMibView,
        other => return Err(SnmpError::UnexpectedTag { tag: other, offset: 0 }),
    })
}

/// Render an OID in dotted numeric form with a leading dot.
pub fn oid_to_string(oid: &[u32]) -> String {
    let mut out = String::new();
    for sub in oid {
        out.push('.');
        out.push_str(&sub.to_string());
    }
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "INTEGER: {}", v),
            Value::OctetString(bytes) => {
                if is_printable(bytes) {
                    write!(f, "STRING: \"{}\"", String::from_utf8_lossy(bytes))
                } else {
                    write!(f, "Hex-STRING: {}", hex_string(bytes))
                }
            }
            Value::Null => write!(f, "NULL"),
            Value::ObjectId(oid) => write!(f, "OID: {}", oid_to_string(oid)),
            Value::IpAddress(o) => {
                write!(f, "IpAddress: {}.{}.{}.{}", o[0], o[1], o[2], o[3])
            }
            Value::Counter32(v) => write!(f, "Counter32: {}", v),
            Value::Gauge32(v) => write!(f, "Gauge32: {}", v),
            Value::TimeTicks(v) => write!(f, "Timeticks: {}", v),
            Value::Opaque(bytes) => write!(f, "OPAQUE: {}", hex_string(bytes)),
            Value::Counter64(v) => write!(f, "Counter64: {}", v),
            Value::NoSuchObject => {
                write!(f, "No Such Object available on this agent at this OID")
            }
            Value::NoSuchInstance => {
                write!(f, "No Such Instance currently exists at this OID")
            }
            Value::EndOfMibView => write!(
                f,
                "No more variables left in this MIB View (It is past the end of the MIB tree)"
            ),
        }
    }
}

fn is_printable(bytes: &[u8]) -> bool {
    !bytes.is_empty()
        && bytes
            .iter()
            .all(|&b| b == b'\t' || b == b'\n' || b == b'\r' || (0x20..0x7f).contains(&b))
}

fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for b in bytes {
        out.push_str(&format!("{:02X} ", b));
    }
    out.pop();
    out
}

/// Protocol error-status names and explanations, per the standard table.
pub fn error_message(status: i32) -> &'static str {
    const MESSAGES: &[&str] = &[
        "(noError) No Error",
        "(tooBig) Response message would have been too large.",
        "(noSuchName) There is no such variable name in this MIB.",
        "(badValue) The value given has the wrong type or length.",
        "(readOnly) The two parties used do not have access to use the specified SNMP PDU.",
        "(genError) A general failure occured",
        "noAccess",
        "wrongType (The set datatype does not match the data type the agent expects)",
        "wrongLength (The set value has an illegal length from what the agent expects)",
        "wrongEncoding",
        "wrongValue (The set value is illegal or unsupported in some way)",
        "noCreation (That table does not support row creation or that object can not ever be created)",
        "inconsistentValue (The set value is illegal or unsupported in some way)",
        "resourceUnavailable (This is likely a out-of-memory failure within the agent)",
        "commitFailed",
        "undoFailed",
        "authorizationError (access denied to that object)",
        "notWritable (That object does not support modification)",
        "inconsistentName (That object can not currently be created)",
    ];
    usize::try_from(status)
        .ok()
        .and_then(|ix| MESSAGES.get(ix))
        .copied()
        .unwrap_or("Unknown Error")
}
