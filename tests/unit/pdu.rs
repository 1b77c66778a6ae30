//! Unit tests for the SNMPv2c codec and canonical rendering.

use pretty_assertions::assert_eq;

use modempoller::snmp::pdu::{error_message, oid_to_string, Pdu, PduType, Value, VarBind};

fn roundtrip(pdu: &Pdu, community: &str) -> Pdu {
    let datagram = pdu.encode(community);
    let (decoded_community, decoded) = Pdu::decode(&datagram).expect("decode");
    assert_eq!(decoded_community, community.as_bytes());
    decoded
}

// ==================== Codec Roundtrip Tests ====================

#[test]
fn test_getnext_roundtrip() {
    let mut pdu = Pdu::get_next(vec![
        vec![1, 3, 6, 1, 2, 1, 1, 1],
        vec![1, 3, 6, 1, 2, 1, 1, 3],
    ]);
    pdu.request_id = 12345;
    let decoded = roundtrip(&pdu, "public");
    assert_eq!(decoded.kind, PduType::GetNext);
    assert_eq!(decoded.request_id, 12345);
    assert_eq!(decoded.varbinds.len(), 2);
    assert_eq!(decoded.varbinds[0].value, Value::Null);
}

#[test]
fn test_getbulk_roundtrip_carries_repetitions() {
    let mut pdu = Pdu::get_bulk(
        9,
        vec![
            vec![1, 3, 6, 1, 2, 1, 10, 127, 1, 1, 1, 1, 2],
            vec![1, 3, 6, 1, 2, 1, 10, 127, 1, 1, 1, 1, 6],
        ],
    );
    pdu.request_id = -77;
    let decoded = roundtrip(&pdu, "community");
    assert_eq!(decoded.kind, PduType::GetBulk);
    assert_eq!(decoded.request_id, -77);
    assert_eq!(decoded.error_status, 0, "non-repeaters");
    assert_eq!(decoded.max_repetitions(), 9);
}

#[test]
fn test_response_roundtrip_all_value_types() {
    let varbinds = vec![
        VarBind { name: vec![1, 3, 6, 1, 1], value: Value::Integer(-42) },
        VarBind {
            name: vec![1, 3, 6, 1, 2],
            value: Value::OctetString(b"hello modem".to_vec()),
        },
        VarBind { name: vec![1, 3, 6, 1, 3], value: Value::Null },
        VarBind {
            name: vec![1, 3, 6, 1, 4],
            value: Value::ObjectId(vec![1, 3, 6, 1, 4, 1, 4491, 2, 1]),
        },
        VarBind { name: vec![1, 3, 6, 1, 5], value: Value::IpAddress([10, 0, 0, 1]) },
        VarBind { name: vec![1, 3, 6, 1, 6], value: Value::Counter32(u32::MAX) },
        VarBind { name: vec![1, 3, 6, 1, 7], value: Value::Gauge32(2_147_483_648) },
        VarBind { name: vec![1, 3, 6, 1, 8], value: Value::TimeTicks(123_456_789) },
        VarBind { name: vec![1, 3, 6, 1, 9], value: Value::Counter64(u64::MAX) },
        VarBind { name: vec![1, 3, 6, 1, 10], value: Value::EndOfMibView },
    ];
    let pdu = Pdu::response(99, varbinds.clone());
    let decoded = roundtrip(&pdu, "public");
    assert_eq!(decoded.varbinds, varbinds);
}

#[test]
fn test_large_message_long_form_lengths() {
    // Force content past the short-form length limit.
    let varbinds = vec![VarBind {
        name: vec![1, 3, 6, 1, 4, 1, 4491, 2, 1, 28, 1, 10, 1, 3],
        value: Value::OctetString(vec![0xAB; 600]),
    }];
    let pdu = Pdu::response(7, varbinds.clone());
    let decoded = roundtrip(&pdu, "public");
    assert_eq!(decoded.varbinds, varbinds);
}

#[test]
fn test_error_fields_roundtrip() {
    let mut pdu = Pdu::response(5, vec![VarBind::null(vec![1, 3, 6, 1])]);
    pdu.error_status = 5;
    pdu.error_index = 2;
    let decoded = roundtrip(&pdu, "public");
    assert_eq!(decoded.error_status, 5);
    assert_eq!(decoded.error_index, 2);
}

#[test]
fn test_decode_rejects_truncated() {
    let pdu = Pdu::get_next(vec![vec![1, 3, 6, 1, 2, 1, 1, 1]]);
    let datagram = pdu.encode("public");
    assert!(Pdu::decode(&datagram[..datagram.len() - 3]).is_err());
    assert!(Pdu::decode(&[]).is_err());
}

#[test]
fn test_decode_rejects_v1() {
    // Same message with the version integer patched to 0 (SNMPv1).
    let pdu = Pdu::get_next(vec![vec![1, 3, 6, 1]]);
    let mut datagram = pdu.encode("public");
    // Outer sequence header is 2 bytes, version TLV is 02 01 xx.
    assert_eq!(datagram[2..4], [0x02, 0x01]);
    datagram[4] = 0;
    assert!(Pdu::decode(&datagram).is_err());
}

// ==================== Rendering Tests ====================

#[test]
fn test_oid_to_string_leading_dot() {
    assert_eq!(oid_to_string(&[1, 3, 6, 1, 2, 1, 1, 1, 0]), ".1.3.6.1.2.1.1.1.0");
}

#[test]
fn test_display_integer() {
    assert_eq!(Value::Integer(-7).to_string(), "INTEGER: -7");
}

#[test]
fn test_display_printable_string() {
    let value = Value::OctetString(b"DOCSIS 3.1 cable modem".to_vec());
    assert_eq!(value.to_string(), "STRING: \"DOCSIS 3.1 cable modem\"");
}

#[test]
fn test_display_binary_string_as_hex() {
    let value = Value::OctetString(vec![0x00, 0x1a, 0xff]);
    assert_eq!(value.to_string(), "Hex-STRING: 00 1A FF");
}

#[test]
fn test_display_numeric_timeticks() {
    assert_eq!(Value::TimeTicks(232_919_924).to_string(), "Timeticks: 232919924");
}

#[test]
fn test_display_counters_and_address() {
    assert_eq!(Value::Counter32(9).to_string(), "Counter32: 9");
    assert_eq!(Value::Counter64(18_446_744_073_709_551_615).to_string(),
        "Counter64: 18446744073709551615");
    assert_eq!(Value::Gauge32(300).to_string(), "Gauge32: 300");
    assert_eq!(Value::IpAddress([192, 168, 100, 1]).to_string(), "IpAddress: 192.168.100.1");
}

#[test]
fn test_display_oid_value() {
    assert_eq!(
        Value::ObjectId(vec![1, 3, 6, 1, 4, 1, 4491]).to_string(),
        "OID: .1.3.6.1.4.1.4491"
    );
}

#[test]
fn test_display_exceptions() {
    assert!(Value::NoSuchObject.to_string().contains("No Such Object"));
    assert!(Value::NoSuchInstance.to_string().contains("No Such Instance"));
    assert!(Value::EndOfMibView.to_string().contains("past the end of the MIB tree"));
}

// ==================== Error String Tests ====================

#[test]
fn test_error_message_gen_err() {
    assert_eq!(error_message(5), "(genError) A general failure occured");
}

#[test]
fn test_error_message_no_error() {
    assert_eq!(error_message(0), "(noError) No Error");
}

#[test]
fn test_error_message_out_of_range() {
    assert_eq!(error_message(99), "Unknown Error");
    assert_eq!(error_message(-1), "Unknown Error");
}
