//! Unit tests for the report writer.

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use modempoller::poller::ReportSink;
use modempoller::snmp::pdu::{Value, VarBind};

// ==================== File Sink Tests ====================

#[test]
fn test_file_sink_writes_canonical_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cm-1.example.net");

    let mut sink = ReportSink::file(&path).unwrap();
    sink.write_address_header("10.0.0.17").unwrap();
    sink.write_varbinds(&[
        VarBind {
            name: vec![1, 3, 6, 1, 2, 1, 1, 1, 0],
            value: Value::OctetString(b"cable modem".to_vec()),
        },
        VarBind {
            name: vec![1, 3, 6, 1, 2, 1, 1, 3, 0],
            value: Value::TimeTicks(4242),
        },
    ])
    .unwrap();
    sink.flush().unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(
        contents,
        "ipv4:10.0.0.17\n\
         .1.3.6.1.2.1.1.1.0 = STRING: \"cable modem\"\n\
         .1.3.6.1.2.1.1.3.0 = Timeticks: 4242\n"
    );
}

#[test]
fn test_file_sink_appends_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cm-2.example.net");

    let mut sink = ReportSink::file(&path).unwrap();
    for i in 0..5 {
        sink.write_varbinds(&[VarBind {
            name: vec![1, 3, 6, 1, 9, 1, i],
            value: Value::Integer(i as i64),
        }])
        .unwrap();
    }
    sink.flush().unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 5);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(*line, format!(".1.3.6.1.9.1.{} = INTEGER: {}", i, i));
    }
}

#[test]
fn test_file_sink_truncates_previous_report() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cm-3.example.net");
    fs::write(&path, "stale data from last cycle\n").unwrap();

    let mut sink = ReportSink::file(&path).unwrap();
    sink.write_address_header("10.0.0.3").unwrap();
    sink.flush().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "ipv4:10.0.0.3\n");
}

// ==================== Error Line Tests ====================

#[test]
fn test_error_line_names_failing_oid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cm-4.example.net");

    let mut sink = ReportSink::file(&path).unwrap();
    sink.write_error(
        "10.0.0.4",
        Some(&[1, 3, 6, 1, 2, 1, 10, 127, 1, 1, 2, 1, 3]),
        "(genError) A general failure occured",
    )
    .unwrap();
    sink.flush().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "ERROR: 10.0.0.4: .1.3.6.1.2.1.10.127.1.1.2.1.3: (genError) A general failure occured\n"
    );
}

#[test]
fn test_error_line_without_resolvable_oid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cm-5.example.net");

    let mut sink = ReportSink::file(&path).unwrap();
    sink.write_error("10.0.0.5", None, "(tooBig) Response message would have been too large.")
        .unwrap();
    sink.flush().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "ERROR: 10.0.0.5: (none): (tooBig) Response message would have been too large.\n"
    );
}
