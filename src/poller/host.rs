//! Per-modem poll state.

use crate::catalog::Segment;
use crate::snmp::Session;

use super::report::ReportSink;

/// Everything the dispatcher tracks for one modem: the session, the
/// request-id currently outstanding per segment (0 = idle or complete), and
/// the report sink.
#[derive(Debug)]
pub struct HostContext {
    pub session: Session,
    pub request_ids: [i32; Segment::COUNT],
    pub sink: ReportSink,
    /// Whether this host was counted into `active_hosts` at priming.
    /// Liveness starts with the scalar batch; a host whose scalar send never
    /// went out is not expected to produce anything.
    pub live: bool,
}

impl HostContext {
    pub fn new(session: Session, sink: ReportSink) -> HostContext {
        HostContext {
            session,
            request_ids: [0; Segment::COUNT],
            sink,
            live: false,
        }
    }

    /// A host is active while any segment has a request outstanding.
    pub fn is_active(&self) -> bool {
        self.request_ids.iter().any(|&id| id != 0)
    }

    /// Drop every outstanding segment, e.g. when the host times out.
    pub fn close_all_segments(&mut self) {
        self.request_ids = [0; Segment::COUNT];
        self.session.abandon();
    }
}
