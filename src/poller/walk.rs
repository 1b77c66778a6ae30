//! Segment walk state machine.
//!
//! Decides, for each response, which segment it answers, whether that
//! segment's table walk is finished, and what the follow-up GETBULK looks
//! like when it is not. Table geometry differs per vendor: row counts vary,
//! trailing rows may be absent, and the OFDM and profile-stats tables carry
//! multi-level row indices, so continuations copy the whole index tail past
//! the common prefix with the catalog column, never just the last
//! sub-identifier.

use tracing::warn;

use crate::catalog::{OidEntry, Segment};
use crate::snmp::pdu::{error_message, Pdu, Value};

use super::dispatcher::PollCycle;

/// Identify the segment a response belongs to by matching its request-id
/// against the per-segment slots, scanning segments in catalog order.
///
/// `None` means no segment is waiting on this id: a delayed duplicate to be
/// discarded. Pure function of its arguments.
pub fn classify_response(
    request_id: i32,
    request_ids: &[i32; Segment::COUNT],
) -> Option<Segment> {
    if request_id == 0 {
        return None;
    }
    Segment::ALL
        .into_iter()
        .find(|seg| request_ids[seg.index()] == request_id)
}

/// Whether the walk has left the table column.
///
/// Compares the response's last varbinding name against the first
/// `base_oid.len()` sub-identifiers of the catalog column we asked about —
/// always the original encoded length, never a continuation suffix. A
/// matching prefix means the row is still inside the column and more may
/// follow.
pub fn walk_complete(base_oid: &[u32], last_name: &[u32]) -> bool {
    last_name.len() < base_oid.len() || last_name[..base_oid.len()] != *base_oid
}

/// Count of leading sub-identifiers two OIDs share.
pub fn common_prefix_len(a: &[u32], b: &[u32]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Build the column set for a continuation request: every catalog column of
/// the segment extended with the observed last-row index, i.e. the tail of
/// `last_name` past `prefix`.
pub fn continuation_oids(
    entries: &[OidEntry],
    last_name: &[u32],
    prefix: usize,
) -> Vec<Vec<u32>> {
    let suffix = &last_name[prefix.min(last_name.len())..];
    entries
        .iter()
        .map(|entry| {
            let mut oid = Vec::with_capacity(entry.oid.len() + suffix.len());
            oid.extend_from_slice(&entry.oid);
            oid.extend_from_slice(suffix);
            oid
        })
        .collect()
}

impl PollCycle {
    /// Drive the state machine with one correlated response.
    pub async fn handle_response(&mut self, idx: usize, pdu: Pdu) {
        // A protocol error closes the offending segment only; the other
        // segments of the host keep walking.
        if pdu.error_status != 0 {
            let host = &mut self.hosts[idx];
            let failing = usize::try_from(pdu.error_index)
                .ok()
                .and_then(|ix| ix.checked_sub(1))
                .and_then(|ix| pdu.varbinds.get(ix))
                .map(|vb| vb.name.as_slice());
            let peer = host.session.peer_name().to_string();
            if let Err(e) =
                host.sink
                    .write_error(&peer, failing, error_message(pdu.error_status))
            {
                warn!(peer = %peer, error = %e, "report write failed");
            }
            if let Some(segment) = classify_response(pdu.request_id, &host.request_ids) {
                host.request_ids[segment.index()] = 0;
                self.settle(idx);
            }
            return;
        }

        {
            let host = &mut self.hosts[idx];
            if let Err(e) = host.sink.write_varbinds(&pdu.varbinds) {
                warn!(peer = host.session.peer_name(), error = %e, "report write failed");
            }
        }

        let Some(segment) = classify_response(pdu.request_id, &self.hosts[idx].request_ids)
        else {
            return;
        };

        // The scalar batch is one-shot.
        if segment == Segment::NonRep {
            self.hosts[idx].request_ids[segment.index()] = 0;
            self.settle(idx);
            return;
        }

        // The varbinding sequence is forward-only; its tail decides whether
        // the walk is still inside the column set.
        if let Some(last) = pdu.varbinds.last() {
            let base = &self.catalog.entry(self.catalog.last_of(segment)).oid;
            if last.value != Value::EndOfMibView && !walk_complete(base, &last.name) {
                let prefix = common_prefix_len(&last.name, base);
                let oids =
                    continuation_oids(self.catalog.entries_of(segment), &last.name, prefix);
                let mut request = Pdu::get_bulk(self.catalog.max_repetitions(segment), oids);
                match self.hosts[idx].session.send(&mut request).await {
                    Ok(request_id) => {
                        self.hosts[idx].request_ids[segment.index()] = request_id;
                        return;
                    }
                    Err(e) => {
                        warn!(
                            peer = self.hosts[idx].session.peer_name(),
                            segment = ?segment,
                            error = %e,
                            "continuation send failed; abandoning segment"
                        );
                    }
                }
            }
        }

        self.hosts[idx].request_ids[segment.index()] = 0;
        self.settle(idx);
    }
}
