//! The poll cycle dispatcher.
//!
//! Single-threaded cooperative event loop owning every host context. One
//! receive future per active host is multiplexed through a `FuturesUnordered`;
//! a one-second tick drives the retransmission sweep. The loop runs until no
//! host is active or the global wall-clock deadline passes, whichever comes
//! first.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::net::UdpSocket;
use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, Segment};
use crate::config::PollerSettings;
use crate::db::HostRecord;
use crate::snmp::pdu::Pdu;
use crate::snmp::Session;
use crate::util;

use super::host::HostContext;
use super::report::{OutputMode, ReportSink};

/// State for one poll cycle over the whole fleet.
pub struct PollCycle {
    pub catalog: Catalog,
    pub hosts: Vec<HostContext>,
    /// Count of hosts counted live at priming and not yet finished.
    pub active_hosts: usize,
    templates: Vec<Option<Pdu>>,
    settings: PollerSettings,
    mode: OutputMode,
}

impl PollCycle {
    /// Build the cycle and its per-segment template PDUs: a GETNEXT for the
    /// scalar batch, a GETBULK with the catalog's repetition schedule for
    /// every populated tabular segment.
    pub fn new(catalog: Catalog, mode: OutputMode, settings: PollerSettings) -> PollCycle {
        let mut templates = Vec::with_capacity(Segment::COUNT);
        for seg in Segment::ALL {
            if catalog.count(seg) == 0 {
                templates.push(None);
                continue;
            }
            let oids: Vec<Vec<u32>> = catalog
                .entries_of(seg)
                .iter()
                .map(|entry| entry.oid.clone())
                .collect();
            let template = if seg == Segment::NonRep {
                Pdu::get_next(oids)
            } else {
                Pdu::get_bulk(catalog.max_repetitions(seg), oids)
            };
            templates.push(Some(template));
        }

        PollCycle {
            catalog,
            hosts: Vec::new(),
            active_hosts: 0,
            templates,
            settings,
            mode,
        }
    }

    /// Open a session to one modem and issue its initial requests.
    ///
    /// The host counts as active iff the scalar batch went out; a tabular
    /// send failure leaves just that segment idle. Resolve or session-open
    /// failure is reported to the caller, who skips the host.
    pub async fn add_host(&mut self, record: &HostRecord) -> Result<()> {
        let addr = util::dns::resolve_target(&record.transport)
            .await
            .ok_or_else(|| anyhow!("cannot resolve {}", record.transport))?;
        let session = Session::open(&record.transport, addr, &record.community, &self.settings)
            .await
            .with_context(|| format!("cannot open session to {}", record.transport))?;

        let sink = match self.mode {
            OutputMode::Analysis => ReportSink::stdout(),
            OutputMode::Bulk => {
                let mut sink = ReportSink::file(Path::new(&record.report_name))
                    .with_context(|| {
                        format!("cannot create report file {}", record.report_name)
                    })?;
                sink.write_address_header(&record.transport)
                    .with_context(|| {
                        format!("cannot write report file {}", record.report_name)
                    })?;
                sink
            }
        };

        let mut host = HostContext::new(session, sink);
        for seg in Segment::ALL {
            let Some(template) = &self.templates[seg.index()] else {
                continue;
            };
            let mut request = template.clone();
            match host.session.send(&mut request).await {
                Ok(request_id) => {
                    host.request_ids[seg.index()] = request_id;
                    if seg == Segment::NonRep {
                        host.live = true;
                        self.active_hosts += 1;
                    }
                }
                Err(e) => {
                    warn!(
                        peer = %record.transport,
                        segment = ?seg,
                        error = %e,
                        "initial send failed"
                    );
                }
            }
        }
        self.hosts.push(host);
        Ok(())
    }

    /// Run the event loop to completion or deadline.
    pub async fn run(&mut self) -> Result<()> {
        let deadline = Instant::now() + self.settings.cycle_deadline();
        info!(
            hosts = self.hosts.len(),
            active = self.active_hosts,
            "entering poll loop"
        );

        let mut inflight = FuturesUnordered::new();
        for (idx, host) in self.hosts.iter().enumerate() {
            if host.is_active() {
                inflight.push(recv_datagram(idx, host.session.socket()));
            }
        }

        let mut tick = tokio::time::interval_at(
            tokio::time::Instant::now() + Duration::from_secs(1),
            Duration::from_secs(1),
        );

        while self.active_hosts > 0 && Instant::now() < deadline {
            tokio::select! {
                Some((idx, result)) = inflight.next(), if !inflight.is_empty() => {
                    match result {
                        Ok(datagram) => {
                            if let Some(pdu) = self.hosts[idx].session.accept(&datagram) {
                                self.handle_response(idx, pdu).await;
                            }
                        }
                        Err(e) => self.close_host_on_error(idx, &e),
                    }
                    if self.hosts[idx].is_active() {
                        inflight.push(recv_datagram(idx, self.hosts[idx].session.socket()));
                    }
                }
                _ = tick.tick() => {
                    self.sweep(Instant::now());
                }
            }
        }

        if self.active_hosts > 0 {
            info!(
                remaining = self.active_hosts,
                "deadline reached with hosts still in flight"
            );
        }
        self.flush();
        Ok(())
    }

    /// Update the active-host count after a segment closed. Decrements
    /// exactly once per host, when its last open segment finishes.
    pub(crate) fn settle(&mut self, idx: usize) {
        let host = &mut self.hosts[idx];
        if host.live && !host.is_active() {
            host.live = false;
            self.active_hosts -= 1;
            debug!(
                peer = host.session.peer_name(),
                remaining = self.active_hosts,
                "host finished"
            );
        }
    }

    /// Retransmission and expiry sweep over all sessions.
    fn sweep(&mut self, now: Instant) {
        for idx in 0..self.hosts.len() {
            if !self.hosts[idx].is_active() {
                continue;
            }
            if self.hosts[idx].session.sweep(now) {
                self.close_host_on_timeout(idx);
            }
        }
    }

    /// Retransmissions exhausted: the host is closed globally. The marker
    /// goes to stdout, not the report sink, which may be empty.
    fn close_host_on_timeout(&mut self, idx: usize) {
        let host = &mut self.hosts[idx];
        println!("{}: Timeout", host.session.peer_name());
        host.close_all_segments();
        self.settle(idx);
    }

    /// Socket-level receive failure (e.g. port unreachable) closes the host.
    fn close_host_on_error(&mut self, idx: usize, err: &std::io::Error) {
        let host = &mut self.hosts[idx];
        if !host.is_active() {
            return;
        }
        error!(peer = host.session.peer_name(), error = %err, "receive failed");
        host.close_all_segments();
        self.settle(idx);
    }

    fn flush(&mut self) {
        for host in &mut self.hosts {
            if let Err(e) = host.sink.flush() {
                warn!(peer = host.session.peer_name(), error = %e, "report flush failed");
            }
        }
    }
}

/// One receive per active host, re-armed by the loop after each datagram.
async fn recv_datagram(
    idx: usize,
    socket: Arc<UdpSocket>,
) -> (usize, std::io::Result<Vec<u8>>) {
    let mut buf = vec![0u8; 65535];
    match socket.recv(&mut buf).await {
        Ok(len) => {
            buf.truncate(len);
            (idx, Ok(buf))
        }
        Err(e) => (idx, Err(e)),
    }
}
