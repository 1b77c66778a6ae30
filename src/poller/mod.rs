//! Poller core: host contexts, segment walk state machine, dispatcher and
//! report output.

pub mod dispatcher;
pub mod host;
pub mod report;
pub mod walk;

pub use dispatcher::PollCycle;
pub use host::HostContext;
pub use report::{OutputMode, ReportSink};
