//! Periodic emission of the current tally.

use std::{io::Write, time::Duration};

use chrono::{DateTime, Local};
use tracing::{instrument, warn};

use crate::base::types::{UserId, Void};

use super::store::{CounterStore, TallyRecord};

/// Destination for rendered reports. Stdout in production, a buffer in tests.
pub trait ReportSink: Send + 'static {
    fn emit(&mut self, report: &str) -> Void;
}

/// Writes reports to standard output.
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn emit(&mut self, report: &str) -> Void {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(report.as_bytes())?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
        Ok(())
    }
}

/// Emits a tally report on a fixed interval, forever.
///
/// The reporter only ever reads the store. A failed emit skips that tick and
/// the loop carries on; it ends only when the process (and with it the task)
/// is shut down.
pub struct Reporter {
    store: CounterStore,
    interval: Duration,
}

impl Reporter {
    pub fn new(store: CounterStore, interval: Duration) -> Self {
        Self { store, interval }
    }

    #[instrument(skip_all)]
    pub async fn run(self, mut sink: impl ReportSink) {
        loop {
            tokio::time::sleep(self.interval).await;

            if let Err(err) = self.tick(&mut sink) {
                warn!("Failed to emit tally report: {}", err);
            }
        }
    }

    fn tick(&self, sink: &mut impl ReportSink) -> Void {
        sink.emit(&render_at(&self.store.snapshot(), Local::now()))
    }
}

/// Renders a snapshot as the report body, one line per user in
/// first-observation order, with a totals line at the end.
pub fn render_at(snapshot: &[(UserId, TallyRecord)], at: DateTime<Local>) -> String {
    let mut out = format!("== tally report @ {} ==\n", at.format("%Y-%m-%d %H:%M:%S"));

    if snapshot.is_empty() {
        out.push_str("(no users observed yet)");
        return out;
    }

    let mut total = TallyRecord::default();

    for (user, record) in snapshot {
        out.push_str(&format!("{}  inbox={}  saved={}\n", user, record.inbox_count, record.saved_count));
        total.inbox_count += record.inbox_count;
        total.saved_count += record.saved_count;
    }

    out.push_str(&format!("total ({} users)  inbox={}  saved={}", snapshot.len(), total.inbox_count, total.saved_count));

    out
}
