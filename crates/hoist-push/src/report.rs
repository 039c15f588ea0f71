//! The output seam of a push.
//!
//! Dispatch never prints. It tells a [`Reporter`] what happened, and the CLI
//! decides how that looks on a terminal. [`RecordingReporter`] keeps the
//! events for tests.

use hoist_transport::{PushOutcome, RefOutcome, RefStatus, TransportError};

/// Receives user-facing events from a push.
pub trait Reporter: Send {
    /// About to push to `url` (verbose mode only).
    fn pushing_to(&mut self, url: &str);

    /// The per-ref outcome of a push to `url`.
    fn ref_outcomes(&mut self, url: &str, outcome: &PushOutcome, porcelain: bool);

    /// The push to `url`, or closing its connection, failed outright.
    fn transport_error(&mut self, url: &str, error: &TransportError);

    /// At least one ref could not be pushed to `url`.
    fn push_failed(&mut self, url: &str);

    /// Advice about the rejections of the whole invocation.
    fn advice(&mut self, message: &str);

    /// The invocation was aborted before or during dispatch.
    fn fatal(&mut self, message: &str);
}

/// Render a push outcome the way a terminal shows it.
///
/// Human output lists only refs that changed or were refused unless
/// `verbose`; porcelain output lists every ref and ends with `Done`.
pub fn render_outcome(url: &str, outcome: &PushOutcome, porcelain: bool, verbose: bool) -> Vec<String> {
    let shown: Vec<&RefOutcome> = outcome
        .updates
        .iter()
        .filter(|u| porcelain || verbose || u.status != RefStatus::UpToDate)
        .collect();
    if shown.is_empty() && !porcelain {
        return Vec::new();
    }

    let mut lines = Vec::with_capacity(shown.len() + 2);
    lines.push(format!("To {url}"));
    for update in shown {
        lines.push(if porcelain {
            porcelain_line(update)
        } else {
            update.summary()
        });
    }
    if porcelain {
        lines.push("Done".to_string());
    }
    lines
}

fn porcelain_line(update: &RefOutcome) -> String {
    let flag = update.summary().chars().next().unwrap_or(' ');
    let src = update.src.as_deref().unwrap_or_default();
    let what = match &update.status {
        RefStatus::UpToDate => "[up to date]".to_string(),
        RefStatus::New => "[new]".to_string(),
        RefStatus::Deleted => "[deleted]".to_string(),
        RefStatus::FastForward => ids(update, ".."),
        RefStatus::Forced => ids(update, "..."),
        RefStatus::RemoteReject(Some(message)) => format!("[remote rejected] ({message})"),
        RefStatus::RemoteReject(None) => "[remote rejected]".to_string(),
        status => format!("[rejected] ({})", status.reject_reason().unwrap_or_default()),
    };
    format!("{flag}\t{src}:{}\t{what}", update.dst)
}

fn ids(update: &RefOutcome, sep: &str) -> String {
    let abbrev = |id: &Option<String>| id.as_deref().map(|s| s.chars().take(7).collect::<String>());
    format!(
        "{}{sep}{}",
        abbrev(&update.old).unwrap_or_default(),
        abbrev(&update.new).unwrap_or_default()
    )
}

/// One event seen by a [`RecordingReporter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportEvent {
    PushingTo(String),
    RefOutcomes { url: String, lines: Vec<String> },
    TransportError { url: String, message: String },
    PushFailed(String),
    Advice(String),
    Fatal(String),
}

/// A [`Reporter`] that records every event.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<ReportEvent>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All advice messages, in order.
    pub fn advice_messages(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Advice(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    /// URLs reported as failed, in order.
    pub fn failed_urls(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ReportEvent::PushFailed(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn fatal_message(&self) -> Option<&str> {
        self.events.iter().find_map(|e| match e {
            ReportEvent::Fatal(message) => Some(message.as_str()),
            _ => None,
        })
    }
}

impl Reporter for RecordingReporter {
    fn pushing_to(&mut self, url: &str) {
        self.events.push(ReportEvent::PushingTo(url.to_string()));
    }

    fn ref_outcomes(&mut self, url: &str, outcome: &PushOutcome, porcelain: bool) {
        self.events.push(ReportEvent::RefOutcomes {
            url: url.to_string(),
            lines: render_outcome(url, outcome, porcelain, true),
        });
    }

    fn transport_error(&mut self, url: &str, error: &TransportError) {
        self.events.push(ReportEvent::TransportError {
            url: url.to_string(),
            message: error.to_string(),
        });
    }

    fn push_failed(&mut self, url: &str) {
        self.events.push(ReportEvent::PushFailed(url.to_string()));
    }

    fn advice(&mut self, message: &str) {
        self.events.push(ReportEvent::Advice(message.to_string()));
    }

    fn fatal(&mut self, message: &str) {
        self.events.push(ReportEvent::Fatal(message.to_string()));
    }
}
