//! The caller's view of one in-flight request and the single writer that
//! feeds it.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::core::error::ErrorReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseEvent {
    /// Incremental text, in the order it arrived on the wire.
    Delta(String),
    /// A classified failure. Recoverable ones are followed by more deltas.
    Error(ErrorReport),
    /// Always the last event. Carries the full accumulated text.
    Completed(Arc<str>),
}

/// Returned immediately by [`crate::core::client::ChatClient::start_request`].
///
/// Progress can be observed through [`ResponseHandle::next_event`] or by
/// polling [`ResponseHandle::is_completed`]. The handle is read-only: only the
/// worker holding the matching [`ResponseWriter`] mutates the response.
pub struct ResponseHandle {
    events: mpsc::UnboundedReceiver<ResponseEvent>,
    state: watch::Receiver<Option<Arc<str>>>,
}

/// Everything a handle reported, gathered by [`ResponseHandle::collect`].
#[derive(Debug, Clone, Default)]
pub struct ResponseSummary {
    pub text: String,
    pub deltas: Vec<String>,
    pub errors: Vec<ErrorReport>,
}

impl ResponseSummary {
    pub fn was_cancelled(&self) -> bool {
        self.errors.iter().any(ErrorReport::is_cancelled)
    }

    /// The first failure that ended the request early, if any.
    pub fn terminal_error(&self) -> Option<&ErrorReport> {
        self.errors.iter().find(|report| !report.is_recoverable())
    }
}

impl ResponseHandle {
    pub fn channel() -> (ResponseWriter, ResponseHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(None);
        (
            ResponseWriter {
                text: String::new(),
                events: events_tx,
                state: state_tx,
                finished: false,
            },
            ResponseHandle {
                events: events_rx,
                state: state_rx,
            },
        )
    }

    pub fn is_completed(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// The final text, once completed. Never changes afterwards.
    pub fn final_text(&self) -> Option<Arc<str>> {
        self.state.borrow().clone()
    }

    pub async fn next_event(&mut self) -> Option<ResponseEvent> {
        self.events.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<ResponseEvent> {
        self.events.try_recv().ok()
    }

    /// Wait for completion without consuming events.
    pub async fn wait(&self) -> Arc<str> {
        let mut state = self.state.clone();
        let completed = match state.wait_for(Option::is_some).await {
            Ok(text) => text.clone(),
            Err(_) => None,
        };
        completed
            .or_else(|| self.final_text())
            .unwrap_or_else(|| Arc::from(""))
    }

    /// Drain every event until completion.
    pub async fn collect(mut self) -> ResponseSummary {
        let mut summary = ResponseSummary::default();
        while let Some(event) = self.next_event().await {
            match event {
                ResponseEvent::Delta(delta) => summary.deltas.push(delta),
                ResponseEvent::Error(report) => summary.errors.push(report),
                ResponseEvent::Completed(text) => {
                    summary.text = text.to_string();
                    break;
                }
            }
        }
        summary
    }
}

/// The single writer behind a [`ResponseHandle`].
///
/// Dropping a writer that was never finished completes the handle with the
/// text accumulated so far, so no observer can wait forever.
pub struct ResponseWriter {
    text: String,
    events: mpsc::UnboundedSender<ResponseEvent>,
    state: watch::Sender<Option<Arc<str>>>,
    finished: bool,
}

impl ResponseWriter {
    pub fn push_delta(&mut self, delta: &str) {
        self.text.push_str(delta);
        let _ = self.events.send(ResponseEvent::Delta(delta.to_string()));
    }

    pub fn report_error(&self, report: ErrorReport) {
        let _ = self.events.send(ResponseEvent::Error(report));
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn finish(mut self) -> Arc<str> {
        self.complete()
    }

    fn complete(&mut self) -> Arc<str> {
        self.finished = true;
        let text: Arc<str> = Arc::from(std::mem::take(&mut self.text));
        let _ = self.events.send(ResponseEvent::Completed(Arc::clone(&text)));
        self.state.send_replace(Some(Arc::clone(&text)));
        text
    }
}

impl Drop for ResponseWriter {
    fn drop(&mut self) {
        if !self.finished {
            self.complete();
        }
    }
}
