//! Line-oriented decoder for streamed chat-completion responses.
//!
//! The body is a sequence of newline-terminated JSON records, each optionally
//! prefixed with `data:`. The stream ends at a `[DONE]` line, at the first
//! record whose first choice carries a finish reason, or at end of input.

use std::fmt;

use futures_util::{Stream, StreamExt};
use memchr::memchr;
use tokio_util::sync::CancellationToken;

use crate::api::StreamChunk;
use crate::core::error::ClientError;
use crate::core::log::{LogLevel, LogSink};

pub const DONE_SENTINEL: &str = "[DONE]";
const PROGRESS_EVERY: usize = 10;
const LINE_PREVIEW_CHARS: usize = 200;

/// Splits incoming bytes into lines without assuming chunk boundaries line up
/// with record boundaries.
#[derive(Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
    start: usize,
}

impl LineBuffer {
    pub fn extend(&mut self, chunk: &[u8]) {
        if self.start > 0 {
            self.buffer.drain(..self.start);
            self.start = 0;
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Next complete line without its terminator (`\n` or `\r\n`).
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let pending = &self.buffer[self.start..];
        let newline = memchr(b'\n', pending)?;
        let mut end = newline;
        if end > 0 && pending[end - 1] == b'\r' {
            end -= 1;
        }
        let line = pending[..end].to_vec();
        self.start += newline + 1;
        Some(line)
    }

    /// Whatever follows the last newline once the input has ended.
    pub fn take_remainder(&mut self) -> Option<Vec<u8>> {
        let rest = self.buffer.split_off(self.start);
        self.buffer.clear();
        self.start = 0;
        if rest.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(rest)
        }
    }
}

/// What a single line means for the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Blank line or empty `data:` payload.
    Skip,
    /// A record without choices.
    Heartbeat,
    /// A record whose first choice names a role but carries no text.
    Role(String),
    Content {
        text: String,
        role: Option<String>,
    },
    Done,
    Finished {
        reason: String,
    },
}

/// Strips the `data:` prefix. A space after the colon is optional, and lines
/// without the prefix are taken as bare records.
fn data_payload(line: &str) -> &str {
    let line = line.trim();
    match line.strip_prefix("data:") {
        Some(payload) => payload.trim(),
        None => line,
    }
}

pub fn decode_line(line: &str) -> Result<LineEvent, ClientError> {
    let payload = data_payload(line);
    if payload.is_empty() {
        return Ok(LineEvent::Skip);
    }
    if payload == DONE_SENTINEL {
        return Ok(LineEvent::Done);
    }

    let chunk: Option<StreamChunk> =
        serde_json::from_str(payload).map_err(|err| ClientError::ProtocolDecode {
            line: line.to_string(),
            reason: err.to_string(),
        })?;
    let Some(chunk) = chunk else {
        return Ok(LineEvent::Heartbeat);
    };

    let Some(choice) = chunk.choices.into_iter().next() else {
        return Ok(LineEvent::Heartbeat);
    };

    if let Some(reason) = choice.finish_reason.filter(|reason| !reason.is_empty()) {
        return Ok(LineEvent::Finished { reason });
    }

    let delta = choice.delta.unwrap_or_default();
    let role = delta.role.filter(|role| !role.is_empty());
    match delta.content.filter(|text| !text.is_empty()) {
        Some(text) => Ok(LineEvent::Content { text, role }),
        None => Ok(role.map(LineEvent::Role).unwrap_or(LineEvent::Skip)),
    }
}

/// How decoding stopped.
#[derive(Debug)]
pub enum StreamEnd {
    Sentinel,
    Finished(String),
    EndOfInput,
    Cancelled,
    /// The body stream itself failed.
    Failed(ClientError),
}

impl StreamEnd {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            StreamEnd::Sentinel | StreamEnd::Finished(_) | StreamEnd::EndOfInput
        )
    }
}

#[derive(Debug)]
pub enum DecodeEvent<'a> {
    Delta(&'a str),
    LineError(ClientError),
}

#[derive(Debug)]
pub struct DecodeOutcome {
    pub end: StreamEnd,
    pub chunks: usize,
    pub chars: usize,
}

enum Step {
    Continue,
    Stop(StreamEnd),
}

pub struct StreamDecoder<'a> {
    log: &'a dyn LogSink,
    detailed: bool,
    chunks: usize,
    chars: usize,
    role_seen: bool,
}

impl<'a> StreamDecoder<'a> {
    pub fn new(log: &'a dyn LogSink) -> Self {
        Self {
            log,
            detailed: false,
            chunks: 0,
            chars: 0,
            role_seen: false,
        }
    }

    /// Include a preview of malformed lines in decode warnings.
    pub fn detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    /// Drive `body` to completion, reporting every delta in arrival order.
    ///
    /// The cancellation token is checked before each line and raced against
    /// every read, so a cancelled request stops waiting on the network at once.
    pub async fn decode<S, B, E>(
        mut self,
        body: S,
        cancel: &CancellationToken,
        mut on_event: impl FnMut(DecodeEvent<'_>),
    ) -> DecodeOutcome
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: fmt::Display + fmt::Debug,
    {
        let mut body = std::pin::pin!(body);
        let mut lines = LineBuffer::default();

        let end = 'read: loop {
            while let Some(raw) = lines.next_line() {
                if cancel.is_cancelled() {
                    break 'read StreamEnd::Cancelled;
                }
                if let Step::Stop(end) = self.process(&raw, &mut on_event) {
                    break 'read end;
                }
            }

            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                next = body.next() => Some(next),
            };
            let Some(next) = next else {
                break 'read StreamEnd::Cancelled;
            };

            match next {
                Some(Ok(bytes)) => lines.extend(bytes.as_ref()),
                Some(Err(err)) => {
                    break 'read StreamEnd::Failed(ClientError::fatal(
                        "Response stream interrupted",
                        err,
                    ))
                }
                None => {
                    if let Some(raw) = lines.take_remainder() {
                        if cancel.is_cancelled() {
                            break 'read StreamEnd::Cancelled;
                        }
                        if let Step::Stop(end) = self.process(&raw, &mut on_event) {
                            break 'read end;
                        }
                    }
                    break 'read StreamEnd::EndOfInput;
                }
            }
        };

        DecodeOutcome {
            end,
            chunks: self.chunks,
            chars: self.chars,
        }
    }

    fn process(&mut self, raw: &[u8], on_event: &mut impl FnMut(DecodeEvent<'_>)) -> Step {
        let line = match std::str::from_utf8(raw) {
            Ok(line) => line,
            Err(err) => {
                let error = ClientError::ProtocolDecode {
                    line: String::from_utf8_lossy(raw).into_owned(),
                    reason: err.to_string(),
                };
                self.report_line_error(error, on_event);
                return Step::Continue;
            }
        };

        match decode_line(line) {
            Ok(LineEvent::Skip) => Step::Continue,
            Ok(LineEvent::Heartbeat) => {
                self.log.info("Received a chunk without choices");
                Step::Continue
            }
            Ok(LineEvent::Role(role)) => {
                self.note_role(&role);
                Step::Continue
            }
            Ok(LineEvent::Content { text, role }) => {
                if let Some(role) = role {
                    self.note_role(&role);
                }
                self.chunks += 1;
                self.chars += text.chars().count();
                on_event(DecodeEvent::Delta(&text));
                if self.chunks % PROGRESS_EVERY == 0 {
                    self.log.info(&format!(
                        "Received {} chunks, current length {}",
                        self.chunks, self.chars
                    ));
                }
                Step::Continue
            }
            Ok(LineEvent::Done) => {
                self.log.info("Received [DONE], end of stream");
                Step::Stop(StreamEnd::Sentinel)
            }
            Ok(LineEvent::Finished { reason }) => {
                self.log
                    .info(&format!("Stream finished (finish_reason: {reason})"));
                Step::Stop(StreamEnd::Finished(reason))
            }
            Err(error) => {
                self.report_line_error(error, on_event);
                Step::Continue
            }
        }
    }

    fn note_role(&mut self, role: &str) {
        if !self.role_seen {
            self.role_seen = true;
            self.log.info(&format!("Response started with role: {role}"));
        }
    }

    fn report_line_error(
        &mut self,
        error: ClientError,
        on_event: &mut impl FnMut(DecodeEvent<'_>),
    ) {
        let preview = match &error {
            ClientError::ProtocolDecode { line, .. } if self.detailed => {
                Some(line.chars().take(LINE_PREVIEW_CHARS).collect::<String>())
            }
            _ => None,
        };
        self.log.log(
            LogLevel::Warning,
            &error.to_string(),
            preview.as_deref(),
        );
        on_event(DecodeEvent::LineError(error));
    }
}
