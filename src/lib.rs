//! aireports streams chat-completion answers for report writing.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the wire payloads: chat requests, streamed chunks, error
//!   envelopes and the model listing.
//! - [`core`] owns request building, media encoding, the stream decoder, the
//!   transport session, the response handle and the failure taxonomy.
//! - [`cli`] implements the `aireports` command: `ask`, `models` and the
//!   settings commands.
//! - [`utils`] holds URL helpers and the file-backed log sink.
//!
//! Library users start from [`core::client::ChatClient::start_request`], which
//! returns a [`core::handle::ResponseHandle`] immediately and streams into it
//! from a background task.

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;
