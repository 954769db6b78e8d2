//! Request orchestration: one background worker per request, feeding one
//! [`ResponseHandle`].

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::models::chat_models;
use crate::api::ModelInfo;
use crate::core::config::{ApiSettings, ClientOptions};
use crate::core::decoder::{DecodeEvent, StreamDecoder, StreamEnd};
use crate::core::error::{classify, ClientError};
use crate::core::handle::{ResponseHandle, ResponseWriter};
use crate::core::log::LogSink;
use crate::core::request::{RequestBuilder, RequestInput};
use crate::core::sheet::SheetReader;
use crate::core::transport::TransportSession;

/// A reusable client bound to one endpoint, credential and model.
///
/// The client keeps no per-request state, so any number of requests may be
/// in flight at once. Each one is independent of the others.
#[derive(Clone)]
pub struct ChatClient {
    transport: TransportSession,
    builder: RequestBuilder,
    log: Arc<dyn LogSink>,
    options: ClientOptions,
}

impl ChatClient {
    pub fn new(
        settings: &ApiSettings,
        options: ClientOptions,
        log: Arc<dyn LogSink>,
        sheets: Arc<dyn SheetReader>,
    ) -> Result<Self, ClientError> {
        let transport = TransportSession::new(settings, options.timeout)?;
        // The credential's ceiling caps whatever the caller asks for.
        let max_tokens = options.max_tokens.min(settings.max_tokens);
        let builder = RequestBuilder::new(
            options.model.clone(),
            max_tokens,
            sheets,
            Arc::clone(&log),
        );
        Ok(Self {
            transport,
            builder,
            log,
            options,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Start a request and return its handle without waiting on any I/O.
    ///
    /// Must be called from within a Tokio runtime. The handle always
    /// completes, even when the request fails or is cancelled.
    pub fn start_request(&self, input: RequestInput, cancel: CancellationToken) -> ResponseHandle {
        let (writer, handle) = ResponseHandle::channel();
        let worker = Worker {
            transport: self.transport.clone(),
            builder: self.builder.clone(),
            log: Arc::clone(&self.log),
            model: self.options.model.clone(),
            detailed: self.options.detailed_logging,
        };
        tokio::spawn(worker.run(input, cancel, writer));
        handle
    }

    /// Every model the credential can see, in server order.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, ClientError> {
        Ok(self.transport.list_models().await?.data)
    }

    /// Chat-capable models ordered by id.
    pub async fn chat_models(&self) -> Result<Vec<ModelInfo>, ClientError> {
        Ok(chat_models(self.list_models().await?))
    }
}

struct Worker {
    transport: TransportSession,
    builder: RequestBuilder,
    log: Arc<dyn LogSink>,
    model: String,
    detailed: bool,
}

impl Worker {
    async fn run(self, input: RequestInput, cancel: CancellationToken, mut writer: ResponseWriter) {
        self.log.info(&format!(
            "Sending request to {} (model: {})",
            self.transport.endpoint(),
            self.model
        ));

        if let Err(error) = self.stream(&input, &cancel, &mut writer).await {
            let report = classify(&error);
            if report.is_cancelled() {
                self.log.warn(&report.message);
            } else {
                self.log.error(&report.message, report.detail.as_deref());
            }
            writer.report_error(report);
        }

        let text = writer.finish();
        self.log.info(&format!(
            "Request completed ({} characters)",
            text.chars().count()
        ));
    }

    async fn stream(
        &self,
        input: &RequestInput,
        cancel: &CancellationToken,
        writer: &mut ResponseWriter,
    ) -> Result<(), ClientError> {
        let built = self.builder.build(input, cancel).await?;
        // Already logged by the builder
        for skipped in &built.skipped {
            writer.report_error(classify(skipped));
        }

        let response = self.transport.execute(&built.request, cancel).await?;

        let outcome = StreamDecoder::new(&*self.log)
            .detailed(self.detailed)
            .decode(response.bytes_stream(), cancel, |event| match event {
                DecodeEvent::Delta(delta) => writer.push_delta(delta),
                DecodeEvent::LineError(error) => writer.report_error(classify(&error)),
            })
            .await;

        match outcome.end {
            StreamEnd::Cancelled => return Err(ClientError::Cancelled),
            StreamEnd::Failed(error) => return Err(error),
            StreamEnd::Sentinel | StreamEnd::Finished(_) | StreamEnd::EndOfInput => {}
        }

        if outcome.chunks == 0 {
            self.log.warn("Response stream ended without any content");
        } else {
            self.log.info(&format!(
                "Received {} chunks ({} characters)",
                outcome.chunks, outcome.chars
            ));
        }
        Ok(())
    }
}
