//! Assembles the two-message chat request from a prompt and its attachments.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::{ChatMessage, ChatRequest, ContentPart, MessageContent, ROLE_SYSTEM, ROLE_USER};
use crate::core::error::{classify, AttachmentError, ClientError};
use crate::core::log::LogSink;
use crate::core::media::{encode_image, encode_table, sheet_label, table_label};
use crate::core::sheet::{SheetError, SheetReader};
use crate::core::table::Table;

/// Everything the caller supplies for one request.
#[derive(Debug, Clone, Default)]
pub struct RequestInput {
    pub prompt: String,
    pub system_prompt: String,
    pub image_paths: Vec<PathBuf>,
    pub sheet_paths: Vec<PathBuf>,
    pub tables: Vec<Table>,
}

impl RequestInput {
    pub fn new(prompt: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: system_prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_images(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.image_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_sheets(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.sheet_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_tables(mut self, tables: impl IntoIterator<Item = Table>) -> Self {
        self.tables.extend(tables);
        self
    }
}

/// A built request plus the attachments that had to be left out.
#[derive(Debug)]
pub struct BuiltRequest {
    pub request: ChatRequest,
    pub skipped: Vec<ClientError>,
}

#[derive(Clone)]
pub struct RequestBuilder {
    model: String,
    max_tokens: u32,
    sheets: Arc<dyn SheetReader>,
    log: Arc<dyn LogSink>,
}

impl RequestBuilder {
    pub fn new(
        model: impl Into<String>,
        max_tokens: u32,
        sheets: Arc<dyn SheetReader>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            sheets,
            log,
        }
    }

    /// Build the request. Attachment failures are logged and collected in
    /// [`BuiltRequest::skipped`]; only cancellation aborts the build.
    pub async fn build(
        &self,
        input: &RequestInput,
        cancel: &CancellationToken,
    ) -> Result<BuiltRequest, ClientError> {
        let mut parts = Vec::new();
        let mut skipped = Vec::new();

        for path in &input.image_paths {
            let item = path.display().to_string();
            match cancellable(cancel, encode_image(path)).await? {
                Ok(part) => {
                    self.log.info(&format!("Image added: {}", file_name(path)));
                    parts.push(part);
                }
                Err(source) => skipped.push(self.skip(item, source)),
            }
        }

        for path in &input.sheet_paths {
            let item = path.display().to_string();
            let encoded = match cancellable(cancel, self.read_sheet(path)).await? {
                Ok(table) => encode_table(&table, &sheet_label(path)),
                Err(err) => Err(AttachmentError::Sheet(err)),
            };
            match encoded {
                Ok(part) => {
                    self.log
                        .info(&format!("Spreadsheet added: {}", file_name(path)));
                    parts.push(part);
                }
                Err(source) => skipped.push(self.skip(item, source)),
            }
        }

        for (position, table) in input.tables.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(ClientError::Cancelled);
            }
            match encode_table(table, &table_label(position)) {
                Ok(part) => {
                    self.log.info(&format!("Table '{}' added", table.name()));
                    parts.push(part);
                }
                Err(source) => skipped.push(self.skip(table.name().to_string(), source)),
            }
        }

        parts.push(ContentPart::text(input.prompt.clone()));

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: ROLE_SYSTEM.to_string(),
                    content: MessageContent::Text(input.system_prompt.clone()),
                },
                ChatMessage {
                    role: ROLE_USER.to_string(),
                    content: MessageContent::Parts(parts),
                },
            ],
            stream: true,
            max_tokens: self.max_tokens,
        };

        Ok(BuiltRequest { request, skipped })
    }

    async fn read_sheet(&self, path: &Path) -> Result<Table, SheetError> {
        let reader = Arc::clone(&self.sheets);
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || reader.read_sheet(&path))
            .await
            .map_err(|err| SheetError::Interrupted(err.to_string()))?
    }

    fn skip(&self, item: String, source: AttachmentError) -> ClientError {
        let error = ClientError::attachment(item, source);
        let report = classify(&error);
        self.log.error(&report.message, report.detail.as_deref());
        error
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = T>,
) -> Result<T, ClientError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        output = work => Ok(output),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log::LogLevel;
    use crate::core::sheet::DelimitedSheetReader;
    use crate::utils::test_utils::MemorySink;
    use serde_json::json;
    use tempfile::TempDir;

    fn builder(sink: Arc<MemorySink>) -> RequestBuilder {
        RequestBuilder::new("report-model", 16000, Arc::new(DelimitedSheetReader), sink)
    }

    fn user_parts(request: &ChatRequest) -> &[ContentPart] {
        match &request.messages[1].content {
            MessageContent::Parts(parts) => parts,
            other => panic!("expected user parts, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn parts_follow_context_before_prompt_order() {
        let dir = TempDir::new().expect("temp dir");
        let first = dir.path().join("a.png");
        let second = dir.path().join("b.webp");
        let sheet = dir.path().join("sheet.csv");
        std::fs::write(&first, b"one").expect("write");
        std::fs::write(&second, b"two").expect("write");
        std::fs::write(&sheet, "k,v\nx,1\n").expect("write");

        let table = Table::new("inline", vec!["c".into()])
            .with_row(vec![json!("y")])
            .expect("row fits");
        let input = RequestInput::new("Summarise", "You write reports")
            .with_images([first, second])
            .with_sheets([sheet])
            .with_tables([table]);

        let sink = Arc::new(MemorySink::default());
        let built = builder(sink)
            .build(&input, &CancellationToken::new())
            .await
            .expect("build succeeds");

        assert!(built.skipped.is_empty());
        let request = &built.request;
        assert_eq!(request.model, "report-model");
        assert!(request.stream);
        assert_eq!(request.max_tokens, 16000);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(
            request.messages[0].content,
            MessageContent::Text("You write reports".into())
        );
        assert_eq!(request.messages[1].role, "user");

        let parts = user_parts(request);
        assert_eq!(parts.len(), 5);
        assert!(parts[0].is_image());
        assert!(parts[1].is_image());
        match (&parts[2], &parts[3], &parts[4]) {
            (
                ContentPart::Text { text: sheet },
                ContentPart::Text { text: table },
                ContentPart::Text { text: prompt },
            ) => {
                assert!(sheet.starts_with("Spreadsheet data from file sheet.csv:\n```json\n"));
                assert!(table.starts_with("DataTable 1:\n```json\n"));
                assert_eq!(prompt, "Summarise");
            }
            other => panic!("unexpected parts {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_attachments_are_skipped_and_logged() {
        let dir = TempDir::new().expect("temp dir");
        let good = dir.path().join("ok.gif");
        std::fs::write(&good, b"gif").expect("write");
        let input = RequestInput::new("prompt", "system")
            .with_images([dir.path().join("missing.png"), good])
            .with_sheets([dir.path().join("book.xlsx")]);

        let sink = Arc::new(MemorySink::default());
        let built = builder(Arc::clone(&sink))
            .build(&input, &CancellationToken::new())
            .await
            .expect("build succeeds");

        let parts = user_parts(&built.request);
        assert_eq!(parts.len(), 2);
        assert!(parts[0].is_image());
        assert_eq!(parts[1], ContentPart::text("prompt"));
        assert_eq!(built.skipped.len(), 2);
        assert!(built
            .skipped
            .iter()
            .all(|err| matches!(err, ClientError::Attachment { .. })));
        assert_eq!(sink.count(LogLevel::Error), 2);
    }

    #[tokio::test]
    async fn prompt_part_is_always_present() {
        let sink = Arc::new(MemorySink::default());
        let built = builder(sink)
            .build(&RequestInput::new("", ""), &CancellationToken::new())
            .await
            .expect("build succeeds");
        assert_eq!(user_parts(&built.request), [ContentPart::text("")]);
    }

    #[tokio::test]
    async fn cancelled_build_stops_before_reading_files() {
        let dir = TempDir::new().expect("temp dir");
        let image = dir.path().join("a.png");
        std::fs::write(&image, b"png").expect("write");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let sink = Arc::new(MemorySink::default());
        let result = builder(sink)
            .build(&RequestInput::new("p", "s").with_images([image]), &cancel)
            .await;
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }
}
