//! Turns attachments into request content parts.

use std::path::Path;

use base64::Engine as _;

use crate::api::{ContentPart, ImageSource};
use crate::core::error::AttachmentError;
use crate::core::table::Table;

/// Media type inferred from the file extension. Unknown extensions are sent
/// as JPEG.
pub fn image_media_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

pub async fn encode_image(path: &Path) -> Result<ContentPart, AttachmentError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| AttachmentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(ContentPart::Image {
        source: ImageSource {
            kind: "base64".to_string(),
            media_type: image_media_type(path).to_string(),
            data: base64::prelude::BASE64_STANDARD.encode(bytes),
        },
    })
}

/// Render `table` as indented JSON inside a fenced block headed by `label`.
pub fn encode_table(table: &Table, label: &str) -> Result<ContentPart, AttachmentError> {
    let json = serde_json::to_string_pretty(table)?;
    Ok(ContentPart::text(format!("{label}:\n```json\n{json}\n```")))
}

pub fn sheet_label(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    format!("Spreadsheet data from file {file_name}")
}

pub fn table_label(position: usize) -> String {
    format!("DataTable {}", position + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn media_type_follows_extension() {
        assert_eq!(image_media_type(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(image_media_type(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(image_media_type(Path::new("dir/a.png")), "image/png");
        assert_eq!(image_media_type(Path::new("a.gif")), "image/gif");
        assert_eq!(image_media_type(Path::new("a.webp")), "image/webp");
        assert_eq!(image_media_type(Path::new("a.bmp")), "image/jpeg");
        assert_eq!(image_media_type(Path::new("noext")), "image/jpeg");
    }

    #[tokio::test]
    async fn encode_image_base64_encodes_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, b"\x89PNG").expect("write image");

        let part = encode_image(&path).await.expect("image encodes");
        match part {
            ContentPart::Image { source } => {
                assert_eq!(source.kind, "base64");
                assert_eq!(source.media_type, "image/png");
                assert_eq!(source.data, "iVBORw==");
            }
            other => panic!("expected image part, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn encode_image_reports_missing_file() {
        let err = encode_image(Path::new("/definitely/not/here.png"))
            .await
            .expect_err("missing file should fail");
        assert!(matches!(err, AttachmentError::Io { .. }));
    }

    #[test]
    fn encode_table_wraps_pretty_json_in_fence() {
        let table = Table::new("Sales", vec!["region".into(), "total".into()])
            .with_row(vec![json!("north"), Value::Null])
            .expect("row fits");

        let part = encode_table(&table, &table_label(0)).expect("table encodes");
        let expected = "DataTable 1:\n```json\n{\n  \"TableName\": \"Sales\",\n  \"Rows\": [\n    {\n      \"region\": \"north\",\n      \"total\": null\n    }\n  ]\n}\n```";
        assert_eq!(part, ContentPart::text(expected));
    }

    #[test]
    fn sheet_label_uses_file_name() {
        assert_eq!(
            sheet_label(Path::new("/tmp/reports/q1.csv")),
            "Spreadsheet data from file q1.csv"
        );
    }
}
