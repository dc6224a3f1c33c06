//! Chat request ingestion: JSON bodies, multipart forms, uploaded files.

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use runtime::ChatPayload;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Multipart field holding the chat payload as JSON text.
pub const PAYLOAD_FIELD: &str = "payload";

/// Multipart field holding the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Prefix of the per-request upload directory.
pub const UPLOAD_DIR_PREFIX: &str = "uploads-";

/// A file stored for the duration of one turn.
///
/// The directory and file are removed when this is dropped.
#[derive(Debug)]
pub struct Upload {
    _dir: TempDir,
    path: PathBuf,
}

impl Upload {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A parsed chat request.
#[derive(Debug)]
pub struct Ingested {
    pub payload: ChatPayload,
    pub upload: Option<Upload>,
}

/// Read a chat request as multipart form data or a JSON body.
pub async fn ingest(request: Request) -> ApiResult<Ingested> {
    if is_multipart(request.headers()) {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        return from_multipart(multipart).await;
    }

    let body = Bytes::from_request(request, &())
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Ingested {
        payload: parse_payload(&body)?,
        upload: None,
    })
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

fn parse_payload(raw: &[u8]) -> ApiResult<ChatPayload> {
    serde_json::from_slice(raw).map_err(|e| ApiError::BadRequest(format!("invalid chat payload: {e}")))
}

async fn from_multipart(mut multipart: Multipart) -> ApiResult<Ingested> {
    let mut payload = None;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(PAYLOAD_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                payload = Some(parse_payload(text.as_bytes())?);
            }
            Some(FILE_FIELD) => {
                // Plain text fields named "file" are not uploads.
                let Some(file_name) = field.file_name().map(str::to_owned) else {
                    continue;
                };
                let contents = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                if file_name.is_empty() && contents.is_empty() {
                    continue;
                }
                upload = Some(store_upload(&file_name, &contents).await?);
            }
            _ => {}
        }
    }

    Ok(Ingested {
        payload: payload.unwrap_or_default(),
        upload,
    })
}

/// Write `contents` into a fresh upload directory under a safe file name.
pub async fn store_upload(file_name: &str, contents: &[u8]) -> std::io::Result<Upload> {
    let dir = tempfile::Builder::new().prefix(UPLOAD_DIR_PREFIX).tempdir()?;
    let path = dir.path().join(sanitize_file_name(file_name));
    tokio::fs::write(&path, contents).await?;
    debug!(bytes = contents.len(), "stored upload");
    Ok(Upload { _dir: dir, path })
}

/// Reduce a client-supplied file name to a single safe path component.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    const BOUNDARY: &str = "X-BOUNDARY";

    fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request {
        let mut body = String::new();
        for (name, file_name, value) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: text/csv\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn sanitize_strips_directories_and_odd_chars() {
        assert_eq!(sanitize_file_name("flow.csv"), "flow.csv");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\data\\Main Hall.csv"), "Main_Hall.csv");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[tokio::test]
    async fn upload_lives_until_dropped() {
        let upload = store_upload("flow.csv", b"time,count\n").await.unwrap();
        let path = upload.path().to_path_buf();

        assert_eq!(std::fs::read(&path).unwrap(), b"time,count\n");
        assert_eq!(path.file_name().unwrap(), "flow.csv");
        let dir_name = path.parent().unwrap().file_name().unwrap().to_string_lossy().into_owned();
        assert!(dir_name.starts_with(UPLOAD_DIR_PREFIX));

        drop(upload);
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
    }

    #[tokio::test]
    async fn json_body() {
        let ingested = ingest(json_request(
            r#"{"messages":[{"role":"user","content":"hi"}],"buildingData":{"name":"Hall"}}"#,
        ))
        .await
        .unwrap();

        assert_eq!(ingested.payload.messages.len(), 1);
        assert!(ingested.payload.building_data.is_some());
        assert!(ingested.upload.is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let err = ingest(json_request("{not json")).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn multipart_with_payload_and_file() {
        let request = multipart_request(&[
            (PAYLOAD_FIELD, None, r#"{"messages":[{"role":"user","content":"Process my file"}]}"#),
            (FILE_FIELD, Some("flow.csv"), "time,count\n08:00,3"),
        ]);

        let ingested = ingest(request).await.unwrap();
        assert_eq!(ingested.payload.messages.len(), 1);

        let upload = ingested.upload.unwrap();
        assert_eq!(
            std::fs::read_to_string(upload.path()).unwrap(),
            "time,count\n08:00,3"
        );
    }

    #[tokio::test]
    async fn multipart_without_payload_defaults_to_empty() {
        let request = multipart_request(&[(FILE_FIELD, Some("flow.csv"), "a,b")]);

        let ingested = ingest(request).await.unwrap();
        assert!(ingested.payload.messages.is_empty());
        assert!(ingested.payload.building_data.is_none());
        assert!(ingested.upload.is_some());
    }

    #[tokio::test]
    async fn empty_file_field_is_not_an_upload() {
        let request = multipart_request(&[
            (PAYLOAD_FIELD, None, "{}"),
            (FILE_FIELD, Some(""), ""),
        ]);

        let ingested = ingest(request).await.unwrap();
        assert!(ingested.upload.is_none());
    }

    #[tokio::test]
    async fn malformed_payload_field_is_a_bad_request() {
        let request = multipart_request(&[(PAYLOAD_FIELD, None, "[1, 2")]);
        let err = ingest(request).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
