use std::path::PathBuf;

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::error::{ProbeError, ProbeResult};

static BODY_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+\.(json|xml|txt)$").expect("valid body file pattern"));

/// Request body plus the content type derived from it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBody {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "xml" => "application/xml",
        "txt" => "text/plain",
        // `json` and anything else the pattern might capture
        _ => "application/json",
    }
}

/// Turn a body token into request bytes.
///
/// Tokens ending in `.json`, `.xml` or `.txt` are read from disk and get a matching
/// content type. Any other token is sent verbatim with no content type. A file-like
/// token whose file cannot be read is an error, never a literal body.
pub async fn resolve_body(token: &str) -> ProbeResult<ResolvedBody> {
    let Some(extension) = BODY_FILE_PATTERN
        .captures(token)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        return Ok(ResolvedBody {
            bytes: Bytes::copy_from_slice(token.as_bytes()),
            content_type: None,
        });
    };

    let path = PathBuf::from(token);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| ProbeError::FileRead {
            path: path.clone(),
            source,
        })?;
    let content_type = content_type_for(extension);
    tracing::debug!(
        "Loaded {} byte body from {} as {}",
        bytes.len(),
        path.display(),
        content_type
    );

    Ok(ResolvedBody {
        bytes: Bytes::from(bytes),
        content_type: Some(content_type.to_string()),
    })
}
