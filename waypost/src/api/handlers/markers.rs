//! The save handler: accepts a JSON array of map markers and commits it to
//! the configured GitHub repository.
//!
//! The flow is strictly linear: method guard, parse, validate, config guard,
//! read the current revision pointer, write the new content, report the
//! outcome. Exactly one remote read and at most one remote write happen per
//! request; nothing is retried. The write is conditioned on whatever sha the
//! read returned moments earlier, so a concurrent writer can still win the
//! race — that gap is inherited from the original design and kept as-is.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::Method,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::{
    AppState,
    api::models::markers::{SaveRequest, SaveResponse},
    errors::{Error, Result},
    store::{FileLocation, PutFile},
};

#[tracing::instrument(skip_all)]
pub async fn save(State(state): State<AppState>, method: Method, body: Bytes) -> Result<Json<SaveResponse>> {
    // OPTIONS is short-circuited by the CORS middleware before routing.
    if method != Method::POST {
        return Err(Error::MethodNotAllowed);
    }

    // Malformed JSON leaves `markers` unset and is reported the same way.
    let request: SaveRequest = serde_json::from_slice(&body).unwrap_or(SaveRequest {
        markers: None,
        author: None,
    });
    let markers = request.markers.ok_or_else(|| Error::BadRequest {
        message: "Missing markers array".to_string(),
    })?;
    let author = request.author.unwrap_or_default();

    let settings = state.config.require_store()?;
    let location = FileLocation {
        owner: settings.owner,
        repo: settings.repo,
        path: settings.path,
        branch: settings.branch,
    };

    // 1) Current revision pointer, if the file exists.
    let read = state.store.get_file(&location, &settings.token).await?;
    let sha = if read.is_success() {
        serde_json::from_str::<Value>(&read.body)
            .ok()
            .and_then(|js| js.get("sha").and_then(Value::as_str).map(str::to_owned))
    } else if read.status == 404 {
        // File does not exist yet; the write creates it.
        None
    } else {
        return Err(Error::UpstreamRead {
            status: read.status,
            body: read.body,
        });
    };

    // 2) Commit new content.
    let rendered = serde_json::to_string_pretty(&markers).map_err(anyhow::Error::from)?;
    let file = PutFile {
        message: format!(
            "Update {} ({})",
            location.path,
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        content: STANDARD.encode(rendered),
        branch: location.branch.clone(),
        sha,
        committer: author.clone(),
        author,
    };

    let written = state.store.put_file(&location, &settings.token, &file).await?;
    if !written.is_success() {
        return Err(Error::UpstreamWrite {
            status: written.status,
            body: written.body,
        });
    }

    // GitHub answers with nested content/commit objects; tolerate anything
    // else by reporting null shas.
    let parsed: Value = serde_json::from_str(&written.body).unwrap_or_else(|_| Value::String(written.body.clone()));
    Ok(Json(SaveResponse {
        ok: true,
        path: location.path,
        content_sha: parsed.pointer("/content/sha").and_then(Value::as_str).map(str::to_owned),
        commit_sha: parsed.pointer("/commit/sha").and_then(Value::as_str).map(str::to_owned),
        branch: location.branch,
    }))
}
