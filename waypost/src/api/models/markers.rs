use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use crate::store::Author;

/// Body of a save request.
///
/// `markers` must be present and an array; the elements themselves are
/// opaque records the service never inspects. `author` defaults to the bot
/// identity when omitted.
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub markers: Option<Vec<Value>>,
    #[serde(default)]
    pub author: Option<Author>,
}

/// Success payload of a save request.
///
/// The shas come out of GitHub's PUT response; they are `null` when the
/// upstream body could not be parsed as JSON.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SaveResponse {
    pub ok: bool,
    pub path: String,
    pub content_sha: Option<String>,
    pub commit_sha: Option<String>,
    pub branch: String,
}
