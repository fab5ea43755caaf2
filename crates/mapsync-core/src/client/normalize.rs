//! Turn raw remote responses into stored values.

use crate::error::Result;
use crate::models::{MarkerResponse, FILE_QUESTION};

use super::wire::RawResponse;

/// Normalize one raw response record.
///
/// Returns `Ok(None)` when the response carries no answer worth keeping:
/// a missing, empty or `null` answer, or a text answer that is blank once
/// trimmed. File-question answers are kept as the JSON object text the
/// remote sent.
pub fn normalize_response(raw: RawResponse) -> Result<Option<MarkerResponse>> {
    let question = raw.question.unwrap_or_default().trim().to_string();
    let question_type = raw.question_type.unwrap_or_default();

    let answer = raw.answer.as_deref().map_or("", |value| value.get().trim());
    if answer.is_empty() || answer == "null" {
        return Ok(None);
    }

    let answer = if question_type == FILE_QUESTION {
        answer.as_bytes().to_vec()
    } else {
        let text: String = serde_json::from_str(answer)?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        text.as_bytes().to_vec()
    };

    Ok(Some(MarkerResponse {
        mode: raw.mode.unwrap_or_default(),
        question_type,
        question,
        answer,
    }))
}
