//! Marker model

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Question type whose answer is a JSON file-reference object rather than text
pub const FILE_QUESTION: &str = "FileQuestion";

/// Stable remote identifier of a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub i64);

impl MarkerId {
    /// Get the raw integer value
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MarkerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A pin on the remote map, usually with associated responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub id: MarkerId,
    /// Submitter login
    pub user: String,
    pub created_at: DateTime<Utc>,
    pub address: String,
    pub category: String,
    /// Kept as the text the remote sent
    pub latitude: String,
    pub longitude: String,
    /// Deep link to the marker on the map
    pub url: String,
    /// Where this marker's responses are fetched from
    pub response_url: String,
    /// Still open for edits on the remote; once stored as `false` the marker is final
    pub editable: bool,
    pub responses: Vec<MarkerResponse>,
}

impl Marker {
    /// Whether the stored copy of this marker cannot be replaced by a later sync.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        !self.editable
    }
}

/// A question/answer pair given when the marker was created.
///
/// `answer` holds a JSON object when `question_type` is [`FILE_QUESTION`],
/// otherwise plain text that may contain HTML entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerResponse {
    pub mode: String,
    pub question_type: String,
    pub question: String,
    pub answer: Vec<u8>,
}

impl MarkerResponse {
    /// Answer bytes as text, replacing invalid UTF-8
    #[must_use]
    pub fn answer_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.answer)
    }
}
