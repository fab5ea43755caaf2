//! JSON shapes served by the remote map.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use serde_json::value::RawValue;
use url::Url;

use crate::error::{Error, Operation, Result};
use crate::models::{Marker, MarkerId};

#[derive(Debug, Deserialize)]
pub struct MarkerListing {
    #[serde(default)]
    pub markers: Vec<RemoteMarker>,
}

#[derive(Debug, Deserialize)]
pub struct RemoteMarker {
    pub id: i64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub category: Option<RemoteCategory>,
    /// Missing or `null` becomes the Unix epoch
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub editable: Option<bool>,
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lng: Option<String>,
    #[serde(default)]
    pub response_url: Option<String>,
    #[serde(default)]
    pub user: Option<RemoteUser>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoteCategory {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoteUser {
    #[serde(default)]
    pub login: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseListing {
    #[serde(default)]
    pub marker_response: Vec<RawResponse>,
}

/// One response record as served, before normalization
#[derive(Debug, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub question_type: Option<String>,
    /// Either a JSON string or, for file questions, a JSON object
    #[serde(default)]
    pub answer: Option<Box<RawValue>>,
}

impl RemoteMarker {
    /// Convert into a [`Marker`], resolving links against the map's base URL.
    ///
    /// Responses are left empty.
    pub fn into_marker(self, base_url: &Url) -> Result<Marker> {
        let id = MarkerId(self.id);
        let resolve = |reference: &str| {
            base_url.join(reference).map_err(|source| {
                Error::for_marker(
                    id,
                    Operation::ResolveUrl,
                    Error::InvalidUrl {
                        url: reference.to_string(),
                        source,
                    },
                )
            })
        };

        let url = resolve(&format!("#marker-{id}"))?;
        let response_url = resolve(self.response_url.as_deref().unwrap_or_default())?;

        Ok(Marker {
            id,
            user: self.user.and_then(|user| user.login).unwrap_or_default(),
            created_at: self
                .created_at
                .map(|created_at| created_at.with_timezone(&Utc))
                .unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            category: self
                .category
                .and_then(|category| category.name)
                .unwrap_or_default(),
            latitude: self.lat.unwrap_or_default(),
            longitude: self.lng.unwrap_or_default(),
            url: url.into(),
            response_url: response_url.into(),
            editable: self.editable.unwrap_or_default(),
            responses: Vec::new(),
        })
    }
}
