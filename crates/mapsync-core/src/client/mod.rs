//! HTTP client for the remote civic-engagement map.
//!
//! The map publishes a marker listing under its base URL and one response
//! document per marker. Both are plain JSON over GET; no authentication,
//! retries or caching are involved.

mod normalize;
mod wire;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{Error, Result};
use crate::models::Marker;
use crate::sync::MarkerSource;

pub use normalize::normalize_response;
pub use wire::RawResponse;

use wire::{MarkerListing, ResponseListing};

const MARKERS_PATH: &str = "markers?filter=other_users";

/// Fetches markers and their responses from one map.
#[derive(Clone)]
pub struct MapClient {
    base_url: Url,
    http: reqwest::Client,
}

impl MapClient {
    /// Create a client for the map viewed at `base_url`,
    /// e.g. `https://www.shapeyourcityhalifax.ca/mobilityresponse/maps/streets`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("mapsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| Error::Config(format!("building HTTP client: {error}")))?;

        Ok(Self { base_url, http })
    }

    /// The normalized base URL (always ends with `/`)
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch all markers on the map. Responses are not filled in.
    pub async fn list_markers(&self, cancel: &CancellationToken) -> Result<Vec<Marker>> {
        let markers_url = self
            .base_url
            .join(MARKERS_PATH)
            .map_err(|source| Error::InvalidUrl {
                url: MARKERS_PATH.to_string(),
                source,
            })?;

        let body = self.get(markers_url.as_str(), cancel).await?;
        let listing: MarkerListing = serde_json::from_slice(&body)?;
        tracing::debug!("Listed {} remote markers", listing.markers.len());

        listing
            .markers
            .into_iter()
            .map(|remote| remote.into_marker(&self.base_url))
            .collect()
    }

    /// Fetch the responses for `marker` and replace `marker.responses` with
    /// the normalized, non-empty subset in source order.
    pub async fn fill_responses(
        &self,
        marker: &mut Marker,
        cancel: &CancellationToken,
    ) -> Result<()> {
        marker.responses.clear();

        let body = self.get(&marker.response_url, cancel).await?;
        let listing: ResponseListing = serde_json::from_slice(&body)?;

        for raw in listing.marker_response {
            if let Some(response) = normalize_response(raw)? {
                marker.responses.push(response);
            }
        }

        Ok(())
    }

    async fn get(&self, url: &str, cancel: &CancellationToken) -> Result<Vec<u8>> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            result = self.fetch(url) => result,
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;
        Ok(body.to_vec())
    }
}

impl MarkerSource for MapClient {
    async fn list_markers(&self, cancel: &CancellationToken) -> Result<Vec<Marker>> {
        Self::list_markers(self, cancel).await
    }

    async fn fill_responses(&self, marker: &mut Marker, cancel: &CancellationToken) -> Result<()> {
        Self::fill_responses(self, marker, cancel).await
    }
}

/// Parse a base URL and make sure its path ends with `/` so relative
/// references resolve beneath the map rather than beside it.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::Config("base URL must not be empty".to_string()));
    }

    let mut url = Url::parse(raw)
        .map_err(|error| Error::Config(format!("parsing base URL {raw:?}: {error}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "base URL {raw:?} must use http:// or https://"
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
