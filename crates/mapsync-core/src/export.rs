//! Flatten stored markers into CSV, one row per marker.

use std::collections::HashMap;
use std::io::Write;

use chrono::SecondsFormat;
use regex::Regex;

use crate::error::{Error, Result};
use crate::models::Marker;

/// Fixed leading columns of every export
pub const BASE_COLUMNS: [&str; 8] = [
    "id",
    "url",
    "created_at",
    "address",
    "user",
    "category",
    "lat",
    "lng",
];

/// A named export column filled from responses whose question matches `matcher`.
#[derive(Debug, Clone)]
pub struct ResponseField {
    pub name: String,
    pub matcher: Regex,
}

impl ResponseField {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let matcher = Regex::new(pattern).map_err(|error| {
            Error::Config(format!(
                "parsing response field {name:?} matcher {pattern:?}: {error}"
            ))
        })?;
        Ok(Self { name, matcher })
    }

    #[must_use]
    pub fn matches(&self, question: &str) -> bool {
        self.matcher.is_match(question)
    }
}

/// Parse `name pattern name pattern ...` arguments into response fields.
pub fn parse_response_fields<S: AsRef<str>>(args: &[S]) -> Result<Vec<ResponseField>> {
    if args.len() % 2 != 0 {
        return Err(Error::Config(
            "response field mappings must be in pairs, eg: your_comment '^Your Comment' what_should_happen '^What should happen'"
                .to_string(),
        ));
    }

    args.chunks_exact(2)
        .map(|pair| ResponseField::new(pair[0].as_ref(), pair[1].as_ref()))
        .collect()
}

/// Header row for the given response fields
#[must_use]
pub fn header_row(fields: &[ResponseField]) -> Vec<String> {
    BASE_COLUMNS
        .iter()
        .map(|column| (*column).to_string())
        .chain(fields.iter().map(|field| field.name.clone()))
        .collect()
}

/// Values of each response field for one marker, keyed by field name.
///
/// Each response goes to the first field whose matcher accepts its question.
/// If several responses land on the same field, the last one wins.
#[must_use]
pub fn extract_fields(marker: &Marker, fields: &[ResponseField]) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for response in &marker.responses {
        if let Some(field) = fields.iter().find(|field| field.matches(&response.question)) {
            let answer = html_escape::decode_html_entities(&response.answer_text()).into_owned();
            values.insert(field.name.clone(), answer);
        }
    }
    values
}

/// Build the data row for one marker
#[must_use]
pub fn marker_row(marker: &Marker, fields: &[ResponseField]) -> Vec<String> {
    let mut values = extract_fields(marker, fields);

    let mut row = vec![
        marker.id.to_string(),
        marker.url.clone(),
        marker
            .created_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        marker.address.clone(),
        marker.user.clone(),
        marker.category.clone(),
        marker.latitude.clone(),
        marker.longitude.clone(),
    ];
    row.extend(
        fields
            .iter()
            .map(|field| values.remove(&field.name).unwrap_or_default()),
    );
    row
}

/// Write markers as CSV, oldest first.
pub fn write_csv<W: Write>(
    mut markers: Vec<Marker>,
    fields: &[ResponseField],
    out: W,
) -> Result<()> {
    markers.sort_by_key(|marker| marker.created_at);

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(header_row(fields))?;
    for marker in &markers {
        writer.write_record(marker_row(marker, fields))?;
    }
    writer.flush()?;

    tracing::debug!("Exported {} markers", markers.len());
    Ok(())
}
