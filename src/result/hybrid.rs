//! Hybrid search result decoding
//!
//! A hybrid reply is one flat alternating key/value sequence over a
//! known key set. Unrecognized keys are skipped so newer servers can add
//! sections without breaking older clients.

use serde::Serialize;

use crate::error::{Result, SableError};
use crate::reply::Reply;

/// One value of a hybrid result row, after selective coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HybridValue {
    /// String-like leaf
    Text(String),

    /// Integer leaf
    Num(i64),

    /// Anything else, passed through opaque
    Other(Reply),
}

/// One fused result row: a keyed projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HybridRow {
    entries: Vec<(String, HybridValue)>,
}

impl HybridRow {
    /// Value under the given key, if present.
    pub fn get(&self, key: &str) -> Option<&HybridValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Text value under the given key.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(HybridValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Iterate entries in reply order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HybridValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Decoded hybrid search reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HybridResult {
    /// Total fused results across all pages
    pub total_results: i64,

    /// Server-reported execution time in milliseconds, when present
    pub execution_time: Option<f64>,

    /// Warnings the server attached to the reply
    pub warnings: Vec<String>,

    /// Fused result rows
    pub rows: Vec<HybridRow>,
}

/// Decode a hybrid search reply.
pub fn parse_hybrid(reply: Reply) -> Result<HybridResult> {
    let items = reply.into_array()?;
    if items.len() % 2 != 0 {
        return Err(SableError::Protocol(format!(
            "hybrid reply has {} leaves, expected key/value pairs",
            items.len()
        )));
    }

    let mut total_results: Option<i64> = None;
    let mut execution_time: Option<f64> = None;
    let mut warnings: Vec<String> = Vec::new();
    let mut rows: Vec<HybridRow> = Vec::new();

    let mut pairs = items.into_iter();
    while let (Some(key), Some(value)) = (pairs.next(), pairs.next()) {
        let key = key.into_text()?;
        match key.as_str() {
            "total_results" => total_results = Some(value.as_int()?),
            "execution_time" => execution_time = Some(value.to_f64()?),
            "warnings" => {
                for warning in value.into_array()? {
                    warnings.push(warning.into_text()?);
                }
            }
            "results" => {
                for row in value.into_array()? {
                    rows.push(parse_row(row)?);
                }
            }
            other => {
                // Unknown sections are skipped for forward compatibility.
                tracing::debug!(key = other, "skipping unrecognized hybrid reply section");
            }
        }
    }

    let total_results = total_results.ok_or_else(|| {
        SableError::Protocol("hybrid reply missing total_results".to_string())
    })?;

    Ok(HybridResult {
        total_results,
        execution_time,
        warnings,
        rows,
    })
}

fn parse_row(node: Reply) -> Result<HybridRow> {
    let items = node.into_array()?;
    if items.len() % 2 != 0 {
        return Err(SableError::Protocol(format!(
            "hybrid result row has {} leaves, expected key/value pairs",
            items.len()
        )));
    }

    let mut entries = Vec::with_capacity(items.len() / 2);
    let mut pairs = items.into_iter();
    while let (Some(key), Some(value)) = (pairs.next(), pairs.next()) {
        let key = key.into_text()?;
        let value = match value {
            Reply::Text(s) => HybridValue::Text(s),
            Reply::Int(i) => HybridValue::Num(i),
            other => HybridValue::Other(other),
        };
        entries.push((key, value));
    }
    Ok(HybridRow { entries })
}
