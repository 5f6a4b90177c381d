//! Aggregation result decoding
//!
//! An aggregation reply is an array: the total record count, then one
//! array per row alternating key/value. A cursor-carrying reply wraps
//! that body in a two-element array with the cursor id second. Results
//! produced through a cursor remember the shard that produced them so
//! follow-up reads and the final delete route to the same place.

use serde::Serialize;

use crate::error::{Result, SableError};
use crate::reply::Reply;
use crate::transport::ShardLocation;

/// One decoded aggregation record: a keyed projection.
///
/// Values stay as reply subtrees, so nested arrays (e.g. TOLIST output)
/// come through losslessly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    entries: Vec<(String, Reply)>,
}

impl Row {
    /// Value under the given key, if present.
    pub fn get(&self, key: &str) -> Option<&Reply> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Text value under the given key.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(Reply::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Numeric value under the given key; text leaves parse.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.to_f64().ok())
    }

    /// Number of key/value entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the row carries no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in reply order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Reply)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Continuation state of a paginated aggregation.
///
/// Follow-up reads and the final delete must target the shard that
/// produced the cursor; `shard` carries that affinity as data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CursorHandle {
    /// Index the cursor belongs to
    pub index: String,

    /// Server-side cursor id; zero means exhausted
    pub cursor_id: u64,

    /// Shard that produced the cursor, when the transport is shard-aware
    pub shard: Option<ShardLocation>,
}

/// Decoded aggregation reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    /// Total records produced by the pipeline
    pub total: i64,

    /// Records on this page
    pub rows: Vec<Row>,

    /// Continuation cursor; `None` once the server reports exhaustion
    /// or when the request did not page
    pub cursor: Option<CursorHandle>,
}

impl AggregateResult {
    /// The continuation cursor, or a protocol error for a result that
    /// never had one. Guards cursor-only operations.
    pub fn cursor(&self) -> Result<&CursorHandle> {
        self.cursor.as_ref().ok_or_else(|| {
            SableError::Protocol(
                "aggregation result carries no cursor; the request did not page".to_string(),
            )
        })
    }
}

/// Decode an aggregation reply.
///
/// `cursor_carrying` must reflect whether the request paged: the reply
/// does not say on its own. `index` and `shard` seed the cursor handle.
pub fn parse_aggregate(
    reply: Reply,
    cursor_carrying: bool,
    index: &str,
    shard: Option<ShardLocation>,
) -> Result<AggregateResult> {
    if !cursor_carrying {
        let (total, rows) = parse_body(reply)?;
        return Ok(AggregateResult {
            total,
            rows,
            cursor: None,
        });
    }

    let outer = reply.into_array()?;
    if outer.len() != 2 {
        return Err(SableError::Protocol(format!(
            "cursor-carrying aggregation reply has {} elements, expected body and cursor id",
            outer.len()
        )));
    }
    let mut outer = outer.into_iter();
    let body = outer.next().ok_or_else(|| {
        SableError::Protocol("cursor-carrying aggregation reply truncated".to_string())
    })?;
    let cursor_node = outer.next().ok_or_else(|| {
        SableError::Protocol("cursor-carrying aggregation reply truncated".to_string())
    })?;

    let cursor_id = cursor_node.as_int()?;
    let (total, rows) = parse_body(body)?;
    let cursor = if cursor_id != 0 {
        Some(CursorHandle {
            index: index.to_string(),
            cursor_id: cursor_id as u64,
            shard,
        })
    } else {
        None
    };

    Ok(AggregateResult {
        total,
        rows,
        cursor,
    })
}

fn parse_body(body: Reply) -> Result<(i64, Vec<Row>)> {
    let mut items = body.into_array()?.into_iter();
    let total = items
        .next()
        .ok_or_else(|| {
            SableError::Protocol("aggregation reply missing total record count".to_string())
        })?
        .as_int()?;

    let mut rows = Vec::new();
    for node in items {
        rows.push(parse_row(node)?);
    }
    Ok((total, rows))
}

fn parse_row(node: Reply) -> Result<Row> {
    let items = node.into_array()?;
    if items.len() % 2 != 0 {
        return Err(SableError::Protocol(format!(
            "aggregation row has {} leaves, expected key/value pairs",
            items.len()
        )));
    }

    let mut entries = Vec::with_capacity(items.len() / 2);
    let mut pairs = items.into_iter();
    while let (Some(key), Some(value)) = (pairs.next(), pairs.next()) {
        entries.push((key.into_text()?, value));
    }
    Ok(Row { entries })
}
