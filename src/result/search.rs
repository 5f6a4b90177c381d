//! Search result decoding
//!
//! A search reply is one flat array: the total hit count, then a
//! fixed-stride group of leaves per hit. The stride comes from the
//! query's optional-field flags via [`ResultShape`].

use serde::Serialize;

use crate::error::{Result, SableError};
use crate::reply::Reply;
use crate::result::ResultShape;

/// Output key a field path of `$` (the whole-document root) maps to.
const ROOT_FIELD_KEY: &str = "json";

/// One decoded search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Document key
    pub id: String,

    /// Relevance score, when the query asked for scores
    pub score: Option<f64>,

    /// Document payload, when the query asked for payloads
    pub payload: Option<String>,

    /// Stored field contents, in reply order
    pub fields: Vec<(String, String)>,
}

impl Document {
    /// Value of the named field, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Decoded search reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Total hits matching the query, across all pages
    pub total: i64,

    /// Hits on this page
    pub docs: Vec<Document>,
}

/// Decode a search reply under the given shape.
pub fn parse_search(reply: Reply, shape: &ResultShape) -> Result<SearchResult> {
    let mut items = reply.into_array()?.into_iter();

    let total = items
        .next()
        .ok_or_else(|| SableError::Protocol("search reply missing total hit count".to_string()))?
        .as_int()?;

    let rest: Vec<Reply> = items.collect();
    let stride = shape.stride();
    if rest.len() % stride != 0 {
        return Err(SableError::Protocol(format!(
            "search reply has {} leaves after the total, not a multiple of stride {}",
            rest.len(),
            stride
        )));
    }

    let mut docs = Vec::with_capacity(rest.len() / stride);
    let mut nodes = rest.into_iter();
    while let Some(id_node) = nodes.next() {
        let id = id_node.into_text()?;

        let score = if shape.with_scores {
            Some(next_leaf(&mut nodes, &id, "score")?.to_f64()?)
        } else {
            None
        };

        let payload = if shape.with_payloads {
            match next_leaf(&mut nodes, &id, "payload")? {
                Reply::Nil => None,
                node => Some(node.into_text()?),
            }
        } else {
            None
        };

        let fields = if shape.with_content {
            match next_leaf(&mut nodes, &id, "fields")? {
                Reply::Nil => Vec::new(),
                node => decode_fields(node)?,
            }
        } else {
            Vec::new()
        };

        docs.push(Document {
            id,
            score,
            payload,
            fields,
        });
    }

    Ok(SearchResult { total, docs })
}

fn next_leaf(
    nodes: &mut std::vec::IntoIter<Reply>,
    id: &str,
    what: &str,
) -> Result<Reply> {
    nodes.next().ok_or_else(|| {
        SableError::Protocol(format!("search reply ended before the {} of hit {:?}", what, id))
    })
}

/// Decode one hit's alternating name/value field array.
fn decode_fields(node: Reply) -> Result<Vec<(String, String)>> {
    let items = node.into_array()?;
    if items.len() % 2 != 0 {
        return Err(SableError::Protocol(format!(
            "field array has {} leaves, expected name/value pairs",
            items.len()
        )));
    }

    let mut fields = Vec::with_capacity(items.len() / 2);
    let mut pairs = items.into_iter();
    while let (Some(name), Some(value)) = (pairs.next(), pairs.next()) {
        let name = name.into_text()?;
        let value = value.into_text()?;
        // The whole-document root path gets a stable output key.
        let name = if name == "$" {
            ROOT_FIELD_KEY.to_string()
        } else {
            name
        };
        fields.push((name, value));
    }
    Ok(fields)
}
