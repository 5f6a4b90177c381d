//! Reply tree
//!
//! The transport collaborator hands back replies already decoded from the
//! wire framing into a generic recursive tree of scalar leaves and ordered
//! arrays. The tree carries no self-describing shape information for
//! optional fields; the decoders in `result` supply that externally.

use serde::Serialize;

use crate::error::{Result, SableError};

/// One node of a decoded server reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Reply {
    /// Null leaf
    Nil,

    /// Integer leaf
    Int(i64),

    /// Text leaf
    Text(String),

    /// Ordered array of child nodes
    Array(Vec<Reply>),
}

impl Reply {
    /// Short name of this node's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Nil => "nil",
            Reply::Int(_) => "integer",
            Reply::Text(_) => "text",
            Reply::Array(_) => "array",
        }
    }

    /// Unwrap an array node, consuming the reply.
    pub fn into_array(self) -> Result<Vec<Reply>> {
        match self {
            Reply::Array(items) => Ok(items),
            other => Err(SableError::Protocol(format!(
                "expected array reply, got {}",
                other.kind()
            ))),
        }
    }

    /// Integer value of this leaf.
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Reply::Int(i) => Ok(*i),
            other => Err(SableError::Protocol(format!(
                "expected integer reply, got {}",
                other.kind()
            ))),
        }
    }

    /// Text content of this leaf.
    pub fn as_text(&self) -> Result<&str> {
        match self {
            Reply::Text(s) => Ok(s),
            other => Err(SableError::Protocol(format!(
                "expected text reply, got {}",
                other.kind()
            ))),
        }
    }

    /// Unwrap a text leaf, consuming the reply.
    pub fn into_text(self) -> Result<String> {
        match self {
            Reply::Text(s) => Ok(s),
            other => Err(SableError::Protocol(format!(
                "expected text reply, got {}",
                other.kind()
            ))),
        }
    }

    /// Numeric value of this leaf: integer leaves widen, text leaves parse.
    ///
    /// Scores travel as text on the wire, so both leaf kinds are accepted.
    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Reply::Int(i) => Ok(*i as f64),
            Reply::Text(s) => s.parse::<f64>().map_err(|_| {
                SableError::Protocol(format!("expected numeric reply, got text {:?}", s))
            }),
            other => Err(SableError::Protocol(format!(
                "expected numeric reply, got {}",
                other.kind()
            ))),
        }
    }

    /// True for `Nil`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }
}
