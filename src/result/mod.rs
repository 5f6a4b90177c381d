//! Result Decoding Module
//!
//! Decoders from reply trees into typed results. Replies are positionally
//! encoded and carry no shape information for optional fields, so each
//! decoder takes the shape knowledge as an explicit parameter derived
//! from the request that produced the reply. A reply inconsistent with
//! that shape fails fast; it signals a protocol mismatch, not a
//! recoverable condition.

mod aggregate;
mod hybrid;
mod search;

pub use aggregate::{parse_aggregate, AggregateResult, CursorHandle, Row};
pub use hybrid::{parse_hybrid, HybridResult, HybridRow, HybridValue};
pub use search::{parse_search, Document, SearchResult};

/// Which optional per-hit fields a search reply carries.
///
/// Determines the stride: how many reply leaves each hit occupies. The
/// reply itself does not say, so this travels from the query builder to
/// the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultShape {
    /// A score leaf follows each id
    pub with_scores: bool,

    /// A payload leaf follows each id (and score, if any)
    pub with_payloads: bool,

    /// A field array closes out each hit
    pub with_content: bool,
}

impl ResultShape {
    /// Ids plus stored content; the default query shape.
    pub fn content_only() -> Self {
        Self {
            with_scores: false,
            with_payloads: false,
            with_content: true,
        }
    }

    /// Bare ids, nothing else per hit.
    pub fn ids_only() -> Self {
        Self {
            with_scores: false,
            with_payloads: false,
            with_content: false,
        }
    }

    /// Reply leaves per hit: 1 to 4.
    pub fn stride(&self) -> usize {
        1 + usize::from(self.with_scores)
            + usize::from(self.with_payloads)
            + usize::from(self.with_content)
    }
}
