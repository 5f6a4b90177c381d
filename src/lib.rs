//! # SableKV Search Client
//!
//! Command-construction and reply-decoding layer for SableKV's extended
//! query/search protocol:
//! - Fluent request builders (index schema, search, aggregation, hybrid)
//! - Closed option families (scorers, fusion strategies, vector methods)
//!   that emit their own token sub-sequences
//! - Reply decoders turning positionally-encoded reply trees into typed
//!   results
//!
//! Every builder predicts its token count independently of its emission
//! and the two are checked against each other on serialization; the
//! server grammar is variadic and order-sensitive, and this is the one
//! client-side guard against drift.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Application                             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ mutate builders / read typed results
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    SearchClient                              │
//! │        (default-dialect policy, cursor affinity)             │
//! └───────┬─────────────────────────────────────────┬───────────┘
//!         │ token sequence                          │ reply tree
//!         ▼                                         ▼
//!  ┌─────────────┐   schema / options        ┌─────────────┐
//!  │   Builders  │──────────────────────────▶│   Decoders  │
//!  │ (query/*)   │   shape knowledge         │ (result/*)  │
//!  └─────────────┘                           └─────────────┘
//!         │                                         ▲
//!         ▼                                         │
//! ┌─────────────────────────────────────────────────────────────┐
//! │               Transport (external collaborator)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;

pub mod args;
pub mod client;
pub mod options;
pub mod query;
pub mod reply;
pub mod result;
pub mod schema;
pub mod transport;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use args::{Arg, Emit};
pub use client::{CursorIter, SearchClient};
pub use error::{Result, SableError};
pub use options::{Combiner, Scorer, VectorInput, VectorMethod};
pub use query::{
    AggregateRequest, CursorSpec, DialectSupport, GroupBy, HybridQuery, NumericFilter, Reducer,
    SearchQuery, SortOrder,
};
pub use reply::Reply;
pub use result::{
    AggregateResult, CursorHandle, Document, HybridResult, HybridRow, HybridValue, ResultShape,
    Row, SearchResult,
};
pub use schema::{
    CoordSystem, DataKind, DistanceMetric, Field, GeoField, GeoShapeField, NumericField, Schema,
    TagField, TextField, VectorAlgorithm, VectorField, VectorType,
};
pub use transport::{ShardLocation, Transport};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
