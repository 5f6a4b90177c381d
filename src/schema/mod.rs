//! Schema Module
//!
//! Builds index-definition commands. A schema accumulates index-level
//! clauses and field descriptors, then serializes into one ordered token
//! sequence:
//!
//! ```text
//! SEARCH.CREATE <index> [ON HASH|JSON] [PREFIX n p...] [FILTER expr]
//!               [LANGUAGE l] [SCORE s] SCHEMA <field>...
//! ```

mod field;
mod vector;

pub use field::{
    CoordSystem, Field, GeoField, GeoShapeField, NumericField, TagField, TextField, VectorField,
    DEFAULT_TAG_SEPARATOR, DEFAULT_TEXT_WEIGHT,
};
pub use vector::{
    DistanceMetric, VectorAlgorithm, VectorType, DEFAULT_BLOCK_SIZE, DEFAULT_HNSW_EF_CONSTRUCTION,
    DEFAULT_HNSW_EF_RUNTIME, DEFAULT_HNSW_EPSILON, DEFAULT_HNSW_M, DEFAULT_SVS_CONSTRUCTION_WINDOW,
    DEFAULT_SVS_GRAPH_MAX_DEGREE, DEFAULT_SVS_SEARCH_WINDOW,
};

use crate::args::{Arg, Emit};
use crate::error::{Result, SableError};

/// What kind of stored values the index covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Hash,
    Json,
}

impl DataKind {
    fn wire_name(self) -> &'static str {
        match self {
            DataKind::Hash => "HASH",
            DataKind::Json => "JSON",
        }
    }
}

/// Index definition builder.
///
/// Accumulates clauses through chained mutation, then serializes with
/// [`Schema::build_args`]. Serialization freezes the definition: any
/// mutator called afterwards panics.
#[derive(Debug, Clone)]
pub struct Schema {
    index: String,
    on: Option<DataKind>,
    prefixes: Vec<String>,
    filter: Option<String>,
    language: Option<String>,
    score: Option<f64>,
    fields: Vec<Field>,
    frozen: bool,
}

impl Schema {
    /// Start a definition for the named index.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            on: None,
            prefixes: Vec::new(),
            filter: None,
            language: None,
            score: None,
            fields: Vec::new(),
            frozen: false,
        }
    }

    fn assert_unfrozen(&self) {
        assert!(
            !self.frozen,
            "index definition already serialized; build a new Schema instead of mutating this one"
        );
    }

    /// Restrict the index to hash or JSON values.
    pub fn on(&mut self, kind: DataKind) -> &mut Self {
        self.assert_unfrozen();
        self.on = Some(kind);
        self
    }

    /// Add a key prefix the index should cover.
    pub fn prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.assert_unfrozen();
        self.prefixes.push(prefix.into());
        self
    }

    /// Filter expression selecting which documents to index.
    pub fn filter(&mut self, expr: impl Into<String>) -> &mut Self {
        self.assert_unfrozen();
        self.filter = Some(expr.into());
        self
    }

    /// Default language for stemming.
    pub fn language(&mut self, language: impl Into<String>) -> &mut Self {
        self.assert_unfrozen();
        self.language = Some(language.into());
        self
    }

    /// Default document score.
    pub fn score(&mut self, score: f64) -> &mut Self {
        self.assert_unfrozen();
        self.score = Some(score);
        self
    }

    /// Append a field descriptor.
    pub fn field(&mut self, field: impl Into<Field>) -> &mut Self {
        self.assert_unfrozen();
        self.fields.push(field.into());
        self
    }

    /// Predicted token count, written independently of the emission.
    fn num_args(&self) -> usize {
        2 + if self.on.is_some() { 2 } else { 0 }
            + if self.prefixes.is_empty() {
                0
            } else {
                2 + self.prefixes.len()
            }
            + if self.filter.is_some() { 2 } else { 0 }
            + if self.language.is_some() { 2 } else { 0 }
            + if self.score.is_some() { 2 } else { 0 }
            + 1
            + self.fields.iter().map(Emit::num_args).sum::<usize>()
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        out.push("SEARCH.CREATE".into());
        out.push(self.index.as_str().into());
        if let Some(kind) = self.on {
            out.push("ON".into());
            out.push(kind.wire_name().into());
        }
        if !self.prefixes.is_empty() {
            out.push("PREFIX".into());
            out.push(self.prefixes.len().into());
            for prefix in &self.prefixes {
                out.push(prefix.as_str().into());
            }
        }
        if let Some(filter) = &self.filter {
            out.push("FILTER".into());
            out.push(filter.as_str().into());
        }
        if let Some(language) = &self.language {
            out.push("LANGUAGE".into());
            out.push(language.as_str().into());
        }
        if let Some(score) = self.score {
            out.push("SCORE".into());
            out.push(score.into());
        }
        out.push("SCHEMA".into());
        for field in &self.fields {
            field.emit(out);
        }
    }

    /// Serialize into the full token sequence and freeze the definition.
    ///
    /// Serializing again is legal and yields an identical sequence;
    /// mutating after this call panics.
    pub fn build_args(&mut self) -> Result<Vec<Arg>> {
        if self.fields.is_empty() {
            return Err(SableError::Config(format!(
                "index definition for {:?} has no fields; at least one is required",
                self.index
            )));
        }
        self.frozen = true;

        let predicted = self.num_args();
        let mut out = Vec::with_capacity(predicted);
        self.write_args(&mut out);
        debug_assert_eq!(
            out.len(),
            predicted,
            "predicted token count diverged from emitted token count"
        );
        tracing::debug!(index = %self.index, tokens = out.len(), "built index definition");
        Ok(out)
    }
}
