//! Query Builders Module
//!
//! Fluent request builders for the three query commands. Each builder is
//! a mutable accumulator of ordered optional clauses; serialization
//! freezes it and emits one token sequence in the server-mandated clause
//! order, cross-checked against an independently computed token count.

mod aggregate;
mod hybrid;
mod search;

pub use aggregate::{
    cursor_del_args, cursor_read_args, AggregateRequest, CursorSpec, GroupBy, Reducer,
};
pub use hybrid::HybridQuery;
pub use search::SearchQuery;

use crate::args::Arg;
use crate::error::{Result, SableError};

/// Sort direction for a SORTBY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn wire_name(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// One bound of a numeric range filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeBound {
    Inclusive(f64),
    Exclusive(f64),
}

impl RangeBound {
    fn token(self) -> Arg {
        match self {
            RangeBound::Inclusive(v) => Arg::Float(v),
            // The server grammar marks exclusive bounds with a paren prefix.
            RangeBound::Exclusive(v) => Arg::Text(format!("({}", v)),
        }
    }
}

/// Numeric range filter on one field.
///
/// An upper bound requires a lower bound; a filter with only a lower
/// bound is open above.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericFilter {
    field: String,
    lower: Option<RangeBound>,
    upper: Option<RangeBound>,
}

impl NumericFilter {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            lower: None,
            upper: None,
        }
    }

    /// Inclusive lower bound.
    pub fn min(mut self, value: f64) -> Self {
        self.lower = Some(RangeBound::Inclusive(value));
        self
    }

    /// Exclusive lower bound.
    pub fn min_exclusive(mut self, value: f64) -> Self {
        self.lower = Some(RangeBound::Exclusive(value));
        self
    }

    /// Inclusive upper bound.
    pub fn max(mut self, value: f64) -> Self {
        self.upper = Some(RangeBound::Inclusive(value));
        self
    }

    /// Exclusive upper bound.
    pub fn max_exclusive(mut self, value: f64) -> Self {
        self.upper = Some(RangeBound::Exclusive(value));
        self
    }

    fn validate(&self) -> Result<()> {
        if self.lower.is_none() && self.upper.is_some() {
            return Err(SableError::Config(format!(
                "range filter on {:?} has an upper bound but no lower bound",
                self.field
            )));
        }
        if self.lower.is_none() && self.upper.is_none() {
            return Err(SableError::Config(format!(
                "range filter on {:?} has no bounds",
                self.field
            )));
        }
        Ok(())
    }

    /// FILTER keyword, field, min, max.
    fn write_args(&self, out: &mut Vec<Arg>) {
        out.push("FILTER".into());
        out.push(self.field.as_str().into());
        match self.lower {
            Some(bound) => out.push(bound.token()),
            None => out.push("-inf".into()),
        }
        match self.upper {
            Some(bound) => out.push(bound.token()),
            None => out.push("+inf".into()),
        }
    }
}

/// Which stored attributes an aggregation/hybrid pipeline loads.
#[derive(Debug, Clone, PartialEq)]
pub enum Load {
    /// Load every stored attribute (`LOAD *`)
    All,

    /// Load the named attributes
    Fields(Vec<String>),
}

/// Projection step of an aggregation/hybrid pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Apply {
    expr: String,
    alias: String,
}

impl Apply {
    pub fn new(expr: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            alias: alias.into(),
        }
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        out.push("APPLY".into());
        out.push(self.expr.as_str().into());
        out.push("AS".into());
        out.push(self.alias.as_str().into());
    }
}

/// Sort step of an aggregation/hybrid pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SortClause {
    properties: Vec<(String, SortOrder)>,
    max: Option<u64>,
}

impl SortClause {
    fn num_args(&self) -> usize {
        2 + 2 * self.properties.len() + if self.max.is_some() { 2 } else { 0 }
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        out.push("SORTBY".into());
        out.push((2 * self.properties.len()).into());
        for (property, order) in &self.properties {
            out.push(property.as_str().into());
            out.push(order.wire_name().into());
        }
        if let Some(max) = self.max {
            out.push("MAX".into());
            out.push(max.into());
        }
    }
}

/// A request that carries a protocol dialect version.
///
/// The client's default-dialect policy works through this seam: any
/// request supporting a dialect gets the client-wide default injected
/// right before serialization, unless one was set explicitly.
pub trait DialectSupport {
    /// Explicitly set dialect, if any.
    fn dialect(&self) -> Option<u32>;

    /// Set the dialect version.
    fn set_dialect(&mut self, version: u32);
}

// -----------------------------------------------------------------------------
// Shared emission helpers (the clause shapes every builder repeats)
// -----------------------------------------------------------------------------

fn params_len(params: &[(String, Arg)]) -> usize {
    if params.is_empty() {
        0
    } else {
        2 + 2 * params.len()
    }
}

fn write_params(out: &mut Vec<Arg>, params: &[(String, Arg)]) {
    if params.is_empty() {
        return;
    }
    out.push("PARAMS".into());
    out.push((2 * params.len()).into());
    for (name, value) in params {
        out.push(name.as_str().into());
        out.push(value.clone());
    }
}

fn load_len(load: &Option<Load>) -> usize {
    match load {
        None => 0,
        Some(Load::All) => 2,
        Some(Load::Fields(fields)) => 2 + fields.len(),
    }
}

fn write_load(out: &mut Vec<Arg>, load: &Option<Load>) {
    match load {
        None => {}
        Some(Load::All) => {
            out.push("LOAD".into());
            out.push("*".into());
        }
        Some(Load::Fields(fields)) => {
            out.push("LOAD".into());
            out.push(fields.len().into());
            for field in fields {
                out.push(field.as_str().into());
            }
        }
    }
}

/// Reject an explicitly supplied empty list for a clause requiring one
/// or more elements.
fn require_non_empty(what: &str, len: usize) -> Result<()> {
    if len == 0 {
        return Err(SableError::Config(format!(
            "{} requires at least one element",
            what
        )));
    }
    Ok(())
}
