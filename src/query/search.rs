//! Search query builder
//!
//! Builds the primary full-text query command:
//!
//! ```text
//! SEARCH.QUERY <index> <query> [NOCONTENT] [VERBATIM] [WITHSCORES]
//!              [WITHPAYLOADS] [SCORER ...] [INFIELDS n f...]
//!              [RETURN n f...] [SORTBY f ASC|DESC] [FILTER f min max]*
//!              [LIMIT off num] [PARAMS 2n k v...] [EXPLAINSCORE]
//!              [TIMEOUT ms] [DIALECT d]
//! ```
//!
//! The flags requesting optional per-hit reply fields also determine the
//! reply's stride, so the builder is the source of truth for the
//! [`ResultShape`] handed to the decoder.

use crate::args::{Arg, Emit};
use crate::error::Result;
use crate::options::{Scorer, VectorInput};
use crate::query::{DialectSupport, NumericFilter, SortOrder};
use crate::query::{params_len, require_non_empty, write_params};
use crate::result::ResultShape;

/// Full-text search request.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    index: String,
    query: String,
    no_content: bool,
    verbatim: bool,
    with_scores: bool,
    with_payloads: bool,
    scorer: Option<Scorer>,
    in_fields: Option<Vec<String>>,
    return_fields: Option<Vec<String>>,
    sort_by: Option<(String, SortOrder)>,
    filters: Vec<NumericFilter>,
    limit: Option<(u64, u64)>,
    params: Vec<(String, Arg)>,
    explain_score: bool,
    timeout: Option<u64>,
    dialect: Option<u32>,
    frozen: bool,
}

impl SearchQuery {
    /// Query `query` against the named index.
    pub fn new(index: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            query: query.into(),
            no_content: false,
            verbatim: false,
            with_scores: false,
            with_payloads: false,
            scorer: None,
            in_fields: None,
            return_fields: None,
            sort_by: None,
            filters: Vec::new(),
            limit: None,
            params: Vec::new(),
            explain_score: false,
            timeout: None,
            dialect: None,
            frozen: false,
        }
    }

    fn assert_unfrozen(&self) {
        assert!(
            !self.frozen,
            "search query already serialized; build a new SearchQuery instead of mutating this one"
        );
    }

    /// Return document ids only, no stored content.
    pub fn no_content(&mut self) -> &mut Self {
        self.assert_unfrozen();
        self.no_content = true;
        self
    }

    /// Disable stemming-based query expansion.
    pub fn verbatim(&mut self) -> &mut Self {
        self.assert_unfrozen();
        self.verbatim = true;
        self
    }

    /// Include each hit's relevance score in the reply.
    pub fn with_scores(&mut self) -> &mut Self {
        self.assert_unfrozen();
        self.with_scores = true;
        self
    }

    /// Include each hit's payload in the reply.
    pub fn with_payloads(&mut self) -> &mut Self {
        self.assert_unfrozen();
        self.with_payloads = true;
        self
    }

    /// Scoring function for this query.
    pub fn scorer(&mut self, scorer: Scorer) -> &mut Self {
        self.assert_unfrozen();
        self.scorer = Some(scorer);
        self
    }

    /// Restrict matching to the named fields.
    pub fn in_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assert_unfrozen();
        self.in_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Return only the named fields of each hit.
    pub fn return_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assert_unfrozen();
        self.return_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Sort hits by a sortable field.
    pub fn sort_by(&mut self, field: impl Into<String>, order: SortOrder) -> &mut Self {
        self.assert_unfrozen();
        self.sort_by = Some((field.into(), order));
        self
    }

    /// Add a numeric range filter.
    pub fn filter(&mut self, filter: NumericFilter) -> &mut Self {
        self.assert_unfrozen();
        self.filters.push(filter);
        self
    }

    /// Paginate: skip `offset` hits, return at most `num`.
    pub fn limit(&mut self, offset: u64, num: u64) -> &mut Self {
        self.assert_unfrozen();
        self.limit = Some((offset, num));
        self
    }

    /// Bind a named query parameter.
    pub fn param(&mut self, name: impl Into<String>, value: impl Into<Arg>) -> &mut Self {
        self.assert_unfrozen();
        self.params.push((name.into(), value.into()));
        self
    }

    /// Bind a named parameter to a dense query vector.
    pub fn vector_param(&mut self, name: impl Into<String>, values: &[f32]) -> &mut Self {
        self.assert_unfrozen();
        let token = VectorInput::Dense(values.to_vec()).token();
        self.params.push((name.into(), token));
        self
    }

    /// Ask the server to explain per-hit scoring.
    pub fn explain_score(&mut self) -> &mut Self {
        self.assert_unfrozen();
        self.explain_score = true;
        self
    }

    /// Server-side timeout in milliseconds.
    pub fn timeout(&mut self, ms: u64) -> &mut Self {
        self.assert_unfrozen();
        self.timeout = Some(ms);
        self
    }

    /// Index this query targets.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Reply shape the decoder needs for this query's optional-field flags.
    pub fn result_shape(&self) -> ResultShape {
        ResultShape {
            with_scores: self.with_scores,
            with_payloads: self.with_payloads,
            with_content: !self.no_content,
        }
    }

    /// Predicted token count, written independently of the emission.
    fn num_args(&self) -> usize {
        let flag = |b: bool| usize::from(b);
        3 + flag(self.no_content)
            + flag(self.verbatim)
            + flag(self.with_scores)
            + flag(self.with_payloads)
            + self.scorer.as_ref().map_or(0, |s| 1 + s.num_args())
            + self.in_fields.as_ref().map_or(0, |f| 2 + f.len())
            + self.return_fields.as_ref().map_or(0, |f| 2 + f.len())
            + if self.sort_by.is_some() { 3 } else { 0 }
            + 4 * self.filters.len()
            + if self.limit.is_some() { 3 } else { 0 }
            + params_len(&self.params)
            + flag(self.explain_score)
            + if self.timeout.is_some() { 2 } else { 0 }
            + if self.dialect.is_some() { 2 } else { 0 }
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        out.push("SEARCH.QUERY".into());
        out.push(self.index.as_str().into());
        out.push(self.query.as_str().into());
        if self.no_content {
            out.push("NOCONTENT".into());
        }
        if self.verbatim {
            out.push("VERBATIM".into());
        }
        if self.with_scores {
            out.push("WITHSCORES".into());
        }
        if self.with_payloads {
            out.push("WITHPAYLOADS".into());
        }
        if let Some(scorer) = &self.scorer {
            out.push("SCORER".into());
            scorer.emit(out);
        }
        if let Some(fields) = &self.in_fields {
            out.push("INFIELDS".into());
            out.push(fields.len().into());
            for field in fields {
                out.push(field.as_str().into());
            }
        }
        if let Some(fields) = &self.return_fields {
            out.push("RETURN".into());
            out.push(fields.len().into());
            for field in fields {
                out.push(field.as_str().into());
            }
        }
        if let Some((field, order)) = &self.sort_by {
            out.push("SORTBY".into());
            out.push(field.as_str().into());
            out.push(order.wire_name().into());
        }
        for filter in &self.filters {
            filter.write_args(out);
        }
        if let Some((offset, num)) = self.limit {
            out.push("LIMIT".into());
            out.push(offset.into());
            out.push(num.into());
        }
        write_params(out, &self.params);
        if self.explain_score {
            out.push("EXPLAINSCORE".into());
        }
        if let Some(ms) = self.timeout {
            out.push("TIMEOUT".into());
            out.push(ms.into());
        }
        if let Some(dialect) = self.dialect {
            out.push("DIALECT".into());
            out.push(dialect.into());
        }
    }

    /// Serialize into the full token sequence and freeze the query.
    ///
    /// Serializing again is legal and yields an identical sequence;
    /// mutating after this call panics.
    pub fn build_args(&mut self) -> Result<Vec<Arg>> {
        for filter in &self.filters {
            filter.validate()?;
        }
        if let Some(fields) = &self.in_fields {
            require_non_empty("INFIELDS", fields.len())?;
        }
        if let Some(fields) = &self.return_fields {
            require_non_empty("RETURN", fields.len())?;
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
        tracing::debug!(index = %self.index, tokens = out.len(), "built search query");
        Ok(out)
    }
}

impl DialectSupport for SearchQuery {
    fn dialect(&self) -> Option<u32> {
        self.dialect
    }

    fn set_dialect(&mut self, version: u32) {
        self.assert_unfrozen();
        self.dialect = Some(version);
    }
}
