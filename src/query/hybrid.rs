//! Hybrid search builder
//!
//! Builds the two-leg text+vector command:
//!
//! ```text
//! SEARCH.HYBRID <index> SEARCH <query> [SCORER ...]
//!               VSIM <@field> <vector> [KNN ... | RANGE ...]
//!               [COMBINE RRF ... | COMBINE LINEAR ...] [LOAD ...]
//!               [APPLY expr AS alias]* [SORTBY n f dir... [MAX m]]
//!               [FILTER expr]* [LIMIT off num] [PARAMS 2n k v...]
//!               [TIMEOUT ms] [DIALECT d]
//! ```
//!
//! The combine strategy's window fallback reads this request's LIMIT, so
//! the combiner is emitted with the page size threaded through.

use crate::args::{Arg, Emit};
use crate::error::Result;
use crate::options::{Combiner, Scorer, VectorInput, VectorMethod};
use crate::query::{
    load_len, params_len, require_non_empty, write_load, write_params, Apply, DialectSupport,
    Load, SortClause, SortOrder,
};

/// Hybrid text+vector search request.
#[derive(Debug, Clone)]
pub struct HybridQuery {
    index: String,
    query: String,
    scorer: Option<Scorer>,
    vector_field: String,
    vector: VectorInput,
    method: Option<VectorMethod>,
    combine: Option<Combiner>,
    load: Option<Load>,
    applies: Vec<Apply>,
    sort: Option<SortClause>,
    filters: Vec<String>,
    limit: Option<(u64, u64)>,
    params: Vec<(String, Arg)>,
    timeout: Option<u64>,
    dialect: Option<u32>,
    frozen: bool,
}

impl HybridQuery {
    /// Hybrid query over the named index: a textual leg matching `query`
    /// and a vector leg probing `vector_field` with `vector`.
    pub fn new(
        index: impl Into<String>,
        query: impl Into<String>,
        vector_field: impl Into<String>,
        vector: VectorInput,
    ) -> Self {
        Self {
            index: index.into(),
            query: query.into(),
            scorer: None,
            vector_field: vector_field.into(),
            vector,
            method: None,
            combine: None,
            load: None,
            applies: Vec::new(),
            sort: None,
            filters: Vec::new(),
            limit: None,
            params: Vec::new(),
            timeout: None,
            dialect: None,
            frozen: false,
        }
    }

    fn assert_unfrozen(&self) {
        assert!(
            !self.frozen,
            "hybrid query already serialized; build a new HybridQuery instead of mutating this one"
        );
    }

    /// Scoring function for the textual leg.
    pub fn scorer(&mut self, scorer: Scorer) -> &mut Self {
        self.assert_unfrozen();
        self.scorer = Some(scorer);
        self
    }

    /// Search method for the vector leg; server default (KNN) when unset.
    pub fn method(&mut self, method: VectorMethod) -> &mut Self {
        self.assert_unfrozen();
        self.method = Some(method);
        self
    }

    /// Fusion strategy merging the two legs' rankings.
    pub fn combine(&mut self, combiner: Combiner) -> &mut Self {
        self.assert_unfrozen();
        self.combine = Some(combiner);
        self
    }

    /// Load every stored attribute into the result rows.
    pub fn load_all(&mut self) -> &mut Self {
        self.assert_unfrozen();
        self.load = Some(Load::All);
        self
    }

    /// Load the named stored attributes into the result rows.
    pub fn load<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assert_unfrozen();
        self.load = Some(Load::Fields(fields.into_iter().map(Into::into).collect()));
        self
    }

    /// Add a projection step.
    pub fn apply(&mut self, expr: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.assert_unfrozen();
        self.applies.push(Apply::new(expr, alias));
        self
    }

    /// Sort the fused output by the given properties.
    pub fn sort_by<I, S>(&mut self, properties: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, SortOrder)>,
        S: Into<String>,
    {
        self.assert_unfrozen();
        let properties = properties
            .into_iter()
            .map(|(p, o)| (p.into(), o))
            .collect();
        self.sort = Some(SortClause {
            properties,
            max: None,
        });
        self
    }

    /// Add a post-fusion filter expression.
    pub fn filter(&mut self, expr: impl Into<String>) -> &mut Self {
        self.assert_unfrozen();
        self.filters.push(expr.into());
        self
    }

    /// Paginate the fused ranking.
    ///
    /// Also feeds the RRF window fallback when the combiner leaves its
    /// window unset.
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

    /// Field reference for the vector leg, `@`-prefixed exactly once.
    fn field_ref(&self) -> String {
        if self.vector_field.starts_with('@') {
            self.vector_field.clone()
        } else {
            format!("@{}", self.vector_field)
        }
    }

    fn page_size(&self) -> Option<u64> {
        self.limit.map(|(_, num)| num)
    }

    /// Predicted token count, written independently of the emission.
    fn num_args(&self) -> usize {
        4 + self.scorer.as_ref().map_or(0, |s| 1 + s.num_args())
            + 3
            + self.method.as_ref().map_or(0, Emit::num_args)
            + self
                .combine
                .as_ref()
                .map_or(0, |c| 1 + c.num_args(self.page_size()))
            + load_len(&self.load)
            + 4 * self.applies.len()
            + self.sort.as_ref().map_or(0, SortClause::num_args)
            + 2 * self.filters.len()
            + if self.limit.is_some() { 3 } else { 0 }
            + params_len(&self.params)
            + if self.timeout.is_some() { 2 } else { 0 }
            + if self.dialect.is_some() { 2 } else { 0 }
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        out.push("SEARCH.HYBRID".into());
        out.push(self.index.as_str().into());
        out.push("SEARCH".into());
        out.push(self.query.as_str().into());
        if let Some(scorer) = &self.scorer {
            out.push("SCORER".into());
            scorer.emit(out);
        }
        out.push("VSIM".into());
        out.push(self.field_ref().into());
        out.push(self.vector.token());
        if let Some(method) = &self.method {
            method.emit(out);
        }
        if let Some(combiner) = &self.combine {
            out.push("COMBINE".into());
            combiner.emit(out, self.page_size());
        }
        write_load(out, &self.load);
        for apply in &self.applies {
            apply.write_args(out);
        }
        if let Some(sort) = &self.sort {
            sort.write_args(out);
        }
        for filter in &self.filters {
            out.push("FILTER".into());
            out.push(filter.as_str().into());
        }
        if let Some((offset, num)) = self.limit {
            out.push("LIMIT".into());
            out.push(offset.into());
            out.push(num.into());
        }
        write_params(out, &self.params);
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
        if let Some(Load::Fields(fields)) = &self.load {
            require_non_empty("LOAD", fields.len())?;
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
        tracing::debug!(index = %self.index, tokens = out.len(), "built hybrid query");
        Ok(out)
    }
}

impl DialectSupport for HybridQuery {
    fn dialect(&self) -> Option<u32> {
        self.dialect
    }

    fn set_dialect(&mut self, version: u32) {
        self.assert_unfrozen();
        self.dialect = Some(version);
    }
}
