//! Aggregation request builder
//!
//! Builds the aggregation-pipeline command and the cursor follow-ups:
//!
//! ```text
//! SEARCH.AGGREGATE <index> <query> [LOAD * | LOAD n f...]
//!                  [GROUPBY n f... [REDUCE fn n a... [AS alias]]*]*
//!                  [APPLY expr AS alias]* [SORTBY n f dir... [MAX m]]
//!                  [FILTER expr]* [LIMIT off num] [PARAMS 2n k v...]
//!                  [TIMEOUT ms] [WITHCURSOR [COUNT c] [MAXIDLE ms]]
//!                  [DIALECT d]
//! SEARCH.CURSOR READ <index> <id> [COUNT n]
//! SEARCH.CURSOR DEL <index> <id>
//! ```

use crate::args::{Arg, Emit};
use crate::error::Result;
use crate::query::{
    load_len, params_len, require_non_empty, write_load, write_params, Apply, DialectSupport,
    Load, SortClause, SortOrder,
};

/// Aggregation reduce function applied per group.
#[derive(Debug, Clone, PartialEq)]
pub struct Reducer {
    function: &'static str,
    args: Vec<Arg>,
    alias: Option<String>,
}

impl Reducer {
    fn new(function: &'static str, args: Vec<Arg>) -> Self {
        Self {
            function,
            args,
            alias: None,
        }
    }

    /// Count the records in the group.
    pub fn count() -> Self {
        Self::new("COUNT", Vec::new())
    }

    /// Count distinct values of a field.
    pub fn count_distinct(field: impl Into<String>) -> Self {
        Self::new("COUNT_DISTINCT", vec![field.into().into()])
    }

    /// Sum a numeric field over the group.
    pub fn sum(field: impl Into<String>) -> Self {
        Self::new("SUM", vec![field.into().into()])
    }

    /// Average of a numeric field over the group.
    pub fn avg(field: impl Into<String>) -> Self {
        Self::new("AVG", vec![field.into().into()])
    }

    /// Minimum of a numeric field over the group.
    pub fn min(field: impl Into<String>) -> Self {
        Self::new("MIN", vec![field.into().into()])
    }

    /// Maximum of a numeric field over the group.
    pub fn max(field: impl Into<String>) -> Self {
        Self::new("MAX", vec![field.into().into()])
    }

    /// Standard deviation of a numeric field over the group.
    pub fn stddev(field: impl Into<String>) -> Self {
        Self::new("STDDEV", vec![field.into().into()])
    }

    /// Value at the given quantile of a numeric field.
    pub fn quantile(field: impl Into<String>, quantile: f64) -> Self {
        Self::new("QUANTILE", vec![field.into().into(), quantile.into()])
    }

    /// Collect the group's distinct values of a field into a list.
    pub fn to_list(field: impl Into<String>) -> Self {
        Self::new("TOLIST", vec![field.into().into()])
    }

    /// First value of a field in the group.
    pub fn first_value(field: impl Into<String>) -> Self {
        Self::new("FIRST_VALUE", vec![field.into().into()])
    }

    /// Random sample of up to `size` values of a field.
    pub fn random_sample(field: impl Into<String>, size: u64) -> Self {
        Self::new("RANDOM_SAMPLE", vec![field.into().into(), size.into()])
    }

    /// Name the reducer's output column.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl Emit for Reducer {
    fn num_args(&self) -> usize {
        // REDUCE keyword, function name, own-argument count, arguments,
        // optional alias pair.
        3 + self.args.len() + if self.alias.is_some() { 2 } else { 0 }
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        out.push("REDUCE".into());
        out.push(self.function.into());
        out.push(self.args.len().into());
        out.extend(self.args.iter().cloned());
        if let Some(alias) = &self.alias {
            out.push("AS".into());
            out.push(alias.as_str().into());
        }
    }
}

/// One grouping step with its reducers.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    fields: Vec<String>,
    reducers: Vec<Reducer>,
}

impl GroupBy {
    /// Group by the named fields. An empty list groups all records into
    /// one bucket.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            reducers: Vec::new(),
        }
    }

    /// Apply a reducer to each group.
    pub fn reduce(mut self, reducer: Reducer) -> Self {
        self.reducers.push(reducer);
        self
    }
}

impl Emit for GroupBy {
    fn num_args(&self) -> usize {
        2 + self.fields.len() + self.reducers.iter().map(Emit::num_args).sum::<usize>()
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        out.push("GROUPBY".into());
        out.push(self.fields.len().into());
        for field in &self.fields {
            out.push(field.as_str().into());
        }
        for reducer in &self.reducers {
            reducer.emit(out);
        }
    }
}

/// Cursor pagination settings for an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorSpec {
    /// Records per page; server default when unset
    pub count: Option<u64>,

    /// Idle timeout in milliseconds before the server reclaims the cursor
    pub max_idle: Option<u64>,
}

impl CursorSpec {
    fn num_args(&self) -> usize {
        1 + if self.count.is_some() { 2 } else { 0 }
            + if self.max_idle.is_some() { 2 } else { 0 }
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        out.push("WITHCURSOR".into());
        if let Some(count) = self.count {
            out.push("COUNT".into());
            out.push(count.into());
        }
        if let Some(max_idle) = self.max_idle {
            out.push("MAXIDLE".into());
            out.push(max_idle.into());
        }
    }
}

/// Aggregation pipeline request.
#[derive(Debug, Clone)]
pub struct AggregateRequest {
    index: String,
    query: String,
    load: Option<Load>,
    groups: Vec<GroupBy>,
    applies: Vec<Apply>,
    sort: Option<SortClause>,
    filters: Vec<String>,
    limit: Option<(u64, u64)>,
    params: Vec<(String, Arg)>,
    timeout: Option<u64>,
    cursor: Option<CursorSpec>,
    dialect: Option<u32>,
    frozen: bool,
}

impl AggregateRequest {
    /// Aggregate over the records matching `query` in the named index.
    pub fn new(index: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            query: query.into(),
            load: None,
            groups: Vec::new(),
            applies: Vec::new(),
            sort: None,
            filters: Vec::new(),
            limit: None,
            params: Vec::new(),
            timeout: None,
            cursor: None,
            dialect: None,
            frozen: false,
        }
    }

    fn assert_unfrozen(&self) {
        assert!(
            !self.frozen,
            "aggregation already serialized; build a new AggregateRequest instead of mutating this one"
        );
    }

    /// Load every stored attribute into the pipeline.
    pub fn load_all(&mut self) -> &mut Self {
        self.assert_unfrozen();
        self.load = Some(Load::All);
        self
    }

    /// Load the named stored attributes into the pipeline.
    pub fn load<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assert_unfrozen();
        self.load = Some(Load::Fields(fields.into_iter().map(Into::into).collect()));
        self
    }

    /// Add a grouping step.
    pub fn group_by(&mut self, group: GroupBy) -> &mut Self {
        self.assert_unfrozen();
        self.groups.push(group);
        self
    }

    /// Add a projection step.
    pub fn apply(&mut self, expr: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.assert_unfrozen();
        self.applies.push(Apply::new(expr, alias));
        self
    }

    /// Sort the pipeline output by the given properties.
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

    /// Cap the sort to the best `max` records.
    ///
    /// Only meaningful after [`AggregateRequest::sort_by`]; ignored
    /// otherwise.
    pub fn sort_max(&mut self, max: u64) -> &mut Self {
        self.assert_unfrozen();
        if let Some(sort) = &mut self.sort {
            sort.max = Some(max);
        }
        self
    }

    /// Add a post-grouping filter expression.
    pub fn filter(&mut self, expr: impl Into<String>) -> &mut Self {
        self.assert_unfrozen();
        self.filters.push(expr.into());
        self
    }

    /// Paginate: skip `offset` records, return at most `num`.
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

    /// Server-side timeout in milliseconds.
    pub fn timeout(&mut self, ms: u64) -> &mut Self {
        self.assert_unfrozen();
        self.timeout = Some(ms);
        self
    }

    /// Page the reply through a server-side cursor.
    pub fn with_cursor(&mut self, spec: CursorSpec) -> &mut Self {
        self.assert_unfrozen();
        self.cursor = Some(spec);
        self
    }

    /// Index this request targets.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Whether the reply will carry a cursor id alongside the body.
    pub fn has_cursor(&self) -> bool {
        self.cursor.is_some()
    }

    /// Predicted token count, written independently of the emission.
    fn num_args(&self) -> usize {
        3 + load_len(&self.load)
            + self.groups.iter().map(Emit::num_args).sum::<usize>()
            + 4 * self.applies.len()
            + self.sort.as_ref().map_or(0, SortClause::num_args)
            + 2 * self.filters.len()
            + if self.limit.is_some() { 3 } else { 0 }
            + params_len(&self.params)
            + if self.timeout.is_some() { 2 } else { 0 }
            + self.cursor.as_ref().map_or(0, CursorSpec::num_args)
            + if self.dialect.is_some() { 2 } else { 0 }
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        out.push("SEARCH.AGGREGATE".into());
        out.push(self.index.as_str().into());
        out.push(self.query.as_str().into());
        write_load(out, &self.load);
        for group in &self.groups {
            group.emit(out);
        }
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
        if let Some(cursor) = &self.cursor {
            cursor.write_args(out);
        }
        if let Some(dialect) = self.dialect {
            out.push("DIALECT".into());
            out.push(dialect.into());
        }
    }

    /// Serialize into the full token sequence and freeze the request.
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
        tracing::debug!(index = %self.index, tokens = out.len(), "built aggregation");
        Ok(out)
    }
}

impl DialectSupport for AggregateRequest {
    fn dialect(&self) -> Option<u32> {
        self.dialect
    }

    fn set_dialect(&mut self, version: u32) {
        self.assert_unfrozen();
        self.dialect = Some(version);
    }
}

// =============================================================================
// Cursor follow-up commands
// =============================================================================

/// Token sequence reading the next page of a cursor.
pub fn cursor_read_args(index: &str, cursor_id: u64, count: Option<u64>) -> Vec<Arg> {
    let mut out: Vec<Arg> = vec![
        "SEARCH.CURSOR".into(),
        "READ".into(),
        index.into(),
        cursor_id.into(),
    ];
    if let Some(count) = count {
        out.push("COUNT".into());
        out.push(count.into());
    }
    out
}

/// Token sequence deleting a cursor before it is exhausted.
pub fn cursor_del_args(index: &str, cursor_id: u64) -> Vec<Arg> {
    vec![
        "SEARCH.CURSOR".into(),
        "DEL".into(),
        index.into(),
        cursor_id.into(),
    ]
}
