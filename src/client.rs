//! Client Module
//!
//! Thin coordinator tying the pure builders and decoders to a transport.
//!
//! ## Responsibilities
//! - Inject the client-wide default dialect into requests that support
//!   one and have none set, immediately before serialization
//! - Hand each reply to the right decoder with the shape knowledge the
//!   originating request implies
//! - Route cursor follow-ups to the shard that produced the cursor and
//!   guarantee best-effort cursor deletion when iteration stops early

use std::num::NonZeroU32;

use parking_lot::RwLock;

use crate::error::{Result, SableError};
use crate::query::{
    cursor_del_args, cursor_read_args, AggregateRequest, DialectSupport, HybridQuery, SearchQuery,
};
use crate::result::{
    parse_aggregate, parse_hybrid, parse_search, AggregateResult, CursorHandle, HybridResult, Row,
    SearchResult,
};
use crate::schema::Schema;
use crate::transport::Transport;

/// Client for SableKV's search protocol.
///
/// Owns a transport and the client-wide defaults. All per-request state
/// lives in the request builders, so one client serves any number of
/// sequential requests.
pub struct SearchClient<T: Transport> {
    transport: T,

    /// Client-wide default dialect, applied to requests that have none
    default_dialect: RwLock<Option<NonZeroU32>>,
}

impl<T: Transport> SearchClient<T> {
    /// Wrap a transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            default_dialect: RwLock::new(None),
        }
    }

    /// Configure the client-wide default dialect.
    ///
    /// Zero is not a valid dialect and is rejected here, at
    /// configuration time, rather than surfacing on every request.
    pub fn set_default_dialect(&self, version: u32) -> Result<()> {
        match NonZeroU32::new(version) {
            Some(v) => {
                *self.default_dialect.write() = Some(v);
                Ok(())
            }
            None => Err(SableError::Config(
                "default dialect 0 is not a valid dialect version".to_string(),
            )),
        }
    }

    /// Currently configured default dialect, if any.
    pub fn default_dialect(&self) -> Option<u32> {
        self.default_dialect.read().map(NonZeroU32::get)
    }

    /// Patch the default dialect onto a request that has none set.
    ///
    /// An explicitly set dialect always wins.
    fn apply_default_dialect<R: DialectSupport>(&self, request: &mut R) {
        if request.dialect().is_none() {
            if let Some(version) = self.default_dialect() {
                request.set_dialect(version);
            }
        }
    }

    /// Create an index from a schema definition.
    pub fn create_index(&mut self, schema: &mut Schema) -> Result<()> {
        let args = schema.build_args()?;
        self.transport.execute(&args)?;
        Ok(())
    }

    /// Execute a search query and decode its reply.
    pub fn search(&mut self, query: &mut SearchQuery) -> Result<SearchResult> {
        self.apply_default_dialect(query);
        let shape = query.result_shape();
        let args = query.build_args()?;
        let reply = self.transport.execute(&args)?;
        parse_search(reply, &shape)
    }

    /// Execute an aggregation and decode its reply.
    ///
    /// A paginated result remembers the shard that produced it, so
    /// cursor follow-ups route correctly.
    pub fn aggregate(&mut self, request: &mut AggregateRequest) -> Result<AggregateResult> {
        self.apply_default_dialect(request);
        let args = request.build_args()?;
        let shard = self.transport.shard();
        let reply = self.transport.execute(&args)?;
        parse_aggregate(reply, request.has_cursor(), request.index(), shard)
    }

    /// Execute a hybrid query and decode its reply.
    pub fn hybrid(&mut self, query: &mut HybridQuery) -> Result<HybridResult> {
        self.apply_default_dialect(query);
        let args = query.build_args()?;
        let reply = self.transport.execute(&args)?;
        parse_hybrid(reply)
    }

    /// Read the next page of a cursor, pinned to its producing shard.
    pub fn cursor_read(
        &mut self,
        handle: &CursorHandle,
        count: Option<u64>,
    ) -> Result<AggregateResult> {
        let args = cursor_read_args(&handle.index, handle.cursor_id, count);
        let reply = match &handle.shard {
            Some(shard) => self.transport.execute_on(shard, &args)?,
            None => self.transport.execute(&args)?,
        };
        parse_aggregate(reply, true, &handle.index, handle.shard.clone())
    }

    /// Delete a cursor before it is exhausted, pinned to its shard.
    pub fn cursor_delete(&mut self, handle: &CursorHandle) -> Result<()> {
        let args = cursor_del_args(&handle.index, handle.cursor_id);
        match &handle.shard {
            Some(shard) => self.transport.execute_on(shard, &args)?,
            None => self.transport.execute(&args)?,
        };
        Ok(())
    }

    /// Run a paginated aggregation and stream its rows across cursor
    /// pages. The request must have a cursor clause set.
    ///
    /// Dropping the iterator before exhaustion deletes the outstanding
    /// cursor on a best-effort basis, including on the error path.
    pub fn aggregate_iter(
        &mut self,
        request: &mut AggregateRequest,
    ) -> Result<CursorIter<'_, T>> {
        if !request.has_cursor() {
            return Err(SableError::Config(
                "aggregate_iter requires a cursor clause; call with_cursor first".to_string(),
            ));
        }
        let first = self.aggregate(request)?;
        Ok(CursorIter {
            client: self,
            rows: first.rows.into_iter(),
            cursor: first.cursor,
            done: false,
        })
    }

    /// The wrapped transport, for callers composing their own commands.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

/// Streams aggregation rows across cursor pages.
///
/// Page fetches happen lazily inside `next`. The iterator owns the
/// outstanding cursor and deletes it no matter how the iteration stops
/// (exhaustion, an error, or an early drop).
pub struct CursorIter<'a, T: Transport> {
    client: &'a mut SearchClient<T>,
    rows: std::vec::IntoIter<Row>,
    cursor: Option<CursorHandle>,
    done: bool,
}

impl<T: Transport> std::fmt::Debug for CursorIter<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorIter")
            .field("cursor", &self.cursor)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Iterator for CursorIter<'_, T> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if let Some(row) = self.rows.next() {
                return Some(Ok(row));
            }
            let handle = match self.cursor.take() {
                Some(handle) => handle,
                None => {
                    self.done = true;
                    return None;
                }
            };
            match self.client.cursor_read(&handle, None) {
                Ok(page) => {
                    self.rows = page.rows.into_iter();
                    self.cursor = page.cursor;
                }
                Err(e) => {
                    // The server may still hold the cursor; put the
                    // handle back so drop can delete it.
                    self.cursor = Some(handle);
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<T: Transport> Drop for CursorIter<'_, T> {
    fn drop(&mut self) {
        if let Some(handle) = self.cursor.take() {
            if let Err(e) = self.client.cursor_delete(&handle) {
                tracing::warn!(
                    index = %handle.index,
                    cursor_id = handle.cursor_id,
                    error = %e,
                    "failed to delete outstanding aggregation cursor"
                );
            }
        }
    }
}
