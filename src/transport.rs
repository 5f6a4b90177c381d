//! Transport seam
//!
//! The builders and decoders in this crate are pure transformations; the
//! only side-effecting step is executing a token sequence against the
//! server. That step lives behind the [`Transport`] trait so callers can
//! plug in a blocking connection, a pooled client, or a test double
//! without this crate knowing the difference.

use serde::Serialize;

use crate::args::Arg;
use crate::error::Result;
use crate::reply::Reply;

/// Identity of the server shard that produced a reply.
///
/// This is a weak back-reference used for cursor affinity, not a live
/// connection handle: result lifetime is never tied to connection
/// lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardLocation {
    /// Logical shard identifier
    pub shard: String,

    /// Endpoint address serving that shard
    pub endpoint: String,
}

/// Executes token sequences against a SableKV server.
pub trait Transport {
    /// Execute one command and return its decoded reply tree.
    fn execute(&mut self, args: &[Arg]) -> Result<Reply>;

    /// Execute pinned to a specific shard.
    ///
    /// Cursor follow-ups must land on the shard that produced the cursor.
    /// Single-endpoint transports can ignore the pin, which is what the
    /// default implementation does.
    fn execute_on(&mut self, shard: &ShardLocation, args: &[Arg]) -> Result<Reply> {
        let _ = shard;
        self.execute(args)
    }

    /// Identity of the shard `execute` will reach, if this transport is
    /// shard-aware. Attached to paginated results so follow-up cursor
    /// reads route correctly without the caller tracking affinity.
    fn shard(&self) -> Option<ShardLocation> {
        None
    }
}
