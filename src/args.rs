//! Command argument model
//!
//! An outgoing command is a flat, ordered sequence of scalar tokens. The
//! grammar is variadic and conditionally ordered, and the server performs
//! no count negotiation, so every emitter in this crate predicts its own
//! token count independently of the code that emits the tokens. The two
//! are checked against each other on every serialization in debug/test
//! builds.

use bytes::Bytes;

/// One scalar token of an outgoing command.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Text token (command names, grammar keywords, field names, queries)
    Text(String),

    /// Integer token (counts, limits, ids)
    Int(i64),

    /// Float token (weights, radii, fusion coefficients)
    Float(f64),

    /// Binary token (raw vector blobs, binary payloads)
    Bytes(Bytes),
}

impl Arg {
    /// Text content of this token, if it is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Arg::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Text(v.to_string())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Text(v)
    }
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<u64> for Arg {
    fn from(v: u64) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<u32> for Arg {
    fn from(v: u32) -> Self {
        Arg::Int(i64::from(v))
    }
}

impl From<usize> for Arg {
    fn from(v: usize) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

impl From<Bytes> for Arg {
    fn from(v: Bytes) -> Self {
        Arg::Bytes(v)
    }
}

impl std::fmt::Display for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Text(s) => write!(f, "{}", s),
            Arg::Int(i) => write!(f, "{}", i),
            Arg::Float(x) => write!(f, "{}", x),
            Arg::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// A contributor of one token sub-sequence to an outgoing command.
///
/// `num_args` is the independent count prediction; `write_args` is the
/// emission. The two are written as parallel logic, never derived from
/// one another, and `emit` cross-checks them on every call.
pub trait Emit {
    /// Number of tokens `write_args` will push.
    fn num_args(&self) -> usize;

    /// Push this contributor's tokens onto `out`.
    fn write_args(&self, out: &mut Vec<Arg>);

    /// Emit with the count invariant checked.
    ///
    /// A divergence here is a bug in this layer itself, so it fails hard
    /// in debug and test builds.
    fn emit(&self, out: &mut Vec<Arg>) {
        let predicted = self.num_args();
        let before = out.len();
        self.write_args(out);
        debug_assert_eq!(
            out.len() - before,
            predicted,
            "predicted token count diverged from emitted token count"
        );
    }
}
