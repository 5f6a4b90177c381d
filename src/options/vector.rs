//! Vector search methods and vector wire encoding
//!
//! The closed set of ways a vector clause can probe the index, plus the
//! encoding rules for getting a query vector onto the wire.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

use crate::args::{Arg, Emit};

/// Neighbour count KNN uses when none is given.
pub const DEFAULT_KNN_K: u64 = 10;

/// How a vector clause searches the index.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorMethod {
    /// K nearest neighbours.
    ///
    /// `ef_runtime` caps the candidate pool during graph traversal;
    /// `yield_score_as` exposes the distance under an alias in results.
    Knn {
        k: u64,
        ef_runtime: Option<u64>,
        yield_score_as: Option<String>,
    },

    /// All vectors within `radius` of the query vector.
    ///
    /// `epsilon` widens the search boundary for better recall.
    Range {
        radius: f64,
        epsilon: Option<f64>,
        yield_score_as: Option<String>,
    },
}

impl VectorMethod {
    /// KNN at its documented default neighbour count.
    pub const KNN_DEFAULT: VectorMethod = VectorMethod::Knn {
        k: DEFAULT_KNN_K,
        ef_runtime: None,
        yield_score_as: None,
    };

    /// Nearest-neighbour search; a bare default-k request yields the
    /// shared default instance.
    pub fn knn(k: u64) -> VectorMethod {
        if k == DEFAULT_KNN_K {
            Self::KNN_DEFAULT
        } else {
            VectorMethod::Knn {
                k,
                ef_runtime: None,
                yield_score_as: None,
            }
        }
    }

    /// Range search with the given radius.
    pub fn range(radius: f64) -> VectorMethod {
        VectorMethod::Range {
            radius,
            epsilon: None,
            yield_score_as: None,
        }
    }
}

impl Emit for VectorMethod {
    fn num_args(&self) -> usize {
        match self {
            VectorMethod::Knn {
                ef_runtime,
                yield_score_as,
                ..
            } => {
                // Method name, inner count, K pair, optional pairs.
                4 + if ef_runtime.is_some() { 2 } else { 0 }
                    + if yield_score_as.is_some() { 2 } else { 0 }
            }
            VectorMethod::Range {
                epsilon,
                yield_score_as,
                ..
            } => {
                4 + if epsilon.is_some() { 2 } else { 0 }
                    + if yield_score_as.is_some() { 2 } else { 0 }
            }
        }
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        match self {
            VectorMethod::Knn {
                k,
                ef_runtime,
                yield_score_as,
            } => {
                out.push("KNN".into());
                let inner = 2
                    + if ef_runtime.is_some() { 2 } else { 0 }
                    + if yield_score_as.is_some() { 2 } else { 0 };
                out.push(Arg::Int(inner));
                out.push("K".into());
                out.push((*k).into());
                if let Some(ef) = ef_runtime {
                    out.push("EF_RUNTIME".into());
                    out.push((*ef).into());
                }
                if let Some(alias) = yield_score_as {
                    out.push("YIELD_SCORE_AS".into());
                    out.push(alias.as_str().into());
                }
            }
            VectorMethod::Range {
                radius,
                epsilon,
                yield_score_as,
            } => {
                out.push("RANGE".into());
                let inner = 2
                    + if epsilon.is_some() { 2 } else { 0 }
                    + if yield_score_as.is_some() { 2 } else { 0 };
                out.push(Arg::Int(inner));
                out.push("RADIUS".into());
                out.push((*radius).into());
                if let Some(eps) = epsilon {
                    out.push("EPSILON".into());
                    out.push((*eps).into());
                }
                if let Some(alias) = yield_score_as {
                    out.push("YIELD_SCORE_AS".into());
                    out.push(alias.as_str().into());
                }
            }
        }
    }
}

/// A query vector heading to the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorInput {
    /// Dense f32 vector, encoded as base64 of raw little-endian bytes
    Dense(Vec<f32>),

    /// Pre-encoded raw bytes, passed through unmodified
    Raw(Bytes),

    /// Named parameter bound later via a PARAMS clause
    Param(String),
}

impl VectorInput {
    /// The single token this vector contributes to the command.
    pub fn token(&self) -> Arg {
        match self {
            VectorInput::Dense(values) => Arg::Text(encode_dense(values)),
            VectorInput::Raw(bytes) => Arg::Bytes(bytes.clone()),
            VectorInput::Param(name) => Arg::Text(format!("${}", name)),
        }
    }
}

/// Encode a dense f32 vector as base64 over its raw little-endian bytes.
///
/// `f32::to_le_bytes` produces little-endian output on every host, so the
/// encoding is byte-order portable.
pub fn encode_dense(values: &[f32]) -> String {
    let mut raw = Vec::with_capacity(values.len() * 4);
    for v in values {
        raw.extend_from_slice(&v.to_le_bytes());
    }
    STANDARD.encode(raw)
}
