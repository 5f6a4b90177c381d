//! Scoring functions
//!
//! The closed set of relevance scorers the server accepts in a SCORER
//! clause. All variants are immutable values; only the tanh-smoothed BM25
//! variant carries a parameter.

use crate::args::{Arg, Emit};

/// Smoothing factor BM25STD.TANH applies when none is given.
pub const DEFAULT_TANH_FACTOR: f64 = 4.0;

/// A relevance scoring function.
#[derive(Debug, Clone, PartialEq)]
pub enum Scorer {
    /// Basic term-frequency scoring
    TfIdf,

    /// TF-IDF normalized by document length
    TfIdfDocNorm,

    /// Normalized BM25
    Bm25Std,

    /// BM25 with tanh smoothing; `factor` controls the saturation knee
    Bm25StdTanh { factor: f64 },

    /// Maximum score over matched terms
    DisMax,

    /// Pass-through of the document's own score
    DocScore,

    /// Hamming distance between query and document payloads
    Hamming,
}

impl Scorer {
    /// BM25STD.TANH at its documented default factor.
    pub const BM25_STD_TANH_DEFAULT: Scorer = Scorer::Bm25StdTanh {
        factor: DEFAULT_TANH_FACTOR,
    };

    /// Tanh-smoothed BM25 with an explicit factor.
    ///
    /// A default-equal factor yields the shared default instance.
    pub fn bm25_tanh(factor: f64) -> Scorer {
        if factor == DEFAULT_TANH_FACTOR {
            Self::BM25_STD_TANH_DEFAULT
        } else {
            Scorer::Bm25StdTanh { factor }
        }
    }

    /// Wire name of this scorer.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Scorer::TfIdf => "TFIDF",
            Scorer::TfIdfDocNorm => "TFIDF.DOCNORM",
            Scorer::Bm25Std => "BM25STD",
            Scorer::Bm25StdTanh { .. } => "BM25STD.TANH",
            Scorer::DisMax => "DISMAX",
            Scorer::DocScore => "DOCSCORE",
            Scorer::Hamming => "HAMMING",
        }
    }
}

impl Emit for Scorer {
    fn num_args(&self) -> usize {
        match self {
            Scorer::Bm25StdTanh { factor } if *factor != DEFAULT_TANH_FACTOR => 3,
            _ => 1,
        }
    }

    fn write_args(&self, out: &mut Vec<Arg>) {
        out.push(self.wire_name().into());
        if let Scorer::Bm25StdTanh { factor } = self {
            // Default-equal factor stays off the wire.
            if *factor != DEFAULT_TANH_FACTOR {
                out.push("FACTOR".into());
                out.push((*factor).into());
            }
        }
    }
}
