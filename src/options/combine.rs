//! Result fusion strategies
//!
//! How the server merges the ranked outputs of the textual and vector
//! retrieval passes of a hybrid query into one final ranking.

use crate::args::Arg;

/// Window RRF falls back to when neither the combiner nor the request's
/// page-size limit provides one.
pub const DEFAULT_RRF_WINDOW: u64 = 20;

/// A strategy for fusing two ranked result sets.
#[derive(Debug, Clone, PartialEq)]
pub enum Combiner {
    /// Reciprocal-rank fusion.
    ///
    /// `window` bounds how many hits per input ranking participate;
    /// `constant` is the rank-smoothing constant K.
    Rrf {
        window: Option<u64>,
        constant: Option<u64>,
    },

    /// Weighted linear combination of the two rankings' scores.
    Linear {
        alpha: f64,
        beta: f64,
        window: Option<u64>,
    },
}

impl Combiner {
    /// Reciprocal-rank fusion with all parameters at server defaults.
    pub const RRF_DEFAULT: Combiner = Combiner::Rrf {
        window: None,
        constant: None,
    };

    /// Reciprocal-rank fusion; `None` parameters stay at server defaults.
    pub fn rrf(window: Option<u64>, constant: Option<u64>) -> Combiner {
        if window.is_none() && constant.is_none() {
            Self::RRF_DEFAULT
        } else {
            Combiner::Rrf { window, constant }
        }
    }

    /// Linear fusion with explicit coefficients.
    pub fn linear(alpha: f64, beta: f64, window: Option<u64>) -> Combiner {
        Combiner::Linear {
            alpha,
            beta,
            window,
        }
    }

    /// Window RRF will actually emit, given the request's page-size limit.
    ///
    /// An unset RRF window falls back to the page size if one is set,
    /// else to [`DEFAULT_RRF_WINDOW`].
    fn rrf_window(window: Option<u64>, page_size: Option<u64>) -> u64 {
        window.or(page_size).unwrap_or(DEFAULT_RRF_WINDOW)
    }

    /// Number of tokens `write_args` will push.
    ///
    /// The RRF window is always emitted regardless of where its value
    /// comes from, so the count does not depend on the limit context.
    pub fn num_args(&self, _page_size: Option<u64>) -> usize {
        match self {
            // Strategy name, inner count, optional K pair, WINDOW pair.
            Combiner::Rrf { constant, .. } => 2 + if constant.is_some() { 2 } else { 0 } + 2,
            Combiner::Linear { window, .. } => 2 + 4 + if window.is_some() { 2 } else { 0 },
        }
    }

    /// Push this strategy's tokens: name, own-token count, parameters.
    pub fn write_args(&self, out: &mut Vec<Arg>, page_size: Option<u64>) {
        match self {
            Combiner::Rrf { window, constant } => {
                out.push("RRF".into());
                let inner = if constant.is_some() { 4 } else { 2 };
                out.push(Arg::Int(inner));
                if let Some(k) = constant {
                    out.push("K".into());
                    out.push((*k).into());
                }
                // RRF always carries a window: explicit, page-size
                // fallback, or the fixed default.
                out.push("WINDOW".into());
                out.push(Self::rrf_window(*window, page_size).into());
            }
            Combiner::Linear {
                alpha,
                beta,
                window,
            } => {
                out.push("LINEAR".into());
                let inner = 4 + if window.is_some() { 2 } else { 0 };
                out.push(Arg::Int(inner));
                out.push("ALPHA".into());
                out.push((*alpha).into());
                out.push("BETA".into());
                out.push((*beta).into());
                if let Some(w) = window {
                    out.push("WINDOW".into());
                    out.push((*w).into());
                }
            }
        }
    }

    /// Emit with the count invariant checked.
    pub fn emit(&self, out: &mut Vec<Arg>, page_size: Option<u64>) {
        let predicted = self.num_args(page_size);
        let before = out.len();
        self.write_args(out, page_size);
        debug_assert_eq!(
            out.len() - before,
            predicted,
            "predicted token count diverged from emitted token count"
        );
    }
}
