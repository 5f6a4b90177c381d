//! Vector index algorithms
//!
//! Each algorithm contributes its own attribute pairs to a VECTOR field's
//! suffix. Tuning parameters are sparse on the wire: a value equal to its
//! documented default is never emitted, so the attribute count must be
//! computed with the same equal-to-default logic as the emission.

use crate::args::Arg;

/// FLAT block size when none is given.
pub const DEFAULT_BLOCK_SIZE: u64 = 1024;

/// HNSW out-degree when none is given.
pub const DEFAULT_HNSW_M: u64 = 16;

/// HNSW construction-time candidate pool when none is given.
pub const DEFAULT_HNSW_EF_CONSTRUCTION: u64 = 200;

/// HNSW query-time candidate pool when none is given.
pub const DEFAULT_HNSW_EF_RUNTIME: u64 = 10;

/// HNSW range-query boundary factor when none is given.
pub const DEFAULT_HNSW_EPSILON: f64 = 0.01;

/// SVS-VAMANA graph degree bound when none is given.
pub const DEFAULT_SVS_GRAPH_MAX_DEGREE: u64 = 32;

/// SVS-VAMANA construction window when none is given.
pub const DEFAULT_SVS_CONSTRUCTION_WINDOW: u64 = 200;

/// SVS-VAMANA search window when none is given.
pub const DEFAULT_SVS_SEARCH_WINDOW: u64 = 10;

/// Storage type of the indexed vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorType {
    Float32,
    Float64,
}

impl VectorType {
    fn wire_name(self) -> &'static str {
        match self {
            VectorType::Float32 => "FLOAT32",
            VectorType::Float64 => "FLOAT64",
        }
    }
}

/// Distance metric of the vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    L2,
    InnerProduct,
    Cosine,
}

impl DistanceMetric {
    fn wire_name(self) -> &'static str {
        match self {
            DistanceMetric::L2 => "L2",
            DistanceMetric::InnerProduct => "IP",
            DistanceMetric::Cosine => "COSINE",
        }
    }
}

/// Index algorithm and its tuning attributes.
///
/// Every variant carries the three mandatory attributes (storage type,
/// dimension, distance metric) plus algorithm-specific tunables.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorAlgorithm {
    /// Brute-force index over contiguous blocks
    Flat {
        vector_type: VectorType,
        dim: u64,
        metric: DistanceMetric,
        initial_cap: Option<u64>,
        block_size: Option<u64>,
    },

    /// Hierarchical navigable small-world graph
    Hnsw {
        vector_type: VectorType,
        dim: u64,
        metric: DistanceMetric,
        initial_cap: Option<u64>,
        m: Option<u64>,
        ef_construction: Option<u64>,
        ef_runtime: Option<u64>,
        epsilon: Option<f64>,
    },

    /// Vamana graph index from the SVS family
    SvsVamana {
        vector_type: VectorType,
        dim: u64,
        metric: DistanceMetric,
        graph_max_degree: Option<u64>,
        construction_window_size: Option<u64>,
        search_window_size: Option<u64>,
    },
}

/// Number of tokens a `Some` tunable adds, honoring default suppression.
fn tunable_len(value: Option<u64>, default: u64) -> usize {
    match value {
        Some(v) if v != default => 2,
        _ => 0,
    }
}

/// Push a tunable pair unless the value equals its documented default.
fn push_tunable(out: &mut Vec<Arg>, key: &'static str, value: Option<u64>, default: u64) {
    if let Some(v) = value {
        if v != default {
            out.push(key.into());
            out.push(v.into());
        }
    }
}

impl VectorAlgorithm {
    /// Flat index with mandatory attributes only.
    pub fn flat(vector_type: VectorType, dim: u64, metric: DistanceMetric) -> Self {
        VectorAlgorithm::Flat {
            vector_type,
            dim,
            metric,
            initial_cap: None,
            block_size: None,
        }
    }

    /// HNSW index with mandatory attributes only.
    pub fn hnsw(vector_type: VectorType, dim: u64, metric: DistanceMetric) -> Self {
        VectorAlgorithm::Hnsw {
            vector_type,
            dim,
            metric,
            initial_cap: None,
            m: None,
            ef_construction: None,
            ef_runtime: None,
            epsilon: None,
        }
    }

    /// SVS-VAMANA index with mandatory attributes only.
    pub fn svs_vamana(vector_type: VectorType, dim: u64, metric: DistanceMetric) -> Self {
        VectorAlgorithm::SvsVamana {
            vector_type,
            dim,
            metric,
            graph_max_degree: None,
            construction_window_size: None,
            search_window_size: None,
        }
    }

    /// Wire name of the algorithm tag.
    pub fn wire_name(&self) -> &'static str {
        match self {
            VectorAlgorithm::Flat { .. } => "FLAT",
            VectorAlgorithm::Hnsw { .. } => "HNSW",
            VectorAlgorithm::SvsVamana { .. } => "SVS-VAMANA",
        }
    }

    /// Number of attribute tokens `write_attr_args` will push.
    ///
    /// Independent of the emission logic; the field builder checks the
    /// two against each other when the schema serializes.
    pub fn num_attr_args(&self) -> usize {
        match self {
            VectorAlgorithm::Flat {
                initial_cap,
                block_size,
                ..
            } => {
                6 + if initial_cap.is_some() { 2 } else { 0 }
                    + tunable_len(*block_size, DEFAULT_BLOCK_SIZE)
            }
            VectorAlgorithm::Hnsw {
                initial_cap,
                m,
                ef_construction,
                ef_runtime,
                epsilon,
                ..
            } => {
                let epsilon_len = match epsilon {
                    Some(e) if *e != DEFAULT_HNSW_EPSILON => 2,
                    _ => 0,
                };
                6 + if initial_cap.is_some() { 2 } else { 0 }
                    + tunable_len(*m, DEFAULT_HNSW_M)
                    + tunable_len(*ef_construction, DEFAULT_HNSW_EF_CONSTRUCTION)
                    + tunable_len(*ef_runtime, DEFAULT_HNSW_EF_RUNTIME)
                    + epsilon_len
            }
            VectorAlgorithm::SvsVamana {
                graph_max_degree,
                construction_window_size,
                search_window_size,
                ..
            } => {
                6 + tunable_len(*graph_max_degree, DEFAULT_SVS_GRAPH_MAX_DEGREE)
                    + tunable_len(*construction_window_size, DEFAULT_SVS_CONSTRUCTION_WINDOW)
                    + tunable_len(*search_window_size, DEFAULT_SVS_SEARCH_WINDOW)
            }
        }
    }

    /// Push the attribute tokens: mandatory triple, then tunables that
    /// differ from their documented defaults.
    pub fn write_attr_args(&self, out: &mut Vec<Arg>) {
        match self {
            VectorAlgorithm::Flat {
                vector_type,
                dim,
                metric,
                initial_cap,
                block_size,
            } => {
                write_mandatory(out, *vector_type, *dim, *metric);
                if let Some(cap) = initial_cap {
                    out.push("INITIAL_CAP".into());
                    out.push((*cap).into());
                }
                push_tunable(out, "BLOCK_SIZE", *block_size, DEFAULT_BLOCK_SIZE);
            }
            VectorAlgorithm::Hnsw {
                vector_type,
                dim,
                metric,
                initial_cap,
                m,
                ef_construction,
                ef_runtime,
                epsilon,
            } => {
                write_mandatory(out, *vector_type, *dim, *metric);
                if let Some(cap) = initial_cap {
                    out.push("INITIAL_CAP".into());
                    out.push((*cap).into());
                }
                push_tunable(out, "M", *m, DEFAULT_HNSW_M);
                push_tunable(out, "EF_CONSTRUCTION", *ef_construction, DEFAULT_HNSW_EF_CONSTRUCTION);
                push_tunable(out, "EF_RUNTIME", *ef_runtime, DEFAULT_HNSW_EF_RUNTIME);
                if let Some(e) = epsilon {
                    if *e != DEFAULT_HNSW_EPSILON {
                        out.push("EPSILON".into());
                        out.push((*e).into());
                    }
                }
            }
            VectorAlgorithm::SvsVamana {
                vector_type,
                dim,
                metric,
                graph_max_degree,
                construction_window_size,
                search_window_size,
            } => {
                write_mandatory(out, *vector_type, *dim, *metric);
                push_tunable(out, "GRAPH_MAX_DEGREE", *graph_max_degree, DEFAULT_SVS_GRAPH_MAX_DEGREE);
                push_tunable(
                    out,
                    "CONSTRUCTION_WINDOW_SIZE",
                    *construction_window_size,
                    DEFAULT_SVS_CONSTRUCTION_WINDOW,
                );
                push_tunable(out, "SEARCH_WINDOW_SIZE", *search_window_size, DEFAULT_SVS_SEARCH_WINDOW);
            }
        }
    }
}

/// The attribute triple every algorithm carries.
fn write_mandatory(out: &mut Vec<Arg>, vector_type: VectorType, dim: u64, metric: DistanceMetric) {
    out.push("TYPE".into());
    out.push(vector_type.wire_name().into());
    out.push("DIM".into());
    out.push(dim.into());
    out.push("DISTANCE_METRIC".into());
    out.push(metric.wire_name().into());
}
