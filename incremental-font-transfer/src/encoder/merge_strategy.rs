//! Strategies for deciding when two or more segments should be merged into a single patch.
//!
//! A merge strategy bounds the byte size of glyph keyed patches produced during segmentation:
//! segments that would otherwise produce a patch too small to be worth a network round trip are
//! combined with their neighbours until the combined patch is large enough, or until the
//! estimated request cost (patch bytes plus network overhead, weighted by request probability)
//! stops improving.

use super::freq::{NoopProbabilityCalculator, ProbabilityCalculator, UnicodeFrequencies};
use std::sync::Arc;

/// Fraction of the maximum possible cost improvement below which a cost based merge search
/// gives up looking for a better candidate and accepts the current one.
const DEFAULT_OPTIMIZATION_CUTOFF_FRACTION: f64 = 0.001;

const DEFAULT_BROTLI_QUALITY: u32 = 8;
const DEFAULT_NETWORK_OVERHEAD_COST: u32 = 75;
const DEFAULT_MIN_GROUP_SIZE: usize = 4;

/// Governs how the segmenter decides to merge candidate segments together.
#[derive(Debug, Clone)]
pub enum MergeStrategy {
    /// Never merge segments together.
    None,
    /// Merge any segment whose patch would be smaller than `min_bytes` into the next segment,
    /// repeating until the merged patch is at least `min_bytes` or exceeds `max_bytes`.
    Heuristic { min_bytes: u32, max_bytes: u32 },
    /// Merge segments when doing so lowers the expected number of bytes a client downloads,
    /// using per-codepoint probability estimates that treat codepoints as independent.
    CostBased {
        probability_calculator: Arc<dyn ProbabilityCalculator>,
        network_overhead_cost: u32,
        min_group_size: usize,
        optimization_cutoff_fraction: f64,
        brotli_quality: u32,
    },
    /// Like [`Self::CostBased`] but estimates probability from codepoint bigrams, giving a
    /// tighter bound when codepoints in a segment tend to co-occur.
    BigramCostBased {
        probability_calculator: Arc<dyn ProbabilityCalculator>,
        network_overhead_cost: u32,
        min_group_size: usize,
        optimization_cutoff_fraction: f64,
        brotli_quality: u32,
    },
}

impl MergeStrategy {
    pub fn none() -> Self {
        MergeStrategy::Heuristic {
            min_bytes: 0,
            max_bytes: u32::MAX,
        }
    }

    pub fn heuristic(min_bytes: u32) -> Self {
        MergeStrategy::Heuristic {
            min_bytes,
            max_bytes: u32::MAX,
        }
    }

    pub fn heuristic_bounded(min_bytes: u32, max_bytes: u32) -> Self {
        MergeStrategy::Heuristic {
            min_bytes,
            max_bytes,
        }
    }

    pub fn cost_based(frequencies: UnicodeFrequencies) -> Self {
        use super::freq::UnigramProbabilityCalculator;
        MergeStrategy::CostBased {
            probability_calculator: Arc::new(UnigramProbabilityCalculator::new(frequencies)),
            network_overhead_cost: DEFAULT_NETWORK_OVERHEAD_COST,
            min_group_size: DEFAULT_MIN_GROUP_SIZE,
            optimization_cutoff_fraction: DEFAULT_OPTIMIZATION_CUTOFF_FRACTION,
            brotli_quality: DEFAULT_BROTLI_QUALITY,
        }
    }

    pub fn bigram_cost_based(frequencies: UnicodeFrequencies) -> Self {
        use super::freq::BigramProbabilityCalculator;
        MergeStrategy::BigramCostBased {
            probability_calculator: Arc::new(BigramProbabilityCalculator::new(frequencies)),
            network_overhead_cost: DEFAULT_NETWORK_OVERHEAD_COST,
            min_group_size: DEFAULT_MIN_GROUP_SIZE,
            optimization_cutoff_fraction: DEFAULT_OPTIMIZATION_CUTOFF_FRACTION,
            brotli_quality: DEFAULT_BROTLI_QUALITY,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(
            self,
            MergeStrategy::Heuristic {
                min_bytes: 0,
                max_bytes: u32::MAX,
            }
        )
    }

    pub fn uses_costs(&self) -> bool {
        matches!(
            self,
            MergeStrategy::CostBased { .. } | MergeStrategy::BigramCostBased { .. }
        )
    }

    pub fn network_overhead_cost(&self) -> u32 {
        match self {
            MergeStrategy::Heuristic { .. } => 0,
            MergeStrategy::CostBased {
                network_overhead_cost,
                ..
            }
            | MergeStrategy::BigramCostBased {
                network_overhead_cost,
                ..
            } => *network_overhead_cost,
        }
    }

    pub fn minimum_group_size(&self) -> usize {
        match self {
            MergeStrategy::Heuristic { .. } => 1,
            MergeStrategy::CostBased { min_group_size, .. }
            | MergeStrategy::BigramCostBased { min_group_size, .. } => *min_group_size,
        }
    }

    pub fn patch_size_min_bytes(&self) -> u32 {
        match self {
            MergeStrategy::Heuristic { min_bytes, .. } => *min_bytes,
            _ => 0,
        }
    }

    pub fn patch_size_max_bytes(&self) -> u32 {
        match self {
            MergeStrategy::Heuristic { max_bytes, .. } => *max_bytes,
            _ => u32::MAX,
        }
    }

    pub fn probability_calculator(&self) -> Arc<dyn ProbabilityCalculator> {
        match self {
            MergeStrategy::CostBased {
                probability_calculator,
                ..
            }
            | MergeStrategy::BigramCostBased {
                probability_calculator,
                ..
            } => probability_calculator.clone(),
            _ => Arc::new(NoopProbabilityCalculator),
        }
    }

    pub fn optimization_cutoff_fraction(&self) -> f64 {
        match self {
            MergeStrategy::CostBased {
                optimization_cutoff_fraction,
                ..
            }
            | MergeStrategy::BigramCostBased {
                optimization_cutoff_fraction,
                ..
            } => *optimization_cutoff_fraction,
            _ => DEFAULT_OPTIMIZATION_CUTOFF_FRACTION,
        }
    }

    /// Brotli quality to use when estimating patch sizes for merge decisions. Clamped to the
    /// range brotli accepts (1-11).
    pub fn brotli_quality(&self) -> u32 {
        let q = match self {
            MergeStrategy::CostBased { brotli_quality, .. }
            | MergeStrategy::BigramCostBased { brotli_quality, .. } => *brotli_quality,
            _ => DEFAULT_BROTLI_QUALITY,
        };
        q.clamp(1, 11)
    }
}
