//! Evaluates the cost of merging one or more segments together into a single patch.
//!
//! A merge is assessed by comparing the expected number of bytes a client downloads with and
//! without the merge: each segment contributes `probability * patch_size` bytes plus a fixed
//! per-request network overhead, and a merge is worth taking when the combined expectation is
//! lower than the sum of the unmerged expectations.

use std::collections::BTreeSet;

use super::freq::ProbabilityBound;
use super::merge_strategy::MergeStrategy;
use super::segment::{Segment, SegmentId};

/// A size delta below which the cost of two separately compressed patches versus one merged
/// patch is dominated by brotli stream overhead rather than actual content growth.
const BEST_CASE_MERGE_SIZE_DELTA: i64 = 6;

/// A candidate merge of `segments_to_merge` into `base_segment`, with the resulting cost change
/// already computed relative to leaving the segments unmerged.
#[derive(Debug, Clone)]
pub struct CandidateMerge {
    base_segment: SegmentId,
    segments_to_merge: BTreeSet<SegmentId>,
    merged_patch_size: u32,
    cost_delta: f64,
}

impl CandidateMerge {
    /// The baseline candidate: no merge at all, with zero cost delta. Used as the initial best
    /// candidate so that any real merge must strictly improve on doing nothing.
    pub fn baseline(base_segment: SegmentId, base_patch_size: u32) -> Self {
        CandidateMerge {
            base_segment,
            segments_to_merge: BTreeSet::new(),
            merged_patch_size: base_patch_size,
            cost_delta: 0.0,
        }
    }

    pub fn base_segment(&self) -> SegmentId {
        self.base_segment
    }

    pub fn segments_to_merge(&self) -> &BTreeSet<SegmentId> {
        &self.segments_to_merge
    }

    pub fn merged_patch_size(&self) -> u32 {
        self.merged_patch_size
    }

    pub fn cost_delta(&self) -> f64 {
        self.cost_delta
    }

    pub fn is_baseline(&self) -> bool {
        self.segments_to_merge.is_empty()
    }

    /// Assesses merging `base` with `others`, where `merged_patch_size` is the size (in bytes)
    /// of the patch that results from merging all of their glyph closures together. Each entry
    /// in `others` carries its own pre-merge patch size (`size_old` in the cost formula), not
    /// the post-merge size — charging an unmerged segment for the size of a patch it would never
    /// have shipped on its own systematically overstates the benefit of merging.
    ///
    /// Positive `cost_delta` values are improvements (this candidate is preferred over the
    /// baseline); `strategy` supplies the probability model and network overhead used to weigh
    /// patch size against request probability. `cost_delta` is symmetric in `base`/`others`: it
    /// depends only on each segment's own `(probability, patch_size)` pair and the shared merged
    /// size, so swapping which segment is "base" yields the same result.
    pub fn assess(
        base: &Segment,
        base_id: SegmentId,
        base_patch_size: u32,
        others: &[(SegmentId, &Segment, u32)],
        merged_patch_size: u32,
        strategy: &MergeStrategy,
    ) -> CandidateMerge {
        let overhead = strategy.network_overhead_cost() as f64;

        let unmerged_cost = expected_cost(base.probability_bound(), base_patch_size, overhead)
            + others
                .iter()
                .map(|(_, s, size)| expected_cost(s.probability_bound(), *size, overhead))
                .sum::<f64>();

        let merged_probability = combine_probabilities(
            base.probability_bound(),
            others.iter().map(|(_, s, _)| s.probability_bound()),
            strategy,
        );
        let merged_cost = expected_cost(merged_probability, merged_patch_size, overhead);

        CandidateMerge {
            base_segment: base_id,
            segments_to_merge: others.iter().map(|(id, _, _)| *id).collect(),
            merged_patch_size,
            cost_delta: unmerged_cost - merged_cost,
        }
    }

    /// A lower bound on the probability an inert segment (one contributing no additional glyphs
    /// when merged) would need to have in order for merging it in to beat `current_best`. Used
    /// to skip expensive closure computations for segments that can't possibly win.
    pub fn inert_probability_threshold(
        current_best: &CandidateMerge,
        base_patch_size: u32,
        overhead: f64,
    ) -> f64 {
        if current_best.cost_delta <= 0.0 {
            return 0.0;
        }
        let best_case_size = (base_patch_size as i64 + BEST_CASE_MERGE_SIZE_DELTA).max(0) as f64;
        (current_best.cost_delta / best_case_size.max(1.0)).clamp(0.0, 1.0) - overhead
    }
}

fn expected_cost(probability: ProbabilityBound, patch_size: u32, overhead: f64) -> f64 {
    probability.average() * (patch_size as f64 + overhead)
}

/// Combines the probabilities of `base` and `others` into the probability the merged patch is
/// requested, `P(A ∨ B ∨ ...)`. `CostBased` treats segments as independent events and applies
/// the exact independence formula (`P(A∨B) = P(A)+P(B)-P(A)*P(B)`, folded pairwise over more
/// than two segments); `BigramCostBased` instead falls back to the looser Boole/Bonferroni union
/// bound, since bigram-derived probabilities already encode co-occurrence and summing them
/// directly would double count it less conservatively than the independence formula assumes.
fn combine_probabilities(
    base: ProbabilityBound,
    others: impl Iterator<Item = ProbabilityBound>,
    strategy: &MergeStrategy,
) -> ProbabilityBound {
    match strategy {
        MergeStrategy::BigramCostBased { .. } => {
            let mut min = base.min();
            let mut max = base.max();
            for p in others {
                min = (min + p.min()).min(1.0);
                max = (max + p.max()).min(1.0);
            }
            ProbabilityBound::new(min, max)
        }
        _ => {
            let mut min = base.min();
            let mut max = base.max();
            for p in others {
                min = min + p.min() - min * p.min();
                max = max + p.max() - max * p.max();
            }
            ProbabilityBound::new(min.clamp(0.0, 1.0), max.clamp(0.0, 1.0))
        }
    }
}

impl PartialEq for CandidateMerge {
    fn eq(&self, other: &Self) -> bool {
        self.cost_delta == other.cost_delta
            && self.segments_to_merge == other.segments_to_merge
            && self.base_segment == other.base_segment
    }
}

impl Eq for CandidateMerge {}

impl PartialOrd for CandidateMerge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CandidateMerge {
    /// Orders candidates so the best one (highest cost delta; ties broken toward the candidate
    /// that actually merges something) sorts greatest.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.cost_delta
            .total_cmp(&other.cost_delta)
            .then_with(|| self.segments_to_merge.len().cmp(&other.segments_to_merge.len()))
            .then_with(|| other.base_segment.cmp(&self.base_segment))
            .then_with(|| other.segments_to_merge.cmp(&self.segments_to_merge))
    }
}
