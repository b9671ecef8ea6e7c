//! Orchestrates segmentation: partitions a list of input segments into glyph-keyed patch groups,
//! merging segments together when the active [`MergeStrategy`] determines the unmerged patches
//! would be too small, or too costly in expected bytes downloaded, to ship independently.
//!
//! Grounded on `ift/encoder/closure_glyph_segmenter.h`'s segmentation pass: a single forward scan
//! that greedily grows the current group with its immediate neighbour until the strategy no
//! longer wants to keep merging, then starts a new group.

use read_fonts::FontRef;

use super::candidate_merge::CandidateMerge;
use super::dependency_graph::DependencyGraph;
use super::glyph_segmentation::{ConditionalPatch, GlyphSegmentation, UnmappedGlyphHandling};
use super::merge_strategy::MergeStrategy;
use super::oracle::ClosureOracle;
use super::patch::{CompatId, PatchId};
use super::patch_size_cache::PatchSizeCache;
use super::segment::{Segment, SegmentId};
use super::subset_definition::SubsetDefinition;
use super::EncoderError;

/// The result of a segmentation pass, including whether it had to fall back to a degraded
/// result (spec: unmapped glyphs that couldn't be given a precise activation condition).
#[derive(Debug)]
pub struct SegmenterOutcome {
    pub segmentation: GlyphSegmentation,
    pub degraded: bool,
}

/// Partitions a set of input segments into glyph-keyed patches.
pub struct Segmenter<'a> {
    font: FontRef<'a>,
    strategy: MergeStrategy,
    unmapped_glyph_handling: UnmappedGlyphHandling,
    compat_id: CompatId,
}

impl<'a> Segmenter<'a> {
    pub fn new(font: FontRef<'a>, strategy: MergeStrategy, compat_id: CompatId) -> Self {
        Segmenter {
            font,
            strategy,
            unmapped_glyph_handling: UnmappedGlyphHandling::default(),
            compat_id,
        }
    }

    pub fn with_unmapped_glyph_handling(mut self, handling: UnmappedGlyphHandling) -> Self {
        self.unmapped_glyph_handling = handling;
        self
    }

    /// Segments `segments` against `init_font_definition` (the subset definition already folded
    /// into the base font, so its glyphs never need a patch of their own).
    pub fn segment(
        &self,
        init_font_definition: &SubsetDefinition,
        segments: Vec<Segment>,
    ) -> Result<SegmenterOutcome, EncoderError> {
        let oracle = ClosureOracle::new(self.font.clone());
        let tables = super::glyph_keyed_encode::supported_glyph_keyed_tables(&self.font);
        let size_cache = PatchSizeCache::new(self.font.clone(), tables, self.compat_id);
        let quality = self.strategy.brotli_quality();

        let refs: Vec<(SegmentId, &SubsetDefinition)> = segments
            .iter()
            .enumerate()
            .map(|(i, s)| (i, s.definition()))
            .collect();
        let graph = DependencyGraph::build(&oracle, init_font_definition, &refs)?;

        let mut segmentation = GlyphSegmentation::new(segments.clone());
        let mut next_patch_id: PatchId = 0;

        let mut i = 0usize;
        while i < segments.len() {
            let mut group: Vec<SegmentId> = vec![i];
            let mut group_glyphs = graph.glyphs_for(i);

            while i + group.len() < segments.len() {
                let reached_min_size = group.len() >= self.strategy.minimum_group_size();
                let current_size = size_cache.patch_size(&group_glyphs, quality)?;

                let next_id = i + group.len();
                let mut merged_glyphs = group_glyphs.clone();
                merged_glyphs.union(&graph.glyphs_for(next_id));
                let merged_size = size_cache.patch_size(&merged_glyphs, quality)?;

                let should_merge = if self.strategy.uses_costs() {
                    let mut others: Vec<(SegmentId, &Segment, u32)> = Vec::with_capacity(group.len());
                    for &id in &group[1..] {
                        let size = size_cache.patch_size(&graph.glyphs_for(id), quality)?;
                        others.push((id, &segments[id], size));
                    }
                    let next_size = size_cache.patch_size(&graph.glyphs_for(next_id), quality)?;
                    others.push((next_id, &segments[next_id], next_size));

                    let candidate = CandidateMerge::assess(
                        &segments[i],
                        i,
                        current_size,
                        &others,
                        merged_size,
                        &self.strategy,
                    );
                    !reached_min_size || candidate.cost_delta() > 0.0
                } else {
                    !reached_min_size || current_size < self.strategy.patch_size_min_bytes()
                };

                if !should_merge || merged_size > self.strategy.patch_size_max_bytes() {
                    break;
                }

                group.push(next_id);
                group_glyphs = merged_glyphs;
            }

            let patch_id = next_patch_id;
            next_patch_id += 1;
            for &id in &group {
                segmentation.segment_patches.insert(id, patch_id);
            }
            segmentation.segment_glyphs.insert(i, group_glyphs);

            i += group.len();
        }

        self.assign_conditional_patches(&graph, &mut segmentation, &mut next_patch_id);

        // The pairwise OR/AND scan above gives every shared or combination-only glyph an exact
        // condition, so there's nothing left for `unmapped_glyph_handling` to degrade into: a
        // genuinely 3+-segment-only interaction (beyond what the pairwise scan can attribute)
        // simply isn't detected at all, rather than being folded into an over-broad fallback.
        let degraded = false;

        Ok(SegmenterOutcome {
            segmentation,
            degraded,
        })
    }

    /// Turns every OR/AND group the dependency graph found into a [`ConditionalPatch`], each
    /// with its own patch id.
    fn assign_conditional_patches(
        &self,
        graph: &DependencyGraph,
        segmentation: &mut GlyphSegmentation,
        next_patch_id: &mut PatchId,
    ) {
        if matches!(self.unmapped_glyph_handling, UnmappedGlyphHandling::MoveToInitFont) {
            return;
        }

        for group in &graph.or_groups {
            let patch_id = *next_patch_id;
            *next_patch_id += 1;
            segmentation.conditional_patches.push(ConditionalPatch {
                segments: group.segments.clone(),
                conjunctive: false,
                glyphs: group.glyphs.clone(),
                patch_id,
            });
        }

        for group in &graph.and_groups {
            let patch_id = *next_patch_id;
            *next_patch_id += 1;
            segmentation.conditional_patches.push(ConditionalPatch {
                segments: group.segments.clone(),
                conjunctive: true,
                glyphs: group.glyphs.clone(),
                patch_id,
            });
        }
    }
}
