//! The output of segmentation: a partition of a font's glyphs into patches, plus the activation
//! conditions that determine when each patch should be loaded.

use std::collections::{BTreeMap, BTreeSet};

use read_fonts::collections::IntSet;
use skrifa::GlyphId;

use super::condition::Condition;
use super::patch::PatchId;
use super::segment::{Segment, SegmentId};

/// A patch gated on a boolean combination of more than one segment, rather than on a single
/// segment's own subset definition: either "any of these segments" (disjunctive, an OR group of
/// glyphs independently reachable from each member's own closure) or "all of these segments"
/// (conjunctive, an AND group only reachable once every member is present together).
#[derive(Debug, Clone)]
pub struct ConditionalPatch {
    pub segments: BTreeSet<SegmentId>,
    pub conjunctive: bool,
    pub glyphs: IntSet<GlyphId>,
    pub patch_id: PatchId,
}

/// How glyphs that aren't reachable from any codepoint, feature, or design space segment are
/// handled. Such glyphs typically come from ligatures, contextual substitutions, or composite
/// glyph components that are pulled in transitively rather than requested directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmappedGlyphHandling {
    /// Add the unmapped glyphs to a dedicated patch with no activation condition of its own;
    /// it is instead activated whenever any condition that transitively depends on it fires.
    #[default]
    Patch,
    /// Search the dependency graph for a composite activation condition (a boolean combination
    /// of the segments that, together, reach the unmapped glyphs) and gate the new patch on it.
    FindConditions,
    /// Fold the unmapped glyphs into the initial font instead of creating a new patch for them.
    MoveToInitFont,
}

/// The result of segmenting a font's glyphs into patches.
///
/// Each segment maps to exactly one patch (via `segment_patches`); glyphs with more complex
/// activation requirements, or no direct codepoint mapping at all, are recorded in
/// `unmapped_glyphs` and gated by the composite `conditions` list instead.
#[derive(Debug, Clone, Default)]
pub struct GlyphSegmentation {
    pub segments: Vec<Segment>,
    /// Glyphs belonging to each segment's patch, keyed by segment id.
    pub segment_glyphs: BTreeMap<SegmentId, IntSet<GlyphId>>,
    /// Patch id assigned to each segment.
    pub segment_patches: BTreeMap<SegmentId, PatchId>,
    /// Glyphs that are not directly reachable from a single segment's closure, and that the
    /// dependency graph's pairwise scan didn't attribute to an OR or AND group either (e.g. a
    /// genuinely 3+-way interaction). Only populated when `UnmappedGlyphHandling` requests a
    /// fallback patch for them.
    pub unmapped_glyphs: IntSet<GlyphId>,
    /// Patch id covering `unmapped_glyphs`, if any were found.
    pub unmapped_glyphs_patch: Option<PatchId>,
    /// Patches gated on more than one segment: OR groups (glyphs shared by more than one
    /// segment's own closure) and AND groups (glyphs only unlocked by combining segments).
    pub conditional_patches: Vec<ConditionalPatch>,
    /// Conditions gating patches other than the direct per-segment ones (composite conditions
    /// produced for conditional patches and the unmapped glyph fallback).
    pub conditions: Vec<Condition>,
}

impl GlyphSegmentation {
    pub fn new(segments: Vec<Segment>) -> Self {
        GlyphSegmentation {
            segments,
            ..Default::default()
        }
    }

    pub fn glyphs_for_segment(&self, segment_id: SegmentId) -> Option<&IntSet<GlyphId>> {
        self.segment_glyphs.get(&segment_id)
    }

    pub fn patch_for_segment(&self, segment_id: SegmentId) -> Option<PatchId> {
        self.segment_patches.get(&segment_id).copied()
    }

    /// The total number of distinct patches this segmentation will produce: one per segment
    /// that was assigned a patch, plus one per conditional patch, plus the unmapped glyph patch
    /// if present.
    pub fn patch_count(&self) -> usize {
        let mut ids: BTreeSet<PatchId> = self.segment_patches.values().copied().collect();
        for conditional in &self.conditional_patches {
            ids.insert(conditional.patch_id);
        }
        if let Some(id) = self.unmapped_glyphs_patch {
            ids.insert(id);
        }
        ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::freq::ProbabilityBound;
    use crate::encoder::subset_definition::SubsetDefinition;

    #[test]
    fn empty_segmentation_has_no_patches() {
        let segmentation = GlyphSegmentation::new(vec![]);
        assert_eq!(segmentation.patch_count(), 0);
    }

    #[test]
    fn patch_count_dedupes_merged_segments() {
        let mut segmentation = GlyphSegmentation::new(vec![
            Segment::new(SubsetDefinition::default(), ProbabilityBound::zero()),
            Segment::new(SubsetDefinition::default(), ProbabilityBound::zero()),
        ]);
        segmentation.segment_patches.insert(0, 5);
        segmentation.segment_patches.insert(1, 5);
        assert_eq!(segmentation.patch_count(), 1);
    }
}
