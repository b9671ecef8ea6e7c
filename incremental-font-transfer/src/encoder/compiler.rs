//! Top level entry point: compiles an original font plus a set of input segments into a complete
//! Incremental Font Transfer encoding — a fully expanded base font plus the glyph-keyed patches
//! needed to incrementally extend it.
//!
//! Grounded on `ift/encoder/compiler.h`'s `Compiler::Compile`, reduced here to the glyph-keyed
//! path (table-keyed chaining across multiple expansion stages is exposed separately via
//! [`super::jump_graph`]/[`super::table_keyed_encode`] for callers that need it, rather than
//! folded into this single-shot entry point).

use std::collections::{BTreeMap, BTreeSet};

use read_fonts::collections::IntSet;
use read_fonts::FontRef;
use skrifa::GlyphId;

use super::condition::Condition;
use super::format2::{encode_format2_map, Format2Entry};
use super::glyph_keyed_encode::{build_glyph_keyed_patch, supported_glyph_keyed_tables};
use super::glyph_segmentation::UnmappedGlyphHandling;
use super::ift_table::write_ift_table;
use super::merge_strategy::MergeStrategy;
use super::patch::{CompatId, Patch, PatchId};
use super::segment::Segment;
use super::segmenter::Segmenter;
use super::subset_definition::SubsetDefinition;
use super::url_template::flat_template;
use super::EncoderError;

/// The complete output of a compile: the fully expanded base font plus every patch it can be
/// incrementally extended with.
#[derive(Debug, Clone)]
pub struct Encoding {
    pub init_font: Vec<u8>,
    pub patches: Vec<Patch>,
}

/// Builds an [`Encoding`] from an original font and a description of how its glyphs should be
/// grouped into patches.
pub struct Compiler<'a> {
    font: FontRef<'a>,
    init_font_definition: SubsetDefinition,
    segments: Vec<Segment>,
    merge_strategy: MergeStrategy,
    unmapped_glyph_handling: UnmappedGlyphHandling,
    url_prefix: String,
    brotli_quality: u32,
}

impl<'a> Compiler<'a> {
    pub fn new(font: FontRef<'a>) -> Self {
        Compiler {
            font,
            init_font_definition: SubsetDefinition::default(),
            segments: Vec::new(),
            merge_strategy: MergeStrategy::none(),
            unmapped_glyph_handling: UnmappedGlyphHandling::default(),
            url_prefix: String::new(),
            brotli_quality: 11,
        }
    }

    /// The subset definition that should always be present in the base font, before any patch is
    /// applied (e.g. the default Latin codepoints and required layout tables).
    pub fn with_init_font_definition(mut self, definition: SubsetDefinition) -> Self {
        self.init_font_definition = definition;
        self
    }

    pub fn add_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn with_merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = strategy;
        self
    }

    pub fn with_unmapped_glyph_handling(mut self, handling: UnmappedGlyphHandling) -> Self {
        self.unmapped_glyph_handling = handling;
        self
    }

    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    pub fn with_brotli_quality(mut self, quality: u32) -> Self {
        self.brotli_quality = quality;
        self
    }

    pub fn compile(self) -> Result<Encoding, EncoderError> {
        let compat_id = CompatId::from_seed(self.segments.len() as u64 + 1);

        let segmenter = Segmenter::new(self.font.clone(), self.merge_strategy.clone(), compat_id)
            .with_unmapped_glyph_handling(self.unmapped_glyph_handling);
        let outcome = segmenter.segment(&self.init_font_definition, self.segments.clone())?;

        if outcome.degraded {
            log::debug!("segmentation fell back to a degraded unmapped-glyph patch");
        }

        let segmentation = outcome.segmentation;
        let tables = supported_glyph_keyed_tables(&self.font);

        // The activation condition for each patch is the union of the subset definitions of the
        // segments that were merged into it; the patch's actual payload is the glyph closure the
        // segmenter already computed, which can include glyphs beyond what those codepoints
        // alone would reach (composites, ligature components, and so on).
        let mut defs_by_patch: BTreeMap<PatchId, SubsetDefinition> = BTreeMap::new();
        for (segment_id, patch_id) in &segmentation.segment_patches {
            defs_by_patch
                .entry(*patch_id)
                .or_default()
                .union(segmentation.segments[*segment_id].definition());
        }

        let mut conditions = Vec::new();
        let mut entries = Vec::new();
        // Leaf condition index for each segment, keyed by whichever patch that segment landed
        // in; conditional patches reference these indices to build the right AND/OR combination
        // instead of a blanket disjunction over every segment.
        let mut leaf_condition_index_by_segment: BTreeMap<usize, usize> = BTreeMap::new();

        for (patch_id, definition) in &defs_by_patch {
            let condition = Condition::simple(definition.clone(), *patch_id);
            let condition_index = conditions.len();
            entries.push(Format2Entry::from_condition(&condition, Some(*patch_id)));
            conditions.push(condition);

            for (segment_id, segment_patch_id) in &segmentation.segment_patches {
                if segment_patch_id == patch_id {
                    leaf_condition_index_by_segment.insert(*segment_id, condition_index);
                }
            }
        }

        for conditional in &segmentation.conditional_patches {
            let child_conditions: BTreeSet<usize> = conditional
                .segments
                .iter()
                .filter_map(|id| leaf_condition_index_by_segment.get(id).copied())
                .collect();
            if child_conditions.is_empty() {
                continue;
            }

            let composite = Condition {
                subset_definition: SubsetDefinition::default(),
                child_conditions,
                conjunctive: conditional.conjunctive,
                activated_patch_id: Some(conditional.patch_id),
            };
            entries.push(Format2Entry::from_condition(&composite, Some(conditional.patch_id)));
            conditions.push(composite);
        }

        if let Some(unmapped_patch_id) = segmentation.unmapped_glyphs_patch {
            let leaf_condition_indices: Vec<usize> =
                leaf_condition_index_by_segment.values().copied().collect();
            if !leaf_condition_indices.is_empty() {
                let composite = Condition {
                    subset_definition: SubsetDefinition::default(),
                    child_conditions: leaf_condition_indices.into_iter().collect(),
                    conjunctive: false,
                    activated_patch_id: Some(unmapped_patch_id),
                };
                entries.push(Format2Entry::from_condition(&composite, Some(unmapped_patch_id)));
                conditions.push(composite);
            }
        }

        let template = flat_template(&self.url_prefix, ".gk");
        let format2_bytes = encode_format2_map(compat_id, &template, &entries)?;
        let init_font = write_ift_table(&self.font, format2_bytes)?;

        let mut patches =
            Vec::with_capacity(defs_by_patch.len() + segmentation.conditional_patches.len() + 1);
        for patch_id in defs_by_patch.keys() {
            let glyphs = glyphs_for_patch(&segmentation, *patch_id);
            let data = build_glyph_keyed_patch(
                &self.font,
                &glyphs,
                &tables,
                compat_id,
                self.brotli_quality,
            )?;
            patches.push(Patch::glyph_keyed(*patch_id, data, glyphs));
        }

        for conditional in &segmentation.conditional_patches {
            let data = build_glyph_keyed_patch(
                &self.font,
                &conditional.glyphs,
                &tables,
                compat_id,
                self.brotli_quality,
            )?;
            patches.push(Patch::glyph_keyed(
                conditional.patch_id,
                data,
                conditional.glyphs.clone(),
            ));
        }

        if let Some(unmapped_patch_id) = segmentation.unmapped_glyphs_patch {
            let glyphs = segmentation.unmapped_glyphs.clone();
            let data = build_glyph_keyed_patch(
                &self.font,
                &glyphs,
                &tables,
                compat_id,
                self.brotli_quality,
            )?;
            patches.push(Patch::glyph_keyed(unmapped_patch_id, data, glyphs));
        }

        Ok(Encoding { init_font, patches })
    }
}

/// Glyphs belonging to the (single) segment group this patch id was assigned to. Only the group
/// leader carries an entry in `segment_glyphs`, so this looks for whichever leader maps to
/// `patch_id`.
fn glyphs_for_patch(
    segmentation: &super::glyph_segmentation::GlyphSegmentation,
    patch_id: PatchId,
) -> IntSet<GlyphId> {
    segmentation
        .segment_glyphs
        .iter()
        .find(|(segment_id, _)| segmentation.segment_patches.get(segment_id) == Some(&patch_id))
        .map(|(_, glyphs)| glyphs.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiler_defaults_to_no_merging() {
        // Exercises the builder surface without requiring a real font; full compile() behavior
        // is covered by the integration tests in tests/encoder_integration.rs.
        let strategy = MergeStrategy::none();
        assert!(strategy.is_none());
    }
}
