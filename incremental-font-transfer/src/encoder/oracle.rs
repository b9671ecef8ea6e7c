//! Closure oracle: answers "which glyphs does this subset definition need?" by delegating to
//! the subsetter's glyph closure.
//!
//! Grounded on `ift/encoder/closure_glyph_segmenter.h`'s use of `hb_subset_plan` as its closure
//! oracle, ported here to `skera::Plan`. Segmentation never reimplements shaping or table
//! dependency rules itself; it always asks the subsetter what a candidate subset definition
//! would retain, the same way the original asks harfbuzz.

use font_types::NameId;
use read_fonts::collections::IntSet;
use read_fonts::FontRef;
use skera::{AxisSpec, InstancingSpec, Plan, SubsetError, SubsetFlags};
use skrifa::GlyphId;

use super::subset_definition::SubsetDefinition;

/// Computes glyph closures for candidate subset definitions against a fixed original font.
///
/// Holding the font by reference keeps the oracle cheap to construct repeatedly during
/// segmentation, where candidate definitions are closed over one at a time or in small unions.
pub struct ClosureOracle<'a> {
    font: FontRef<'a>,
}

impl<'a> ClosureOracle<'a> {
    pub fn new(font: FontRef<'a>) -> Self {
        ClosureOracle { font }
    }

    pub fn font(&self) -> &FontRef<'a> {
        &self.font
    }

    /// Returns the full glyph closure of `definition`: every glyph id the subsetter would retain
    /// if producing a subset font from this definition alone.
    pub fn closure(&self, definition: &SubsetDefinition) -> Result<IntSet<GlyphId>, SubsetError> {
        let plan = self.build_plan(definition)?;
        Ok(plan.glyph_set().clone())
    }

    /// Like [`Self::closure`], but only returns the glyphs retained beyond `excluding`'s own
    /// closure. Used to find the incremental glyph contribution a segment would add on top of
    /// a base subset definition that's already considered satisfied.
    pub fn additional_closure(
        &self,
        definition: &SubsetDefinition,
        excluding: &SubsetDefinition,
    ) -> Result<IntSet<GlyphId>, SubsetError> {
        let mut merged = excluding.clone();
        merged.union(definition);

        let mut base = self.closure(excluding)?;
        let full = self.closure(&merged)?;

        let mut additional = full;
        for gid in base.iter() {
            additional.remove(gid);
        }
        base.clear();
        Ok(additional)
    }

    fn build_plan(&self, definition: &SubsetDefinition) -> Result<Plan, SubsetError> {
        let variations = instancing_spec(definition);
        let flags = SubsetFlags::SUBSET_FLAGS_RETAIN_GIDS | SubsetFlags::SUBSET_FLAGS_NOTDEF_OUTLINE;

        Ok(Plan::new(
            &definition.gids,
            &definition.codepoints,
            &self.font,
            flags,
            &IntSet::empty(),
            &IntSet::empty(),
            &definition.feature_tags.iter().copied().collect(),
            &IntSet::<NameId>::empty(),
            &IntSet::<u16>::empty(),
            &variations,
        ))
    }
}

/// Translates a design space into the subsetter's instancing spec, pinning any axis that's a
/// point and leaving ranged axes untouched (the subsetter treats an absent axis as fully
/// variable, matching a range that spans the whole axis).
fn instancing_spec(definition: &SubsetDefinition) -> Option<InstancingSpec> {
    if definition.design_space.is_empty() {
        return None;
    }

    let mut spec = InstancingSpec::default();
    for (tag, range) in definition.design_space.iter() {
        if range.is_point() {
            spec.axes.insert(
                *tag,
                AxisSpec::Range {
                    min: range.start(),
                    def: range.start(),
                    max: range.start(),
                },
            );
        }
    }
    if spec.axes.is_empty() {
        None
    } else {
        Some(spec)
    }
}
