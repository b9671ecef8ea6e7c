//! A description of a slice of a font: codepoints, glyphs, layout features and a design space.
//!
//! Grounded on `ift/encoder/subset_definition.{h,cc}`: the encode-side counterpart to
//! `crate::patchmap::SubsetDefinition`, which only needs to describe what a *client* has
//! already loaded. This version additionally tracks glyph ids directly, since segments are
//! sometimes defined in terms of glyphs rather than codepoints (e.g. glyph data patches).

use std::collections::{BTreeMap, BTreeSet};

use font_types::Tag;
use read_fonts::collections::IntSet;
use skrifa::GlyphId;

use crate::patchmap::FeatureSet;

/// An inclusive range along a single variation axis, in user-space (float) units.
///
/// A "point" (`start == end`) pins the axis to a single value; any other range leaves the
/// axis variable over `[start, end]`. Wire serialization writes each bound as a 16.16 fixed
/// point value (see `encoder::format2::write_fixed`), matching `FontHelper::WriteFixed`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    start: f32,
    end: f32,
}

impl Eq for AxisRange {}

impl PartialOrd for AxisRange {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AxisRange {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.start
            .total_cmp(&other.start)
            .then(self.end.total_cmp(&other.end))
    }
}

impl AxisRange {
    pub fn point(value: f32) -> Self {
        AxisRange {
            start: value,
            end: value,
        }
    }

    pub fn range(start: f32, end: f32) -> Self {
        AxisRange { start, end }
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    pub fn is_range(&self) -> bool {
        !self.is_point()
    }
}

pub type DesignSpace = BTreeMap<Tag, AxisRange>;

/// A description of a slice of a font used as the input to segmentation and patch compilation.
///
/// Four independent dimensions can each be unioned or subtracted: codepoints, glyph ids,
/// layout feature tags, and a variation design space. See spec §3 for the merge rules each
/// dimension follows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubsetDefinition {
    pub codepoints: IntSet<u32>,
    pub gids: IntSet<GlyphId>,
    pub feature_tags: BTreeSet<Tag>,
    pub design_space: DesignSpace,
}

impl SubsetDefinition {
    pub fn codepoints(codepoints: IntSet<u32>) -> Self {
        SubsetDefinition {
            codepoints,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.codepoints.is_empty()
            && self.gids.is_empty()
            && self.feature_tags.is_empty()
            && self.design_space.is_empty()
    }

    pub fn is_variable(&self) -> bool {
        self.design_space.values().any(AxisRange::is_range)
    }

    /// Merges `other` into `self`. Matches `SubsetDefinition::Union` in the original: codepoints
    /// and gids are a plain set union, feature tags likewise, and design space axes are unioned
    /// per axis (a point absorbed into an overlapping range widens to the range; two distinct
    /// concrete ranges are not reconciled further, matching the original's simplifying
    /// assumption that a font's axis configurations don't need full interval arithmetic here).
    pub fn union(&mut self, other: &SubsetDefinition) {
        self.codepoints.union(&other.codepoints);
        self.gids.union(&other.gids);
        self.feature_tags.extend(other.feature_tags.iter().copied());

        for (tag, range) in other.design_space.iter() {
            match self.design_space.get(tag) {
                None => {
                    self.design_space.insert(*tag, *range);
                }
                Some(existing) if existing.is_point() && range.is_range() => {
                    self.design_space.insert(*tag, *range);
                }
                _ => {}
            }
        }
    }

    /// Removes the portion of `self` present in `other`. Matches `SubsetDefinition::Subtract`.
    ///
    /// Codepoints, gids and feature tags are plain set differences. Each design space axis
    /// follows a four way rule: a point minus an equal point is empty; a range minus a range
    /// that contains it entirely is empty; a range minus a disjoint range is unchanged; a range
    /// minus a range that overlaps one end leaves the remaining sub-range. Subtracting a range
    /// that strictly splits the interior of another range (leaving two disjoint remainders) has
    /// no representation in a single `AxisRange` and is rejected.
    pub fn subtract(&mut self, other: &SubsetDefinition) -> Result<(), super::EncoderError> {
        for cp in other.codepoints.iter() {
            self.codepoints.remove(cp);
        }
        for cp in other.codepoints.iter() {
            // The original subtracts `other.codepoints` from gids too (a quirk preserved here
            // for the same reason: gids and codepoints share a numeric domain in proto form).
            self.gids.remove(GlyphId::new(cp));
        }
        for tag in other.feature_tags.iter() {
            self.feature_tags.remove(tag);
        }
        for (tag, other_range) in other.design_space.iter() {
            let Some(range) = self.design_space.get(tag).copied() else {
                continue;
            };

            if range.start() > other_range.end() || range.end() < other_range.start() {
                // Disjoint: self's coverage on this axis is untouched.
                continue;
            }

            if other_range.start() <= range.start() && other_range.end() >= range.end() {
                // other fully contains (or equals) self's range, including point - point.
                self.design_space.remove(tag);
                continue;
            }

            if other_range.start() <= range.start() {
                // Overlap trimmed off the low end; what remains is the high side.
                self.design_space
                    .insert(*tag, AxisRange::range(other_range.end(), range.end()));
            } else if other_range.end() >= range.end() {
                // Overlap trimmed off the high end; what remains is the low side.
                self.design_space
                    .insert(*tag, AxisRange::range(range.start(), other_range.start()));
            } else {
                return Err(super::EncoderError::InvalidArgument(format!(
                    "cannot subtract an interior sub-range of axis '{tag}': would split \
                     the range into two disjoint pieces"
                )));
            }
        }
        Ok(())
    }

    /// Converts this definition into the `(codepoints, features, design_space)` coverage triple
    /// used by a format 2 patch map entry. Glyph ids have no coverage representation: glyph data
    /// patches are always reached via conditions, not direct codepoint/feature matching.
    pub fn to_coverage(&self) -> (IntSet<u32>, FeatureSet, DesignSpace) {
        (
            self.codepoints.clone(),
            FeatureSet::Set(self.feature_tags.clone()),
            self.design_space.clone(),
        )
    }
}
