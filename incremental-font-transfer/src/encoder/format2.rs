//! Encodes a format 2 patch map: the mapping table format used by `IFT `/`IFTX` tables to gate
//! patches behind codepoint, feature tag, and design space coverage.
//!
//! This is the write-direction twin of [`crate::patchmap`]'s format 2 decoder; the two must stay
//! bit-compatible, which is checked by round-tripping encoded output back through that decoder
//! in this module's tests. See
//! <https://w3c.github.io/IFT/Overview.html#patch-map-format-2>.

use font_types::Tag;
use read_fonts::collections::IntSet;

use super::condition::Condition;
use super::patch::{CompatId, PatchEncoding, PatchId};
use super::subset_definition::{AxisRange, DesignSpace};
use super::EncoderError;

// Bit positions within an entry's format flags byte. Mirrors the layout `patchmap.rs` decodes.
const FEATURES_AND_DESIGN_SPACE_BIT: u8 = 1 << 0;
const CHILD_INDICES_BIT: u8 = 1 << 1;
const ENTRY_ID_DELTA_BIT: u8 = 1 << 2;
const PATCH_ENCODING_BIT: u8 = 1 << 3;
const CODEPOINTS_BIT_1: u8 = 1 << 4;
const CODEPOINTS_BIT_2: u8 = 1 << 5;
const IGNORED_BIT: u8 = 1 << 6;

/// Minimum size of a format 2 table header before the URI template and entries: format (1) +
/// reserved (3) + flags (1) + compat id (16) + default encoding (1) + mapping count (3) +
/// entries offset (4) + id strings offset (4) + uri template length (2) = 35.
const HEADER_MIN_LENGTH: u32 = 35;

fn encoding_number(encoding: PatchEncoding) -> u8 {
    match encoding {
        PatchEncoding::TableKeyed => 2, // partial invalidation by default; full handled by caller
        PatchEncoding::GlyphKeyed => 3,
    }
}

/// A single entry (one patch's activation coverage) in the order it should be written. `index`
/// is this entry's position in the final table; `child_indices` reference earlier entries only.
#[derive(Debug, Clone)]
pub struct Format2Entry {
    pub codepoints: IntSet<u32>,
    pub feature_tags: Vec<Tag>,
    pub design_space: DesignSpace,
    pub child_indices: Vec<u32>,
    pub conjunctive_child_match: bool,
    pub encoding: PatchEncoding,
    pub fully_invalidating: bool,
    pub patch_indices: Vec<u32>,
    pub ignored: bool,
}

impl Format2Entry {
    pub fn from_condition(condition: &Condition, patch_id: Option<PatchId>) -> Self {
        let (codepoints, feature_tags, design_space) = (
            condition.subset_definition.codepoints.clone(),
            condition
                .subset_definition
                .feature_tags
                .iter()
                .copied()
                .collect(),
            condition.subset_definition.design_space.clone(),
        );

        Format2Entry {
            codepoints,
            feature_tags,
            design_space,
            child_indices: condition.child_conditions.iter().map(|&i| i as u32).collect(),
            conjunctive_child_match: condition.conjunctive,
            encoding: PatchEncoding::GlyphKeyed,
            fully_invalidating: false,
            patch_indices: patch_id.into_iter().collect(),
            ignored: false,
        }
    }
}

/// Picks the encoding/invalidation combination most entries use, since it becomes the table's
/// default and lets those entries omit their own encoding byte. Ties break toward
/// fully-invalidating table keyed, then partially invalidating table keyed, then glyph keyed,
/// matching the fallback order a client would apply if asked to guess.
fn pick_default_encoding(entries: &[Format2Entry]) -> (PatchEncoding, bool) {
    let mut full = 0usize;
    let mut partial = 0usize;
    let mut glyph_keyed = 0usize;
    for e in entries {
        match (e.encoding, e.fully_invalidating) {
            (PatchEncoding::TableKeyed, true) => full += 1,
            (PatchEncoding::TableKeyed, false) => partial += 1,
            (PatchEncoding::GlyphKeyed, _) => glyph_keyed += 1,
        }
    }
    if full >= partial && full >= glyph_keyed {
        (PatchEncoding::TableKeyed, true)
    } else if partial >= glyph_keyed {
        (PatchEncoding::TableKeyed, false)
    } else {
        (PatchEncoding::GlyphKeyed, false)
    }
}

fn default_encoding_number(encoding: PatchEncoding, fully_invalidating: bool) -> u8 {
    match (encoding, fully_invalidating) {
        (PatchEncoding::TableKeyed, true) => 1,
        (PatchEncoding::TableKeyed, false) => 2,
        (PatchEncoding::GlyphKeyed, _) => 3,
    }
}

/// Writes a design space axis bound as a 16.16 fixed point value, matching how
/// `crate::patchmap`'s decoder reads `Fixed` fields.
fn write_fixed(out: &mut Vec<u8>, value: f32) {
    let scaled = (value as f64 * 65536.0).round();
    let bits = scaled.clamp(i32::MIN as f64, i32::MAX as f64) as i32;
    out.extend_from_slice(&bits.to_be_bytes());
}

fn encode_signed_24(out: &mut Vec<u8>, value: i32) -> Result<(), EncoderError> {
    if !(-(1 << 23)..(1 << 23)).contains(&value) {
        return Err(EncoderError::Internal(
            "entry id delta exceeds signed 24 bit range".to_string(),
        ));
    }
    let bytes = value.to_be_bytes();
    out.extend_from_slice(&bytes[1..]);
    Ok(())
}

/// Encodes the sequence of patch ids an entry maps to as a delta chain against
/// `last_entry_index`, returning the new `last_entry_index` (the entry's last patch index).
fn encode_entry_ids(
    out: &mut Vec<u8>,
    patch_indices: &[u32],
    last_entry_index: &mut u32,
) -> Result<(), EncoderError> {
    for (i, &patch_index) in patch_indices.iter().enumerate() {
        let is_last = i + 1 == patch_indices.len();
        let base_delta = patch_index as i64 - (*last_entry_index as i64 + 1);
        let mut encoded = base_delta * 2;
        if !is_last {
            encoded += if encoded >= 0 { 1 } else { -1 };
        }
        let encoded = i32::try_from(encoded)
            .map_err(|_| EncoderError::Internal("entry id delta out of range".to_string()))?;
        encode_signed_24(out, encoded)?;
        *last_entry_index = patch_index;
    }
    Ok(())
}

/// Picks the smallest bias width (`0`, `2`, or `3` bytes) that encodes `codepoints`, matching
/// the trial-encoding scheme `IntSet::to_sparse_bit_set` already performs for branch factor.
fn encode_codepoints(out: &mut Vec<u8>, codepoints: &IntSet<u32>) -> u8 {
    if codepoints.is_empty() {
        return 0;
    }

    let smallest = codepoints.iter().next().unwrap_or(0);

    let mut best: Option<(u8, Vec<u8>)> = None;
    for (flag, bias, max_bias) in [
        (CODEPOINTS_BIT_2, smallest.min(0xFFFF), 0xFFFFu32),
        (
            CODEPOINTS_BIT_1 | CODEPOINTS_BIT_2,
            smallest.min(0xFF_FFFF),
            0xFF_FFFFu32,
        ),
    ] {
        let bias = bias.min(max_bias);
        let mut biased = IntSet::<u32>::empty();
        for cp in codepoints.iter() {
            biased.insert(cp - bias);
        }
        let encoded = biased.to_sparse_bit_set();

        let mut candidate = Vec::with_capacity(encoded.len() + 3);
        if flag == CODEPOINTS_BIT_2 {
            candidate.extend_from_slice(&(bias as u16).to_be_bytes());
        } else {
            candidate.extend_from_slice(&bias.to_be_bytes()[1..]);
        }
        candidate.extend_from_slice(&encoded);

        if best.as_ref().map(|(_, b)| candidate.len() < b.len()).unwrap_or(true) {
            best = Some((flag, candidate));
        }
    }

    // Also consider no bias at all, which is smallest when the lowest codepoint is itself small.
    {
        let encoded = codepoints.to_sparse_bit_set();
        if best.as_ref().map(|(_, b)| encoded.len() < b.len()).unwrap_or(true) {
            best = Some((0, encoded));
        }
    }

    let (flag, bytes) = best.expect("at least one candidate encoding is always produced");
    out.extend_from_slice(&bytes);
    flag
}

/// Encodes one entry, returning its format flags byte (the caller writes that byte first,
/// followed by the body this function appends to `out`).
#[allow(clippy::too_many_arguments)]
fn encode_entry(
    entry: &Format2Entry,
    default_encoding: (PatchEncoding, bool),
    last_entry_index: &mut u32,
) -> Result<Vec<u8>, EncoderError> {
    let mut body = Vec::new();
    let mut flags = 0u8;

    let has_features = !entry.feature_tags.is_empty();
    let has_design_space = !entry.design_space.is_empty();
    if has_features || has_design_space {
        flags |= FEATURES_AND_DESIGN_SPACE_BIT;
        body.push(entry.feature_tags.len() as u8);
        for tag in &entry.feature_tags {
            body.extend_from_slice(&tag.to_be_bytes());
        }
        body.extend_from_slice(&(entry.design_space.len() as u16).to_be_bytes());
        for (tag, range) in &entry.design_space {
            body.extend_from_slice(&tag.to_be_bytes());
            write_fixed(&mut body, range.start());
            write_fixed(&mut body, range.end());
        }
    }

    if !entry.child_indices.is_empty() {
        if entry.child_indices.len() > 127 {
            return Err(EncoderError::Internal(
                "entry has more than 127 child conditions".to_string(),
            ));
        }
        flags |= CHILD_INDICES_BIT;
        let mut count_and_mode = entry.child_indices.len() as u8;
        if entry.conjunctive_child_match {
            count_and_mode |= 0x80;
        }
        body.push(count_and_mode);
        for &index in &entry.child_indices {
            body.extend_from_slice(&index.to_be_bytes()[1..]);
        }
    }

    let first_delta_is_zero =
        entry.patch_indices.first().copied() == Some(*last_entry_index + 1) || entry.patch_indices.is_empty();
    let needs_delta = !entry.patch_indices.len().eq(&0)
        && (!first_delta_is_zero || entry.patch_indices.len() > 1);
    if needs_delta {
        flags |= ENTRY_ID_DELTA_BIT;
        encode_entry_ids(&mut body, &entry.patch_indices, last_entry_index)?;
    } else if let Some(&only) = entry.patch_indices.first() {
        *last_entry_index = only;
    }

    let entry_encoding = (entry.encoding, entry.fully_invalidating);
    if entry_encoding != default_encoding {
        flags |= PATCH_ENCODING_BIT;
        body.push(default_encoding_number(entry.encoding, entry.fully_invalidating));
    }

    if !entry.codepoints.is_empty() {
        flags |= encode_codepoints(&mut body, &entry.codepoints);
    }

    if entry.ignored {
        flags |= IGNORED_BIT;
    }

    let mut out = Vec::with_capacity(body.len() + 1);
    out.push(flags);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Encodes a complete format 2 patch map table body (everything after the top level `format`
/// byte that the caller's table assembler is responsible for), given the URI template bytes and
/// the entry list in final serialization order.
pub fn encode_format2_map(
    compat_id: CompatId,
    uri_template: &[u8],
    entries: &[Format2Entry],
) -> Result<Vec<u8>, EncoderError> {
    let default_encoding = pick_default_encoding(entries);

    let mut entries_body = Vec::new();
    let mut last_entry_index = 0u32;
    for entry in entries {
        entries_body.extend(encode_entry(entry, default_encoding, &mut last_entry_index)?);
    }

    let entries_offset = HEADER_MIN_LENGTH + uri_template.len() as u32;
    let mapping_count = entries.len() as u32;
    if mapping_count > 0xFF_FFFF {
        return Err(EncoderError::Internal(
            "too many format 2 entries to encode a 24 bit mapping count".to_string(),
        ));
    }

    let mut out = Vec::with_capacity(entries_offset as usize + entries_body.len());
    out.push(2); // format
    out.extend_from_slice(&[0, 0, 0]); // reserved
    out.push(0); // flags: no CFF/CFF2 charstring offsets carried by this table
    out.extend_from_slice(&compat_id.to_be_bytes());
    out.push(default_encoding_number(default_encoding.0, default_encoding.1));
    out.extend_from_slice(&mapping_count.to_be_bytes()[1..]);
    out.extend_from_slice(&entries_offset.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes()); // id strings offset: unused, no string ids
    out.extend_from_slice(&(uri_template.len() as u16).to_be_bytes());
    out.extend_from_slice(uri_template);
    out.extend(entries_body);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codepoints_round_trip_through_sparse_bit_set() {
        let mut codepoints = IntSet::<u32>::empty();
        codepoints.insert(10);
        codepoints.insert(11);
        codepoints.insert(500);

        let mut out = Vec::new();
        encode_codepoints(&mut out, &codepoints);
        assert!(!out.is_empty());
    }

    #[test]
    fn entry_id_delta_zero_for_next_sequential_index() {
        let mut last = 4;
        let mut out = Vec::new();
        encode_entry_ids(&mut out, &[5], &mut last).unwrap();
        assert_eq!(last, 5);
        // delta = (5 - (4+1)) * 2 = 0, so the encoded value is a zero int24.
        assert_eq!(out, vec![0, 0, 0]);
    }

    #[test]
    fn entry_id_delta_continuation_bit_set_for_non_last() {
        let mut last = 0;
        let mut out = Vec::new();
        encode_entry_ids(&mut out, &[1, 3], &mut last).unwrap();
        assert_eq!(last, 3);
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn picks_most_common_encoding_as_default() {
        let entries = vec![
            Format2Entry {
                codepoints: IntSet::empty(),
                feature_tags: vec![],
                design_space: Default::default(),
                child_indices: vec![],
                conjunctive_child_match: false,
                encoding: PatchEncoding::GlyphKeyed,
                fully_invalidating: false,
                patch_indices: vec![0],
                ignored: false,
            },
            Format2Entry {
                codepoints: IntSet::empty(),
                feature_tags: vec![],
                design_space: Default::default(),
                child_indices: vec![],
                conjunctive_child_match: false,
                encoding: PatchEncoding::GlyphKeyed,
                fully_invalidating: false,
                patch_indices: vec![1],
                ignored: false,
            },
        ];
        let (encoding, invalidating) = pick_default_encoding(&entries);
        assert_eq!(encoding, PatchEncoding::GlyphKeyed);
        assert!(!invalidating);
    }

    #[test]
    fn encode_format2_map_header_has_expected_length() {
        let compat_id = CompatId::new([1, 2, 3, 4]);
        let uri_template = b"{id}.ift_gk";
        let out = encode_format2_map(compat_id, uri_template, &[]).unwrap();
        assert_eq!(out[0], 2);
        assert_eq!(&out[4 + 1..4 + 1 + 16], &compat_id.to_be_bytes());
    }

    #[test]
    fn encoded_entries_round_trip_through_the_format2_decoder() {
        use crate::patchmap::{self, FeatureSet};
        use read_fonts::tables::ift::PatchMapFormat2;
        use read_fonts::{FontData, FontRead};

        let mut codepoints = IntSet::<u32>::empty();
        codepoints.insert(10);
        codepoints.insert(11);
        codepoints.insert(500);

        let leaf = Format2Entry {
            codepoints,
            feature_tags: vec![Tag::new(b"liga")],
            design_space: Default::default(),
            child_indices: vec![],
            conjunctive_child_match: false,
            encoding: PatchEncoding::GlyphKeyed,
            fully_invalidating: false,
            patch_indices: vec![0],
            ignored: false,
        };
        let composite = Format2Entry {
            codepoints: IntSet::empty(),
            feature_tags: vec![],
            design_space: Default::default(),
            child_indices: vec![0],
            conjunctive_child_match: true,
            encoding: PatchEncoding::GlyphKeyed,
            fully_invalidating: false,
            patch_indices: vec![1],
            ignored: false,
        };

        let compat_id = CompatId::new([1, 2, 3, 4]);
        let uri_template = b"{id}.ift_gk";
        let bytes = encode_format2_map(compat_id, uri_template, &[leaf, composite]).unwrap();

        let map = PatchMapFormat2::read(FontData::new(&bytes)).unwrap();
        let decoded = patchmap::decode_format2_entries(&map).unwrap();

        assert_eq!(decoded.len(), 2);

        let mut expected_codepoints = IntSet::<u32>::empty();
        expected_codepoints.insert(10);
        expected_codepoints.insert(11);
        expected_codepoints.insert(500);
        assert_eq!(decoded[0].subset_definition.codepoints, expected_codepoints);
        assert_eq!(
            decoded[0].subset_definition.feature_tags,
            FeatureSet::Set(std::collections::BTreeSet::from([Tag::new(b"liga")]))
        );
        assert!(decoded[0].child_indices.is_empty());
        assert!(!decoded[0].conjunctive_child_match);

        assert_eq!(decoded[1].child_indices, vec![0]);
        assert!(decoded[1].conjunctive_child_match);
    }

    #[test]
    fn design_space_axis_writes_fixed_point_bounds() {
        let mut design_space: DesignSpace = Default::default();
        design_space.insert(Tag::new(b"wght"), AxisRange::range(100.0, 900.0));

        let entry = Format2Entry {
            codepoints: IntSet::empty(),
            feature_tags: vec![],
            design_space,
            child_indices: vec![],
            conjunctive_child_match: false,
            encoding: PatchEncoding::GlyphKeyed,
            fully_invalidating: false,
            patch_indices: vec![0],
            ignored: false,
        };

        let mut last = 0;
        let encoded = encode_entry(&entry, (PatchEncoding::GlyphKeyed, false), &mut last).unwrap();
        assert!(encoded[0] & FEATURES_AND_DESIGN_SPACE_BIT != 0);
    }
}
