//! End to end checks for the encoder: segment composition, patch map encoding, table keyed
//! patch construction, and sfnt assembly, working together across module boundaries rather than
//! in isolation.

use font_types::Tag;
use incremental_font_transfer::encoder::candidate_merge::CandidateMerge;
use incremental_font_transfer::encoder::format2::{encode_format2_map, Format2Entry};
use incremental_font_transfer::encoder::freq::{ProbabilityBound, UnicodeFrequencies};
use incremental_font_transfer::encoder::ift_table::{
    write_ift_and_iftx_tables, write_ift_table, IFTX_TAG, IFT_TAG,
};
use incremental_font_transfer::encoder::merge_strategy::MergeStrategy;
use incremental_font_transfer::encoder::patch::{CompatId, PatchEncoding};
use incremental_font_transfer::encoder::segment::Segment;
use incremental_font_transfer::encoder::subset_definition::{AxisRange, SubsetDefinition};
use incremental_font_transfer::encoder::table_keyed_encode::{build_table_keyed_patch, TableChange};
use read_fonts::collections::IntSet;
use read_fonts::{FontData, FontRef};

fn cps(values: &[u32]) -> IntSet<u32> {
    values.iter().copied().collect()
}

fn empty_sfnt() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&font_types::TT_SFNT_VERSION.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out
}

/// Scenario: three segments with overlapping and variation-axis coverage compose into a single
/// subset definition the way the compiler folds segment definitions into a patch's activation
/// condition.
#[test]
fn segment_definitions_compose_across_dimensions() {
    let mut latin = SubsetDefinition::codepoints(cps(&[65, 66, 67]));
    latin.feature_tags.insert(Tag::new(b"liga"));

    let mut cyrillic = SubsetDefinition::codepoints(cps(&[0x0410, 0x0411]));
    cyrillic
        .design_space
        .insert(Tag::new(b"wght"), AxisRange::point(400.0));

    let mut bold_cyrillic = SubsetDefinition::default();
    bold_cyrillic
        .design_space
        .insert(Tag::new(b"wght"), AxisRange::range(400.0, 700.0));

    let mut merged = SubsetDefinition::default();
    merged.union(&latin);
    merged.union(&cyrillic);
    merged.union(&bold_cyrillic);

    assert_eq!(merged.codepoints, cps(&[65, 66, 67, 0x0410, 0x0411]));
    assert!(merged.feature_tags.contains(&Tag::new(b"liga")));
    // The point 400 widens to the range once unioned with the variable axis.
    assert!(merged.design_space[&Tag::new(b"wght")].is_range());

    merged.subtract(&latin).unwrap();
    assert_eq!(merged.codepoints, cps(&[0x0410, 0x0411]));
    assert!(!merged.feature_tags.contains(&Tag::new(b"liga")));
}

/// Scenario: a format 2 map with two leaf entries and one composite (child-referencing) entry
/// encodes to a well formed header, picking the majority encoding as the table default.
#[test]
fn format2_map_with_composite_entry_has_consistent_header() {
    let compat_id = CompatId::new([10, 20, 30, 40]);

    let leaf_a = Format2Entry {
        codepoints: cps(&[1, 2, 3]),
        feature_tags: vec![],
        design_space: Default::default(),
        child_indices: vec![],
        conjunctive_child_match: false,
        encoding: PatchEncoding::GlyphKeyed,
        fully_invalidating: false,
        patch_indices: vec![0],
        ignored: false,
    };
    let leaf_b = Format2Entry {
        codepoints: cps(&[4, 5]),
        feature_tags: vec![],
        design_space: Default::default(),
        child_indices: vec![],
        conjunctive_child_match: false,
        encoding: PatchEncoding::GlyphKeyed,
        fully_invalidating: false,
        patch_indices: vec![1],
        ignored: false,
    };
    let composite = Format2Entry {
        codepoints: IntSet::empty(),
        feature_tags: vec![],
        design_space: Default::default(),
        child_indices: vec![0, 1],
        conjunctive_child_match: false,
        encoding: PatchEncoding::GlyphKeyed,
        fully_invalidating: false,
        patch_indices: vec![2],
        ignored: false,
    };

    let uri_template = b"{id}.gk";
    let out = encode_format2_map(compat_id, uri_template, &[leaf_a, leaf_b, composite]).unwrap();

    // format (1) + reserved (3)
    assert_eq!(out[0], 2);
    assert_eq!(&out[4 + 1..4 + 1 + 16], &compat_id.to_be_bytes());
    assert!(out.len() > 4 + 1 + 16 + 1 + 3 + 4 + 4 + 2);
}

/// Scenario: two segments whose glyph data overlaps heavily compress much smaller merged (shared
/// dictionary eliminates the redundancy) than the base segment would cost alone, so the cost
/// model favors merging them.
#[test]
fn cost_based_strategy_prefers_merging_when_it_shrinks_the_patch() {
    let mut unigrams = std::collections::HashMap::new();
    unigrams.insert(1u32, 0.2);
    unigrams.insert(2u32, 0.2);
    let frequencies = UnicodeFrequencies::from_unigrams(unigrams);
    let strategy = MergeStrategy::cost_based(frequencies);
    assert!(strategy.uses_costs());

    let a = Segment::new(SubsetDefinition::codepoints(cps(&[1])), ProbabilityBound::new(0.2, 0.2));
    let b = Segment::new(SubsetDefinition::codepoints(cps(&[2])), ProbabilityBound::new(0.2, 0.2));

    // Base segment alone would cost 70 bytes; merged with `b` the combined patch is only 40
    // bytes, so the expected-cost model prefers the merge.
    let candidate = CandidateMerge::assess(&a, 0, 70, &[(1, &b)], 40, &strategy);
    assert!(candidate.cost_delta() > 0.0);
}

/// Scenario: writing an `IFT ` table into a bare font makes it discoverable via table lookup
/// without disturbing the (already empty) rest of the directory, and a second call layering in
/// `IFTX` keeps the directory in valid ascending tag order.
#[test]
fn ift_table_round_trips_through_font_assembly() {
    let base = empty_sfnt();
    let font = FontRef::new(FontData::new(&base)).unwrap();

    let with_ift = write_ift_table(&font, vec![9, 9, 9]).unwrap();
    let with_ift_font = FontRef::new(FontData::new(&with_ift)).unwrap();
    assert_eq!(
        with_ift_font.table_data(IFT_TAG).unwrap().as_bytes(),
        &[9, 9, 9]
    );

    let with_both = write_ift_and_iftx_tables(&font, vec![1, 2], vec![3, 4, 5]).unwrap();
    let with_both_font = FontRef::new(FontData::new(&with_both)).unwrap();
    assert_eq!(with_both_font.table_data(IFT_TAG).unwrap().as_bytes(), &[1, 2]);
    assert_eq!(
        with_both_font.table_data(IFTX_TAG).unwrap().as_bytes(),
        &[3, 4, 5]
    );

    let tags: Vec<Tag> = with_both_font
        .table_directory
        .table_records()
        .iter()
        .map(|r| r.tag())
        .collect();
    let mut sorted = tags.clone();
    sorted.sort_by_key(|t| t.to_be_bytes());
    assert_eq!(tags, sorted, "table directory must stay in ascending tag order");
}

/// Scenario: a table keyed patch that replaces one table and drops another encodes both records
/// with the expected offsets, flags, and ordering, matching what `table_keyed.rs` expects to
/// find when applying a patch.
#[test]
fn table_keyed_patch_encodes_replace_and_drop_records() {
    let base = empty_sfnt();
    let font = FontRef::new(FontData::new(&base)).unwrap();
    let compat_id = CompatId::new([1, 1, 1, 1]);

    let new_glyf = vec![0xAAu8; 32];
    let changes = vec![
        TableChange::Replace {
            tag: Tag::new(b"glyf"),
            new_data: &new_glyf,
        },
        TableChange::Drop {
            tag: Tag::new(b"hdmx"),
        },
    ];

    let patch = build_table_keyed_patch(&font, &changes, compat_id, 5).unwrap();

    assert_eq!(&patch[0..4], b"iftk");
    assert_eq!(&patch[8..24], &compat_id.to_be_bytes());
    let patch_count = u16::from_be_bytes([patch[24], patch[25]]);
    assert_eq!(patch_count, 2);

    let offsets_start = 26;
    let first_offset = u32::from_be_bytes(patch[offsets_start..offsets_start + 4].try_into().unwrap());
    let second_offset =
        u32::from_be_bytes(patch[offsets_start + 4..offsets_start + 8].try_into().unwrap());
    let end_offset =
        u32::from_be_bytes(patch[offsets_start + 8..offsets_start + 12].try_into().unwrap());
    assert!(first_offset < second_offset);
    assert!(second_offset < end_offset);
    assert_eq!(end_offset as usize, patch.len());

    // First record: glyf, REPLACE_TABLE flag set.
    let first_record = &patch[first_offset as usize..second_offset as usize];
    assert_eq!(&first_record[0..4], b"glyf");
    assert_eq!(first_record[4], 0x1);

    // Second record: hdmx, DROP_TABLE flag set, empty stream.
    let second_record = &patch[second_offset as usize..end_offset as usize];
    assert_eq!(&second_record[0..4], b"hdmx");
    assert_eq!(second_record[4], 0x2);
    assert_eq!(second_record.len(), 9);
}
