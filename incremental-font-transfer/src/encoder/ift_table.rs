//! Assembles the final `IFT `/`IFTX` table bytes into a font.
//!
//! Grounded on `write-fonts::font_builder::FontBuilder`'s own sfnt assembly
//! (`checksum_and_padding`, the `TableRecord`/`TableDirectory` layout it builds from a
//! `BTreeMap`): the checksum algorithm is reused verbatim. Table directory records are written
//! in ascending tag order, same as `FontBuilder` - `FontRef::table_data` binary searches the
//! directory by tag, so an unsorted directory would make lookups silently fail for whichever
//! new tags land out of order.

use std::collections::HashMap;

use font_types::Tag;
use read_fonts::{FontRef, TableProvider as _};

use super::EncoderError;

pub const IFT_TAG: Tag = Tag::new(b"IFT ");
pub const IFTX_TAG: Tag = Tag::new(b"IFTX");

const TABLE_RECORD_LEN: usize = 16;
const DIRECTORY_HEADER_LEN: usize = 12;

/// A table to insert or overwrite, keyed by tag. Tags already present in the base font's
/// directory keep their original position; new tags are appended at the end in the order given.
pub struct TableOverride {
    pub tag: Tag,
    pub data: Vec<u8>,
}

impl TableOverride {
    pub fn new(tag: Tag, data: Vec<u8>) -> Self {
        TableOverride { tag, data }
    }
}

fn checksum_and_padding(table: &[u8]) -> (u32, usize) {
    let padding = (4 - table.len() % 4) % 4;
    let mut sum = 0u32;
    let mut iter = table.chunks_exact(4);
    for quad in &mut iter {
        let array: [u8; 4] = quad.try_into().unwrap_or_default();
        sum = sum.wrapping_add(u32::from_be_bytes(array));
    }
    let rem = match *iter.remainder() {
        [a] => u32::from_be_bytes([a, 0, 0, 0]),
        [a, b] => u32::from_be_bytes([a, b, 0, 0]),
        [a, b, c] => u32::from_be_bytes([a, b, c, 0]),
        _ => 0,
    };
    (sum.wrapping_add(rem), padding)
}

/// Rebuilds `font` with `overrides` applied. The resulting table directory is sorted in
/// ascending tag order, as required for `FontRef::table_data`'s binary search to find every
/// table, including ones this call adds or replaces.
pub fn assemble_font(font: &FontRef, overrides: Vec<TableOverride>) -> Result<Vec<u8>, EncoderError> {
    let mut order: Vec<Tag> = font
        .table_directory
        .table_records()
        .iter()
        .map(|r| r.tag())
        .collect();

    let mut data_by_tag: HashMap<Tag, Vec<u8>> = HashMap::with_capacity(order.len());
    for tag in &order {
        if let Some(data) = font.table_data(*tag) {
            data_by_tag.insert(*tag, data.as_bytes().to_vec());
        }
    }

    for over in overrides {
        if !data_by_tag.contains_key(&over.tag) {
            order.push(over.tag);
        }
        data_by_tag.insert(over.tag, over.data);
    }
    order.sort_by_key(|tag| tag.to_be_bytes());

    struct Record {
        tag: Tag,
        checksum: u32,
        offset: u32,
        length: u32,
    }

    let header_len = DIRECTORY_HEADER_LEN + order.len() * TABLE_RECORD_LEN;
    let mut position = header_len as u32;
    let mut records = Vec::with_capacity(order.len());

    for tag in &order {
        let data = data_by_tag.get(tag).ok_or_else(|| {
            EncoderError::Internal(format!("table '{tag}' is in the directory but has no data"))
        })?;
        let offset = position;
        let length = data.len() as u32;
        let (checksum, padding) = checksum_and_padding(data);
        position = position
            .checked_add(length)
            .and_then(|p| p.checked_add(padding as u32))
            .ok_or_else(|| EncoderError::Internal("assembled font exceeds u32 size".to_string()))?;
        records.push(Record {
            tag: *tag,
            checksum,
            offset,
            length,
        });
    }

    let mut out = Vec::with_capacity(position as usize);
    out.extend_from_slice(&font_types::TT_SFNT_VERSION.to_be_bytes());
    out.extend_from_slice(&(order.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // search_range
    out.extend_from_slice(&0u16.to_be_bytes()); // entry_selector
    out.extend_from_slice(&0u16.to_be_bytes()); // range_shift

    for record in &records {
        out.extend_from_slice(&record.tag.to_be_bytes());
        out.extend_from_slice(&record.checksum.to_be_bytes());
        out.extend_from_slice(&record.offset.to_be_bytes());
        out.extend_from_slice(&record.length.to_be_bytes());
    }

    for tag in &order {
        let data = &data_by_tag[tag];
        out.extend_from_slice(data);
        let padding = (4 - data.len() % 4) % 4;
        out.extend_from_slice(&[0u8; 4][..padding]);
    }

    Ok(out)
}

/// Writes (or replaces) the `IFT ` table with `format2_bytes` and reassembles the font, keeping
/// every other table in its original directory position.
pub fn write_ift_table(font: &FontRef, format2_bytes: Vec<u8>) -> Result<Vec<u8>, EncoderError> {
    assemble_font(font, vec![TableOverride::new(IFT_TAG, format2_bytes)])
}

/// Writes (or replaces) the `IFTX` table alongside an existing `IFT ` table, for fonts that split
/// their patch map across two tables (e.g. separate glyph-keyed and table-keyed coverage).
pub fn write_ift_and_iftx_tables(
    font: &FontRef,
    ift_bytes: Vec<u8>,
    iftx_bytes: Vec<u8>,
) -> Result<Vec<u8>, EncoderError> {
    assemble_font(
        font,
        vec![
            TableOverride::new(IFT_TAG, ift_bytes),
            TableOverride::new(IFTX_TAG, iftx_bytes),
        ],
    )
}
