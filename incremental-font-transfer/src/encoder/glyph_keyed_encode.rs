//! Builds glyph keyed patches: the inverse of [`crate::glyph_keyed::apply_glyph_keyed_patches`].
//!
//! A glyph keyed patch carries, for a set of glyph ids, the raw per-glyph data for one or more
//! of `glyf`, `loca` (implied by `glyf`), and `gvar`. See
//! <https://w3c.github.io/IFT/Overview.html#glyph-keyed>.

use font_types::Tag;
use read_fonts::collections::IntSet;
use read_fonts::tables::glyf::Glyf;
use read_fonts::tables::gvar::Gvar;
use read_fonts::tables::loca::Loca;
use read_fonts::{FontRef, TableProvider, TopLevelTable};
use shared_brotli_patch_codec::shared_brotli_encode;
use skrifa::GlyphId;

use super::patch::CompatId;
use super::EncoderError;

const GLYPH_KEYED_FORMAT_TAG: Tag = Tag::new(b"ifgk");

/// Tags this crate knows how to build glyph keyed data streams for. `glyf`/`loca` are handled
/// as a pair since patching one implies recomputing the other; `CFF `/`CFF2` are not currently
/// supported since the client-side applier doesn't implement them yet.
fn glyph_data_for_table<'a>(
    font: &'a FontRef,
    tag: Tag,
    gid: GlyphId,
) -> Result<&'a [u8], EncoderError> {
    if tag == Glyf::TAG {
        let loca = font
            .loca(None)
            .map_err(|e| EncoderError::Internal(format!("{e}")))?;
        let glyf = font
            .table_data(Glyf::TAG)
            .ok_or_else(|| EncoderError::Internal("font has no glyf table".to_string()))?;
        let start = loca
            .get_raw(gid.to_u32() as usize)
            .ok_or_else(|| EncoderError::Internal("glyph id out of range for loca".to_string()))?;
        let end = loca.get_raw(gid.to_u32() as usize + 1).ok_or_else(|| {
            EncoderError::Internal("glyph id out of range for loca".to_string())
        })?;
        glyf.as_bytes()
            .get(start as usize..end as usize)
            .ok_or_else(|| EncoderError::Internal("loca offsets out of bounds for glyf".to_string()))
    } else if tag == Gvar::TAG {
        let gvar = font
            .gvar()
            .map_err(|e| EncoderError::Internal(format!("{e}")))?;
        let idx = gid.to_u32() as usize;
        let start = gvar
            .glyph_variation_data_offsets()
            .get(idx)
            .map_err(|e| EncoderError::Internal(format!("{e}")))?
            .get();
        let end = gvar
            .glyph_variation_data_offsets()
            .get(idx + 1)
            .map_err(|e| EncoderError::Internal(format!("{e}")))?
            .get();
        Ok(gvar
            .glyph_variation_data_for_range(start as usize..end as usize)
            .map_err(|e| EncoderError::Internal(format!("{e}")))?
            .as_bytes())
    } else {
        Err(EncoderError::InvalidArgument(format!(
            "unsupported glyph keyed table: {tag}"
        )))
    }
}

/// Builds the uncompressed `GlyphPatches` data stream for `gids` across `tables`, in the layout:
/// `glyphCount: u32, tableCount: u8, glyphIds: [u16|u24], tableTags: [u32] (sorted), offsets:
/// [u32; glyphCount + 1] (one array per table), data (concatenated per table, per glyph)`.
fn build_data_stream(
    font: &FontRef,
    gids: &IntSet<GlyphId>,
    tables: &[Tag],
) -> Result<Vec<u8>, EncoderError> {
    let glyph_ids: Vec<GlyphId> = gids.iter().collect();
    let glyph_count = glyph_ids.len() as u32;
    let max_gid = glyph_ids.iter().map(|g| g.to_u32()).max().unwrap_or(0);

    if max_gid > 0xFF_FFFF {
        return Err(EncoderError::InvalidArgument(
            "glyph id exceeds the maximum representable in a glyph keyed patch (2^24 - 1)"
                .to_string(),
        ));
    }
    let gid_width: usize = if max_gid > 0xFFFF { 3 } else { 2 };

    let mut sorted_tables = tables.to_vec();
    sorted_tables.sort_by_key(|t| u32::from_be_bytes(t.to_be_bytes()));
    sorted_tables.dedup();
    let table_count = sorted_tables.len();

    let mut per_table_data: Vec<Vec<&[u8]>> = Vec::with_capacity(table_count);
    for tag in &sorted_tables {
        let mut data_for_table = Vec::with_capacity(glyph_ids.len());
        for gid in &glyph_ids {
            data_for_table.push(glyph_data_for_table(font, *tag, *gid)?);
        }
        per_table_data.push(data_for_table);
    }

    let header_size =
        5 + gid_width * glyph_ids.len() + table_count * 4 + 4 * (glyph_count as usize + 1) * table_count;

    let mut out = Vec::with_capacity(header_size);
    out.extend_from_slice(&glyph_count.to_be_bytes());
    out.push(table_count as u8);

    for gid in &glyph_ids {
        let value = gid.to_u32();
        if gid_width == 2 {
            out.extend_from_slice(&(value as u16).to_be_bytes());
        } else {
            out.extend_from_slice(&value.to_be_bytes()[1..]);
        }
    }

    for tag in &sorted_tables {
        out.extend_from_slice(&tag.to_be_bytes());
    }

    for data_for_table in &per_table_data {
        let mut offset = header_size as u32;
        out.extend_from_slice(&offset.to_be_bytes());
        for data in data_for_table {
            offset += data.len() as u32;
            out.extend_from_slice(&offset.to_be_bytes());
        }
    }

    for data_for_table in &per_table_data {
        for data in data_for_table {
            out.extend_from_slice(data);
        }
    }

    Ok(out)
}

/// Builds a complete glyph keyed patch (`ifgk`) for `gids`, restricted to `tables` (normally
/// `{glyf, gvar}`, whichever are present in `font`).
///
/// `compat_id` must match the compat id the client's copy of the IFT/IFTX mapping table carries,
/// so the client can verify the patch was built against the font it currently has.
pub fn build_glyph_keyed_patch(
    font: &FontRef,
    gids: &IntSet<GlyphId>,
    tables: &[Tag],
    compat_id: CompatId,
    brotli_quality: u32,
) -> Result<Vec<u8>, EncoderError> {
    let data_stream = build_data_stream(font, gids, tables)?;
    let compressed = shared_brotli_encode(&data_stream, None, brotli_quality)
        .map_err(|e| EncoderError::Internal(format!("{e}")))?;

    let max_gid = gids.iter().map(|g| g.to_u32()).max().unwrap_or(0);
    let flags: u8 = if max_gid > 0xFFFF { 0x01 } else { 0x00 };

    let mut out = Vec::with_capacity(4 + 4 + 1 + 16 + 4 + compressed.len());
    out.extend_from_slice(&GLYPH_KEYED_FORMAT_TAG.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes()); // reserved
    out.push(flags);
    out.extend_from_slice(&compat_id.to_be_bytes());
    out.extend_from_slice(&(data_stream.len() as u32).to_be_bytes());
    out.extend_from_slice(&compressed);
    Ok(out)
}

trait LocaExt {
    fn get_raw(&self, index: usize) -> Option<u32>;
}

impl LocaExt for Loca<'_> {
    fn get_raw(&self, index: usize) -> Option<u32> {
        self.get(index).map(|offset| offset.to_u32())
    }
}

/// Which tables a segment's glyph data patch should be restricted to, given which of them the
/// font actually has.
pub fn supported_glyph_keyed_tables(font: &FontRef) -> Vec<Tag> {
    let mut tags = vec![];
    if font.table_data(Glyf::TAG).is_some() {
        tags.push(Glyf::TAG);
    }
    if font.table_data(Gvar::TAG).is_some() {
        tags.push(Gvar::TAG);
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_tag_is_ifgk() {
        assert_eq!(GLYPH_KEYED_FORMAT_TAG, Tag::new(b"ifgk"));
    }

    #[test]
    fn gid_width_flag_set_above_u16_max() {
        let gids: IntSet<GlyphId> = [GlyphId::new(0x1_0001)].into_iter().collect();
        let max_gid = gids.iter().map(|g| g.to_u32()).max().unwrap_or(0);
        assert!(max_gid > 0xFFFF);
    }
}
