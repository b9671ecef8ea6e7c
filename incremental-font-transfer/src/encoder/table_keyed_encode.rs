//! Builds table keyed patches: brotli shared-dictionary diffs against one or more whole tables,
//! fully invalidating on application (the client must recompute its glyph closure afterward).
//!
//! Inverse of [`crate::table_keyed::apply_table_keyed_patch`]. See
//! <https://w3c.github.io/IFT/Overview.html#table-keyed>.

use font_types::Tag;
use read_fonts::{FontRef, TableProvider as _};
use shared_brotli_patch_codec::shared_brotli_encode;

use super::patch::CompatId;
use super::EncoderError;

const TABLE_KEYED_FORMAT_TAG: Tag = Tag::new(b"iftk");

const REPLACE_TABLE: u8 = 0x1;
const DROP_TABLE: u8 = 0x2;

/// One table's contribution to a table keyed patch. Diffing is the common case; replacement and
/// dropping exist for tables the compiler regenerates wholesale (e.g. `loca` after a `glyf`
/// diff) or wants to remove from the client's font outright.
pub enum TableChange<'a> {
    /// Diff `new_data` against the base font's current copy of `tag` with a shared dictionary.
    Diff { tag: Tag, new_data: &'a [u8] },
    /// Replace `tag` wholesale, compressed without a shared dictionary.
    Replace { tag: Tag, new_data: &'a [u8] },
    /// Drop `tag` from the client's font entirely.
    Drop { tag: Tag },
}

impl TableChange<'_> {
    fn tag(&self) -> Tag {
        match self {
            TableChange::Diff { tag, .. } => *tag,
            TableChange::Replace { tag, .. } => *tag,
            TableChange::Drop { tag } => *tag,
        }
    }
}

struct EncodedChange {
    tag: Tag,
    flags: u8,
    max_uncompressed_length: u32,
    stream: Vec<u8>,
}

fn encode_change(
    font: &FontRef,
    change: &TableChange,
    brotli_quality: u32,
) -> Result<EncodedChange, EncoderError> {
    match change {
        TableChange::Diff { tag, new_data } => {
            let base_data = font.table_data(*tag).ok_or_else(|| {
                EncoderError::FailedPrecondition(format!(
                    "cannot diff table '{tag}': base font has no copy of it"
                ))
            })?;
            let stream = shared_brotli_encode(new_data, Some(base_data.as_bytes()), brotli_quality)
                .map_err(|e| EncoderError::Internal(format!("{e}")))?;
            Ok(EncodedChange {
                tag: *tag,
                flags: 0,
                max_uncompressed_length: new_data.len() as u32,
                stream,
            })
        }
        TableChange::Replace { tag, new_data } => {
            let stream = shared_brotli_encode(new_data, None, brotli_quality)
                .map_err(|e| EncoderError::Internal(format!("{e}")))?;
            Ok(EncodedChange {
                tag: *tag,
                flags: REPLACE_TABLE,
                max_uncompressed_length: new_data.len() as u32,
                stream,
            })
        }
        TableChange::Drop { tag } => Ok(EncodedChange {
            tag: *tag,
            flags: DROP_TABLE,
            max_uncompressed_length: 0,
            stream: Vec::new(),
        }),
    }
}

/// Builds a complete table keyed patch (`iftk`) applying `changes` against `font`.
///
/// `compat_id` must match the compat id the client's copy of the IFT/IFTX mapping table carries.
pub fn build_table_keyed_patch(
    font: &FontRef,
    changes: &[TableChange],
    compat_id: CompatId,
    brotli_quality: u32,
) -> Result<Vec<u8>, EncoderError> {
    let mut encoded = Vec::with_capacity(changes.len());
    for change in changes {
        encoded.push(encode_change(font, change, brotli_quality)?);
    }

    let patch_count = encoded.len();
    let header_size = 4 + 4 + 16 + 2 + 4 * (patch_count + 1);

    let mut record_sizes = Vec::with_capacity(patch_count);
    for change in &encoded {
        record_sizes.push(4 + 1 + 4 + change.stream.len());
    }

    let mut offsets = Vec::with_capacity(patch_count + 1);
    let mut offset = header_size as u32;
    offsets.push(offset);
    for size in &record_sizes {
        offset += *size as u32;
        offsets.push(offset);
    }

    let mut out = Vec::with_capacity(offset as usize);
    out.extend_from_slice(&TABLE_KEYED_FORMAT_TAG.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes()); // reserved
    out.extend_from_slice(&compat_id.to_be_bytes());
    out.extend_from_slice(&(patch_count as u16).to_be_bytes());
    for o in &offsets {
        out.extend_from_slice(&o.to_be_bytes());
    }

    for change in &encoded {
        out.extend_from_slice(&change.tag.to_be_bytes());
        out.push(change.flags);
        out.extend_from_slice(&change.max_uncompressed_length.to_be_bytes());
        out.extend_from_slice(&change.stream);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_tag_is_iftk() {
        assert_eq!(TABLE_KEYED_FORMAT_TAG, Tag::new(b"iftk"));
    }

    #[test]
    fn drop_change_has_no_stream() {
        let change = TableChange::Drop {
            tag: Tag::new(b"tab3"),
        };
        assert_eq!(change.tag(), Tag::new(b"tab3"));
    }
}
