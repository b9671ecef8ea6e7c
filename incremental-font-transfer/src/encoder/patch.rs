//! Compiled patch identities: the encoder's view of a patch, before it is written to a URL.
//!
//! Grounded on `ift/encoder/compiler.h`'s `Edge`/`Jump` structs and `ift/proto/patch_map.h`'s
//! `PatchEncoding`. Distinct from [`crate::patchmap::PatchFormat`], which is the *client's* view
//! of a patch as parsed out of a font's mapping table; this type additionally carries the
//! compiled patch bytes so the compiler can assign URLs and write patch files.

use read_fonts::collections::IntSet;
use skrifa::GlyphId;

/// Identifies a patch by its position in the compiler's patch list. Table-keyed patches share
/// id 0 with all other table-keyed patches that are chained into the same invalidating subgraph;
/// glyph-keyed patches each get a unique id, one per segment.
pub type PatchId = u32;

/// A 128-bit compatibility id carried by an IFT mapping table and by every glyph keyed patch
/// built against it. A client refuses to apply a patch whose compat id doesn't match the font's
/// current one; the compiler rotates to a fresh id whenever it (re)writes a mapping table so
/// stale patches built against an older version of the font are rejected rather than silently
/// misapplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CompatId([u32; 4]);

impl CompatId {
    pub fn new(id: [u32; 4]) -> Self {
        CompatId(id)
    }

    pub fn from_seed(seed: u64) -> Self {
        // A simple splitmix64 style expansion: doesn't need to be cryptographically strong,
        // only needs to make accidental collisions between successive compiler runs unlikely.
        let mut x = seed;
        let mut words = [0u32; 4];
        for word in words.iter_mut() {
            x = x.wrapping_add(0x9E3779B97F4A7C15);
            let mut z = x;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
            z ^= z >> 31;
            *word = (z & 0xFFFF_FFFF) as u32;
        }
        CompatId(words)
    }

    pub fn values(&self) -> [u32; 4] {
        self.0
    }

    pub fn to_be_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        for (i, v) in self.0.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&v.to_be_bytes());
        }
        out
    }
}

/// How a patch should be applied by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchEncoding {
    /// A brotli shared-dictionary diff against one or more whole tables. Fully invalidating:
    /// applying it requires re-deriving the client's glyph closure from scratch.
    TableKeyed,
    /// A per-glyph-id patch bundle. Not invalidating: the client merges new glyph data in place
    /// without needing to recompute which other patches might now apply.
    GlyphKeyed,
}

/// A patch produced by the compiler, ready to be assigned a URL and written out.
#[derive(Debug, Clone)]
pub struct Patch {
    id: PatchId,
    encoding: PatchEncoding,
    data: Vec<u8>,
    /// Glyph ids this patch adds data for. Only meaningful for [`PatchEncoding::GlyphKeyed`]
    /// patches; empty for table-keyed ones.
    gids: IntSet<GlyphId>,
}

impl Patch {
    pub fn table_keyed(id: PatchId, data: Vec<u8>) -> Self {
        Patch {
            id,
            encoding: PatchEncoding::TableKeyed,
            data,
            gids: IntSet::empty(),
        }
    }

    pub fn glyph_keyed(id: PatchId, data: Vec<u8>, gids: IntSet<GlyphId>) -> Self {
        Patch {
            id,
            encoding: PatchEncoding::GlyphKeyed,
            data,
            gids,
        }
    }

    pub fn id(&self) -> PatchId {
        self.id
    }

    pub fn encoding(&self) -> &PatchEncoding {
        &self.encoding
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn gids(&self) -> &IntSet<GlyphId> {
        &self.gids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compat_id_round_trips_through_bytes() {
        let id = CompatId::new([1, 2, 3, 4]);
        assert_eq!(
            id.to_be_bytes(),
            [
                0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4u8
            ]
        );
    }

    #[test]
    fn from_seed_is_deterministic() {
        assert_eq!(CompatId::from_seed(42), CompatId::from_seed(42));
        assert_ne!(CompatId::from_seed(42), CompatId::from_seed(43));
    }
}
