//! Memoizes compressed glyph keyed patch sizes so merge cost evaluation doesn't repeatedly
//! recompress the same glyph set.
//!
//! Grounded on `ift/encoder/closure_glyph_segmenter.h`'s patch size cache, which exists for the same
//! reason: cost based merge search evaluates many candidate glyph sets, and brotli compression
//! dominates the runtime of that search if it isn't memoized.

use std::cell::RefCell;
use std::collections::HashMap;

use font_types::Tag;
use read_fonts::collections::IntSet;
use read_fonts::FontRef;
use skrifa::GlyphId;

use super::glyph_keyed_encode::build_glyph_keyed_patch;
use super::patch::CompatId;
use super::EncoderError;

/// Key identifying one patch size computation: a specific glyph set, compressed at a specific
/// brotli quality. Tables are not part of the key since a single `PatchSizeCache` is always
/// scoped to one font and so always uses the same supported table list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    gids: Vec<u32>,
    brotli_quality: u32,
}

fn cache_key(gids: &IntSet<GlyphId>, brotli_quality: u32) -> CacheKey {
    CacheKey {
        gids: gids.iter().map(|g| g.to_u32()).collect(),
        brotli_quality,
    }
}

/// Estimates and memoizes the compressed byte size of the glyph keyed patch a given glyph set
/// would produce, without retaining the compressed bytes themselves (the segmenter only needs
/// sizes to compare merge candidates; a separate final compilation pass produces real patches).
pub struct PatchSizeCache<'a> {
    font: FontRef<'a>,
    tables: Vec<Tag>,
    compat_id: CompatId,
    cache: RefCell<HashMap<CacheKey, u32>>,
}

impl<'a> PatchSizeCache<'a> {
    pub fn new(font: FontRef<'a>, tables: Vec<Tag>, compat_id: CompatId) -> Self {
        PatchSizeCache {
            font,
            tables,
            compat_id,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the compressed size, in bytes, of the glyph keyed patch carrying `gids`, building
    /// and compressing the patch only on a cache miss.
    pub fn patch_size(
        &self,
        gids: &IntSet<GlyphId>,
        brotli_quality: u32,
    ) -> Result<u32, EncoderError> {
        let key = cache_key(gids, brotli_quality);
        if let Some(size) = self.cache.borrow().get(&key) {
            return Ok(*size);
        }

        let patch =
            build_glyph_keyed_patch(&self.font, gids, &self.tables, self.compat_id, brotli_quality)?;
        let size = patch.len() as u32;
        self.cache.borrow_mut().insert(key, size);
        Ok(size)
    }

    /// Number of distinct `(glyph set, quality)` computations memoized so far. Exposed for tests
    /// and for the segmenter's own diagnostics, not used in any size calculation.
    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_ignores_gid_order() {
        let a: IntSet<GlyphId> = [GlyphId::new(1), GlyphId::new(2)].into_iter().collect();
        let b: IntSet<GlyphId> = [GlyphId::new(2), GlyphId::new(1)].into_iter().collect();
        assert_eq!(cache_key(&a, 9), cache_key(&b, 9));
    }

    #[test]
    fn cache_key_distinguishes_quality() {
        let a: IntSet<GlyphId> = [GlyphId::new(1)].into_iter().collect();
        assert_ne!(cache_key(&a, 9), cache_key(&a, 10));
    }
}
