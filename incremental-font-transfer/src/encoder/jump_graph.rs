//! Models the chain of fully-invalidating table-keyed patches a client walks through while
//! progressively extending its font, plus which later patches can be prefetched alongside the
//! one currently being applied.
//!
//! Grounded on `ift/encoder/compiler.h`'s jump/edge bookkeeping: each table-keyed patch the
//! compiler produces transitions the font from one subset definition to a strictly larger one,
//! and a few of those transitions are common enough (e.g. the next patch in a font's default
//! expansion order) to ship as prefetch hints alongside the active jump.

use std::collections::BTreeMap;

use super::patch::PatchId;
use super::segment::SegmentId;
use super::subset_definition::SubsetDefinition;

/// A single table-keyed expansion step: applying `patch_id` moves the client's font from `from`
/// to `to`.
#[derive(Debug, Clone)]
pub struct Jump {
    pub from: SubsetDefinition,
    pub to: SubsetDefinition,
    pub patch_id: PatchId,
    /// Additional patch ids the client may fetch alongside this jump on the expectation they'll
    /// likely be needed next.
    pub prefetch: Vec<PatchId>,
}

impl Jump {
    pub fn new(from: SubsetDefinition, to: SubsetDefinition, patch_id: PatchId) -> Self {
        Jump {
            from,
            to,
            patch_id,
            prefetch: Vec::new(),
        }
    }
}

/// The full set of table-keyed jumps a compiled encoding exposes, keyed by the segment whose
/// inclusion triggers the jump.
#[derive(Debug, Clone, Default)]
pub struct JumpGraph {
    jumps: BTreeMap<SegmentId, Jump>,
}

impl JumpGraph {
    pub fn new() -> Self {
        JumpGraph::default()
    }

    pub fn insert(&mut self, segment_id: SegmentId, jump: Jump) {
        self.jumps.insert(segment_id, jump);
    }

    pub fn get(&self, segment_id: SegmentId) -> Option<&Jump> {
        self.jumps.get(&segment_id)
    }

    pub fn len(&self) -> usize {
        self.jumps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jumps.is_empty()
    }

    /// Appends `patch_id` to the prefetch list of the jump triggered by `segment_id`, if one
    /// exists. No-op otherwise.
    pub fn add_prefetch(&mut self, segment_id: SegmentId, patch_id: PatchId) {
        if let Some(jump) = self.jumps.get_mut(&segment_id) {
            if !jump.prefetch.contains(&patch_id) {
                jump.prefetch.push(patch_id);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SegmentId, &Jump)> {
        self.jumps.iter()
    }
}
