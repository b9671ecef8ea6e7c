//! Dependency graph: tracks how segments' glyph closures interact so segmentation can tell
//! apart three cases for any given glyph: it belongs to exactly one segment's own closure, it is
//! independently reachable from more than one segment's own closure (a disjunctive/OR group,
//! e.g. a shared composite or mark glyph), or it only appears once two or more segments are
//! combined (a conjunctive/AND group, e.g. a ligature glyph). Keeping those apart is what lets
//! segmentation preserve the disjointness invariant (a glyph belongs to exactly one patch) while
//! still gating each patch on an exact activation condition rather than an over-broad one.
//!
//! Grounded on `ift/encoder/closure_glyph_segmenter.h`'s phased closure approach, and on its test
//! expectations in `closure_glyph_segmenter_test.cc`'s `AndCondition`/`OrCondition` cases:
//! segments are closed one at a time, but the *additional* glyphs a segment contributes can
//! depend on which other segments are already folded in (or can simply already be present in
//! more than one segment's own closure), so dependencies have to be discovered by comparing
//! closures pairwise rather than computed independently per segment.

use std::collections::{BTreeMap, BTreeSet};

use read_fonts::collections::IntSet;
use skrifa::GlyphId;

use super::oracle::ClosureOracle;
use super::segment::SegmentId;
use super::subset_definition::SubsetDefinition;
use super::EncoderError;

/// What a graph node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeKind {
    InitFont,
    Segment(SegmentId),
}

/// Why one node depends on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// `to`'s closure produces additional glyphs only in the presence of `from`.
    Conditional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeKind,
    pub to: NodeKind,
    pub kind: EdgeKind,
}

/// A group of glyphs shared by (OR) or conditional on (AND) a specific set of segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGroup {
    pub segments: BTreeSet<SegmentId>,
    pub glyphs: IntSet<GlyphId>,
}

/// Tracks, per segment, the glyphs it contributes exclusively versus the glyphs it shares with
/// or only unlocks alongside other segments, discovered by a pairwise fixed point over the
/// closure oracle.
///
/// Detection is scoped to pairs of segments, matching the two-segment scenarios this is grounded
/// on; a glyph whose activation genuinely depends on three or more segments combined (and that
/// isn't already explained by a pairwise group) isn't detected as conditional at all, rather than
/// risking an incorrect pairwise attribution. Such glyphs fall through to the per-segment
/// exclusive bucket of whichever segment's closure happens to include them, rather than being
/// silently duplicated or over-broadly gated.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Glyphs each segment contributes to its own patch once glyphs belonging to an OR or AND
    /// group have been removed.
    pub exclusive_glyphs: BTreeMap<SegmentId, IntSet<GlyphId>>,
    /// Disjunctive groups: glyphs reachable independently from more than one segment's own
    /// closure, activated whenever any one of `segments` is present.
    pub or_groups: Vec<DependencyGroup>,
    /// Conjunctive groups: glyphs only reachable once every segment in `segments` is present
    /// together.
    pub and_groups: Vec<DependencyGroup>,
    pub edges: Vec<Edge>,
}

impl DependencyGraph {
    /// Builds the dependency graph for `segments`, with `init_font_definition` already folded
    /// into the base font so its glyphs are never attributed to a segment.
    ///
    /// Segment counts are expected to stay in the tens to low hundreds, so the `O(n^2)` pairwise
    /// scan this performs is cheap relative to the closures it drives.
    pub fn build(
        oracle: &ClosureOracle,
        init_font_definition: &SubsetDefinition,
        segments: &[(SegmentId, &SubsetDefinition)],
    ) -> Result<Self, EncoderError> {
        let mut graph = DependencyGraph::default();

        let mut raw_base: BTreeMap<SegmentId, IntSet<GlyphId>> = BTreeMap::new();
        for &(id, def) in segments {
            let glyphs = oracle.additional_closure(def, init_font_definition)?;
            raw_base.insert(id, glyphs);
        }

        // OR detection: glyphs reachable from more than one segment's own closure, grouped by
        // the exact set of segments that independently reach them.
        let mut glyph_owners: BTreeMap<GlyphId, BTreeSet<SegmentId>> = BTreeMap::new();
        for (&id, glyphs) in &raw_base {
            for gid in glyphs.iter() {
                glyph_owners.entry(gid).or_default().insert(id);
            }
        }

        let mut or_group_glyphs: BTreeMap<BTreeSet<SegmentId>, IntSet<GlyphId>> = BTreeMap::new();
        for (gid, owners) in glyph_owners {
            if owners.len() > 1 {
                or_group_glyphs.entry(owners).or_default().insert(gid);
            }
        }

        for (owners, glyphs) in &or_group_glyphs {
            for &a in owners.iter() {
                for &b in owners.iter() {
                    if a != b {
                        graph.edges.push(Edge {
                            from: NodeKind::Segment(a),
                            to: NodeKind::Segment(b),
                            kind: EdgeKind::Conditional,
                        });
                    }
                }
            }
            let _ = glyphs;
        }
        graph.or_groups = or_group_glyphs
            .into_iter()
            .map(|(segments, glyphs)| DependencyGroup { segments, glyphs })
            .collect();

        // AND detection: glyphs only present once a pair of segments is closed together, beyond
        // what either segment's own closure already contributes.
        for (i, &(a_id, a_def)) in segments.iter().enumerate() {
            for &(b_id, b_def) in segments.iter().skip(i + 1) {
                let mut pair_def = a_def.clone();
                pair_def.union(b_def);
                let pair_full = oracle.additional_closure(&pair_def, init_font_definition)?;

                let a_base = raw_base.get(&a_id).cloned().unwrap_or_default();
                let b_base = raw_base.get(&b_id).cloned().unwrap_or_default();

                let mut and_only = pair_full;
                for gid in a_base.iter() {
                    and_only.remove(gid);
                }
                for gid in b_base.iter() {
                    and_only.remove(gid);
                }

                if !and_only.is_empty() {
                    graph.edges.push(Edge {
                        from: NodeKind::Segment(a_id),
                        to: NodeKind::Segment(b_id),
                        kind: EdgeKind::Conditional,
                    });
                    graph.edges.push(Edge {
                        from: NodeKind::Segment(b_id),
                        to: NodeKind::Segment(a_id),
                        kind: EdgeKind::Conditional,
                    });
                    graph.and_groups.push(DependencyGroup {
                        segments: BTreeSet::from([a_id, b_id]),
                        glyphs: and_only,
                    });
                }
            }
        }

        // What's left after removing every OR/AND group's glyphs from a segment's raw closure is
        // exclusively its own.
        for &(id, _) in segments {
            let mut exclusive = raw_base.get(&id).cloned().unwrap_or_default();
            for group in graph.or_groups.iter().filter(|g| g.segments.contains(&id)) {
                for gid in group.glyphs.iter() {
                    exclusive.remove(gid);
                }
            }
            for group in graph.and_groups.iter().filter(|g| g.segments.contains(&id)) {
                for gid in group.glyphs.iter() {
                    exclusive.remove(gid);
                }
            }
            graph.exclusive_glyphs.insert(id, exclusive);
        }

        Ok(graph)
    }

    /// Segments whose presence is needed, in combination with `segment_id`, to unlock at least
    /// one glyph belonging to it in an OR or AND group.
    pub fn dependencies_of(&self, segment_id: SegmentId) -> BTreeSet<SegmentId> {
        self.edges
            .iter()
            .filter(|e| e.to == NodeKind::Segment(segment_id))
            .filter_map(|e| match e.from {
                NodeKind::Segment(id) => Some(id),
                NodeKind::InitFont => None,
            })
            .collect()
    }

    /// Glyphs reachable from `segment_id` alone, excluding anything pulled into an OR or AND
    /// group with another segment.
    pub fn glyphs_for(&self, segment_id: SegmentId) -> IntSet<GlyphId> {
        self.exclusive_glyphs
            .get(&segment_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependencies_of_empty_graph_is_empty() {
        let graph = DependencyGraph::default();
        assert!(graph.dependencies_of(0).is_empty());
    }

    #[test]
    fn glyphs_for_unknown_segment_is_empty() {
        let graph = DependencyGraph::default();
        assert!(graph.glyphs_for(7).is_empty());
    }

    #[test]
    fn dependencies_of_reads_and_group_edges() {
        let mut graph = DependencyGraph::default();
        graph.and_groups.push(DependencyGroup {
            segments: BTreeSet::from([0, 1]),
            glyphs: [GlyphId::new(9)].into_iter().collect(),
        });
        graph.edges.push(Edge {
            from: NodeKind::Segment(0),
            to: NodeKind::Segment(1),
            kind: EdgeKind::Conditional,
        });
        graph.edges.push(Edge {
            from: NodeKind::Segment(1),
            to: NodeKind::Segment(0),
            kind: EdgeKind::Conditional,
        });

        assert_eq!(graph.dependencies_of(1), BTreeSet::from([0]));
        assert_eq!(graph.dependencies_of(0), BTreeSet::from([1]));
    }
}
