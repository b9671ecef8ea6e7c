//! Activation conditions: boolean combinations of segments that gate a patch's inclusion.
//!
//! Grounded on `ift/encoder/condition.h`. A [`Condition`] is satisfied when the input subset
//! definition matches at least one segment from each of its child conditions (if conjunctive,
//! *all* children must match; if disjunctive, *any* one suffices) and, at the leaves, when the
//! subset definition intersects `subset_definition`.

use std::collections::BTreeSet;

use super::patch::PatchId;
use super::subset_definition::SubsetDefinition;

/// A node in the activation condition DAG.
///
/// Leaves carry a `subset_definition` to test directly against an input subset definition.
/// Interior nodes instead reference `child_conditions` (by index into the compiler's condition
/// list) and combine them either conjunctively (all children activated) or disjunctively
/// (exclusive-or-style activation condition, activated if the union of the segments matches).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Condition {
    pub subset_definition: SubsetDefinition,
    pub child_conditions: BTreeSet<usize>,
    pub conjunctive: bool,
    pub activated_patch_id: Option<PatchId>,
}

impl Condition {
    pub fn simple(subset_definition: SubsetDefinition, patch_id: PatchId) -> Self {
        Condition {
            subset_definition,
            activated_patch_id: Some(patch_id),
            ..Default::default()
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.child_conditions.is_empty()
    }
}

/// Evaluates whether `def` satisfies `condition`, given the full set of conditions (needed to
/// recursively resolve child condition indices) and a test for whether `def` intersects a leaf
/// condition's subset definition.
///
/// This is the runtime twin of the closure invariant described in spec §8: a patch whose
/// activation condition evaluates true here must, once applied, make the client's font closure
/// equal to what the oracle would produce for the matching subset definitions.
pub fn evaluate(
    conditions: &[Condition],
    condition_index: usize,
    intersects: &impl Fn(&SubsetDefinition) -> bool,
) -> bool {
    let Some(condition) = conditions.get(condition_index) else {
        return false;
    };

    if condition.is_leaf() {
        return intersects(&condition.subset_definition);
    }

    if condition.conjunctive {
        condition
            .child_conditions
            .iter()
            .all(|&child| evaluate(conditions, child, intersects))
    } else {
        condition
            .child_conditions
            .iter()
            .any(|&child| evaluate(conditions, child, intersects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use read_fonts::collections::IntSet;

    fn leaf(codepoints: &[u32]) -> Condition {
        Condition {
            subset_definition: SubsetDefinition::codepoints(codepoints.iter().copied().collect()),
            ..Default::default()
        }
    }

    #[test]
    fn conjunctive_requires_all_children() {
        let conditions = vec![
            leaf(&[1]),
            leaf(&[2]),
            Condition {
                child_conditions: BTreeSet::from([0, 1]),
                conjunctive: true,
                ..Default::default()
            },
        ];
        let has = |present: &IntSet<u32>| {
            move |def: &SubsetDefinition| def.codepoints.intersects_set(present)
        };

        let present: IntSet<u32> = [1].into_iter().collect();
        assert!(!evaluate(&conditions, 2, &has(&present)));

        let present: IntSet<u32> = [1, 2].into_iter().collect();
        assert!(evaluate(&conditions, 2, &has(&present)));
    }

    #[test]
    fn disjunctive_requires_one_child() {
        let conditions = vec![
            leaf(&[1]),
            leaf(&[2]),
            Condition {
                child_conditions: BTreeSet::from([0, 1]),
                conjunctive: false,
                ..Default::default()
            },
        ];
        let present: IntSet<u32> = [2].into_iter().collect();
        let has = move |def: &SubsetDefinition| def.codepoints.intersects_set(&present);
        assert!(evaluate(&conditions, 2, &has));
    }
}
