//! An input segment: a [`SubsetDefinition`] paired with its probability of being requested.
//!
//! Grounded on `ift/encoder/segment.h`.

use super::freq::ProbabilityBound;
use super::subset_definition::SubsetDefinition;

/// Identifies a segment by its position in the input segment list.
pub type SegmentId = usize;

#[derive(Debug, Clone)]
pub struct Segment {
    definition: SubsetDefinition,
    probability: ProbabilityBound,
}

impl Segment {
    pub fn new(definition: SubsetDefinition, probability: ProbabilityBound) -> Self {
        Segment {
            definition,
            probability,
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability.average()
    }

    pub fn probability_bound(&self) -> ProbabilityBound {
        self.probability
    }

    pub fn set_probability(&mut self, probability: ProbabilityBound) {
        self.probability = probability;
    }

    pub fn definition(&self) -> &SubsetDefinition {
        &self.definition
    }

    pub fn definition_mut(&mut self) -> &mut SubsetDefinition {
        &mut self.definition
    }

    /// Whether this segment's patch would meet `min_group_size`. Segments carrying feature
    /// tags or design space axes are always considered to meet the minimum: those dimensions
    /// aren't currently factored into the size estimate (matches the original's TODO).
    pub fn meets_minimum_group_size(&self, min_group_size: usize) -> bool {
        if !self.definition.feature_tags.is_empty() || !self.definition.design_space.is_empty() {
            return true;
        }
        self.definition.codepoints.len() as usize >= min_group_size
    }

    pub fn clear(&mut self) {
        self.definition = SubsetDefinition::default();
        self.probability = ProbabilityBound::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_group_size_checks_codepoint_count() {
        let def = SubsetDefinition::codepoints([1, 2, 3].into_iter().collect());
        let segment = Segment::new(def, ProbabilityBound::zero());
        assert!(segment.meets_minimum_group_size(2));
        assert!(!segment.meets_minimum_group_size(4));
    }
}
