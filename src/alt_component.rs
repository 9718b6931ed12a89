
use std::collections::BTreeSet;

/// One connected component of the alts subgraph, 2-colored by breadth-first parity.
/// Members at even distance from the BFS start land on side 0, odd distance on side 1.
/// For a component honoring the bipartite invariant the two sides are disjoint.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AltComponent {
    /// Members at even BFS distance
    side0: BTreeSet<i32>,
    /// Members at odd BFS distance
    side1: BTreeSet<i32>,
}

impl AltComponent {
    /// Builds a component directly from its two sides.
    pub fn from_sides(side0: BTreeSet<i32>, side1: BTreeSet<i32>) -> AltComponent {
        AltComponent { side0, side1 }
    }

    pub fn side0(&self) -> &BTreeSet<i32> {
        &self.side0
    }

    pub fn side1(&self) -> &BTreeSet<i32> {
        &self.side1
    }

    /// Places a node on the side matching its BFS distance parity.
    pub(crate) fn place(&mut self, id: i32, distance: u32) {
        if distance % 2 == 0 {
            self.side0.insert(id);
        } else {
            self.side1.insert(id);
        }
    }

    /// True if the node was placed on either side.
    pub fn contains(&self, id: i32) -> bool {
        self.side0.contains(&id) || self.side1.contains(&id)
    }

    /// Total number of placed members, counting double-placed nodes twice.
    pub fn len(&self) -> usize {
        self.side0.len() + self.side1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.side0.is_empty() && self.side1.is_empty()
    }

    /// Iterates every member, side 0 first.
    pub fn members(&self) -> impl Iterator<Item = i32> + '_ {
        self.side0.iter().chain(self.side1.iter()).copied()
    }

    /// A well-formed 2-coloring never places a node on both sides.
    pub fn sides_disjoint(&self) -> bool {
        self.side0.is_disjoint(&self.side1)
    }

    /// Two components may be joined by a new alt relationship only if no node
    /// would end up on both sides: the merge flips `other`, so same-side
    /// overlaps are the ones that break 2-colorability.
    pub fn is_compatible(&self, other: &AltComponent) -> bool {
        self.side0.is_disjoint(&other.side0) && self.side1.is_disjoint(&other.side1)
    }

    /// The same-side overlaps that `is_compatible` rejects, per side.
    pub fn conflicts_with(&self, other: &AltComponent) -> (BTreeSet<i32>, BTreeSet<i32>) {
        let conflicts_0: BTreeSet<i32> = self.side0.intersection(&other.side0).copied().collect();
        let conflicts_1: BTreeSet<i32> = self.side1.intersection(&other.side1).copied().collect();
        (conflicts_0, conflicts_1)
    }

    /// Merges `other` into this component with its sides swapped: the alt edge
    /// joining the two components adds one BFS step, shifting the parity of
    /// everything reached through it.
    pub fn merged_with(&self, other: &AltComponent) -> AltComponent {
        AltComponent {
            side0: self.side0.union(&other.side1).copied().collect(),
            side1: self.side1.union(&other.side0).copied().collect(),
        }
    }
}

/// Structured payload for a rejected alt relationship: the two components that
/// would have been merged, the same-side overlaps between them, and the node
/// pair whose alt assertion triggered the check.
#[derive(Clone, Debug)]
pub struct NonBipartiteConflict {
    pub component_a: AltComponent,
    pub component_b: AltComponent,
    pub conflicts_0: BTreeSet<i32>,
    pub conflicts_1: BTreeSet<i32>,
    pub pair: (i32, i32),
}

impl NonBipartiteConflict {
    pub(crate) fn new(
        component_a: AltComponent,
        component_b: AltComponent,
        pair: (i32, i32),
    ) -> NonBipartiteConflict {
        let (conflicts_0, conflicts_1) = component_a.conflicts_with(&component_b);
        NonBipartiteConflict {
            component_a,
            component_b,
            conflicts_0,
            conflicts_1,
            pair,
        }
    }
}

impl std::fmt::Display for NonBipartiteConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "adding alt for {},{} would result in a non-bipartite component",
            self.pair.0, self.pair.1
        )?;
        writeln!(f, "component_a:")?;
        for id in self.component_a.side0() {
            writeln!(f, "0 {}", id)?;
        }
        for id in self.component_a.side1() {
            writeln!(f, "1 {}", id)?;
        }
        writeln!(f, "component_b:")?;
        for id in self.component_b.side0() {
            writeln!(f, "0 {}", id)?;
        }
        for id in self.component_b.side1() {
            writeln!(f, "1 {}", id)?;
        }
        writeln!(f, "conflicts found in 0:")?;
        for id in self.conflicts_0.iter() {
            writeln!(f, "{}", id)?;
        }
        writeln!(f, "conflicts found in 1:")?;
        for id in self.conflicts_1.iter() {
            writeln!(f, "{}", id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(side0: &[i32], side1: &[i32]) -> AltComponent {
        AltComponent::from_sides(
            side0.iter().copied().collect(),
            side1.iter().copied().collect(),
        )
    }

    #[test]
    fn test_place_by_parity() {
        let mut c = AltComponent::default();
        c.place(1, 0);
        c.place(2, 1);
        c.place(3, 2);
        assert_eq!(c, component(&[1, 3], &[2]));
        assert!(c.contains(2));
        assert!(!c.contains(4));
        assert!(c.sides_disjoint());
    }

    #[test]
    fn test_compatibility() {
        let a = component(&[1, 3], &[2, 4]);
        let b = component(&[5], &[6]);
        assert!(a.is_compatible(&b));

        // 3 on side 0 of both components
        let c = component(&[3], &[7]);
        assert!(!a.is_compatible(&c));
        let (conflicts_0, conflicts_1) = a.conflicts_with(&c);
        assert_eq!(conflicts_0, [3].into_iter().collect::<BTreeSet<i32>>());
        assert!(conflicts_1.is_empty());

        // opposite sides are fine: the merge flips the other component
        let d = component(&[2], &[1]);
        assert!(a.is_compatible(&d));
    }

    #[test]
    fn test_merge_flips_other_component() {
        let a = component(&[1], &[2]);
        let b = component(&[3], &[4]);
        let merged = a.merged_with(&b);
        assert_eq!(merged, component(&[1, 4], &[2, 3]));
        assert_eq!(merged.len(), 4);
        assert!(merged.sides_disjoint());
    }

    #[test]
    fn test_conflict_payload_display() {
        let a = component(&[1], &[2]);
        let b = component(&[1], &[5]);
        let conflict = NonBipartiteConflict::new(a, b, (2, 5));
        assert_eq!(conflict.conflicts_0, [1].into_iter().collect::<BTreeSet<i32>>());
        assert!(conflict.conflicts_1.is_empty());
        let message = conflict.to_string();
        assert!(message.contains("non-bipartite"));
        assert!(message.contains("2,5"));
    }
}
