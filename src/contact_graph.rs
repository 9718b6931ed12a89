
use rand::Rng;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use std::collections::{BTreeSet, VecDeque};

use crate::alt_component::{AltComponent, NonBipartiteConflict};

/// Errors raised by the contact graph core.
#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    #[error("node {0} is not in the contact graph")]
    UnknownNode(i32),
    #[error("partition {partition} for node {id} is outside {{-1, 0, 1}}")]
    InvalidPartition { id: i32, partition: i8 },
    #[error("cannot assign neutral partition to bubble node {0}")]
    NeutralBubblePartition(i32),
    #[error("cannot add alt from node {0} to itself")]
    SelfAlt(i32),
    #[error("{0}")]
    NonBipartite(Box<NonBipartiteConflict>),
    #[error("alt nodes {id} and {alt_id} are both in partition {partition}")]
    AltPartitionMismatch { id: i32, alt_id: i32, partition: i8 },
}

/// Returns the canonical unordered key for an edge between two nodes.
pub fn edge_key(a: i32, b: i32) -> (i32, i32) {
    (a.min(b), a.max(b))
}

/// One contig in the contact graph.
#[derive(Clone, Debug, Default)]
pub struct ContactNode {
    /// Adjacent nodes, kept in sync with the canonical edge store
    neighbors: BTreeSet<i32>,
    /// Allelic counterparts in the bubble this node belongs to
    alts: BTreeSet<i32>,
    /// Which haplotype set this node belongs to: -1, 0 (unassigned), or 1
    partition: i8,
    /// Total reads supporting this node
    coverage: i64,
    /// Sequence length of this node
    length: i32,
}

impl ContactNode {
    fn with_partition(partition: i8) -> ContactNode {
        ContactNode {
            partition,
            ..Default::default()
        }
    }

    pub fn partition(&self) -> i8 {
        self.partition
    }

    pub fn coverage(&self) -> i64 {
        self.coverage
    }

    pub fn length(&self) -> i32 {
        self.length
    }

    /// True if this node is one side of a known bubble.
    pub fn has_alt(&self) -> bool {
        !self.alts.is_empty()
    }

    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    pub fn neighbors(&self) -> impl Iterator<Item = i32> + '_ {
        self.neighbors.iter().copied()
    }

    pub fn alts(&self) -> impl Iterator<Item = i32> + '_ {
        self.alts.iter().copied()
    }
}

/// Scores one edge: agreeing partition signs add the weight, disagreeing signs
/// subtract it, and a neutral endpoint contributes nothing.
fn pair_score(partition_a: i8, partition_b: i8, weight: i32) -> f64 {
    if partition_a == 0 || partition_b == 0 {
        0.0
    } else {
        f64::from(partition_a) * f64::from(partition_b) * f64::from(weight)
    }
}

/// Weighted undirected contact graph over contigs, with allelic (alt)
/// relationships maintained as a hard bipartite constraint.
///
/// Edges are stored once under the canonical `(min, max)` key and duplicated
/// into per-node adjacency sets so both whole-graph scoring and neighborhood
/// scoring stay cheap. Alt relationships may only grow; inserting one that
/// would break 2-colorability of its component is rejected with the full
/// conflict payload.
#[derive(Clone, Debug, Default)]
pub struct ContactGraph {
    nodes: HashMap<i32, ContactNode>,
    edge_weights: HashMap<(i32, i32), i32>,
    /// Largest node id ever observed, -1 while empty
    max_id: i32,
}

impl ContactGraph {
    pub fn new() -> ContactGraph {
        ContactGraph {
            nodes: Default::default(),
            edge_weights: Default::default(),
            max_id: -1,
        }
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Largest node id in the graph, or -1 if the graph is empty.
    pub fn get_max_id(&self) -> i32 {
        self.max_id
    }

    pub fn has_node(&self, id: i32) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Looks up a node record.
    pub fn node(&self, id: i32) -> Result<&ContactNode, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))
    }

    /// Inserts a node with a neutral partition. Re-inserting an existing id
    /// leaves the existing record untouched.
    pub fn insert_node(&mut self, id: i32) {
        self.nodes.entry(id).or_default();
        self.max_id = self.max_id.max(id);
    }

    /// Inserts a node with an explicit starting partition.
    /// # Errors
    /// * `InvalidPartition` if the partition is outside {-1, 0, 1}
    pub fn insert_node_with_partition(&mut self, id: i32, partition: i8) -> Result<(), GraphError> {
        if !(-1..=1).contains(&partition) {
            return Err(GraphError::InvalidPartition { id, partition });
        }
        self.nodes
            .entry(id)
            .or_insert_with(|| ContactNode::with_partition(partition));
        self.max_id = self.max_id.max(id);
        Ok(())
    }

    /// Inserts a node only if absent; idempotent.
    pub fn try_insert_node(&mut self, id: i32) {
        self.insert_node(id);
    }

    /// Removes a node along with every incident edge and every reverse alt
    /// reference to it.
    /// # Errors
    /// * `UnknownNode` if the node is absent
    pub fn remove_node(&mut self, id: i32) -> Result<(), GraphError> {
        let node = self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))?;
        let incident: Vec<i32> = node.neighbors.iter().copied().collect();
        let alt_ids: Vec<i32> = node.alts.iter().copied().collect();

        for other in incident {
            self.remove_edge(id, other);
        }
        for alt_id in alt_ids {
            if let Some(alt) = self.nodes.get_mut(&alt_id) {
                alt.alts.remove(&id);
            }
        }
        self.nodes.remove(&id);

        // Deleting the max forces a rescan
        if id == self.max_id {
            self.max_id = self.nodes.keys().copied().max().unwrap_or(-1);
        }
        Ok(())
    }

    /// Stores the edge under its canonical key and updates both adjacency sets.
    /// Callers must have verified that both nodes exist and the edge does not.
    fn insert_edge(&mut self, a: i32, b: i32, weight: i32) {
        self.edge_weights.insert(edge_key(a, b), weight);
        self.nodes
            .get_mut(&a)
            .expect("insert_edge caller verified node")
            .neighbors
            .insert(b);
        self.nodes
            .get_mut(&b)
            .expect("insert_edge caller verified node")
            .neighbors
            .insert(a);
    }

    /// Inserts an edge with weight 0 unless it already exists.
    /// # Errors
    /// * `UnknownNode` if either endpoint is absent
    pub fn try_insert_edge(&mut self, a: i32, b: i32) -> Result<(), GraphError> {
        self.try_insert_edge_with_weight(a, b, 0)
    }

    /// Inserts an edge with the given weight; a no-op if the edge exists.
    /// # Errors
    /// * `UnknownNode` if either endpoint is absent
    pub fn try_insert_edge_with_weight(
        &mut self,
        a: i32,
        b: i32,
        weight: i32,
    ) -> Result<(), GraphError> {
        if !self.has_node(a) {
            return Err(GraphError::UnknownNode(a));
        }
        if !self.has_node(b) {
            return Err(GraphError::UnknownNode(b));
        }
        if !self.edge_weights.contains_key(&edge_key(a, b)) {
            self.insert_edge(a, b, weight);
        }
        Ok(())
    }

    /// Adds `value` to an existing edge weight; a no-op on a missing edge.
    /// # Errors
    /// * `UnknownNode` if either endpoint is absent
    pub fn increment_edge_weight(&mut self, a: i32, b: i32, value: i32) -> Result<(), GraphError> {
        if !self.has_node(a) {
            return Err(GraphError::UnknownNode(a));
        }
        if !self.has_node(b) {
            return Err(GraphError::UnknownNode(b));
        }
        if let Some(weight) = self.edge_weights.get_mut(&edge_key(a, b)) {
            *weight += value;
        }
        Ok(())
    }

    /// Removes an edge if present, keeping both adjacency sets in sync.
    pub fn remove_edge(&mut self, a: i32, b: i32) {
        if self.edge_weights.remove(&edge_key(a, b)).is_some() {
            if let Some(node) = self.nodes.get_mut(&a) {
                node.neighbors.remove(&b);
            }
            if let Some(node) = self.nodes.get_mut(&b) {
                node.neighbors.remove(&a);
            }
        }
    }

    pub fn has_edge(&self, a: i32, b: i32) -> bool {
        self.edge_weights.contains_key(&edge_key(a, b))
    }

    /// Stored weight for the edge, or 0 if the edge is absent.
    pub fn get_edge_weight(&self, a: i32, b: i32) -> i32 {
        self.edge_weights.get(&edge_key(a, b)).copied().unwrap_or(0)
    }

    /// Total number of stored edges.
    pub fn edge_count(&self) -> usize {
        self.edge_weights.len()
    }

    /// Degree of one node.
    /// # Errors
    /// * `UnknownNode` if the node is absent
    pub fn node_edge_count(&self, id: i32) -> Result<usize, GraphError> {
        Ok(self.node(id)?.degree())
    }

    pub fn set_node_coverage(&mut self, id: i32, coverage: i64) -> Result<(), GraphError> {
        self.nodes
            .get_mut(&id)
            .ok_or(GraphError::UnknownNode(id))?
            .coverage = coverage;
        Ok(())
    }

    pub fn increment_coverage(&mut self, id: i32, value: i64) -> Result<(), GraphError> {
        self.nodes
            .get_mut(&id)
            .ok_or(GraphError::UnknownNode(id))?
            .coverage += value;
        Ok(())
    }

    pub fn set_node_length(&mut self, id: i32, length: i32) -> Result<(), GraphError> {
        self.nodes
            .get_mut(&id)
            .ok_or(GraphError::UnknownNode(id))?
            .length = length;
        Ok(())
    }

    pub fn get_node_coverage(&self, id: i32) -> Result<i64, GraphError> {
        Ok(self.node(id)?.coverage)
    }

    pub fn get_node_length(&self, id: i32) -> Result<i32, GraphError> {
        Ok(self.node(id)?.length)
    }

    pub fn get_partition(&self, id: i32) -> Result<i8, GraphError> {
        Ok(self.node(id)?.partition)
    }

    /// True if the node is one side of a known bubble.
    /// # Errors
    /// * `UnknownNode` if the node is absent
    pub fn has_alt(&self, id: i32) -> Result<bool, GraphError> {
        Ok(self.node(id)?.has_alt())
    }

    /// Iterates node ids in unspecified order.
    pub fn node_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.nodes.keys().copied()
    }

    /// Iterates `(id, node)` pairs in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = (i32, &ContactNode)> + '_ {
        self.nodes.iter().map(|(&id, node)| (id, node))
    }

    /// Iterates canonical `(edge, weight)` pairs in unspecified order.
    pub fn edges(&self) -> impl Iterator<Item = ((i32, i32), i32)> + '_ {
        self.edge_weights.iter().map(|(&edge, &weight)| (edge, weight))
    }

    /// All edges sorted by descending weight; ties break on the canonical key.
    pub fn edges_by_weight(&self) -> Vec<((i32, i32), i32)> {
        let mut sorted_edges: Vec<((i32, i32), i32)> = self.edges().collect();
        sorted_edges.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sorted_edges
    }

    /// Iterates the neighbor ids of one node.
    /// # Errors
    /// * `UnknownNode` if the node is absent
    pub fn neighbors(&self, id: i32) -> Result<impl Iterator<Item = i32> + '_, GraphError> {
        Ok(self.node(id)?.neighbors())
    }

    /// Collects the connected component of the alts subgraph containing `id`,
    /// 2-colored by BFS distance parity. A node already placed on one side is
    /// not re-enqueued from the other side; a same-node overlap between sides
    /// is left for the caller to detect by intersection.
    /// # Errors
    /// * `UnknownNode` if the start node or any referenced alt is absent
    pub fn get_alt_component(&self, id: i32) -> Result<AltComponent, GraphError> {
        let mut component = AltComponent::default();
        let mut queue: VecDeque<(i32, u32)> = VecDeque::new();
        queue.push_back((id, 0));

        while let Some((current, distance)) = queue.pop_front() {
            let node = self
                .nodes
                .get(&current)
                .ok_or(GraphError::UnknownNode(current))?;

            component.place(current, distance);

            for alt_id in node.alts() {
                if !component.contains(alt_id) {
                    queue.push_back((alt_id, distance + 1));
                }
            }
        }
        Ok(component)
    }

    /// Yields every alt component exactly once, visiting unseen nodes in the
    /// store's iteration order.
    pub fn alt_components(&self) -> Result<Vec<AltComponent>, GraphError> {
        let mut components = Vec::new();
        let mut visited: HashSet<i32> = HashSet::default();
        visited.reserve(self.nodes.len());

        for &id in self.nodes.keys() {
            if visited.contains(&id) {
                continue;
            }
            let component = self.get_alt_component(id)?;
            for member in component.members() {
                visited.insert(member);
            }
            components.push(component);
        }
        Ok(components)
    }

    /// BFS reachability over the alts subgraph.
    pub fn of_same_component(&self, id_a: i32, id_b: i32) -> Result<bool, GraphError> {
        Ok(self.get_alt_component(id_a)?.contains(id_b))
    }

    /// Same component and equal BFS distance parity.
    pub fn of_same_component_side(&self, id_a: i32, id_b: i32) -> Result<bool, GraphError> {
        Ok(self.get_alt_component(id_a)?.side0().contains(&id_b))
    }

    /// Asserts that `a` and `b` are the two haplotypes of the same locus,
    /// purging any contact weights inside the merged component (no valid
    /// weight can exist between members of one component).
    pub fn add_alt(&mut self, a: i32, b: i32) -> Result<(), GraphError> {
        self.add_alt_with_policy(a, b, true)
    }

    /// `add_alt` with an explicit intra-component weight policy.
    ///
    /// The merged component takes all-vs-all alt connectivity: afterwards every
    /// member of one side is a direct alt of every member of the other, which
    /// keeps any later BFS one step deep.
    /// # Arguments
    /// * `a`, `b` - the node pair being asserted allelic
    /// * `remove_weights` - purge every edge between members of the merged component
    /// # Errors
    /// * `SelfAlt` if `a == b`
    /// * `UnknownNode` if either node is absent
    /// * `NonBipartite` if the merge would place a node on both sides; carries
    ///   both components and their conflict sets
    pub fn add_alt_with_policy(
        &mut self,
        a: i32,
        b: i32,
        remove_weights: bool,
    ) -> Result<(), GraphError> {
        if a == b {
            return Err(GraphError::SelfAlt(a));
        }
        if !self.has_node(a) {
            return Err(GraphError::UnknownNode(a));
        }
        if !self.has_node(b) {
            return Err(GraphError::UnknownNode(b));
        }
        if self.nodes[&a].alts.contains(&b) {
            return Ok(());
        }

        let component_a = self.get_alt_component(a)?;
        let component_b = self.get_alt_component(b)?;

        if !component_a.is_compatible(&component_b) {
            return Err(GraphError::NonBipartite(Box::new(NonBipartiteConflict::new(
                component_a,
                component_b,
                (a, b),
            ))));
        }

        let merged = component_a.merged_with(&component_b);

        if remove_weights {
            let members: Vec<i32> = merged.members().collect();
            for i in 0..members.len() {
                for j in (i + 1)..members.len() {
                    self.remove_edge(members[i], members[j]);
                }
            }
        }

        for &side0_id in merged.side0() {
            for &side1_id in merged.side1() {
                let node_0 = self
                    .nodes
                    .get_mut(&side0_id)
                    .ok_or(GraphError::UnknownNode(side0_id))?;
                node_0.alts.insert(side1_id);
                node_0.partition = 1;

                let node_1 = self
                    .nodes
                    .get_mut(&side1_id)
                    .ok_or(GraphError::UnknownNode(side1_id))?;
                node_1.alts.insert(side0_id);
                node_1.partition = -1;
            }
        }
        Ok(())
    }

    /// Assigns a partition label, propagating across the node's alt component:
    /// the side containing `id` takes `partition`, the other side its negation.
    /// # Errors
    /// * `UnknownNode` if the node is absent
    /// * `InvalidPartition` if the label is outside {-1, 0, 1}
    /// * `NeutralBubblePartition` if the node has alts and the label is 0
    pub fn set_partition(&mut self, id: i32, partition: i8) -> Result<(), GraphError> {
        if !(-1..=1).contains(&partition) {
            return Err(GraphError::InvalidPartition { id, partition });
        }
        let has_alt = self.node(id)?.has_alt();

        if has_alt {
            if partition == 0 {
                return Err(GraphError::NeutralBubblePartition(id));
            }
            let component = self.get_alt_component(id)?;
            self.set_component_partition(&component, partition)?;
        } else if let Some(node) = self.nodes.get_mut(&id) {
            node.partition = partition;
        }
        Ok(())
    }

    /// Applies a partition directly to a precomputed component: side 0 takes
    /// `partition`, side 1 its negation.
    pub fn set_component_partition(
        &mut self,
        component: &AltComponent,
        partition: i8,
    ) -> Result<(), GraphError> {
        for &id in component.side0() {
            self.nodes
                .get_mut(&id)
                .ok_or(GraphError::UnknownNode(id))?
                .partition = partition;
        }
        for &id in component.side1() {
            self.nodes
                .get_mut(&id)
                .ok_or(GraphError::UnknownNode(id))?
                .partition = -partition;
        }
        Ok(())
    }

    /// Snapshot of every node's partition label.
    pub fn get_partitions(&self) -> Vec<(i32, i8)> {
        self.nodes
            .iter()
            .map(|(&id, node)| (id, node.partition))
            .collect()
    }

    /// Applies a partition snapshot through the propagating setter.
    pub fn set_partitions(&mut self, partitions: &[(i32, i8)]) -> Result<(), GraphError> {
        for &(id, partition) in partitions {
            self.set_partition(id, partition)?;
        }
        Ok(())
    }

    /// Assigns every node a random legal label: bubble nodes draw from
    /// {-1, 1}, unconstrained nodes from {-1, 0, 1}.
    pub fn randomize_partitions<R: Rng>(&mut self, rng: &mut R) -> Result<(), GraphError> {
        let ids: Vec<i32> = self.node_ids().collect();
        for id in ids {
            let partition = if self.has_alt(id)? {
                if rng.gen::<bool>() {
                    1
                } else {
                    -1
                }
            } else {
                rng.gen_range(-1i8..=1)
            };
            self.set_partition(id, partition)?;
        }
        Ok(())
    }

    /// Full sweep asserting that every direct alt pair holds opposite labels.
    /// # Errors
    /// * `AltPartitionMismatch` on the first pair found sharing a label
    pub fn validate_alts(&self) -> Result<(), GraphError> {
        for (&id, node) in self.nodes.iter() {
            for alt_id in node.alts() {
                let alt = self.nodes.get(&alt_id).ok_or(GraphError::UnknownNode(alt_id))?;
                if alt.partition == node.partition {
                    return Err(GraphError::AltPartitionMismatch {
                        id,
                        alt_id,
                        partition: node.partition,
                    });
                }
            }
        }
        Ok(())
    }

    /// Sum of the incident edge scores of one node, skipping self loops.
    fn node_neighbor_score(&self, id: i32, node: &ContactNode) -> f64 {
        let mut score = 0.0;
        for other_id in node.neighbors() {
            if other_id == id {
                continue;
            }
            let other = &self.nodes[&other_id];
            score += pair_score(node.partition, other.partition, self.get_edge_weight(id, other_id));
        }
        score
    }

    /// Consistency score of the neighborhood of `id`: its incident edges plus
    /// the incident edges of each of its direct alts. Nothing is counted twice
    /// under the default `remove_weights` policy, which leaves no edge alive
    /// inside an alt component; `add_alt_with_policy(.., false)` can
    /// reintroduce intra-component edges, and those are counted from both
    /// ends.
    /// # Errors
    /// * `UnknownNode` if the node or any referenced alt is absent
    pub fn compute_consistency_score(&self, id: i32) -> Result<f64, GraphError> {
        let node = self.node(id)?;
        let mut score = self.node_neighbor_score(id, node);

        for alt_id in node.alts() {
            let alt = self.nodes.get(&alt_id).ok_or(GraphError::UnknownNode(alt_id))?;
            score += self.node_neighbor_score(alt_id, alt);
        }
        Ok(score)
    }

    /// Consistency score over the incident edges of every component member.
    pub fn compute_component_consistency_score(
        &self,
        component: &AltComponent,
    ) -> Result<f64, GraphError> {
        let mut score = 0.0;
        for id in component.members() {
            let node = self.node(id)?;
            score += self.node_neighbor_score(id, node);
        }
        Ok(score)
    }

    /// Global consistency score: sum over all stored edges, self loops excluded.
    pub fn compute_total_consistency_score(&self) -> f64 {
        let mut score = 0.0;
        for (&(a, b), &weight) in self.edge_weights.iter() {
            if a == b {
                continue;
            }
            score += pair_score(self.nodes[&a].partition, self.nodes[&b].partition, weight);
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a graph with the given nodes and weighted edges.
    fn build_graph(ids: &[i32], edges: &[(i32, i32, i32)]) -> ContactGraph {
        let mut graph = ContactGraph::new();
        for &id in ids {
            graph.insert_node(id);
        }
        for &(a, b, weight) in edges {
            graph.try_insert_edge_with_weight(a, b, weight).unwrap();
        }
        graph
    }

    #[test]
    fn test_empty_graph() {
        let graph = ContactGraph::new();
        assert_eq!(graph.size(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.get_max_id(), -1);
        assert_eq!(graph.compute_total_consistency_score(), 0.0);
    }

    #[test]
    fn test_edge_canonicity_and_adjacency() {
        let mut graph = build_graph(&[1, 2], &[]);
        graph.try_insert_edge_with_weight(2, 1, 9).unwrap();

        // stored under the canonical key, visible from both directions
        assert!(graph.has_edge(1, 2));
        assert!(graph.has_edge(2, 1));
        assert_eq!(graph.get_edge_weight(1, 2), 9);
        assert_eq!(graph.get_edge_weight(2, 1), 9);
        for ((a, b), _) in graph.edges() {
            assert!(a <= b);
        }
        assert!(graph.neighbors(1).unwrap().any(|n| n == 2));
        assert!(graph.neighbors(2).unwrap().any(|n| n == 1));

        // duplicate insertion does not overwrite the weight
        graph.try_insert_edge_with_weight(1, 2, 100).unwrap();
        assert_eq!(graph.get_edge_weight(1, 2), 9);
    }

    #[test]
    fn test_edge_requires_both_nodes() {
        let mut graph = build_graph(&[1], &[]);
        assert!(matches!(
            graph.try_insert_edge(1, 7),
            Err(GraphError::UnknownNode(7))
        ));
        assert!(matches!(
            graph.increment_edge_weight(7, 1, 3),
            Err(GraphError::UnknownNode(7))
        ));
    }

    #[test]
    fn test_increment_edge_weight_missing_edge_is_noop() {
        let mut graph = build_graph(&[1, 2, 3], &[(1, 2, 5)]);
        graph.increment_edge_weight(1, 3, 10).unwrap();
        assert!(!graph.has_edge(1, 3));

        graph.increment_edge_weight(2, 1, 3).unwrap();
        assert_eq!(graph.get_edge_weight(1, 2), 8);
    }

    #[test]
    fn test_insert_node_idempotent() {
        let mut graph = ContactGraph::new();
        graph.insert_node_with_partition(5, 1).unwrap();
        graph.try_insert_node(5);
        graph.insert_node(5);
        assert_eq!(graph.size(), 1);
        assert_eq!(graph.get_partition(5).unwrap(), 1);

        assert!(matches!(
            graph.insert_node_with_partition(6, 2),
            Err(GraphError::InvalidPartition { id: 6, partition: 2 })
        ));
    }

    #[test]
    fn test_max_id_tracking() {
        let mut graph = build_graph(&[3, 9, 4], &[]);
        assert_eq!(graph.get_max_id(), 9);
        graph.remove_node(9).unwrap();
        assert_eq!(graph.get_max_id(), 4);
        graph.remove_node(4).unwrap();
        graph.remove_node(3).unwrap();
        assert_eq!(graph.get_max_id(), -1);
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut graph = build_graph(&[1, 2, 3, 4], &[(1, 2, 5), (1, 3, 7)]);
        graph.add_alt(1, 4).unwrap();

        graph.remove_node(1).unwrap();
        assert!(!graph.has_node(1));
        assert_eq!(graph.edge_count(), 0);
        for (_, node) in graph.nodes() {
            assert!(node.alts().all(|alt_id| alt_id != 1));
        }
        assert!(!graph.has_alt(4).unwrap());

        assert!(matches!(graph.remove_node(1), Err(GraphError::UnknownNode(1))));
    }

    #[test]
    fn test_coverage_and_length() {
        let mut graph = build_graph(&[1], &[]);
        graph.set_node_coverage(1, 100).unwrap();
        graph.increment_coverage(1, 11).unwrap();
        graph.set_node_length(1, 5000).unwrap();
        assert_eq!(graph.get_node_coverage(1).unwrap(), 111);
        assert_eq!(graph.get_node_length(1).unwrap(), 5000);
        assert!(matches!(
            graph.set_node_coverage(2, 0),
            Err(GraphError::UnknownNode(2))
        ));
    }

    #[test]
    fn test_edges_by_weight_ordering() {
        let graph = build_graph(
            &[1, 2, 3, 4],
            &[(1, 2, 5), (3, 4, 9), (2, 3, 5), (1, 4, 1)],
        );
        let sorted = graph.edges_by_weight();
        assert_eq!(
            sorted,
            vec![((3, 4), 9), ((1, 2), 5), ((2, 3), 5), ((1, 4), 1)]
        );
    }

    #[test]
    fn test_score_scenario() {
        let mut graph = build_graph(&[1, 2, 3], &[(1, 2, 5), (2, 3, 7)]);
        graph.set_partition(1, 1).unwrap();
        graph.set_partition(2, -1).unwrap();
        graph.set_partition(3, 1).unwrap();
        assert_eq!(graph.compute_total_consistency_score(), -12.0);

        // node 2 sees both edges
        assert_eq!(graph.compute_consistency_score(2).unwrap(), -12.0);
        assert_eq!(graph.compute_consistency_score(1).unwrap(), -5.0);
    }

    #[test]
    fn test_neutral_partition_scores_zero() {
        let mut graph = build_graph(&[1, 2], &[(1, 2, 5)]);
        graph.set_partition(1, 1).unwrap();
        assert_eq!(graph.compute_total_consistency_score(), 0.0);
    }

    #[test]
    fn test_self_loop_scores_zero() {
        let mut graph = build_graph(&[1, 2], &[(1, 2, 5)]);
        graph.try_insert_edge_with_weight(1, 1, 50).unwrap();
        graph.set_partition(1, 1).unwrap();
        graph.set_partition(2, 1).unwrap();
        assert_eq!(graph.compute_total_consistency_score(), 5.0);
        assert_eq!(graph.compute_consistency_score(1).unwrap(), 5.0);
    }

    #[test]
    fn test_add_alt_basics() {
        let mut graph = build_graph(&[1, 2], &[]);
        assert!(matches!(graph.add_alt(1, 1), Err(GraphError::SelfAlt(1))));
        assert!(matches!(graph.add_alt(1, 9), Err(GraphError::UnknownNode(9))));

        graph.add_alt(1, 2).unwrap();
        assert!(graph.has_alt(1).unwrap());
        assert!(graph.has_alt(2).unwrap());
        assert_eq!(graph.get_partition(1).unwrap(), -graph.get_partition(2).unwrap());

        // repeating the assertion is a no-op
        let partitions = graph.get_partitions();
        graph.add_alt(1, 2).unwrap();
        let mut after = graph.get_partitions();
        let mut before = partitions;
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }

    #[test]
    fn test_alt_symmetry() {
        let mut graph = build_graph(&[1, 2, 3, 4], &[]);
        graph.add_alt(1, 2).unwrap();
        graph.add_alt(2, 3).unwrap();
        graph.add_alt(3, 4).unwrap();
        for (id, node) in graph.nodes() {
            for alt_id in node.alts() {
                assert!(graph.node(alt_id).unwrap().alts().any(|back| back == id));
            }
        }
    }

    #[test]
    fn test_add_alt_merges_components() {
        let mut graph = build_graph(&[1, 2, 3, 4], &[]);
        graph.add_alt(1, 2).unwrap();
        graph.add_alt(3, 4).unwrap();
        graph.add_alt(2, 3).unwrap();

        let component = graph.get_alt_component(1).unwrap();
        assert_eq!(component.side0(), &[1, 3].into_iter().collect::<BTreeSet<i32>>());
        assert_eq!(component.side1(), &[2, 4].into_iter().collect::<BTreeSet<i32>>());

        assert!(graph.of_same_component(1, 4).unwrap());
        assert!(graph.of_same_component_side(1, 3).unwrap());
        assert!(!graph.of_same_component_side(1, 2).unwrap());

        assert_eq!(graph.get_partition(1).unwrap(), graph.get_partition(3).unwrap());
        assert_eq!(graph.get_partition(2).unwrap(), graph.get_partition(4).unwrap());
        assert_eq!(graph.get_partition(1).unwrap(), -graph.get_partition(2).unwrap());
    }

    #[test]
    fn test_add_alt_rejects_non_bipartite() {
        let mut graph = build_graph(&[1, 2, 3, 4], &[]);
        graph.add_alt(1, 2).unwrap();
        graph.add_alt(3, 4).unwrap();
        graph.add_alt(2, 3).unwrap();

        match graph.add_alt(1, 3) {
            Err(GraphError::NonBipartite(conflict)) => {
                assert_eq!(conflict.pair, (1, 3));
                assert!(conflict.component_a.side0().contains(&3));
                assert!(conflict.component_b.side0().contains(&3));
                assert!(conflict.conflicts_0.contains(&3));
            }
            other => panic!("expected NonBipartite, got {:?}", other),
        }

        // the failed assertion must not have mutated the graph
        graph.validate_alts().unwrap();
        let component = graph.get_alt_component(1).unwrap();
        assert_eq!(component.len(), 4);
    }

    #[test]
    fn test_add_alt_purges_intra_component_weights() {
        let mut graph = build_graph(&[1, 2, 3, 4], &[(1, 2, 5), (1, 4, 3), (2, 3, 8)]);
        graph.add_alt(1, 2).unwrap();
        assert!(!graph.has_edge(1, 2));
        assert!(graph.has_edge(1, 4));
        assert!(graph.has_edge(2, 3));

        // merging {1,2} with {3,4} purges the surviving cross weights too
        graph.add_alt(3, 4).unwrap();
        graph.add_alt(2, 3).unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_add_alt_keep_weights_policy() {
        let mut graph = build_graph(&[1, 2], &[(1, 2, 5)]);
        graph.add_alt_with_policy(1, 2, false).unwrap();
        assert!(graph.has_edge(1, 2));
        assert_eq!(graph.get_edge_weight(1, 2), 5);
    }

    #[test]
    fn test_set_partition_propagates() {
        let mut graph = build_graph(&[1, 2, 3, 4], &[]);
        graph.add_alt(1, 2).unwrap();
        graph.add_alt(3, 4).unwrap();
        graph.add_alt(2, 3).unwrap();

        graph.set_partition(2, 1).unwrap();
        assert_eq!(graph.get_partition(2).unwrap(), 1);
        assert_eq!(graph.get_partition(4).unwrap(), 1);
        assert_eq!(graph.get_partition(1).unwrap(), -1);
        assert_eq!(graph.get_partition(3).unwrap(), -1);
        graph.validate_alts().unwrap();
    }

    #[test]
    fn test_set_partition_rejections() {
        let mut graph = build_graph(&[1, 2, 3], &[]);
        graph.add_alt(1, 2).unwrap();

        assert!(matches!(
            graph.set_partition(1, 0),
            Err(GraphError::NeutralBubblePartition(1))
        ));
        assert!(matches!(
            graph.set_partition(3, 2),
            Err(GraphError::InvalidPartition { id: 3, partition: 2 })
        ));
        assert!(matches!(
            graph.set_partition(9, 1),
            Err(GraphError::UnknownNode(9))
        ));

        // 0 stays legal for unconstrained nodes
        graph.set_partition(3, 0).unwrap();
    }

    #[test]
    fn test_set_component_partition() {
        let mut graph = build_graph(&[1, 2], &[]);
        graph.add_alt(1, 2).unwrap();
        let component = graph.get_alt_component(1).unwrap();
        graph.set_component_partition(&component, -1).unwrap();
        assert_eq!(graph.get_partition(1).unwrap(), -1);
        assert_eq!(graph.get_partition(2).unwrap(), 1);
    }

    #[test]
    fn test_partitions_snapshot_round_trip() {
        let mut graph = build_graph(&[1, 2, 3], &[]);
        graph.add_alt(1, 2).unwrap();
        graph.set_partition(1, -1).unwrap();
        graph.set_partition(3, 0).unwrap();

        let snapshot = graph.get_partitions();
        graph.set_partition(1, 1).unwrap();
        graph.set_partitions(&snapshot).unwrap();
        assert_eq!(graph.get_partition(1).unwrap(), -1);
        assert_eq!(graph.get_partition(2).unwrap(), 1);
        assert_eq!(graph.get_partition(3).unwrap(), 0);
    }

    #[test]
    fn test_randomize_partitions_stays_legal() {
        use rand::rngs::SmallRng;
        use rand::SeedableRng;

        let mut graph = build_graph(&[1, 2, 3, 4, 5], &[]);
        graph.add_alt(1, 2).unwrap();
        graph.add_alt(3, 4).unwrap();

        let mut rng = SmallRng::seed_from_u64(0xbeef);
        for _ in 0..20 {
            graph.randomize_partitions(&mut rng).unwrap();
            graph.validate_alts().unwrap();
            assert_ne!(graph.get_partition(1).unwrap(), 0);
            assert_ne!(graph.get_partition(4).unwrap(), 0);
        }
    }

    #[test]
    fn test_alt_components_enumeration() {
        let mut graph = build_graph(&[1, 2, 3, 4, 5], &[]);
        graph.add_alt(1, 2).unwrap();
        graph.add_alt(3, 4).unwrap();

        let components = graph.alt_components().unwrap();
        assert_eq!(components.len(), 3);
        let singletons = components.iter().filter(|c| c.len() == 1).count();
        assert_eq!(singletons, 1);
        for component in components.iter() {
            assert!(component.sides_disjoint());
        }
    }

    #[test]
    fn test_component_consistency_score() {
        let mut graph = build_graph(&[1, 2, 3, 4], &[(1, 3, 10), (2, 4, 10), (1, 4, 1), (2, 3, 1)]);
        graph.add_alt(1, 2).unwrap();
        graph.add_alt(3, 4).unwrap();
        graph.set_partition(1, 1).unwrap();
        graph.set_partition(3, 1).unwrap();

        // every stored edge has exactly one endpoint in the {1,2} bubble, so
        // the component score equals the full-graph score
        let component = graph.get_alt_component(1).unwrap();
        let score = graph.compute_component_consistency_score(&component).unwrap();
        assert_eq!(score, graph.compute_total_consistency_score());
        assert_eq!(score, 18.0);
    }

    #[test]
    fn test_validate_alts_detects_mismatch() {
        let mut graph = build_graph(&[1, 2], &[]);
        graph.add_alt(1, 2).unwrap();
        graph.validate_alts().unwrap();

        // corrupt one label through the component form, bypassing propagation
        let mut bad = AltComponent::default();
        bad.place(1, 0);
        bad.place(2, 0);
        graph.set_component_partition(&bad, 1).unwrap();
        assert!(matches!(
            graph.validate_alts(),
            Err(GraphError::AltPartitionMismatch { .. })
        ));
    }
}
