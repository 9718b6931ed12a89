
use serde::Serialize;
use std::error::Error;
use std::fs::File;
use std::path::Path;

use crate::contact_graph::ContactGraph;
use crate::id_map::IdMap;

/// Display palette indexed by `partition + 1`
const PHASE_COLORS: [&str; 3] = ["Cornflower Blue", "Plum", "Tomato"];

/// Contains all the data written to each row of the Bandage annotation file
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct BandageRow {
    /// the contig name
    name: String,
    /// the assigned partition label
    phase: i8,
    /// read support on the contig
    coverage: i64,
    /// sequence length of the contig
    length: i32,
    /// display color matching the phase
    color: &'static str,
}

/// Writes a Bandage-loadable annotation CSV with one row per node, sorted by
/// node id.
/// # Arguments
/// * `graph` - the phased contact graph
/// * `id_map` - translation from node ids back to contig names
/// * `path` - the output file
/// # Errors
/// * if any node id is missing from the id map, or on any write failure
pub fn write_bandage_csv(
    graph: &ContactGraph,
    id_map: &IdMap,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new().from_path(path)?;

    let mut node_ids: Vec<i32> = graph.node_ids().collect();
    node_ids.sort_unstable();

    for id in node_ids {
        let node = graph.node(id)?;
        let row = BandageRow {
            name: id_map.get_name(id)?.to_string(),
            phase: node.partition(),
            coverage: node.coverage(),
            length: node.length(),
            color: PHASE_COLORS[(node.partition() + 1) as usize],
        };
        csv_writer.serialize(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bandage_rows_and_palette() {
        let mut graph = ContactGraph::new();
        let mut id_map = IdMap::new();
        for (id, name) in [(0, "tig_a"), (1, "tig_b"), (2, "tig_c")] {
            graph.insert_node(id);
            id_map.insert(name, id).unwrap();
        }
        graph.add_alt(0, 1).unwrap();
        graph.set_partition(0, 1).unwrap();
        graph.set_node_coverage(0, 42).unwrap();
        graph.set_node_length(0, 1234).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phases.csv");
        write_bandage_csv(&graph, &id_map, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Name,Phase,Coverage,Length,Color");
        assert_eq!(lines[1], "tig_a,1,42,1234,Tomato");
        assert_eq!(lines[2], "tig_b,-1,0,0,Cornflower Blue");
        assert_eq!(lines[3], "tig_c,0,0,0,Plum");
    }
}
