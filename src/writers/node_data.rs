
use serde::Serialize;
use std::error::Error;
use std::fs::File;
use std::path::Path;

use crate::contact_graph::ContactGraph;
use crate::id_map::IdMap;

/// Contains all the data written to each row of the node table
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct NodeDataRow {
    /// the node id
    id: i32,
    /// the contig name
    name: String,
    /// read support on the contig
    coverage: i64,
    /// sequence length of the contig
    length: i32,
}

/// Writes the per-node data table, one row per node sorted by id.
/// # Arguments
/// * `graph` - the contact graph
/// * `id_map` - translation from node ids back to contig names
/// * `path` - the output file
pub fn write_node_data_csv(
    graph: &ContactGraph,
    id_map: &IdMap,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new().from_path(path)?;

    let mut node_ids: Vec<i32> = graph.node_ids().collect();
    node_ids.sort_unstable();

    for id in node_ids {
        let node = graph.node(id)?;
        let row = NodeDataRow {
            id,
            name: id_map.get_name(id)?.to_string(),
            coverage: node.coverage(),
            length: node.length(),
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
    fn test_node_data_rows() {
        let mut graph = ContactGraph::new();
        let mut id_map = IdMap::new();
        for (id, name) in [(3, "tig_late"), (1, "tig_early")] {
            graph.insert_node(id);
            id_map.insert(name, id).unwrap();
        }
        graph.set_node_coverage(1, 9).unwrap();
        graph.set_node_length(1, 777).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.csv");
        write_node_data_csv(&graph, &id_map, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Id,Name,Coverage,Length");
        assert_eq!(lines[1], "1,tig_early,9,777");
        assert_eq!(lines[2], "3,tig_late,0,0");
    }
}
