
use serde::Serialize;
use std::error::Error;
use std::fs::File;
use std::path::Path;

use crate::contact_graph::ContactGraph;
use crate::id_map::IdMap;

/// Contains all the data written to each row of the contact map
#[derive(Serialize)]
struct ContactRow {
    name_a: String,
    name_b: String,
    weight: i32,
}

/// Writes the contact map in the same wire format the loader reads, one row
/// per canonical edge sorted by edge key.
/// # Arguments
/// * `graph` - the contact graph
/// * `id_map` - translation from node ids back to contig names
/// * `path` - the output file
pub fn write_contact_csv(
    graph: &ContactGraph,
    id_map: &IdMap,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new().from_path(path)?;

    let mut edges: Vec<((i32, i32), i32)> = graph.edges().collect();
    edges.sort_unstable_by_key(|&(edge, _)| edge);

    for ((a, b), weight) in edges {
        let row = ContactRow {
            name_a: id_map.get_name(a)?.to_string(),
            name_b: id_map.get_name(b)?.to_string(),
            weight,
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
    fn test_contact_rows() {
        let mut graph = ContactGraph::new();
        let mut id_map = IdMap::new();
        for (id, name) in [(0, "tig_a"), (1, "tig_b"), (2, "tig_c")] {
            graph.insert_node(id);
            id_map.insert(name, id).unwrap();
        }
        graph.try_insert_edge_with_weight(2, 1, 7).unwrap();
        graph.try_insert_edge_with_weight(0, 1, 5).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.csv");
        write_contact_csv(&graph, &id_map, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "name_a,name_b,weight");
        assert_eq!(lines[1], "tig_a,tig_b,5");
        assert_eq!(lines[2], "tig_b,tig_c,7");
    }
}
