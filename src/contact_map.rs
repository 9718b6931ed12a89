
use rustc_hash::FxHashMap as HashMap;
use simple_error::bail;
use std::error::Error;
use std::path::Path;

use crate::contact_graph::{ContactGraph, GraphError};
use crate::id_map::IdMap;

/// Nested `id -> id -> count` contact source, as produced by alignment
/// binning upstream of the phasing core.
pub type ContactMap = HashMap<i32, HashMap<i32, i32>>;

/// Builds a contact graph from a nested contact map. Symmetric entries are
/// deduplicated into one canonical edge; the first count seen wins.
pub fn graph_from_contact_map(contact_map: &ContactMap) -> Result<ContactGraph, GraphError> {
    let mut graph = ContactGraph::new();
    for (&id_a, sub_map) in contact_map.iter() {
        graph.try_insert_node(id_a);
        for (&id_b, &count) in sub_map.iter() {
            graph.try_insert_node(id_b);
            graph.try_insert_edge_with_weight(id_a, id_b, count)?;
        }
    }
    Ok(graph)
}

/// Loads a contact graph from a `name_a,name_b,weight` CSV.
///
/// The first line is always skipped as a header; an empty file yields an
/// empty graph. Every data row must hold exactly three comma-separated
/// fields with an integer weight, and both names must be present in the id
/// map.
/// # Arguments
/// * `path` - the contact CSV to read
/// * `id_map` - translation from contig names to node ids
pub fn load_contact_csv(path: &Path, id_map: &IdMap) -> Result<ContactGraph, Box<dyn Error>> {
    let mut reader = match csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
    {
        Ok(reader) => reader,
        Err(e) => bail!("could not read contact csv {:?}: {}", path, e),
    };

    let mut graph = ContactGraph::new();
    for (row_index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => bail!("could not parse row {} of {:?}: {}", row_index + 2, path, e),
        };
        if record.len() != 3 {
            bail!(
                "malformed row {} in {:?}: expected 3 comma-separated fields, found {}",
                row_index + 2,
                path,
                record.len()
            );
        }
        let weight: i32 = match record[2].trim().parse() {
            Ok(weight) => weight,
            Err(_) => bail!(
                "malformed row {} in {:?}: non-integer weight {:?}",
                row_index + 2,
                path,
                &record[2]
            ),
        };

        let id_a = id_map.get_id(&record[0])?;
        let id_b = id_map.get_id(&record[1])?;

        graph.try_insert_node(id_a);
        graph.try_insert_node(id_b);
        graph.try_insert_edge_with_weight(id_a, id_b, weight)?;
    }
    Ok(graph)
}
