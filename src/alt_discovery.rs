
use log::warn;
use rustc_hash::FxHashSet as HashSet;
use simple_error::bail;
use std::error::Error;

use crate::contact_graph::ContactGraph;
use crate::id_map::IdMap;

/// Below this fraction of paired names the parameters are probably wrong
const MIN_ALT_PROPORTION: f64 = 0.05;

/// Infers allelic pairs from the contig naming convention `<prefix>.<side>`
/// with side 0/1: each name is matched with its complement and the pair is
/// asserted as alts when both nodes are present in the graph. Names prefixed
/// `U` denote unrelated contigs and are skipped, as is any name without an
/// integer side suffix.
///
/// Returns the number of alt pairs found.
/// # Arguments
/// * `graph` - the contact graph to annotate
/// * `id_map` - the name/id pairs to scan
/// # Errors
/// * if an integer side suffix is outside 0/1
/// * if no alts are found at all (nothing left to phase)
/// * if an inferred pair violates the bipartite alt constraint
pub fn discover_alts_from_names(
    graph: &mut ContactGraph,
    id_map: &IdMap,
) -> Result<usize, Box<dyn Error>> {
    let mut visited: HashSet<i32> = HashSet::default();
    let mut alts_found: usize = 0;

    for (name, id) in id_map.iter() {
        if visited.contains(&id) {
            continue;
        }
        if name.is_empty() || name.starts_with('U') {
            continue;
        }

        // The side is the last dot-separated field; require a real prefix
        let dot_index = match name.rfind('.') {
            Some(dot_index) if dot_index >= 2 => dot_index,
            _ => continue,
        };
        let side: i64 = match name[dot_index + 1..].parse() {
            Ok(side) => side,
            Err(_) => continue,
        };
        if !(0..=1).contains(&side) {
            bail!("bubble side suffix is not 0/1 for name: {}", name);
        }

        let other_name = format!("{}.{}", &name[..dot_index], 1 - side);

        if id_map.exists(&other_name) {
            let other_id = id_map.get_id(&other_name)?;
            visited.insert(other_id);

            if graph.has_node(id) && graph.has_node(other_id) {
                graph.add_alt(id, other_id)?;
                alts_found += 1;
            } else {
                warn!("bubble has node with no contacts: {},{}", name, other_name);
            }
        } else {
            warn!("bubble has no alt in id_map: {},{}", name, other_name);
        }

        visited.insert(id);
    }

    if alts_found == 0 {
        bail!("no alts found by node naming convention, nothing to phase");
    }

    let alt_proportion = alts_found as f64 / id_map.len() as f64;
    if alt_proportion < MIN_ALT_PROPORTION {
        warn!("proportion of nodes with alts is less than 5%, wrong parameters?");
    }

    Ok(alts_found)
}
