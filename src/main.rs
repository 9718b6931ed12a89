
use proxiphase::alt_discovery::discover_alts_from_names;
use proxiphase::cli::{check_settings, get_raw_settings, Settings};
use proxiphase::contact_map::load_contact_csv;
use proxiphase::id_map::IdMap;
use proxiphase::phase_optimizer::{monte_carlo_phase_contacts, OptimizerSettings};
use proxiphase::writers::bandage_csv::write_bandage_csv;
use proxiphase::writers::contact_csv::write_contact_csv;
use proxiphase::writers::node_data::write_node_data_csv;

use log::{debug, error, info, LevelFilter};
use std::time::Instant;

fn main() {
    // get the settings
    let settings: Settings = get_raw_settings();
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // immediately setup logging first
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    // okay, now we can check all the other settings
    let cli_settings: Settings = check_settings(settings);
    let start_time: Instant = Instant::now();

    info!("Loading id map...");
    let id_map: IdMap = match IdMap::from_csv(&cli_settings.id_path) {
        Ok(id_map) => id_map,
        Err(e) => {
            error!("Error while loading id map: {}", e);
            std::process::exit(exitcode::IOERR);
        }
    };

    info!("Loading contact graph...");
    let mut contact_graph = match load_contact_csv(&cli_settings.graph_path, &id_map) {
        Ok(graph) => graph,
        Err(e) => {
            error!("Error while loading contact map: {}", e);
            std::process::exit(exitcode::IOERR);
        }
    };
    info!(
        "Loaded {} nodes and {} contact edges",
        contact_graph.size(),
        contact_graph.edge_count()
    );

    info!("Discovering allelic pairs from contig names...");
    let alts_found = match discover_alts_from_names(&mut contact_graph, &id_map) {
        Ok(alts_found) => alts_found,
        Err(e) => {
            error!("Error during alt discovery: {}", e);
            std::process::exit(exitcode::DATAERR);
        }
    };
    info!("Found {} allelic pairs", alts_found);

    // only nodes constrained by a bubble carry usable phasing signal
    let unpaired: Vec<i32> = contact_graph
        .nodes()
        .filter(|(_, node)| !node.has_alt())
        .map(|(id, _)| id)
        .collect();
    debug!("Removing {} nodes with no allelic pairing", unpaired.len());
    for id in unpaired {
        if let Err(e) = contact_graph.remove_node(id) {
            error!("Error while pruning unpaired nodes: {}", e);
            std::process::exit(exitcode::SOFTWARE);
        }
    }

    // self edges carry no signal either
    let node_ids: Vec<i32> = contact_graph.node_ids().collect();
    for id in node_ids {
        contact_graph.remove_edge(id, id);
    }

    if contact_graph.edge_count() == 0 {
        error!("No inter-contig contacts detected between allelic nodes, no usable phasing information");
        std::process::exit(exitcode::DATAERR);
    }

    info!("Optimizing phases...");
    let optimizer_settings = OptimizerSettings {
        core_iterations: cli_settings.core_iterations,
        sample_size: cli_settings.sample_size,
        n_rounds: cli_settings.n_rounds,
        threads: cli_settings.threads,
    };
    let best_score = match monte_carlo_phase_contacts(&mut contact_graph, &optimizer_settings) {
        Ok(best_score) => best_score,
        Err(e) => {
            error!("Error during phase optimization: {}", e);
            std::process::exit(exitcode::SOFTWARE);
        }
    };
    info!("Best consistency score: {}", best_score);

    if let Err(e) = contact_graph.validate_alts() {
        error!("Phasing produced an inconsistent allelic assignment: {}", e);
        std::process::exit(exitcode::SOFTWARE);
    }

    if let Err(e) = std::fs::create_dir_all(&cli_settings.output_dir) {
        error!(
            "Error while creating output directory \"{}\": {}",
            cli_settings.output_dir.display(),
            e
        );
        std::process::exit(exitcode::IOERR);
    }

    let phases_path = cli_settings.output_dir.join("phases.csv");
    match write_bandage_csv(&contact_graph, &id_map, &phases_path) {
        Ok(()) => info!("Wrote {:?}", phases_path),
        Err(e) => {
            error!("Error while writing phase annotations: {}", e);
            std::process::exit(exitcode::IOERR);
        }
    }

    let nodes_path = cli_settings.output_dir.join("nodes.csv");
    match write_node_data_csv(&contact_graph, &id_map, &nodes_path) {
        Ok(()) => info!("Wrote {:?}", nodes_path),
        Err(e) => {
            error!("Error while writing node data: {}", e);
            std::process::exit(exitcode::IOERR);
        }
    }

    let contacts_path = cli_settings.output_dir.join("contacts.csv");
    match write_contact_csv(&contact_graph, &id_map, &contacts_path) {
        Ok(()) => info!("Wrote {:?}", contacts_path),
        Err(e) => {
            error!("Error while writing filtered contact map: {}", e);
            std::process::exit(exitcode::IOERR);
        }
    }

    info!(
        "Phasing finished successfully after {} seconds.",
        start_time.elapsed().as_secs_f64()
    );
}
