
/// Two-sided alt component algebra and the bipartite conflict payload
pub mod alt_component;
/// Alt-pair discovery from contig naming conventions
pub mod alt_discovery;
/// CLI functionality and checks
pub mod cli;
/// The weighted contact graph with bipartite allelic constraints
pub mod contact_graph;
/// Contact-map sources and contact CSV loading
pub mod contact_map;
/// Bidirectional contig-name/node-id mapping
pub mod id_map;
/// Multi-threaded Monte-Carlo search over phase assignments
pub mod phase_optimizer;
/// Contains all the various output writer functionality
pub mod writers;
