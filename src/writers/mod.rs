
/// Bandage-compatible per-node phase annotation CSV
pub mod bandage_csv;
/// Contact-map CSV output matching the loader's wire format
pub mod contact_csv;
/// Per-node id/name/coverage/length table
pub mod node_data;
