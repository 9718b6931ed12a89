
use rustc_hash::FxHashMap as HashMap;
use simple_error::bail;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum IdMapError {
    #[error("name {0:?} is not in the id map")]
    UnknownName(String),
    #[error("id {0} is not in the id map")]
    UnknownId(i32),
    #[error("name {name:?} is already mapped to id {existing}")]
    DuplicateName { name: String, existing: i32 },
    #[error("id {id} is already mapped to name {existing:?}")]
    DuplicateId { id: i32, existing: String },
}

/// Bidirectional map between externally assigned contig names and the signed
/// 32-bit node ids used by the contact graph. Iteration is ordered by id so
/// downstream passes behave deterministically.
#[derive(Clone, Debug, Default)]
pub struct IdMap {
    ids_by_name: HashMap<String, i32>,
    names_by_id: BTreeMap<i32, String>,
}

impl IdMap {
    pub fn new() -> IdMap {
        Self::default()
    }

    /// Loads a map from a headerless CSV of `id,name` rows, the format the
    /// upstream binning pipeline writes.
    /// # Arguments
    /// * `path` - the ids file to read
    /// # Errors
    /// * on unreadable files, rows without exactly two fields, non-integer
    ///   ids, or duplicate entries
    pub fn from_csv(path: &Path) -> Result<IdMap, Box<dyn Error>> {
        let mut reader = match csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
        {
            Ok(reader) => reader,
            Err(e) => bail!("could not read id file {:?}: {}", path, e),
        };

        let mut id_map = IdMap::new();
        for (row_index, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => bail!("could not parse row {} of {:?}: {}", row_index + 1, path, e),
            };
            if record.len() != 2 {
                bail!(
                    "malformed row {} in {:?}: expected 2 comma-separated fields, found {}",
                    row_index + 1,
                    path,
                    record.len()
                );
            }
            let id: i32 = match record[0].trim().parse() {
                Ok(id) => id,
                Err(_) => bail!(
                    "malformed row {} in {:?}: non-integer id {:?}",
                    row_index + 1,
                    path,
                    &record[0]
                ),
            };
            id_map.insert(&record[1], id)?;
        }
        Ok(id_map)
    }

    /// Registers a `name <-> id` pair.
    /// # Errors
    /// * `DuplicateName` / `DuplicateId` if either half is already mapped
    pub fn insert(&mut self, name: &str, id: i32) -> Result<(), IdMapError> {
        if let Some(&existing) = self.ids_by_name.get(name) {
            return Err(IdMapError::DuplicateName {
                name: name.to_string(),
                existing,
            });
        }
        if let Some(existing) = self.names_by_id.get(&id) {
            return Err(IdMapError::DuplicateId {
                id,
                existing: existing.clone(),
            });
        }
        self.ids_by_name.insert(name.to_string(), id);
        self.names_by_id.insert(id, name.to_string());
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.ids_by_name.contains_key(name)
    }

    pub fn get_id(&self, name: &str) -> Result<i32, IdMapError> {
        self.ids_by_name
            .get(name)
            .copied()
            .ok_or_else(|| IdMapError::UnknownName(name.to_string()))
    }

    pub fn get_name(&self, id: i32) -> Result<&str, IdMapError> {
        self.names_by_id
            .get(&id)
            .map(|name| name.as_str())
            .ok_or(IdMapError::UnknownId(id))
    }

    /// Iterates `(name, id)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
        self.names_by_id.iter().map(|(&id, name)| (name.as_str(), id))
    }

    pub fn len(&self) -> usize {
        self.names_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names_by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_insert_and_lookup() {
        let mut id_map = IdMap::new();
        id_map.insert("contig.0", 0).unwrap();
        id_map.insert("contig.1", 1).unwrap();

        assert!(id_map.exists("contig.0"));
        assert!(!id_map.exists("contig.2"));
        assert_eq!(id_map.get_id("contig.1").unwrap(), 1);
        assert_eq!(id_map.get_name(0).unwrap(), "contig.0");
        assert_eq!(id_map.len(), 2);

        assert!(matches!(
            id_map.get_id("missing"),
            Err(IdMapError::UnknownName(_))
        ));
        assert!(matches!(id_map.get_name(9), Err(IdMapError::UnknownId(9))));
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut id_map = IdMap::new();
        id_map.insert("a", 0).unwrap();
        assert!(matches!(
            id_map.insert("a", 1),
            Err(IdMapError::DuplicateName { .. })
        ));
        assert!(matches!(
            id_map.insert("b", 0),
            Err(IdMapError::DuplicateId { .. })
        ));
    }

    #[test]
    fn test_iteration_is_id_ordered() {
        let mut id_map = IdMap::new();
        id_map.insert("c", 7).unwrap();
        id_map.insert("a", 2).unwrap();
        id_map.insert("b", 5).unwrap();
        let pairs: Vec<(&str, i32)> = id_map.iter().collect();
        assert_eq!(pairs, vec![("a", 2), ("b", 5), ("c", 7)]);
    }

    #[test]
    fn test_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "0,PR.0.0").unwrap();
        writeln!(file, "1,PR.0.1").unwrap();
        drop(file);

        let id_map = IdMap::from_csv(&path).unwrap();
        assert_eq!(id_map.len(), 2);
        assert_eq!(id_map.get_id("PR.0.1").unwrap(), 1);
    }

    #[test]
    fn test_from_csv_rejects_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "0,name,extra").unwrap();
        drop(file);
        assert!(IdMap::from_csv(&path).is_err());

        let path = dir.path().join("ids2.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "zero,name").unwrap();
        drop(file);
        assert!(IdMap::from_csv(&path).is_err());
    }
}
