use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::GraphError;
use crate::store::MemoryStore;

/// Accept the strand flag spellings found in table exports
/// (`TRUE`, `'FALSE'`, `true`, `1`, ...).
pub(super) fn strand<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let flag = raw.trim().trim_matches(|c| c == '\'' || c == '"');
    match flag.to_ascii_uppercase().as_str() {
        "TRUE" | "T" | "1" => Ok(true),
        "FALSE" | "F" | "0" => Ok(false),
        _ => Err(serde::de::Error::custom(format!("invalid strand flag '{raw}'"))),
    }
}

/// Read `<dir>/<table>.csv`. A missing file is an empty table.
fn read_table<T: DeserializeOwned>(dir: &Path, table: &str) -> Result<Vec<T>, GraphError> {
    let path = dir.join(format!("{table}.csv"));
    if !path.exists() {
        log::warn!("table file {} not found, treating {table} as empty", path.display());
        return Ok(Vec::new());
    }

    let to_err = |source| GraphError::Table {
        table: table.to_string(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&path)
        .map_err(to_err)?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record.map_err(to_err)?);
    }
    log::debug!("read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

impl MemoryStore {
    /// Load a locus database exported as one CSV file per table, each with a
    /// header row naming the table's columns.
    pub fn from_csv_dir(dir: &Path) -> Result<Self, GraphError> {
        if !dir.is_dir() {
            return Err(GraphError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("table directory not found: {}", dir.display()),
            )));
        }

        Ok(Self {
            sequences: read_table(dir, "Sequence")?,
            call_sets: read_table(dir, "CallSet")?,
            allele_calls: read_table(dir, "AlleleCall")?,
            alleles: read_table(dir, "Allele")?,
            allele_path_items: read_table(dir, "AllelePathItem")?,
            graph_joins: read_table(dir, "GraphJoin")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::GraphStore;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_from_csv_dir() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "Sequence.csv",
            "ID,fastaID,sequenceRecordName,md5checksum,length\n\
             1,1,x.247.abc.t0f,d41d8cd98f00b204e9800998ecf8427e,24\n\
             2,1,x.247.abc.r1+1,d41d8cd98f00b204e9800998ecf8427e,200\n",
        );
        write(
            dir.path(),
            "GraphJoin.csv",
            "ID,side1SequenceID,side1Position,side1StrandIsForward,side2SequenceID,side2Position,side2StrandIsForward\n\
             1,1,23,'FALSE',2,0,'TRUE'\n",
        );
        write(dir.path(), "CallSet.csv", "ID,name\n3,hu_test\n");

        let store = MemoryStore::from_csv_dir(dir.path()).unwrap();
        let seqs = store.sequences().unwrap();
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[1].name, "x.247.abc.r1+1");
        assert_eq!(seqs[1].length, 200);

        let joins = store.graph_joins().unwrap();
        assert_eq!(joins.len(), 1);
        assert!(!joins[0].side1_strand_is_forward);
        assert!(joins[0].side2_strand_is_forward);
        assert_eq!(joins[0].side1_position, 23);

        assert_eq!(store.call_sets().unwrap()[0].name, "hu_test");
        // No allele tables were written.
        assert!(store.allele_ids(3).is_err());
    }

    #[test]
    fn test_bad_strand_flag() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "GraphJoin.csv",
            "ID,side1SequenceID,side1Position,side1StrandIsForward,side2SequenceID,side2Position,side2StrandIsForward\n\
             1,1,0,maybe,2,0,TRUE\n",
        );
        let err = MemoryStore::from_csv_dir(dir.path()).unwrap_err();
        assert!(matches!(err, GraphError::Table { .. }));
    }

    #[test]
    fn test_missing_dir() {
        let err = MemoryStore::from_csv_dir(Path::new("/nonexistent/locus")).unwrap_err();
        assert!(matches!(err, GraphError::Io(_)));
    }
}
