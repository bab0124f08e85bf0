//! Read-only access to the tile-graph tables.
//!
//! The viewer never writes to the store. Every query maps to one table of the
//! graph database; an empty answer where rows are required is reported as
//! [`GraphError::QueryEmpty`] so callers can log and skip.

pub mod memory;
pub mod tables;

use serde::Deserialize;

use crate::error::GraphError;

pub use memory::MemoryStore;

pub type SequenceId = i64;
pub type CallSetId = i64;
pub type AlleleId = i64;

/// One row of the `Sequence` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SequenceRow {
    #[serde(rename = "ID")]
    pub id: SequenceId,
    #[serde(rename = "sequenceRecordName")]
    pub name: String,
    #[serde(rename = "md5checksum")]
    pub md5: String,
    pub length: u64,
}

/// One row of the `CallSet` table (a sample).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallSetRow {
    #[serde(rename = "ID")]
    pub id: CallSetId,
    pub name: String,
}

/// One row of the `AlleleCall` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlleleCallRow {
    #[serde(rename = "callSetID")]
    pub call_set_id: CallSetId,
    #[serde(rename = "alleleID")]
    pub allele_id: AlleleId,
}

/// One row of the `Allele` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlleleRow {
    #[serde(rename = "ID")]
    pub id: AlleleId,
    pub name: String,
}

/// One row of the `AllelePathItem` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AllelePathItemRow {
    #[serde(rename = "alleleID")]
    pub allele_id: AlleleId,
    #[serde(rename = "pathItemIndex")]
    pub path_item_index: i64,
    #[serde(rename = "sequenceID")]
    pub sequence_id: SequenceId,
}

/// One row of the `GraphJoin` table: an edge between two sequences.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GraphJoinRow {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "side1SequenceID")]
    pub side1_sequence_id: SequenceId,
    #[serde(rename = "side1Position")]
    pub side1_position: i64,
    #[serde(rename = "side1StrandIsForward", deserialize_with = "tables::strand")]
    pub side1_strand_is_forward: bool,
    #[serde(rename = "side2SequenceID")]
    pub side2_sequence_id: SequenceId,
    #[serde(rename = "side2Position")]
    pub side2_position: i64,
    #[serde(rename = "side2StrandIsForward", deserialize_with = "tables::strand")]
    pub side2_strand_is_forward: bool,
}

/// The queries the graph model issues against a locus database.
pub trait GraphStore {
    /// `select ID, sequenceRecordName, md5checksum, length from Sequence`
    fn sequences(&self) -> Result<Vec<SequenceRow>, GraphError>;

    /// `select ID, name from CallSet`
    fn call_sets(&self) -> Result<Vec<CallSetRow>, GraphError>;

    /// `select alleleID from AlleleCall where callSetID = ?`
    fn allele_ids(&self, call_set_id: CallSetId) -> Result<Vec<AlleleId>, GraphError>;

    /// `select name from Allele where ID = ?`
    fn allele_name(&self, allele_id: AlleleId) -> Result<String, GraphError>;

    /// `select sequenceID from AllelePathItem where alleleID = ? order by pathItemIndex`
    fn allele_path(&self, allele_id: AlleleId) -> Result<Vec<SequenceId>, GraphError>;

    /// `select ... from GraphJoin`
    fn graph_joins(&self) -> Result<Vec<GraphJoinRow>, GraphError>;
}
