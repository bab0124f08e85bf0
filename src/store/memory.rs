use crate::error::GraphError;
use crate::store::{
    AlleleCallRow, AlleleId, AllelePathItemRow, AlleleRow, CallSetId, CallSetRow, GraphJoinRow,
    GraphStore, SequenceId, SequenceRow,
};

/// Tile-graph tables held in memory.
///
/// Rows are kept in insertion order, which is the order queries return them
/// in (path items excepted, which are ordered by their index).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub sequences: Vec<SequenceRow>,
    pub call_sets: Vec<CallSetRow>,
    pub allele_calls: Vec<AlleleCallRow>,
    pub alleles: Vec<AlleleRow>,
    pub allele_path_items: Vec<AllelePathItemRow>,
    pub graph_joins: Vec<GraphJoinRow>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sequence(&mut self, id: SequenceId, name: &str, length: u64) -> &mut Self {
        self.sequences.push(SequenceRow {
            id,
            name: name.to_string(),
            md5: String::new(),
            length,
        });
        self
    }

    pub fn add_join(&mut self, id: i64, side1: SequenceId, side2: SequenceId) -> &mut Self {
        self.graph_joins.push(GraphJoinRow {
            id,
            side1_sequence_id: side1,
            side1_position: 0,
            side1_strand_is_forward: true,
            side2_sequence_id: side2,
            side2_position: 0,
            side2_strand_is_forward: true,
        });
        self
    }

    pub fn add_call_set(&mut self, id: CallSetId, name: &str) -> &mut Self {
        self.call_sets.push(CallSetRow {
            id,
            name: name.to_string(),
        });
        self
    }

    /// Register an allele of a call set together with its sequence path.
    pub fn add_allele(
        &mut self,
        call_set_id: CallSetId,
        allele_id: AlleleId,
        name: &str,
        path: &[SequenceId],
    ) -> &mut Self {
        self.allele_calls.push(AlleleCallRow {
            call_set_id,
            allele_id,
        });
        self.alleles.push(AlleleRow {
            id: allele_id,
            name: name.to_string(),
        });
        self.allele_path_items
            .extend(path.iter().enumerate().map(|(i, &sequence_id)| AllelePathItemRow {
                allele_id,
                path_item_index: i as i64,
                sequence_id,
            }));
        self
    }
}

fn non_empty<T>(rows: Vec<T>, query: impl FnOnce() -> String) -> Result<Vec<T>, GraphError> {
    if rows.is_empty() {
        Err(GraphError::QueryEmpty(query()))
    } else {
        Ok(rows)
    }
}

impl GraphStore for MemoryStore {
    fn sequences(&self) -> Result<Vec<SequenceRow>, GraphError> {
        non_empty(self.sequences.clone(), || "Sequence".to_string())
    }

    fn call_sets(&self) -> Result<Vec<CallSetRow>, GraphError> {
        non_empty(self.call_sets.clone(), || "CallSet".to_string())
    }

    fn allele_ids(&self, call_set_id: CallSetId) -> Result<Vec<AlleleId>, GraphError> {
        let ids = self
            .allele_calls
            .iter()
            .filter(|c| c.call_set_id == call_set_id)
            .map(|c| c.allele_id)
            .collect();
        non_empty(ids, || format!("AlleleCall where callSetID = {call_set_id}"))
    }

    fn allele_name(&self, allele_id: AlleleId) -> Result<String, GraphError> {
        self.alleles
            .iter()
            .find(|a| a.id == allele_id)
            .map(|a| a.name.clone())
            .ok_or_else(|| GraphError::QueryEmpty(format!("Allele where ID = {allele_id}")))
    }

    fn allele_path(&self, allele_id: AlleleId) -> Result<Vec<SequenceId>, GraphError> {
        let mut items: Vec<&AllelePathItemRow> = self
            .allele_path_items
            .iter()
            .filter(|p| p.allele_id == allele_id)
            .collect();
        items.sort_by_key(|p| p.path_item_index);
        let path = items.into_iter().map(|p| p.sequence_id).collect();
        non_empty(path, || format!("AllelePathItem where alleleID = {allele_id}"))
    }

    fn graph_joins(&self) -> Result<Vec<GraphJoinRow>, GraphError> {
        non_empty(self.graph_joins.clone(), || "GraphJoin".to_string())
    }
}
