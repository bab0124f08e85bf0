use thiserror::Error;

/// Non-fatal failures raised while loading or laying out a graph.
///
/// None of these abort the viewer: callers log them and skip the offending
/// item, so a bad row only ever shows up as a missing rectangle or join.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("query returned no rows: {0}")]
    QueryEmpty(String),
    #[error("{kind} '{key}' not found")]
    LookupMiss { kind: &'static str, key: String },
    #[error("malformed sequence name '{name}': {reason}")]
    ParseFailure { name: String, reason: String },
    #[error("failed to read table {table}")]
    Table {
        table: String,
        #[source]
        source: csv::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    pub fn lookup_miss(kind: &'static str, key: impl ToString) -> Self {
        GraphError::LookupMiss {
            kind,
            key: key.to_string(),
        }
    }

    pub fn parse_failure(name: &str, reason: impl Into<String>) -> Self {
        GraphError::ParseFailure {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_miss_message() {
        let err = GraphError::lookup_miss("sequence", 42);
        assert_eq!(err.to_string(), "sequence '42' not found");
    }

    #[test]
    fn test_parse_failure_message() {
        let err = GraphError::parse_failure("x.zz", "missing step");
        let msg = err.to_string();
        assert!(msg.contains("x.zz"));
        assert!(msg.contains("missing step"));
    }

    #[test]
    fn test_query_empty_message() {
        let err = GraphError::QueryEmpty("Sequence".to_string());
        assert_eq!(err.to_string(), "query returned no rows: Sequence");
    }
}
