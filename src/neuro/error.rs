//! Error types shared by the network, chromosome and pool modules.

use thiserror::Error;

use super::network::NodeRole;

/// Errors raised while building, evolving or persisting networks.
///
/// All of these are setup or programmer errors. None of them are transient,
/// so callers should treat them as fatal rather than retry.
#[derive(Error, Debug)]
pub enum EvoError {
    /// A node with this name already exists in the graph.
    #[error("node `{name}` already exists")]
    DuplicateNode {
        /// Offending node name.
        name: String,
    },

    /// A referenced node does not exist in the graph.
    #[error("unknown node `{name}`")]
    UnknownNode {
        /// Missing node name.
        name: String,
    },

    /// An operation was applied to a node of the wrong role.
    #[error("node `{name}` is {found:?}, expected {expected:?}")]
    WrongNodeKind {
        /// Node name.
        name: String,
        /// Role the operation requires.
        expected: NodeRole,
        /// Role the node actually has.
        found: NodeRole,
    },

    /// Chromosome gene count does not match the graph's connection count.
    #[error("chromosome has {genes} genes but the network has {connections} connections")]
    TopologyMismatch {
        /// Number of genes in the chromosome.
        genes: usize,
        /// Number of connections in the network (or the other chromosome).
        connections: usize,
    },

    /// The gene at `index` describes a different edge than the connection at `index`.
    #[error("gene {index} is `{gene}` but connection {index} is `{connection}`")]
    EdgeMismatch {
        /// Position of the first mismatching gene.
        index: usize,
        /// Edge described by the gene, as `from->to`.
        gene: String,
        /// Edge present in the network, as `from->to`.
        connection: String,
    },

    /// Invalid pool, network or trainer parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed line in a persisted chromosome.
    #[error("parse error on line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// Node name cannot be written to the chromosome text format.
    #[error("invalid node name `{name}`")]
    InvalidNodeName {
        /// Rejected name.
        name: String,
    },

    /// Connection would introduce a self loop or a cycle.
    #[error("connection `{from}->{to}` would create a cycle")]
    Cycle {
        /// Source node name.
        from: String,
        /// Target node name.
        to: String,
    },

    /// Positional input slice has the wrong length.
    #[error("expected {expected} input values, got {found}")]
    InputArity {
        /// Number of input nodes.
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },

    /// I/O failure while reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, EvoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_node_kind_message() {
        let error = EvoError::WrongNodeKind {
            name: "hidden1".to_string(),
            expected: NodeRole::Input,
            found: NodeRole::Hidden,
        };
        assert_eq!(error.to_string(), "node `hidden1` is Hidden, expected Input");
    }

    #[test]
    fn test_topology_mismatch_message() {
        let error = EvoError::TopologyMismatch {
            genes: 3,
            connections: 20,
        };
        assert_eq!(
            error.to_string(),
            "chromosome has 3 genes but the network has 20 connections"
        );
    }

    #[test]
    fn test_parse_error_message() {
        let error = EvoError::Parse {
            line: 4,
            reason: "expected 3 fields, found 2".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "parse error on line 4: expected 3 fields, found 2"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: EvoError = io.into();
        assert!(matches!(error, EvoError::Io(_)));
        assert_eq!(error.to_string(), "I/O error: missing");
    }
}
