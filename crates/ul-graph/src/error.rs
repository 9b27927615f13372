//! Topology error types.

use ul_core::UlError;

pub type GraphResult<T> = Result<T, GraphError>;

/// Topology construction, validation and diff errors.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Two nodes share a label.
    DuplicateNode { label: String },

    /// Two connections (fluid or power) share a label.
    DuplicateConnection { label: String },

    /// A connection or edit names a node that doesn't exist.
    UnknownNode { label: String },

    /// An edit names a connection that doesn't exist.
    UnknownConnection { label: String },

    /// A connection uses a port the node kind doesn't have, or in the wrong direction.
    InvalidPort {
        connection: String,
        node: String,
        port: String,
    },

    /// Two connections attach to the same port.
    PortInUse {
        node: String,
        port: String,
        first: String,
        second: String,
    },

    /// A fluid port is left unconnected.
    UnconnectedPort { node: String, port: String },

    /// A set-point the node kind cannot carry.
    SetPointNotAllowed { node: String, what: &'static str },

    /// A set-point value is not finite or out of its physical range.
    InvalidSetPoint {
        owner: String,
        what: &'static str,
        value: f64,
    },

    /// A referential constraint points at a connection that doesn't exist.
    DanglingReference {
        connection: String,
        reference: String,
    },

    /// A referential constraint points at its own connection.
    SelfReference { connection: String },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::DuplicateNode { label } => write!(f, "Duplicate node label '{}'", label),
            GraphError::DuplicateConnection { label } => {
                write!(f, "Duplicate connection label '{}'", label)
            }
            GraphError::UnknownNode { label } => write!(f, "Node '{}' does not exist", label),
            GraphError::UnknownConnection { label } => {
                write!(f, "Connection '{}' does not exist", label)
            }
            GraphError::InvalidPort {
                connection,
                node,
                port,
            } => write!(
                f,
                "Connection '{}' uses invalid port '{}' on node '{}'",
                connection, port, node
            ),
            GraphError::PortInUse {
                node,
                port,
                first,
                second,
            } => write!(
                f,
                "Port {}:{} used by both '{}' and '{}'",
                node, port, first, second
            ),
            GraphError::UnconnectedPort { node, port } => {
                write!(f, "Port {}:{} is not connected", node, port)
            }
            GraphError::SetPointNotAllowed { node, what } => {
                write!(f, "Node '{}' cannot carry a {} set-point", node, what)
            }
            GraphError::InvalidSetPoint { owner, what, value } => {
                write!(f, "Invalid {} on '{}': {}", what, owner, value)
            }
            GraphError::DanglingReference {
                connection,
                reference,
            } => write!(
                f,
                "Connection '{}' references missing connection '{}'",
                connection, reference
            ),
            GraphError::SelfReference { connection } => {
                write!(f, "Connection '{}' references itself", connection)
            }
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for UlError {
    fn from(_: GraphError) -> Self {
        UlError::Invariant {
            what: "topology validation failed",
        }
    }
}
