//! ul-graph: process topology layer.
//!
//! Provides:
//! - A closed catalog of process node kinds with capability sets
//! - Fluid and power connections with referential constraints
//! - An incremental builder that validates into an immutable `Topology`
//! - `TopologyDiff`, pure edits producing a new validated topology
//!
//! # Example
//!
//! ```
//! use ul_graph::{FlowConnection, NodeKind, PortRef, ProcessNode, TopologyBuilder};
//!
//! let mut builder = TopologyBuilder::new();
//! builder.add_node(ProcessNode::new("feed", NodeKind::Source));
//! builder.add_node(ProcessNode::new("drain", NodeKind::Sink));
//! builder.connect(FlowConnection::new(
//!     "c1",
//!     PortRef::new("feed", "out1"),
//!     PortRef::new("drain", "in1"),
//! ));
//! let topology = builder.build().unwrap();
//!
//! assert_eq!(topology.nodes().len(), 2);
//! assert!(topology.connection("c1").is_some());
//! ```

pub mod builder;
pub mod connection;
pub mod diff;
pub mod error;
pub mod node;
pub mod topology;
pub(crate) mod validate;

pub use builder::TopologyBuilder;
pub use connection::{
    FlowConnection, Guess, MassFlowSpec, PortRef, PowerConnection, Spec, TemperatureSpec,
};
pub use diff::{Edit, TopologyDiff};
pub use error::{GraphError, GraphResult};
pub use node::{EnergyPort, EnvironmentMedium, NodeKind, PipeGeometry, ProcessNode, SetPoints};
pub use topology::Topology;
