//! Immutable, validated process topology.

use std::collections::HashMap;
use ul_core::{ConnId, NodeId};

use crate::builder::TopologyBuilder;
use crate::connection::{FlowConnection, PowerConnection};
use crate::diff::TopologyDiff;
use crate::error::GraphResult;
use crate::node::ProcessNode;

/// A complete node + connection + power-connection graph for one solve attempt.
///
/// Produced only by [`TopologyBuilder::build`] or [`Topology::apply`], so every
/// value of this type has passed validation. Lookups are by label; the
/// compact ids index the internal tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub(crate) nodes: Vec<ProcessNode>,
    pub(crate) connections: Vec<FlowConnection>,
    pub(crate) power: Vec<PowerConnection>,
    pub(crate) node_index: HashMap<String, NodeId>,
    pub(crate) conn_index: HashMap<String, ConnId>,
}

impl Topology {
    pub fn nodes(&self) -> &[ProcessNode] {
        &self.nodes
    }

    pub fn connections(&self) -> &[FlowConnection] {
        &self.connections
    }

    pub fn power_connections(&self) -> &[PowerConnection] {
        &self.power
    }

    pub fn node_id(&self, label: &str) -> Option<NodeId> {
        self.node_index.get(label).copied()
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&ProcessNode> {
        self.nodes.get(id.slot())
    }

    pub fn node(&self, label: &str) -> Option<&ProcessNode> {
        self.node_id(label).and_then(|id| self.node_by_id(id))
    }

    pub fn connection_id(&self, label: &str) -> Option<ConnId> {
        self.conn_index.get(label).copied()
    }

    pub fn connection(&self, label: &str) -> Option<&FlowConnection> {
        self.connection_id(label)
            .and_then(|id| self.connections.get(id.slot()))
    }

    pub fn power_connection(&self, label: &str) -> Option<&PowerConnection> {
        self.power.iter().find(|p| p.label == label)
    }

    pub fn has_connection(&self, label: &str) -> bool {
        self.conn_index.contains_key(label) || self.power_connection(label).is_some()
    }

    /// Fluid connection leaving `node` through `port`.
    pub fn outlet(&self, node: &str, port: &str) -> Option<&FlowConnection> {
        self.connections
            .iter()
            .find(|c| c.from.node == node && c.from.port == port)
    }

    /// Fluid connection entering `node` through `port`.
    pub fn inlet(&self, node: &str, port: &str) -> Option<&FlowConnection> {
        self.connections
            .iter()
            .find(|c| c.to.node == node && c.to.port == port)
    }

    /// Reopen for editing. The result must be rebuilt to get a `Topology` back.
    pub fn to_builder(&self) -> TopologyBuilder {
        TopologyBuilder::from_parts(
            self.nodes.clone(),
            self.connections.clone(),
            self.power.clone(),
        )
    }

    /// Apply `diff` and revalidate, leaving `self` untouched.
    pub fn apply(&self, diff: &TopologyDiff) -> GraphResult<Topology> {
        let mut builder = self.to_builder();
        diff.apply_to(&mut builder)?;
        builder.build()
    }
}
