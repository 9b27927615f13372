//! Incremental topology builder.

use std::collections::HashMap;
use ul_core::{ConnId, NodeId};

use crate::connection::{FlowConnection, PowerConnection};
use crate::error::{GraphError, GraphResult};
use crate::node::ProcessNode;
use crate::topology::Topology;
use crate::validate;

/// Builder for constructing a topology incrementally.
///
/// Add nodes and connections in any order, then call `build()` to validate
/// and freeze everything into an immutable [`Topology`].
#[derive(Debug, Default, Clone)]
pub struct TopologyBuilder {
    nodes: Vec<ProcessNode>,
    connections: Vec<FlowConnection>,
    power: Vec<PowerConnection>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        nodes: Vec<ProcessNode>,
        connections: Vec<FlowConnection>,
        power: Vec<PowerConnection>,
    ) -> Self {
        Self {
            nodes,
            connections,
            power,
        }
    }

    /// Add a node and return its id.
    pub fn add_node(&mut self, node: ProcessNode) -> NodeId {
        let id = NodeId::from_index(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Add a fluid connection and return its id.
    pub fn connect(&mut self, connection: FlowConnection) -> ConnId {
        let id = ConnId::from_index(self.connections.len() as u32);
        self.connections.push(connection);
        id
    }

    pub fn connect_power(&mut self, connection: PowerConnection) {
        self.power.push(connection);
    }

    pub fn node_mut(&mut self, label: &str) -> GraphResult<&mut ProcessNode> {
        self.nodes
            .iter_mut()
            .find(|n| n.label == label)
            .ok_or_else(|| GraphError::UnknownNode {
                label: label.to_string(),
            })
    }

    pub fn connection_mut(&mut self, label: &str) -> GraphResult<&mut FlowConnection> {
        self.connections
            .iter_mut()
            .find(|c| c.label == label)
            .ok_or_else(|| GraphError::UnknownConnection {
                label: label.to_string(),
            })
    }

    /// Remove a fluid or power connection by label.
    pub fn remove_connection(&mut self, label: &str) -> GraphResult<()> {
        let before = self.connections.len() + self.power.len();
        self.connections.retain(|c| c.label != label);
        self.power.retain(|p| p.label != label);
        if self.connections.len() + self.power.len() == before {
            return Err(GraphError::UnknownConnection {
                label: label.to_string(),
            });
        }
        Ok(())
    }

    /// Validate and freeze.
    pub fn build(self) -> GraphResult<Topology> {
        validate::validate_nodes(&self.nodes)?;
        validate::validate_references(&self.connections)?;
        validate::validate_connections(&self.nodes, &self.connections, &self.power)?;

        let node_index: HashMap<String, NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.label.clone(), NodeId::from_index(i as u32)))
            .collect();
        let conn_index: HashMap<String, ConnId> = self
            .connections
            .iter()
            .enumerate()
            .map(|(i, c)| (c.label.clone(), ConnId::from_index(i as u32)))
            .collect();

        Ok(Topology {
            nodes: self.nodes,
            connections: self.connections,
            power: self.power,
            node_index,
            conn_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::PortRef;
    use crate::node::NodeKind;

    fn source_to_sink() -> TopologyBuilder {
        let mut builder = TopologyBuilder::new();
        builder.add_node(ProcessNode::new("src", NodeKind::Source));
        builder.add_node(ProcessNode::new("snk", NodeKind::Sink));
        builder.connect(FlowConnection::new(
            "c1",
            PortRef::new("src", "out1"),
            PortRef::new("snk", "in1"),
        ));
        builder
    }

    #[test]
    fn builder_assigns_sequential_ids() {
        let mut builder = TopologyBuilder::new();
        let a = builder.add_node(ProcessNode::new("a", NodeKind::Source));
        let b = builder.add_node(ProcessNode::new("b", NodeKind::Sink));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
    }

    #[test]
    fn builder_build_simple() {
        let topo = source_to_sink().build().unwrap();
        assert_eq!(topo.nodes().len(), 2);
        assert_eq!(topo.connections().len(), 1);
        let id = topo.node_id("snk").unwrap();
        assert_eq!(topo.node_by_id(id).unwrap().kind, NodeKind::Sink);
        assert_eq!(topo.inlet("snk", "in1").unwrap().label, "c1");
        assert_eq!(topo.outlet("src", "out1").unwrap().label, "c1");
    }

    #[test]
    fn remove_unknown_connection_fails() {
        let mut builder = source_to_sink();
        assert!(matches!(
            builder.remove_connection("nope"),
            Err(GraphError::UnknownConnection { .. })
        ));
        builder.remove_connection("c1").unwrap();
        // now both ports dangle
        assert!(matches!(
            builder.build(),
            Err(GraphError::UnconnectedPort { .. })
        ));
    }
}
