//! Wants graph
//!
//! One node per trader, one edge `A → B` whenever A wants the item B owns.
//! Several traders may own the same category, so a trader can have many
//! outgoing edges.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::debug;

use super::trader::{Trader, TraderId};

pub struct WantGraph<'a> {
    pub graph: DiGraph<&'a Trader, ()>,
    id_to_node: HashMap<&'a TraderId, NodeIndex>,
    /// Nodes in input order
    order: Vec<NodeIndex>,
}

impl<'a> WantGraph<'a> {
    pub fn from_traders(traders: &'a [Trader]) -> Self {
        let mut graph = DiGraph::with_capacity(traders.len(), traders.len());
        let mut id_to_node = HashMap::with_capacity(traders.len());
        let mut order = Vec::with_capacity(traders.len());

        for trader in traders {
            let node = graph.add_node(trader);
            id_to_node.insert(trader.id(), node);
            order.push(node);
        }

        for &a in &order {
            for &b in &order {
                let (wanter, owner) = (graph[a], graph[b]);
                if wanter.id() != owner.id() && wanter.wants_item() == owner.has_item() {
                    graph.add_edge(a, b, ());
                }
            }
        }

        debug!(
            "Wants graph built: {} Nodes, {} Edges",
            graph.node_count(),
            graph.edge_count()
        );

        Self { graph, id_to_node, order }
    }

    pub fn get_node(&self, id: &TraderId) -> Option<NodeIndex> {
        self.id_to_node.get(id).copied()
    }

    pub fn trader(&self, node: NodeIndex) -> &'a Trader {
        self.graph[node]
    }

    /// Nodes in the order their traders were supplied
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.order
    }

    /// Traders owning what `node` wants, in input order.
    pub fn wanted_from(&self, node: NodeIndex) -> Vec<NodeIndex> {
        // petgraph lists neighbors newest edge first
        let mut targets: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        targets.reverse();
        targets
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
