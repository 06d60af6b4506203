//! Feed-forward neural network over a directed acyclic graph.
//!
//! Nodes are stored in an arena and addressed by [`NodeId`]. Names are only
//! looked up while building the graph or at the trainer boundary; the
//! per-tick evaluation walks a cached topological order by index.

use std::collections::{HashMap, VecDeque};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::chromosome::{Chromosome, Gene, random_weight};
use super::error::{EvoError, Result};
use super::params::NetworkParams;

/// Role of a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// Value is set externally each tick; never has incoming connections.
    Input,
    /// Computed from incoming connections.
    Hidden,
    /// Computed from incoming connections and read externally.
    Output,
}

/// Index of a node inside its network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in creation order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named node and its current activation.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    role: NodeRole,
    value: f32,
    // Indices into `Network::connections`.
    incoming: Vec<usize>,
    outgoing: Vec<usize>,
}

impl Node {
    /// Unique name of the node.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Role of the node.
    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// Current activation value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Number of incoming connections.
    pub fn in_degree(&self) -> usize {
        self.incoming.len()
    }
}

/// Weighted directed edge between two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Source node.
    pub from: NodeId,
    /// Target node.
    pub to: NodeId,
    /// Edge weight.
    pub weight: f32,
}

/// Feed-forward network with named nodes and weighted connections.
#[derive(Debug, Clone)]
pub struct Network {
    params: NetworkParams,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    lookup: HashMap<String, NodeId>,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    /// Non-input nodes in evaluation order; cleared on every topology change.
    order: Option<Vec<NodeId>>,
}

impl Network {
    /// Creates an empty network.
    pub fn new(params: NetworkParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            nodes: Vec::new(),
            connections: Vec::new(),
            lookup: HashMap::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            order: None,
        })
    }

    /// Builds a fully connected layered network.
    ///
    /// Connections are created input-major (every input to every hidden node),
    /// then every hidden node to every output. Without hidden nodes the inputs
    /// connect straight to the outputs. Weights are drawn from the configured range.
    pub fn layered<R: Rng + ?Sized>(
        params: NetworkParams,
        inputs: &[&str],
        hidden: &[&str],
        outputs: &[&str],
        rng: &mut R,
    ) -> Result<Self> {
        let mut network = Self::new(params)?;

        for name in inputs {
            network.create_input_node(*name)?;
        }
        for name in hidden {
            network.create_node(*name)?;
        }
        for name in outputs {
            network.create_output_node(*name)?;
        }

        if hidden.is_empty() {
            for from in inputs {
                for to in outputs {
                    network.create_connection(from, to, rng)?;
                }
            }
        } else {
            for from in inputs {
                for to in hidden {
                    network.create_connection(from, to, rng)?;
                }
            }
            for from in hidden {
                for to in outputs {
                    network.create_connection(from, to, rng)?;
                }
            }
        }

        debug!(
            inputs = inputs.len(),
            hidden = hidden.len(),
            outputs = outputs.len(),
            connections = network.connection_count(),
            "built layered network"
        );

        Ok(network)
    }

    /// Adds an input node.
    pub fn create_input_node(&mut self, name: impl Into<String>) -> Result<NodeId> {
        let id = self.add_node(name.into(), NodeRole::Input)?;
        self.inputs.push(id);
        Ok(id)
    }

    /// Adds a hidden node.
    pub fn create_node(&mut self, name: impl Into<String>) -> Result<NodeId> {
        self.add_node(name.into(), NodeRole::Hidden)
    }

    /// Adds an output node.
    pub fn create_output_node(&mut self, name: impl Into<String>) -> Result<NodeId> {
        let id = self.add_node(name.into(), NodeRole::Output)?;
        self.outputs.push(id);
        Ok(id)
    }

    fn add_node(&mut self, name: String, role: NodeRole) -> Result<NodeId> {
        if name.is_empty() || name.contains(',') || name.chars().any(char::is_whitespace) {
            return Err(EvoError::InvalidNodeName { name });
        }
        if self.lookup.contains_key(&name) {
            return Err(EvoError::DuplicateNode { name });
        }

        let id = NodeId(self.nodes.len());
        self.lookup.insert(name.clone(), id);
        self.nodes.push(Node {
            name,
            role,
            value: 0.0,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        });
        self.order = None;
        Ok(id)
    }

    /// Connects `from -> to` with a weight drawn uniformly from the configured range.
    ///
    /// Returns the connection's index, which is also its gene position.
    pub fn create_connection<R: Rng + ?Sized>(
        &mut self,
        from: &str,
        to: &str,
        rng: &mut R,
    ) -> Result<usize> {
        let weight = random_weight(rng, self.params.weight_min, self.params.weight_max);
        self.create_connection_with_weight(from, to, weight)
    }

    /// Connects `from -> to` with an explicit weight.
    pub fn create_connection_with_weight(
        &mut self,
        from: &str,
        to: &str,
        weight: f32,
    ) -> Result<usize> {
        let from_id = self.resolve(from)?;
        let to_id = self.resolve(to)?;

        let target_role = self.nodes[to_id.0].role;
        if target_role == NodeRole::Input {
            return Err(EvoError::WrongNodeKind {
                name: to.to_string(),
                expected: NodeRole::Hidden,
                found: NodeRole::Input,
            });
        }
        if from_id == to_id || self.reaches(to_id, from_id) {
            return Err(EvoError::Cycle {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let index = self.connections.len();
        self.connections.push(Connection {
            from: from_id,
            to: to_id,
            weight,
        });
        self.nodes[from_id.0].outgoing.push(index);
        self.nodes[to_id.0].incoming.push(index);
        self.order = None;
        Ok(index)
    }

    /// Returns `true` if `target` can be reached from `start` along connections.
    fn reaches(&self, start: NodeId, target: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if std::mem::replace(&mut visited[id.0], true) {
                continue;
            }
            stack.extend(
                self.nodes[id.0]
                    .outgoing
                    .iter()
                    .map(|&c| self.connections[c].to),
            );
        }
        false
    }

    fn resolve(&self, name: &str) -> Result<NodeId> {
        self.lookup
            .get(name)
            .copied()
            .ok_or_else(|| EvoError::UnknownNode {
                name: name.to_string(),
            })
    }

    fn resolve_role(&self, name: &str, role: NodeRole) -> Result<NodeId> {
        let id = self.resolve(name)?;
        let found = self.nodes[id.0].role;
        if found != role {
            return Err(EvoError::WrongNodeKind {
                name: name.to_string(),
                expected: role,
                found,
            });
        }
        Ok(id)
    }

    /// Sets the external signal of an input node.
    pub fn set_value(&mut self, name: &str, value: f32) -> Result<()> {
        let id = self.resolve_role(name, NodeRole::Input)?;
        self.nodes[id.0].value = value;
        Ok(())
    }

    /// Sets every input node, in input creation order.
    pub fn set_inputs(&mut self, values: &[f32]) -> Result<()> {
        if values.len() != self.inputs.len() {
            return Err(EvoError::InputArity {
                expected: self.inputs.len(),
                found: values.len(),
            });
        }
        for (id, &value) in self.inputs.iter().zip(values) {
            self.nodes[id.0].value = value;
        }
        Ok(())
    }

    /// Zeroes every node's activation.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.value = 0.0;
        }
    }

    /// Runs one forward pass over all non-input nodes.
    pub fn evaluate(&mut self) {
        if self.order.is_none() {
            self.order = Some(self.topological_order());
        }

        let Self {
            nodes,
            connections,
            order,
            params,
            ..
        } = self;
        let Some(order) = order.as_ref() else {
            return;
        };

        for &id in order {
            let sum: f32 = nodes[id.0]
                .incoming
                .iter()
                .map(|&c| {
                    let connection = &connections[c];
                    nodes[connection.from.0].value * connection.weight
                })
                .sum();
            nodes[id.0].value = activation(sum, params);
        }
    }

    /// Kahn's algorithm over in-degrees. Ties resolve in node creation order.
    fn topological_order(&self) -> Vec<NodeId> {
        let mut in_degree: Vec<usize> = self.nodes.iter().map(Node::in_degree).collect();
        let mut ready: VecDeque<NodeId> = (0..self.nodes.len())
            .filter(|&i| in_degree[i] == 0)
            .map(NodeId)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len() - self.inputs.len());

        while let Some(id) = ready.pop_front() {
            if self.nodes[id.0].role != NodeRole::Input {
                order.push(id);
            }
            for &c in &self.nodes[id.0].outgoing {
                let to = self.connections[c].to;
                in_degree[to.0] -= 1;
                if in_degree[to.0] == 0 {
                    ready.push_back(to);
                }
            }
        }

        debug!(nodes = order.len(), "computed evaluation order");
        order
    }

    /// Computed value of an output node.
    pub fn get_output(&self, name: &str) -> Result<f32> {
        let id = self.resolve_role(name, NodeRole::Output)?;
        Ok(self.nodes[id.0].value)
    }

    /// Values of every output node, in output creation order.
    pub fn outputs(&self) -> Vec<f32> {
        self.outputs.iter().map(|id| self.nodes[id.0].value).collect()
    }

    /// Snapshots every connection weight in creation order.
    pub fn gen_chromosome(&self) -> Chromosome {
        let mut chromosome = Chromosome::new();
        for connection in &self.connections {
            chromosome.add_gene(Gene::new(
                self.nodes[connection.from.0].name.as_str(),
                self.nodes[connection.to.0].name.as_str(),
                connection.weight,
            ));
        }
        chromosome
    }

    /// Assigns gene weights to connections by position.
    ///
    /// The gene count must equal the connection count and each gene must name
    /// the same endpoints as the connection at its position. On error no
    /// weight is changed.
    pub fn apply_chromosome(&mut self, chromosome: &Chromosome) -> Result<()> {
        let genes = chromosome.genes();
        if genes.len() != self.connections.len() {
            return Err(EvoError::TopologyMismatch {
                genes: genes.len(),
                connections: self.connections.len(),
            });
        }

        for (index, (gene, connection)) in genes.iter().zip(&self.connections).enumerate() {
            let from = &self.nodes[connection.from.0].name;
            let to = &self.nodes[connection.to.0].name;
            if gene.from != *from || gene.to != *to {
                return Err(EvoError::EdgeMismatch {
                    index,
                    gene: format!("{}->{}", gene.from, gene.to),
                    connection: format!("{from}->{to}"),
                });
            }
        }

        for (gene, connection) in genes.iter().zip(&mut self.connections) {
            connection.weight = gene.weight;
        }
        Ok(())
    }

    /// Looks up a node by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.lookup.get(name).copied()
    }

    /// Node at `id`.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All connections in creation order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of input nodes.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output nodes.
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Construction parameters.
    pub fn params(&self) -> &NetworkParams {
        &self.params
    }
}

/// Logistic sigmoid shifted by the threshold, range `(0, 1)`.
#[inline]
fn activation(sum: f32, params: &NetworkParams) -> f32 {
    1.0 / (1.0 + (-params.steepness * (sum - params.threshold)).exp())
}
