//! Body graph: the node/edge structure that makes up an organism's physical form.
//!
//! Nodes are addressed by stable [`NodeId`]s that are never reused within one
//! graph, so external collaborators (the brain, a renderer) can hold on to them
//! across growth ticks. Edges always point from a parent node to a child node and
//! the graph is a tree rooted at the single core node.

use std::collections::BTreeSet;
use std::fmt;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::BodyError;

/// Identifier of a node, unique within one body graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Functional role of a body node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// The root of the body. Exactly one per graph.
    Core,
    /// Passive structural segment.
    Segment,
    /// Node driven by a motor output of the brain.
    Actuator,
    /// Node feeding a sensor input of the brain.
    Sensor,
}

impl NodeRole {
    /// Core and segment nodes carry structure only.
    pub fn is_structural(self) -> bool {
        matches!(self, NodeRole::Core | NodeRole::Segment)
    }
}

/// A single body node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Stable identifier.
    pub id: NodeId,
    /// Role tag.
    pub role: NodeRole,
    /// Position in 2D space, derived from the parent edge at creation.
    pub pos: Array1<f32>,
    /// Absolute orientation in radians.
    pub angle: f32,
    /// Collision/render radius.
    pub radius: f32,
    /// Per-node energy store.
    ///
    /// Carried for upkeep logic that does not exist yet; nothing drains or
    /// consumes it. The organism's spendable energy is the single pool on
    /// [`super::organism::Organism`].
    pub energy: f32,
    /// Tick at which the node was created.
    pub created_at: u64,
}

/// Connection from a parent node to a child node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Parent (closer to the core).
    pub parent: NodeId,
    /// Child.
    pub child: NodeId,
    /// Rest length.
    pub length: f32,
    /// Angle of the child relative to the parent's orientation.
    pub angle_offset: f32,
    /// Edge thickness, for rendering and physics.
    pub radius: f32,
}

/// Geometry of a node to be budded from an existing one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudSpec {
    /// Role of the new node.
    pub role: NodeRole,
    /// Angle relative to the parent's orientation.
    pub angle_offset: f32,
    /// Edge length from the parent.
    pub length: f32,
    /// Radius of the new node (also used for the edge).
    pub radius: f32,
}

/// Actuator and sensor node identifiers exposed to the brain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyPorts {
    /// Actuator nodes, in creation order.
    pub actuators: Vec<NodeId>,
    /// Sensor nodes, in creation order.
    pub sensors: Vec<NodeId>,
}

/// Default radius of the core node.
pub const CORE_RADIUS: f32 = 12.0;

/// Energy each node starts with.
pub const NODE_ENERGY: f32 = 1.0;

/// A tree of nodes rooted at a single core node.
///
/// Nodes are kept in creation order, which is also id order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    next_id: u32,
}

impl BodyGraph {
    /// Creates a body consisting of just the core node at `pos`.
    pub fn new(pos: Array1<f32>) -> Self {
        let core = Node {
            id: NodeId(0),
            role: NodeRole::Core,
            pos,
            angle: 0.0,
            radius: CORE_RADIUS,
            energy: NODE_ENERGY,
            created_at: 0,
        };
        Self {
            nodes: vec![core],
            edges: Vec::new(),
            next_id: 1,
        }
    }

    /// Creates a body with its core at the origin.
    pub fn at_origin() -> Self {
        Self::new(Array1::zeros(2))
    }

    /// Returns the core node id.
    pub fn root(&self) -> Result<NodeId, BodyError> {
        self.nodes
            .iter()
            .find(|n| n.role == NodeRole::Core)
            .map(|n| n.id)
            .ok_or(BodyError::MissingCore)
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        // ids are assigned in increasing order and nodes stay sorted
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|idx| &self.nodes[idx])
    }

    /// Returns `true` if the node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Role of a node, if it exists.
    pub fn role(&self, id: NodeId) -> Option<NodeRole> {
        self.node(id).map(|n| n.role)
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in creation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes, core included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Ids of all nodes with the given role.
    pub fn ids_with_role(&self, role: NodeRole) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.role == role)
            .map(|n| n.id)
            .collect()
    }

    /// Actuator node ids in creation order.
    pub fn actuator_ids(&self) -> Vec<NodeId> {
        self.ids_with_role(NodeRole::Actuator)
    }

    /// Sensor node ids in creation order.
    pub fn sensor_ids(&self) -> Vec<NodeId> {
        self.ids_with_role(NodeRole::Sensor)
    }

    /// Snapshot of the identifiers the brain binds to.
    pub fn ports(&self) -> BodyPorts {
        BodyPorts {
            actuators: self.actuator_ids(),
            sensors: self.sensor_ids(),
        }
    }

    /// Direct children of a node.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.parent == id)
            .map(|e| e.child)
    }

    /// Nodes without children. A lone core counts as a leaf.
    pub fn leaves(&self) -> Vec<NodeId> {
        let parents: BTreeSet<NodeId> = self.edges.iter().map(|e| e.parent).collect();
        self.nodes
            .iter()
            .map(|n| n.id)
            .filter(|id| !parents.contains(id))
            .collect()
    }

    /// Adds a new node connected to `parent`, placing it at the parent's
    /// position plus `length` along `parent.angle + angle_offset`.
    ///
    /// Node and edge are inserted together or not at all.
    pub fn bud(&mut self, parent: NodeId, spec: BudSpec, tick: u64) -> Result<NodeId, BodyError> {
        if !(spec.length.is_finite() && spec.length > 0.0) {
            return Err(BodyError::InvalidLength(spec.length));
        }
        if spec.role == NodeRole::Core {
            return Err(BodyError::SecondCore);
        }
        let anchor = self.node(parent).ok_or(BodyError::UnknownNode(parent))?;

        let angle = anchor.angle + spec.angle_offset;
        let offset = Array1::from_vec(vec![angle.cos() * spec.length, angle.sin() * spec.length]);
        let pos = &anchor.pos + &offset;

        let id = NodeId(self.next_id);
        self.next_id += 1;

        self.nodes.push(Node {
            id,
            role: spec.role,
            pos,
            angle,
            radius: spec.radius,
            energy: NODE_ENERGY,
            created_at: tick,
        });
        self.edges.push(Edge {
            parent,
            child: id,
            length: spec.length,
            angle_offset: spec.angle_offset,
            radius: spec.radius,
        });
        Ok(id)
    }

    /// Removes a node together with every node below it, and all edges that
    /// touch any removed node. The core cannot be removed.
    ///
    /// Returns the removed ids in ascending order.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<Vec<NodeId>, BodyError> {
        match self.role(id) {
            None => return Err(BodyError::UnknownNode(id)),
            Some(NodeRole::Core) => return Err(BodyError::CoreRemoval),
            Some(_) => {}
        }

        let mut doomed = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if doomed.insert(current) {
                stack.extend(self.children(current));
            }
        }

        self.nodes.retain(|n| !doomed.contains(&n.id));
        self.edges
            .retain(|e| !doomed.contains(&e.parent) && !doomed.contains(&e.child));
        Ok(doomed.into_iter().collect())
    }

    /// Checks structural invariants: exactly one core and no edge referencing
    /// a missing node.
    pub fn validate(&self) -> Result<(), BodyError> {
        let cores = self
            .nodes
            .iter()
            .filter(|n| n.role == NodeRole::Core)
            .count();
        match cores {
            0 => return Err(BodyError::MissingCore),
            1 => {}
            _ => return Err(BodyError::SecondCore),
        }
        for edge in &self.edges {
            for end in [edge.parent, edge.child] {
                if !self.contains(end) {
                    return Err(BodyError::DanglingEdge {
                        parent: edge.parent,
                        child: edge.child,
                        missing: end,
                    });
                }
            }
        }
        Ok(())
    }

    /// Mean position of all nodes.
    pub fn center_of_mass(&self) -> Array1<f32> {
        let mut sum = Array1::zeros(2);
        for node in &self.nodes {
            sum += &node.pos;
        }
        sum / self.nodes.len().max(1) as f32
    }

    /// Largest distance of any node from the core.
    pub fn reach(&self) -> f32 {
        let Some(core) = self.nodes.iter().find(|n| n.role == NodeRole::Core) else {
            return 0.0;
        };
        self.nodes
            .iter()
            .map(|n| {
                let d = &n.pos - &core.pos;
                d.dot(&d).sqrt()
            })
            .fold(0.0, f32::max)
    }

    /// Sum of the per-node energy fields.
    pub fn total_node_energy(&self) -> f32 {
        self.nodes.iter().map(|n| n.energy).sum()
    }

    /// Shifts every node by `delta`.
    pub fn translate(&mut self, delta: &Array1<f32>) {
        for node in &mut self.nodes {
            node.pos += delta;
        }
    }
}

impl Default for BodyGraph {
    fn default() -> Self {
        Self::at_origin()
    }
}
