//! Brain topology and parameters, bound to body nodes.
//!
//! The brain is a sparse graph of sensor, hidden and motor neurons. This module
//! only owns its structure and heritable parameters (synapse weights, hidden
//! biases) and the binding between motor/sensor neurons and body node ids.
//! Evaluating activations is left to the controller runtime.

use std::collections::BTreeMap;

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{BodyPorts, NodeId};
use super::mutation::{BrainMutation, gauss};

/// Identifier of a neuron, unique within one brain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NeuronId(pub u32);

/// Neuron category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeuronKind {
    /// Value set from outside each step.
    Sensor,
    /// Internal mixer neuron.
    Hidden,
    /// Drives an actuator node.
    Motor,
}

/// A single neuron.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    /// Identifier.
    pub id: NeuronId,
    /// Category.
    pub kind: NeuronKind,
    /// Bias added before activation.
    pub bias: f32,
    /// Body node this neuron is attached to, if any.
    pub node: Option<NodeId>,
    /// Lookup name; empty for anonymous neurons.
    pub name: String,
}

/// Weighted directed connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synapse {
    /// Source neuron.
    pub src: NeuronId,
    /// Destination neuron.
    pub dst: NeuronId,
    /// Weight.
    pub weight: f32,
}

/// Global sensors every starter brain carries.
pub const STARTER_SENSORS: [&str; 6] = [
    "energy", "osc_sin", "osc_cos", "food_sin", "food_cos", "food_dist",
];

/// Neural controller structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Brain {
    neurons: Vec<Neuron>,
    synapses: Vec<Synapse>,
    named: BTreeMap<String, NeuronId>,
    actuator_motors: BTreeMap<NodeId, NeuronId>,
    next_id: u32,
}

impl Brain {
    /// Creates an empty brain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the starter controller.
    ///
    /// Six global sensors feed two hidden mixer neurons `h1`/`h2`; each
    /// actuator gets a motor driven by the mixers in alternating phase so a
    /// symmetric body turns towards food. Sensor nodes get one sensor neuron
    /// each.
    pub fn starter<R: Rng + ?Sized>(ports: &BodyPorts, rng: &mut R) -> Self {
        let mut brain = Self::new();

        let [_, _, _, food_sin, food_cos, food_dist] =
            STARTER_SENSORS.map(|name| brain.add_neuron(NeuronKind::Sensor, 0.0, None, name));
        let h1 = brain.add_neuron(NeuronKind::Hidden, rng.random_range(-0.2..0.2), None, "h1");
        let h2 = brain.add_neuron(NeuronKind::Hidden, rng.random_range(-0.2..0.2), None, "h2");

        // steer towards food, stronger when close
        brain.add_synapse(food_sin, h1, 1.4);
        brain.add_synapse(food_sin, h2, -1.4);
        brain.add_synapse(food_dist, h1, 0.8);
        brain.add_synapse(food_dist, h2, 0.8);
        brain.add_synapse(food_cos, h1, 0.3);
        brain.add_synapse(food_cos, h2, 0.3);

        for (idx, &node) in ports.actuators.iter().enumerate() {
            let motor = brain.add_neuron(NeuronKind::Motor, 0.0, Some(node), &motor_name(node));
            brain.actuator_motors.insert(node, motor);
            let phase = if idx % 2 == 0 { 1.0 } else { -1.0 };
            brain.add_synapse(h1, motor, 1.2 * phase);
            brain.add_synapse(h2, motor, -0.8 * phase);
        }
        for &node in &ports.sensors {
            brain.ensure_sensor(&sensor_name(node), Some(node));
        }
        brain
    }

    /// Adds a neuron and returns its id. A non-empty name is registered for lookup.
    pub fn add_neuron(
        &mut self,
        kind: NeuronKind,
        bias: f32,
        node: Option<NodeId>,
        name: &str,
    ) -> NeuronId {
        let id = NeuronId(self.next_id);
        self.next_id += 1;
        self.neurons.push(Neuron {
            id,
            kind,
            bias,
            node,
            name: name.to_owned(),
        });
        if !name.is_empty() {
            self.named.insert(name.to_owned(), id);
        }
        id
    }

    /// Adds a synapse.
    pub fn add_synapse(&mut self, src: NeuronId, dst: NeuronId, weight: f32) {
        self.synapses.push(Synapse { src, dst, weight });
    }

    /// Returns the sensor neuron called `name`, creating it if needed.
    pub fn ensure_sensor(&mut self, name: &str, node: Option<NodeId>) -> NeuronId {
        if let Some(&id) = self.named.get(name) {
            return id;
        }
        self.add_neuron(NeuronKind::Sensor, 0.0, node, name)
    }

    /// Returns the motor neuron for an actuator node, creating and wiring one
    /// if needed.
    ///
    /// New motors are wired to the hidden mixers (alternating phase) or,
    /// failing that, to the oscillator sensors.
    pub fn ensure_motor_for_actuator(&mut self, node: NodeId) -> NeuronId {
        if let Some(&id) = self.actuator_motors.get(&node) {
            return id;
        }
        if let Some(existing) = self
            .neurons
            .iter()
            .find(|n| n.kind == NeuronKind::Motor && n.node == Some(node))
        {
            let id = existing.id;
            self.actuator_motors.insert(node, id);
            return id;
        }

        let idx = self.actuator_motors.len();
        let motor = self.add_neuron(NeuronKind::Motor, 0.0, Some(node), &motor_name(node));
        self.actuator_motors.insert(node, motor);

        let phase = if idx % 2 == 0 { 1.0 } else { -1.0 };
        let hidden = (self.named.get("h1").copied(), self.named.get("h2").copied());
        let osc = (
            self.named.get("osc_sin").copied(),
            self.named.get("osc_cos").copied(),
        );
        if let (Some(h1), Some(h2)) = hidden {
            self.add_synapse(h1, motor, phase);
            self.add_synapse(h2, motor, -0.8 * phase);
        } else if let (Some(sin), Some(cos)) = osc {
            self.add_synapse(sin, motor, phase);
            self.add_synapse(cos, motor, 0.5);
        }
        motor
    }

    /// Attaches motor and sensor neurons for every port of a body.
    ///
    /// Existing bindings are kept; nothing is removed for nodes that no longer
    /// exist.
    pub fn bind(&mut self, ports: &BodyPorts) {
        for &node in &ports.actuators {
            self.ensure_motor_for_actuator(node);
        }
        for &node in &ports.sensors {
            self.ensure_sensor(&sensor_name(node), Some(node));
        }
    }

    /// Motor neuron bound to an actuator node.
    pub fn motor_for(&self, node: NodeId) -> Option<NeuronId> {
        self.actuator_motors.get(&node).copied()
    }

    /// Actuator nodes with a bound motor.
    pub fn bound_actuators(&self) -> Vec<NodeId> {
        self.actuator_motors.keys().copied().collect()
    }

    /// Looks up a neuron by name.
    pub fn named(&self, name: &str) -> Option<NeuronId> {
        self.named.get(name).copied()
    }

    /// All neurons.
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// All synapses.
    pub fn synapses(&self) -> &[Synapse] {
        &self.synapses
    }

    /// Perturbs synapse weights and hidden biases in place.
    ///
    /// Each weight mutates with probability `p_weight`, each hidden bias with
    /// probability `p_bias`, by Gaussian noise of standard deviation `sigma`.
    /// With both probabilities at zero nothing changes.
    pub fn mutate<R: Rng + ?Sized>(&mut self, params: &BrainMutation, rng: &mut R) {
        if params.is_noop() {
            return;
        }
        for synapse in &mut self.synapses {
            if rng.random::<f32>() < params.p_weight {
                synapse.weight += gauss(rng, params.sigma);
            }
        }
        for neuron in &mut self.neurons {
            if neuron.kind == NeuronKind::Hidden && rng.random::<f32>() < params.p_bias {
                neuron.bias += gauss(rng, params.sigma);
            }
        }
    }

    /// Returns `true` if both brains have identical neurons and wiring,
    /// ignoring parameter values.
    pub fn same_topology(&self, other: &Brain) -> bool {
        self.neurons.len() == other.neurons.len()
            && self.synapses.len() == other.synapses.len()
            && self
                .neurons
                .iter()
                .zip(&other.neurons)
                .all(|(a, b)| a.id == b.id && a.kind == b.kind && a.node == b.node)
            && self
                .synapses
                .iter()
                .zip(&other.synapses)
                .all(|(a, b)| a.src == b.src && a.dst == b.dst)
    }

    /// Creates a brain by weighted averaging two parents.
    ///
    /// `weight1` is the weight for `parent1`. Parents with different
    /// topologies cannot be blended; the result is then a clone of `parent1`.
    pub fn crossover(parent1: &Brain, parent2: &Brain, weight1: f32) -> Self {
        if !parent1.same_topology(parent2) {
            return parent1.clone();
        }
        let weight2 = 1.0 - weight1;
        let mut child = parent1.clone();
        for (s, other) in child.synapses.iter_mut().zip(&parent2.synapses) {
            s.weight = s.weight * weight1 + other.weight * weight2;
        }
        for (n, other) in child.neurons.iter_mut().zip(&parent2.neurons) {
            n.bias = n.bias * weight1 + other.bias * weight2;
        }
        child
    }

    /// Flattens all synapse weights followed by all biases.
    pub fn parameters(&self) -> Array1<f32> {
        self.synapses
            .iter()
            .map(|s| s.weight)
            .chain(self.neurons.iter().map(|n| n.bias))
            .collect()
    }

    /// Euclidean distance between the parameters of two brains.
    ///
    /// Brains with different topologies are infinitely far apart.
    pub fn distance(brain1: &Brain, brain2: &Brain) -> f32 {
        if !brain1.same_topology(brain2) {
            return f32::MAX;
        }
        let diff = brain1.parameters() - brain2.parameters();
        diff.dot(&diff).sqrt()
    }
}

fn motor_name(node: NodeId) -> String {
    format!("motor_{}", node.0)
}

fn sensor_name(node: NodeId) -> String {
    format!("sensor_{}", node.0)
}
