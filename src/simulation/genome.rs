//! Genome: an ordered list of growth rules plus default growth parameters.
//!
//! The genome acts like a tiny grammar. Each rule says "when allowed, attach
//! this template of nodes to that kind of anchor". The growth engine only ever
//! reads a genome; new genomes come out of [`super::mutation`].

use serde::{Deserialize, Serialize};

use super::body::NodeRole;
use super::error::GenomeError;

/// Which existing node a rule attaches its template to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorSelector {
    /// The core node.
    Root,
    /// Any node of the body.
    RandomNode,
    /// One of the actuator nodes.
    Actuator,
    /// One of the sensor nodes.
    Sensor,
    /// A node without children.
    Leaf,
}

impl AnchorSelector {
    /// Every selector, used when mutation draws a fresh anchor.
    pub const ALL: [AnchorSelector; 5] = [
        AnchorSelector::Root,
        AnchorSelector::RandomNode,
        AnchorSelector::Actuator,
        AnchorSelector::Sensor,
        AnchorSelector::Leaf,
    ];
}

/// One node of a rule's template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bud {
    /// Role of the node to create. Must not be [`NodeRole::Core`].
    pub role: NodeRole,
    /// Angle relative to the node it attaches to, in radians.
    pub angle: f32,
    /// Edge length; falls back to [`GrowthDefaults::length`].
    pub length: Option<f32>,
    /// Node radius; falls back to [`GrowthDefaults::radius`].
    pub radius: Option<f32>,
    /// Attach to the previous bud of the same template instead of the anchor.
    /// Ignored for the first bud.
    pub chain: bool,
}

impl Bud {
    /// A bud of the given role attached directly to the anchor.
    pub fn new(role: NodeRole, angle: f32) -> Self {
        Self {
            role,
            angle,
            length: None,
            radius: None,
            chain: false,
        }
    }

    /// Sets an explicit length.
    #[must_use]
    pub fn with_length(mut self, length: f32) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets an explicit radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Makes this bud attach to the previous one.
    #[must_use]
    pub fn chained(mut self) -> Self {
        self.chain = true;
        self
    }
}

/// Age and energy conditions a rule needs before it may fire.
///
/// Cooldown is tracked separately per organism.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// Earliest organism age at which the rule may fire.
    pub min_age: u64,
    /// Latest organism age at which the rule may fire.
    pub max_age: Option<u64>,
    /// Energy the organism must hold for the rule to be considered.
    pub min_energy: f32,
}

impl Trigger {
    /// Evaluates the predicate.
    pub fn holds(&self, age: u64, energy: f32) -> bool {
        age >= self.min_age && self.max_age.is_none_or(|max| age <= max) && energy >= self.min_energy
    }
}

/// A heritable growth instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRule {
    /// When the rule may fire.
    pub trigger: Trigger,
    /// Where the template attaches.
    pub anchor: AnchorSelector,
    /// Nodes to create, in order.
    pub template: Vec<Bud>,
    /// Minimum ticks between two firings on the same organism.
    pub cooldown: u64,
    /// Energy deducted from the organism on firing.
    pub cost: f32,
}

impl GrowthRule {
    /// A single-bud rule anchored at the root with no trigger conditions.
    pub fn bud(role: NodeRole, angle: f32, cost: f32, cooldown: u64) -> Self {
        Self {
            trigger: Trigger::default(),
            anchor: AnchorSelector::Root,
            template: vec![Bud::new(role, angle)],
            cooldown,
            cost,
        }
    }

    /// Appends a bud to the template.
    #[must_use]
    pub fn with_bud(mut self, bud: Bud) -> Self {
        self.template.push(bud);
        self
    }

    /// Replaces the anchor selector.
    #[must_use]
    pub fn anchored(mut self, anchor: AnchorSelector) -> Self {
        self.anchor = anchor;
        self
    }

    /// Replaces the trigger.
    #[must_use]
    pub fn triggered(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }
}

/// Parameters shared by all rules of a genome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthDefaults {
    /// Edge length for buds that do not set one.
    pub length: f32,
    /// Node radius for buds that do not set one.
    pub radius: f32,
    /// Energy an organism must hold before any growth is attempted.
    pub energy_threshold: f32,
    /// Minimum ticks between any two growths of one organism.
    pub interval: u64,
}

impl Default for GrowthDefaults {
    fn default() -> Self {
        Self {
            length: 40.0,
            radius: 6.0,
            energy_threshold: 0.0,
            interval: 0,
        }
    }
}

/// Ordered growth rules plus defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    /// Rules in genome order. Order feeds the scheduler but does not by itself
    /// decide which rule fires.
    pub rules: Vec<GrowthRule>,
    /// Fallback parameters and global growth gates.
    pub defaults: GrowthDefaults,
}

impl Genome {
    /// Creates a genome with neutral global gates.
    pub fn new(rules: Vec<GrowthRule>) -> Self {
        Self {
            rules,
            defaults: GrowthDefaults::default(),
        }
    }

    /// The fixed seed genome for generation zero: three actuator limbs spaced
    /// 120° apart and two sensors between them.
    pub fn starter() -> Self {
        let third = std::f32::consts::TAU / 3.0;
        let sixth = std::f32::consts::TAU / 6.0;

        let rule = |bud: Bud, cost: f32, cooldown: u64| GrowthRule {
            trigger: Trigger::default(),
            anchor: AnchorSelector::Root,
            template: vec![bud],
            cooldown,
            cost,
        };
        let limb = |angle: f32| {
            let bud = Bud::new(NodeRole::Actuator, angle)
                .with_length(40.0)
                .with_radius(8.0);
            rule(bud, 2.0, 10)
        };
        let eye = |angle: f32| {
            let bud = Bud::new(NodeRole::Sensor, angle)
                .with_length(28.0)
                .with_radius(5.0);
            rule(bud, 1.0, 8)
        };

        Self {
            rules: vec![limb(0.0), limb(third), limb(-third), eye(sixth), eye(-sixth)],
            defaults: GrowthDefaults {
                length: 40.0,
                radius: 6.0,
                energy_threshold: 8.0,
                interval: 10,
            },
        }
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the genome has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Looks up a rule by index.
    pub fn rule(&self, index: usize) -> Option<&GrowthRule> {
        self.rules.get(index)
    }

    /// Resolves a bud's length and radius against the defaults.
    pub fn resolve(&self, bud: &Bud) -> (f32, f32) {
        (
            bud.length.unwrap_or(self.defaults.length),
            bud.radius.unwrap_or(self.defaults.radius),
        )
    }

    /// Checks that the growth engine can interpret every rule.
    pub fn validate(&self) -> Result<(), GenomeError> {
        if self.rules.is_empty() {
            return Err(GenomeError::NoRules);
        }
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.template.is_empty() {
                return Err(GenomeError::EmptyTemplate(index));
            }
            if !(rule.cost.is_finite() && rule.cost >= 0.0) {
                return Err(GenomeError::InvalidCost {
                    index,
                    cost: rule.cost,
                });
            }
            for bud in &rule.template {
                if bud.role == NodeRole::Core {
                    return Err(GenomeError::CoreBud(index));
                }
                let (length, _) = self.resolve(bud);
                if !(length.is_finite() && length > 0.0) {
                    return Err(GenomeError::InvalidLength { index, length });
                }
            }
        }
        Ok(())
    }
}
