#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use morphogen::simulation::anchor::AnchorMode;
use morphogen::simulation::body::{NodeId, NodeRole};
use morphogen::simulation::error::{GenomeError, GrowthError};
use morphogen::simulation::genome::{AnchorSelector, Bud, Genome, GrowthRule, Trigger};
use morphogen::simulation::growth::{GrowthEngine, GrowthOutcome, IdleReason};
use morphogen::simulation::organism::Organism;
use morphogen::simulation::schedule::{SchedulePolicy, selection_key};

fn single_rule(cost: f32, cooldown: u64) -> Genome {
    Genome::new(vec![GrowthRule::bud(NodeRole::Segment, 0.5, cost, cooldown)])
}

fn positions(organism: &Organism) -> Vec<(NodeId, NodeRole, f32, f32)> {
    organism
        .body
        .nodes()
        .iter()
        .map(|n| (n.id, n.role, n.pos[0], n.pos[1]))
        .collect()
}

#[test]
fn test_cooldown_limits_firings() {
    let engine = GrowthEngine::default();
    let mut organism = Organism::new(0, single_rule(10.0, 5), 100.0);

    let mut fired_at = Vec::new();
    for _ in 0..20 {
        if organism.step(&engine).unwrap().grew() {
            fired_at.push(organism.age);
        }
    }

    assert_eq!(fired_at, vec![1, 6, 11, 16]);
    assert_eq!(organism.energy(), 60.0);
    assert_eq!(organism.body.node_count(), 5);
    assert_eq!(organism.growth.firings(), 4);
    assert_eq!(organism.growth.last_fired(0), Some(16));
}

#[test]
fn test_cooling_rule_leaves_tick_idle() {
    let engine = GrowthEngine::default();
    let mut organism = Organism::new(0, single_rule(1.0, 3), 10.0);

    assert!(organism.step(&engine).unwrap().grew());
    assert_eq!(
        organism.step(&engine).unwrap(),
        GrowthOutcome::Idle(IdleReason::NoValidRule)
    );
}

#[test]
fn test_energy_never_goes_negative() {
    let engine = GrowthEngine::default();
    let mut organism = Organism::new(0, single_rule(3.0, 0), 10.0);

    let grown = organism.grow_for(&engine, 10).unwrap();

    assert_eq!(grown, 3);
    assert_eq!(organism.energy(), 1.0);
    assert!(organism.energy() >= 0.0);
    assert_eq!(organism.body.node_count(), 4);
}

#[test]
fn test_spent_energy_matches_rule_costs() {
    let engine = GrowthEngine::new(SchedulePolicy::DeterministicKey, AnchorMode::PerRule);
    let mut organism = Organism::new(0, Genome::starter(), 30.0);

    let mut spent = 0.0;
    for _ in 0..200 {
        let before = organism.energy();
        let outcome = organism.step(&engine).unwrap();
        assert!((before - organism.energy() - outcome.cost()).abs() < 1e-5);
        spent += outcome.cost();
    }

    assert!((30.0 - organism.energy() - spent).abs() < 1e-4);
    assert!(organism.energy() >= 0.0);
}

#[test]
fn test_global_energy_threshold_blocks_growth() {
    let engine = GrowthEngine::default();
    let mut genome = single_rule(1.0, 0);
    genome.defaults.energy_threshold = 50.0;
    let mut organism = Organism::new(0, genome, 10.0);

    assert_eq!(
        organism.step(&engine).unwrap(),
        GrowthOutcome::Idle(IdleReason::BelowEnergyThreshold)
    );
    assert_eq!(organism.body.node_count(), 1);
    assert_eq!(organism.energy(), 10.0);
}

#[test]
fn test_global_interval_spaces_growth() {
    let engine = GrowthEngine::default();
    let mut genome = single_rule(0.0, 0);
    genome.defaults.interval = 3;
    let mut organism = Organism::new(0, genome, 1.0);

    let outcomes: Vec<GrowthOutcome> = (0..4).map(|_| organism.step(&engine).unwrap()).collect();

    assert!(outcomes[0].grew());
    assert_eq!(outcomes[1], GrowthOutcome::Idle(IdleReason::IntervalActive));
    assert_eq!(outcomes[2], GrowthOutcome::Idle(IdleReason::IntervalActive));
    assert!(outcomes[3].grew());
}

#[test]
fn test_trigger_gates_on_age() {
    let engine = GrowthEngine::default();
    let rule = GrowthRule::bud(NodeRole::Sensor, 0.0, 1.0, 100).triggered(Trigger {
        min_age: 5,
        max_age: Some(7),
        min_energy: 0.0,
    });
    let mut organism = Organism::new(0, Genome::new(vec![rule]), 10.0);

    let mut fired_at = Vec::new();
    for _ in 0..10 {
        if organism.step(&engine).unwrap().grew() {
            fired_at.push(organism.age);
        }
    }

    assert_eq!(fired_at, vec![5]);
}

#[test]
fn test_empty_genome_is_an_error() {
    let engine = GrowthEngine::default();
    let mut organism = Organism::new(0, Genome::new(Vec::new()), 10.0);

    assert_eq!(
        organism.step(&engine),
        Err(GrowthError::Genome(GenomeError::NoRules))
    );
}

#[test]
fn test_growth_is_deterministic() {
    for schedule in [SchedulePolicy::DeterministicKey, SchedulePolicy::WeightedRecency] {
        let engine = GrowthEngine::new(schedule, AnchorMode::PerRule);
        let mut a = Organism::new(0, Genome::starter(), 40.0);
        let mut b = Organism::new(1, Genome::starter(), 40.0);

        a.grow_for(&engine, 150).unwrap();
        b.grow_for(&engine, 150).unwrap();

        assert_eq!(positions(&a), positions(&b));
        assert_eq!(a.energy(), b.energy());
        assert_eq!(a.growth, b.growth);
    }
}

#[test]
fn test_selection_key_is_stable_and_spread() {
    assert_eq!(selection_key(17, 2), selection_key(17, 2));
    assert_ne!(selection_key(17, 2), selection_key(17, 3));
    assert_ne!(selection_key(17, 2), selection_key(18, 2));
}

#[test]
fn test_core_only_anchors_everything_at_root() {
    let genome = Genome::new(vec![
        GrowthRule::bud(NodeRole::Actuator, 0.0, 0.0, 0),
        GrowthRule::bud(NodeRole::Segment, 1.0, 0.0, 0).anchored(AnchorSelector::Leaf),
    ]);
    let engine = GrowthEngine::new(SchedulePolicy::DeterministicKey, AnchorMode::CoreOnly);
    let mut organism = Organism::new(0, genome, 10.0);

    organism.grow_for(&engine, 20).unwrap();
    let root = organism.body.root().unwrap();

    assert!(organism.body.node_count() > 1);
    assert!(organism.body.edges().iter().all(|e| e.parent == root));
}

#[test]
fn test_per_rule_anchors_follow_selectors() {
    let genome = Genome::new(vec![
        GrowthRule::bud(NodeRole::Actuator, 0.0, 0.0, 0),
        GrowthRule::bud(NodeRole::Segment, 0.4, 0.0, 0).anchored(AnchorSelector::Actuator),
    ]);
    let engine = GrowthEngine::new(SchedulePolicy::DeterministicKey, AnchorMode::PerRule);
    let mut organism = Organism::new(0, genome, 10.0);

    organism.grow_for(&engine, 40).unwrap();
    let body = &organism.body;

    assert!(body.validate().is_ok());
    for edge in body.edges() {
        match body.role(edge.child) {
            Some(NodeRole::Segment) => assert_eq!(body.role(edge.parent), Some(NodeRole::Actuator)),
            Some(NodeRole::Actuator) => assert_eq!(body.role(edge.parent), Some(NodeRole::Core)),
            other => panic!("unexpected child role {other:?}"),
        }
    }
}

#[test]
fn test_unanchorable_rule_never_fires() {
    let genome = Genome::new(vec![
        GrowthRule::bud(NodeRole::Segment, 0.0, 0.0, 0).anchored(AnchorSelector::Sensor),
    ]);
    let engine = GrowthEngine::new(SchedulePolicy::DeterministicKey, AnchorMode::PerRule);
    let mut organism = Organism::new(0, genome, 10.0);

    assert_eq!(
        organism.step(&engine).unwrap(),
        GrowthOutcome::Idle(IdleReason::NoValidRule)
    );
    assert_eq!(organism.body.node_count(), 1);
}

#[test]
fn test_chained_template_builds_a_limb() {
    let rule = GrowthRule::bud(NodeRole::Segment, 0.0, 2.0, 100)
        .with_bud(Bud::new(NodeRole::Segment, 0.2).chained())
        .with_bud(Bud::new(NodeRole::Actuator, 0.2).with_length(12.0).chained());
    let engine = GrowthEngine::default();
    let mut organism = Organism::new(0, Genome::new(vec![rule]), 5.0);

    let GrowthOutcome::Grew(growth) = organism.step(&engine).unwrap() else {
        panic!("expected growth");
    };

    assert_eq!(growth.nodes.len(), 3);
    assert_eq!(growth.cost, 2.0);
    assert_eq!(organism.energy(), 3.0);
    let edges = organism.body.edges();
    assert_eq!(edges[0].parent, growth.anchor);
    assert_eq!(edges[1].parent, growth.nodes[0]);
    assert_eq!(edges[2].parent, growth.nodes[1]);
    assert_eq!(edges[2].length, 12.0);
    assert_eq!(organism.body.leaves(), vec![growth.nodes[2]]);
}

#[test]
fn test_weighted_recency_reaches_every_rule() {
    let genome = Genome::new(vec![
        GrowthRule::bud(NodeRole::Segment, 0.0, 0.0, 0),
        GrowthRule::bud(NodeRole::Sensor, 1.0, 0.0, 0),
        GrowthRule::bud(NodeRole::Actuator, 2.0, 0.0, 0),
    ]);
    let engine = GrowthEngine::new(SchedulePolicy::WeightedRecency, AnchorMode::CoreOnly);
    let mut organism = Organism::new(0, genome, 1.0);

    let grown = organism.grow_for(&engine, 60).unwrap();

    assert_eq!(grown, 60);
    for index in 0..3 {
        assert!(organism.growth.last_fired(index).is_some(), "rule {index} starved");
    }
}

#[test]
fn test_starter_genome_grows_limbs_and_sensors() {
    let engine = GrowthEngine::default();
    let mut organism = Organism::new(0, Genome::starter(), 16.0);

    let grown = organism.grow_for(&engine, 120).unwrap();

    assert!(grown > 0);
    assert!(organism.energy() >= 0.0);
    // growth stops once energy drops under the global threshold
    assert!(organism.energy() < 8.0);
    assert!(organism.energy() >= 6.0);
    let ports = organism.ports();
    assert_eq!(
        ports.actuators.len() + ports.sensors.len(),
        organism.body.node_count() - 1
    );
}
