#![allow(missing_docs)]

use morphogen::simulation::body::{BodyGraph, BudSpec, NodeId, NodeRole};
use morphogen::simulation::error::{BodyError, GenomeError};
use morphogen::simulation::genome::{AnchorSelector, Bud, Genome, GrowthRule};

fn spec(role: NodeRole, angle_offset: f32, length: f32) -> BudSpec {
    BudSpec {
        role,
        angle_offset,
        length,
        radius: 4.0,
    }
}

#[test]
fn test_new_body_is_a_lone_core() {
    let body = BodyGraph::at_origin();

    assert_eq!(body.node_count(), 1);
    assert!(body.edges().is_empty());
    assert_eq!(body.root().unwrap(), NodeId(0));
    assert_eq!(body.role(NodeId(0)), Some(NodeRole::Core));
    assert_eq!(body.leaves(), vec![NodeId(0)]);
    assert!(body.validate().is_ok());
}

#[test]
fn test_bud_places_child_along_parent_orientation() {
    let mut body = BodyGraph::at_origin();
    let root = body.root().unwrap();

    let arm = body.bud(root, spec(NodeRole::Segment, 0.0, 10.0), 3).unwrap();
    let tip = body
        .bud(arm, spec(NodeRole::Actuator, std::f32::consts::FRAC_PI_2, 5.0), 4)
        .unwrap();

    let arm_node = body.node(arm).unwrap();
    assert!((arm_node.pos[0] - 10.0).abs() < 1e-5);
    assert!(arm_node.pos[1].abs() < 1e-5);
    assert_eq!(arm_node.created_at, 3);

    let tip_node = body.node(tip).unwrap();
    assert!((tip_node.pos[0] - 10.0).abs() < 1e-4);
    assert!((tip_node.pos[1] - 5.0).abs() < 1e-4);
    assert!((tip_node.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);

    assert_eq!(body.edges().len(), 2);
    assert_eq!(body.children(root).collect::<Vec<_>>(), vec![arm]);
    assert_eq!(body.actuator_ids(), vec![tip]);
    assert!((body.reach() - 125.0_f32.sqrt()).abs() < 1e-3);
}

#[test]
fn test_failed_bud_leaves_body_untouched() {
    let mut body = BodyGraph::at_origin();
    let root = body.root().unwrap();

    assert_eq!(
        body.bud(NodeId(42), spec(NodeRole::Segment, 0.0, 10.0), 0),
        Err(BodyError::UnknownNode(NodeId(42)))
    );
    assert_eq!(
        body.bud(root, spec(NodeRole::Core, 0.0, 10.0), 0),
        Err(BodyError::SecondCore)
    );
    assert!(matches!(
        body.bud(root, spec(NodeRole::Segment, 0.0, 0.0), 0),
        Err(BodyError::InvalidLength(_))
    ));
    assert!(matches!(
        body.bud(root, spec(NodeRole::Segment, 0.0, f32::NAN), 0),
        Err(BodyError::InvalidLength(_))
    ));

    assert_eq!(body.node_count(), 1);
    assert!(body.edges().is_empty());

    // the failed calls did not consume ids
    let next = body.bud(root, spec(NodeRole::Sensor, 0.0, 10.0), 0).unwrap();
    assert_eq!(next, NodeId(1));
}

#[test]
fn test_remove_subtree_cascades_and_leaves_no_dangling_edges() {
    let mut body = BodyGraph::at_origin();
    let root = body.root().unwrap();
    let arm = body.bud(root, spec(NodeRole::Segment, 0.0, 10.0), 1).unwrap();
    let hand = body.bud(arm, spec(NodeRole::Actuator, 0.0, 10.0), 2).unwrap();
    let finger = body.bud(hand, spec(NodeRole::Sensor, 0.3, 4.0), 3).unwrap();
    let eye = body.bud(root, spec(NodeRole::Sensor, 1.0, 8.0), 4).unwrap();

    let removed = body.remove_subtree(arm).unwrap();

    assert_eq!(removed, vec![arm, hand, finger]);
    assert_eq!(body.node_count(), 2);
    assert!(body.contains(eye));
    assert!(!body.contains(hand));
    assert_eq!(body.edges().len(), 1);
    assert!(body.validate().is_ok());
    for edge in body.edges() {
        assert!(body.contains(edge.parent));
        assert!(body.contains(edge.child));
    }
}

#[test]
fn test_core_cannot_be_removed() {
    let mut body = BodyGraph::at_origin();
    let root = body.root().unwrap();
    body.bud(root, spec(NodeRole::Segment, 0.0, 10.0), 1).unwrap();

    assert_eq!(body.remove_subtree(root), Err(BodyError::CoreRemoval));
    assert_eq!(
        body.remove_subtree(NodeId(9)),
        Err(BodyError::UnknownNode(NodeId(9)))
    );
    assert_eq!(body.node_count(), 2);
}

#[test]
fn test_ids_are_not_reused_after_removal() {
    let mut body = BodyGraph::at_origin();
    let root = body.root().unwrap();
    let first = body.bud(root, spec(NodeRole::Segment, 0.0, 10.0), 1).unwrap();
    body.remove_subtree(first).unwrap();

    let second = body.bud(root, spec(NodeRole::Segment, 0.0, 10.0), 2).unwrap();

    assert_ne!(first, second);
    assert!(second > first);
    assert!(body.node(second).is_some());
}

#[test]
fn test_starter_genome_layout() {
    let genome = Genome::starter();

    assert_eq!(genome.len(), 5);
    assert!(genome.validate().is_ok());

    let roles: Vec<NodeRole> = genome.rules.iter().map(|r| r.template[0].role).collect();
    assert_eq!(
        roles,
        vec![
            NodeRole::Actuator,
            NodeRole::Actuator,
            NodeRole::Actuator,
            NodeRole::Sensor,
            NodeRole::Sensor
        ]
    );
    assert!(genome.rules.iter().all(|r| r.anchor == AnchorSelector::Root));
    assert!(genome.defaults.energy_threshold > 0.0);
}

#[test]
fn test_genome_validation_rejects_malformed_rules() {
    assert_eq!(Genome::new(Vec::new()).validate(), Err(GenomeError::NoRules));

    let mut empty_template = GrowthRule::bud(NodeRole::Segment, 0.0, 1.0, 0);
    empty_template.template.clear();
    assert_eq!(
        Genome::new(vec![empty_template]).validate(),
        Err(GenomeError::EmptyTemplate(0))
    );

    let core = GrowthRule::bud(NodeRole::Segment, 0.0, 1.0, 0).with_bud(Bud::new(NodeRole::Core, 0.0));
    let ok = GrowthRule::bud(NodeRole::Segment, 0.0, 1.0, 0);
    assert_eq!(
        Genome::new(vec![ok, core]).validate(),
        Err(GenomeError::CoreBud(1))
    );

    let negative = GrowthRule::bud(NodeRole::Segment, 0.0, -1.0, 0);
    assert!(matches!(
        Genome::new(vec![negative]).validate(),
        Err(GenomeError::InvalidCost { index: 0, .. })
    ));

    let mut zero = GrowthRule::bud(NodeRole::Segment, 0.0, 1.0, 0);
    zero.template[0].length = Some(0.0);
    assert!(matches!(
        Genome::new(vec![zero]).validate(),
        Err(GenomeError::InvalidLength { index: 0, .. })
    ));
}
