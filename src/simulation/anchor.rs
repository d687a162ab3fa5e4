//! Anchor resolution: turning a rule's [`AnchorSelector`] into a concrete node.

use serde::{Deserialize, Serialize};

use super::body::{BodyGraph, NodeId, NodeRole};
use super::error::BodyError;
use super::genome::AnchorSelector;

/// How the growth engine interprets anchor selectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorMode {
    /// Every rule attaches to the core, whatever its selector says.
    #[default]
    CoreOnly,
    /// Each rule's own selector is honoured.
    PerRule,
}

impl AnchorMode {
    /// Resolves the anchor for one growth attempt.
    ///
    /// `Ok(None)` means the selector has no candidate in this body (no
    /// actuators yet, say); the attempt is skipped. A body without a core is
    /// malformed and reported as an error. Multi-candidate selectors pick
    /// deterministically from `key`.
    pub fn resolve(
        self,
        selector: AnchorSelector,
        body: &BodyGraph,
        key: u64,
    ) -> Result<Option<NodeId>, BodyError> {
        let selector = match self {
            AnchorMode::CoreOnly => AnchorSelector::Root,
            AnchorMode::PerRule => selector,
        };

        let candidates = match selector {
            AnchorSelector::Root => return body.root().map(Some),
            AnchorSelector::RandomNode => body.nodes().iter().map(|n| n.id).collect(),
            AnchorSelector::Actuator => body.ids_with_role(NodeRole::Actuator),
            AnchorSelector::Sensor => body.ids_with_role(NodeRole::Sensor),
            AnchorSelector::Leaf => body.leaves(),
        };

        if candidates.is_empty() {
            return Ok(None);
        }
        // high bits, so the pick is not correlated with the rule choice
        let idx = ((key >> 32) % candidates.len() as u64) as usize;
        Ok(Some(candidates[idx]))
    }
}
