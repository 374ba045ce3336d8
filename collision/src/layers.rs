//! Named collision layers and the group/mask pair a body definition carries.
//!
//! Definitions store raw integers (`collisionFilterGroup`, `collisionFilterMask`) so
//! maps can use any bit; [`CollisionLayer`] only names the bits the client uses.

use rapier3d::prelude::{Group, InteractionGroups};

/// Well-known layers. The discriminant is the bit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CollisionLayer {
    World,
    Player,
    Prop,
    Trigger,
    Projectile,
}

impl CollisionLayer {
    #[inline]
    pub fn bit_index(&self) -> u8 {
        *self as u8
    }

    #[inline]
    pub fn mask(&self) -> u32 {
        1 << self.bit_index()
    }

    /// OR the masks of several layers together.
    pub fn combine(layers: &[CollisionLayer]) -> u32 {
        layers.iter().fold(0, |acc, layer| acc | layer.mask())
    }
}

/// Membership (`group`) and filter (`mask`) bits for one body.
///
/// Two bodies interact when each one's group intersects the other's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub group: u32,
    pub mask: u32,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            group: u32::MAX,
            mask: u32::MAX,
        }
    }
}

impl CollisionFilter {
    /// Fill in missing definition fields with "everything".
    pub fn from_parts(group: Option<u32>, mask: Option<u32>) -> Self {
        let default = Self::default();
        Self {
            group: group.unwrap_or(default.group),
            mask: mask.unwrap_or(default.mask),
        }
    }

    pub fn interacts_with(&self, other: &CollisionFilter) -> bool {
        (self.group & other.mask) != 0 && (other.group & self.mask) != 0
    }
}

impl From<CollisionFilter> for InteractionGroups {
    fn from(filter: CollisionFilter) -> Self {
        InteractionGroups::all()
            .with_memberships(Group::from_bits_truncate(filter.group))
            .with_filter(Group::from_bits_truncate(filter.mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_masks_follow_bit_index() {
        assert_eq!(CollisionLayer::World.mask(), 0b1);
        assert_eq!(CollisionLayer::Trigger.mask(), 0b1000);
        assert_eq!(
            CollisionLayer::combine(&[CollisionLayer::Player, CollisionLayer::Prop]),
            0b110
        );
    }

    #[test]
    fn missing_parts_default_to_all() {
        let filter = CollisionFilter::from_parts(Some(CollisionLayer::Prop.mask()), None);
        assert_eq!(filter.group, 0b100);
        assert_eq!(filter.mask, u32::MAX);
    }

    #[test]
    fn interaction_requires_both_directions() {
        let player = CollisionFilter {
            group: CollisionLayer::Player.mask(),
            mask: CollisionLayer::combine(&[CollisionLayer::World, CollisionLayer::Trigger]),
        };
        let pad = CollisionFilter {
            group: CollisionLayer::Trigger.mask(),
            mask: CollisionLayer::Player.mask(),
        };
        let prop = CollisionFilter {
            group: CollisionLayer::Prop.mask(),
            mask: u32::MAX,
        };

        assert!(player.interacts_with(&pad));
        assert!(!player.interacts_with(&prop));
    }

    #[test]
    fn converts_into_interaction_groups() {
        let groups: InteractionGroups = CollisionFilter { group: 0b10, mask: 0b01 }.into();
        assert_eq!(groups.memberships, Group::GROUP_2);
        assert_eq!(groups.filter, Group::GROUP_1);
    }
}
