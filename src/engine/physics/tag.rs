// Collider tagging: identifies the owner entity and semantic role of a fixture

/// Unique identifier for an entity, assigned by the level driver
pub type EntityId = u64;

/// Semantic role of a collider fixture.
///
/// Hurtboxes are the solid body of an entity; hitboxes deal damage; the
/// remaining roles are non-solid sensors read by the collision resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ColliderRole {
    Hurtbox = 1,
    Hitbox = 2,
    Ground = 3,
    Vision = 4,
    Ahead = 5,
    Behind = 6,
    FrontEdge = 7,
    BackEdge = 8,
    Forward = 9,
    Center = 10,
}

impl ColliderRole {
    fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            1 => Self::Hurtbox,
            2 => Self::Hitbox,
            3 => Self::Ground,
            4 => Self::Vision,
            5 => Self::Ahead,
            6 => Self::Behind,
            7 => Self::FrontEdge,
            8 => Self::BackEdge,
            9 => Self::Forward,
            10 => Self::Center,
            _ => return None,
        })
    }

    /// Whether fixtures with this role participate in solid collision.
    /// Everything except a hurtbox is a sensor fixture.
    pub fn is_solid(self) -> bool {
        matches!(self, Self::Hurtbox)
    }
}

/// Back-reference from a fixture to its owner, stored in the collider's
/// `user_data` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColliderTag {
    pub entity: EntityId,
    pub role: ColliderRole,
}

impl ColliderTag {
    pub fn new(entity: EntityId, role: ColliderRole) -> Self {
        Self { entity, role }
    }

    /// Pack this tag into a collider `user_data` value. Zero is reserved for
    /// untagged colliders.
    pub fn pack(self) -> u128 {
        ((self.entity as u128) << 8) | self.role as u128
    }

    /// Decode a tag from collider `user_data`. Returns `None` for untagged
    /// colliders.
    pub fn unpack(data: u128) -> Option<Self> {
        let role = ColliderRole::from_u8((data & 0xff) as u8)?;
        Some(Self {
            entity: (data >> 8) as EntityId,
            role,
        })
    }
}
