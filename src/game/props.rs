// Static props: platforms, checkpoints, tooltips, and the level-end altar

use std::collections::HashSet;

use crate::engine::physics::EntityId;
use crate::game::entity::{EntityBase, UpdateCtx};

/// Solid standable geometry. All behavior lives in its hurtbox fixture.
pub struct Platform;

/// Respawn marker. One-shot: once activated it never deactivates.
pub struct Checkpoint {
    pub activated: bool,
}

pub const CHECKPOINT_INACTIVE: usize = 0;
pub const CHECKPOINT_ACTIVE: usize = 1;

impl Checkpoint {
    pub fn new() -> Self {
        Self { activated: false }
    }

    /// External activation, triggered when the player touches the marker
    pub fn trigger(base: &mut EntityBase, c: &mut Checkpoint) {
        if c.activated {
            return;
        }
        c.activated = true;
        if base.can_switch(CHECKPOINT_ACTIVE) {
            base.commit_switch(CHECKPOINT_ACTIVE);
        }
        log::info!("checkpoint {} activated", base.id());
    }
}

impl Default for Checkpoint {
    fn default() -> Self {
        Self::new()
    }
}

pub fn update_checkpoint(base: &mut EntityBase, _c: &mut Checkpoint, ctx: &mut UpdateCtx) {
    base.advance_counter(ctx.tuning.counter_increment);
}

/// In-world hint, shown while the player stands inside its sensor
pub struct Tooltip {
    /// Entities currently inside the sensor
    pub visitors: HashSet<EntityId>,
}

pub const TOOLTIP_HIDDEN: usize = 0;
pub const TOOLTIP_SHOWN: usize = 1;

impl Tooltip {
    pub fn new() -> Self {
        Self {
            visitors: HashSet::new(),
        }
    }

    pub fn is_shown(base: &EntityBase) -> bool {
        base.state_index() == TOOLTIP_SHOWN
    }
}

impl Default for Tooltip {
    fn default() -> Self {
        Self::new()
    }
}

pub fn update_tooltip(base: &mut EntityBase, t: &mut Tooltip, ctx: &mut UpdateCtx) {
    base.advance_counter(ctx.tuning.counter_increment);
    let next = if t.visitors.is_empty() {
        TOOLTIP_HIDDEN
    } else {
        TOOLTIP_SHOWN
    };
    if base.can_switch(next) {
        base.commit_switch(next);
    }
}

/// Level-end goal
pub struct Altar {
    pub reached: bool,
}

pub const ALTAR_IDLE: usize = 0;

impl Altar {
    pub fn new() -> Self {
        Self { reached: false }
    }
}

impl Default for Altar {
    fn default() -> Self {
        Self::new()
    }
}

pub fn update_altar(base: &mut EntityBase, _a: &mut Altar, ctx: &mut UpdateCtx) {
    base.advance_counter(ctx.tuning.counter_increment);
}
