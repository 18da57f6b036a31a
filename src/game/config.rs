// Gameplay tuning values
//
// Collected in one mutable record so a dev-mode editor can adjust values
// live; the transition tables only ever read it.

use glam::Vec2;

/// All gameplay tuning in one place. Constructed with `Default::default()`
/// and passed by reference into every update.
#[derive(Debug, Clone)]
pub struct Tuning {
    /// Downward gravity applied to dynamic bodies
    pub gravity: f32,
    /// Frame-counter advance per simulation tick. Animations play at half
    /// the tick rate by default.
    pub counter_increment: f32,

    // Player movement
    pub move_impulse: f32,
    pub move_damping: f32,
    pub max_x_speed: f32,
    pub max_y_speed: f32,
    pub jump_impulse: Vec2,
    /// Guaranteed jump length in ticks even on an instant release
    pub min_jump_duration: u32,
    /// Jump length cap in ticks while the button stays held
    pub max_jump_duration: u32,
    pub dash_speed: f32,
    pub dash_duration: u32,
    pub dash_cooldown: u32,

    // Player attacks
    pub attack_damage: f32,
    pub attack_cooldown: u32,
    /// First frame (inclusive) of the hitbox-active window
    pub attack_start: f32,
    /// Frame past the end (exclusive) of the hitbox-active window
    pub attack_end: f32,
    pub attack_radius: f32,
    pub attack_offset: Vec2,

    // Enemies
    pub enemy_max_health: f32,
    pub patrol_range: f32,
    pub spider_speed: f32,
    pub spider_attack_impulse: Vec2,
    pub spider_attack_gravity: f32,
    pub spider_max_y_speed: f32,
    pub wisp_attack_cooldown: u32,
    pub wisp_projectile_speed: f32,
    pub wisp_projectile_offset: Vec2,
    pub wyrm_drift_speed: f32,
    pub wyrm_dive_speed: f32,
    /// Distance at which a diving wyrm counts as arrived
    pub wyrm_arrive_distance: f32,
    pub wyrm_attack_cooldown: u32,
    pub blob_bob_period: f32,
    pub blob_bob_speed: f32,

    // Projectiles
    pub projectile_max_health: f32,
    /// Projectile lifetime in ticks before self-removal
    pub projectile_life: u32,

    // Shard companion
    pub shard_spin_speed: f32,
    pub shard_distance: f32,
    pub shard_follow_rate: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: -70.0,
            counter_increment: 0.5,

            move_impulse: 1.0,
            move_damping: 10.0,
            max_x_speed: 3.3,
            max_y_speed: 8.0,
            jump_impulse: Vec2::new(0.0, 5.0),
            min_jump_duration: 6,
            max_jump_duration: 12,
            dash_speed: 10.0,
            dash_duration: 12,
            dash_cooldown: 17,

            attack_damage: 3.0,
            attack_cooldown: 20,
            attack_start: 2.0,
            attack_end: 8.0,
            attack_radius: 0.45,
            attack_offset: Vec2::new(0.6, 0.0),

            enemy_max_health: 10.0,
            patrol_range: 2.0,
            spider_speed: 1.0,
            spider_attack_impulse: Vec2::new(5.0, 6.0),
            spider_attack_gravity: 0.6,
            spider_max_y_speed: 8.0,
            wisp_attack_cooldown: 30,
            wisp_projectile_speed: 4.0,
            wisp_projectile_offset: Vec2::new(0.2, 0.2),
            wyrm_drift_speed: 1.0,
            wyrm_dive_speed: 7.0,
            wyrm_arrive_distance: 0.3,
            wyrm_attack_cooldown: 105,
            blob_bob_period: 20.0,
            blob_bob_speed: 0.25,

            projectile_max_health: 1.0,
            projectile_life: 120,

            shard_spin_speed: 10.0,
            shard_distance: 0.7,
            shard_follow_rate: 10.0,
        }
    }
}
