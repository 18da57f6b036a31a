use anyhow::Result;
use glam::Vec2;
use log::info;

use cadenza::engine::game_loop::GameLoop;
use cadenza::engine::input::InputFrame;
use cadenza::game::config::Tuning;
use cadenza::game::level::{Level, SpawnKind, SpawnRecord};
use cadenza::game::player::Player;

/// Ticks of simulation the demo runs before exiting
const DEMO_TICKS: u64 = 600;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Cadenza headless demo...");

    let mut level = Level::new(Tuning::default());
    level.load(&[
        SpawnRecord::new(
            SpawnKind::Platform {
                half_extents: Vec2::new(30.0, 0.5),
            },
            Vec2::new(0.0, -0.5),
        ),
        SpawnRecord::new(SpawnKind::Player, Vec2::new(0.0, 0.6)),
        SpawnRecord::new(SpawnKind::Shard, Vec2::new(-0.7, 1.0)),
        SpawnRecord::new(SpawnKind::Checkpoint, Vec2::new(2.0, 0.5)),
        SpawnRecord::new(SpawnKind::Tooltip, Vec2::new(1.0, 0.8)),
        SpawnRecord::new(SpawnKind::Spider, Vec2::new(5.0, 0.3)),
        SpawnRecord::new(SpawnKind::Wisp, Vec2::new(8.0, 2.0)),
        SpawnRecord::new(SpawnKind::Wyrm, Vec2::new(11.0, 3.0)),
        SpawnRecord::new(SpawnKind::Blob, Vec2::new(13.0, 1.0)),
        SpawnRecord::new(SpawnKind::Altar, Vec2::new(15.0, 0.6)),
    ])?;

    let mut game_loop = GameLoop::new();
    let mut altar_logged = false;

    // Scripted input: walk right, hop periodically, attack on approach
    while level.ticks() < DEMO_TICKS {
        for _ in 0..game_loop.begin_frame() {
            let tick = level.ticks();
            let mut input = InputFrame::idle().with_horizontal(1);
            if tick % 90 == 0 {
                input = input.with_jump();
            } else if tick % 90 < 10 {
                input = input.holding_jump().with_horizontal(1);
            }
            if tick % 120 == 60 {
                input = input.with_attack();
            }
            level.tick(input);

            if tick % 60 == 0 {
                if let Some(player) = level.player() {
                    let position = player.base.position(level.physics());
                    info!(
                        "tick {tick}: player at ({:.2}, {:.2}) in {:?}",
                        position.x,
                        position.y,
                        Player::state(&player.base)
                    );
                }
            }
            if level.altar_reached() && !altar_logged {
                altar_logged = true;
                info!("altar reached at tick {tick}");
            }
        }
    }

    info!(
        "demo finished after {} ticks ({} entities alive)",
        level.ticks(),
        level.entities().len()
    );
    Ok(())
}
