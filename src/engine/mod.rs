// Engine modules: physics, input signals, loop timing

pub mod game_loop;
pub mod input;
pub mod physics;
