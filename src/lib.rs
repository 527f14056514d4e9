//! termtris - falling-block puzzle game for the terminal
//!
//! The engine ([`game::GameEngine`]) is pure and clock-free: callers feed it
//! [`game::Intent`]s and elapsed time, and read back snapshots and events.
//! Terminal drawing, keyboard input, sound and persistence sit behind small
//! traits so the engine can be driven headless.

pub mod app;
pub mod audio;
pub mod bag;
pub mod board;
pub mod game;
pub mod input;
pub mod persist;
pub mod piece;
pub mod score;
pub mod settings;
pub mod snapshot;
pub mod tetromino;
pub mod ui;

pub use game::{EngineConfig, GameEngine, GameEvent, Intent, Phase};
pub use snapshot::{GameStatus, Snapshot, SnapshotCell};
pub use tetromino::{ColorTag, PieceKind};
