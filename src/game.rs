//! Core game state and logic
//!
//! The engine never reads the clock. Callers feed elapsed time through
//! [`GameEngine::tick`] and input through [`GameEngine::apply_intent`].

use crate::bag::Bag;
use crate::board::{Board, BOARD_HEIGHT, BOARD_WIDTH};
use crate::piece::Piece;
use crate::score::{Score, DEFAULT_MIN_FALL_INTERVAL};
use crate::snapshot::{GameStatus, Snapshot, SnapshotCell};
use crate::tetromino::{PieceKind, RotationDirection};
use std::collections::VecDeque;
use std::time::Duration;

/// Duration of one row-clear animation step
pub const DEFAULT_CLEAR_STEP: Duration = Duration::from_millis(30);
/// Movement intents kept while rows are clearing
const MAX_PENDING_INTENTS: usize = 4;

/// Input intents the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Left,
    Right,
    RotateCW,
    RotateCCW,
    SoftDrop,
    HardDrop,
    Hold,
    Pause,
    Restart,
    Quit,
}

impl Intent {
    /// Intents that act on the falling piece
    pub fn is_movement(&self) -> bool {
        !matches!(self, Intent::Pause | Intent::Restart | Intent::Quit)
    }
}

/// Observable engine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A piece is falling and accepts movement
    Falling,
    /// Full rows are being blanked; nothing is scored or spawned yet
    RowClearing,
    Paused,
    GameOver,
}

/// Notifications for sound, persistence and logging collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Spawned(PieceKind),
    Locked(PieceKind),
    LinesCleared { rows: usize, points: u64 },
    LevelUp(u32),
    Held(PieceKind),
    Paused,
    Resumed,
    GameOver { score: u64, lines: u32 },
    Restarted,
}

/// Engine tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    pub starting_level: u32,
    /// Include the landing preview in snapshots
    pub show_ghost: bool,
    /// Duration of one row-clear animation step; zero clears instantly
    pub clear_step: Duration,
    /// Floor on the gravity interval
    pub min_fall_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            starting_level: 0,
            show_ghost: true,
            clear_step: DEFAULT_CLEAR_STEP,
            min_fall_interval: DEFAULT_MIN_FALL_INTERVAL,
        }
    }
}

/// Progress of the row-clear animation.
///
/// Cleared rows are blanked outward from the center column, one offset per
/// step: the center first, then one column either side, and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearAnimation {
    rows: Vec<usize>,
    elapsed: Duration,
    step: Duration,
    width: usize,
}

impl ClearAnimation {
    fn new(rows: Vec<usize>, step: Duration, width: usize) -> Self {
        Self {
            rows,
            elapsed: Duration::ZERO,
            step,
            width,
        }
    }

    /// Rows being cleared, bottom to top
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    fn center(&self) -> usize {
        self.width / 2
    }

    fn steps(&self) -> usize {
        self.center() + 1
    }

    /// Offsets from the center blanked so far (the center counts as one)
    fn steps_shown(&self) -> usize {
        let done = (self.elapsed.as_nanos() / self.step.as_nanos().max(1)) as usize;
        (done + 1).min(self.steps())
    }

    /// Whether `col` of a clearing row has been blanked yet
    pub fn is_blanked(&self, col: usize) -> bool {
        col.abs_diff(self.center()) < self.steps_shown()
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.step * self.steps() as u32
    }
}

/// The simulation: board, active piece, bag, hold and score
pub struct GameEngine {
    config: EngineConfig,
    board: Board,
    /// Current falling piece
    active: Option<Piece>,
    /// Held piece kind
    held: Option<PieceKind>,
    /// Whether hold has been used since the last lock
    hold_used: bool,
    bag: Bag,
    /// Cached `bag.peek()` so status reads stay `&self`
    next: PieceKind,
    score: Score,
    phase: Phase,
    /// Phase to return to when unpausing
    resume_phase: Phase,
    /// Time accumulated toward the next gravity step
    fall_timer: Duration,
    clearing: Option<ClearAnimation>,
    /// Movement received during row clearing, replayed on the next spawn
    pending: VecDeque<Intent>,
    message: Option<&'static str>,
    quit_requested: bool,
    events: Vec<GameEvent>,
}

impl GameEngine {
    /// Create a new game with a random seed
    pub fn new(config: EngineConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Create a new game whose piece sequence is reproducible
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        let board = Board::with_size(config.width, config.height);
        Self::with_parts(config, board, Bag::with_seed(seed))
    }

    /// Create a game on a prepared board. The board's dimensions win over
    /// the ones in `config`. The first piece spawns immediately, so a
    /// blocked spawn area ends the game before any input.
    pub fn with_parts(mut config: EngineConfig, board: Board, mut bag: Bag) -> Self {
        config.width = board.width();
        config.height = board.height();
        let score = Score::new(config.starting_level);
        let next = bag.peek();

        let mut engine = Self {
            config,
            board,
            active: None,
            held: None,
            hold_used: false,
            bag,
            next,
            score,
            phase: Phase::Falling,
            resume_phase: Phase::Falling,
            fall_timer: Duration::ZERO,
            clearing: None,
            pending: VecDeque::new(),
            message: None,
            quit_requested: false,
            events: Vec::new(),
        };
        engine.spawn_next();
        engine
    }

    /// Start over with an empty board, zero score and a fresh bag cycle
    pub fn reset(&mut self) {
        let (board, score) = self.fresh_round();
        self.board = board;
        self.score = score;
        self.active = None;
        self.held = None;
        self.hold_used = false;
        self.fall_timer = Duration::ZERO;
        self.clearing = None;
        self.pending.clear();
        self.message = None;
        self.phase = Phase::Falling;
        self.resume_phase = Phase::Falling;
        self.bag.discard();

        tracing::info!("Game restarted at level {}", self.config.starting_level);
        self.events.push(GameEvent::Restarted);
        self.spawn_next();
    }

    fn fresh_round(&self) -> (Board, Score) {
        (
            Board::with_size(self.config.width, self.config.height),
            Score::new(self.config.starting_level),
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    /// Row-clear animation in progress, if any
    pub fn clearing(&self) -> Option<&ClearAnimation> {
        self.clearing.as_ref()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Current gravity interval
    pub fn fall_interval(&self) -> Duration {
        self.score.fall_interval(self.config.min_fall_interval)
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn game_state(&self) -> GameStatus {
        GameStatus {
            score: self.score.points,
            lines_cleared: self.score.lines,
            level: self.score.level(),
            held: self.held,
            next: self.next,
            is_paused: self.phase == Phase::Paused,
            is_over: self.phase == Phase::GameOver,
            hold_available: !self.hold_used,
            message: self.message,
        }
    }

    /// Settled cells, clear animation, ghost and active piece composited
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::from_board(&self.board);

        if let Some(clearing) = &self.clearing {
            for &row in clearing.rows() {
                for col in 0..self.board.width() {
                    if clearing.is_blanked(col) {
                        snapshot.set(row as i32, col as i32, SnapshotCell::Empty);
                    }
                }
            }
        }

        if let Some(piece) = &self.active {
            if self.config.show_ghost {
                let distance = self.board.drop_distance(piece) as i32;
                if distance > 0 {
                    for (row, col) in piece.cells_in_board_coords() {
                        snapshot.set(row + distance, col, SnapshotCell::Ghost(piece.kind));
                    }
                }
            }
            for (row, col) in piece.cells_in_board_coords() {
                snapshot.set(row, col, SnapshotCell::Active(piece.kind));
            }
        }

        snapshot
    }

    /// Process an intent. Returns whether it was accepted.
    pub fn apply_intent(&mut self, intent: Intent) -> bool {
        if !intent.is_movement() {
            return match intent {
                Intent::Quit => {
                    self.quit_requested = true;
                    true
                }
                Intent::Restart => {
                    self.reset();
                    true
                }
                _ => self.toggle_pause(),
            };
        }

        match self.phase {
            Phase::Falling => self.apply_movement(intent),
            Phase::RowClearing => {
                if self.pending.len() < MAX_PENDING_INTENTS {
                    self.pending.push_back(intent);
                    true
                } else {
                    false
                }
            }
            Phase::Paused | Phase::GameOver => false,
        }
    }

    /// Advance the gravity and animation clocks
    pub fn tick(&mut self, elapsed: Duration) {
        match self.phase {
            Phase::Falling => self.advance_gravity(elapsed),
            Phase::RowClearing => self.advance_clear(elapsed),
            Phase::Paused | Phase::GameOver => {}
        }
    }

    fn apply_movement(&mut self, intent: Intent) -> bool {
        match intent {
            Intent::Left => self.try_shift(-1, 0),
            Intent::Right => self.try_shift(1, 0),
            Intent::SoftDrop => self.soft_drop(),
            Intent::HardDrop => self.hard_drop(),
            Intent::RotateCW => self.rotate(RotationDirection::Clockwise),
            Intent::RotateCCW => self.rotate(RotationDirection::CounterClockwise),
            Intent::Hold => self.hold(),
            Intent::Pause | Intent::Restart | Intent::Quit => false,
        }
    }

    fn try_shift(&mut self, dx: i32, dy: i32) -> bool {
        let Some(piece) = &mut self.active else {
            return false;
        };
        if !self.board.can_move(piece, dx, dy) {
            return false;
        }
        piece.translate(dx, dy);
        true
    }

    fn soft_drop(&mut self) -> bool {
        if self.try_shift(0, 1) {
            self.score.add_soft_drop(1);
            true
        } else {
            false
        }
    }

    fn hard_drop(&mut self) -> bool {
        let Some(piece) = &mut self.active else {
            return false;
        };
        let distance = self.board.drop_distance(piece);
        piece.translate(0, distance as i32);
        self.score.add_hard_drop(distance);
        self.lock();
        true
    }

    fn rotate(&mut self, direction: RotationDirection) -> bool {
        let Some(piece) = &mut self.active else {
            return false;
        };
        let candidate = piece.rotated(direction);
        if !self.board.can_rotate(piece, &candidate) {
            return false;
        }
        piece.set_cells(candidate);
        true
    }

    fn hold(&mut self) -> bool {
        if self.hold_used {
            return false;
        }
        let Some(current) = self.active.take() else {
            return false;
        };

        self.hold_used = true;
        let previous = self.held.replace(current.kind);
        tracing::debug!("Held {:?}, swapping in {:?}", current.kind, previous);
        self.events.push(GameEvent::Held(current.kind));

        match previous {
            Some(kind) => self.spawn(kind),
            None => self.spawn_next(),
        }
        true
    }

    fn toggle_pause(&mut self) -> bool {
        match self.phase {
            Phase::Falling | Phase::RowClearing => {
                self.resume_phase = self.phase;
                self.phase = Phase::Paused;
                self.events.push(GameEvent::Paused);
                true
            }
            Phase::Paused => {
                self.phase = self.resume_phase;
                self.events.push(GameEvent::Resumed);
                true
            }
            Phase::GameOver => false,
        }
    }

    fn advance_gravity(&mut self, elapsed: Duration) {
        self.fall_timer += elapsed;
        loop {
            let interval = self.fall_interval();
            if self.phase != Phase::Falling || self.fall_timer < interval {
                break;
            }
            self.fall_timer -= interval;
            self.gravity_step();
        }
    }

    fn gravity_step(&mut self) {
        if !self.try_shift(0, 1) {
            self.lock();
        }
    }

    fn advance_clear(&mut self, elapsed: Duration) {
        let finished = match &mut self.clearing {
            Some(clearing) => {
                clearing.elapsed += elapsed;
                clearing.is_finished()
            }
            None => true,
        };
        if finished {
            self.finish_lock();
        }
    }

    /// Merge the active piece and either start the clear animation or
    /// move straight on to the next piece
    fn lock(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };

        if let Err(collision) = self.board.merge(&piece) {
            tracing::info!("Piece {:?} could not lock: {}", piece.kind, collision);
            self.game_over();
            return;
        }
        tracing::debug!("Locked {:?} at {:?}", piece.kind, piece.origin());
        self.events.push(GameEvent::Locked(piece.kind));

        let rows = self.board.full_rows();
        if rows.is_empty() || self.config.clear_step.is_zero() {
            self.finish_lock();
        } else {
            self.clearing = Some(ClearAnimation::new(
                rows,
                self.config.clear_step,
                self.board.width(),
            ));
            self.phase = Phase::RowClearing;
        }
    }

    /// Remove full rows, score them and spawn the next piece
    fn finish_lock(&mut self) {
        self.clearing = None;
        self.phase = Phase::Falling;

        let level_before = self.score.level();
        let cleared = self.board.clear_full_rows_with(|event| {
            tracing::trace!("Cleared row {} ({} so far)", event.row, event.running_count);
        });

        if cleared > 0 {
            let points = self.score.add_clear(cleared);
            self.message = Score::clear_label(cleared);
            tracing::info!(
                "Cleared {} rows for {} points (total {}, lines {})",
                cleared,
                points,
                self.score.points,
                self.score.lines
            );
            self.events.push(GameEvent::LinesCleared {
                rows: cleared,
                points,
            });
            let level = self.score.level();
            if level > level_before {
                tracing::info!("Level up: {}", level);
                self.events.push(GameEvent::LevelUp(level));
            }
        } else {
            self.message = None;
        }

        self.hold_used = false;
        self.spawn_next();
    }

    fn spawn_next(&mut self) {
        let kind = self.bag.next();
        self.spawn(kind);
    }

    /// Place `kind` at its spawn origin, or end the game if it doesn't fit
    fn spawn(&mut self, kind: PieceKind) {
        self.next = self.bag.peek();
        self.fall_timer = Duration::ZERO;

        let piece = Piece::spawn(kind, self.board.width());
        if !self.board.can_move(&piece, 0, 0) {
            tracing::info!("Block out: {:?} cannot spawn at {:?}", kind, piece.origin());
            self.game_over();
            return;
        }

        tracing::debug!("Spawned {:?}, next {:?}", kind, self.next);
        self.active = Some(piece);
        self.phase = Phase::Falling;
        self.events.push(GameEvent::Spawned(kind));

        // A replayed drop may start another clear; the rest wait for it
        while let Some(intent) = self.pending.pop_front() {
            if self.phase != Phase::Falling {
                self.pending.push_front(intent);
                break;
            }
            self.apply_movement(intent);
        }
    }

    fn game_over(&mut self) {
        self.active = None;
        self.clearing = None;
        self.pending.clear();
        self.phase = Phase::GameOver;
        tracing::info!(
            "Game over: score {}, lines {}, level {}",
            self.score.points,
            self.score.lines,
            self.score.level()
        );
        self.events.push(GameEvent::GameOver {
            score: self.score.points,
            lines: self.score.lines,
        });
    }
}
