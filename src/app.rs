//! Main loop: poll input, advance the engine, react to events, draw

use crate::audio::Sound;
use crate::game::{GameEngine, GameEvent, Intent};
use crate::input::InputSource;
use crate::persist::{Persistence, SavedState};
use crate::ui::{GameView, Renderer};
use std::time::{Duration, Instant};

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// A running game wired to its collaborators
pub struct App<R, I, P> {
    engine: GameEngine,
    renderer: R,
    input: I,
    store: P,
    saved: SavedState,
    sound: Option<Sound>,
    poll_interval: Duration,
    since_render: Duration,
}

impl<R, I, P> App<R, I, P>
where
    R: Renderer,
    I: InputSource,
    P: Persistence,
{
    pub fn new(engine: GameEngine, renderer: R, input: I, store: P, saved: SavedState) -> Self {
        Self {
            engine,
            renderer,
            input,
            store,
            saved,
            sound: None,
            poll_interval: Duration::from_millis(10),
            since_render: Duration::ZERO,
        }
    }

    pub fn with_sound(mut self, sound: Option<Sound>) -> Self {
        self.sound = sound;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn saved(&self) -> &SavedState {
        &self.saved
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Run until the player quits, then save
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.draw()?;
        let mut last = Instant::now();
        loop {
            let intents = self.input.poll(self.poll_interval)?;
            let now = Instant::now();
            let keep_going = self.step(&intents, now - last)?;
            last = now;
            if !keep_going {
                break;
            }
        }
        self.save();
        Ok(())
    }

    /// One loop iteration. Returns false once quit was requested.
    pub fn step(&mut self, intents: &[Intent], elapsed: Duration) -> anyhow::Result<bool> {
        for &intent in intents {
            self.engine.apply_intent(intent);
        }
        if self.engine.quit_requested() {
            return Ok(false);
        }

        self.engine.tick(elapsed);

        let events = self.engine.drain_events();
        for event in &events {
            self.handle_event(event);
        }

        // Redraw promptly after input or state changes, otherwise at frame rate
        self.since_render += elapsed;
        if !intents.is_empty() || !events.is_empty() || self.since_render >= FRAME_DURATION {
            self.draw()?;
        }
        Ok(true)
    }

    fn handle_event(&mut self, event: &GameEvent) {
        if let Some(sound) = &self.sound {
            sound.on_event(event);
        }
        match event {
            GameEvent::LinesCleared { .. } | GameEvent::Locked(_) => {
                self.saved.record(self.engine.score().points);
            }
            GameEvent::GameOver { score, lines } => {
                tracing::info!("Game over: score={} lines={}", score, lines);
                if self.saved.record(*score) {
                    tracing::info!("New highscore {}", score);
                }
                self.save();
            }
            _ => {}
        }
    }

    fn draw(&mut self) -> anyhow::Result<()> {
        self.since_render = Duration::ZERO;
        let view = GameView::capture(&self.engine, self.saved.highscore);
        self.renderer.render(&view)
    }

    /// Persist the current state; failures are logged, not fatal
    fn save(&mut self) {
        self.saved.record(self.engine.score().points);
        if let Err(e) = self.store.save(&self.saved) {
            tracing::warn!("Could not save scores: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag::Bag;
    use crate::board::Board;
    use crate::game::EngineConfig;
    use crate::tetromino::PieceKind;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Default)]
    struct CountingRenderer {
        frames: usize,
        last_score: u64,
        last_highscore: u64,
    }

    impl Renderer for CountingRenderer {
        fn render(&mut self, view: &GameView) -> anyhow::Result<()> {
            self.frames += 1;
            self.last_score = view.status.score;
            self.last_highscore = view.highscore;
            Ok(())
        }
    }

    struct ScriptedInput(VecDeque<Vec<Intent>>);

    impl InputSource for ScriptedInput {
        fn poll(&mut self, _timeout: Duration) -> anyhow::Result<Vec<Intent>> {
            Ok(self.0.pop_front().unwrap_or_else(|| vec![Intent::Quit]))
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStore(Rc<RefCell<Vec<SavedState>>>);

    impl Persistence for MemoryStore {
        fn load(&self) -> SavedState {
            self.0.borrow().last().copied().unwrap_or_default()
        }

        fn save(&self, state: &SavedState) -> anyhow::Result<()> {
            self.0.borrow_mut().push(*state);
            Ok(())
        }
    }

    fn engine() -> GameEngine {
        let bag = Bag::with_queue(&[PieceKind::O, PieceKind::T], 1);
        GameEngine::with_parts(EngineConfig::default(), Board::new(), bag)
    }

    #[test]
    fn test_run_until_quit_saves() {
        let store = MemoryStore::default();
        let input = ScriptedInput(VecDeque::from(vec![vec![Intent::HardDrop], vec![]]));
        let mut app = App::new(
            engine(),
            CountingRenderer::default(),
            input,
            store.clone(),
            SavedState::default(),
        );
        app.run().expect("run");

        let saves = store.0.borrow();
        let last = saves.last().expect("saved on exit");
        assert_eq!(last.highscore, 18);
        assert!(app.renderer().frames >= 2);
        assert_eq!(app.renderer().last_score, 18);
    }

    #[test]
    fn test_highscore_not_lowered() {
        let store = MemoryStore::default();
        let saved = SavedState {
            highscore: 5000,
            starting_level: 2,
        };
        let mut app = App::new(
            engine(),
            CountingRenderer::default(),
            ScriptedInput(VecDeque::new()),
            store.clone(),
            saved,
        );
        app.step(&[Intent::HardDrop], Duration::ZERO).expect("step");
        assert_eq!(app.renderer().last_highscore, 5000);
        assert_eq!(app.saved().highscore, 5000);
        assert_eq!(app.saved().starting_level, 2);
    }

    #[test]
    fn test_step_stops_on_quit() {
        let mut app = App::new(
            engine(),
            CountingRenderer::default(),
            ScriptedInput(VecDeque::new()),
            MemoryStore::default(),
            SavedState::default(),
        );
        assert!(app.step(&[], Duration::from_millis(5)).expect("step"));
        assert!(!app.step(&[Intent::Quit], Duration::ZERO).expect("step"));
    }

    #[test]
    fn test_renders_at_frame_rate_when_idle() {
        let mut app = App::new(
            engine(),
            CountingRenderer::default(),
            ScriptedInput(VecDeque::new()),
            MemoryStore::default(),
            SavedState::default(),
        );
        // the spawn event from construction forces the first frame
        app.step(&[], Duration::from_millis(1)).expect("step");
        assert_eq!(app.renderer().frames, 1);
        app.step(&[], Duration::from_millis(1)).expect("step");
        assert_eq!(app.renderer().frames, 1);
        app.step(&[], FRAME_DURATION).expect("step");
        assert_eq!(app.renderer().frames, 2);
    }
}
