//! termtris - falling blocks in the terminal

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;
use termtris::app::App;
use termtris::audio::Sound;
use termtris::game::GameEngine;
use termtris::input::{Debouncer, KeyBindings, KeyboardInput};
use termtris::persist::{Persistence, ScoreStore};
use termtris::score::MAX_STARTING_LEVEL;
use termtris::settings::Settings;
use termtris::ui::TerminalRenderer;

#[derive(Parser, Debug)]
#[command(name = "termtris", version, about = "Falling-block puzzle game for the terminal")]
struct Cli {
    /// Starting level (0-99); remembered for later runs
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=MAX_STARTING_LEVEL as i64))]
    level: Option<u32>,

    /// Seed for a reproducible piece sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Hide the landing preview
    #[arg(long)]
    no_ghost: bool,

    /// Disable sound
    #[arg(long)]
    mute: bool,

    /// Directory holding settings.toml and scores.txt
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

/// Get the termtris temp directory, creating it if needed
fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("termtris");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Warning: could not create {}: {}", dir.display(), e);
    }
    dir
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let session_id: u32 = rand::random();
    let log_dir = temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Log to a file; the terminal belongs to the UI
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("termtris=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "termtris starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let config_dir = cli
        .config_dir
        .clone()
        .or_else(Settings::config_dir)
        .context("no config directory available; pass --config-dir")?;
    let mut settings = Settings::load(&config_dir);
    if cli.no_ghost {
        settings.visual.show_ghost = false;
    }
    if cli.mute {
        settings.audio.enabled = false;
    }

    let store = ScoreStore::in_dir(&config_dir);
    let mut saved = store.load();
    if let Some(level) = cli.level {
        saved.starting_level = level;
    }
    tracing::debug!("Loaded {:?} from {}", saved, store.path().display());

    let config = settings.engine_config(saved.starting_level);
    let engine = match cli.seed {
        Some(seed) => GameEngine::with_seed(config, seed),
        None => GameEngine::new(config),
    };

    // Sound is optional - the game works without it
    let audio = &settings.audio;
    let sound = if audio.enabled {
        Sound::new(audio.sfx_volume).map(|sound| {
            if audio.music {
                sound.with_music(audio.music_volume)
            } else {
                sound
            }
        })
    } else {
        None
    };

    let input = KeyboardInput::new(
        KeyBindings::from_names(&settings.keys),
        Debouncer::from_settings(&settings.gameplay),
    );

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    terminal.hide_cursor()?;

    let renderer =
        TerminalRenderer::new(terminal, settings.visual.clone()).with_keys(&settings.keys);
    let mut app = App::new(engine, renderer, input, store, saved)
        .with_sound(sound)
        .with_poll_interval(Duration::from_millis(settings.gameplay.poll_interval_ms));
    let result = app.run();

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    app.renderer_mut().terminal_mut().show_cursor()?;

    if let Err(e) = &result {
        tracing::error!("Exited with error: {:#}", e);
    }
    result?;

    let score = app.engine().score();
    println!("\nThanks for playing termtris!");
    println!("Final Score: {}", score.points);
    println!("Level: {} | Lines: {}", score.level(), score.lines);
    println!("Highscore: {}", app.saved().highscore);
    Ok(())
}
