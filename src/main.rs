mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

use codeknight::{
    battle::{Battle, Effect, Mode, Side},
    config::{Config, ConfigStore, FileConfigStore},
    history::RunLog,
    particles::ParticleField,
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    score::{record_session, FileScoreStore, ScoreBoard, ScoreStore},
    sound::{MutedSound, Sound, TerminalBell},
};

const TICK_RATE_MS: u64 = 100;
// cosmetic timings, in ticks
const PULSE_TICKS: u8 = 3;
const STREAK_FLASH_TICKS: u8 = 15;

/// terminal typing battle: defeat enemies by typing code snippets under time pressure
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Defeat a parade of enemies by typing code snippets character-for-character before the countdown runs out. Practice mode drops the clock entirely."
)]
pub struct Cli {
    /// start straight into practice mode (no countdown, no enemy attacks)
    #[clap(short, long)]
    practice: bool,

    /// disable the terminal bell
    #[clap(long)]
    muted: bool,

    /// seed snippet selection for reproducible runs
    #[clap(long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver { new_best: bool },
}

pub struct App {
    pub screen: Screen,
    pub battle: Battle,
    pub particles: ParticleField,
    pub board: ScoreBoard,
    pub config: Config,
    /// ticks left on each health-bar pulse
    pub pulse_player: u8,
    pub pulse_enemy: u8,
    /// transient streak banner announced by the attack handler
    pub streak_flash: Option<(String, u8)>,
    pub final_score: u32,
    pub outcome_victory: bool,
    pub term_size: (u16, u16),
    scores: FileScoreStore,
    history: RunLog,
    config_store: FileConfigStore,
    sound: Box<dyn Sound>,
}

impl App {
    pub fn new(cli: &Cli) -> Self {
        Self::with_stores(
            cli,
            FileConfigStore::new(),
            FileScoreStore::new(),
            RunLog::new(),
        )
    }

    pub fn with_stores(
        cli: &Cli,
        config_store: FileConfigStore,
        scores: FileScoreStore,
        history: RunLog,
    ) -> Self {
        let mut config = config_store.load();
        if cli.practice {
            config.practice = true;
        }
        if cli.muted {
            config.muted = true;
        }

        let sound: Box<dyn Sound> = if config.muted {
            Box::new(MutedSound)
        } else {
            Box::new(TerminalBell)
        };
        let board = scores.load();
        let mode = if config.practice {
            Mode::Practice
        } else {
            Mode::Battle
        };

        Self {
            screen: Screen::Menu,
            battle: Battle::new(mode, cli.seed),
            particles: ParticleField::default(),
            board,
            config,
            pulse_player: 0,
            pulse_enemy: 0,
            streak_flash: None,
            final_score: 0,
            outcome_victory: false,
            term_size: (80, 24),
            scores,
            history,
            config_store,
            sound,
        }
    }

    fn start_session(&mut self, mode: Mode) {
        self.screen = Screen::Playing;
        self.particles.clear();
        self.streak_flash = None;
        self.pulse_player = 0;
        self.pulse_enemy = 0;
        let effects = self.battle.restart(mode);
        self.apply_effects(effects);

        self.config.practice = mode == Mode::Practice;
        let _ = self.config_store.save(&self.config);
    }

    fn return_to_menu(&mut self) {
        self.screen = Screen::Menu;
        self.particles.clear();
        self.board = self.scores.load();
    }

    fn toggle_sound(&mut self) {
        self.config.muted = !self.config.muted;
        self.sound = if self.config.muted {
            Box::new(MutedSound)
        } else {
            Box::new(TerminalBell)
        };
        let _ = self.config_store.save(&self.config);
    }

    /// Returns true when the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match self.screen {
            Screen::Menu => match key.code {
                KeyCode::Esc => return true,
                KeyCode::Enter | KeyCode::Char('b') => self.start_session(Mode::Battle),
                KeyCode::Char('p') => self.start_session(Mode::Practice),
                KeyCode::Char('m') => self.toggle_sound(),
                _ => {}
            },
            Screen::Playing => match key.code {
                KeyCode::Esc => self.return_to_menu(),
                KeyCode::Char(c) => {
                    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                    let meta = key.modifiers.contains(KeyModifiers::META)
                        || key.modifiers.contains(KeyModifiers::SUPER);
                    let effects = self.battle.on_key(c, ctrl, meta);
                    self.apply_effects(effects);
                }
                _ => {}
            },
            Screen::GameOver { .. } => match key.code {
                KeyCode::Esc => return true,
                KeyCode::Char('r') => self.start_session(self.battle.session.mode),
                KeyCode::Char('m') => self.return_to_menu(),
                _ => {}
            },
        }

        false
    }

    pub fn on_tick(&mut self) {
        if self.screen == Screen::Playing {
            let effects = self.battle.on_tick(TICK_RATE_MS);
            self.apply_effects(effects);
        }

        self.particles.update(TICK_RATE_MS as f64 / 1000.0);
        self.pulse_player = self.pulse_player.saturating_sub(1);
        self.pulse_enemy = self.pulse_enemy.saturating_sub(1);
        if let Some((_, ttl)) = &mut self.streak_flash {
            *ttl = ttl.saturating_sub(1);
            if *ttl == 0 {
                self.streak_flash = None;
            }
        }
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                // immediate-mode rendering redraws from the session every
                // frame; the render effects carry no extra payload here
                Effect::RenderSnippet | Effect::RenderHud | Effect::RenderEnemy => {}
                Effect::PlayAttackSound => self.sound.attack(),
                Effect::PlayHurtSound => self.sound.hurt(),
                Effect::PulseHealthBar(Side::Player) => self.pulse_player = PULSE_TICKS,
                Effect::PulseHealthBar(Side::Enemy) => self.pulse_enemy = PULSE_TICKS,
                Effect::SpawnParticles(kind) => {
                    let (w, h) = self.term_size;
                    self.particles
                        .burst(kind, f64::from(w) / 2.0, f64::from(h) / 2.0);
                }
                Effect::ComboStreak(n) => {
                    self.streak_flash = Some((format!("Combo! x{n}"), STREAK_FLASH_TICKS));
                }
                Effect::SessionEnded { victory, score } => {
                    let max_combo = self.battle.session.combo.max_combo();
                    let new_best = record_session(&self.scores, score, max_combo);
                    let _ = self.history.append(
                        self.battle.session.mode,
                        self.battle.session.level,
                        score,
                        max_combo,
                    );
                    self.final_score = score;
                    self.outcome_victory = victory;
                    self.board = self.scores.load();
                    self.screen = Screen::GameOver { new_best };
                }
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&cli);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let source = CrosstermEventSource::new();
    let runner = Runner::new(source, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));

    loop {
        let size = terminal.size()?;
        app.term_size = (size.width, size.height);
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            GameEvent::Tick => app.on_tick(),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if app.on_key(key) {
                    break;
                }
            }
        }
    }

    Ok(())
}
