use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::catalog::{EnemyRoster, EnemyTemplate, Snippet, SnippetBank};
use crate::combo::ComboTracker;
use crate::timer::{DeadlineKind, TimerController};

pub const PLAYER_MAX_HEALTH: i32 = 100;
pub const TIMEOUT_DAMAGE: i32 = 20;
pub const MAX_TIME_LIMIT_SECS: u64 = 40;
pub const SECS_PER_CHAR: u64 = 2;
/// Lets the presenter show the completed snippet before the level advances.
pub const ADVANCE_DELAY_MS: u64 = 500;
/// Input stays locked this long after a mismatched keystroke.
pub const PENALTY_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Mode {
    Battle,
    Practice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Slash,
    Spark,
}

/// Outward events produced by the state machine. Collaborators consume
/// these fire-and-forget; nothing flows back into the battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RenderSnippet,
    RenderHud,
    RenderEnemy,
    PlayAttackSound,
    PlayHurtSound,
    PulseHealthBar(Side),
    SpawnParticles(ParticleKind),
    /// Announced from the attack handler on exact multiples of ten. The HUD
    /// label from `ComboTracker::streak_label` is a separate, persistent
    /// rule.
    ComboStreak(u32),
    SessionEnded { victory: bool, score: u32 },
}

/// One continuous play-through, created fresh at start/restart and replaced
/// wholesale, never patched across games.
#[derive(Debug, Clone)]
pub struct BattleSession {
    pub mode: Mode,
    pub level: u32,
    pub score: u32,
    pub combo: ComboTracker,
    pub player_health: i32,
    pub enemy: EnemyTemplate,
    pub enemy_health: i32,
    pub snippet: Snippet,
    /// Count of correctly typed characters; never exceeds the snippet length.
    pub cursor: usize,
    pub input_locked: bool,
    pub mistake_pending: bool,
    pub time_limit_secs: u64,
    pub ended: bool,
    /// Identifies the current encounter installment. Deadlines scheduled
    /// against an older generation are dropped when they fire.
    pub generation: u64,
}

impl BattleSession {
    fn fresh(mode: Mode) -> Self {
        Self {
            mode,
            level: 1,
            score: 0,
            combo: ComboTracker::default(),
            player_health: PLAYER_MAX_HEALTH,
            enemy: EnemyTemplate::default(),
            enemy_health: 0,
            snippet: Snippet::default(),
            cursor: 0,
            input_locked: false,
            mistake_pending: false,
            time_limit_secs: 0,
            ended: false,
            generation: 0,
        }
    }

    pub fn snippet_len(&self) -> usize {
        self.snippet.char_count()
    }

    pub fn snippet_complete(&self) -> bool {
        self.cursor >= self.snippet_len()
    }

    pub fn expected_char(&self) -> Option<char> {
        self.snippet.text.chars().nth(self.cursor)
    }

    pub fn player_health_ratio(&self) -> f64 {
        (self.player_health.max(0) as f64 / PLAYER_MAX_HEALTH as f64).clamp(0.0, 1.0)
    }

    pub fn enemy_health_ratio(&self) -> f64 {
        if self.enemy.max_health == 0 {
            return 0.0;
        }
        (self.enemy_health.max(0) as f64 / self.enemy.max_health as f64).clamp(0.0, 1.0)
    }

    pub fn progress_ratio(&self) -> f64 {
        let len = self.snippet_len();
        if len == 0 {
            return 0.0;
        }
        (self.cursor as f64 / len as f64).clamp(0.0, 1.0)
    }
}

/// At least two seconds of allowance per character, capped at forty seconds
/// regardless of snippet length.
pub fn time_limit_for(text: &str) -> u64 {
    MAX_TIME_LIMIT_SECS.min(SECS_PER_CHAR * text.chars().count() as u64)
}

/// The battle state machine: owns the session, consumes keystroke and tick
/// events, and emits outward effects. Single-threaded; each event is
/// processed to completion before the next.
#[derive(Debug)]
pub struct Battle {
    pub session: BattleSession,
    pub timers: TimerController,
    snippets: SnippetBank,
    enemies: EnemyRoster,
    rng: StdRng,
    // monotonic across restarts so pre-restart deadlines stay stale
    next_generation: u64,
}

impl Battle {
    pub fn new(mode: Mode, seed: Option<u64>) -> Self {
        Self::with_catalogs(SnippetBank::load(), EnemyRoster::load(), mode, seed)
    }

    pub fn with_catalogs(
        snippets: SnippetBank,
        enemies: EnemyRoster,
        mode: Mode,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut battle = Self {
            session: BattleSession::fresh(mode),
            timers: TimerController::new(mode == Mode::Battle),
            snippets,
            enemies,
            rng,
            next_generation: 0,
        };
        battle.begin_encounter();
        battle
    }

    /// Fully reinitializes the session and starts over at level 1.
    pub fn restart(&mut self, mode: Mode) -> Vec<Effect> {
        self.session = BattleSession::fresh(mode);
        self.timers = TimerController::new(mode == Mode::Battle);
        self.begin_encounter()
    }

    /// Installs a fresh encounter for the session's current level: new enemy
    /// at full health, new snippet, new countdown. Bumping the generation
    /// turns every outstanding deadline stale.
    fn begin_encounter(&mut self) -> Vec<Effect> {
        self.next_generation += 1;
        self.session.generation = self.next_generation;

        self.session.enemy = self.enemies.for_level(self.session.level);
        self.session.enemy_health = self.session.enemy.max_health as i32;
        self.session.snippet = self.snippets.pick(self.session.level, &mut self.rng);
        self.session.cursor = 0;
        self.session.mistake_pending = false;
        self.session.input_locked = false;
        self.session.time_limit_secs = time_limit_for(&self.session.snippet.text);

        self.timers
            .schedule_countdown(self.session.time_limit_secs, self.session.generation);

        vec![Effect::RenderEnemy, Effect::RenderSnippet, Effect::RenderHud]
    }

    /// Keyboard entry point. Modifier-held input, input while locked, input
    /// after the session ended, and input while the completed snippet awaits
    /// its advance are all ignored without mutating the session.
    pub fn on_key(&mut self, c: char, ctrl: bool, meta: bool) -> Vec<Effect> {
        if ctrl || meta {
            return Vec::new();
        }
        if self.session.ended || self.session.input_locked || self.session.snippet_complete() {
            return Vec::new();
        }

        if self.session.expected_char() == Some(c) {
            self.on_hit()
        } else {
            self.on_miss()
        }
    }

    fn on_hit(&mut self) -> Vec<Effect> {
        self.session.cursor += 1;
        self.session.mistake_pending = false;

        // player attack: one point of damage per correctly typed character
        self.session.enemy_health -= 1;
        self.session.score += 1;
        let combo = self.session.combo.record_hit();

        let mut effects = vec![
            Effect::PlayAttackSound,
            Effect::PulseHealthBar(Side::Enemy),
            Effect::SpawnParticles(ParticleKind::Slash),
        ];
        if self.session.combo.at_streak_milestone() {
            effects.push(Effect::ComboStreak(combo));
        }

        if self.session.enemy_health <= 0 {
            // defeat advances the level immediately, no presentation delay;
            // the fresh encounter also makes the completion check moot
            self.session.level += 1;
            effects.extend(self.begin_encounter());
        } else if self.session.snippet_complete() {
            self.timers.schedule_delay(
                DeadlineKind::Advance,
                ADVANCE_DELAY_MS,
                self.session.generation,
            );
        }

        effects.push(Effect::RenderSnippet);
        effects.push(Effect::RenderHud);
        effects
    }

    fn on_miss(&mut self) -> Vec<Effect> {
        self.session.mistake_pending = true;
        self.session.combo.reset();
        self.session.input_locked = true;
        self.timers.schedule_delay(
            DeadlineKind::Unlock,
            PENALTY_DELAY_MS,
            self.session.generation,
        );

        // cosmetic player-side feedback only; a mistake costs no health and
        // the running countdown is neither paused nor extended
        vec![
            Effect::RenderSnippet,
            Effect::PlayHurtSound,
            Effect::PulseHealthBar(Side::Player),
            Effect::SpawnParticles(ParticleKind::Spark),
        ]
    }

    /// The countdown expired: the enemy lands an attack.
    fn on_timeout(&mut self) -> Vec<Effect> {
        self.session.player_health -= TIMEOUT_DAMAGE;

        let mut effects = vec![
            Effect::PulseHealthBar(Side::Player),
            Effect::SpawnParticles(ParticleKind::Spark),
        ];

        if self.session.player_health <= 0 {
            self.session.player_health = 0;
            self.session.ended = true;
            self.timers.clear();
            effects.push(Effect::SessionEnded {
                victory: false,
                score: self.session.score,
            });
            return effects;
        }

        effects.push(Effect::PlayHurtSound);
        self.session.combo.reset();
        // a timeout re-rolls the encounter at the current level
        effects.extend(self.begin_encounter());
        effects.push(Effect::RenderHud);
        effects
    }

    /// Advances scheduled deadlines by one tick quantum. Deadlines scheduled
    /// against an older encounter are dropped without effect.
    pub fn on_tick(&mut self, elapsed_ms: u64) -> Vec<Effect> {
        if self.session.ended {
            return Vec::new();
        }

        let mut effects = Vec::new();
        for fired in self.timers.tick(elapsed_ms) {
            if fired.generation != self.session.generation {
                continue;
            }
            match fired.kind {
                DeadlineKind::EnemyAttack => effects.extend(self.on_timeout()),
                DeadlineKind::Unlock => {
                    self.session.input_locked = false;
                    self.session.mistake_pending = false;
                    effects.push(Effect::RenderSnippet);
                }
                DeadlineKind::Advance => {
                    self.session.level += 1;
                    effects.extend(self.begin_encounter());
                }
            }
            if self.session.ended {
                break;
            }
        }
        effects
    }
}
