use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use codeknight::battle::{Battle, Mode, PLAYER_MAX_HEALTH, TIMEOUT_DAMAGE};
use codeknight::catalog::{EnemyRoster, EnemyTemplate, Snippet, SnippetBank};
use codeknight::runtime::{FixedTicker, GameEvent, Runner, TestEventSource};

// Headless integration using the internal runtime + Battle without a TTY.
// Verifies that the event loop plumbing drives the state machine end to end.

fn battle_over(text: &str, enemy_health: u32, mode: Mode) -> Battle {
    let bank = SnippetBank::from_snippets(vec![Snippet {
        text: text.to_string(),
        hint: "test".to_string(),
    }]);
    let roster = EnemyRoster::from_enemies(vec![EnemyTemplate {
        name: "Slime".to_string(),
        avatar: "S".to_string(),
        max_health: enemy_health,
    }]);
    Battle::with_catalogs(bank, roster, mode, Some(1))
}

#[test]
fn headless_flow_defeats_an_enemy() {
    let mut battle = battle_over("hi", 2, Mode::Battle);

    let (tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(5)));

    for c in ['h', 'i'] {
        tx.send(GameEvent::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::NONE,
        )))
        .unwrap();
    }

    for _ in 0..100u32 {
        match runner.step() {
            GameEvent::Tick => {
                battle.on_tick(runner.tick_ms());
            }
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if let KeyCode::Char(c) = key.code {
                    battle.on_key(c, false, false);
                }
            }
        }
        if battle.session.level > 1 {
            break;
        }
    }

    // two hits fell the two-health slime and advance the level immediately
    assert_eq!(battle.session.level, 2);
    assert_eq!(battle.session.score, 2);
    assert_eq!(battle.session.combo.combo(), 2);
}

#[test]
fn headless_countdown_expiry_attacks_the_player() {
    // single character snippet: the shortest possible two-second countdown
    let mut battle = battle_over("x", 30, Mode::Battle);
    assert_eq!(battle.session.time_limit_secs, 2);

    let (_tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(10)));

    for _ in 0..250u32 {
        if let GameEvent::Tick = runner.step() {
            battle.on_tick(runner.tick_ms());
        }
        if battle.session.player_health < PLAYER_MAX_HEALTH {
            break;
        }
    }

    assert_eq!(
        battle.session.player_health,
        PLAYER_MAX_HEALTH - TIMEOUT_DAMAGE
    );
    // the encounter rerolled at the same level with a fresh countdown
    assert_eq!(battle.session.level, 1);
    assert!(battle.timers.has_countdown());
}

#[test]
fn headless_practice_session_is_never_attacked() {
    let mut battle = battle_over("x", 30, Mode::Practice);

    let (_tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(1)));

    for _ in 0..200u32 {
        if let GameEvent::Tick = runner.step() {
            // pretend each tick is a whole second; practice has no deadline
            battle.on_tick(1000);
        }
    }

    assert_eq!(battle.session.player_health, PLAYER_MAX_HEALTH);
    assert!(!battle.timers.has_countdown());
}

#[test]
fn headless_modifier_held_keys_are_ignored() {
    let mut battle = battle_over("hi", 30, Mode::Battle);

    let (tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(5)));

    tx.send(GameEvent::Key(KeyEvent::new(
        KeyCode::Char('h'),
        KeyModifiers::CONTROL,
    )))
    .unwrap();

    for _ in 0..10u32 {
        if let GameEvent::Key(key) = runner.step() {
            if let KeyCode::Char(c) = key.code {
                let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                let meta = key.modifiers.contains(KeyModifiers::META)
                    || key.modifiers.contains(KeyModifiers::SUPER);
                battle.on_key(c, ctrl, meta);
            }
            break;
        }
    }

    assert_eq!(battle.session.cursor, 0);
    assert_eq!(battle.session.score, 0);
}
