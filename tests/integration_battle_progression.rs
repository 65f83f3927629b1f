use assert_matches::assert_matches;
use tempfile::tempdir;

use codeknight::battle::{Battle, Effect, Mode, PLAYER_MAX_HEALTH, TIMEOUT_DAMAGE};
use codeknight::catalog::{EnemyRoster, EnemyTemplate, Snippet, SnippetBank};
use codeknight::history::RunLog;
use codeknight::score::{record_session, FileScoreStore, ScoreBoard, ScoreStore};

fn battle_over(text: &str, enemy_health: u32) -> Battle {
    let bank = SnippetBank::from_snippets(vec![Snippet {
        text: text.to_string(),
        hint: "test".to_string(),
    }]);
    let roster = EnemyRoster::from_enemies(vec![EnemyTemplate {
        name: "Slime".to_string(),
        avatar: "S".to_string(),
        max_health: enemy_health,
    }]);
    Battle::with_catalogs(bank, roster, Mode::Battle, Some(9))
}

fn type_str(battle: &mut Battle, text: &str) -> Vec<Effect> {
    let mut effects = Vec::new();
    for c in text.chars() {
        effects.extend(battle.on_key(c, false, false));
    }
    effects
}

#[test]
fn typing_a_snippet_end_to_end() {
    // "let x = 10;" is 11 characters, so the deadline is 22 seconds
    let mut battle = battle_over("let x = 10;", 30);
    assert_eq!(battle.session.time_limit_secs, 22);

    type_str(&mut battle, "let x = 10;");

    assert_eq!(battle.session.score, 11);
    assert_eq!(battle.session.combo.combo(), 11);
    assert_eq!(battle.session.enemy_health, 19);
    assert_eq!(battle.session.level, 1);
}

#[test]
fn thirty_hits_reach_level_two() {
    let prompt = "0123456789".repeat(4);
    let mut battle = battle_over(&prompt, 30);

    for c in prompt.chars().take(30) {
        battle.on_key(c, false, false);
    }

    assert_eq!(battle.session.level, 2);
    assert_eq!(battle.session.score, 30);
    assert_eq!(battle.session.enemy_health, 30);
}

#[test]
fn timeout_penalty_is_exactly_twenty_health() {
    let mut battle = battle_over("ab", 30);

    battle.on_tick(battle.session.time_limit_secs * 1000);

    assert_eq!(
        battle.session.player_health,
        PLAYER_MAX_HEALTH - TIMEOUT_DAMAGE
    );
    assert_eq!(battle.session.level, 1);
}

#[test]
fn defeat_persists_score_and_history() {
    let dir = tempdir().unwrap();
    let store = FileScoreStore::with_path(dir.path().join("scores.json"));
    let log = RunLog::with_path(dir.path().join("runs.csv"));

    let mut battle = battle_over("ab", 30);
    type_str(&mut battle, "a");

    let mut ended = None;
    while ended.is_none() {
        let effects = battle.on_tick(battle.session.time_limit_secs * 1000);
        ended = effects.into_iter().find_map(|e| match e {
            Effect::SessionEnded { victory, score } => Some((victory, score)),
            _ => None,
        });
    }

    let (victory, score) = ended.unwrap();
    assert!(!victory);
    assert_eq!(score, 1);

    let improved = record_session(&store, score, battle.session.combo.max_combo());
    log.append(
        battle.session.mode,
        battle.session.level,
        score,
        battle.session.combo.max_combo(),
    )
    .unwrap();

    assert!(improved);
    assert_eq!(store.load().high_score, 1);
    let contents = std::fs::read_to_string(dir.path().join("runs.csv")).unwrap();
    assert!(contents.contains(",Battle,1,1,"));
}

#[test]
fn a_lower_score_never_overwrites_the_high_score() {
    let dir = tempdir().unwrap();
    let store = FileScoreStore::with_path(dir.path().join("scores.json"));
    store
        .save(&ScoreBoard {
            high_score: 500,
            best_combo: 40,
            last_played: None,
        })
        .unwrap();

    assert!(!record_session(&store, 3, 3));
    assert_eq!(store.load().high_score, 500);
}

#[test]
fn session_death_is_terminal() {
    let mut battle = battle_over("ab", 30);

    for _ in 0..5 {
        battle.on_tick(battle.session.time_limit_secs * 1000);
    }
    assert!(battle.session.ended);

    // nothing moves the dead session except a restart
    assert!(battle.on_key('a', false, false).is_empty());
    assert!(battle.on_tick(60_000).is_empty());

    let effects = battle.restart(Mode::Battle);
    assert!(!battle.session.ended);
    assert_eq!(battle.session.player_health, PLAYER_MAX_HEALTH);
    assert_matches!(effects.first(), Some(Effect::RenderEnemy));
}
