use include_dir::{include_dir, Dir};
use rand::Rng;
use serde::Deserialize;

static CONTENT_DIR: Dir = include_dir!("src/content");

// Eligibility windows into the ordered snippet catalog. Levels below the
// first threshold draw from the beginner window, levels below the second
// from the intermediate window, everything else from the full catalog.
const BEGINNER_WINDOW: usize = 6;
const INTERMEDIATE_WINDOW: usize = 10;
const BEGINNER_MAX_LEVEL: u32 = 3;
const INTERMEDIATE_MAX_LEVEL: u32 = 5;

/// A single typing challenge: the text to type and a descriptive hint.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    pub hint: String,
}

impl Snippet {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct EnemyTemplate {
    pub name: String,
    pub avatar: String,
    pub max_health: u32,
}

/// Static ordered catalog of typing challenges, easiest first.
#[derive(Clone, Debug)]
pub struct SnippetBank {
    snippets: Vec<Snippet>,
}

impl SnippetBank {
    pub fn load() -> Self {
        Self {
            snippets: read_content("snippets.json"),
        }
    }

    pub fn from_snippets(snippets: Vec<Snippet>) -> Self {
        Self { snippets }
    }

    /// Number of catalog entries eligible at `level`. The windows widen
    /// monotonically: a higher level always sees a superset of a lower one.
    pub fn window(&self, level: u32) -> usize {
        let width = if level < BEGINNER_MAX_LEVEL {
            BEGINNER_WINDOW
        } else if level < INTERMEDIATE_MAX_LEVEL {
            INTERMEDIATE_WINDOW
        } else {
            self.snippets.len()
        };
        width.min(self.snippets.len())
    }

    /// Uniform draw from the window eligible at `level`.
    pub fn pick<R: Rng>(&self, level: u32, rng: &mut R) -> Snippet {
        let window = self.window(level);
        self.snippets[rng.gen_range(0..window)].clone()
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

/// Static ordered catalog of enemy templates, weakest first.
#[derive(Clone, Debug)]
pub struct EnemyRoster {
    enemies: Vec<EnemyTemplate>,
}

impl EnemyRoster {
    pub fn load() -> Self {
        Self {
            enemies: read_content("enemies.json"),
        }
    }

    pub fn from_enemies(enemies: Vec<EnemyTemplate>) -> Self {
        Self { enemies }
    }

    /// Deterministic lookup: `roster[min(level - 1, len - 1)]`. Levels past
    /// the end of the roster repeat the final, strongest enemy.
    pub fn for_level(&self, level: u32) -> EnemyTemplate {
        let idx = (level.saturating_sub(1) as usize).min(self.enemies.len() - 1);
        self.enemies[idx].clone()
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }
}

// An unreadable embedded catalog is a build defect, not a runtime condition.
fn read_content<T: for<'de> Deserialize<'de>>(file_name: &str) -> T {
    let file = CONTENT_DIR
        .get_file(file_name)
        .expect("content file not found");

    let raw = file
        .contents_utf8()
        .expect("unable to interpret content file as a string");

    serde_json::from_str(raw).expect("unable to deserialize content json")
}
