use std::fmt;

use crate::model::GameId;

/// Topic category a game belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Reading,
    Math,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Reading => write!(f, "reading"),
            Category::Math => write!(f, "math"),
        }
    }
}

/// Static description of one level within a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelMeta {
    pub name: String,
    pub description: String,
}

impl LevelMeta {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Static description of one mini-game.
///
/// Registry data is read-only: the progress core consumes it only for level
/// counts and ordering, and never writes it back anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMeta {
    pub id: GameId,
    pub slug: String,
    pub title: String,
    pub category: Category,
    pub color: String,
    pub icon: String,
    pub levels: Vec<LevelMeta>,
}

impl GameMeta {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category: Category,
        color: impl Into<String>,
        icon: impl Into<String>,
        levels: Vec<LevelMeta>,
    ) -> Self {
        let id = id.into();
        Self {
            slug: id.clone(),
            id: GameId::new(id),
            title: title.into(),
            category,
            color: color.into(),
            icon: icon.into(),
            levels,
        }
    }

    /// Number of levels this game ships with.
    #[must_use]
    pub fn level_count(&self) -> u32 {
        u32::try_from(self.levels.len()).unwrap_or(u32::MAX)
    }
}

/// The set of games known to the app.
#[derive(Debug, Clone, Default)]
pub struct GameRegistry {
    games: Vec<GameMeta>,
}

impl GameRegistry {
    #[must_use]
    pub fn new(games: Vec<GameMeta>) -> Self {
        Self { games }
    }

    #[must_use]
    pub fn get(&self, game_id: &GameId) -> Option<&GameMeta> {
        self.games.iter().find(|game| &game.id == game_id)
    }

    #[must_use]
    pub fn games(&self) -> &[GameMeta] {
        &self.games
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// The mini-games shipped with the app.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            GameMeta::new(
                "addition-aquarium",
                "Addition Aquarium",
                Category::Math,
                "#38bdf8",
                "🐠",
                vec![
                    LevelMeta::new("Bubble Sums", "Add numbers up to 5"),
                    LevelMeta::new("Reef Count", "Add numbers up to 10"),
                    LevelMeta::new("Deep Sums", "Add numbers up to 20"),
                    LevelMeta::new("Treasure Totals", "Two-digit addition"),
                    LevelMeta::new("Ocean Master", "Mixed addition challenge"),
                ],
            ),
            GameMeta::new(
                "subtraction-submarine",
                "Subtraction Submarine",
                Category::Math,
                "#818cf8",
                "🫧",
                vec![
                    LevelMeta::new("Shallow Dive", "Take away from 5"),
                    LevelMeta::new("Sonar Drops", "Take away from 10"),
                    LevelMeta::new("Pressure Zone", "Take away from 20"),
                    LevelMeta::new("Abyss Run", "Two-digit subtraction"),
                ],
            ),
            GameMeta::new(
                "counting-carnival",
                "Counting Carnival",
                Category::Math,
                "#fbbf24",
                "🎡",
                vec![
                    LevelMeta::new("Ticket Booth", "Count objects to 10"),
                    LevelMeta::new("Ferris Wheel", "Count by twos and fives"),
                    LevelMeta::new("Grand Parade", "Count by tens past 100"),
                ],
            ),
            GameMeta::new(
                "letter-lagoon",
                "Letter Lagoon",
                Category::Reading,
                "#34d399",
                "🔤",
                vec![
                    LevelMeta::new("Splash Sounds", "Match letters to sounds"),
                    LevelMeta::new("Tide Pools", "Find the starting letter"),
                    LevelMeta::new("Coral Combos", "Blend two-letter sounds"),
                    LevelMeta::new("Lagoon Legend", "Spell short words"),
                ],
            ),
            GameMeta::new(
                "word-workshop",
                "Word Workshop",
                Category::Reading,
                "#f472b6",
                "🔧",
                vec![
                    LevelMeta::new("Nuts and Bolts", "Build three-letter words"),
                    LevelMeta::new("Assembly Line", "Build four-letter words"),
                    LevelMeta::new("Blueprints", "Build words from pictures"),
                    LevelMeta::new("Master Builder", "Build sentences"),
                ],
            ),
            GameMeta::new(
                "rhyme-racer",
                "Rhyme Racer",
                Category::Reading,
                "#fb923c",
                "🏁",
                vec![
                    LevelMeta::new("Warm-up Lap", "Pick the rhyming pair"),
                    LevelMeta::new("Speedway", "Rhyme against the clock"),
                    LevelMeta::new("Championship", "Finish the rhyming verse"),
                ],
            ),
        ])
    }
}
