use serde::{Deserialize, Serialize};

/// Narrative role of a character within the manuscript.
///
/// Ordered by narrative weight: protagonists and antagonists carry more
/// importance than supporting or minor cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterRole {
    Protagonist,
    Antagonist,
    Supporting,
    Minor,
}

impl CharacterRole {
    /// Importance weight contributed by the declared role alone.
    pub fn weight(&self) -> f32 {
        match self {
            CharacterRole::Protagonist => 1.0,
            CharacterRole::Antagonist => 0.9,
            CharacterRole::Supporting => 0.5,
            CharacterRole::Minor => 0.2,
        }
    }
}

/// A character from the manuscript's roster as supplied by the caller.
///
/// Immutable input. `aliases` are alternative names the extractor matches
/// alongside `name` (nicknames, titles, maiden names).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub role: CharacterRole,
    /// Declared traits, e.g. "cannot swim", "honest", "blind".
    #[serde(default)]
    pub traits: Vec<String>,
}

impl Character {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: CharacterRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aliases: Vec::new(),
            role,
            traits: Vec::new(),
        }
    }

    /// All names this character answers to, primary name first.
    pub fn known_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(|a| a.as_str()))
    }
}
