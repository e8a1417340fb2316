//! Test data builders for manuscripts and rosters.
//!
//! Provides a fluent API for creating test chapters and characters with
//! sensible defaults.

use fabula::models::{Chapter, Character, CharacterRole};

/// Builder for test chapters.
pub struct ChapterBuilder {
    id: String,
    order_index: u32,
    content: String,
    summary: Option<String>,
}

impl ChapterBuilder {
    /// Create a chapter builder at the given narrative position.
    pub fn new(id: impl Into<String>, order_index: u32) -> Self {
        Self {
            id: id.into(),
            order_index,
            content: String::new(),
            summary: None,
        }
    }

    /// Set the chapter text.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Set the caller-supplied chapter summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Build the chapter.
    pub fn build(self) -> Chapter {
        Chapter {
            id: self.id,
            order_index: self.order_index,
            content: self.content,
            summary: self.summary,
        }
    }
}

/// Builder for test characters.
pub struct CharacterBuilder {
    id: String,
    name: String,
    aliases: Vec<String>,
    role: CharacterRole,
    traits: Vec<String>,
}

impl CharacterBuilder {
    /// Create a character builder with the given name; the id is the
    /// lowercased name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.to_lowercase(),
            name,
            aliases: Vec::new(),
            role: CharacterRole::Supporting,
            traits: Vec::new(),
        }
    }

    /// Add an alias the extractor should match.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the narrative role.
    pub fn role(mut self, role: CharacterRole) -> Self {
        self.role = role;
        self
    }

    /// Add a declared trait ("cannot swim", "honest").
    pub fn declared_trait(mut self, declared: impl Into<String>) -> Self {
        self.traits.push(declared.into());
        self
    }

    /// Build the character.
    pub fn build(self) -> Character {
        Character {
            id: self.id,
            name: self.name,
            aliases: self.aliases,
            role: self.role,
            traits: self.traits,
        }
    }
}
