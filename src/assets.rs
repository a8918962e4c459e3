use std::collections::HashMap;

use serde::Deserialize;

use crate::catalog::read_table;
use crate::difficulty::Difficulty;
use crate::error::CatalogError;

/// Static table of image assets, handed to a renderer at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetCatalog {
    boards: Vec<String>,
    sequence_boards: Vec<String>,
    difficulty_buttons: HashMap<Difficulty, String>,
}

impl AssetCatalog {
    pub const FILE: &'static str = "assets.json";

    pub fn load() -> Result<Self, CatalogError> {
        read_table(Self::FILE)
    }

    /// Board picture for a value, if one exists (0 through 10).
    pub fn board_for(&self, value: i64) -> Option<&str> {
        usize::try_from(value)
            .ok()
            .and_then(|i| self.boards.get(i))
            .map(String::as_str)
    }

    /// Board marking the 1-based position of a question within a test.
    pub fn sequence_board(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.sequence_boards.get(i))
            .map(String::as_str)
    }

    pub fn difficulty_button(&self, level: Difficulty) -> Option<&str> {
        self.difficulty_buttons.get(&level).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.boards.len() + self.sequence_boards.len() + self.difficulty_buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
