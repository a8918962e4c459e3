//! Selectable module and difficulty buttons.
//!
//! Button tables are static data embedded at build time. A button knows its
//! label, image asset, default layout position and what it does when pressed;
//! it never holds a UI-toolkit widget. The screen that hosts it maps buttons
//! to whatever widgets it draws.

use include_dir::{include_dir, Dir};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::error::CatalogError;
use crate::operator::Operator;

static CATALOG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/catalog");

pub(crate) fn read_table<T: DeserializeOwned>(file_name: &str) -> Result<T, CatalogError> {
    let file = CATALOG_DIR
        .get_file(file_name)
        .ok_or_else(|| CatalogError::Missing(file_name.to_string()))?;
    let contents = file
        .contents_utf8()
        .ok_or_else(|| CatalogError::Encoding(file_name.to_string()))?;
    Ok(serde_json::from_str(contents)?)
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModuleKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    FinalTest,
}

impl ModuleKind {
    /// The single operator a skill module drills; `None` for the final test.
    pub fn operator(self) -> Option<Operator> {
        match self {
            ModuleKind::Addition => Some(Operator::Add),
            ModuleKind::Subtraction => Some(Operator::Subtract),
            ModuleKind::Multiplication => Some(Operator::Multiply),
            ModuleKind::Division => Some(Operator::Divide),
            ModuleKind::FinalTest => None,
        }
    }
}

/// Navigation collaborator that buttons act upon.
pub trait Screen {
    fn open_module(&mut self, module: ModuleKind, difficulty: Difficulty);
    fn select_difficulty(&mut self, level: Difficulty);
    fn go_home(&mut self);
}

pub trait ModuleSelectButton {
    fn name(&self) -> &str;
    fn asset_file(&self) -> &str;
    fn default_position(&self) -> (u32, u32);
    fn ordinal(&self) -> usize;
    fn do_action(&self, screen: &mut dyn Screen);

    /// Called when the learner picks a difficulty. Buttons that do not depend
    /// on the difficulty ignore it.
    fn difficulty_selected(&mut self, _level: Difficulty) {}
}

pub trait EnumerableButtonFactory {
    fn buttons(&self) -> Vec<&dyn ModuleSelectButton>;

    fn number_of_buttons(&self) -> usize {
        self.buttons().len()
    }

    fn title_text(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    Open(ModuleKind),
    Difficulty(Difficulty),
    Home,
}

#[derive(Debug, Clone, Deserialize)]
struct ButtonRow {
    name: String,
    asset: String,
    x: u32,
    y: u32,
    action: ButtonAction,
}

#[derive(Debug, Clone, Deserialize)]
struct MenuTable {
    title: String,
    buttons: Vec<ButtonRow>,
}

#[derive(Debug, Clone)]
pub struct CatalogButton {
    row: ButtonRow,
    ordinal: usize,
    difficulty: Difficulty,
}

impl CatalogButton {
    pub fn action(&self) -> ButtonAction {
        self.row.action
    }

    /// Difficulty a module button will open its module with.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

impl ModuleSelectButton for CatalogButton {
    fn name(&self) -> &str {
        &self.row.name
    }

    fn asset_file(&self) -> &str {
        &self.row.asset
    }

    fn default_position(&self) -> (u32, u32) {
        (self.row.x, self.row.y)
    }

    fn ordinal(&self) -> usize {
        self.ordinal
    }

    fn do_action(&self, screen: &mut dyn Screen) {
        match self.row.action {
            ButtonAction::Open(module) => screen.open_module(module, self.difficulty),
            ButtonAction::Difficulty(level) => screen.select_difficulty(level),
            ButtonAction::Home => screen.go_home(),
        }
    }

    fn difficulty_selected(&mut self, level: Difficulty) {
        if let ButtonAction::Open(_) = self.row.action {
            self.difficulty = level;
        }
    }
}

/// A titled, ordered set of catalog buttons.
#[derive(Debug, Clone)]
pub struct ButtonMenu {
    title: String,
    buttons: Vec<CatalogButton>,
}

impl ButtonMenu {
    pub const MODULES: &'static str = "modules.json";
    pub const DIFFICULTIES: &'static str = "difficulty.json";

    pub fn load(file_name: &str) -> Result<Self, CatalogError> {
        let table: MenuTable = read_table(file_name)?;
        let buttons = table
            .buttons
            .into_iter()
            .enumerate()
            .map(|(ordinal, row)| CatalogButton {
                row,
                ordinal,
                difficulty: Difficulty::default(),
            })
            .collect();
        Ok(Self {
            title: table.title,
            buttons,
        })
    }

    pub fn modules() -> Result<Self, CatalogError> {
        Self::load(Self::MODULES)
    }

    pub fn difficulties() -> Result<Self, CatalogError> {
        Self::load(Self::DIFFICULTIES)
    }

    pub fn button(&self, ordinal: usize) -> Option<&CatalogButton> {
        self.buttons.get(ordinal)
    }

    /// Forwards a difficulty choice to every button.
    pub fn select_difficulty(&mut self, level: Difficulty) {
        for button in &mut self.buttons {
            button.difficulty_selected(level);
        }
    }

    /// Runs the action of the button at `ordinal`; false if there is none.
    pub fn press(&self, ordinal: usize, screen: &mut dyn Screen) -> bool {
        match self.buttons.get(ordinal) {
            Some(button) => {
                button.do_action(screen);
                true
            }
            None => false,
        }
    }
}

impl EnumerableButtonFactory for ButtonMenu {
    fn buttons(&self) -> Vec<&dyn ModuleSelectButton> {
        self.buttons
            .iter()
            .map(|b| b as &dyn ModuleSelectButton)
            .collect()
    }

    fn title_text(&self) -> &str {
        &self.title
    }
}

/// Screen stub that records navigation requests for the caller to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationRequests {
    pub open: Option<(ModuleKind, Difficulty)>,
    pub difficulty: Option<Difficulty>,
    pub home: bool,
}

impl Screen for NavigationRequests {
    fn open_module(&mut self, module: ModuleKind, difficulty: Difficulty) {
        self.open = Some((module, difficulty));
    }

    fn select_difficulty(&mut self, level: Difficulty) {
        self.difficulty = Some(level);
    }

    fn go_home(&mut self) {
        self.home = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_module_menu_loads() {
        let menu = ButtonMenu::modules().unwrap();
        assert_eq!(menu.title_text(), "Pick a module");
        assert_eq!(menu.number_of_buttons(), menu.buttons().len());
        assert_eq!(menu.number_of_buttons(), 5);

        let names: Vec<&str> = menu.buttons().iter().map(|b| b.name()).collect();
        assert_eq!(
            names,
            ["Addition", "Subtraction", "Multiplication", "Division", "Final Test"]
        );
    }

    #[test]
    fn test_ordinals_follow_table_order() {
        let menu = ButtonMenu::difficulties().unwrap();
        for (i, button) in menu.buttons().iter().enumerate() {
            assert_eq!(button.ordinal(), i);
        }
        assert_eq!(menu.buttons()[0].default_position(), (120, 480));
        assert_eq!(menu.buttons()[0].asset_file(), "difficulty/easy.png");
    }

    #[test]
    fn test_module_button_opens_with_selected_difficulty() {
        let mut menu = ButtonMenu::modules().unwrap();
        let mut nav = NavigationRequests::default();
        assert!(menu.press(0, &mut nav));
        assert_eq!(nav.open, Some((ModuleKind::Addition, Difficulty::Easy)));

        menu.select_difficulty(Difficulty::Hard);
        let mut nav = NavigationRequests::default();
        menu.press(3, &mut nav);
        assert_eq!(nav.open, Some((ModuleKind::Division, Difficulty::Hard)));
    }

    #[test]
    fn test_difficulty_buttons_ignore_difficulty_selected() {
        let mut menu = ButtonMenu::difficulties().unwrap();
        menu.select_difficulty(Difficulty::Hard);
        let easy = menu.button(0).unwrap();
        assert_eq!(easy.action(), ButtonAction::Difficulty(Difficulty::Easy));
        assert_eq!(easy.difficulty(), Difficulty::Easy);

        let mut nav = NavigationRequests::default();
        easy.do_action(&mut nav);
        assert_eq!(nav.difficulty, Some(Difficulty::Easy));
        assert_eq!(nav.open, None);
    }

    #[test]
    fn test_home_button() {
        let menu = ButtonMenu::difficulties().unwrap();
        let mut nav = NavigationRequests::default();
        assert!(menu.press(3, &mut nav));
        assert!(nav.home);
        assert!(!menu.press(99, &mut nav));
    }

    #[test]
    fn test_missing_table() {
        assert_matches!(
            ButtonMenu::load("nope.json"),
            Err(CatalogError::Missing(name)) if name == "nope.json"
        );
    }

    #[test]
    fn test_module_operators() {
        assert_eq!(ModuleKind::Multiplication.operator(), Some(Operator::Multiply));
        assert_eq!(ModuleKind::FinalTest.operator(), None);
        assert_eq!(ModuleKind::FinalTest.to_string(), "final_test");
    }
}
