//! Screen-level state for the terminal front end.
//!
//! `App` plays the screen and navigation collaborator: it owns the menus,
//! builds question sources for the chosen module, forwards typed answers and
//! keeps the tally the summary screen shows. It draws nothing itself.

use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};

use crate::assets::AssetCatalog;
use crate::catalog::{ButtonMenu, EnumerableButtonFactory, ModuleKind, NavigationRequests};
use crate::config::Config;
use crate::difficulty::{Difficulty, GenerationPolicy};
use crate::error::{CatalogError, QuizError, RenderError};
use crate::final_test::FinalTest;
use crate::notifier::Testable;
use crate::render::{AssetRoot, QuestionView, Renderer};
use crate::runtime::Command;
use crate::source::QuestionSource;
use crate::tally::{CumulativeTally, TallySnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    Quiz,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Result of the last submitted answer, shown until the learner moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    pub expected: i64,
    pub given: String,
}

/// The last question handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedQuestion {
    pub text: String,
    pub index: usize,
    pub max: usize,
    pub source: String,
    pub assets: Vec<String>,
}

/// Renderer that keeps the view for the next frame.
pub struct ViewCapture {
    slot: Rc<RefCell<Option<CapturedQuestion>>>,
    assets: AssetCatalog,
    root: Option<AssetRoot>,
}

impl Renderer for ViewCapture {
    fn render(&mut self, view: &QuestionView<'_>) -> Result<(), RenderError> {
        let assets = view.assets(&self.assets);
        if let Some(root) = &self.root {
            for asset in &assets {
                root.verify(asset)?;
            }
        }
        *self.slot.borrow_mut() = Some(CapturedQuestion {
            text: view.question.text(),
            index: view.question.index(),
            max: view.max_questions,
            source: view.source.name().to_string(),
            assets: assets.into_iter().map(str::to_string).collect(),
        });
        Ok(())
    }
}

const ANSWER_MAX_LEN: usize = 6;

pub struct App {
    pub config: Config,
    pub state: AppState,
    pub modules: ButtonMenu,
    pub difficulties: ButtonMenu,
    pub selected: usize,
    pub input: String,
    pub feedback: Option<Feedback>,
    pub notice: Option<String>,
    module: Option<ModuleKind>,
    assets: AssetCatalog,
    view: Rc<RefCell<Option<CapturedQuestion>>>,
    source: Option<QuestionSource>,
    final_test: Option<FinalTest>,
    tally: Rc<RefCell<CumulativeTally>>,
}

impl App {
    pub fn new(config: Config) -> Result<Self, CatalogError> {
        let mut modules = ButtonMenu::modules()?;
        modules.select_difficulty(config.difficulty);
        Ok(Self {
            config,
            state: AppState::Menu,
            modules,
            difficulties: ButtonMenu::difficulties()?,
            selected: 0,
            input: String::new(),
            feedback: None,
            notice: None,
            module: None,
            assets: AssetCatalog::load()?,
            view: Rc::new(RefCell::new(None)),
            source: None,
            final_test: None,
            tally: Rc::new(RefCell::new(CumulativeTally::new())),
        })
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    pub fn module(&self) -> Option<ModuleKind> {
        self.module
    }

    pub fn source(&self) -> Option<&QuestionSource> {
        self.source.as_ref()
    }

    /// What to show for the current question. Falls back to plain text when
    /// the renderer could not load its assets.
    pub fn current_view(&self) -> Option<CapturedQuestion> {
        let source = self.source.as_ref()?;
        let question = source.current_question()?;
        match self.view.borrow().as_ref() {
            Some(captured) if captured.index == question.index() => Some(captured.clone()),
            _ => Some(CapturedQuestion {
                text: question.text(),
                index: question.index(),
                max: source.max_questions(),
                source: source.source_id().name().to_string(),
                assets: Vec::new(),
            }),
        }
    }

    pub fn summary(&self) -> TallySnapshot {
        self.tally.borrow().snapshot()
    }

    fn renderer(&self) -> Box<dyn Renderer> {
        Box::new(ViewCapture {
            slot: self.view.clone(),
            assets: self.assets.clone(),
            root: self.config.asset_dir.as_ref().map(AssetRoot::new),
        })
    }

    pub fn handle(&mut self, command: Command) -> Flow {
        if command == Command::Quit {
            return Flow::Quit;
        }
        let result = match self.state {
            AppState::Menu => self.handle_menu(command),
            AppState::Quiz => self.handle_quiz(command),
            AppState::Summary => {
                if matches!(command, Command::Submit | Command::Home) {
                    self.go_home();
                }
                Ok(())
            }
        };
        if let Err(err) = result {
            warn!("{err}");
            self.notice = Some(err.to_string());
        }
        Flow::Continue
    }

    fn handle_menu(&mut self, command: Command) -> Result<(), QuizError> {
        let mut nav = NavigationRequests::default();
        match command {
            Command::Up => self.selected = self.selected.saturating_sub(1),
            Command::Down => {
                self.selected = (self.selected + 1).min(self.modules.number_of_buttons() - 1)
            }
            Command::Submit => {
                self.modules.press(self.selected, &mut nav);
            }
            Command::Difficulty(key) => {
                let ordinal = match key {
                    'e' => 0,
                    'n' => 1,
                    _ => 2,
                };
                self.difficulties.press(ordinal, &mut nav);
            }
            _ => {}
        }
        self.apply(nav)
    }

    fn apply(&mut self, nav: NavigationRequests) -> Result<(), QuizError> {
        if let Some(level) = nav.difficulty {
            self.config.difficulty = level;
            self.modules.select_difficulty(level);
        }
        if nav.home {
            self.go_home();
        }
        if let Some((module, difficulty)) = nav.open {
            self.open_module(module, difficulty)?;
        }
        Ok(())
    }

    /// Opens `module` at `difficulty`. Nothing changes if the source cannot
    /// be built.
    pub fn open_module(&mut self, module: ModuleKind, difficulty: Difficulty) -> Result<(), QuizError> {
        let config = Config {
            difficulty,
            ..self.config.clone()
        };

        let (source, final_test, tally) = match module.operator() {
            Some(op) => {
                let policy = GenerationPolicy::for_difficulty(difficulty).only(op);
                let source = QuestionSource::new(config.source_config(policy, op.name()), self.renderer())?;
                let tally = Rc::new(RefCell::new(CumulativeTally::new()));
                source.register_observer(&tally);
                (source, None, tally)
            }
            None => {
                let mut test = FinalTest::standard(&config)?;
                let source = test
                    .next_stage(self.renderer())?
                    .ok_or(QuizError::NoActiveQuestion)?;
                let tally = test.tally();
                (source, Some(test), tally)
            }
        };
        info!("opened {module} ({difficulty})");

        self.config = config;
        self.notice = None;
        self.feedback = None;
        self.input.clear();
        *self.view.borrow_mut() = None;
        self.tally = tally;
        self.final_test = final_test;
        self.module = Some(module);
        self.source = Some(source);
        self.state = AppState::Quiz;
        self.show_next()
    }

    fn show_next(&mut self) -> Result<(), QuizError> {
        let Some(source) = self.source.as_mut() else {
            return Err(QuizError::NoActiveQuestion);
        };
        match source.show_next() {
            Ok(_) => Ok(()),
            Err(QuizError::AssetLoad(err)) => {
                // the question is issued; show it as text
                self.notice = Some(format!("showing text only: {err}"));
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn handle_quiz(&mut self, command: Command) -> Result<(), QuizError> {
        match command {
            Command::Type(c) if self.feedback.is_none() => {
                let leading_minus = c == '-' && self.input.is_empty();
                if (c.is_ascii_digit() || leading_minus) && self.input.len() < ANSWER_MAX_LEN {
                    self.input.push(c);
                }
                Ok(())
            }
            Command::Erase => {
                self.input.pop();
                Ok(())
            }
            Command::Submit if self.feedback.is_some() => self.advance(),
            Command::Submit => self.submit(),
            Command::Home => {
                if let Some(source) = self.source.as_mut() {
                    source.request_home()?;
                }
                self.go_home();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn submit(&mut self) -> Result<(), QuizError> {
        let Some(source) = self.source.as_mut() else {
            return Err(QuizError::NoActiveQuestion);
        };
        let given = std::mem::take(&mut self.input);
        match source.submit_answer(&given) {
            Ok(outcome) => {
                self.feedback = Some(Feedback {
                    correct: outcome.correct,
                    expected: outcome.expected,
                    given,
                });
                Ok(())
            }
            Err(QuizError::Dispatch(err)) => {
                // scored already; only an observer failed
                if let Some(question) = source.current_question() {
                    let correct = given
                        .trim()
                        .parse::<i64>()
                        .is_ok_and(|answer| question.is_correct(answer));
                    self.feedback = Some(Feedback {
                        correct,
                        expected: question.correct_answer(),
                        given,
                    });
                }
                Err(QuizError::Dispatch(err))
            }
            Err(err) => {
                self.input = given;
                Err(err)
            }
        }
    }

    fn advance(&mut self) -> Result<(), QuizError> {
        self.feedback = None;
        self.notice = None;
        let Some(source) = self.source.as_ref() else {
            return Err(QuizError::NoActiveQuestion);
        };
        if !source.is_complete() {
            match source.request_next() {
                Ok(()) => {}
                Err(QuizError::Dispatch(err)) => warn!("{err}"),
                Err(err) => return Err(err),
            }
            return self.show_next();
        }

        let renderer = self.renderer();
        let next_stage = match self.final_test.as_mut() {
            Some(test) => test.next_stage(renderer)?,
            None => None,
        };
        match next_stage {
            Some(stage) => {
                self.source = Some(stage);
                self.show_next()
            }
            None => {
                self.source = None;
                self.state = AppState::Summary;
                Ok(())
            }
        }
    }

    fn go_home(&mut self) {
        self.source = None;
        self.final_test = None;
        self.module = None;
        self.feedback = None;
        self.input.clear();
        *self.view.borrow_mut() = None;
        self.state = AppState::Menu;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Normalization;
    use crate::error::ObserverError;
    use crate::notifier::{QuizEvent, QuizObserver};

    fn app() -> App {
        App::new(Config {
            questions_per_test: 3,
            seed: Some(4),
            ..Config::default()
        })
        .unwrap()
    }

    fn type_answer(app: &mut App, answer: i64) {
        for c in answer.to_string().chars() {
            app.handle(Command::Type(c));
        }
    }

    #[test]
    fn test_starts_on_menu() {
        let app = app();
        assert_eq!(app.state, AppState::Menu);
        assert_eq!(app.difficulty(), Difficulty::Easy);
        assert!(app.current_view().is_none());
    }

    #[test]
    fn test_menu_navigation_opens_module() {
        let mut app = app();
        app.handle(Command::Down);
        app.handle(Command::Up);
        app.handle(Command::Submit);
        assert_eq!(app.state, AppState::Quiz);
        assert_eq!(app.module(), Some(ModuleKind::Addition));
        let view = app.current_view().unwrap();
        assert_eq!(view.index, 1);
        assert_eq!(view.max, 3);
        assert!(view.text.contains('+'));
    }

    #[test]
    fn test_difficulty_key_changes_modules() {
        let mut app = app();
        app.handle(Command::Difficulty('h'));
        assert_eq!(app.difficulty(), Difficulty::Hard);
        app.handle(Command::Submit);
        assert_eq!(app.source().unwrap().difficulty(), Difficulty::Hard);
    }

    #[test]
    fn test_full_module_reaches_summary() {
        let mut app = app();
        app.open_module(ModuleKind::Multiplication, Difficulty::Normal)
            .unwrap();
        for _ in 0..3 {
            let expected = app.source().unwrap().current_question().unwrap().correct_answer();
            type_answer(&mut app, expected);
            app.handle(Command::Submit);
            assert_eq!(app.feedback.as_ref().map(|f| f.correct), Some(true));
            app.handle(Command::Submit);
        }
        assert_eq!(app.state, AppState::Summary);
        let summary = app.summary();
        assert_eq!((summary.correct, summary.incorrect), (3, 0));

        app.handle(Command::Submit);
        assert_eq!(app.state, AppState::Menu);
    }

    #[test]
    fn test_typing_rules() {
        let mut app = app();
        app.open_module(ModuleKind::Addition, Difficulty::Easy).unwrap();
        app.handle(Command::Type('-'));
        app.handle(Command::Type('1'));
        app.handle(Command::Type('-'));
        assert_eq!(app.input, "-1");
        app.handle(Command::Erase);
        assert_eq!(app.input, "-");
    }

    #[test]
    fn test_empty_submit_sets_notice() {
        let mut app = app();
        app.open_module(ModuleKind::Addition, Difficulty::Easy).unwrap();
        app.handle(Command::Submit);
        assert!(app.feedback.is_none());
        assert_eq!(app.notice.as_deref(), Some("answer is empty"));
    }

    #[test]
    fn test_home_aborts_to_menu() {
        let mut app = app();
        app.open_module(ModuleKind::Subtraction, Difficulty::Normal).unwrap();
        app.handle(Command::Home);
        assert_eq!(app.state, AppState::Menu);
        assert!(app.source().is_none());
        assert!(app.summary().aborted);
    }

    #[test]
    fn test_missing_assets_degrade_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(Config {
            questions_per_test: 2,
            seed: Some(1),
            asset_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        })
        .unwrap();
        app.open_module(ModuleKind::Addition, Difficulty::Easy).unwrap();
        assert_eq!(app.state, AppState::Quiz);
        assert!(app.notice.as_deref().unwrap().starts_with("showing text only"));
        let view = app.current_view().unwrap();
        assert!(view.assets.is_empty());
        assert_eq!(view.index, 1);
    }

    #[test]
    fn test_final_test_uses_config_normalization() {
        let mut app = App::new(Config {
            questions_per_test: 2,
            seed: Some(6),
            normalization: Normalization::Commutative,
            ..Config::default()
        })
        .unwrap();
        app.open_module(ModuleKind::Addition, Difficulty::Easy).unwrap();
        assert_eq!(app.source().unwrap().capacity(), 21);

        app.handle(Command::Home);
        app.open_module(ModuleKind::FinalTest, Difficulty::Easy).unwrap();
        assert_eq!(app.source().unwrap().capacity(), 21);
    }

    #[test]
    fn test_zero_question_config_opens_every_module() {
        let mut app = App::new(Config {
            questions_per_test: 0,
            seed: Some(2),
            ..Config::default()
        })
        .unwrap();
        app.open_module(ModuleKind::Addition, Difficulty::Easy).unwrap();
        assert_eq!(app.current_view().unwrap().max, 1);

        app.handle(Command::Home);
        app.open_module(ModuleKind::FinalTest, Difficulty::Easy).unwrap();
        assert_eq!(app.state, AppState::Quiz);
        assert_eq!(app.current_view().unwrap().max, 1);
    }

    #[test]
    fn test_observer_failure_still_shows_feedback() {
        struct Grumpy;
        impl QuizObserver for Grumpy {
            fn on_event(&mut self, _event: &QuizEvent) -> Result<(), ObserverError> {
                Err(ObserverError::Failed("offline".into()))
            }
        }

        let mut app = app();
        app.open_module(ModuleKind::Addition, Difficulty::Easy).unwrap();
        let grumpy = Rc::new(RefCell::new(Grumpy));
        app.source().unwrap().register_observer(&grumpy);

        let expected = app.source().unwrap().current_question().unwrap().correct_answer();
        type_answer(&mut app, expected);
        app.handle(Command::Submit);
        assert_eq!(
            app.feedback,
            Some(Feedback {
                correct: true,
                expected,
                given: expected.to_string(),
            })
        );
        assert!(app.notice.as_deref().unwrap().contains("offline"));

        app.handle(Command::Submit);
        assert!(app.feedback.is_none());
        assert_eq!(app.current_view().unwrap().index, 2);
    }

    #[test]
    fn test_final_test_runs_all_stages() {
        let mut app = app();
        app.open_module(ModuleKind::FinalTest, Difficulty::Easy).unwrap();
        let mut answered = 0;
        while app.state == AppState::Quiz {
            type_answer(&mut app, 1000);
            app.handle(Command::Submit);
            app.handle(Command::Submit);
            answered += 1;
            assert!(answered <= 12);
        }
        assert_eq!(app.state, AppState::Summary);
        let summary = app.summary();
        assert_eq!(summary.incorrect, 12);
        assert_eq!(summary.sources.len(), 4);
    }
}
