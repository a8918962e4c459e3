mod ui;

use std::{error::Error, io, path::PathBuf, time::Duration};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use numquiz::{
    app::{App, Flow},
    app_dirs::AppDirs,
    catalog::ModuleKind,
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{command_for, CrosstermInput, InputEvent, InputSource, Runner},
    Difficulty, Normalization, TICK_RATE_MS,
};

use crate::ui::AppView;

/// arithmetic quiz in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practice addition, subtraction, multiplication and division with short quizzes that never repeat a question, then take a final test across all four."
)]
pub struct Cli {
    /// module to start right away instead of showing the menu
    #[clap(short, long, value_enum)]
    module: Option<ModuleKind>,

    /// difficulty level
    #[clap(short, long, value_enum)]
    difficulty: Option<Difficulty>,

    /// number of questions per test
    #[clap(short = 'n', long)]
    questions: Option<usize>,

    /// seed for a reproducible question order
    #[clap(long)]
    seed: Option<u64>,

    /// treat 3 + 4 and 4 + 3 as the same question
    #[clap(long)]
    commutative: bool,

    /// directory holding the board images; missing images are reported
    #[clap(long)]
    asset_dir: Option<PathBuf>,

    /// remember these settings as the defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Overlay command line flags on the stored preferences
    fn apply_to(&self, mut cfg: Config) -> Config {
        if let Some(difficulty) = self.difficulty {
            cfg.difficulty = difficulty;
        }
        if let Some(questions) = self.questions {
            cfg.questions_per_test = questions.max(1);
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if self.commutative {
            cfg.normalization = Normalization::Commutative;
        }
        if self.asset_dir.is_some() {
            cfg.asset_dir = self.asset_dir.clone();
        }
        cfg
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    if !io::stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let mut config = cli.apply_to(store.load());
    if cli.save_config {
        store.save(&config)?;
        info!("saved settings to {}", store.path().display());
    }
    if config.asset_dir.is_none() {
        config.asset_dir = AppDirs::asset_dir().filter(|dir| dir.is_dir());
    }

    let mut app = App::new(config)?;
    if let Some(module) = cli.module {
        app.open_module(module, app.difficulty())?;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(CrosstermInput::new(), Duration::from_millis(TICK_RATE_MS));
    let result = run(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: Backend, S: InputSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<S>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| f.render_widget(AppView(app), f.area()))?;
    loop {
        match runner.step() {
            InputEvent::Tick => continue,
            InputEvent::Resize => {}
            InputEvent::Key(key) => {
                if let Some(command) = command_for(&key) {
                    if app.handle(command) == Flow::Quit {
                        return Ok(());
                    }
                }
            }
        }
        terminal.draw(|f| f.render_widget(AppView(app), f.area()))?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use numquiz::{app::AppState, runtime::ChannelInput};
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["numquiz"]);
        assert_eq!(cli.module, None);
        assert_eq!(cli.difficulty, None);
        assert_eq!(cli.questions, None);
        assert!(!cli.commutative);
        assert_eq!(cli.apply_to(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from([
            "numquiz",
            "-m",
            "final-test",
            "-d",
            "hard",
            "-n",
            "4",
            "--seed",
            "12",
            "--commutative",
        ]);
        assert_eq!(cli.module, Some(ModuleKind::FinalTest));
        let cfg = cli.apply_to(Config::default());
        assert_eq!(cfg.difficulty, Difficulty::Hard);
        assert_eq!(cfg.questions_per_test, 4);
        assert_eq!(cfg.seed, Some(12));
        assert_eq!(cfg.normalization, Normalization::Commutative);
    }

    #[test]
    fn test_run_quits_on_q() {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(ChannelInput::new(rx), Duration::from_millis(1));
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut app = App::new(Config {
            questions_per_test: 1,
            seed: Some(2),
            ..Config::default()
        })
        .unwrap();

        for code in [KeyCode::Enter, KeyCode::Esc, KeyCode::Char('q')] {
            tx.send(InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
                .unwrap();
        }
        run(&mut terminal, &mut app, &runner).unwrap();
        assert_eq!(app.state, AppState::Menu);
    }
}
