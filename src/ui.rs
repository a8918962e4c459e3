use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use numquiz::{
    app::{App, AppState},
    catalog::{EnumerableButtonFactory, ModuleSelectButton},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Borrowed view of the app for one frame.
pub struct AppView<'a>(pub &'a App);

impl Widget for AppView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(2),
            ])
            .split(area);

        header(app).render(chunks[0], buf);
        match app.state {
            AppState::Menu => menu(app).render(chunks[1], buf),
            AppState::Quiz => quiz(app).render(chunks[1], buf),
            AppState::Summary => summary(app).render(chunks[1], buf),
        }
        footer(app).render(chunks[2], buf);
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn header(app: &App) -> Paragraph<'static> {
    let title = match (app.state, app.module()) {
        (AppState::Menu, _) => app.modules.title_text().to_string(),
        (_, Some(module)) => format!("{module} · {}", app.difficulty()),
        (_, None) => "results".to_string(),
    };
    Paragraph::new(Line::from(Span::styled(title, bold().fg(Color::Magenta))))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM))
}

fn menu(app: &App) -> Paragraph<'static> {
    let mut lines: Vec<Line> = app
        .modules
        .buttons()
        .iter()
        .map(|button| {
            if button.ordinal() == app.selected {
                Line::from(Span::styled(
                    format!("> {}", button.name()),
                    bold().fg(Color::Green),
                ))
            } else {
                Line::from(format!("  {}", button.name()))
            }
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("difficulty: {}", app.difficulty()),
        Style::default().add_modifier(Modifier::ITALIC),
    )));
    Paragraph::new(lines).alignment(Alignment::Center)
}

fn quiz(app: &App) -> Paragraph<'static> {
    let Some(view) = app.current_view() else {
        return Paragraph::new("");
    };
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} {}/{}", view.source, view.index, view.max),
            Style::default().add_modifier(Modifier::DIM),
        )),
        Line::from(""),
        Line::from(Span::styled(view.text, bold())),
        Line::from(""),
        Line::from(format!("> {}_", app.input)),
    ];
    if let Some(feedback) = &app.feedback {
        let line = if feedback.correct {
            Span::styled("correct!", bold().fg(Color::Green))
        } else {
            Span::styled(
                format!("{} is wrong, the answer is {}", feedback.given, feedback.expected),
                bold().fg(Color::Red),
            )
        };
        lines.push(Line::from(""));
        lines.push(Line::from(line));
    }
    if let Some(notice) = &app.notice {
        lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}

fn summary(app: &App) -> Paragraph<'static> {
    let snap = app.summary();
    let score = snap
        .score_percent()
        .map_or_else(|| "-".to_string(), |p| format!("{p}%"));
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} correct, {} wrong ({score})", snap.correct, snap.incorrect),
            bold(),
        )),
        Line::from(""),
    ];
    for source in &snap.sources {
        lines.push(Line::from(format!(
            "{}: {}/{}",
            source.source.name(),
            source.correct,
            source.correct + source.incorrect
        )));
    }
    if !snap.log.is_empty() {
        lines.push(Line::from(""));
        lines.extend(
            snap.log
                .iter()
                .map(|entry| Line::from(Span::styled(entry.clone(), Style::default().fg(Color::Red)))),
        );
    }
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}

fn footer(app: &App) -> Paragraph<'static> {
    let keys = match app.state {
        AppState::Menu => "↑/↓ choose  enter open  (e)asy (n)ormal (h)ard  q quit",
        AppState::Quiz if app.feedback.is_some() => "enter next  esc home",
        AppState::Quiz => "type the answer  enter submit  esc home",
        AppState::Summary => "enter menu  q quit",
    };
    Paragraph::new(Span::styled(
        keys,
        Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use numquiz::{catalog::ModuleKind, config::Config, Difficulty};
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| f.render_widget(AppView(app), f.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    fn app() -> App {
        App::new(Config {
            questions_per_test: 2,
            seed: Some(3),
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn test_menu_lists_modules() {
        let content = rendered(&app());
        assert!(content.contains("Pick a module"));
        assert!(content.contains("> Addition"));
        assert!(content.contains("Final Test"));
        assert!(content.contains("difficulty: easy"));
    }

    #[test]
    fn test_quiz_shows_question() {
        let mut app = app();
        app.open_module(ModuleKind::Addition, Difficulty::Easy).unwrap();
        let text = app.current_view().unwrap().text;
        let content = rendered(&app);
        assert!(content.contains(&text));
        assert!(content.contains("addition 1/2"));
    }

    #[test]
    fn test_summary_shows_score() {
        let mut app = app();
        app.open_module(ModuleKind::Addition, Difficulty::Easy).unwrap();
        app.state = AppState::Summary;
        let content = rendered(&app);
        assert!(content.contains("0 correct, 0 wrong (-)"));
    }
}
