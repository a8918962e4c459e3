use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use numquiz::{
    app::{App, AppState, Flow},
    config::Config,
    runtime::{command_for, ChannelInput, InputEvent, Runner},
};

fn send_key(tx: &mpsc::Sender<InputEvent>, code: KeyCode) {
    tx.send(InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
        .unwrap();
}

// Headless run through the internal runtime without a TTY: open the first
// module from the menu and answer every question correctly.
#[test]
fn headless_quiz_flow_completes() {
    let mut app = App::new(Config {
        questions_per_test: 3,
        seed: Some(21),
        ..Config::default()
    })
    .unwrap();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelInput::new(rx), Duration::from_millis(5));

    send_key(&tx, KeyCode::Enter);

    for _ in 0..200u32 {
        match runner.step() {
            InputEvent::Tick | InputEvent::Resize => {}
            InputEvent::Key(key) => {
                if let Some(command) = command_for(&key) {
                    assert_eq!(app.handle(command), Flow::Continue);
                }
            }
        }
        if app.state == AppState::Summary {
            break;
        }
        // Feed the next answer once the previous keys are consumed
        if app.state == AppState::Quiz && app.input.is_empty() {
            if app.feedback.is_some() {
                send_key(&tx, KeyCode::Enter);
            } else if let Some(question) = app.source().and_then(|s| s.current_question()) {
                for c in question.correct_answer().to_string().chars() {
                    send_key(&tx, KeyCode::Char(c));
                }
                send_key(&tx, KeyCode::Enter);
            }
        }
    }

    assert_eq!(app.state, AppState::Summary);
    let summary = app.summary();
    assert_eq!((summary.correct, summary.incorrect), (3, 0));
}
