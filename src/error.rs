//! Error kinds shared by the quiz engine.

use std::io;

use thiserror::Error;

use crate::notifier::ObserverHandle;

/// Errors raised by the rendering collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    #[error("asset `{asset}` could not be loaded")]
    AssetMissing {
        asset: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors reading the embedded button and asset tables.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog file `{0}` not found")]
    Missing(String),
    #[error("catalog file `{0}` is not valid UTF-8")]
    Encoding(String),
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}

/// Error returned by a single observer callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ObserverError {
    #[error("observer is already handling an event")]
    Busy,
    #[error("{0}")]
    Failed(String),
}

/// Every observer failure collected during one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("{}", describe_failures(.failures))]
pub struct DispatchError {
    pub failures: Vec<(ObserverHandle, ObserverError)>,
}

fn describe_failures(failures: &[(ObserverHandle, ObserverError)]) -> String {
    let mut text = format!("{} observer(s) failed during dispatch", failures.len());
    for (handle, err) in failures {
        text.push_str(&format!("; {handle}: {err}"));
    }
    text
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("division by zero")]
    DivideByZero,

    #[error(transparent)]
    AssetLoad(#[from] RenderError),

    #[error("no unused question left ({asked} of {max} issued)")]
    ConfigurationExhausted { asked: usize, max: usize },

    #[error("invalid quiz configuration: {0}")]
    InvalidConfiguration(String),

    #[error("question {requested} requested while on question {current}")]
    QuestionOutOfSequence { requested: usize, current: usize },

    #[error("current question has not been answered yet")]
    AnswerPending,

    #[error("no question is waiting for an answer")]
    NoActiveQuestion,

    #[error("answer is empty")]
    EmptyAnswer,

    #[error("session was aborted")]
    SessionAborted,

    #[error("event `{0}` cannot be sent without a payload")]
    UnknownEvent(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
