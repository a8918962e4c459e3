use log::debug;

use crate::error::ObserverError;
use crate::notifier::{QuizEvent, QuizObserver, SourceId};

/// Per-source share of a cumulative tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTally {
    pub source: SourceId,
    pub correct: usize,
    pub incorrect: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TallySnapshot {
    pub correct: usize,
    pub incorrect: usize,
    pub log: Vec<String>,
    pub sources: Vec<SourceTally>,
    pub aborted: bool,
}

impl TallySnapshot {
    pub fn answered(&self) -> usize {
        self.correct + self.incorrect
    }

    /// Share of correct answers in percent, rounded.
    pub fn score_percent(&self) -> Option<u32> {
        match self.answered() {
            0 => None,
            n => Some(((self.correct as f64 / n as f64) * 100.0).round() as u32),
        }
    }
}

/// Accumulates results across one or more question sources.
#[derive(Debug, Default)]
pub struct CumulativeTally {
    correct: usize,
    incorrect: usize,
    log: Vec<String>,
    sources: Vec<SourceTally>,
    aborted: bool,
}

impl CumulativeTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answered(&mut self, source: &SourceId, correct: bool, log_entry: Option<&str>) {
        let share = match self.sources.iter_mut().position(|s| &s.source == source) {
            Some(i) => &mut self.sources[i],
            None => {
                self.sources.push(SourceTally {
                    source: source.clone(),
                    correct: 0,
                    incorrect: 0,
                });
                let last = self.sources.len() - 1;
                &mut self.sources[last]
            }
        };

        if correct {
            self.correct += 1;
            share.correct += 1;
        } else {
            self.incorrect += 1;
            share.incorrect += 1;
        }
        if let Some(entry) = log_entry {
            self.log.push(entry.to_string());
        }
    }

    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            correct: self.correct,
            incorrect: self.incorrect,
            log: self.log.clone(),
            sources: self.sources.clone(),
            aborted: self.aborted,
        }
    }

    /// Starts a new session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl QuizObserver for CumulativeTally {
    fn on_event(&mut self, event: &QuizEvent) -> Result<(), ObserverError> {
        match event {
            QuizEvent::Answered(report) => {
                self.answered(&report.source, report.correct, report.log_entry.as_deref());
            }
            QuizEvent::HomeRequested => {
                debug!("tally: session aborted");
                self.aborted = true;
            }
            QuizEvent::NextRequested | QuizEvent::Custom(_) => {}
        }
        Ok(())
    }
}
