//! A question source: generates, renders and scores one test's questions.
//!
//! The source enumerates its policy's domain up front and draws each new
//! question uniformly among the permutations it has not issued yet, so
//! generation always terminates: once nothing is left (or the configured
//! limit is reached) it fails with [`QuizError::ConfigurationExhausted`].

use std::collections::HashSet;
use std::rc::Rc;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::difficulty::{Difficulty, GenerationPolicy, Normalization};
use crate::error::QuizError;
use crate::notifier::{AnswerReport, Notifier, QuizEvent, SourceId, Testable};
use crate::question::{Permutation, Question};
use crate::render::{QuestionView, Renderer};

/// How to build a [`QuestionSource`].
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub name: String,
    pub difficulty: Difficulty,
    pub policy: GenerationPolicy,
    /// Ask fewer questions than the policy allows. `None` asks them all.
    pub question_limit: Option<usize>,
    pub seed: Option<u64>,
}

impl SourceConfig {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            name: difficulty.to_string(),
            difficulty,
            policy: GenerationPolicy::for_difficulty(difficulty),
            question_limit: None,
            seed: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_policy(mut self, policy: GenerationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.question_limit = Some(limit);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No question issued yet.
    Ready,
    AwaitingAnswer,
    Answered,
    Complete,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub expected: i64,
    pub log_entry: Option<String>,
    /// The answered question was the last one.
    pub finished: bool,
}

pub struct QuestionSource {
    id: SourceId,
    difficulty: Difficulty,
    normalization: Normalization,
    domain: Vec<Permutation>,
    max_questions: usize,
    asked: HashSet<Permutation>,
    current: Option<Question>,
    phase: Phase,
    correct_count: usize,
    wrong_log: Vec<String>,
    rng: StdRng,
    renderer: Box<dyn Renderer>,
    notifier: Rc<Notifier>,
}

impl std::fmt::Debug for QuestionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionSource")
            .field("id", &self.id)
            .field("difficulty", &self.difficulty)
            .field("max_questions", &self.max_questions)
            .field("current_index", &self.asked.len())
            .field("phase", &self.phase)
            .field("correct_count", &self.correct_count)
            .finish()
    }
}

impl QuestionSource {
    /// Builds a source. Fails if the policy is empty, or if the question
    /// limit is zero or larger than the number of distinct questions.
    pub fn new(config: SourceConfig, renderer: Box<dyn Renderer>) -> Result<Self, QuizError> {
        config.policy.validate()?;
        let domain = config.policy.domain();
        let capacity = domain.len();
        if capacity == 0 {
            return Err(QuizError::InvalidConfiguration(
                "policy admits no question".to_string(),
            ));
        }
        let max_questions = match config.question_limit {
            Some(0) => {
                return Err(QuizError::InvalidConfiguration(
                    "question limit must be at least 1".to_string(),
                ))
            }
            Some(limit) if limit > capacity => {
                return Err(QuizError::InvalidConfiguration(format!(
                    "question limit {limit} exceeds the {capacity} distinct questions available"
                )))
            }
            Some(limit) => limit,
            None => capacity,
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let id = SourceId::new(config.name);
        debug!("{id}: {max_questions} of {capacity} questions");

        Ok(Self {
            id,
            difficulty: config.difficulty,
            normalization: config.policy.normalization,
            domain,
            max_questions,
            asked: HashSet::with_capacity(max_questions),
            current: None,
            phase: Phase::Ready,
            correct_count: 0,
            wrong_log: Vec::new(),
            rng,
            renderer,
            notifier: Rc::new(Notifier::new()),
        })
    }

    pub fn source_id(&self) -> &SourceId {
        &self.id
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Upper bound on the questions this source will issue.
    pub fn max_questions(&self) -> usize {
        self.max_questions
    }

    /// Distinct permutations the policy can produce.
    pub fn capacity(&self) -> usize {
        self.domain.len()
    }

    pub fn current_index(&self) -> usize {
        self.asked.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn wrong_log(&self) -> &[String] {
        &self.wrong_log
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn is_aborted(&self) -> bool {
        self.phase == Phase::Aborted
    }

    /// Shows question `question_num`.
    ///
    /// The next number issues and renders a new question; the current number
    /// renders the current question again (used after a render failure).
    pub fn show_question(&mut self, question_num: usize) -> Result<&Question, QuizError> {
        if self.phase == Phase::Aborted {
            return Err(QuizError::SessionAborted);
        }
        let current = self.current_index();

        if question_num == current && current > 0 {
            self.render_current()?;
            return self.current.as_ref().ok_or(QuizError::NoActiveQuestion);
        }
        if question_num > self.max_questions {
            return Err(QuizError::ConfigurationExhausted {
                asked: current,
                max: self.max_questions,
            });
        }
        if question_num != current + 1 {
            return Err(QuizError::QuestionOutOfSequence {
                requested: question_num,
                current,
            });
        }
        if self.phase == Phase::AwaitingAnswer {
            return Err(QuizError::AnswerPending);
        }

        self.issue(question_num)?;
        self.phase = Phase::AwaitingAnswer;
        self.render_current()?;
        self.current.as_ref().ok_or(QuizError::NoActiveQuestion)
    }

    /// Shows the question after the current one.
    pub fn show_next(&mut self) -> Result<&Question, QuizError> {
        self.show_question(self.current_index() + 1)
    }

    fn issue(&mut self, index: usize) -> Result<(), QuizError> {
        let unused: Vec<Permutation> = self
            .domain
            .iter()
            .filter(|p| !self.asked.contains(p))
            .copied()
            .collect();
        let Some(&key) = unused.choose(&mut self.rng) else {
            return Err(QuizError::ConfigurationExhausted {
                asked: self.asked.len(),
                max: self.max_questions,
            });
        };

        // Under commutative normalization the key is ordered; show either order.
        let shown = if self.normalization == Normalization::Commutative
            && key.operator.is_commutative()
            && self.rng.gen_bool(0.5)
        {
            Permutation::new(key.operand2, key.operand1, key.operator)
        } else {
            key
        };

        let question = Question::new(shown, index)?;
        self.asked.insert(key);
        debug!("{}: issued {question}", self.id);
        self.current = Some(question);
        Ok(())
    }

    fn render_current(&mut self) -> Result<(), QuizError> {
        let Some(question) = self.current.as_ref() else {
            return Err(QuizError::NoActiveQuestion);
        };
        let view = QuestionView {
            source: &self.id,
            question,
            difficulty: self.difficulty,
            max_questions: self.max_questions,
        };
        self.renderer.render(&view).map_err(|err| {
            warn!("{}: could not render question {}: {err}", self.id, question.index());
            QuizError::from(err)
        })
    }

    /// Scores `input` against the current question and emits one answered
    /// event.
    ///
    /// Empty input is rejected without effect; anything that is not an
    /// integer counts as a wrong answer. If an observer fails, the answer
    /// is still scored and the dispatch error is returned.
    pub fn submit_answer(&mut self, input: &str) -> Result<AnswerOutcome, QuizError> {
        match self.phase {
            Phase::Aborted => return Err(QuizError::SessionAborted),
            Phase::AwaitingAnswer => {}
            _ => return Err(QuizError::NoActiveQuestion),
        }
        let given = input.trim();
        if given.is_empty() {
            return Err(QuizError::EmptyAnswer);
        }
        let question = self.current.as_ref().ok_or(QuizError::NoActiveQuestion)?;

        let correct = given
            .parse::<i64>()
            .map(|answer| question.is_correct(answer))
            .unwrap_or(false);
        let log_entry = (!correct).then(|| question.wrong_answer_entry(given));
        let expected = question.correct_answer();
        let finished = question.index() >= self.max_questions;

        match &log_entry {
            None => self.correct_count += 1,
            Some(entry) => self.wrong_log.push(entry.clone()),
        }
        self.phase = if finished {
            Phase::Complete
        } else {
            Phase::Answered
        };

        let report = AnswerReport {
            source: self.id.clone(),
            correct,
            log_entry: log_entry.clone(),
        };
        self.notifier.notify(&QuizEvent::Answered(report))?;

        Ok(AnswerOutcome {
            correct,
            expected,
            log_entry,
            finished,
        })
    }

    pub fn request_next(&self) -> Result<(), QuizError> {
        if self.phase == Phase::Aborted {
            return Err(QuizError::SessionAborted);
        }
        self.notifier.notify(&QuizEvent::NextRequested)?;
        Ok(())
    }

    /// Aborts the session and tells observers the learner went home.
    pub fn request_home(&mut self) -> Result<(), QuizError> {
        self.phase = Phase::Aborted;
        debug!("{}: aborted after {} question(s)", self.id, self.current_index());
        self.notifier.notify(&QuizEvent::HomeRequested)?;
        Ok(())
    }
}

impl Testable for QuestionSource {
    fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}

/// A source of bounded, de-duplicated questions.
pub trait Questionable: Testable {
    fn show_question(&mut self, question_num: usize) -> Result<&Question, QuizError>;
    fn max_questions(&self) -> usize;
    fn submit_answer(&mut self, input: &str) -> Result<AnswerOutcome, QuizError>;
}

impl Questionable for QuestionSource {
    fn show_question(&mut self, question_num: usize) -> Result<&Question, QuizError> {
        QuestionSource::show_question(self, question_num)
    }

    fn max_questions(&self) -> usize {
        QuestionSource::max_questions(self)
    }

    fn submit_answer(&mut self, input: &str) -> Result<AnswerOutcome, QuizError> {
        QuestionSource::submit_answer(self, input)
    }
}
