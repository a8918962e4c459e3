//! Difficulty levels and the generation policy each one implies.
//!
//! A [`GenerationPolicy`] fully describes the domain of questions a source may
//! ask. The number of distinct permutations in that domain is the hard upper
//! bound on how many questions one test can issue.

use std::ops::RangeInclusive;

use itertools::{iproduct, Itertools};
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::operator::Operator;
use crate::question::Permutation;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];
}

/// How already-asked permutations are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// `3 + 4` and `4 + 3` are different questions.
    #[default]
    Exact,
    /// Operand order is ignored for commutative operators.
    Commutative,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPolicy {
    pub operands: RangeInclusive<i32>,
    pub operators: Vec<Operator>,
    pub allow_negative_results: bool,
    /// Only ask divisions whose quotient is a whole number.
    pub whole_division: bool,
    pub normalization: Normalization,
}

impl GenerationPolicy {
    pub fn new(operands: RangeInclusive<i32>, operators: impl Into<Vec<Operator>>) -> Self {
        Self {
            operands,
            operators: operators.into(),
            allow_negative_results: false,
            whole_division: true,
            normalization: Normalization::Exact,
        }
    }

    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self::new(0..=5, [Operator::Add]),
            Difficulty::Normal => Self::new(0..=10, [Operator::Add, Operator::Subtract]),
            Difficulty::Hard => Self::new(0..=12, Operator::ALL),
        }
    }

    /// Same domain restricted to a single operator, as used by the per-skill modules.
    pub fn only(mut self, operator: Operator) -> Self {
        self.operators = vec![operator];
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_negative_results(mut self, allow: bool) -> Self {
        self.allow_negative_results = allow;
        self
    }

    pub fn with_whole_division(mut self, whole: bool) -> Self {
        self.whole_division = whole;
        self
    }

    pub fn validate(&self) -> Result<(), QuizError> {
        if self.operators.is_empty() {
            return Err(QuizError::InvalidConfiguration(
                "no operator is eligible".to_string(),
            ));
        }
        if self.operands.is_empty() {
            return Err(QuizError::InvalidConfiguration(format!(
                "operand range {}..={} is empty",
                self.operands.start(),
                self.operands.end()
            )));
        }
        Ok(())
    }

    /// Whether the policy may ask this permutation. Zero divisors never pass.
    pub fn admits(&self, p: &Permutation) -> bool {
        if !self.operators.contains(&p.operator) || !self.operands.contains(&p.operand1) {
            return false;
        }
        if !self.operands.contains(&p.operand2) {
            return false;
        }
        if p.operator == Operator::Divide {
            if p.operand2 == 0 {
                return false;
            }
            if self.whole_division && p.operand1 % p.operand2 != 0 {
                return false;
            }
        }
        match p.operator.apply(p.operand1, p.operand2) {
            Ok(answer) => self.allow_negative_results || answer >= 0,
            Err(_) => false,
        }
    }

    /// Every distinct normalized permutation, in a stable order.
    pub fn domain(&self) -> Vec<Permutation> {
        iproduct!(
            self.operators.iter().copied(),
            self.operands.clone(),
            self.operands.clone()
        )
        .map(|(operator, a, b)| Permutation::new(a, b, operator))
        .filter(|p| self.admits(p))
        .map(|p| p.normalized(self.normalization))
        .unique()
        .collect()
    }

    pub fn capacity(&self) -> usize {
        self.domain().len()
    }
}

impl From<Difficulty> for GenerationPolicy {
    fn from(difficulty: Difficulty) -> Self {
        Self::for_difficulty(difficulty)
    }
}
