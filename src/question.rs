use std::fmt;

use serde::{Deserialize, Serialize};

use crate::difficulty::Normalization;
use crate::error::QuizError;
use crate::operator::Operator;

/// A concrete `(operand1, operand2, operator)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Permutation {
    pub operand1: i32,
    pub operand2: i32,
    pub operator: Operator,
}

impl Permutation {
    pub fn new(operand1: i32, operand2: i32, operator: Operator) -> Self {
        Self {
            operand1,
            operand2,
            operator,
        }
    }

    /// Key used to decide whether two permutations count as the same question.
    pub fn normalized(self, normalization: Normalization) -> Self {
        match normalization {
            Normalization::Commutative
                if self.operator.is_commutative() && self.operand1 > self.operand2 =>
            {
                Self::new(self.operand2, self.operand1, self.operator)
            }
            _ => self,
        }
    }
}

/// An issued question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    permutation: Permutation,
    correct_answer: i64,
    index: usize,
}

impl Question {
    /// Builds the question numbered `index` (1-based). Fails for a zero divisor.
    pub fn new(permutation: Permutation, index: usize) -> Result<Self, QuizError> {
        let correct_answer = permutation
            .operator
            .apply(permutation.operand1, permutation.operand2)?;
        Ok(Self {
            permutation,
            correct_answer,
            index,
        })
    }

    pub fn operand1(&self) -> i32 {
        self.permutation.operand1
    }

    pub fn operand2(&self) -> i32 {
        self.permutation.operand2
    }

    pub fn operator(&self) -> Operator {
        self.permutation.operator
    }

    pub fn correct_answer(&self) -> i64 {
        self.correct_answer
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn permutation(&self) -> Permutation {
        self.permutation
    }

    /// The question as shown to the learner, e.g. `3 + 4 = ?`.
    pub fn text(&self) -> String {
        format!(
            "{} {} {} = ?",
            self.operand1(),
            self.operator().symbol(),
            self.operand2()
        )
    }

    pub fn is_correct(&self, answer: i64) -> bool {
        self.correct_answer == answer
    }

    /// Audit line for a wrong answer.
    pub fn wrong_answer_entry(&self, given: &str) -> String {
        format!(
            "Question {}: {} | answered {} | expected {}",
            self.index,
            self.text(),
            given,
            self.correct_answer
        )
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.index, self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_question_computes_answer() {
        let q = Question::new(Permutation::new(3, 4, Operator::Multiply), 2).unwrap();
        assert_eq!(q.correct_answer(), 12);
        assert_eq!(q.index(), 2);
        assert_eq!(q.text(), "3 × 4 = ?");
        assert_eq!(q.to_string(), "2. 3 × 4 = ?");
    }

    #[test]
    fn test_question_rejects_zero_divisor() {
        let result = Question::new(Permutation::new(3, 0, Operator::Divide), 1);
        assert_matches!(result, Err(QuizError::DivideByZero));
    }

    #[test]
    fn test_wrong_answer_entry_contains_details() {
        let q = Question::new(Permutation::new(3, 4, Operator::Add), 1).unwrap();
        let entry = q.wrong_answer_entry("3");
        assert_eq!(entry, "Question 1: 3 + 4 = ? | answered 3 | expected 7");
    }

    #[test]
    fn test_commutative_normalization() {
        let p = Permutation::new(4, 3, Operator::Add);
        assert_eq!(
            p.normalized(Normalization::Commutative),
            Permutation::new(3, 4, Operator::Add)
        );
        assert_eq!(p.normalized(Normalization::Exact), p);

        let sub = Permutation::new(4, 3, Operator::Subtract);
        assert_eq!(sub.normalized(Normalization::Commutative), sub);
    }
}
