use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Arithmetic operations a question can ask about.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Add => "addition",
            Operator::Subtract => "subtraction",
            Operator::Multiply => "multiplication",
            Operator::Divide => "division",
        }
    }

    /// Applies the operation. Widening to `i64` keeps every case but
    /// division by zero total; division truncates toward zero.
    pub fn apply(self, a: i32, b: i32) -> Result<i64, QuizError> {
        let (a, b) = (i64::from(a), i64::from(b));
        match self {
            Operator::Add => Ok(a + b),
            Operator::Subtract => Ok(a - b),
            Operator::Multiply => Ok(a * b),
            Operator::Divide if b == 0 => Err(QuizError::DivideByZero),
            Operator::Divide => Ok(a / b),
        }
    }

    /// Whether swapping the operands yields the same question.
    pub fn is_commutative(self) -> bool {
        matches!(self, Operator::Add | Operator::Multiply)
    }
}
