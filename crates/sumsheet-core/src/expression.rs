use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SheetResult;
use crate::random::RandomSource;
use crate::settings::{Operation, Settings};

/// Operands and the operators between them. Evaluated strictly left to
/// right: `a op1 b op2 c` is `(a op1 b) op2 c`, whatever the operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub operands: Vec<i64>,
    pub operators: Vec<Operation>,
}

impl Expression {
    pub fn evaluate(&self) -> f64 {
        let mut operands = self.operands.iter();
        let Some(first) = operands.next() else {
            return f64::NAN;
        };
        self.operators
            .iter()
            .zip(operands)
            .fold(*first as f64, |acc, (op, rhs)| op.apply(acc, *rhs as f64))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut operands = self.operands.iter();
        if let Some(first) = operands.next() {
            write!(f, "{first}")?;
        }
        for (op, operand) in self.operators.iter().zip(operands) {
            write!(f, " {} {operand}", op.glyph())?;
        }
        Ok(())
    }
}

/// Draw one candidate expression. Returns `Ok(None)` when a division was
/// drawn but the operand range has no non-zero divisor; the caller treats
/// that as a failed attempt.
pub fn build_expression<R: RandomSource + ?Sized>(
    rng: &mut R,
    operand_count: usize,
    settings: &Settings,
) -> SheetResult<Option<Expression>> {
    let range = settings.num_range();
    let ops = settings.operations();

    let mut operands = Vec::new();
    let mut operators = Vec::new();
    operands.push(rng.random_int(range.min(), range.max())?);

    for _ in 1..operand_count {
        let index = rng.random_int(0, ops.len() as i64 - 1)? as usize;
        let op = ops[index];
        let operand = if op == Operation::Divide {
            match rng.random_non_zero_int(range.min(), range.max())? {
                Some(v) => v,
                None => return Ok(None),
            }
        } else {
            rng.random_int(range.min(), range.max())?
        };
        operators.push(op);
        operands.push(operand);
    }

    Ok(Some(Expression {
        operands,
        operators,
    }))
}
