use serde::{Deserialize, Serialize};

use crate::error::SheetResult;
use crate::expression::build_expression;
use crate::random::{RandomSource, SecureRandom};
use crate::settings::Settings;

/// Build-and-evaluate cycles tried per problem slot before giving up on it.
pub const MAX_ATTEMPTS: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    /// Expression text with worksheet glyphs, e.g. `12 ÷ 3 × 5`.
    pub expression: String,
    pub answer: f64,
    /// Line as printed: the expression, ` = `, then the answer when
    /// answers are shown.
    pub text: String,
}

impl Problem {
    fn new(expression: String, answer: f64, show_answers: bool) -> Self {
        let text = if show_answers {
            format!("{expression} = {}", format_answer(answer))
        } else {
            format!("{expression} = ")
        };
        Self {
            id: ulid::Ulid::new().to_string(),
            expression,
            answer,
            text,
        }
    }

    /// Display line with the answer, regardless of the batch setting.
    pub fn with_answer(&self) -> String {
        format!("{} = {}", self.expression, format_answer(self.answer))
    }
}

/// Integral values print bare; everything else is rounded to two places
/// with trailing zeros dropped.
pub fn format_answer(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value.fract() == 0.0 {
        return format!("{value:.0}");
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub requested: usize,
    pub problems: Vec<Problem>,
}

impl GenerationReport {
    /// Slots that produced no problem.
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.problems.len())
    }
}

/// Generate problems with the OS CSPRNG.
pub fn generate_problems(settings: &Settings) -> SheetResult<Vec<Problem>> {
    Ok(generate_report(settings)?.problems)
}

pub fn generate_report(settings: &Settings) -> SheetResult<GenerationReport> {
    let mut rng = SecureRandom::new()?;
    generate_report_with(&mut rng, settings)
}

pub fn generate_problems_with<R: RandomSource + ?Sized>(
    rng: &mut R,
    settings: &Settings,
) -> SheetResult<Vec<Problem>> {
    Ok(generate_report_with(rng, settings)?.problems)
}

/// Rejection sampling: each slot gets up to [`MAX_ATTEMPTS`] candidates.
/// Slots that never produce an acceptable expression are dropped, so the
/// batch may be shorter than requested (possibly empty).
pub fn generate_report_with<R: RandomSource + ?Sized>(
    rng: &mut R,
    settings: &Settings,
) -> SheetResult<GenerationReport> {
    let requested = settings.num_problems();
    let counts = settings.operand_count_range();
    let show_answers = settings.presentation().show_answers;
    let mut problems = Vec::new();

    for _ in 0..requested {
        let operand_count = rng.random_int(counts.min(), counts.max())?;
        if operand_count < 2 {
            continue;
        }

        for _ in 0..MAX_ATTEMPTS {
            let Some(expr) = build_expression(rng, operand_count as usize, settings)? else {
                continue;
            };
            let result = expr.evaluate();
            if settings.accepts(result) {
                problems.push(Problem::new(expr.to_string(), result, show_answers));
                break;
            }
        }
    }

    Ok(GenerationReport {
        requested,
        problems,
    })
}
