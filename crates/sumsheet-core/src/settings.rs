use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SheetError, SheetResult};

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// ASCII symbol used in configuration files and JSON.
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }

    /// Symbol printed on worksheets.
    pub fn glyph(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '×',
            Self::Divide => '÷',
        }
    }

    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Subtract => lhs - rhs,
            Self::Multiply => lhs * rhs,
            Self::Divide => lhs / rhs,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl std::str::FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "+" | "add" => Ok(Self::Add),
            "-" | "sub" | "subtract" => Ok(Self::Subtract),
            "*" | "x" | "×" | "mul" | "multiply" => Ok(Self::Multiply),
            "/" | "÷" | "div" | "divide" => Ok(Self::Divide),
            _ => Err(format!("invalid operation: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// Inclusive integer range. `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    min: i64,
    max: i64,
}

impl Range {
    pub fn new(min: i64, max: i64) -> SheetResult<Self> {
        if min > max {
            return Err(SheetError::InvalidSettings(format!(
                "range minimum {min} is greater than maximum {max}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min as f64 && value <= self.max as f64
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    A4,
    Letter,
}

impl PaperSize {
    /// Width and height in PDF points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            Self::A4 => (595.28, 841.89),
            Self::Letter => (612.0, 792.0),
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A4 => write!(f, "a4"),
            Self::Letter => write!(f, "letter"),
        }
    }
}

impl std::str::FromStr for PaperSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "letter" => Ok(Self::Letter),
            _ => Err(format!("invalid paper size: {s}")),
        }
    }
}

/// Rendering options. Carried alongside the generation settings but
/// never consulted by the generator, except `show_answers` for the
/// problem text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presentation {
    pub font_size: f32,
    pub line_spacing: f32,
    pub paper_size: PaperSize,
    pub show_answers: bool,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            line_spacing: 28.0,
            paper_size: PaperSize::A4,
            show_answers: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Largest batch one generation pass will produce.
pub const MAX_PROBLEMS: usize = 1_000;

/// Most operands a single problem may have.
pub const MAX_OPERANDS: i64 = 20;

/// Validated, immutable input to one generation pass.
#[derive(Debug, Clone)]
pub struct Settings {
    operations: Vec<Operation>,
    num_range: Range,
    result_range: Range,
    operand_count_range: Range,
    allow_negative: bool,
    num_problems: usize,
    presentation: Presentation,
}

impl Settings {
    pub fn new(
        operations: Vec<Operation>,
        num_range: Range,
        result_range: Range,
        operand_count_range: Range,
        num_problems: usize,
    ) -> SheetResult<Self> {
        let mut unique: Vec<Operation> = Vec::with_capacity(operations.len());
        for op in operations {
            if !unique.contains(&op) {
                unique.push(op);
            }
        }
        if unique.is_empty() {
            return Err(SheetError::InvalidSettings(
                "at least one operation is required".into(),
            ));
        }
        if operand_count_range.min() < 2 {
            return Err(SheetError::InvalidSettings(format!(
                "problems need at least 2 operands, got minimum {}",
                operand_count_range.min()
            )));
        }
        if operand_count_range.max() > MAX_OPERANDS {
            return Err(SheetError::InvalidSettings(format!(
                "problems can have at most {MAX_OPERANDS} operands, got maximum {}",
                operand_count_range.max()
            )));
        }
        if num_problems == 0 {
            return Err(SheetError::InvalidSettings(
                "number of problems must be positive".into(),
            ));
        }
        if num_problems > MAX_PROBLEMS {
            return Err(SheetError::InvalidSettings(format!(
                "at most {MAX_PROBLEMS} problems per sheet, got {num_problems}"
            )));
        }

        Ok(Self {
            operations: unique,
            num_range,
            result_range,
            operand_count_range,
            allow_negative: false,
            num_problems,
            presentation: Presentation::default(),
        })
    }

    pub fn with_allow_negative(mut self, allow_negative: bool) -> Self {
        self.allow_negative = allow_negative;
        self
    }

    pub fn with_presentation(mut self, presentation: Presentation) -> SheetResult<Self> {
        if !presentation.font_size.is_finite() || presentation.font_size <= 0.0 {
            return Err(SheetError::InvalidSettings(format!(
                "font size must be a positive number, got {}",
                presentation.font_size
            )));
        }
        if !presentation.line_spacing.is_finite() || presentation.line_spacing <= 0.0 {
            return Err(SheetError::InvalidSettings(format!(
                "line spacing must be a positive number, got {}",
                presentation.line_spacing
            )));
        }
        self.presentation = presentation;
        Ok(self)
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn num_range(&self) -> Range {
        self.num_range
    }

    pub fn result_range(&self) -> Range {
        self.result_range
    }

    pub fn operand_count_range(&self) -> Range {
        self.operand_count_range
    }

    pub fn allow_negative(&self) -> bool {
        self.allow_negative
    }

    pub fn num_problems(&self) -> usize {
        self.num_problems
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// Whether a computed result satisfies the result range and sign rule.
    pub fn accepts(&self, result: f64) -> bool {
        result.is_finite()
            && self.result_range.contains(result)
            && (self.allow_negative || result >= 0.0)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            operations: vec![Operation::Add, Operation::Subtract],
            num_range: Range { min: 1, max: 20 },
            result_range: Range { min: 0, max: 100 },
            operand_count_range: Range { min: 2, max: 2 },
            allow_negative: false,
            num_problems: 20,
            presentation: Presentation::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: i64, max: i64) -> Range {
        Range::new(min, max).unwrap()
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(matches!(
            Range::new(5, 1),
            Err(SheetError::InvalidSettings(_))
        ));
        assert!(Range::new(3, 3).is_ok());
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let r = range(-2, 4);
        assert!(r.contains(-2.0));
        assert!(r.contains(4.0));
        assert!(r.contains(0.5));
        assert!(!r.contains(4.01));
    }

    #[test]
    fn test_settings_rejects_empty_operations() {
        let err = Settings::new(vec![], range(1, 9), range(0, 9), range(2, 2), 5);
        assert!(matches!(err, Err(SheetError::InvalidSettings(_))));
    }

    #[test]
    fn test_settings_rejects_single_operand() {
        let err = Settings::new(
            vec![Operation::Add],
            range(1, 9),
            range(0, 9),
            range(1, 3),
            5,
        );
        assert!(matches!(err, Err(SheetError::InvalidSettings(_))));
    }

    #[test]
    fn test_settings_rejects_zero_problems() {
        let err = Settings::new(
            vec![Operation::Add],
            range(1, 9),
            range(0, 9),
            range(2, 2),
            0,
        );
        assert!(matches!(err, Err(SheetError::InvalidSettings(_))));
    }

    #[test]
    fn test_settings_rejects_oversized_batches() {
        let build = |counts: Range, num_problems: usize| {
            Settings::new(
                vec![Operation::Add],
                range(1, 9),
                range(0, 9),
                counts,
                num_problems,
            )
        };

        assert!(build(range(2, 2), MAX_PROBLEMS).is_ok());
        assert!(matches!(
            build(range(2, 2), MAX_PROBLEMS + 1),
            Err(SheetError::InvalidSettings(_))
        ));
        assert!(matches!(
            build(range(2, 2), usize::MAX),
            Err(SheetError::InvalidSettings(_))
        ));

        assert!(build(range(2, MAX_OPERANDS), 1).is_ok());
        assert!(matches!(
            build(range(2, MAX_OPERANDS + 1), 1),
            Err(SheetError::InvalidSettings(_))
        ));
        assert!(matches!(
            build(range(i64::MAX - 1, i64::MAX), 1),
            Err(SheetError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_settings_dedups_operations() {
        let settings = Settings::new(
            vec![Operation::Add, Operation::Divide, Operation::Add],
            range(1, 9),
            range(0, 9),
            range(2, 2),
            5,
        )
        .unwrap();
        assert_eq!(settings.operations(), &[Operation::Add, Operation::Divide]);
    }

    #[test]
    fn test_presentation_validation() {
        let settings = Settings::default();
        let bad = Presentation {
            line_spacing: 0.0,
            ..Presentation::default()
        };
        assert!(settings.clone().with_presentation(bad).is_err());

        for value in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let font = Presentation {
                font_size: value,
                ..Presentation::default()
            };
            assert!(settings.clone().with_presentation(font).is_err());
            let spacing = Presentation {
                line_spacing: value,
                ..Presentation::default()
            };
            assert!(settings.clone().with_presentation(spacing).is_err());
        }

        let good = Presentation {
            paper_size: PaperSize::Letter,
            show_answers: true,
            ..Presentation::default()
        };
        let settings = settings.with_presentation(good).unwrap();
        assert!(settings.presentation().show_answers);
    }

    #[test]
    fn test_accepts_respects_sign_rule() {
        let settings = Settings::new(
            vec![Operation::Subtract],
            range(1, 9),
            range(-10, 10),
            range(2, 2),
            1,
        )
        .unwrap();
        assert!(!settings.accepts(-3.0));
        assert!(settings.accepts(0.0));

        let settings = settings.with_allow_negative(true);
        assert!(settings.accepts(-3.0));
        assert!(!settings.accepts(-11.0));
        assert!(!settings.accepts(f64::NAN));
    }

    #[test]
    fn test_operation_parse_and_serde() {
        assert_eq!("+".parse::<Operation>().unwrap(), Operation::Add);
        assert_eq!("Divide".parse::<Operation>().unwrap(), Operation::Divide);
        assert_eq!("×".parse::<Operation>().unwrap(), Operation::Multiply);
        assert!("%".parse::<Operation>().is_err());

        let json = serde_json::to_string(&Operation::Multiply).unwrap();
        assert_eq!(json, "\"*\"");
        let op: Operation = serde_json::from_str("\"-\"").unwrap();
        assert_eq!(op, Operation::Subtract);
    }

    #[test]
    fn test_paper_size_dimensions() {
        assert_eq!(PaperSize::Letter.dimensions(), (612.0, 792.0));
        assert_eq!("A4".parse::<PaperSize>().unwrap(), PaperSize::A4);
    }
}
