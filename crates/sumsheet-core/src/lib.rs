pub mod error;
pub mod evaluator;
pub mod expression;
pub mod generator;
pub mod layout;
pub mod quiz;
pub mod random;
pub mod settings;

pub use error::{SheetError, SheetResult};
pub use evaluator::{evaluate_expression, ParseError, MAX_NESTING};
pub use expression::{build_expression, Expression};
pub use generator::{
    format_answer, generate_problems, generate_problems_with, generate_report,
    generate_report_with, GenerationReport, Problem, MAX_ATTEMPTS,
};
pub use layout::{layout, Column, Layout, LayoutOptions, Page, PlacedText, DEFAULT_MARGIN};
pub use quiz::{Quiz, QuizSummary, Verdict};
pub use random::{RandomSource, SecureRandom};
pub use settings::{
    Operation, PaperSize, Presentation, Range, Settings, MAX_OPERANDS, MAX_PROBLEMS,
};
