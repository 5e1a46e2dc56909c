use std::time::{Duration, Instant};

use crate::evaluator::{evaluate_expression, ParseError};
use crate::generator::Problem;

/// Answers are displayed rounded to two places, so anything within half
/// a hundredth counts.
const ANSWER_TOLERANCE: f64 = 0.005;

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Correct,
    Incorrect { expected: f64 },
    /// The input did not parse; the same problem stays current.
    Unreadable(ParseError),
    TimeUp,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizSummary {
    pub total: usize,
    pub attempted: usize,
    pub correct: usize,
    pub elapsed: Duration,
}

impl QuizSummary {
    pub fn score_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 * 100.0 / self.total as f64
    }
}

/// A timed run through a batch of problems, one answer per problem.
#[derive(Debug)]
pub struct Quiz {
    problems: Vec<Problem>,
    time_limit: Option<Duration>,
    started: Instant,
    finished_at: Option<Instant>,
    current: usize,
    correct: usize,
}

impl Quiz {
    pub fn new(problems: Vec<Problem>, time_limit: Option<Duration>) -> Self {
        Self::started_at(problems, time_limit, Instant::now())
    }

    pub fn started_at(problems: Vec<Problem>, time_limit: Option<Duration>, started: Instant) -> Self {
        Self {
            problems,
            time_limit,
            started,
            finished_at: None,
            current: 0,
            correct: 0,
        }
    }

    pub fn current(&self) -> Option<&Problem> {
        if self.finished_at.is_some() {
            return None;
        }
        self.problems.get(self.current)
    }

    /// 1-based position of the current problem and the total.
    pub fn progress(&self) -> (usize, usize) {
        (self.current + 1, self.problems.len())
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.time_limit
            .map(|limit| limit.saturating_sub(now.saturating_duration_since(self.started)))
    }

    pub fn is_over(&self) -> bool {
        self.finished_at.is_some() || self.current >= self.problems.len()
    }

    pub fn answer(&mut self, input: &str) -> Verdict {
        self.answer_at(input, Instant::now())
    }

    pub fn answer_at(&mut self, input: &str, now: Instant) -> Verdict {
        if self.finished_at.is_some() {
            return Verdict::Finished;
        }
        if let Some(limit) = self.time_limit {
            if now.saturating_duration_since(self.started) > limit {
                self.finished_at = Some(self.started + limit);
                return Verdict::TimeUp;
            }
        }
        let Some(problem) = self.problems.get(self.current) else {
            self.finished_at = Some(now);
            return Verdict::Finished;
        };

        let value = match evaluate_expression(input) {
            Ok(v) => v,
            Err(e) => return Verdict::Unreadable(e),
        };

        let expected = problem.answer;
        self.current += 1;
        if self.current >= self.problems.len() {
            self.finished_at = Some(now);
        }
        if (value - expected).abs() <= ANSWER_TOLERANCE {
            self.correct += 1;
            Verdict::Correct
        } else {
            Verdict::Incorrect { expected }
        }
    }

    /// Ends the quiz early; unanswered problems count as wrong.
    pub fn stop_at(&mut self, now: Instant) {
        if self.finished_at.is_none() {
            self.finished_at = Some(now);
        }
    }

    pub fn summary_at(&self, now: Instant) -> QuizSummary {
        let end = self.finished_at.unwrap_or(now);
        QuizSummary {
            total: self.problems.len(),
            attempted: self.current,
            correct: self.correct,
            elapsed: end.saturating_duration_since(self.started),
        }
    }

    pub fn summary(&self) -> QuizSummary {
        self.summary_at(Instant::now())
    }
}
