//! Code Breaking Puzzle
//!
//! The player guesses a secret code of distinct digits under a guess
//! budget. Every guess earns per-position feedback, plus a count of how
//! many codes remain consistent with everything seen so far.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::GameRng;
use crate::game::balance::{self, Modifier};
use crate::game::session::MoveError;
use crate::game::target::GameKind;

/// Client-visible tuning for a code-breaking session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBreakingConfig {
    /// Digits in the secret code.
    pub code_length: u8,
    /// Digits are drawn from `0..digit_pool`.
    pub digit_pool: u8,
    /// Guess budget.
    pub max_guesses: u32,
    /// Session clock.
    pub time_limit_ms: u64,
    /// Optional twist rolled at generation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
}

/// Per-position feedback mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feedback {
    /// Right digit, right position.
    Exact,
    /// Right digit, wrong position.
    Present,
    /// Digit not in the secret.
    Miss,
}

/// Server-side state of one code-breaking session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBreakingState {
    /// The secret code. Never serialized toward clients.
    pub secret: Vec<u8>,
    /// Guesses consumed so far.
    pub guesses_used: u32,
    /// True once a guess matched the secret exactly.
    pub solved: bool,
    /// Guess history, oldest first.
    pub guesses: Vec<Vec<u8>>,
    /// Feedback history, parallel to `guesses`.
    pub feedbacks: Vec<Vec<Feedback>>,
    /// Tuning for this session.
    pub config: CodeBreakingConfig,
}

/// Outcome of one accepted guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBreakingResult {
    /// The guess as accepted.
    pub guess: Vec<u8>,
    /// Per-position feedback.
    pub feedback: Vec<Feedback>,
    /// True when this guess matched the secret.
    pub solved: bool,
    /// Guesses consumed including this one.
    pub guesses_used: u32,
    /// Guesses left in the budget.
    pub guesses_remaining: u32,
    /// Codes still consistent with the full history. Withheld under the
    /// blackout modifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub possibilities_remaining: Option<u64>,
    /// True when the session cannot accept further guesses.
    pub game_over: bool,
}

impl CodeBreakingState {
    /// Generates a fresh puzzle for a security level.
    ///
    /// The secret is a shuffled prefix of the digit pool, so its digits
    /// are always distinct.
    pub fn generate(rng: &mut GameRng, security_level: u8) -> Self {
        let tier = balance::code_breaking_tier(security_level);

        let mut pool: Vec<u8> = (0..tier.digit_pool).collect();
        rng.shuffle(&mut pool);
        pool.truncate(usize::from(tier.code_length));

        let modifier = balance::roll_modifier(rng, security_level, GameKind::CodeBreaking);

        CodeBreakingState {
            secret: pool,
            guesses_used: 0,
            solved: false,
            guesses: Vec::new(),
            feedbacks: Vec::new(),
            config: CodeBreakingConfig {
                code_length: tier.code_length,
                digit_pool: tier.digit_pool,
                max_guesses: tier.max_guesses,
                time_limit_ms: tier.time_limit_ms,
                modifier,
            },
        }
    }

    /// Applies one guess against the secret.
    pub fn guess(&mut self, digits: &[i32]) -> Result<CodeBreakingResult, MoveError> {
        if digits.len() != usize::from(self.config.code_length) {
            return Err(MoveError::GuessLength {
                expected: self.config.code_length,
            });
        }
        if self.solved {
            return Err(MoveError::AlreadySolved);
        }
        if self.guesses_used >= self.config.max_guesses {
            return Err(MoveError::NoGuessesRemaining);
        }

        let max_digit = self.config.digit_pool - 1;
        let mut guess = Vec::with_capacity(digits.len());
        for &digit in digits {
            if digit < 0 || digit > i32::from(max_digit) {
                return Err(MoveError::DigitOutOfRange { max: max_digit });
            }
            guess.push(digit as u8);
        }

        let distinct: BTreeSet<u8> = guess.iter().copied().collect();
        if distinct.len() != guess.len() {
            return Err(MoveError::DuplicateDigit);
        }

        let marks = feedback(&self.secret, &guess);
        let solved = marks.iter().all(|mark| *mark == Feedback::Exact);

        self.guesses_used += 1;
        self.solved = solved;
        self.guesses.push(guess.clone());
        self.feedbacks.push(marks.clone());

        let possibilities = if self.config.modifier == Some(Modifier::Blackout) {
            None
        } else if solved {
            Some(1)
        } else {
            Some(count_possibilities(
                self.config.digit_pool,
                self.config.code_length,
                &self.guesses,
                &self.feedbacks,
            ))
        };

        let game_over = solved || self.guesses_used >= self.config.max_guesses;

        Ok(CodeBreakingResult {
            guess,
            feedback: marks,
            solved,
            guesses_used: self.guesses_used,
            guesses_remaining: self.config.max_guesses - self.guesses_used,
            possibilities_remaining: possibilities,
            game_over,
        })
    }
}

/// Two-pass positional feedback.
///
/// The first pass marks exact hits and consumes those secret digits; the
/// second matches remaining guess digits against unconsumed secret
/// digits so a digit is never counted twice.
pub fn feedback(secret: &[u8], guess: &[u8]) -> Vec<Feedback> {
    let mut marks = vec![Feedback::Miss; guess.len()];
    let mut secret_used = vec![false; secret.len()];
    let mut guess_used = vec![false; guess.len()];

    for i in 0..guess.len() {
        if i < secret.len() && guess[i] == secret[i] {
            marks[i] = Feedback::Exact;
            secret_used[i] = true;
            guess_used[i] = true;
        }
    }

    for i in 0..guess.len() {
        if guess_used[i] {
            continue;
        }
        for j in 0..secret.len() {
            if !secret_used[j] && guess[i] == secret[j] {
                marks[i] = Feedback::Present;
                secret_used[j] = true;
                break;
            }
        }
    }

    marks
}

/// Counts distinct-digit codes consistent with a guess history.
///
/// A candidate is consistent when it would have produced the recorded
/// feedback for every guess. The search space tops out at 6720 codes
/// (pool 8, length 5), so plain enumeration is fine.
pub fn count_possibilities(
    digit_pool: u8,
    code_length: u8,
    guesses: &[Vec<u8>],
    feedbacks: &[Vec<Feedback>],
) -> u64 {
    let mut used = vec![false; usize::from(digit_pool)];
    let mut prefix = Vec::with_capacity(usize::from(code_length));
    count_consistent(&mut prefix, &mut used, usize::from(code_length), guesses, feedbacks)
}

fn count_consistent(
    prefix: &mut Vec<u8>,
    used: &mut [bool],
    code_length: usize,
    guesses: &[Vec<u8>],
    feedbacks: &[Vec<Feedback>],
) -> u64 {
    if prefix.len() == code_length {
        let consistent = guesses
            .iter()
            .zip(feedbacks)
            .all(|(guess, marks)| feedback(prefix, guess) == *marks);
        return u64::from(consistent);
    }

    let mut total = 0;
    for digit in 0..used.len() {
        if used[digit] {
            continue;
        }
        used[digit] = true;
        prefix.push(digit as u8);
        total += count_consistent(prefix, used, code_length, guesses, feedbacks);
        prefix.pop();
        used[digit] = false;
    }
    total
}

// =============================================================================
// TESTS
// =============================================================================
