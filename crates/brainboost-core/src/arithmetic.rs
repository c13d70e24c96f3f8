//! Result Keeper: chained arithmetic with a running result that must stay in
//! range.
//!
//! A round is a payload of [`PAYLOAD_LEN`] numbers joined by
//! [`CHAIN_LEN`] operators. The player answers one step at a time; each
//! correct answer becomes the left operand of the next step. Wrong answers
//! cost a life and repeat the step. A finished round seeds the next one with
//! its final answer, so play continues until lives run out or the caller
//! declares time-up.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::ledger::ScoringLedger;
use crate::results::{RoundDetails, RoundResult};

/// Numbers per round.
pub const PAYLOAD_LEN: usize = 10;

/// Operators per round.
pub const CHAIN_LEN: usize = PAYLOAD_LEN - 1;

/// Lower bound of every intermediate result.
pub const RANGE_MIN: i64 = 0;

/// Upper bound of intermediate results for a level: `5 + level * 5`.
pub fn range_size(level: u32) -> i64 {
    5 + i64::from(level) * 5
}

/// The four arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

impl Operator {
    pub const ALL: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    /// Apply the operator. Division floors, like the integer quotient shown
    /// to the player.
    pub fn apply(self, a: i64, b: i64) -> Result<i64, GameError> {
        match self {
            Operator::Add => Ok(a.saturating_add(b)),
            Operator::Sub => Ok(a.saturating_sub(b)),
            Operator::Mul => Ok(a.saturating_mul(b)),
            Operator::Div => {
                if b == 0 {
                    return Err(GameError::DivisionByZero(a));
                }
                let quotient = a / b;
                if a % b != 0 && ((a < 0) != (b < 0)) {
                    Ok(quotient - 1)
                } else {
                    Ok(quotient)
                }
            }
        }
    }

    /// Result of `acc op value` if the step is allowed during chain
    /// generation: no negative difference and only exact division.
    fn try_step(self, acc: i64, value: i64) -> Option<i64> {
        match self {
            Operator::Add => acc.checked_add(value),
            Operator::Sub => acc.checked_sub(value).filter(|&v| v >= 0),
            Operator::Mul => acc.checked_mul(value),
            Operator::Div => acc
                .checked_rem(value)
                .filter(|&rem| rem == 0)
                .and_then(|_| acc.checked_div(value)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Operator {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Sub),
            "*" => Ok(Operator::Mul),
            "/" => Ok(Operator::Div),
            other => Err(GameError::UnsupportedOperation(other.to_string())),
        }
    }
}

/// Compute `a op b` for an operator given by its symbol.
pub fn calculate(a: i64, b: i64, op: &str) -> Result<i64, GameError> {
    op.parse::<Operator>()?.apply(a, b)
}

/// Build the operator chain for `payload`, repairing blocking values in place.
///
/// Left to right, an operator is drawn uniformly from the operators not yet
/// tried at the current position and accepted when its result stays within
/// `[0, range_size]`. When every operator has been rejected, the payload
/// value at that position is replaced with a fresh number in
/// `[1, range_size]` and all operators become available again. Each
/// replacement counts against `max_repairs`.
pub fn build_operator_chain<R: Rng + ?Sized>(
    payload: &mut [i64],
    range_size: i64,
    operators: &[Operator],
    max_repairs: u32,
    rng: &mut R,
) -> Result<Vec<Operator>, GameError> {
    if payload.len() < PAYLOAD_LEN {
        return Err(GameError::PreconditionViolation(format!(
            "payload must contain at least {PAYLOAD_LEN} numbers, got {}",
            payload.len()
        )));
    }
    if operators.is_empty() {
        return Err(GameError::PreconditionViolation(
            "at least one operator is required".into(),
        ));
    }
    if range_size < 1 {
        return Err(GameError::PreconditionViolation(format!(
            "range size must be positive, got {range_size}"
        )));
    }
    if !(RANGE_MIN..=range_size).contains(&payload[0]) {
        return Err(GameError::PreconditionViolation(format!(
            "first payload value {} is outside 0..={range_size}",
            payload[0]
        )));
    }

    let mut chain = Vec::with_capacity(CHAIN_LEN);
    let mut candidates = operators.to_vec();
    let mut acc = payload[0];
    let mut repairs = 0u32;
    let mut i = 1;

    while i < PAYLOAD_LEN {
        if candidates.is_empty() {
            if repairs >= max_repairs {
                return Err(GameError::ExhaustedSearch {
                    repairs,
                    range_size,
                });
            }
            repairs += 1;
            // never 0, so division stays possible
            payload[i] = rng.gen_range(1..=range_size);
            candidates = operators.to_vec();
            continue;
        }

        let pick = rng.gen_range(0..candidates.len());
        let op = candidates[pick];
        match op
            .try_step(acc, payload[i])
            .filter(|value| (RANGE_MIN..=range_size).contains(value))
        {
            Some(value) => {
                chain.push(op);
                acc = value;
                i += 1;
                candidates = operators.to_vec();
            }
            None => {
                candidates.remove(pick);
            }
        }
    }

    Ok(chain)
}

/// Replay a chain against its payload and return every intermediate result.
///
/// Fails if a step leaves `[0, range_size]`, produces a negative difference
/// or uses an inexact division.
pub fn replay_chain(
    payload: &[i64],
    chain: &[Operator],
    range_size: i64,
) -> Result<Vec<i64>, GameError> {
    if payload.len() < chain.len() + 1 {
        return Err(GameError::PreconditionViolation(format!(
            "{} operators need {} numbers, got {}",
            chain.len(),
            chain.len() + 1,
            payload.len()
        )));
    }

    let mut acc = payload[0];
    let mut values = Vec::with_capacity(chain.len());
    for (op, &value) in chain.iter().zip(&payload[1..]) {
        acc = op
            .try_step(acc, value)
            .filter(|v| (RANGE_MIN..=range_size).contains(v))
            .ok_or_else(|| {
                GameError::InvalidInput(format!("step {acc} {op} {value} leaves the range"))
            })?;
        values.push(acc);
    }
    Ok(values)
}

/// Tunables for a Result Keeper play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultKeeperConfig {
    /// Wrong answers allowed before defeat.
    pub lives: u32,
    /// Seconds before the caller should declare time-up.
    pub time_limit_secs: u32,
    /// Operators the chain may use.
    pub operators: Vec<Operator>,
    /// Value replacements allowed while building one chain.
    pub max_repairs: u32,
}

impl Default for ResultKeeperConfig {
    fn default() -> Self {
        Self {
            lives: 3,
            time_limit_secs: 60,
            operators: Operator::ALL.to_vec(),
            max_repairs: 10_000,
        }
    }
}

/// Outcome of one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// The answer was checked; `prompt` is the step to show next (the same
    /// step again when the answer was wrong).
    Answered { prompt: String, correct: bool },
    /// The last step of a round was answered. The next round has started
    /// and `prompt` is its first step.
    RoundComplete { prompt: String, level_up: bool },
    /// The input was not a number. Nothing changed.
    NotANumber { prompt: String },
    /// No lives left. The play is over.
    Defeated,
}

impl Turn {
    /// The prompt to show after this turn, if play goes on.
    pub fn prompt(&self) -> Option<&str> {
        match self {
            Turn::Answered { prompt, .. }
            | Turn::RoundComplete { prompt, .. }
            | Turn::NotANumber { prompt } => Some(prompt),
            Turn::Defeated => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Playing,
    Defeated,
    /// A round was won but the next chain could not be built.
    Stalled,
}

/// A Result Keeper play, driven one answer at a time.
#[derive(Debug)]
pub struct ResultKeeper {
    config: ResultKeeperConfig,
    rng: StdRng,
    level: u32,
    level_start: u32,
    payload: Vec<i64>,
    chain: Vec<Operator>,
    ledger: ScoringLedger,
    lives: u32,
    steps: u32,
    rounds_won: u32,
    /// Index into `chain` of the step being asked.
    position: usize,
    /// Left operand of the step being asked.
    left: i64,
    /// The very first step shows both operands; later ones only the right.
    show_left: bool,
    phase: Phase,
}

impl ResultKeeper {
    /// Start a play at `level` with an entropy-seeded generator.
    pub fn start(level: u32, config: ResultKeeperConfig) -> Result<Self, GameError> {
        Self::with_rng(level, config, StdRng::from_entropy())
    }

    /// Start a reproducible play.
    pub fn start_seeded(
        level: u32,
        config: ResultKeeperConfig,
        seed: u64,
    ) -> Result<Self, GameError> {
        Self::with_rng(level, config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(
        level: u32,
        config: ResultKeeperConfig,
        mut rng: StdRng,
    ) -> Result<Self, GameError> {
        let range = Self::checked_range(level)?;
        let payload = (0..PAYLOAD_LEN)
            .map(|_| rng.gen_range(RANGE_MIN..=range))
            .collect();
        Self::from_payload(level, config, payload, rng)
    }

    /// Start a play from a given payload. Blocking values may be repaired.
    pub fn from_payload(
        level: u32,
        config: ResultKeeperConfig,
        mut payload: Vec<i64>,
        mut rng: StdRng,
    ) -> Result<Self, GameError> {
        let range = Self::checked_range(level)?;
        let chain = build_operator_chain(
            &mut payload,
            range,
            &config.operators,
            config.max_repairs,
            &mut rng,
        )?;
        payload.truncate(PAYLOAD_LEN);
        let left = payload[0];
        let lives = config.lives.max(1);

        Ok(Self {
            config,
            rng,
            level,
            level_start: level,
            payload,
            chain,
            ledger: ScoringLedger::new(level),
            lives,
            steps: 0,
            rounds_won: 0,
            position: 0,
            left,
            show_left: true,
            phase: Phase::Playing,
        })
    }

    fn checked_range(level: u32) -> Result<i64, GameError> {
        if level == 0 {
            return Err(GameError::PreconditionViolation(
                "level must be at least 1".into(),
            ));
        }
        Ok(range_size(level))
    }

    /// The step currently asked.
    pub fn prompt(&self) -> String {
        let op = self.chain[self.position];
        let right = self.payload[self.position + 1];
        if self.show_left {
            format!("{} {op} {right} = ", self.left)
        } else {
            format!("{op} {right} = ")
        }
    }

    /// Operands and operator of the step currently asked, as
    /// `(left, op, right)`.
    pub fn current_step(&self) -> (i64, Operator, i64) {
        (
            self.left,
            self.chain[self.position],
            self.payload[self.position + 1],
        )
    }

    /// Check an answer to the current step.
    pub fn submit(&mut self, answer: i64) -> Result<Turn, GameError> {
        self.ensure_playing()?;
        let op = self.chain[self.position];
        let expected = op.apply(self.left, self.payload[self.position + 1])?;

        if answer != expected {
            self.ledger.record_status(false);
            self.ledger.update_points(true, 1);
            self.lives -= 1;
            if self.lives == 0 {
                self.phase = Phase::Defeated;
                return Ok(Turn::Defeated);
            }
            return Ok(Turn::Answered {
                prompt: self.prompt(),
                correct: false,
            });
        }

        self.ledger.record_status(true);
        self.ledger.update_points(false, 1);
        self.steps += 1;
        self.left = answer;
        self.show_left = false;

        if self.position + 1 == CHAIN_LEN {
            return self.next_round(answer);
        }
        self.position += 1;
        Ok(Turn::Answered {
            prompt: self.prompt(),
            correct: true,
        })
    }

    /// Check a typed answer. Text that is not an integer re-presents the
    /// current step without touching lives or points.
    pub fn submit_text(&mut self, input: &str) -> Result<Turn, GameError> {
        self.ensure_playing()?;
        match input.trim().parse::<i64>() {
            Ok(answer) => self.submit(answer),
            Err(_) => Ok(Turn::NotANumber {
                prompt: self.prompt(),
            }),
        }
    }

    fn ensure_playing(&self) -> Result<(), GameError> {
        match self.phase {
            Phase::Playing => Ok(()),
            Phase::Defeated => Err(GameError::PreconditionViolation(
                "the play is over: no lives left".into(),
            )),
            Phase::Stalled => Err(GameError::PreconditionViolation(
                "the play is over: the next round could not be generated".into(),
            )),
        }
    }

    /// Close the won round and build the next one.
    ///
    /// The won round counts even when the next chain cannot be built: the
    /// play then stalls, `is_finished` turns true and the generation error is
    /// returned. The last step stays current, so `prompt` never goes past the
    /// old chain.
    fn next_round(&mut self, last_answer: i64) -> Result<Turn, GameError> {
        let level_up = self.ledger.all_correct();
        let next_level = if level_up { self.level + 1 } else { self.level };

        let range = range_size(next_level);
        let mut payload = Vec::with_capacity(PAYLOAD_LEN);
        payload.push(last_answer);
        payload.extend((1..PAYLOAD_LEN).map(|_| self.rng.gen_range(RANGE_MIN..=range)));
        let built = build_operator_chain(
            &mut payload,
            range,
            &self.config.operators,
            self.config.max_repairs,
            &mut self.rng,
        );

        self.ledger.clear_status();
        if level_up {
            self.level = next_level;
            self.ledger.set_level(next_level);
        }
        self.rounds_won += 1;

        let chain = match built {
            Ok(chain) => chain,
            Err(e) => {
                self.phase = Phase::Stalled;
                return Err(e);
            }
        };
        self.chain = chain;
        self.payload = payload;
        self.position = 0;
        self.left = last_answer;

        Ok(Turn::RoundComplete {
            prompt: self.prompt(),
            level_up,
        })
    }

    /// Project the finished play into its persisted shape. Consumes the play.
    pub fn into_result(self, duration_secs: u32) -> RoundResult {
        RoundResult {
            points_earned: self.ledger.points(),
            started_level: self.level_start,
            finished_level: self.level,
            duration: duration_secs,
            correct_answers: self.ledger.correct_answers(),
            wrong_answers: self.ledger.wrong_answers(),
            details: RoundDetails::ResultKeeper {
                range_min: RANGE_MIN,
                range_max: range_size(self.level),
                steps: self.steps,
            },
        }
    }

    /// True once the play ended, in defeat or because the next round could
    /// not be generated.
    pub fn is_finished(&self) -> bool {
        self.phase != Phase::Playing
    }

    pub fn config(&self) -> &ResultKeeperConfig {
        &self.config
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn level_start(&self) -> u32 {
        self.level_start
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn rounds_won(&self) -> u32 {
        self.rounds_won
    }

    pub fn range_size(&self) -> i64 {
        range_size(self.level)
    }

    pub fn payload(&self) -> &[i64] {
        &self.payload
    }

    pub fn chain(&self) -> &[Operator] {
        &self.chain
    }

    pub fn ledger(&self) -> &ScoringLedger {
        &self.ledger
    }
}
