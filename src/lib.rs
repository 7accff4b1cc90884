//! Evaluates dice expressions handed over as postfix token sequences, e.g. the tokens
//! of `3d6kh2 + 1d4!`, and renders the result with a breakdown of every die.

pub mod common;
pub mod condition;
mod error;
pub mod format;
pub mod notation;
pub mod roll;
mod snapshot;
mod stack;
pub mod token;

pub use error::RollError;
pub use format::{DisplayOptions, NumberFormat};
pub use roll::{DefaultRoller, Number, Roller};
pub use snapshot::RollSnapshot;
pub use stack::StackRoller;
pub use token::{Lexeme, TokenKind};

/// Rolls the expression once with `roller`, returning the roller for later rolls.
pub fn eval<R: Roller>(
    original: &str,
    lexemes: Vec<Lexeme>,
    roller: R,
) -> Result<StackRoller<R>, RollError> {
    let mut ret = StackRoller::new(original, lexemes, roller);
    ret.roll()?;
    Ok(ret)
}

/// Like [`eval`], reading the tokens from JSON and rolling with the thread RNG.
pub fn roll(original: &str, tokens_json: &str) -> Result<StackRoller, RollError> {
    eval(original, Lexeme::parse_all(tokens_json)?, rand::thread_rng())
}
