use crate::error::RollError;
use crate::roll::Number;
use std::fmt::{self, Write};
use std::str::FromStr;
pub use vec1::vec1;

pub type Int = i64;

pub type Float = f64;

pub type NonEmpty<T> = vec1::Vec1<T>;

/// Inclusive value range of a single die.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Faces {
    pub min: Int,
    pub max: Int,
}

impl Faces {
    pub const D6: Self = Self::new(1, 6);
    pub const PERCENTILE: Self = Self::new(1, 100);
    pub const FUDGE: Self = Self::new(-1, 1);

    pub const fn new(min: Int, max: Int) -> Self {
        Self { min, max }
    }

    /// Builds a face range from the bounds written in the notation.
    ///
    /// A missing minimum is `1`, or `-1` when the maximum is negative. The bounds are
    /// swapped when written the wrong way round.
    pub fn resolve(min: Option<Int>, max: Int) -> Self {
        let min = match min {
            Some(min) => min,
            None if max < 0 => -1,
            None => 1,
        };
        if max < min {
            Self::new(max, min)
        } else {
            Self::new(min, max)
        }
    }
}

impl fmt::Display for Faces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::FUDGE => f.write_char('F'),
            Self { min: 1, max } => fmt::Display::fmt(&max, f),
            Self { min, max } => write!(f, "[{},{}]", min, max),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOperator {
    pub fn apply(self, left: Number, right: Number) -> Number {
        match self {
            Self::Add => left + right,
            Self::Sub => left - right,
            Self::Mul => left * right,
            Self::Div => left / right,
            Self::Pow => left.pow(right),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Pow => '^',
        };
        f.write_char(c)
    }
}

impl FromStr for BinaryOperator {
    type Err = RollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "^" => Self::Pow,
            other => {
                return Err(RollError::MalformedTokenSequence(format!(
                    "unknown operator {:?}",
                    other
                )))
            }
        })
    }
}

/// Modifiers that can be attached to a dice group.
///
/// The declaration order is the order in which a roll applies them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ModifierKind {
    KeepHigh,
    KeepLow,
    Reroll,
    Explode,
    ExplodeCombine,
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::KeepHigh => "kh",
            Self::KeepLow => "kl",
            Self::Reroll => "r",
            Self::Explode => "!",
            Self::ExplodeCombine => "!!",
        };
        f.write_str(s)
    }
}
