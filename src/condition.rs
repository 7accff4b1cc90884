//! Comparison conditions attached to dice tokens.
//!
//! A list of conditions is satisfied when any one of them matches. Conditions decide
//! which dice a reroll or explosion triggers on, and which dice count as successes.

use crate::common::*;
use crate::roll::Number;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=", alias = "=!")]
    NotEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterEqual,
    /// Marks the face that counts as a failure in success counting. Never matches on
    /// its own.
    #[serde(rename = "-=", alias = "=-")]
    Negate,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Negate => "-=",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub operator: Comparison,
    #[serde(rename = "comparer")]
    pub comparand: Float,
}

impl Condition {
    pub fn new(operator: Comparison, comparand: impl Into<Number>) -> Self {
        Self {
            operator,
            comparand: comparand.into().as_float(),
        }
    }

    pub fn equal(comparand: impl Into<Number>) -> Self {
        Self::new(Comparison::Equal, comparand)
    }

    pub fn negate(comparand: impl Into<Number>) -> Self {
        Self::new(Comparison::Negate, comparand)
    }

    pub fn is_negate(&self) -> bool {
        self.operator == Comparison::Negate
    }

    pub fn matches(&self, value: Number) -> bool {
        let value = value.as_float();
        let x = self.comparand;
        if value.is_nan() || x.is_nan() {
            return false;
        }
        match self.operator {
            Comparison::Equal => value == x,
            Comparison::NotEqual => value != x,
            Comparison::Less => value < x,
            Comparison::LessEqual => value <= x,
            Comparison::Greater => value > x,
            Comparison::GreaterEqual => value >= x,
            Comparison::Negate => false,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.comparand)
    }
}

/// Returns `None` when there are no conditions, so that the caller can pick what an
/// unconditioned value means.
pub fn matches(value: Number, conditions: &[Condition]) -> Option<bool> {
    if conditions.is_empty() {
        None
    } else {
        Some(conditions.iter().any(|c| c.matches(value)))
    }
}

/// The conditions a modifier triggers on, falling back to `default` when the token
/// carried none.
pub fn trigger(conditions: &[Condition], default: Condition) -> NonEmpty<Condition> {
    NonEmpty::try_from_vec(conditions.to_vec()).unwrap_or_else(|_| vec1![default])
}

pub fn satisfies(value: impl Into<Number>, trigger: &NonEmpty<Condition>) -> bool {
    let value = value.into();
    trigger.iter().any(|c| c.matches(value))
}
