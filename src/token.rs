//! Tokens handed over by the expression lexer, in postfix order.

use crate::common::*;
use crate::condition::Condition;
use crate::error::RollError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    #[serde(rename = "dice")]
    Dice,
    #[serde(rename = "stunt")]
    Stunt,
    /// An operator whose symbol is in the token data.
    #[serde(rename = "math")]
    Math,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "^")]
    Pow,
    #[serde(rename = "kh")]
    KeepHigh,
    #[serde(rename = "kl")]
    KeepLow,
    #[serde(rename = "dh")]
    DropHigh,
    #[serde(rename = "dl")]
    DropLow,
    #[serde(rename = "!")]
    Explode,
    #[serde(rename = "!!")]
    ExplodeCombine,
    #[serde(rename = "r")]
    Reroll,
}

impl TokenKind {
    pub const fn is_pool(self) -> bool {
        matches!(self, Self::Dice | Self::Stunt)
    }

    pub const fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::KeepHigh
                | Self::KeepLow
                | Self::DropHigh
                | Self::DropLow
                | Self::Explode
                | Self::ExplodeCombine
                | Self::Reroll
        )
    }

    pub const fn as_binary_op(self) -> Option<BinaryOperator> {
        use BinaryOperator::*;
        Some(match self {
            Self::Add => Add,
            Self::Sub => Sub,
            Self::Mul => Mul,
            Self::Div => Div,
            Self::Pow => Pow,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexeme {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// The text of the token as written in the expression.
    pub original: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub conditionals: Vec<Condition>,
}

impl Lexeme {
    pub fn new(kind: TokenKind, original: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            kind,
            original: original.into(),
            data: data.into(),
            conditionals: Vec::new(),
        }
    }

    pub fn dice(notation: &str) -> Self {
        Self::new(TokenKind::Dice, notation, notation)
    }

    pub fn stunt(notation: &str) -> Self {
        Self::new(TokenKind::Stunt, notation, notation)
    }

    pub fn operator(op: BinaryOperator) -> Self {
        let symbol = op.to_string();
        Self::new(TokenKind::Math, symbol.clone(), symbol)
    }

    pub fn modifier(kind: TokenKind, original: &str, data: &str) -> Self {
        Self::new(kind, original, data)
    }

    pub fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditionals = conditions;
        self
    }

    /// Reads a token sequence from its JSON form.
    pub fn parse_all(json: &str) -> Result<Vec<Self>, RollError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The binary operator of an operator token.
    pub fn binary_op(&self) -> Option<Result<BinaryOperator, RollError>> {
        match self.kind {
            TokenKind::Math => Some(self.data.parse()),
            kind => kind.as_binary_op().map(Ok),
        }
    }

    /// The count carried in the token data, if there is a readable one.
    pub fn magnitude(&self) -> Option<usize> {
        let data = self.data.trim();
        data.parse::<usize>().ok().or_else(|| {
            data.parse::<Float>()
                .ok()
                .filter(|x| x.is_finite() && *x >= 0.0)
                .map(|x| x as usize)
        })
    }
}
