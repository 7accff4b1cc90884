//! Notation of a single dice group, as carried by a `dice` token.
//!
//! ```text
//! notation := ['-'] number            static literal
//!           | [count] ('d' | 'D') faces
//! faces    := integer | '-' integer | '%' | 'F' | '[' [int ','] int ']'
//! ```

mod lexer;
mod parser;

use crate::common::*;
use crate::error::RollError;
use crate::roll::Number;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Notation {
    /// An already resolved number.
    Static(Number),
    Dice { count: usize, faces: Faces },
}

impl Notation {
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }
}

impl std::str::FromStr for Notation {
    type Err = RollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::Parser::new(s).parse()
    }
}

pub fn parse(s: &str) -> Result<Notation, RollError> {
    s.parse()
}
