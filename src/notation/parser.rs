use super::{lexer::*, Notation};
use crate::common::*;
use crate::error::RollError;
use crate::roll::Number;
use logos_iter::LogosIter;

type PResult<T> = Result<T, RollError>;

pub(crate) struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lexer: lexer(source),
        }
    }

    pub fn parse(mut self) -> PResult<Notation> {
        let notation = self.parse_notation()?;
        if self.lexer.peek().is_some() {
            return self.invalid();
        }
        Ok(notation)
    }

    fn invalid<T>(&self) -> PResult<T> {
        Err(RollError::InvalidDiceNotation(self.source.to_string()))
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        self.lexer.peek().map_or(false, |&peeked| peeked == kind)
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<()> {
        if self.matches(expected) {
            self.lexer.next();
            Ok(())
        } else {
            self.invalid()
        }
    }

    fn consume_as<T: std::str::FromStr>(&mut self, expected: TokenKind) -> PResult<T> {
        self.consume(expected)?;
        match self.lexer.slice().parse() {
            Ok(x) => Ok(x),
            Err(_) => self.invalid(),
        }
    }

    fn parse_notation(&mut self) -> PResult<Notation> {
        let negative = self.matches(TokenKind::Minus);
        if negative {
            self.lexer.next();
        }

        match self.lexer.peek() {
            Some(TokenKind::Decimal) => {
                let x: Float = self.consume_as(TokenKind::Decimal)?;
                Ok(Notation::Static(Number::Float(if negative { -x } else { x })))
            }
            Some(TokenKind::Integer) => {
                let x: Int = self.consume_as(TokenKind::Integer)?;
                if self.matches(TokenKind::D) {
                    if negative {
                        return self.invalid();
                    }
                    self.parse_dice(x)
                } else {
                    Ok(Notation::Static(Number::Int(if negative { -x } else { x })))
                }
            }
            Some(TokenKind::D) if !negative => self.parse_dice(1),
            _ => self.invalid(),
        }
    }

    fn parse_dice(&mut self, count: Int) -> PResult<Notation> {
        self.consume(TokenKind::D)?;
        let count = match usize::try_from(count) {
            Ok(count) if count > 0 => count,
            _ => return self.invalid(),
        };
        let faces = self.parse_faces()?;
        Ok(Notation::Dice { count, faces })
    }

    fn parse_faces(&mut self) -> PResult<Faces> {
        match self.lexer.peek() {
            Some(TokenKind::Percent) => {
                self.lexer.next();
                Ok(Faces::PERCENTILE)
            }
            Some(TokenKind::Fudge) => {
                self.lexer.next();
                Ok(Faces::FUDGE)
            }
            Some(TokenKind::LeftBracket) => {
                self.lexer.next();
                let first = self.parse_signed()?;
                let faces = if self.matches(TokenKind::Comma) {
                    self.lexer.next();
                    let max = self.parse_signed()?;
                    Faces::resolve(Some(first), max)
                } else {
                    Faces::resolve(None, first)
                };
                self.consume(TokenKind::RightBracket)?;
                Ok(faces)
            }
            Some(TokenKind::Integer | TokenKind::Minus) => {
                let max = self.parse_signed()?;
                Ok(Faces::resolve(None, max))
            }
            _ => self.invalid(),
        }
    }

    fn parse_signed(&mut self) -> PResult<Int> {
        let negative = self.matches(TokenKind::Minus);
        if negative {
            self.lexer.next();
        }
        let x: Int = self.consume_as(TokenKind::Integer)?;
        Ok(if negative { -x } else { x })
    }
}
