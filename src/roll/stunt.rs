use super::{group::join_slots, DieGroup, Roller};
use crate::common::*;
use crate::notation::Notation;
use crate::token::Lexeme;
use std::collections::HashSet;

/// A 3d6 pool that earns stunt points whenever two of its dice show the same value.
///
/// Whatever the token says, the pool is always three six-sided dice; the token text is
/// only kept for the tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct StuntGroup {
    group: DieGroup,
}

impl StuntGroup {
    pub const DICE: usize = 3;

    pub fn new<R: Roller>(source: impl Into<String>, roller: &mut R) -> Self {
        let notation = Notation::Dice {
            count: Self::DICE,
            faces: Faces::D6,
        };
        Self {
            group: DieGroup::from_notation(source.into(), notation, roller),
        }
    }

    pub fn from_lexeme<R: Roller>(lexeme: &Lexeme, roller: &mut R) -> Self {
        Self::new(lexeme.original.clone(), roller)
    }

    pub fn group(&self) -> &DieGroup {
        &self.group
    }

    pub fn group_mut(&mut self) -> &mut DieGroup {
        &mut self.group
    }

    pub fn doubles(&self) -> bool {
        let distinct: HashSet<Int> = self.group.slots().iter().map(|s| s.total()).collect();
        distinct.len() < Self::DICE
    }

    /// Stunt points earned by the current roll: the value of the first die when the
    /// roll has doubles.
    pub fn stunt_points(&self) -> Option<Int> {
        if self.doubles() {
            self.group.slots().first().map(|s| s.value)
        } else {
            None
        }
    }

    pub fn display(&self) -> String {
        let doubles = self.doubles();
        let slots = self.group.slots().iter().enumerate().map(|(i, slot)| {
            if i == 0 && doubles {
                format!("{}S", slot.value)
            } else {
                slot.to_string()
            }
        });
        format!("[{}]", join_slots(slots))
    }
}
