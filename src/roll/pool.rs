use super::{DieGroup, Number, Roller, StuntGroup};
use crate::common::Int;

/// Anything the stack roller can roll and read back.
#[enum_dispatch::enum_dispatch]
pub trait Rollable {
    fn roll<R: Roller>(&mut self, roller: &mut R) -> Vec<Number>;

    fn result(&self) -> Number;

    fn display(&self) -> String;

    /// Stunt points earned by the last roll, for pools that award them.
    fn stunt_points(&self) -> Option<Int> {
        None
    }
}

impl Rollable for DieGroup {
    fn roll<R: Roller>(&mut self, roller: &mut R) -> Vec<Number> {
        DieGroup::roll(self, roller)
    }

    fn result(&self) -> Number {
        DieGroup::result(self)
    }

    fn display(&self) -> String {
        DieGroup::display(self)
    }
}

impl Rollable for StuntGroup {
    fn roll<R: Roller>(&mut self, roller: &mut R) -> Vec<Number> {
        self.group_mut().roll(roller)
    }

    fn result(&self) -> Number {
        self.group().result()
    }

    fn display(&self) -> String {
        StuntGroup::display(self)
    }

    fn stunt_points(&self) -> Option<Int> {
        StuntGroup::stunt_points(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch::enum_dispatch(Rollable)]
pub enum Pool {
    Dice(DieGroup),
    Stunt(StuntGroup),
}

impl Pool {
    pub fn group(&self) -> &DieGroup {
        match self {
            Self::Dice(g) => g,
            Self::Stunt(s) => s.group(),
        }
    }

    pub fn group_mut(&mut self) -> &mut DieGroup {
        match self {
            Self::Dice(g) => g,
            Self::Stunt(s) => s.group_mut(),
        }
    }

    /// The token text this pool replaces in the tooltip.
    pub fn source(&self) -> &str {
        self.group().source()
    }
}
