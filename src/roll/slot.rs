use crate::common::Int;
use std::fmt::{self, Write};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Mark {
    Dropped,
    Rerolled,
    Exploded,
    Success,
    Failure,
}

impl Mark {
    pub const fn as_char(self) -> char {
        match self {
            Self::Dropped => 'd',
            Self::Rerolled => 'r',
            Self::Exploded => '!',
            Self::Success => '*',
            Self::Failure => '-',
        }
    }
}

/// Marks in the order they were first added.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Marks(Vec<Mark>);

impl Marks {
    pub fn add(&mut self, mark: Mark) {
        if !self.contains(mark) {
            self.0.push(mark);
        }
    }

    pub fn contains(&self, mark: Mark) -> bool {
        self.0.contains(&mark)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Marks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|m| f.write_char(m.as_char()))
    }
}

/// One die of a group.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Slot {
    pub value: Int,
    pub usable: bool,
    pub marks: Marks,
}

impl Slot {
    pub fn new(value: Int) -> Self {
        Self {
            value,
            usable: true,
            marks: Marks::default(),
        }
    }

    pub fn total(&self) -> Int {
        if self.usable {
            self.value
        } else {
            0
        }
    }

    pub(crate) fn drop(&mut self) {
        self.usable = false;
        self.marks.add(Mark::Dropped);
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.marks)
    }
}
