use crate::common::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rolled or computed value.
///
/// Integer arithmetic stays integral until it overflows or divides, at which point the
/// value becomes a float.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(Int),
    Float(Float),
}

impl Number {
    pub(crate) const ZERO: Self = Self::Int(0);

    pub fn as_int(self) -> Int {
        match self {
            Self::Int(x) => x,
            Self::Float(x) => x as Int,
        }
    }

    pub fn as_float(self) -> Float {
        match self {
            Self::Int(x) => x as Float,
            Self::Float(x) => x,
        }
    }

    pub fn pow(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Int(x), Self::Int(y)) => u32::try_from(y)
                .ok()
                .and_then(|y| x.checked_pow(y))
                .map_or_else(|| Self::Float((x as Float).powf(y as Float)), Self::Int),
            (x, y) => Self::Float(x.as_float().powf(y.as_float())),
        }
    }
}

macro_rules! val_impl_bin_op {
    ($Name:ident, $fn_name:ident, $checked:ident) => {
        impl std::ops::$Name for Number {
            type Output = Self;

            fn $fn_name(self, rhs: Self) -> Self::Output {
                match (self, rhs) {
                    (Self::Int(x), Self::Int(y)) => x.$checked(y).map_or_else(
                        || Self::Float(std::ops::$Name::$fn_name(x as Float, y as Float)),
                        Self::Int,
                    ),
                    (x, y) => Self::Float(std::ops::$Name::$fn_name(x.as_float(), y.as_float())),
                }
            }
        }
    };
}

val_impl_bin_op!(Add, add, checked_add);
val_impl_bin_op!(Sub, sub, checked_sub);
val_impl_bin_op!(Mul, mul, checked_mul);

impl std::ops::Div for Number {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self::Float(self.as_float() / rhs.as_float())
    }
}

impl std::iter::Sum for Number {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |a, b| a + b)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(x), Self::Int(y)) => x == y,
            _ => self.as_float().eq(&other.as_float()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Self::Int(x), Self::Int(y)) => x.partial_cmp(y),
            _ => self.as_float().partial_cmp(&other.as_float()),
        }
    }
}

impl From<Int> for Number {
    fn from(x: Int) -> Self {
        Self::Int(x)
    }
}

impl From<i32> for Number {
    fn from(x: i32) -> Self {
        Self::Int(x.into())
    }
}

impl From<Float> for Number {
    fn from(x: Float) -> Self {
        Self::Float(x)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => fmt::Display::fmt(x, f),
            Self::Float(x) => fmt::Display::fmt(x, f),
        }
    }
}
