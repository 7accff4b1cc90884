mod group;
mod num;
mod pool;
pub(crate) mod roller;
mod slot;
mod stunt;

use crate::error::RollError;

pub(crate) type RResult<T> = Result<T, RollError>;

pub type DefaultRoller = rand::rngs::ThreadRng;

pub use group::{DieGroup, Modifier};
pub use num::Number;
pub use pool::{Pool, Rollable};
pub use roller::Roller;
pub use slot::{Mark, Marks, Slot};
pub use stunt::StuntGroup;
