use crate::common::{Faces, Int};
use rand::{
    distributions::{Distribution, Uniform},
    Rng,
};

/// Source of die draws: uniform integers over an inclusive face range.
pub trait Roller {
    fn roll(&mut self, faces: Faces) -> Int;

    fn roll_n(&mut self, num: usize, faces: Faces) -> Vec<Int> {
        (0..num).map(|_| self.roll(faces)).collect()
    }
}

impl<R: Rng> Roller for R {
    fn roll(&mut self, faces: Faces) -> Int {
        self.gen_range(faces.min..=faces.max)
    }

    fn roll_n(&mut self, num: usize, faces: Faces) -> Vec<Int> {
        Uniform::new_inclusive(faces.min, faces.max)
            .sample_iter(self)
            .take(num)
            .collect()
    }
}

#[cfg(test)]
pub(crate) use test_rollers::{SequenceRoller, StepRoller};

#[cfg(test)]
mod test_rollers {
    use super::*;

    /// Replays a fixed list of draws, starting over when it runs out.
    pub(crate) struct SequenceRoller {
        values: Vec<Int>,
        next: usize,
        pub draws: usize,
    }

    impl SequenceRoller {
        pub fn new(values: impl Into<Vec<Int>>) -> Self {
            Self {
                values: values.into(),
                next: 0,
                draws: 0,
            }
        }
    }

    impl Roller for SequenceRoller {
        fn roll(&mut self, _: Faces) -> Int {
            let ret = self.values[self.next % self.values.len()];
            self.next += 1;
            self.draws += 1;
            ret
        }
    }

    /// Walks through the face range in fixed steps.
    pub(crate) struct StepRoller {
        current: Int,
        step: Int,
    }

    impl StepRoller {
        pub fn new(initial: Int, step: Int) -> Self {
            Self {
                current: initial,
                step,
            }
        }
    }

    impl Roller for StepRoller {
        fn roll(&mut self, faces: Faces) -> Int {
            let span = faces.max - faces.min + 1;
            let ret = (self.current - faces.min).rem_euclid(span) + faces.min;
            self.current += self.step;
            ret
        }
    }

    #[test]
    fn test_step_roller_wraps() {
        let mut roller = StepRoller::new(5, 1);
        assert_eq!(roller.roll_n(4, Faces::D6), vec![5, 6, 1, 2]);
        assert_eq!(roller.roll(Faces::FUDGE), 0);
    }
}
