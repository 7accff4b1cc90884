use super::{
    slot::{Mark, Slot},
    Number, RResult, Roller,
};
use crate::common::*;
use crate::condition::{self, Condition};
use crate::error::RollError;
use crate::notation::{self, Notation};
use crate::token::Lexeme;
use log::trace;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    pub magnitude: usize,
    pub conditions: Vec<Condition>,
}

impl Modifier {
    pub fn new(magnitude: usize) -> Self {
        Self {
            magnitude,
            conditions: Vec::new(),
        }
    }

    pub fn with_conditions(magnitude: usize, conditions: Vec<Condition>) -> Self {
        Self {
            magnitude,
            conditions,
        }
    }
}

/// A homogeneous group of dice, or a resolved literal standing in for one.
#[derive(Debug, Clone, PartialEq)]
pub struct DieGroup {
    source: String,
    notation: Notation,
    slots: Vec<Slot>,
    modifiers: BTreeMap<ModifierKind, Modifier>,
    conditions: Vec<Condition>,
}

impl DieGroup {
    /// Parses `notation` and performs the initial roll.
    pub fn new<R: Roller>(notation: &str, roller: &mut R) -> RResult<Self> {
        let parsed = notation::parse(notation)?;
        Ok(Self::from_notation(notation.to_string(), parsed, roller))
    }

    /// Builds the group for a `dice` token. The token's conditions are left to the
    /// caller, see [`set_success_conditions`](Self::set_success_conditions).
    pub fn from_lexeme<R: Roller>(lexeme: &Lexeme, roller: &mut R) -> RResult<Self> {
        let parsed = notation::parse(&lexeme.data)?;
        Ok(Self::from_notation(lexeme.original.clone(), parsed, roller))
    }

    pub fn from_notation<R: Roller>(source: String, notation: Notation, roller: &mut R) -> Self {
        let mut ret = Self {
            source,
            notation,
            slots: Vec::new(),
            modifiers: BTreeMap::new(),
            conditions: Vec::new(),
        };
        if let Notation::Dice { count, faces } = notation {
            ret.slots = ret.draw(count, faces, roller);
        }
        ret
    }

    pub fn literal(value: Number, source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            notation: Notation::Static(value),
            slots: Vec::new(),
            modifiers: BTreeMap::new(),
            conditions: Vec::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn notation(&self) -> Notation {
        self.notation
    }

    pub fn is_static(&self) -> bool {
        self.notation.is_static()
    }

    pub fn faces(&self) -> Option<Faces> {
        match self.notation {
            Notation::Dice { faces, .. } => Some(faces),
            Notation::Static(_) => None,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn modifiers(&self) -> &BTreeMap<ModifierKind, Modifier> {
        &self.modifiers
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    fn dice_faces(&self) -> RResult<Faces> {
        self.faces().ok_or(RollError::ModifiersNotAllowed)
    }

    /// Attaches a modifier applied by every subsequent [`roll`](Self::roll), replacing
    /// any earlier modifier of the same kind.
    pub fn set_modifier(&mut self, kind: ModifierKind, modifier: Modifier) -> RResult<()> {
        self.dice_faces()?;
        self.modifiers.insert(kind, modifier);
        Ok(())
    }

    /// Switches the group into success counting on every subsequent roll.
    pub fn set_success_conditions(&mut self, conditions: Vec<Condition>) -> RResult<()> {
        self.dice_faces()?;
        self.conditions = conditions;
        Ok(())
    }

    pub fn keep_high(&mut self, n: usize) -> RResult<()> {
        self.dice_faces()?;
        keep_high(&mut self.slots, n);
        Ok(())
    }

    pub fn keep_low(&mut self, n: usize) -> RResult<()> {
        self.dice_faces()?;
        keep_low(&mut self.slots, n);
        Ok(())
    }

    pub fn reroll<R: Roller>(
        &mut self,
        times: usize,
        conditions: &[Condition],
        roller: &mut R,
    ) -> RResult<()> {
        let faces = self.dice_faces()?;
        let trigger = condition::trigger(conditions, Condition::equal(faces.min));
        reroll(&mut self.slots, faces, times, &trigger, roller);
        Ok(())
    }

    pub fn explode<R: Roller>(
        &mut self,
        times: usize,
        conditions: &[Condition],
        roller: &mut R,
    ) -> RResult<()> {
        let faces = self.dice_faces()?;
        let trigger = condition::trigger(conditions, Condition::equal(faces.max));
        explode(&mut self.slots, faces, times, &trigger, roller);
        Ok(())
    }

    pub fn explode_and_combine<R: Roller>(
        &mut self,
        times: usize,
        conditions: &[Condition],
        roller: &mut R,
    ) -> RResult<()> {
        let faces = self.dice_faces()?;
        let trigger = condition::trigger(conditions, Condition::equal(faces.max));
        explode_and_combine(&mut self.slots, faces, times, &trigger, roller);
        Ok(())
    }

    pub fn apply_success_conditions(&mut self, conditions: &[Condition]) -> RResult<()> {
        self.dice_faces()?;
        count_successes(&mut self.slots, conditions);
        Ok(())
    }

    /// Draws every die again and reapplies the attached modifiers, then the success
    /// conditions. Returns the draws as they were before any modifier touched them.
    pub fn roll<R: Roller>(&mut self, roller: &mut R) -> Vec<Number> {
        let (count, faces) = match self.notation {
            Notation::Static(value) => return vec![value],
            Notation::Dice { count, faces } => (count, faces),
        };

        self.slots = self.draw(count, faces, roller);
        let draws = self.slots.iter().map(|s| Number::Int(s.value)).collect();

        for (&kind, modifier) in &self.modifiers {
            let times = modifier.magnitude;
            match kind {
                ModifierKind::KeepHigh => keep_high(&mut self.slots, times),
                ModifierKind::KeepLow => keep_low(&mut self.slots, times),
                ModifierKind::Reroll => {
                    let trigger =
                        condition::trigger(&modifier.conditions, Condition::equal(faces.min));
                    reroll(&mut self.slots, faces, times, &trigger, roller);
                }
                ModifierKind::Explode => {
                    let trigger =
                        condition::trigger(&modifier.conditions, Condition::equal(faces.max));
                    explode(&mut self.slots, faces, times, &trigger, roller);
                }
                ModifierKind::ExplodeCombine => {
                    let trigger =
                        condition::trigger(&modifier.conditions, Condition::equal(faces.max));
                    explode_and_combine(&mut self.slots, faces, times, &trigger, roller);
                }
            }
        }
        if !self.conditions.is_empty() {
            count_successes(&mut self.slots, &self.conditions);
        }

        draws
    }

    pub fn result(&self) -> Number {
        match self.notation {
            Notation::Static(value) => value,
            Notation::Dice { .. } => self.slots.iter().map(|s| Number::Int(s.total())).sum(),
        }
    }

    pub fn display(&self) -> String {
        match self.notation {
            Notation::Static(value) => value.to_string(),
            Notation::Dice { .. } => {
                format!("[{}]", join_slots(self.slots.iter().map(ToString::to_string)))
            }
        }
    }

    fn draw<R: Roller>(&self, count: usize, faces: Faces, roller: &mut R) -> Vec<Slot> {
        let values = roller.roll_n(count, faces);
        trace!("{}: drew {:?}", self.source, values);
        values.into_iter().map(Slot::new).collect()
    }
}

pub(crate) fn join_slots(slots: impl Iterator<Item = String>) -> String {
    slots.collect::<Vec<_>>().join(", ")
}

/// Slot indices from highest to lowest value, ties in slot order.
fn descending(slots: &[Slot]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..slots.len()).collect();
    order.sort_by(|&a, &b| slots[b].value.cmp(&slots[a].value));
    order
}

fn keep_high(slots: &mut [Slot], n: usize) {
    for i in descending(slots).into_iter().skip(n) {
        slots[i].drop();
    }
}

// Drops exactly the dice `keep_high(len - n)` would keep.
fn keep_low(slots: &mut [Slot], n: usize) {
    let order = descending(slots);
    let to_drop = order.len().saturating_sub(n);
    for i in order.into_iter().take(to_drop) {
        slots[i].drop();
    }
}

/// Rerolls the dice that matched before the first pass, all of them on every pass, for
/// as long as one of them still matches.
fn reroll<R: Roller>(
    slots: &mut [Slot],
    faces: Faces,
    times: usize,
    trigger: &NonEmpty<Condition>,
    roller: &mut R,
) {
    let batch: Vec<usize> = (0..slots.len())
        .filter(|&i| condition::satisfies(slots[i].value, trigger))
        .collect();

    let mut passes = 0;
    while passes < times && batch.iter().any(|&i| condition::satisfies(slots[i].value, trigger)) {
        passes += 1;
        for &i in &batch {
            slots[i].value = roller.roll(faces);
            slots[i].marks.add(Mark::Rerolled);
        }
    }
}

fn explode<R: Roller>(
    slots: &mut Vec<Slot>,
    faces: Faces,
    times: usize,
    trigger: &NonEmpty<Condition>,
    roller: &mut R,
) {
    let triggered: Vec<usize> = (0..slots.len())
        .filter(|&i| condition::satisfies(slots[i].value, trigger))
        .collect();

    let mut inserted = 0;
    for index in triggered {
        // Earlier chains have shifted this slot to the right.
        let start = index + inserted;
        let mut last = slots[start].value;
        let mut chain = 0;
        while chain < times && condition::satisfies(last, trigger) {
            slots[start + chain].marks.add(Mark::Exploded);
            last = roller.roll(faces);
            let mut slot = Slot::new(last);
            slot.marks.add(Mark::Exploded);
            slots.insert(start + chain + 1, slot);
            chain += 1;
        }
        inserted += chain;
    }
}

fn explode_and_combine<R: Roller>(
    slots: &mut [Slot],
    faces: Faces,
    times: usize,
    trigger: &NonEmpty<Condition>,
    roller: &mut R,
) {
    for slot in slots.iter_mut().filter(|s| condition::satisfies(s.value, trigger)) {
        let mut last = slot.value;
        let mut draws = 0;
        while draws < times && condition::satisfies(last, trigger) {
            slot.marks.add(Mark::Exploded);
            last = roller.roll(faces);
            // Faces may span the whole integer range.
            slot.value = slot.value.saturating_add(last);
            draws += 1;
        }
    }
}

fn count_successes(slots: &mut [Slot], conditions: &[Condition]) {
    if conditions.is_empty() {
        return;
    }
    let negate = conditions.iter().find(|c| c.is_negate());

    for slot in slots {
        if let Some(negate) = negate {
            if slot.value as Float == negate.comparand {
                slot.value = -1;
                slot.marks.add(Mark::Failure);
                continue;
            }
        }

        if condition::matches(Number::Int(slot.value), conditions) == Some(true) {
            slot.value = 1;
            slot.marks.add(Mark::Success);
        } else {
            slot.usable = false;
        }
    }
}
