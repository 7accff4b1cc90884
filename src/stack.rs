//! Evaluation of a whole expression from its postfix token sequence.

use crate::common::*;
use crate::error::RollError;
use crate::format::DisplayOptions;
use crate::notation::Notation;
use crate::roll::{
    DefaultRoller, DieGroup, Modifier, Number, Pool, RResult, Rollable, Roller, StuntGroup,
};
use crate::snapshot::RollSnapshot;
use crate::token::{Lexeme, TokenKind};
use log::{debug, warn};

enum Entry {
    /// Index into the created pools.
    Created(usize),
    /// The literal an operator folded its operands into.
    Resolved(Pool),
}

/// Rolls an expression given as tokens in postfix order.
///
/// Pools are created the first time [`roll`](Self::roll) reaches their token and are
/// reused, modifiers included, by every later call.
pub struct StackRoller<R = DefaultRoller> {
    original: String,
    lexemes: Vec<Lexeme>,
    roller: R,
    dice: Vec<Pool>,
    result: Option<Number>,
    tooltip: Option<String>,
    stunted: Option<Int>,
    notices: Vec<RollError>,
}

impl<R: Roller> StackRoller<R> {
    pub fn new(original: impl Into<String>, lexemes: Vec<Lexeme>, roller: R) -> Self {
        Self {
            original: original.into(),
            lexemes,
            roller,
            dice: Vec::new(),
            result: None,
            tooltip: None,
            stunted: None,
            notices: Vec::new(),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn lexemes(&self) -> &[Lexeme] {
        &self.lexemes
    }

    pub fn result(&self) -> Option<Number> {
        self.result
    }

    /// The pools created so far, in token order.
    pub fn dice(&self) -> &[Pool] {
        &self.dice
    }

    /// Problems the last pass recovered from.
    pub fn notices(&self) -> &[RollError] {
        &self.notices
    }

    /// Walks the tokens once, rolling every pool, and returns the final result.
    ///
    /// An invalid dice notation aborts the pass and leaves the result unset.
    pub fn roll(&mut self) -> RResult<Number> {
        let lexemes = std::mem::take(&mut self.lexemes);
        let ret = self.walk(&lexemes);
        self.lexemes = lexemes;

        let result = ret?;
        self.result = Some(result);
        self.tooltip = None;
        Ok(result)
    }

    fn walk(&mut self, lexemes: &[Lexeme]) -> RResult<Number> {
        self.result = None;
        self.stunted = None;
        self.notices.clear();
        debug!("rolling {:?} ({} tokens)", self.original, lexemes.len());

        let mut stack = Vec::new();
        let mut index = 0;
        for lexeme in lexemes {
            match lexeme.kind {
                kind if kind.is_pool() => {
                    if index == self.dice.len() {
                        let pool = self.create(lexeme)?;
                        self.dice.push(pool);
                    }
                    if !lexeme.conditionals.is_empty() {
                        let group = self.dice[index].group_mut();
                        if let Err(e) = group.set_success_conditions(lexeme.conditionals.clone()) {
                            self.notice(e);
                        }
                    }
                    stack.push(Entry::Created(index));
                    index += 1;
                }
                kind if kind.is_modifier() => {
                    if let Err(e) = self.attach(lexeme, index) {
                        self.notice(e);
                    }
                }
                _ => self.fold(lexeme, &mut stack),
            }
        }

        if stack.len() > 1 {
            self.notice(RollError::malformed(format!(
                "{} values left after the last token",
                stack.len()
            )));
        }
        let top = stack
            .pop()
            .ok_or_else(|| RollError::malformed("nothing to roll"))?;
        Ok(self.settle(top))
    }

    fn create(&mut self, lexeme: &Lexeme) -> RResult<Pool> {
        let pool: Pool = match lexeme.kind {
            TokenKind::Stunt => StuntGroup::from_lexeme(lexeme, &mut self.roller).into(),
            _ => DieGroup::from_lexeme(lexeme, &mut self.roller)?.into(),
        };
        debug!("created {:?} as {:?}", lexeme.original, pool.group().notation());
        Ok(pool)
    }

    /// Binds a modifier to the pool created last, whatever is on top of the stack.
    fn attach(&mut self, lexeme: &Lexeme, index: usize) -> RResult<()> {
        let group = index
            .checked_sub(1)
            .and_then(|i| self.dice.get_mut(i))
            .ok_or_else(|| {
                RollError::malformed(format!("{:?} modifies nothing", lexeme.original))
            })?
            .group_mut();

        let size = match group.notation() {
            Notation::Dice { count, .. } => count,
            Notation::Static(_) => 0,
        };
        let kept = |n: Option<usize>| n.unwrap_or(1);
        let repeats = |n: Option<usize>| n.filter(|&n| n > 0).unwrap_or(1);
        let conditions = || lexeme.conditionals.clone();

        let (kind, modifier) = match lexeme.kind {
            TokenKind::KeepHigh => (
                ModifierKind::KeepHigh,
                Modifier::new(kept(lexeme.magnitude())),
            ),
            TokenKind::KeepLow => (
                ModifierKind::KeepLow,
                Modifier::new(kept(lexeme.magnitude())),
            ),
            TokenKind::DropHigh => (
                ModifierKind::KeepLow,
                Modifier::new(size.saturating_sub(kept(lexeme.magnitude()))),
            ),
            TokenKind::DropLow => (
                ModifierKind::KeepHigh,
                Modifier::new(size.saturating_sub(kept(lexeme.magnitude()))),
            ),
            TokenKind::Explode => (
                ModifierKind::Explode,
                Modifier::with_conditions(repeats(lexeme.magnitude()), conditions()),
            ),
            TokenKind::ExplodeCombine => (
                ModifierKind::ExplodeCombine,
                Modifier::with_conditions(repeats(lexeme.magnitude()), conditions()),
            ),
            TokenKind::Reroll => (
                ModifierKind::Reroll,
                Modifier::with_conditions(repeats(lexeme.magnitude()), conditions()),
            ),
            kind => return Err(RollError::malformed(format!("{:?} is not a modifier", kind))),
        };
        debug!("{}: {}{}", group.source(), kind, modifier.magnitude);
        group.set_modifier(kind, modifier)
    }

    fn fold(&mut self, lexeme: &Lexeme, stack: &mut Vec<Entry>) {
        let op = match lexeme.binary_op() {
            Some(Ok(op)) => op,
            Some(Err(e)) => return self.notice(e),
            None => {
                return self.notice(RollError::malformed(format!(
                    "unexpected token {:?}",
                    lexeme.original
                )))
            }
        };

        let right = match stack.pop() {
            Some(entry) => entry,
            None => return self.notice(RollError::malformed(format!("{} has no operands", op))),
        };
        let left = match stack.pop() {
            Some(entry) => entry,
            None => {
                stack.push(right);
                return self.notice(RollError::malformed(format!("{} has a single operand", op)));
            }
        };

        let right = self.settle(right);
        let left = self.settle(left);
        let value = op.apply(left, right);
        debug!("{} {} {} = {}", left, op, right, value);
        stack.push(Entry::Resolved(DieGroup::literal(value, lexeme.original.clone()).into()));
    }

    /// Rolls the entry and reads its result, noting any stunt points it earned.
    fn settle(&mut self, mut entry: Entry) -> Number {
        let pool = match &mut entry {
            Entry::Created(i) => &mut self.dice[*i],
            Entry::Resolved(pool) => pool,
        };
        pool.roll(&mut self.roller);
        if let Some(points) = pool.stunt_points() {
            self.stunted = Some(points);
        }
        pool.result()
    }

    fn notice(&mut self, e: RollError) {
        warn!("{:?}: {}", self.original, e);
        self.notices.push(e);
    }

    /// The expression, then the expression with every pool replaced by its dice.
    pub fn tooltip(&self) -> String {
        if let Some(tooltip) = &self.tooltip {
            return tooltip.clone();
        }
        let rolled = self
            .dice
            .iter()
            .fold(self.original.clone(), |text, pool| {
                text.replacen(pool.source(), &pool.display(), 1)
            });
        format!("{}\n{}", self.original, rolled)
    }

    pub fn stunt_annotation(&self) -> Option<String> {
        self.stunted.map(|points| format!(" - {} Stunt Points", points))
    }

    /// The result as it should be shown, or `None` before the first successful roll.
    pub fn display_text(&self, options: &DisplayOptions) -> Option<String> {
        let result = self.result?;
        let mut ret = String::new();
        if options.display_results_inline {
            ret.push_str(self.original.trim());
            ret.push_str(" -> ");
        }
        ret.push_str(&options.number_format.format(result.as_float()));
        if let Some(annotation) = self.stunt_annotation() {
            ret.push_str(&annotation);
        }
        Some(ret)
    }

    pub fn to_result(&self) -> RollSnapshot {
        RollSnapshot::Dice {
            result: self.result,
            tooltip: self.tooltip(),
        }
    }

    /// Shows a stored outcome without rolling. Snapshots of other rollers are ignored.
    pub fn apply_result(&mut self, snapshot: &RollSnapshot) {
        if let RollSnapshot::Dice { result, tooltip } = snapshot {
            if let Some(result) = result {
                self.result = Some(*result);
            }
            if !tooltip.is_empty() {
                self.tooltip = Some(tooltip.clone());
            }
        }
    }

    pub fn apply_result_json(&mut self, json: &str) -> RResult<()> {
        let snapshot = RollSnapshot::from_json(json)?;
        self.apply_result(&snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Comparison, Condition};
    use crate::format::NumberFormat;
    use crate::roll::roller::SequenceRoller;

    fn roller(original: &str, lexemes: Vec<Lexeme>, draws: &[Int]) -> StackRoller<SequenceRoller> {
        StackRoller::new(original, lexemes, SequenceRoller::new(draws.to_vec()))
    }

    fn plus() -> Lexeme {
        Lexeme::operator(BinaryOperator::Add)
    }

    #[test]
    fn test_dice_plus_literal() {
        // Construction draws first, then the pass rolls the right operand before the left.
        let mut stack = roller(
            "2d20 + 5",
            vec![Lexeme::dice("2d20"), Lexeme::dice("5"), plus()],
            &[1, 1, 10, 15],
        );
        assert_eq!(stack.roll(), Ok(Number::Int(30)));
        assert_eq!(stack.result(), Some(Number::Int(30)));
        assert_eq!(stack.tooltip(), "2d20 + 5\n[10, 15] + 5");
        assert!(stack.notices().is_empty());
        assert_eq!(stack.dice().len(), 2);
    }

    #[test]
    fn test_keep_high() {
        let mut stack = roller(
            "4d6kh3",
            vec![Lexeme::dice("4d6"), Lexeme::modifier(TokenKind::KeepHigh, "kh3", "3")],
            &[1, 1, 1, 1, 2, 5, 1, 6],
        );
        assert_eq!(stack.roll(), Ok(Number::Int(13)));
        assert_eq!(stack.tooltip(), "4d6kh3\n[2, 5, 1d, 6]kh3");
    }

    #[test]
    fn test_explode() {
        let mut stack = roller(
            "1d6!",
            vec![Lexeme::dice("1d6"), Lexeme::modifier(TokenKind::Explode, "!", "")],
            &[1, 6, 3],
        );
        assert_eq!(stack.roll(), Ok(Number::Int(9)));
        assert_eq!(stack.dice()[0].display(), "[6!, 3!]");
        assert_eq!(stack.dice()[0].group().slots().len(), 2);
    }

    #[test]
    fn test_reroll_with_conditions() {
        let lexeme = Lexeme::modifier(TokenKind::Reroll, "r<3", "")
            .with_conditions(vec![Condition::new(Comparison::Less, 3)]);
        let mut stack = roller("2d6r<3", vec![Lexeme::dice("2d6"), lexeme], &[1, 1, 2, 5, 4, 6]);
        assert_eq!(stack.roll(), Ok(Number::Int(9)));
        assert_eq!(stack.tooltip(), "2d6r<3\n[4r, 5]r<3");
    }

    #[test]
    fn test_operands_roll_right_first() {
        let mut stack = roller(
            "1d6 - 1d6",
            vec![Lexeme::dice("1d6"), Lexeme::dice("1d6"), Lexeme::operator(BinaryOperator::Sub)],
            &[1, 1, 6, 2],
        );
        assert_eq!(stack.roll(), Ok(Number::Int(-4)));
        assert_eq!(stack.tooltip(), "1d6 - 1d6\n[2] - [6]");
    }

    #[test]
    fn test_modifier_binds_to_last_created_pool() {
        // The keep lands on 2d6 even though the sum is on top of the stack, and only
        // takes effect from the next pass on.
        let mut stack = roller(
            "1d6 + 2d6kh1",
            vec![
                Lexeme::dice("1d6"),
                Lexeme::dice("2d6"),
                plus(),
                Lexeme::modifier(TokenKind::KeepHigh, "kh1", "1"),
            ],
            &[1, 1, 1, 4, 6, 3, 4, 6, 3],
        );
        assert_eq!(stack.roll(), Ok(Number::Int(13)));
        assert!(stack.notices().is_empty());
        assert!(stack.dice()[0].group().modifiers().is_empty());
        assert!(stack.dice()[1].group().modifiers().contains_key(&ModifierKind::KeepHigh));

        assert_eq!(stack.roll(), Ok(Number::Int(9)));
    }

    #[test]
    fn test_drop_high_and_low() {
        let mut stack = roller(
            "4d6dl1",
            vec![Lexeme::dice("4d6"), Lexeme::modifier(TokenKind::DropLow, "dl1", "1")],
            &[3, 1, 4, 6],
        );
        assert_eq!(stack.roll(), Ok(Number::Int(13)));
        assert_eq!(stack.dice()[0].display(), "[3, 1d, 4, 6]");

        let mut stack = roller(
            "4d6dh",
            vec![Lexeme::dice("4d6"), Lexeme::modifier(TokenKind::DropHigh, "dh", "")],
            &[3, 1, 4, 6],
        );
        assert_eq!(stack.roll(), Ok(Number::Int(8)));
        assert_eq!(stack.dice()[0].display(), "[3, 1, 4, 6d]");

        let mut stack = roller(
            "2d6dh5",
            vec![Lexeme::dice("2d6"), Lexeme::modifier(TokenKind::DropHigh, "dh5", "5")],
            &[3, 1],
        );
        assert_eq!(stack.roll(), Ok(Number::Int(0)));
    }

    #[test]
    fn test_modifier_on_literal_is_a_notice() {
        let mut stack = roller(
            "5kh1",
            vec![Lexeme::dice("5"), Lexeme::modifier(TokenKind::KeepHigh, "kh1", "1")],
            &[1],
        );
        assert_eq!(stack.roll(), Ok(Number::Int(5)));
        assert_eq!(stack.notices(), &[RollError::ModifiersNotAllowed]);
        assert_eq!(stack.tooltip(), "5kh1\n5kh1");
    }

    #[test]
    fn test_conditions_on_literal_are_a_notice() {
        let lexeme =
            Lexeme::dice("5").with_conditions(vec![Condition::new(Comparison::Greater, 3)]);
        let mut stack = roller("5>3", vec![lexeme], &[1]);
        assert_eq!(stack.roll(), Ok(Number::Int(5)));
        assert_eq!(stack.notices(), &[RollError::ModifiersNotAllowed]);

        // Reported on every pass, not only when the pool is created.
        assert_eq!(stack.roll(), Ok(Number::Int(5)));
        assert_eq!(stack.notices(), &[RollError::ModifiersNotAllowed]);
    }

    #[test]
    fn test_success_counting_from_token() {
        let lexeme = Lexeme::dice("3d10").with_conditions(vec![
            Condition::new(Comparison::GreaterEqual, 8),
            Condition::negate(1),
        ]);
        let mut stack = roller("3d10>=8", vec![lexeme], &[1, 1, 1, 9, 1, 5]);
        assert_eq!(stack.roll(), Ok(Number::Int(0)));
        assert_eq!(stack.dice()[0].display(), "[1*, -1-, 5]");
        assert!(stack.notices().is_empty());
    }

    #[test]
    fn test_huge_faces_fall_back_to_float() {
        let mut stack = roller(
            "2d[9223372036854775807]!!",
            vec![
                Lexeme::dice("2d[9223372036854775807]"),
                Lexeme::modifier(TokenKind::ExplodeCombine, "!!", ""),
            ],
            &[Int::MAX],
        );
        assert_eq!(stack.roll(), Ok(Number::Float(2.0 * Int::MAX as Float)));
        assert_eq!(stack.dice()[0].group().slots()[0].value, Int::MAX);
    }

    #[test]
    fn test_modifier_before_any_pool() {
        let mut stack = roller(
            "kh1 5",
            vec![Lexeme::modifier(TokenKind::KeepHigh, "kh1", "1"), Lexeme::dice("5")],
            &[1],
        );
        assert_eq!(stack.roll(), Ok(Number::Int(5)));
        assert!(matches!(stack.notices(), [RollError::MalformedTokenSequence(_)]));
    }

    #[test]
    fn test_lone_operand() {
        let mut stack = roller("+5", vec![Lexeme::dice("5"), plus()], &[1]);
        assert_eq!(stack.roll(), Ok(Number::Int(5)));
        assert!(matches!(stack.notices(), [RollError::MalformedTokenSequence(_)]));
    }

    #[test]
    fn test_leftover_values_use_the_top() {
        let mut stack = roller("1 2", vec![Lexeme::dice("1"), Lexeme::dice("2")], &[1]);
        assert_eq!(stack.roll(), Ok(Number::Int(2)));
        assert_eq!(stack.notices().len(), 1);
    }

    #[test]
    fn test_unknown_operator() {
        let mut stack = roller(
            "1 % 2",
            vec![Lexeme::dice("1"), Lexeme::dice("2"), Lexeme::new(TokenKind::Math, "%", "%")],
            &[1],
        );
        assert_eq!(stack.roll(), Ok(Number::Int(2)));
        assert_eq!(stack.notices().len(), 2);
    }

    #[test]
    fn test_nothing_to_roll() {
        let mut stack = roller("", Vec::new(), &[1]);
        assert!(matches!(stack.roll(), Err(RollError::MalformedTokenSequence(_))));
        assert_eq!(stack.result(), None);
        assert_eq!(stack.display_text(&DisplayOptions::default()), None);
    }

    #[test]
    fn test_invalid_notation_aborts() {
        let mut stack = roller(
            "1 + 2x6",
            vec![Lexeme::dice("1"), Lexeme::dice("2x6"), plus()],
            &[1],
        );
        assert_eq!(
            stack.roll(),
            Err(RollError::InvalidDiceNotation("2x6".to_string()))
        );
        assert_eq!(stack.result(), None);
        assert_eq!(stack.dice().len(), 1);
    }

    #[test]
    fn test_reroll_reuses_pools() {
        let mut stack = roller("2d6", vec![Lexeme::dice("2d6")], &[2, 3, 4]);
        stack.roll().unwrap();
        stack.roll().unwrap();
        assert_eq!(stack.dice().len(), 1);
        assert_eq!(stack.roller.draws, 6);
    }

    #[test]
    fn test_division() {
        let div = Lexeme::operator(BinaryOperator::Div);
        let mut stack = roller(
            "7 / 2",
            vec![Lexeme::dice("7"), Lexeme::dice("2"), div.clone()],
            &[1],
        );
        assert_eq!(stack.roll(), Ok(Number::Float(3.5)));

        let mut stack = roller("1 / 0", vec![Lexeme::dice("1"), Lexeme::dice("0"), div], &[1]);
        assert_eq!(stack.roll(), Ok(Number::Float(Float::INFINITY)));
        assert_eq!(stack.display_text(&DisplayOptions::default()).unwrap(), "∞");
    }

    #[test]
    fn test_power_and_fractional_intermediate() {
        // (7 / 2) * 2 ^ 2
        let mut stack = roller(
            "7 / 2 * 2 ^ 2",
            vec![
                Lexeme::dice("7"),
                Lexeme::dice("2"),
                Lexeme::operator(BinaryOperator::Div),
                Lexeme::dice("2"),
                Lexeme::dice("2"),
                Lexeme::new(TokenKind::Pow, "^", ""),
                Lexeme::operator(BinaryOperator::Mul),
            ],
            &[1],
        );
        assert_eq!(stack.roll(), Ok(Number::Float(14.0)));
    }

    #[test]
    fn test_stunt_points() {
        let mut stack = roller("3d6", vec![Lexeme::stunt("3d6")], &[1, 2, 3, 4, 4, 2]);
        assert_eq!(stack.roll(), Ok(Number::Int(10)));
        assert_eq!(stack.stunt_annotation().as_deref(), Some(" - 4 Stunt Points"));
        assert_eq!(stack.tooltip(), "3d6\n[4S, 4, 2]");
        assert_eq!(
            stack.display_text(&DisplayOptions::default()).unwrap(),
            "10 - 4 Stunt Points"
        );
    }

    #[test]
    fn test_last_stunt_wins_and_clears() {
        let mut stack = roller(
            "3d6 + 3d6",
            vec![Lexeme::stunt("3d6"), Lexeme::stunt("3d6"), plus()],
            &[1, 2, 3, 1, 2, 3, 5, 5, 1, 2, 2, 6, 1, 2, 3, 4, 5, 6],
        );
        assert_eq!(stack.roll(), Ok(Number::Int(21)));
        assert_eq!(stack.stunt_annotation().as_deref(), Some(" - 2 Stunt Points"));
        assert_eq!(stack.tooltip(), "3d6 + 3d6\n[2S, 2, 6] + [5S, 5, 1]");

        assert_eq!(stack.roll(), Ok(Number::Int(21)));
        assert_eq!(stack.stunt_annotation(), None);
    }

    #[test]
    fn test_display_text_options() {
        let mut stack = roller(
            " 1000 + 234.5 ",
            vec![Lexeme::dice("1000"), Lexeme::dice("234.5"), plus()],
            &[1],
        );
        stack.roll().unwrap();
        let options = DisplayOptions {
            number_format: NumberFormat::german(),
            display_results_inline: true,
        };
        assert_eq!(stack.display_text(&options).unwrap(), "1000 + 234.5 -> 1.234,5");
        assert_eq!(stack.display_text(&DisplayOptions::default()).unwrap(), "1,234.5");
    }

    #[test]
    fn test_snapshot_round_trip_without_rolling() {
        let lexemes = vec![Lexeme::dice("2d20"), Lexeme::dice("5"), plus()];
        let mut stack = roller("2d20 + 5", lexemes.clone(), &[1, 1, 10, 15]);
        stack.roll().unwrap();
        let json = stack.to_result().to_json().unwrap();

        let mut restored = roller("2d20 + 5", lexemes, &[1]);
        restored.apply_result_json(&json).unwrap();
        assert_eq!(restored.result(), stack.result());
        assert_eq!(restored.tooltip(), stack.tooltip());
        assert_eq!(restored.roller.draws, 0);

        // A fresh roll replaces the restored tooltip.
        restored.roll().unwrap();
        assert_eq!(restored.tooltip(), "2d20 + 5\n[1, 1] + 5");
    }

    #[test]
    fn test_apply_ignores_other_snapshots() {
        let mut stack = roller("1d6", vec![Lexeme::dice("1d6")], &[1]);
        stack.apply_result_json(r#"{"type":"table","result":4}"#).unwrap();
        assert_eq!(stack.result(), None);

        stack.apply_result(&RollSnapshot::Dice {
            result: None,
            tooltip: String::new(),
        });
        assert_eq!(stack.result(), None);
        assert_eq!(stack.tooltip(), "1d6\n1d6");

        assert!(matches!(stack.apply_result_json("]"), Err(RollError::Json(_))));
    }
}
