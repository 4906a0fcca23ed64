use std::collections::HashMap;

use serde::Serialize;

use crate::ScriptdentError;
use crate::ScriptdentResult;
use crate::constraints::ConstraintKind;
use crate::constraints::ConstraintPriority;
use crate::constraints::ConstraintSet;
use crate::constraints::OffsetConstraint;
use crate::tokens::TokenIndex;
use crate::tokens::Tokens;

/// The indentation a physical line must have, in indent units above the
/// region's root line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedIndent {
	pub line: usize,
	pub expected_units: u32,
	/// A second accepted indentation for comment-only lines: the level of the
	/// code above them. Fixes always use `expected_units`.
	pub alternative_units: Option<u32>,
}

/// Pick the constraint that decides each subject: the earliest `Normal`
/// constraint, replaced by the earliest `Override` when one exists.
pub fn winning_constraints(constraints: &ConstraintSet) -> HashMap<TokenIndex, OffsetConstraint> {
	let mut winners: HashMap<TokenIndex, OffsetConstraint> = HashMap::new();

	for constraint in constraints.iter() {
		match winners.get(&constraint.subject) {
			None => {
				winners.insert(constraint.subject, *constraint);
			}
			Some(existing)
				if existing.priority == ConstraintPriority::Normal
					&& constraint.priority == ConstraintPriority::Override =>
			{
				winners.insert(constraint.subject, *constraint);
			}
			Some(_) => {}
		}
	}

	winners
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
	/// On the evaluation stack, waiting for its anchor.
	Visiting,
	Done(u32),
}

/// Resolve the expected indent of every line that has a leader token.
///
/// Each leader is evaluated once: the memo is keyed by token index and
/// anchors are chased with an explicit stack, so deeply nested input neither
/// recurses nor re-evaluates shared anchors.
pub fn resolve(tokens: &Tokens, constraints: &ConstraintSet) -> ScriptdentResult<Vec<ResolvedIndent>> {
	let winners = winning_constraints(constraints);
	let mut memo: HashMap<TokenIndex, Visit> = HashMap::new();
	let mut resolved = vec![];

	for (line, leader) in tokens.leaders() {
		let expected_units = evaluate(tokens, &winners, &mut memo, leader)?;
		resolved.push(ResolvedIndent {
			line,
			expected_units,
			alternative_units: None,
		});
	}

	for indent in &mut resolved {
		let Some(leader) = tokens.leader_of_line(indent.line) else {
			continue;
		};
		if !tokens[leader].kind.is_comment() {
			continue;
		}

		indent.alternative_units = trailing_units(tokens, &memo, leader)
			.filter(|&units| units != indent.expected_units);
	}

	Ok(resolved)
}

/// The level a comment-only line continues from the code above it: the
/// indent of the previous code line, one unit deeper after an opening bracket
/// or a `case` clause's `:`.
fn trailing_units(
	tokens: &Tokens,
	memo: &HashMap<TokenIndex, Visit>,
	comment: TokenIndex,
) -> Option<u32> {
	let previous = tokens.previous_code(comment)?;
	let Some(Visit::Done(units)) = memo.get(&tokens.effective_leader(previous)) else {
		return None;
	};
	let opens = matches!(tokens[previous].text.as_str(), "{" | "(" | "[" | ":");

	Some(units + u32::from(opens))
}

fn evaluate(
	tokens: &Tokens,
	winners: &HashMap<TokenIndex, OffsetConstraint>,
	memo: &mut HashMap<TokenIndex, Visit>,
	leader: TokenIndex,
) -> ScriptdentResult<u32> {
	let line_of = |index: TokenIndex| tokens.get(index).map_or(0, |token| token.start_line());
	let mut stack = vec![leader];

	while let Some(&current) = stack.last() {
		if let Some(Visit::Done(_)) = memo.get(&current) {
			stack.pop();
			continue;
		}

		let constraint = winners.get(&current).ok_or(ScriptdentError::UnanchoredLine {
			line: line_of(current),
		})?;

		let anchor = match (constraint.kind, constraint.anchor) {
			(ConstraintKind::Absolute, _) => {
				memo.insert(current, Visit::Done(constraint.units));
				stack.pop();
				continue;
			}
			(ConstraintKind::Relative, Some(anchor)) => tokens.effective_leader(anchor),
			(ConstraintKind::Relative, None) => {
				return Err(ScriptdentError::UnanchoredLine {
					line: line_of(current),
				});
			}
		};

		match memo.get(&anchor) {
			Some(Visit::Done(base)) => {
				memo.insert(current, Visit::Done(base.saturating_add(constraint.units)));
				stack.pop();
			}
			Some(Visit::Visiting) => {
				return Err(ScriptdentError::ConstraintCycle {
					line: line_of(current),
				});
			}
			None => {
				memo.insert(current, Visit::Visiting);
				stack.push(anchor);
			}
		}
	}

	match memo.get(&leader) {
		Some(Visit::Done(units)) => Ok(*units),
		_ => {
			Err(ScriptdentError::UnanchoredLine {
				line: line_of(leader),
			})
		}
	}
}
