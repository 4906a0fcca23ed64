use std::collections::BTreeMap;

use serde::Serialize;

use crate::selector::Selector;
use crate::syntax::Node;
use crate::tokens::TokenKind;
use crate::tokens::Tokens;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SuppressionReason {
	/// Inside a multi-line template literal or block comment.
	LiteralSpan,
	/// Inside a string continued with a backslash at the end of a line.
	Continuation,
	/// Inside a node matched by an `ignores` selector.
	UserIgnore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuppressionMark {
	pub line: usize,
	pub reason: SuppressionReason,
}

/// Lines exempt from comparison. A line keeps the first reason it was marked
/// with.
#[derive(Debug, Clone, Default)]
pub struct Suppressions {
	lines: BTreeMap<usize, SuppressionReason>,
}

impl Suppressions {
	fn mark(&mut self, line: usize, reason: SuppressionReason) {
		self.lines.entry(line).or_insert(reason);
	}

	pub fn is_suppressed(&self, line: usize) -> bool {
		self.lines.contains_key(&line)
	}

	pub fn reason(&self, line: usize) -> Option<SuppressionReason> {
		self.lines.get(&line).copied()
	}

	pub fn marks(&self) -> Vec<SuppressionMark> {
		self.lines
			.iter()
			.map(|(&line, &reason)| SuppressionMark { line, reason })
			.collect()
	}

	pub fn len(&self) -> usize {
		self.lines.len()
	}

	pub fn is_empty(&self) -> bool {
		self.lines.is_empty()
	}
}

/// Mark the lines of one region that must not be compared.
pub fn suppress(tokens: &Tokens, program: &Node, selectors: &[Selector]) -> Suppressions {
	let mut suppressions = Suppressions::default();

	for (line, spilling) in tokens.continued_lines() {
		let reason = match tokens[spilling].kind {
			TokenKind::String => SuppressionReason::Continuation,
			_ => SuppressionReason::LiteralSpan,
		};
		suppressions.mark(line, reason);
	}

	if selectors.iter().any(Selector::is_catch_all) {
		for (line, _) in tokens.leaders() {
			suppressions.mark(line, SuppressionReason::UserIgnore);
		}
		return suppressions;
	}

	if selectors.is_empty() {
		return suppressions;
	}

	let mut matched = vec![];
	let mut ancestors = vec![];
	collect_matches(program, &mut ancestors, selectors, &mut matched);

	for (line, leader) in tokens.leaders() {
		if matched.iter().any(|node| node.contains(leader)) {
			suppressions.mark(line, SuppressionReason::UserIgnore);
		}
	}

	suppressions
}

fn collect_matches<'n>(
	node: &'n Node,
	ancestors: &mut Vec<&'n Node>,
	selectors: &[Selector],
	matched: &mut Vec<&'n Node>,
) {
	if selectors
		.iter()
		.any(|selector| selector.matches(node, ancestors))
	{
		matched.push(node);
	}

	ancestors.push(node);
	for child in node.children() {
		collect_matches(child, ancestors, selectors, matched);
	}
	ancestors.pop();
}
