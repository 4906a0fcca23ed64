use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;

use derive_more::Deref;
use serde::Serialize;

use crate::IndentConfig;
use crate::syntax::ArrowParams;
use crate::syntax::Delimited;
use crate::syntax::MemberProperty;
use crate::syntax::Node;
use crate::syntax::NodeKind;
use crate::tokens::TokenIndex;
use crate::tokens::Tokens;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstraintKind {
	/// The subject's indent is the anchor's resolved indent plus `units`.
	Relative,
	/// The subject's indent is `units`, measured from the region's root line.
	Absolute,
}

/// Tie-break tag for subjects with several constraints. The first `Normal`
/// constraint registered for a subject wins unless an `Override` exists, in
/// which case the first `Override` wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstraintPriority {
	Normal,
	Override,
}

/// "`subject`'s indent = `anchor`'s indent + `units` indent units."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OffsetConstraint {
	pub subject: TokenIndex,
	pub anchor: Option<TokenIndex>,
	pub units: u32,
	pub kind: ConstraintKind,
	pub priority: ConstraintPriority,
}

impl OffsetConstraint {
	pub fn relative(subject: TokenIndex, anchor: TokenIndex, units: u32) -> Self {
		Self {
			subject,
			anchor: Some(anchor),
			units,
			kind: ConstraintKind::Relative,
			priority: ConstraintPriority::Normal,
		}
	}

	pub fn absolute(subject: TokenIndex, units: u32) -> Self {
		Self {
			subject,
			anchor: None,
			units,
			kind: ConstraintKind::Absolute,
			priority: ConstraintPriority::Normal,
		}
	}

	#[must_use]
	pub fn overriding(mut self) -> Self {
		self.priority = ConstraintPriority::Override;
		self
	}
}

/// Constraints in registration order.
#[derive(Debug, Clone, Default, Deref)]
pub struct ConstraintSet(Vec<OffsetConstraint>);

impl ConstraintSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a constraint. A token anchored to itself carries no
	/// information and is dropped.
	pub fn push(&mut self, constraint: OffsetConstraint) {
		if constraint.anchor == Some(constraint.subject) {
			return;
		}

		self.0.push(constraint);
	}

	pub fn subjects(&self) -> HashSet<TokenIndex> {
		self.0.iter().map(|constraint| constraint.subject).collect()
	}
}

impl Extend<OffsetConstraint> for ConstraintSet {
	fn extend<T: IntoIterator<Item = OffsetConstraint>>(&mut self, iter: T) {
		for constraint in iter {
			self.push(constraint);
		}
	}
}

/// Build every constraint for one region in three passes:
///
/// 1. the node dispatch table, walked in pre-order so that enclosing nodes
///    register first;
/// 2. comment-only lines, aligned with the code that follows them;
/// 3. line leaders still unconstrained (transparent node kinds), given one
///    unit from the innermost enclosing node.
pub fn build(tokens: &Tokens, program: &Node, config: &IndentConfig) -> ConstraintSet {
	let mut set = ConstraintSet::new();

	let mut stack = vec![program];
	while let Some(node) = stack.pop() {
		set.extend(node_constraints(node, config));
		stack.extend(node.children().into_iter().rev());
	}

	set.extend(comment_constraints(tokens, config));
	set.extend(fallback_constraints(tokens, program, &set, config));

	set
}

/// The dispatch table: the constraints a single node places on its own
/// tokens. Node kinds without an arm are transparent.
pub fn node_constraints(node: &Node, config: &IndentConfig) -> Vec<OffsetConstraint> {
	let mut out = vec![];
	let first = node.first;

	match &node.kind {
		NodeKind::Program { body } => {
			out.extend(
				body.iter()
					.map(|statement| OffsetConstraint::absolute(statement.first, config.base_indent)),
			);
		}
		NodeKind::BlockStatement { body: list }
		| NodeKind::StaticBlock { body: list }
		| NodeKind::NamedSpecifiers { list }
		| NodeKind::ArrayExpression { elements: list }
		| NodeKind::ObjectExpression { properties: list }
		| NodeKind::ComputedKey { key: list }
		| NodeKind::ParenthesizedExpression { expression: list } => list_constraints(list, &mut out),
		NodeKind::VariableDeclaration {
			declarations,
			separators,
		} => {
			for declarator in declarations.iter().skip(1) {
				out.push(OffsetConstraint::relative(declarator.first, first, 1));
			}
			for &separator in separators {
				out.push(OffsetConstraint::relative(separator, first, 1));
			}
		}
		NodeKind::VariableDeclarator { init: value, .. }
		| NodeKind::Property { value, .. }
		| NodeKind::PropertyDefinition { value, .. } => {
			if let Some((operator, value)) = value {
				out.push(OffsetConstraint::relative(*operator, first, 1));
				out.push(OffsetConstraint::relative(value.first, first, 1));
			}
		}
		NodeKind::FunctionDeclaration { params, body }
		| NodeKind::FunctionExpression { params, body }
		| NodeKind::MethodDefinition { params, body, .. } => {
			out.push(OffsetConstraint::relative(params.open, first, 1));
			list_constraints(params, &mut out);
			out.push(OffsetConstraint::relative(body.first, first, 0));
		}
		NodeKind::ArrowFunctionExpression {
			params,
			arrow,
			body,
		} => {
			if let ArrowParams::Delimited(list) = params {
				list_constraints(list, &mut out);
			}
			out.push(OffsetConstraint::relative(*arrow, first, 1));
			out.push(body_constraint(body, first));
		}
		NodeKind::ClassDeclaration { extends, body }
		| NodeKind::ClassExpression { extends, body } => {
			if let Some((keyword, heritage)) = extends {
				out.push(OffsetConstraint::relative(*keyword, first, 1));
				out.push(OffsetConstraint::relative(heritage.first, first, 1));
			}
			out.push(OffsetConstraint::relative(body.open, first, 0));
			list_constraints(body, &mut out);
		}
		NodeKind::IfStatement {
			test,
			consequent,
			alternate,
		} => {
			out.push(OffsetConstraint::relative(test.open, first, 1));
			list_constraints(test, &mut out);
			out.push(body_constraint(consequent, first));
			if let Some((keyword, alternate)) = alternate {
				out.push(OffsetConstraint::relative(*keyword, first, 0));
				let units = u32::from(!matches!(
					alternate.kind,
					NodeKind::BlockStatement { .. } | NodeKind::IfStatement { .. }
				));
				out.push(OffsetConstraint::relative(alternate.first, *keyword, units));
			}
		}
		NodeKind::ForStatement { head, body }
		| NodeKind::ForInStatement { head, body }
		| NodeKind::ForOfStatement { head, body }
		| NodeKind::WhileStatement { test: head, body } => {
			out.push(OffsetConstraint::relative(head.open, first, 1));
			list_constraints(head, &mut out);
			out.push(body_constraint(body, first));
		}
		NodeKind::DoWhileStatement {
			body,
			while_keyword,
			test,
		} => {
			out.push(body_constraint(body, first));
			out.push(OffsetConstraint::relative(*while_keyword, first, 0));
			list_constraints(test, &mut out);
		}
		NodeKind::SwitchStatement {
			discriminant,
			cases,
		} => {
			out.push(OffsetConstraint::relative(discriminant.open, first, 1));
			list_constraints(discriminant, &mut out);
			out.push(OffsetConstraint::relative(cases.open, first, 0));
			for case in &cases.items {
				out.push(OffsetConstraint::relative(
					case.first,
					cases.open,
					config.switch_case,
				));
			}
			out.push(OffsetConstraint::relative(cases.close, cases.open, 0).overriding());
		}
		NodeKind::SwitchCase {
			test,
			colon,
			consequent,
		} => {
			if let Some(test) = test {
				out.push(OffsetConstraint::relative(test.first, first, 1));
			}
			out.push(OffsetConstraint::relative(*colon, first, 1));
			for statement in consequent {
				out.push(OffsetConstraint::relative(statement.first, first, 1));
			}
		}
		NodeKind::TryStatement {
			block,
			handler,
			finalizer,
		} => {
			out.push(OffsetConstraint::relative(block.first, first, 0));
			if let Some(handler) = handler {
				out.push(OffsetConstraint::relative(handler.first, first, 0));
			}
			if let Some((keyword, block)) = finalizer {
				out.push(OffsetConstraint::relative(*keyword, first, 0));
				out.push(OffsetConstraint::relative(block.first, *keyword, 0));
			}
		}
		NodeKind::CatchClause { param, body } => {
			if let Some(param) = param {
				out.push(OffsetConstraint::relative(param.open, first, 1));
				list_constraints(param, &mut out);
			}
			out.push(OffsetConstraint::relative(body.first, first, 0));
		}
		NodeKind::ImportDeclaration {
			specifiers,
			from,
			source,
		} => {
			for specifier in specifiers {
				out.push(OffsetConstraint::relative(specifier.first, first, 1));
			}
			if let Some(from) = from {
				out.push(OffsetConstraint::relative(*from, first, 1));
			}
			out.push(OffsetConstraint::relative(source.first, first, 1));
		}
		NodeKind::ExportNamedDeclaration {
			specifiers, source, ..
		} => {
			if let Some(specifiers) = specifiers {
				list_constraints(specifiers, &mut out);
			}
			if let Some((from, source)) = source {
				out.push(OffsetConstraint::relative(*from, first, 1));
				out.push(OffsetConstraint::relative(source.first, first, 1));
			}
		}
		NodeKind::ExportAllDeclaration { from, source } => {
			out.push(OffsetConstraint::relative(*from, first, 1));
			out.push(OffsetConstraint::relative(source.first, first, 1));
		}
		NodeKind::CallExpression { arguments, .. } => {
			out.push(OffsetConstraint::relative(arguments.open, first, 1));
			list_constraints(arguments, &mut out);
		}
		NodeKind::NewExpression { callee, arguments } => {
			out.push(OffsetConstraint::relative(callee.first, first, 1));
			if let Some(arguments) = arguments {
				out.push(OffsetConstraint::relative(arguments.open, first, 1));
				list_constraints(arguments, &mut out);
			}
		}
		NodeKind::MemberExpression { dot, property, .. } => {
			if let Some(dot) = dot {
				out.push(OffsetConstraint::relative(*dot, first, 1));
			}
			match property {
				MemberProperty::Named(name) => {
					out.push(OffsetConstraint::relative(*name, first, 1));
				}
				MemberProperty::Computed(list) => {
					out.push(OffsetConstraint::relative(list.open, first, 1));
					list_constraints(list, &mut out);
				}
			}
		}
		NodeKind::TaggedTemplateExpression { quasi, .. } => {
			out.push(OffsetConstraint::relative(quasi.first, first, 1));
		}
		NodeKind::BinaryExpression {
			operator, right, ..
		}
		| NodeKind::LogicalExpression {
			operator, right, ..
		}
		| NodeKind::AssignmentExpression {
			operator, right, ..
		} => {
			out.push(OffsetConstraint::relative(*operator, first, 1));
			out.push(OffsetConstraint::relative(right.first, first, 1));
		}
		NodeKind::ConditionalExpression {
			question,
			consequent,
			colon,
			alternate,
			..
		} => {
			out.push(OffsetConstraint::relative(*question, first, 1));
			out.push(OffsetConstraint::relative(consequent.first, first, 1));
			out.push(OffsetConstraint::relative(*colon, first, 1));
			out.push(OffsetConstraint::relative(alternate.first, first, 1));
		}
		NodeKind::EmptyStatement
		| NodeKind::ExpressionStatement { .. }
		| NodeKind::ReturnStatement { .. }
		| NodeKind::ThrowStatement { .. }
		| NodeKind::BreakStatement
		| NodeKind::ContinueStatement
		| NodeKind::LabeledStatement { .. }
		| NodeKind::ExportDefaultDeclaration { .. }
		| NodeKind::ImportSpecifier
		| NodeKind::ExportSpecifier
		| NodeKind::Identifier
		| NodeKind::Literal
		| NodeKind::TemplateLiteral
		| NodeKind::UnaryExpression { .. }
		| NodeKind::UpdateExpression { .. }
		| NodeKind::AwaitExpression { .. }
		| NodeKind::YieldExpression { .. }
		| NodeKind::SpreadElement { .. }
		| NodeKind::SequenceExpression { .. } => {}
	}

	out.retain(|constraint| constraint.anchor != Some(constraint.subject));
	out
}

/// Items and separators one unit inside the opening bracket; the closing
/// bracket aligned with it.
fn list_constraints(list: &Delimited, out: &mut Vec<OffsetConstraint>) {
	for item in &list.items {
		out.push(OffsetConstraint::relative(item.first, list.open, 1));
	}
	for &separator in &list.separators {
		out.push(OffsetConstraint::relative(separator, list.open, 1));
	}
	out.push(OffsetConstraint::relative(list.close, list.open, 0).overriding());
}

/// A block body stays on its owner's level; any other statement body is
/// indented one unit.
fn body_constraint(body: &Node, owner: TokenIndex) -> OffsetConstraint {
	let units = u32::from(!matches!(body.kind, NodeKind::BlockStatement { .. }));
	OffsetConstraint::relative(body.first, owner, units)
}

/// Comment-only lines line up with the next code token. Before a closing
/// bracket they sit one unit inside it instead, and after the last code token
/// they fall back to the region's base indent.
pub fn comment_constraints(tokens: &Tokens, config: &IndentConfig) -> Vec<OffsetConstraint> {
	tokens
		.leaders()
		.filter(|&(_, leader)| tokens[leader].kind.is_comment())
		.map(|(_, leader)| {
			match tokens.next_code(leader) {
				Some(next) if tokens[next].is_closing_bracket() => {
					match tokens.partner(next) {
						Some(open) => OffsetConstraint::relative(leader, open, 1),
						None => OffsetConstraint::relative(leader, next, 0),
					}
				}
				Some(next) => OffsetConstraint::relative(leader, next, 0),
				None => OffsetConstraint::absolute(leader, config.base_indent),
			}
		})
		.collect()
}

/// One unit from the innermost enclosing node for every line leader the
/// dispatch table left unconstrained.
fn fallback_constraints(
	tokens: &Tokens,
	program: &Node,
	set: &ConstraintSet,
	config: &IndentConfig,
) -> Vec<OffsetConstraint> {
	let constrained = set.subjects();
	let leaders: BTreeSet<TokenIndex> = tokens
		.leaders()
		.map(|(_, leader)| leader)
		.filter(|leader| !constrained.contains(leader))
		.collect();

	if leaders.is_empty() {
		return vec![];
	}

	// Pre-order, so inner nodes overwrite their ancestors.
	let mut enclosing: HashMap<TokenIndex, TokenIndex> = HashMap::new();
	let mut stack: Vec<&Node> = program.children().into_iter().rev().collect();
	while let Some(node) = stack.pop() {
		if node.first < node.last {
			for &leader in leaders.range((node.first + 1)..=node.last) {
				enclosing.insert(leader, node.first);
			}
		}
		stack.extend(node.children().into_iter().rev());
	}

	leaders
		.into_iter()
		.map(|leader| {
			match enclosing.get(&leader) {
				Some(&anchor) => OffsetConstraint::relative(leader, anchor, 1),
				None => OffsetConstraint::absolute(leader, config.base_indent),
			}
		})
		.collect()
}
