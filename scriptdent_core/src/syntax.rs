use crate::tokens::TokenIndex;

/// A node of the embedded script's syntax tree. Nodes only refer to tokens by
/// index; `first` and `last` are the inclusive token bounds of the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
	pub kind: NodeKind,
	pub first: TokenIndex,
	pub last: TokenIndex,
}

/// A bracketed, separated list: call arguments, parameters, array and object
/// literals, block and class bodies, specifier lists and `for` heads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimited {
	pub open: TokenIndex,
	pub items: Vec<Node>,
	/// Commas (or `;` in a `for` head, `in`/`of` in a `for…in`/`for…of`
	/// head) between the items.
	pub separators: Vec<TokenIndex>,
	pub close: TokenIndex,
}

/// The parameters of an arrow function: either `(a, b)` or a bare `a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrowParams {
	Delimited(Delimited),
	Single(Box<Node>),
}

/// Node kinds, named after their ESTree counterparts so that ignore
/// selectors read the same as in other JavaScript tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	Program {
		body: Vec<Node>,
	},
	EmptyStatement,
	BlockStatement {
		body: Delimited,
	},
	ExpressionStatement {
		expression: Box<Node>,
	},
	VariableDeclaration {
		declarations: Vec<Node>,
		separators: Vec<TokenIndex>,
	},
	VariableDeclarator {
		id: Box<Node>,
		init: Option<(TokenIndex, Box<Node>)>,
	},
	FunctionDeclaration {
		params: Delimited,
		body: Box<Node>,
	},
	ClassDeclaration {
		extends: Option<(TokenIndex, Box<Node>)>,
		body: Delimited,
	},
	IfStatement {
		test: Delimited,
		consequent: Box<Node>,
		alternate: Option<(TokenIndex, Box<Node>)>,
	},
	ForStatement {
		head: Delimited,
		body: Box<Node>,
	},
	ForInStatement {
		head: Delimited,
		body: Box<Node>,
	},
	ForOfStatement {
		head: Delimited,
		body: Box<Node>,
	},
	WhileStatement {
		test: Delimited,
		body: Box<Node>,
	},
	DoWhileStatement {
		body: Box<Node>,
		while_keyword: TokenIndex,
		test: Delimited,
	},
	SwitchStatement {
		discriminant: Delimited,
		cases: Delimited,
	},
	SwitchCase {
		test: Option<Box<Node>>,
		colon: TokenIndex,
		consequent: Vec<Node>,
	},
	TryStatement {
		block: Box<Node>,
		handler: Option<Box<Node>>,
		finalizer: Option<(TokenIndex, Box<Node>)>,
	},
	CatchClause {
		param: Option<Delimited>,
		body: Box<Node>,
	},
	ReturnStatement {
		argument: Option<Box<Node>>,
	},
	ThrowStatement {
		argument: Box<Node>,
	},
	BreakStatement,
	ContinueStatement,
	LabeledStatement {
		body: Box<Node>,
	},
	ImportDeclaration {
		specifiers: Vec<Node>,
		/// The `from` keyword, absent for `import "./side-effect.js"`.
		from: Option<TokenIndex>,
		source: Box<Node>,
	},
	ExportNamedDeclaration {
		declaration: Option<Box<Node>>,
		specifiers: Option<Delimited>,
		source: Option<(TokenIndex, Box<Node>)>,
	},
	ExportDefaultDeclaration {
		declaration: Box<Node>,
	},
	ExportAllDeclaration {
		from: TokenIndex,
		source: Box<Node>,
	},
	/// `{ a, b as c }` inside an import.
	NamedSpecifiers {
		list: Delimited,
	},
	ImportSpecifier,
	ExportSpecifier,
	Identifier,
	Literal,
	TemplateLiteral,
	ArrayExpression {
		elements: Delimited,
	},
	ObjectExpression {
		properties: Delimited,
	},
	Property {
		key: Box<Node>,
		value: Option<(TokenIndex, Box<Node>)>,
	},
	FunctionExpression {
		params: Delimited,
		body: Box<Node>,
	},
	ArrowFunctionExpression {
		params: ArrowParams,
		arrow: TokenIndex,
		body: Box<Node>,
	},
	ClassExpression {
		extends: Option<(TokenIndex, Box<Node>)>,
		body: Delimited,
	},
	MethodDefinition {
		key: Box<Node>,
		params: Delimited,
		body: Box<Node>,
	},
	PropertyDefinition {
		key: Box<Node>,
		value: Option<(TokenIndex, Box<Node>)>,
	},
	StaticBlock {
		body: Delimited,
	},
	ComputedKey {
		key: Delimited,
	},
	CallExpression {
		callee: Box<Node>,
		arguments: Delimited,
	},
	NewExpression {
		callee: Box<Node>,
		arguments: Option<Delimited>,
	},
	MemberExpression {
		object: Box<Node>,
		/// The `.` or `?.` token, absent for `a[b]`.
		dot: Option<TokenIndex>,
		property: MemberProperty,
	},
	TaggedTemplateExpression {
		tag: Box<Node>,
		quasi: Box<Node>,
	},
	ParenthesizedExpression {
		expression: Delimited,
	},
	UnaryExpression {
		argument: Box<Node>,
	},
	UpdateExpression {
		argument: Box<Node>,
	},
	AwaitExpression {
		argument: Box<Node>,
	},
	YieldExpression {
		argument: Option<Box<Node>>,
	},
	SpreadElement {
		argument: Box<Node>,
	},
	BinaryExpression {
		left: Box<Node>,
		operator: TokenIndex,
		right: Box<Node>,
	},
	LogicalExpression {
		left: Box<Node>,
		operator: TokenIndex,
		right: Box<Node>,
	},
	AssignmentExpression {
		left: Box<Node>,
		operator: TokenIndex,
		right: Box<Node>,
	},
	ConditionalExpression {
		test: Box<Node>,
		question: TokenIndex,
		consequent: Box<Node>,
		colon: TokenIndex,
		alternate: Box<Node>,
	},
	SequenceExpression {
		expressions: Vec<Node>,
	},
}

/// The property side of a member access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberProperty {
	/// `a.b`, `a?.b`, `a.#b`
	Named(TokenIndex),
	/// `a[b]`, `a?.[b]`
	Computed(Delimited),
}

/// Every node kind name accepted by ignore selectors.
pub const NODE_KIND_NAMES: &[&str] = &[
	"Program",
	"EmptyStatement",
	"BlockStatement",
	"ExpressionStatement",
	"VariableDeclaration",
	"VariableDeclarator",
	"FunctionDeclaration",
	"ClassDeclaration",
	"IfStatement",
	"ForStatement",
	"ForInStatement",
	"ForOfStatement",
	"WhileStatement",
	"DoWhileStatement",
	"SwitchStatement",
	"SwitchCase",
	"TryStatement",
	"CatchClause",
	"ReturnStatement",
	"ThrowStatement",
	"BreakStatement",
	"ContinueStatement",
	"LabeledStatement",
	"ImportDeclaration",
	"ExportNamedDeclaration",
	"ExportDefaultDeclaration",
	"ExportAllDeclaration",
	"NamedSpecifiers",
	"ImportSpecifier",
	"ExportSpecifier",
	"Identifier",
	"Literal",
	"TemplateLiteral",
	"ArrayExpression",
	"ObjectExpression",
	"Property",
	"FunctionExpression",
	"ArrowFunctionExpression",
	"ClassExpression",
	"MethodDefinition",
	"PropertyDefinition",
	"StaticBlock",
	"ComputedKey",
	"CallExpression",
	"NewExpression",
	"MemberExpression",
	"TaggedTemplateExpression",
	"ParenthesizedExpression",
	"UnaryExpression",
	"UpdateExpression",
	"AwaitExpression",
	"YieldExpression",
	"SpreadElement",
	"BinaryExpression",
	"LogicalExpression",
	"AssignmentExpression",
	"ConditionalExpression",
	"SequenceExpression",
];

impl Node {
	pub fn new(kind: NodeKind, first: TokenIndex, last: TokenIndex) -> Self {
		Self { kind, first, last }
	}

	/// Whether `index` falls inside this node's token bounds.
	pub fn contains(&self, index: TokenIndex) -> bool {
		(self.first..=self.last).contains(&index)
	}

	pub fn kind_name(&self) -> &'static str {
		match &self.kind {
			NodeKind::Program { .. } => "Program",
			NodeKind::EmptyStatement => "EmptyStatement",
			NodeKind::BlockStatement { .. } => "BlockStatement",
			NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
			NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
			NodeKind::VariableDeclarator { .. } => "VariableDeclarator",
			NodeKind::FunctionDeclaration { .. } => "FunctionDeclaration",
			NodeKind::ClassDeclaration { .. } => "ClassDeclaration",
			NodeKind::IfStatement { .. } => "IfStatement",
			NodeKind::ForStatement { .. } => "ForStatement",
			NodeKind::ForInStatement { .. } => "ForInStatement",
			NodeKind::ForOfStatement { .. } => "ForOfStatement",
			NodeKind::WhileStatement { .. } => "WhileStatement",
			NodeKind::DoWhileStatement { .. } => "DoWhileStatement",
			NodeKind::SwitchStatement { .. } => "SwitchStatement",
			NodeKind::SwitchCase { .. } => "SwitchCase",
			NodeKind::TryStatement { .. } => "TryStatement",
			NodeKind::CatchClause { .. } => "CatchClause",
			NodeKind::ReturnStatement { .. } => "ReturnStatement",
			NodeKind::ThrowStatement { .. } => "ThrowStatement",
			NodeKind::BreakStatement => "BreakStatement",
			NodeKind::ContinueStatement => "ContinueStatement",
			NodeKind::LabeledStatement { .. } => "LabeledStatement",
			NodeKind::ImportDeclaration { .. } => "ImportDeclaration",
			NodeKind::ExportNamedDeclaration { .. } => "ExportNamedDeclaration",
			NodeKind::ExportDefaultDeclaration { .. } => "ExportDefaultDeclaration",
			NodeKind::ExportAllDeclaration { .. } => "ExportAllDeclaration",
			NodeKind::NamedSpecifiers { .. } => "NamedSpecifiers",
			NodeKind::ImportSpecifier => "ImportSpecifier",
			NodeKind::ExportSpecifier => "ExportSpecifier",
			NodeKind::Identifier => "Identifier",
			NodeKind::Literal => "Literal",
			NodeKind::TemplateLiteral => "TemplateLiteral",
			NodeKind::ArrayExpression { .. } => "ArrayExpression",
			NodeKind::ObjectExpression { .. } => "ObjectExpression",
			NodeKind::Property { .. } => "Property",
			NodeKind::FunctionExpression { .. } => "FunctionExpression",
			NodeKind::ArrowFunctionExpression { .. } => "ArrowFunctionExpression",
			NodeKind::ClassExpression { .. } => "ClassExpression",
			NodeKind::MethodDefinition { .. } => "MethodDefinition",
			NodeKind::PropertyDefinition { .. } => "PropertyDefinition",
			NodeKind::StaticBlock { .. } => "StaticBlock",
			NodeKind::ComputedKey { .. } => "ComputedKey",
			NodeKind::CallExpression { .. } => "CallExpression",
			NodeKind::NewExpression { .. } => "NewExpression",
			NodeKind::MemberExpression { .. } => "MemberExpression",
			NodeKind::TaggedTemplateExpression { .. } => "TaggedTemplateExpression",
			NodeKind::ParenthesizedExpression { .. } => "ParenthesizedExpression",
			NodeKind::UnaryExpression { .. } => "UnaryExpression",
			NodeKind::UpdateExpression { .. } => "UpdateExpression",
			NodeKind::AwaitExpression { .. } => "AwaitExpression",
			NodeKind::YieldExpression { .. } => "YieldExpression",
			NodeKind::SpreadElement { .. } => "SpreadElement",
			NodeKind::BinaryExpression { .. } => "BinaryExpression",
			NodeKind::LogicalExpression { .. } => "LogicalExpression",
			NodeKind::AssignmentExpression { .. } => "AssignmentExpression",
			NodeKind::ConditionalExpression { .. } => "ConditionalExpression",
			NodeKind::SequenceExpression { .. } => "SequenceExpression",
		}
	}

	/// Direct child nodes in source order.
	pub fn children(&self) -> Vec<&Node> {
		let mut children = vec![];
		match &self.kind {
			NodeKind::Program { body } => children.extend(body),
			NodeKind::SwitchCase {
				test, consequent, ..
			} => {
				children.extend(test.as_deref());
				children.extend(consequent);
			}
			NodeKind::SequenceExpression { expressions } => children.extend(expressions),
			NodeKind::VariableDeclaration { declarations, .. } => children.extend(declarations),
			NodeKind::ImportDeclaration {
				specifiers, source, ..
			} => {
				children.extend(specifiers);
				children.push(source);
			}
			NodeKind::BlockStatement { body: list }
			| NodeKind::StaticBlock { body: list }
			| NodeKind::NamedSpecifiers { list }
			| NodeKind::ArrayExpression { elements: list }
			| NodeKind::ObjectExpression { properties: list }
			| NodeKind::ComputedKey { key: list }
			| NodeKind::ParenthesizedExpression { expression: list } => children.extend(&list.items),
			NodeKind::ExpressionStatement { expression: node }
			| NodeKind::ThrowStatement { argument: node }
			| NodeKind::LabeledStatement { body: node }
			| NodeKind::ExportDefaultDeclaration { declaration: node }
			| NodeKind::UnaryExpression { argument: node }
			| NodeKind::UpdateExpression { argument: node }
			| NodeKind::AwaitExpression { argument: node }
			| NodeKind::SpreadElement { argument: node } => children.push(node),
			NodeKind::ReturnStatement { argument }
			| NodeKind::YieldExpression { argument } => children.extend(argument.as_deref()),
			NodeKind::VariableDeclarator { id: key, init: value }
			| NodeKind::Property { key, value }
			| NodeKind::PropertyDefinition { key, value } => {
				children.push(key);
				push_pair(&mut children, value.as_ref());
			}
			NodeKind::FunctionDeclaration { params, body }
			| NodeKind::FunctionExpression { params, body } => {
				children.extend(&params.items);
				children.push(body);
			}
			NodeKind::MethodDefinition { key, params, body } => {
				children.push(key);
				children.extend(&params.items);
				children.push(body);
			}
			NodeKind::ArrowFunctionExpression { params, body, .. } => {
				match params {
					ArrowParams::Delimited(list) => children.extend(&list.items),
					ArrowParams::Single(param) => children.push(param),
				}
				children.push(body);
			}
			NodeKind::ClassDeclaration { extends, body }
			| NodeKind::ClassExpression { extends, body } => {
				push_pair(&mut children, extends.as_ref());
				children.extend(&body.items);
			}
			NodeKind::IfStatement {
				test,
				consequent,
				alternate,
			} => {
				children.extend(&test.items);
				children.push(consequent);
				push_pair(&mut children, alternate.as_ref());
			}
			NodeKind::ForStatement { head, body }
			| NodeKind::ForInStatement { head, body }
			| NodeKind::ForOfStatement { head, body }
			| NodeKind::WhileStatement { test: head, body } => {
				children.extend(&head.items);
				children.push(body);
			}
			NodeKind::DoWhileStatement { body, test, .. } => {
				children.push(body);
				children.extend(&test.items);
			}
			NodeKind::SwitchStatement {
				discriminant,
				cases,
			} => {
				children.extend(&discriminant.items);
				children.extend(&cases.items);
			}
			NodeKind::TryStatement {
				block,
				handler,
				finalizer,
			} => {
				children.push(block);
				children.extend(handler.as_deref());
				push_pair(&mut children, finalizer.as_ref());
			}
			NodeKind::CatchClause { param, body } => {
				if let Some(param) = param {
					children.extend(&param.items);
				}
				children.push(body);
			}
			NodeKind::ExportNamedDeclaration {
				declaration,
				specifiers,
				source,
			} => {
				children.extend(declaration.as_deref());
				if let Some(specifiers) = specifiers {
					children.extend(&specifiers.items);
				}
				push_pair(&mut children, source.as_ref());
			}
			NodeKind::ExportAllDeclaration { source, .. } => children.push(source),
			NodeKind::CallExpression { callee, arguments } => {
				children.push(callee);
				children.extend(&arguments.items);
			}
			NodeKind::NewExpression { callee, arguments } => {
				children.push(callee);
				if let Some(arguments) = arguments {
					children.extend(&arguments.items);
				}
			}
			NodeKind::MemberExpression {
				object, property, ..
			} => {
				children.push(object);
				if let MemberProperty::Computed(list) = property {
					children.extend(&list.items);
				}
			}
			NodeKind::TaggedTemplateExpression { tag, quasi } => {
				children.push(tag);
				children.push(quasi);
			}
			NodeKind::BinaryExpression { left, right, .. }
			| NodeKind::LogicalExpression { left, right, .. }
			| NodeKind::AssignmentExpression { left, right, .. } => {
				children.push(left);
				children.push(right);
			}
			NodeKind::ConditionalExpression {
				test,
				consequent,
				alternate,
				..
			} => {
				children.push(test);
				children.push(consequent);
				children.push(alternate);
			}
			NodeKind::EmptyStatement
			| NodeKind::BreakStatement
			| NodeKind::ContinueStatement
			| NodeKind::ImportSpecifier
			| NodeKind::ExportSpecifier
			| NodeKind::Identifier
			| NodeKind::Literal
			| NodeKind::TemplateLiteral => {}
		}

		children
	}
}

fn push_pair<'a>(children: &mut Vec<&'a Node>, pair: Option<&'a (TokenIndex, Box<Node>)>) {
	if let Some((_, node)) = pair {
		children.push(node);
	}
}
