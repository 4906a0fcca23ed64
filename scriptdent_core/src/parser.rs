use crate::Point;
use crate::ScriptdentError;
use crate::ScriptdentResult;
use crate::syntax::ArrowParams;
use crate::syntax::Delimited;
use crate::syntax::MemberProperty;
use crate::syntax::Node;
use crate::syntax::NodeKind;
use crate::tokens::Token;
use crate::tokens::TokenIndex;
use crate::tokens::TokenKind;
use crate::tokens::Tokens;

const ASSIGNMENT_OPERATORS: [&str; 16] = [
	"=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=", "||=",
	"??=",
];

const UNARY_OPERATORS: [&str; 7] = ["!", "~", "+", "-", "typeof", "void", "delete"];

/// Nested statements and expressions deeper than this fail the region.
const MAX_NESTING: usize = 96;

/// Words that may prefix a class member or object method key.
const MEMBER_MODIFIERS: [&str; 5] = ["static", "async", "get", "set", "accessor"];

/// Parse the classified tokens of one region into a `Program` node. Comments
/// are skipped; they are attached to lines later by the constraint builder.
pub fn parse(tokens: &Tokens) -> ScriptdentResult<Node> {
	let mut parser = Parser::new(tokens);
	let mut body = vec![];

	while parser.current().is_some() {
		body.push(parser.parse_statement()?);
	}

	Ok(Node::new(
		NodeKind::Program { body },
		0,
		tokens.len().saturating_sub(1),
	))
}

/// Recursive descent parser over the code tokens of a region, with automatic
/// semicolon insertion at line breaks, `}` and the end of the region.
struct Parser<'a> {
	tokens: &'a Tokens,
	code: Vec<TokenIndex>,
	cursor: usize,
	depth: usize,
}

impl<'a> Parser<'a> {
	fn new(tokens: &'a Tokens) -> Self {
		Self {
			tokens,
			code: tokens.code_indices(),
			cursor: 0,
			depth: 0,
		}
	}

	fn current(&self) -> Option<TokenIndex> {
		self.code.get(self.cursor).copied()
	}

	fn nth(&self, n: usize) -> Option<&'a Token> {
		let tokens = self.tokens;
		self.code
			.get(self.cursor + n)
			.and_then(|&index| tokens.get(index))
	}

	fn at(&self, text: &str) -> bool {
		self.nth(0).is_some_and(|token| token.is(text))
	}

	fn nth_is(&self, n: usize, text: &str) -> bool {
		self.nth(n).is_some_and(|token| token.is(text))
	}

	fn at_kind(&self, kind: TokenKind) -> bool {
		self.nth(0).is_some_and(|token| token.kind == kind)
	}

	/// The last consumed code token.
	fn previous(&self) -> TokenIndex {
		self.code
			.get(self.cursor.saturating_sub(1))
			.copied()
			.unwrap_or_default()
	}

	/// Whether a line break separates the current token from the previous
	/// one.
	fn newline_before(&self) -> bool {
		let Some(current) = self.nth(0) else {
			return true;
		};
		if self.cursor == 0 {
			return true;
		}

		self.tokens[self.previous()].end_line() < current.start_line()
	}

	fn bump(&mut self) -> ScriptdentResult<TokenIndex> {
		let index = self.current().ok_or_else(|| self.unexpected())?;
		self.cursor += 1;
		Ok(index)
	}

	fn eat(&mut self, text: &str) -> Option<TokenIndex> {
		if self.at(text) {
			self.cursor += 1;
			self.code.get(self.cursor - 1).copied()
		} else {
			None
		}
	}

	fn expect(&mut self, text: &str) -> ScriptdentResult<TokenIndex> {
		self.eat(text).ok_or_else(|| {
			let found = self
				.nth(0)
				.map_or_else(|| "end of script".to_string(), |token| format!("`{token}`"));
			self.error(format!("expected `{text}` but found {found}"))
		})
	}

	fn error(&self, message: String) -> ScriptdentError {
		let point = match self.nth(0) {
			Some(token) => token.position.start,
			None => {
				self.tokens
					.get(self.previous())
					.map(|token| token.position.end)
					.unwrap_or(Point::new(1, 1, 0))
			}
		};

		ScriptdentError::malformed(message, point.line, point.column)
	}

	fn unexpected(&self) -> ScriptdentError {
		match self.nth(0) {
			Some(token) => self.error(format!("unexpected `{token}`")),
			None => self.error("unexpected end of script".to_string()),
		}
	}

	/// Finish a statement: an explicit `;`, or an inserted one before a line
	/// break, a `}` or the end of the region.
	fn consume_semicolon(&mut self) -> ScriptdentResult<()> {
		if self.eat(";").is_some() || self.current().is_none() || self.at("}") || self.newline_before()
		{
			return Ok(());
		}

		Err(self.unexpected())
	}

	/// Whether the current `let` starts a declaration rather than naming a
	/// variable.
	fn at_declaration(&self) -> bool {
		if self.at("var") || self.at("const") {
			return true;
		}

		self.at("let")
			&& self.nth(1).is_some_and(|next| {
				next.is("[") || next.is("{") || next.kind == TokenKind::Identifier
			})
	}

	fn at_async_function(&self) -> bool {
		self.at("async")
			&& self.nth_is(1, "function")
			&& self.nth(0).zip(self.nth(1)).is_some_and(|(async_keyword, function)| {
				async_keyword.end_line() == function.start_line()
			})
	}

	/// Parse `open item , item … close`. Empty slots between commas are
	/// allowed (array holes, trailing commas).
	fn parse_list(
		&mut self,
		open: &str,
		close: &str,
		mut item: impl FnMut(&mut Self) -> ScriptdentResult<Node>,
	) -> ScriptdentResult<Delimited> {
		let open = self.expect(open)?;
		let mut items = vec![];
		let mut separators = vec![];

		while !self.at(close) {
			if self.current().is_none() {
				return Err(self.unexpected());
			}
			if let Some(comma) = self.eat(",") {
				separators.push(comma);
				continue;
			}

			items.push(item(self)?);

			if !self.at(close) {
				separators.push(self.expect(",")?);
			}
		}

		let close = self.expect(close)?;

		Ok(Delimited {
			open,
			items,
			separators,
			close,
		})
	}

	/// Run `parse` one nesting level deeper.
	fn descend<T>(
		&mut self,
		parse: impl FnOnce(&mut Self) -> ScriptdentResult<T>,
	) -> ScriptdentResult<T> {
		if self.depth >= MAX_NESTING {
			return Err(self.error("nesting too deep".to_string()));
		}

		self.depth += 1;
		let result = parse(self);
		self.depth -= 1;
		result
	}

	fn parse_statement(&mut self) -> ScriptdentResult<Node> {
		self.descend(Self::statement)
	}

	fn statement(&mut self) -> ScriptdentResult<Node> {
		let Some(token) = self.nth(0) else {
			return Err(self.unexpected());
		};

		if token.kind == TokenKind::Punctuator {
			match token.text.as_str() {
				"{" => return self.parse_block(),
				";" => {
					let index = self.bump()?;
					return Ok(Node::new(NodeKind::EmptyStatement, index, index));
				}
				_ => {}
			}
		}

		if token.kind == TokenKind::Identifier {
			match token.text.as_str() {
				"var" | "let" | "const" if self.at_declaration() => {
					let mut node = self.parse_variable_declaration(true)?;
					self.consume_semicolon()?;
					node.last = self.previous();
					return Ok(node);
				}
				"function" => return self.parse_function(false),
				"async" if self.at_async_function() => return self.parse_function(false),
				"class" => return self.parse_class(false),
				"if" => return self.parse_if(),
				"for" => return self.parse_for(),
				"while" => return self.parse_while(),
				"do" => return self.parse_do_while(),
				"switch" => return self.parse_switch(),
				"try" => return self.parse_try(),
				"return" => return self.parse_return(),
				"throw" => return self.parse_throw(),
				"break" | "continue" => return self.parse_jump(),
				"import" if !self.nth_is(1, "(") && !self.nth_is(1, ".") => return self.parse_import(),
				"export" => return self.parse_export(),
				_ if self.nth_is(1, ":") => return self.parse_labeled(),
				_ => {}
			}
		}

		let expression = self.parse_expression(true)?;
		self.consume_semicolon()?;
		let first = expression.first;

		Ok(Node::new(
			NodeKind::ExpressionStatement {
				expression: Box::new(expression),
			},
			first,
			self.previous(),
		))
	}

	fn parse_block(&mut self) -> ScriptdentResult<Node> {
		let body = self.parse_block_list()?;
		let (first, last) = (body.open, body.close);
		Ok(Node::new(NodeKind::BlockStatement { body }, first, last))
	}

	fn parse_block_list(&mut self) -> ScriptdentResult<Delimited> {
		let open = self.expect("{")?;
		let mut items = vec![];

		while !self.at("}") {
			items.push(self.parse_statement()?);
		}

		let close = self.expect("}")?;

		Ok(Delimited {
			open,
			items,
			separators: vec![],
			close,
		})
	}

	fn parse_variable_declaration(&mut self, allow_in: bool) -> ScriptdentResult<Node> {
		let keyword = self.bump()?;
		let mut declarations = vec![];
		let mut separators = vec![];

		loop {
			let id = self.parse_primary()?;
			let init = match self.eat("=") {
				Some(eq) => Some((eq, Box::new(self.parse_assignment(allow_in)?))),
				None => None,
			};
			let first = id.first;
			declarations.push(Node::new(
				NodeKind::VariableDeclarator {
					id: Box::new(id),
					init,
				},
				first,
				self.previous(),
			));

			match self.eat(",") {
				Some(comma) => separators.push(comma),
				None => break,
			}
		}

		Ok(Node::new(
			NodeKind::VariableDeclaration {
				declarations,
				separators,
			},
			keyword,
			self.previous(),
		))
	}

	fn parse_function(&mut self, expression: bool) -> ScriptdentResult<Node> {
		let first = self.current().ok_or_else(|| self.unexpected())?;
		self.eat("async");
		self.expect("function")?;
		self.eat("*");
		if !self.at("(") {
			self.bump()?;
		}

		let params = self.parse_list("(", ")", Self::parse_element)?;
		let body = Box::new(self.parse_block()?);
		let kind = if expression {
			NodeKind::FunctionExpression { params, body }
		} else {
			NodeKind::FunctionDeclaration { params, body }
		};

		Ok(Node::new(kind, first, self.previous()))
	}

	fn parse_class(&mut self, expression: bool) -> ScriptdentResult<Node> {
		let keyword = self.expect("class")?;
		if !self.at("{") && !self.at("extends") {
			self.bump()?;
		}

		let extends = match self.eat("extends") {
			Some(extends) => {
				let superclass = self.descend(Self::parse_left_hand_side)?;
				Some((extends, Box::new(superclass)))
			}
			None => None,
		};

		let open = self.expect("{")?;
		let mut items = vec![];
		while !self.at("}") {
			if self.eat(";").is_some() {
				continue;
			}
			items.push(self.parse_class_member()?);
		}
		let close = self.expect("}")?;

		let body = Delimited {
			open,
			items,
			separators: vec![],
			close,
		};
		let kind = if expression {
			NodeKind::ClassExpression { extends, body }
		} else {
			NodeKind::ClassDeclaration { extends, body }
		};

		Ok(Node::new(kind, keyword, close))
	}

	/// Skip `static`, `async`, `get`, `set` and `*` prefixes of a member key.
	/// A modifier word directly followed by `(`, `=`, `:` or the end of the
	/// member is the key itself.
	fn eat_member_modifiers(&mut self) {
		loop {
			if self.eat("*").is_some() {
				continue;
			}

			let is_modifier = self
				.nth(0)
				.is_some_and(|token| MEMBER_MODIFIERS.iter().any(|modifier| token.is(modifier)));
			let key_follows = self.nth(1).is_some_and(|next| {
				!["(", "=", ":", ";", ",", "}"]
					.iter()
					.any(|text| next.is(text))
			});

			if is_modifier && key_follows {
				self.cursor += 1;
			} else {
				break;
			}
		}
	}

	fn parse_property_key(&mut self) -> ScriptdentResult<Node> {
		if self.at("[") {
			let key = self.parse_list("[", "]", |parser| parser.parse_assignment(true))?;
			let (first, last) = (key.open, key.close);
			return Ok(Node::new(NodeKind::ComputedKey { key }, first, last));
		}

		let index = self.bump()?;
		let kind = match self.tokens[index].kind {
			TokenKind::String | TokenKind::Number => NodeKind::Literal,
			TokenKind::Identifier | TokenKind::PrivateName => NodeKind::Identifier,
			_ => {
				self.cursor -= 1;
				return Err(self.unexpected());
			}
		};

		Ok(Node::new(kind, index, index))
	}

	fn parse_class_member(&mut self) -> ScriptdentResult<Node> {
		let first = self.current().ok_or_else(|| self.unexpected())?;

		if self.at("static") && self.nth_is(1, "{") {
			self.bump()?;
			let body = self.parse_block_list()?;
			let last = body.close;
			return Ok(Node::new(NodeKind::StaticBlock { body }, first, last));
		}

		self.eat_member_modifiers();
		let key = Box::new(self.parse_property_key()?);

		if self.at("(") {
			let params = self.parse_list("(", ")", Self::parse_element)?;
			let body = Box::new(self.parse_block()?);
			return Ok(Node::new(
				NodeKind::MethodDefinition { key, params, body },
				first,
				self.previous(),
			));
		}

		let value = match self.eat("=") {
			Some(eq) => Some((eq, Box::new(self.parse_assignment(true)?))),
			None => None,
		};
		self.consume_semicolon()?;

		Ok(Node::new(
			NodeKind::PropertyDefinition { key, value },
			first,
			self.previous(),
		))
	}

	fn parse_property(&mut self) -> ScriptdentResult<Node> {
		if self.at("...") {
			return self.parse_element();
		}

		let first = self.current().ok_or_else(|| self.unexpected())?;
		self.eat_member_modifiers();
		let key = Box::new(self.parse_property_key()?);

		if self.at("(") {
			let params = self.parse_list("(", ")", Self::parse_element)?;
			let body = Box::new(self.parse_block()?);
			return Ok(Node::new(
				NodeKind::MethodDefinition { key, params, body },
				first,
				self.previous(),
			));
		}

		// `key: value`, or a shorthand with a default inside a pattern.
		let value = match self.eat(":").or_else(|| self.eat("=")) {
			Some(operator) => Some((operator, Box::new(self.parse_assignment(true)?))),
			None => None,
		};

		Ok(Node::new(
			NodeKind::Property { key, value },
			first,
			self.previous(),
		))
	}

	fn parse_if(&mut self) -> ScriptdentResult<Node> {
		let keyword = self.bump()?;
		let test = self.parse_list("(", ")", |parser| parser.parse_expression(true))?;
		let consequent = Box::new(self.parse_statement()?);
		let alternate = match self.eat("else") {
			Some(else_keyword) => Some((else_keyword, Box::new(self.parse_statement()?))),
			None => None,
		};

		Ok(Node::new(
			NodeKind::IfStatement {
				test,
				consequent,
				alternate,
			},
			keyword,
			self.previous(),
		))
	}

	fn parse_for(&mut self) -> ScriptdentResult<Node> {
		let keyword = self.bump()?;
		self.eat("await");
		let open = self.expect("(")?;
		let mut items = vec![];
		let mut separators = vec![];

		if !self.at(";") {
			let init = if self.at_declaration() {
				self.parse_variable_declaration(false)?
			} else {
				self.parse_expression(false)?
			};
			items.push(init);
		}

		let of = self.at("of");
		if self.at("in") || of {
			separators.push(self.bump()?);
			items.push(self.parse_expression(true)?);
			let close = self.expect(")")?;
			let head = Delimited {
				open,
				items,
				separators,
				close,
			};
			let body = Box::new(self.parse_statement()?);
			let kind = if of {
				NodeKind::ForOfStatement { head, body }
			} else {
				NodeKind::ForInStatement { head, body }
			};
			return Ok(Node::new(kind, keyword, self.previous()));
		}

		separators.push(self.expect(";")?);
		if !self.at(";") {
			items.push(self.parse_expression(true)?);
		}
		separators.push(self.expect(";")?);
		if !self.at(")") {
			items.push(self.parse_expression(true)?);
		}
		let close = self.expect(")")?;
		let head = Delimited {
			open,
			items,
			separators,
			close,
		};
		let body = Box::new(self.parse_statement()?);

		Ok(Node::new(
			NodeKind::ForStatement { head, body },
			keyword,
			self.previous(),
		))
	}

	fn parse_while(&mut self) -> ScriptdentResult<Node> {
		let keyword = self.bump()?;
		let test = self.parse_list("(", ")", |parser| parser.parse_expression(true))?;
		let body = Box::new(self.parse_statement()?);

		Ok(Node::new(
			NodeKind::WhileStatement { test, body },
			keyword,
			self.previous(),
		))
	}

	fn parse_do_while(&mut self) -> ScriptdentResult<Node> {
		let keyword = self.bump()?;
		let body = Box::new(self.parse_statement()?);
		let while_keyword = self.expect("while")?;
		let test = self.parse_list("(", ")", |parser| parser.parse_expression(true))?;
		self.eat(";");

		Ok(Node::new(
			NodeKind::DoWhileStatement {
				body,
				while_keyword,
				test,
			},
			keyword,
			self.previous(),
		))
	}

	fn parse_switch(&mut self) -> ScriptdentResult<Node> {
		let keyword = self.bump()?;
		let discriminant = self.parse_list("(", ")", |parser| parser.parse_expression(true))?;
		let open = self.expect("{")?;
		let mut items = vec![];

		while !self.at("}") {
			let first = self.current().ok_or_else(|| self.unexpected())?;
			let test = if self.eat("case").is_some() {
				Some(Box::new(self.parse_expression(true)?))
			} else {
				self.expect("default")?;
				None
			};
			let colon = self.expect(":")?;

			let mut consequent = vec![];
			while !self.at("case") && !self.at("default") && !self.at("}") {
				consequent.push(self.parse_statement()?);
			}

			items.push(Node::new(
				NodeKind::SwitchCase {
					test,
					colon,
					consequent,
				},
				first,
				self.previous(),
			));
		}

		let close = self.expect("}")?;
		let cases = Delimited {
			open,
			items,
			separators: vec![],
			close,
		};

		Ok(Node::new(
			NodeKind::SwitchStatement {
				discriminant,
				cases,
			},
			keyword,
			close,
		))
	}

	fn parse_try(&mut self) -> ScriptdentResult<Node> {
		let keyword = self.bump()?;
		let block = Box::new(self.parse_block()?);

		let handler = match self.eat("catch") {
			Some(catch_keyword) => {
				let param = if self.at("(") {
					Some(self.parse_list("(", ")", Self::parse_element)?)
				} else {
					None
				};
				let body = Box::new(self.parse_block()?);
				Some(Box::new(Node::new(
					NodeKind::CatchClause { param, body },
					catch_keyword,
					self.previous(),
				)))
			}
			None => None,
		};

		let finalizer = match self.eat("finally") {
			Some(finally_keyword) => Some((finally_keyword, Box::new(self.parse_block()?))),
			None => None,
		};

		if handler.is_none() && finalizer.is_none() {
			return Err(self.error("`try` without `catch` or `finally`".to_string()));
		}

		Ok(Node::new(
			NodeKind::TryStatement {
				block,
				handler,
				finalizer,
			},
			keyword,
			self.previous(),
		))
	}

	fn parse_return(&mut self) -> ScriptdentResult<Node> {
		let keyword = self.bump()?;
		let argument = if self.current().is_none() || self.at(";") || self.at("}") || self.newline_before()
		{
			None
		} else {
			Some(Box::new(self.parse_expression(true)?))
		};
		self.consume_semicolon()?;

		Ok(Node::new(
			NodeKind::ReturnStatement { argument },
			keyword,
			self.previous(),
		))
	}

	fn parse_throw(&mut self) -> ScriptdentResult<Node> {
		let keyword = self.bump()?;
		let argument = Box::new(self.parse_expression(true)?);
		self.consume_semicolon()?;

		Ok(Node::new(
			NodeKind::ThrowStatement { argument },
			keyword,
			self.previous(),
		))
	}

	fn parse_jump(&mut self) -> ScriptdentResult<Node> {
		let keyword = self.bump()?;
		let is_break = self.tokens[keyword].is("break");
		if self.at_kind(TokenKind::Identifier) && !self.newline_before() {
			self.bump()?;
		}
		self.consume_semicolon()?;

		let kind = if is_break {
			NodeKind::BreakStatement
		} else {
			NodeKind::ContinueStatement
		};
		Ok(Node::new(kind, keyword, self.previous()))
	}

	fn parse_labeled(&mut self) -> ScriptdentResult<Node> {
		let label = self.bump()?;
		self.expect(":")?;
		let body = Box::new(self.parse_statement()?);

		Ok(Node::new(
			NodeKind::LabeledStatement { body },
			label,
			self.previous(),
		))
	}

	/// `a`, `a as b`, `default as b`, `"a-b" as c`.
	fn parse_specifier(&mut self, kind: &NodeKind) -> ScriptdentResult<Node> {
		let first = self.bump()?;
		if self.eat("as").is_some() {
			self.bump()?;
		}

		Ok(Node::new(kind.clone(), first, self.previous()))
	}

	fn parse_string_literal(&mut self) -> ScriptdentResult<Node> {
		if !self.at_kind(TokenKind::String) {
			return Err(self.unexpected());
		}
		let index = self.bump()?;
		Ok(Node::new(NodeKind::Literal, index, index))
	}

	/// Skip `with { type: "json" }` import attributes.
	fn eat_import_attributes(&mut self) -> ScriptdentResult<()> {
		if (self.at("with") || self.at("assert")) && !self.newline_before() && self.nth_is(1, "{") {
			self.bump()?;
			self.parse_list("{", "}", Self::parse_property)?;
		}

		Ok(())
	}

	fn parse_import(&mut self) -> ScriptdentResult<Node> {
		let keyword = self.bump()?;
		let mut specifiers = vec![];
		let mut from = None;

		if !self.at_kind(TokenKind::String) {
			loop {
				if self.at("{") {
					let list = self.parse_list("{", "}", |parser| {
						parser.parse_specifier(&NodeKind::ImportSpecifier)
					})?;
					let (first, last) = (list.open, list.close);
					specifiers.push(Node::new(NodeKind::NamedSpecifiers { list }, first, last));
				} else {
					let first = self.bump()?;
					if self.tokens[first].is("*") {
						self.expect("as")?;
						self.bump()?;
					}
					specifiers.push(Node::new(NodeKind::ImportSpecifier, first, self.previous()));
				}

				if self.eat(",").is_none() {
					break;
				}
			}
			from = Some(self.expect("from")?);
		}

		let source = Box::new(self.parse_string_literal()?);
		self.eat_import_attributes()?;
		self.consume_semicolon()?;

		Ok(Node::new(
			NodeKind::ImportDeclaration {
				specifiers,
				from,
				source,
			},
			keyword,
			self.previous(),
		))
	}

	fn parse_export(&mut self) -> ScriptdentResult<Node> {
		let keyword = self.bump()?;

		if self.eat("default").is_some() {
			let declaration = if self.at("function") || self.at_async_function() {
				self.parse_function(false)?
			} else if self.at("class") {
				self.parse_class(false)?
			} else {
				let expression = self.parse_assignment(true)?;
				self.consume_semicolon()?;
				expression
			};

			return Ok(Node::new(
				NodeKind::ExportDefaultDeclaration {
					declaration: Box::new(declaration),
				},
				keyword,
				self.previous(),
			));
		}

		if self.eat("*").is_some() {
			if self.eat("as").is_some() {
				self.bump()?;
			}
			let from = self.expect("from")?;
			let source = Box::new(self.parse_string_literal()?);
			self.eat_import_attributes()?;
			self.consume_semicolon()?;

			return Ok(Node::new(
				NodeKind::ExportAllDeclaration { from, source },
				keyword,
				self.previous(),
			));
		}

		if self.at("{") {
			let specifiers = self.parse_list("{", "}", |parser| {
				parser.parse_specifier(&NodeKind::ExportSpecifier)
			})?;
			let source = match self.eat("from") {
				Some(from) => Some((from, Box::new(self.parse_string_literal()?))),
				None => None,
			};
			self.eat_import_attributes()?;
			self.consume_semicolon()?;

			return Ok(Node::new(
				NodeKind::ExportNamedDeclaration {
					declaration: None,
					specifiers: Some(specifiers),
					source,
				},
				keyword,
				self.previous(),
			));
		}

		let declaration = Box::new(self.parse_statement()?);
		Ok(Node::new(
			NodeKind::ExportNamedDeclaration {
				declaration: Some(declaration),
				specifiers: None,
				source: None,
			},
			keyword,
			self.previous(),
		))
	}

	/// Comma-separated expressions; a single expression is returned as is.
	fn parse_expression(&mut self, allow_in: bool) -> ScriptdentResult<Node> {
		let first = self.parse_assignment(allow_in)?;
		if !self.at(",") {
			return Ok(first);
		}

		let start = first.first;
		let mut expressions = vec![first];
		while self.eat(",").is_some() {
			expressions.push(self.parse_assignment(allow_in)?);
		}

		Ok(Node::new(
			NodeKind::SequenceExpression { expressions },
			start,
			self.previous(),
		))
	}

	/// A list element: a spread or an assignment expression.
	fn parse_element(&mut self) -> ScriptdentResult<Node> {
		match self.eat("...") {
			Some(spread) => {
				let argument = Box::new(self.parse_assignment(true)?);
				Ok(Node::new(
					NodeKind::SpreadElement { argument },
					spread,
					self.previous(),
				))
			}
			None => self.parse_assignment(true),
		}
	}

	/// Whether the tokens at `n` start an arrow function's parameters.
	fn is_arrow_params_at(&self, n: usize) -> bool {
		let Some(token) = self.nth(n) else {
			return false;
		};

		if token.is("(") {
			let open = self.code[self.cursor + n];
			return self
				.tokens
				.partner(open)
				.and_then(|close| self.tokens.next_code(close))
				.is_some_and(|next| self.tokens[next].is("=>"));
		}

		token.kind == TokenKind::Identifier && self.nth_is(n + 1, "=>")
	}

	fn at_arrow(&self) -> bool {
		if self.is_arrow_params_at(0) {
			return true;
		}

		self.at("async")
			&& self.is_arrow_params_at(1)
			&& self.nth(0).zip(self.nth(1)).is_some_and(|(async_keyword, next)| {
				async_keyword.end_line() == next.start_line()
			})
	}

	fn parse_arrow(&mut self, allow_in: bool) -> ScriptdentResult<Node> {
		let first = self.current().ok_or_else(|| self.unexpected())?;
		if !self.is_arrow_params_at(0) {
			self.expect("async")?;
		}

		let params = if self.at("(") {
			ArrowParams::Delimited(self.parse_list("(", ")", Self::parse_element)?)
		} else {
			let index = self.bump()?;
			ArrowParams::Single(Box::new(Node::new(NodeKind::Identifier, index, index)))
		};
		let arrow = self.expect("=>")?;
		let body = if self.at("{") {
			self.parse_block()?
		} else {
			self.parse_assignment(allow_in)?
		};

		Ok(Node::new(
			NodeKind::ArrowFunctionExpression {
				params,
				arrow,
				body: Box::new(body),
			},
			first,
			self.previous(),
		))
	}

	fn parse_assignment(&mut self, allow_in: bool) -> ScriptdentResult<Node> {
		self.descend(|parser| parser.assignment(allow_in))
	}

	fn assignment(&mut self, allow_in: bool) -> ScriptdentResult<Node> {
		if self.at_arrow() {
			return self.parse_arrow(allow_in);
		}
		if self.at("yield") {
			return self.parse_yield(allow_in);
		}

		let left = self.parse_conditional(allow_in)?;
		let is_assignment = self.nth(0).is_some_and(|token| {
			token.kind == TokenKind::Punctuator && ASSIGNMENT_OPERATORS.contains(&token.text.as_str())
		});
		if !is_assignment {
			return Ok(left);
		}

		let operator = self.bump()?;
		let right = self.parse_assignment(allow_in)?;
		let (first, last) = (left.first, right.last);

		Ok(Node::new(
			NodeKind::AssignmentExpression {
				left: Box::new(left),
				operator,
				right: Box::new(right),
			},
			first,
			last,
		))
	}

	fn parse_yield(&mut self, allow_in: bool) -> ScriptdentResult<Node> {
		let keyword = self.bump()?;
		self.eat("*");
		let ends_here = self.current().is_none()
			|| self.newline_before()
			|| [")", "]", "}", ",", ";", ":"].iter().any(|text| self.at(text));
		let argument = if ends_here {
			None
		} else {
			Some(Box::new(self.parse_assignment(allow_in)?))
		};

		Ok(Node::new(
			NodeKind::YieldExpression { argument },
			keyword,
			self.previous(),
		))
	}

	fn parse_conditional(&mut self, allow_in: bool) -> ScriptdentResult<Node> {
		let test = self.parse_binary(1, allow_in)?;
		let Some(question) = self.eat("?") else {
			return Ok(test);
		};

		let consequent = self.parse_assignment(true)?;
		let colon = self.expect(":")?;
		let alternate = self.parse_assignment(allow_in)?;
		let (first, last) = (test.first, alternate.last);

		Ok(Node::new(
			NodeKind::ConditionalExpression {
				test: Box::new(test),
				question,
				consequent: Box::new(consequent),
				colon,
				alternate: Box::new(alternate),
			},
			first,
			last,
		))
	}

	fn binary_precedence(&self, allow_in: bool) -> Option<u8> {
		let token = self.nth(0)?;
		let precedence = match (token.kind, token.text.as_str()) {
			(TokenKind::Punctuator, "??") => 1,
			(TokenKind::Punctuator, "||") => 2,
			(TokenKind::Punctuator, "&&") => 3,
			(TokenKind::Punctuator, "|") => 4,
			(TokenKind::Punctuator, "^") => 5,
			(TokenKind::Punctuator, "&") => 6,
			(TokenKind::Punctuator, "==" | "!=" | "===" | "!==") => 7,
			(TokenKind::Punctuator, "<" | ">" | "<=" | ">=") | (TokenKind::Identifier, "instanceof") => 8,
			(TokenKind::Identifier, "in") if allow_in => 8,
			(TokenKind::Punctuator, "<<" | ">>" | ">>>") => 9,
			(TokenKind::Punctuator, "+" | "-") => 10,
			(TokenKind::Punctuator, "*" | "/" | "%") => 11,
			(TokenKind::Punctuator, "**") => 12,
			_ => return None,
		};

		Some(precedence)
	}

	fn parse_binary(&mut self, min_precedence: u8, allow_in: bool) -> ScriptdentResult<Node> {
		let mut left = self.parse_unary()?;

		while let Some(precedence) = self.binary_precedence(allow_in) {
			if precedence < min_precedence {
				break;
			}

			let operator = self.bump()?;
			let right_associative = self.tokens[operator].is("**");
			let next_precedence = if right_associative {
				precedence
			} else {
				precedence + 1
			};
			let right =
				self.descend(|parser| parser.parse_binary(next_precedence, allow_in))?;
			let (first, last) = (left.first, right.last);
			let left_box = Box::new(left);
			let right_box = Box::new(right);
			let kind = if precedence <= 3 {
				NodeKind::LogicalExpression {
					left: left_box,
					operator,
					right: right_box,
				}
			} else {
				NodeKind::BinaryExpression {
					left: left_box,
					operator,
					right: right_box,
				}
			};

			left = Node::new(kind, first, last);
		}

		Ok(left)
	}

	fn parse_unary(&mut self) -> ScriptdentResult<Node> {
		self.descend(Self::unary)
	}

	fn unary(&mut self) -> ScriptdentResult<Node> {
		let Some(token) = self.nth(0) else {
			return Err(self.unexpected());
		};
		let operator = token.text.as_str();
		let is_operator = matches!(token.kind, TokenKind::Punctuator | TokenKind::Identifier);

		if is_operator && UNARY_OPERATORS.contains(&operator) {
			let first = self.bump()?;
			let argument = Box::new(self.parse_unary()?);
			return Ok(Node::new(
				NodeKind::UnaryExpression { argument },
				first,
				self.previous(),
			));
		}

		if token.is("++") || token.is("--") {
			let first = self.bump()?;
			let argument = Box::new(self.parse_unary()?);
			return Ok(Node::new(
				NodeKind::UpdateExpression { argument },
				first,
				self.previous(),
			));
		}

		if token.is("await") {
			let first = self.bump()?;
			let argument = Box::new(self.parse_unary()?);
			return Ok(Node::new(
				NodeKind::AwaitExpression { argument },
				first,
				self.previous(),
			));
		}

		let expression = self.parse_left_hand_side()?;
		if (self.at("++") || self.at("--")) && !self.newline_before() {
			let last = self.bump()?;
			let first = expression.first;
			return Ok(Node::new(
				NodeKind::UpdateExpression {
					argument: Box::new(expression),
				},
				first,
				last,
			));
		}

		Ok(expression)
	}

	/// Member accesses, calls and tagged templates chained onto a primary
	/// expression.
	fn parse_left_hand_side(&mut self) -> ScriptdentResult<Node> {
		let expression = if self.at("new") {
			self.parse_new()?
		} else {
			self.parse_primary()?
		};

		self.parse_chain(expression, true)
	}

	fn parse_chain(&mut self, mut expression: Node, allow_call: bool) -> ScriptdentResult<Node> {
		loop {
			let first = expression.first;

			if self.at(".") || self.at("?.") {
				let dot = self.bump()?;

				if self.at("(") && allow_call {
					let arguments = self.parse_list("(", ")", Self::parse_element)?;
					expression = Node::new(
						NodeKind::CallExpression {
							callee: Box::new(expression),
							arguments,
						},
						first,
						self.previous(),
					);
					continue;
				}

				let property = if self.at("[") {
					MemberProperty::Computed(
						self.parse_list("[", "]", |parser| parser.parse_expression(true))?,
					)
				} else {
					MemberProperty::Named(self.bump()?)
				};
				expression = Node::new(
					NodeKind::MemberExpression {
						object: Box::new(expression),
						dot: Some(dot),
						property,
					},
					first,
					self.previous(),
				);
			} else if self.at("[") {
				let property = MemberProperty::Computed(
					self.parse_list("[", "]", |parser| parser.parse_expression(true))?,
				);
				expression = Node::new(
					NodeKind::MemberExpression {
						object: Box::new(expression),
						dot: None,
						property,
					},
					first,
					self.previous(),
				);
			} else if self.at("(") && allow_call {
				let arguments = self.parse_list("(", ")", Self::parse_element)?;
				expression = Node::new(
					NodeKind::CallExpression {
						callee: Box::new(expression),
						arguments,
					},
					first,
					self.previous(),
				);
			} else if self.at_kind(TokenKind::Template) {
				let index = self.bump()?;
				expression = Node::new(
					NodeKind::TaggedTemplateExpression {
						tag: Box::new(expression),
						quasi: Box::new(Node::new(NodeKind::TemplateLiteral, index, index)),
					},
					first,
					index,
				);
			} else {
				return Ok(expression);
			}
		}
	}

	fn parse_new(&mut self) -> ScriptdentResult<Node> {
		self.descend(Self::new_expression)
	}

	fn new_expression(&mut self) -> ScriptdentResult<Node> {
		let keyword = self.expect("new")?;

		// `new.target`
		if let Some(dot) = self.eat(".") {
			let property = self.bump()?;
			return Ok(Node::new(
				NodeKind::MemberExpression {
					object: Box::new(Node::new(NodeKind::Identifier, keyword, keyword)),
					dot: Some(dot),
					property: MemberProperty::Named(property),
				},
				keyword,
				property,
			));
		}

		let callee = if self.at("new") {
			self.parse_new()?
		} else {
			self.parse_primary()?
		};
		let callee = Box::new(self.parse_chain(callee, false)?);
		let arguments = if self.at("(") {
			Some(self.parse_list("(", ")", Self::parse_element)?)
		} else {
			None
		};

		Ok(Node::new(
			NodeKind::NewExpression { callee, arguments },
			keyword,
			self.previous(),
		))
	}

	fn parse_primary(&mut self) -> ScriptdentResult<Node> {
		let Some(token) = self.nth(0) else {
			return Err(self.unexpected());
		};

		match token.kind {
			TokenKind::Number | TokenKind::String | TokenKind::Regex => {
				let index = self.bump()?;
				Ok(Node::new(NodeKind::Literal, index, index))
			}
			TokenKind::Template => {
				let index = self.bump()?;
				Ok(Node::new(NodeKind::TemplateLiteral, index, index))
			}
			TokenKind::PrivateName => {
				let index = self.bump()?;
				Ok(Node::new(NodeKind::Identifier, index, index))
			}
			TokenKind::Identifier => {
				match token.text.as_str() {
					"function" => return self.parse_function(true),
					"async" if self.at_async_function() => return self.parse_function(true),
					"class" => return self.parse_class(true),
					_ => {}
				}
				let index = self.bump()?;
				Ok(Node::new(NodeKind::Identifier, index, index))
			}
			TokenKind::Punctuator => {
				match token.text.as_str() {
					"(" => {
						let expression =
							self.parse_list("(", ")", |parser| parser.parse_assignment(true))?;
						let (first, last) = (expression.open, expression.close);
						Ok(Node::new(
							NodeKind::ParenthesizedExpression { expression },
							first,
							last,
						))
					}
					"[" => {
						let elements = self.parse_list("[", "]", Self::parse_element)?;
						let (first, last) = (elements.open, elements.close);
						Ok(Node::new(NodeKind::ArrayExpression { elements }, first, last))
					}
					"{" => {
						let properties = self.parse_list("{", "}", Self::parse_property)?;
						let (first, last) = (properties.open, properties.close);
						Ok(Node::new(
							NodeKind::ObjectExpression { properties },
							first,
							last,
						))
					}
					_ => Err(self.unexpected()),
				}
			}
			TokenKind::LineComment | TokenKind::BlockComment => Err(self.unexpected()),
		}
	}
}
