use std::collections::HashMap;
use std::ops::Range;

use logos::Logos;

use crate::LineTable;
use crate::Position;
use crate::ScriptdentError;
use crate::ScriptdentResult;
use crate::tokens::Token;
use crate::tokens::TokenIndex;
use crate::tokens::TokenKind;
use crate::tokens::Tokens;

/// Raw tokens produced by logos. Strings, template literals, regular
/// expressions and block comments only have their opening delimiter here;
/// the walker scans their bodies by hand.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\x0C\x0B]+")]
enum RawToken {
	#[regex(r"//[^\n]*", allow_greedy = true)]
	LineComment,
	#[token("/*")]
	BlockCommentOpen,
	#[token("\"")]
	DoubleQuote,
	#[token("'")]
	SingleQuote,
	#[token("`")]
	Backtick,
	#[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?n?")]
	#[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?")]
	#[regex(r"0[xX][0-9a-fA-F_]+n?")]
	#[regex(r"0[oO][0-7_]+n?")]
	#[regex(r"0[bB][01_]+n?")]
	Number,
	#[regex(r"([a-zA-Z_$]|[^\x00-\x7F])([a-zA-Z0-9_$]|[^\x00-\x7F])*")]
	Identifier,
	#[regex(r"#[a-zA-Z_$][a-zA-Z0-9_$]*")]
	PrivateName,
	#[token("{")]
	#[token("}")]
	#[token("(")]
	#[token(")")]
	#[token("[")]
	#[token("]")]
	#[token(";")]
	#[token(",")]
	#[token("...")]
	#[token(".")]
	#[token("?.")]
	#[token("?")]
	#[token("??")]
	#[token("??=")]
	#[token(":")]
	#[token("=>")]
	#[token("=")]
	#[token("==")]
	#[token("===")]
	#[token("!")]
	#[token("!=")]
	#[token("!==")]
	#[token("<")]
	#[token("<=")]
	#[token("<<")]
	#[token("<<=")]
	#[token(">")]
	#[token(">=")]
	#[token(">>")]
	#[token(">>=")]
	#[token(">>>")]
	#[token(">>>=")]
	#[token("+")]
	#[token("+=")]
	#[token("++")]
	#[token("-")]
	#[token("-=")]
	#[token("--")]
	#[token("*")]
	#[token("*=")]
	#[token("**")]
	#[token("**=")]
	#[token("/")]
	#[token("/=")]
	#[token("%")]
	#[token("%=")]
	#[token("&")]
	#[token("&=")]
	#[token("&&")]
	#[token("&&=")]
	#[token("|")]
	#[token("|=")]
	#[token("||")]
	#[token("||=")]
	#[token("^")]
	#[token("^=")]
	#[token("~")]
	Punctuator,
}

/// Keywords after which a `/` starts a regular expression rather than a
/// division.
const REGEX_PREFIX_KEYWORDS: [&str; 14] = [
	"return",
	"typeof",
	"instanceof",
	"in",
	"of",
	"new",
	"delete",
	"void",
	"throw",
	"case",
	"do",
	"else",
	"yield",
	"await",
];

/// Walks the logos token stream of one region, scanning literal bodies by
/// hand and tracking bracket balance.
struct TokenWalker<'a> {
	/// The region's text.
	text: &'a str,
	/// Byte offset of `text` inside the host document.
	base: usize,
	table: &'a LineTable,
	tokens: Vec<Token>,
	/// Open brackets awaiting their partner.
	brackets: Vec<TokenIndex>,
	pairs: HashMap<TokenIndex, TokenIndex>,
	/// Index of the last code token, used for regex detection.
	previous_code: Option<TokenIndex>,
}

impl<'a> TokenWalker<'a> {
	fn new(text: &'a str, base: usize, table: &'a LineTable) -> Self {
		Self {
			text,
			base,
			table,
			tokens: vec![],
			brackets: vec![],
			pairs: HashMap::new(),
			previous_code: None,
		}
	}

	fn error_at(&self, offset: usize, message: impl Into<String>) -> ScriptdentError {
		let point = self.table.offset_to_point(self.base + offset);
		ScriptdentError::malformed(message, point.line, point.column)
	}

	/// Whether a `/` at this point starts a regular expression.
	fn regex_allowed(&self) -> bool {
		let Some(previous) = self.previous_code.map(|index| &self.tokens[index]) else {
			return true;
		};

		match previous.kind {
			TokenKind::Identifier => REGEX_PREFIX_KEYWORDS.contains(&previous.text.as_str()),
			TokenKind::Punctuator => !matches!(previous.text.as_str(), ")" | "]" | "}" | "++" | "--"),
			_ => false,
		}
	}

	fn process(mut self) -> ScriptdentResult<Tokens> {
		let mut lexer = RawToken::lexer(self.text);

		while let Some(result) = lexer.next() {
			let span = lexer.span();
			let Ok(raw) = result else {
				let slice = lexer.slice();
				return Err(self.error_at(span.start, format!("unexpected character `{slice}`")));
			};

			// `a?.5:b` is a conditional followed by a fraction.
			if raw == RawToken::Punctuator
				&& lexer.slice() == "?."
				&& self.text.as_bytes().get(span.end).is_some_and(u8::is_ascii_digit)
			{
				let fraction_start = span.start + 1;
				let fraction_end = number_end(self.text, fraction_start);
				self.push_token(TokenKind::Punctuator, span.start..fraction_start)?;
				lexer.bump(fraction_end - span.end);
				self.push_token(TokenKind::Number, fraction_start..fraction_end)?;
				continue;
			}

			let (kind, end) = match raw {
				RawToken::LineComment => (TokenKind::LineComment, span.end),
				RawToken::BlockCommentOpen => {
					let end = scan_block_comment(self.text, span.start)
						.ok_or_else(|| self.error_at(span.start, "unterminated block comment"))?;
					(TokenKind::BlockComment, end)
				}
				RawToken::DoubleQuote | RawToken::SingleQuote => {
					let quote = self.text.as_bytes()[span.start];
					let end = scan_string(self.text, span.start, quote)
						.map_err(|message| self.error_at(span.start, message))?;
					(TokenKind::String, end)
				}
				RawToken::Backtick => {
					let end = scan_template(self.text, span.start, 0)
						.map_err(|message| self.error_at(span.start, message))?;
					(TokenKind::Template, end)
				}
				RawToken::Punctuator
					if matches!(lexer.slice(), "/" | "/=") && self.regex_allowed() =>
				{
					let end = scan_regex(self.text, span.start)
						.map_err(|message| self.error_at(span.start, message))?;
					(TokenKind::Regex, end)
				}
				RawToken::Punctuator => (TokenKind::Punctuator, span.end),
				RawToken::Number => (TokenKind::Number, span.end),
				RawToken::Identifier => (TokenKind::Identifier, span.end),
				RawToken::PrivateName => (TokenKind::PrivateName, span.end),
			};

			if end > span.end {
				lexer.bump(end - span.end);
			}

			self.push_token(kind, span.start..end)?;
		}

		if let Some(open) = self.brackets.pop() {
			let token = &self.tokens[open];
			return Err(ScriptdentError::malformed(
				format!("unclosed `{}`", token.text),
				token.position.start.line,
				token.position.start.column,
			));
		}

		Ok(Tokens::new(self.tokens, self.pairs))
	}

	fn push_token(&mut self, kind: TokenKind, span: Range<usize>) -> ScriptdentResult<()> {
		let index = self.tokens.len();
		let text = &self.text[span.clone()];

		if kind == TokenKind::Punctuator {
			match text {
				"(" | "[" | "{" => self.brackets.push(index),
				")" | "]" | "}" => {
					let expected = match text {
						")" => "(",
						"]" => "[",
						_ => "{",
					};
					let Some(open) = self.brackets.pop() else {
						return Err(self.error_at(span.start, format!("unbalanced `{text}`")));
					};
					if self.tokens[open].text != expected {
						return Err(self.error_at(
							span.start,
							format!("`{text}` does not close `{}`", self.tokens[open].text),
						));
					}
					self.pairs.insert(open, index);
					self.pairs.insert(index, open);
				}
				_ => {}
			}
		}

		if !kind.is_comment() {
			self.previous_code = Some(index);
		}

		self.tokens.push(Token {
			kind,
			text: text.to_string(),
			position: Position {
				start: self.table.offset_to_point(self.base + span.start),
				end: self.table.offset_to_point(self.base + span.end),
			},
		});

		Ok(())
	}
}

/// Tokenize the embedded region `range` of `source`. Token positions are in
/// host-document coordinates.
pub fn classify(source: &str, range: Range<usize>, table: &LineTable) -> ScriptdentResult<Tokens> {
	let Some(text) = source.get(range.clone()) else {
		let point = table.offset_to_point(range.start.min(source.len()));
		return Err(ScriptdentError::malformed(
			"region is outside the document",
			point.line,
			point.column,
		));
	};

	TokenWalker::new(text, range.start, table).process()
}

/// Returns the offset just past the number starting at `start`.
fn number_end(text: &str, start: usize) -> usize {
	let mut lexer = RawToken::lexer(&text[start..]);
	match lexer.next() {
		Some(Ok(RawToken::Number)) => start + lexer.span().end,
		_ => start + 1,
	}
}

/// Returns the offset just past the closing `*/` of a block comment opened at
/// `start`.
fn scan_block_comment(text: &str, start: usize) -> Option<usize> {
	text.get(start + 2..)?
		.find("*/")
		.map(|position| start + 2 + position + 2)
}

/// Returns the offset just past the closing quote of a string opened at
/// `start`. A backslash before a line break continues the string.
fn scan_string(text: &str, start: usize, quote: u8) -> Result<usize, &'static str> {
	let bytes = text.as_bytes();
	let mut index = start + 1;

	while index < bytes.len() {
		match bytes[index] {
			b'\\' => {
				let crlf = bytes.get(index + 1) == Some(&b'\r') && bytes.get(index + 2) == Some(&b'\n');
				index += if crlf { 3 } else { 2 };
			}
			b'\n' => return Err("unterminated string literal"),
			byte if byte == quote => return Ok(index + 1),
			_ => index += 1,
		}
	}

	Err("unterminated string literal")
}

/// Templates nested inside interpolations deeper than this are rejected.
const MAX_TEMPLATE_NESTING: usize = 64;

/// Returns the offset just past the closing backtick of a template literal
/// opened at `start`, skipping over nested `${ … }` interpolations.
fn scan_template(text: &str, start: usize, nesting: usize) -> Result<usize, &'static str> {
	if nesting > MAX_TEMPLATE_NESTING {
		return Err("template literals nested too deep");
	}


	let bytes = text.as_bytes();
	let mut index = start + 1;

	while index < bytes.len() {
		match bytes[index] {
			b'\\' => index += 2,
			b'`' => return Ok(index + 1),
			b'$' if bytes.get(index + 1) == Some(&b'{') => {
				index = scan_interpolation(text, index + 2, nesting)?;
			}
			_ => index += 1,
		}
	}

	Err("unterminated template literal")
}

/// Returns the offset just past the `}` closing an interpolation whose body
/// starts at `start`.
fn scan_interpolation(text: &str, start: usize, nesting: usize) -> Result<usize, &'static str> {
	let bytes = text.as_bytes();
	let mut depth = 0usize;
	let mut index = start;

	while index < bytes.len() {
		match bytes[index] {
			b'{' => {
				depth += 1;
				index += 1;
			}
			b'}' => {
				if depth == 0 {
					return Ok(index + 1);
				}
				depth -= 1;
				index += 1;
			}
			quote @ (b'"' | b'\'') => index = scan_string(text, index, quote)?,
			b'`' => index = scan_template(text, index, nesting + 1)?,
			b'/' if bytes.get(index + 1) == Some(&b'/') => {
				index = text[index..]
					.find('\n')
					.map_or(bytes.len(), |position| index + position);
			}
			b'/' if bytes.get(index + 1) == Some(&b'*') => {
				index = scan_block_comment(text, index).ok_or("unterminated block comment")?;
			}
			_ => index += 1,
		}
	}

	Err("unterminated template literal")
}

/// Returns the offset just past the flags of a regular expression opened at
/// `start`.
fn scan_regex(text: &str, start: usize) -> Result<usize, &'static str> {
	let bytes = text.as_bytes();
	let mut index = start + 1;
	let mut in_class = false;

	while index < bytes.len() {
		match bytes[index] {
			b'\\' => index += 2,
			b'\n' => return Err("unterminated regular expression"),
			b'[' => {
				in_class = true;
				index += 1;
			}
			b']' => {
				in_class = false;
				index += 1;
			}
			b'/' if !in_class => {
				index += 1;
				while index < bytes.len() && bytes[index].is_ascii_alphanumeric() {
					index += 1;
				}
				return Ok(index);
			}
			_ => index += 1,
		}
	}

	Err("unterminated regular expression")
}
