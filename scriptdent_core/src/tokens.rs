use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt::Display;

use derive_more::Deref;
use serde::Serialize;

use crate::Position;

/// Index of a token inside [`Tokens`]. Constraints and syntax nodes refer to
/// tokens only through this index.
pub type TokenIndex = usize;

/// The lexical kind of a token in the embedded script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
	/// `{`, `=>`, `?.`, `>>>=` …
	Punctuator,
	/// Identifiers and keywords, e.g. `foo`, `return`.
	Identifier,
	/// Numeric literals, e.g. `1`, `0xff`, `1_000n`.
	Number,
	/// Regular expression literals, e.g. `/ab+c/gi`.
	Regex,
	/// Private class member names, e.g. `#count`.
	PrivateName,
	/// Single or double quoted strings.
	String,
	/// A complete template literal including its `${}` interpolations.
	Template,
	/// `// …`
	LineComment,
	/// `/* … */`
	BlockComment,
}

/// Coarse classification used by the suppression filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenClass {
	Code,
	LineComment,
	BlockComment,
	StringSpan,
	TemplateSpan,
}

impl TokenKind {
	pub fn class(self) -> TokenClass {
		match self {
			Self::Punctuator | Self::Identifier | Self::Number | Self::Regex | Self::PrivateName => {
				TokenClass::Code
			}
			Self::String => TokenClass::StringSpan,
			Self::Template => TokenClass::TemplateSpan,
			Self::LineComment => TokenClass::LineComment,
			Self::BlockComment => TokenClass::BlockComment,
		}
	}

	pub fn is_comment(self) -> bool {
		matches!(self, Self::LineComment | Self::BlockComment)
	}
}

/// A single token of the embedded script, positioned in host coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
	pub kind: TokenKind,
	pub position: Position,
	/// The raw source text of the token.
	pub text: String,
}

impl Token {
	/// Whether this token is the punctuator or word `text`. Strings and
	/// comments never match.
	pub fn is(&self, text: &str) -> bool {
		matches!(self.kind, TokenKind::Punctuator | TokenKind::Identifier) && self.text == text
	}

	pub fn start_line(&self) -> usize {
		self.position.start.line
	}

	pub fn end_line(&self) -> usize {
		self.position.end.line
	}

	pub fn is_closing_bracket(&self) -> bool {
		self.kind == TokenKind::Punctuator && matches!(self.text.as_str(), ")" | "]" | "}")
	}
}

impl Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.text)
	}
}

/// The classified token stream of one embedded region, together with the
/// per-line tables every later stage reads.
///
/// - The *leader* of a line is the first code token starting on it, or the
///   first comment when the line holds no code. A line's indentation is
///   decided by its leader.
/// - A *continued* line is one that a multi-line token (template literal,
///   block comment, backslash-continued string) spills into. Only lines
///   spilled into by a block comment can still have a leader of their own.
#[derive(Debug, Clone, Default, Deref)]
pub struct Tokens {
	#[deref]
	tokens: Vec<Token>,
	leaders: BTreeMap<usize, TokenIndex>,
	continued: BTreeMap<usize, TokenIndex>,
	pairs: HashMap<TokenIndex, TokenIndex>,
}

impl Tokens {
	/// Build the line tables for `tokens`. `pairs` maps every bracket to its
	/// partner in both directions.
	pub fn new(tokens: Vec<Token>, pairs: HashMap<TokenIndex, TokenIndex>) -> Self {
		let mut continued = BTreeMap::new();
		for (index, token) in tokens.iter().enumerate() {
			for line in (token.start_line() + 1)..=token.end_line() {
				continued.entry(line).or_insert(index);
			}
		}

		let mut leaders: BTreeMap<usize, TokenIndex> = BTreeMap::new();
		for (index, token) in tokens.iter().enumerate() {
			let line = token.start_line();
			if continued
				.get(&line)
				.is_some_and(|&spilling| !tokens[spilling].kind.is_comment())
			{
				continue;
			}

			match leaders.get(&line) {
				None => {
					leaders.insert(line, index);
				}
				Some(&existing) if tokens[existing].kind.is_comment() && !token.kind.is_comment() => {
					leaders.insert(line, index);
				}
				Some(_) => {}
			}
		}

		Self {
			tokens,
			leaders,
			continued,
			pairs,
		}
	}

	/// Lines that have a leader, in ascending order, with that leader.
	pub fn leaders(&self) -> impl Iterator<Item = (usize, TokenIndex)> + '_ {
		self.leaders.iter().map(|(line, index)| (*line, *index))
	}

	pub fn leader_of_line(&self, line: usize) -> Option<TokenIndex> {
		self.leaders.get(&line).copied()
	}

	/// The leader whose indentation `index` shares. A token on a line that a
	/// multi-line string or template spills into belongs to the line where
	/// that literal started. Lines a block comment spills into keep their own
	/// leader.
	pub fn effective_leader(&self, index: TokenIndex) -> TokenIndex {
		let Some(token) = self.tokens.get(index) else {
			return index;
		};

		let mut line = token.start_line();
		while let Some(&spilling) = self.spilled_by_code(line) {
			line = self.tokens[spilling].start_line();
		}

		self.leader_of_line(line).unwrap_or(index)
	}

	fn spilled_by_code(&self, line: usize) -> Option<&TokenIndex> {
		self.continued
			.get(&line)
			.filter(|&&spilling| !self.tokens[spilling].kind.is_comment())
	}

	/// Lines a multi-line token spills into, with the spilling token.
	pub fn continued_lines(&self) -> impl Iterator<Item = (usize, TokenIndex)> + '_ {
		self.continued.iter().map(|(line, index)| (*line, *index))
	}

	/// The matching bracket of `index`, if it is a bracket.
	pub fn partner(&self, index: TokenIndex) -> Option<TokenIndex> {
		self.pairs.get(&index).copied()
	}

	/// The first code token after `index`.
	pub fn next_code(&self, index: TokenIndex) -> Option<TokenIndex> {
		((index + 1)..self.tokens.len()).find(|&next| !self.tokens[next].kind.is_comment())
	}

	/// The last code token before `index`.
	pub fn previous_code(&self, index: TokenIndex) -> Option<TokenIndex> {
		(0..index.min(self.tokens.len()))
			.rev()
			.find(|&previous| !self.tokens[previous].kind.is_comment())
	}

	/// Indices of every code token, in source order.
	pub fn code_indices(&self) -> Vec<TokenIndex> {
		self.tokens
			.iter()
			.enumerate()
			.filter(|(_, token)| !token.kind.is_comment())
			.map(|(index, _)| index)
			.collect()
	}
}
