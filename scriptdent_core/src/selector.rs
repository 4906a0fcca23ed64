use std::fmt::Display;

use crate::ScriptdentError;
use crate::ScriptdentResult;
use crate::syntax::NODE_KIND_NAMES;
use crate::syntax::Node;

/// How a compound relates to the compound before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
	/// `A B`: any ancestor.
	Descendant,
	/// `A > B`: the direct parent.
	Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compound {
	Any,
	Kind(&'static str),
}

impl Compound {
	fn matches(self, node: &Node) -> bool {
		match self {
			Self::Any => true,
			Self::Kind(kind) => node.kind_name() == kind,
		}
	}
}

/// One alternative: compounds joined by combinators. The combinator stored
/// with a compound links it to the compound on its left.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex(Vec<(Combinator, Compound)>);

/// A structural pattern over syntax node kinds, used by the `ignores`
/// configuration.
///
/// Supported syntax: `*`, a node kind such as `ObjectExpression`, the
/// descendant combinator `A B`, the child combinator `A > B` and
/// alternatives `A, B`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
	source: String,
	alternatives: Vec<Complex>,
}

impl Selector {
	pub fn parse(source: &str) -> ScriptdentResult<Self> {
		let invalid = |reason: String| {
			ScriptdentError::InvalidSelector {
				selector: source.to_string(),
				reason,
			}
		};

		let mut alternatives = vec![];
		for alternative in source.split(',') {
			let alternative = alternative.trim();
			if alternative.is_empty() {
				return Err(invalid("empty alternative".to_string()));
			}
			alternatives.push(parse_complex(alternative).map_err(invalid)?);
		}

		Ok(Self {
			source: source.to_string(),
			alternatives,
		})
	}

	/// Whether this selector is the catch-all `*`, which suppresses a whole
	/// region.
	pub fn is_catch_all(&self) -> bool {
		self.alternatives
			.iter()
			.any(|complex| complex.0 == [(Combinator::Descendant, Compound::Any)])
	}

	/// Whether `node`, whose ancestors from the root down are `ancestors`,
	/// matches.
	pub fn matches(&self, node: &Node, ancestors: &[&Node]) -> bool {
		self.alternatives
			.iter()
			.any(|complex| matches_from(&complex.0, node, ancestors))
	}
}

impl Display for Selector {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.source)
	}
}

fn parse_complex(source: &str) -> Result<Complex, String> {
	let mut parts = vec![];
	let mut pending: Option<Combinator> = None;
	let mut after_compound = false;
	let mut chars = source.char_indices().peekable();

	while let Some((start, ch)) = chars.next() {
		match ch {
			ch if ch.is_whitespace() => {
				if !parts.is_empty() && pending.is_none() {
					pending = Some(Combinator::Descendant);
				}
				after_compound = false;
			}
			'>' => {
				if parts.is_empty() || pending == Some(Combinator::Child) {
					return Err("`>` must sit between two node kinds".to_string());
				}
				pending = Some(Combinator::Child);
				after_compound = false;
			}
			_ if after_compound => {
				return Err(format!("missing combinator before `{}`", &source[start..]));
			}
			'*' => {
				parts.push((pending.take().unwrap_or(Combinator::Descendant), Compound::Any));
				after_compound = true;
			}
			ch if ch.is_ascii_alphabetic() => {
				let mut end = start + ch.len_utf8();
				while let Some(&(index, next)) = chars.peek() {
					if !next.is_ascii_alphanumeric() {
						break;
					}
					end = index + next.len_utf8();
					chars.next();
				}

				let name = &source[start..end];
				let Some(kind) = NODE_KIND_NAMES.iter().copied().find(|kind| *kind == name) else {
					return Err(format!("unknown node kind `{name}`"));
				};
				parts.push((pending.take().unwrap_or(Combinator::Descendant), Compound::Kind(kind)));
				after_compound = true;
			}
			other => return Err(format!("unexpected character `{other}`")),
		}
	}

	if pending == Some(Combinator::Child) {
		return Err("`>` must sit between two node kinds".to_string());
	}

	Ok(Complex(parts))
}

fn matches_from(parts: &[(Combinator, Compound)], node: &Node, ancestors: &[&Node]) -> bool {
	let Some(((combinator, compound), rest)) = parts.split_last() else {
		return true;
	};

	if !compound.matches(node) {
		return false;
	}
	if rest.is_empty() {
		return true;
	}

	match combinator {
		Combinator::Child => {
			ancestors
				.split_last()
				.is_some_and(|(parent, above)| matches_from(rest, parent, above))
		}
		Combinator::Descendant => {
			(0..ancestors.len())
				.rev()
				.any(|index| matches_from(rest, ancestors[index], &ancestors[..index]))
		}
	}
}
