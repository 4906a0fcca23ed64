use std::ops::Range;
use std::path::Path;

use markdown::ParseOptions;
use markdown::mdast::Node as MdastNode;
use markdown::to_mdast;
use serde::Serialize;

use crate::LineTable;
use crate::ScriptdentError;
use crate::ScriptdentResult;
use crate::leading_whitespace;

/// The kind of document that embeds scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HostKind {
	/// HTML-like markup with `<script>` elements: `.html`, `.htm`, `.vue`,
	/// `.svelte`.
	Html,
	/// Markdown with fenced `js` code blocks.
	Markdown,
}

impl HostKind {
	pub fn from_path(path: &Path) -> Option<Self> {
		let extension = path.extension()?.to_str()?.to_ascii_lowercase();
		match extension.as_str() {
			"html" | "htm" | "vue" | "svelte" => Some(Self::Html),
			"md" | "markdown" => Some(Self::Markdown),
			_ => None,
		}
	}
}

/// A contiguous run of script inside a host document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedRegion {
	/// Byte range of the script source in the host document.
	pub range: Range<usize>,
	/// The host line holding the `<script>` start tag or opening fence.
	pub root_line: usize,
	/// Leading whitespace of the root line. Top-level statements are
	/// expected at this indentation.
	pub base_indent: String,
	/// The declared language, e.g. `js` or `javascript`.
	pub language: String,
}

impl EmbeddedRegion {
	/// A region covering the whole of `source`, for standalone scripts.
	pub fn whole(source: &str) -> Self {
		Self {
			range: 0..source.len(),
			root_line: 0,
			base_indent: String::new(),
			language: "js".to_string(),
		}
	}
}

const FENCE_LANGUAGES: [&str; 4] = ["js", "javascript", "mjs", "cjs"];

const SCRIPT_TYPES: [&str; 6] = [
	"",
	"module",
	"text/javascript",
	"application/javascript",
	"text/ecmascript",
	"application/ecmascript",
];

/// Locate every embedded script in `source`.
pub fn find_regions(source: &str, kind: HostKind) -> ScriptdentResult<Vec<EmbeddedRegion>> {
	match kind {
		HostKind::Html => find_script_elements(source),
		HostKind::Markdown => find_fenced_blocks(source),
	}
}

fn memstr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack
		.windows(needle.len())
		.position(|window| window == needle)
}

fn find_from(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
	haystack
		.get(from..)
		.and_then(|rest| memstr(rest, needle))
		.map(|position| from + position)
}

/// Scan for `<script>` elements. Matching is case-insensitive and skips HTML
/// comments; the element's body is the region.
fn find_script_elements(source: &str) -> ScriptdentResult<Vec<EmbeddedRegion>> {
	let lower = source.to_ascii_lowercase();
	let bytes = lower.as_bytes();
	let table = LineTable::new(source);
	let mut regions = vec![];
	let mut cursor = 0;

	while let Some(open) = find_from(bytes, cursor, b"<") {
		if bytes[open..].starts_with(b"<!--") {
			match find_from(bytes, open + 4, b"-->") {
				Some(close) => {
					cursor = close + 3;
					continue;
				}
				None => break,
			}
		}

		let after_name = open + "<script".len();
		let is_script = bytes[open..].starts_with(b"<script")
			&& bytes
				.get(after_name)
				.is_some_and(|byte| byte.is_ascii_whitespace() || matches!(byte, b'>' | b'/'));
		if !is_script {
			cursor = open + 1;
			continue;
		}

		let Some(tag_end) = find_tag_end(bytes, after_name) else {
			break;
		};
		let attributes = parse_attributes(&source[after_name..tag_end]);
		let root_line = table.offset_to_point(open).line;

		if bytes[..tag_end].ends_with(b"/") {
			cursor = tag_end + 1;
			continue;
		}

		let body_start = tag_end + 1;
		let Some(body_end) = find_from(bytes, body_start, b"</script") else {
			return Err(ScriptdentError::UnclosedRegion { line: root_line });
		};
		cursor = find_from(bytes, body_end, b">").map_or(bytes.len(), |close| close + 1);

		if !is_javascript(&attributes) {
			continue;
		}

		let root_start = table.line_start(root_line).unwrap_or(0);
		let root_end = table.line_end(root_line).unwrap_or(root_start);
		let language = attribute(&attributes, "lang")
			.filter(|lang| !lang.is_empty())
			.unwrap_or("js")
			.to_string();

		regions.push(EmbeddedRegion {
			range: body_start..body_end,
			root_line,
			base_indent: leading_whitespace(&source[root_start..root_end]).to_string(),
			language,
		});
	}

	Ok(regions)
}

/// Offset of the `>` closing a start tag, skipping quoted attribute values.
fn find_tag_end(bytes: &[u8], from: usize) -> Option<usize> {
	let mut quote: Option<u8> = None;

	for (index, &byte) in bytes.iter().enumerate().skip(from) {
		match (quote, byte) {
			(Some(open), byte) if byte == open => quote = None,
			(Some(_), _) => {}
			(None, b'"' | b'\'') => quote = Some(byte),
			(None, b'>') => return Some(index),
			(None, _) => {}
		}
	}

	None
}

/// `name=value` pairs of a start tag, names lowercased. Bare attributes have
/// an empty value.
fn parse_attributes(text: &str) -> Vec<(String, String)> {
	let mut attributes = vec![];
	let mut rest = text.trim_start();

	while !rest.is_empty() {
		let name_end = rest
			.find(|ch: char| ch.is_whitespace() || ch == '=' || ch == '/')
			.unwrap_or(rest.len());
		let name = rest[..name_end].to_ascii_lowercase();
		rest = rest[name_end..].trim_start();

		let mut value = String::new();
		if let Some(after_eq) = rest.strip_prefix('=') {
			let after_eq = after_eq.trim_start();
			let (parsed, remaining) = match after_eq.chars().next() {
				Some(quote @ ('"' | '\'')) => {
					let body = &after_eq[1..];
					let end = body.find(quote).unwrap_or(body.len());
					(&body[..end], body.get(end + 1..).unwrap_or(""))
				}
				_ => {
					let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
					(&after_eq[..end], &after_eq[end..])
				}
			};
			value = parsed.to_string();
			rest = remaining;
		} else if name.is_empty() {
			rest = rest.get(1..).unwrap_or("");
		}

		if !name.is_empty() {
			attributes.push((name, value));
		}
		rest = rest.trim_start();
	}

	attributes
}

fn attribute<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
	attributes
		.iter()
		.find(|(key, _)| key == name)
		.map(|(_, value)| value.as_str())
}

fn is_javascript(attributes: &[(String, String)]) -> bool {
	if attribute(attributes, "src").is_some() {
		return false;
	}

	let type_ok = attribute(attributes, "type")
		.is_none_or(|kind| SCRIPT_TYPES.contains(&kind.trim().to_ascii_lowercase().as_str()));
	let lang_ok = attribute(attributes, "lang")
		.is_none_or(|lang| matches!(lang.to_ascii_lowercase().as_str(), "" | "js" | "javascript"));

	type_ok && lang_ok
}

/// Fenced `js` code blocks of a Markdown document. Blocks inside block quotes
/// are skipped because their lines start with `>` rather than whitespace.
fn find_fenced_blocks(source: &str) -> ScriptdentResult<Vec<EmbeddedRegion>> {
	let mdast =
		to_mdast(source, &ParseOptions::gfm()).map_err(|e| ScriptdentError::Markdown(e.to_string()))?;
	let table = LineTable::new(source);
	let mut regions = vec![];
	collect_fenced_blocks(&mdast, source, &table, &mut regions);

	Ok(regions)
}

fn collect_fenced_blocks(
	node: &MdastNode,
	source: &str,
	table: &LineTable,
	regions: &mut Vec<EmbeddedRegion>,
) {
	match node {
		MdastNode::Blockquote(_) => {}
		MdastNode::Code(code) => {
			let Some(language) = code.lang.as_deref() else {
				return;
			};
			if !FENCE_LANGUAGES.contains(&language.to_ascii_lowercase().as_str()) {
				return;
			}
			let Some(position) = code.position.as_ref() else {
				return;
			};

			let root_line = position.start.line;
			let Some(body_start) = table.line_start(root_line + 1) else {
				return;
			};

			// An unterminated fence runs to the end of the document.
			let closing_line = position.end.line;
			let closing_text = table
				.line_start(closing_line)
				.zip(table.line_end(closing_line))
				.map_or("", |(start, end)| source[start..end].trim_start());
			let closed = closing_line > root_line
				&& (closing_text.starts_with("```") || closing_text.starts_with("~~~"));
			let body_end = if closed {
				table.line_start(closing_line).unwrap_or(body_start)
			} else {
				position.end.offset
			};
			if body_end <= body_start {
				return;
			}

			let root_start = table.line_start(root_line).unwrap_or(0);
			let root_end = table.line_end(root_line).unwrap_or(root_start);
			regions.push(EmbeddedRegion {
				range: body_start..body_end,
				root_line,
				base_indent: leading_whitespace(&source[root_start..root_end]).to_string(),
				language: language.to_string(),
			});
		}
		_ => {
			if let Some(children) = node.children() {
				for child in children {
					collect_fenced_blocks(child, source, table, regions);
				}
			}
		}
	}
}
