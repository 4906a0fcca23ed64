use serde::Serialize;

/// A location in the host document. `line` and `column` are 1-indexed,
/// `offset` is the 0-indexed byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Point {
	pub line: usize,
	pub column: usize,
	pub offset: usize,
}

impl Point {
	pub fn new(line: usize, column: usize, offset: usize) -> Self {
		Self {
			line,
			column,
			offset,
		}
	}
}

/// A half-open span `[start, end)` in the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
	pub start: Point,
	pub end: Point,
}

impl Position {
	pub fn new(
		start_line: usize,
		start_column: usize,
		start_offset: usize,
		end_line: usize,
		end_column: usize,
		end_offset: usize,
	) -> Self {
		Self {
			start: Point::new(start_line, start_column, start_offset),
			end: Point::new(end_line, end_column, end_offset),
		}
	}
}

/// Pre-computed table of line-start byte offsets for efficient offset-to-point
/// conversion. Built once per document (O(n)), then each lookup is a binary
/// search (O(log n)).
#[derive(Debug, Clone)]
pub struct LineTable {
	/// Byte offsets of the start of each line. `line_starts[0]` is always 0.
	line_starts: Vec<usize>,
	len: usize,
}

impl LineTable {
	pub fn new(content: &str) -> Self {
		let mut line_starts = vec![0];
		for (i, byte) in content.bytes().enumerate() {
			if byte == b'\n' {
				line_starts.push(i + 1);
			}
		}

		Self {
			line_starts,
			len: content.len(),
		}
	}

	/// Convert a byte offset to a 1-indexed [`Point`].
	pub fn offset_to_point(&self, offset: usize) -> Point {
		let line_idx = match self.line_starts.binary_search(&offset) {
			Ok(exact) => exact,
			Err(insert) => insert.saturating_sub(1),
		};

		Point {
			line: line_idx + 1,
			column: offset - self.line_starts[line_idx] + 1,
			offset,
		}
	}

	/// Byte offset where the 1-indexed `line` starts.
	pub fn line_start(&self, line: usize) -> Option<usize> {
		line.checked_sub(1)
			.and_then(|idx| self.line_starts.get(idx))
			.copied()
	}

	/// Byte offset just past the content of `line`, excluding its `\n`.
	pub fn line_end(&self, line: usize) -> Option<usize> {
		let start = self.line_start(line)?;
		let end = self
			.line_starts
			.get(line)
			.map_or(self.len, |next| next.saturating_sub(1));
		Some(end.max(start))
	}
}

/// Leading spaces and tabs of `text`.
pub fn leading_whitespace(text: &str) -> &str {
	let end = text
		.bytes()
		.position(|byte| byte != b' ' && byte != b'\t')
		.unwrap_or(text.len());
	&text[..end]
}
