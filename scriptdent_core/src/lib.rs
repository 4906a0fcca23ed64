//! `scriptdent_core` checks and fixes the indentation of JavaScript embedded
//! in host documents: `<script>` elements of HTML, Vue and Svelte files, and
//! fenced `js` code blocks of Markdown files.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Host document
//!   → Host scanner (finds embedded regions and their root line)
//!   → Classifier (tokenizes a region, records multi-line literals and line leaders)
//!   → Parser (builds the syntax tree over the code tokens)
//!   → Constraint builder (one "indent = anchor + k units" rule per token)
//!   → Resolver (one expected indent per line, tie-broken by priority)
//!   → Suppression filter (literal spans, continuations, `ignores` selectors)
//!   → Comparator (diagnostics and whitespace-only fixes)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `scriptdent.toml`.
//! - [`host`]: Discovery of embedded script regions.
//! - [`constraints`]: The node-to-constraint dispatch table.
//! - [`resolver`]: Memoized resolution of constraints into per-line indents.
//! - [`selector`]: The structural pattern language used by `ignores`.
//! - [`project`]: Directory walking with include globs, exclude patterns and
//!   `.gitignore`.
//!
//! ## Quick Start
//!
//! ```rust
//! use scriptdent_core::Checker;
//! use scriptdent_core::HostKind;
//! use scriptdent_core::IndentConfig;
//!
//! let checker = Checker::new(IndentConfig::default()).unwrap();
//! let source = "<script>\nif (ready) {\ngo()\n}\n</script>\n";
//! let (fixed, report) = checker.fix_document(source, HostKind::Html).unwrap();
//!
//! assert_eq!(report.diagnostics.len(), 1);
//! assert_eq!(fixed, "<script>\nif (ready) {\n  go()\n}\n</script>\n");
//! ```

pub use compare::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use host::*;
pub use position::*;
pub use project::*;

mod compare;
pub mod config;
pub mod constraints;
mod engine;
#[allow(unused_assignments)]
mod error;
pub mod host;
pub mod lexer;
pub mod parser;
mod position;
pub mod project;
pub mod resolver;
pub mod selector;
pub mod suppression;
pub mod syntax;
pub mod tokens;

#[cfg(test)]
mod __fixtures;
#[cfg(test)]
mod __tests;
