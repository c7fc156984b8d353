//! # Circumflang Core
//!
//! A parser for Circumflang, a flat text format that nests records, tagged
//! fields and multi-valued fields using runs of the `^` character.
//!
//! | marker | separates                   |
//! |--------|-----------------------------|
//! | `^^^^` | records (groups)            |
//! | `^^^`  | tag/value pairs in a record |
//! | `^^`   | a tag from its value        |
//! | `^`    | elements of a value         |
//!
//! Line breaks are stripped before parsing and never carry meaning.
//!
//! ## Quick Start
//!
//! ```rust
//! use circumflang_core::Document;
//!
//! let input = "Name^^Alice^^^Langs^^en^fr\n^^^^Name^^Bob";
//! let doc = Document::parse(input);
//!
//! assert_eq!(doc.len(), 2);
//! let alice = doc.at(0).unwrap();
//! assert_eq!(alice.value_for("langs").unwrap().as_slice(), ["en", "fr"]);
//! ```
//!
//! ## Dropped Segments
//!
//! Pair segments without a `^^` marker and repeated tags are dropped
//! silently. A [`Parser`] reports them:
//!
//! ```rust
//! use circumflang_core::Parser;
//!
//! let mut parser = Parser::new();
//! let result = parser.parse_with_recovery("a^^1^^^a^^2^^^junk");
//!
//! assert_eq!(result.document.at(0).unwrap().len(), 1);
//! assert_eq!(result.diagnostics.len(), 2);
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

pub use ast::{normalize_tag, Document, Group, Pair, Pairs, ValueList};
pub use error::{AccessError, Diagnostic, DiagnosticKind, Diagnostics};
pub use parser::{ParseResult, Parser};
