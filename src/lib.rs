//! `declarg` is a declarative command line parser for Rust.
//!
//! Although other crates provide command line parser functionality, we have found they prioritize different concerns than those we are interested in.
//! `declarg` is built around a single idea: describe *what* a valid command line looks like - types, defaults, and the relationships between options - and let the parser enforce it.
//! Specifically, `declarg` attempts to prioritize the following design concerns:
//! * *Typed option parsing*:
//! Options are registered as `int`, `float`, `str`, `flag`, `multiword`, `range`, or an enumerated set of `choices`; the raw tokens are cast (and rejected) before your program sees them.
//! * *Constraint sensitive parsing*:
//! The user should not hand-validate relationships between options.
//! Requirements ([`OptionMut::required`]), dependencies ([`OptionMut::requires`]), mutual exclusions ([`OptionMut::conflicts`]), and value-conditional requirements ([`OptionMut::required_if`], [`OptionMut::required_unless`]) are declared once and checked on every invocation.
//! * *Composable conditions*:
//! Relations take [`Condition`]s - lazy predicates over the parsed state, built from option references ([`arg`]) with relational comparisons and `and_`/`or_`/`!` composition.
//! A condition is evaluated once, against the fully parsed and defaulted values.
//! * *An explicit result record*:
//! Parsing produces a [`Parsed`] mapping that the caller destructures; nothing is injected into the caller's scope.
//! * *Detailed yet basic UX*:
//! Errors name exactly which rule broke; the help listing renders every option with its aliases, required marker, and relation annotations.
//! We do not aim to support rich display configurations, such as colour output, shell completions, etc.
//!
//! # Usage
//! ```
//! use declarg::{arg, Parser};
//!
//! let mut parser = Parser::new("copy");
//! parser.str("source").required();
//! parser.str("destination").unspecified_default();
//! parser.int("jobs").shorthand('j').default(1).requires(arg("jobs").gt(0));
//! parser.flag("dry-run");
//! parser.flag("force").conflicts(arg("dry-run"));
//!
//! let parsed = parser
//!     .parse_tokens(vec!["--source", "a.txt", "b.txt", "-j", "4"].as_slice())
//!     .unwrap()
//!     .values();
//!
//! assert_eq!(parsed.string("source"), Some("a.txt"));
//! assert_eq!(parsed.string("destination"), Some("b.txt"));
//! assert_eq!(parsed.int("jobs"), Some(4));
//! assert!(!parsed.flag("force"));
//! ```
//!
//! In a real program, end with [`Parser::process`] instead of
//! [`Parser::parse_tokens`]: it reads the command line, renders any error (or
//! the help listing) and exits, returning the [`Parsed`] record only on
//! success.
//!
//! # Cli Semantics
//! `declarg` parses the command line tokens according to the following rules.
//! * A token prefixed with `--` (configurable via [`Parser::double_prefix`]) is a long option label; `-` ([`Parser::single_prefix`]) marks a one character shorthand.
//! * `name=value` tokens are split at the first `=` before routing; `--key=123` is equivalent to `--key 123`.
//! * Each option consumes following tokens per its kind: flags consume nothing, most options consume exactly one token, and `multiword`/`range` options consume greedily until the next label-looking token.
//! * A bare token (no prefix) routes to the option designated [`OptionMut::unspecified_default`], if any; otherwise it is recorded as an *extra* ([`Parsed::extras`]) - not an error.
//! * Repeating an option is an error unless it is declared [`OptionMut::multiple`], in which case the occurrences collect into a list in input order.
//! * The reserved `help` option (`--help`/`-h`, unless constructed via [`Parser::without_help`]) short-circuits processing before any validation.
//!
//! # Validation Semantics
//! After routing, defaults fill in and casts apply; the constraint relations
//! are then checked in a fixed order: custom per-option conditions, required
//! options (walking each replacement list), dependencies, conflicts.
//! The first violated rule aborts with its specific [`ArgumentError`].
//!
//! For every relation, an option reads as *specified* when its resolved value
//! is neither absent nor a boolean false - so an omitted flag and an omitted
//! string both read as unspecified, while an explicit `0` reads as specified.
//!
//! # Features
//! * `unit_test`: expose the in-memory/channel [`UserInterface`] implementations for testing.
//! * `tracing_debug`: emit `tracing` debug events from the parse pipeline.

mod api;
mod cast;
mod condition;
mod constant;
mod error;
mod model;
mod parser;
mod reader;
mod registry;
mod tokens;

pub use api::{Group, OptionMut, Parser};
pub use condition::{arg, Arg, Condition, Operand};
pub use error::ArgumentError;
pub use model::{Outcome, Parsed, Value};
pub use parser::UserInterface;

#[cfg(feature = "unit_test")]
pub use parser::{channel_interface, InMemoryInterface, ReceiverInterface, SenderInterface};
