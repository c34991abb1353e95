use std::env;

use crate::cast::Cast;
use crate::condition::Condition;
use crate::constant::{HELP_NAME, HELP_SHORT};
use crate::error::ArgumentError;
use crate::model::{Outcome, Parsed, Value};
use crate::parser::{ConsoleInterface, Engine, HelpEntry, Predicate, Printer, UserInterface};
use crate::reader::ReaderKind;
use crate::registry::Registry;
use crate::tokens::Prefixes;

type RelationTable = Vec<(String, Vec<Condition>)>;

/// The command line parser: an option registry plus the constraint relations
/// declared against it.
///
/// Configure during a setup phase (registration calls and chained
/// [`OptionMut`] configuration), then process one or more command lines.
/// The setup phase must complete before the first parse; the parse itself
/// holds no state across invocations.
///
/// Invalid setup (registering a name twice, referencing an unknown name in a
/// relation, binding an alias twice, a prefix superset) is a programmer bug
/// and panics at the offending call.
///
/// ### Example
/// ```
/// use declarg::{arg, Parser};
///
/// let mut parser = Parser::new("server");
/// parser.int("port").default(8080);
/// parser.str("host").requires(arg("port").gt(0));
/// parser.flag("verbose").shorthand('v');
///
/// let parsed = parser
///     .parse_tokens(vec!["--host", "localhost", "-v"].as_slice())
///     .unwrap()
///     .values();
///
/// assert_eq!(parsed.int("port"), Some(8080));
/// assert_eq!(parsed.string("host"), Some("localhost"));
/// assert!(parsed.flag("verbose"));
/// ```
pub struct Parser {
    program: String,
    about: Option<String>,
    registry: Registry,
    prefixes: Prefixes,
    required: RelationTable,
    requires: RelationTable,
    conflicts: RelationTable,
    predicates: Vec<(String, Vec<Predicate>)>,
    interface: Box<dyn UserInterface>,
    help_enabled: bool,
}

impl Parser {
    /// Create a parser with the reserved `--help`/`-h` flag registered.
    pub fn new(program: impl Into<String>) -> Self {
        let mut parser = Self::without_help(program);
        parser.flag(HELP_NAME).shorthand(HELP_SHORT);
        parser.help_enabled = true;
        parser
    }

    /// Create a parser without the reserved help flag.
    pub fn without_help(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            about: None,
            registry: Registry::default(),
            prefixes: Prefixes::default(),
            required: RelationTable::default(),
            requires: RelationTable::default(),
            conflicts: RelationTable::default(),
            predicates: Vec::default(),
            interface: Box::new(ConsoleInterface::default()),
            help_enabled: false,
        }
    }

    /// Replace the output sink through which help, usage, and error text flow.
    pub fn with_interface(mut self, interface: Box<dyn UserInterface>) -> Self {
        self.interface = interface;
        self
    }

    /// Text to appear before the argument listing in help output.
    /// If repeated, only the final text applies.
    pub fn about(&mut self, description: impl Into<String>) -> &mut Self {
        self.about.replace(description.into());
        self
    }

    /// Convert `-` to `_` in externally visible argument names.
    /// Applies to names registered from this point on, so enable it first.
    ///
    /// ### Example
    /// ```
    /// use declarg::Parser;
    ///
    /// let mut parser = Parser::new("program");
    /// parser.underscore();
    /// parser.int("block-size");
    ///
    /// let parsed = parser
    ///     .parse_tokens(vec!["--block-size", "512"].as_slice())
    ///     .unwrap()
    ///     .values();
    ///
    /// assert_eq!(parsed.int("block_size"), Some(512));
    /// ```
    pub fn underscore(&mut self) -> &mut Self {
        self.registry.underscore();
        self
    }

    /// Set the single prefix, which appears before shorthand labels (ex: `-a`).
    ///
    /// # Panics
    /// When the prefix would contain the double prefix.
    pub fn single_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.prefixes.set_single(prefix);
        self
    }

    /// Set the double prefix, which appears before full labels (ex: `--arg`).
    ///
    /// # Panics
    /// When the single prefix would contain the prefix.
    pub fn double_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.prefixes.set_double(prefix);
        self
    }

    // --- typed registration --- //

    fn add(&mut self, name: &str, kind: ReaderKind, cast: Option<Cast>) -> OptionMut<'_> {
        let canonical = self.registry.register(name, kind);

        if let Some(cast) = cast {
            self.registry.set_cast(&canonical, cast);
        }

        OptionMut {
            parser: self,
            name: canonical,
        }
    }

    /// Add a string option.
    pub fn str(&mut self, name: &str) -> OptionMut<'_> {
        self.add(name, ReaderKind::SingleWord, None)
    }

    /// Add an integer option.
    pub fn int(&mut self, name: &str) -> OptionMut<'_> {
        self.add(name, ReaderKind::SingleWord, Some(Cast::Int))
    }

    /// Add a float option.
    pub fn float(&mut self, name: &str) -> OptionMut<'_> {
        self.add(name, ReaderKind::SingleWord, Some(Cast::Float))
    }

    /// Add a flag option: presence indicates true, absence false.
    /// Consumes no value tokens.
    pub fn flag(&mut self, name: &str) -> OptionMut<'_> {
        self.add(name, ReaderKind::Flag, None)
    }

    /// Alias of [`flag`](Parser::flag).
    pub fn bool(&mut self, name: &str) -> OptionMut<'_> {
        self.flag(name)
    }

    /// Add an option that accepts multiple terms, consumed until the next
    /// label; the terms join with single spaces.
    ///
    /// ### Example
    /// ```
    /// use declarg::Parser;
    ///
    /// let mut parser = Parser::new("program");
    /// parser.multiword("title");
    ///
    /// let parsed = parser
    ///     .parse_tokens(vec!["--title", "path", "to", "something"].as_slice())
    ///     .unwrap()
    ///     .values();
    ///
    /// assert_eq!(parsed.string("title"), Some("path to something"));
    /// ```
    pub fn multiword(&mut self, name: &str) -> OptionMut<'_> {
        self.add(name, ReaderKind::MultiWord, None)
    }

    /// Add a range option, accepting `N`, `N:M`, `N-M`, and `N M S` forms and
    /// resolving to the half-open stepped integer sequence they denote.
    ///
    /// ### Example
    /// ```
    /// use declarg::{Parser, Value};
    ///
    /// let mut parser = Parser::new("program");
    /// parser.range("values");
    ///
    /// let parsed = parser
    ///     .parse_tokens(vec!["--values", "0", "9", "3"].as_slice())
    ///     .unwrap()
    ///     .values();
    ///
    /// assert_eq!(
    ///     parsed.list("values"),
    ///     Some([Value::Int(0), Value::Int(3), Value::Int(6)].as_slice())
    /// );
    /// ```
    pub fn range(&mut self, name: &str) -> OptionMut<'_> {
        self.add(name, ReaderKind::MultiWord, Some(Cast::Range))
    }

    /// Add an enumerated option restricted to `values`.
    pub fn choices(&mut self, name: &str, values: &[&str]) -> OptionMut<'_> {
        let allowed = values.iter().map(|value| value.to_string()).collect();
        self.add(name, ReaderKind::SingleWord, Some(Cast::Choices(allowed)))
    }

    /// Add a config-file option.
    ///
    /// The file holds line-oriented `key value` pairs (delimited by `=`, `:`
    /// or whitespace; `#` lines are comments) which provide values for any
    /// *other* registered option not given on the command line.
    /// Keys that are not registered options are ignored.
    /// Chain [`OptionMut::overwrite`] to let the file replace command line
    /// values instead.
    pub fn config(&mut self, name: &str) -> OptionMut<'_> {
        self.add(name, ReaderKind::SingleWord, Some(Cast::Config))
    }

    // --- aggregate relations --- //

    /// Require at least one of `names`.
    pub fn at_least_one(&mut self, names: &[&str]) -> Group {
        let members = self.group_members(names);

        for (current, name) in members.iter().enumerate() {
            let replacements: Vec<Condition> = members
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != current)
                .map(|(_, member)| Condition::satisfied(member.clone()))
                .collect();
            table_entry(&mut self.required, name).extend(replacements);
        }

        Group::new(members)
    }

    /// Require one and only one of `names`.
    ///
    /// ### Example
    /// ```
    /// use declarg::{ArgumentError, Parser};
    ///
    /// let mut parser = Parser::new("program");
    /// parser.flag("json");
    /// parser.flag("yaml");
    /// parser.require_one(&["json", "yaml"]);
    ///
    /// assert!(parser.parse_tokens(vec!["--json"].as_slice()).is_ok());
    /// assert!(matches!(
    ///     parser.parse_tokens(vec!["--json", "--yaml"].as_slice()),
    ///     Err(ArgumentError::Conflict { .. })
    /// ));
    /// assert!(matches!(
    ///     parser.parse_tokens(vec![].as_slice()),
    ///     Err(ArgumentError::ManyAllowedNoneSpecified(_))
    /// ));
    /// ```
    pub fn require_one(&mut self, names: &[&str]) -> Group {
        self.only_one_if_any(names);
        self.at_least_one(names)
    }

    /// If *any* of `names` is specified, then all of them must be.
    pub fn all_if_any(&mut self, names: &[&str]) -> Group {
        let members = self.group_members(names);

        for current in 0..members.len() {
            for other in 0..members.len() {
                if current != other {
                    table_entry(&mut self.requires, &members[current])
                        .push(Condition::satisfied(members[other].clone()));
                }
            }
        }

        Group::new(members)
    }

    /// If *any* of `names` is specified, then none of the remaining may be.
    pub fn only_one_if_any(&mut self, names: &[&str]) -> Group {
        let members = self.group_members(names);

        for current in 0..members.len() {
            for other in 0..members.len() {
                if current != other {
                    table_entry(&mut self.conflicts, &members[current])
                        .push(Condition::satisfied(members[other].clone()));
                }
            }
        }

        Group::new(members)
    }

    fn group_members(&self, names: &[&str]) -> Vec<String> {
        names
            .iter()
            .map(|name| {
                let canonical = self.registry.localize(name);
                self.registry.ensure_known(&canonical);
                canonical
            })
            .collect()
    }

    /// Localize every name inside `condition` and fail fast on unknowns.
    fn prepare(&self, condition: Condition) -> Condition {
        let registry = &self.registry;
        let condition = condition.localized(&|name: &str| registry.localize(name));

        for name in condition.referenced_names() {
            self.registry.ensure_known(&name);
        }

        condition
    }

    // --- processing --- //

    /// Run the pure parse pipeline against `tokens`.
    ///
    /// Never prints and never exits: a help request surfaces as
    /// [`Outcome::Help`], and every user-input problem as an
    /// [`ArgumentError`].
    pub fn parse_tokens(&self, tokens: &[&str]) -> Result<Outcome, ArgumentError> {
        let engine = Engine {
            registry: &self.registry,
            prefixes: &self.prefixes,
            required: &self.required,
            requires: &self.requires,
            conflicts: &self.conflicts,
            predicates: &self.predicates,
            help_enabled: self.help_enabled,
        };

        engine.run(tokens)
    }

    /// Process `tokens`, rendering help or errors through the user interface.
    ///
    /// A help request prints the help listing and returns `Err(0)`; an
    /// [`ArgumentError`] prints the error plus a usage summary and returns
    /// `Err(1)`.
    /// The `Err` carries the exit code for the caller to apply - nothing
    /// exits here, which is the embedding/testing seam.
    pub fn process_tokens(&self, tokens: &[&str]) -> Result<Parsed, i32> {
        match self.parse_tokens(tokens) {
            Ok(Outcome::Values(parsed)) => Ok(parsed),
            Ok(Outcome::Help) => {
                self.print_help();
                Err(0)
            }
            Err(error) => {
                self.interface.print_error(format!("Error: {error}"));
                self.printer()
                    .print_usage(&self.program, self.interface.as_ref());
                Err(1)
            }
        }
    }

    /// Process the command line ([`env::args`]), exiting the process on a
    /// help request (code `0`) or a user-input error (code `1`).
    pub fn process(&self) -> Parsed {
        let tokens: Vec<String> = env::args().skip(1).collect();
        let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();

        match self.process_tokens(tokens.as_slice()) {
            Ok(parsed) => parsed,
            Err(code) => std::process::exit(code),
        }
    }

    /// Print the help listing through the user interface.
    pub fn print_help(&self) {
        self.printer().print_help(self.interface.as_ref());
    }

    fn printer(&self) -> Printer {
        Printer::terminal(self.about.clone(), self.help_entries())
    }

    fn help_entries(&self) -> Vec<HelpEntry> {
        self.registry
            .specs()
            .map(|spec| {
                let mut label = format!(
                    "{}{}",
                    self.prefixes.double(),
                    self.registry.unlocalize(spec.name())
                );

                if let Some(alias) = self.registry.alias_of(spec.name()) {
                    label.push_str(&format!("/{}{alias}", self.prefixes.single()));
                }

                if spec.kind() != ReaderKind::Flag {
                    let type_label = spec.label().unwrap_or_else(|| spec.type_label());
                    label.push_str(&format!(" <{type_label}>"));
                }

                HelpEntry {
                    label,
                    required: self.required.iter().any(|(name, _)| name == spec.name()),
                    conflicts: rendered(&self.conflicts, spec.name()),
                    requires: rendered(&self.requires, spec.name()),
                }
            })
            .collect()
    }
}

fn rendered(table: &RelationTable, name: &str) -> Vec<String> {
    table
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, conditions)| {
            conditions
                .iter()
                .map(|condition| condition.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn table_entry<'t, T>(table: &'t mut Vec<(String, Vec<T>)>, name: &str) -> &'t mut Vec<T> {
    if let Some(position) = table.iter().position(|(key, _)| key == name) {
        return &mut table[position].1;
    }

    table.push((name.to_string(), Vec::default()));
    let last = table.len() - 1;
    &mut table[last].1
}

/// A chained-configuration handle onto one registered option.
/// Produced by the typed registration calls; each method returns the handle
/// for further chaining.
pub struct OptionMut<'p> {
    parser: &'p mut Parser,
    name: String,
}

impl OptionMut<'_> {
    /// The canonical (localized) name of this option.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Provide a default value, used when the option is unspecified.
    /// A string default runs through the option's cast at parse time.
    ///
    /// ### Example
    /// ```
    /// use declarg::Parser;
    ///
    /// let mut parser = Parser::new("program");
    /// parser.int("count").default(5);
    ///
    /// let parsed = parser.parse_tokens(vec![].as_slice()).unwrap().values();
    /// assert_eq!(parsed.int("count"), Some(5));
    /// ```
    pub fn default(self, value: impl Into<Value>) -> Self {
        self.parser.registry.set_default(&self.name, value.into());
        self
    }

    /// Bind a one character shorthand, labeled with the single prefix (`-a`).
    ///
    /// # Panics
    /// When `alias` is already bound to another option.
    pub fn shorthand(self, alias: char) -> Self {
        self.parser.registry.add_shorthand(&self.name, alias);
        self
    }

    /// Allow the option to be specified multiple times; the result becomes a
    /// list of every occurrence in input order.
    pub fn multiple(self) -> Self {
        self.parser.registry.set_multiple(&self.name);
        self
    }

    /// Replace the `<..>` token next to the option label in help output.
    pub fn label(self, text: impl Into<String>) -> Self {
        self.parser.registry.set_label(&self.name, text.into());
        self
    }

    /// Let this config option's file values replace command line values.
    ///
    /// # Panics
    /// When this option is not a config option.
    pub fn overwrite(self) -> Self {
        self.parser.registry.set_overwrite(&self.name);
        self
    }

    /// Provide a casting function for this option, applied to each raw value.
    pub fn cast<F>(self, cast: F) -> Self
    where
        F: Fn(&str) -> Result<Value, ArgumentError> + 'static,
    {
        self.parser
            .registry
            .set_cast(&self.name, Cast::Custom(Box::new(cast)));
        self
    }

    /// Indicate that this option is required.
    pub fn required(self) -> Self {
        table_entry(&mut self.parser.required, &self.name);
        self
    }

    /// This option is required whenever `condition` holds.
    pub fn required_if(self, condition: impl Into<Condition>) -> Self {
        let replacement = !self.parser.prepare(condition.into());
        table_entry(&mut self.parser.required, &self.name).push(replacement);
        self
    }

    /// This option is required unless `condition` holds.
    /// May be repeated; any satisfied replacement lifts the requirement.
    pub fn required_unless(self, condition: impl Into<Condition>) -> Self {
        let replacement = self.parser.prepare(condition.into());
        table_entry(&mut self.parser.required, &self.name).push(replacement);
        self
    }

    /// Specify a condition this option requires whenever it is itself
    /// specified.
    /// May be repeated; every declared condition must hold.
    pub fn requires(self, condition: impl Into<Condition>) -> Self {
        let condition = self.parser.prepare(condition.into());
        table_entry(&mut self.parser.requires, &self.name).push(condition);
        self
    }

    /// Specify a condition this option conflicts with.
    /// May be repeated.
    pub fn conflicts(self, condition: impl Into<Condition>) -> Self {
        let condition = self.parser.prepare(condition.into());
        table_entry(&mut self.parser.conflicts, &self.name).push(condition);
        self
    }

    /// Attach a custom predicate over the final parsed state; evaluated
    /// during validation, before the required/dependency/conflict checks.
    pub fn condition<F>(self, predicate: F) -> Self
    where
        F: Fn(&Parsed) -> bool + 'static,
    {
        let entry = table_entry(&mut self.parser.predicates, &self.name);
        entry.push(Box::new(predicate));
        self
    }

    /// Indicate that bare tokens (no label) are attributed to this option.
    ///
    /// # Panics
    /// When another option already holds the unspecified-default slot.
    pub fn unspecified_default(self) -> Self {
        self.parser.registry.set_unspecified_default(&self.name);
        self
    }
}

/// A named OR-aggregate of options, returned by the aggregate relation
/// helpers.
/// A group converts into a [`Condition`] that holds when any member is
/// specified, so it can stand wherever a condition can - as a `requires`,
/// `conflicts`, or `required_unless` target.
#[derive(Debug, Clone)]
pub struct Group {
    members: Vec<String>,
}

impl Group {
    fn new(members: Vec<String>) -> Self {
        Self { members }
    }

    /// The canonical member names.
    pub fn members(&self) -> &[String] {
        &self.members
    }
}

impl From<Group> for Condition {
    fn from(group: Group) -> Self {
        Condition::any_of(
            group
                .members
                .into_iter()
                .map(Condition::satisfied)
                .collect(),
        )
    }
}

impl From<&Group> for Condition {
    fn from(group: &Group) -> Self {
        Condition::from(group.clone())
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.members.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::arg;
    use crate::parser::channel_interface;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[test]
    fn at_least_one() {
        let mut parser = Parser::new("program");
        parser.flag("a");
        parser.flag("b");
        parser.flag("c");
        parser.at_least_one(&["a", "b", "c"]);

        assert!(parser.parse_tokens(vec!["--b"].as_slice()).is_ok());
        assert!(parser.parse_tokens(vec!["--a", "--c"].as_slice()).is_ok());

        let result = parser.parse_tokens(vec![].as_slice());
        assert_eq!(
            result.unwrap_err(),
            ArgumentError::ManyAllowedNoneSpecified(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string()
            ])
        );
    }

    #[test]
    fn only_one_if_any() {
        let mut parser = Parser::new("program");
        parser.flag("a");
        parser.flag("b");
        parser.flag("c");
        parser.only_one_if_any(&["a", "b", "c"]);

        assert!(parser.parse_tokens(vec![].as_slice()).is_ok());
        assert!(parser.parse_tokens(vec!["--b"].as_slice()).is_ok());

        let result = parser.parse_tokens(vec!["--a", "--c"].as_slice());
        assert_matches!(result, Err(ArgumentError::Conflict { .. }));
    }

    #[rstest]
    #[case(vec!["--a"], true)]
    #[case(vec!["--b"], true)]
    #[case(vec!["--c"], true)]
    #[case(vec!["--a", "--b"], false)]
    #[case(vec!["--a", "--c"], false)]
    #[case(vec![], false)]
    fn require_one(#[case] tokens: Vec<&str>, #[case] expected_ok: bool) {
        let mut parser = Parser::new("program");
        parser.flag("a");
        parser.flag("b");
        parser.flag("c");
        parser.require_one(&["a", "b", "c"]);

        assert_eq!(parser.parse_tokens(tokens.as_slice()).is_ok(), expected_ok);
    }

    #[rstest]
    #[case(vec![], true)]
    #[case(vec!["--a", "--b"], true)]
    #[case(vec!["--a"], false)]
    #[case(vec!["--b"], false)]
    fn all_if_any(#[case] tokens: Vec<&str>, #[case] expected_ok: bool) {
        let mut parser = Parser::new("program");
        parser.flag("a");
        parser.flag("b");
        parser.all_if_any(&["a", "b"]);

        assert_eq!(parser.parse_tokens(tokens.as_slice()).is_ok(), expected_ok);
    }

    #[test]
    fn group_as_condition() {
        let mut parser = Parser::new("program");
        parser.flag("a");
        parser.flag("b");
        let group = parser.only_one_if_any(&["a", "b"]);
        parser.flag("lonely").conflicts(&group);

        assert!(parser.parse_tokens(vec!["--lonely"].as_slice()).is_ok());

        let result = parser.parse_tokens(vec!["--lonely", "--b"].as_slice());
        assert_eq!(
            result.unwrap_err(),
            ArgumentError::Conflict {
                left: "lonely".to_string(),
                right: "a, b".to_string(),
            }
        );
    }

    #[test]
    fn group_as_replacement() {
        let mut parser = Parser::new("program");
        parser.flag("a");
        parser.flag("b");
        let group = parser.only_one_if_any(&["a", "b"]);
        parser.str("key").required_unless(&group);

        assert!(parser.parse_tokens(vec!["--a"].as_slice()).is_ok());
        assert!(parser.parse_tokens(vec!["--key", "x"].as_slice()).is_ok());

        let result = parser.parse_tokens(vec![].as_slice());
        assert_eq!(
            result.unwrap_err(),
            ArgumentError::ManyAllowedNoneSpecified(vec![
                "a".to_string(),
                "b".to_string(),
                "key".to_string()
            ])
        );
    }

    #[test]
    #[should_panic(expected = "not known")]
    fn relation_against_unknown_name() {
        let mut parser = Parser::new("program");
        parser.str("known").requires(arg("unknown"));
    }

    #[test]
    #[should_panic(expected = "not known")]
    fn aggregate_against_unknown_name() {
        let mut parser = Parser::new("program");
        parser.flag("a");
        parser.at_least_one(&["a", "moot"]);
    }

    #[test]
    #[should_panic(expected = "multiple types specified")]
    fn duplicate_registration() {
        let mut parser = Parser::new("program");
        parser.int("item");
        parser.str("item");
    }

    #[test]
    fn relations_localize() {
        let mut parser = Parser::new("program");
        parser.underscore();
        parser.flag("dry-run");
        parser.str("log-file").requires(arg("dry-run"));

        let result = parser.parse_tokens(vec!["--log-file", "x"].as_slice());

        assert_eq!(
            result.unwrap_err(),
            ArgumentError::Dependency {
                option: "log_file".to_string(),
                dependency: "dry_run".to_string(),
            }
        );
    }

    #[test]
    fn choices_restrict_values() {
        let mut parser = Parser::new("program");
        parser.choices("fruit", &["apple", "banana"]);

        let parsed = parser
            .parse_tokens(vec!["--fruit", "apple"].as_slice())
            .unwrap()
            .values();
        assert_eq!(parsed.string("fruit"), Some("apple"));

        let result = parser.parse_tokens(vec!["--fruit", "carrot"].as_slice());
        assert_matches!(result, Err(ArgumentError::Format(_)));
    }

    #[test]
    fn custom_cast() {
        let mut parser = Parser::new("program");
        parser.str("doubled").cast(|raw| {
            raw.parse::<i64>()
                .map(|number| Value::Int(number * 2))
                .map_err(|_| ArgumentError::Format(format!("cannot cast '{raw}' to int.")))
        });

        let parsed = parser
            .parse_tokens(vec!["--doubled", "4"].as_slice())
            .unwrap()
            .values();

        assert_eq!(parsed.int("doubled"), Some(8));
    }

    #[test]
    fn process_tokens_values() {
        let (sender, receiver) = channel_interface();
        let mut parser = Parser::new("program").with_interface(Box::new(sender));
        parser.int("count");

        let parsed = parser.process_tokens(vec!["--count", "5"].as_slice()).unwrap();

        assert_eq!(parsed.int("count"), Some(5));
        drop(parser);
        let (message, error) = receiver.consume();
        assert_eq!(message, None);
        assert_eq!(error, None);
    }

    #[test]
    fn process_tokens_help() {
        let (sender, receiver) = channel_interface();
        let mut parser = Parser::new("program").with_interface(Box::new(sender));
        parser.about("My program.");
        parser.int("count").shorthand('c').required();

        let code = parser.process_tokens(vec!["--help"].as_slice()).unwrap_err();

        assert_eq!(code, 0);
        drop(parser);
        let message = receiver.consume_message();
        assert!(message.contains("My program."));
        assert!(message.contains("--help/-h"));
        assert!(message.contains("!  --count/-c <int>"));
    }

    #[test]
    fn process_tokens_error() {
        let (sender, receiver) = channel_interface();
        let mut parser = Parser::new("program").with_interface(Box::new(sender));
        parser.int("count").required();

        let code = parser.process_tokens(vec![].as_slice()).unwrap_err();

        assert_eq!(code, 1);
        drop(parser);
        let (message, error) = receiver.consume();
        assert_eq!(message, None);
        let error = error.unwrap();
        assert!(error.contains("Error: no value passed for 'count'."));
        assert!(error.contains("usage: program"));
        assert!(error.contains("[--count <int>]"));
    }

    #[test]
    fn help_label_shows_original_spelling() {
        let (sender, receiver) = channel_interface();
        let mut parser = Parser::new("program").with_interface(Box::new(sender));
        parser.underscore();
        parser.str("log-file");

        let code = parser.process_tokens(vec!["-h"].as_slice()).unwrap_err();

        assert_eq!(code, 0);
        drop(parser);
        let message = receiver.consume_message();
        assert!(message.contains("--log-file <option>"));
    }

    #[test]
    fn custom_label() {
        let (sender, receiver) = channel_interface();
        let mut parser = Parser::new("program").with_interface(Box::new(sender));
        parser.str("out").label("FILE");

        parser.process_tokens(vec!["--help"].as_slice()).unwrap_err();

        drop(parser);
        let message = receiver.consume_message();
        assert!(message.contains("--out <FILE>"));
    }
}
