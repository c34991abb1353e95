use std::collections::HashMap;

use crate::condition::Condition;
use crate::constant::HELP_NAME;
use crate::error::ArgumentError;
use crate::model::{Outcome, Parsed, Value};
use crate::reader::{Reader, ReaderKind};
use crate::registry::Registry;
use crate::tokens::{tokenize, LabelKind, Prefixes};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// A custom per-option predicate over the final parsed state.
pub(crate) type Predicate = Box<dyn Fn(&Parsed) -> bool>;

/// One invocation of the parse pipeline, borrowing the process-wide setup
/// (registry, relation tables) and owning nothing across calls.
pub(crate) struct Engine<'p> {
    pub(crate) registry: &'p Registry,
    pub(crate) prefixes: &'p Prefixes,
    pub(crate) required: &'p [(String, Vec<Condition>)],
    pub(crate) requires: &'p [(String, Vec<Condition>)],
    pub(crate) conflicts: &'p [(String, Vec<Condition>)],
    pub(crate) predicates: &'p [(String, Vec<Predicate>)],
    pub(crate) help_enabled: bool,
}

/// Per-invocation routing state: reader occurrences per canonical name, plus
/// the unrouted extras.
struct Routed {
    occurrences: HashMap<String, Vec<Reader>>,
    extras: Vec<String>,
}

impl Engine<'_> {
    pub(crate) fn run(&self, args: &[&str]) -> Result<Outcome, ArgumentError> {
        let tokens = tokenize(args);
        let routed = self.route(&tokens)?;

        if self.help_enabled && routed.occurrences.contains_key(HELP_NAME) {
            // Deliberate short-circuit: help bypasses every validation check.
            return Ok(Outcome::Help);
        }

        self.check_multiple(&routed)?;
        let parsed = self.assign(routed)?;
        self.verify(&parsed)?;

        Ok(Outcome::Values(parsed))
    }

    /// Dispatch each token to a reader: the active reader's continuation, a
    /// new label, the unspecified-default slot, or the extras.
    fn route(&self, tokens: &[String]) -> Result<Routed, ArgumentError> {
        let mut occurrences: HashMap<String, Vec<Reader>> = HashMap::default();
        let mut extras = Vec::default();
        let mut active: Option<(String, Reader)> = None;

        for token in tokens {
            if let Some((_, reader)) = active.as_mut() {
                if reader.consume_or_skip(token, self.prefixes) {
                    continue;
                }
            }

            // Either no reader is active, or it declined the token; close the
            // occurrence and re-dispatch the token below.
            if let Some((name, reader)) = active.take() {
                occurrences.entry(name).or_default().push(reader);
            }

            if let Some((kind, stripped)) = self.prefixes.strip(token) {
                let canonical = self.resolve_label(kind, stripped)?;
                let spec = self
                    .registry
                    .get(&canonical)
                    .expect("resolved labels are registered");

                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Routing label '{token}' to '{canonical}'.");
                }

                active = Some((canonical, Reader::new(spec.kind())));
            } else if let Some(slot) = self.registry.unspecified_default() {
                let mut reader = Reader::new(ReaderKind::SingleWord);
                reader.consume_or_skip(token, self.prefixes);
                active = Some((slot.to_string(), reader));
            } else {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Recording extra token '{token}'.");
                }

                extras.push(token.clone());
            }
        }

        if let Some((name, reader)) = active.take() {
            occurrences.entry(name).or_default().push(reader);
        }

        Ok(Routed {
            occurrences,
            extras,
        })
    }

    fn resolve_label(&self, kind: LabelKind, stripped: &str) -> Result<String, ArgumentError> {
        match kind {
            LabelKind::Long => {
                let canonical = self.registry.localize(stripped);

                if self.registry.contains(&canonical) {
                    Ok(canonical)
                } else {
                    Err(ArgumentError::Unspecified(canonical))
                }
            }
            LabelKind::Short => {
                let mut characters = stripped.chars();

                match (characters.next(), characters.next()) {
                    (Some(alias), None) => match self.registry.resolve_alias(alias) {
                        Some(source) => Ok(source.to_string()),
                        None => Err(ArgumentError::Unspecified(stripped.to_string())),
                    },
                    _ => Err(ArgumentError::Unspecified(stripped.to_string())),
                }
            }
        }
    }

    /// Repeated occurrences require an explicit `multiple()` declaration.
    fn check_multiple(&self, routed: &Routed) -> Result<(), ArgumentError> {
        for spec in self.registry.specs() {
            if let Some(readers) = routed.occurrences.get(spec.name()) {
                if readers.len() > 1 && !spec.multiple() {
                    return Err(ArgumentError::MultipleSpecified(spec.name().to_string()));
                }
            }
        }

        Ok(())
    }

    /// Combine command line readers with declared defaults and config files
    /// into the final cast value per option.
    fn assign(&self, routed: Routed) -> Result<Parsed, ArgumentError> {
        let Routed {
            occurrences,
            extras,
        } = routed;
        let mut values: HashMap<String, Option<Value>> = HashMap::default();

        // Defaults for everything unspecified; declared defaults run through
        // the cast like any other value (typed defaults pass through).
        for spec in self.registry.specs() {
            if !occurrences.contains_key(spec.name()) {
                let value = match spec
                    .default()
                    .cloned()
                    .or_else(|| spec.kind().class_default())
                {
                    Some(value) => Some(spec.apply_cast(value)?),
                    None => None,
                };
                values.insert(spec.name().to_string(), value);
            }
        }

        // Command line values, cast.
        for spec in self.registry.specs() {
            let readers = match occurrences.get(spec.name()) {
                Some(readers) => readers,
                None => continue,
            };
            let read = |reader: &Reader| {
                reader
                    .value()
                    .ok_or_else(|| ArgumentError::MissingValue(spec.name().to_string()))
            };

            let value = if spec.is_config() {
                // The config option itself resolves to its path; the file's
                // contents are merged below.
                read(&readers[0])?
            } else if spec.multiple() {
                let mut items = Vec::default();

                for reader in readers {
                    items.push(spec.apply_cast(read(reader)?)?);
                }

                Value::List(items)
            } else {
                spec.apply_cast(read(&readers[0])?)?
            };

            values.insert(spec.name().to_string(), Some(value));
        }

        // Config file values, cast through the target option's cast.
        for (name, value, overwrite) in self.config_pairs(&occurrences)? {
            if occurrences.contains_key(&name) && !overwrite {
                continue;
            }

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Merging config value '{value}' into '{name}'.");
            }

            let spec = self.registry.get(&name).expect("config keys are filtered");
            let cast = spec.apply_cast(Value::Str(value))?;
            values.insert(name, Some(cast));
        }

        Ok(Parsed::new(values, extras))
    }

    /// The (target, raw value, overwrite) triples drawn from every config
    /// option specified on the command line, filtered down to registered
    /// non-config targets.
    fn config_pairs(
        &self,
        occurrences: &HashMap<String, Vec<Reader>>,
    ) -> Result<Vec<(String, String, bool)>, ArgumentError> {
        let mut pairs = Vec::default();

        for spec in self.registry.specs() {
            if !spec.is_config() {
                continue;
            }

            let path = match occurrences.get(spec.name()).and_then(|readers| {
                readers
                    .first()
                    .and_then(Reader::value)
            }) {
                Some(Value::Str(path)) => path,
                _ => continue,
            };

            for (key, value) in crate::cast::read_config(&path)? {
                let key = self.registry.localize(&key);
                let target = match self.registry.get(&key) {
                    Some(target) if !target.is_config() => target,
                    // Keys that are not created as arguments are ignored.
                    _ => continue,
                };

                pairs.push((target.name().to_string(), value, spec.overwrite()));
            }
        }

        Ok(pairs)
    }

    /// The fixed-order validation pass: custom conditions, required-ness,
    /// dependencies, conflicts.
    /// The first failing check aborts with its specific error.
    fn verify(&self, parsed: &Parsed) -> Result<(), ArgumentError> {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Verifying parsed state.");
        }

        for (name, predicates) in self.predicates {
            for predicate in predicates {
                if !predicate(parsed) {
                    return Err(ArgumentError::FailedCondition(name.clone()));
                }
            }
        }

        for (name, replacements) in self.required {
            if parsed.specifies(name) {
                continue;
            }

            if replacements
                .iter()
                .any(|replacement| replacement.is_satisfied(parsed))
            {
                continue;
            }

            if replacements.is_empty() {
                return Err(ArgumentError::MissingRequired(name.clone()));
            }

            let mut allowed = vec![name.clone()];

            for replacement in replacements {
                allowed.extend(replacement.allowed_names());
            }

            allowed.sort();
            return Err(ArgumentError::ManyAllowedNoneSpecified(allowed));
        }

        for (name, dependencies) in self.requires {
            if !parsed.specifies(name) {
                continue;
            }

            for dependency in dependencies {
                if !dependency.is_satisfied(parsed) {
                    return Err(match dependency.as_plain_option() {
                        Some(option) => ArgumentError::Dependency {
                            option: name.clone(),
                            dependency: option.to_string(),
                        },
                        None => ArgumentError::Condition {
                            option: name.clone(),
                            condition: dependency.to_string(),
                        },
                    });
                }
            }
        }

        for (name, conflicts) in self.conflicts {
            if !parsed.specifies(name) {
                continue;
            }

            for conflict in conflicts {
                if conflict.is_satisfied(parsed) {
                    return Err(ArgumentError::Conflict {
                        left: name.clone(),
                        right: conflict.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Parser;
    use crate::condition::arg;
    use assert_matches::assert_matches;
    use rstest::rstest;

    fn values(parser: &Parser, tokens: Vec<&str>) -> Parsed {
        parser.parse_tokens(tokens.as_slice()).unwrap().values()
    }

    #[test]
    fn defaults_fill() {
        let mut parser = Parser::new("program");
        parser.int("count").default(5);
        parser.str("name");
        parser.flag("verbose");

        let parsed = values(&parser, vec![]);

        assert_eq!(parsed.int("count"), Some(5));
        assert_eq!(parsed.get("name"), None);
        assert!(!parsed.flag("verbose"));
    }

    #[test]
    fn specified_beats_default() {
        let mut parser = Parser::new("program");
        parser.int("count").default(5);

        let parsed = values(&parser, vec!["--count", "6"]);

        assert_eq!(parsed.int("count"), Some(6));
    }

    #[rstest]
    #[case(vec!["--count", "6"], 6)]
    #[case(vec!["--count=6"], 6)]
    #[case(vec!["-c", "7"], 7)]
    #[case(vec!["-c=7"], 7)]
    fn label_forms(#[case] tokens: Vec<&str>, #[case] expected: i64) {
        let mut parser = Parser::new("program");
        parser.int("count").shorthand('c');

        let parsed = values(&parser, tokens);

        assert_eq!(parsed.int("count"), Some(expected));
    }

    #[test]
    fn unknown_label() {
        let parser = Parser::new("program");

        let result = parser.parse_tokens(vec!["--moot"].as_slice());

        assert_eq!(
            result.unwrap_err(),
            ArgumentError::Unspecified("moot".to_string())
        );
    }

    #[test]
    fn unknown_shorthand() {
        let parser = Parser::new("program");

        let result = parser.parse_tokens(vec!["-m"].as_slice());

        assert_eq!(
            result.unwrap_err(),
            ArgumentError::Unspecified("m".to_string())
        );
    }

    #[test]
    fn missing_value() {
        let mut parser = Parser::new("program");
        parser.int("count");

        let result = parser.parse_tokens(vec!["--count"].as_slice());

        assert_eq!(
            result.unwrap_err(),
            ArgumentError::MissingValue("count".to_string())
        );
    }

    #[test]
    fn format_error() {
        let mut parser = Parser::new("program");
        parser.int("count");

        let result = parser.parse_tokens(vec!["--count", "4.2"].as_slice());

        assert_matches!(result, Err(ArgumentError::Format(_)));
    }

    #[test]
    fn multiple_without_declaration() {
        let mut parser = Parser::new("program");
        parser.int("count");

        let result = parser.parse_tokens(vec!["--count", "1", "--count", "2"].as_slice());

        assert_eq!(
            result.unwrap_err(),
            ArgumentError::MultipleSpecified("count".to_string())
        );
    }

    #[test]
    fn multiple_accumulates_in_order() {
        let mut parser = Parser::new("program");
        parser.int("count").multiple();

        let parsed = values(&parser, vec!["--count", "1", "--count", "2"]);

        assert_eq!(
            parsed.list("count"),
            Some([Value::Int(1), Value::Int(2)].as_slice())
        );
    }

    #[test]
    fn multiple_single_occurrence_is_still_a_list() {
        let mut parser = Parser::new("program");
        parser.str("item").multiple();

        let parsed = values(&parser, vec!["--item", "only"]);

        assert_eq!(
            parsed.list("item"),
            Some([Value::Str("only".to_string())].as_slice())
        );
    }

    #[test]
    fn multiword_consumes_until_label() {
        let mut parser = Parser::new("program");
        parser.multiword("path");
        parser.flag("verbose");

        let parsed = values(&parser, vec!["--path", "a", "b", "c", "--verbose"]);

        assert_eq!(parsed.string("path"), Some("a b c"));
        assert!(parsed.flag("verbose"));
    }

    #[test]
    fn unspecified_default_slot() {
        let mut parser = Parser::new("program");
        parser.str("target").unspecified_default();
        parser.flag("verbose");

        let parsed = values(&parser, vec!["somewhere", "--verbose"]);

        assert_eq!(parsed.string("target"), Some("somewhere"));
        assert!(parsed.flag("verbose"));
        assert!(parsed.extras().is_empty());
    }

    #[test]
    fn unspecified_default_slot_repeated() {
        let mut parser = Parser::new("program");
        parser.str("target").unspecified_default();

        let result = parser.parse_tokens(vec!["one", "two"].as_slice());

        assert_eq!(
            result.unwrap_err(),
            ArgumentError::MultipleSpecified("target".to_string())
        );
    }

    #[test]
    fn extras_are_not_an_error() {
        let mut parser = Parser::new("program");
        parser.flag("verbose");

        let parsed = values(&parser, vec!["left", "--verbose", "over"]);

        assert_eq!(
            parsed.extras(),
            ["left".to_string(), "over".to_string()].as_slice()
        );
    }

    #[test]
    fn extras_do_not_leak_across_invocations() {
        let mut parser = Parser::new("program");
        parser.flag("verbose");

        let first = values(&parser, vec!["left"]);
        assert_eq!(first.extras(), ["left".to_string()].as_slice());

        let second = values(&parser, vec![]);
        assert!(second.extras().is_empty());
    }

    #[rstest]
    #[case(vec!["--help"])]
    #[case(vec!["-h"])]
    fn help_short_circuits_validation(#[case] tokens: Vec<&str>) {
        let mut parser = Parser::new("program");
        parser.int("count").required();

        // The required check would fail, but help wins.
        let outcome = parser.parse_tokens(tokens.as_slice()).unwrap();

        assert_eq!(outcome, Outcome::Help);
    }

    #[test]
    fn required_missing() {
        let mut parser = Parser::new("program");
        parser.int("count").required();

        let result = parser.parse_tokens(vec![].as_slice());

        assert_eq!(
            result.unwrap_err(),
            ArgumentError::MissingRequired("count".to_string())
        );
    }

    #[test]
    fn required_unless_replacement_satisfied() {
        let mut parser = Parser::new("program");
        parser.str("fallback");
        parser.str("primary").required_unless(arg("fallback"));

        let result = parser.parse_tokens(vec!["--fallback", "x"].as_slice());
        assert!(result.is_ok());

        let result = parser.parse_tokens(vec![].as_slice());
        assert_eq!(
            result.unwrap_err(),
            ArgumentError::ManyAllowedNoneSpecified(vec![
                "fallback".to_string(),
                "primary".to_string()
            ])
        );
    }

    #[test]
    fn required_if_condition() {
        let mut parser = Parser::new("program");
        parser.int("count");
        parser.str("label").required_if(arg("count").gt(10));

        assert!(parser.parse_tokens(vec!["--count", "5"].as_slice()).is_ok());
        assert!(parser
            .parse_tokens(vec!["--count", "11", "--label", "big"].as_slice())
            .is_ok());

        let result = parser.parse_tokens(vec!["--count", "11"].as_slice());
        assert_matches!(result, Err(ArgumentError::ManyAllowedNoneSpecified(_)));
    }

    #[test]
    fn dependency_error_names_the_plain_option() {
        let mut parser = Parser::new("program");
        parser.str("base");
        parser.str("dependent").requires(arg("base"));

        let result = parser.parse_tokens(vec!["--dependent", "x"].as_slice());

        assert_eq!(
            result.unwrap_err(),
            ArgumentError::Dependency {
                option: "dependent".to_string(),
                dependency: "base".to_string(),
            }
        );
    }

    #[test]
    fn condition_error_renders_the_relation() {
        let mut parser = Parser::new("program");
        parser.int("count");
        parser.str("dependent").requires(arg("count").ge(2));

        let result = parser.parse_tokens(vec!["--dependent", "x", "--count", "1"].as_slice());

        assert_eq!(
            result.unwrap_err(),
            ArgumentError::Condition {
                option: "dependent".to_string(),
                condition: "count >= 2".to_string(),
            }
        );
    }

    #[test]
    fn dependency_met() {
        let mut parser = Parser::new("program");
        parser.str("base");
        parser.str("dependent").requires(arg("base"));

        let parsed = values(&parser, vec!["--dependent", "x", "--base", "y"]);

        assert_eq!(parsed.string("dependent"), Some("x"));
    }

    #[test]
    fn dependency_on_defaulted_value() {
        // A default participates in condition evaluation like any other value.
        let mut parser = Parser::new("program");
        parser.int("count").default(3);
        parser.str("dependent").requires(arg("count").ge(2));

        assert!(parser
            .parse_tokens(vec!["--dependent", "x"].as_slice())
            .is_ok());
    }

    #[test]
    fn conflict_error() {
        let mut parser = Parser::new("program");
        parser.flag("left");
        parser.flag("right").conflicts(arg("left"));

        let result = parser.parse_tokens(vec!["--right", "--left"].as_slice());

        assert_eq!(
            result.unwrap_err(),
            ArgumentError::Conflict {
                left: "right".to_string(),
                right: "left".to_string(),
            }
        );
    }

    #[test]
    fn conflict_requires_both_satisfied() {
        let mut parser = Parser::new("program");
        parser.flag("left");
        parser.flag("right").conflicts(arg("left"));

        assert!(parser.parse_tokens(vec!["--right"].as_slice()).is_ok());
        assert!(parser.parse_tokens(vec!["--left"].as_slice()).is_ok());
    }

    #[test]
    fn custom_predicate() {
        let mut parser = Parser::new("program");
        parser
            .int("count")
            .condition(|parsed| parsed.int("count").map(|count| count % 2 == 0).unwrap_or(true));

        assert!(parser.parse_tokens(vec!["--count", "4"].as_slice()).is_ok());

        let result = parser.parse_tokens(vec!["--count", "3"].as_slice());
        assert_eq!(
            result.unwrap_err(),
            ArgumentError::FailedCondition("count".to_string())
        );
    }

    #[test]
    fn validation_order_custom_condition_before_required() {
        let mut parser = Parser::new("program");
        parser.int("count").required().condition(|_| false);

        let result = parser.parse_tokens(vec![].as_slice());

        assert_eq!(
            result.unwrap_err(),
            ArgumentError::FailedCondition("count".to_string())
        );
    }

    #[test]
    fn validation_order_required_before_dependency() {
        let mut parser = Parser::new("program");
        parser.str("base");
        parser.str("dependent").requires(arg("base"));
        parser.str("needed").required();

        let result = parser.parse_tokens(vec!["--dependent", "x"].as_slice());

        assert_eq!(
            result.unwrap_err(),
            ArgumentError::MissingRequired("needed".to_string())
        );
    }

    #[test]
    fn localized_labels_parse() {
        let mut parser = Parser::new("program");
        parser.underscore();
        parser.int("multi-part-name");

        let parsed = values(&parser, vec!["--multi-part-name", "5"]);

        assert_eq!(parsed.int("multi_part_name"), Some(5));
    }

    #[test]
    fn config_file_populates_unseen_keys() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# settings").unwrap();
        writeln!(file, "count = 5").unwrap();
        writeln!(file, "name: five").unwrap();
        writeln!(file, "ignored true").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let mut parser = Parser::new("program");
        parser.int("count");
        parser.str("name");
        parser.config("conf");

        let parsed = values(&parser, vec!["--conf", path.as_str()]);

        assert_eq!(parsed.int("count"), Some(5));
        assert_eq!(parsed.string("name"), Some("five"));
        assert_eq!(parsed.string("conf"), Some(path.as_str()));
    }

    #[test]
    fn config_file_does_not_overwrite_command_line() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "count = 5").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let mut parser = Parser::new("program");
        parser.int("count");
        parser.config("conf");

        let parsed = values(&parser, vec!["--count", "9", "--conf", path.as_str()]);

        assert_eq!(parsed.int("count"), Some(9));
    }

    #[test]
    fn config_file_overwrite_mode() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "count = 5").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let mut parser = Parser::new("program");
        parser.int("count");
        parser.config("conf").overwrite();

        let parsed = values(&parser, vec!["--count", "9", "--conf", path.as_str()]);

        assert_eq!(parsed.int("count"), Some(5));
    }

    #[test]
    fn config_file_unreadable() {
        let mut parser = Parser::new("program");
        parser.int("count");
        parser.config("conf");

        let result = parser.parse_tokens(vec!["--conf", "/definitely/not/here"].as_slice());

        assert_matches!(result, Err(ArgumentError::Format(_)));
    }

    #[test]
    fn config_values_are_cast() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "count = x5").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let mut parser = Parser::new("program");
        parser.int("count");
        parser.config("conf");

        let result = parser.parse_tokens(vec!["--conf", path.as_str()].as_slice());

        assert_matches!(result, Err(ArgumentError::Format(_)));
    }
}
