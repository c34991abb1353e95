use crate::constant::*;

/// The label grammar: a double prefix (default `--`) marks a long option name,
/// a single prefix (default `-`) marks a one character shorthand.
#[derive(Debug, Clone)]
pub(crate) struct Prefixes {
    single: String,
    double: String,
}

impl Default for Prefixes {
    fn default() -> Self {
        Self {
            single: SINGLE_PREFIX.to_string(),
            double: DOUBLE_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LabelKind {
    Long,
    Short,
}

impl Prefixes {
    /// # Panics
    /// When `prefix` would contain the double prefix, making every long label
    /// ambiguous.
    pub(crate) fn set_single(&mut self, prefix: impl Into<String>) {
        let prefix = prefix.into();

        if prefix.contains(&self.double) {
            panic!("the single prefix cannot be a superset of the double prefix");
        }

        self.single = prefix;
    }

    /// # Panics
    /// When the single prefix would contain `prefix`, making every long label
    /// ambiguous.
    pub(crate) fn set_double(&mut self, prefix: impl Into<String>) {
        let prefix = prefix.into();

        if self.single.contains(&prefix) {
            panic!("the single prefix cannot be a superset of the double prefix");
        }

        self.double = prefix;
    }

    pub(crate) fn is_label(&self, token: &str) -> bool {
        token.starts_with(&self.single) || token.starts_with(&self.double)
    }

    /// Strip the label prefix off `token`; the double prefix wins when both match.
    pub(crate) fn strip<'t>(&self, token: &'t str) -> Option<(LabelKind, &'t str)> {
        if let Some(stripped) = token.strip_prefix(&self.double) {
            return Some((LabelKind::Long, stripped));
        }

        if let Some(stripped) = token.strip_prefix(&self.single) {
            return Some((LabelKind::Short, stripped));
        }

        None
    }

    pub(crate) fn single(&self) -> &str {
        &self.single
    }

    pub(crate) fn double(&self) -> &str {
        &self.double
    }
}

/// Split every `name=value` token into two tokens at the first `=`.
pub(crate) fn tokenize(args: &[&str]) -> Vec<String> {
    let mut tokens = Vec::default();

    for arg in args {
        match arg.split_once('=') {
            Some((name, value)) => {
                tokens.push(name.to_string());
                tokens.push(value.to_string());
            }
            None => tokens.push(arg.to_string()),
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec!["--key", "value"], vec!["--key", "value"])]
    #[case(vec!["--key=value"], vec!["--key", "value"])]
    #[case(vec!["-k=value"], vec!["-k", "value"])]
    #[case(vec!["--key=a=b"], vec!["--key", "a=b"])]
    #[case(vec!["--key="], vec!["--key", ""])]
    fn tokenize_splits(#[case] args: Vec<&str>, #[case] expected: Vec<&str>) {
        assert_eq!(tokenize(args.as_slice()), expected);
    }

    #[rstest]
    #[case("--key", Some((LabelKind::Long, "key")))]
    #[case("-k", Some((LabelKind::Short, "k")))]
    #[case("key", None)]
    #[case("--", Some((LabelKind::Long, "")))]
    fn strip(#[case] token: &str, #[case] expected: Option<(LabelKind, &str)>) {
        let prefixes = Prefixes::default();

        assert_eq!(prefixes.strip(token), expected);
    }

    #[test]
    fn custom_prefixes() {
        let mut prefixes = Prefixes::default();
        prefixes.set_double("++");
        prefixes.set_single("+");

        assert_eq!(prefixes.strip("++key"), Some((LabelKind::Long, "key")));
        assert_eq!(prefixes.strip("+k"), Some((LabelKind::Short, "k")));
        assert_eq!(prefixes.strip("--key"), None);
        assert!(prefixes.is_label("+k"));
        assert!(!prefixes.is_label("k"));
    }

    #[test]
    #[should_panic(expected = "superset")]
    fn single_superset_of_double() {
        let mut prefixes = Prefixes::default();
        prefixes.set_single("---");
    }

    #[test]
    #[should_panic(expected = "superset")]
    fn double_subset_of_single() {
        let mut prefixes = Prefixes::default();
        prefixes.set_single("++");
        prefixes.set_double("+");
    }
}
