use crate::model::{Parsed, Value};

/// Reference an option by name when building a [`Condition`].
///
/// ### Example
/// ```
/// use declarg::arg;
///
/// let bounded = arg("count").gt(0).and_(arg("count").lt(10));
/// let either = arg("input").le(arg("output")).or_(arg("stdin"));
/// ```
pub fn arg(name: impl Into<String>) -> Arg {
    Arg(name.into())
}

/// A by-name reference to a registered option.
/// Build one with [`arg`]; it converts into a satisfied-check [`Condition`],
/// into a comparison via the relational methods, or into a comparison
/// [`Operand`].
#[derive(Debug, Clone)]
pub struct Arg(String);

impl Arg {
    /// Condition: this option's resolved value is less than `other`.
    pub fn lt(self, other: impl Into<Operand>) -> Condition {
        Condition::comparison(self.0, Relation::Lt, other.into())
    }

    /// Condition: this option's resolved value is at most `other`.
    pub fn le(self, other: impl Into<Operand>) -> Condition {
        Condition::comparison(self.0, Relation::Le, other.into())
    }

    /// Condition: this option's resolved value is greater than `other`.
    pub fn gt(self, other: impl Into<Operand>) -> Condition {
        Condition::comparison(self.0, Relation::Gt, other.into())
    }

    /// Condition: this option's resolved value is at least `other`.
    pub fn ge(self, other: impl Into<Operand>) -> Condition {
        Condition::comparison(self.0, Relation::Ge, other.into())
    }

    /// Condition: this option's resolved value equals `other`.
    pub fn eq(self, other: impl Into<Operand>) -> Condition {
        Condition::comparison(self.0, Relation::Eq, other.into())
    }

    /// Condition: this option's resolved value differs from `other`.
    pub fn ne(self, other: impl Into<Operand>) -> Condition {
        Condition::comparison(self.0, Relation::Ne, other.into())
    }
}

/// The right-hand side of a relational comparison: either a constant, or
/// another option whose runtime value is resolved at evaluation time.
#[derive(Debug, Clone)]
pub enum Operand {
    /// A constant value.
    Constant(Value),
    /// Another option, by name.
    Option(String),
}

impl From<Arg> for Operand {
    fn from(reference: Arg) -> Self {
        Operand::Option(reference.0)
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Constant(value)
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Operand::Constant(Value::from(value))
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Constant(Value::from(value))
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Constant(Value::from(value))
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Constant(Value::from(value))
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Constant(Value::from(value))
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Constant(Value::from(value))
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Constant(value) => write!(f, "{value}"),
            Operand::Option(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relation {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Relation {
    fn holds(&self, ordering: std::cmp::Ordering) -> bool {
        match self {
            Relation::Lt => ordering.is_lt(),
            Relation::Le => ordering.is_le(),
            Relation::Gt => ordering.is_gt(),
            Relation::Ge => ordering.is_ge(),
            Relation::Eq => ordering.is_eq(),
            Relation::Ne => ordering.is_ne(),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Relation::Lt => "<",
            Relation::Le => "<=",
            Relation::Gt => ">",
            Relation::Ge => ">=",
            Relation::Eq => "==",
            Relation::Ne => "!=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    And,
    Or,
}

#[derive(Debug, Clone)]
enum Leaf {
    /// The named option has a resolved value that is neither absent nor a
    /// boolean false.
    Satisfied(String),
    /// The named option's resolved value stands in `relation` to `operand`.
    Comparison {
        name: String,
        relation: Relation,
        operand: Operand,
    },
    /// At least one member condition holds (the group form).
    AnyOf(Vec<Condition>),
}

/// A composable satisfiability predicate over parsed option state.
///
/// Conditions are immutable trees: [`and_`](Condition::and_),
/// [`or_`](Condition::or_) and negation (`!condition`) always produce new
/// nodes, so a condition may be reused across several relations without
/// aliasing hazards.
/// Mixing `and_` and `or_` at the same node without explicit grouping is a
/// configuration error.
///
/// A condition is evaluated lazily, once, against the parsed-and-defaulted
/// values of a single invocation: attached sub-conditions first (AND
/// short-circuits on the first false, OR on the first true), then the node's
/// own predicate, with negation applied to the final composed result.
#[derive(Debug, Clone)]
pub struct Condition {
    leaf: Leaf,
    attached: Vec<Condition>,
    mode: Mode,
    negated: bool,
}

impl Condition {
    fn leaf(leaf: Leaf) -> Self {
        Self {
            leaf,
            attached: Vec::default(),
            mode: Mode::And,
            negated: false,
        }
    }

    pub(crate) fn satisfied(name: impl Into<String>) -> Self {
        Self::leaf(Leaf::Satisfied(name.into()))
    }

    pub(crate) fn comparison(name: String, relation: Relation, operand: Operand) -> Self {
        Self::leaf(Leaf::Comparison {
            name,
            relation,
            operand,
        })
    }

    pub(crate) fn any_of(members: Vec<Condition>) -> Self {
        Self::leaf(Leaf::AnyOf(members))
    }

    /// Attach `other` conjunctively: the composed condition holds iff both do.
    ///
    /// # Panics
    /// When this node already composes disjunctively (use explicit grouping).
    pub fn and_(mut self, other: impl Into<Condition>) -> Self {
        if self.mode == Mode::Or {
            panic!("cannot mix and_/or_ on one condition; group the terms explicitly");
        }

        self.attached.push(other.into());
        self
    }

    /// Attach `other` disjunctively: the composed condition holds iff either does.
    ///
    /// # Panics
    /// When this node already composes conjunctively (use explicit grouping).
    pub fn or_(mut self, other: impl Into<Condition>) -> Self {
        if self.mode == Mode::And && !self.attached.is_empty() {
            panic!("cannot mix and_/or_ on one condition; group the terms explicitly");
        }

        self.mode = Mode::Or;
        self.attached.push(other.into());
        self
    }

    /// Evaluate against the resolved values of one invocation.
    pub(crate) fn is_satisfied(&self, parsed: &Parsed) -> bool {
        let result = self.composed(parsed);

        if self.negated {
            !result
        } else {
            result
        }
    }

    fn composed(&self, parsed: &Parsed) -> bool {
        for condition in &self.attached {
            let satisfied = condition.is_satisfied(parsed);

            match self.mode {
                Mode::And => {
                    if !satisfied {
                        return false;
                    }
                }
                Mode::Or => {
                    if satisfied {
                        return true;
                    }
                }
            }
        }

        self.own(parsed)
    }

    fn own(&self, parsed: &Parsed) -> bool {
        match &self.leaf {
            Leaf::Satisfied(name) => parsed.specifies(name),
            Leaf::Comparison {
                name,
                relation,
                operand,
            } => {
                let left = match parsed.get(name) {
                    Some(value) => value,
                    // Comparing an unspecified option is unsatisfied, not an error.
                    None => return false,
                };
                let right = match operand {
                    Operand::Constant(value) => value,
                    Operand::Option(other) => match parsed.get(other) {
                        Some(value) => value,
                        None => return false,
                    },
                };

                match left.compare(right) {
                    Some(ordering) => relation.holds(ordering),
                    // Incomparable types render the comparison unsatisfied.
                    None => false,
                }
            }
            Leaf::AnyOf(members) => members.iter().any(|member| member.is_satisfied(parsed)),
        }
    }

    /// The bare option behind this condition, when it is nothing more than a
    /// plain satisfied-check (no composition, no negation).
    /// Distinguishes dependency errors from condition errors.
    pub(crate) fn as_plain_option(&self) -> Option<&str> {
        if self.negated || !self.attached.is_empty() {
            return None;
        }

        match &self.leaf {
            Leaf::Satisfied(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Every option name this condition references, for fail-fast existence
    /// checks at relation declaration time.
    pub(crate) fn referenced_names(&self) -> Vec<String> {
        let mut names = Vec::default();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, names: &mut Vec<String>) {
        match &self.leaf {
            Leaf::Satisfied(name) => names.push(name.clone()),
            Leaf::Comparison { name, operand, .. } => {
                names.push(name.clone());
                if let Operand::Option(other) = operand {
                    names.push(other.clone());
                }
            }
            Leaf::AnyOf(members) => {
                for member in members {
                    member.collect_names(names);
                }
            }
        }

        for condition in &self.attached {
            condition.collect_names(names);
        }
    }

    /// Rewrite every referenced name through `localize`, producing a new tree.
    pub(crate) fn localized(self, localize: &dyn Fn(&str) -> String) -> Self {
        let leaf = match self.leaf {
            Leaf::Satisfied(name) => Leaf::Satisfied(localize(&name)),
            Leaf::Comparison {
                name,
                relation,
                operand,
            } => Leaf::Comparison {
                name: localize(&name),
                relation,
                operand: match operand {
                    Operand::Option(other) => Operand::Option(localize(&other)),
                    constant => constant,
                },
            },
            Leaf::AnyOf(members) => Leaf::AnyOf(
                members
                    .into_iter()
                    .map(|member| member.localized(localize))
                    .collect(),
            ),
        };

        Self {
            leaf,
            attached: self
                .attached
                .into_iter()
                .map(|condition| condition.localized(localize))
                .collect(),
            mode: self.mode,
            negated: self.negated,
        }
    }

    /// The names listed by a required-with-replacements failure.
    /// Plain options contribute their name, groups their member names, and
    /// relational/composed conditions their rendered form.
    pub(crate) fn allowed_names(&self) -> Vec<String> {
        if self.negated || !self.attached.is_empty() {
            return vec![self.to_string()];
        }

        match &self.leaf {
            Leaf::Satisfied(name) => vec![name.clone()],
            Leaf::AnyOf(members) => members
                .iter()
                .flat_map(|member| member.allowed_names())
                .collect(),
            Leaf::Comparison { .. } => vec![self.to_string()],
        }
    }
}

impl From<Arg> for Condition {
    fn from(reference: Arg) -> Self {
        Condition::satisfied(reference.0)
    }
}

impl From<&str> for Condition {
    fn from(name: &str) -> Self {
        Condition::satisfied(name)
    }
}

impl From<String> for Condition {
    fn from(name: String) -> Self {
        Condition::satisfied(name)
    }
}

impl std::ops::Not for Condition {
    type Output = Condition;

    /// Invert the final composed result (not each sub-term).
    fn not(mut self) -> Condition {
        self.negated = !self.negated;
        self
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let own = match &self.leaf {
            Leaf::Satisfied(name) => name.clone(),
            Leaf::Comparison {
                name,
                relation,
                operand,
            } => format!("{name} {} {operand}", relation.symbol()),
            Leaf::AnyOf(members) => {
                let items: Vec<String> = members.iter().map(|member| member.to_string()).collect();
                items.join(", ")
            }
        };

        let rendered = if self.attached.is_empty() {
            own
        } else {
            let glue = match self.mode {
                Mode::And => " and ",
                Mode::Or => " or ",
            };
            let mut parts = vec![own];
            parts.extend(self.attached.iter().map(|condition| condition.to_string()));
            format!("({})", parts.join(glue))
        };

        if self.negated {
            write!(f, "not {rendered}")
        } else {
            write!(f, "{rendered}")
        }
    }
}
