use crate::error::ArgumentError;
use crate::model::Value;

/// A fallible `value -> value` conversion applied after reading.
///
/// The built-in variants cover the typed registration calls; `Custom` is the
/// seam through which collaborators (file openers, url checkers, etc) plug in.
pub(crate) enum Cast {
    Int,
    Float,
    Range,
    Choices(Vec<String>),
    /// Marks a config-file option; the pipeline handles these specially (the
    /// option itself resolves to its path, the file contents feed the others).
    Config,
    Custom(Box<dyn Fn(&str) -> Result<Value, ArgumentError>>),
}

impl std::fmt::Debug for Cast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cast::Int => write!(f, "Int"),
            Cast::Float => write!(f, "Float"),
            Cast::Range => write!(f, "Range"),
            Cast::Choices(allowed) => write!(f, "Choices({allowed:?})"),
            Cast::Config => write!(f, "Config"),
            Cast::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl Cast {
    /// The `<..>` token rendered next to the option label in help output.
    pub(crate) fn type_label(&self) -> &'static str {
        match self {
            Cast::Int => "int",
            Cast::Float => "float",
            Cast::Range => "range",
            _ => "option",
        }
    }

    /// Apply this cast.
    /// Only raw strings are converted; an already-typed value (ex: a declared
    /// default) passes through unchanged.
    pub(crate) fn apply(&self, value: Value) -> Result<Value, ArgumentError> {
        let raw = match value {
            Value::Str(raw) => raw,
            typed => return Ok(typed),
        };

        match self {
            Cast::Int => raw
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| ArgumentError::Format(format!("cannot cast '{raw}' to int."))),
            Cast::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| ArgumentError::Format(format!("cannot cast '{raw}' to float."))),
            Cast::Range => range_cast(&raw),
            Cast::Choices(allowed) => {
                if allowed.iter().any(|choice| choice == &raw) {
                    Ok(Value::Str(raw))
                } else {
                    Err(ArgumentError::Format(format!(
                        "'{raw}' is not one of [{}].",
                        allowed.join(", ")
                    )))
                }
            }
            Cast::Config => Ok(Value::Str(raw)),
            Cast::Custom(cast) => cast(&raw),
        }
    }
}

/// Parse the range forms `N`, `N:M`, `N-M`, and `N M [S]` into the integer
/// sequence they denote (half-open, stepped).
fn range_cast(value: &str) -> Result<Value, ArgumentError> {
    let error = || {
        ArgumentError::Format(format!(
            "'{value}' is not range format: N, N:M, N-M, or N M S."
        ))
    };

    let splitter = [' ', ':', '-']
        .into_iter()
        .find(|delimiter| value.contains(*delimiter));
    let parts: Vec<&str> = match splitter {
        Some(delimiter) => value.split(delimiter).collect(),
        None => vec![value],
    };

    if parts.is_empty() || parts.len() > 3 {
        return Err(error());
    }

    let numbers = parts
        .iter()
        .map(|part| part.parse::<i64>())
        .collect::<Result<Vec<i64>, _>>()
        .map_err(|_| error())?;

    let (start, stop, step) = match numbers.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => return Err(error()),
    };

    if step == 0 {
        return Err(error());
    }

    let mut items = Vec::default();
    let mut current = start;

    while (step > 0 && current < stop) || (step < 0 && current > stop) {
        items.push(Value::Int(current));
        current += step;
    }

    Ok(Value::List(items))
}

/// Read and parse a config file: line-oriented `key value` pairs with `=`, `:`
/// or whitespace as the delimiter; `#` lines are comments.
pub(crate) fn read_config(path: &str) -> Result<Vec<(String, String)>, ArgumentError> {
    let content = std::fs::read_to_string(path)
        .map_err(|error| ArgumentError::Format(format!("cannot read config '{path}': {error}")))?;
    Ok(parse_config(&content))
}

pub(crate) fn parse_config(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::default();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let delimiter = line.find(|c: char| c == '=' || c == ':' || c.is_whitespace());

        if let Some(index) = delimiter {
            let key = line[..index].trim();
            // `key = value` and `key : value` leave the symbol at the head of
            // the remainder; strip it once.
            let mut value = line[index + 1..].trim_start();
            if let Some(stripped) = value.strip_prefix(['=', ':']) {
                value = stripped.trim_start();
            }
            pairs.push((key.to_string(), value.trim_end().to_string()));
        }
    }

    pairs
}
