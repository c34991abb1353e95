use crate::model::Value;
use crate::tokens::Prefixes;

// Readers drive the per-occurrence consumption of command line tokens.
// The flow is as follows:
//
// 1) Each option registers under a reader kind, based off the type specified
//    by the programmer (ex: a flag gets `ReaderKind::Flag`).
//
// 2) When the parse loop hits the option's label, a fresh reader is
//    instantiated and offered every subsequent token until it declines one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReaderKind {
    /// Presence alone sets true; consumes nothing.
    Flag,
    /// Exactly one following token.
    SingleWord,
    /// Greedily consumes until the next label-looking token.
    MultiWord,
}

impl ReaderKind {
    /// The value an unspecified option of this kind resolves to, absent a
    /// declared default.
    pub(crate) fn class_default(&self) -> Option<Value> {
        match self {
            ReaderKind::Flag => Some(Value::Bool(false)),
            ReaderKind::SingleWord | ReaderKind::MultiWord => None,
        }
    }
}

/// One occurrence's token-consumption state machine.
#[derive(Debug, PartialEq)]
pub(crate) enum Reader {
    Flag,
    SingleWord(Option<String>),
    MultiWord(Vec<String>),
}

impl Reader {
    pub(crate) fn new(kind: ReaderKind) -> Self {
        match kind {
            ReaderKind::Flag => Reader::Flag,
            ReaderKind::SingleWord => Reader::SingleWord(None),
            ReaderKind::MultiWord => Reader::MultiWord(Vec::default()),
        }
    }

    /// Offer `token` to this reader.
    /// `true` means the token was absorbed and the reader remains active;
    /// `false` means the token was declined and must be re-dispatched as a new
    /// label or extra.
    pub(crate) fn consume_or_skip(&mut self, token: &str, prefixes: &Prefixes) -> bool {
        match self {
            Reader::Flag => false,
            Reader::SingleWord(held) => {
                if held.is_some() {
                    return false;
                }

                held.replace(token.to_string());
                true
            }
            Reader::MultiWord(held) => {
                if prefixes.is_label(token) {
                    return false;
                }

                held.push(token.to_string());
                true
            }
        }
    }

    /// The raw value this occurrence read, or `None` when no token satisfied it.
    pub(crate) fn value(&self) -> Option<Value> {
        match self {
            Reader::Flag => Some(Value::Bool(true)),
            Reader::SingleWord(held) => held.clone().map(Value::Str),
            Reader::MultiWord(held) => {
                if held.is_empty() {
                    None
                } else {
                    Some(Value::Str(held.join(" ")))
                }
            }
        }
    }
}
