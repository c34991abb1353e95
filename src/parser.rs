mod base;
mod interface;
mod printer;

pub(crate) use base::{Engine, Predicate};
pub(crate) use interface::ConsoleInterface;
pub use interface::UserInterface;
pub(crate) use printer::{HelpEntry, Printer};

#[cfg(any(test, feature = "unit_test"))]
pub use interface::{channel_interface, InMemoryInterface, ReceiverInterface, SenderInterface};
