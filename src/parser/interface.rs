/// The output sink for help, usage, and error text.
///
/// The parser itself never prints; everything user-facing flows through this
/// seam ([`ConsoleInterface`] in production, an in-memory implementation when
/// embedding or testing).
pub trait UserInterface {
    /// Emit a regular message (help output).
    fn print(&self, message: String);
    /// Emit an error message (parse failures, usage summaries).
    fn print_error(&self, message: String);
}

#[derive(Default)]
pub(crate) struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, message: String) {
        eprintln!("{message}");
    }
}

#[cfg(any(test, feature = "unit_test"))]
pub use util::{channel_interface, InMemoryInterface, ReceiverInterface, SenderInterface};

#[cfg(any(test, feature = "unit_test"))]
mod util {
    use super::UserInterface;
    use std::cell::RefCell;
    use std::sync::mpsc;

    /// *Intended for testing.*
    /// A [`UserInterface`] that captures everything printed.
    pub struct InMemoryInterface {
        messages: RefCell<Vec<String>>,
        errors: RefCell<Vec<String>>,
    }

    impl Default for InMemoryInterface {
        fn default() -> Self {
            Self {
                messages: RefCell::new(Vec::default()),
                errors: RefCell::new(Vec::default()),
            }
        }
    }

    impl UserInterface for InMemoryInterface {
        fn print(&self, message: String) {
            self.messages.borrow_mut().push(message);
        }

        fn print_error(&self, message: String) {
            self.errors.borrow_mut().push(message);
        }
    }

    impl InMemoryInterface {
        /// The captured (messages, errors), each concatenated with newlines.
        pub fn consume(self) -> (Option<String>, Option<String>) {
            let InMemoryInterface { messages, errors } = self;
            (join(messages.take()), join(errors.take()))
        }

        /// The captured messages, asserting no errors were printed.
        pub fn consume_message(self) -> String {
            let (message, error) = self.consume();
            assert_eq!(error, None);
            message.unwrap()
        }
    }

    /// *Intended for testing.*
    /// A connected pair: hand the sender to the parser, keep the receiver.
    pub fn channel_interface() -> (SenderInterface, ReceiverInterface) {
        let (message_tx, message_rx) = mpsc::channel();
        let (error_tx, error_rx) = mpsc::channel();
        (
            SenderInterface {
                message_tx,
                error_tx,
            },
            ReceiverInterface {
                message_rx,
                error_rx,
            },
        )
    }

    pub struct SenderInterface {
        message_tx: mpsc::Sender<Option<String>>,
        error_tx: mpsc::Sender<Option<String>>,
    }

    impl Drop for SenderInterface {
        fn drop(&mut self) {
            let _ = self.message_tx.send(None);
            let _ = self.error_tx.send(None);
        }
    }

    impl UserInterface for SenderInterface {
        fn print(&self, message: String) {
            self.message_tx
                .send(Some(message))
                .expect("receiver outlives the parser");
        }

        fn print_error(&self, message: String) {
            self.error_tx
                .send(Some(message))
                .expect("receiver outlives the parser");
        }
    }

    pub struct ReceiverInterface {
        message_rx: mpsc::Receiver<Option<String>>,
        error_rx: mpsc::Receiver<Option<String>>,
    }

    impl ReceiverInterface {
        /// The captured (messages, errors), each concatenated with newlines.
        /// Blocks until the sender side drops.
        pub fn consume(self) -> (Option<String>, Option<String>) {
            (drain(self.message_rx), drain(self.error_rx))
        }

        /// The captured messages, asserting no errors were printed.
        pub fn consume_message(self) -> String {
            let (message, error) = self.consume();
            assert_eq!(error, None);
            message.unwrap()
        }
    }

    fn drain(receiver: mpsc::Receiver<Option<String>>) -> Option<String> {
        let mut lines = Vec::default();

        while let Ok(Some(message)) = receiver.recv() {
            lines.push(message);
        }

        join(lines)
    }

    fn join(lines: Vec<String>) -> Option<String> {
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}
