pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';

pub(crate) const SINGLE_PREFIX: &str = "-";
pub(crate) const DOUBLE_PREFIX: &str = "--";

// Fallback when the terminal width cannot be detected.
pub(crate) const DEFAULT_WIDTH: usize = 80;
