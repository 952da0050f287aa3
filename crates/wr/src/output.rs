//! Terminal output.

use console::{Style, Term};

/// Rendered text goes to stdout; diagnostics go to stderr.
pub(crate) struct Output {
    out: Term,
    err: Term,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Write rendered output, followed by a newline.
    pub(crate) fn result(&self, text: &str) -> std::io::Result<()> {
        self.out.write_line(text)
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.err.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.err.write_line(&self.red.apply_to(msg).to_string());
    }
}
