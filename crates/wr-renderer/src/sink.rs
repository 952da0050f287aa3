//! Stack of output sinks.
//!
//! The renderer never writes to a fixed buffer. It writes to the top of a
//! [`SinkStack`], so a construct whose syntax depends on its content (a link
//! label) can capture nested output, and a construct whose content must not
//! appear at all (a macro's expanded tree) can swallow it.

use crate::error::{RenderError, Result};

/// A single text destination.
#[derive(Debug)]
pub(crate) enum Sink {
    /// Accumulates everything written to it.
    Buffer(String),
    /// Accepts writes and keeps nothing.
    Discard,
}

impl Sink {
    fn write(&mut self, text: &str) {
        match self {
            Self::Buffer(buffer) => buffer.push_str(text),
            Self::Discard => {}
        }
    }

    /// Consume the sink, returning the captured text (empty for discard sinks).
    fn into_text(self) -> String {
        match self {
            Self::Buffer(buffer) => buffer,
            Self::Discard => String::new(),
        }
    }
}

/// Ordered stack of sinks over one permanent base buffer.
///
/// Writes always go to the top sink. The base sink can never be popped.
#[derive(Debug)]
pub(crate) struct SinkStack {
    base: String,
    nested: Vec<Sink>,
}

impl SinkStack {
    pub(crate) fn new() -> Self {
        Self {
            base: String::with_capacity(4096),
            nested: Vec::new(),
        }
    }

    /// Append `text` to the active sink.
    pub(crate) fn write(&mut self, text: &str) {
        match self.nested.last_mut() {
            Some(sink) => sink.write(text),
            None => self.base.push_str(text),
        }
    }

    /// Install a capturing sink on top of the stack.
    pub(crate) fn push_capture(&mut self) {
        self.nested.push(Sink::Buffer(String::new()));
    }

    /// Remove the active capturing sink and return what it captured.
    pub(crate) fn pop_capture(&mut self) -> Result<String> {
        self.pop("capture").map(Sink::into_text)
    }

    /// Install a sink that swallows every write until popped.
    pub(crate) fn push_discard(&mut self) {
        self.nested.push(Sink::Discard);
    }

    /// Remove the active discard sink.
    pub(crate) fn pop_discard(&mut self) -> Result<()> {
        self.pop("discard").map(drop)
    }

    fn pop(&mut self, kind: &'static str) -> Result<Sink> {
        let sink = self.nested.pop().ok_or(RenderError::StackUnderflow(kind))?;
        if !matches!(
            (&sink, kind),
            (Sink::Buffer(_), "capture") | (Sink::Discard, "discard")
        ) {
            tracing::warn!(kind, "closed a sink of a different kind than the one open");
        }
        Ok(sink)
    }

    /// Number of sinks above the base.
    pub(crate) fn depth(&self) -> usize {
        self.nested.len()
    }

    /// Consume the stack, returning the base sink's text.
    pub(crate) fn into_base(self) -> String {
        self.base
    }
}
