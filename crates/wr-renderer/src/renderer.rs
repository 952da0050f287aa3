//! XWiki syntax renderer.

use crate::error::Result;
use crate::event::{Event, Format, Image, Link, ListType, Listener, SectionLevel, XmlNode};
use crate::link::{image_link, link_close, link_content, link_open};
use crate::macro_printer::format_macro;
use crate::parameters::{Parameters, format_parameters};
use crate::sink::SinkStack;
use crate::state::{Separator, StructureState};

/// Marker closing a parameter block applied by a preceding formatting span.
const FORMAT_RESET: &str = "(%%)";

/// Escape character of XWiki syntax.
const ESCAPE: char = '~';

/// Result of rendering an event stream.
#[derive(Clone, Debug, Default)]
pub struct RenderResult {
    /// Rendered XWiki syntax.
    pub text: String,
    /// Irregularities tolerated while rendering (e.g., unbalanced end events).
    pub warnings: Vec<String>,
}

/// Renders document events to XWiki syntax.
///
/// The renderer implements [`Listener`]; feed it events in document order and
/// call [`finish`](Self::finish) to read the output. One instance renders one
/// document.
///
/// # Example
///
/// ```
/// use wr_renderer::{Format, Listener, Parameters, XWikiSyntaxRenderer};
///
/// let none = Parameters::new();
/// let mut renderer = XWikiSyntaxRenderer::new();
/// renderer.begin_paragraph(&none)?;
/// renderer.begin_format(Format::Bold, &none)?;
/// renderer.on_word("Hello")?;
/// renderer.end_format(Format::Bold, &none)?;
/// renderer.end_paragraph(&none)?;
///
/// assert_eq!(renderer.finish().text, "**Hello**");
/// # Ok::<(), wr_renderer::RenderError>(())
/// ```
#[derive(Debug)]
pub struct XWikiSyntaxRenderer {
    sinks: SinkStack,
    state: StructureState,
    /// Parameters of the last closed formatting span, not yet reset with
    /// [`FORMAT_RESET`].
    pending_format_parameters: Option<Parameters>,
    warnings: Vec<String>,
}

impl XWikiSyntaxRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sinks: SinkStack::new(),
            state: StructureState::default(),
            pending_format_parameters: None,
            warnings: Vec::new(),
        }
    }

    /// Render a whole event stream and return the result.
    pub fn render<'a, I>(mut self, events: I) -> Result<RenderResult>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        for event in events {
            event.emit(&mut self)?;
        }
        Ok(self.finish())
    }

    /// Finish rendering and return the text written to the base sink.
    ///
    /// Constructs still open at this point are reported as warnings; their
    /// captured content is lost.
    pub fn finish(mut self) -> RenderResult {
        let open_sinks = self.sinks.depth();
        if open_sinks > 0 {
            self.warn(format!(
                "{open_sinks} link or macro marker scope(s) left open at end of document"
            ));
        }
        if !self.state.is_balanced() {
            self.warn("lists, quotations or tables left open at end of document".to_owned());
        }

        let text = self.sinks.into_base();
        tracing::debug!(
            bytes = text.len(),
            warnings = self.warnings.len(),
            "rendered XWiki syntax"
        );
        RenderResult {
            text,
            warnings: self.warnings,
        }
    }

    /// Write `text` to the active sink, first closing any pending formatting
    /// parameters.
    fn print(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.pending_format_parameters.take().is_some() {
            self.sinks.write(FORMAT_RESET);
        }
        self.sinks.write(text);
    }

    fn print_parameters(&mut self, parameters: &Parameters, trailing_newline: bool) {
        let formatted = format_parameters(parameters, trailing_newline);
        self.print(&formatted);
    }

    fn print_separator(&mut self, separator: Separator) {
        match separator {
            Separator::None => {}
            Separator::NewLine => self.print("\n"),
            Separator::Block => {
                let separator = self.state.block_separator();
                self.print(separator);
            }
        }
    }

    fn print_block_separator(&mut self) {
        self.print_separator(Separator::Block);
    }

    /// Marker of a definition item: the enclosing list marker, one `:` per
    /// nested definition list, then `suffix`.
    fn print_definition_marker(&mut self, suffix: &str) {
        let mut marker = self.state.lists.marker();
        let nesting = self.state.definitions.depth().saturating_sub(1);
        marker.push_str(&":".repeat(nesting));
        marker.push_str(suffix);
        self.print(&marker);
    }

    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}

impl Default for XWikiSyntaxRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Two-character delimiter opening and closing a formatting span.
fn format_delimiter(format: Format) -> &'static str {
    match format {
        Format::Bold => "**",
        Format::Italic => "//",
        Format::Strikeout => "--",
        Format::Underline => "__",
        Format::Superscript => "^^",
        Format::Subscript => ",,",
        Format::Monospace => "##",
    }
}

fn section_marker(level: SectionLevel) -> String {
    "=".repeat(usize::from(level.as_u8()))
}

impl Listener for XWikiSyntaxRenderer {
    fn begin_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_paragraph(&mut self, parameters: &Parameters) -> Result<()> {
        self.print_block_separator();
        self.print_parameters(parameters, true);
        Ok(())
    }

    fn end_paragraph(&mut self, _parameters: &Parameters) -> Result<()> {
        self.pending_format_parameters = None;
        Ok(())
    }

    fn begin_section(&mut self, level: SectionLevel, parameters: &Parameters) -> Result<()> {
        self.print_block_separator();
        self.print_parameters(parameters, true);
        self.print(&format!("{} ", section_marker(level)));
        Ok(())
    }

    fn end_section(&mut self, level: SectionLevel, _parameters: &Parameters) -> Result<()> {
        self.print(&format!(" {}", section_marker(level)));
        Ok(())
    }

    fn begin_list(&mut self, list_type: ListType, parameters: &Parameters) -> Result<()> {
        let separator = self.state.lists.begin(list_type);
        self.print_separator(separator);
        self.print_parameters(parameters, true);
        Ok(())
    }

    fn end_list(&mut self, _list_type: ListType, _parameters: &Parameters) -> Result<()> {
        if !self.state.lists.end() {
            self.warn("end of list without a matching begin".to_owned());
        }
        Ok(())
    }

    fn begin_list_item(&mut self) -> Result<()> {
        let separator = self.state.lists.begin_item();
        self.print_separator(separator);
        let marker = self.state.lists.marker();
        self.print(&format!("{marker} "));
        Ok(())
    }

    fn end_list_item(&mut self) -> Result<()> {
        self.state.lists.end_item();
        Ok(())
    }

    fn begin_definition_list(&mut self, parameters: &Parameters) -> Result<()> {
        let separator = self.state.definitions.begin();
        // Inside an open list item a definition list continues on the next line.
        let separator = if self.state.lists.is_item_open() {
            Separator::NewLine
        } else {
            separator
        };
        self.print_separator(separator);
        self.print_parameters(parameters, true);
        Ok(())
    }

    fn end_definition_list(&mut self, _parameters: &Parameters) -> Result<()> {
        if !self.state.definitions.end() {
            self.warn("end of definition list without a matching begin".to_owned());
        }
        Ok(())
    }

    fn begin_definition_term(&mut self) -> Result<()> {
        let separator = self.state.definitions.begin_item();
        self.print_separator(separator);
        self.print_definition_marker("; ");
        Ok(())
    }

    fn end_definition_term(&mut self) -> Result<()> {
        self.state.definitions.end_item();
        Ok(())
    }

    fn begin_definition_description(&mut self) -> Result<()> {
        let separator = self.state.definitions.begin_item();
        self.print_separator(separator);
        self.print_definition_marker(": ");
        Ok(())
    }

    fn end_definition_description(&mut self) -> Result<()> {
        self.state.definitions.end_item();
        Ok(())
    }

    fn begin_quotation(&mut self, parameters: &Parameters) -> Result<()> {
        let separator = self.state.quotations.begin();
        self.print_separator(separator);
        self.print_parameters(parameters, true);
        Ok(())
    }

    fn end_quotation(&mut self, _parameters: &Parameters) -> Result<()> {
        if !self.state.quotations.end() {
            self.warn("end of quotation without a matching begin".to_owned());
        }
        Ok(())
    }

    fn begin_quotation_line(&mut self) -> Result<()> {
        let separator = self.state.quotations.begin_item();
        self.print_separator(separator);
        let marker = ">".repeat(self.state.quotations.depth());
        self.print(&marker);
        Ok(())
    }

    fn end_quotation_line(&mut self) -> Result<()> {
        self.state.quotations.end_item();
        Ok(())
    }

    fn begin_table(&mut self, parameters: &Parameters) -> Result<()> {
        self.print_block_separator();
        self.print_parameters(parameters, true);
        self.state.tables.begin();
        Ok(())
    }

    fn end_table(&mut self, _parameters: &Parameters) -> Result<()> {
        if !self.state.tables.end() {
            self.warn("end of table without a matching begin".to_owned());
        }
        Ok(())
    }

    fn begin_table_row(&mut self, parameters: &Parameters) -> Result<()> {
        let separator = self.state.tables.begin_row();
        self.print_separator(separator);
        self.print_parameters(parameters, false);
        Ok(())
    }

    fn end_table_row(&mut self, _parameters: &Parameters) -> Result<()> {
        if !self.state.tables.end_row() {
            self.warn("table row outside of a table".to_owned());
        }
        Ok(())
    }

    fn begin_table_cell(&mut self, parameters: &Parameters) -> Result<()> {
        self.print("|");
        self.print_parameters(parameters, false);
        Ok(())
    }

    fn end_table_cell(&mut self, _parameters: &Parameters) -> Result<()> {
        self.pending_format_parameters = None;
        Ok(())
    }

    fn begin_table_head_cell(&mut self, parameters: &Parameters) -> Result<()> {
        self.print("|=");
        self.print_parameters(parameters, false);
        Ok(())
    }

    fn end_table_head_cell(&mut self, _parameters: &Parameters) -> Result<()> {
        self.pending_format_parameters = None;
        Ok(())
    }

    fn begin_link(
        &mut self,
        link: &Link,
        free_standing_uri: bool,
        _parameters: &Parameters,
    ) -> Result<()> {
        self.print(&link_open(link, free_standing_uri));
        // The label is only known once every nested event has been rendered.
        self.sinks.push_capture();
        Ok(())
    }

    fn end_link(
        &mut self,
        link: &Link,
        free_standing_uri: bool,
        parameters: &Parameters,
    ) -> Result<()> {
        let label = self.sinks.pop_capture()?;
        self.print(&link_content(link, free_standing_uri, &label));
        self.print(&link_close(link, free_standing_uri, parameters));
        Ok(())
    }

    fn begin_format(&mut self, format: Format, parameters: &Parameters) -> Result<()> {
        if self.pending_format_parameters.as_ref() == Some(parameters) {
            // Same parameters as the span just closed: keep them applied.
            self.pending_format_parameters = None;
            self.print(format_delimiter(format));
        } else {
            self.print(format_delimiter(format));
            self.print_parameters(parameters, false);
        }
        Ok(())
    }

    fn end_format(&mut self, format: Format, parameters: &Parameters) -> Result<()> {
        self.print(format_delimiter(format));
        if !parameters.is_empty() {
            self.pending_format_parameters = Some(parameters.clone());
        }
        Ok(())
    }

    fn begin_macro_marker(
        &mut self,
        _name: &str,
        _parameters: &Parameters,
        _content: Option<&str>,
    ) -> Result<()> {
        // The expanded content is rebuilt from the invocation in end_macro_marker.
        self.sinks.push_discard();
        Ok(())
    }

    fn end_macro_marker(
        &mut self,
        name: &str,
        parameters: &Parameters,
        content: Option<&str>,
    ) -> Result<()> {
        self.sinks.pop_discard()?;
        self.print(&format_macro(name, parameters, content));
        Ok(())
    }

    // XWiki syntax cannot express raw markup nodes; they are dropped.
    fn begin_xml_node(&mut self, _node: &XmlNode) -> Result<()> {
        Ok(())
    }

    fn end_xml_node(&mut self, _node: &XmlNode) -> Result<()> {
        Ok(())
    }

    // Errors are never surfaced in XWiki syntax.
    fn begin_error(&mut self, _message: &str, _description: &str) -> Result<()> {
        Ok(())
    }

    fn end_error(&mut self, _message: &str, _description: &str) -> Result<()> {
        Ok(())
    }

    fn on_word(&mut self, word: &str) -> Result<()> {
        self.print(word);
        Ok(())
    }

    fn on_space(&mut self) -> Result<()> {
        self.print(" ");
        Ok(())
    }

    fn on_special_symbol(&mut self, symbol: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.print(symbol.encode_utf8(&mut buf));
        Ok(())
    }

    fn on_escape(&mut self, escaped: &str) -> Result<()> {
        let mut pair = String::with_capacity(8);
        for c in escaped.chars() {
            pair.clear();
            pair.push(ESCAPE);
            pair.push(c);
            self.print(&pair);
        }
        Ok(())
    }

    fn on_line_break(&mut self) -> Result<()> {
        self.print("\n");
        Ok(())
    }

    fn on_new_line(&mut self) -> Result<()> {
        self.print("\\");
        Ok(())
    }

    fn on_empty_lines(&mut self, count: usize) -> Result<()> {
        self.print(&"\n".repeat(count));
        Ok(())
    }

    fn on_horizontal_line(&mut self, parameters: &Parameters) -> Result<()> {
        self.print_block_separator();
        self.print_parameters(parameters, true);
        self.print("----");
        Ok(())
    }

    fn on_inline_macro(
        &mut self,
        name: &str,
        parameters: &Parameters,
        content: Option<&str>,
    ) -> Result<()> {
        self.print(&format_macro(name, parameters, content));
        Ok(())
    }

    fn on_standalone_macro(
        &mut self,
        name: &str,
        parameters: &Parameters,
        content: Option<&str>,
    ) -> Result<()> {
        self.print_block_separator();
        self.print(&format_macro(name, parameters, content));
        Ok(())
    }

    fn on_image(
        &mut self,
        image: &Image,
        free_standing_uri: bool,
        parameters: &Parameters,
    ) -> Result<()> {
        let link = image_link(image);
        self.print(&link_open(&link, free_standing_uri));
        self.print(&link_close(&link, free_standing_uri, parameters));
        Ok(())
    }

    fn on_id(&mut self, name: &str) -> Result<()> {
        self.print(&format!(r#"{{{{id name="{name}"}}}}"#));
        Ok(())
    }

    fn on_verbatim_inline(&mut self, protected: &str) -> Result<()> {
        self.print(&format!("{{{{{{{protected}}}}}}}"));
        Ok(())
    }

    fn on_verbatim_standalone(&mut self, protected: &str, parameters: &Parameters) -> Result<()> {
        self.print_block_separator();
        self.print_parameters(parameters, true);
        self.on_verbatim_inline(protected)
    }
}
