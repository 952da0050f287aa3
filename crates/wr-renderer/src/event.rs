//! Document events and the listener interface that consumes them.
//!
//! A document tree is delivered to a renderer as an ordered sequence of
//! events: `begin_*`/`end_*` pairs for containers and single `on_*` calls for
//! leaf content. [`Listener`] is the per-event interface; [`Event`] is the same
//! interface reified as data, so a stream can be recorded, serialized, or
//! replayed through [`Event::emit`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::parameters::Parameters;

/// Kind of list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ListType {
    Bulleted,
    Numbered,
}

/// Inline formatting kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Format {
    Bold,
    Italic,
    Strikeout,
    Underline,
    Superscript,
    Subscript,
    Monospace,
}

/// Section heading level, 1 to 6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub enum SectionLevel {
    Level1 = 1,
    Level2 = 2,
    Level3 = 3,
    Level4 = 4,
    Level5 = 5,
    Level6 = 6,
}

impl SectionLevel {
    /// Numeric level (1-6).
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for SectionLevel {
    type Error = String;

    fn try_from(level: u8) -> std::result::Result<Self, Self::Error> {
        match level {
            1 => Ok(Self::Level1),
            2 => Ok(Self::Level2),
            3 => Ok(Self::Level3),
            4 => Ok(Self::Level4),
            5 => Ok(Self::Level5),
            6 => Ok(Self::Level6),
            other => Err(format!("section level must be between 1 and 6, got {other}")),
        }
    }
}

impl From<SectionLevel> for u8 {
    fn from(level: SectionLevel) -> Self {
        level.as_u8()
    }
}

/// What a link reference points to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum LinkType {
    /// A wiki document (`Space.Page`).
    #[default]
    Document,
    /// A full URI (`http://...`, `mailto:...`, `image:...`).
    Uri,
}

/// Link target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Link {
    /// Document name or URI.
    pub reference: String,
    pub link_type: LinkType,
    /// Anchor inside the target document.
    pub anchor: Option<String>,
    /// Query string appended to the target URL.
    pub query_string: Option<String>,
    /// Alias of the interwiki the reference is resolved against.
    pub interwiki_alias: Option<String>,
}

impl Link {
    /// Link to a wiki document.
    #[must_use]
    pub fn document(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Self::default()
        }
    }

    /// Link to a URI.
    #[must_use]
    pub fn uri(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            link_type: LinkType::Uri,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    #[must_use]
    pub fn with_query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = Some(query_string.into());
        self
    }

    #[must_use]
    pub fn with_interwiki_alias(mut self, alias: impl Into<String>) -> Self {
        self.interwiki_alias = Some(alias.into());
        self
    }
}

/// Image reference.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum Image {
    /// Attachment of a wiki document. `document` is `None` for the current one.
    Document {
        document: Option<String>,
        attachment: String,
    },
    /// External image.
    Url { url: String },
}

/// Raw markup node passed through by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum XmlNode {
    Element {
        name: String,
        #[cfg_attr(feature = "serde", serde(default))]
        attributes: Parameters,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
    CData {
        text: String,
    },
}

/// Receiver of document events.
///
/// Events arrive in document order and begin/end pairs are expected to nest.
/// Every method returns a [`Result`] so producers can propagate failures with
/// `?`; only events that close an output scope can fail.
pub trait Listener {
    fn begin_document(&mut self) -> Result<()>;
    fn end_document(&mut self) -> Result<()>;

    fn begin_paragraph(&mut self, parameters: &Parameters) -> Result<()>;
    fn end_paragraph(&mut self, parameters: &Parameters) -> Result<()>;

    fn begin_section(&mut self, level: SectionLevel, parameters: &Parameters) -> Result<()>;
    fn end_section(&mut self, level: SectionLevel, parameters: &Parameters) -> Result<()>;

    fn begin_list(&mut self, list_type: ListType, parameters: &Parameters) -> Result<()>;
    fn end_list(&mut self, list_type: ListType, parameters: &Parameters) -> Result<()>;
    fn begin_list_item(&mut self) -> Result<()>;
    fn end_list_item(&mut self) -> Result<()>;

    fn begin_definition_list(&mut self, parameters: &Parameters) -> Result<()>;
    fn end_definition_list(&mut self, parameters: &Parameters) -> Result<()>;
    fn begin_definition_term(&mut self) -> Result<()>;
    fn end_definition_term(&mut self) -> Result<()>;
    fn begin_definition_description(&mut self) -> Result<()>;
    fn end_definition_description(&mut self) -> Result<()>;

    fn begin_quotation(&mut self, parameters: &Parameters) -> Result<()>;
    fn end_quotation(&mut self, parameters: &Parameters) -> Result<()>;
    fn begin_quotation_line(&mut self) -> Result<()>;
    fn end_quotation_line(&mut self) -> Result<()>;

    fn begin_table(&mut self, parameters: &Parameters) -> Result<()>;
    fn end_table(&mut self, parameters: &Parameters) -> Result<()>;
    fn begin_table_row(&mut self, parameters: &Parameters) -> Result<()>;
    fn end_table_row(&mut self, parameters: &Parameters) -> Result<()>;
    fn begin_table_cell(&mut self, parameters: &Parameters) -> Result<()>;
    fn end_table_cell(&mut self, parameters: &Parameters) -> Result<()>;
    fn begin_table_head_cell(&mut self, parameters: &Parameters) -> Result<()>;
    fn end_table_head_cell(&mut self, parameters: &Parameters) -> Result<()>;

    fn begin_link(
        &mut self,
        link: &Link,
        free_standing_uri: bool,
        parameters: &Parameters,
    ) -> Result<()>;
    fn end_link(&mut self, link: &Link, free_standing_uri: bool, parameters: &Parameters)
    -> Result<()>;

    fn begin_format(&mut self, format: Format, parameters: &Parameters) -> Result<()>;
    fn end_format(&mut self, format: Format, parameters: &Parameters) -> Result<()>;

    /// Start of a macro's expanded content. `name`, `parameters` and `content`
    /// describe the original invocation.
    fn begin_macro_marker(
        &mut self,
        name: &str,
        parameters: &Parameters,
        content: Option<&str>,
    ) -> Result<()>;
    fn end_macro_marker(
        &mut self,
        name: &str,
        parameters: &Parameters,
        content: Option<&str>,
    ) -> Result<()>;

    fn begin_xml_node(&mut self, node: &XmlNode) -> Result<()>;
    fn end_xml_node(&mut self, node: &XmlNode) -> Result<()>;

    fn begin_error(&mut self, message: &str, description: &str) -> Result<()>;
    fn end_error(&mut self, message: &str, description: &str) -> Result<()>;

    fn on_word(&mut self, word: &str) -> Result<()>;
    fn on_space(&mut self) -> Result<()>;
    fn on_special_symbol(&mut self, symbol: char) -> Result<()>;
    fn on_escape(&mut self, escaped: &str) -> Result<()>;
    fn on_line_break(&mut self) -> Result<()>;
    fn on_new_line(&mut self) -> Result<()>;
    fn on_empty_lines(&mut self, count: usize) -> Result<()>;
    fn on_horizontal_line(&mut self, parameters: &Parameters) -> Result<()>;
    fn on_inline_macro(
        &mut self,
        name: &str,
        parameters: &Parameters,
        content: Option<&str>,
    ) -> Result<()>;
    fn on_standalone_macro(
        &mut self,
        name: &str,
        parameters: &Parameters,
        content: Option<&str>,
    ) -> Result<()>;
    fn on_image(&mut self, image: &Image, free_standing_uri: bool, parameters: &Parameters)
    -> Result<()>;
    fn on_id(&mut self, name: &str) -> Result<()>;
    fn on_verbatim_inline(&mut self, protected: &str) -> Result<()>;
    fn on_verbatim_standalone(&mut self, protected: &str, parameters: &Parameters) -> Result<()>;
}

/// A single document event.
///
/// With the `serde` feature, events serialize as objects tagged by an `event`
/// field, e.g. `{"event": "on_word", "word": "Hello"}`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "event", rename_all = "snake_case")
)]
pub enum Event {
    BeginDocument,
    EndDocument,
    BeginParagraph {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    EndParagraph {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    BeginSection {
        level: SectionLevel,
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    EndSection {
        level: SectionLevel,
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    BeginList {
        list_type: ListType,
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    EndList {
        list_type: ListType,
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    BeginListItem,
    EndListItem,
    BeginDefinitionList {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    EndDefinitionList {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    BeginDefinitionTerm,
    EndDefinitionTerm,
    BeginDefinitionDescription,
    EndDefinitionDescription,
    BeginQuotation {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    EndQuotation {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    BeginQuotationLine,
    EndQuotationLine,
    BeginTable {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    EndTable {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    BeginTableRow {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    EndTableRow {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    BeginTableCell {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    EndTableCell {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    BeginTableHeadCell {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    EndTableHeadCell {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    BeginLink {
        link: Link,
        #[cfg_attr(feature = "serde", serde(default))]
        free_standing_uri: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    EndLink {
        link: Link,
        #[cfg_attr(feature = "serde", serde(default))]
        free_standing_uri: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    BeginFormat {
        format: Format,
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    EndFormat {
        format: Format,
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    BeginMacroMarker {
        name: String,
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
        content: Option<String>,
    },
    EndMacroMarker {
        name: String,
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
        content: Option<String>,
    },
    BeginXmlNode {
        node: XmlNode,
    },
    EndXmlNode {
        node: XmlNode,
    },
    BeginError {
        message: String,
        #[cfg_attr(feature = "serde", serde(default))]
        description: String,
    },
    EndError {
        message: String,
        #[cfg_attr(feature = "serde", serde(default))]
        description: String,
    },
    OnWord {
        word: String,
    },
    OnSpace,
    OnSpecialSymbol {
        symbol: char,
    },
    OnEscape {
        escaped: String,
    },
    OnLineBreak,
    OnNewLine,
    OnEmptyLines {
        count: usize,
    },
    OnHorizontalLine {
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    OnInlineMacro {
        name: String,
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
        content: Option<String>,
    },
    OnStandaloneMacro {
        name: String,
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
        content: Option<String>,
    },
    OnImage {
        image: Image,
        #[cfg_attr(feature = "serde", serde(default))]
        free_standing_uri: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
    OnId {
        name: String,
    },
    OnVerbatimInline {
        protected: String,
    },
    OnVerbatimStandalone {
        protected: String,
        #[cfg_attr(feature = "serde", serde(default))]
        parameters: Parameters,
    },
}

impl Event {
    /// Deliver this event to `listener`.
    #[allow(clippy::too_many_lines)]
    pub fn emit<L: Listener + ?Sized>(&self, listener: &mut L) -> Result<()> {
        match self {
            Self::BeginDocument => listener.begin_document(),
            Self::EndDocument => listener.end_document(),
            Self::BeginParagraph { parameters } => listener.begin_paragraph(parameters),
            Self::EndParagraph { parameters } => listener.end_paragraph(parameters),
            Self::BeginSection { level, parameters } => listener.begin_section(*level, parameters),
            Self::EndSection { level, parameters } => listener.end_section(*level, parameters),
            Self::BeginList {
                list_type,
                parameters,
            } => listener.begin_list(*list_type, parameters),
            Self::EndList {
                list_type,
                parameters,
            } => listener.end_list(*list_type, parameters),
            Self::BeginListItem => listener.begin_list_item(),
            Self::EndListItem => listener.end_list_item(),
            Self::BeginDefinitionList { parameters } => listener.begin_definition_list(parameters),
            Self::EndDefinitionList { parameters } => listener.end_definition_list(parameters),
            Self::BeginDefinitionTerm => listener.begin_definition_term(),
            Self::EndDefinitionTerm => listener.end_definition_term(),
            Self::BeginDefinitionDescription => listener.begin_definition_description(),
            Self::EndDefinitionDescription => listener.end_definition_description(),
            Self::BeginQuotation { parameters } => listener.begin_quotation(parameters),
            Self::EndQuotation { parameters } => listener.end_quotation(parameters),
            Self::BeginQuotationLine => listener.begin_quotation_line(),
            Self::EndQuotationLine => listener.end_quotation_line(),
            Self::BeginTable { parameters } => listener.begin_table(parameters),
            Self::EndTable { parameters } => listener.end_table(parameters),
            Self::BeginTableRow { parameters } => listener.begin_table_row(parameters),
            Self::EndTableRow { parameters } => listener.end_table_row(parameters),
            Self::BeginTableCell { parameters } => listener.begin_table_cell(parameters),
            Self::EndTableCell { parameters } => listener.end_table_cell(parameters),
            Self::BeginTableHeadCell { parameters } => listener.begin_table_head_cell(parameters),
            Self::EndTableHeadCell { parameters } => listener.end_table_head_cell(parameters),
            Self::BeginLink {
                link,
                free_standing_uri,
                parameters,
            } => listener.begin_link(link, *free_standing_uri, parameters),
            Self::EndLink {
                link,
                free_standing_uri,
                parameters,
            } => listener.end_link(link, *free_standing_uri, parameters),
            Self::BeginFormat { format, parameters } => listener.begin_format(*format, parameters),
            Self::EndFormat { format, parameters } => listener.end_format(*format, parameters),
            Self::BeginMacroMarker {
                name,
                parameters,
                content,
            } => listener.begin_macro_marker(name, parameters, content.as_deref()),
            Self::EndMacroMarker {
                name,
                parameters,
                content,
            } => listener.end_macro_marker(name, parameters, content.as_deref()),
            Self::BeginXmlNode { node } => listener.begin_xml_node(node),
            Self::EndXmlNode { node } => listener.end_xml_node(node),
            Self::BeginError {
                message,
                description,
            } => listener.begin_error(message, description),
            Self::EndError {
                message,
                description,
            } => listener.end_error(message, description),
            Self::OnWord { word } => listener.on_word(word),
            Self::OnSpace => listener.on_space(),
            Self::OnSpecialSymbol { symbol } => listener.on_special_symbol(*symbol),
            Self::OnEscape { escaped } => listener.on_escape(escaped),
            Self::OnLineBreak => listener.on_line_break(),
            Self::OnNewLine => listener.on_new_line(),
            Self::OnEmptyLines { count } => listener.on_empty_lines(*count),
            Self::OnHorizontalLine { parameters } => listener.on_horizontal_line(parameters),
            Self::OnInlineMacro {
                name,
                parameters,
                content,
            } => listener.on_inline_macro(name, parameters, content.as_deref()),
            Self::OnStandaloneMacro {
                name,
                parameters,
                content,
            } => listener.on_standalone_macro(name, parameters, content.as_deref()),
            Self::OnImage {
                image,
                free_standing_uri,
                parameters,
            } => listener.on_image(image, *free_standing_uri, parameters),
            Self::OnId { name } => listener.on_id(name),
            Self::OnVerbatimInline { protected } => listener.on_verbatim_inline(protected),
            Self::OnVerbatimStandalone {
                protected,
                parameters,
            } => listener.on_verbatim_standalone(protected, parameters),
        }
    }
}
