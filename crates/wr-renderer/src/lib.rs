//! Streaming renderer from document events to XWiki syntax.
//!
//! A parser walks a document and calls [`Listener`] methods in document order;
//! [`XWikiSyntaxRenderer`] turns those calls into XWiki 2.x markup without
//! building a tree.
//!
//! # Architecture
//!
//! - Output goes through a stack of sinks. Links capture their label into a
//!   buffer until the reference is known; macro markers discard the expanded
//!   content and print the original invocation instead.
//! - Structural state (list styles, definition and quotation nesting, table
//!   rows) decides which separator a construct owes when it begins.
//! - Parameters of a closed formatting span stay pending and are reset with
//!   `(%%)` before the next text, unless the next span carries the same ones.
//!
//! # Example
//!
//! ```
//! use wr_renderer::{Event, ListType, Parameters, XWikiSyntaxRenderer};
//!
//! let events = [
//!     Event::BeginList { list_type: ListType::Bulleted, parameters: Parameters::new() },
//!     Event::BeginListItem,
//!     Event::OnWord { word: "first".to_owned() },
//!     Event::EndListItem,
//!     Event::BeginListItem,
//!     Event::OnWord { word: "second".to_owned() },
//!     Event::EndListItem,
//!     Event::EndList { list_type: ListType::Bulleted, parameters: Parameters::new() },
//! ];
//!
//! let result = XWikiSyntaxRenderer::new().render(&events)?;
//! assert_eq!(result.text, "* first\n* second");
//! # Ok::<(), wr_renderer::RenderError>(())
//! ```

mod error;
mod event;
mod link;
mod macro_printer;
mod parameters;
mod renderer;
mod sink;
mod state;

pub use error::{RenderError, Result};
pub use event::{Event, Format, Image, Link, LinkType, ListType, Listener, SectionLevel, XmlNode};
pub use link::{render_image, render_reference};
pub use macro_printer::format_macro;
pub use parameters::{Parameters, format_parameters};
pub use renderer::{RenderResult, XWikiSyntaxRenderer};
