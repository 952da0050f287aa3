//! Link and image syntax.
//!
//! A link renders in three steps because its label is only known once all
//! nested events have been seen:
//!
//! ```text
//! [[   label>>   Space.Page?query#anchor@alias||key="value"   ]]
//! open content   close -------------------------------------------
//! ```
//!
//! A free-standing URI renders as the bare reference, with no label and no
//! delimiters.

use crate::event::{Image, Link, LinkType};
use crate::parameters::{Parameters, format_pairs};

/// Prefix marking an image reference written as a link.
const IMAGE_PREFIX: &str = "image:";

/// Render the full reference of `link`: `reference?query#anchor@alias`.
pub fn render_reference(link: &Link) -> String {
    let mut out = link.reference.clone();
    if let Some(query) = &link.query_string {
        out.push('?');
        out.push_str(query);
    }
    if let Some(anchor) = &link.anchor {
        out.push('#');
        out.push_str(anchor);
    }
    if let Some(alias) = &link.interwiki_alias {
        out.push('@');
        out.push_str(alias);
    }
    out
}

/// Opening part of a link.
pub(crate) fn link_open(link: &Link, free_standing_uri: bool) -> String {
    if free_standing_uri {
        render_reference(link)
    } else {
        "[[".to_owned()
    }
}

/// Label part of a link, from the content captured between begin and end.
///
/// Empty for free-standing URIs, for links without a label, and for labels
/// identical to the rendered reference.
pub(crate) fn link_content(link: &Link, free_standing_uri: bool, label: &str) -> String {
    if free_standing_uri || label.is_empty() || label == render_reference(link) {
        return String::new();
    }
    format!("{label}>>")
}

/// Closing part of a link.
pub(crate) fn link_close(link: &Link, free_standing_uri: bool, parameters: &Parameters) -> String {
    if free_standing_uri {
        return String::new();
    }

    let mut out = render_reference(link);
    if !parameters.is_empty() {
        out.push_str("||");
        out.push_str(&format_pairs(parameters));
    }
    out.push_str("]]");
    out
}

/// Render an image reference: `document@attachment`, `attachment`, or the URL.
pub fn render_image(image: &Image) -> String {
    match image {
        Image::Document {
            document: Some(document),
            attachment,
        } => format!("{document}@{attachment}"),
        Image::Document {
            document: None,
            attachment,
        } => attachment.clone(),
        Image::Url { url } => url.clone(),
    }
}

/// Synthetic link standing for `image`.
pub(crate) fn image_link(image: &Image) -> Link {
    Link {
        reference: format!("{IMAGE_PREFIX}{}", render_image(image)),
        link_type: LinkType::Uri,
        ..Link::default()
    }
}
