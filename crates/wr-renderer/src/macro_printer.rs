//! Serialized form of macro invocations.

use crate::parameters::{Parameters, format_pairs};

/// Format a macro invocation as XWiki syntax.
///
/// - With content: `{{name key="value"}}content{{/name}}`
/// - Without content: `{{name key="value"/}}`
///
/// An empty `Some("")` body still produces the open/close pair, since the
/// parser distinguishes an empty body from no body.
pub fn format_macro(name: &str, parameters: &Parameters, content: Option<&str>) -> String {
    let mut out = String::with_capacity(name.len() * 2 + 8);
    out.push_str("{{");
    out.push_str(name);
    if !parameters.is_empty() {
        out.push(' ');
        out.push_str(&format_pairs(parameters));
    }
    match content {
        Some(content) => {
            out.push_str("}}");
            out.push_str(content);
            out.push_str("{{/");
            out.push_str(name);
            out.push_str("}}");
        }
        None => out.push_str("/}}"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_without_content() {
        assert_eq!(format_macro("toc", &Parameters::new(), None), "{{toc/}}");
    }

    #[test]
    fn test_macro_with_parameters_without_content() {
        let params = Parameters::from([("start", "2"), ("depth", "3")]);
        assert_eq!(
            format_macro("toc", &params, None),
            r#"{{toc start="2" depth="3"/}}"#
        );
    }

    #[test]
    fn test_macro_with_content() {
        let params = Parameters::from([("language", "java")]);
        assert_eq!(
            format_macro("code", &params, Some("int x = 1;")),
            r#"{{code language="java"}}int x = 1;{{/code}}"#
        );
    }

    #[test]
    fn test_macro_with_empty_content() {
        assert_eq!(
            format_macro("html", &Parameters::new(), Some("")),
            "{{html}}{{/html}}"
        );
    }

    #[test]
    fn test_macro_content_is_verbatim() {
        let body = "**not** rendered\n{{nested/}}";
        assert_eq!(
            format_macro("box", &Parameters::new(), Some(body)),
            "{{box}}**not** rendered\n{{nested/}}{{/box}}"
        );
    }
}
