//! `wr render` command implementation.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use wr_cache::{FileCache, RenderRequest, RenderingCache};
use wr_config::{CliSettings, Config};
use wr_renderer::{Event, XWikiSyntaxRenderer};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// JSON array of events to render (default: stdin).
    input: Option<PathBuf>,

    /// Document the events belong to. Required for caching.
    #[arg(short, long)]
    document: Option<String>,

    /// Action the document is rendered for (default: from config).
    #[arg(short, long)]
    action: Option<String>,

    /// Locale the document is rendered in (default: from config).
    #[arg(short, long)]
    locale: Option<String>,

    /// Request parameter, as KEY=VALUE. `refresh=1` bypasses cached output.
    #[arg(short = 'P', long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Path to configuration file (default: auto-discover wr.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cache directory (overrides config).
    #[arg(long, env = "WR_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Disable the rendering cache.
    #[arg(long)]
    no_cache: bool,

    /// Enable verbose output (cache hits and misses, render summary).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or the input cannot be read, the
    /// input is not a valid event stream, or rendering fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            cache_enabled: self.no_cache.then_some(false),
            cache_dir: self.cache_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let request = self.document.map(|document| RenderRequest {
            document,
            action: Some(
                self.action
                    .unwrap_or_else(|| config.render.default_action.clone()),
            ),
            locale: self
                .locale
                .unwrap_or_else(|| config.render.default_locale.clone()),
            parameters: self.params.into_iter().collect(),
        });

        let cache = if config.cache_resolved.enabled && request.is_some() {
            let patterns = config.cache_resolved.document_patterns()?;
            let files = FileCache::new(
                config.cache_resolved.dir.clone(),
                &config.cache_resolved.version,
            );
            Some(RenderingCache::new(&files, patterns))
        } else {
            None
        };

        let source = read_input(self.input.as_deref())?;
        let rendered = render_source(&source, request.as_ref(), cache.as_ref())?;

        for warning in &rendered.warnings {
            output.warning(&format!("warning: {warning}"));
        }
        output.result(&rendered.text)?;
        Ok(())
    }
}

/// Text and warnings of one `render` invocation.
#[derive(Debug)]
struct Rendered {
    text: String,
    warnings: Vec<String>,
}

/// Render an event stream, consulting and filling `cache` when both a request
/// and a cache are given.
fn render_source(
    source: &str,
    request: Option<&RenderRequest>,
    cache: Option<&RenderingCache>,
) -> Result<Rendered, CliError> {
    let cached = match (cache, request) {
        (Some(cache), Some(request)) => Some((cache, request)),
        _ => None,
    };

    if let Some((cache, request)) = cached
        && let Some(text) = cache.get_rendered_content(request, source, &mut [])
    {
        return Ok(Rendered {
            text,
            warnings: Vec::new(),
        });
    }

    let events: Vec<Event> = serde_json::from_str(source)?;
    tracing::info!(events = events.len(), "rendering event stream");
    let result = XWikiSyntaxRenderer::new().render(&events)?;

    if let Some((cache, request)) = cached {
        cache.set_rendered_content(request, source, &result.text, &[]);
    }

    Ok(Rendered {
        text: result.text,
        warnings: result.warnings,
    })
}

fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn parse_param(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {arg:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use wr_renderer::RenderError;

    const EVENTS: &str = r#"[
        {"event": "begin_paragraph"},
        {"event": "begin_format", "format": "bold"},
        {"event": "on_word", "word": "Hello"},
        {"event": "end_format", "format": "bold"},
        {"event": "end_paragraph"}
    ]"#;

    fn rendering_cache(tmp: &TempDir) -> RenderingCache {
        RenderingCache::new(&FileCache::new(tmp.path().join("cache"), "1"), Vec::new())
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("xpage=plain"),
            Ok(("xpage".to_owned(), "plain".to_owned()))
        );
        assert_eq!(
            parse_param("a=b=c"),
            Ok(("a".to_owned(), "b=c".to_owned()))
        );
        assert!(parse_param("novalue").is_err());
    }

    #[test]
    fn test_render_without_cache() {
        let rendered = render_source(EVENTS, None, None).unwrap();
        assert_eq!(rendered.text, "**Hello**");
        assert!(rendered.warnings.is_empty());
    }

    #[test]
    fn test_render_reports_warnings() {
        let source = r#"[{"event": "end_list", "list_type": "bulleted"}]"#;
        let rendered = render_source(source, None, None).unwrap();
        assert_eq!(rendered.text, "");
        assert_eq!(rendered.warnings.len(), 1);
    }

    #[test]
    fn test_render_invalid_json() {
        let err = render_source("{not json", None, None).unwrap_err();
        assert!(matches!(err, CliError::Events(_)));
    }

    #[test]
    fn test_render_underflow() {
        let source = r#"[{"event": "end_link", "link": {"reference": "X"}}]"#;
        let err = render_source(source, None, None).unwrap_err();
        assert!(matches!(
            err,
            CliError::Render(RenderError::StackUnderflow(_))
        ));
    }

    #[test]
    fn test_render_stores_and_reuses_cached_output() {
        let tmp = TempDir::new().unwrap();
        let cache = rendering_cache(&tmp);
        let request = RenderRequest::new("Main.WebHome");

        render_source(EVENTS, Some(&request), Some(&cache)).unwrap();
        assert_eq!(
            cache.get_rendered_content(&request, EVENTS, &mut []),
            Some("**Hello**".to_owned())
        );

        let rendered = render_source(EVENTS, Some(&request), Some(&cache)).unwrap();
        assert_eq!(rendered.text, "**Hello**");
    }
}
