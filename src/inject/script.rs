//! Tracker script rendering.
//!
//! Renders the markup injected into HTML pages. Rendering happens once at
//! startup; the string is shared read-only by every request.

use std::time::Duration;

use thiserror::Error;

use crate::config::{ScriptInjectionMode, Settings};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("source injection needs the tracker source, none was supplied")]
    MissingSource,
    #[error("fetching tracker source failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("fetching tracker source returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("fetching tracker source timed out")]
    Timeout,
}

/// Render the snippet for `settings`.
///
/// Source mode inlines `tracker_source`, which the caller fetches ahead of
/// time. Same input always yields byte-identical output.
pub fn render_script(
    settings: &Settings,
    tracker_source: Option<&str>,
) -> Result<String, ScriptError> {
    match (settings.script_injection_mode, tracker_source) {
        (ScriptInjectionMode::Tag, _) => Ok(render_tag(settings)),
        (ScriptInjectionMode::Source, Some(source)) => Ok(render_inline(settings, source)),
        (ScriptInjectionMode::Source, None) => Err(ScriptError::MissingSource),
    }
}

/// `<script src>` tag pointing at the forwarded tracker.
pub fn render_tag(settings: &Settings) -> String {
    let src = script_path(settings);
    let attrs = data_attributes(settings);

    if settings.evade_google_tag_manager {
        let mut loader = String::from("<script>(function(d){var s=d.createElement('script');s.defer=true;");
        loader.push_str(&format!("s.src='{}';", js_escape(&src)));
        for (name, value) in &attrs {
            loader.push_str(&format!(
                "s.setAttribute('{}','{}');",
                name,
                js_escape(value)
            ));
        }
        loader.push_str("(d.head||d.documentElement).appendChild(s);})(document);</script>");
        return loader;
    }

    let mut tag = format!("<script defer src=\"{}\"", html_escape(&src));
    push_attributes(&mut tag, &attrs);
    tag.push_str("></script>");
    tag
}

fn render_inline(settings: &Settings, source: &str) -> String {
    let mut attrs = vec![("data-host-url", format!("/{}", settings.forward_path))];
    attrs.extend(data_attributes(settings));

    let mut tag = String::from("<script");
    push_attributes(&mut tag, &attrs);
    tag.push('>');
    // `</` inside the source would end the element early
    tag.push_str(&source.replace("</", "<\\/"));
    tag.push_str("</script>");
    tag
}

/// Public path of the tracker, served through the forward path.
pub fn script_path(settings: &Settings) -> String {
    format!("/{}/script.js", settings.forward_path)
}

/// Fetch the tracker source from the analytics host.
pub async fn fetch_tracker_source(
    client: &reqwest::Client,
    settings: &Settings,
    timeout: Duration,
) -> Result<String, ScriptError> {
    let url = format!("{}/script.js", settings.umami_host);
    let fetch = async {
        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ScriptError::Status(response.status()));
        }
        Ok(response.text().await?)
    };

    tokio::time::timeout(timeout, fetch)
        .await
        .map_err(|_| ScriptError::Timeout)?
}

fn data_attributes(settings: &Settings) -> Vec<(&'static str, String)> {
    let mut attrs = vec![("data-website-id", settings.website_id.clone())];
    if !settings.auto_track {
        attrs.push(("data-auto-track", "false".to_string()));
    }
    if settings.do_not_track {
        attrs.push(("data-do-not-track", "true".to_string()));
    }
    if settings.cache {
        attrs.push(("data-cache", "true".to_string()));
    }
    if !settings.domains.is_empty() {
        attrs.push(("data-domains", settings.domains.join(",")));
    }
    attrs
}

fn push_attributes(tag: &mut String, attrs: &[(&'static str, String)]) {
    for (name, value) in attrs {
        tag.push_str(&format!(" {}=\"{}\"", name, html_escape(value)));
    }
}

fn html_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn js_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\u0022"),
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}
