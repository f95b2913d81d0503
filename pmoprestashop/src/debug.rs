//! Diagnostic side channel for request/response dumps.
//!
//! The transport emits titled blocks (request header, response header,
//! sent and received bodies) through a [`DebugSink`] when debug mode is
//! enabled. Formatting never couples to the request pipeline: a sink only
//! receives `(title, content)` pairs.

use tracing::debug;

/// Single "emit diagnostic" capability the transport calls into.
pub trait DebugSink: Send + Sync {
    fn emit(&self, title: &str, content: &str);
}

/// Terminal-context sink: START/END delimited blocks.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl DebugSink for ConsoleSink {
    fn emit(&self, title: &str, content: &str) {
        debug!("START {}\n{}\nEND {}\n", title, content, title);
    }
}

/// Embedded-HTML-context sink: escaped `<pre>` blocks.
#[derive(Debug, Default)]
pub struct HtmlSink;

impl DebugSink for HtmlSink {
    fn emit(&self, title: &str, content: &str) {
        debug!(
            "<div style=\"display:table;background:#CCC;font-size:8pt;padding:7px\"><h6 style=\"font-size:9pt;margin:0\">{}</h6><pre>{}</pre></div>",
            escape_html(title),
            escape_html(content)
        );
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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
