//! HTML → plain text.
//!
//! Every visible text node, trimmed, one per line. Parsing is best-effort
//! (html5ever recovers from any malformed input), so this never fails.
//!
//! The tree is built with scripting disabled, so `<noscript>` content is
//! parsed as markup rather than kept as raw text.

use html5ever::driver::{self, ParseOpts};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{local_name, namespace_url, ns, QualName};
use scraper::{Html, Node};

/// Elements whose text content is never rendered. `iframe`, `noembed`,
/// `noframes` and `xmp` hold raw text that the parser does not tokenize.
const HIDDEN_ELEMENTS: &[&str] = &[
    "script", "style", "template", "iframe", "noembed", "noframes", "xmp",
];

/// RCDATA elements: entities are decoded but tags stay literal text.
const RCDATA_ELEMENTS: &[&str] = &["title", "textarea"];

pub fn extract_text(html: &str) -> String {
    let mut lines = Vec::new();
    collect_lines(&parse_document(html), &mut lines);
    lines.join("\n")
}

fn parse_opts() -> ParseOpts {
    ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn parse_document(html: &str) -> Html {
    driver::parse_document(Html::new_document(), parse_opts()).one(html)
}

fn parse_fragment(html: &str) -> Html {
    let context = QualName::new(None, ns!(html), local_name!("body"));
    driver::parse_fragment(Html::new_fragment(), parse_opts(), context, Vec::new()).one(html)
}

fn collect_lines(document: &Html, lines: &mut Vec<String>) {
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let mut hidden = false;
        let mut rcdata = false;
        for ancestor in node.ancestors() {
            if let Node::Element(el) = ancestor.value() {
                if HIDDEN_ELEMENTS.contains(&el.name()) {
                    hidden = true;
                    break;
                }
                rcdata |= RCDATA_ELEMENTS.contains(&el.name());
            }
        }
        if hidden {
            continue;
        }

        // Re-parsing consumes at least one tag, so this recursion terminates.
        if rcdata && text.contains('<') {
            collect_lines(&parse_fragment(text), lines);
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
}
