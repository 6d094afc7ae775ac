//! Text helpers shared by the XML and HTML extraction paths.

use std::sync::LazyLock;

use regex::Regex;
use roxmltree::{Document, Node, ParsingOptions};

/* ---------------- XML ---------------- */

static XMLNS_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\sxmlns[^"]*"[^"]*""#).expect("namespace regex"));

fn xml_options() -> ParsingOptions {
    ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    }
}

/// Remove every `xmlns`/`xmlns:prefix` declaration from the raw text.
pub(crate) fn strip_namespaces(raw: &str) -> String {
    XMLNS_DECL.replace_all(raw, "").into_owned()
}

/// Parse `raw` and hand the tree to `f`.
///
/// Some filers emit broken namespace syntax; on a parse error the namespace
/// declarations are stripped and the parse is retried once.
pub(crate) fn with_lenient_xml<T>(
    raw: &str,
    f: impl FnOnce(&Document<'_>) -> T,
) -> Result<T, roxmltree::Error> {
    let raw = raw.trim_start_matches('\u{feff}').trim_start();
    match Document::parse_with_options(raw, xml_options()) {
        Ok(doc) => Ok(f(&doc)),
        Err(first) => {
            tracing::debug!(error = %first, "XML parse failed; retrying without namespace declarations");
            let stripped = strip_namespaces(raw);
            let doc = Document::parse_with_options(&stripped, xml_options())?;
            Ok(f(&doc))
        }
    }
}

/// First descendant (excluding `node` itself) with local name `name`.
pub(crate) fn descendant<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.descendants()
        .skip(1)
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// Direct child element with local name `name`.
pub(crate) fn child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// Trimmed, non-empty text of an element (all text descendants concatenated).
pub(crate) fn node_text(node: Node<'_, '_>) -> Option<String> {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Text of the first descendant named `name`.
pub(crate) fn descendant_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    descendant(node, name).and_then(node_text)
}

/// Form 4 wraps most scalars as `<field><value>x</value></field>`; some filers
/// put the text directly in `<field>`. Accept both.
pub(crate) fn value_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    let field = descendant(node, name)?;
    match child(field, "value") {
        Some(v) => node_text(v),
        None => node_text(field),
    }
}

/* ---------------- HTML ---------------- */

/// ASCII-lowercase copy; byte offsets stay aligned with the input.
pub(crate) fn to_lower(s: &str) -> String {
    s.to_ascii_lowercase()
}

/// Byte ranges of every `<tag ...>...</tag>` block (case-insensitive, non-nesting).
pub(crate) fn tag_blocks(html: &str, tag: &str) -> Vec<(usize, usize)> {
    let lc = to_lower(html);
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = Vec::new();
    let mut pos = 0usize;

    while let Some(rel) = lc[pos..].find(&open) {
        let start = pos + rel;
        // `<tr` must not match `<track`.
        let after = lc.as_bytes().get(start + open.len()).copied();
        if !matches!(after, Some(b'>' | b' ' | b'\t' | b'\n' | b'\r' | b'/')) {
            pos = start + open.len();
            continue;
        }
        let Some(open_end) = lc[start..].find('>').map(|x| start + x + 1) else {
            break;
        };
        // An unclosed block runs to the next opener of the same tag, or the end.
        let close_at = lc[open_end..].find(&close).map(|x| open_end + x);
        let next_open = lc[open_end..].find(&open).map(|x| open_end + x);
        let end = match (close_at, next_open) {
            (Some(c), Some(n)) if n < c => n,
            (Some(c), _) => c + close.len(),
            (None, Some(n)) => n,
            (None, None) => html.len(),
        };
        out.push((start, end));
        pos = end;
    }
    out
}

/// Inner HTML of a block returned by [`tag_blocks`].
pub(crate) fn inner_html(block: &str) -> &str {
    let Some(open_end) = block.find('>') else {
        return "";
    };
    let inner = &block[open_end + 1..];
    if !inner.trim_end().ends_with('>') {
        return inner;
    }
    match inner.rfind("</") {
        Some(close) => &inner[..close],
        None => inner,
    }
}

pub(crate) fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

pub(crate) fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an HTML fragment: tags dropped, entities decoded, whitespace collapsed.
pub(crate) fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&decode_entities(&out))
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/* ---------------- Numbers ---------------- */

/// Parse a display number like `+$1,234,567.00` or `(12,000)`.
///
/// Currency symbols, thousands separators, sign markers and percent signs are
/// dropped. Anything still unparsable counts as zero.
pub(crate) fn clean_number(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '+' | '-' | '%' | '(' | ')') && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}
