use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->|<[A-Za-z/!?][^>]*>|[^<]+|<").expect("token regex"));
static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<\s*(/)?\s*([A-Za-z][A-Za-z0-9-]*)").expect("tag regex"));
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[A-Za-z]+);").expect("entity regex"));

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// One top-level node of a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Lowercased element name, `None` for a bare text node.
    pub tag: Option<String>,
    /// Text content with tags removed and entities decoded. Not trimmed.
    pub text: String,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node { tag: None, text: text.into() }
    }

    pub fn element(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Node { tag: Some(tag.into()), text: text.into() }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

enum Tag {
    Open { name: String, void: bool },
    Close,
    Other,
}

fn classify(token: &str) -> Tag {
    match TAG.captures(token) {
        Some(c) => {
            let name = c[2].to_ascii_lowercase();
            if c.get(1).is_some() {
                Tag::Close
            } else {
                let void = VOID_ELEMENTS.contains(&name.as_str())
                    || token.trim_end_matches('>').trim_end().ends_with('/');
                Tag::Open { name, void }
            }
        }
        None => Tag::Other,
    }
}

/// Split a fragment into its top-level nodes.
pub fn parse(html: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut current: Option<Node> = None;
    let mut depth = 0usize;

    for m in TOKEN.find_iter(html) {
        let token = m.as_str();
        if token.starts_with("<!--") {
            continue;
        }
        if token.starts_with('<') && token.len() > 1 {
            match classify(token) {
                Tag::Open { name, void } => {
                    if depth == 0 {
                        if let Some(node) = current.take() {
                            nodes.push(node);
                        }
                        if void {
                            nodes.push(Node::element(name, ""));
                            continue;
                        }
                        current = Some(Node::element(name, String::new()));
                    }
                    if !void {
                        depth += 1;
                    }
                }
                Tag::Close => {
                    if depth > 0 {
                        depth -= 1;
                        if depth == 0 {
                            if let Some(node) = current.take() {
                                nodes.push(node);
                            }
                        }
                    }
                }
                // Doctype or a malformed tag: no text content.
                Tag::Other => {}
            }
            continue;
        }

        let text = decode_entities(token);
        match current.as_mut() {
            Some(node) => node.text.push_str(&text),
            None => current = Some(Node::text(text)),
        }
    }
    if let Some(node) = current {
        nodes.push(node);
    }
    nodes
}

pub fn decode_entities(s: &str) -> String {
    ENTITY
        .replace_all(s, |c: &Captures| {
            let body = &c[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            match decoded {
                Some(ch) => ch.to_string(),
                None => c[0].to_string(),
            }
        })
        .into_owned()
}

/// Named references that turn up in translated prose: markup escapes,
/// typography, Portuguese letters and a few symbols. Names are case
/// sensitive, as in HTML.
fn named_entity(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "shy" => '\u{ad}',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "laquo" => '«',
        "raquo" => '»',
        "bull" => '•',
        "middot" => '·',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "euro" => '€',
        "deg" => '°',
        "sect" => '§',
        "ordm" => 'º',
        "ordf" => 'ª',
        "aacute" => 'á',
        "Aacute" => 'Á',
        "agrave" => 'à',
        "Agrave" => 'À',
        "acirc" => 'â',
        "Acirc" => 'Â',
        "atilde" => 'ã',
        "Atilde" => 'Ã',
        "eacute" => 'é',
        "Eacute" => 'É',
        "ecirc" => 'ê',
        "Ecirc" => 'Ê',
        "iacute" => 'í',
        "Iacute" => 'Í',
        "oacute" => 'ó',
        "Oacute" => 'Ó',
        "ocirc" => 'ô',
        "Ocirc" => 'Ô',
        "otilde" => 'õ',
        "Otilde" => 'Õ',
        "uacute" => 'ú',
        "Uacute" => 'Ú',
        "uuml" => 'ü',
        "Uuml" => 'Ü',
        "ccedil" => 'ç',
        "Ccedil" => 'Ç',
        _ => return None,
    };
    Some(ch)
}

/// Escape text for placement between tags. Quotes are left alone.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Plain text typed into the source area, as HTML for the translator:
/// one `<p>` per non-blank line.
pub fn source_to_html(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| format!("<p>{}</p>", escape_text(l)))
        .collect()
}

/// Text of each top-level node, one per line.
pub fn html_to_plain(html: &str) -> String {
    parse(html)
        .into_iter()
        .filter(|n| !n.is_blank())
        .map(|n| n.text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_become_top_level_nodes() {
        let nodes = parse("<p>One</p><p>Two <a href=\"x\">link</a></p>");
        assert_eq!(
            nodes,
            vec![Node::element("p", "One"), Node::element("p", "Two link")]
        );
    }

    #[test]
    fn text_between_elements_is_its_own_node() {
        let nodes = parse("lead<p>x</p>\n<div>y</div>");
        let texts: Vec<_> = nodes.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["lead", "x", "\n", "y"]);
        assert_eq!(nodes[0].tag, None);
        assert_eq!(nodes[3].tag.as_deref(), Some("div"));
    }

    #[test]
    fn void_elements_do_not_nest() {
        let nodes = parse("<p>a<br>b</p><br/><p>c</p>");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].text, "ab");
        assert!(nodes[1].is_blank());
        assert_eq!(nodes[2].text, "c");
    }

    #[test]
    fn nested_blocks_stay_inside_their_parent() {
        let nodes = parse("<div><p>a</p><p>b</p></div><p>c</p>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text, "ab");
    }

    #[test]
    fn unclosed_element_still_yields_a_node() {
        let nodes = parse("<p>dangling");
        assert_eq!(nodes, vec![Node::element("p", "dangling")]);
    }

    #[test]
    fn comments_are_skipped_and_stray_lt_is_text() {
        let nodes = parse("<!-- note --><p>p < 0.05</p>");
        assert_eq!(nodes, vec![Node::element("p", "p < 0.05")]);
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt; &#233; &#x41; &bogus;"), "a & b <c> é A &bogus;");
    }

    #[test]
    fn typographic_and_portuguese_entities_are_decoded() {
        assert_eq!(
            decode_entities("2010&ndash;2020 &mdash; caf&eacute; &hellip; &ldquo;a&rdquo; &Ccedil;&atilde;o"),
            "2010–2020 — café … “a” Ção"
        );
        assert_eq!(decode_entities("&EACUTE;"), "&EACUTE;");
        let nodes = parse("<p>S&atilde;o Paulo &copy; 2024</p>");
        assert_eq!(nodes[0].text, "São Paulo © 2024");
    }

    #[test]
    fn source_lines_become_escaped_paragraphs() {
        assert_eq!(
            source_to_html("Olá & bem-vindo\n\n   \n x < y "),
            "<p>Olá &amp; bem-vindo</p><p>x &lt; y</p>"
        );
        assert_eq!(source_to_html("  \n"), "");
    }

    #[test]
    fn plain_text_skips_blank_nodes() {
        assert_eq!(html_to_plain("<p>a</p>\n<p> </p><p>b &amp; c</p>"), "a\nb & c");
    }
}
