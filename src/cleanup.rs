use crate::fragment::{self, Node};

// https://cloud.google.com/vertex-ai/generative-ai/docs/learn/prompts/system-instruction-introduction
pub const SYSTEM_INSTRUCTION: &str = "
You are a professional translator translating text from Portuguese to English.

You have been given some text which has been roughly translated from Portuguese to English.

Your task is to rewrite it so it's more idiomatic.

Remove parenthetical commas.

Do not dramatically change the voice of the text - this is for a professional scientific audience.

Retain all names and do not shorten them.

Use British English spelling and grammar.

Use Oxford commas.

When dealing with dates spell them out, for example \"17\" should be written as \"the 17th\".

When dealing with pronouns, check that they match the gender of the subject.

Do not change the paragraphs of the original text.
";

pub const COPY_EDIT_INSTRUCTION: &str = "Copy edit the following text:";

/// One prompt part sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment(pub String);

impl TextSegment {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupRequest {
    pub system_instruction: String,
    /// Always starts with the copy-edit instruction.
    pub segments: Vec<TextSegment>,
}

impl CleanupRequest {
    pub fn instruction(&self) -> &TextSegment {
        &self.segments[0]
    }

    pub fn content(&self) -> &[TextSegment] {
        &self.segments[1..]
    }
}

/// Blank nodes are dropped; the rest keep their untrimmed text.
pub fn build_request(nodes: &[Node]) -> CleanupRequest {
    let segments = std::iter::once(TextSegment(COPY_EDIT_INSTRUCTION.to_string()))
        .chain(
            nodes
                .iter()
                .filter(|n| !n.is_blank())
                .map(|n| TextSegment(n.text.clone())),
        )
        .collect();
    CleanupRequest {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        segments,
    }
}

pub fn build_request_from_html(html: &str) -> CleanupRequest {
    build_request(&fragment::parse(html))
}

/// The model likes to put the full stop inside closing quotes. Moves every
/// run of periods directly before a `"` to just after it, so `etc.."`
/// becomes `etc"..`. The result never contains `."`.
pub fn fix_quotes(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        if c == '"' {
            let kept = out.trim_end_matches('.').len();
            let dots = out.len() - kept;
            out.truncate(kept);
            out.push('"');
            out.extend(std::iter::repeat('.').take(dots));
        } else {
            out.push(c);
        }
    }
    out
}

pub fn render_paragraphs(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(fix_quotes)
        .map(|l| format!("<p>{}</p>", fragment::escape_text(&l)))
        .collect()
}

pub fn render_html(response: &str) -> String {
    render_paragraphs(response).concat()
}
