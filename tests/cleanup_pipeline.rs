use ptcopyedit::cleanup::{self, TextSegment, COPY_EDIT_INSTRUCTION};
use ptcopyedit::fragment::{self, Node};

fn content(html: &str) -> Vec<String> {
    cleanup::build_request_from_html(html)
        .content()
        .iter()
        .map(|s| s.as_str().to_string())
        .collect()
}

#[test]
fn example_fragment_drops_the_empty_node() {
    let nodes = vec![
        Node::element("p", "Results show effect."),
        Node::element("p", ""),
        Node::element("p", "  p < 0.05  "),
    ];
    let req = cleanup::build_request(&nodes);
    assert_eq!(
        req.segments,
        vec![
            TextSegment(COPY_EDIT_INSTRUCTION.into()),
            TextSegment("Results show effect.".into()),
            TextSegment("  p < 0.05  ".into()),
        ]
    );
}

#[test]
fn translated_markup_keeps_document_order() {
    let html = "<p>Primeiro.</p>\n<p></p>\n<p>Segundo <em>ponto</em>.</p>\n<ul><li>a</li><li>b</li></ul>";
    assert_eq!(content(html), vec!["Primeiro.", "Segundo ponto.", "ab"]);
}

#[test]
fn instruction_segment_is_always_first() {
    for html in ["", "<p></p>", "text", "<p>a</p><p>b</p>", "  \n  "] {
        let req = cleanup::build_request_from_html(html);
        assert_eq!(req.instruction().as_str(), COPY_EDIT_INSTRUCTION, "fragment {html:?}");
        assert!(req.content().iter().all(|s| !s.as_str().trim().is_empty()));
    }
}

#[test]
fn example_response_renders_two_paragraphs() {
    assert_eq!(
        cleanup::render_paragraphs("Line one.\"\n\n  \nLine two"),
        vec!["<p>Line one\".</p>".to_string(), "<p>Line two</p>".to_string()]
    );
}

#[test]
fn rendered_output_round_trips_through_the_fragment_parser() {
    let response = "The 17th of May.\n\nSmith, Jones, and Brown said \"yes.\"\n";
    let html = cleanup::render_html(response);
    assert_eq!(
        fragment::html_to_plain(&html),
        "The 17th of May.\nSmith, Jones, and Brown said \"yes\"."
    );
    let again = cleanup::build_request_from_html(&html);
    assert_eq!(again.content().len(), 2);
}
