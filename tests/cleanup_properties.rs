use proptest::prelude::*;
use ptcopyedit::cleanup::{self, COPY_EDIT_INSTRUCTION};
use ptcopyedit::fragment::Node;

fn node() -> impl Strategy<Value = Node> {
    (
        prop::option::of(prop::sample::select(vec!["p", "div", "h2", "span"])),
        "[a-z .\"\r\n\t]{0,12}",
    )
        .prop_map(|(tag, text)| Node {
            tag: tag.map(str::to_string),
            text,
        })
}

fn fragment_html() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-z .]{0,8}".prop_map(|t| format!("<p>{t}</p>")),
            "[a-z ]{0,8}".prop_map(|t| format!("<div><b>{t}</b></div>")),
            "[a-z \n]{0,8}",
            Just("<br>".to_string()),
            Just("<!-- note -->".to_string()),
            Just("&nbsp;".to_string()),
        ],
        0..8,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn request_starts_with_instruction_and_has_no_blank_content(nodes in prop::collection::vec(node(), 0..10)) {
        let req = cleanup::build_request(&nodes);
        prop_assert_eq!(req.instruction().as_str(), COPY_EDIT_INSTRUCTION);
        prop_assert_eq!(req.content().len(), nodes.iter().filter(|n| !n.is_blank()).count());
        for seg in req.content() {
            prop_assert!(!seg.as_str().trim().is_empty());
        }
    }

    #[test]
    fn request_from_any_fragment_has_no_blank_content(html in fragment_html()) {
        let req = cleanup::build_request_from_html(&html);
        prop_assert_eq!(req.instruction().as_str(), COPY_EDIT_INSTRUCTION);
        prop_assert!(req.content().iter().all(|s| !s.as_str().trim().is_empty()));
    }

    #[test]
    fn one_paragraph_per_non_blank_line(response in "[a-z .\"<&\r\n\t]{0,60}") {
        let paragraphs = cleanup::render_paragraphs(&response);
        let expected = response.lines().filter(|l| !l.trim().is_empty()).count();
        prop_assert_eq!(paragraphs.len(), expected);
        prop_assert!(paragraphs.iter().all(|p| p.starts_with("<p>") && p.ends_with("</p>")));
    }

    #[test]
    fn fix_quotes_is_idempotent_and_leaves_no_period_before_a_quote(line in "[a-z .\"]{0,40}") {
        let once = cleanup::fix_quotes(&line);
        prop_assert_eq!(cleanup::fix_quotes(&once), once.clone());
        prop_assert!(!once.contains(".\""));
        prop_assert_eq!(once.len(), line.len());
    }
}
