use folio_babel::{
    from_html, from_markdown, from_sectioned, to_html, to_markdown, to_sectioned, ContentNode,
    HeadingLevel, UnifiedContent,
};
use proptest::prelude::*;

/// Words, emphasis and stray syntax characters, separated by single spaces.
fn token() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z][a-z0-9]{0,7}",
        1 => Just("#".to_string()),
        1 => Just("1.".to_string()),
        1 => Just("*".to_string()),
        1 => Just("|".to_string()),
        1 => Just("\\".to_string()),
        1 => Just("\\*".to_string()),
        1 => "[a-z]{1,5}\\|[a-z]{1,5}",
        1 => "\\*[a-z]{1,5}\\*",
        1 => "\\*\\*[a-z]{1,5}\\*\\*",
    ]
}

fn text() -> impl Strategy<Value = String> {
    prop::collection::vec(token(), 1..6).prop_map(|tokens| tokens.join(" "))
}

fn node() -> impl Strategy<Value = ContentNode> {
    prop_oneof![
        text().prop_map(ContentNode::paragraph),
        (1u8..=6, text()).prop_map(|(level, content)| {
            ContentNode::heading(HeadingLevel::clamped(level as usize), content)
        }),
        (any::<bool>(), prop::collection::vec(text(), 1..4))
            .prop_map(|(ordered, items)| ContentNode::list(ordered, items)),
        (1usize..4, 0usize..3).prop_flat_map(|(columns, rows)| {
            (
                prop::collection::vec(text(), columns),
                prop::collection::vec(prop::collection::vec(text(), columns), rows),
            )
                .prop_map(|(headers, rows)| {
                    ContentNode::table(headers, rows).expect("rectangular by construction")
                })
        }),
    ]
}

fn document() -> impl Strategy<Value = UnifiedContent> {
    prop::collection::vec(node(), 0..8).prop_map(UnifiedContent::new)
}

proptest! {
    #[test]
    fn markdown_round_trip_preserves_nodes(doc in document()) {
        let markdown = to_markdown(&doc).unwrap();
        prop_assert_eq!(from_markdown(&markdown).content, doc.normalized().content);
    }

    #[test]
    fn html_round_trip_preserves_nodes(doc in document()) {
        let html = to_html(&doc).unwrap();
        prop_assert_eq!(from_html(&html).content, doc.normalized().content);
    }

    #[test]
    fn normalized_documents_are_round_trip_fixed_points(doc in document()) {
        let doc = doc.normalized();
        prop_assert_eq!(&from_markdown(&to_markdown(&doc).unwrap()).content, &doc.content);
        prop_assert_eq!(&from_html(&to_html(&doc).unwrap()).content, &doc.content);
        prop_assert_eq!(doc.clone().normalized(), doc);
    }

    #[test]
    fn markdown_export_is_idempotent(doc in document()) {
        let once = to_markdown(&doc).unwrap();
        let twice = to_markdown(&from_markdown(&once)).unwrap();
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn sectioned_round_trip_preserves_markdown(doc in document()) {
        let sections = to_sectioned(&doc).unwrap();
        let orders: Vec<usize> = sections.iter().map(|s| s.order).collect();
        prop_assert_eq!(orders, (0..sections.len()).collect::<Vec<_>>());

        let back = from_sectioned(&sections);
        prop_assert_eq!(to_markdown(&back).unwrap(), to_markdown(&doc).unwrap());
    }
}

#[test]
fn literal_syntax_in_text_is_escaped_once() {
    for (typed, stored) in [
        ("1. not a list", "1\\. not a list"),
        ("# not heading", "\\# not heading"),
        ("a  \nb", "a\\\nb"),
        ("  lead", "lead"),
    ] {
        let doc = UnifiedContent::new(vec![ContentNode::paragraph(typed)]);
        let expected = vec![ContentNode::paragraph(stored)];
        assert_eq!(doc.clone().normalized().content, expected, "{typed:?}");
        assert_eq!(from_markdown(&to_markdown(&doc).unwrap()).content, expected, "{typed:?}");
        assert_eq!(from_html(&to_html(&doc).unwrap()).content, expected, "{typed:?}");
    }
}
