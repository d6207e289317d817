use folio_babel::{to_markdown, ContentNode, EditorMode, HeadingLevel, UnifiedContent};
use folio_editor::{Draft, EditorState, SwitcherSettings};
use proptest::prelude::*;

fn text() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}( [a-z0-9]{1,8}){0,3}"
}

fn document() -> impl Strategy<Value = UnifiedContent> {
    let node = prop_oneof![
        text().prop_map(ContentNode::paragraph),
        (2u8..=3, text()).prop_map(|(level, content)| {
            ContentNode::heading(HeadingLevel::clamped(level as usize), content)
        }),
        prop::collection::vec(text(), 1..4).prop_map(|items| ContentNode::list(false, items)),
    ];
    prop::collection::vec(node, 0..6).prop_map(UnifiedContent::new)
}

const MODES: [EditorMode; 3] = [
    EditorMode::Traditional,
    EditorMode::Markdown,
    EditorMode::Sectioned,
];

proptest! {
    #[test]
    fn content_survives_any_switch_path(doc in document(), path in prop::collection::vec(0usize..3, 1..5)) {
        let expected = to_markdown(&doc).unwrap();
        let mut state = EditorState::open(doc, EditorMode::Markdown, &SwitcherSettings::default()).unwrap();
        for index in path {
            state.switch_to(MODES[index]).unwrap();
        }
        state.switch_to(EditorMode::Markdown).unwrap();
        prop_assert_eq!(state.draft(), &Draft::Markdown(expected));
    }

    #[test]
    fn switching_to_the_current_mode_changes_nothing(doc in document(), mode in 0usize..3) {
        let mode = MODES[mode];
        let mut state = EditorState::open(doc, mode, &SwitcherSettings::default()).unwrap();
        let draft = state.draft().clone();
        let content = state.content().clone();
        state.switch_to(mode).unwrap();
        prop_assert_eq!(state.draft(), &draft);
        prop_assert_eq!(state.content(), &content);
    }
}

#[test]
fn html_edit_is_visible_in_sections() {
    let mut state = EditorState::new(EditorMode::Traditional, &SwitcherSettings::default());
    state
        .edit_html("<h2>📸 Camera</h2><p>Great in <b>daylight</b>.</p><h2>Battery</h2><p>Two days.</p>")
        .unwrap();
    state.switch_to(EditorMode::Sectioned).unwrap();

    let Draft::Sectioned(sections) = state.draft() else {
        panic!("expected sections, got {:?}", state.draft());
    };
    let bodies: Vec<(&str, &str)> = sections
        .iter()
        .map(|s| (s.section_type.as_str(), s.content.as_str()))
        .collect();
    assert_eq!(
        bodies,
        vec![("camera", "Great in **daylight**."), ("battery", "Two days.")]
    );
}

#[test]
fn section_edit_is_visible_in_html() {
    let mut state = EditorState::new(EditorMode::Sectioned, &SwitcherSettings::default());
    let verdict_id = match state.draft() {
        Draft::Sectioned(sections) => sections.as_slice()[10].id.clone(),
        other => panic!("expected sections, got {other:?}"),
    };
    state
        .edit_sections(|sections| {
            sections.update(&verdict_id, |section| section.content = "Buy it.".into())
        })
        .unwrap();
    state.switch_to(EditorMode::Traditional).unwrap();

    let Draft::Traditional(html) = state.draft() else {
        panic!("expected html");
    };
    assert!(html.ends_with("<p class=\"folio-paragraph\">Buy it.</p>"), "{html}");
    assert!(html.contains(&format!("data-section_id=\"{verdict_id}\"")));
}
