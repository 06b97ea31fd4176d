//! Property-based tests for editing sessions

use proptest::prelude::*;
use rich_editor::{
    content_to_plain_text, BlockSpan, EditCommand, EditorSession, HeadingLevel, ListKind, Mark,
    Position, Selection,
};

fn command_strategy() -> impl Strategy<Value = EditCommand> {
    prop_oneof![
        (0usize..4, 0usize..20, "[a-z \n]{0,8}").prop_map(|(block, offset, text)| {
            EditCommand::InsertText {
                at: Position::new(block, offset),
                text,
            }
        }),
        (0usize..4, 0usize..20, 0usize..4, 0usize..20).prop_map(|(b1, o1, b2, o2)| {
            EditCommand::DeleteRange {
                selection: Selection::new(Position::new(b1, o1), Position::new(b2, o2)),
            }
        }),
        (0usize..4, 0usize..20, 0usize..20).prop_map(|(block, a, b)| EditCommand::ToggleMark {
            selection: Selection::within(block, a.min(b), a.max(b)),
            mark: Mark::Bold,
        }),
        (0usize..4).prop_map(|i| EditCommand::ToggleHeading {
            span: BlockSpan::single(i),
            level: HeadingLevel::H1,
        }),
        (0usize..4).prop_map(|i| EditCommand::ToggleList {
            span: BlockSpan::single(i),
            kind: ListKind::Bullet,
        }),
        (0usize..4).prop_map(|after| EditCommand::InsertHorizontalRule { after }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn undoing_everything_restores_the_source(
        source in "[A-Za-z ]{0,12}(\n[A-Za-z ]{0,12}){0,3}",
        commands in prop::collection::vec(command_strategy(), 0..16),
    ) {
        let mut session = EditorSession::load(&source);
        for command in commands {
            // Out-of-range commands are rejected without touching the session
            let _ = session.apply(command);
        }
        while session.undo() {}
        prop_assert_eq!(session.content().unwrap(), source);
        prop_assert!(!session.can_undo());
    }

    #[test]
    fn undo_then_redo_is_identity(
        source in "[a-z]{1,10}\n[a-z]{1,10}",
        commands in prop::collection::vec(command_strategy(), 1..10),
    ) {
        let mut session = EditorSession::load(&source);
        for command in commands {
            let _ = session.apply(command);
        }
        let before = session.document().clone();
        if session.undo() {
            prop_assert!(session.redo());
        }
        prop_assert_eq!(session.document(), &before);
    }

    #[test]
    fn plain_text_round_trips_through_the_editor(source in "[A-Za-z0-9 .,]{0,20}(\n[A-Za-z0-9 .,]{0,20}){0,4}") {
        let session = EditorSession::load(&source);
        prop_assert_eq!(session.plain_text(), source.clone());
        prop_assert_eq!(content_to_plain_text(&source), source);
    }
}
