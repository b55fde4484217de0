use fixer_core::{update, FixerState, Msg};

#[test]
fn update_is_noop() {
    let state = FixerState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
