use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use super::*;

fn with_user_turn(text: &str) -> Transcript {
    let mut transcript = Transcript::new();
    transcript.push_user(text).unwrap();
    transcript
}

#[test]
fn deltas_grow_a_single_assistant_turn() {
    let mut transcript = with_user_turn("chest pain, help");
    let generation = GenerationId::new();
    transcript.begin(generation).unwrap();

    assert_eq!(transcript.len(), 1, "turn is created by the first delta");

    transcript.apply_delta(generation, "🚨 ").unwrap();
    let turn = transcript.apply_delta(generation, "Seek help").unwrap();
    assert_eq!(turn, &Turn::assistant("🚨 Seek help"));

    assert_eq!(
        transcript.finalize(generation).unwrap(),
        Some(Turn::assistant("🚨 Seek help"))
    );
    assert_eq!(transcript.turns(), &[
        Turn::user("chest pain, help"),
        Turn::assistant("🚨 Seek help"),
    ]);
    assert_eq!(transcript.open_generation(), None);
}

#[test]
fn deltas_of_another_generation_are_rejected() {
    let mut transcript = with_user_turn("hi");
    let current = GenerationId::new();
    let stale = GenerationId::new();
    transcript.begin(current).unwrap();

    assert_matches!(
        transcript.apply_delta(stale, "late"),
        Err(Error::StaleGeneration { got }) if got == stale
    );
    assert_eq!(transcript.len(), 1);

    transcript.apply_delta(current, "ok").unwrap();
    transcript.finalize(current).unwrap();

    // Once closed, the same generation cannot reopen the turn.
    assert_matches!(
        transcript.apply_delta(current, "more"),
        Err(Error::StaleGeneration { .. })
    );
    assert_eq!(transcript.last(), Some(&Turn::assistant("ok")));
}

#[test]
fn empty_turn_is_not_kept() {
    let mut transcript = with_user_turn("hi");
    let generation = GenerationId::new();
    transcript.begin(generation).unwrap();

    assert_eq!(transcript.finalize(generation).unwrap(), None);
    assert_eq!(transcript.turns(), &[Turn::user("hi")]);
}

#[test]
fn finalize_is_idempotent() {
    let mut transcript = with_user_turn("hi");
    let generation = GenerationId::new();
    transcript.begin(generation).unwrap();
    transcript.apply_delta(generation, "hello").unwrap();

    assert!(transcript.finalize(generation).unwrap().is_some());
    assert_eq!(transcript.finalize(generation).unwrap(), None);
    assert_eq!(transcript.len(), 2);
}

#[test]
fn abandon_discards_partial_text() {
    let mut transcript = with_user_turn("hi");
    let generation = GenerationId::new();
    transcript.begin(generation).unwrap();
    transcript.apply_delta(generation, "partial").unwrap();

    assert_eq!(
        transcript.abandon(generation).unwrap(),
        Some(Turn::assistant("partial"))
    );
    assert_eq!(transcript.turns(), &[Turn::user("hi")]);
    assert_eq!(transcript.open_generation(), None);
}

#[test]
fn only_one_turn_may_be_open() {
    let mut transcript = with_user_turn("hi");
    let first = GenerationId::new();
    transcript.begin(first).unwrap();

    assert_eq!(
        transcript.begin(GenerationId::new()).unwrap_err(),
        Error::TurnOpen(first)
    );
    assert_eq!(transcript.push_user("again").unwrap_err(), Error::TurnOpen(first));
}

#[test]
fn begin_requires_a_preceding_user_turn() {
    let mut transcript = Transcript::new();
    assert_eq!(transcript.begin(GenerationId::new()).unwrap_err(), Error::NoUserTurn);

    let mut transcript = Transcript::from_turns(vec![Turn::user("a"), Turn::assistant("b")]);
    assert_eq!(transcript.begin(GenerationId::new()).unwrap_err(), Error::NoUserTurn);
}

#[test]
fn window_returns_the_most_recent_turns() {
    let turns: Vec<_> = (0..25)
        .map(|i| {
            if i % 2 == 0 {
                Turn::user(i.to_string())
            } else {
                Turn::assistant(i.to_string())
            }
        })
        .collect();
    let transcript = Transcript::from_turns(turns.clone());

    assert_eq!(transcript.window(20), &turns[5..]);
    assert_eq!(transcript.window(100), &turns[..]);
    assert!(transcript.window(0).is_empty());
}
