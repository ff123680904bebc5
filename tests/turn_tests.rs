//! Turn flow integration tests: repeats, restarts, freezes and switching.

use tile_race::board::{BoardLayout, TileKind};
use tile_race::core::{ControlMode, MatchConfig, RuleError, Side, SwitchPolicy};
use tile_race::game::{Match, MatchEvent, MatchStatus, UiInput};
use tile_race::tokens::{Landing, TokenId, TokenStatus};
use tile_race::turn::Phase;

fn first(slot: u8) -> TokenId {
    TokenId::new(Side::First, slot)
}

fn second(slot: u8) -> TokenId {
    TokenId::new(Side::Second, slot)
}

fn hot_seat() -> Match {
    Match::new(MatchConfig::hot_seat().with_first_side(Side::First)).unwrap()
}

// =============================================================================
// Repeat Tiles
// =============================================================================

#[test]
fn test_repeat_tile_keeps_turn() {
    let mut game = hot_seat();
    // Index 3 is a private repeat tile
    game.arrange(first(0), TokenStatus::Deployed { index: 1 }).unwrap();
    game.start().unwrap();
    game.take_events();

    game.force_roll(2).unwrap();
    game.select(0).unwrap();

    assert_eq!(game.active(), Side::First);
    assert_eq!(game.phase(), Phase::RollPending);
    assert_eq!(game.turn_number(), 1);

    let events = game.take_events();
    assert!(events.contains(&MatchEvent::RepeatGranted { side: Side::First }));
    assert!(!events.iter().any(MatchEvent::is_switch));
}

#[test]
fn test_repeat_tile_evicts_before_repeat() {
    let mut game = hot_seat();
    // Index 7 is a shared repeat tile
    game.arrange(first(0), TokenStatus::Deployed { index: 6 }).unwrap();
    game.arrange(second(2), TokenStatus::Deployed { index: 7 }).unwrap();
    game.start().unwrap();

    game.force_roll(1).unwrap();
    let outcome = game.select(0).unwrap();

    assert_eq!(outcome.evicted.as_slice(), &[second(2)]);
    assert!(game.table().token(second(2)).unwrap().is_undeployed());
    assert_eq!(game.active(), Side::First);
    assert_eq!(game.phase(), Phase::RollPending);
}

// =============================================================================
// Restart Tiles
// =============================================================================

fn remote_first() -> Match {
    Match::new(
        MatchConfig::hot_seat()
            .with_first_side(Side::First)
            .with_control(Side::First, ControlMode::RemoteProxy),
    )
    .unwrap()
}

#[test]
fn test_restart_kick_back_skips_eviction() {
    let mut game = remote_first();
    // Index 9 is the shared restart tile
    game.arrange(first(0), TokenStatus::Deployed { index: 6 }).unwrap();
    game.arrange(second(0), TokenStatus::Deployed { index: 9 }).unwrap();
    game.start().unwrap();

    let outcome = game.apply_remote_move(Side::First, 0, 3, Some(true)).unwrap();

    assert!(matches!(outcome.landing, Landing::KickedBack { index: 9, .. }));
    assert!(outcome.evicted.is_empty());
    assert!(game.table().token(first(0)).unwrap().is_undeployed());
    assert!(game.table().token(second(0)).unwrap().is_deployed());
    assert_eq!(game.active(), Side::Second);
}

#[test]
fn test_restart_survivor_evicts() {
    let mut game = remote_first();
    game.arrange(first(0), TokenStatus::Deployed { index: 6 }).unwrap();
    game.arrange(second(0), TokenStatus::Deployed { index: 9 }).unwrap();
    game.start().unwrap();

    let outcome = game.apply_remote_move(Side::First, 0, 3, Some(false)).unwrap();

    assert!(matches!(outcome.landing, Landing::Settled { index: 9, .. }));
    assert_eq!(outcome.restart_outcome(), Some(false));
    assert_eq!(outcome.evicted.as_slice(), &[second(0)]);
    assert_eq!(game.active(), Side::Second);

    let events = game.take_events();
    assert!(events.contains(&MatchEvent::RestartResolved {
        token: first(0),
        kicked_back: false
    }));
}

#[test]
fn test_remote_move_must_be_legal() {
    let mut game = remote_first();
    game.arrange(first(0), TokenStatus::Deployed { index: 1 }).unwrap();
    game.start().unwrap();
    let before = game.snapshot();

    // Tile 1 is taken, so no undeployed token can deploy with a 2
    let err = game.apply_remote_move(Side::First, 3, 2, None).unwrap_err();
    assert_eq!(err, RuleError::IneligibleToken { token: first(3), roll: 2 });
    assert_eq!(game.snapshot(), before);

    let err = game.apply_remote_move(Side::Second, 0, 1, None).unwrap_err();
    assert_eq!(err, RuleError::NotActive { side: Side::Second });
}

// =============================================================================
// Freeze
// =============================================================================

#[test]
fn test_frozen_without_undeployed_passes() {
    let mut game = hot_seat();
    for (slot, index) in [0, 1, 2, 3, 4, 6, 8].into_iter().enumerate() {
        game.arrange(second(slot as u8), TokenStatus::Deployed { index }).unwrap();
    }
    game.arrange(first(0), TokenStatus::Deployed { index: 4 }).unwrap();
    game.start().unwrap();
    game.take_events();

    // Freeze tile at index 5
    game.force_roll(1).unwrap();
    game.select(0).unwrap();

    let events = game.take_events();
    assert!(events.contains(&MatchEvent::Frozen { side: Side::Second }));
    assert!(events.contains(&MatchEvent::Passed { side: Side::Second }));
    assert_eq!(game.active(), Side::First);
    assert_eq!(game.turn_number(), 3);
    assert!(!game.engine(Side::Second).is_frozen());
}

#[test]
fn test_freeze_lasts_through_repeat() {
    let layout = BoardLayout::plain()
        .with_kind(1, TileKind::Repeat)
        .with_kind(5, TileKind::Freeze);
    let mut game = Match::new(
        MatchConfig::hot_seat()
            .with_first_side(Side::Second)
            .with_layout(layout),
    )
    .unwrap();
    game.arrange(first(0), TokenStatus::Deployed { index: 8 }).unwrap();
    game.arrange(second(0), TokenStatus::Deployed { index: 4 }).unwrap();
    game.start().unwrap();

    game.force_roll(1).unwrap();
    game.select(0).unwrap();
    assert_eq!(game.active(), Side::First);
    assert!(game.engine(Side::First).is_frozen());

    // Deploy onto the repeat tile; the extra roll is still frozen
    game.force_roll(2).unwrap();
    assert!(!game.view().selectable[0]);
    game.select(1).unwrap();
    assert_eq!(game.active(), Side::First);
    assert_eq!(game.phase(), Phase::RollPending);
    assert!(game.engine(Side::First).is_frozen());

    game.force_roll(1).unwrap();
    let view = game.view();
    assert!(!view.selectable[0]);
    assert!(!view.selectable[1]);
    assert!(view.selectable[2]);

    game.select(2).unwrap();
    assert_eq!(game.active(), Side::Second);
    assert!(!game.engine(Side::First).is_frozen());
}

// =============================================================================
// Ending Turns
// =============================================================================

#[test]
fn test_end_twice_switches_once() {
    let mut game = Match::new(
        MatchConfig::hot_seat()
            .with_first_side(Side::First)
            .with_switch_policy(SwitchPolicy::Deferred),
    )
    .unwrap();
    game.start().unwrap();
    game.take_events();

    game.force_end().unwrap();
    game.force_end().unwrap();

    let events = game.take_events();
    let ended = events
        .iter()
        .filter(|e| matches!(e, MatchEvent::TurnEnded { .. }))
        .count();
    assert_eq!(ended, 1);
    assert_eq!(game.status(), MatchStatus::AwaitingSwitch);
    assert_eq!(game.active(), Side::First);
}

#[test]
fn test_pass_roll_switches_immediately() {
    let mut game = hot_seat();
    game.start().unwrap();

    game.force_roll(0).unwrap();

    assert_eq!(game.active(), Side::Second);
    assert_eq!(game.engine(Side::First).phase(), Phase::Idle);
    assert_eq!(game.phase(), Phase::RollPending);
}

#[test]
fn test_roll_input_outside_roll_phase() {
    let mut game = hot_seat();
    game.start().unwrap();
    game.force_roll(3).unwrap();

    let err = game.handle_input(UiInput::RollRequested).unwrap_err();
    assert!(matches!(err, RuleError::WrongPhase { phase: Phase::SelectionPending, .. }));
    assert_eq!(game.engine(Side::First).rolled(), 3);
}

// =============================================================================
// Computer Side
// =============================================================================

#[test]
fn test_computer_two_step_turn() {
    let mut game = Match::new(MatchConfig::default().with_first_side(Side::Second)).unwrap();
    game.start().unwrap();

    let roll = game.request_roll().unwrap();
    assert!((1..=3).contains(&roll));
    assert_eq!(game.phase(), Phase::SelectionPending);

    let outcome = game.after_delay().unwrap().unwrap();
    assert_eq!(outcome.token.side, Side::Second);
    assert_eq!(outcome.roll, roll);
    // Deploy tiles have no effect, so the turn passes to the human
    assert_eq!(game.active(), Side::First);
    assert_eq!(
        game.after_delay().unwrap_err(),
        RuleError::WrongController {
            side: Side::First,
            expected: ControlMode::Heuristic
        }
    );
}
