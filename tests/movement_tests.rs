//! Movement and capture integration tests.

use tile_race::board::BoardLayout;
use tile_race::core::{MatchConfig, RuleError, Side};
use tile_race::game::{Match, MatchEvent, MatchStatus};
use tile_race::tokens::{Table, TokenId, TokenStatus, UNDEPLOYED};
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

fn occupants_at(game: &Match, index: i32, side: Side) -> Vec<TokenId> {
    game.table().board().tile_at(index, side).unwrap().occupants().to_vec()
}

// =============================================================================
// Basic Movement
// =============================================================================

#[test]
fn test_move_onto_empty_tile() {
    let mut game = hot_seat();
    game.arrange(first(0), TokenStatus::Deployed { index: 5 }).unwrap();
    game.start().unwrap();

    game.force_roll(3).unwrap();
    let outcome = game.select(0).unwrap();

    assert_eq!(outcome.from, Some(5));
    assert_eq!(game.table().token(first(0)).unwrap().status(), TokenStatus::Deployed { index: 8 });
    assert!(occupants_at(&game, 5, Side::First).is_empty());
    assert_eq!(occupants_at(&game, 8, Side::First), vec![first(0)]);
    assert_eq!(game.active(), Side::Second);
}

#[test]
fn test_deploy_from_start() {
    let mut game = hot_seat();
    game.start().unwrap();

    game.force_roll(1).unwrap();
    game.select(4).unwrap();

    let token = game.table().token(first(4)).unwrap();
    assert_eq!(token.status(), TokenStatus::Deployed { index: 0 });
    assert_eq!(token.start_slot(), 4);
}

#[test]
fn test_same_side_blocks_at_capacity() {
    let mut table = Table::new(BoardLayout::default()).unwrap();
    // Index 6 holds a single token
    table.set_status(first(0), TokenStatus::Deployed { index: 6 }).unwrap();
    table.set_status(first(1), TokenStatus::Deployed { index: 4 }).unwrap();

    assert!(!table.can_move_to(first(1), 2));
    assert!(table.can_move_to(first(1), 3));
}

#[test]
fn test_capacity_four_tile_stacks() {
    let mut table = Table::new(BoardLayout::default()).unwrap();
    for slot in 0..3 {
        table.set_status(first(slot), TokenStatus::Deployed { index: 8 }).unwrap();
    }
    table.set_status(first(3), TokenStatus::Deployed { index: 6 }).unwrap();

    assert!(table.can_move_to(first(3), 2));
    table.commit_move(first(3), 2, || false).unwrap();

    let tile = table.board().tile_at(8, Side::First).unwrap();
    assert_eq!(tile.count_for(Side::First), 4);
    assert_eq!(tile.top(), Some(first(3)));
    assert!(table.board().is_at_capacity(tile, Side::First));
}

// =============================================================================
// Finishing
// =============================================================================

#[test]
fn test_finish_from_last_private_tiles() {
    let mut game = hot_seat();
    game.arrange(first(0), TokenStatus::Deployed { index: 12 }).unwrap();
    game.start().unwrap();

    game.force_roll(3).unwrap();
    game.select(0).unwrap();

    assert!(game.table().token(first(0)).unwrap().is_finished());
    assert!(occupants_at(&game, 12, Side::First).is_empty());
    assert_eq!(game.active(), Side::Second);

    let events = game.take_events();
    assert!(events.contains(&MatchEvent::TokenFinished { token: first(0) }));
}

#[test]
fn test_finish_last_token_ends_game() {
    let mut game = hot_seat();
    for slot in 1..7 {
        game.arrange(first(slot), TokenStatus::Finished).unwrap();
    }
    game.arrange(first(0), TokenStatus::Deployed { index: 12 }).unwrap();
    game.start().unwrap();

    game.force_roll(3).unwrap();
    game.select(0).unwrap();

    assert_eq!(game.status(), MatchStatus::Over { winner: Side::First });
    assert_eq!(game.view().winner, Some(Side::First));
    assert_eq!(game.force_roll(1).unwrap_err(), RuleError::MatchOver);
}

#[test]
fn test_exact_landing_on_last_tile() {
    let mut game = hot_seat();
    game.arrange(first(0), TokenStatus::Deployed { index: 11 }).unwrap();
    game.start().unwrap();

    game.force_roll(2).unwrap();
    game.select(0).unwrap();

    assert_eq!(game.table().token(first(0)).unwrap().status(), TokenStatus::Deployed { index: 13 });
}

#[test]
fn test_wrapped_finish_past_full_tile_zero() {
    let mut table = Table::new(BoardLayout::default()).unwrap();
    table.set_status(first(0), TokenStatus::Deployed { index: 0 }).unwrap();
    table.set_status(first(1), TokenStatus::Deployed { index: 13 }).unwrap();

    assert!(table.can_move_to(first(1), 1));
    let outcome = table.commit_move(first(1), 1, || false).unwrap();

    assert!(outcome.evicted.is_empty());
    assert!(table.token(first(1)).unwrap().is_finished());
    // The token that was on tile 0 is untouched
    assert_eq!(table.token(first(0)).unwrap().status(), TokenStatus::Deployed { index: 0 });
}

// =============================================================================
// Capture
// =============================================================================

#[test]
fn test_capture_lone_enemy() {
    let mut game = hot_seat();
    game.arrange(first(0), TokenStatus::Deployed { index: 5 }).unwrap();
    game.arrange(second(3), TokenStatus::Deployed { index: 8 }).unwrap();
    game.start().unwrap();

    game.force_roll(3).unwrap();
    let outcome = game.select(0).unwrap();

    assert_eq!(outcome.evicted.as_slice(), &[second(3)]);
    let victim = game.table().token(second(3)).unwrap();
    assert_eq!(victim.status(), TokenStatus::Undeployed);
    assert_eq!(victim.position(), UNDEPLOYED);
    assert_eq!(victim.start_slot(), 3);
    assert_eq!(occupants_at(&game, 8, Side::First), vec![first(0)]);

    let events = game.take_events();
    assert!(events.contains(&MatchEvent::TokenCaptured {
        token: second(3),
        by: first(0)
    }));
}

#[test]
fn test_capture_evicts_every_enemy_on_stack() {
    let mut table = Table::new(BoardLayout::default()).unwrap();
    table.set_status(second(0), TokenStatus::Deployed { index: 8 }).unwrap();
    table.set_status(second(1), TokenStatus::Deployed { index: 8 }).unwrap();
    table.set_status(first(5), TokenStatus::Deployed { index: 8 }).unwrap();
    table.set_status(first(0), TokenStatus::Deployed { index: 6 }).unwrap();

    assert_eq!(table.killable_pieces_for_roll(first(0), 2).len(), 2);
    let outcome = table.commit_move(first(0), 2, || false).unwrap();

    assert_eq!(outcome.evicted.len(), 2);
    let tile = table.board().tile_at(8, Side::First).unwrap();
    assert_eq!(tile.occupants(), &[first(5), first(0)]);
    assert!(table.is_consistent());
}

#[test]
fn test_private_tiles_never_capture() {
    let mut table = Table::new(BoardLayout::default()).unwrap();
    table.set_status(second(0), TokenStatus::Deployed { index: 1 }).unwrap();

    assert!(table.killable_pieces_for_roll(first(0), 2).is_empty());
    let outcome = table.commit_move(first(0), 2, || false).unwrap();

    assert!(outcome.evicted.is_empty());
    assert!(table.token(second(0)).unwrap().is_deployed());
}

// =============================================================================
// Freeze
// =============================================================================

#[test]
fn test_frozen_side_only_deploys() {
    let mut game = hot_seat();
    // Index 5 is the freeze tile on the default board
    game.arrange(first(0), TokenStatus::Deployed { index: 4 }).unwrap();
    game.arrange(second(0), TokenStatus::Deployed { index: 9 }).unwrap();
    game.start().unwrap();

    game.force_roll(1).unwrap();
    game.select(0).unwrap();
    assert!(game.take_events().contains(&MatchEvent::Frozen { side: Side::Second }));

    game.force_roll(2).unwrap();
    let view = game.view();
    assert_eq!(view.phase, Phase::SelectionPending);
    assert!(!view.selectable[0]);
    for slot in view.selectable_slots() {
        assert!(game.table().token(second(slot)).unwrap().is_undeployed());
    }

    assert!(matches!(game.select(0).unwrap_err(), RuleError::IneligibleToken { .. }));
    game.select(1).unwrap();
    assert!(!game.engine(Side::Second).is_frozen());
}

// =============================================================================
// Zero Roll
// =============================================================================

#[test]
fn test_zero_roll_never_moves() {
    let mut table = Table::new(BoardLayout::default()).unwrap();
    table.set_status(first(0), TokenStatus::Deployed { index: 7 }).unwrap();
    table.set_status(second(0), TokenStatus::Finished).unwrap();

    for side in Side::ALL {
        for id in TokenId::all(side) {
            assert_eq!(table.target_tile(id, 0), None);
            assert!(!table.can_move_to(id, 0));
        }
    }
    assert!(table.commit_move(first(0), 0, || false).is_err());
}
