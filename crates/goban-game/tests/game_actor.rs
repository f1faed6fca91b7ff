//! Integration tests for the game actor.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;

use goban_field::FieldError;
use goban_game::{Board, Game, GameError, Gamer};
use goban_types::{Colour, Coord, FieldState, GamerId, PerColour};

const USUAL_SIZE: usize = 9;
const USUAL_KOMI: f64 = 0.0;

fn gamer(id: u64, name: &str) -> Gamer {
    Gamer::new(GamerId(id), name)
}

fn game() -> Game {
    Game::new(USUAL_SIZE, USUAL_KOMI).expect("valid size")
}

/// A token that fires after `ms` milliseconds, standing in for a
/// caller-side deadline.
fn cancel_after(ms: u64) -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        child.cancel();
    });
    token
}

/// Joins Joe and Nick and returns them as (black, white).
async fn join_both(game: &Game) -> (Gamer, Gamer) {
    let joe = gamer(1, "Joe");
    let nick = gamer(2, "Nick");
    game.join(&joe).await.unwrap();
    game.join(&nick).await.unwrap();

    let joe_colour = game.gamer_state(joe.id).await.unwrap().colour;
    match joe_colour {
        Colour::Black => (joe, nick),
        Colour::White => (nick, joe),
    }
}

// =========================================================================
// Construction and seating
// =========================================================================

#[tokio::test]
async fn test_new_rejects_bad_board_size() {
    let result = Game::new(0, USUAL_KOMI);
    assert!(matches!(
        result,
        Err(GameError::Board(FieldError::Size(0)))
    ));
}

#[tokio::test]
async fn test_join_third_gamer_no_place() {
    let game = game();
    game.join(&gamer(1, "Joe")).await.unwrap();
    game.join(&gamer(2, "Nick")).await.unwrap();

    let result = game.join(&gamer(3, "Buss")).await;
    assert_eq!(result, Err(GameError::NoPlace));
}

#[tokio::test]
async fn test_join_after_leave_game_over() {
    let game = game();
    let (black, white) = join_both(&game).await;
    game.leave(black.id).await.unwrap();

    let result = game.join(&gamer(3, "Buss")).await;
    assert_eq!(result, Err(GameError::GameOver));
    // The survivor can still be read while registered.
    assert!(game.gamer_state(white.id).await.is_ok());
}

#[tokio::test]
async fn test_participants_hold_distinct_colours() {
    let game = game();
    let (black, white) = join_both(&game).await;

    let bs = game.gamer_state(black.id).await.unwrap();
    let ws = game.gamer_state(white.id).await.unwrap();
    assert_eq!(bs.colour, Colour::Black);
    assert_eq!(ws.colour, Colour::White);
    assert_eq!(bs.colour.opposite(), ws.colour);
}

#[tokio::test]
async fn test_gamer_state_unknown_id() {
    let game = game();
    game.join(&gamer(1, "Joe")).await.unwrap();

    let result = game.gamer_state(GamerId(99)).await;
    assert_eq!(result, Err(GameError::UnknownGamer(GamerId(99))));
}

#[tokio::test]
async fn test_field_size_and_state_for_registered_gamer() {
    let game = game();
    let joe = gamer(1, "Joe");
    game.join(&joe).await.unwrap();

    assert_eq!(game.field_size(joe.id).await.unwrap(), USUAL_SIZE);
    let state = game.game_state(joe.id).await.unwrap();
    assert!(!state.game_over);
    assert_eq!(
        game.field_size(GamerId(99)).await,
        Err(GameError::UnknownGamer(GamerId(99)))
    );
}

#[tokio::test]
async fn test_is_begun_flips_on_second_join() {
    let game = game();
    let joe = gamer(1, "Joe");
    game.join(&joe).await.unwrap();
    assert!(!game.is_begun(joe.id).await.unwrap());

    game.join(&gamer(2, "Nick")).await.unwrap();
    assert!(game.is_begun(joe.id).await.unwrap());
    assert_eq!(
        game.is_begun(GamerId(99)).await,
        Err(GameError::UnknownGamer(GamerId(99)))
    );
}

// =========================================================================
// wait_begin
// =========================================================================

#[tokio::test]
async fn test_wait_begin_immediate_when_both_seated() {
    let game = game();
    let (black, white) = join_both(&game).await;

    let cancel = cancel_after(100);
    game.wait_begin(black.id, &cancel).await.unwrap();
    game.wait_begin(white.id, &cancel).await.unwrap();
}

#[tokio::test]
async fn test_wait_begin_resolves_on_second_join() {
    let game = game();
    let joe = gamer(1, "Joe");
    game.join(&joe).await.unwrap();

    let waiting = {
        let game = game.clone();
        let id = joe.id;
        tokio::spawn(async move {
            let cancel = cancel_after(1_000);
            game.wait_begin(id, &cancel).await
        })
    };

    // Let the wait park before the second join arrives.
    tokio::time::sleep(Duration::from_millis(10)).await;
    game.join(&gamer(2, "Nick")).await.unwrap();

    assert_eq!(waiting.await.unwrap(), Ok(()));
}

#[tokio::test]
async fn test_wait_begin_cancelled_when_alone() {
    let game = game();
    let joe = gamer(1, "Joe");
    game.join(&joe).await.unwrap();

    let cancel = cancel_after(100);
    let result = game.wait_begin(joe.id, &cancel).await;
    assert_eq!(result, Err(GameError::Cancelled));
}

#[tokio::test]
async fn test_wait_begin_unknown_id_fails_fast() {
    let game = game();
    game.join(&gamer(1, "Joe")).await.unwrap();

    let cancel = cancel_after(100);
    let result = game.wait_begin(GamerId(99), &cancel).await;
    assert_eq!(result, Err(GameError::UnknownGamer(GamerId(99))));
}

#[tokio::test]
async fn test_repeated_wait_begin_releases_the_first_waiter() {
    let game = game();
    let joe = gamer(1, "Joe");
    game.join(&joe).await.unwrap();

    let first = {
        let game = game.clone();
        let id = joe.id;
        tokio::spawn(async move {
            let cancel = cancel_after(1_000);
            game.wait_begin(id, &cancel).await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    // The second wait replaces the parked one; the first caller is
    // woken with a success it should treat as spurious.
    let cancel = cancel_after(50);
    let _ = game.wait_begin(joe.id, &cancel).await;

    assert_eq!(first.await.unwrap(), Ok(()));
}

// =========================================================================
// Turn order
// =========================================================================

#[tokio::test]
async fn test_exactly_one_gamer_to_move() {
    let game = game();
    let (black, white) = join_both(&game).await;

    assert!(game.is_my_turn(black.id).await.unwrap());
    assert!(!game.is_my_turn(white.id).await.unwrap());

    game.make_turn(black.id, Coord::new(1, 1)).await.unwrap();

    assert!(!game.is_my_turn(black.id).await.unwrap());
    assert!(game.is_my_turn(white.id).await.unwrap());
}

#[tokio::test]
async fn test_make_turn_out_of_order() {
    let game = game();
    let (_, white) = join_both(&game).await;

    let result = game.make_turn(white.id, Coord::new(1, 1)).await;
    assert_eq!(result, Err(GameError::NotYourTurn));
}

#[tokio::test]
async fn test_make_turn_bad_position_does_not_advance() {
    let game = game();
    let (black, _) = join_both(&game).await;

    let at = Coord::new(0, 1);
    let result = game.make_turn(black.id, at).await;
    assert_eq!(result, Err(GameError::WrongTurn(FieldError::Position(at))));

    // The rejected move must not consume the turn.
    assert!(game.is_my_turn(black.id).await.unwrap());
}

#[tokio::test]
async fn test_make_turn_occupied_position() {
    let game = game();
    let (black, white) = join_both(&game).await;
    let at = Coord::new(1, 1);
    game.make_turn(black.id, at).await.unwrap();

    let result = game.make_turn(white.id, at).await;
    assert_eq!(result, Err(GameError::WrongTurn(FieldError::Occupied(at))));
}

#[tokio::test]
async fn test_wait_turn_immediate_for_current_gamer() {
    let game = game();
    let (black, _) = join_both(&game).await;

    let cancel = cancel_after(100);
    game.wait_turn(black.id, &cancel).await.unwrap();
}

#[tokio::test]
async fn test_wait_turn_resolves_after_opponent_moves() {
    let game = game();
    let (black, white) = join_both(&game).await;

    let waiting = {
        let game = game.clone();
        let id = white.id;
        tokio::spawn(async move {
            let cancel = cancel_after(1_000);
            game.wait_turn(id, &cancel).await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    game.make_turn(black.id, Coord::new(1, 1)).await.unwrap();

    assert_eq!(waiting.await.unwrap(), Ok(()));
}

#[tokio::test]
async fn test_wait_turn_cancelled_while_opponent_thinks() {
    let game = game();
    let (_, white) = join_both(&game).await;

    let cancel = cancel_after(100);
    let result = game.wait_turn(white.id, &cancel).await;
    assert_eq!(result, Err(GameError::Cancelled));
}

// =========================================================================
// Collapse and teardown
// =========================================================================

#[tokio::test]
async fn test_leave_unknown_id() {
    let game = game();
    game.join(&gamer(1, "Joe")).await.unwrap();

    let result = game.leave(GamerId(99)).await;
    assert_eq!(result, Err(GameError::UnknownGamer(GamerId(99))));
}

#[tokio::test]
async fn test_leave_resolves_pending_wait_with_other_gamer_left() {
    let game = game();
    let (black, white) = join_both(&game).await;

    let waiting = {
        let game = game.clone();
        let id = white.id;
        tokio::spawn(async move {
            let cancel = cancel_after(1_000);
            game.wait_turn(id, &cancel).await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    game.leave(black.id).await.unwrap();

    let result = waiting.await.unwrap();
    assert!(
        matches!(
            result,
            Err(GameError::OtherGamerLeft) | Err(GameError::Unavailable)
        ),
        "unexpected wait result: {result:?}"
    );
}

#[tokio::test]
async fn test_mutations_refused_after_collapse() {
    let game = game();
    let (black, white) = join_both(&game).await;
    game.leave(black.id).await.unwrap();

    assert_eq!(
        game.make_turn(white.id, Coord::new(1, 1)).await,
        Err(GameError::GameOver)
    );
    assert_eq!(game.is_my_turn(white.id).await, Err(GameError::GameOver));
    // Reads of the surviving seat stay answerable.
    assert_eq!(game.gamer_state(white.id).await.unwrap().name, white.name);
}

#[tokio::test]
async fn test_last_leave_destroys_the_session() {
    let game = game();
    let (black, white) = join_both(&game).await;
    game.leave(black.id).await.unwrap();
    game.leave(white.id).await.unwrap();

    // The worker shuts down once the collapsed game empties; give it
    // a beat, then observe the closed queue.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(
        game.gamer_state(white.id).await,
        Err(GameError::Unavailable)
    );
}

#[tokio::test]
async fn test_end_makes_session_unavailable() {
    let game = game();
    game.join(&gamer(1, "Joe")).await.unwrap();

    game.end().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(game.join(&gamer(2, "Nick")).await, Err(GameError::Unavailable));
    assert_eq!(game.end().await, Err(GameError::Unavailable));
}

#[tokio::test]
async fn test_end_resolves_pending_wait_with_destroyed() {
    let game = game();
    let joe = gamer(1, "Joe");
    game.join(&joe).await.unwrap();

    let waiting = {
        let game = game.clone();
        let id = joe.id;
        tokio::spawn(async move {
            let cancel = cancel_after(1_000);
            game.wait_begin(id, &cancel).await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    game.end().await.unwrap();

    let result = waiting.await.unwrap();
    assert!(
        matches!(
            result,
            Err(GameError::Destroyed) | Err(GameError::Unavailable)
        ),
        "unexpected wait result: {result:?}"
    );
}

// =========================================================================
// Handle identity
// =========================================================================

#[tokio::test]
async fn test_clones_share_identity_distinct_games_differ() {
    let a = game();
    let b = game();
    let a2 = a.clone();

    assert_eq!(a, a2);
    assert_ne!(a, b);

    let mut set = std::collections::HashSet::new();
    set.insert(a.clone());
    set.insert(a2);
    set.insert(b);
    assert_eq!(set.len(), 2);
}

// =========================================================================
// The board seam
// =========================================================================

/// An engine that rejects every move, for driving the wrong-turn path
/// without board geometry.
struct BrickedBoard;

impl Board for BrickedBoard {
    fn move_chip(&mut self, colour: Colour, _at: Coord) -> Result<(), FieldError> {
        Err(FieldError::NoChips(colour))
    }

    fn size(&self) -> usize {
        USUAL_SIZE
    }

    fn state(&self) -> FieldState {
        FieldState {
            game_over: true,
            komi: USUAL_KOMI,
            chips_in_cup: PerColour::new(0, 0),
            chips_captured: PerColour::default(),
            chips_on_board: PerColour::default(),
            points_under_control: PerColour::default(),
            scores: PerColour::default(),
        }
    }
}

#[tokio::test]
async fn test_rejected_engine_move_surfaces_as_wrong_turn() {
    let game = Game::with_board(BrickedBoard, StdRng::seed_from_u64(7));
    let (black, _) = join_both(&game).await;

    let result = game.make_turn(black.id, Coord::new(1, 1)).await;
    assert_eq!(
        result,
        Err(GameError::WrongTurn(FieldError::NoChips(Colour::Black)))
    );
    // A rejected move never advances the turn.
    assert!(game.is_my_turn(black.id).await.unwrap());
}
