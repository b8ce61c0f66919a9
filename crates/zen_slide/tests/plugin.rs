use core::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bits_helpers::player::PlayerIdentity;
use bits_helpers::restart::RestartRequested;
use bits_helpers::{Direction, ScoreQueue};
use zen_slide::{
    PuzzleBoard, PuzzleConfig, PuzzleInput, PuzzleOutcome, PuzzleSession, SessionPhase,
    ZenSlidePlugin,
};

fn app(config: PuzzleConfig) -> (App, ScoreQueue) {
    let queue = ScoreQueue::new();
    let player = PlayerIdentity::new("uid-7").with_email("noor@example.com");
    let plugin = ZenSlidePlugin::new(config.with_seed(11), player, queue.clone())
        .expect("valid config");
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(plugin);
    (app, queue)
}

fn session(app: &App) -> &PuzzleSession {
    app.world().resource::<PuzzleSession>()
}

fn outcomes(app: &App) -> Vec<PuzzleOutcome> {
    app.world()
        .resource::<Events<PuzzleOutcome>>()
        .iter_current_update_events()
        .copied()
        .collect()
}

fn send(app: &mut App, input: PuzzleInput) {
    app.world_mut().send_event(input);
    app.update();
}

#[test]
fn start_level_event_deals_a_board() {
    let (mut app, _) = app(PuzzleConfig::dulce_flow());
    send(&mut app, PuzzleInput::StartLevel);

    assert_eq!(session(&app).phase(), SessionPhase::Playing, "level running");
    assert!(!session(&app).is_solved(), "board is shuffled");
    assert_eq!(
        outcomes(&app),
        vec![PuzzleOutcome::LevelStarted {
            level: 1,
            time_left: Some(60)
        }],
        "screen is told about the new level"
    );
}

#[test]
fn solving_move_reports_and_submits() {
    let (mut app, queue) = app(PuzzleConfig::zen_slide());
    let board = PuzzleBoard::from_numbers(3, &[1, 2, 3, 4, 5, 6, 7, 0, 8]).expect("valid board");
    assert!(
        app.world_mut()
            .resource_mut::<PuzzleSession>()
            .start_level_with(board),
        "level starts"
    );

    send(
        &mut app,
        PuzzleInput::SlideTile {
            tile: 8,
            direction: Direction::Left,
        },
    );

    let events = outcomes(&app);
    assert!(
        events.contains(&PuzzleOutcome::Solved {
            level: 1,
            moves: 1,
            score: 1
        }),
        "solved outcome: {events:?}"
    );
    let submitted = queue.drain();
    assert_eq!(submitted.len(), 1, "one score handed off");
    assert_eq!(
        submitted.first().map(|s| s.player_name.as_str()),
        Some("noor"),
        "e-mail local part used as name"
    );
}

#[test]
fn illegal_slide_emits_nothing() {
    let (mut app, _) = app(PuzzleConfig::zen_slide());
    let board = PuzzleBoard::from_numbers(3, &[2, 1, 3, 4, 5, 6, 7, 8, 0]).expect("valid board");
    app.world_mut()
        .resource_mut::<PuzzleSession>()
        .start_level_with(board.clone());

    send(
        &mut app,
        PuzzleInput::SlideTile {
            tile: 3,
            direction: Direction::Left,
        },
    );

    assert!(outcomes(&app).is_empty(), "silent rejection");
    assert_eq!(session(&app).board(), &board, "board untouched");
    assert_eq!(session(&app).moves(), 0, "no move counted");
}

#[test]
fn swap_mode_taps_go_to_the_booster() {
    let (mut app, _) = app(PuzzleConfig::zen_slide());
    let board = PuzzleBoard::from_numbers(3, &[2, 1, 3, 4, 5, 6, 7, 8, 0]).expect("valid board");
    app.world_mut()
        .resource_mut::<PuzzleSession>()
        .start_level_with(board);

    app.world_mut().send_event(PuzzleInput::ToggleSwapMode);
    app.world_mut().send_event(PuzzleInput::Tap(0));
    app.world_mut().send_event(PuzzleInput::Tap(1));
    app.update();

    assert_eq!(
        outcomes(&app),
        vec![
            PuzzleOutcome::Swapped {
                first: 0,
                second: 1
            },
            PuzzleOutcome::Solved {
                level: 1,
                moves: 0,
                score: 0
            },
        ],
        "booster swap solved the board"
    );
    assert_eq!(session(&app).boosters(), 2, "one booster spent");
}

#[test]
fn swipe_slides_the_gap_neighbour() {
    let (mut app, _) = app(PuzzleConfig::zen_slide());
    let board = PuzzleBoard::from_numbers(3, &[1, 2, 3, 4, 5, 6, 7, 0, 8]).expect("valid board");
    app.world_mut()
        .resource_mut::<PuzzleSession>()
        .start_level_with(board);

    send(&mut app, PuzzleInput::Swipe(Vec2::new(8., 0.)));
    assert_eq!(session(&app).moves(), 0, "too short to count");

    send(&mut app, PuzzleInput::Swipe(Vec2::new(-60., 4.)));
    assert!(session(&app).is_solved(), "8 slid left into the gap");
    assert_eq!(session(&app).moves(), 1, "one move");
}

#[test]
fn last_level_advance_reports_game_over() {
    let config = PuzzleConfig {
        max_levels: Some(1),
        ..PuzzleConfig::zen_slide()
    };
    let (mut app, _) = app(config);
    let board = PuzzleBoard::from_numbers(3, &[1, 2, 3, 4, 5, 6, 7, 0, 8]).expect("valid board");
    app.world_mut()
        .resource_mut::<PuzzleSession>()
        .start_level_with(board);

    app.world_mut().send_event(PuzzleInput::SlideGap(Direction::Left));
    app.world_mut().send_event(PuzzleInput::AdvanceLevel);
    app.world_mut().send_event(PuzzleInput::AdvanceLevel);
    app.update();

    let game_overs = outcomes(&app)
        .into_iter()
        .filter(|o| matches!(o, PuzzleOutcome::GameOver { .. }))
        .count();
    assert_eq!(game_overs, 1, "game over reported once");
    assert!(
        outcomes(&app).contains(&PuzzleOutcome::GameOver { score: 1 }),
        "game over after the only level"
    );
    assert_eq!(session(&app).phase(), SessionPhase::GameOver, "over");

    send(&mut app, PuzzleInput::AdvanceLevel);
    assert!(outcomes(&app).is_empty(), "already over, nothing to report");
}

#[test]
fn restart_request_resets_the_session() {
    let (mut app, _) = app(PuzzleConfig::zen_slide());
    send(&mut app, PuzzleInput::StartLevel);
    assert_eq!(session(&app).phase(), SessionPhase::Playing, "playing");

    app.world_mut().send_event(RestartRequested);
    app.update();

    assert_eq!(session(&app).phase(), SessionPhase::Idle, "back to idle");
    assert_eq!(session(&app).level(), 1, "level 1");
    assert_eq!(session(&app).boosters(), 3, "boosters refilled");
}

#[test]
fn untimed_levels_never_time_out() {
    let (mut app, _) = app(PuzzleConfig::zen_slide());
    send(&mut app, PuzzleInput::StartLevel);
    for _ in 0..5 {
        app.update();
    }
    assert_eq!(session(&app).time_left(), None, "no clock");
    assert_eq!(session(&app).phase(), SessionPhase::Playing, "still playing");
}

/// Every update advances the clock by a quarter second.
fn with_quarter_second_frames(app: &mut App) {
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
        250,
    )));
}

#[test]
fn countdown_times_out_once() {
    let (mut app, _) = app(PuzzleConfig::dulce_flow());
    with_quarter_second_frames(&mut app);
    send(&mut app, PuzzleInput::StartLevel);

    let mut timed_out = 0;
    // 75 seconds of frames, well past the 60 second budget.
    for _ in 0..300 {
        app.update();
        timed_out += outcomes(&app)
            .iter()
            .filter(|o| **o == PuzzleOutcome::TimedOut { level: 1 })
            .count();
    }

    assert_eq!(timed_out, 1, "time-out reported exactly once");
    assert_eq!(session(&app).phase(), SessionPhase::TimedOut, "level lost");
    assert_eq!(session(&app).time_left(), Some(0), "clock ran out");
}

#[test]
fn solved_level_stops_the_clock() {
    let (mut app, queue) = app(PuzzleConfig::dulce_flow());
    with_quarter_second_frames(&mut app);
    let board = PuzzleBoard::from_numbers(3, &[1, 2, 3, 4, 5, 6, 7, 0, 8]).expect("valid board");
    app.world_mut()
        .resource_mut::<PuzzleSession>()
        .start_level_with(board);

    for _ in 0..12 {
        app.update();
    }
    send(&mut app, PuzzleInput::SlideGap(Direction::Left));
    let left = session(&app).time_left().expect("timed level");
    assert!(left < 60, "some time went by: {left}");
    assert_eq!(session(&app).phase(), SessionPhase::Solved, "solved");

    for _ in 0..40 {
        app.update();
    }
    assert_eq!(session(&app).time_left(), Some(left), "clock stopped");
    assert_eq!(session(&app).phase(), SessionPhase::Solved, "still solved");
    assert_eq!(session(&app).score(), left * 10, "bonus from the frozen clock");
    assert_eq!(queue.len(), 1, "score handed off once");
}

#[test]
fn starting_a_level_drops_the_partial_second() {
    let (mut app, _) = app(PuzzleConfig::dulce_flow());
    with_quarter_second_frames(&mut app);
    let board = PuzzleBoard::from_numbers(3, &[1, 2, 3, 4, 5, 6, 7, 0, 8]).expect("valid board");
    app.world_mut()
        .resource_mut::<PuzzleSession>()
        .start_level_with(board);

    // Up to three quarters of a second on the level 1 clock.
    for _ in 0..4 {
        app.update();
    }
    app.world_mut().send_event(PuzzleInput::SlideGap(Direction::Left));
    app.world_mut().send_event(PuzzleInput::AdvanceLevel);
    app.world_mut().send_event(PuzzleInput::StartLevel);
    app.update();
    assert_eq!(session(&app).level(), 2, "on level 2");
    assert_eq!(session(&app).time_left(), Some(55), "full level 2 budget");

    // Three quarters in total on the fresh clock: still no whole second.
    for _ in 0..2 {
        app.update();
    }
    assert_eq!(
        session(&app).time_left(),
        Some(55),
        "leftover fraction from level 1 was discarded"
    );

    app.update();
    assert_eq!(session(&app).time_left(), Some(54), "first full second");
}
