use std::sync::Arc;

use botbattle_rs::game::GameConfig;
use botbattle_rs::service::{GameService, ServiceError};
use botbattle_rs::store::{MemoryStore, Store};
use botbattle_rs::types::{Action, GameStatus};
use botbattle_rs::GameError;
use uuid::Uuid;

fn service() -> (GameService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (
        GameService::new(store.clone(), GameConfig::default()),
        store,
    )
}

#[test]
fn login_creates_then_finds_the_user() {
    let (service, _) = service();
    let first = service.login("alice").expect("login");
    let second = service.login("alice").expect("login");
    assert_eq!(first.id, second.id);

    let other = service.login("bob").expect("login");
    assert_ne!(first.id, other.id);
}

#[test]
fn create_game_returns_the_existing_waiting_game() {
    let (service, _) = service();
    let first = service.create_game(2).expect("create");
    let second = service.create_game(2).expect("create");
    assert_eq!(first.id, second.id);

    // A different tier gets its own game
    let other = service.create_game(3).expect("create");
    assert_ne!(first.id, other.id);
}

#[test]
fn capacity_derives_from_tier() {
    let (service, _) = service();
    assert_eq!(service.create_game(0).expect("create").max_players, 1);
    assert_eq!(service.create_game(1).expect("create").max_players, 1);
    assert_eq!(service.create_game(2).expect("create").max_players, 2);
    assert_eq!(service.create_game(4).expect("create").max_players, 2);
    assert_eq!(service.create_game(5).expect("create").max_players, 3);
}

#[test]
fn join_is_idempotent_per_user_and_autostarts_at_capacity() {
    let (service, _) = service();
    let game = service.create_game(2).expect("create");
    let alice = service.login("alice").expect("login");
    let bob = service.login("bob").expect("login");

    let p1 = service.join(game.id, alice.id).expect("join");
    let p1_again = service.join(game.id, alice.id).expect("rejoin");
    assert_eq!(p1.id, p1_again.id);

    let waiting = service.get_game(game.id, None).expect("get").expect("present");
    assert_eq!(waiting.state, GameStatus::Waiting);
    assert_eq!(waiting.players.len(), 1);

    service.join(game.id, bob.id).expect("join");
    let running = service.get_game(game.id, None).expect("get").expect("present");
    assert_eq!(running.state, GameStatus::Running);
    assert_eq!(running.turn, 0);
    let positions: Vec<_> = running.players.iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(positions, vec![(0, 5), (10, 5)]);
}

#[test]
fn join_rejected_once_running() {
    let (service, _) = service();
    let game = service.create_game(2).expect("create");
    for name in ["alice", "bob"] {
        let user = service.login(name).expect("login");
        service.join(game.id, user.id).expect("join");
    }

    let late = service.login("carol").expect("login");
    match service.join(game.id, late.id) {
        Err(ServiceError::Game(GameError::JoinClosed)) => {}
        other => panic!("expected JoinClosed, got {other:?}"),
    }
}

#[test]
fn join_requires_known_game_and_user() {
    let (service, _) = service();
    let game = service.create_game(2).expect("create");
    let user = service.login("alice").expect("login");

    match service.join(Uuid::new_v4(), user.id) {
        Err(ServiceError::GameNotFound(_)) => {}
        other => panic!("expected GameNotFound, got {other:?}"),
    }
    match service.join(game.id, Uuid::new_v4()) {
        Err(ServiceError::UserNotFound(_)) => {}
        other => panic!("expected UserNotFound, got {other:?}"),
    }
}

#[test]
fn moves_rejected_unless_running() {
    let (service, _) = service();
    let game = service.create_game(2).expect("create");
    let alice = service.login("alice").expect("login");
    let player = service.join(game.id, alice.id).expect("join");

    match service.submit_move(game.id, player.id, Action::Left) {
        Err(ServiceError::Game(GameError::NotRunning)) => {}
        other => panic!("expected NotRunning, got {other:?}"),
    }
}

#[test]
fn moves_rejected_once_done() {
    let (service, _) = service();
    let game = service.create_game(0).expect("create");
    let alice = service.login("alice").expect("login");
    let player = service.join(game.id, alice.id).expect("join");

    // Single player walking east reaches the gold and ends the match
    for _ in 0..10 {
        service.submit_move(game.id, player.id, Action::Right).expect("move");
    }
    let done = service.get_game(game.id, None).expect("get").expect("present");
    assert_eq!(done.state, GameStatus::Done);

    match service.submit_move(game.id, player.id, Action::Left) {
        Err(ServiceError::Game(GameError::NotRunning)) => {}
        other => panic!("expected NotRunning, got {other:?}"),
    }
}

#[test]
fn moves_rejected_for_unknown_player() {
    let (service, _) = service();
    let game = service.create_game(0).expect("create");
    let alice = service.login("alice").expect("login");
    service.join(game.id, alice.id).expect("join");

    match service.submit_move(game.id, Uuid::new_v4(), Action::Left) {
        Err(ServiceError::Game(GameError::UnknownPlayer(_))) => {}
        other => panic!("expected UnknownPlayer, got {other:?}"),
    }
}

#[test]
fn turn_barrier_waits_for_every_player() {
    let (service, store) = service();
    let game = service.create_game(2).expect("create");
    let alice = service.login("alice").expect("login");
    let bob = service.login("bob").expect("login");
    let p1 = service.join(game.id, alice.id).expect("join");
    let p2 = service.join(game.id, bob.id).expect("join");

    // (1, 5) east of the start is wall, so Up is the open direction
    service.submit_move(game.id, p1.id, Action::Up).expect("move");
    let pending = service.get_game(game.id, None).expect("get").expect("present");
    assert_eq!(pending.turn, 0, "one move must not trigger resolution");
    let unchanged = pending.player_by_id(p1.id).expect("player");
    assert_eq!((unchanged.x, unchanged.y), (0, 5));

    service.submit_move(game.id, p2.id, Action::Left).expect("move");
    let resolved = service.get_game(game.id, None).expect("get").expect("present");
    assert_eq!(resolved.turn, 1, "full move set resolves exactly once");
    let moved = resolved.player_by_id(p1.id).expect("player");
    assert_eq!((moved.x, moved.y), (0, 4));

    assert_eq!(store.all_moves(game.id).expect("moves").len(), 2);
}

#[test]
fn submit_move_is_idempotent_per_turn() {
    let (service, store) = service();
    let game = service.create_game(2).expect("create");
    let alice = service.login("alice").expect("login");
    let bob = service.login("bob").expect("login");
    let p1 = service.join(game.id, alice.id).expect("join");
    service.join(game.id, bob.id).expect("join");

    let first = service.submit_move(game.id, p1.id, Action::Right).expect("move");
    let repeat = service.submit_move(game.id, p1.id, Action::Down).expect("move");
    assert_eq!(first.id, repeat.id);
    assert_eq!(repeat.action, Action::Right, "the recorded move wins");

    let pending = service.get_game(game.id, None).expect("get").expect("present");
    assert_eq!(pending.turn, 0);
    assert_eq!(store.moves_for_turn(game.id, 0).expect("moves").len(), 1);
}

#[test]
fn race_game_plays_to_the_gold_tile() {
    let (service, _) = service();
    let game = service.create_game(0).expect("create");
    let alice = service.login("alice").expect("login");
    let player = service.join(game.id, alice.id).expect("join");

    // Single player: every submission resolves a turn
    for step in 1..=10 {
        service.submit_move(game.id, player.id, Action::Right).expect("move");
        let current = service.get_game(game.id, None).expect("get").expect("present");
        assert_eq!(current.turn, step);
    }

    let done = service.get_game(game.id, None).expect("get").expect("present");
    let p = done.player_by_id(player.id).expect("player");
    assert_eq!((p.x, p.y), (10, 5));
    assert_eq!(p.points, 100);
    assert_eq!(done.state, GameStatus::Done);
}

#[test]
fn get_game_absent_is_none_not_an_error() {
    let (service, _) = service();
    assert!(service.get_game(Uuid::new_v4(), None).expect("get").is_none());
    assert!(service.all_states(Uuid::new_v4()).expect("get").is_none());
}

#[test]
fn delete_game_cascades_to_moves_and_players() {
    let (service, store) = service();
    let game = service.create_game(2).expect("create");
    let alice = service.login("alice").expect("login");
    let bob = service.login("bob").expect("login");
    let p1 = service.join(game.id, alice.id).expect("join");
    let p2 = service.join(game.id, bob.id).expect("join");
    service.submit_move(game.id, p1.id, Action::Right).expect("move");
    service.submit_move(game.id, p2.id, Action::Left).expect("move");

    service.delete_game(game.id).expect("delete");
    assert!(service.get_game(game.id, None).expect("get").is_none());
    assert!(store.all_moves(game.id).expect("moves").is_empty());
    // Users outlive the games they played in
    assert!(service.get_user(alice.id).expect("get").is_some());
}

#[test]
fn delete_game_wins_over_a_racing_move() {
    let (service, store) = service();
    let service = Arc::new(service);
    let game = service.create_game(2).expect("create");
    let alice = service.login("alice").expect("login");
    let bob = service.login("bob").expect("login");
    let p1 = service.join(game.id, alice.id).expect("join");
    let p2 = service.join(game.id, bob.id).expect("join");
    service.submit_move(game.id, p1.id, Action::Up).expect("move");

    // The barrier-releasing move and the delete contend for the game; the
    // aggregate must never be re-persisted after the cascade
    let mover = {
        let service = service.clone();
        let game_id = game.id;
        std::thread::spawn(move || {
            let _ = service.submit_move(game_id, p2.id, Action::Down);
        })
    };
    service.delete_game(game.id).expect("delete");
    mover.join().expect("join thread");

    assert!(service.get_game(game.id, None).expect("get").is_none());
    assert!(store.load_players(game.id).expect("players").is_empty());
}

#[test]
fn canonical_wire_form_uses_integer_codes() {
    let (service, _) = service();
    let game = service.create_game(2).expect("create");
    let alice = service.login("alice").expect("login");
    let bob = service.login("bob").expect("login");
    let p1 = service.join(game.id, alice.id).expect("join");
    service.join(game.id, bob.id).expect("join");
    service.submit_move(game.id, p1.id, Action::Up).expect("move");

    let game = service.get_game(game.id, None).expect("get").expect("present");
    let value = serde_json::to_value(&game).expect("serialize");

    assert_eq!(value["state"], 1);
    assert_eq!(value["turn"], 0);
    assert_eq!(value["length"], 500);
    assert_eq!(value["difficulty"], 2);
    assert_eq!(value["maxPlayers"], 2);
    assert_eq!(value["board"]["width"], 11);
    assert_eq!(value["board"]["height"], 11);
    let tiles = value["board"]["tiles"].as_array().expect("tiles");
    assert_eq!(tiles.len(), 121);
    assert!(tiles[0]["type"].is_u64());
    assert!(tiles[0]["ownerId"].is_null());
    let player = &value["players"][0];
    assert_eq!(player["x"], 0);
    assert_eq!(player["y"], 5);
    assert_eq!(player["health"], 100);
    assert_eq!(player["points"], 0);
    assert_eq!(player["userId"], serde_json::json!(alice.id));

    let mv = service.submit_move(game.id, p1.id, Action::Up).expect("move");
    let mv_value = serde_json::to_value(mv).expect("serialize");
    assert_eq!(mv_value["action"], 3);
    assert_eq!(mv_value["turn"], 0);
}
