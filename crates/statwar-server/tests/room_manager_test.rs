//! Room manager behavior tests.

use statwar_core::{GameError, Phase};
use statwar_harness::SimEnv;
use statwar_server::RoomManager;

#[test]
fn created_room_is_a_lobby_hosted_by_its_creator() {
    let env = SimEnv::with_seed(1);
    let mut manager = RoomManager::new();

    let (code, host) = manager.create_room(42, "Alice", &env);

    let room = manager.room(&code).unwrap();
    assert_eq!(host, 42);
    assert_eq!(room.host_id(), 42);
    assert_eq!(room.phase(), Phase::Lobby);
    assert_eq!(room.players().len(), 1);
    assert_eq!(room.code(), &code);
}

#[test]
fn codes_are_unique_among_live_rooms() {
    let env = SimEnv::with_seed(2);
    let mut manager = RoomManager::new();

    for host in 0..200 {
        manager.create_room(host, "Host", &env);
    }
    assert_eq!(manager.room_count(), 200);
}

#[test]
fn join_unknown_room_fails() {
    let mut manager = RoomManager::new();
    let result = manager.join_room(&"ABCD".parse().unwrap(), 7, "Bob");
    assert_eq!(result, Err(GameError::RoomNotFound("ABCD".to_string())));
}

#[test]
fn start_and_play_through_the_manager() {
    let env = SimEnv::with_seed(3);
    let mut manager = RoomManager::new();
    let (code, host) = manager.create_room(1, "Alice", &env);
    manager.join_room(&code, 2, "Bob").unwrap();

    assert_eq!(manager.start_game(&code, 2, &env).unwrap_err(), GameError::NotHost);

    let room = manager.start_game(&code, host, &env).unwrap();
    assert_eq!(room.phase(), Phase::InProgress);
    assert_eq!(room.cards_in_play(), 16);

    let outcome = manager.choose_stat(&code, host, "defense").unwrap();
    assert_eq!(outcome.revealed.len(), 2);
    assert_eq!(manager.room(&code).unwrap().cards_in_play(), 16);
}

#[test]
fn room_is_removed_when_its_last_player_leaves() {
    let env = SimEnv::with_seed(4);
    let mut manager = RoomManager::new();
    let (code, _) = manager.create_room(1, "Alice", &env);
    manager.join_room(&code, 2, "Bob").unwrap();

    let first = manager.remove_player(&code, 1).unwrap();
    assert_eq!(first.new_host, Some(2));
    assert!(manager.has_room(&code));

    let last = manager.remove_player(&code, 2).unwrap();
    assert!(last.room_empty);
    assert!(!manager.has_room(&code));
    assert!(manager.remove_player(&code, 2).is_none());
}

#[test]
fn remove_room_is_idempotent() {
    let env = SimEnv::with_seed(5);
    let mut manager = RoomManager::new();
    let (code, _) = manager.create_room(1, "Alice", &env);

    assert!(manager.remove_room(&code).is_some());
    assert!(manager.remove_room(&code).is_none());
    assert_eq!(manager.room_count(), 0);
}
