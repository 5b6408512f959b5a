//! Fuzz target for the server driver
//!
//! Drives `ServerDriver` with arbitrary client traffic: well-formed actions
//! aimed at real and made-up rooms, raw frames, reconnects and disconnects.
//!
//! # Invariants
//!
//! - The driver never panics and never reports a driver error for events
//!   the runtime could actually produce
//! - Every live room passes the harness invariants after every event
//! - A seated session always points at a live room that seats it
//! - Broadcasts only address connected sessions

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use statwar_harness::{InvariantRegistry, SimEnv, SystemSnapshot};
use statwar_proto::{
    Frame, FrameHeader, Opcode, Payload,
    payloads::action::{ChooseStat, CreateRoom, JoinRoom},
};
use statwar_server::{DriverConfig, ServerAction, ServerDriver, ServerEvent};

#[derive(Debug, Arbitrary)]
struct Scenario {
    seed: u64,
    steps: Vec<Step>,
}

#[derive(Debug, Arbitrary)]
enum Step {
    Create { session: u8, name: String },
    JoinKnown { session: u8, room: u8 },
    JoinCode { session: u8, code: String },
    Start { session: u8 },
    Choose { session: u8, metric: MetricChoice },
    RawFrame { session: u8, opcode: u16, payload: Vec<u8> },
    Disconnect { session: u8 },
}

#[derive(Debug, Arbitrary)]
enum MetricChoice {
    Attack,
    Defense,
    Speed,
    Other(String),
}

impl MetricChoice {
    fn name(self) -> String {
        match self {
            Self::Attack => "attack".to_string(),
            Self::Defense => "defense".to_string(),
            Self::Speed => "speed".to_string(),
            Self::Other(s) => s,
        }
    }
}

fn frame(payload: Payload) -> Frame {
    let opcode = payload.opcode();
    payload.into_frame(FrameHeader::new(opcode)).expect("client actions encode")
}

fuzz_target!(|scenario: Scenario| {
    let mut server = ServerDriver::new(SimEnv::with_seed(scenario.seed), DriverConfig::default());
    let invariants = InvariantRegistry::standard();
    let mut connected: HashSet<u64> = HashSet::new();
    let mut codes: Vec<String> = Vec::new();

    for step in scenario.steps.into_iter().take(256) {
        let (session, frame) = match step {
            Step::Create { session, name } => {
                (session, Some(frame(Payload::CreateRoom(CreateRoom { name }))))
            },
            Step::JoinKnown { session, room } => {
                let Some(code) = codes.get(room as usize % codes.len().max(1)).cloned() else {
                    continue;
                };
                let name = format!("p{session}");
                (session, Some(frame(Payload::JoinRoom(JoinRoom { name, code }))))
            },
            Step::JoinCode { session, code } => {
                let name = format!("p{session}");
                (session, Some(frame(Payload::JoinRoom(JoinRoom { name, code }))))
            },
            Step::Start { session } => (session, Some(frame(Payload::StartGame))),
            Step::Choose { session, metric } => {
                let metric = metric.name();
                (session, Some(frame(Payload::ChooseStat(ChooseStat { metric }))))
            },
            Step::RawFrame { session, opcode, payload } => {
                let Some(opcode) = Opcode::from_u16(opcode) else {
                    continue;
                };
                (session, Some(Frame::new(FrameHeader::new(opcode), payload)))
            },
            Step::Disconnect { session } => (session, None),
        };
        let session_id = u64::from(session % 8);

        if connected.insert(session_id) {
            server
                .process_event(ServerEvent::ConnectionAccepted { session_id })
                .expect("fresh session id is accepted");
        }

        let actions = match frame {
            Some(frame) => server
                .process_event(ServerEvent::FrameReceived { session_id, frame })
                .expect("frames from connected sessions are processed"),
            None => {
                connected.remove(&session_id);
                server
                    .process_event(ServerEvent::ConnectionClosed {
                        session_id,
                        reason: "fuzz".to_string(),
                    })
                    .expect("close never fails")
            },
        };

        for action in &actions {
            match action {
                ServerAction::SendToSession { payload: Payload::RoomCreated(created), .. } => {
                    codes.push(created.code.clone());
                },
                ServerAction::BroadcastToRoom { sessions, .. } => {
                    assert!(sessions.iter().all(|s| connected.contains(s)));
                },
                _ => {},
            }
        }

        // A pot is only legal right after a tie, which the snapshot cannot see
        let settled = server.rooms().filter(|r| r.showdown_pot().is_empty());
        if let Err(violations) = invariants.check_all(&SystemSnapshot::from_rooms(settled)) {
            panic!("invariant violations: {violations:?}");
        }

        for &session in &connected {
            if let Some(code) = server.room_for_session(session) {
                assert!(server.room(code).is_some_and(|room| room.contains(session)));
            }
        }
    }
});
