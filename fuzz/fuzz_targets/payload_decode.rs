//! Fuzz target for `Payload::from_frame`
//!
//! Feeds arbitrary CBOR under every opcode. Decoding must never panic, and a
//! payload that decodes must come back under the opcode it was read with.

#![no_main]

use libfuzzer_sys::fuzz_target;
use statwar_proto::{Frame, FrameHeader, Opcode, Payload};

const OPCODES: [Opcode; 12] = [
    Opcode::CreateRoom,
    Opcode::JoinRoom,
    Opcode::StartGame,
    Opcode::ChooseStat,
    Opcode::RoomCreated,
    Opcode::RoomJoined,
    Opcode::LobbyUpdated,
    Opcode::GameStarted,
    Opcode::YourTurn,
    Opcode::RoundResolved,
    Opcode::GameOver,
    Opcode::ActionRejected,
];

fuzz_target!(|data: &[u8]| {
    for opcode in OPCODES {
        let frame = Frame::new(FrameHeader::new(opcode), bytes::Bytes::copy_from_slice(data));

        if let Ok(payload) = Payload::from_frame(&frame) {
            assert_eq!(payload.opcode(), opcode);
        }
    }
});
