//! Operation codes.
//!
//! Client actions live in `0x01xx`, server events in `0x02xx`. The split lets
//! the server reject a client that sends a server-only opcode without decoding
//! its payload.

/// Frame operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Client: open a new room
    CreateRoom,
    /// Client: join an existing room by code
    JoinRoom,
    /// Client: host starts the game
    StartGame,
    /// Client: current player picks the round's metric
    ChooseStat,

    /// Server: room created, sent to the creator
    RoomCreated,
    /// Server: room joined, sent to the joiner
    RoomJoined,
    /// Server: lobby roster changed
    LobbyUpdated,
    /// Server: cards dealt, game running
    GameStarted,
    /// Server: it is the recipient's turn to choose
    YourTurn,
    /// Server: outcome of one round
    RoundResolved,
    /// Server: game finished
    GameOver,
    /// Server: the recipient's last action was rejected
    ActionRejected,
}

impl Opcode {
    /// Wire value.
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::CreateRoom => 0x0101,
            Self::JoinRoom => 0x0102,
            Self::StartGame => 0x0103,
            Self::ChooseStat => 0x0104,
            Self::RoomCreated => 0x0201,
            Self::RoomJoined => 0x0202,
            Self::LobbyUpdated => 0x0203,
            Self::GameStarted => 0x0204,
            Self::YourTurn => 0x0205,
            Self::RoundResolved => 0x0206,
            Self::GameOver => 0x0207,
            Self::ActionRejected => 0x02FF,
        }
    }

    /// Parse a wire value. `None` if unrecognized.
    #[must_use]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0101 => Some(Self::CreateRoom),
            0x0102 => Some(Self::JoinRoom),
            0x0103 => Some(Self::StartGame),
            0x0104 => Some(Self::ChooseStat),
            0x0201 => Some(Self::RoomCreated),
            0x0202 => Some(Self::RoomJoined),
            0x0203 => Some(Self::LobbyUpdated),
            0x0204 => Some(Self::GameStarted),
            0x0205 => Some(Self::YourTurn),
            0x0206 => Some(Self::RoundResolved),
            0x0207 => Some(Self::GameOver),
            0x02FF => Some(Self::ActionRejected),
            _ => None,
        }
    }

    /// True for opcodes a client may send.
    #[must_use]
    pub const fn is_client_action(self) -> bool {
        self.to_u16() >> 8 == 0x01
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Opcode; 12] = [
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

    #[test]
    fn wire_values_are_unique_and_parse_back() {
        for op in ALL {
            assert_eq!(Opcode::from_u16(op.to_u16()), Some(op));
        }
        let mut values: Vec<u16> = ALL.iter().map(|op| op.to_u16()).collect();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), ALL.len());
    }

    #[test]
    fn only_action_range_is_client_sendable() {
        let client: Vec<_> = ALL.iter().filter(|op| op.is_client_action()).collect();
        assert_eq!(client, vec![
            &Opcode::CreateRoom,
            &Opcode::JoinRoom,
            &Opcode::StartGame,
            &Opcode::ChooseStat
        ]);
    }

    #[test]
    fn unknown_value_is_none() {
        assert_eq!(Opcode::from_u16(0x0000), None);
        assert_eq!(Opcode::from_u16(0x0105), None);
        assert_eq!(Opcode::from_u16(0xFFFF), None);
    }
}
