use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! message_types {
    ($($variant:ident = $value:literal,)+) => {
        /// The closed catalog of peer message discriminants.
        ///
        /// Values fall in bands: 1 and 4 to 37 for node join, transaction
        /// relay, block propagation, voting, mesh, overrides and bootstrap;
        /// 200s for ping; 300s for update; 400s for diagnostics; 500s for
        /// reset. The top three values are local markers that never travel
        /// between peers. 2 and 3 belonged to a retired bootstrap exchange.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(u16)]
        pub enum MessageType {
            $($variant = $value,)+
        }

        impl MessageType {
            /// Every known type, in ascending discriminant order.
            pub const ALL: &'static [MessageType] = &[$(MessageType::$variant,)+];

            pub fn from_u16(value: u16) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }
    };
}

message_types! {
    Invalid = 1,
    NodeJoin = 4,
    NodeJoinResponse = 5,
    Transaction = 6,
    TransactionResponse = 7,
    PrevHashRequest = 8,
    PrevHashResponse = 9,
    NewBlock = 10,
    NewBlockResponse = 11,
    BlockRequest = 12,
    BlockResponse = 13,
    TxPoolRequest = 14,
    TxPoolResponse = 15,
    MeshRequest = 16,
    MeshResponse = 17,
    BlockVote = 18,
    BlockVoteResponse = 19,
    NewVerifierVote = 20,
    NewVerifierVoteResponse = 21,
    MissingBlockVoteRequest = 22,
    MissingBlockVoteResponse = 23,
    MissingBlockRequest = 24,
    MissingBlockResponse = 25,
    TimestampRequest = 26,
    TimestampResponse = 27,
    HashVoteOverrideRequest = 28,
    HashVoteOverrideResponse = 29,
    ConsensusThresholdOverrideRequest = 30,
    ConsensusThresholdOverrideResponse = 31,
    NewVerifierVoteOverrideRequest = 32,
    NewVerifierVoteOverrideResponse = 33,
    BootstrapRequestV2 = 34,
    BootstrapResponseV2 = 35,
    BlockWithVotesRequest = 36,
    BlockWithVotesResponse = 37,
    Ping = 200,
    PingResponse = 201,
    UpdateRequest = 300,
    UpdateResponse = 301,
    BlockRejectionRequest = 400,
    BlockRejectionResponse = 401,
    DetachmentRequest = 402,
    DetachmentResponse = 403,
    UnfrozenBlockPoolPurgeRequest = 404,
    UnfrozenBlockPoolPurgeResponse = 405,
    UnfrozenBlockPoolStatusRequest = 406,
    UnfrozenBlockPoolStatusResponse = 407,
    MeshStatusRequest = 408,
    MeshStatusResponse = 409,
    TogglePauseRequest = 410,
    TogglePauseResponse = 411,
    ConsensusTallyStatusRequest = 412,
    ConsensusTallyStatusResponse = 413,
    NewVerifierTallyStatusRequest = 414,
    NewVerifierTallyStatusResponse = 415,
    BlacklistStatusRequest = 416,
    BlacklistStatusResponse = 417,
    ResetRequest = 500,
    ResetResponse = 501,
    IncomingRequest = 65533,
    Error = 65534,
    Unknown = 65535,
}

impl MessageType {
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// The response type paired with this request, if it has one.
    ///
    /// Requests sit on even discriminants in every band except the first,
    /// where the odd/even pairing runs from `NodeJoin` (4) onward.
    pub fn response(self) -> Option<Self> {
        let value = self.as_u16();
        let is_request = match value {
            4..=37 | 200..=501 => value % 2 == 0,
            _ => false,
        };
        if !is_request {
            return None;
        }
        Self::from_u16(value + 1)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.as_u16())
    }
}

impl TryFrom<u16> for MessageType {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, u16> {
        Self::from_u16(value).ok_or(value)
    }
}
