//! Tagged wire protocol shared by the coordinator and its workers.
//!
//! Every message travels as a [`Frame`]: an integer tag plus a short
//! integer payload. The tag codes are part of the wire contract and must
//! not change:
//!
//! | Tag | Code | Direction | Payload |
//! |-----|------|-----------|---------|
//! | [`Tag::Report`] | 1 | worker → coordinator | aggregate sensor value |
//! | [`Tag::Disable`] | 2 | both (kill / ack) | one integer |
//! | [`Tag::Terminate`] | 3 | both (game over / ack) | one integer |
//! | [`Tag::FireAtDefender`] | 4 | worker → coordinator | travel time, column |
//!
//! Receivers decode frames with [`Message::decode`]; a frame with an
//! unrecognised tag or the wrong payload arity is reported as a
//! [`ProtocolError`] and discarded by the caller.

use smallvec::{smallvec, SmallVec};

use crate::error::ProtocolError;

/// Payload sent by the coordinator when it destroys an invader.
pub const KILL_PAYLOAD: i32 = 1;

/// Message tag, with its fixed wire code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Periodic status report from a worker.
    Report,
    /// Kill notification (coordinator → worker) or its acknowledgement.
    Disable,
    /// Game-over broadcast (coordinator → worker) or its acknowledgement.
    Terminate,
    /// An invader fires at the defender.
    FireAtDefender,
}

impl Tag {
    /// The integer code this tag carries on the wire.
    pub fn code(self) -> i32 {
        match self {
            Self::Report => 1,
            Self::Disable => 2,
            Self::Terminate => 3,
            Self::FireAtDefender => 4,
        }
    }

    /// Number of payload integers a frame with this tag carries.
    pub fn arity(self) -> usize {
        match self {
            Self::FireAtDefender => 2,
            Self::Report | Self::Disable | Self::Terminate => 1,
        }
    }
}

impl TryFrom<i32> for Tag {
    type Error = ProtocolError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Report),
            2 => Ok(Self::Disable),
            3 => Ok(Self::Terminate),
            4 => Ok(Self::FireAtDefender),
            other => Err(ProtocolError::UnknownTag { tag: other }),
        }
    }
}

/// A raw message as it travels between processes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Wire tag code (see [`Tag::code`]).
    pub tag: i32,
    /// Integer payload.
    pub payload: SmallVec<[i32; 2]>,
}

impl Frame {
    /// Build a frame from a raw tag code and payload.
    pub fn new(tag: i32, payload: &[i32]) -> Self {
        Self {
            tag,
            payload: SmallVec::from_slice(payload),
        }
    }
}

/// A decoded protocol message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Message {
    /// Aggregate neighbour sensor value from a live worker.
    Report {
        /// Mean of the four neighbour values.
        value: i32,
    },
    /// Kill notification or its acknowledgement.
    Disable {
        /// Opaque value; the coordinator records it on acknowledgement.
        value: i32,
    },
    /// Game-over broadcast or its acknowledgement.
    Terminate {
        /// Opaque value.
        value: i32,
    },
    /// An invader fires at the defender's row.
    FireAtDefender {
        /// Ticks until the projectile lands.
        travel_time: i32,
        /// Column the projectile travels down.
        column: i32,
    },
}

impl Message {
    /// The kill notification the coordinator sends to a destroyed invader.
    pub fn kill() -> Self {
        Self::Disable {
            value: KILL_PAYLOAD,
        }
    }

    /// The game-over notification, carrying the tag code as payload.
    pub fn terminate() -> Self {
        Self::Terminate {
            value: Tag::Terminate.code(),
        }
    }

    /// A worker's acknowledgement of a kill notification.
    pub fn disable_ack() -> Self {
        Self::Disable {
            value: Tag::Disable.code(),
        }
    }

    /// The tag of this message.
    pub fn tag(&self) -> Tag {
        match self {
            Self::Report { .. } => Tag::Report,
            Self::Disable { .. } => Tag::Disable,
            Self::Terminate { .. } => Tag::Terminate,
            Self::FireAtDefender { .. } => Tag::FireAtDefender,
        }
    }

    /// Encode into a wire frame.
    pub fn encode(&self) -> Frame {
        let payload: SmallVec<[i32; 2]> = match *self {
            Self::Report { value } | Self::Disable { value } | Self::Terminate { value } => {
                smallvec![value]
            }
            Self::FireAtDefender {
                travel_time,
                column,
            } => smallvec![travel_time, column],
        };
        Frame {
            tag: self.tag().code(),
            payload,
        }
    }

    /// Decode a wire frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownTag`] for an unrecognised tag code
    /// and [`ProtocolError::BadPayload`] when the payload length does not
    /// match the tag's arity.
    pub fn decode(frame: &Frame) -> Result<Self, ProtocolError> {
        let tag = Tag::try_from(frame.tag)?;
        if frame.payload.len() != tag.arity() {
            return Err(ProtocolError::BadPayload {
                tag: frame.tag,
                expected: tag.arity(),
                got: frame.payload.len(),
            });
        }
        let p = &frame.payload;
        Ok(match tag {
            Tag::Report => Self::Report { value: p[0] },
            Tag::Disable => Self::Disable { value: p[0] },
            Tag::Terminate => Self::Terminate { value: p[0] },
            Tag::FireAtDefender => Self::FireAtDefender {
                travel_time: p[0],
                column: p[1],
            },
        })
    }
}

impl From<Message> for Frame {
    fn from(msg: Message) -> Self {
        msg.encode()
    }
}
