//! Error types for fixture operations.

use thiserror::Error;

/// Result type alias for fixture operations
pub type FixtureResult<T> = Result<T, FixtureError>;

/// Everything that can abort a fixture step.
///
/// Variants raised from a homeserver response keep the raw body so a failed
/// test run can be diagnosed from its log alone.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Login failed for {username}: {body}")]
    Authentication { username: String, body: String },

    #[error("Listing joined rooms failed for {user_id}: {body}")]
    JoinedRooms { user_id: String, body: String },

    #[error("No rooms found for {user_id}")]
    NoRooms { user_id: String },

    #[error("No room found matching \"{pattern}\" for {user_id}")]
    RoomNotFound { user_id: String, pattern: String },

    #[error("Join failed for {user_id} in {room_id}: {body}")]
    Join {
        user_id: String,
        room_id: String,
        body: String,
    },

    #[error("Leave room failed for {user_id} in {room_id}: {body}")]
    Leave {
        user_id: String,
        room_id: String,
        body: String,
    },

    #[error("Invite of {invitee} to {room_id} failed: {body}")]
    Invite {
        room_id: String,
        invitee: String,
        body: String,
    },

    #[error("Send of {txn_id} to {room_id} failed: {body}")]
    Send {
        room_id: String,
        txn_id: String,
        body: String,
    },

    #[error("Create room failed: {body}")]
    CreateRoom { invitee: String, body: String },

    #[error("Homeserver request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected {context} response: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl FixtureError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a decode error for the named response
    pub fn decode(context: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { context, source }
    }

    /// Raw response body carried by the error, when there is one
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Authentication { body, .. }
            | Self::JoinedRooms { body, .. }
            | Self::Join { body, .. }
            | Self::Leave { body, .. }
            | Self::Invite { body, .. }
            | Self::Send { body, .. }
            | Self::CreateRoom { body, .. } => Some(body),
            _ => None,
        }
    }
}
