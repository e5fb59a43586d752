//! Room creation. Flows model a friend request as a direct room with a
//! pending invite.

use tracing::info;

use crate::error::{FixtureError, FixtureResult};
use crate::session::{read_body, HomeserverClient, Session};
use crate::wire::{CreateRoomRequest, CreateRoomResponse, TRUSTED_PRIVATE_CHAT};

impl HomeserverClient {
    /// Create a direct room and invite `invitee` (a full user ID) into it.
    pub async fn create_direct_room(
        &self,
        session: &Session,
        invitee: &str,
    ) -> FixtureResult<String> {
        let request = CreateRoomRequest {
            is_direct: true,
            preset: TRUSTED_PRIVATE_CHAT,
            invite: vec![invitee],
        };

        let response = self
            .post(session, self.endpoint("/createRoom"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = read_body(response).await;

        let room_id = if status.is_success() {
            serde_json::from_str::<CreateRoomResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.room_id)
                .filter(|room_id| !room_id.is_empty())
        } else {
            None
        };

        let Some(room_id) = room_id else {
            return Err(FixtureError::CreateRoom {
                invitee: invitee.to_string(),
                body,
            });
        };

        info!(from = %session.user_id(), to = %invitee, %room_id, "created direct room");
        Ok(room_id)
    }
}
