//! Joined-room lookups.

use tracing::{debug, info};

use crate::error::{FixtureError, FixtureResult};
use crate::session::{rejection_body, HomeserverClient, Session};
use crate::wire::{JoinedRoomsResponse, RoomNameResponse};

/// A joined room together with its display name, if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub room_id: String,
    pub name: Option<String>,
}

impl HomeserverClient {
    /// Rooms the session's user has joined, oldest first.
    pub async fn joined_rooms(&self, session: &Session) -> FixtureResult<Vec<String>> {
        let response = self
            .get(session, self.endpoint("/joined_rooms"))
            .send()
            .await?;

        if !response.status().is_success() {
            let body = rejection_body(response).await.unwrap_or_default();
            return Err(FixtureError::JoinedRooms {
                user_id: session.user_id().to_string(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: JoinedRoomsResponse = serde_json::from_str(&body)
            .map_err(|source| FixtureError::decode("joined_rooms", source))?;

        debug!(
            user = %session.user_id(),
            count = parsed.joined_rooms.len(),
            "listed joined rooms"
        );
        Ok(parsed.joined_rooms)
    }

    pub async fn first_room(&self, session: &Session) -> FixtureResult<String> {
        let rooms = self.joined_rooms(session).await?;
        let room_id = rooms.into_iter().next().ok_or_else(|| FixtureError::NoRooms {
            user_id: session.user_id().to_string(),
        })?;

        info!(user = %session.user_id(), %room_id, "resolved first room");
        Ok(room_id)
    }

    /// The most recently joined room, i.e. the last one the server lists.
    pub async fn latest_room(&self, session: &Session) -> FixtureResult<String> {
        let rooms = self.joined_rooms(session).await?;
        let room_id = rooms.into_iter().last().ok_or_else(|| FixtureError::NoRooms {
            user_id: session.user_id().to_string(),
        })?;

        info!(user = %session.user_id(), %room_id, "resolved latest room");
        Ok(room_id)
    }

    /// Display name from the room's `m.room.name` state. `None` when the
    /// server has no such state or refuses the lookup.
    pub async fn room_name(
        &self,
        session: &Session,
        room_id: &str,
    ) -> FixtureResult<Option<String>> {
        let response = self
            .get(session, self.room_endpoint(room_id, "/state/m.room.name"))
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(%room_id, status = %response.status(), "room has no readable name");
            return Ok(None);
        }

        let body = response.text().await?;
        let parsed: RoomNameResponse = serde_json::from_str(&body)
            .map_err(|source| FixtureError::decode("m.room.name", source))?;
        Ok(parsed.name)
    }

    /// Newest joined room whose name contains `pattern` (case-sensitive).
    ///
    /// Candidates are checked from most recently joined to oldest, since
    /// flows usually look for a room they just created.
    pub async fn find_room_by_name(
        &self,
        session: &Session,
        pattern: &str,
    ) -> FixtureResult<RoomSummary> {
        let rooms = self.joined_rooms(session).await?;

        for room_id in rooms.into_iter().rev() {
            let name = match self.room_name(session, &room_id).await {
                Ok(Some(name)) => name,
                Ok(None) => continue,
                Err(error) => {
                    debug!(%room_id, %error, "skipping room after failed name lookup");
                    continue;
                }
            };

            if name.contains(pattern) {
                info!(%room_id, name = %name, "found room");
                return Ok(RoomSummary {
                    room_id,
                    name: Some(name),
                });
            }
        }

        Err(FixtureError::RoomNotFound {
            user_id: session.user_id().to_string(),
            pattern: pattern.to_string(),
        })
    }
}
