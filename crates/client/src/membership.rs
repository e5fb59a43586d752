//! Joining, leaving and inviting.

use tracing::{info, warn};

use crate::error::{FixtureError, FixtureResult};
use crate::session::{rejection_body, HomeserverClient, Session};
use crate::wire::{EmptyBody, InviteRequest};

/// Outcome of cleaning up one user's rooms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCleanup {
    pub username: String,
    pub rooms_left: usize,
    pub rooms_failed: usize,
}

/// Per-user result of [`HomeserverClient::leave_all`], in input order.
///
/// Users whose login failed have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    entries: Vec<UserCleanup>,
}

impl CleanupSummary {
    /// Number of rooms `username` left, if that user could log in.
    pub fn rooms_left(&self, username: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| entry.username == username)
            .map(|entry| entry.rooms_left)
    }

    pub fn entries(&self) -> &[UserCleanup] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_left(&self) -> usize {
        self.entries.iter().map(|entry| entry.rooms_left).sum()
    }
}

impl HomeserverClient {
    pub async fn join(&self, session: &Session, room_id: &str) -> FixtureResult<()> {
        let url = self.endpoint(&format!("/join/{}", urlencoding::encode(room_id)));
        let response = self.post(session, url).json(&EmptyBody {}).send().await?;

        if let Some(body) = rejection_body(response).await {
            return Err(FixtureError::Join {
                user_id: session.user_id().to_string(),
                room_id: room_id.to_string(),
                body,
            });
        }

        info!(user = %session.user_id(), %room_id, "joined room");
        Ok(())
    }

    pub async fn leave(&self, session: &Session, room_id: &str) -> FixtureResult<()> {
        let response = self
            .post(session, self.room_endpoint(room_id, "/leave"))
            .json(&EmptyBody {})
            .send()
            .await?;

        if let Some(body) = rejection_body(response).await {
            return Err(FixtureError::Leave {
                user_id: session.user_id().to_string(),
                room_id: room_id.to_string(),
                body,
            });
        }

        info!(user = %session.user_id(), %room_id, "left room");
        Ok(())
    }

    /// Best-effort reset: every listed user leaves every joined room.
    ///
    /// Never fails. Users that cannot log in are skipped and individual
    /// leave failures are only logged.
    pub async fn leave_all<I, S>(&self, usernames: I, password: &str) -> CleanupSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut summary = CleanupSummary::default();

        for username in usernames {
            let username = username.as_ref().trim();
            if username.is_empty() {
                continue;
            }

            let session = match self.login(username, password).await {
                Ok(session) => session,
                Err(error) => {
                    warn!(user = %username, %error, "login failed, skipping");
                    continue;
                }
            };

            let rooms = match self.joined_rooms(&session).await {
                Ok(rooms) => rooms,
                Err(error) => {
                    warn!(user = %username, %error, "could not list joined rooms");
                    Vec::new()
                }
            };
            info!(user = %username, count = rooms.len(), "user has rooms");

            let mut entry = UserCleanup {
                username: username.to_string(),
                rooms_left: 0,
                rooms_failed: 0,
            };
            for room_id in &rooms {
                match self.leave(&session, room_id).await {
                    Ok(()) => entry.rooms_left += 1,
                    Err(error) => {
                        warn!(user = %username, %room_id, %error, "leave failed");
                        entry.rooms_failed += 1;
                    }
                }
            }

            info!(
                user = %username,
                left = entry.rooms_left,
                failed = entry.rooms_failed,
                "cleanup finished"
            );
            summary.entries.push(entry);
        }

        summary
    }

    /// Invite `invitee` (a full user ID) into `room_id`.
    ///
    /// The inviter needs a sufficient power level in the room; only the
    /// server checks that.
    pub async fn invite(&self, admin: &Session, room_id: &str, invitee: &str) -> FixtureResult<()> {
        let response = self
            .post(admin, self.room_endpoint(room_id, "/invite"))
            .json(&InviteRequest { user_id: invitee })
            .send()
            .await?;

        if let Some(body) = rejection_body(response).await {
            return Err(FixtureError::Invite {
                room_id: room_id.to_string(),
                invitee: invitee.to_string(),
                body,
            });
        }

        info!(inviter = %admin.user_id(), %invitee, %room_id, "invited user");
        Ok(())
    }
}
