//! Request and response bodies of the client-server endpoints we consume.
//!
//! Responses only name the fields a fixture needs. Fields a step cannot do
//! without are required so a malformed reply surfaces as a decode error.

use serde::{Deserialize, Serialize};

use crate::messages::MessageType;

pub(crate) const PASSWORD_LOGIN: &str = "m.login.password";
pub(crate) const TRUSTED_PRIVATE_CHAT: &str = "trusted_private_chat";

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub user: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JoinedRoomsResponse {
    pub joined_rooms: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoomNameResponse {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InviteRequest<'a> {
    pub user_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRoomRequest<'a> {
    pub is_direct: bool,
    pub preset: &'a str,
    pub invite: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateRoomResponse {
    #[serde(default)]
    pub room_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageContent<'a> {
    pub msgtype: MessageType,
    pub body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_uri: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmptyBody {}
