//! # mxfixture client
//!
//! A small Matrix client-server API consumer used to put a homeserver into a
//! known state around end-to-end test flows: log test users in, look up and
//! join rooms, invite, leave, and send messages.
//!
//! Every call is a single request awaited to completion. Nothing is cached
//! and nothing outlives the process.
//!
//! ## Usage
//!
//! ```no_run
//! use mxfixture_client::HomeserverClient;
//! use mxfixture_config::HomeserverConfig;
//!
//! # async fn run() -> mxfixture_client::FixtureResult<()> {
//! let client = HomeserverClient::new(&HomeserverConfig::default())?;
//! let session = client.login("alice", "testpass123").await?;
//! let room = client.find_room_by_name(&session, "Trip").await?;
//! client.send_location(&session, &room.room_id, "40.7128", "-74.0060").await?;
//! # Ok(())
//! # }
//! ```

pub mod directory;
pub mod error;
pub mod membership;
pub mod messages;
pub mod rooms;
pub mod session;
mod wire;

pub use directory::RoomSummary;
pub use error::{FixtureError, FixtureResult};
pub use membership::{CleanupSummary, UserCleanup};
pub use messages::{MessageType, OutboundMessage, TxnIdGenerator};
pub use session::{HomeserverClient, Session};
