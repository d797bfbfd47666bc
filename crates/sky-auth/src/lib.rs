//! # sky-auth
//!
//! Client-side session lifecycle for AT Protocol (Bluesky) servers.
//!
//! [`SessionManager`] logs in with an app password, then keeps the
//! access/refresh JWT pair valid in the background:
//!
//! - more than 5 minutes of access validity left: nothing to do;
//! - less than 5 minutes: refresh on a detached task, at most one at a time;
//! - less than 2 minutes: refresh before anything else;
//! - refresh token expired: the session is dead and the manager stops.
//!
//! Tokens minted from a master password are refused, even if the server
//! accepted them.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sky_auth::{ManagerOptions, SessionManager, XrpcTransport, BSKY_SOCIAL};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(XrpcTransport::new(BSKY_SOCIAL)?);
//! let manager = SessionManager::connect(
//!     transport,
//!     "alice.bsky.social",
//!     "xxxx-xxxx-xxxx-xxxx",
//!     ManagerOptions::default(),
//! )
//! .await?;
//! assert!(manager.is_ready());
//! manager.close().await;
//! # Ok(())
//! # }
//! ```

pub mod claims;
pub mod clock;
pub mod error;
pub mod options;
pub mod policy;
pub mod session;
pub mod transport;
pub mod xrpc;

mod manager;
mod refresh;
mod scheduler;

pub use claims::{TokenClaims, parse_access_claims, parse_claims, parse_refresh_claims};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AuthError;
pub use manager::SessionManager;
pub use options::ManagerOptions;
pub use policy::{RefreshAction, RefreshPolicy};
pub use session::{Identity, SessionState};
pub use transport::{AuthInfo, ServerInfo, SessionTransport, TransportError};
pub use xrpc::{BSKY_SOCIAL, SearchPostsOutput, SearchPostsRequest, XrpcTransport};
