//! # mingle-store
//!
//! In-memory client state, partitioned into four independently updatable
//! slices (auth, chats, posts, profile). Slices mutate only through
//! reducers that are pure and total: a malformed or missing target
//! degrades to a tagged no-op, never a panic. The [`Store`] wrapper adds
//! the single commit entry point and snapshot observation.

pub mod apply;
pub mod auth;
pub mod chats;
pub mod posts;
pub mod profile;
pub mod store;

pub use apply::Apply;
pub use auth::AuthSlice;
pub use chats::ChatSlice;
pub use posts::PostSlice;
pub use profile::ProfileSlice;
pub use store::{Store, StoreState};
