//! Playback engine
//!
//! **Module Structure:**
//! - `core.rs`: public handle, builder and snapshot types
//! - `actor.rs`: owner context, state machine and item lifecycle
//! - `recovery.rs`: stall recovery, interruption and reachability policy
//! - `metadata.rs`: timed metadata and artwork application
//! - `messages.rs`: mailbox messages
//!
//! All engine state lives in a single task. Async results (asset loads,
//! stall rechecks, artwork lookups, item events) are posted back into its
//! mailbox tagged with the generation they were started for, and stale ones
//! are dropped on arrival.

mod actor;
mod core;
mod messages;
mod metadata;
mod recovery;

pub use self::core::{EngineSnapshot, Interruption, PlaybackEngine, PlaybackEngineBuilder};
