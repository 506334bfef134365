//! # sradio Common Library
//!
//! Shared code for the sradio internet-radio client:
//! - Player state enums and the `RadioEvent` broadcast bus
//! - Station and Track value objects
//! - Station catalog decoding
//! - Bootstrap configuration loading

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod model;

pub use error::{Error, Result};
pub use events::{EventBus, PlaybackState, PlayerState, RadioEvent};
pub use model::{Station, Track};
