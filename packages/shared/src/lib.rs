//! Shared building blocks for the Relay chat server and client.
//!
//! Both sides of the connection speak the same length-prefixed wire format
//! and initialise logging the same way, so those pieces live here.

pub mod frame;
pub mod logger;
pub mod time;

pub use frame::{DEFAULT_MAX_FRAME_LEN, Frame, FrameCodec, FrameError, LENGTH_FIELD_LEN};
