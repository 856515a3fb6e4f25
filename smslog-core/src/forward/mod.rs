//! Forwarding events to a remote smslog server
//!
//! Posts [`MessageEvent`](crate::types::MessageEvent)s in the same form shape a
//! phone uses. The remote server deduplicates, so retrying a post that may
//! already have landed is safe.

mod client;

pub use client::{ForwardClient, SyncForwarder};
