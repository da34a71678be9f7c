//! Session State
//!
//! Per-session mutable state keyed by session id. The only state kept is the
//! timestamp of the last accepted question, used by the request gate.

mod gate;

pub use gate::{Admission, RequestGate};
