// Answer capture: per-question session state machine, submission with dual feedback,
// and the feedback dashboard.

pub mod handlers;
pub mod pipeline;
pub mod service;
pub mod session;
pub mod store;
