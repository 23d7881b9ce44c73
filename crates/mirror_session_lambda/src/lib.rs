//! AWS-oriented adapters and handlers for traffic-mirror provisioning.
//!
//! This crate owns runtime integration details (the Lambda handler, EC2
//! adapter seams, and leveled structured logging) around the domain
//! primitives in `mirror_session_core`.

pub mod adapters;
pub mod handlers;
pub mod logging;
