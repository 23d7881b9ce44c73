use serde::{Deserialize, Serialize};

use crate::config::MirrorConfig;

/// Read model of a mirror session already attached to an interface, as
/// reported by the control plane.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MirrorSessionRecord {
    pub network_interface_id: String,
    pub target_id: String,
    pub filter_id: String,
    pub session_number: i32,
}

/// Explicit allocation result; at most one session per
/// (interface, target, filter) triple is ever created by this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDecision {
    /// A session with the configured target and filter already exists on the
    /// interface.
    AlreadyMirrored,
    /// No matching session; provision with this session number.
    Allocate(i32),
}

/// The allocated number is a best-effort slot count (existing sessions + 1),
/// not a reserved sequence. Concurrent invocations for the same interface can
/// pick the same number; the later create call then fails and is logged.
pub fn decide_session_number(
    interface_id: &str,
    existing: &[MirrorSessionRecord],
    config: &MirrorConfig,
) -> SessionDecision {
    let already_mirrored = existing.iter().any(|session| {
        session.target_id == config.target_id
            && session.filter_id == config.filter_id
            && session.network_interface_id == interface_id
    });
    if already_mirrored {
        SessionDecision::AlreadyMirrored
    } else {
        SessionDecision::Allocate(existing.len() as i32 + 1)
    }
}
