use mirror_session_core::config::MirrorConfig;
use mirror_session_core::session::MirrorSessionRecord;

/// Mirror-session surface of the compute control plane.
pub trait MirrorSessionStore {
    fn sessions_on_interface(
        &self,
        interface_id: &str,
    ) -> Result<Vec<MirrorSessionRecord>, String>;

    fn create_session(
        &self,
        interface_id: &str,
        session_number: i32,
        config: &MirrorConfig,
    ) -> Result<(), String>;
}
