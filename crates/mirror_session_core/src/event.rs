use serde_json::Value;

/// Classifier carried in the `detail-type` of EventBridge EC2 state-change
/// notifications.
pub const STATE_CHANGE_MARKER: &str = "EC2 Instance State-change Notification";

/// Extracts the instance id from a state-change notification. Containment is
/// enough for the marker match. Any other event shape yields `None`; foreign
/// events are a no-op for this system, not an error.
pub fn instance_id_from_event(event: &Value) -> Option<String> {
    let detail_type = event.get("detail-type")?.as_str()?;
    if !detail_type.contains(STATE_CHANGE_MARKER) {
        return None;
    }
    event
        .get("detail")?
        .get("instance-id")?
        .as_str()
        .map(str::to_string)
}
