use std::collections::BTreeSet;

use mirror_session_core::config::{format_skip_tags, MirrorConfig};
use mirror_session_core::event::instance_id_from_event;
use mirror_session_core::session::{decide_session_number, SessionDecision};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::instances::InstanceDirectory;
use crate::adapters::sessions::MirrorSessionStore;
use crate::logging::Logger;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterfaceOutcome {
    pub network_interface_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_number: Option<i32>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MirrorOutcome {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    pub interfaces: Vec<InterfaceOutcome>,
}

impl MirrorOutcome {
    fn short_circuit(status: &str, instance_id: Option<String>) -> Self {
        Self {
            status: status.to_string(),
            instance_id,
            interfaces: Vec::new(),
        }
    }
}

/// Union of instance ids matching any configured skip tag, one directory
/// query per tag pair. The set type deduplicates instances matching several
/// pairs.
pub fn excluded_instances(
    config: &MirrorConfig,
    directory: &dyn InstanceDirectory,
) -> Result<BTreeSet<String>, String> {
    let mut excluded = BTreeSet::new();
    for (key, value) in &config.skip_tags {
        excluded.extend(directory.instances_with_tag(key, value.as_deref())?);
    }
    Ok(excluded)
}

/// Linear pass over one state-change event: interpret, check exclusion,
/// resolve interfaces, then decide and provision per interface. A failed
/// create call is recorded and logged without aborting the remaining
/// interfaces; a failed exclusion or listing query fails the invocation.
pub fn handle_state_change(
    event: &Value,
    config: &MirrorConfig,
    logger: &Logger,
    directory: &dyn InstanceDirectory,
    store: &dyn MirrorSessionStore,
) -> Result<MirrorOutcome, String> {
    logger.info("event_received", json!({ "event": event }));

    let excluded = excluded_instances(config, directory)?;

    let Some(instance_id) = instance_id_from_event(event) else {
        logger.info("event_ignored", json!({ "event": event }));
        return Ok(MirrorOutcome::short_circuit("ignored_event", None));
    };

    if excluded.contains(&instance_id) {
        logger.warn(
            "instance_excluded",
            json!({
                "instance_id": instance_id,
                "skip_tags": format_skip_tags(&config.skip_tags),
            }),
        );
        return Ok(MirrorOutcome::short_circuit(
            "instance_excluded",
            Some(instance_id),
        ));
    }

    let Some(interface_ids) = directory.network_interfaces(&instance_id)? else {
        logger.warn("instance_not_found", json!({ "instance_id": instance_id }));
        return Ok(MirrorOutcome::short_circuit(
            "instance_not_found",
            Some(instance_id),
        ));
    };

    let mut interfaces = Vec::with_capacity(interface_ids.len());
    for interface_id in interface_ids {
        interfaces.push(provision_interface(&interface_id, config, logger, store)?);
    }

    Ok(MirrorOutcome {
        status: "completed".to_string(),
        instance_id: Some(instance_id),
        interfaces,
    })
}

fn provision_interface(
    interface_id: &str,
    config: &MirrorConfig,
    logger: &Logger,
    store: &dyn MirrorSessionStore,
) -> Result<InterfaceOutcome, String> {
    let existing = store.sessions_on_interface(interface_id)?;
    match decide_session_number(interface_id, &existing, config) {
        SessionDecision::AlreadyMirrored => {
            logger.info(
                "session_exists",
                json!({
                    "network_interface_id": interface_id,
                    "target_id": config.target_id,
                }),
            );
            Ok(interface_outcome(interface_id, None, "already_mirrored"))
        }
        SessionDecision::Allocate(session_number) => {
            logger.info(
                "session_starting",
                json!({
                    "network_interface_id": interface_id,
                    "target_id": config.target_id,
                    "filter_id": config.filter_id,
                    "session_number": session_number,
                }),
            );
            match store.create_session(interface_id, session_number, config) {
                Ok(()) => Ok(interface_outcome(
                    interface_id,
                    Some(session_number),
                    "provisioned",
                )),
                Err(error) => {
                    logger.error(
                        "session_failed",
                        json!({
                            "network_interface_id": interface_id,
                            "error": error,
                        }),
                    );
                    Ok(interface_outcome(
                        interface_id,
                        Some(session_number),
                        "failed",
                    ))
                }
            }
        }
    }
}

fn interface_outcome(
    interface_id: &str,
    session_number: Option<i32>,
    status: &str,
) -> InterfaceOutcome {
    InterfaceOutcome {
        network_interface_id: interface_id.to_string(),
        session_number,
        status: status.to_string(),
    }
}
