use aws_sdk_ec2::types::{Filter, TrafficMirrorSession};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use mirror_session_core::config::MirrorConfig;
use mirror_session_core::session::MirrorSessionRecord;
use mirror_session_lambda::adapters::instances::InstanceDirectory;
use mirror_session_lambda::adapters::sessions::MirrorSessionStore;
use mirror_session_lambda::handlers::state_change::{handle_state_change, MirrorOutcome};
use mirror_session_lambda::logging::{LogLevel, Logger};
use serde_json::Value;

struct Ec2InstanceDirectory {
    ec2_client: aws_sdk_ec2::Client,
}

impl InstanceDirectory for Ec2InstanceDirectory {
    fn instances_with_tag(&self, key: &str, value: Option<&str>) -> Result<Vec<String>, String> {
        let filter = match value {
            Some(value) => Filter::builder()
                .name(format!("tag:{key}"))
                .values(value)
                .build(),
            None => Filter::builder().name("tag-key").values(key).build(),
        };
        let client = self.ec2_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut pages = client
                    .describe_instances()
                    .filters(filter)
                    .into_paginator()
                    .send();

                let mut instance_ids = Vec::new();
                while let Some(page) = pages.next().await {
                    let page = page
                        .map_err(|error| format!("failed to describe instances by tag: {error}"))?;
                    for reservation in page.reservations() {
                        for instance in reservation.instances() {
                            if let Some(instance_id) = instance.instance_id() {
                                instance_ids.push(instance_id.to_string());
                            }
                        }
                    }
                }
                Ok(instance_ids)
            })
        })
    }

    fn network_interfaces(&self, instance_id: &str) -> Result<Option<Vec<String>>, String> {
        let client = self.ec2_client.clone();
        let instance_id = instance_id.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .describe_instances()
                    .instance_ids(instance_id)
                    .send()
                    .await
                    .map_err(|error| format!("failed to describe instance: {error}"))?;

                let Some(reservation) = response.reservations().first() else {
                    return Ok(None);
                };
                let Some(instance) = reservation.instances().first() else {
                    return Ok(None);
                };
                let interface_ids = instance
                    .network_interfaces()
                    .iter()
                    .filter_map(|interface| interface.network_interface_id())
                    .map(str::to_string)
                    .collect();
                Ok(Some(interface_ids))
            })
        })
    }
}

struct Ec2MirrorSessionStore {
    ec2_client: aws_sdk_ec2::Client,
}

impl MirrorSessionStore for Ec2MirrorSessionStore {
    fn sessions_on_interface(
        &self,
        interface_id: &str,
    ) -> Result<Vec<MirrorSessionRecord>, String> {
        let filter = Filter::builder()
            .name("network-interface-id")
            .values(interface_id)
            .build();
        let client = self.ec2_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut pages = client
                    .describe_traffic_mirror_sessions()
                    .filters(filter)
                    .into_paginator()
                    .send();

                let mut records = Vec::new();
                while let Some(page) = pages.next().await {
                    let page = page.map_err(|error| {
                        format!("failed to describe traffic mirror sessions: {error}")
                    })?;
                    for session in page.traffic_mirror_sessions() {
                        if let Some(record) = session_record(session) {
                            records.push(record);
                        }
                    }
                }
                Ok(records)
            })
        })
    }

    fn create_session(
        &self,
        interface_id: &str,
        session_number: i32,
        config: &MirrorConfig,
    ) -> Result<(), String> {
        let client = self.ec2_client.clone();
        let interface_id = interface_id.to_string();
        let target_id = config.target_id.clone();
        let filter_id = config.filter_id.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .create_traffic_mirror_session()
                    .network_interface_id(interface_id)
                    .traffic_mirror_target_id(target_id)
                    .traffic_mirror_filter_id(filter_id)
                    .session_number(session_number)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to create traffic mirror session: {error}"))
            })
        })
    }
}

fn session_record(session: &TrafficMirrorSession) -> Option<MirrorSessionRecord> {
    Some(MirrorSessionRecord {
        network_interface_id: session.network_interface_id()?.to_string(),
        target_id: session.traffic_mirror_target_id()?.to_string(),
        filter_id: session.traffic_mirror_filter_id()?.to_string(),
        session_number: session.session_number()?,
    })
}

async fn handle_request(
    event: LambdaEvent<Value>,
    config: &MirrorConfig,
    logger: &Logger,
    ec2_client: &aws_sdk_ec2::Client,
) -> Result<MirrorOutcome, Error> {
    let directory = Ec2InstanceDirectory {
        ec2_client: ec2_client.clone(),
    };
    let store = Ec2MirrorSessionStore {
        ec2_client: ec2_client.clone(),
    };

    handle_state_change(&event.payload, config, logger, &directory, &store).map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = MirrorConfig::from_env()?;
    let logger = Logger::new("mirror_runtime", LogLevel::from_env());

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let ec2_client = aws_sdk_ec2::Client::new(&aws_config);

    let config_ref = &config;
    let logger_ref = &logger;
    let client_ref = &ec2_client;
    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(event, config_ref, logger_ref, client_ref).await
    }))
    .await
}
