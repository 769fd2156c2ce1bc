//! Config validation
//!
//! Rules:
//! - at least one route
//! - topic and destination non-empty
//! - sync_call destinations are http(s) URLs
//! - timeouts > 0, bus capacity > 0, max_attempts >= 1
//! - kafka backend: bootstrap servers and group id set, message timeout > 0
//! - every consumed bus topic has a route
//! - no consumed topic publishes back onto itself, directly or through
//!   other consumed topics
//!
//! Duplicate route topics are allowed (last wins) and only reported.

use std::collections::{HashMap, HashSet};

use contracts::{BusBackend, ContractError, GatewayBlueprint, TopicName, TransportKind};
use reqwest::Url;

/// Validate a GatewayBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &GatewayBlueprint) -> Result<(), ContractError> {
    validate_routes_present(blueprint)?;
    validate_route_entries(blueprint)?;
    validate_http(blueprint)?;
    validate_bus(blueprint)?;
    validate_consumed_topics(blueprint)?;
    Ok(())
}

/// Topics registered more than once, in first-seen order
pub fn duplicate_route_topics(blueprint: &GatewayBlueprint) -> Vec<TopicName> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for route in &blueprint.routes {
        if !seen.insert(route.topic.clone()) && !duplicates.contains(&route.topic) {
            duplicates.push(route.topic.clone());
        }
    }
    duplicates
}

fn validate_routes_present(blueprint: &GatewayBlueprint) -> Result<(), ContractError> {
    if blueprint.routes.is_empty() {
        return Err(ContractError::config_validation(
            "routes",
            "at least one route is required",
        ));
    }
    Ok(())
}

fn validate_route_entries(blueprint: &GatewayBlueprint) -> Result<(), ContractError> {
    for (idx, route) in blueprint.routes.iter().enumerate() {
        if route.topic.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("routes[{idx}].topic"),
                "topic cannot be empty",
            ));
        }
        if route.destination.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("routes[{idx}].destination"),
                "destination cannot be empty",
            ));
        }
        if route.transport == TransportKind::SyncCall {
            validate_http_destination(idx, &route.destination)?;
        }
    }
    Ok(())
}

fn validate_http_destination(idx: usize, destination: &str) -> Result<(), ContractError> {
    let field = format!("routes[{idx}].destination");
    let url = Url::parse(destination).map_err(|e| {
        ContractError::config_validation(
            &field,
            format!("sync_call destination '{destination}' is not a valid URL: {e}"),
        )
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ContractError::config_validation(
            field,
            format!("sync_call destination URL must use http or https, got '{scheme}'"),
        )),
    }
}

fn validate_http(blueprint: &GatewayBlueprint) -> Result<(), ContractError> {
    if blueprint.http.request_timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "http.request_timeout_ms",
            "request_timeout_ms must be > 0",
        ));
    }
    if blueprint.http.connect_timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "http.connect_timeout_ms",
            "connect_timeout_ms must be > 0",
        ));
    }
    Ok(())
}

fn validate_bus(blueprint: &GatewayBlueprint) -> Result<(), ContractError> {
    if blueprint.bus.capacity == 0 {
        return Err(ContractError::config_validation(
            "bus.capacity",
            "capacity must be > 0",
        ));
    }
    if blueprint.bus.max_attempts == 0 {
        return Err(ContractError::config_validation(
            "bus.max_attempts",
            "max_attempts must be >= 1",
        ));
    }
    if blueprint.bus.backend == BusBackend::Kafka {
        validate_kafka(blueprint)?;
    }
    Ok(())
}

fn validate_kafka(blueprint: &GatewayBlueprint) -> Result<(), ContractError> {
    let kafka = &blueprint.bus.kafka;
    if kafka.bootstrap_servers.split(',').all(|s| s.trim().is_empty()) {
        return Err(ContractError::config_validation(
            "bus.kafka.bootstrap_servers",
            "bootstrap_servers cannot be empty",
        ));
    }
    if kafka.group_id.trim().is_empty() {
        return Err(ContractError::config_validation(
            "bus.kafka.group_id",
            "group_id cannot be empty",
        ));
    }
    if kafka.message_timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "bus.kafka.message_timeout_ms",
            "message_timeout_ms must be > 0",
        ));
    }
    Ok(())
}

fn validate_consumed_topics(blueprint: &GatewayBlueprint) -> Result<(), ContractError> {
    let consumed = blueprint.consumed_topics();
    for topic in &consumed {
        if blueprint.route_for(topic).is_none() {
            return Err(ContractError::config_validation(
                format!("bus.consume_topics[{topic}]"),
                format!("consumed topic '{topic}' has no route"),
            ));
        }
    }

    // Each consumed topic has at most one outgoing edge: its async_publish destination,
    // when that destination is itself consumed.
    let edges: HashMap<&str, &str> = consumed
        .iter()
        .filter_map(|topic| {
            let route = blueprint.route_for(topic)?;
            let next = route.destination.as_str();
            (route.transport == TransportKind::AsyncPublish
                && consumed.iter().any(|c| c.as_str() == next))
            .then_some((topic.as_str(), next))
        })
        .collect();

    for topic in &consumed {
        if let Some(path) = publish_cycle(&edges, topic.as_str()) {
            let message = if path.len() == 2 {
                format!("consumed topic '{topic}' is published back onto itself")
            } else {
                format!(
                    "consumed topic '{topic}' is published back onto itself via {}",
                    path.join(" -> ")
                )
            };
            return Err(ContractError::config_validation(
                format!("bus.consume_topics[{topic}]"),
                message,
            ));
        }
    }
    Ok(())
}

/// Follow publish edges from `start`; returns the path when it comes back to `start`
fn publish_cycle<'a>(edges: &HashMap<&'a str, &'a str>, start: &'a str) -> Option<Vec<&'a str>> {
    let mut path = vec![start];
    let mut current = start;
    while let Some(&next) = edges.get(current) {
        path.push(next);
        if next == start {
            return Some(path);
        }
        // Cycle not through start; reported when the walk starts on it
        if path[..path.len() - 1].contains(&next) {
            return None;
        }
        current = next;
    }
    None
}
