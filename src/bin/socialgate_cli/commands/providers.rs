// ABOUTME: Lists the connectors compiled into this build with their capabilities
// ABOUTME: Reads descriptors from the process-wide provider registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Socialgate Contributors

use serde_json::{json, Value};
use socialgate::providers::global_registry;
use socialgate::ConnectorFamily;

/// Descriptor summary of every provider, optionally limited to one family
pub fn list(family: Option<ConnectorFamily>) -> Value {
    let registry = global_registry();
    let providers: Vec<Value> = registry
        .supported_providers()
        .into_iter()
        .filter(|(f, _)| family.is_none() || family == Some(*f))
        .filter_map(|(f, name)| registry.descriptor(f, name))
        .map(|descriptor| {
            json!({
                "family": descriptor.family(),
                "name": descriptor.name(),
                "display_name": descriptor.display_name(),
                "auth_scheme": descriptor.auth_scheme().to_string(),
                "capabilities": descriptor.capabilities().names(),
            })
        })
        .collect();

    json!({ "providers": providers })
}
