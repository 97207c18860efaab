// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change enumeration between two settings snapshots.
//!
//! Two passes: a structural diff over per-node-type records (placement
//! properties, capacities, certificates, endpoint ports), emitted under
//! reserved synthetic section names, and a flat diff over every
//! non-plugin-owned (section, parameter) pair. Encrypted values compare
//! byte-exact after decryption, in constant time, with buffers zeroized on
//! every path out.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use stratus_core::manifest::{CertificateRef, ClusterManifest, NodeType};
use stratus_core::{CipherContext, StratusError, TypedValue};
use stratus_settings::SettingsStore;
use subtle::ConstantTimeEq;

/// Synthetic section for placement-property records.
pub const NODE_PROPERTIES_SECTION: &str = "NodeProperties";
/// Synthetic section for capacity records.
pub const NODE_CAPACITIES_SECTION: &str = "NodeCapacities";
/// Synthetic section for certificate-role records.
pub const NODE_CERTIFICATES_SECTION: &str = "NodeCertificates";
/// Synthetic section for endpoint-port records.
pub const NODE_ENDPOINTS_SECTION: &str = "NodeEndpoints";

/// One changed `(section, parameter)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChangeKey {
    /// Section of the change; synthetic for structural records.
    pub section: String,
    /// Changed parameter, or a descriptive synthetic name.
    pub parameter: String,
}

impl ChangeKey {
    /// Key for the given pair.
    pub fn new(section: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            parameter: parameter.into(),
        }
    }
}

impl std::fmt::Display for ChangeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.section, self.parameter)
    }
}

/// Structural diff of node-type records, optionally narrowed to one node
/// type. Modified node types diff field-by-field; removed node types diff
/// against nothing. Newly-added node types carry no prior state to compare.
pub(crate) fn structural_diff(
    current: &ClusterManifest,
    target: &ClusterManifest,
    node_type_filter: Option<&str>,
    changes: &mut BTreeSet<ChangeKey>,
) {
    if let Some(filter) = node_type_filter {
        let in_target = find_node_type(target, filter);
        let in_current = find_node_type(current, filter);
        if in_target.is_some() || in_current.is_some() {
            diff_node_type(in_target, in_current, changes);
        }
        return;
    }

    for target_node in &target.node_types {
        if let Some(current_node) = find_node_type(current, &target_node.name) {
            diff_node_type(Some(target_node), Some(current_node), changes);
        }
    }
    for current_node in &current.node_types {
        if find_node_type(target, &current_node.name).is_none() {
            diff_node_type(None, Some(current_node), changes);
        }
    }
}

fn find_node_type<'m>(manifest: &'m ClusterManifest, name: &str) -> Option<&'m NodeType> {
    manifest
        .node_types
        .iter()
        .find(|n| n.name.eq_ignore_ascii_case(name))
}

fn diff_node_type(
    target: Option<&NodeType>,
    current: Option<&NodeType>,
    changes: &mut BTreeSet<ChangeKey>,
) {
    diff_key_value_set(
        NODE_PROPERTIES_SECTION,
        target.map(|n| &n.placement_properties),
        current.map(|n| &n.placement_properties),
        changes,
    );
    diff_key_value_set(
        NODE_CAPACITIES_SECTION,
        target.map(|n| &n.capacities),
        current.map(|n| &n.capacities),
        changes,
    );

    let target_certs = target.and_then(|n| n.certificates.as_ref());
    let current_certs = current.and_then(|n| n.certificates.as_ref());
    diff_certificate(
        "Cluster",
        target_certs.and_then(|c| c.cluster.as_ref()),
        current_certs.and_then(|c| c.cluster.as_ref()),
        changes,
    );
    diff_certificate(
        "Server",
        target_certs.and_then(|c| c.server.as_ref()),
        current_certs.and_then(|c| c.server.as_ref()),
        changes,
    );
    diff_certificate(
        "Client",
        target_certs.and_then(|c| c.client.as_ref()),
        current_certs.and_then(|c| c.client.as_ref()),
        changes,
    );

    diff_endpoints(target, current, changes);
}

/// Key-value set compare: a key changed if it was added, removed, or its
/// value differs by exact string comparison.
fn diff_key_value_set(
    section: &str,
    target: Option<&std::collections::BTreeMap<String, String>>,
    current: Option<&std::collections::BTreeMap<String, String>>,
    changes: &mut BTreeSet<ChangeKey>,
) {
    let empty = std::collections::BTreeMap::new();
    let target = target.unwrap_or(&empty);
    let current = current.unwrap_or(&empty);

    for (key, value) in target {
        if current.get(key) != Some(value) {
            changes.insert(ChangeKey::new(section, key));
        }
    }
    for key in current.keys() {
        if !target.contains_key(key) {
            changes.insert(ChangeKey::new(section, key));
        }
    }
}

/// Field-by-field certificate compare under `NodeCertificates`, with the
/// role as parameter prefix.
fn diff_certificate(
    role: &str,
    target: Option<&CertificateRef>,
    current: Option<&CertificateRef>,
    changes: &mut BTreeSet<ChangeKey>,
) {
    if target.is_none() && current.is_none() {
        return;
    }
    diff_field(
        NODE_CERTIFICATES_SECTION,
        &format!("{role}FindType"),
        target.map(|c| c.find_type.as_str()),
        current.map(|c| c.find_type.as_str()),
        changes,
    );
    diff_field(
        NODE_CERTIFICATES_SECTION,
        &format!("{role}FindValue"),
        target.map(|c| c.find_value.as_str()),
        current.map(|c| c.find_value.as_str()),
        changes,
    );
    diff_field(
        NODE_CERTIFICATES_SECTION,
        &format!("{role}StoreName"),
        target.map(|c| c.store_name.as_str()),
        current.map(|c| c.store_name.as_str()),
        changes,
    );
}

fn diff_endpoints(
    target: Option<&NodeType>,
    current: Option<&NodeType>,
    changes: &mut BTreeSet<ChangeKey>,
) {
    let target_ep = target.and_then(|n| n.endpoints.as_ref());
    let current_ep = current.and_then(|n| n.endpoints.as_ref());
    if target_ep.is_none() && current_ep.is_none() {
        return;
    }

    let ports: [(&str, fn(&stratus_core::manifest::NodeEndpoints) -> Option<u16>); 5] = [
        ("ClientConnectionPort", |e| e.client_connection),
        ("ClusterConnectionPort", |e| e.cluster_connection),
        ("LeaseAgentPort", |e| e.lease_agent),
        ("HttpGatewayPort", |e| e.http_gateway),
        ("ServiceConnectionPort", |e| e.service_connection),
    ];
    for (parameter, port) in ports {
        diff_field(
            NODE_ENDPOINTS_SECTION,
            parameter,
            target_ep.and_then(port).map(|p| p.to_string()).as_deref(),
            current_ep.and_then(port).map(|p| p.to_string()).as_deref(),
            changes,
        );
    }

    diff_field(
        NODE_ENDPOINTS_SECTION,
        "ApplicationPortRangeStart",
        target_ep
            .and_then(|e| e.application_ports)
            .map(|r| r.start.to_string())
            .as_deref(),
        current_ep
            .and_then(|e| e.application_ports)
            .map(|r| r.start.to_string())
            .as_deref(),
        changes,
    );
    diff_field(
        NODE_ENDPOINTS_SECTION,
        "ApplicationPortRangeEnd",
        target_ep
            .and_then(|e| e.application_ports)
            .map(|r| r.end.to_string())
            .as_deref(),
        current_ep
            .and_then(|e| e.application_ports)
            .map(|r| r.end.to_string())
            .as_deref(),
        changes,
    );
}

fn diff_field(
    section: &str,
    parameter: &str,
    target: Option<&str>,
    current: Option<&str>,
    changes: &mut BTreeSet<ChangeKey>,
) {
    if target.is_none() && current.is_none() {
        return;
    }
    if target != current {
        changes.insert(ChangeKey::new(section, parameter));
    }
}

/// Flat diff: every non-plugin-owned (section, parameter) in `current` that
/// is missing or differs in `target`, then every target-only parameter.
pub(crate) fn flat_diff(
    current: &SettingsStore,
    target: &SettingsStore,
    ctx: &dyn CipherContext,
    changes: &mut BTreeSet<ChangeKey>,
) -> Result<(), StratusError> {
    for section in current.iter() {
        if current.is_plugin_owned(section.name()) || target.is_plugin_owned(section.name()) {
            continue;
        }
        let target_section = target.get_section(section.name());
        for (parameter, value) in section.parameters() {
            match target_section.and_then(|s| s.get(parameter)) {
                Some(target_value) => {
                    if values_differ(value, target_value, ctx)? {
                        changes.insert(ChangeKey::new(section.name(), parameter));
                    }
                }
                None => {
                    changes.insert(ChangeKey::new(section.name(), parameter));
                }
            }
        }
    }

    for section in target.iter() {
        if current.is_plugin_owned(section.name()) || target.is_plugin_owned(section.name()) {
            continue;
        }
        let current_section = current.get_section(section.name());
        for (parameter, _) in section.parameters() {
            if current_section.and_then(|s| s.get(parameter)).is_none() {
                changes.insert(ChangeKey::new(section.name(), parameter));
            }
        }
    }

    Ok(())
}

/// Byte-exact compare; when either side is encrypted, both are read through
/// the cipher context and compared in constant time. The decrypted buffers
/// zeroize on drop whichever way this returns.
fn values_differ(
    current: &TypedValue,
    target: &TypedValue,
    ctx: &dyn CipherContext,
) -> Result<bool, StratusError> {
    if !current.is_encrypted() && !target.is_encrypted() {
        return Ok(current.raw() != target.raw());
    }
    let current_bytes = current.secret_value(ctx)?;
    let target_bytes = target.secret_value(ctx)?;
    Ok(!bool::from(current_bytes.ct_eq(&target_bytes)))
}
