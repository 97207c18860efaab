// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory cluster manifest records.
//!
//! Parsing the manifest from its wire format is the host's job; the engine
//! consumes these already-structured records: configuration override tuples
//! plus per-node-type endpoint/certificate/property/capacity data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A parsed cluster manifest: settings overrides plus node-type topology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterManifest {
    /// Operator-supplied configuration overrides.
    #[serde(default)]
    pub sections: Vec<ManifestSection>,

    /// Node-type records (placement, capacities, endpoints, certificates).
    #[serde(default)]
    pub node_types: Vec<NodeType>,
}

impl ClusterManifest {
    /// Manifest with the given override sections and no node types.
    pub fn with_sections(sections: Vec<ManifestSection>) -> Self {
        Self {
            sections,
            node_types: Vec::new(),
        }
    }

    /// Look up an override section by name, case-insensitively.
    pub fn section(&self, name: &str) -> Option<&ManifestSection> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Look up a node type by exact name.
    pub fn node_type(&self, name: &str) -> Option<&NodeType> {
        self.node_types.iter().find(|n| n.name == name)
    }
}

/// One override section: a named group of parameter tuples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestSection {
    /// Section name.
    pub name: String,
    /// Override parameters in manifest order.
    #[serde(default)]
    pub parameters: Vec<ManifestParameter>,
}

impl ManifestSection {
    /// Empty section with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a plaintext parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push(ManifestParameter {
            name: name.into(),
            value: value.into(),
            is_encrypted: false,
        });
        self
    }

    /// Append an encrypted parameter.
    pub fn with_secret_param(
        mut self,
        name: impl Into<String>,
        ciphertext: impl Into<String>,
    ) -> Self {
        self.parameters.push(ManifestParameter {
            name: name.into(),
            value: ciphertext.into(),
            is_encrypted: true,
        });
        self
    }

    /// Look up a parameter by name, case-insensitively.
    pub fn parameter(&self, name: &str) -> Option<&ManifestParameter> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// One override tuple: name, value, and the manifest's encryption flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestParameter {
    /// Parameter name.
    pub name: String,
    /// Raw value; ciphertext when `is_encrypted`.
    pub value: String,
    /// Whether the manifest marked the value encrypted.
    #[serde(default)]
    pub is_encrypted: bool,
}

/// A node type: the unit of structural comparison during upgrade preflight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    /// Node type name.
    pub name: String,
    /// Free-form placement properties.
    #[serde(default)]
    pub placement_properties: BTreeMap<String, String>,
    /// Free-form capacity declarations.
    #[serde(default)]
    pub capacities: BTreeMap<String, String>,
    /// Fixed named endpoint ports, when declared.
    #[serde(default)]
    pub endpoints: Option<NodeEndpoints>,
    /// Certificates by role, when declared.
    #[serde(default)]
    pub certificates: Option<NodeCertificates>,
}

impl NodeType {
    /// Node type with the given name and nothing else declared.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// The fixed set of named endpoint ports a node type may declare.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeEndpoints {
    /// Client connection port.
    #[serde(default)]
    pub client_connection: Option<u16>,
    /// Cluster (federation) connection port.
    #[serde(default)]
    pub cluster_connection: Option<u16>,
    /// Lease agent port.
    #[serde(default)]
    pub lease_agent: Option<u16>,
    /// HTTP gateway port.
    #[serde(default)]
    pub http_gateway: Option<u16>,
    /// Service host connection port.
    #[serde(default)]
    pub service_connection: Option<u16>,
    /// Dynamic application port range.
    #[serde(default)]
    pub application_ports: Option<PortRange>,
}

/// An inclusive port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    /// First port in the range.
    pub start: u16,
    /// Last port in the range.
    pub end: u16,
}

/// Certificates a node type declares, by role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeCertificates {
    /// Cluster-to-cluster authentication certificate.
    #[serde(default)]
    pub cluster: Option<CertificateRef>,
    /// Server authentication certificate.
    #[serde(default)]
    pub server: Option<CertificateRef>,
    /// Client authentication certificate.
    #[serde(default)]
    pub client: Option<CertificateRef>,
}

/// A reference to a certificate in a platform store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRef {
    /// How the certificate is located (thumbprint, subject name, ...).
    pub find_type: String,
    /// The lookup value.
    pub find_value: String,
    /// The store to search.
    pub store_name: String,
}
