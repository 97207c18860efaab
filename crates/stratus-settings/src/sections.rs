// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Section allow-lists and name suggestion.
//!
//! Some manifest sections are dynamic-schema by design (votes, run-as
//! accounts, service instance lists, health policy) and carry no catalog
//! descriptors; generic per-parameter validation is disabled for them. A
//! small set of names is reserved for the synthetic records the upgrade diff
//! engine emits and may never appear in a manifest.

/// Minimum Jaro-Winkler similarity score to suggest a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Dynamic-schema sections accepted without catalog descriptors.
pub const VALIDATION_DISABLED_SECTIONS: &[&str] = &[
    "Votes",
    "RunAs",
    "ClientCertificateNames",
    "AdminClientCertificateNames",
    "InfrastructureService",
    "TokenValidationService",
    "ClusterHealthPolicy",
];

/// Prefixes under which named service instances declare their own sections.
pub const DYNAMIC_SECTION_PREFIXES: &[&str] =
    &["InfrastructureService/", "TokenValidationService/"];

/// Validation-disabled sections whose changes are nevertheless known to apply
/// without a restart; the upgrade classifier ignores them entirely.
pub const ASSUMED_DYNAMIC_SECTIONS: &[&str] = &["ClusterHealthPolicy"];

/// Names synthesized by the diff engine for per-node-type records; a manifest
/// override section may not use them.
pub const RESERVED_SECTIONS: &[&str] =
    &["NodeProperties", "NodeCapacities", "NodeCertificates", "NodeEndpoints"];

/// Whether generic per-parameter validation is disabled for the section.
pub fn is_validation_disabled(section: &str) -> bool {
    VALIDATION_DISABLED_SECTIONS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(section))
        || has_dynamic_prefix(section)
}

/// Whether the section sits under a dynamic instance prefix.
pub fn has_dynamic_prefix(section: &str) -> bool {
    let lower = section.to_ascii_lowercase();
    DYNAMIC_SECTION_PREFIXES
        .iter()
        .any(|p| lower.starts_with(&p.to_ascii_lowercase()))
}

/// Whether changes in the section are assumed dynamic during upgrade.
pub fn is_assumed_dynamic(section: &str) -> bool {
    ASSUMED_DYNAMIC_SECTIONS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(section))
}

/// Whether the name is reserved for synthetic diff records.
pub fn is_reserved(section: &str) -> bool {
    RESERVED_SECTIONS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(section))
}

/// Suggest the closest known name via Jaro-Winkler similarity.
///
/// Returns the best candidate above the threshold, or `None` when nothing is
/// close enough.
pub fn suggest<'a>(
    unknown: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for candidate in candidates {
        let score = strsim::jaro_winkler(
            &unknown.to_ascii_lowercase(),
            &candidate.to_ascii_lowercase(),
        );
        if score > best_score {
            best_score = score;
            best_match = Some(candidate.to_string());
        }
    }

    best_match
}
