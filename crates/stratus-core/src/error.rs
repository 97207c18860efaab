// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for the Stratus validation subsystem.
//!
//! Every fatal condition is a variant naming the section/parameter it
//! implicates, with miette diagnostic codes and "did you mean?" help for
//! unknown names. Warnings are not errors here -- they go through `tracing`
//! and never block validation.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::Diagnostic;
use thiserror::Error;

use crate::types::ValueKind;

/// The primary error type used across catalog loading, settings merge,
/// section validation, plugin resolution, and upgrade classification.
#[derive(Debug, Error, Diagnostic)]
pub enum StratusError {
    /// A catalog descriptor line could not be parsed.
    #[error("malformed catalog entry at line {line}: {detail}")]
    #[diagnostic(code(stratus::catalog::malformed_entry))]
    MalformedCatalogEntry {
        /// 1-based line number in the descriptor table.
        line: u64,
        /// What was wrong with the line.
        detail: String,
    },

    /// The same (section, parameter) appeared twice in the catalog.
    #[error("duplicate catalog parameter `{section}/{name}`")]
    #[diagnostic(code(stratus::catalog::duplicate_parameter))]
    DuplicateParameter {
        /// Section of the repeated descriptor.
        section: String,
        /// Parameter name of the repeated descriptor.
        name: String,
    },

    /// A manifest section is neither in the catalog nor on an allow-list.
    #[error("unknown section `{section}`")]
    #[diagnostic(
        code(stratus::settings::unknown_section),
        help("{}", format_suggestion_help(suggestion.as_deref()))
    )]
    UnknownSection {
        /// The unrecognized section name.
        section: String,
        /// Closest known section name, if any is close enough.
        suggestion: Option<String>,
    },

    /// A manifest parameter has no catalog descriptor.
    #[error("unknown parameter `{name}` in section `{section}`")]
    #[diagnostic(
        code(stratus::settings::unknown_parameter),
        help("{}", format_suggestion_help(suggestion.as_deref()))
    )]
    UnknownParameter {
        /// Section the parameter appeared in.
        section: String,
        /// The unrecognized parameter name.
        name: String,
        /// Closest known parameter name in that section, if any.
        suggestion: Option<String>,
    },

    /// A manifest section uses a name reserved by the engine.
    #[error("section `{section}` is reserved: {reason}")]
    #[diagnostic(code(stratus::settings::invalid_section))]
    InvalidSection {
        /// The offending section name.
        section: String,
        /// Why the name is reserved.
        reason: String,
    },

    /// A merged value does not parse as its declared type.
    #[error("invalid value for `{section}/{parameter}`: `{value}` does not parse as {kind}")]
    #[diagnostic(code(stratus::settings::invalid_value))]
    InvalidValue {
        /// Section of the offending parameter.
        section: String,
        /// The offending parameter name.
        parameter: String,
        /// The type the catalog declares for it.
        kind: ValueKind,
        /// The raw value that failed to parse.
        value: String,
    },

    /// A section validator found a genuinely invalid state.
    #[error("validation error: {message}")]
    #[diagnostic(code(stratus::validate::violation))]
    Validation {
        /// Description of the violated constraint.
        message: String,
    },

    /// A plugin instance name collides with a catalog section name.
    #[error("plugin instance `{instance}` conflicts with a catalog section of the same name")]
    #[diagnostic(code(stratus::diagnostics::conflicting_section_name))]
    ConflictingSectionName {
        /// The colliding instance name.
        instance: String,
    },

    /// A plugin instance has no matching manifest section.
    #[error("plugin instance `{instance}` has no matching manifest section")]
    #[diagnostic(code(stratus::diagnostics::missing_section))]
    MissingSection {
        /// The instance missing its section.
        instance: String,
    },

    /// An instance name appeared more than once in a plugin list.
    #[error("duplicate plugin instance `{name}`")]
    #[diagnostic(code(stratus::diagnostics::duplicate_instance))]
    DuplicateInstance {
        /// The repeated instance name.
        name: String,
    },

    /// A plugin instance declares a type the registry cannot resolve.
    #[error("plugin instance `{instance}` declares unsupported type `{type_name}`")]
    #[diagnostic(
        code(stratus::diagnostics::unsupported_type),
        help("register the type with PluginRegistry::register_custom, or use a standard type")
    )]
    UnsupportedType {
        /// The instance declaring the type.
        instance: String,
        /// The unresolvable type name.
        type_name: String,
    },

    /// A resolved plugin validator failed to load or validate.
    #[error("failed to load plugin validator for instance `{instance}`: {detail}")]
    #[diagnostic(code(stratus::diagnostics::plugin_load))]
    PluginLoad {
        /// The instance whose validator failed.
        instance: String,
        /// Load or capability failure detail.
        detail: String,
    },

    /// A producer/consumer pair is not in the compatibility relation.
    #[error(
        "producer `{producer}` ({producer_type}) is not compatible with consumer `{consumer}` ({consumer_type})"
    )]
    #[diagnostic(code(stratus::diagnostics::incompatible_pair))]
    IncompatiblePair {
        /// Producer instance name.
        producer: String,
        /// Producer type name.
        producer_type: String,
        /// Consumer instance name.
        consumer: String,
        /// Consumer type name.
        consumer_type: String,
    },

    /// One or more parameters with a NotAllowed policy changed.
    #[error("upgrade rejected; NotAllowed parameters changed: {}", .changes.join(", "))]
    #[diagnostic(code(stratus::upgrade::not_allowed))]
    UpgradeNotAllowed {
        /// Every offending `Section/Parameter` key.
        changes: Vec<String>,
    },

    /// One or more SingleChange parameters changed a second time.
    #[error("upgrade rejected; SingleChange parameters changed more than once: {}", .changes.join(", "))]
    #[diagnostic(code(stratus::upgrade::single_change))]
    SingleChangeViolation {
        /// Every offending `Section/Parameter` key.
        changes: Vec<String>,
    },

    /// The decryption backend rejected a ciphertext.
    #[error("failed to decrypt value under scope `{scope}`: {detail}")]
    #[diagnostic(code(stratus::secret::decrypt))]
    Decrypt {
        /// Security-context scope the decryption ran under.
        scope: String,
        /// Backend failure detail.
        detail: String,
    },
}

/// Format the help message for unknown section/parameter errors.
fn format_suggestion_help(suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`?"),
        None => "check the settings catalog for recognized names".to_string(),
    }
}

/// Render a list of `StratusError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[StratusError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_section_names_the_section() {
        let err = StratusError::UnknownSection {
            section: "FailoverManagr".to_string(),
            suggestion: Some("FailoverManager".to_string()),
        };
        assert!(err.to_string().contains("FailoverManagr"));
    }

    #[test]
    fn invalid_value_names_section_parameter_and_kind() {
        let err = StratusError::InvalidValue {
            section: "FailoverManager".to_string(),
            parameter: "TargetReplicaSetSize".to_string(),
            kind: ValueKind::Int,
            value: "seven".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("FailoverManager/TargetReplicaSetSize"));
        assert!(msg.contains("seven"));
        assert!(msg.contains("int"));
    }

    #[test]
    fn upgrade_not_allowed_lists_every_change() {
        let err = StratusError::UpgradeNotAllowed {
            changes: vec!["Federation/NodeIdFormat".to_string(), "Security/Mode".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Federation/NodeIdFormat"));
        assert!(msg.contains("Security/Mode"));
    }
}
