// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Descriptor-table parsing.
//!
//! The table is comma-separated, one parameter per line:
//! `section,name,type,defaultExpr,upgradePolicy,classificationTag`, with
//! `#`-prefixed comment lines. A copy ships compiled into the binary; hosts
//! with a patched table can load their own text instead.

use stratus_core::{Classification, StratusError, UpgradePolicy, ValueKind};
use tracing::debug;

use crate::descriptor::{ParameterDescriptor, SettingsCatalog};
use crate::expr;

/// The descriptor table packaged with this build.
const BUILTIN_TABLE: &str = include_str!("../data/catalog.csv");

/// Fields per descriptor row.
const FIELDS_PER_ROW: usize = 6;

impl SettingsCatalog {
    /// Parse a descriptor table from text.
    pub fn parse(table: &str) -> Result<Self, StratusError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(table.as_bytes());

        let mut catalog = Self::default();
        let mut rows = 0u64;
        for record in reader.records() {
            let record = record.map_err(|e| StratusError::MalformedCatalogEntry {
                line: e.position().map_or(0, csv::Position::line),
                detail: e.to_string(),
            })?;
            let line = record.position().map_or(0, csv::Position::line);

            if record.len() != FIELDS_PER_ROW {
                return Err(StratusError::MalformedCatalogEntry {
                    line,
                    detail: format!(
                        "expected {FIELDS_PER_ROW} fields, found {}",
                        record.len()
                    ),
                });
            }

            let section = &record[0];
            let name = &record[1];
            if section.is_empty() || name.is_empty() {
                return Err(StratusError::MalformedCatalogEntry {
                    line,
                    detail: "section and parameter names must be non-empty".to_string(),
                });
            }

            let kind: ValueKind = record[2].parse().map_err(|_| {
                StratusError::MalformedCatalogEntry {
                    line,
                    detail: format!("unknown value type `{}`", &record[2]),
                }
            })?;
            let upgrade_policy: UpgradePolicy = record[4].parse().map_err(|_| {
                StratusError::MalformedCatalogEntry {
                    line,
                    detail: format!("unknown upgrade policy `{}`", &record[4]),
                }
            })?;
            let classification: Classification = record[5].parse().map_err(|_| {
                StratusError::MalformedCatalogEntry {
                    line,
                    detail: format!("unknown classification tag `{}`", &record[5]),
                }
            })?;
            let default_value = expr::eval_default(kind, &record[3]).map_err(|detail| {
                StratusError::MalformedCatalogEntry { line, detail }
            })?;

            catalog.insert(ParameterDescriptor {
                section: section.to_string(),
                name: name.to_string(),
                kind,
                default_value,
                upgrade_policy,
                classification,
            })?;
            rows += 1;
        }

        debug!(rows, "settings catalog loaded");
        Ok(catalog)
    }

    /// Parse the table packaged with this build.
    ///
    /// The caller owns the result; build it once per process and pass it to
    /// every component that needs it.
    pub fn load_builtin() -> Result<Self, StratusError> {
        Self::parse(BUILTIN_TABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_parses() {
        let catalog = SettingsCatalog::load_builtin().unwrap();
        assert!(catalog.has_section("FailoverManager"));
        assert!(catalog.has_section("Diagnostics"));
    }

    #[test]
    fn literal_product_default_is_evaluated() {
        let catalog = SettingsCatalog::parse(
            "Sect,Param,int,4*1024,Dynamic,Public\n",
        )
        .unwrap();
        assert_eq!(catalog.get("Sect", "Param").unwrap().default_value, "4096");
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let catalog = SettingsCatalog::parse(
            "FailoverManager,TargetReplicaSetSize,int,7,Static,Public\n",
        )
        .unwrap();
        assert!(catalog.get("failovermanager", "targetreplicasetsize").is_some());
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let table = "\
# leading comment
Sect,Param,bool,true,Dynamic,Public

# trailing comment
";
        let catalog = SettingsCatalog::parse(table).unwrap();
        assert_eq!(catalog.get("Sect", "Param").unwrap().default_value, "true");
    }

    #[test]
    fn duplicate_parameter_is_fatal() {
        let table = "\
Sect,Param,int,1,Dynamic,Public
Sect,param,int,2,Dynamic,Public
";
        let err = SettingsCatalog::parse(table).unwrap_err();
        assert!(matches!(err, StratusError::DuplicateParameter { .. }));
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        let err = SettingsCatalog::parse("Sect,Param,int,1,Dynamic\n").unwrap_err();
        assert!(matches!(err, StratusError::MalformedCatalogEntry { .. }));
    }

    #[test]
    fn bad_policy_names_the_line() {
        let table = "\
Sect,A,int,1,Dynamic,Public
Sect,B,int,1,Sometimes,Public
";
        match SettingsCatalog::parse(table).unwrap_err() {
            StratusError::MalformedCatalogEntry { line, detail } => {
                assert_eq!(line, 2);
                assert!(detail.contains("Sometimes"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn property_group_row_becomes_a_template() {
        let catalog = SettingsCatalog::parse(
            "MetricActivityThresholds,PropertyGroup,uint,0,Dynamic,Public\n",
        )
        .unwrap();
        assert!(catalog.is_property_group("MetricActivityThresholds"));
        let template = catalog
            .get_section("MetricActivityThresholds")
            .unwrap()
            .property_group_template()
            .unwrap();
        assert_eq!(template.kind, ValueKind::Uint);
        // The template itself is not an addressable parameter.
        assert!(catalog.get("MetricActivityThresholds", "PropertyGroup").is_none());
    }

    #[test]
    fn quoted_string_default_is_unwrapped() {
        let catalog = SettingsCatalog::parse(
            "Security,ClusterCredentialType,string,\"\"\"None\"\"\",SingleChange,Public\n",
        )
        .unwrap();
        assert_eq!(
            catalog.get("Security", "ClusterCredentialType").unwrap().default_value,
            "None"
        );
    }
}
