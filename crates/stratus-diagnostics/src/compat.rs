// SPDX-FileCopyrightText: 2026 Stratus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Producer/consumer compatibility relation.
//!
//! A fixed bipartite matrix: each standard producer type names the standard
//! consumer types able to ingest its output format. Process-wide, immutable.
//! Custom types are exempt; only standard/standard pairs are checked.

/// `(producer type, compatible consumer types)` rows of the relation.
const COMPATIBILITY: &[(&str, &[&str])] = &[
    (
        "EtlFileProducer",
        &[
            "FileShareEtwCsvUploader",
            "AzureBlobEtwCsvUploader",
            "AzureTableEtwEventUploader",
        ],
    ),
    (
        "FolderProducer",
        &[
            "FileShareFolderUploader",
            "AzureBlobFolderUploader",
            "MdsFileProducer",
        ],
    ),
    (
        "PerfCounterProducer",
        &["FileShareFolderUploader", "AzureBlobFolderUploader"],
    ),
];

/// Consumer types able to ingest the producer type's output.
pub fn compatible_consumers(producer_type: &str) -> &'static [&'static str] {
    COMPATIBILITY
        .iter()
        .find(|(p, _)| p.eq_ignore_ascii_case(producer_type))
        .map_or(&[], |(_, consumers)| consumers)
}

/// Whether the pair appears in the relation.
pub fn is_compatible_pair(producer_type: &str, consumer_type: &str) -> bool {
    compatible_consumers(producer_type)
        .iter()
        .any(|c| c.eq_ignore_ascii_case(consumer_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etl_to_file_share_csv_is_compatible() {
        assert!(is_compatible_pair("EtlFileProducer", "FileShareEtwCsvUploader"));
    }

    #[test]
    fn etl_to_mds_file_is_not_compatible() {
        assert!(!is_compatible_pair("EtlFileProducer", "MdsFileProducer"));
    }

    #[test]
    fn folder_producer_feeds_folder_uploaders() {
        assert!(is_compatible_pair("FolderProducer", "AzureBlobFolderUploader"));
        assert!(is_compatible_pair("folderproducer", "mdsfileproducer"));
        assert!(!is_compatible_pair("FolderProducer", "AzureTableEtwEventUploader"));
    }

    #[test]
    fn unknown_producer_has_no_compatible_consumers() {
        assert!(compatible_consumers("Mystery").is_empty());
    }
}
