/// Constants shared by every connector that splits embedded content.
pub mod text {
    /// Token separating embedded documents inside one content cell or file.
    pub const DEFAULT_MULTI_DOC_DELIMITER: &str = "#DOCUMENT#";
    /// Speaker-tag pattern marking conversation turns (tags look like `#NAME#`).
    pub const DEFAULT_SPEAKER_PATTERN: &str = r"#\w+#";
}

/// Constants used by metadata construction.
pub mod metadata {
    /// Metadata key carrying the identifier of the item a container came from.
    pub const RESOURCE_NAME_KEY: &str = "resource_name";
    /// Column/field names that map to structural fields, never into metadata.
    pub const RESERVED_KEYS: [&str; 2] = ["text", "summary"];
}

/// Constants used by the folder connector's directory convention.
pub mod folder {
    /// Suffix marking a sibling file as an item's reference summary.
    pub const DEFAULT_SUMMARY_SUFFIX: &str = "_summary";
    /// Suffix marking a sibling `.json` file as an item's metadata record.
    pub const DEFAULT_METADATA_SUFFIX: &str = "_metadata";
}

/// Constants used by the columnar connector's schema defaults.
pub mod columnar {
    /// Column holding the document text.
    pub const DEFAULT_TEXT_COLUMN: &str = "text";
    /// Column holding the reference summary.
    pub const DEFAULT_SUMMARY_COLUMN: &str = "summary";
    /// Column grouping rows into one multi-document.
    pub const DEFAULT_MULTI_DOC_ID_COLUMN: &str = "multi_doc_id";
    /// Field separator for CSV resources.
    pub const DEFAULT_CSV_SEPARATOR: &str = ",";
}

/// Constants used by the source-target connector's pairing convention.
pub mod source_target {
    /// Extension of files holding source-side units.
    pub const SOURCE_EXTENSION: &str = "source";
    /// Extension of files holding target-side units.
    pub const TARGET_EXTENSION: &str = "target";
    /// Separator splitting each file into aligned units.
    pub const DEFAULT_UNIT_SEPARATOR: &str = "\n";
}

/// Canonical names of the built-in connectors, in registry declaration order.
pub mod connectors {
    /// Name registered for the source-target connector.
    pub const SOURCE_TARGET: &str = "source-target";
    /// Name registered for the columnar connector.
    pub const COLUMNAR: &str = "columnar";
    /// Name registered for the JSON connector.
    pub const JSON: &str = "json";
    /// Name registered for the folder connector.
    pub const FOLDER: &str = "folder";
    /// Name registered for the plain-file connector.
    pub const FILE: &str = "file";
}
