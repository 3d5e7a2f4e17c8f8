//! Columnar connector for CSV and parquet tables.
//!
//! Rows from either format are normalized into JSON-valued records keyed by
//! column name, so the three document-type builders are format-agnostic.
//! Row order is preserved; multi-document grouping is stable in first-seen
//! id order and never re-sorts.

use std::fs::File;
use std::path::Path;

use indexmap::IndexMap;
use parquet::file::reader::{FileReader, SerializedFileReader};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::connector::{Connector, conversation_units, invalid};
use crate::constants::columnar::{
    DEFAULT_CSV_SEPARATOR, DEFAULT_MULTI_DOC_ID_COLUMN, DEFAULT_SUMMARY_COLUMN,
    DEFAULT_TEXT_COLUMN,
};
use crate::constants::connectors;
use crate::constants::text::{DEFAULT_MULTI_DOC_DELIMITER, DEFAULT_SPEAKER_PATTERN};
use crate::document::{Conversation, Document, DocumentType, ImportedItem, Metadata, MultiDocument};
use crate::errors::ImportError;
use crate::options::{
    OptionKind, OptionMap, OptionSpec, column_list_option, pattern_option, separator_byte_option,
    text_option,
};
use crate::raw::ResourceType;
use crate::types::ColumnName;

/// Options declared by the columnar connector.
pub const OPTION_SPECS: &[OptionSpec] = &[
    OptionSpec {
        name: "text_column",
        kind: OptionKind::Text,
        default: DEFAULT_TEXT_COLUMN,
        help: "column holding the document text",
    },
    OptionSpec {
        name: "summary_column",
        kind: OptionKind::Text,
        default: DEFAULT_SUMMARY_COLUMN,
        help: "column holding the reference summary",
    },
    OptionSpec {
        name: "metadata_columns",
        kind: OptionKind::ColumnList,
        default: "",
        help: "columns copied into metadata (empty: all except text/summary)",
    },
    OptionSpec {
        name: "csv_separator",
        kind: OptionKind::Text,
        default: DEFAULT_CSV_SEPARATOR,
        help: "field separator for CSV resources",
    },
    OptionSpec {
        name: "multi_doc_id_column",
        kind: OptionKind::Text,
        default: DEFAULT_MULTI_DOC_ID_COLUMN,
        help: "column grouping rows into one multi-document",
    },
    OptionSpec {
        name: "multi_document_delimiter",
        kind: OptionKind::Text,
        default: DEFAULT_MULTI_DOC_DELIMITER,
        help: "token splitting a text cell when no id column exists",
    },
    OptionSpec {
        name: "conversation_pattern",
        kind: OptionKind::Pattern,
        default: DEFAULT_SPEAKER_PATTERN,
        help: "speaker-tag pattern used to segment conversation cells",
    },
];

/// Connector for `csv`/`parquet` resource kinds.
pub struct ColumnarConnector {
    text_column: ColumnName,
    summary_column: ColumnName,
    metadata_columns: Vec<ColumnName>,
    csv_separator: u8,
    multi_doc_id_column: ColumnName,
    multi_doc_delimiter: String,
    conversation_tag: Regex,
}

/// A table normalized from either on-disk format.
struct Table {
    columns: Vec<ColumnName>,
    rows: Vec<IndexMap<ColumnName, Value>>,
}

impl ColumnarConnector {
    /// Build the connector from the flat option map.
    pub fn from_options(options: &OptionMap) -> Result<Self, ImportError> {
        Ok(Self {
            text_column: text_option(options, "text_column", DEFAULT_TEXT_COLUMN),
            summary_column: text_option(options, "summary_column", DEFAULT_SUMMARY_COLUMN),
            metadata_columns: column_list_option(options, "metadata_columns"),
            csv_separator: separator_byte_option(options, "csv_separator", DEFAULT_CSV_SEPARATOR)?,
            multi_doc_id_column: text_option(
                options,
                "multi_doc_id_column",
                DEFAULT_MULTI_DOC_ID_COLUMN,
            ),
            multi_doc_delimiter: text_option(
                options,
                "multi_document_delimiter",
                DEFAULT_MULTI_DOC_DELIMITER,
            ),
            conversation_tag: pattern_option(
                options,
                "conversation_pattern",
                DEFAULT_SPEAKER_PATTERN,
            )?,
        })
    }

    fn read_table(&self, path: &Path) -> Result<Table, ImportError> {
        match ResourceType::classify(path)? {
            ResourceType::Csv => self.read_csv(path),
            ResourceType::Parquet => self.read_parquet(path),
            _ => Err(ImportError::ResourceNotFound(path.display().to_string())),
        }
    }

    fn read_csv(&self, path: &Path) -> Result<Table, ImportError> {
        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.csv_separator)
            .from_reader(file);
        let columns: Vec<ColumnName> = reader
            .headers()
            .map_err(|err| invalid(path, format!("failed reading csv header: {err}")))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|err| invalid(path, format!("failed reading csv row: {err}")))?;
            let mut row = IndexMap::with_capacity(columns.len());
            for (column, cell) in columns.iter().zip(record.iter()) {
                row.insert(column.clone(), Value::String(cell.to_string()));
            }
            rows.push(row);
        }
        Ok(Table { columns, rows })
    }

    fn read_parquet(&self, path: &Path) -> Result<Table, ImportError> {
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)
            .map_err(|err| invalid(path, format!("failed reading parquet metadata: {err}")))?;
        let columns: Vec<ColumnName> = reader
            .metadata()
            .file_metadata()
            .schema()
            .get_fields()
            .iter()
            .map(|field| field.name().to_string())
            .collect();

        let iter = reader
            .get_row_iter(None)
            .map_err(|err| invalid(path, format!("failed iterating parquet rows: {err}")))?;
        let mut rows = Vec::new();
        for row in iter {
            let row =
                row.map_err(|err| invalid(path, format!("failed reading parquet row: {err}")))?;
            let value = row.to_json_value();
            let mut normalized = IndexMap::with_capacity(columns.len());
            if let Value::Object(mut fields) = value {
                for column in &columns {
                    let cell = fields.remove(column).unwrap_or(Value::Null);
                    normalized.insert(column.clone(), cell);
                }
            }
            rows.push(normalized);
        }
        Ok(Table { columns, rows })
    }

    fn require_text_column(&self, path: &Path, table: &Table) -> Result<(), ImportError> {
        if table.columns.iter().any(|col| *col == self.text_column) {
            return Ok(());
        }
        Err(invalid(
            path,
            format!(
                "no '{}' column found; rename the text column to '{}' (and any summary column \
                 to '{}') or set the text_column/summary_column options",
                self.text_column, self.text_column, self.summary_column
            ),
        ))
    }

    fn row_text(
        &self,
        path: &Path,
        row: &IndexMap<ColumnName, Value>,
        index: usize,
    ) -> Result<String, ImportError> {
        row.get(&self.text_column)
            .and_then(value_to_text)
            .ok_or_else(|| invalid(path, format!("row {index} has no '{}' value", self.text_column)))
    }

    fn row_summary(&self, row: &IndexMap<ColumnName, Value>) -> Option<String> {
        row.get(&self.summary_column).and_then(value_to_text)
    }

    fn row_metadata(&self, row: &IndexMap<ColumnName, Value>) -> Metadata {
        let mut metadata = Metadata::new();
        for (column, value) in row {
            if !self.is_metadata_column(column) {
                continue;
            }
            metadata.insert(column.clone(), value.clone());
        }
        metadata
    }

    fn is_metadata_column(&self, column: &str) -> bool {
        if self.metadata_columns.is_empty() {
            column != self.text_column && column != self.summary_column
        } else {
            self.metadata_columns.iter().any(|col| col == column)
        }
    }

    fn import_documents(&self, path: &Path, table: &Table) -> Result<Vec<ImportedItem>, ImportError> {
        let mut items = Vec::with_capacity(table.rows.len());
        for (index, row) in table.rows.iter().enumerate() {
            let text = self.row_text(path, row, index)?;
            items.push(ImportedItem::Document(Document::new(
                text,
                self.row_summary(row),
                self.row_metadata(row),
            )));
        }
        Ok(items)
    }

    fn import_multi_documents(
        &self,
        path: &Path,
        table: &Table,
    ) -> Result<Vec<ImportedItem>, ImportError> {
        if table.columns.iter().any(|col| *col == self.multi_doc_id_column) {
            return self.import_grouped_multi_documents(path, table);
        }

        let mut items = Vec::with_capacity(table.rows.len());
        for (index, row) in table.rows.iter().enumerate() {
            let text = self.row_text(path, row, index)?;
            let documents = text
                .split(self.multi_doc_delimiter.as_str())
                .filter(|unit| !unit.is_empty())
                .map(|unit| Document::new(unit, None, Metadata::new()))
                .collect();
            items.push(ImportedItem::MultiDocument(MultiDocument::new(
                documents,
                self.row_summary(row),
                self.row_metadata(row),
            )));
        }
        Ok(items)
    }

    fn import_grouped_multi_documents(
        &self,
        path: &Path,
        table: &Table,
    ) -> Result<Vec<ImportedItem>, ImportError> {
        // First-seen id order; never re-sorted.
        let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (index, row) in table.rows.iter().enumerate() {
            let id = row
                .get(&self.multi_doc_id_column)
                .and_then(value_to_text)
                .unwrap_or_default();
            groups.entry(id).or_default().push(index);
        }

        let mut items = Vec::with_capacity(groups.len());
        for (_, row_indices) in groups {
            let mut documents = Vec::with_capacity(row_indices.len());
            let mut summary = None;
            let mut metadata = Metadata::new();
            for &index in &row_indices {
                let row = &table.rows[index];
                let text = self.row_text(path, row, index)?;
                documents.push(Document::new(text, None, Metadata::new()));
                if summary.is_none() {
                    summary = self.row_summary(row);
                }
                for (column, value) in row {
                    if !self.is_metadata_column(column) {
                        continue;
                    }
                    if let Value::Array(values) = metadata
                        .entry(column.clone())
                        .or_insert_with(|| Value::Array(Vec::new()))
                    {
                        values.push(value.clone());
                    }
                }
            }
            items.push(ImportedItem::MultiDocument(MultiDocument::new(
                documents, summary, metadata,
            )));
        }
        Ok(items)
    }

    fn import_conversations(
        &self,
        path: &Path,
        table: &Table,
    ) -> Result<Vec<ImportedItem>, ImportError> {
        let mut items = Vec::with_capacity(table.rows.len());
        for (index, row) in table.rows.iter().enumerate() {
            let text = self.row_text(path, row, index)?;
            let units = conversation_units(&text, &self.conversation_tag);
            items.push(ImportedItem::Conversation(Conversation::new(
                units,
                self.row_summary(row),
                self.row_metadata(row),
            )));
        }
        Ok(items)
    }
}

impl Connector for ColumnarConnector {
    fn name(&self) -> &'static str {
        connectors::COLUMNAR
    }

    fn check_data(&self, path: &Path, _document_type: DocumentType) -> bool {
        matches!(
            ResourceType::from_extension(path),
            ResourceType::Csv | ResourceType::Parquet
        ) && !path.is_dir()
    }

    fn import_data(
        &self,
        path: &Path,
        document_type: DocumentType,
    ) -> Result<Vec<ImportedItem>, ImportError> {
        let table = self.read_table(path)?;
        debug!(
            resource = %path.display(),
            rows = table.rows.len(),
            columns = table.columns.len(),
            "normalized columnar resource"
        );
        self.require_text_column(path, &table)?;
        match document_type {
            DocumentType::Document => self.import_documents(path, &table),
            DocumentType::MultiDocument => self.import_multi_documents(path, &table),
            DocumentType::Conversation => self.import_conversations(path, &table),
        }
    }
}

/// Render a cell as text; nulls and blank strings count as absent.
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn connector() -> ColumnarConnector {
        ColumnarConnector::from_options(&OptionMap::new()).unwrap()
    }

    fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn documents_preserve_row_order_and_metadata_values() {
        let temp = tempdir().unwrap();
        let path = write_csv(
            temp.path(),
            "corpus.csv",
            "text,summary,date\n\
             alpha,short a,2022-01-01 00:00:00\n\
             beta,short b,2022-02-01 00:00:00\n\
             gamma,short c,2022-03-01 00:00:00\n\
             delta,short d,2022-07-01 08:29:01\n",
        );

        let items = connector()
            .import_data(&path, DocumentType::Document)
            .unwrap();
        assert_eq!(items.len(), 4);
        let last = items[3].as_document().unwrap();
        assert_eq!(last.text, "delta");
        assert_eq!(last.summary.as_deref(), Some("short d"));
        assert_eq!(last.metadata["date"], "2022-07-01 08:29:01");
        assert!(!last.metadata.contains_key("text"));
        assert!(!last.metadata.contains_key("summary"));
    }

    #[test]
    fn parquet_rows_normalize_like_csv_rows() {
        use parquet::data_type::{ByteArray, ByteArrayType, Int64Type};
        use parquet::file::properties::WriterProperties;
        use parquet::file::writer::SerializedFileWriter;
        use parquet::schema::parser::parse_message_type;
        use std::sync::Arc;

        let temp = tempdir().unwrap();
        let path = temp.path().join("corpus.parquet");
        let schema = Arc::new(
            parse_message_type(
                "message corpus {
                    REQUIRED BYTE_ARRAY text (UTF8);
                    OPTIONAL BYTE_ARRAY summary (UTF8);
                    REQUIRED INT64 year;
                }",
            )
            .unwrap(),
        );
        let file = File::create(&path).unwrap();
        let props = Arc::new(WriterProperties::builder().build());
        let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();
        let mut row_group = writer.next_row_group().unwrap();

        let mut column = row_group.next_column().unwrap().unwrap();
        column
            .typed::<ByteArrayType>()
            .write_batch(
                &[ByteArray::from("alpha"), ByteArray::from("beta")],
                None,
                None,
            )
            .unwrap();
        column.close().unwrap();

        // Second row's summary is null.
        let mut column = row_group.next_column().unwrap().unwrap();
        column
            .typed::<ByteArrayType>()
            .write_batch(&[ByteArray::from("short a")], Some(&[1, 0]), None)
            .unwrap();
        column.close().unwrap();

        let mut column = row_group.next_column().unwrap().unwrap();
        column
            .typed::<Int64Type>()
            .write_batch(&[2021, 2022], None, None)
            .unwrap();
        column.close().unwrap();

        row_group.close().unwrap();
        writer.close().unwrap();

        let connector = connector();
        assert!(connector.check_data(&path, DocumentType::Document));
        let items = connector
            .import_data(&path, DocumentType::Document)
            .unwrap();
        assert_eq!(items.len(), 2);
        let first = items[0].as_document().unwrap();
        assert_eq!(first.text, "alpha");
        assert_eq!(first.summary.as_deref(), Some("short a"));
        assert_eq!(first.metadata["year"], 2021);
        let second = items[1].as_document().unwrap();
        assert_eq!(second.text, "beta");
        assert_eq!(second.summary, None);
        assert_eq!(second.metadata["year"], 2022);
    }

    #[test]
    fn missing_text_column_is_invalid() {
        let temp = tempdir().unwrap();
        let path = write_csv(temp.path(), "corpus.csv", "body,summary\na,b\n");

        let err = connector()
            .import_data(&path, DocumentType::Document)
            .unwrap_err();
        match err {
            ImportError::InvalidResource { reason, .. } => {
                assert!(reason.contains("text_column"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn grouped_rows_build_one_multi_document_per_id_in_first_seen_order() {
        let temp = tempdir().unwrap();
        let path = write_csv(
            temp.path(),
            "corpus.csv",
            "multi_doc_id,text,summary\n\
             b,first of b,\n\
             a,first of a,summary a\n\
             b,second of b,summary b\n",
        );

        let items = connector()
            .import_data(&path, DocumentType::MultiDocument)
            .unwrap();
        assert_eq!(items.len(), 2);

        let group_b = items[0].as_multi_document().unwrap();
        assert_eq!(group_b.documents.len(), 2);
        assert_eq!(group_b.documents[0].text, "first of b");
        assert_eq!(group_b.documents[1].text, "second of b");
        assert_eq!(group_b.summary.as_deref(), Some("summary b"));

        let group_a = items[1].as_multi_document().unwrap();
        assert_eq!(group_a.documents.len(), 1);
        assert_eq!(group_a.summary.as_deref(), Some("summary a"));
    }

    #[test]
    fn delimiter_splits_text_cells_when_no_id_column_exists() {
        let temp = tempdir().unwrap();
        let path = write_csv(
            temp.path(),
            "corpus.csv",
            "text,summary\nfirst#DOCUMENT#second,joint summary\n",
        );

        let items = connector()
            .import_data(&path, DocumentType::MultiDocument)
            .unwrap();
        assert_eq!(items.len(), 1);
        let group = items[0].as_multi_document().unwrap();
        assert_eq!(group.documents.len(), 2);
        assert_eq!(group.summary.as_deref(), Some("joint summary"));
    }

    #[test]
    fn conversation_rows_split_by_speaker_tags() {
        let temp = tempdir().unwrap();
        let path = write_csv(
            temp.path(),
            "corpus.csv",
            "text,summary\n#P1# Hello#P2# Hi,greeting\n",
        );

        let items = connector()
            .import_data(&path, DocumentType::Conversation)
            .unwrap();
        let conversation = items[0].as_conversation().unwrap();
        assert_eq!(conversation.text_units.len(), 2);
        assert_eq!(conversation.text_units[0].speaker, "P1");
        assert_eq!(conversation.text_units[0].text, "Hello");
        assert_eq!(conversation.summary.as_deref(), Some("greeting"));
    }

    #[test]
    fn explicit_metadata_columns_limit_the_copied_set() {
        let temp = tempdir().unwrap();
        let path = write_csv(
            temp.path(),
            "corpus.csv",
            "text,summary,date,author\nalpha,s,2024-01-01,ada\n",
        );

        let mut options = OptionMap::new();
        options.insert("metadata_columns".to_string(), "date".to_string());
        let connector = ColumnarConnector::from_options(&options).unwrap();
        let items = connector
            .import_data(&path, DocumentType::Document)
            .unwrap();
        let doc = items[0].as_document().unwrap();
        assert_eq!(doc.metadata["date"], "2024-01-01");
        assert!(!doc.metadata.contains_key("author"));
    }

    #[test]
    fn custom_csv_separator_is_honored() {
        let temp = tempdir().unwrap();
        let path = write_csv(temp.path(), "corpus.csv", "text;summary\nalpha;short\n");

        let mut options = OptionMap::new();
        options.insert("csv_separator".to_string(), ";".to_string());
        let connector = ColumnarConnector::from_options(&options).unwrap();
        let items = connector
            .import_data(&path, DocumentType::Document)
            .unwrap();
        assert_eq!(items[0].as_document().unwrap().text, "alpha");
        assert_eq!(items[0].summary(), Some("short"));
    }

    #[test]
    fn claims_tabular_extensions_only() {
        let temp = tempdir().unwrap();
        let csv = write_csv(temp.path(), "rows.csv", "text\na\n");
        let txt = write_csv(temp.path(), "rows.txt", "plain");
        let connector = connector();
        assert!(connector.check_data(&csv, DocumentType::Document));
        assert!(connector.check_data(Path::new("missing.parquet"), DocumentType::Document));
        assert!(!connector.check_data(&txt, DocumentType::Document));
    }
}
