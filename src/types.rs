/// Name identifying a resource in errors and metadata.
/// Examples: `data/meetings`, `corpus.csv`, `foo.txt`
pub type ResourceName = String;
/// Identifier shared by all units produced from one corpus item.
/// Examples: `foo.txt`, `bar` (a subdirectory name), `pair.source-3`
pub type Identifier = String;
/// Speaker label extracted from a conversation tag.
/// Examples: `Person1`, `P2`
pub type SpeakerLabel = String;
/// One utterance of a conversation, the text between two speaker tags.
/// Example: `Hello, how are you?`
pub type Utterance = String;
/// Column name in a tabular resource.
/// Examples: `text`, `summary`, `multi_doc_id`, `date`
pub type ColumnName = String;
