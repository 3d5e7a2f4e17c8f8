use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Insertion-ordered metadata attached to imported containers.
pub type Metadata = IndexMap<String, Value>;

/// Canonical shape requested from a connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    /// One text per item.
    Document,
    /// An ordered group of texts per item.
    MultiDocument,
    /// Speaker-attributed turns per item.
    Conversation,
}

impl DocumentType {
    /// Canonical label used in configuration and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::MultiDocument => "multi-document",
            Self::Conversation => "conversation",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single text with an optional reference summary.
///
/// `text` is never absent; a missing summary is `None`, never an omitted
/// document. Constructed once by a connector and not mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document body, byte-identical to the source content apart from the
    /// connector's documented delimiter splitting.
    pub text: String,
    /// Reference summary, when the source convention provided one.
    pub summary: Option<String>,
    /// Per-item metadata (sidecar records, non-reserved columns).
    pub metadata: Metadata,
}

impl Document {
    /// Create a document from its parts.
    pub fn new(text: impl Into<String>, summary: Option<String>, metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            summary,
            metadata,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Ordered group of documents sharing one summary and metadata.
///
/// The group owns its documents exclusively; their order matches the order
/// the underlying units first appeared in the source listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiDocument {
    /// Member documents in first-occurrence order.
    pub documents: Vec<Document>,
    /// Group-level reference summary.
    pub summary: Option<String>,
    /// Group-level metadata.
    pub metadata: Metadata,
}

impl MultiDocument {
    /// Create a multi-document group from its parts.
    pub fn new(documents: Vec<Document>, summary: Option<String>, metadata: Metadata) -> Self {
        Self {
            documents,
            summary,
            metadata,
        }
    }
}

impl fmt::Display for MultiDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.documents.iter().map(|doc| doc.text.as_str()).collect();
        f.write_str(&joined.join("\n"))
    }
}

/// One turn of a conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextUnit {
    /// Utterance text.
    pub text: String,
    /// Speaker label stripped of tag delimiters.
    pub speaker: String,
    /// Optional per-turn metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl TextUnit {
    /// Create a turn without metadata.
    pub fn new(text: impl Into<String>, speaker: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker: speaker.into(),
            metadata: None,
        }
    }
}

impl fmt::Display for TextUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.speaker, self.text)
    }
}

/// Ordered speaker-attributed turns with an optional overall summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Turns in source order.
    pub text_units: Vec<TextUnit>,
    /// Conversation-level reference summary.
    pub summary: Option<String>,
    /// Conversation-level metadata.
    pub metadata: Metadata,
}

impl Conversation {
    /// Create a conversation from its parts.
    pub fn new(text_units: Vec<TextUnit>, summary: Option<String>, metadata: Metadata) -> Self {
        Self {
            text_units,
            summary,
            metadata,
        }
    }
}

impl fmt::Display for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.text_units.iter().map(TextUnit::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}

/// Uniform element of a resolver result list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ImportedItem {
    /// A single document.
    Document(Document),
    /// A multi-document group.
    MultiDocument(MultiDocument),
    /// A conversation.
    Conversation(Conversation),
}

impl ImportedItem {
    /// Shared metadata view over the three container shapes.
    pub fn metadata(&self) -> &Metadata {
        match self {
            Self::Document(doc) => &doc.metadata,
            Self::MultiDocument(group) => &group.metadata,
            Self::Conversation(conversation) => &conversation.metadata,
        }
    }

    /// Shared summary view over the three container shapes.
    pub fn summary(&self) -> Option<&str> {
        match self {
            Self::Document(doc) => doc.summary.as_deref(),
            Self::MultiDocument(group) => group.summary.as_deref(),
            Self::Conversation(conversation) => conversation.summary.as_deref(),
        }
    }

    /// Borrow the inner document, when this item is one.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Borrow the inner multi-document group, when this item is one.
    pub fn as_multi_document(&self) -> Option<&MultiDocument> {
        match self {
            Self::MultiDocument(group) => Some(group),
            _ => None,
        }
    }

    /// Borrow the inner conversation, when this item is one.
    pub fn as_conversation(&self) -> Option<&Conversation> {
        match self {
            Self::Conversation(conversation) => Some(conversation),
            _ => None,
        }
    }
}
