//! Type definitions for the Anthropic Messages API.
//!
//! The request side is what Claude Code sends to us; the response side is what
//! we hand back after the upstream call.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request types (what Claude Code sends TO us)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u64,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemContent {
    Text(String),
    Blocks(Vec<SystemBlock>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SystemBlock {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// One element of a block-list message.
///
/// Decoding is total: anything that is not one of the known tagged shapes is
/// kept verbatim in [`ContentBlock::Unrecognized`].
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
        signature: Option<String>,
    },
    Image {
        source: ImageSource,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        name: String,
        content: Option<ToolResultContent>,
        is_error: Option<bool>,
    },
    Unrecognized(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// A missing `type` decodes as empty, which no image conversion accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    #[serde(rename = "type", default)]
    pub source_type: String,
    #[serde(default = "default_media_type")]
    pub media_type: String,
    #[serde(default)]
    pub data: String,
}

impl Default for ImageSource {
    fn default() -> Self {
        Self {
            source_type: String::new(),
            media_type: default_media_type(),
            data: String::new(),
        }
    }
}

fn default_media_type() -> String {
    "image/png".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: serde_json::Value,
}

// Wire representation of a content block. Known tags decode into `Tagged`,
// everything else falls through to `Other`. Fields of known tags default when
// missing so a block never changes kind because a field is absent.

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BlockRepr {
    Tagged(TaggedBlock),
    Other(serde_json::Value),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum TaggedBlock {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "thinking")]
    Thinking {
        #[serde(default)]
        thinking: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
    #[serde(rename = "image")]
    Image {
        #[serde(default)]
        source: ImageSource,
    },
    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default = "empty_object")]
        input: serde_json::Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        #[serde(default)]
        tool_use_id: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<ToolResultContent>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl From<BlockRepr> for ContentBlock {
    fn from(repr: BlockRepr) -> Self {
        match repr {
            BlockRepr::Tagged(TaggedBlock::Text { text }) => ContentBlock::Text { text },
            BlockRepr::Tagged(TaggedBlock::Thinking {
                thinking,
                signature,
            }) => ContentBlock::Thinking {
                thinking,
                signature,
            },
            BlockRepr::Tagged(TaggedBlock::Image { source }) => ContentBlock::Image { source },
            BlockRepr::Tagged(TaggedBlock::ToolUse { id, name, input }) => {
                ContentBlock::ToolUse { id, name, input }
            }
            BlockRepr::Tagged(TaggedBlock::ToolResult {
                tool_use_id,
                name,
                content,
                is_error,
            }) => ContentBlock::ToolResult {
                tool_use_id,
                name,
                content,
                is_error,
            },
            BlockRepr::Other(value) => ContentBlock::Unrecognized(value),
        }
    }
}

impl From<ContentBlock> for BlockRepr {
    fn from(block: ContentBlock) -> Self {
        let tagged = match block {
            ContentBlock::Text { text } => TaggedBlock::Text { text },
            ContentBlock::Thinking {
                thinking,
                signature,
            } => TaggedBlock::Thinking {
                thinking,
                signature,
            },
            ContentBlock::Image { source } => TaggedBlock::Image { source },
            ContentBlock::ToolUse { id, name, input } => TaggedBlock::ToolUse { id, name, input },
            ContentBlock::ToolResult {
                tool_use_id,
                name,
                content,
                is_error,
            } => TaggedBlock::ToolResult {
                tool_use_id,
                name,
                content,
                is_error,
            },
            ContentBlock::Unrecognized(value) => return BlockRepr::Other(value),
        };
        BlockRepr::Tagged(tagged)
    }
}

impl Serialize for ContentBlock {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BlockRepr::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BlockRepr::deserialize(deserializer).map(ContentBlock::from)
    }
}

// ---------------------------------------------------------------------------
// Response types (what we send BACK to Claude Code)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub response_type: String, // "message"
    pub role: String,          // "assistant"
    pub content: Vec<ResponseContentBlock>,
    pub model: String,
    pub stop_reason: Option<String>,
    pub stop_sequence: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResponseContentBlock {
    #[serde(rename = "thinking")]
    Thinking { thinking: String },
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: impl Into<String>) -> Self {
        Self {
            error_type: "error".to_string(),
            error: ErrorBody {
                error_type: error_type.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new("invalid_request_error", msg)
    }

    pub fn api_error(msg: impl Into<String>) -> Self {
        Self::new("api_error", msg)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl SystemContent {
    /// Text segments in order, skipping non-text blocks.
    pub fn text_segments(&self) -> Vec<&str> {
        match self {
            SystemContent::Text(t) => vec![t.as_str()],
            SystemContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    SystemBlock::Text { text } => Some(text.as_str()),
                    SystemBlock::Other => None,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SystemContent::Text(t) => t.is_empty(),
            SystemContent::Blocks(blocks) => blocks.is_empty(),
        }
    }
}
