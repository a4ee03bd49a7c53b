//! Convert a single Anthropic message into one Gemini content entry.
//!
//! Gemini expects reasoning before visible output before actions, so parts are
//! bucketed by kind and emitted as thought, then text/image, then tool parts,
//! whatever order the source blocks arrived in.

use super::anthropic_types::{ContentBlock, ImageSource, Message, MessageContent, Role, ToolResultContent};
use super::gemini_types::{
    Content, ContentRole, FunctionCall, FunctionOutput, FunctionResponse, InlineData, Part,
};

#[derive(Default)]
struct PartBuckets {
    thoughts: Vec<Part>,
    visible: Vec<Part>,
    tools: Vec<Part>,
}

impl PartBuckets {
    fn push(&mut self, part: Part) {
        match part {
            Part::Thought { .. } => self.thoughts.push(part),
            Part::Text { .. } | Part::InlineData(_) => self.visible.push(part),
            Part::FunctionCall(_) | Part::FunctionResponse(_) => self.tools.push(part),
        }
    }

    fn into_parts(self) -> Vec<Part> {
        let mut parts = self.thoughts;
        parts.extend(self.visible);
        parts.extend(self.tools);
        parts
    }
}

/// Translate one message into a role-tagged entry with ordered parts.
pub fn classify_message(msg: &Message) -> Content {
    let parts = match &msg.content {
        MessageContent::Text(text) => vec![Part::text(text.clone())],
        MessageContent::Blocks(blocks) => {
            let mut buckets = PartBuckets::default();
            for part in blocks.iter().filter_map(block_to_part) {
                buckets.push(part);
            }
            buckets.into_parts()
        }
    };

    Content::new(map_role(msg.role), parts)
}

pub fn map_role(role: Role) -> ContentRole {
    match role {
        Role::User => ContentRole::User,
        Role::Assistant => ContentRole::Model,
    }
}

/// `None` means the block has no Gemini representation and is skipped.
fn block_to_part(block: &ContentBlock) -> Option<Part> {
    match block {
        ContentBlock::Thinking { thinking, .. } => Some(Part::Thought {
            text: thinking.clone(),
        }),
        ContentBlock::Text { text } => Some(Part::text(text.clone())),
        ContentBlock::Image { source } => image_to_part(source),
        ContentBlock::ToolUse { id, name, input } => Some(Part::FunctionCall(FunctionCall {
            id: id.clone(),
            name: name.clone(),
            args: input.clone(),
        })),
        ContentBlock::ToolResult {
            tool_use_id,
            name,
            content,
            ..
        } => Some(Part::FunctionResponse(FunctionResponse {
            id: tool_use_id.clone(),
            name: name.clone(),
            response: FunctionOutput {
                output: tool_result_text(content.as_ref()),
            },
        })),
        ContentBlock::Unrecognized(value) => Some(Part::text(unrecognized_text(value))),
    }
}

fn image_to_part(source: &ImageSource) -> Option<Part> {
    if source.source_type != "base64" {
        tracing::debug!(source_type = %source.source_type, "Skipping non-base64 image");
        return None;
    }
    Some(Part::InlineData(InlineData {
        mime_type: source.media_type.clone(),
        data: source.data.clone(),
    }))
}

/// Only the first element of a block list is consulted.
fn tool_result_text(content: Option<&ToolResultContent>) -> String {
    match content {
        Some(ToolResultContent::Text(text)) => text.clone(),
        Some(ToolResultContent::Blocks(blocks)) => match blocks.first() {
            Some(ContentBlock::Text { text }) => text.clone(),
            _ => String::new(),
        },
        None => String::new(),
    }
}

fn unrecognized_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
