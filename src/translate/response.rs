use uuid::Uuid;

use super::anthropic_types::{ErrorResponse, MessagesResponse, ResponseContentBlock, Usage};
use super::gemini_types::{GenerateContentResponse, GoogleErrorResponse, Part};

/// Translate a Code Assist generateContent response into an Anthropic Messages response.
/// Pure function: original_model is what Claude Code originally requested.
pub fn gemini_to_claude(resp: &GenerateContentResponse, original_model: &str) -> MessagesResponse {
    let candidate = resp.candidates.first();

    let mut content: Vec<ResponseContentBlock> = Vec::new();

    let parts = candidate
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.as_slice())
        .unwrap_or_default();

    for part in parts {
        match part {
            Part::Thought { text } => content.push(ResponseContentBlock::Thinking {
                thinking: text.clone(),
            }),
            Part::Text { text } if !text.is_empty() => {
                content.push(ResponseContentBlock::Text { text: text.clone() });
            }
            Part::FunctionCall(call) => {
                let id = if call.id.is_empty() {
                    format!("toolu_{}", Uuid::new_v4().simple())
                } else {
                    call.id.clone()
                };
                content.push(ResponseContentBlock::ToolUse {
                    id,
                    name: call.name.clone(),
                    input: call.args.clone(),
                });
            }
            Part::Text { .. } | Part::InlineData(_) | Part::FunctionResponse(_) => {}
        }
    }

    let has_tool_use = content
        .iter()
        .any(|b| matches!(b, ResponseContentBlock::ToolUse { .. }));

    // Claude Code expects non-empty content
    if content.is_empty() {
        content.push(ResponseContentBlock::Text {
            text: String::new(),
        });
    }

    let stop_reason = if has_tool_use {
        "tool_use".to_string()
    } else {
        candidate
            .and_then(|c| c.finish_reason.as_deref())
            .map_or_else(|| "end_turn".to_string(), map_finish_reason)
    };

    let usage = resp.usage_metadata.as_ref().map_or_else(Usage::default, |u| Usage {
        input_tokens: u.prompt_token_count,
        output_tokens: u.candidates_token_count,
    });

    let id = resp.response_id.as_deref().map_or_else(
        || format!("msg_{}", Uuid::new_v4().simple()),
        |rid| format!("msg_{rid}"),
    );

    MessagesResponse {
        id,
        response_type: "message".to_string(),
        role: "assistant".to_string(),
        content,
        model: original_model.to_string(),
        stop_reason: Some(stop_reason),
        stop_sequence: None,
        usage,
    }
}

fn map_finish_reason(reason: &str) -> String {
    match reason {
        "MAX_TOKENS" => "max_tokens",
        _ => "end_turn",
    }
    .to_string()
}

/// Translate a Google API error body into an Anthropic error response.
pub fn gemini_error_to_claude(err: &GoogleErrorResponse) -> ErrorResponse {
    let message = match err.error.status.as_deref() {
        Some(status) => format!("{status}: {}", err.error.message),
        None => err.error.message.clone(),
    };
    ErrorResponse::api_error(message)
}
