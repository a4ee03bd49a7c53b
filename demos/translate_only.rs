//! Translate a Claude request into a Code Assist envelope without sending it.
//!
//! ```sh
//! cargo run --example translate_only
//! ```

use claude_gemini_proxy::translate::anthropic_types::MessagesRequest;
use claude_gemini_proxy::translate::request::{claude_to_gemini, EnvelopeContext};
use claude_gemini_proxy::ModelMapper;
use std::collections::HashMap;

fn main() -> anyhow::Result<()> {
    let req: MessagesRequest = serde_json::from_value(serde_json::json!({
        "model": "claude-3-5-sonnet-20241022",
        "max_tokens": 1024,
        "system": "You are a careful coding assistant.",
        "messages": [
            {"role": "user", "content": "List the repo and show me the README."},
            {"role": "assistant", "content": [
                {"type": "text", "text": "Looking now."},
                {"type": "tool_use", "id": "toolu_1", "name": "ls", "input": {"path": "."}},
                {"type": "tool_use", "id": "toolu_2", "name": "cat", "input": {"path": "README.md"}}
            ]},
            {"role": "user", "content": [
                {"type": "tool_result", "tool_use_id": "toolu_1", "content": "Cargo.toml src"},
                {"type": "tool_result", "tool_use_id": "toolu_2", "content": "# Hello"},
                {"type": "tool_result", "tool_use_id": "toolu_stale", "content": "left over"}
            ]}
        ],
        "tools": [{
            "name": "ls",
            "description": "List a directory",
            "input_schema": {
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "properties": {"path": {"type": "string", "minLength": 1}}
            }
        }]
    }))?;

    let mut overrides = HashMap::new();
    overrides.insert("claude-opus-4-1".to_string(), "claude-opus-4-5-thinking".to_string());

    let ctx = EnvelopeContext::new("my-project", "demo-session");
    let translation = claude_to_gemini(&req, &ctx, &ModelMapper::new(overrides));

    println!("{}", serde_json::to_string_pretty(&translation.request)?);
    for dropped in &translation.dropped {
        eprintln!("dropped: {dropped}");
    }
    Ok(())
}
