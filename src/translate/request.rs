//! Translate Anthropic Messages API requests into Gemini Code Assist requests.
//!
//! Each message becomes one content entry (see [`super::content`]), the entry
//! list is then rewritten for strict tool-call adjacency (see
//! [`super::pairing`]), tool schemas are reduced (see [`super::schema`]) and
//! everything is wrapped in the Code Assist envelope with fixed sampling
//! defaults.

use uuid::Uuid;

use super::anthropic_types::{MessagesRequest, Tool};
use super::content::classify_message;
use super::gemini_types::{
    CodeAssistRequest, Content, ContentRole, FunctionCallingConfig, FunctionCallingMode,
    FunctionDeclaration, GenerateContentRequest, GenerationConfig, Part, ThinkingConfig,
    ToolConfig, ToolDeclarations,
};
use super::pairing::{reorganize_tool_pairs, DroppedToolPart};
use super::schema::sanitize_schema;
use crate::models::ModelMapper;

pub const DEFAULT_TEMPERATURE: f64 = 0.4;
pub const TOP_P: f64 = 1.0;
pub const TOP_K: u32 = 40;
pub const CANDIDATE_COUNT: u32 = 1;
pub const THINKING_BUDGET: u32 = 1024;
pub const STOP_SEQUENCES: &[&str] = &[
    "<|user|>",
    "<|bot|>",
    "<|context_request|>",
    "<|endoftext|>",
    "<|end_of_turn|>",
];

pub const USER_AGENT: &str = "antigravity";
pub const REQUEST_TYPE: &str = "agent";
pub const DEFAULT_SESSION_ID: &str = "-3750763034362895578";

/// Per-request envelope values supplied by the caller.
#[derive(Debug, Clone)]
pub struct EnvelopeContext {
    pub project: String,
    pub request_id: String,
    pub session_id: String,
}

impl EnvelopeContext {
    /// Context with a freshly generated request id.
    pub fn new(project: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            request_id: new_request_id(),
            session_id: session_id.into(),
        }
    }
}

/// Result of a translation: the request to send plus every tool part that had
/// to be dropped to satisfy Gemini's pairing rules.
#[derive(Debug, Clone)]
pub struct Translation {
    pub request: CodeAssistRequest,
    pub dropped: Vec<DroppedToolPart>,
}

pub fn new_request_id() -> String {
    format!("agent-{}", Uuid::new_v4())
}

/// Translate an Anthropic Messages API request into a Code Assist request.
/// Pure function: all per-request randomness comes in through `ctx`.
pub fn claude_to_gemini(
    req: &MessagesRequest,
    ctx: &EnvelopeContext,
    models: &ModelMapper,
) -> Translation {
    let entries: Vec<Content> = req.messages.iter().map(classify_message).collect();
    let reorganized = reorganize_tool_pairs(entries);

    let system_instruction = req
        .system
        .as_ref()
        .filter(|s| !s.is_empty())
        .map(|system| {
            Content::new(
                ContentRole::User,
                system.text_segments().into_iter().map(Part::text).collect(),
            )
        });

    let tools = req
        .tools
        .as_ref()
        .filter(|tools| !tools.is_empty())
        .map(|tools| tools.iter().map(translate_tool).collect::<Vec<_>>());

    let tool_config = tools.as_ref().map(|_| ToolConfig {
        function_calling_config: FunctionCallingConfig {
            mode: FunctionCallingMode::Validated,
        },
    });

    let generation_config = GenerationConfig {
        temperature: req.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        top_p: TOP_P,
        top_k: TOP_K,
        candidate_count: CANDIDATE_COUNT,
        max_output_tokens: req.max_tokens,
        stop_sequences: STOP_SEQUENCES.iter().map(|s| (*s).to_string()).collect(),
        thinking_config: ThinkingConfig {
            include_thoughts: false,
            thinking_budget: THINKING_BUDGET,
        },
    };

    let request = CodeAssistRequest {
        project: ctx.project.clone(),
        request_id: ctx.request_id.clone(),
        request: GenerateContentRequest {
            contents: reorganized.contents,
            system_instruction,
            tools,
            tool_config,
            generation_config,
            session_id: ctx.session_id.clone(),
        },
        model: models.resolve(&req.model),
        user_agent: USER_AGENT.to_string(),
        request_type: REQUEST_TYPE.to_string(),
    };

    Translation {
        request,
        dropped: reorganized.dropped,
    }
}

/// One declaration group per tool.
fn translate_tool(tool: &Tool) -> ToolDeclarations {
    ToolDeclarations {
        function_declarations: vec![FunctionDeclaration {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: sanitize_schema(&tool.input_schema),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::gemini_types::{FunctionCall, FunctionOutput, FunctionResponse};
    use crate::translate::pairing::ToolPartKind;
    use serde_json::json;

    fn ctx() -> EnvelopeContext {
        EnvelopeContext {
            project: "proj-1".to_string(),
            request_id: "agent-fixed".to_string(),
            session_id: DEFAULT_SESSION_ID.to_string(),
        }
    }

    fn request(body: serde_json::Value) -> MessagesRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_simple_text_request() {
        let req = request(json!({
            "model": "claude-3-5-sonnet-20241022",
            "max_tokens": 1024,
            "system": "You are helpful",
            "messages": [{"role": "user", "content": "Hello"}]
        }));

        let result = claude_to_gemini(&req, &ctx(), &ModelMapper::default());
        let out = result.request;

        assert_eq!(out.model, "claude-sonnet-4-5");
        assert_eq!(out.project, "proj-1");
        assert_eq!(out.request_id, "agent-fixed");
        assert_eq!(out.request.contents.len(), 1);
        assert_eq!(out.request.contents[0].role, ContentRole::User);

        let system = out.request.system_instruction.unwrap();
        assert_eq!(system.role, ContentRole::User);
        assert_eq!(system.parts, vec![Part::text("You are helpful")]);

        assert!(out.request.tools.is_none());
        assert!(out.request.tool_config.is_none());
        assert!(result.dropped.is_empty());
    }

    #[test]
    fn test_generation_defaults() {
        let req = request(json!({
            "model": "gemini-2.5-pro",
            "max_tokens": 77,
            "messages": [{"role": "user", "content": "hi"}]
        }));

        let out = claude_to_gemini(&req, &ctx(), &ModelMapper::default()).request;
        let value = serde_json::to_value(&out).unwrap();

        assert_eq!(value["model"], "gemini-2.5-pro");
        assert_eq!(value["userAgent"], "antigravity");
        assert_eq!(value["requestType"], "agent");
        assert_eq!(value["request"]["sessionId"], DEFAULT_SESSION_ID);

        let gen = &value["request"]["generationConfig"];
        assert_eq!(gen["temperature"], 0.4);
        assert_eq!(gen["topP"], 1.0);
        assert_eq!(gen["topK"], 40);
        assert_eq!(gen["candidateCount"], 1);
        assert_eq!(gen["maxOutputTokens"], 77);
        assert_eq!(gen["stopSequences"].as_array().unwrap().len(), 5);
        assert_eq!(
            gen["thinkingConfig"],
            json!({"includeThoughts": false, "thinkingBudget": 1024})
        );
        assert!(value["request"].get("systemInstruction").is_none());
    }

    #[test]
    fn test_explicit_temperature_wins() {
        let req = request(json!({
            "model": "x",
            "max_tokens": 10,
            "temperature": 0.0,
            "messages": [{"role": "user", "content": "hi"}]
        }));
        let out = claude_to_gemini(&req, &ctx(), &ModelMapper::default()).request;
        assert_eq!(out.request.generation_config.temperature, 0.0);
    }

    #[test]
    fn test_system_blocks_flatten_to_parts() {
        let req = request(json!({
            "model": "x",
            "max_tokens": 10,
            "system": [
                {"type": "text", "text": "part one"},
                {"type": "text", "text": "part two", "cache_control": {"type": "ephemeral"}}
            ],
            "messages": [{"role": "user", "content": "hi"}]
        }));
        let out = claude_to_gemini(&req, &ctx(), &ModelMapper::default()).request;
        let system = out.request.system_instruction.unwrap();
        assert_eq!(
            system.parts,
            vec![Part::text("part one"), Part::text("part two")]
        );
    }

    #[test]
    fn test_empty_system_is_omitted() {
        let req = request(json!({
            "model": "x",
            "max_tokens": 10,
            "system": "",
            "messages": [{"role": "user", "content": "hi"}]
        }));
        let out = claude_to_gemini(&req, &ctx(), &ModelMapper::default()).request;
        assert!(out.request.system_instruction.is_none());
    }

    #[test]
    fn test_tools_are_sanitized_and_validated() {
        let req = request(json!({
            "model": "x",
            "max_tokens": 10,
            "messages": [{"role": "user", "content": "hi"}],
            "tools": [
                {
                    "name": "read_file",
                    "description": "Read a file",
                    "input_schema": {
                        "$schema": "http://json-schema.org/draft-07/schema#",
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {"path": {"type": "string", "minLength": 1}}
                    }
                },
                {"name": "noop", "input_schema": {"type": "object"}}
            ]
        }));

        let out = claude_to_gemini(&req, &ctx(), &ModelMapper::default()).request;
        let value = serde_json::to_value(&out).unwrap();

        let tools = value["request"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(
            tools[0],
            json!({"functionDeclarations": [{
                "name": "read_file",
                "description": "Read a file",
                "parameters": {
                    "type": "object",
                    "properties": {"path": {"type": "string", "description": "Validation: minLength: 1"}}
                }
            }]})
        );
        assert_eq!(tools[1]["functionDeclarations"][0]["description"], json!(null));
        assert_eq!(
            value["request"]["toolConfig"],
            json!({"functionCallingConfig": {"mode": "VALIDATED"}})
        );
    }

    #[test]
    fn test_empty_tool_list_is_omitted() {
        let req = request(json!({
            "model": "x",
            "max_tokens": 10,
            "messages": [{"role": "user", "content": "hi"}],
            "tools": []
        }));
        let out = claude_to_gemini(&req, &ctx(), &ModelMapper::default()).request;
        assert!(out.request.tools.is_none());
        assert!(out.request.tool_config.is_none());
    }

    #[test]
    fn test_two_calls_two_results_become_four_entries() {
        let req = request(json!({
            "model": "x",
            "max_tokens": 10,
            "messages": [
                {"role": "assistant", "content": [
                    {"type": "tool_use", "id": "a", "name": "ls", "input": {"dir": "."}},
                    {"type": "tool_use", "id": "b", "name": "pwd", "input": {}}
                ]},
                {"role": "user", "content": [
                    {"type": "tool_result", "tool_use_id": "a", "content": "src"},
                    {"type": "tool_result", "tool_use_id": "b", "content": [{"type": "text", "text": "/root"}]}
                ]}
            ]
        }));

        let result = claude_to_gemini(&req, &ctx(), &ModelMapper::default());
        let contents = result.request.request.contents;

        let call = |id: &str, name: &str, args| {
            Part::FunctionCall(FunctionCall {
                id: id.to_string(),
                name: name.to_string(),
                args,
            })
        };
        let resp = |id: &str, output: &str| {
            Part::FunctionResponse(FunctionResponse {
                id: id.to_string(),
                name: String::new(),
                response: FunctionOutput {
                    output: output.to_string(),
                },
            })
        };

        assert_eq!(
            contents,
            vec![
                Content::new(ContentRole::Model, vec![call("a", "ls", json!({"dir": "."}))]),
                Content::new(ContentRole::User, vec![resp("a", "src")]),
                Content::new(ContentRole::Model, vec![call("b", "pwd", json!({}))]),
                Content::new(ContentRole::User, vec![resp("b", "/root")]),
            ]
        );
        assert!(result.dropped.is_empty());
    }

    #[test]
    fn test_text_and_tool_use_split() {
        let req = request(json!({
            "model": "x",
            "max_tokens": 10,
            "messages": [
                {"role": "assistant", "content": [
                    {"type": "text", "text": "Let me check."},
                    {"type": "tool_use", "id": "t", "name": "ls", "input": {}}
                ]},
                {"role": "user", "content": [
                    {"type": "tool_result", "tool_use_id": "t", "content": "ok"}
                ]}
            ]
        }));

        let contents = claude_to_gemini(&req, &ctx(), &ModelMapper::default())
            .request
            .request
            .contents;

        assert_eq!(contents.len(), 3);
        assert_eq!(
            contents[0],
            Content::new(ContentRole::Model, vec![Part::text("Let me check.")])
        );
        assert!(matches!(&contents[1].parts[..], [Part::FunctionCall(c)] if c.id == "t"));
        assert_eq!(contents[1].role, ContentRole::Model);
        assert!(matches!(&contents[2].parts[..], [Part::FunctionResponse(r)] if r.id == "t"));
        assert_eq!(contents[2].role, ContentRole::User);
    }

    #[test]
    fn test_orphan_call_reported() {
        let req = request(json!({
            "model": "x",
            "max_tokens": 10,
            "messages": [
                {"role": "user", "content": "go"},
                {"role": "assistant", "content": [
                    {"type": "tool_use", "id": "never_answered", "name": "ls", "input": {}}
                ]}
            ]
        }));

        let result = claude_to_gemini(&req, &ctx(), &ModelMapper::default());
        assert_eq!(result.request.request.contents.len(), 1);
        assert_eq!(result.dropped.len(), 1);
        assert_eq!(result.dropped[0].id, "never_answered");
    }

    #[test]
    fn test_tool_blocks_without_ids_are_dropped() {
        let req = request(json!({
            "model": "x",
            "max_tokens": 10,
            "messages": [
                {"role": "user", "content": "go"},
                {"role": "assistant", "content": [
                    {"type": "tool_use", "name": "ls", "input": {}}
                ]},
                {"role": "user", "content": [
                    {"type": "tool_result", "content": "secret output"}
                ]}
            ]
        }));

        let result = claude_to_gemini(&req, &ctx(), &ModelMapper::default());
        let contents = &result.request.request.contents;
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].parts, vec![Part::text("go")]);

        let kinds: Vec<_> = result.dropped.iter().map(|d| (d.id.as_str(), d.kind)).collect();
        assert_eq!(
            kinds,
            vec![("", ToolPartKind::Call), ("", ToolPartKind::Response)]
        );
        let wire = serde_json::to_string(&result.request).unwrap();
        assert!(!wire.contains("secret output"));
    }

    #[test]
    fn test_generated_request_ids_are_unique() {
        let a = EnvelopeContext::new("p", DEFAULT_SESSION_ID);
        let b = EnvelopeContext::new("p", DEFAULT_SESSION_ID);
        assert!(a.request_id.starts_with("agent-"));
        assert_ne!(a.request_id, b.request_id);
    }
}
