//! Rebuild tool-call adjacency for Gemini.
//!
//! Claude Code batches several `tool_use` blocks into one assistant turn and
//! answers them with several `tool_result` blocks in the next user turn. Gemini
//! rejects that shape: every `functionCall` must sit alone in a model turn that
//! is immediately followed by a user turn holding its `functionResponse`.
//!
//! The rewrite is two passes over the owned entry list. The first indexes call
//! and response identifiers; the second emits entries in source order, fanning
//! each paired call out into its own call/response pair at the position of the
//! message that issued it. Calls and responses without a counterpart are
//! dropped and reported back to the caller.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::gemini_types::{Content, ContentRole, FunctionCall, FunctionResponse, Part};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolPartKind {
    Call,
    Response,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// No counterpart with the same identifier exists in the request.
    Unpaired,
    /// An earlier part already claimed this identifier.
    Duplicate,
}

/// A tool part removed during reorganization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedToolPart {
    pub id: String,
    pub kind: ToolPartKind,
    pub reason: DropReason,
}

impl fmt::Display for DroppedToolPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ToolPartKind::Call => "tool_use",
            ToolPartKind::Response => "tool_result",
        };
        let reason = match self.reason {
            DropReason::Unpaired => "unpaired",
            DropReason::Duplicate => "duplicate",
        };
        write!(f, "{reason} {kind} '{}'", self.id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reorganized {
    pub contents: Vec<Content>,
    pub dropped: Vec<DroppedToolPart>,
}

/// An entry split into the pieces the second pass needs.
struct SplitEntry {
    role: ContentRole,
    others: Vec<Part>,
    calls: Vec<FunctionCall>,
    had_tool_parts: bool,
}

/// Reorder `contents` so each paired function call is directly followed by its
/// response, dropping anything that cannot be paired.
pub fn reorganize_tool_pairs(contents: Vec<Content>) -> Reorganized {
    if !contents.iter().any(Content::has_tool_parts) {
        return Reorganized {
            contents,
            dropped: Vec::new(),
        };
    }

    let paired = paired_ids(&contents);
    tracing::debug!(pairs = paired.len(), "Reorganizing tool calls");

    let mut dropped = Vec::new();
    let mut responses: HashMap<String, FunctionResponse> = HashMap::new();
    let mut split = Vec::with_capacity(contents.len());

    for entry in contents {
        let mut others = Vec::new();
        let mut calls = Vec::new();
        let mut had_tool_parts = false;

        for part in entry.parts {
            match part {
                Part::FunctionCall(call) => {
                    had_tool_parts = true;
                    if paired.contains(call.id.as_str()) {
                        calls.push(call);
                    } else {
                        dropped.push(drop_event(call.id, ToolPartKind::Call, DropReason::Unpaired));
                    }
                }
                Part::FunctionResponse(resp) => {
                    had_tool_parts = true;
                    if !paired.contains(resp.id.as_str()) {
                        dropped.push(drop_event(resp.id, ToolPartKind::Response, DropReason::Unpaired));
                    } else if responses.contains_key(&resp.id) {
                        dropped.push(drop_event(resp.id, ToolPartKind::Response, DropReason::Duplicate));
                    } else {
                        responses.insert(resp.id.clone(), resp);
                    }
                }
                other => others.push(other),
            }
        }

        split.push(SplitEntry {
            role: entry.role,
            others,
            calls,
            had_tool_parts,
        });
    }

    let mut out = Vec::with_capacity(split.len() + responses.len() * 2);
    for entry in split {
        if !entry.had_tool_parts {
            out.push(Content::new(entry.role, entry.others));
            continue;
        }

        if !entry.others.is_empty() {
            out.push(Content::new(entry.role, entry.others));
        }

        for call in entry.calls {
            // Taking the response out means a repeated call id finds nothing.
            match responses.remove(&call.id) {
                Some(resp) => {
                    out.push(Content::new(
                        ContentRole::Model,
                        vec![Part::FunctionCall(call)],
                    ));
                    out.push(Content::new(
                        ContentRole::User,
                        vec![Part::FunctionResponse(resp)],
                    ));
                }
                None => {
                    dropped.push(drop_event(call.id, ToolPartKind::Call, DropReason::Duplicate));
                }
            }
        }
    }

    for event in &dropped {
        tracing::warn!(id = %event.id, kind = ?event.kind, reason = ?event.reason, "Dropping tool part");
    }
    tracing::debug!(entries = out.len(), "Reorganized contents");

    Reorganized {
        contents: out,
        dropped,
    }
}

/// Identifiers carried by at least one call and at least one response.
fn paired_ids(contents: &[Content]) -> HashSet<String> {
    let mut call_ids = HashSet::new();
    let mut response_ids = HashSet::new();

    for part in contents.iter().flat_map(|c| c.parts.iter()) {
        match part {
            Part::FunctionCall(call) if !call.id.is_empty() => {
                call_ids.insert(call.id.as_str());
            }
            Part::FunctionResponse(resp) if !resp.id.is_empty() => {
                response_ids.insert(resp.id.as_str());
            }
            _ => {}
        }
    }

    call_ids
        .intersection(&response_ids)
        .map(|id| (*id).to_string())
        .collect()
}

fn drop_event(id: String, kind: ToolPartKind, reason: DropReason) -> DroppedToolPart {
    DroppedToolPart { id, kind, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::gemini_types::FunctionOutput;
    use serde_json::json;

    fn call(id: &str) -> Part {
        Part::FunctionCall(FunctionCall {
            id: id.to_string(),
            name: format!("tool_{id}"),
            args: json!({}),
        })
    }

    fn response(id: &str) -> Part {
        Part::FunctionResponse(FunctionResponse {
            id: id.to_string(),
            name: String::new(),
            response: FunctionOutput {
                output: format!("result {id}"),
            },
        })
    }

    fn model(parts: Vec<Part>) -> Content {
        Content::new(ContentRole::Model, parts)
    }

    fn user(parts: Vec<Part>) -> Content {
        Content::new(ContentRole::User, parts)
    }

    #[test]
    fn test_no_tool_parts_is_identity() {
        let contents = vec![
            user(vec![Part::text("hi")]),
            model(vec![
                Part::Thought {
                    text: "t".to_string(),
                },
                Part::text("hello"),
            ]),
            user(vec![]),
        ];
        let result = reorganize_tool_pairs(contents.clone());
        assert_eq!(result.contents, contents);
        assert!(result.dropped.is_empty());
    }

    #[test]
    fn test_batched_calls_fan_out_into_pairs() {
        let result = reorganize_tool_pairs(vec![
            model(vec![call("a"), call("b")]),
            user(vec![response("a"), response("b")]),
        ]);

        assert_eq!(
            result.contents,
            vec![
                model(vec![call("a")]),
                user(vec![response("a")]),
                model(vec![call("b")]),
                user(vec![response("b")]),
            ]
        );
        assert!(result.dropped.is_empty());
    }

    #[test]
    fn test_leftover_parts_flush_before_pairs() {
        let result = reorganize_tool_pairs(vec![
            user(vec![Part::text("list files")]),
            model(vec![Part::text("Sure."), call("a")]),
            user(vec![response("a")]),
            model(vec![Part::text("Done.")]),
        ]);

        assert_eq!(
            result.contents,
            vec![
                user(vec![Part::text("list files")]),
                model(vec![Part::text("Sure.")]),
                model(vec![call("a")]),
                user(vec![response("a")]),
                model(vec![Part::text("Done.")]),
            ]
        );
    }

    #[test]
    fn test_text_alongside_responses_is_kept_in_place() {
        let result = reorganize_tool_pairs(vec![
            model(vec![call("a")]),
            user(vec![response("a"), Part::text("now continue")]),
        ]);

        assert_eq!(
            result.contents,
            vec![
                model(vec![call("a")]),
                user(vec![response("a")]),
                user(vec![Part::text("now continue")]),
            ]
        );
    }

    #[test]
    fn test_orphans_are_dropped_and_reported() {
        let result = reorganize_tool_pairs(vec![
            model(vec![call("a"), call("lonely")]),
            user(vec![response("a"), response("stray")]),
        ]);

        assert_eq!(
            result.contents,
            vec![model(vec![call("a")]), user(vec![response("a")])]
        );
        assert_eq!(
            result.dropped,
            vec![
                DroppedToolPart {
                    id: "lonely".to_string(),
                    kind: ToolPartKind::Call,
                    reason: DropReason::Unpaired,
                },
                DroppedToolPart {
                    id: "stray".to_string(),
                    kind: ToolPartKind::Response,
                    reason: DropReason::Unpaired,
                },
            ]
        );
    }

    #[test]
    fn test_orphans_stripped_even_without_any_pair() {
        let result = reorganize_tool_pairs(vec![
            user(vec![Part::text("go")]),
            model(vec![Part::text("calling"), call("x")]),
        ]);

        assert_eq!(
            result.contents,
            vec![
                user(vec![Part::text("go")]),
                model(vec![Part::text("calling")]),
            ]
        );
        assert_eq!(result.dropped.len(), 1);
    }

    #[test]
    fn test_empty_ids_never_pair() {
        let result = reorganize_tool_pairs(vec![model(vec![call("")]), user(vec![response("")])]);
        assert!(result.contents.is_empty());
        assert_eq!(result.dropped.len(), 2);
    }

    #[test]
    fn test_duplicate_ids_emitted_once() {
        let result = reorganize_tool_pairs(vec![
            model(vec![call("a")]),
            user(vec![response("a")]),
            model(vec![call("a")]),
            user(vec![response("a")]),
        ]);

        assert_eq!(
            result.contents,
            vec![model(vec![call("a")]), user(vec![response("a")])]
        );
        let reasons: Vec<_> = result.dropped.iter().map(|d| (d.kind, d.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (ToolPartKind::Response, DropReason::Duplicate),
                (ToolPartKind::Call, DropReason::Duplicate),
            ]
        );
    }

    #[test]
    fn test_pairs_follow_first_seen_call_order() {
        let result = reorganize_tool_pairs(vec![
            model(vec![call("b")]),
            model(vec![call("a")]),
            user(vec![response("a"), response("b")]),
        ]);

        let ids: Vec<_> = result
            .contents
            .iter()
            .map(|c| match &c.parts[0] {
                Part::FunctionCall(f) => format!("call {}", f.id),
                Part::FunctionResponse(r) => format!("resp {}", r.id),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(ids, vec!["call b", "resp b", "call a", "resp a"]);
    }

    #[test]
    fn test_every_call_entry_is_followed_by_its_response() {
        let result = reorganize_tool_pairs(vec![
            user(vec![Part::text("start")]),
            model(vec![Part::text("x"), call("1"), call("2"), call("3")]),
            user(vec![response("3"), response("1"), Part::text("y"), response("2")]),
            model(vec![call("4")]),
            user(vec![response("4")]),
        ]);

        let mut seen = HashSet::new();
        let contents = &result.contents;
        for (i, entry) in contents.iter().enumerate() {
            let tool_parts = entry.parts.iter().filter(|p| p.is_tool()).count();
            assert!(tool_parts <= 1);
            if let Some(Part::FunctionCall(c)) = entry.parts.first() {
                assert_eq!(entry.role, ContentRole::Model);
                assert_eq!(entry.parts.len(), 1);
                assert!(seen.insert(c.id.clone()));
                let next = &contents[i + 1];
                assert_eq!(next.role, ContentRole::User);
                assert_eq!(next.parts, vec![response(&c.id)]);
            }
        }
        assert_eq!(seen.len(), 4);
        assert!(result.dropped.is_empty());
    }
}
