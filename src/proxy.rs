use crate::config::{OrphanPolicy, ProxyConfig};
use crate::endpoints::generate_url;
use crate::error::{ProxyError, Result};
use crate::logging::{LogEntry, LogLevel, SharedLogger};
use crate::translate::anthropic_types::{ErrorResponse, MessagesRequest, MessagesResponse};
use crate::translate::gemini_types::{CodeAssistResponse, GoogleErrorResponse};
use crate::translate::request::{claude_to_gemini, EnvelopeContext, Translation};
use crate::translate::response::{gemini_error_to_claude, gemini_to_claude};

/// Outcome of proxying a request
#[derive(Debug)]
pub enum ProxyResult {
    Success(MessagesResponse),
    Error(ErrorResponse, u16),
}

/// Translate a request with the configured project, session and model table,
/// then apply the orphan policy.
///
/// Dropped tool parts are recorded in the event log either way; with
/// [`OrphanPolicy::Reject`] they also fail the translation.
pub fn translate_for_upstream(
    req: &MessagesRequest,
    config: &ProxyConfig,
    logger: &SharedLogger,
) -> Result<Translation> {
    let ctx = EnvelopeContext::new(config.upstream.project.clone(), config.session_id());
    let translation = claude_to_gemini(req, &ctx, &config.model_mapper());

    logger.log(
        LogEntry::new(
            LogLevel::Info,
            "translate",
            format!(
                "model {} -> {} contents={}",
                req.model,
                translation.request.model,
                translation.request.request.contents.len()
            ),
        )
        .for_request(&ctx.request_id),
    );

    if !translation.dropped.is_empty() {
        let summary = translation
            .dropped
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        logger.log(
            LogEntry::new(
                LogLevel::Warn,
                "pairing",
                format!("Dropped {} tool part(s): {summary}", translation.dropped.len()),
            )
            .for_request(&ctx.request_id)
            .with_context(serde_json::json!({ "dropped": translation.dropped })),
        );

        if config.translation.orphan_policy == OrphanPolicy::Reject {
            return Err(ProxyError::OrphanedToolParts { summary });
        }
    }

    Ok(translation)
}

/// Forward an Anthropic request to Code Assist and translate the reply.
pub async fn proxy_generate(
    req: &MessagesRequest,
    config: &ProxyConfig,
    client: &reqwest::Client,
    logger: &SharedLogger,
) -> Result<ProxyResult> {
    let access_token = config.resolve_access_token()?;
    let url = generate_url(&config.effective_base_url()?);

    let translation = translate_for_upstream(req, config, logger)?;
    let upstream_req = translation.request;

    tracing::info!(url = %url, model = %upstream_req.model, request_id = %upstream_req.request_id, "Forwarding request");

    let response = client
        .post(&url)
        .bearer_auth(access_token)
        .header("Content-Type", "application/json")
        .header("User-Agent", &upstream_req.user_agent)
        .json(&upstream_req)
        .send()
        .await?;

    let status = response.status().as_u16();
    let body = response.text().await?;

    logger.debug(
        "proxy",
        format!("Response status={} body_len={}", status, body.len()),
    );

    if status >= 400 {
        if let Ok(err) = serde_json::from_str::<GoogleErrorResponse>(&body) {
            logger.log(
                LogEntry::new(
                    LogLevel::Warn,
                    "proxy",
                    format!("Upstream error: {}", err.error.message),
                )
                .for_request(&upstream_req.request_id),
            );
            return Ok(ProxyResult::Error(gemini_error_to_claude(&err), status));
        }

        let err = ErrorResponse::api_error(format!(
            "Upstream returned status {}: {}",
            status,
            truncate(&body, 500)
        ));
        return Ok(ProxyResult::Error(err, status));
    }

    let parsed: CodeAssistResponse = serde_json::from_str(&body).map_err(|e| {
        ProxyError::upstream(format!(
            "Failed to parse upstream response: {}. Body: {}",
            e,
            truncate(&body, 300)
        ))
    })?;

    let claude_resp = gemini_to_claude(&parsed.response, &req.model);

    logger.log(
        LogEntry::new(
            LogLevel::Info,
            "proxy",
            format!(
                "Completed: in={} out={} tokens",
                claude_resp.usage.input_tokens, claude_resp.usage.output_tokens
            ),
        )
        .for_request(&upstream_req.request_id),
    );

    Ok(ProxyResult::Success(claude_resp))
}

/// Cut `s` to at most `max` bytes without splitting a character.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
