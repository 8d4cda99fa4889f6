use async_trait::async_trait;
use attend_core::model::{AdvisorSettings, AttendanceRecord, Tip, should_provide_tip};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TipAdvisor;
use super::prompt::{DEFAULT_SYSTEM_PROMPT, render_tip_prompt};
use crate::error::TipError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Clone, Debug)]
struct ChatConfig {
    base_url: String,
    api_key: String,
    model: String,
    system_prompt: String,
}

impl ChatConfig {
    fn from_settings(settings: &AdvisorSettings) -> Option<Self> {
        let api_key = settings.api_key()?.to_string();
        Some(Self {
            base_url: settings.base_url().unwrap_or(DEFAULT_BASE_URL).to_string(),
            api_key,
            model: settings.model().unwrap_or(DEFAULT_MODEL).to_string(),
            system_prompt: settings
                .system_prompt()
                .unwrap_or(DEFAULT_SYSTEM_PROMPT)
                .to_string(),
        })
    }
}

/// Tip advisor backed by an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatTipAdvisor {
    client: Client,
    config: Option<ChatConfig>,
}

impl ChatTipAdvisor {
    #[must_use]
    pub fn new(settings: &AdvisorSettings) -> Self {
        Self {
            client: Client::new(),
            config: ChatConfig::from_settings(settings),
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn request_tip(&self, config: &ChatConfig, prompt: String) -> Result<String, TipError> {
        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: config.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.7,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TipError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .ok_or(TipError::EmptyResponse)?
            .message
            .content
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl TipAdvisor for ChatTipAdvisor {
    async fn generate_tips(&self, records: &[AttendanceRecord]) -> Result<Vec<Tip>, TipError> {
        let behind: Vec<_> = records.iter().filter(|r| should_provide_tip(r)).collect();
        if behind.is_empty() {
            return Ok(Vec::new());
        }
        let config = self.config.as_ref().ok_or(TipError::Disabled)?;

        let mut tips = Vec::new();
        for record in behind {
            debug!(subject = %record.subject, model = %config.model, "requesting tip");
            let tip = self.request_tip(config, render_tip_prompt(record)).await?;
            if tip.is_empty() {
                debug!(subject = %record.subject, "backend returned an empty tip");
                continue;
            }
            tips.push(Tip {
                subject: record.subject.clone(),
                tip,
            });
        }
        Ok(tips)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use attend_core::model::AdvisorSettingsDraft;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned reply per connection, in order, then stops accepting.
    async fn serve(replies: Vec<(u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for (status, body) in replies {
                let (mut socket, _) = listener.accept().await.unwrap();
                read_request(&mut socket).await;
                let reply = format!(
                    "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });
        format!("http://{addr}/v1")
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0_u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            let Some(head_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + length {
                return;
            }
        }
    }

    fn advisor_at(base_url: String) -> ChatTipAdvisor {
        let settings = AdvisorSettingsDraft {
            api_key: Some("sk-test".into()),
            base_url: Some(base_url),
            ..AdvisorSettingsDraft::new()
        }
        .validate()
        .unwrap();
        ChatTipAdvisor {
            client: Client::builder().no_proxy().build().unwrap(),
            config: ChatConfig::from_settings(&settings),
        }
    }

    fn named(subject: &str, attended: u32, total: u32, target_attendance: u8) -> AttendanceRecord {
        AttendanceRecord {
            subject: subject.into(),
            attended,
            total,
            target_attendance,
        }
    }

    const TIP_REPLY: &str =
        r#"{"choices":[{"message":{"role":"assistant","content":"  Sit near the front.\n"}}]}"#;

    fn record(attended: u32, total: u32, target_attendance: u8) -> AttendanceRecord {
        AttendanceRecord {
            subject: "Quantum Physics".into(),
            attended,
            total,
            target_attendance,
        }
    }

    fn enabled_settings() -> AdvisorSettings {
        AdvisorSettingsDraft {
            api_key: Some("sk-test".into()),
            // Nothing listens on the discard port.
            base_url: Some("http://127.0.0.1:9".into()),
            ..AdvisorSettingsDraft::new()
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn disabled_without_api_key() {
        let advisor = ChatTipAdvisor::new(&AdvisorSettings::default());
        assert!(!advisor.enabled());
        let err = advisor.generate_tips(&[record(1, 10, 90)]).await.unwrap_err();
        assert!(matches!(err, TipError::Disabled));
    }

    #[tokio::test]
    async fn disabled_advisor_with_nothing_behind_returns_no_tips() {
        let advisor = ChatTipAdvisor::new(&AdvisorSettings::default());
        let tips = advisor
            .generate_tips(&[record(18, 20, 90), record(0, 0, 90)])
            .await
            .unwrap();
        assert!(tips.is_empty());
    }

    #[tokio::test]
    async fn successful_reply_becomes_trimmed_tip_for_behind_subject() {
        let advisor = advisor_at(serve(vec![(200, TIP_REPLY)]).await);
        let tips = advisor
            .generate_tips(&[named("Quantum Physics", 18, 20, 90), named("World History", 30, 35, 90)])
            .await
            .unwrap();
        assert_eq!(
            tips,
            vec![Tip {
                subject: "World History".into(),
                tip: "Sit near the front.".into(),
            }]
        );
    }

    #[tokio::test]
    async fn empty_or_null_replies_are_left_out() {
        let base_url = serve(vec![
            (200, r#"{"choices":[{"message":{"content":"   "}}]}"#),
            (200, r#"{"choices":[{"message":{"content":null}}]}"#),
            (200, TIP_REPLY),
        ])
        .await;
        let tips = advisor_at(base_url)
            .generate_tips(&[
                named("Organic Chemistry", 1, 10, 85),
                named("Advanced Calculus", 2, 10, 80),
                named("World History", 30, 35, 90),
            ])
            .await
            .unwrap();
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].subject, "World History");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let base_url = serve(vec![(500, r#"{"error":"boom"}"#)]).await;
        let err = advisor_at(base_url)
            .generate_tips(&[record(1, 10, 90)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TipError::HttpStatus(status) if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn reply_without_choices_is_empty_response() {
        let base_url = serve(vec![(200, r#"{"choices":[]}"#)]).await;
        let err = advisor_at(base_url)
            .generate_tips(&[record(1, 10, 90)])
            .await
            .unwrap_err();
        assert!(matches!(err, TipError::EmptyResponse));
    }

    #[tokio::test]
    async fn records_on_track_skip_the_backend() {
        let advisor = ChatTipAdvisor::new(&enabled_settings());
        assert!(advisor.enabled());
        let tips = advisor
            .generate_tips(&[record(18, 20, 90), record(0, 0, 90)])
            .await
            .unwrap();
        assert!(tips.is_empty());
    }

    #[tokio::test]
    async fn unreachable_backend_surfaces_http_error() {
        let advisor = ChatTipAdvisor::new(&enabled_settings());
        let err = advisor.generate_tips(&[record(1, 10, 90)]).await.unwrap_err();
        assert!(matches!(err, TipError::Http(_) | TipError::HttpStatus(_)));
    }

    #[test]
    fn request_carries_system_then_user_message() {
        let payload = ChatRequest {
            model: DEFAULT_MODEL.into(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "be brief".into(),
                },
                ChatMessage {
                    role: "user",
                    content: "tip please".into(),
                },
            ],
            temperature: 0.7,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "tip please");
    }

    #[test]
    fn response_with_null_content_parses() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert!(body.choices[0].message.content.is_none());
    }

    #[test]
    fn config_falls_back_to_defaults() {
        let config = ChatConfig::from_settings(
            &AdvisorSettingsDraft {
                api_key: Some("sk-test".into()),
                ..AdvisorSettingsDraft::new()
            }
            .validate()
            .unwrap(),
        )
        .unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }
}
