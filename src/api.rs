// ABOUTME: Blocking HTTP client for the Leanote v1 API
// ABOUTME: Handles login token, throttling, and fail-fast errors

use crate::model::{ApiFailure, LoginResponse, Note, NoteSummary, Notebook};
use crate::{Error, Result};
use rand::Rng;
use reqwest::blocking::{Client, Response};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://leanote.com/api";

fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.len() <= max_chars {
        return s.to_string();
    }

    // Find a valid UTF-8 boundary at or before max_chars
    let mut boundary = max_chars;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    if boundary == 0 {
        return String::new();
    }

    format!("{}...", &s[..boundary])
}

/// Account details returned by a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    throttle_min: u64,
    throttle_max: u64,
}

impl ApiClient {
    pub fn new(base_url: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(ApiClient {
            client,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_API_BASE.into())
                .trim_end_matches('/')
                .to_string(),
            token: None,
            throttle_min: 100,
            throttle_max: 300,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_throttle(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.throttle_min = min_ms;
        self.throttle_max = max_ms;
        self
    }

    pub fn disable_throttle(mut self) -> Self {
        self.throttle_min = 0;
        self.throttle_max = 0;
        self
    }

    fn throttle(&self) {
        if self.throttle_max > 0 {
            let sleep_ms = rand::thread_rng().gen_range(self.throttle_min..=self.throttle_max);
            std::thread::sleep(Duration::from_millis(sleep_ms));
        }
    }

    fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| Error::Auth("Not logged in".into()))
    }

    fn send(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("Accept", "application/json")
            .header("User-Agent", "hexport/0.1 (Rust)")
            .send()?;

        self.throttle();

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            let preview = truncate_str(&message, 100);
            return Err(Error::Api {
                endpoint: endpoint.into(),
                status: status.as_u16(),
                message: preview,
            });
        }

        Ok(response)
    }

    fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let body = self.send(endpoint, query)?.text()?;

        // Leanote reports rejected calls as `{"Ok": false, "Msg": ...}` with a 200
        if let Ok(failure) = serde_json::from_str::<ApiFailure>(&body) {
            if !failure.ok {
                return Err(Error::Api {
                    endpoint: endpoint.into(),
                    status: 200,
                    message: failure.msg.unwrap_or_else(|| "request rejected".into()),
                });
            }
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!("Failed to parse response from {}: {}", endpoint, e);
            log::debug!("Response body (first 500 chars): {}", truncate_str(&body, 500));
            Error::Parse(e)
        })
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<Session> {
        let body = self
            .send("/auth/login", &[("email", email), ("pwd", password)])?
            .text()?;
        let resp: LoginResponse = serde_json::from_str(&body)?;

        let token = match (resp.ok, resp.token) {
            (true, Some(token)) if !token.is_empty() => token,
            _ => {
                return Err(Error::Auth(
                    resp.msg.unwrap_or_else(|| "Login rejected".into()),
                ))
            }
        };
        self.token = Some(token);

        Ok(Session {
            user_id: resp.user_id,
            email: resp.email,
            username: resp.username,
        })
    }

    pub fn list_notebooks(&self) -> Result<Vec<Notebook>> {
        self.get("/notebook/getNotebooks", &[("token", self.token()?)])
    }

    pub fn list_notes(&self, notebook_id: &str) -> Result<Vec<NoteSummary>> {
        self.get(
            "/note/getNotes",
            &[("token", self.token()?), ("notebookId", notebook_id)],
        )
    }

    pub fn get_note(&self, note_id: &str) -> Result<Note> {
        self.get(
            "/note/getNoteAndContent",
            &[("token", self.token()?), ("noteId", note_id)],
        )
    }

    pub fn get_image(&self, file_id: &str) -> Result<Vec<u8>> {
        let response = self.send(
            "/file/getImage",
            &[("token", self.token()?), ("fileId", file_id)],
        )?;
        Ok(response.bytes()?.to_vec())
    }
}
