//! Scripted collaborator doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use tracelens_core::{
    ErrorEvent, FetchError, GitProvider, ModelClient, ModelOutput, Result, TriageError,
};

/// What a scripted provider does for one path.
#[derive(Debug, Clone)]
pub enum FetchScript {
    /// Respond immediately with this file content.
    Ok(String),
    /// Sleep, then respond with this content.
    Slow(Duration, String),
    /// 404.
    NotFound,
    /// 401/403.
    Unauthorized,
}

/// Git provider double driven by per-path scripts. Unknown paths 404.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    scripts: Arc<Mutex<HashMap<String, FetchScript>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, path: &str, script: FetchScript) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(path.to_string(), script);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitProvider for ScriptedProvider {
    async fn fetch_file(&self, path: &str, _ref_name: &str) -> std::result::Result<String, FetchError> {
        self.calls.lock().unwrap().push(path.to_string());
        let script = self.scripts.lock().unwrap().get(path).cloned();
        match script {
            Some(FetchScript::Ok(content)) => Ok(content),
            Some(FetchScript::Slow(delay, content)) => {
                tokio::time::sleep(delay).await;
                Ok(content)
            }
            Some(FetchScript::Unauthorized) => Err(FetchError::Unauthorized {
                path: path.to_string(),
            }),
            Some(FetchScript::NotFound) | None => Err(FetchError::NotFound {
                path: path.to_string(),
            }),
        }
    }
}

/// Model double that records prompts and answers from a script.
#[derive(Clone)]
pub struct ScriptedModel {
    reply: String,
    fail: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: String::new(),
            fail: true,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<ModelOutput> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(TriageError::Model("scripted failure".to_string()));
        }
        Ok(ModelOutput {
            text: self.reply.clone(),
            model: "scripted-model".to_string(),
        })
    }
}

/// A server-error event with the given trace.
pub fn server_error(trace: Option<&str>) -> ErrorEvent {
    ErrorEvent {
        id: Uuid::new_v4(),
        timestamp: Utc::now(),
        project_key: "checkout-api".to_string(),
        method: "GET".to_string(),
        path: "/users/42".to_string(),
        message: "TypeError: Cannot read properties of undefined".to_string(),
        stack_trace: trace.map(str::to_string),
        status_code: Some(500),
    }
}

/// File content of `total` numbered lines.
pub fn numbered_file(total: u32) -> String {
    (1..=total)
        .map(|n| format!("line {n}"))
        .collect::<Vec<_>>()
        .join("\n")
}
