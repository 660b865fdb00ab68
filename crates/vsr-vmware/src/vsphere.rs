//! vSphere VI/JSON HTTP client with session-based authentication.
//!
//! Communicates with vCenter / ESXi via `https://{host}:{port}/sdk/vim25/{release}/...`.
//! Methods are invoked as `POST /{moType}/{moId}/{Method}` with a JSON body;
//! the session travels in the `vmware-api-session-id` header.

use crate::error::{VmwareError, VmwareResult};
use crate::property::VimApi;
use crate::types::*;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

const SESSION_HEADER: &str = "vmware-api-session-id";

/// vSphere VI/JSON API client.
pub struct VsphereClient {
    client: Client,
    base_url: String,
    session_id: Option<String>,
    content: Option<ServiceContent>,
    config: VsphereConfig,
}

impl VsphereClient {
    /// Build a new client from config (does NOT create a session yet).
    pub fn new(config: &VsphereConfig) -> VmwareResult<Self> {
        let endpoint = Url::parse(&format!("https://{}:{}/", config.host, config.port))?;
        let base_url = format!(
            "{}sdk/vim25/{}",
            endpoint.as_str(),
            config.api_release.trim_matches('/')
        );
        Self::with_base_url(config, base_url)
    }

    /// Build a client against an explicit VI/JSON base URL, e.g. a plain-HTTP
    /// simulator or a reverse proxy that rewrites the `/sdk` prefix.
    pub fn with_base_url(config: &VsphereConfig, base_url: impl Into<String>) -> VmwareResult<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VmwareError::connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_id: None,
            content: None,
            config: config.clone(),
        })
    }

    /// Base URL for API calls.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether we have an active session.
    pub fn is_connected(&self) -> bool {
        self.session_id.is_some()
    }

    /// Current session ID (if any).
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    // ── Session management ──────────────────────────────────────────

    /// Fetch `ServiceInstance.content` (no session needed) and cache it.
    pub async fn retrieve_content(&mut self) -> VmwareResult<&ServiceContent> {
        if self.content.is_none() {
            let url = format!("{}/ServiceInstance/ServiceInstance/content", self.base_url);
            log::debug!("GET {url}");
            let resp = self.client.get(&url).send().await?;
            let resp = Self::check_status(resp).await?;
            let content: ServiceContent = Self::parse_response(resp).await?;
            if let Some(about) = &content.about {
                log::debug!(
                    "Endpoint: {} (API {})",
                    about.full_name.as_deref().unwrap_or("unknown"),
                    about.api_version.as_deref().unwrap_or("unknown")
                );
            }
            self.content = Some(content);
        }
        self.require_content()
    }

    /// Create a new API session (SessionManager.Login).
    ///
    /// Any failure here, an unreachable endpoint included, is reported as an
    /// authentication error.
    pub async fn login(&mut self) -> VmwareResult<String> {
        let session_manager = match self.retrieve_content().await {
            Ok(content) => content.session_manager.clone(),
            Err(e) => return Err(VmwareError::auth(format!("Cannot reach endpoint: {e}"))),
        };

        let url = self.method_url(&session_manager, "Login");
        log::debug!("POST {url}");
        let body = json!({
            "userName": self.config.username,
            "password": self.config.password.expose_secret(),
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| VmwareError::auth(format!("Login request failed: {e}")))?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(VmwareError::auth("Invalid credentials"));
        }

        let resp = Self::check_status(resp)
            .await
            .map_err(|e| VmwareError::auth(format!("Login failed: {}", e.message)))?;

        let session_id = resp
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| VmwareError::auth("Login response carried no session id"))?;

        if let Ok(session) = Self::parse_response::<UserSession>(resp).await {
            log::debug!(
                "Logged in as {}",
                session.user_name.as_deref().unwrap_or(&self.config.username)
            );
        }

        self.session_id = Some(session_id.clone());
        Ok(session_id)
    }

    /// End the current session (SessionManager.Logout). Best effort.
    pub async fn logout(&mut self) -> VmwareResult<()> {
        if let (Some(sid), Some(content)) = (self.session_id.as_deref(), self.content.as_ref()) {
            let url = self.method_url(&content.session_manager, "Logout");
            log::debug!("POST {url}");
            if let Err(e) = self
                .client
                .post(&url)
                .header(SESSION_HEADER, sid)
                .send()
                .await
            {
                log::warn!("Logout failed: {e}");
            }
        }
        self.session_id = None;
        Ok(())
    }

    // ── HTTP helpers ────────────────────────────────────────────────

    fn require_session(&self) -> VmwareResult<&str> {
        self.session_id
            .as_deref()
            .ok_or_else(|| VmwareError::auth("Not logged in: no active session"))
    }

    fn require_content(&self) -> VmwareResult<&ServiceContent> {
        self.content
            .as_ref()
            .ok_or_else(|| VmwareError::connection("Service content not retrieved"))
    }

    fn method_url(&self, obj: &ManagedObjectReference, method: &str) -> String {
        format!("{}/{}/{}/{}", self.base_url, obj.mo_type, obj.value, method)
    }

    /// Invoke a managed-object method with a JSON body, return parsed response.
    pub async fn invoke<B: Serialize, T: DeserializeOwned>(
        &self,
        obj: &ManagedObjectReference,
        method: &str,
        body: &B,
    ) -> VmwareResult<T> {
        let resp = self.invoke_raw(obj, method, Some(body)).await?;
        Self::parse_response(resp).await
    }

    /// Invoke a managed-object method with no body, discarding the response.
    pub async fn invoke_empty(&self, obj: &ManagedObjectReference, method: &str) -> VmwareResult<()> {
        self.invoke_raw::<Value>(obj, method, None).await?;
        Ok(())
    }

    async fn invoke_raw<B: Serialize>(
        &self,
        obj: &ManagedObjectReference,
        method: &str,
        body: Option<&B>,
    ) -> VmwareResult<Response> {
        let sid = self.require_session()?;
        let url = self.method_url(obj, method);
        log::debug!("POST {url}");
        let mut req = self.client.post(&url).header(SESSION_HEADER, sid);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        Self::check_status(resp).await
    }

    // ── Internal helpers ────────────────────────────────────────────

    async fn check_status(resp: Response) -> VmwareResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();

        if let Some((fault_type, msg)) = parse_fault(&body) {
            return Err(VmwareError::fault(fault_type, msg));
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(VmwareError::auth(format!("Session expired or invalid: {body}"))),
            StatusCode::FORBIDDEN => Err(VmwareError::new(
                crate::error::VmwareErrorKind::AccessDenied,
                format!("Access denied: {body}"),
            )),
            StatusCode::NOT_FOUND => Err(VmwareError::not_found(format!("Resource not found: {body}"))),
            _ => Err(VmwareError::api(code, format!("API error {code}: {body}"))),
        }
    }

    async fn parse_response<T: DeserializeOwned>(resp: Response) -> VmwareResult<T> {
        let text = resp.text().await.map_err(|e| {
            VmwareError::parse(format!("Failed to read response body: {e}"))
        })?;

        if text.is_empty() {
            // void methods and empty retrievals come back with no body
            return serde_json::from_str("null").map_err(|e| {
                VmwareError::parse(format!("Cannot deserialise empty response: {e}"))
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            let end = text.char_indices().nth(500).map(|(i, _)| i).unwrap_or(text.len());
            VmwareError::parse(format!("JSON parse error: {e}; body: {}", &text[..end]))
        })
    }
}

/// Extract `(fault type, message)` from a VI/JSON fault body.
pub(crate) fn parse_fault(body: &str) -> Option<(String, String)> {
    let v: Value = serde_json::from_str(body).ok()?;
    let fault_type = v.get("_typeName")?.as_str()?.to_string();

    let message = ["faultstring", "message", "localizedMessage", "msg"]
        .iter()
        .find_map(|k| v.get(*k).and_then(Value::as_str))
        .or_else(|| {
            v.get("faultMessage")
                .and_then(Value::as_array)
                .and_then(|msgs| msgs.iter().find_map(|m| m.get("message").and_then(Value::as_str)))
        })
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fault_type.clone());

    Some((fault_type, message))
}

#[async_trait]
impl VimApi for VsphereClient {
    fn root_folder(&self) -> VmwareResult<ManagedObjectReference> {
        Ok(self.require_content()?.root_folder.clone())
    }

    async fn create_container_view(
        &self,
        container: &ManagedObjectReference,
        view_types: &[&str],
        recursive: bool,
    ) -> VmwareResult<ManagedObjectReference> {
        let view_manager = self.require_content()?.view_manager.clone();
        let body = json!({
            "container": container,
            "type": view_types,
            "recursive": recursive,
        });
        self.invoke(&view_manager, "CreateContainerView", &body).await
    }

    async fn destroy_view(&self, view: &ManagedObjectReference) -> VmwareResult<()> {
        self.invoke_empty(view, "DestroyView").await
    }

    async fn retrieve_properties_ex(
        &self,
        spec_set: &[PropertyFilterSpec],
        options: &RetrieveOptions,
    ) -> VmwareResult<RetrieveResult> {
        let collector = self.require_content()?.property_collector.clone();
        let body = json!({ "specSet": spec_set, "options": options });
        let page: Option<RetrieveResult> = self.invoke(&collector, "RetrievePropertiesEx", &body).await?;
        Ok(page.unwrap_or_default())
    }

    async fn continue_retrieve_properties_ex(&self, token: &str) -> VmwareResult<RetrieveResult> {
        let collector = self.require_content()?.property_collector.clone();
        let body = json!({ "token": token });
        let page: Option<RetrieveResult> =
            self.invoke(&collector, "ContinueRetrievePropertiesEx", &body).await?;
        Ok(page.unwrap_or_default())
    }
}
