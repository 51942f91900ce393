//! Salesforce login and the authenticated session handle
//!
//! Login uses the partner SOAP `login` call, which accepts a username and a
//! password with the security token appended. The response carries a session
//! ID and the server URL of the org's instance; the REST base URL is derived
//! from the latter.

use std::collections::HashMap;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::{Client as HttpClient, Url};

use crate::error::{ApiError, Result};

/// Client name sent in the SOAP `CallOptions` header
const SOAP_CLIENT_ID: &str = "sfexport";

/// Authenticated handle to one Salesforce org
#[derive(Debug, Clone)]
pub struct Session {
    session_id: String,
    base_url: Url,
}

/// Credentials and target for a login call
#[derive(Debug, Clone, Copy)]
pub struct LoginRequest<'a> {
    pub login_host: &'a str,
    pub api_version: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub security_token: &'a str,
}

impl Session {
    /// Create a session from an existing session ID and REST base URL
    pub fn new(session_id: impl Into<String>, base_url: Url) -> Self {
        Self {
            session_id: session_id.into(),
            base_url,
        }
    }

    /// Log in and open a session
    pub async fn login(http: &HttpClient, request: LoginRequest<'_>) -> Result<Self> {
        let url = format!(
            "{}/services/Soap/u/{}",
            request.login_host, request.api_version
        );
        log::debug!("POST {}", url);

        let response = http
            .post(&url)
            .header("Content-Type", "text/xml; charset=UTF-8")
            .header("SOAPAction", "login")
            .body(login_envelope(&request))
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to read login response: {}", e)))?;

        if !status.is_success() {
            return Err(login_fault(status, &body).into());
        }

        let fields = read_elements(&body, &["sessionId", "serverUrl"])?;
        let session_id = fields
            .get("sessionId")
            .ok_or_else(|| ApiError::InvalidResponse("Login response has no sessionId".into()))?;
        let server_url = fields
            .get("serverUrl")
            .ok_or_else(|| ApiError::InvalidResponse("Login response has no serverUrl".into()))?;

        let base_url = rest_base_url(server_url, request.api_version)?;
        log::debug!("Session opened against {}", base_url);

        Ok(Self::new(session_id.clone(), base_url))
    }

    /// Resolve a path relative to the REST base URL
    pub fn url(&self, path: &str) -> std::result::Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidResponse(format!("Bad request path {:?}: {}", path, e)))
    }

    /// Value for the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.session_id)
    }
}

fn login_envelope(request: &LoginRequest<'_>) -> String {
    let password = format!("{}{}", request.password, request.security_token);
    format!(
        r#"<?xml version="1.0" encoding="utf-8" ?>
<env:Envelope
        xmlns:xsd="http://www.w3.org/2001/XMLSchema"
        xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
        xmlns:env="http://schemas.xmlsoap.org/soap/envelope/"
        xmlns:urn="urn:partner.soap.sforce.com">
    <env:Header>
        <urn:CallOptions>
            <urn:client>{client}</urn:client>
            <urn:defaultNamespace>sf</urn:defaultNamespace>
        </urn:CallOptions>
    </env:Header>
    <env:Body>
        <n1:login xmlns:n1="urn:partner.soap.sforce.com">
            <n1:username>{username}</n1:username>
            <n1:password>{password}</n1:password>
        </n1:login>
    </env:Body>
</env:Envelope>"#,
        client = SOAP_CLIENT_ID,
        username = escape(request.username),
        password = escape(password.as_str()),
    )
}

/// Turn a failed login response into an error, using the SOAP fault if present
fn login_fault(status: reqwest::StatusCode, body: &str) -> ApiError {
    let fields = read_elements(body, &["exceptionCode", "exceptionMessage", "faultcode", "faultstring"])
        .unwrap_or_default();

    let code = fields
        .get("exceptionCode")
        .or_else(|| fields.get("faultcode"))
        .cloned()
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    let message = fields
        .get("exceptionMessage")
        .or_else(|| fields.get("faultstring"))
        .cloned()
        .unwrap_or_else(|| body.trim().to_string());

    ApiError::Authentication { code, message }
}

/// Collect the text of the first occurrence of each named element.
///
/// Names are matched on the local part, so `sf:exceptionCode` matches
/// `exceptionCode`.
fn read_elements(
    xml: &str,
    names: &[&str],
) -> std::result::Result<HashMap<String, String>, ApiError> {
    let mut reader = Reader::from_str(xml);
    let mut fields = HashMap::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                current = names.contains(&name.as_str()).then_some(name);
            }
            Event::Text(text) => {
                if let Some(name) = current.take() {
                    let value = text.unescape()?.trim().to_string();
                    fields.entry(name).or_insert(value);
                }
            }
            Event::End(_) => current = None,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(fields)
}

/// Derive the REST base URL from the SOAP `serverUrl`.
///
/// Keeps scheme, host and port; drops an `-api` suffix from the instance
/// name (the first host label) only.
fn rest_base_url(server_url: &str, api_version: &str) -> std::result::Result<Url, ApiError> {
    let parsed = Url::parse(server_url).map_err(|e| {
        ApiError::InvalidResponse(format!("Invalid serverUrl {:?}: {}", server_url, e))
    })?;
    let host = parsed
        .host_str()
        .ok_or_else(|| ApiError::InvalidResponse(format!("serverUrl {:?} has no host", server_url)))?;

    let (instance, rest) = match host.split_once('.') {
        Some((instance, rest)) => (instance, Some(rest)),
        None => (host, None),
    };
    let instance = instance.strip_suffix("-api").unwrap_or(instance);

    let mut origin = format!("{}://{}", parsed.scheme(), instance);
    if let Some(rest) = rest {
        origin.push('.');
        origin.push_str(rest);
    }
    if let Some(port) = parsed.port() {
        origin.push_str(&format!(":{}", port));
    }

    Url::parse(&format!("{}/services/data/v{}/", origin, api_version)).map_err(|e| {
        ApiError::InvalidResponse(format!("Invalid REST base URL for {:?}: {}", origin, e))
    })
}
