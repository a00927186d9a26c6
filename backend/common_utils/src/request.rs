//! The request envelope handed back to the host. Adapters only build
//! requests; the host's HTTP client executes them and returns a
//! [`Response`]-shaped payload for the adapter to interpret.

use std::collections::HashSet;

use error_stack::ResultExt;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{CustomResult, ParsingError},
    masking::{Maskable, Secret},
};

pub type Headers = HashSet<(String, Maskable<String>)>;

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

#[derive(Debug, Deserialize, Serialize)]
pub enum ContentType {
    Json,
    FormUrlEncoded,
}

/// Wire body of an outbound gateway exchange.
#[derive(Clone, Serialize)]
pub enum RequestContent {
    Json(serde_json::Value),
    FormUrlEncoded(Vec<(String, String)>),
    RawBytes(Vec<u8>),
}

impl RequestContent {
    /// The body exactly as it goes on the wire.
    pub fn render(&self) -> CustomResult<Vec<u8>, ParsingError> {
        match self {
            Self::Json(value) => serde_json::to_vec(value)
                .change_context(ParsingError::EncodeError("json")),
            Self::FormUrlEncoded(fields) => serde_urlencoded::to_string(fields)
                .map(String::into_bytes)
                .change_context(ParsingError::EncodeError("url-encoded")),
            Self::RawBytes(bytes) => Ok(bytes.clone()),
        }
    }
}

impl std::fmt::Debug for RequestContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Json(_) => "JsonRequestBody",
            Self::FormUrlEncoded(_) => "FormUrlEncodedRequestBody",
            Self::RawBytes(_) => "RawBytesRequestBody",
        })
    }
}

#[derive(Debug)]
pub struct Request {
    pub url: String,
    pub headers: Headers,
    pub method: Method,
    pub body: Option<RequestContent>,
    pub certificate: Option<Secret<String>>,
    pub certificate_key: Option<Secret<String>>,
}

impl Request {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: String::from(url),
            headers: HashSet::new(),
            body: None,
            certificate: None,
            certificate_key: None,
        }
    }

    pub fn set_body(&mut self, body: RequestContent) {
        self.body = Some(body);
    }

    pub fn add_header(&mut self, header: &str, value: Maskable<String>) {
        self.headers.insert((String::from(header), value));
    }
}

#[derive(Debug)]
pub struct RequestBuilder {
    pub url: String,
    pub headers: Headers,
    pub method: Method,
    pub body: Option<RequestContent>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::Get,
            url: String::with_capacity(1024),
            headers: HashSet::new(),
            body: None,
        }
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, header: &str, value: &str) -> Self {
        self.headers.insert((header.into(), value.to_string().into()));
        self
    }

    pub fn headers(mut self, headers: Vec<(String, Maskable<String>)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn set_optional_body(mut self, body: Option<RequestContent>) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            certificate: None,
            certificate_key: None,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_bodies_render_url_encoded() {
        let body = RequestContent::FormUrlEncoded(vec![
            ("ssl_amount".to_string(), "100.00".to_string()),
            ("ssl_description".to_string(), "42=6000|43=4000".to_string()),
        ]);
        let rendered = String::from_utf8(body.render().unwrap()).unwrap();
        assert_eq!(
            rendered,
            "ssl_amount=100.00&ssl_description=42%3D6000%7C43%3D4000"
        );
    }

    #[test]
    fn json_bodies_render_compact() {
        let body = RequestContent::Json(serde_json::json!({"ssl_result": "0"}));
        assert_eq!(body.render().unwrap(), br#"{"ssl_result":"0"}"#);
    }
}
