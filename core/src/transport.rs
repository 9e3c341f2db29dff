//! Blocking `Transport` backed by reqwest.

use reqwest::blocking::multipart::{Form, Part as FormPart};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;

use crate::http::{
    HttpMethod, HttpRequest, HttpResponse, Part, PartContent, RequestBody, Transport,
    TransportError,
};

/// Synchronous HTTP transport. HTTP error statuses are returned as data,
/// never as `Err`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::with_source("failed to build HTTP client", e))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.path);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let builder = attach_body(builder, request.body)?;

        let response = builder
            .send()
            .map_err(|e| TransportError::with_source(format!("{} {} failed", request.method, request.path), e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .map_err(|e| TransportError::with_source("failed to read response body", e))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn attach_body(builder: RequestBuilder, body: RequestBody) -> Result<RequestBuilder, TransportError> {
    Ok(match body {
        RequestBody::Empty => builder,
        RequestBody::Form(fields) => builder.form(&fields),
        RequestBody::Multipart(parts) => builder.multipart(multipart_form(parts)?),
    })
}

fn multipart_form(parts: Vec<Part>) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for Part { name, content } in parts {
        form = match content {
            PartContent::Text(value) => form.text(name, value),
            PartContent::File {
                file_name,
                content_type,
                bytes,
            } => {
                let part = FormPart::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&content_type)
                    .map_err(|e| TransportError::with_source(format!("invalid content type {content_type}"), e))?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}
