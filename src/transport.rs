//! The HTTP seam of the fragment loader.
//!
//! [`FetchTransport`] talks to the browser's `fetch`. Tests substitute their own [`Transport`] with canned responses.

use crate::{trigger::Method, Error, Result};
use core::{future::Future, pin::Pin};
use tracing::trace;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, RequestInit, RequestMode};

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
	pub method: Method,
	pub url: String,
	/// The `Content-Type` header value.
	pub content_type: &'static str,
	pub body: Option<String>,
}

impl Request {
	/// Builds a form submission. GET forms carry their fields in the query string instead of a body.
	#[must_use]
	pub fn form(method: Method, action: &str, encoded_fields: String) -> Self {
		match method {
			Method::Get => {
				// The query goes before any `#fragment`.
				let (path, fragment) = match action.find('#') {
					Some(hash) => action.split_at(hash),
					None => (action, ""),
				};
				let url = if encoded_fields.is_empty() {
					action.to_owned()
				} else if path.contains('?') {
					format!("{}&{}{}", path, encoded_fields, fragment)
				} else {
					format!("{}?{}{}", path, encoded_fields, fragment)
				};
				Self {
					method,
					url,
					content_type: FORM_URLENCODED,
					body: None,
				}
			}
			_ => Self {
				method,
				url: action.to_owned(),
				content_type: FORM_URLENCODED,
				body: Some(encoded_fields),
			},
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
	pub status: u16,
	pub url: String,
	pub body: String,
}

impl Response {
	#[must_use]
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Converts a non-2xx response into [`Error::Status`].
	pub fn success(self) -> Result<Self> {
		if self.is_success() {
			Ok(self)
		} else {
			Err(Error::Status {
				status: self.status,
				url: self.url,
			})
		}
	}
}

pub type TransportFuture = Pin<Box<dyn Future<Output = Result<Response>>>>;

/// Issues one request and resolves once with its complete response.
///
/// Only transport-level failures are [`Err`]. Status codes are left to the caller.
pub trait Transport {
	fn send(&self, request: Request) -> TransportFuture;
}

/// [`Transport`] over `window.fetch` in `cors` mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;
impl Transport for FetchTransport {
	fn send(&self, request: Request) -> TransportFuture {
		Box::pin(async move {
			trace!("{} {}", request.method, request.url);

			let init = RequestInit::new();
			init.set_method(request.method.as_str());
			init.set_mode(RequestMode::Cors);
			let headers = Headers::new().map_err(|error| Error::dom(&error))?;
			headers.set("Content-Type", request.content_type).map_err(|error| Error::dom(&error))?;
			init.set_headers(&headers);
			if let Some(body) = &request.body {
				init.set_body(&JsValue::from_str(body));
			}

			let web_request = web_sys::Request::new_with_str_and_init(&request.url, &init).map_err(|error| Error::Network(describe(&error)))?;
			let window = web_sys::window().ok_or_else(|| Error::Dom("no `window` in this context".to_owned()))?;
			let response = JsFuture::from(window.fetch_with_request(&web_request))
				.await
				.map_err(|error| Error::Network(describe(&error)))?;
			let response: web_sys::Response = response.dyn_into().map_err(|error| Error::dom(&error))?;

			let text = response.text().map_err(|error| Error::dom(&error))?;
			let body = JsFuture::from(text).await.map_err(|error| Error::Network(describe(&error)))?;
			Ok(Response {
				status: response.status(),
				url: request.url,
				body: body.as_string().unwrap_or_default(),
			})
		})
	}
}

/// Best-effort human readable rendering of a rejected promise value.
pub(crate) fn describe(value: &JsValue) -> String {
	if let Some(error) = value.dyn_ref::<js_sys::Error>() {
		String::from(error.message())
	} else if let Some(text) = value.as_string() {
		text
	} else {
		format!("{:?}", value)
	}
}
