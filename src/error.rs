use tracing::{error, warn};
use wasm_bindgen::JsValue;

pub type Result<T> = core::result::Result<T, Error>;

/// Everything that can go wrong while wiring or driving a widget.
///
/// None of these are fatal: a failing widget stays unresponsive, the rest of the page keeps working.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("no element with id {id:?} in the document")]
	TargetNotFound { id: String },

	#[error("no form named {name:?} in the document")]
	FormNotFound { name: String },

	#[error("invalid value {value:?} for attribute {attribute}")]
	InvalidAttribute { attribute: &'static str, value: String },

	#[error("request failed: {0}")]
	Network(String),

	#[error("{url} responded with status {status}")]
	Status { status: u16, url: String },

	#[error("response body is not valid JSON: {0}")]
	MalformedJson(String),

	#[error("DOM operation failed: {0}")]
	Dom(String),
}

impl Error {
	pub(crate) fn dom(value: &JsValue) -> Self {
		Self::Dom(format!("{:?}", value))
	}

	/// Whether the error concerns page markup rather than I/O.
	#[must_use]
	pub fn is_markup(&self) -> bool {
		matches!(self, Self::TargetNotFound { .. } | Self::FormNotFound { .. } | Self::InvalidAttribute { .. })
	}
}

/// The reporting channel for locally recovered failures.
pub trait Reporter {
	fn report(&self, error: &Error);
}

/// Default [`Reporter`]: markup problems are warnings, everything else is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;
impl Reporter for TracingReporter {
	fn report(&self, error: &Error) {
		if error.is_markup() {
			warn!("{}", error);
		} else {
			error!("{}", error);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::Error;

	#[test]
	fn markup_errors_are_told_apart() {
		assert!(Error::TargetNotFound { id: "panel".into() }.is_markup());
		assert!(!Error::Status { status: 404, url: "/x".into() }.is_markup());
		assert!(!Error::MalformedJson("eof".into()).is_markup());
	}

	#[test]
	fn status_message_names_url() {
		let message = Error::Status { status: 404, url: "/alerts/1".into() }.to_string();
		assert_eq!(message, "/alerts/1 responded with status 404");
	}
}
