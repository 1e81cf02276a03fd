//! Parsing of declarative trigger attributes into [`Trigger`]s.
//!
//! Each element is read once per registry pass. Everything downstream dispatches on the parsed variant.

use crate::{config::Config, Error, Result};
use core::{fmt, str::FromStr};

/// Read access to an element's attributes.
///
/// Implemented for [`web_sys::Element`] and for attribute slices, the latter mainly for tests.
pub trait AttributeSource {
	fn attribute(&self, name: &str) -> Option<String>;

	fn has_class(&self, class: &str) -> bool {
		self.attribute("class").map_or(false, |classes| classes.split_whitespace().any(|c| c == class))
	}
}

impl AttributeSource for web_sys::Element {
	fn attribute(&self, name: &str) -> Option<String> {
		self.get_attribute(name)
	}

	fn has_class(&self, class: &str) -> bool {
		self.class_list().contains(class)
	}
}

impl AttributeSource for [(&str, &str)] {
	fn attribute(&self, name: &str) -> Option<String> {
		self.iter().find(|(n, _)| *n == name).map(|(_, v)| (*v).to_owned())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
	Get,
	Put,
	Post,
	Delete,
}
impl Method {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Put => "PUT",
			Method::Post => "POST",
			Method::Delete => "DELETE",
		}
	}
}
impl Default for Method {
	fn default() -> Self {
		Method::Get
	}
}
impl FromStr for Method {
	type Err = ();

	fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"get" => Ok(Method::Get),
			"put" => Ok(Method::Put),
			"post" => Ok(Method::Post),
			"delete" => Ok(Method::Delete),
			_ => Err(()),
		}
	}
}
impl fmt::Display for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// How fetched content lands in its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertMode {
	Replace,
	Append,
}
impl Default for InsertMode {
	fn default() -> Self {
		InsertMode::Replace
	}
}
impl FromStr for InsertMode {
	type Err = ();

	fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"replace" => Ok(InsertMode::Replace),
			"append" => Ok(InsertMode::Append),
			_ => Err(()),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
	Html,
	Json,
}
impl ContentType {
	/// The `Content-Type` request header value.
	#[must_use]
	pub fn mime(self) -> &'static str {
		match self {
			ContentType::Html => "text/html",
			ContentType::Json => "application/json",
		}
	}
}
impl Default for ContentType {
	fn default() -> Self {
		ContentType::Html
	}
}
impl FromStr for ContentType {
	type Err = ();

	fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"html" | "text/html" => Ok(ContentType::Html),
			"json" | "application/json" => Ok(ContentType::Json),
			_ => Err(()),
		}
	}
}

/// The `display` value a toggle target takes while shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleDisplay {
	Block,
	TableRow,
}
impl ToggleDisplay {
	#[must_use]
	pub fn shown(self) -> &'static str {
		match self {
			ToggleDisplay::Block => "block",
			ToggleDisplay::TableRow => "table-row",
		}
	}
}

/// Where an XHR trigger writes its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XhrTarget {
	/// An element id.
	Element(String),
	/// The content region of the overlay with this id.
	Overlay(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
	Modal,
	Toggle,
	Xhr,
	ModalPost,
	ModalExit,
}
impl TriggerKind {
	/// Written back onto the element once a listener of this kind is attached.
	/// Its value is the listener's id in the session's listener table.
	#[must_use]
	pub fn initialized_attribute(self) -> &'static str {
		match self {
			TriggerKind::Modal => "data-modal-initialized",
			TriggerKind::Toggle => "data-toggle-initialized",
			TriggerKind::Xhr => "data-xhr-initialized",
			TriggerKind::ModalPost => "data-modal-post-initialized",
			TriggerKind::ModalExit => "data-modal-exit-initialized",
		}
	}
}

/// One behaviour declared on one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
	Modal {
		overlay: String,
	},
	Toggle {
		target: String,
		display: ToggleDisplay,
	},
	Xhr {
		url: String,
		target: XhrTarget,
		method: Method,
		mode: InsertMode,
		content_type: ContentType,
	},
	ModalPost {
		form: String,
		overlay: String,
	},
	ModalExit,
}

impl Trigger {
	#[must_use]
	pub fn kind(&self) -> TriggerKind {
		match self {
			Trigger::Modal { .. } => TriggerKind::Modal,
			Trigger::Toggle { .. } => TriggerKind::Toggle,
			Trigger::Xhr { .. } => TriggerKind::Xhr,
			Trigger::ModalPost { .. } => TriggerKind::ModalPost,
			Trigger::ModalExit => TriggerKind::ModalExit,
		}
	}

	/// Ids that must resolve in the document before the trigger can be attached.
	#[must_use]
	pub fn required_ids(&self) -> Vec<&str> {
		match self {
			Trigger::Modal { overlay } | Trigger::ModalPost { overlay, .. } => vec![overlay.as_str()],
			Trigger::Toggle { target, .. } => vec![target.as_str()],
			Trigger::Xhr {
				target: XhrTarget::Element(id) | XhrTarget::Overlay(id),
				..
			} => vec![id.as_str()],
			Trigger::ModalExit => vec![],
		}
	}

	/// Parses every trigger declared on `element`.
	///
	/// An element may declare several kinds at once, e.g. `data-modal` together with `data-xhr-url` opens an overlay and fills it.
	/// Malformed declarations come back as [`Err`] items without affecting the element's other triggers.
	pub fn parse_all<S: AttributeSource + ?Sized>(element: &S, config: &Config) -> Vec<Result<Trigger>> {
		let mut triggers = Vec::new();

		let modal = element.attribute(config.modal_attribute);
		if let Some(overlay) = &modal {
			triggers.push(required(config.modal_attribute, overlay).map(|overlay| Trigger::Modal { overlay }));
		}

		if let Some(target) = element.attribute(config.toggle_attribute) {
			let display = if element.attribute(config.toggle_row_attribute).is_some() {
				ToggleDisplay::TableRow
			} else {
				ToggleDisplay::Block
			};
			triggers.push(required(config.toggle_attribute, &target).map(|target| Trigger::Toggle { target, display }));
		}

		if let Some(url) = element.attribute(config.xhr_url_attribute) {
			triggers.push(parse_xhr(element, config, &url, modal.as_deref()));
		}

		if let Some(form) = element.attribute(config.modal_post_attribute) {
			triggers.push(required(config.modal_post_attribute, &form).and_then(|form| {
				let overlay = element.attribute(config.modal_post_target_attribute).unwrap_or_default();
				let overlay = required(config.modal_post_target_attribute, &overlay)?;
				Ok(Trigger::ModalPost { form, overlay })
			}));
		}

		if element.has_class(config.modal_exit_class) {
			triggers.push(Ok(Trigger::ModalExit));
		}

		triggers
	}
}

fn parse_xhr<S: AttributeSource + ?Sized>(element: &S, config: &Config, url: &str, modal: Option<&str>) -> Result<Trigger> {
	let url = required(config.xhr_url_attribute, url)?;
	let target = match (element.attribute(config.xhr_target_attribute), modal) {
		(Some(id), _) => XhrTarget::Element(required(config.xhr_target_attribute, &id)?),
		(None, Some(overlay)) => XhrTarget::Overlay(required(config.modal_attribute, overlay)?),
		(None, None) => {
			return Err(Error::InvalidAttribute {
				attribute: config.xhr_target_attribute,
				value: String::new(),
			})
		}
	};
	Ok(Trigger::Xhr {
		url,
		target,
		method: optional(element, config.xhr_method_attribute)?,
		mode: optional(element, config.xhr_action_attribute)?,
		content_type: optional(element, config.xhr_content_type_attribute)?,
	})
}

fn required(attribute: &'static str, value: &str) -> Result<String> {
	let trimmed = value.trim();
	if trimmed.is_empty() {
		Err(Error::InvalidAttribute { attribute, value: value.to_owned() })
	} else {
		Ok(trimmed.to_owned())
	}
}

fn optional<S: AttributeSource + ?Sized, T: FromStr + Default>(element: &S, attribute: &'static str) -> Result<T> {
	match element.attribute(attribute) {
		None => Ok(T::default()),
		Some(value) if value.trim().is_empty() => Ok(T::default()),
		Some(value) => value.parse().map_err(|_| Error::InvalidAttribute { attribute, value }),
	}
}
