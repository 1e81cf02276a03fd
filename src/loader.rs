//! The fragment loader: fetches HTML (or JSON) and writes it into a load target.
//!
//! Rehydration of the inserted markup is not done here. The target is put under the session's
//! [`MutationWatcher`](`crate::watcher::MutationWatcher`) *before* the write, so the write's own mutation records run the registry.
//! Those records are flushed right after the write, so a completed load always has live widgets.
//!
//! Overlapping loads into the same target are not sequenced: whichever response lands last wins.

use crate::{
	modal,
	transport::{describe, Request},
	trigger::{ContentType, InsertMode, Method},
	Error, Result, Session,
};
use tracing::{debug, instrument, trace};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, FormData, HtmlElement, HtmlFormElement, Node, UrlSearchParams};

/// An element id or an element reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
	Id(String),
	Element(Element),
}

impl LoadTarget {
	fn resolve(&self, session: &Session) -> Result<Element> {
		match self {
			LoadTarget::Id(id) => session.element_by_id(id),
			LoadTarget::Element(element) => Ok(element.clone()),
		}
	}
}

impl From<&str> for LoadTarget {
	fn from(id: &str) -> Self {
		LoadTarget::Id(id.to_owned())
	}
}

impl From<Element> for LoadTarget {
	fn from(element: Element) -> Self {
		LoadTarget::Element(element)
	}
}

/// Requests `url` and writes the response into `target`.
///
/// On any failure the target is left untouched and the error is returned for the caller to report.
#[instrument(skip(session, target))]
pub async fn load(session: &Session, method: Method, url: &str, target: LoadTarget, mode: InsertMode, content_type: ContentType) -> Result<()> {
	let target = target.resolve(session)?;
	let response = session
		.transport()
		.send(Request {
			method,
			url: url.to_owned(),
			content_type: content_type.mime(),
			body: None,
		})
		.await?
		.success()?;

	let content = match content_type {
		ContentType::Html => Content::Markup(response.body),
		ContentType::Json => json_content(&response.body)?,
	};
	let inserted = insert(session, &target, &content, mode)?;
	focus_first_interactive(session, &inserted);
	Ok(())
}

/// Requests `url` as JSON and returns the parsed value.
#[instrument(skip(session))]
pub async fn get_json(session: &Session, url: &str) -> Result<JsValue> {
	let response = session
		.transport()
		.send(Request {
			method: Method::Get,
			url: url.to_owned(),
			content_type: ContentType::Json.mime(),
			body: None,
		})
		.await?
		.success()?;
	js_sys::JSON::parse(&response.body).map_err(|error| Error::MalformedJson(describe(&error)))
}

/// Submits the form named `form_name`, writes the response into the content region of overlay `overlay_id` and opens that overlay.
#[instrument(skip(session, opener))]
pub async fn submit_form(session: &Session, form_name: &str, overlay_id: &str, opener: Option<HtmlElement>) -> Result<()> {
	let form = find_form(session, form_name)?;
	let overlay = session.element_by_id(overlay_id)?;

	let method = match form.get_attribute("method") {
		Some(method) if !method.trim().is_empty() => method.parse().map_err(|_| Error::InvalidAttribute { attribute: "method", value: method })?,
		_ => Method::Post,
	};
	let action = match form.get_attribute("action") {
		Some(action) if !action.trim().is_empty() => action,
		_ => session.document().url().map_err(|error| Error::dom(&error))?,
	};
	let fields = FormData::new_with_form(&form).map_err(|error| Error::dom(&error))?;
	let fields = UrlSearchParams::new_with_str_sequence_sequence(fields.as_ref()).map_err(|error| Error::dom(&error))?;
	let request = Request::form(method, &action, String::from(fields.to_string()));

	let response = session.transport().send(request).await?.success()?;

	let region = modal::content_region(session, &overlay);
	let inserted = insert(session, &region, &Content::Markup(response.body), InsertMode::Replace)?;
	modal::open(session, overlay_id, opener)?;
	focus_first_interactive(session, &inserted);
	Ok(())
}

/// Fire-and-forget [`load`], reporting failures through the session.
pub(crate) fn spawn_load(session: &Session, method: Method, url: String, target: LoadTarget, mode: InsertMode, content_type: ContentType) {
	let session = session.clone();
	spawn_local(async move {
		if let Err(error) = load(&session, method, &url, target, mode, content_type).await {
			session.report(&error);
		}
	});
}

/// Fire-and-forget [`submit_form`], reporting failures through the session.
pub(crate) fn spawn_submit_form(session: &Session, form_name: String, overlay_id: String, opener: Option<HtmlElement>) {
	let session = session.clone();
	spawn_local(async move {
		if let Err(error) = submit_form(&session, &form_name, &overlay_id, opener).await {
			session.report(&error);
		}
	});
}

/// What a response turns into once it reaches the page.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
	Markup(String),
	/// Inserted as a text node, never parsed.
	Text(String),
}

/// Writes `content` into `target` and returns the newly inserted top-level nodes.
fn insert(session: &Session, target: &Element, content: &Content, mode: InsertMode) -> Result<Vec<Node>> {
	session.watch(target)?;

	let children = target.child_nodes();
	let first_new = match mode {
		InsertMode::Replace => 0,
		InsertMode::Append => children.length(),
	};
	match (content, mode) {
		(Content::Markup(markup), InsertMode::Replace) => target.set_inner_html(markup),
		(Content::Markup(markup), InsertMode::Append) => target.insert_adjacent_html("beforeend", markup).map_err(|error| Error::dom(&error))?,
		(Content::Text(text), InsertMode::Replace) => target.set_text_content(Some(text)),
		(Content::Text(text), InsertMode::Append) => {
			target
				.append_child(&session.document().create_text_node(text))
				.map_err(|error| Error::dom(&error))?;
		}
	}
	let (Content::Markup(text) | Content::Text(text)) = content;
	trace!("Inserted {} byte(s) ({:?}).", text.len(), mode);
	session.flush_mutations();
	Ok((first_new..children.length()).filter_map(|i| children.item(i)).collect())
}

/// Moves focus to the first link (other than an exit control), input, select or button among `nodes`, in document order.
fn focus_first_interactive(session: &Session, nodes: &[Node]) -> Option<HtmlElement> {
	let selector = session.config().focusable_selector();
	let candidate = nodes.iter().filter_map(|node| node.dyn_ref::<Element>()).find_map(|element| {
		if element.matches(&selector).unwrap_or(false) {
			Some(element.clone())
		} else {
			element.query_selector(&selector).ok().flatten()
		}
	})?;

	let candidate: HtmlElement = candidate.dyn_into().ok()?;
	match candidate.focus() {
		Ok(()) => Some(candidate),
		Err(error) => {
			debug!("Could not focus inserted content: {:?}", error);
			None
		}
	}
}

fn find_form(session: &Session, form_name: &str) -> Result<HtmlFormElement> {
	let named = session.document().get_elements_by_name(form_name);
	(0..named.length())
		.filter_map(|i| named.item(i))
		.find_map(|node| node.dyn_into::<HtmlFormElement>().ok())
		.ok_or_else(|| Error::FormNotFound { name: form_name.to_owned() })
}

/// JSON strings are taken as markup, anything else is shown as JSON text.
fn json_content(body: &str) -> Result<Content> {
	let value = js_sys::JSON::parse(body).map_err(|error| Error::MalformedJson(describe(&error)))?;
	if let Some(markup) = value.as_string() {
		return Ok(Content::Markup(markup));
	}
	let text: String = js_sys::JSON::stringify(&value).map_err(|error| Error::MalformedJson(describe(&error)))?.into();
	Ok(Content::Text(text))
}
