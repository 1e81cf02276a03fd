//! The widget registry: finds trigger elements and attaches exactly one listener per element and kind.
//!
//! Attachment state lives in two places that must agree:
//! the element carries an initialized marker attribute whose value is a listener id,
//! and the session's [`ListenerTable`] owns the [`Closure`] registered under that id.
//! A marker without a matching table entry (for example markup serialized from an initialized element) counts as uninitialized.

use crate::{
	loader::{self, LoadTarget},
	modal, toggle,
	trigger::{Trigger, XhrTarget},
	Error, Result, Session,
};
use core::cell::Cell;
use hashbrown::HashMap;
use tracing::{debug, instrument, trace, trace_span};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Element, Event, HtmlElement};

thread_local! {
	static NEXT_LISTENER_ID: Cell<u32> = Cell::new(1);
}

pub(crate) type Handler = Closure<dyn FnMut(Event)>;

struct Listener {
	element: Element,
	marker: &'static str,
	handler: Handler,
}

impl Listener {
	fn detach(&self, id: u32) {
		if let Err(error) = self.element.remove_event_listener_with_callback("click", self.handler.as_ref().unchecked_ref()) {
			debug!("Failed to remove listener {}: {:?}", id, error);
		}
		if self.element.get_attribute(self.marker) == Some(id.to_string()) {
			let _ = self.element.remove_attribute(self.marker);
		}
	}
}

/// Owns the Rust side of every click listener a session attached.
#[derive(Default)]
pub(crate) struct ListenerTable {
	listeners: HashMap<u32, Listener>,
}

impl ListenerTable {
	pub(crate) fn is_attached(&self, element: &Element, marker: &str) -> bool {
		element
			.get_attribute(marker)
			.and_then(|id| id.parse::<u32>().ok())
			.and_then(|id| self.listeners.get(&id))
			.map_or(false, |listener| listener.marker == marker && &listener.element == element)
	}

	pub(crate) fn attach(&mut self, element: &Element, marker: &'static str, handler: Handler) -> Result<u32> {
		element
			.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())
			.map_err(|error| Error::dom(&error))?;

		let id = NEXT_LISTENER_ID.with(|next| {
			let id = next.get();
			next.set(id.wrapping_add(1));
			id
		});
		let listener = Listener {
			element: element.clone(),
			marker,
			handler,
		};
		if let Err(error) = element.set_attribute(marker, &id.to_string()) {
			listener.detach(id);
			return Err(Error::dom(&error));
		}
		self.listeners.insert(id, listener);
		trace!("Attached listener {} ({}).", id, marker);
		Ok(id)
	}

	/// Detaches and drops listeners of elements that left the document, clearing their markers so they re-register if re-inserted.
	pub(crate) fn prune(&mut self) -> usize {
		let before = self.listeners.len();
		self.listeners.retain(|&id, listener| {
			let keep = listener.element.is_connected();
			if !keep {
				listener.detach(id);
			}
			keep
		});
		before - self.listeners.len()
	}

	pub(crate) fn len(&self) -> usize {
		self.listeners.len()
	}
}

impl Drop for ListenerTable {
	fn drop(&mut self) {
		for (id, listener) in self.listeners.drain() {
			listener.detach(id);
		}
	}
}

/// What one registry pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationSummary {
	pub attached: usize,
	/// Triggers that already had a live listener.
	pub skipped: usize,
	/// Malformed declarations or missing targets. Each was reported.
	pub failed: usize,
	pub pruned: usize,
}

/// Registers every trigger in the session's document.
#[instrument(skip(session))]
pub fn register_all(session: &Session) -> RegistrationSummary {
	register(session, None)
}

/// Registers triggers in `root`'s subtree, `root` included.
#[instrument(skip(session, root))]
pub fn register_subtree(session: &Session, root: &Element) -> RegistrationSummary {
	register(session, Some(root))
}

fn register(session: &Session, root: Option<&Element>) -> RegistrationSummary {
	let mut summary = RegistrationSummary {
		pruned: session.listeners().borrow_mut().prune(),
		..RegistrationSummary::default()
	};

	let selector = session.config().trigger_selector();
	let found = match root {
		Some(root) => root.query_selector_all(&selector),
		None => session.document().query_selector_all(&selector),
	};
	let found = match found {
		Ok(found) => found,
		Err(error) => {
			session.report(&Error::dom(&error));
			return summary;
		}
	};

	let mut elements: Vec<Element> = Vec::with_capacity(found.length() as usize + 1);
	if let Some(root) = root {
		if root.matches(&selector).unwrap_or(false) {
			elements.push(root.clone());
		}
	}
	elements.extend((0..found.length()).filter_map(|i| found.item(i)).filter_map(|node| node.dyn_into::<Element>().ok()));

	for element in elements {
		// `querySelectorAll` returns a static list.
		if !element.is_connected() {
			trace!("Skipping element removed mid-scan.");
			continue;
		}

		let span = trace_span!("Registering element", tag = %element.tag_name(), id = %element.id(), html = tracing::field::Empty);
		let _enter = span.enter();
		if cfg!(feature = "dangerous-logging") {
			span.record("html", element.outer_html().as_str());
		}

		for trigger in Trigger::parse_all(&element, session.config()) {
			match trigger.and_then(|trigger| register_trigger(session, &element, trigger)) {
				Ok(true) => summary.attached += 1,
				Ok(false) => summary.skipped += 1,
				Err(error) => {
					summary.failed += 1;
					session.report(&error);
				}
			}
		}
	}

	debug!(
		attached = summary.attached,
		skipped = summary.skipped,
		failed = summary.failed,
		pruned = summary.pruned,
		"Registry pass complete."
	);
	summary
}

/// Returns whether a listener was attached.
fn register_trigger(session: &Session, element: &Element, trigger: Trigger) -> Result<bool> {
	let marker = trigger.kind().initialized_attribute();
	if session.listeners().borrow().is_attached(element, marker) {
		return Ok(false);
	}

	// Missing targets leave the element unmarked, so a later pass picks it up once the target arrives.
	for id in trigger.required_ids() {
		session.element_by_id(id)?;
	}

	let handler = handler_for(session, element, trigger);
	session.listeners().borrow_mut().attach(element, marker, handler)?;
	Ok(true)
}

fn handler_for(session: &Session, element: &Element, trigger: Trigger) -> Handler {
	let weak = session.downgrade();
	let element = element.clone();
	Closure::wrap(Box::new(move |event: Event| {
		let session = match weak.upgrade() {
			Some(session) => session,
			None => return debug!("Click after session drop ignored."),
		};
		event.prevent_default();

		let span = trace_span!("Trigger", ?trigger);
		let _enter = span.enter();
		let result = match &trigger {
			Trigger::Modal { overlay } => modal::open(&session, overlay, element.dyn_ref::<HtmlElement>().cloned()),
			Trigger::Toggle { target, display } => toggle::flip(&session, target, *display).map(|shown| toggle::mark_expanded(&element, shown)),
			Trigger::ModalExit => modal::close_from_exit(&session, &element),
			Trigger::Xhr {
				url,
				target,
				method,
				mode,
				content_type,
			} => resolve_xhr_target(&session, target).map(|target| loader::spawn_load(&session, *method, url.clone(), target, *mode, *content_type)),
			Trigger::ModalPost { form, overlay } => {
				loader::spawn_submit_form(&session, form.clone(), overlay.clone(), element.dyn_ref::<HtmlElement>().cloned());
				Ok(())
			}
		};
		if let Err(error) = result {
			session.report(&error);
		}
	}) as Box<dyn FnMut(Event)>)
}

fn resolve_xhr_target(session: &Session, target: &XhrTarget) -> Result<LoadTarget> {
	Ok(match target {
		XhrTarget::Element(id) => LoadTarget::Id(id.clone()),
		XhrTarget::Overlay(id) => LoadTarget::Element(modal::content_region(session, &session.element_by_id(id)?)),
	})
}
