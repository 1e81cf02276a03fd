//! The session context and page bootstrap.

use crate::{
	chart::{self, ColorKind},
	config::Config,
	disclosure,
	loader::{self, LoadTarget},
	modal::{self, OverlayState},
	registry::{self, ListenerTable, RegistrationSummary},
	transport::{FetchTransport, Transport},
	trigger::{ContentType, InsertMode, Method},
	watcher::MutationWatcher,
	Error, Reporter, Result, TracingReporter,
};
use core::cell::RefCell;
use js_sys::{Array, Object, Reflect};
use std::rc::{Rc, Weak};
use tracing::{debug, info, instrument, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::future_to_promise;
use web_sys::{Document, Element, HtmlElement, Window};

/// Everything one page's widgets share: document, vocabulary, transport, overlay state and attached listeners.
///
/// Cloning is cheap and yields a handle to the same session.
/// Listeners hold only weak references, so dropping the last handle detaches every listener and stops observation.
///
/// Run at most one session per document at a time. Two live sessions would keep overwriting each other's initialized markers.
#[derive(Clone)]
pub struct Session(Rc<SessionInner>);

pub(crate) struct WeakSession(Weak<SessionInner>);
impl WeakSession {
	pub(crate) fn upgrade(&self) -> Option<Session> {
		self.0.upgrade().map(Session)
	}
}

pub(crate) struct SessionInner {
	document: Document,
	config: Config,
	transport: Box<dyn Transport>,
	reporter: Box<dyn Reporter>,
	overlay: RefCell<OverlayState>,
	listeners: RefCell<ListenerTable>,
	watcher: Result<MutationWatcher>,
}

impl Session {
	pub fn new(document: Document, config: Config, transport: impl 'static + Transport, reporter: impl 'static + Reporter) -> Result<Self> {
		let inner = Rc::new_cyclic(|weak: &Weak<SessionInner>| {
			let weak = WeakSession(weak.clone());
			SessionInner {
				document,
				config,
				transport: Box::new(transport),
				reporter: Box::new(reporter),
				overlay: RefCell::default(),
				listeners: RefCell::default(),
				watcher: MutationWatcher::new(move || {
					if let Some(session) = weak.upgrade() {
						registry::register_all(&session);
					}
				}),
			}
		});
		if let Err(error) = &inner.watcher {
			return Err(error.clone());
		}
		Ok(Self(inner))
	}

	/// A session over `window`'s document with default vocabulary, `fetch` and `tracing` reporting.
	pub fn for_window(window: &Window) -> Result<Self> {
		let document = window.document().ok_or_else(|| Error::Dom("window has no document".to_owned()))?;
		Self::new(document, Config::default(), FetchTransport, TracingReporter)
	}

	#[must_use]
	pub fn document(&self) -> &Document {
		&self.0.document
	}

	#[must_use]
	pub fn config(&self) -> &Config {
		&self.0.config
	}

	pub fn report(&self, error: &Error) {
		self.0.reporter.report(error);
	}

	pub(crate) fn transport(&self) -> &dyn Transport {
		&*self.0.transport
	}

	pub(crate) fn overlay(&self) -> &RefCell<OverlayState> {
		&self.0.overlay
	}

	pub(crate) fn listeners(&self) -> &RefCell<ListenerTable> {
		&self.0.listeners
	}

	pub(crate) fn downgrade(&self) -> WeakSession {
		WeakSession(Rc::downgrade(&self.0))
	}

	pub(crate) fn element_by_id(&self, id: &str) -> Result<Element> {
		self.document().get_element_by_id(id).ok_or_else(|| Error::TargetNotFound { id: id.to_owned() })
	}

	pub(crate) fn body(&self) -> Result<HtmlElement> {
		self.document().body().ok_or_else(|| Error::Dom("document has no body".to_owned()))
	}

	fn watcher(&self) -> Result<&MutationWatcher> {
		self.0.watcher.as_ref().map_err(Clone::clone)
	}

	/// Puts `target` under mutation observation. Returns `false` if it already was.
	pub fn watch(&self, target: &Element) -> Result<bool> {
		self.watcher()?.watch(target)
	}

	/// Runs rehydration for mutations that are still queued. See [`MutationWatcher::flush`].
	pub(crate) fn flush_mutations(&self) -> u32 {
		self.watcher().map_or(0, MutationWatcher::flush)
	}

	#[must_use]
	pub fn is_watched(&self, target: &Element) -> bool {
		self.watcher().map_or(false, |watcher| watcher.is_watched(target))
	}

	/// Number of click listeners currently owned by this session.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.0.listeners.borrow().len()
	}

	pub fn register_all(&self) -> RegistrationSummary {
		registry::register_all(self)
	}

	pub fn register_subtree(&self, root: &Element) -> RegistrationSummary {
		registry::register_subtree(self, root)
	}

	pub async fn load(&self, method: Method, url: &str, target: impl Into<LoadTarget>, mode: InsertMode) -> Result<()> {
		loader::load(self, method, url, target.into(), mode, ContentType::Html).await
	}

	pub async fn get_json(&self, url: &str) -> Result<JsValue> {
		loader::get_json(self, url).await
	}

	pub async fn submit_form(&self, form_name: &str, overlay_id: &str) -> Result<()> {
		loader::submit_form(self, form_name, overlay_id, modal::focused_element(self)).await
	}

	pub fn open_modal(&self, overlay_id: &str, opener: Option<HtmlElement>) -> Result<()> {
		modal::open(self, overlay_id, opener)
	}

	pub fn close_modal(&self) -> Result<()> {
		modal::close(self, None)
	}

	/// Registers all widgets once the document has loaded, immediately if it already has.
	#[instrument(skip(self))]
	pub fn start(&self) -> Result<()> {
		if self.document().ready_state() == "complete" {
			self.initialize();
			return Ok(());
		}

		let window = self.document().default_view().ok_or_else(|| Error::Dom("document has no window".to_owned()))?;
		let weak = self.downgrade();
		let on_load = Closure::once_into_js(move || {
			if let Some(session) = weak.upgrade() {
				session.initialize();
			}
		});
		window
			.add_event_listener_with_callback("load", on_load.unchecked_ref())
			.map_err(|error| Error::dom(&error))?;
		debug!("Deferred registration until `load`.");
		Ok(())
	}

	fn initialize(&self) {
		let summary = self.register_all();
		let disclosures = disclosure::wire_all(self);
		info!(attached = summary.attached, failed = summary.failed, disclosures, "Widgets initialized.");
	}

	/// Publishes `loadIntoElement`, `modalPost` and `chartColors` on `window[config.namespace]` for inline handlers.
	///
	/// Existing members of that object are kept. The functions hold only weak references to the session,
	/// and report instead of throwing once it is gone.
	pub fn publish_namespace(&self, window: &Window) -> Result<()> {
		let key = JsValue::from_str(self.config().namespace);
		let existing = Reflect::get(window, &key).map_err(|error| Error::dom(&error))?;
		let namespace: Object = existing.dyn_into().unwrap_or_else(|_| Object::new());

		let weak = self.downgrade();
		let load_into_element = Closure::wrap(Box::new(move |method: JsValue, url: JsValue, target: JsValue, mode: JsValue| -> JsValue {
			let session = weak.upgrade();
			future_to_promise(async move {
				let session = match session {
					Some(session) => session,
					None => return Ok(dropped()),
				};
				let result = match load_arguments(&method, &url, &target, &mode) {
					Ok((method, url, target, mode)) => session.load(method, &url, target, mode).await,
					Err(error) => Err(error),
				};
				Ok(JsValue::from_bool(session.settle(result)))
			})
			.into()
		}) as Box<dyn FnMut(JsValue, JsValue, JsValue, JsValue) -> JsValue>);

		let weak = self.downgrade();
		let modal_post = Closure::wrap(Box::new(move |form_name: JsValue, overlay_id: JsValue| -> JsValue {
			let session = weak.upgrade();
			future_to_promise(async move {
				let session = match session {
					Some(session) => session,
					None => return Ok(dropped()),
				};
				let result = match (form_name.as_string(), overlay_id.as_string()) {
					(Some(form_name), Some(overlay_id)) => session.submit_form(&form_name, &overlay_id).await,
					_ => Err(Error::Dom("modalPost expects a form name and an overlay id".to_owned())),
				};
				Ok(JsValue::from_bool(session.settle(result)))
			})
			.into()
		}) as Box<dyn FnMut(JsValue, JsValue) -> JsValue>);

		let chart_colors = Closure::wrap(Box::new(|kind: JsValue, count: JsValue| -> Array {
			let kind = ColorKind::from_name(&kind.as_string().unwrap_or_default());
			let count = count.as_f64().map_or(0, chart::count_from_script);
			chart::chart_colors(kind, count).into_iter().map(JsValue::from_str).collect()
		}) as Box<dyn FnMut(JsValue, JsValue) -> Array>);

		for (name, function) in [
			("loadIntoElement", load_into_element.into_js_value()),
			("modalPost", modal_post.into_js_value()),
			("chartColors", chart_colors.into_js_value()),
		]
		.iter()
		{
			Reflect::set(&namespace, &JsValue::from_str(name), function).map_err(|error| Error::dom(&error))?;
		}
		Reflect::set(window, &key, &namespace).map_err(|error| Error::dom(&error))?;
		debug!("Published `window.{}`.", self.config().namespace);
		Ok(())
	}

	fn settle(&self, result: Result<()>) -> bool {
		match result {
			Ok(()) => true,
			Err(error) => {
				self.report(&error);
				false
			}
		}
	}
}

impl Drop for SessionInner {
	fn drop(&mut self) {
		if let Ok(watcher) = &self.watcher {
			watcher.disconnect();
		}
		debug!("Session dropped with {} listener(s) attached.", self.listeners.borrow().len());
	}
}

fn dropped() -> JsValue {
	warn!("Namespace function called after its session was dropped.");
	JsValue::FALSE
}

fn load_arguments(method: &JsValue, url: &JsValue, target: &JsValue, mode: &JsValue) -> Result<(Method, String, LoadTarget, InsertMode)> {
	let method = match method.as_string() {
		None => Method::Get,
		Some(method) => method.parse().map_err(|_| Error::InvalidAttribute { attribute: "method", value: method })?,
	};
	let url = url.as_string().ok_or_else(|| Error::InvalidAttribute {
		attribute: "url",
		value: format!("{:?}", url),
	})?;
	let target = if let Some(id) = target.as_string() {
		LoadTarget::Id(id)
	} else if let Some(element) = target.dyn_ref::<Element>() {
		LoadTarget::Element(element.clone())
	} else {
		return Err(Error::InvalidAttribute {
			attribute: "target",
			value: format!("{:?}", target),
		});
	};
	let mode = match mode.as_string() {
		None => InsertMode::Replace,
		Some(mode) => mode.parse().map_err(|_| Error::InvalidAttribute { attribute: "mode", value: mode })?,
	};
	Ok((method, url, target, mode))
}

#[cfg(feature = "autostart")]
mod autostart {
	use super::Session;
	use core::cell::RefCell;
	use tracing::error;
	use wasm_bindgen::prelude::wasm_bindgen;

	thread_local! {
		static PAGE_SESSION: RefCell<Option<Session>> = RefCell::new(None);
	}

	#[wasm_bindgen(start)]
	pub fn start() {
		let window = match web_sys::window() {
			Some(window) => window,
			None => return error!("rehydrate-dom: autostart outside of a window context."),
		};
		let session = Session::for_window(&window).and_then(|session| {
			session.publish_namespace(&window)?;
			session.start()?;
			Ok(session)
		});
		match session {
			Ok(session) => PAGE_SESSION.with(|page_session| *page_session.borrow_mut() = Some(session)),
			Err(error) => error!("rehydrate-dom: failed to start: {}", error),
		}
	}
}
