#![allow(dead_code)]

use js_sys::{Function, Promise};
use rehydrate_dom::{
	transport::{Request, Response, Transport, TransportFuture},
	Config, Error, Reporter, Session,
};
use std::{
	cell::RefCell,
	collections::{HashMap, VecDeque},
	rc::Rc,
	sync::Once,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, Document, HtmlElement};

static LOG_INITIALIZED: Once = Once::new();

pub fn init_logging() {
	//TODO: Fail on unexpected warnings or errors.
	LOG_INITIALIZED.call_once(tracing_wasm::set_as_global_default);
}

pub fn document() -> Document {
	window().unwrap().document().unwrap()
}

pub fn by_id(id: &str) -> HtmlElement {
	document().get_element_by_id(id).unwrap_or_else(|| panic!("#{} missing", id)).dyn_into().unwrap()
}

pub fn body_is_frozen() -> bool {
	document().body().unwrap().class_list().contains("freeze")
}

/// Markup appended to `<body>` for the duration of one test.
pub struct Fixture {
	pub root: HtmlElement,
}
impl Fixture {
	pub fn new(html: &str) -> Self {
		let root: HtmlElement = document().create_element("div").unwrap().dyn_into().unwrap();
		root.set_inner_html(html);
		document().body().unwrap().append_child(&root).unwrap();
		Self { root }
	}
}
impl Drop for Fixture {
	fn drop(&mut self) {
		self.root.remove();
		let _ = document().body().unwrap().class_list().remove_1("freeze");
	}
}

#[derive(Clone, Default)]
pub struct CollectingReporter(Rc<RefCell<Vec<Error>>>);
impl CollectingReporter {
	pub fn errors(&self) -> Vec<Error> {
		self.0.borrow().clone()
	}
}
impl Reporter for CollectingReporter {
	fn report(&self, error: &Error) {
		self.0.borrow_mut().push(error.clone())
	}
}

/// Answers requests from a routing table keyed by URL. Unrouted URLs fail as network errors.
#[derive(Clone, Default)]
pub struct MockTransport {
	routes: Rc<RefCell<HashMap<String, (u16, String)>>>,
	held: Rc<RefCell<HashMap<String, VecDeque<Promise>>>>,
	requests: Rc<RefCell<Vec<Request>>>,
}

pub struct Release(Function);
impl Release {
	pub fn release(self) {
		self.0.call0(&JsValue::NULL).unwrap();
	}
}

impl MockTransport {
	pub fn respond(&self, url: &str, status: u16, body: &str) -> &Self {
		self.routes.borrow_mut().insert(url.to_owned(), (status, body.to_owned()));
		self
	}

	/// Delays the next response for `url` until the returned [`Release`] is released.
	pub fn hold(&self, url: &str) -> Release {
		let mut release = None;
		let promise = Promise::new(&mut |resolve, _reject| release = Some(resolve));
		self.held.borrow_mut().entry(url.to_owned()).or_default().push_back(promise);
		Release(release.unwrap())
	}

	pub fn requests(&self) -> Vec<Request> {
		self.requests.borrow().clone()
	}
}

impl Transport for MockTransport {
	fn send(&self, request: Request) -> TransportFuture {
		self.requests.borrow_mut().push(request.clone());
		let route = self.routes.borrow().get(&request.url).cloned();
		let held = self.held.borrow_mut().get_mut(&request.url).and_then(VecDeque::pop_front);
		Box::pin(async move {
			if let Some(held) = held {
				JsFuture::from(held).await.unwrap();
			}
			match route {
				Some((status, body)) => Ok(Response { status, url: request.url, body }),
				None => Err(Error::Network(format!("no route for {}", request.url))),
			}
		})
	}
}

pub fn session(transport: &MockTransport, reporter: &CollectingReporter) -> Session {
	init_logging();
	Session::new(document(), Config::default(), transport.clone(), reporter.clone()).unwrap()
}

/// Resolves after every queued microtask (spawned loads, mutation callbacks) has run.
pub async fn settle() {
	let promise = Promise::new(&mut |resolve, _reject| {
		window().unwrap().set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0).unwrap();
	});
	JsFuture::from(promise).await.unwrap();
}
