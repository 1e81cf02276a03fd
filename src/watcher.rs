//! Passive observation of load targets.
//!
//! One [`MutationObserver`] per session watches every element that ever received a fragment.
//! Each batch of child-list or character-data records triggers the callback once; repeated batches are harmless because registration is idempotent.
//!
//! [`MutationWatcher::flush`] delivers pending records synchronously, which lets the loader finish rehydration before its future resolves.

use crate::{Error, Result};
use core::cell::RefCell;
use js_sys::Array;
use std::rc::Rc;
use tracing::{trace, trace_span};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Element, MutationObserver, MutationObserverInit};

type OnMutation = Rc<RefCell<Box<dyn FnMut()>>>;

pub struct MutationWatcher {
	observer: MutationObserver,
	on_mutation: OnMutation,
	_callback: Closure<dyn FnMut(Array, MutationObserver)>,
	watched: RefCell<Vec<Element>>,
}

impl MutationWatcher {
	pub fn new(on_mutation: impl 'static + FnMut()) -> Result<Self> {
		let on_mutation: OnMutation = Rc::new(RefCell::new(Box::new(on_mutation)));
		let callback = {
			let on_mutation = Rc::clone(&on_mutation);
			Closure::wrap(Box::new(move |records: Array, _: MutationObserver| deliver(&on_mutation, records.length())) as Box<dyn FnMut(Array, MutationObserver)>)
		};
		let observer = MutationObserver::new(callback.as_ref().unchecked_ref()).map_err(|error| Error::dom(&error))?;
		Ok(Self {
			observer,
			on_mutation,
			_callback: callback,
			watched: RefCell::default(),
		})
	}

	/// Starts observing `target`. Returns `false` if it was already observed.
	pub fn watch(&self, target: &Element) -> Result<bool> {
		let mut watched = self.watched.borrow_mut();
		watched.retain(|element| element.is_connected());
		if watched.contains(target) {
			return Ok(false);
		}

		let options = MutationObserverInit::new();
		options.set_child_list(true);
		options.set_character_data(true);
		options.set_subtree(true);
		self.observer.observe_with_options(target, &options).map_err(|error| Error::dom(&error))?;
		watched.push(target.clone());
		trace!("Watching load target {:?}.", target.id());
		Ok(true)
	}

	#[must_use]
	pub fn is_watched(&self, target: &Element) -> bool {
		self.watched.borrow().contains(target)
	}

	/// Takes any queued records and, if there were some, runs the callback now instead of in a later microtask.
	/// Returns the number of records taken.
	pub fn flush(&self) -> u32 {
		let count = self.observer.take_records().length();
		if count > 0 {
			deliver(&self.on_mutation, count);
		}
		count
	}

	pub fn disconnect(&self) {
		self.observer.disconnect();
		self.watched.borrow_mut().clear();
	}
}

impl Drop for MutationWatcher {
	fn drop(&mut self) {
		self.observer.disconnect();
	}
}

fn deliver(on_mutation: &OnMutation, records: u32) {
	let span = trace_span!("Mutation batch", records);
	let _enter = span.enter();
	match on_mutation.try_borrow_mut() {
		Ok(mut on_mutation) => on_mutation(),
		Err(_) => trace!("Already handling a batch."),
	}
}
