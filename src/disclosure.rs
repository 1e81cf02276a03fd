//! Page-chrome disclosures: the sidebar's "More Options" and the filter grid's "More Filters".
//!
//! Unlike registry triggers these are wired once at bootstrap, against fixed selectors.
//! Everything except the toggle itself is looked up on each click, so a re-rendered part doesn't need re-wiring.

use crate::{Error, Result, Session};
use tracing::{debug, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Element, Event, HtmlElement};

pub const INITIALIZED_ATTRIBUTE: &str = "data-disclosure-initialized";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disclosure {
	pub name: &'static str,
	pub toggle: &'static str,
	/// `(selector, class)` pairs toggled on each click.
	pub class_toggles: &'static [(&'static str, &'static str)],
	/// The disclosure counts as expanded while this element has this class.
	pub expanded_when: (&'static str, &'static str),
	/// Gets `display: block`/`none` to match, keeping hidden items out of the tab order.
	pub display_target: Option<&'static str>,
}

pub const SIDEBAR: Disclosure = Disclosure {
	name: "sidebar",
	toggle: "#sidebarToggle",
	class_toggles: &[("#sidebarSubnav", "is-sr-only"), (".more-options", "is-hidden"), (".less-options", "is-hidden")],
	expanded_when: (".more-options", "is-hidden"),
	display_target: Some("#sidebarSubnav"),
};

pub const FILTERS_GRID: Disclosure = Disclosure {
	name: "filters grid",
	toggle: ".filters-grid .filter-toggle",
	class_toggles: &[
		(".filters-grid", "is-open"),
		("#gridFiltersAll", "is-sr-only"),
		(".filters-grid .more-filters", "is-hidden"),
		(".filters-grid .less-filters", "is-hidden"),
	],
	expanded_when: (".filters-grid", "is-open"),
	display_target: None,
};

/// Wires every known disclosure present on the page. Returns how many were newly wired.
pub fn wire_all(session: &Session) -> usize {
	[SIDEBAR, FILTERS_GRID]
		.iter()
		.filter(|disclosure| match wire(session, disclosure) {
			Ok(wired) => wired,
			Err(error) => {
				session.report(&error);
				false
			}
		})
		.count()
}

/// Returns `false` if the page has no such toggle or it is already wired.
pub fn wire(session: &Session, disclosure: &Disclosure) -> Result<bool> {
	let toggle = match session.document().query_selector(disclosure.toggle).map_err(|error| Error::dom(&error))? {
		Some(toggle) => toggle,
		None => {
			debug!("No {} on this page.", disclosure.name);
			return Ok(false);
		}
	};
	if session.listeners().borrow().is_attached(&toggle, INITIALIZED_ATTRIBUTE) {
		return Ok(false);
	}

	let weak = session.downgrade();
	let disclosure = *disclosure;
	let clicked = toggle.clone();
	let handler = Closure::wrap(Box::new(move |event: Event| {
		event.prevent_default();
		if let Some(session) = weak.upgrade() {
			if let Err(error) = flip(&session, &disclosure, &clicked) {
				session.report(&error);
			}
		}
	}) as Box<dyn FnMut(Event)>);
	session.listeners().borrow_mut().attach(&toggle, INITIALIZED_ATTRIBUTE, handler)?;
	Ok(true)
}

/// Flips `disclosure` and returns whether it is now expanded.
pub fn flip(session: &Session, disclosure: &Disclosure, toggle: &Element) -> Result<bool> {
	let document = session.document();
	for &(selector, class) in disclosure.class_toggles {
		match document.query_selector(selector).map_err(|error| Error::dom(&error))? {
			Some(part) => {
				part.class_list().toggle(class).map_err(|error| Error::dom(&error))?;
			}
			None => warn!("{} part {:?} is missing.", disclosure.name, selector),
		}
	}

	let (selector, class) = disclosure.expanded_when;
	let expanded = document
		.query_selector(selector)
		.map_err(|error| Error::dom(&error))?
		.map_or(false, |element| element.class_list().contains(class));

	toggle
		.set_attribute("aria-expanded", if expanded { "true" } else { "false" })
		.map_err(|error| Error::dom(&error))?;
	if let Some(selector) = disclosure.display_target {
		if let Some(target) = document.query_selector(selector).ok().flatten().and_then(|target| target.dyn_into::<HtmlElement>().ok()) {
			target
				.style()
				.set_property("display", if expanded { "block" } else { "none" })
				.map_err(|error| Error::dom(&error))?;
		}
	}
	trace!(disclosure = disclosure.name, expanded, "Flipped.");
	Ok(expanded)
}
