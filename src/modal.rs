//! The overlay controller.
//!
//! At most one overlay is open per session. Opening a second one closes the first.
//! The body's frozen class is set on every open and removed by any close that leaves no overlay open,
//! so unbalanced open/close sequences can't leave the page frozen.

use crate::{Error, Result, Session};
use tracing::{debug, trace};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

/// The open overlay and the element focus returns to once it closes.
#[derive(Debug, Default)]
pub(crate) struct OverlayState {
	open: Option<Element>,
	opener: Option<HtmlElement>,
}

/// Opens the overlay with id `overlay_id`, recording `opener` for focus restoration.
pub fn open(session: &Session, overlay_id: &str, opener: Option<HtmlElement>) -> Result<()> {
	let overlay = session.element_by_id(overlay_id)?;
	let config = session.config();

	let previous = session.overlay().borrow_mut().open.take();
	if let Some(previous) = previous.filter(|previous| previous != &overlay) {
		debug!("Closing overlay {:?} in favour of {:?}.", previous.id(), overlay_id);
		previous.class_list().remove_1(config.overlay_open_class).map_err(|error| Error::dom(&error))?;
	}

	session.body()?.class_list().add_1(config.frozen_class).map_err(|error| Error::dom(&error))?;
	overlay.class_list().add_1(config.overlay_open_class).map_err(|error| Error::dom(&error))?;

	let mut state = session.overlay().borrow_mut();
	state.open = Some(overlay);
	state.opener = opener;
	trace!("Opened overlay {:?}.", overlay_id);
	Ok(())
}

/// Closes `overlay`, or the session's open overlay if [`None`].
///
/// Focus returns to the recorded opener only if it is still in the document. Otherwise focus is left alone.
pub fn close(session: &Session, overlay: Option<Element>) -> Result<()> {
	let config = session.config();

	let (opener, still_open) = {
		let mut state = session.overlay().borrow_mut();
		let closes_tracked = match (&overlay, &state.open) {
			(None, _) => true,
			(Some(overlay), Some(open)) => overlay == open,
			(Some(_), None) => false,
		};
		let overlay = overlay.or_else(|| state.open.clone());
		if let Some(overlay) = &overlay {
			overlay.class_list().remove_1(config.overlay_open_class).map_err(|error| Error::dom(&error))?;
		}
		let opener = if closes_tracked {
			state.open = None;
			state.opener.take()
		} else {
			None
		};
		(opener, state.open.is_some())
	};

	if still_open {
		debug!("Another overlay is still open; keeping the page frozen.");
	} else {
		session.body()?.class_list().remove_1(config.frozen_class).map_err(|error| Error::dom(&error))?;
	}

	match opener {
		Some(opener) if opener.is_connected() => opener.focus().map_err(|error| Error::dom(&error)),
		Some(_) => {
			debug!("Overlay opener left the document; not restoring focus.");
			Ok(())
		}
		None => Ok(()),
	}
}

/// Closes the overlay containing `exit`, or the open overlay if `exit` isn't inside one.
pub(crate) fn close_from_exit(session: &Session, exit: &Element) -> Result<()> {
	let overlay = exit.closest(session.config().overlay_selector).map_err(|error| Error::dom(&error))?;
	close(session, overlay)
}

/// Where fetched content goes inside `overlay`. Falls back to the overlay itself.
#[must_use]
pub fn content_region(session: &Session, overlay: &Element) -> Element {
	overlay
		.query_selector(session.config().overlay_content_selector)
		.ok()
		.flatten()
		.unwrap_or_else(|| overlay.clone())
}

/// The currently open overlay, if any.
#[must_use]
pub fn open_overlay(session: &Session) -> Option<Element> {
	session.overlay().borrow().open.clone()
}

/// The element currently focused, as a prospective opener.
pub(crate) fn focused_element(session: &Session) -> Option<HtmlElement> {
	session.document().active_element().and_then(|element| element.dyn_into::<HtmlElement>().ok())
}
