use crate::{trigger::ToggleDisplay, Error, Result, Session};
use tracing::trace;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

/// Flips the visibility of the element with id `target_id` and returns whether it is now shown.
///
/// The current state is read from the inline style, or from the computed style if no inline `display` is set.
pub fn flip(session: &Session, target_id: &str, display: ToggleDisplay) -> Result<bool> {
	let target: HtmlElement = session
		.element_by_id(target_id)?
		.dyn_into()
		.map_err(|element| Error::Dom(format!("toggle target {:?} is not an HTML element: {:?}", target_id, element)))?;

	let style = target.style();
	let mut current = style.get_property_value("display").map_err(|error| Error::dom(&error))?;
	if current.is_empty() {
		current = computed_display(&target).unwrap_or_default();
	}

	let show = current == "none";
	style
		.set_property("display", if show { display.shown() } else { "none" })
		.map_err(|error| Error::dom(&error))?;
	trace!(target_id, show, "Toggled.");
	Ok(show)
}

pub(crate) fn mark_expanded(trigger: &Element, shown: bool) {
	let _ = trigger.set_attribute("aria-expanded", if shown { "true" } else { "false" });
}

fn computed_display(element: &Element) -> Option<String> {
	web_sys::window()?
		.get_computed_style(element)
		.ok()
		.flatten()?
		.get_property_value("display")
		.ok()
}
