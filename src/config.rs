//! Attribute names, class names and selectors recognised by a [`Session`](`crate::Session`).
//!
//! The defaults match the markup emitted by the server templates.
//! Every name is a `&'static str` so that a [`Config`] can be copied into closures freely.

/// The declarative vocabulary of one [`Session`](`crate::Session`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
	/// `data-modal="<overlay id>"` opens the overlay with that id.
	pub modal_attribute: &'static str,
	/// `data-toggle="<target id>"` flips the target's visibility.
	pub toggle_attribute: &'static str,
	/// Presence switches a toggle to the `table-row` variant.
	pub toggle_row_attribute: &'static str,
	pub xhr_url_attribute: &'static str,
	pub xhr_target_attribute: &'static str,
	/// `get`, `put`, `post` or `delete`.
	pub xhr_method_attribute: &'static str,
	/// `replace` or `append`.
	pub xhr_action_attribute: &'static str,
	/// `json` or `html`.
	pub xhr_content_type_attribute: &'static str,
	/// `data-modal-post="<form name>"`.
	pub modal_post_attribute: &'static str,
	/// `data-modal-post-target="<overlay id>"`.
	pub modal_post_target_attribute: &'static str,

	/// Marks exit controls inside an overlay.
	pub modal_exit_class: &'static str,
	/// Matches overlay containers, used to scope exit controls.
	pub overlay_selector: &'static str,
	/// Matches the region inside an overlay that receives fetched content.
	pub overlay_content_selector: &'static str,
	/// Set on an open overlay.
	pub overlay_open_class: &'static str,
	/// Set on `<body>` while any overlay is open.
	pub frozen_class: &'static str,

	/// Name of the object published on `window`.
	pub namespace: &'static str,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			modal_attribute: "data-modal",
			toggle_attribute: "data-toggle",
			toggle_row_attribute: "data-toggle-row",
			xhr_url_attribute: "data-xhr-url",
			xhr_target_attribute: "data-xhr-target",
			xhr_method_attribute: "data-xhr-method",
			xhr_action_attribute: "data-xhr-action",
			xhr_content_type_attribute: "data-xhr-content-type",
			modal_post_attribute: "data-modal-post",
			modal_post_target_attribute: "data-modal-post-target",

			modal_exit_class: "modal-exit",
			overlay_selector: ".modal",
			overlay_content_selector: ".modal-content",
			overlay_open_class: "open",
			frozen_class: "freeze",

			namespace: "APT",
		}
	}
}

impl Config {
	/// A selector matching every element that may carry at least one trigger.
	#[must_use]
	pub fn trigger_selector(&self) -> String {
		format!(
			"[{}], [{}], [{}], [{}], .{}",
			self.modal_attribute, self.toggle_attribute, self.xhr_url_attribute, self.modal_post_attribute, self.modal_exit_class
		)
	}

	/// First interactive descendant candidates, in document order, excluding exit controls.
	#[must_use]
	pub fn focusable_selector(&self) -> String {
		format!("a:not(.{}), input, select, button", self.modal_exit_class)
	}
}
