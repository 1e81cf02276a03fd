use rehydrate_dom::modal;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

mod web_support_;
use web_support_::{body_is_frozen, by_id, document, session, CollectingReporter, Fixture, MockTransport};

fn is_open(id: &str) -> bool {
	by_id(id).class_list().contains("open")
}

#[wasm_bindgen_test]
fn open_and_close_balance_the_freeze() {
	let _fixture = Fixture::new(
		r##"<button id="md-opener" data-modal="md-overlay">Open</button>
		<div id="md-overlay" class="modal"><div class="modal-content"><a href="#" id="md-exit" class="modal-exit">Close</a></div></div>"##,
	);
	let reporter = CollectingReporter::default();
	let session = session(&MockTransport::default(), &reporter);
	session.register_all();

	for _ in 0..2 {
		by_id("md-opener").click();
		assert!(is_open("md-overlay"));
		assert!(body_is_frozen());

		by_id("md-exit").click();
		assert!(!is_open("md-overlay"));
		assert!(!body_is_frozen());
	}
	assert!(reporter.errors().is_empty());
}

#[wasm_bindgen_test]
fn a_second_open_closes_the_first() {
	let _fixture = Fixture::new(
		r##"<button id="md-first-opener" data-modal="md-first">First</button><button id="md-second-opener" data-modal="md-second">Second</button>
		<div id="md-first" class="modal"></div><div id="md-second" class="modal"></div>"##,
	);
	let session = session(&MockTransport::default(), &CollectingReporter::default());
	session.register_all();

	by_id("md-first-opener").click();
	by_id("md-first-opener").click();
	by_id("md-second-opener").click();
	assert!(!is_open("md-first"));
	assert!(is_open("md-second"));
	assert_eq!(modal::open_overlay(&session).map(|overlay| overlay.id()).as_deref(), Some("md-second"));

	session.close_modal().unwrap();
	assert!(!is_open("md-second"));
	assert!(!body_is_frozen(), "one close after several opens must unfreeze");
	assert!(modal::open_overlay(&session).is_none());
}

#[wasm_bindgen_test]
fn focus_returns_to_the_opener() {
	let _fixture = Fixture::new(
		r##"<button id="md-focus-opener" data-modal="md-focus">Open</button>
		<div id="md-focus" class="modal"><input id="md-focus-input"><button id="md-focus-exit" class="modal-exit">Close</button></div>"##,
	);
	let session = session(&MockTransport::default(), &CollectingReporter::default());
	session.register_all();

	by_id("md-focus-opener").click();
	by_id("md-focus-input").focus().unwrap();
	by_id("md-focus-exit").click();

	assert_eq!(document().active_element().map(|element| element.id()).as_deref(), Some("md-focus-opener"));
}

#[wasm_bindgen_test]
fn removed_opener_leaves_focus_alone() {
	let _fixture = Fixture::new(
		r##"<button id="md-gone-opener" data-modal="md-gone">Open</button>
		<div id="md-gone" class="modal"><input id="md-gone-input"><button id="md-gone-exit" class="modal-exit">Close</button></div>"##,
	);
	let reporter = CollectingReporter::default();
	let session = session(&MockTransport::default(), &reporter);
	session.register_all();

	by_id("md-gone-opener").click();
	by_id("md-gone-opener").remove();
	by_id("md-gone-input").focus().unwrap();
	by_id("md-gone-exit").click();

	assert!(!is_open("md-gone"));
	assert!(!body_is_frozen());
	assert!(reporter.errors().is_empty());
	assert_eq!(document().active_element().map(|element| element.id()).as_deref(), Some("md-gone-input"));
}

#[wasm_bindgen_test]
fn exit_controls_close_their_own_overlay() {
	let _fixture = Fixture::new(
		r##"<div id="md-scoped" class="modal"><button id="md-scoped-exit" class="modal-exit">Close</button></div>
		<div id="md-other" class="modal"></div>"##,
	);
	let session = session(&MockTransport::default(), &CollectingReporter::default());
	session.register_all();

	session.open_modal("md-scoped", None).unwrap();
	by_id("md-scoped-exit").click();
	assert!(!is_open("md-scoped"));
	assert!(modal::open_overlay(&session).is_none());
}

#[wasm_bindgen_test]
fn free_standing_exit_closes_the_open_overlay() {
	let _fixture = Fixture::new(r##"<button id="md-loose-exit" class="modal-exit">Close</button><div id="md-loose" class="modal"></div>"##);
	let session = session(&MockTransport::default(), &CollectingReporter::default());
	session.register_all();

	session.open_modal("md-loose", None).unwrap();
	by_id("md-loose-exit").click();
	assert!(!is_open("md-loose"));
	assert!(!body_is_frozen());
}

#[wasm_bindgen_test]
fn closing_with_nothing_open_is_harmless() {
	let _fixture = Fixture::new("");
	let reporter = CollectingReporter::default();
	let session = session(&MockTransport::default(), &reporter);

	session.close_modal().unwrap();
	assert!(!body_is_frozen());
	assert!(reporter.errors().is_empty());
}

#[wasm_bindgen_test]
fn missing_overlay_is_an_error() {
	let _fixture = Fixture::new("");
	let session = session(&MockTransport::default(), &CollectingReporter::default());

	assert_eq!(
		session.open_modal("md-nowhere", None),
		Err(rehydrate_dom::Error::TargetNotFound { id: "md-nowhere".to_owned() })
	);
	assert!(!body_is_frozen());
}

#[wasm_bindgen_test]
fn closing_a_stale_overlay_keeps_the_open_one_frozen() {
	let _fixture = Fixture::new(
		r##"<div id="md-stale" class="modal"><button id="md-stale-exit" class="modal-exit">Close</button></div>
		<div id="md-current" class="modal"></div>"##,
	);
	let session = session(&MockTransport::default(), &CollectingReporter::default());
	session.register_all();

	session.open_modal("md-stale", None).unwrap();
	session.open_modal("md-current", None).unwrap();
	by_id("md-stale-exit").click();

	assert!(is_open("md-current"));
	assert!(body_is_frozen());
	assert_eq!(modal::open_overlay(&session).map(|overlay| overlay.id()).as_deref(), Some("md-current"));

	session.close_modal().unwrap();
	assert!(!body_is_frozen());
}
