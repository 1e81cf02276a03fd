use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

mod web_support_;
use web_support_::{by_id, session, CollectingReporter, Fixture, MockTransport};

fn display(id: &str) -> String {
	by_id(id).style().get_property_value("display").unwrap()
}

#[wasm_bindgen_test]
fn two_clicks_restore_visibility() {
	let _fixture = Fixture::new(r##"<a href="#" id="tg-trigger" data-toggle="tg-target">More</a><div id="tg-target" style="display:none">Details</div>"##);
	let session = session(&MockTransport::default(), &CollectingReporter::default());
	session.register_all();

	by_id("tg-trigger").click();
	assert_eq!(display("tg-target"), "block");
	assert_eq!(by_id("tg-trigger").get_attribute("aria-expanded").as_deref(), Some("true"));

	by_id("tg-trigger").click();
	assert_eq!(display("tg-target"), "none");
	assert_eq!(by_id("tg-trigger").get_attribute("aria-expanded").as_deref(), Some("false"));
}

#[wasm_bindgen_test]
fn table_rows_use_table_row() {
	let _fixture = Fixture::new(
		r##"<table><tbody>
			<tr><td><button id="tg-row-trigger" data-toggle="tg-row" data-toggle-row>Expand</button></td></tr>
			<tr id="tg-row" style="display:none"><td>Hidden</td></tr>
		</tbody></table>"##,
	);
	let session = session(&MockTransport::default(), &CollectingReporter::default());
	session.register_all();

	by_id("tg-row-trigger").click();
	assert_eq!(display("tg-row"), "table-row");
	by_id("tg-row-trigger").click();
	assert_eq!(display("tg-row"), "none");
}

#[wasm_bindgen_test]
fn stylesheet_hidden_target_opens_first() {
	let _fixture = Fixture::new(
		r##"<style>#tg-styled { display: none; }</style>
		<button id="tg-styled-trigger" data-toggle="tg-styled"></button><div id="tg-styled"></div>"##,
	);
	let session = session(&MockTransport::default(), &CollectingReporter::default());
	session.register_all();

	by_id("tg-styled-trigger").click();
	assert_eq!(display("tg-styled"), "block");
}

#[wasm_bindgen_test]
fn visible_target_hides_first() {
	let _fixture = Fixture::new(r##"<button id="tg-shown-trigger" data-toggle="tg-shown"></button><div id="tg-shown">Shown</div>"##);
	let session = session(&MockTransport::default(), &CollectingReporter::default());
	session.register_all();

	by_id("tg-shown-trigger").click();
	assert_eq!(display("tg-shown"), "none");
}

#[wasm_bindgen_test]
fn pairs_are_independent() {
	let _fixture = Fixture::new(
		r##"<button id="tg-a" data-toggle="tg-a-target"></button><div id="tg-a-target" style="display:none"></div>
		<button id="tg-b" data-toggle="tg-b-target"></button><div id="tg-b-target" style="display:none"></div>"##,
	);
	let session = session(&MockTransport::default(), &CollectingReporter::default());
	session.register_all();

	by_id("tg-a").click();
	assert_eq!(display("tg-a-target"), "block");
	assert_eq!(display("tg-b-target"), "none");
}

#[wasm_bindgen_test]
fn vanished_target_is_reported() {
	let _fixture = Fixture::new(r##"<button id="tg-orphan" data-toggle="tg-gone"></button><div id="tg-gone"></div>"##);
	let reporter = CollectingReporter::default();
	let session = session(&MockTransport::default(), &reporter);
	session.register_all();

	by_id("tg-gone").remove();
	by_id("tg-orphan").click();
	assert_eq!(reporter.errors(), vec![rehydrate_dom::Error::TargetNotFound { id: "tg-gone".to_owned() }]);
}
