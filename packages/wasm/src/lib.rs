//! Content-script bindings: wire the capture [`Picker`] to the live page.
//!
//! The extension injects this module, calls `install` once, and drives the
//! picker through `copykit-toggle` custom events on `window`.

mod document;
mod host;
mod logging;

use anyhow::{anyhow, Context};
use copykit_capture::{CaptureConfig, OutputMode, Picker, ToggleEvent};
use document::BrowserDocument;
use host::{with_controller, BrowserHost};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, Event, KeyboardEvent};

pub(crate) type Controller = Picker<BrowserDocument, BrowserHost>;

/// Custom event the extension dispatches on `window`
const TOGGLE_EVENT: &str = "copykit-toggle";

thread_local! {
    static CONTROLLER: RefCell<Option<Rc<RefCell<Controller>>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Install the picker on this page. Safe to call more than once.
#[wasm_bindgen]
pub fn install(config_json: Option<String>) -> Result<(), JsValue> {
    installed(config_json.as_deref())
        .map(|_| ())
        .map_err(|err| JsValue::from_str(&format!("{:#}", err)))
}

/// Run one of the standalone capture modes (`cdn-only`, `js-only`, `page-full`)
#[wasm_bindgen(js_name = runStandalone)]
pub fn run_standalone(mode: &str) -> Result<(), JsValue> {
    let controller = installed(None).map_err(|err| JsValue::from_str(&format!("{:#}", err)))?;
    let mode = OutputMode::parse(mode);
    with_controller(&controller, |picker| picker.run_standalone(mode));
    Ok(())
}

/// Apply a toggle detail directly, bypassing the window event
#[wasm_bindgen]
pub fn toggle(detail: JsValue) -> Result<(), JsValue> {
    let controller = installed(None).map_err(|err| JsValue::from_str(&format!("{:#}", err)))?;
    dispatch_toggle(&controller, &detail);
    Ok(())
}

fn installed(config_json: Option<&str>) -> anyhow::Result<Weak<RefCell<Controller>>> {
    if let Some(existing) = CONTROLLER.with(|slot| slot.borrow().as_ref().map(Rc::downgrade)) {
        debug!("CopyKit already installed");
        return Ok(existing);
    }

    let config = match config_json {
        Some(json) => CaptureConfig::from_json(json).context("invalid CopyKit config")?,
        None => CaptureConfig::default(),
    };
    logging::init(&config.log_level);

    let window = web_sys::window().ok_or_else(|| anyhow!("no window in this context"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow!("window has no document"))?;

    let toast_id = config.toast_id.clone();
    let controller = Rc::new_cyclic(|weak: &Weak<RefCell<Controller>>| {
        let page = BrowserDocument::new(window.clone(), document.clone());
        let host = BrowserHost::new(window.clone(), document.clone(), toast_id, weak.clone());
        RefCell::new(Picker::new(page, host, config))
    });
    let weak = Rc::downgrade(&controller);

    listen_on_window(&window, weak.clone())?;
    CONTROLLER.with(|slot| *slot.borrow_mut() = Some(controller));

    info!("CopyKit installed");
    Ok(weak)
}

/// Page-lifetime listeners for the toggle event and the Escape key
fn listen_on_window(window: &web_sys::Window, controller: Weak<RefCell<Controller>>) -> anyhow::Result<()> {
    let on_toggle = controller.clone();
    let toggle = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let detail = event
            .dyn_ref::<CustomEvent>()
            .map(CustomEvent::detail)
            .unwrap_or(JsValue::UNDEFINED);
        dispatch_toggle(&on_toggle, &detail);
    });
    window
        .add_event_listener_with_callback(TOGGLE_EVENT, toggle.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("cannot listen for {}: {:?}", TOGGLE_EVENT, err))?;
    toggle.forget();

    let key_down = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        with_controller(&controller, |picker| picker.on_key_down(&event.key()));
    });
    window
        .add_event_listener_with_callback("keydown", key_down.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("cannot listen for keydown: {:?}", err))?;
    key_down.forget();

    Ok(())
}

fn dispatch_toggle(controller: &Weak<RefCell<Controller>>, detail: &JsValue) {
    let detail = detail_to_json(detail);
    let event = ToggleEvent::from_detail(detail.as_ref());
    debug!(?event, "Toggle received");
    with_controller(controller, |picker| picker.handle_toggle(event));
}

/// Convert an event detail into JSON; anything unserializable reads as absent
fn detail_to_json(detail: &JsValue) -> Option<Value> {
    if detail.is_undefined() || detail.is_null() {
        return None;
    }
    if let Some(flag) = detail.as_bool() {
        return Some(Value::Bool(flag));
    }
    let text: String = js_sys::JSON::stringify(detail).ok()?.into();
    serde_json::from_str(&text).ok()
}
