//! Host capabilities backed by the browser: listeners, clipboard, toast,
//! alerts and the extension runtime's deactivate message.

use crate::document::log_js_error;
use crate::Controller;
use copykit_capture::dom::Point;
use copykit_capture::{ClipboardError, CopyTicket, EventDisposition, Host, Listener};
use std::cell::RefCell;
use std::rc::Weak;
use std::time::Duration;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{HtmlElement, MouseEvent, Window};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = sendMessage, catch)]
    fn send_runtime_message(message: &JsValue) -> Result<JsValue, JsValue>;
}

/// Run `f` against the picker if it is still alive and not already borrowed
pub(crate) fn with_controller<R>(
    controller: &Weak<RefCell<Controller>>,
    f: impl FnOnce(&mut Controller) -> R,
) -> Option<R> {
    let controller = controller.upgrade()?;
    let mut picker = match controller.try_borrow_mut() {
        Ok(picker) => picker,
        Err(_) => {
            warn!("Picker busy; dropping re-entrant event");
            return None;
        }
    };
    Some(f(&mut picker))
}

pub struct BrowserHost {
    window: Window,
    document: web_sys::Document,
    toast_id: String,
    controller: Weak<RefCell<Controller>>,
    pointer_move: Closure<dyn FnMut(MouseEvent)>,
    click: Closure<dyn FnMut(MouseEvent)>,
}

impl BrowserHost {
    pub fn new(
        window: Window,
        document: web_sys::Document,
        toast_id: String,
        controller: Weak<RefCell<Controller>>,
    ) -> Self {
        let on_move = controller.clone();
        let pointer_move = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let point = Point::new(f64::from(event.client_x()), f64::from(event.client_y()));
            with_controller(&on_move, |picker| picker.on_pointer_move(point));
        });

        let on_click = controller.clone();
        let click = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let disposition = with_controller(&on_click, |picker| picker.on_click());
            if disposition == Some(EventDisposition::Consumed) {
                event.prevent_default();
                event.stop_propagation();
            }
        });

        Self {
            window,
            document,
            toast_id,
            controller,
            pointer_move,
            click,
        }
    }

    fn callback(&self, listener: Listener) -> &js_sys::Function {
        match listener {
            Listener::PointerMove => self.pointer_move.as_ref().unchecked_ref(),
            Listener::Click => self.click.as_ref().unchecked_ref(),
        }
    }

    fn remove_toast(&self) {
        if let Some(existing) = self.document.get_element_by_id(&self.toast_id) {
            existing.remove();
        }
    }
}

impl Host for BrowserHost {
    fn subscribe(&mut self, listener: Listener) {
        let result = self.document.add_event_listener_with_callback_and_bool(
            listener.event_name(),
            self.callback(listener),
            listener.use_capture(),
        );
        if let Err(err) = result {
            warn!(error = ?err, event = listener.event_name(), "Cannot add listener");
        }
    }

    fn unsubscribe(&mut self, listener: Listener) {
        let result = self.document.remove_event_listener_with_callback_and_bool(
            listener.event_name(),
            self.callback(listener),
            listener.use_capture(),
        );
        if let Err(err) = result {
            warn!(error = ?err, event = listener.event_name(), "Cannot remove listener");
        }
    }

    fn write_clipboard(&mut self, ticket: CopyTicket, text: String) {
        let promise = self.window.navigator().clipboard().write_text(&text);
        let controller = self.controller.clone();
        spawn_local(async move {
            let result = JsFuture::from(promise)
                .await
                .map(|_| ())
                .map_err(|err| ClipboardError(format!("{:?}", err)));
            with_controller(&controller, |picker| picker.clipboard_settled(ticket, result));
        });
    }

    fn show_toast(&mut self, message: &str, duration: Duration) {
        self.remove_toast();

        let Some(body) = self.document.body() else {
            return;
        };
        let toast = match self
            .document
            .create_element("div")
            .map(|element| element.unchecked_into::<HtmlElement>())
        {
            Ok(toast) => toast,
            Err(err) => {
                warn!(error = ?err, "Cannot create toast");
                return;
            }
        };
        toast.set_id(&self.toast_id);
        toast.set_inner_text(message);

        let style = toast.style();
        for (property, value) in [
            ("position", "fixed"),
            ("top", "20px"),
            ("right", "20px"),
            ("padding", "10px 16px"),
            ("background", "#1f2937"),
            ("color", "#ffffff"),
            ("font", "14px/1.4 sans-serif"),
            ("border-radius", "6px"),
            ("box-shadow", "0 4px 12px rgba(0, 0, 0, 0.25)"),
            ("z-index", "1000001"),
            ("opacity", "1"),
            ("transition", "opacity 0.3s ease"),
        ] {
            log_js_error("Cannot style toast", style.set_property(property, value));
        }
        if let Err(err) = body.append_child(&toast) {
            warn!(error = ?err, "Cannot show toast");
            return;
        }

        let fading = toast.clone();
        let fade_out = Closure::once_into_js(move || {
            log_js_error("Cannot fade toast", fading.class_list().add_1("fade-out"));
            log_js_error("Cannot fade toast", fading.style().set_property("opacity", "0"));
            let remover = fading.clone();
            let remove = Closure::once_into_js(move || remover.remove());
            log_js_error(
                "Cannot schedule toast cleanup",
                fading.add_event_listener_with_callback("transitionend", remove.unchecked_ref()),
            );
        });
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(fade_out.unchecked_ref(), millis)
        {
            warn!(error = ?err, "Cannot schedule toast removal");
            toast.remove();
        }
    }

    fn alert(&mut self, message: &str) {
        if let Err(err) = self.window.alert_with_message(message) {
            warn!(error = ?err, "Cannot show alert");
        }
    }

    fn notify_deactivated(&mut self) {
        let message = js_sys::Object::new();
        let set = js_sys::Reflect::set(&message, &"action".into(), &"deactivate".into());
        if let Err(err) = set.and_then(|_| send_runtime_message(&message)) {
            warn!(error = ?err, "Extension runtime unavailable; deactivate notice dropped");
        }
    }
}
