//! Browser wiring for the search box: DOM lookups, listeners, the debounce
//! timer and the index fetch. All decisions live in `SearchController`.

use crate::config::WidgetConfig;
use crate::console;
use crate::dispatch::{self, InputOutcome, SearchController, Ticket};
use crate::error::{LoadError, SearchError};
use crate::parse;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlInputElement, KeyboardEvent, Request, RequestCache,
    RequestInit, Response, Window,
};

struct WidgetState {
    window: Window,
    input: HtmlInputElement,
    results: Element,
    controller: SearchController,
    load_error: String,
    timer_fn: Option<js_sys::Function>,
    timer: Option<i32>,
    ticket: Option<Ticket>,
}

type Shared = Rc<RefCell<WidgetState>>;

impl WidgetState {
    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        self.ticket = None;
    }

    fn on_input(&mut self) {
        self.cancel_timer();
        let value = self.input.value();
        match self.controller.input(&value) {
            None => {}
            Some(InputOutcome::Cleared) => self.results.set_inner_html(""),
            Some(InputOutcome::Scheduled { ticket, delay_ms }) => self.schedule(ticket, delay_ms),
        }
    }

    fn schedule(&mut self, ticket: Ticket, delay_ms: u32) {
        let Some(callback) = self.timer_fn.as_ref() else {
            return;
        };
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback, delay_ms as i32)
        {
            Ok(handle) => {
                self.timer = Some(handle);
                self.ticket = Some(ticket);
            }
            Err(e) => console::error(&format!("[search] failed to start timer: {:?}", e)),
        }
    }

    fn on_timer(&mut self) {
        self.timer = None;
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        let start = js_sys::Date::now();
        if let Some(rendered) = self.controller.fire(ticket) {
            self.results.set_inner_html(&rendered.html);
            console::log(&format!(
                "[perf] query='{}' | total={:.1}ms",
                rendered.query,
                js_sys::Date::now() - start
            ));
        }
    }

    fn on_keydown(&mut self, event: &KeyboardEvent) {
        if !dispatch::is_result_focus_key(&event.key(), event.is_composing(), event.key_code()) {
            return;
        }
        event.prevent_default();
        // Focus the first result link; navigation is left to the user
        let first = self
            .results
            .query_selector(".result a")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if let Some(link) = first {
            let _ = link.focus();
        }
    }

    fn on_clear(&mut self) {
        self.cancel_timer();
        if !self.controller.clear() {
            return;
        }
        self.input.set_value("");
        self.results.set_inner_html("");
        let _ = self.input.focus();
    }

    fn on_loaded(&mut self, index_json: &str) -> Result<usize, SearchError> {
        match self.controller.load(index_json) {
            Ok(count) => {
                console::log(&format!("[index] ready with {} records", count));
                // Pick up anything typed while the index was loading
                if !parse::is_blank(&self.input.value()) {
                    self.on_input();
                }
                Ok(count)
            }
            Err(e) if e.is_load() => {
                self.show_load_error();
                Err(e)
            }
            Err(e) => {
                console::warn(&format!("[index] ignoring index: {}", e));
                Err(e)
            }
        }
    }

    fn on_load_failed(&mut self, err: LoadError) {
        if self.controller.is_ready() {
            console::warn(&format!("[index] ignoring late failure: {}", err));
            return;
        }
        self.cancel_timer();
        self.controller.fail(&err);
        self.show_load_error();
    }

    fn show_load_error(&self) {
        self.results.set_text_content(Some(&self.load_error));
    }
}

fn element(document: &Document, id: &str) -> Result<Element, SearchError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| SearchError::Config(format!("element #{} not found", id)))
}

fn listen(
    target: &web_sys::EventTarget,
    event: &str,
    state: &Shared,
    handler: fn(&mut WidgetState, &Event),
) -> Result<Closure<dyn FnMut(Event)>, SearchError> {
    let state = state.clone();
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        handler(&mut state.borrow_mut(), &event);
    });
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|e| SearchError::Config(format!("failed to listen for {}: {:?}", event, e)))?;
    Ok(closure)
}

/// Fetch the index with cache bypass and hand the body to the controller
fn fetch_index(state: &Shared, url: &str) -> Result<(), SearchError> {
    let init = RequestInit::new();
    init.set_method("GET");
    init.set_cache(RequestCache::NoStore);
    let request = Request::new_with_str_and_init(url, &init)
        .map_err(|e| SearchError::Config(format!("bad index url '{}': {:?}", url, e)))?;
    let promise = state.borrow().window.fetch_with_request(&request);

    let on_response: Closure<dyn FnMut(JsValue)> = {
        let state = state.clone();
        Closure::once(move |value: JsValue| {
            let response: Response = match value.dyn_into() {
                Ok(response) => response,
                Err(_) => {
                    let err = LoadError::Fetch("fetch did not return a Response".to_string());
                    state.borrow_mut().on_load_failed(err);
                    return;
                }
            };
            if !response.ok() {
                state
                    .borrow_mut()
                    .on_load_failed(LoadError::Status(response.status()));
                return;
            }
            let text = match response.text() {
                Ok(text) => text,
                Err(e) => {
                    state
                        .borrow_mut()
                        .on_load_failed(LoadError::Fetch(format!("{:?}", e)));
                    return;
                }
            };
            let on_text: Closure<dyn FnMut(JsValue)> = {
                let state = state.clone();
                Closure::once(move |body: JsValue| {
                    let body = body.as_string().unwrap_or_default();
                    let _ = state.borrow_mut().on_loaded(&body);
                })
            };
            let on_text_error: Closure<dyn FnMut(JsValue)> = {
                let state = state.clone();
                Closure::once(move |e: JsValue| {
                    state
                        .borrow_mut()
                        .on_load_failed(LoadError::Fetch(format!("{:?}", e)));
                })
            };
            let _ = text.then2(&on_text, &on_text_error);
            on_text.forget();
            on_text_error.forget();
        })
    };
    let on_error: Closure<dyn FnMut(JsValue)> = {
        let state = state.clone();
        Closure::once(move |e: JsValue| {
            state
                .borrow_mut()
                .on_load_failed(LoadError::Fetch(format!("{:?}", e)));
        })
    };

    let _ = promise.then2(&on_response, &on_error);
    // One-shot startup callbacks
    on_response.forget();
    on_error.forget();
    Ok(())
}

/// Search box mounted on the page
#[wasm_bindgen]
pub struct SearchWidget {
    state: Shared,
    _listeners: Vec<Closure<dyn FnMut(Event)>>,
    _timer: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
impl SearchWidget {
    /// Mount on the elements named in `config_json` ("" for defaults) and,
    /// if an `index_url` is configured, start loading the index
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<SearchWidget, JsError> {
        Self::mount(config_json).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Supply the index JSON directly; returns the record count
    pub fn load_index(&self, index_json: &str) -> Result<usize, JsError> {
        self.state
            .borrow_mut()
            .on_loaded(index_json)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Report that the host could not retrieve the index
    pub fn fail_load(&self, reason: &str) {
        self.state
            .borrow_mut()
            .on_load_failed(LoadError::Fetch(reason.to_string()));
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().controller.is_ready()
    }

    /// Empty the box and the results
    pub fn clear(&self) {
        self.state.borrow_mut().on_clear();
    }
}

impl SearchWidget {
    fn mount(config_json: &str) -> Result<SearchWidget, SearchError> {
        let config = WidgetConfig::from_json(config_json)?;
        let window =
            web_sys::window().ok_or_else(|| SearchError::Config("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| SearchError::Config("no document".to_string()))?;

        let input = element(&document, &config.input_id)?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| SearchError::Config(format!("#{} is not an input", config.input_id)))?;
        let results = element(&document, &config.results_id)?;
        let clear_button = match &config.clear_button_id {
            Some(id) => Some(element(&document, id)?),
            None => None,
        };

        let state: Shared = Rc::new(RefCell::new(WidgetState {
            window,
            input: input.clone(),
            results,
            controller: SearchController::new(config.search.clone()),
            load_error: config.search.messages.load_error.clone(),
            timer_fn: None,
            timer: None,
            ticket: None,
        }));

        let timer = {
            let state = state.clone();
            Closure::<dyn FnMut()>::new(move || state.borrow_mut().on_timer())
        };
        let timer_fn = timer.as_ref().unchecked_ref::<js_sys::Function>().clone();
        state.borrow_mut().timer_fn = Some(timer_fn);

        let mut listeners = vec![
            listen(&input, "input", &state, |st, _| st.on_input())?,
            listen(&input, "keydown", &state, |st, event| {
                if let Some(key_event) = event.dyn_ref::<KeyboardEvent>() {
                    st.on_keydown(key_event);
                }
            })?,
        ];
        if let Some(button) = &clear_button {
            listeners.push(listen(button, "click", &state, |st, _| st.on_clear())?);
        }

        if let Some(url) = &config.index_url {
            fetch_index(&state, url)?;
        }

        Ok(SearchWidget {
            state,
            _listeners: listeners,
            _timer: timer,
        })
    }
}
