//! Browser adapter: DOM container, `window.Celestial` binding, blob URLs and
//! anchor downloads, plus a `wasm_bindgen` facade driving the controller
//! from the page's event loop.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, Element, HtmlAnchorElement, Url, XmlSerializer};

use crate::api::{
    CaptureOutcome, ControllerEvent, DownloadRequest, DownloadSink, EventQueue, ObjectUrl,
    ObjectUrlRegistry, StarMapController, StarMapSettings,
};
use crate::core::FormField;
use crate::error::{StarMapError, StarMapResult};
use crate::render::{CelestialConfig, CelestialRenderer, RenderSurface, SceneNode};

fn js_error(err: JsValue) -> StarMapError {
    StarMapError::Platform(format!("{err:?}"))
}

fn to_js(err: StarMapError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn window() -> StarMapResult<web_sys::Window> {
    web_sys::window().ok_or_else(|| StarMapError::Platform("no window".to_owned()))
}

fn document() -> StarMapResult<web_sys::Document> {
    window()?
        .document()
        .ok_or_else(|| StarMapError::Platform("no document".to_owned()))
}

/// Monotonic page time; `Date.now()` only where `performance` is missing.
fn host_now() -> Duration {
    let millis = web_sys::window()
        .and_then(|window| window.performance())
        .map_or_else(js_sys::Date::now, |performance| performance.now());
    Duration::from_secs_f64(millis.max(0.0) / 1000.0)
}

/// DOM element the celestial library draws into.
#[derive(Debug, Clone)]
pub struct DomContainer {
    element: Element,
}

impl DomContainer {
    #[must_use]
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    /// Looks the container up by id; `None` until the page has mounted it.
    #[must_use]
    pub fn find(id: &str) -> Option<Self> {
        document().ok()?.get_element_by_id(id).map(Self::new)
    }
}

impl RenderSurface for DomContainer {
    fn container_id(&self) -> String {
        self.element.id()
    }

    fn assign_container_id(&mut self, id: &str) {
        self.element.set_id(id);
    }

    fn clear(&mut self) {
        self.element.set_inner_html("");
    }

    fn mount(&mut self, scene: SceneNode) -> StarMapResult<()> {
        self.element
            .insert_adjacent_html("beforeend", &scene.to_markup())
            .map_err(js_error)
    }

    fn capture_scene(&mut self) -> StarMapResult<Option<String>> {
        let Some(svg) = self.element.query_selector("svg").map_err(js_error)? else {
            return Ok(None);
        };
        let serializer = XmlSerializer::new().map_err(js_error)?;
        serializer
            .serialize_to_string(&svg)
            .map(Some)
            .map_err(js_error)
    }
}

/// Binding to the page-global `Celestial` object (d3-celestial).
#[derive(Debug, Default)]
pub struct CelestialJs;

impl CelestialJs {
    fn global() -> Option<JsValue> {
        let window = web_sys::window()?;
        let celestial = js_sys::Reflect::get(&window, &JsValue::from_str("Celestial")).ok()?;
        (!celestial.is_undefined() && !celestial.is_null()).then_some(celestial)
    }

    /// Converts the typed config into the object `Celestial.display` takes.
    ///
    /// Coordinates are written as raw numbers so NaN survives, and the
    /// instant becomes a JS `Date` (an invalid one when the form's date/time
    /// did not combine).
    pub fn config_object(config: &CelestialConfig) -> StarMapResult<JsValue> {
        let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
        let object = config
            .to_renderer_value()
            .serialize(&serializer)
            .map_err(|e| StarMapError::Render(format!("failed to convert config: {e}")))?;

        let location = js_sys::Object::new();
        js_sys::Reflect::set(
            &location,
            &JsValue::from_str("lat"),
            &JsValue::from_f64(config.location.lat),
        )
        .map_err(js_error)?;
        js_sys::Reflect::set(
            &location,
            &JsValue::from_str("lon"),
            &JsValue::from_f64(config.location.lon),
        )
        .map_err(js_error)?;
        js_sys::Reflect::set(&object, &JsValue::from_str("location"), &location)
            .map_err(js_error)?;

        let millis = config
            .date
            .map_or(f64::NAN, |instant| instant.timestamp_millis() as f64);
        let date = js_sys::Date::new(&JsValue::from_f64(millis));
        js_sys::Reflect::set(&object, &JsValue::from_str("date"), &date).map_err(js_error)?;
        Ok(object)
    }
}

impl CelestialRenderer for CelestialJs {
    fn is_loaded(&self) -> bool {
        Self::global().is_some()
    }

    fn display(
        &mut self,
        config: &CelestialConfig,
        _surface: &mut dyn RenderSurface,
    ) -> StarMapResult<()> {
        let celestial = Self::global().ok_or(StarMapError::RendererUnavailable)?;
        let display = js_sys::Reflect::get(&celestial, &JsValue::from_str("display"))
            .map_err(js_error)?
            .dyn_into::<js_sys::Function>()
            .map_err(|_| StarMapError::Render("Celestial.display is not a function".to_owned()))?;
        let object = Self::config_object(config)?;
        display.call1(&celestial, &object).map_err(js_error)?;
        Ok(())
    }
}

/// `URL.createObjectURL` over in-page blobs.
#[derive(Debug, Default)]
pub struct BrowserBlobStore;

impl ObjectUrlRegistry for BrowserBlobStore {
    fn create_object_url(&mut self, bytes: &[u8], mime_type: &str) -> StarMapResult<ObjectUrl> {
        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
        let options = BlobPropertyBag::new();
        options.set_type(mime_type);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(js_error)?;
        Url::create_object_url_with_blob(&blob)
            .map(ObjectUrl::new)
            .map_err(js_error)
    }

    fn revoke_object_url(&mut self, url: &ObjectUrl) {
        if let Err(err) = Url::revoke_object_url(url.as_str()) {
            web_sys::console::warn_1(&err);
        }
    }
}

/// Triggers a browser save through a transient `<a download>` element.
#[derive(Debug, Default)]
pub struct AnchorDownload;

impl DownloadSink for AnchorDownload {
    fn save(&mut self, request: DownloadRequest<'_>) -> StarMapResult<()> {
        let document = document()?;
        let body = document
            .body()
            .ok_or_else(|| StarMapError::Platform("no document body".to_owned()))?;
        let anchor = document
            .create_element("a")
            .map_err(js_error)?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|_| StarMapError::Platform("anchor element cast failed".to_owned()))?;
        anchor.set_href(request.url.as_str());
        anchor.set_download(request.filename);
        body.append_child(&anchor).map_err(js_error)?;
        anchor.click();
        body.remove_child(&anchor).map_err(js_error)?;
        Ok(())
    }
}

fn event_name(event: &ControllerEvent) -> &'static str {
    match event {
        ControllerEvent::FieldUpdated { .. } => "fieldUpdated",
        ControllerEvent::GenerationStarted { .. } => "generationStarted",
        ControllerEvent::CaptureRetry { .. } => "captureRetry",
        ControllerEvent::CaptureSucceeded { .. } => "captureSucceeded",
        ControllerEvent::CaptureFailed { .. } => "captureFailed",
        ControllerEvent::Downloaded { .. } => "downloaded",
    }
}

type WebController = StarMapController<CelestialJs, DomContainer, BrowserBlobStore>;

const EVENT_QUEUE_ID: &str = "web-star-map";

/// State shared between the facade and pending timer callbacks.
struct WebShared {
    controller: RefCell<WebController>,
    events: EventQueue,
    listeners: RefCell<Vec<(String, js_sys::Function)>>,
}

impl WebShared {
    /// Hands buffered events to JS listeners. Must run with no controller
    /// borrow held, so listeners may call back into the map.
    fn dispatch(&self) {
        while let Some((event, context)) = self.events.pop() {
            let listeners = self.listeners.borrow().clone();
            if listeners.is_empty() {
                continue;
            }
            let name = JsValue::from_str(event_name(&event));
            let context = serde_wasm_bindgen::to_value(&context).unwrap_or(JsValue::NULL);
            let payload = serde_wasm_bindgen::to_value(&event).unwrap_or(JsValue::NULL);
            for (_, callback) in &listeners {
                if let Err(err) = callback.call3(&JsValue::NULL, &name, &context, &payload) {
                    web_sys::console::error_1(&err);
                }
            }
        }
    }

    /// Fails the in-flight capture when no timer could be armed for it.
    fn abandon_capture(&self, err: &JsValue) {
        let cancelled = self
            .controller
            .borrow_mut()
            .cancel_capture(format!("capture timer unavailable: {err:?}"));
        if cancelled.is_some() {
            web_sys::console::error_1(err);
        }
    }
}

/// Page-facing star map generator.
#[wasm_bindgen]
pub struct WebStarMap {
    shared: Rc<WebShared>,
}

#[wasm_bindgen]
impl WebStarMap {
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str) -> Result<WebStarMap, JsValue> {
        Self::build(container_id, StarMapSettings::default())
    }

    #[wasm_bindgen(js_name = withSettings)]
    pub fn with_settings(container_id: &str, settings_json: &str) -> Result<WebStarMap, JsValue> {
        let settings = StarMapSettings::from_json_str(settings_json).map_err(to_js)?;
        Self::build(container_id, settings)
    }

    /// Re-resolves the container, e.g. after the page re-mounted it.
    #[wasm_bindgen(js_name = attachContainer)]
    pub fn attach_container(&self, container_id: &str) -> bool {
        match DomContainer::find(container_id) {
            Some(container) => {
                self.shared.controller.borrow_mut().attach_surface(container);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = updateField)]
    pub fn update_field(&self, field: &str, value: &str) -> Result<(), JsValue> {
        let field = field.parse::<FormField>().map_err(to_js)?;
        self.shared.controller.borrow_mut().update_field(field, value);
        self.shared.dispatch();
        Ok(())
    }

    pub fn field(&self, field: &str) -> Result<String, JsValue> {
        let field = field.parse::<FormField>().map_err(to_js)?;
        Ok(self.shared.controller.borrow().form().get(field).to_owned())
    }

    /// Dispatches a render and schedules capture polling on the page timer.
    pub fn generate(&self) -> Result<(), JsValue> {
        let result = self.shared.controller.borrow_mut().generate(host_now());
        if let Err(err) = result {
            web_sys::console::error_1(&JsValue::from_str(&err.to_string()));
            self.shared.dispatch();
            return Err(to_js(err));
        }
        let scheduled = schedule_capture(Rc::clone(&self.shared));
        if let Err(err) = &scheduled {
            self.shared.abandon_capture(err);
        }
        self.shared.dispatch();
        scheduled
    }

    /// Saves the current artifact; returns the filename, or `undefined`
    /// when nothing has been captured yet.
    pub fn download(&self) -> Result<Option<String>, JsValue> {
        let result = self
            .shared
            .controller
            .borrow_mut()
            .download(&mut AnchorDownload);
        self.shared.dispatch();
        result.map_err(to_js)
    }

    #[wasm_bindgen(js_name = isGenerating)]
    pub fn is_generating(&self) -> bool {
        self.shared.controller.borrow().is_generating()
    }

    #[wasm_bindgen(js_name = hasArtifact)]
    pub fn has_artifact(&self) -> bool {
        self.shared.controller.borrow().can_download()
    }

    #[wasm_bindgen(js_name = artifactUrl)]
    pub fn artifact_url(&self) -> Option<String> {
        self.shared
            .controller
            .borrow()
            .artifact()
            .map(|artifact| artifact.url.as_str().to_owned())
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.shared
            .controller
            .borrow()
            .snapshot()
            .to_json_pretty()
            .map_err(to_js)
    }

    /// Registers `callback(eventName, context, event)` for controller
    /// events. Returns `false` when `id` is already registered.
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, id: &str, callback: js_sys::Function) -> bool {
        let mut listeners = self.shared.listeners.borrow_mut();
        if listeners.iter().any(|(existing, _)| existing == id) {
            return false;
        }
        listeners.push((id.to_owned(), callback));
        true
    }

    #[wasm_bindgen(js_name = offEvent)]
    pub fn off_event(&self, id: &str) -> bool {
        let mut listeners = self.shared.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| existing != id);
        listeners.len() != before
    }

    /// Revokes the current artifact URL.
    pub fn release(&self) {
        self.shared.controller.borrow_mut().release_artifact();
    }
}

impl WebStarMap {
    fn build(container_id: &str, settings: StarMapSettings) -> Result<WebStarMap, JsValue> {
        console_error_panic_hook::set_once();
        let mut controller: WebController =
            StarMapController::new(settings, CelestialJs, BrowserBlobStore).map_err(to_js)?;
        if let Some(container) = DomContainer::find(container_id) {
            controller.attach_surface(container);
        }
        let events = EventQueue::new(EVENT_QUEUE_ID);
        controller.add_observer(Box::new(events.clone()));
        Ok(Self {
            shared: Rc::new(WebShared {
                controller: RefCell::new(controller),
                events,
                listeners: RefCell::new(Vec::new()),
            }),
        })
    }
}

fn schedule_capture(shared: Rc<WebShared>) -> Result<(), JsValue> {
    let Some(due) = shared.controller.borrow().next_capture_due() else {
        return Ok(());
    };
    let delay_ms = i32::try_from(due.saturating_sub(host_now()).as_millis()).unwrap_or(i32::MAX);
    let handle = Rc::clone(&shared);
    let callback = Closure::once_into_js(move || {
        let outcome = handle.controller.borrow_mut().tick(host_now());
        match outcome {
            Some(CaptureOutcome::Failed { generation, failure }) => {
                web_sys::console::error_1(&JsValue::from_str(&format!(
                    "star map generation {generation} failed: {failure:?}"
                )));
            }
            Some(CaptureOutcome::Captured { .. }) => {}
            None => {
                if let Err(err) = schedule_capture(Rc::clone(&handle)) {
                    handle.abandon_capture(&err);
                }
            }
        }
        handle.dispatch();
    });
    window()
        .map_err(to_js)?
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            delay_ms,
        )?;
    Ok(())
}
