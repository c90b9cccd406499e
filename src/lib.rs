mod components;
mod engine;
mod runtime;
mod state;

use std::any::Any;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wavpeek_core::data_uri::EncodedAudioBlob;
use wavpeek_core::params::{AnalysisParameters, ViewOptions};

use components::demo::DemoPage;
use components::viewer::Viewer;
use runtime::ViewerId;
use state::ViewerState;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) { log::Level::Debug } else { log::Level::Info };
    // Already initialised when the module is instantiated twice
    let _ = console_log::init_with_level(level);
}

/// A viewer mounted into a host element by [`render_wav`].
#[wasm_bindgen]
pub struct WavViewer {
    id: ViewerId,
    mounted: Option<Box<dyn Any>>,
}

#[wasm_bindgen]
impl WavViewer {
    /// Replace the displayed audio. `payload` is the base64 body without
    /// the `data:` prefix.
    #[wasm_bindgen(js_name = setSource)]
    pub fn set_source(&self, mime_type: &str, payload: &str) -> Result<(), JsValue> {
        let blob = EncodedAudioBlob::from_base64(mime_type, payload)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        runtime::with_viewer(self.id, |rt| rt.load(blob));
        Ok(())
    }

    /// Apply analysis parameters given as JSON; missing fields keep their
    /// defaults.
    #[wasm_bindgen(js_name = setParams)]
    pub fn set_params(&self, json: &str) -> Result<(), JsValue> {
        let params: AnalysisParameters =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        params.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;
        if let Some(state) = runtime::with_viewer(self.id, |rt| rt.state()) {
            state.params.set(params);
        }
        Ok(())
    }

    /// Apply view options (zoom, row height) given as JSON. The live session
    /// is updated in place; zoom waits for the load to complete.
    #[wasm_bindgen(js_name = setView)]
    pub fn set_view(&self, json: &str) -> Result<(), JsValue> {
        let view: ViewOptions =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        view.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;
        if let Some(state) = runtime::with_viewer(self.id, |rt| rt.state()) {
            state.zoom.set(view.zoom_px_per_sec);
            state.height_px.set(view.height_px);
        }
        Ok(())
    }

    /// Unmount the viewer and destroy its session.
    pub fn destroy(&mut self) {
        // dropping the handle runs the viewer's cleanup
        self.mounted.take();
        runtime::remove(self.id);
    }
}

/// Create the viewer's state and runtime inside the mount's reactive owner.
fn init_viewer(id: ViewerId) {
    let state = ViewerState::new();
    provide_context(state);
    runtime::register(id, state);
}

/// Render a WAV blob into `element`, the way a notebook output renderer
/// receives it (MIME type plus base64 payload).
#[wasm_bindgen(js_name = renderWav)]
pub fn render_wav(element: web_sys::HtmlElement, mime_type: &str, payload: &str) -> Result<WavViewer, JsValue> {
    let id = runtime::next_viewer_id();
    let handle = leptos::mount::mount_to(element, move || {
        init_viewer(id);
        view! { <Viewer id=id /> }
    });
    let viewer = WavViewer { id, mounted: Some(Box::new(handle)) };
    viewer.set_source(mime_type, payload)?;
    Ok(viewer)
}

/// Mount a standalone viewer with a file picker into the page body.
#[wasm_bindgen(js_name = mountDemo)]
pub fn mount_demo() -> Result<(), JsValue> {
    let body = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
        .ok_or_else(|| JsValue::from_str("no document body"))?;
    let id = runtime::next_viewer_id();
    leptos::mount::mount_to(body, move || {
        init_viewer(id);
        view! { <DemoPage id=id /> }
    })
    .forget();
    Ok(())
}
