use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wavpeek_core::data_uri::EncodedAudioBlob;
use crate::components::viewer::Viewer;
use crate::runtime::{self, ViewerId};

/// Read a picked file as a data URI and hand it to the viewer.
fn load_file(id: ViewerId, file: web_sys::File) {
    let reader = match web_sys::FileReader::new() {
        Ok(r) => r,
        Err(e) => {
            log::error!("Failed to create FileReader: {:?}", e);
            return;
        }
    };
    let name = file.name();
    let reader_cb = reader.clone();
    let onload = wasm_bindgen::closure::Closure::once_into_js(move || {
        let Some(uri) = reader_cb.result().ok().and_then(|r| r.as_string()) else {
            log::error!("{}: no data", name);
            return;
        };
        match EncodedAudioBlob::parse(&uri) {
            Ok(blob) => {
                log::info!("loading {} ({} bytes)", name, blob.decoded_len());
                runtime::with_viewer(id, |rt| rt.load(blob));
            }
            Err(e) => log::error!("{}: {}", name, e),
        }
    });
    reader.set_onload(Some(onload.unchecked_ref()));
    if let Err(e) = reader.read_as_data_url(&file) {
        log::error!("Failed to read {}: {:?}", file.name(), e);
    }
}

/// Standalone page: a file picker above one viewer.
#[component]
pub fn DemoPage(id: ViewerId) -> impl IntoView {
    let on_pick = move |ev: web_sys::Event| {
        let file = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));
        if let Some(file) = file {
            load_file(id, file);
        }
    };

    view! {
        <div class="app">
            <div class="toolbar">
                <span style="color: #666">"wavpeek"</span>
                <input type="file" accept=".wav,audio/wav,audio/x-wav" on:change=on_pick />
            </div>
            <Viewer id=id />
        </div>
    }
}
