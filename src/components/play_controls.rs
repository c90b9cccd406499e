use leptos::prelude::*;
use wavpeek_core::params::{ZOOM_MAX, ZOOM_MIN};
use crate::runtime::{self, ViewerId};
use crate::state::ViewerState;

#[component]
pub fn PlayControls(id: ViewerId) -> impl IntoView {
    let state = expect_context::<ViewerState>();
    let is_playing = move || state.is_playing.get() == Some(true);

    view! {
        <div class="play-controls">
            <button
                class="layer-btn"
                disabled=move || !state.data_ready()
                on:click=move |_| {
                    runtime::with_viewer(id, |rt| rt.toggle_play());
                }
                title="Play or pause (stops at the end of the selected region)"
            >" Play/Pause "</button>
            <div class="play-status">{move || if is_playing() { "Playing" } else { "Pause" }}</div>
            <div class="play-time">{move || format!("{:.2} s", state.current_time.get())}</div>

            // Zoom needs the decoded length, so it waits for the load
            <div class="zoom">
                <input
                    type="range"
                    class="setting-range"
                    min=ZOOM_MIN.to_string()
                    max=ZOOM_MAX.to_string()
                    step="1"
                    style="width: 100%"
                    disabled=move || !state.data_ready()
                    prop:value=move || state.zoom.get().to_string()
                    on:input=move |ev| {
                        if let Ok(v) = event_target_value(&ev).parse::<f64>() {
                            state.zoom.set(v.clamp(ZOOM_MIN, ZOOM_MAX));
                        }
                    }
                />
                {move || format!("zoom: {} [pixel/sec]", state.zoom.get())}
            </div>
        </div>
    }
}
