use leptos::prelude::*;
use crate::components::dump_panel::DumpPanel;
use crate::components::params_panel::ParamsPanel;
use crate::components::play_controls::PlayControls;
use crate::components::region_panel::RegionPanel;
use crate::engine::Containers;
use crate::runtime::{self, ViewerId};
use crate::state::ViewerState;

#[component]
pub fn Viewer(id: ViewerId) -> impl IntoView {
    let state = expect_context::<ViewerState>();
    let timeline_ref = NodeRef::<leptos::html::Div>::new();
    let wave_ref = NodeRef::<leptos::html::Div>::new();
    let spectrogram_ref = NodeRef::<leptos::html::Div>::new();

    // Mount once all three containers exist
    Effect::new(move || {
        let (Some(timeline), Some(wave), Some(spectrogram)) =
            (timeline_ref.get(), wave_ref.get(), spectrogram_ref.get())
        else {
            return;
        };
        let containers = Containers {
            timeline: timeline.into(),
            wave: wave.into(),
            spectrogram: spectrogram.into(),
        };
        runtime::with_viewer(id, |rt| rt.mount(containers));
    });

    Effect::new(move || {
        let params = state.params.get();
        runtime::with_viewer(id, |rt| rt.set_params(params));
    });

    Effect::new(move || {
        let view = state.view_options();
        runtime::with_viewer(id, |rt| rt.set_view(view));
    });

    on_cleanup(move || runtime::remove(id));

    view! {
        <div class="wavpeek">
            <div class="wavpeek-timeline" node_ref=timeline_ref></div>
            <div class="wavpeek-waveform" node_ref=wave_ref></div>
            <div class="wavpeek-spectrogram" node_ref=spectrogram_ref></div>
            <PlayControls id=id />
            <RegionPanel />
            <ParamsPanel />
            <DumpPanel />
        </div>
    }
}
