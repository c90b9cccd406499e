use leptos::prelude::*;
use crate::state::ViewerState;

/// Readout of the active region in seconds and, once the sample rate is
/// known, in sample indices.
#[component]
pub fn RegionPanel() -> impl IntoView {
    let state = expect_context::<ViewerState>();

    view! {
        <div class="analysis-panel">
            {move || match state.region.get() {
                None => view! { <span>"No selection"</span> }.into_any(),
                Some(active) => {
                    let r = active.region;
                    let samples = match state.sample_range.get() {
                        Some(range) => format!("samples [{}, {}]", range.start, range.end),
                        None => "samples unavailable".to_string(),
                    };
                    view! {
                        <span>{format!("{:.3} s to {:.3} s ({:.3} s)", r.start, r.end, r.duration())}</span>
                        <span class="analysis-samples">{samples}</span>
                    }.into_any()
                }
            }}
            <span class="analysis-rate">{move || match state.sample_rate.get() {
                Some(rate) => format!("{} Hz", rate),
                None => "rate unknown".to_string(),
            }}</span>
        </div>
    }
}
