use leptos::prelude::*;
use wavpeek_core::colormap::ColormapName;
use wavpeek_core::params::{AnalysisParameters, FrequencyScale, FFT_SIZES, NYQUIST_OPTIONS_HZ};
use crate::state::ViewerState;

/// Analysis parameter selectors. Every change rebuilds the session.
#[component]
pub fn ParamsPanel() -> impl IntoView {
    let state = expect_context::<ViewerState>();
    let params = state.params;

    view! {
        <div class="sidebar-panel params-panel">
            <div class="setting-row">
                <span class="setting-label">"Nyquist"</span>
                <select
                    class="setting-select"
                    on:change=move |ev| {
                        if let Ok(hz) = event_target_value(&ev).parse::<u32>() {
                            params.update(|p| *p = p.clone().with_nyquist(hz));
                        }
                    }
                >
                    {NYQUIST_OPTIONS_HZ.iter().map(|&hz| view! {
                        <option value=hz.to_string() selected=move || params.get().nyquist_hz == hz>
                            {format!("{} Hz", hz)}
                        </option>
                    }).collect_view()}
                </select>
            </div>

            <div class="setting-row">
                <span class="setting-label">"FFT size"</span>
                <select
                    class="setting-select"
                    on:change=move |ev| {
                        if let Ok(n) = event_target_value(&ev).parse::<usize>() {
                            params.update(|p| p.fft_size = n);
                        }
                    }
                >
                    {FFT_SIZES.iter().map(|&n| view! {
                        <option value=n.to_string() selected=move || params.get().fft_size == n>
                            {n.to_string()}
                        </option>
                    }).collect_view()}
                </select>
            </div>

            <div class="setting-row">
                <span class="setting-label">"Max freq"</span>
                <select
                    class="setting-select"
                    on:change=move |ev| {
                        let max = event_target_value(&ev).parse::<u32>().ok();
                        params.update(|p| p.max_display_hz = max);
                    }
                >
                    <option value="" selected=move || params.get().max_display_hz.is_none()>"nyquist"</option>
                    {move || {
                        let nyquist = params.get().nyquist_hz;
                        AnalysisParameters::max_display_options(nyquist).map(|hz| view! {
                            <option value=hz.to_string() selected=move || params.get().max_display_hz == Some(hz)>
                                {format!("{} Hz", hz)}
                            </option>
                        }).collect_view()
                    }}
                </select>
            </div>

            <div class="setting-row">
                <span class="setting-label">"Scale"</span>
                <select
                    class="setting-select"
                    on:change=move |ev| {
                        if let Some(scale) = FrequencyScale::parse(&event_target_value(&ev)) {
                            params.update(|p| p.frequency_scale = scale);
                        }
                    }
                >
                    {FrequencyScale::ALL.into_iter().map(|scale| view! {
                        <option value=scale.as_str() selected=move || params.get().frequency_scale == scale>
                            {scale.as_str()}
                        </option>
                    }).collect_view()}
                </select>
            </div>

            <div class="setting-row">
                <span class="setting-label">"Colormap"</span>
                <select
                    class="setting-select"
                    on:change=move |ev| {
                        if let Some(name) = ColormapName::parse(&event_target_value(&ev)) {
                            params.update(|p| p.colormap = name);
                        }
                    }
                >
                    {ColormapName::ALL.into_iter().map(|name| view! {
                        <option value=name.as_str() selected=move || params.get().colormap == name>
                            {name.as_str()}
                        </option>
                    }).collect_view()}
                </select>
            </div>
        </div>
    }
}
