use leptos::prelude::*;
use wavpeek_core::params::{AnalysisParameters, ViewOptions, ZOOM_MIN};
use wavpeek_core::region::{ActiveRegion, SampleRange};
use wavpeek_core::session::SessionStatus;

/// Reactive state of one mounted viewer. Written by the viewer runtime,
/// read by the components; parameter and view fields flow the other way.
#[derive(Clone, Copy)]
pub struct ViewerState {
    // user-editable
    pub params: RwSignal<AnalysisParameters>,
    pub zoom: RwSignal<f64>,
    pub height_px: RwSignal<u32>,

    // published by the runtime
    pub status: RwSignal<SessionStatus>,
    pub is_playing: RwSignal<Option<bool>>,
    pub current_time: RwSignal<f64>,
    pub region: RwSignal<Option<ActiveRegion>>,
    pub sample_range: RwSignal<Option<SampleRange>>,
    pub sample_rate: RwSignal<Option<u32>>,
    pub mime_type: RwSignal<Option<String>>,
    pub diagnostic: RwSignal<Option<String>>,
    pub load_error: RwSignal<Option<String>>,
}

impl ViewerState {
    pub fn new() -> Self {
        let view = ViewOptions::default();
        Self {
            params: RwSignal::new(AnalysisParameters::default()),
            zoom: RwSignal::new(ZOOM_MIN),
            height_px: RwSignal::new(view.height_px),
            status: RwSignal::new(SessionStatus::NoSession),
            is_playing: RwSignal::new(None),
            current_time: RwSignal::new(0.0),
            region: RwSignal::new(None),
            sample_range: RwSignal::new(None),
            sample_rate: RwSignal::new(None),
            mime_type: RwSignal::new(None),
            diagnostic: RwSignal::new(None),
            load_error: RwSignal::new(None),
        }
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions { zoom_px_per_sec: self.zoom.get(), height_px: self.height_px.get() }
    }

    pub fn data_ready(&self) -> bool {
        matches!(self.status.get(), SessionStatus::Ready(_))
    }
}
