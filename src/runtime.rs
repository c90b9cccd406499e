//! Per-viewer glue between the session controller, region sync, the
//! WaveSurfer engine and the reactive [`ViewerState`].
//!
//! Runtimes live in a thread-local registry keyed by [`ViewerId`]. Engine
//! callbacks are dispatched on a fresh task so they never run while a
//! runtime is borrowed.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use leptos::prelude::*;
use wavpeek_core::data_uri::EncodedAudioBlob;
use wavpeek_core::le_reader::bytes_from_binary_string;
use wavpeek_core::params::{AnalysisParameters, ViewOptions};
use wavpeek_core::region::RegionPlaybackSync;
use wavpeek_core::riff::HEADER_WINDOW_LEN;
use wavpeek_core::session::{AnalysisSessionController, LoadOutcome, SessionId};
use wavpeek_core::source::SourceDocument;

use crate::engine::{Containers, EngineEvent, EventKind, WaveSurferEngine};
use crate::state::ViewerState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewerId(u32);

thread_local! {
    static NEXT_VIEWER: Cell<u32> = const { Cell::new(1) };
    static VIEWERS: RefCell<HashMap<ViewerId, ViewerRuntime>> = RefCell::new(HashMap::new());
}

pub fn next_viewer_id() -> ViewerId {
    NEXT_VIEWER.with(|next| {
        let id = next.get();
        next.set(id + 1);
        ViewerId(id)
    })
}

pub fn register(id: ViewerId, state: ViewerState) {
    VIEWERS.with(|viewers| {
        viewers.borrow_mut().insert(id, ViewerRuntime::new(id, state));
    });
}

/// Destroy the viewer's session and drop its runtime.
pub fn remove(id: ViewerId) {
    let runtime = VIEWERS.with(|viewers| viewers.borrow_mut().remove(&id));
    if let Some(mut runtime) = runtime {
        runtime.controller.unmount();
        log::debug!("viewer {:?} removed", id);
    }
}

pub fn with_viewer<R>(id: ViewerId, f: impl FnOnce(&mut ViewerRuntime) -> R) -> Option<R> {
    VIEWERS.with(|viewers| {
        let Ok(mut viewers) = viewers.try_borrow_mut() else {
            log::error!("viewer {:?} is busy", id);
            return None;
        };
        viewers.get_mut(&id).map(f)
    })
}

/// Queue an engine callback for the viewer.
pub fn dispatch(id: ViewerId, event: EngineEvent) {
    wasm_bindgen_futures::spawn_local(async move {
        with_viewer(id, |runtime| runtime.handle(event));
    });
}

/// Decode the header window of `blob` with the browser's `atob`.
fn decode_header(blob: &EncodedAudioBlob) -> Vec<u8> {
    let Some(window) = web_sys::window() else {
        log::error!("No window object");
        return Vec::new();
    };
    match window.atob(blob.header_payload(HEADER_WINDOW_LEN)) {
        Ok(raw) => bytes_from_binary_string(&raw),
        Err(e) => {
            log::error!("atob failed: {:?}", e);
            Vec::new()
        }
    }
}

pub struct ViewerRuntime {
    controller: AnalysisSessionController<WaveSurferEngine>,
    sync: RegionPlaybackSync,
    state: ViewerState,
    seen_session: Option<SessionId>,
}

impl ViewerRuntime {
    fn new(id: ViewerId, state: ViewerState) -> Self {
        Self {
            controller: AnalysisSessionController::new(WaveSurferEngine::new(id)),
            sync: RegionPlaybackSync::new(),
            state,
            seen_session: None,
        }
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn mount(&mut self, containers: Containers) {
        self.controller.mount(containers);
        self.publish();
    }

    pub fn load(&mut self, blob: EncodedAudioBlob) {
        let header = decode_header(&blob);
        let source = SourceDocument::new(blob, header);
        self.state.mime_type.set(Some(source.blob().mime().to_string()));
        self.state.diagnostic.set(Some(source.diagnostic_text()));
        self.state.load_error.set(None);
        if let Some(session) = self.controller.session_mut() {
            session.remove_region();
        }
        self.controller.load(source);
        self.sync.reset();
        self.publish();
    }

    pub fn set_params(&mut self, params: AnalysisParameters) {
        if let Err(e) = self.controller.set_params(params) {
            log::warn!("{}", e);
        }
        self.publish();
    }

    pub fn set_view(&mut self, view: ViewOptions) {
        if let Err(e) = self.controller.set_view(view) {
            log::warn!("{}", e);
        }
    }

    pub fn toggle_play(&mut self) {
        let Some(session) = self.controller.session_mut() else { return };
        self.sync.toggle(session);
        self.publish();
    }

    pub fn handle(&mut self, event: EngineEvent) {
        match event.kind {
            EventKind::Loaded(ticket, result) => match self.controller.complete_load(ticket, result) {
                LoadOutcome::Ready => self.sync.set_sample_rate(self.controller.sample_rate()),
                LoadOutcome::Failed(e) => self.state.load_error.set(Some(e.to_string())),
                LoadOutcome::Stale => {}
            },
            kind => self.handle_session_event(event.session, kind),
        }
        self.publish();
    }

    fn handle_session_event(&mut self, serial: u32, kind: EventKind) {
        let Some(session) = self.controller.session_mut() else { return };
        if session.serial() != serial {
            log::debug!("dropping event from replaced session {}", serial);
            return;
        }
        match kind {
            EventKind::TimeUpdate(time) => {
                if self.sync.time_update(session, time) {
                    log::debug!("stopped at region end");
                }
            }
            EventKind::Interaction(time) => {
                if self.sync.interaction(time).is_some() {
                    session.remove_region();
                }
            }
            EventKind::Paused => self.sync.engine_paused(),
            EventKind::RegionCreated(region) => {
                let bounds = region.bounds();
                self.sync.region_created(bounds.start, bounds.end);
                session.show_region(region);
            }
            EventKind::RegionUpdated(region) => {
                let bounds = region.bounds();
                self.sync.region_updated(bounds.start, bounds.end);
            }
            EventKind::RegionRemoved(region) => {
                if session.is_shown(&region) {
                    session.forget_region();
                    self.sync.clear_region();
                }
            }
            EventKind::Loaded(..) => {}
        }
    }

    /// Push controller and sync state into the signals. A replaced session
    /// starts with no region and no playback.
    fn publish(&mut self) {
        let session = self.controller.session_id();
        if session != self.seen_session {
            self.seen_session = session;
            self.sync.reset();
            self.sync.set_sample_rate(self.controller.sample_rate());
        }

        let playback = self.sync.playback();
        self.state.status.set(self.controller.status());
        self.state.is_playing.set(playback.is_playing);
        self.state.current_time.set(playback.current_time);
        self.state.region.set(self.sync.active());
        self.state.sample_range.set(self.sync.sample_range());
        self.state.sample_rate.set(self.controller.sample_rate());
    }
}
