//! WaveSurfer bindings and the [`VisualizationEngine`] built on them.
//!
//! Expects the UMD builds of WaveSurfer 7 and its Regions, Timeline and
//! Spectrogram plugins on the page (`WaveSurfer`, `WaveSurfer.Regions`, ...).

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wavpeek_core::colormap::DEFAULT_SHADES;
use wavpeek_core::data_uri::EncodedAudioBlob;
use wavpeek_core::error::EngineError;
use wavpeek_core::params::{AnalysisParameters, ViewOptions};
use wavpeek_core::region::{PlaybackTransport, Region};
use wavpeek_core::session::{LoadTicket, ViewUpdate, VisualizationEngine};

use crate::runtime::{self, ViewerId};

const WAVE_COLOR: &str = "#4BF2A7";
const PROGRESS_COLOR: &str = "#1f8a5c";
const CURSOR_COLOR: &str = "#ffffff";
const REGION_COLOR: &str = "rgba(75, 242, 167, 0.2)";

#[wasm_bindgen]
extern "C" {
    /// Anything with WaveSurfer's `on(event, callback)`.
    pub type Emitter;

    #[wasm_bindgen(method)]
    fn on(this: &Emitter, event: &str, callback: &js_sys::Function) -> JsValue;

    #[wasm_bindgen(extends = Emitter)]
    pub type WaveSurfer;

    #[wasm_bindgen(catch, js_namespace = WaveSurfer, js_name = create)]
    fn create_wavesurfer(options: &JsValue) -> Result<WaveSurfer, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn load(this: &WaveSurfer, url: &str) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(method)]
    fn destroy(this: &WaveSurfer);

    #[wasm_bindgen(method, catch)]
    fn play(this: &WaveSurfer) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(method)]
    fn pause(this: &WaveSurfer);

    #[wasm_bindgen(method, js_name = setTime)]
    fn set_time(this: &WaveSurfer, seconds: f64);

    #[wasm_bindgen(method, js_name = isPlaying)]
    fn is_playing(this: &WaveSurfer) -> bool;

    #[wasm_bindgen(method, js_name = getCurrentTime)]
    fn get_current_time(this: &WaveSurfer) -> f64;

    #[wasm_bindgen(method, catch)]
    fn zoom(this: &WaveSurfer, px_per_sec: f64) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = setOptions)]
    fn set_options(this: &WaveSurfer, options: &JsValue);

    #[wasm_bindgen(extends = Emitter)]
    pub type RegionsPlugin;

    #[wasm_bindgen(js_namespace = ["WaveSurfer", "Regions"], js_name = create)]
    fn create_regions() -> RegionsPlugin;

    #[wasm_bindgen(method, js_name = enableDragSelection)]
    fn enable_drag_selection(this: &RegionsPlugin, options: &JsValue) -> JsValue;

    #[wasm_bindgen(js_namespace = ["WaveSurfer", "Timeline"], js_name = create)]
    fn create_timeline(options: &JsValue) -> JsValue;

    #[wasm_bindgen(js_namespace = ["WaveSurfer", "Spectrogram"], js_name = create)]
    fn create_spectrogram(options: &JsValue) -> JsValue;

    /// A region object emitted by the Regions plugin.
    pub type JsRegion;

    #[wasm_bindgen(method, getter)]
    fn start(this: &JsRegion) -> f64;

    #[wasm_bindgen(method, getter)]
    fn end(this: &JsRegion) -> f64;

    #[wasm_bindgen(method)]
    fn remove(this: &JsRegion);
}

impl JsRegion {
    pub fn bounds(&self) -> Region {
        Region::new(self.start(), self.end())
    }
}

/// Mount points for one session.
#[derive(Clone)]
pub struct Containers {
    pub timeline: web_sys::HtmlElement,
    pub wave: web_sys::HtmlElement,
    pub spectrogram: web_sys::HtmlElement,
}

pub enum EventKind {
    Loaded(LoadTicket, Result<(), EngineError>),
    TimeUpdate(f64),
    Interaction(f64),
    Paused,
    RegionCreated(JsRegion),
    RegionUpdated(JsRegion),
    RegionRemoved(JsRegion),
}

/// An engine callback, tagged with the serial of the session that fired it.
pub struct EngineEvent {
    pub session: u32,
    pub kind: EventKind,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WaveOptions<'a> {
    wave_color: &'a str,
    progress_color: &'a str,
    cursor_color: &'a str,
    height: u32,
    sample_rate: u32,
    split_channels: Vec<ChannelOptions<'a>>,
}

#[derive(Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChannelOptions<'a> {
    wave_color: &'a str,
    progress_color: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpectrogramOptions<'a> {
    labels: bool,
    height: u32,
    fft_samples: usize,
    frequency_min: u32,
    frequency_max: u32,
    scale: &'a str,
    color_map: Vec<[f32; 4]>,
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, EngineError> {
    let json = serde_json::to_string(value).map_err(|e| EngineError::Create(e.to_string()))?;
    js_sys::JSON::parse(&json).map_err(|e| EngineError::Create(format!("{:?}", e)))
}

fn set_field(target: &JsValue, key: &str, value: &JsValue) -> Result<(), EngineError> {
    js_sys::Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| EngineError::Create(format!("{:?}", e)))
}

pub struct WaveSurferSession {
    serial: u32,
    wave: WaveSurfer,
    regions: RegionsPlugin,
    active_region: Option<JsRegion>,
    listeners: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl WaveSurferSession {
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Make `region` the one shown, removing the previously shown region.
    pub fn show_region(&mut self, region: JsRegion) {
        if let Some(old) = self.active_region.replace(region) {
            old.remove();
        }
    }

    pub fn remove_region(&mut self) {
        if let Some(old) = self.active_region.take() {
            old.remove();
        }
    }

    /// Whether `region` is the region currently shown.
    pub fn is_shown(&self, region: &JsRegion) -> bool {
        self.active_region
            .as_ref()
            .is_some_and(|shown| js_sys::Object::is(shown.as_ref(), region.as_ref()))
    }

    pub fn forget_region(&mut self) {
        self.active_region = None;
    }

    fn listen(&mut self, emitter: &Emitter, event: &str, viewer: ViewerId, to_kind: fn(JsValue) -> Option<EventKind>) {
        let serial = self.serial;
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |arg: JsValue| {
            if let Some(kind) = to_kind(arg) {
                runtime::dispatch(viewer, EngineEvent { session: serial, kind });
            }
        });
        emitter.on(event, callback.as_ref().unchecked_ref());
        self.listeners.push(callback);
    }
}

impl PlaybackTransport for WaveSurferSession {
    fn play(&mut self) {
        match self.wave.play() {
            Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::error!("playback rejected: {:?}", e);
                }
            }),
            Err(e) => log::error!("play failed: {:?}", e),
        }
    }

    fn pause(&mut self) {
        self.wave.pause();
    }

    fn seek(&mut self, seconds: f64) {
        self.wave.set_time(seconds);
    }

    fn is_playing(&self) -> bool {
        self.wave.is_playing()
    }

    fn current_time(&self) -> f64 {
        self.wave.get_current_time()
    }
}

pub struct WaveSurferEngine {
    viewer: ViewerId,
    next_serial: u32,
}

impl WaveSurferEngine {
    pub fn new(viewer: ViewerId) -> Self {
        Self { viewer, next_serial: 1 }
    }

    fn build(&self, target: &Containers, params: &AnalysisParameters, view: &ViewOptions) -> Result<(WaveSurfer, RegionsPlugin), EngineError> {
        let channel = ChannelOptions { wave_color: WAVE_COLOR, progress_color: PROGRESS_COLOR };
        let options = to_js(&WaveOptions {
            wave_color: WAVE_COLOR,
            progress_color: PROGRESS_COLOR,
            cursor_color: CURSOR_COLOR,
            height: view.height_px,
            sample_rate: params.sample_rate(),
            split_channels: vec![channel; 2],
        })?;
        set_field(&options, "container", &target.wave)?;

        let spectrogram = to_js(&SpectrogramOptions {
            labels: true,
            height: view.height_px,
            fft_samples: params.fft_size,
            frequency_min: 0,
            frequency_max: params.display_max_hz(),
            scale: params.frequency_scale.as_str(),
            color_map: params.colormap.shades(DEFAULT_SHADES),
        })?;
        set_field(&spectrogram, "container", &target.spectrogram)?;

        let timeline = js_sys::Object::new();
        set_field(&timeline, "container", &target.timeline)?;

        let regions = create_regions();
        let plugins = js_sys::Array::of3(&create_timeline(&timeline), &create_spectrogram(&spectrogram), &regions);
        set_field(&options, "plugins", &plugins)?;

        let wave = WaveSurfer::create_wavesurfer(&options).map_err(|e| EngineError::Create(format!("{:?}", e)))?;

        let drag = js_sys::Object::new();
        set_field(&drag, "color", &JsValue::from_str(REGION_COLOR))?;
        regions.enable_drag_selection(&drag);
        Ok((wave, regions))
    }
}

fn time_arg(arg: JsValue) -> Option<f64> {
    arg.as_f64()
}

impl VisualizationEngine for WaveSurferEngine {
    type Target = Containers;
    type Session = WaveSurferSession;

    fn create_session(
        &mut self,
        target: &Containers,
        params: &AnalysisParameters,
        view: &ViewOptions,
    ) -> Result<WaveSurferSession, EngineError> {
        let (wave, regions) = self.build(target, params, view)?;
        let serial = self.next_serial;
        self.next_serial += 1;

        let mut session = WaveSurferSession {
            serial,
            wave,
            regions,
            active_region: None,
            listeners: Vec::new(),
        };
        let viewer = self.viewer;
        let wave_emitter: Emitter = session.wave.clone().unchecked_into();
        let region_emitter: Emitter = session.regions.clone().unchecked_into();
        session.listen(&wave_emitter, "timeupdate", viewer, |arg| time_arg(arg).map(EventKind::TimeUpdate));
        session.listen(&wave_emitter, "interaction", viewer, |arg| time_arg(arg).map(EventKind::Interaction));
        session.listen(&wave_emitter, "pause", viewer, |_| Some(EventKind::Paused));
        session.listen(&wave_emitter, "finish", viewer, |_| Some(EventKind::Paused));
        session.listen(&region_emitter, "region-created", viewer, |arg| {
            Some(EventKind::RegionCreated(arg.unchecked_into()))
        });
        session.listen(&region_emitter, "region-updated", viewer, |arg| {
            Some(EventKind::RegionUpdated(arg.unchecked_into()))
        });
        session.listen(&region_emitter, "region-removed", viewer, |arg| {
            Some(EventKind::RegionRemoved(arg.unchecked_into()))
        });
        Ok(session)
    }

    fn destroy_session(&mut self, session: WaveSurferSession) {
        session.wave.destroy();
        // listeners are released after the emitters are gone
        drop(session);
    }

    fn set_view_options(&mut self, session: &mut WaveSurferSession, view: ViewUpdate) {
        let options = js_sys::Object::new();
        if set_field(&options, "height", &JsValue::from(view.height_px)).is_ok() {
            session.wave.set_options(&options);
        }
        if let Some(zoom) = view.zoom_px_per_sec {
            if let Err(e) = session.wave.zoom(zoom) {
                log::error!("zoom failed: {:?}", e);
            }
        }
    }

    fn load_blob(&mut self, session: &mut WaveSurferSession, blob: &EncodedAudioBlob, ticket: LoadTicket) {
        let viewer = self.viewer;
        let serial = session.serial;
        let loading = session.wave.load(blob.as_str());
        wasm_bindgen_futures::spawn_local(async move {
            let result = match loading {
                Ok(promise) => JsFuture::from(promise).await.map(|_| ()),
                Err(e) => Err(e),
            };
            let result = result.map_err(|e| EngineError::Load(format!("{:?}", e)));
            runtime::dispatch(viewer, EngineEvent { session: serial, kind: EventKind::Loaded(ticket, result) });
        });
    }
}
