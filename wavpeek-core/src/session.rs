//! Lifecycle of the visualization session.
//!
//! The controller owns at most one live session built from a snapshot of
//! [`AnalysisParameters`]. Any parameter change destroys that session and
//! builds a fresh one; view options (zoom, row height) are pushed into the
//! live session in place.
//!
//! Blob loads complete asynchronously. Each load carries a [`LoadTicket`]
//! naming the session it targets and a load generation, and a completion
//! whose ticket no longer matches the live session is dropped.

use crate::data_uri::EncodedAudioBlob;
use crate::error::{EngineError, ParamError};
use crate::params::{AnalysisParameters, ViewOptions};
use crate::region::PlaybackTransport;
use crate::source::SourceDocument;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

/// Identity of one asynchronous blob load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub session: SessionId,
    pub generation: u64,
}

/// View options as pushed to the engine. Zoom is withheld until the loaded
/// content length is known.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewUpdate {
    pub zoom_px_per_sec: Option<f64>,
    pub height_px: u32,
}

/// The external waveform/spectrogram renderer.
pub trait VisualizationEngine {
    /// Where sessions are mounted (container elements).
    type Target;
    type Session: PlaybackTransport;

    fn create_session(
        &mut self,
        target: &Self::Target,
        params: &AnalysisParameters,
        view: &ViewOptions,
    ) -> Result<Self::Session, EngineError>;

    /// Release everything the session holds.
    fn destroy_session(&mut self, session: Self::Session);

    fn set_view_options(&mut self, session: &mut Self::Session, view: ViewUpdate);

    /// Start loading `blob`. The engine reports back through
    /// [`AnalysisSessionController::complete_load`] with the same ticket.
    fn load_blob(&mut self, session: &mut Self::Session, blob: &EncodedAudioBlob, ticket: LoadTicket);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    NoSession,
    Loading(SessionId),
    Ready(SessionId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Ready,
    /// The ticket targets a replaced session or a superseded load.
    Stale,
    Failed(EngineError),
}

struct LiveSession<S> {
    id: SessionId,
    session: S,
    last_params: AnalysisParameters,
    data_ready: bool,
    pending: Option<LoadTicket>,
}

pub struct AnalysisSessionController<E: VisualizationEngine> {
    engine: E,
    target: Option<E::Target>,
    params: AnalysisParameters,
    view: ViewOptions,
    source: Option<SourceDocument>,
    live: Option<LiveSession<E::Session>>,
    next_session: u64,
    next_load: u64,
}

impl<E: VisualizationEngine> AnalysisSessionController<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            target: None,
            params: AnalysisParameters::default(),
            view: ViewOptions::default(),
            source: None,
            live: None,
            next_session: 1,
            next_load: 1,
        }
    }

    pub fn with_params(engine: E, params: AnalysisParameters, view: ViewOptions) -> Result<Self, ParamError> {
        params.validate()?;
        view.validate()?;
        Ok(Self { params, view, ..Self::new(engine) })
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Container elements became available. Replaces any previous target.
    pub fn mount(&mut self, target: E::Target) {
        self.teardown();
        self.target = Some(target);
        self.ensure_session();
    }

    /// Containers went away; the live session is destroyed.
    pub fn unmount(&mut self) {
        self.teardown();
        self.target = None;
    }

    /// A new blob was supplied by the host.
    pub fn load(&mut self, source: SourceDocument) {
        self.source = Some(source);
        if self.live.is_some() {
            self.start_load();
        } else {
            self.ensure_session();
        }
    }

    /// Apply user-selected analysis parameters. Rebuilds the live session
    /// when they differ from the ones it was built with.
    pub fn set_params(&mut self, params: AnalysisParameters) -> Result<(), ParamError> {
        params.validate()?;
        self.params = params;
        match &self.live {
            Some(live) if live.last_params != self.params => {
                log::debug!("parameters changed, rebuilding session {:?}", live.id);
                self.teardown();
                self.ensure_session();
            }
            Some(_) => {}
            None => self.ensure_session(),
        }
        Ok(())
    }

    /// Apply view-only options to the live session without rebuilding it.
    pub fn set_view(&mut self, view: ViewOptions) -> Result<(), ParamError> {
        view.validate()?;
        self.view = view;
        self.push_view();
        Ok(())
    }

    /// Completion of an asynchronous load started by this controller.
    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<(), EngineError>) -> LoadOutcome {
        let Some(live) = self.live.as_mut().filter(|live| live.pending == Some(ticket)) else {
            log::debug!("dropping stale load completion {:?}", ticket);
            return LoadOutcome::Stale;
        };
        live.pending = None;
        match result {
            Ok(()) => {
                live.data_ready = true;
                log::debug!("session {:?} data ready", live.id);
                self.push_view();
                LoadOutcome::Ready
            }
            Err(e) => {
                log::warn!("session {:?}: {}", live.id, e);
                LoadOutcome::Failed(e)
            }
        }
    }

    // ── Observers ───────────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        match &self.live {
            None => SessionStatus::NoSession,
            Some(live) if live.data_ready => SessionStatus::Ready(live.id),
            Some(live) => SessionStatus::Loading(live.id),
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.live.as_ref().map(|live| live.id)
    }

    pub fn is_data_ready(&self) -> bool {
        self.live.as_ref().is_some_and(|live| live.data_ready)
    }

    /// Parameters the live session was built with.
    pub fn last_params(&self) -> Option<&AnalysisParameters> {
        self.live.as_ref().map(|live| &live.last_params)
    }

    /// Most recently applied parameters.
    pub fn params(&self) -> &AnalysisParameters {
        &self.params
    }

    pub fn view(&self) -> &ViewOptions {
        &self.view
    }

    pub fn source(&self) -> Option<&SourceDocument> {
        self.source.as_ref()
    }

    /// Sample rate of the loaded file, visible once its data is ready and
    /// the header was recognized.
    pub fn sample_rate(&self) -> Option<u32> {
        if !self.is_data_ready() {
            return None;
        }
        self.source.as_ref()?.sample_rate()
    }

    pub fn session_mut(&mut self) -> Option<&mut E::Session> {
        self.live.as_mut().map(|live| &mut live.session)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn ensure_session(&mut self) {
        if self.live.is_some() || self.source.is_none() {
            return;
        }
        let Some(target) = self.target.as_ref() else { return };

        let id = SessionId(self.next_session);
        self.next_session += 1;
        match self.engine.create_session(target, &self.params, &self.view) {
            Ok(session) => {
                log::info!("created session {:?} (fft {})", id, self.params.fft_size);
                self.live = Some(LiveSession {
                    id,
                    session,
                    last_params: self.params.clone(),
                    data_ready: false,
                    pending: None,
                });
                self.start_load();
            }
            Err(e) => log::warn!("no session: {}", e),
        }
    }

    fn teardown(&mut self) {
        if let Some(live) = self.live.take() {
            log::info!("destroying session {:?}", live.id);
            self.engine.destroy_session(live.session);
        }
    }

    fn start_load(&mut self) {
        let (Some(live), Some(source)) = (self.live.as_mut(), self.source.as_ref()) else { return };
        let ticket = LoadTicket { session: live.id, generation: self.next_load };
        self.next_load += 1;
        live.data_ready = false;
        live.pending = Some(ticket);
        self.engine.load_blob(&mut live.session, source.blob(), ticket);
    }

    fn push_view(&mut self) {
        let Some(live) = self.live.as_mut() else { return };
        let update = ViewUpdate {
            zoom_px_per_sec: live.data_ready.then_some(self.view.zoom_px_per_sec),
            height_px: self.view.height_px,
        };
        self.engine.set_view_options(&mut live.session, update);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::colormap::ColormapName;
    use crate::params::FFT_SIZES;
    use crate::riff::tests::mono_44k;
    use proptest::prelude::*;

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum Call {
        Create(u32, AnalysisParameters),
        Destroy(u32),
        View(u32, ViewUpdate),
        Load(u32, LoadTicket),
    }

    #[derive(Debug)]
    pub(crate) struct MockSession {
        pub id: u32,
        pub playing: bool,
        pub time: f64,
        pub seeks: Vec<f64>,
    }

    impl PlaybackTransport for MockSession {
        fn play(&mut self) {
            self.playing = true;
        }
        fn pause(&mut self) {
            self.playing = false;
        }
        fn seek(&mut self, seconds: f64) {
            self.time = seconds;
            self.seeks.push(seconds);
        }
        fn is_playing(&self) -> bool {
            self.playing
        }
        fn current_time(&self) -> f64 {
            self.time
        }
    }

    #[derive(Default)]
    pub(crate) struct MockEngine {
        pub calls: Vec<Call>,
        pub live: Vec<u32>,
        pub max_live: usize,
        pub fail_creates: usize,
        next: u32,
    }

    impl MockEngine {
        pub fn creates(&self) -> usize {
            self.calls.iter().filter(|c| matches!(c, Call::Create(..))).count()
        }
        pub fn destroys(&self) -> usize {
            self.calls.iter().filter(|c| matches!(c, Call::Destroy(_))).count()
        }
        pub fn last_ticket(&self) -> Option<LoadTicket> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::Load(_, t) => Some(*t),
                _ => None,
            })
        }
    }

    impl VisualizationEngine for MockEngine {
        type Target = &'static str;
        type Session = MockSession;

        fn create_session(
            &mut self,
            target: &Self::Target,
            params: &AnalysisParameters,
            _view: &ViewOptions,
        ) -> Result<MockSession, EngineError> {
            if self.fail_creates > 0 {
                self.fail_creates -= 1;
                return Err(EngineError::Create(format!("no container {target}")));
            }
            self.next += 1;
            self.calls.push(Call::Create(self.next, params.clone()));
            self.live.push(self.next);
            self.max_live = self.max_live.max(self.live.len());
            Ok(MockSession { id: self.next, playing: false, time: 0.0, seeks: Vec::new() })
        }

        fn destroy_session(&mut self, session: MockSession) {
            self.calls.push(Call::Destroy(session.id));
            self.live.retain(|&id| id != session.id);
        }

        fn set_view_options(&mut self, session: &mut MockSession, view: ViewUpdate) {
            self.calls.push(Call::View(session.id, view));
        }

        fn load_blob(&mut self, session: &mut MockSession, _blob: &EncodedAudioBlob, ticket: LoadTicket) {
            self.calls.push(Call::Load(session.id, ticket));
        }
    }

    pub(crate) fn source() -> SourceDocument {
        let blob = EncodedAudioBlob::from_base64("audio/wav", "UklGRg==").unwrap();
        SourceDocument::new(blob, mono_44k(8))
    }

    fn ready_controller() -> AnalysisSessionController<MockEngine> {
        let mut ctl = AnalysisSessionController::new(MockEngine::default());
        ctl.mount("#wave");
        ctl.load(source());
        let ticket = ctl.engine().last_ticket().unwrap();
        assert_eq!(ctl.complete_load(ticket, Ok(())), LoadOutcome::Ready);
        ctl
    }

    #[test]
    fn test_needs_target_and_source() {
        let mut ctl = AnalysisSessionController::new(MockEngine::default());
        ctl.load(source());
        assert_eq!(ctl.status(), SessionStatus::NoSession);

        let mut ctl = AnalysisSessionController::new(MockEngine::default());
        ctl.mount("#wave");
        assert_eq!(ctl.status(), SessionStatus::NoSession);
        assert!(ctl.engine().calls.is_empty());

        ctl.load(source());
        assert_eq!(ctl.status(), SessionStatus::Loading(SessionId(1)));
        assert_eq!(ctl.engine().creates(), 1);
    }

    #[test]
    fn test_load_completion_marks_ready() {
        let ctl = ready_controller();
        assert!(ctl.is_data_ready());
        assert_eq!(ctl.sample_rate(), Some(44_100));
        assert_eq!(ctl.status(), SessionStatus::Ready(SessionId(1)));
        assert_eq!(
            ctl.engine().calls.last(),
            Some(&Call::View(1, ViewUpdate { zoom_px_per_sec: Some(1.0), height_px: 128 }))
        );
    }

    #[test]
    fn test_sample_rate_hidden_until_ready() {
        let mut ctl = AnalysisSessionController::new(MockEngine::default());
        ctl.mount("#wave");
        ctl.load(source());
        assert_eq!(ctl.sample_rate(), None);
    }

    #[test]
    fn test_fft_change_rebuilds_once() {
        let mut ctl = ready_controller();
        let before = ctl.last_params().unwrap().clone();
        let calls_before = ctl.engine().calls.len();

        let params = AnalysisParameters { fft_size: 1024, ..before.clone() };
        ctl.set_params(params).unwrap();

        let new_calls = &ctl.engine().calls[calls_before..];
        assert_eq!(new_calls.iter().filter(|c| matches!(c, Call::Destroy(_))).count(), 1);
        assert_eq!(new_calls.iter().filter(|c| matches!(c, Call::Create(..))).count(), 1);
        assert_eq!(new_calls[0], Call::Destroy(1));
        assert!(matches!(new_calls[1], Call::Create(2, _)));

        let after = ctl.last_params().unwrap();
        assert_eq!(after.fft_size, 1024);
        assert_eq!(AnalysisParameters { fft_size: before.fft_size, ..after.clone() }, before);
        assert_eq!(ctl.engine().max_live, 1);
        // the rebuilt session reloads the current blob
        assert!(matches!(new_calls[2], Call::Load(2, _)));
        assert!(!ctl.is_data_ready());
    }

    #[test]
    fn test_unchanged_params_keep_session() {
        let mut ctl = ready_controller();
        ctl.set_params(AnalysisParameters::default()).unwrap();
        assert_eq!(ctl.engine().creates(), 1);
        assert_eq!(ctl.engine().destroys(), 0);
        assert!(ctl.is_data_ready());
    }

    #[test]
    fn test_view_updates_in_place() {
        let mut ctl = AnalysisSessionController::new(MockEngine::default());
        ctl.mount("#wave");
        ctl.load(source());
        ctl.set_view(ViewOptions { zoom_px_per_sec: 200.0, height_px: 64 }).unwrap();
        assert_eq!(
            ctl.engine().calls.last(),
            Some(&Call::View(1, ViewUpdate { zoom_px_per_sec: None, height_px: 64 }))
        );

        let ticket = ctl.engine().last_ticket().unwrap();
        ctl.complete_load(ticket, Ok(()));
        assert_eq!(
            ctl.engine().calls.last(),
            Some(&Call::View(1, ViewUpdate { zoom_px_per_sec: Some(200.0), height_px: 64 }))
        );
        assert_eq!(ctl.engine().creates(), 1);
        assert_eq!(ctl.engine().destroys(), 0);
    }

    #[test]
    fn test_stale_completion_after_rebuild() {
        let mut ctl = AnalysisSessionController::new(MockEngine::default());
        ctl.mount("#wave");
        ctl.load(source());
        let old = ctl.engine().last_ticket().unwrap();

        ctl.set_params(AnalysisParameters { colormap: ColormapName::Magma, ..Default::default() })
            .unwrap();
        assert_eq!(ctl.complete_load(old, Ok(())), LoadOutcome::Stale);
        assert!(!ctl.is_data_ready());

        let current = ctl.engine().last_ticket().unwrap();
        assert_eq!(current.session, SessionId(2));
        assert_eq!(ctl.complete_load(current, Ok(())), LoadOutcome::Ready);
    }

    #[test]
    fn test_stale_completion_after_new_blob() {
        let mut ctl = ready_controller();
        ctl.load(source());
        let first = ctl.engine().last_ticket().unwrap();
        ctl.load(source());
        let second = ctl.engine().last_ticket().unwrap();
        assert_eq!(first.session, second.session);
        assert_ne!(first.generation, second.generation);

        assert_eq!(ctl.complete_load(first, Ok(())), LoadOutcome::Stale);
        assert!(!ctl.is_data_ready());
        assert_eq!(ctl.complete_load(second, Ok(())), LoadOutcome::Ready);
        // a repeated completion is stale too
        assert_eq!(ctl.complete_load(second, Ok(())), LoadOutcome::Stale);
    }

    #[test]
    fn test_create_failure_retried_on_next_trigger() {
        let engine = MockEngine { fail_creates: 1, ..Default::default() };
        let mut ctl = AnalysisSessionController::new(engine);
        ctl.mount("#missing");
        ctl.load(source());
        assert_eq!(ctl.status(), SessionStatus::NoSession);
        assert_eq!(ctl.engine().creates(), 0);

        ctl.set_params(AnalysisParameters { fft_size: 512, ..Default::default() }).unwrap();
        assert_eq!(ctl.engine().creates(), 1);
        assert_eq!(ctl.last_params().unwrap().fft_size, 512);
    }

    #[test]
    fn test_load_failure_leaves_not_ready() {
        let mut ctl = AnalysisSessionController::new(MockEngine::default());
        ctl.mount("#wave");
        ctl.load(source());
        let ticket = ctl.engine().last_ticket().unwrap();
        let outcome = ctl.complete_load(ticket, Err(EngineError::Load("decode".into())));
        assert_eq!(outcome, LoadOutcome::Failed(EngineError::Load("decode".into())));
        assert_eq!(ctl.status(), SessionStatus::Loading(SessionId(1)));
        assert_eq!(ctl.sample_rate(), None);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut ctl = ready_controller();
        let err = ctl.set_params(AnalysisParameters { fft_size: 3, ..Default::default() });
        assert_eq!(err, Err(ParamError::FftSize(3)));
        assert_eq!(ctl.params(), &AnalysisParameters::default());
        assert_eq!(ctl.engine().creates(), 1);
        assert!(ctl.set_view(ViewOptions { zoom_px_per_sec: 0.0, height_px: 1 }).is_err());
    }

    #[test]
    fn test_unmount_and_remount() {
        let mut ctl = ready_controller();
        ctl.unmount();
        assert_eq!(ctl.status(), SessionStatus::NoSession);
        assert!(ctl.engine().live.is_empty());

        ctl.mount("#other");
        assert_eq!(ctl.session_id(), Some(SessionId(2)));
        ctl.mount("#third");
        assert_eq!(ctl.session_id(), Some(SessionId(3)));
        assert_eq!(ctl.engine().max_live, 1);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Fft(usize),
        Colormap(usize),
        Zoom(f64),
        Load,
        CompleteLatest,
        CompleteStale,
        Unmount,
        Mount,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..FFT_SIZES.len()).prop_map(|i| Op::Fft(FFT_SIZES[i])),
            (0..ColormapName::ALL.len()).prop_map(Op::Colormap),
            (1.0f64..30_000.0).prop_map(Op::Zoom),
            Just(Op::Load),
            Just(Op::CompleteLatest),
            Just(Op::CompleteStale),
            Just(Op::Unmount),
            Just(Op::Mount),
        ]
    }

    proptest! {
        #[test]
        fn prop_single_live_session(ops in prop::collection::vec(op(), 1..40)) {
            let mut ctl = AnalysisSessionController::new(MockEngine::default());
            ctl.mount("#wave");
            for op in ops {
                match op {
                    Op::Fft(n) => {
                        let params = AnalysisParameters { fft_size: n, ..ctl.params().clone() };
                        ctl.set_params(params).unwrap();
                    }
                    Op::Colormap(i) => {
                        let params = AnalysisParameters { colormap: ColormapName::ALL[i], ..ctl.params().clone() };
                        ctl.set_params(params).unwrap();
                    }
                    Op::Zoom(z) => ctl.set_view(ViewOptions::default().with_zoom(z)).unwrap(),
                    Op::Load => ctl.load(source()),
                    Op::CompleteLatest => {
                        if let Some(ticket) = ctl.engine().last_ticket() {
                            ctl.complete_load(ticket, Ok(()));
                        }
                    }
                    Op::CompleteStale => {
                        let stale = LoadTicket { session: SessionId(0), generation: 0 };
                        prop_assert_eq!(ctl.complete_load(stale, Ok(())), LoadOutcome::Stale);
                    }
                    Op::Unmount => ctl.unmount(),
                    Op::Mount => ctl.mount("#wave"),
                }
                prop_assert!(ctl.engine().live.len() <= 1);
                if let Some(last) = ctl.last_params() {
                    prop_assert_eq!(last, ctl.params());
                }
            }
            prop_assert!(ctl.engine().max_live <= 1);
        }
    }
}
