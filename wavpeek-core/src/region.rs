//! Single-region selection and region-bound playback.

/// Transport controls of a live session.
pub trait PlaybackTransport {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    fn is_playing(&self) -> bool;
    fn current_time(&self) -> f64;
}

/// A selected time interval in seconds, `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub start: f64,
    pub end: f64,
}

impl Region {
    /// Orders the bounds and clamps them to zero.
    pub fn new(a: f64, b: f64) -> Self {
        Self { start: a.min(b).max(0.0), end: a.max(b).max(0.0) }
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn sample_range(&self, sample_rate: u32) -> SampleRange {
        let rate = sample_rate as f64;
        SampleRange {
            start: (self.start * rate).round() as u64,
            end: (self.end * rate).round() as u64,
        }
    }
}

/// A region in sample indices, `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleRange {
    pub start: u64,
    pub end: u64,
}

/// Identity of one region value. Every create or update yields a new id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveRegion {
    pub id: RegionId,
    pub region: Region,
}

/// Externally observed playback state. `is_playing` is `None` until the
/// user first starts or stops playback.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackState {
    pub is_playing: Option<bool>,
    pub current_time: f64,
}

#[derive(Debug, Default)]
pub struct RegionPlaybackSync {
    active: Option<ActiveRegion>,
    playback: PlaybackState,
    sample_rate: Option<u32>,
    next_id: u64,
}

impl RegionPlaybackSync {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_region(&mut self, region: Region) -> ActiveRegion {
        self.next_id += 1;
        ActiveRegion { id: RegionId(self.next_id), region }
    }

    /// A drag-selection finished. Returns the region it evicted, which the
    /// caller removes from the engine.
    pub fn region_created(&mut self, start: f64, end: f64) -> Option<ActiveRegion> {
        let region = self.next_region(Region::new(start, end));
        let evicted = self.active.replace(region);
        if let Some(old) = &evicted {
            log::debug!("region {:?} evicted by {:?}", old.id, region.id);
        }
        evicted
    }

    /// The active region's bounds were edited.
    pub fn region_updated(&mut self, start: f64, end: f64) -> ActiveRegion {
        let region = self.next_region(Region::new(start, end));
        self.active = Some(region);
        region
    }

    pub fn clear_region(&mut self) -> Option<ActiveRegion> {
        self.active.take()
    }

    pub fn active(&self) -> Option<ActiveRegion> {
        self.active
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    /// Start playback, seeking to the region start first when the playhead
    /// lies outside the active region.
    pub fn play<T: PlaybackTransport + ?Sized>(&mut self, transport: &mut T) {
        let now = transport.current_time();
        match self.active {
            Some(active) if !active.region.contains(now) => {
                transport.seek(active.region.start);
                self.playback.current_time = active.region.start;
            }
            _ => self.playback.current_time = now,
        }
        transport.play();
        self.playback.is_playing = Some(true);
    }

    pub fn pause<T: PlaybackTransport + ?Sized>(&mut self, transport: &mut T) {
        transport.pause();
        self.playback.is_playing = Some(false);
    }

    pub fn toggle<T: PlaybackTransport + ?Sized>(&mut self, transport: &mut T) {
        if transport.is_playing() {
            self.pause(transport);
        } else {
            self.play(transport);
        }
    }

    /// Playhead advanced during playback. Returns `true` if playback was
    /// stopped at the region end.
    pub fn time_update<T: PlaybackTransport + ?Sized>(&mut self, transport: &mut T, time: f64) -> bool {
        self.playback.current_time = time;
        let past_end = self.active.is_some_and(|active| time > active.region.end);
        if past_end && transport.is_playing() {
            self.pause(transport);
            return true;
        }
        false
    }

    /// The user clicked or dragged on the timeline. Returns the region that
    /// was cleared because the new time fell outside it.
    pub fn interaction(&mut self, time: f64) -> Option<ActiveRegion> {
        self.playback.current_time = time;
        if self.active.is_some_and(|active| !active.region.contains(time)) {
            return self.active.take();
        }
        None
    }

    /// The engine paused on its own (end of media).
    pub fn engine_paused(&mut self) {
        self.playback.is_playing = Some(false);
    }

    pub fn set_sample_rate(&mut self, sample_rate: Option<u32>) {
        self.sample_rate = sample_rate.filter(|&rate| rate > 0);
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    /// Sample indices of the active region, when the sample rate is known.
    pub fn sample_range(&self) -> Option<SampleRange> {
        let active = self.active?;
        Some(active.region.sample_range(self.sample_rate?))
    }

    /// Forget region, playback and sample rate; used when the session is
    /// rebuilt or a new blob arrives.
    pub fn reset(&mut self) {
        self.active = None;
        self.playback = PlaybackState::default();
        self.sample_rate = None;
    }
}
