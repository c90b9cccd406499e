pub mod byte_dump;
pub mod colormap;
pub mod data_uri;
pub mod error;
pub mod le_reader;
pub mod params;
pub mod region;
pub mod riff;
pub mod session;
pub mod source;

pub use data_uri::EncodedAudioBlob;
pub use error::{BlobError, EngineError, FormatError, ParamError, ReadError};
pub use params::{AnalysisParameters, FrequencyScale, ViewOptions};
pub use region::{PlaybackTransport, Region, RegionPlaybackSync, SampleRange};
pub use riff::WaveFormatInfo;
pub use session::{AnalysisSessionController, LoadTicket, SessionId, VisualizationEngine};
pub use source::SourceDocument;
