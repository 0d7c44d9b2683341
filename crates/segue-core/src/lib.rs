pub mod assets;
pub mod curves;
pub mod diagnostics;
pub mod engine;
pub mod fixtures;
pub mod harmony;
pub mod ingest;
pub mod length;
pub mod model;
pub mod planner;
pub mod render;
pub mod report;
pub mod schedule;
pub mod time;
pub mod wav;

pub use assets::{DeckAudio, LibraryEntry, decode_audio_file, scan_track_library};
pub use curves::{XfadeCurve, ease_in_cubic, ease_out_cubic};
pub use diagnostics::{TelemetryGuard, init_tracing, init_tracing_with_options};
pub use engine::{Deck, DeckSide, Engine, EngineError, PlanRequest, Session};
pub use harmony::{nearest_semitone_delta, ratio_from_semitones};
pub use ingest::{analysis_from_value, load_analysis};
pub use model::{Bar, Beat, Section, TrackAnalysis, TransitionPlan};
pub use planner::{PlanOptions, TempoStrategy, plan};
pub use render::{OfflineRenderer, OutputSpec, RenderDevice, RenderError, RenderJob, RenderedMix};
pub use report::{TransitionReport, generate_report};
pub use schedule::{Keyframe, RenderOptions, schedule, with_time_origin};
pub use wav::encode_wav_pcm16;
