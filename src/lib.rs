//! Tasksweep drives an unattended screen agent that finds UI markers by
//! template matching and works through a list of tasks.
//!
//! The crate is the scanning and pagination engine plus the workflow built
//! on it. Screen capture, input injection and start/cancel triggers are
//! collaborator traits in [`desktop`]; a host binary supplies them.
//!
//! Layers, leaves first:
//! - [`search`]: cancellable best-placement search, coarse-to-fine over an
//!   image pyramid when the marker survives downsampling.
//! - [`matcher`]: one ZNCC best-match lookup with a fixed acceptance threshold.
//! - [`suppress`]: exclusion masks that erase a matched region.
//! - [`scanner`]: every occurrence of a marker in one frame.
//! - [`dedup`] and [`collector`]: merging scrolled captures of a list into
//!   one ordered, deduplicated collection.
//! - [`workflow`]: the per-task state machine and the supervisor loop.
//!
//! Optional features: `rayon` for a row-parallel kernel, `image-io` for
//! loading marker files, `tracing` for structured logs.

pub mod collector;
pub mod config;
pub mod dedup;
pub mod desktop;
pub mod frame;
pub mod geometry;
pub mod image;
pub mod kernel;
pub mod matcher;
pub mod run;
pub mod scanner;
pub mod search;
pub mod suppress;
pub mod template;
mod trace;
pub mod util;
pub mod workflow;

pub use collector::{Collection, PaginatedCollector, ScanSession, SearchState, WorkItem};
pub use config::AgentConfig;
pub use dedup::{CourseDedupIndex, DedupPolicy, ExactDedup};
pub use desktop::{Desktop, FrameSource, InputActuator, Pacer, ThreadPacer, TriggerSource, Triggers};
pub use frame::Frame;
pub use geometry::{Point, Rect};
pub use image::{ImageView, OwnedImage};
pub use kernel::{Kernel, Peak};
pub use matcher::{FrameMatcher, Match, MatchConfig};
pub use run::{CancelToken, RunContext};
pub use scanner::IconScanner;
pub use search::SearchConfig;
pub use suppress::ExclusionMask;
pub use template::{Marker, Template, TemplateStore};
pub use util::{TaskSweepError, TaskSweepResult};
pub use workflow::{Supervisor, TaskOutcome, TaskProcessor, VideoOutcome};
