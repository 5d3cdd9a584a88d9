//! Shape-grammar growth: polygons keyed by canonical geometry, productions that
//! rewrite matched polygon sets under a uniform scale + translation, and a
//! scheduler that grows a scene one candidate at a time.

pub mod bounds;
pub mod engine;
pub mod error;
pub mod geom;
pub mod presets;
pub mod production;
pub mod render;
pub mod runner;
pub mod scheduler;
pub mod select;
pub mod settings;
pub mod shape;
pub mod store;

pub use bounds::{Bounds, InBounds};
pub use engine::{find_applicable_productions, Candidate, Sampling, SearchOptions};
pub use error::{GrowError, Result};
pub use geom::Point;
pub use presets::Preset;
pub use production::{Grammar, Production, ProductionId};
pub use runner::{AutoRunner, GrowthUpdate};
pub use scheduler::{ApplyReport, GrowthPolicy, RunState, Scheduler, TickOutcome};
pub use settings::GrowSettings;
pub use shape::{PolyId, Polygon, Shape, ShapeKey, Style};
pub use store::Store;
