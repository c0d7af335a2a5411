//! Pipeline stages
//!
//! Each stage lives in its own module, leaf-first:
//! frequency → object_resolver → week_range → horizon → heatmap.

pub mod frequency;
pub mod object_resolver;
pub mod week_range;
pub mod horizon;
pub mod heatmap;

pub use frequency::{normalize_frequency, Frequency, FrequencyUnit};
pub use object_resolver::{object_from_description, ObjectResolver, ObjectRule, Resolution};
pub use week_range::{occupied_weeks, week_number};
pub use horizon::{DroppedTask, HorizonExceeded, PlanningHorizon};
pub use heatmap::{build_heatmap, week_order, HeatmapRow, HeatmapTable, MetadataColumn, MetadataValue};
