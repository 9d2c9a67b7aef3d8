//! SkyCast dashboard: selected-city session, fetch-cycle controller,
//! debounced city suggestions and terminal rendering.

pub mod autocomplete;
pub mod controller;
mod error_mapping;
pub mod render;
pub mod session;

pub use autocomplete::{Autocomplete, SuggestionUpdate};
pub use controller::{
    CycleOutcome, Dashboard, DashboardError, DashboardOptions, DashboardState, PendingCycle,
    LOCATION_FALLBACK_NOTICE,
};
pub use render::Renderer;
pub use session::Session;
