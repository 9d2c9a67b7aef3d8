//! Weather data for SkyCast
//!
//! WeatherAPI forecast and history client, the history + forecast timeline,
//! condition themes, device geolocation and city name lookup.

pub mod format;
pub mod history;
pub mod location;
pub mod lookup;
pub mod provider;
pub mod theme;
pub mod types;
mod wire;

pub use format::{format_date, AqiLevel, ConditionIcon};
pub use history::{build_timeline, merge_timeline, TimelineDates};
pub use location::{geolocator_from_config, locate_with_timeout, Coordinates, Geolocator};
pub use lookup::{city_from_suggestion, CityLookupClient, Suggestion};
pub use provider::{ProviderSettings, WeatherProvider};
pub use theme::{select_theme, Theme, ThemeKind};
pub use types::*;
