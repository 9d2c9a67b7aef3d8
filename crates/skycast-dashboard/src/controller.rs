//! Fetch-cycle orchestration: geolocation, forecast, history timeline, theme.
//!
//! Every cycle is tagged with a generation from [`CycleCounter`]. Starting a
//! new cycle supersedes the previous one; a superseded cycle never touches
//! the shared state, whatever it later receives from the network.

use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::Serialize;
use skycast_core::{AppError, Config, CycleCounter, FetchErrorKind, ViewPhase};
use skycast_weather::{
    build_timeline, geolocator_from_config, locate_with_timeout, select_theme, FetchError,
    Geolocator, LocationError, LocationQuery, Theme, ThemeKind, TimelineDates, TimelineEntry,
    WeatherPayload, WeatherProvider,
};
use std::sync::Arc;
use std::time::Duration;

use crate::session::Session;

/// Error type for dashboard operations
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error("Dashboard setup failed: {0}")]
    Setup(String),
}

/// Message shown alongside the fallback forecast when geolocation fails
pub const LOCATION_FALLBACK_NOTICE: &str = "Unable to access location";

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub default_city: String,
    pub history_days: u8,
    pub locate_timeout: Duration,
}

impl From<&Config> for DashboardOptions {
    fn from(config: &Config) -> Self {
        Self {
            default_city: config.weather.default_city.clone(),
            history_days: config.weather.history_days,
            locate_timeout: config.location.timeout(),
        }
    }
}

/// Snapshot of everything the dashboard displays
#[derive(Debug, Clone, Serialize)]
pub struct DashboardState {
    pub phase: ViewPhase,
    pub query: Option<LocationQuery>,
    pub payload: Option<WeatherPayload>,
    pub timeline: Vec<TimelineEntry>,
    pub theme: Theme,
    pub error_message: Option<String>,
    pub notice: Option<String>,
    pub generation: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            phase: ViewPhase::Loading,
            query: None,
            payload: None,
            timeline: Vec::new(),
            theme: ThemeKind::Default.theme(),
            error_message: None,
            notice: None,
            generation: 0,
        }
    }
}

impl DashboardState {
    /// Error kind when the cycle ended in an error; `Some(None)` is "unexpected"
    pub fn error_kind(&self) -> Option<Option<FetchErrorKind>> {
        match self.phase {
            ViewPhase::Error(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Result of running one fetch cycle
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// The cycle finished and its state is now current
    Committed(DashboardState),
    /// A newer cycle started first; nothing was written
    Superseded,
}

impl CycleOutcome {
    pub fn state(&self) -> Option<&DashboardState> {
        match self {
            CycleOutcome::Committed(state) => Some(state),
            CycleOutcome::Superseded => None,
        }
    }
}

/// A cycle that has its generation but has not touched the network yet
#[derive(Debug, Clone)]
pub struct PendingCycle {
    generation: u64,
    target: CycleTarget,
}

impl PendingCycle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
enum CycleTarget {
    Locate,
    Query(LocationQuery),
}

pub struct Dashboard {
    provider: WeatherProvider,
    geolocator: Arc<dyn Geolocator>,
    session: Session,
    cycles: CycleCounter,
    state: RwLock<DashboardState>,
    options: DashboardOptions,
    fixed_today: Option<NaiveDate>,
}

impl Dashboard {
    pub fn new(
        provider: WeatherProvider,
        geolocator: Arc<dyn Geolocator>,
        options: DashboardOptions,
    ) -> Self {
        Self {
            provider,
            geolocator,
            session: Session::new(),
            cycles: CycleCounter::new(),
            state: RwLock::new(DashboardState::default()),
            options,
            fixed_today: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, DashboardError> {
        let provider = WeatherProvider::from_config(&config.weather)?;
        let geolocator: Arc<dyn Geolocator> = Arc::from(geolocator_from_config(&config.location)?);
        tracing::debug!(geolocator = geolocator.name(), "Dashboard created");
        Ok(Self::new(provider, geolocator, DashboardOptions::from(config)))
    }

    /// Pin "today" instead of reading the clock
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> DashboardState {
        self.state.read().clone()
    }

    fn timeline_dates(&self) -> TimelineDates {
        self.fixed_today.map_or_else(TimelineDates::now, TimelineDates::fixed)
    }

    // The begin_* methods apply the session change and take the generation
    // without awaiting, so callers that spawn the cycle keep their order.

    pub fn begin_initialize(&self) -> PendingCycle {
        let target = match self.session.selected() {
            Some(city) => CycleTarget::Query(LocationQuery::City(city)),
            None => CycleTarget::Locate,
        };
        self.begin(target)
    }

    pub fn begin_select(&self, city: &str) -> PendingCycle {
        self.session.set_city(Some(city.to_string()));
        self.begin_initialize()
    }

    pub fn begin_fetch(&self, query: LocationQuery) -> PendingCycle {
        self.begin(CycleTarget::Query(query))
    }

    pub fn begin_retry(&self) -> PendingCycle {
        let city = self
            .session
            .selected()
            .unwrap_or_else(|| self.options.default_city.clone());
        tracing::info!(city = %city, "Retrying");
        self.begin_fetch(LocationQuery::City(city))
    }

    pub fn begin_home(&self) -> PendingCycle {
        self.session.set_city(None);
        self.begin_fetch(LocationQuery::City(self.options.default_city.clone()))
    }

    fn begin(&self, target: CycleTarget) -> PendingCycle {
        PendingCycle {
            generation: self.cycles.begin(),
            target,
        }
    }

    /// Drive a started cycle to completion.
    pub async fn run(&self, cycle: PendingCycle) -> CycleOutcome {
        match cycle.target {
            CycleTarget::Query(query) => self.execute(cycle.generation, query, None).await,
            CycleTarget::Locate => self.locate_and_fetch(cycle.generation).await,
        }
    }

    /// First load: the selected city if there is one, else the device position.
    pub async fn initialize(&self) -> CycleOutcome {
        self.run(self.begin_initialize()).await
    }

    /// Select `city` and fetch it. A blank name clears the selection and
    /// falls back to the device position.
    pub async fn select_city(&self, city: &str) -> CycleOutcome {
        self.run(self.begin_select(city)).await
    }

    /// Fetch an explicit query without changing the selected city.
    pub async fn fetch(&self, query: LocationQuery) -> CycleOutcome {
        self.run(self.begin_fetch(query)).await
    }

    /// Re-run the fetch for the selected city, or the default city.
    pub async fn retry(&self) -> CycleOutcome {
        self.run(self.begin_retry()).await
    }

    /// Clear the selection and show the default city.
    pub async fn go_home(&self) -> CycleOutcome {
        self.run(self.begin_home()).await
    }

    async fn locate_and_fetch(&self, generation: u64) -> CycleOutcome {
        if !self.mark_loading(generation, None) {
            return CycleOutcome::Superseded;
        }

        match locate_with_timeout(self.geolocator.as_ref(), self.options.locate_timeout).await {
            Ok(coordinates) => self.execute(generation, coordinates.to_query(), None).await,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = %self.options.default_city,
                    "Geolocation failed, using default city"
                );
                let fallback = LocationQuery::City(self.options.default_city.clone());
                self.execute(generation, fallback, Some(LOCATION_FALLBACK_NOTICE.to_string()))
                    .await
            }
        }
    }

    async fn execute(
        &self,
        generation: u64,
        query: LocationQuery,
        notice: Option<String>,
    ) -> CycleOutcome {
        if !self.mark_loading(generation, Some(&query)) {
            return CycleOutcome::Superseded;
        }

        let result = self.load(&query).await;
        self.commit(generation, query, result, notice)
    }

    async fn load(
        &self,
        query: &LocationQuery,
    ) -> Result<(WeatherPayload, Vec<TimelineEntry>), DashboardError> {
        let payload = self.provider.fetch(query).await?;
        let timeline = build_timeline(
            &self.provider,
            query,
            &payload.forecast,
            self.timeline_dates(),
            self.options.history_days,
        )
        .await;
        Ok((payload, timeline))
    }

    fn mark_loading(&self, generation: u64, query: Option<&LocationQuery>) -> bool {
        let mut state = self.state.write();
        if !self.cycles.is_current(generation) {
            return false;
        }
        state.phase = state.phase.on_fetch_started();
        state.query = query.cloned();
        state.error_message = None;
        state.generation = generation;
        true
    }

    fn commit(
        &self,
        generation: u64,
        query: LocationQuery,
        result: Result<(WeatherPayload, Vec<TimelineEntry>), DashboardError>,
        notice: Option<String>,
    ) -> CycleOutcome {
        let mut state = self.state.write();
        if !self.cycles.is_current(generation) {
            tracing::debug!(
                generation,
                current = self.cycles.current(),
                "Discarding superseded cycle"
            );
            return CycleOutcome::Superseded;
        }

        match result {
            Ok((payload, timeline)) => {
                state.phase = state.phase.on_fetch_succeeded();
                state.payload = Some(payload);
                state.timeline = timeline;
                state.error_message = None;
            }
            Err(e) => {
                let error = AppError::from(e);
                tracing::error!(error = %error, query = %query, "Fetch cycle failed");
                state.phase = state.phase.on_fetch_failed(error.kind());
                state.payload = None;
                state.timeline.clear();
                state.error_message = Some(error.to_string());
            }
        }
        state.theme = match &state.payload {
            Some(payload) if state.phase.shows_theme() => {
                select_theme(&payload.current.condition.text)
            }
            _ => ThemeKind::Default.theme(),
        };
        state.query = Some(query);
        state.notice = notice;
        state.generation = generation;

        CycleOutcome::Committed(state.clone())
    }
}
