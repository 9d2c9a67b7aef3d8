use crate::controller::DashboardError;
use skycast_core::{AppError, ConfigError, WeatherError};
use skycast_weather::FetchError;

impl From<DashboardError> for AppError {
    fn from(e: DashboardError) -> Self {
        match e {
            DashboardError::Fetch(FetchError::CityNotFound(s)) => {
                AppError::Weather(WeatherError::CityNotFound(s))
            }
            DashboardError::Fetch(FetchError::LocationRejected(s)) => {
                AppError::Weather(WeatherError::Location(s))
            }
            DashboardError::Fetch(FetchError::Network(s)) => {
                AppError::Weather(WeatherError::Network(s))
            }
            DashboardError::Fetch(FetchError::InvalidData(s)) => {
                AppError::Weather(WeatherError::Data(s))
            }
            DashboardError::Location(e) => AppError::Weather(WeatherError::Location(e.to_string())),
            DashboardError::Setup(s) => AppError::Config(ConfigError::Invalid(s)),
        }
    }
}
