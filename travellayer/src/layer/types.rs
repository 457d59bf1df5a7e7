//! Domain and cache state definitions for the layer protocol.

use crate::layer::feature::Feature;
use std::fmt;

/// One of the five top-level data categories, each owning its own registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    RoadConditions,
    WeatherCurrent,
    WeatherForecast,
    Fire,
    OtherInfo,
}

impl Domain {
    /// Named layers belonging to this domain.
    pub fn layers(&self) -> &'static [&'static str] {
        match self {
            Domain::RoadConditions => {
                &["Incident", "Chain", "CCTV", "CMS", "RWIS", "RoadInfo"]
            }
            Domain::WeatherCurrent => &[
                "CurrentAirTemperature",
                "Humidity",
                "Precipitation1hour",
                "Precipitation24hour",
                "AHPS",
                "Wind",
            ],
            Domain::WeatherForecast => &[
                "ForecastAirTemperature",
                "WindSpeed",
                "WindGustSpeed",
                "ForecastHumidity",
                "SkyCover",
                "Precipitation12hour",
                "Precipitation6hour",
                "Snow",
                "Weather",
            ],
            Domain::Fire => &["FireIncidents", "FireDetectors"],
            Domain::OtherInfo => &[
                "RestAreas",
                "FeaturesOfInterest",
                "TruckScales",
                "SummitLocations",
            ],
        }
    }

    /// Fixed relative path of a layer's JSON document on the data provider.
    ///
    /// The provider's layout is a fixed table, not derivable from the layer
    /// name. Returns `None` for layer names the domain does not own.
    pub fn layer_path(&self, layer: &str) -> Option<&'static str> {
        let path = match (self, layer) {
            (Domain::RoadConditions, "Incident") => "data/road/incident.json",
            (Domain::RoadConditions, "Chain") => "data/road/chain.json",
            (Domain::RoadConditions, "CCTV") => "data/road/cctv.json",
            (Domain::RoadConditions, "CMS") => "data/road/cms.json",
            (Domain::RoadConditions, "RWIS") => "data/road/rwis.json",
            (Domain::RoadConditions, "RoadInfo") => "data/road/roadinfo.json",
            (Domain::WeatherCurrent, "CurrentAirTemperature") => "data/current/airtemp.json",
            (Domain::WeatherCurrent, "Humidity") => "data/current/humidity.json",
            (Domain::WeatherCurrent, "Precipitation1hour") => "data/current/precip1hour.json",
            (Domain::WeatherCurrent, "Precipitation24hour") => "data/current/precip24hour.json",
            (Domain::WeatherCurrent, "AHPS") => "data/current/ahps.json",
            (Domain::WeatherCurrent, "Wind") => "data/current/wind.json",
            (Domain::WeatherForecast, "ForecastAirTemperature") => "data/forecast/airtemp.json",
            (Domain::WeatherForecast, "WindSpeed") => "data/forecast/windspeed.json",
            (Domain::WeatherForecast, "WindGustSpeed") => "data/forecast/windgust.json",
            (Domain::WeatherForecast, "ForecastHumidity") => "data/forecast/humidity.json",
            (Domain::WeatherForecast, "SkyCover") => "data/forecast/skycover.json",
            (Domain::WeatherForecast, "Precipitation12hour") => "data/forecast/precip12hour.json",
            (Domain::WeatherForecast, "Precipitation6hour") => "data/forecast/precip6hour.json",
            (Domain::WeatherForecast, "Snow") => "data/forecast/snow.json",
            (Domain::WeatherForecast, "Weather") => "data/forecast/weather.json",
            (Domain::Fire, "FireIncidents") => "data/fire/incidents.json",
            (Domain::Fire, "FireDetectors") => "data/fire/detectors.json",
            (Domain::OtherInfo, "RestAreas") => "data/other/restareas.json",
            (Domain::OtherInfo, "FeaturesOfInterest") => "data/other/features.json",
            (Domain::OtherInfo, "TruckScales") => "data/other/scales.json",
            (Domain::OtherInfo, "SummitLocations") => "data/other/summits.json",
            _ => return None,
        };
        Some(path)
    }

    /// Whether at most one layer in this domain may be visible at a time.
    ///
    /// The weather domains behave like radio buttons: activating a layer
    /// hides the previously active one. The other domains are additive.
    pub fn exclusive(&self) -> bool {
        matches!(self, Domain::WeatherCurrent | Domain::WeatherForecast)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::RoadConditions => write!(f, "road-conditions"),
            Domain::WeatherCurrent => write!(f, "weather-current"),
            Domain::WeatherForecast => write!(f, "weather-forecast"),
            Domain::Fire => write!(f, "fire"),
            Domain::OtherInfo => write!(f, "other-info"),
        }
    }
}

/// Fetch result cache for one layer.
///
/// `Loading` is distinct from `Unloaded` so a second toggle while a fetch is
/// in flight is a no-op, and `Failed` is distinct from an empty success.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LayerCache {
    /// No fetch has been attempted this session.
    #[default]
    Unloaded,
    /// A fetch is in flight; the guard against concurrent fetches.
    Loading,
    /// Fetch succeeded; features are normalized and plottable.
    Loaded(Vec<Feature>),
    /// Fetch failed; never retried automatically within the session.
    Failed,
}

impl LayerCache {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LayerCache::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LayerCache::Failed)
    }
}
