//! Feed clients for the earthquake and tectonic plate documents.
//!
//! Provides blocking HTTP access to the USGS summary feeds and the plate
//! boundary GeoJSON. Uses reqwest with rustls for TLS.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::errors::QuakemapError;
use crate::models::{BoundaryGeometry, FeatureCollection, PlateCollection};

/// Default request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("quakemap/", env!("CARGO_PKG_VERSION"));

/// USGS base URL for earthquake feeds.
pub const USGS_BASE_URL: &str = "https://earthquake.usgs.gov";

/// PB2002 plate boundaries, as published in the fraxen/tectonicplates repo.
pub const PLATES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

/// Available feed types for summary feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedType {
    AllHour,
    AllDay,
    #[default]
    AllWeek,
    AllMonth,
    Mag1Hour,
    Mag1Day,
    Mag1Week,
    Mag1Month,
    Mag25Hour,
    Mag25Day,
    Mag25Week,
    Mag25Month,
    Mag45Hour,
    Mag45Day,
    Mag45Week,
    Mag45Month,
    SignificantHour,
    SignificantDay,
    SignificantWeek,
    SignificantMonth,
}

impl FeedType {
    /// Get the URL path segment for this feed type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllHour => "all_hour",
            Self::AllDay => "all_day",
            Self::AllWeek => "all_week",
            Self::AllMonth => "all_month",
            Self::Mag1Hour => "1.0_hour",
            Self::Mag1Day => "1.0_day",
            Self::Mag1Week => "1.0_week",
            Self::Mag1Month => "1.0_month",
            Self::Mag25Hour => "2.5_hour",
            Self::Mag25Day => "2.5_day",
            Self::Mag25Week => "2.5_week",
            Self::Mag25Month => "2.5_month",
            Self::Mag45Hour => "4.5_hour",
            Self::Mag45Day => "4.5_day",
            Self::Mag45Week => "4.5_week",
            Self::Mag45Month => "4.5_month",
            Self::SignificantHour => "significant_hour",
            Self::SignificantDay => "significant_day",
            Self::SignificantWeek => "significant_week",
            Self::SignificantMonth => "significant_month",
        }
    }
}

impl std::str::FromStr for FeedType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all_hour" => Ok(Self::AllHour),
            "all_day" => Ok(Self::AllDay),
            "all_week" => Ok(Self::AllWeek),
            "all_month" => Ok(Self::AllMonth),
            "1.0_hour" => Ok(Self::Mag1Hour),
            "1.0_day" => Ok(Self::Mag1Day),
            "1.0_week" => Ok(Self::Mag1Week),
            "1.0_month" => Ok(Self::Mag1Month),
            "2.5_hour" => Ok(Self::Mag25Hour),
            "2.5_day" => Ok(Self::Mag25Day),
            "2.5_week" => Ok(Self::Mag25Week),
            "2.5_month" => Ok(Self::Mag25Month),
            "4.5_hour" => Ok(Self::Mag45Hour),
            "4.5_day" => Ok(Self::Mag45Day),
            "4.5_week" => Ok(Self::Mag45Week),
            "4.5_month" => Ok(Self::Mag45Month),
            "significant_hour" => Ok(Self::SignificantHour),
            "significant_day" => Ok(Self::SignificantDay),
            "significant_week" => Ok(Self::SignificantWeek),
            "significant_month" => Ok(Self::SignificantMonth),
            _ => Err(format!("unknown feed type: {s}")),
        }
    }
}

/// Where the two documents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub usgs_base_url: String,
    pub feed: FeedType,
    pub plates_url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            usgs_base_url: USGS_BASE_URL.to_string(),
            feed: FeedType::default(),
            plates_url: PLATES_URL.to_string(),
        }
    }
}

impl FeedConfig {
    /// Full URL of the earthquake summary feed.
    #[must_use]
    pub fn earthquake_url(&self) -> String {
        format!(
            "{}/earthquakes/feed/v1.0/summary/{}.geojson",
            self.usgs_base_url.trim_end_matches('/'),
            self.feed.as_str()
        )
    }
}

/// A source of the two map documents.
pub trait FeedSource: Send + Sync {
    /// Fetch the earthquake feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be retrieved or parsed.
    fn fetch_earthquakes(&self) -> Result<FeatureCollection, QuakemapError>;

    /// Fetch the tectonic plate boundaries.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be retrieved or parsed.
    fn fetch_plates(&self) -> Result<PlateCollection, QuakemapError>;
}

/// Both documents, as fetched for one map.
#[derive(Debug, Clone)]
pub struct Feeds {
    pub earthquakes: FeatureCollection,
    pub plates: PlateCollection,
}

/// Fetch the earthquake feed, then the plate boundaries.
///
/// The plate request is only issued once the earthquake feed has arrived.
/// Neither request is retried; the first failure is returned as is.
///
/// # Errors
///
/// Returns the error of whichever fetch failed.
pub fn load_feeds(source: &dyn FeedSource) -> Result<Feeds, QuakemapError> {
    let earthquakes = source.fetch_earthquakes()?;
    let plates = source.fetch_plates()?;
    Ok(Feeds {
        earthquakes,
        plates,
    })
}

/// HTTP client for the USGS feed and the plate boundary document.
pub struct UsgsClient {
    client: Client,
    config: FeedConfig,
}

impl UsgsClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: FeedConfig) -> Result<Self, QuakemapError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, config })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, QuakemapError> {
        debug!("fetching {}", url);

        let response = self.client.get(url).send()?;

        // Check status before parsing
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QuakemapError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.json()?)
    }
}

impl FeedSource for UsgsClient {
    #[instrument(skip(self), fields(feed = self.config.feed.as_str()))]
    fn fetch_earthquakes(&self) -> Result<FeatureCollection, QuakemapError> {
        let feed: FeatureCollection = self.get_json(&self.config.earthquake_url())?;
        feed.validate()?;

        if let Some(metadata) = &feed.metadata {
            debug!(
                "'{}' lists {} events, generated {}",
                metadata.title,
                metadata.count,
                metadata
                    .generated_at()
                    .map_or_else(|| "at an unknown time".to_string(), |t| t.to_rfc3339())
            );
        }
        debug!("fetched {} events", feed.features.len());
        Ok(feed)
    }

    #[instrument(skip(self))]
    fn fetch_plates(&self) -> Result<PlateCollection, QuakemapError> {
        let plates: PlateCollection = self.get_json(&self.config.plates_url)?;
        plates.validate()?;

        let vertices: usize = plates
            .features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .map(BoundaryGeometry::vertex_count)
            .sum();
        debug!(
            "fetched {} plate boundary segments ({} vertices)",
            plates.features.len(),
            vertices
        );
        Ok(plates)
    }
}
