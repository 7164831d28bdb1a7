//! Map session assembly.
//!
//! Turns the two fetched documents into a `MapSession`: every marker, popup,
//! tile layer, control and legend row the page needs. The page itself only
//! instantiates Leaflet objects from this value.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::client::Feeds;
use crate::models::{Feature, PlateCollection};
use crate::style::{DEPTH_BUCKETS, DepthBucket, circle_color, circle_size};

/// Initial map center (latitude, longitude).
pub const DEFAULT_CENTER: [f64; 2] = [37.09, -95.71];

/// Initial zoom level.
pub const DEFAULT_ZOOM: u8 = 5;

pub const EARTHQUAKES_OVERLAY: &str = "Earthquakes";
pub const PLATES_OVERLAY: &str = "Tectonic Plates";

const LEGEND_TITLE: &str = "Earthquake Depth";

/// Everything needed to draw one map page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSession {
    pub view: MapView,
    pub base_layers: Vec<TileLayer>,
    /// Name of the base layer shown on load
    pub default_base_layer: String,
    pub earthquakes: EarthquakeLayer,
    pub plates: PlateLayer,
    pub layer_control: LayerControl,
    pub legend: Legend,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
}

/// A background tile layer.
#[derive(Debug, Clone, Serialize)]
pub struct TileLayer {
    pub name: String,
    pub url: String,
    pub options: TileOptions,
}

/// Leaflet `tileLayer` options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileOptions {
    pub attribution: String,
    pub max_zoom: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
}

/// Satellite, grayscale and outdoors layers, in switcher order.
#[must_use]
pub fn base_layers() -> Vec<TileLayer> {
    vec![
        TileLayer {
            name: "Satellite".into(),
            url: "https://basemap.nationalmap.gov/arcgis/rest/services/USGSImageryOnly/MapServer/tile/{z}/{y}/{x}".into(),
            options: TileOptions {
                attribution: r#"Tiles courtesy of the <a href="https://usgs.gov/">U.S. Geological Survey</a>"#.into(),
                max_zoom: 20,
                min_zoom: None,
                subdomains: None,
                ext: None,
            },
        },
        TileLayer {
            name: "Grayscale".into(),
            url: "https://stamen-tiles-{s}.a.ssl.fastly.net/toner/{z}/{x}/{y}{r}.{ext}".into(),
            options: TileOptions {
                attribution: r#"Map tiles by <a href="http://stamen.com">Stamen Design</a>, <a href="http://creativecommons.org/licenses/by/3.0">CC BY 3.0</a> &mdash; Map data &copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors"#.into(),
                max_zoom: 20,
                min_zoom: Some(0),
                subdomains: Some("abcd".into()),
                ext: Some("png".into()),
            },
        },
        TileLayer {
            name: "Outdoors".into(),
            url: "https://tiles.stadiamaps.com/tiles/outdoors/{z}/{x}/{y}{r}.png".into(),
            options: TileOptions {
                attribution: r#"&copy; <a href="https://stadiamaps.com/">Stadia Maps</a>, &copy; <a href="https://openmaptiles.org/">OpenMapTiles</a> &copy; <a href="http://openstreetmap.org">OpenStreetMap</a> contributors"#.into(),
                max_zoom: 20,
                min_zoom: None,
                subdomains: None,
                ext: None,
            },
        },
    ]
}

/// Circle markers for the earthquake overlay.
#[derive(Debug, Clone, Serialize)]
pub struct EarthquakeLayer {
    pub name: String,
    pub markers: Vec<CircleMarker>,
}

/// One earthquake drawn as a circle.
#[derive(Debug, Clone, Serialize)]
pub struct CircleMarker {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub style: MarkerStyle,
    pub popup: String,
}

/// Leaflet `circleMarker` path options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
    pub color: &'static str,
    pub weight: f64,
}

impl CircleMarker {
    /// Build the marker for an earthquake. A missing magnitude is drawn as
    /// magnitude zero.
    #[must_use]
    pub fn from_feature(feature: &Feature) -> Self {
        let depth = feature.depth_km();
        Self {
            id: feature.id.clone(),
            lat: feature.latitude(),
            lon: feature.longitude(),
            style: MarkerStyle {
                radius: circle_size(feature.properties.mag.unwrap_or(0.0)),
                fill_color: circle_color(depth),
                fill_opacity: 0.75,
                color: "black",
                weight: 0.5,
            },
            popup: popup_html(feature),
        }
    }
}

/// Popup content for an earthquake marker.
#[must_use]
pub fn popup_html(feature: &Feature) -> String {
    let place = feature
        .properties
        .place
        .as_deref()
        .map_or_else(|| "Unknown location".to_string(), escape_html);
    let magnitude = feature
        .properties
        .mag
        .map_or_else(|| "unknown".to_string(), |m| m.to_string());

    format!(
        "<h3>Location: {place}</h3><hr>\
         <p>Date: {date}</p>\
         <p>Magnitude: {magnitude}</p>\
         <p>Depth: {depth} km</p>\
         <p>Last Updated: {updated}</p>",
        date = format_date(feature.time()),
        depth = feature.depth_km(),
        updated = format_date(feature.updated()),
    )
}

/// Date in the browser's `Date.toString()` shape, pinned to UTC.
fn format_date(time: Option<DateTime<Utc>>) -> String {
    time.map_or_else(
        || "Invalid Date".to_string(),
        |t| t.format("%a %b %d %Y %H:%M:%S GMT+0000").to_string(),
    )
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Plate boundaries drawn as a GeoJSON line layer.
#[derive(Debug, Clone, Serialize)]
pub struct PlateLayer {
    pub name: String,
    pub data: PlateCollection,
    pub style: LineStyle,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub weight: f64,
}

/// Plate boundary stroke.
pub const PLATE_STYLE: LineStyle = LineStyle {
    color: "orange",
    weight: 2.0,
};

/// Layer switcher contents.
#[derive(Debug, Clone, Serialize)]
pub struct LayerControl {
    pub base_layers: Vec<String>,
    pub overlays: Vec<String>,
    pub collapsed: bool,
}

/// Static depth legend.
#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    pub position: &'static str,
    pub title: &'static str,
    pub rows: Vec<LegendRow>,
    /// Rendered control body
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendRow {
    pub label: &'static str,
    pub color: &'static str,
    pub css_class: &'static str,
}

impl From<DepthBucket> for LegendRow {
    fn from(bucket: DepthBucket) -> Self {
        Self {
            label: bucket.label(),
            color: bucket.color(),
            css_class: bucket.css_class(),
        }
    }
}

impl Legend {
    /// Depth legend with one row per bucket, shallow first.
    #[must_use]
    pub fn depth() -> Self {
        let mut legend = Self {
            position: "bottomright",
            title: LEGEND_TITLE,
            rows: DEPTH_BUCKETS.into_iter().map(LegendRow::from).collect(),
            html: String::new(),
        };
        legend.html = legend.to_html();
        legend
    }

    /// Legend control body.
    #[must_use]
    pub fn to_html(&self) -> String {
        let rows: String = self
            .rows
            .iter()
            .map(|row| {
                format!(
                    "<p><span class='square {}'></span>&nbsp;{}&nbsp;km</p>",
                    row.css_class, row.label
                )
            })
            .collect();
        format!(
            "<p><b>{}</b></p><div class='legtext'>{rows}</div>",
            self.title
        )
    }
}

impl MapSession {
    /// Assemble the session from both documents.
    #[must_use]
    pub fn assemble(feeds: &Feeds) -> Self {
        let markers: Vec<CircleMarker> = feeds
            .earthquakes
            .features
            .iter()
            .filter(|feature| match feature.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!("skipping earthquake: {}", e);
                    false
                }
            })
            .map(CircleMarker::from_feature)
            .collect();

        debug!(
            "assembled {} markers and {} plate segments",
            markers.len(),
            feeds.plates.features.len()
        );

        let base_layers = base_layers();
        let default_base_layer = base_layers
            .first()
            .map(|layer| layer.name.clone())
            .unwrap_or_default();

        Self {
            view: MapView {
                center: DEFAULT_CENTER,
                zoom: DEFAULT_ZOOM,
            },
            layer_control: LayerControl {
                base_layers: base_layers.iter().map(|l| l.name.clone()).collect(),
                overlays: vec![EARTHQUAKES_OVERLAY.into(), PLATES_OVERLAY.into()],
                collapsed: false,
            },
            base_layers,
            default_base_layer,
            earthquakes: EarthquakeLayer {
                name: EARTHQUAKES_OVERLAY.into(),
                markers,
            },
            plates: PlateLayer {
                name: PLATES_OVERLAY.into(),
                data: feeds.plates.clone(),
                style: PLATE_STYLE,
            },
            legend: Legend::depth(),
        }
    }

    /// The base layer shown on load, if it exists.
    #[must_use]
    pub fn default_base(&self) -> Option<&TileLayer> {
        self.base_layers
            .iter()
            .find(|layer| layer.name == self.default_base_layer)
    }
}
