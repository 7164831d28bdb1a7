//! Standalone HTML rendering of a map session.
//!
//! The page pulls Leaflet from unpkg, embeds the session as JSON and builds
//! the map from it with a small bootstrap script. Styling that depends on the
//! depth palette is generated here so it always matches the markers.

use crate::errors::QuakemapError;
use crate::map::MapSession;

const LEAFLET_VERSION: &str = "1.9.4";

/// Render the full HTML document for a session.
///
/// # Errors
///
/// Returns an error if the session has no usable default base layer or
/// cannot be serialized.
pub fn render_page(session: &MapSession) -> Result<String, QuakemapError> {
    if session.default_base().is_none() {
        return Err(QuakemapError::Render(format!(
            "default base layer '{}' is not defined",
            session.default_base_layer
        )));
    }

    let session_json = embed_json(&serde_json::to_string(session)?);
    let legend_css = legend_css(session);

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Earthquakes &amp; Tectonic Plates</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.js"></script>
    <style>
        html, body, #map {{ height: 100%; width: 100%; margin: 0; padding: 0; }}
        .legend {{
            background: white;
            padding: 6px 10px;
            border-radius: 5px;
            box-shadow: 0 0 15px rgba(0, 0, 0, 0.2);
            line-height: 18px;
            color: #555;
        }}
        .legend p {{ margin: 2px 0; }}
        .legend .square {{
            display: inline-block;
            width: 14px;
            height: 14px;
            vertical-align: middle;
        }}
{legend_css}    </style>
</head>
<body>
    <div id="map"></div>
    <script id="map-session" type="application/json">{session_json}</script>
    <script>
{BOOTSTRAP_JS}
    </script>
</body>
</html>
"#
    ))
}

/// One `.colorN` rule per legend row.
fn legend_css(session: &MapSession) -> String {
    session
        .legend
        .rows
        .iter()
        .map(|row| {
            format!(
                "        .legend .{} {{ background: {}; }}\n",
                row.css_class, row.color
            )
        })
        .collect()
}

/// Make JSON safe to place inside a `<script>` element.
fn embed_json(json: &str) -> String {
    json.replace("</", "<\\/").replace("<!--", "\\u003c!--")
}

const BOOTSTRAP_JS: &str = r#"
(function () {
    var session = JSON.parse(document.getElementById('map-session').textContent);

    var baseMaps = {};
    session.baseLayers.forEach(function (layer) {
        baseMaps[layer.name] = L.tileLayer(layer.url, layer.options);
    });

    var earthquakes = L.layerGroup(session.earthquakes.markers.map(function (m) {
        return L.circleMarker([m.lat, m.lon], m.style).bindPopup(m.popup);
    }));

    var tectonicPlates = L.geoJSON(session.plates.data, session.plates.style);

    var overlayMaps = {};
    overlayMaps[session.earthquakes.name] = earthquakes;
    overlayMaps[session.plates.name] = tectonicPlates;

    var map = L.map('map', {
        center: session.view.center,
        zoom: session.view.zoom,
        layers: [baseMaps[session.defaultBaseLayer], earthquakes, tectonicPlates]
    });

    var controlBase = {};
    session.layerControl.baseLayers.forEach(function (name) { controlBase[name] = baseMaps[name]; });
    var controlOverlays = {};
    session.layerControl.overlays.forEach(function (name) { controlOverlays[name] = overlayMaps[name]; });
    L.control.layers(controlBase, controlOverlays, {
        collapsed: session.layerControl.collapsed
    }).addTo(map);

    var legend = L.control({ position: session.legend.position });
    legend.onAdd = function () {
        var div = L.DomUtil.create('div', 'legend');
        div.innerHTML = session.legend.html;
        return div;
    };
    legend.addTo(map);
})();"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Feeds;
    use crate::map::base_layers;

    fn sample_session() -> MapSession {
        let feeds = Feeds {
            earthquakes: serde_json::from_str(include_str!("../tools/sample_all_week.json"))
                .expect("quakes"),
            plates: serde_json::from_str(include_str!("../tools/sample_plates.json"))
                .expect("plates"),
        };
        MapSession::assemble(&feeds)
    }

    #[test]
    fn test_page_has_leaflet_and_session() {
        let html = render_page(&sample_session()).expect("render");

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("leaflet@1.9.4/dist/leaflet.js"));
        assert!(html.contains(r#"<div id="map"></div>"#));
        assert!(html.contains("L.control.layers"));
        assert!(html.contains(r#""defaultBaseLayer":"Satellite""#));
        assert!(html.contains("10km NW of X"));
    }

    #[test]
    fn test_page_embeds_attributions() {
        let html = render_page(&sample_session()).expect("render");
        for layer in base_layers() {
            let encoded = serde_json::to_string(&layer.options.attribution).expect("json");
            assert!(html.contains(&embed_json(&encoded)), "{}", layer.name);
        }
    }

    #[test]
    fn test_closing_tags_are_escaped() {
        let html = render_page(&sample_session()).expect("render");
        let start = html.find(r#"type="application/json">"#).expect("session block");
        let end = html[start..].find("</script>").expect("end") + start;
        let block = &html[start..end];

        // The popups contain </h3>, which must not close the script early.
        assert!(block.contains(r"<\/h3>"));
        assert!(!block.contains("</"));
    }

    #[test]
    fn test_legend_css_matches_palette() {
        let html = render_page(&sample_session()).expect("render");
        assert!(html.contains(".legend .color1 { background: #a3f600; }"));
        assert!(html.contains(".legend .color6 { background: #ff5f65; }"));
    }

    #[test]
    fn test_missing_default_base_layer() {
        let mut session = sample_session();
        session.default_base_layer = "Terrain".into();
        assert!(matches!(
            render_page(&session),
            Err(QuakemapError::Render(_))
        ));
    }
}
