//! Output writers for a rendered map session.
//!
//! Supports the standalone HTML page and the raw session JSON.

use std::io::{self, Write};

use crate::map::MapSession;
use crate::render::render_page;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Standalone Leaflet page (default)
    #[default]
    Html,
    /// Pretty-printed map session
    Json,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown format: {s} (expected: html, json)")),
        }
    }
}

/// Write the session as an HTML page.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub fn write_html<W: Write>(writer: &mut W, session: &MapSession) -> io::Result<()> {
    let page =
        render_page(session).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writer.write_all(page.as_bytes())
}

/// Write the session as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, session: &MapSession) -> io::Result<()> {
    let json = serde_json::to_string_pretty(session)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write the session in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_session<W: Write>(
    writer: &mut W,
    session: &MapSession,
    format: Format,
) -> io::Result<()> {
    match format {
        Format::Html => write_html(writer, session),
        Format::Json => write_json(writer, session),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Feeds;

    #[test]
    fn test_format_parse() {
        assert_eq!("html".parse::<Format>().unwrap(), Format::Html);
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert!("ndjson".parse::<Format>().is_err());
    }

    #[test]
    fn test_write_json_session() {
        let feeds = Feeds {
            earthquakes: serde_json::from_str(include_str!("../tools/sample_all_week.json"))
                .unwrap(),
            plates: serde_json::from_str(include_str!("../tools/sample_plates.json")).unwrap(),
        };
        let session = MapSession::assemble(&feeds);

        let mut buf = Vec::new();
        write_session(&mut buf, &session, Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["earthquakes"]["markers"].as_array().unwrap().len(), 3);
        assert_eq!(value["legend"]["rows"].as_array().unwrap().len(), 6);
        assert_eq!(value["plates"]["style"]["color"], "orange");
        assert_eq!(value["view"]["zoom"], 5);

        let first = &value["earthquakes"]["markers"][0]["style"];
        assert_eq!(first["fillColor"], "#dcf400");
        assert_eq!(first["fillOpacity"], 0.75);
    }

    #[test]
    fn test_write_html_page() {
        let feeds = Feeds {
            earthquakes: serde_json::from_str(include_str!("../tools/sample_all_week.json"))
                .unwrap(),
            plates: serde_json::from_str(include_str!("../tools/sample_plates.json")).unwrap(),
        };
        let session = MapSession::assemble(&feeds);

        let mut buf = Vec::new();
        write_session(&mut buf, &session, Format::Html).unwrap();
        let page = String::from_utf8(buf).unwrap();
        assert!(page.contains("<title>Earthquakes &amp; Tectonic Plates</title>"));
    }
}
