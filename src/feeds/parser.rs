//! Typed views over the GDACS feed documents.
//!
//! Three item shapes are seen in the wild and each gets its own variant of
//! [`FeedEntry`]:
//!
//! * plain RSS items located by `georss:point` (`"lat lon"`),
//! * Atom entries carrying a `cap:alert` with polygon or circle areas,
//! * RSS items embedding the same CAP block, optionally with a `geo:Point`.
//!
//! Items are decoded one at a time so a single malformed item is skipped
//! rather than failing the whole document.

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

use crate::errors::AppError;
use crate::geo::{parse_feed_number, Coordinate};

/// Radius synthesized around a bare `geo:Point` when CAP geometry is absent.
pub(crate) const DEFAULT_POINT_RADIUS_KM: f64 = 50.0;

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+(?:\.\d+)?)").expect("leading number pattern"));
static TEXT_LAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"lat[:\s=]*([+-]?\d+\.?\d*)").expect("text lat pattern"));
static TEXT_LON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"lon[:\s=]*([+-]?\d+\.?\d*)").expect("text lon pattern"));
static TEXT_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-?\d+\.?\d*),\s*(-?\d+\.?\d*)").expect("text pair pattern"));
static TEXT_HEMISPHERE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+\.?\d*)[°\s]*([ns])[,\s]*(\d+\.?\d*)[°\s]*([ew])").expect("hemisphere pattern")
});

// Field names are element local names: the deserializer drops namespace
// prefixes, so `georss:point` arrives as `point` and `cap:info` as `info`.

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct RssItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub pub_date: Option<String>,
    /// `georss:point`
    #[serde(rename = "point", default)]
    pub georss_point: Option<String>,
    /// `gdacs:lat`
    #[serde(rename = "lat", default)]
    pub gdacs_lat: Option<String>,
    /// `gdacs:lon`
    #[serde(rename = "lon", default)]
    pub gdacs_lon: Option<String>,
    #[serde(rename = "alertlevel", default)]
    pub gdacs_alert_level: Option<String>,
    #[serde(rename = "eventtype", default)]
    pub gdacs_event_type: Option<String>,
    #[serde(rename = "severity", default)]
    pub gdacs_severity: Option<GdacsSeverity>,
    /// `geo:Point`
    #[serde(rename = "Point", default)]
    pub geo_point: Option<GeoPoint>,
    /// `cap:alert`
    #[serde(rename = "alert", default)]
    pub cap_alert: Option<CapAlert>,
}

/// `<gdacs:severity unit="km/h" value="185">Tropical Storm ...</gdacs:severity>`
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct GdacsSeverity {
    #[serde(rename = "@value", default)]
    pub value: Option<String>,
    #[serde(rename = "$text", default)]
    pub text: Option<String>,
}

impl GdacsSeverity {
    /// The `value` attribute, else a number leading the text.
    pub fn intensity(&self) -> Option<f64> {
        self.value
            .as_deref()
            .and_then(parse_feed_number)
            .or_else(|| {
                let text = self.text.as_deref()?;
                parse_feed_number(LEADING_NUMBER.captures(text)?.get(1)?.as_str())
            })
            .filter(|v| *v > 0.0)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct GeoPoint {
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub long: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct AtomEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(rename = "alert", default)]
    pub cap_alert: Option<CapAlert>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct CapAlert {
    #[serde(default)]
    pub info: Vec<CapInfo>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct CapInfo {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub certainty: Option<String>,
    #[serde(rename = "area", default)]
    pub areas: Vec<CapArea>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct CapArea {
    #[serde(rename = "areaDesc", default)]
    pub area_desc: Option<String>,
    #[serde(rename = "polygon", default)]
    pub polygons: Vec<String>,
    #[serde(rename = "circle", default)]
    pub circles: Vec<String>,
}

/// One feed item, tagged by the shape it arrived in.
#[derive(Clone, Debug)]
pub(crate) enum FeedEntry {
    GeoRss(RssItem),
    AtomCap(AtomEntry),
    RssCap(RssItem),
}

/// Where an entry is, as precisely as the feed says.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ResolvedArea {
    Point(Coordinate),
    /// `ring` is in GeoJSON (lon, lat) order.
    Polygon { ring: Vec<[f64; 2]>, center: Coordinate },
    Circle { center: Coordinate, radius_km: f64 },
}

impl ResolvedArea {
    pub fn center(&self) -> Coordinate {
        match self {
            Self::Point(c) => *c,
            Self::Polygon { center, .. } | Self::Circle { center, .. } => *center,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct GdacsTags<'a> {
    pub alert_level: Option<&'a str>,
    pub event_type: Option<&'a str>,
    /// `gdacs:severity` as a number: magnitude, wind speed, VEI...
    pub severity: Option<f64>,
}

impl FeedEntry {
    fn from_rss(item: RssItem) -> Self {
        if item.cap_alert.is_some() || item.geo_point.is_some() {
            Self::RssCap(item)
        } else {
            Self::GeoRss(item)
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::GeoRss(item) | Self::RssCap(item) => item.guid.as_deref(),
            Self::AtomCap(entry) => entry.id.as_deref(),
        }
        .map(str::trim)
        .filter(|s| !s.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::GeoRss(item) | Self::RssCap(item) => item.title.as_deref(),
            Self::AtomCap(entry) => entry.title.as_deref(),
        }
        .map(str::trim)
        .filter(|s| !s.is_empty())
    }

    /// RSS description or Atom summary.
    pub fn description(&self) -> &str {
        match self {
            Self::GeoRss(item) | Self::RssCap(item) => item.description.as_deref(),
            Self::AtomCap(entry) => entry.summary.as_deref(),
        }
        .map(str::trim)
        .unwrap_or_default()
    }

    pub fn link(&self) -> Option<&str> {
        match self {
            Self::GeoRss(item) | Self::RssCap(item) => {
                item.link.as_deref().map(str::trim).filter(|s| !s.is_empty())
            }
            Self::AtomCap(_) => None,
        }
    }

    /// RSS `pubDate` or Atom `updated`.
    pub fn published(&self) -> Option<&str> {
        match self {
            Self::GeoRss(item) | Self::RssCap(item) => item.pub_date.as_deref(),
            Self::AtomCap(entry) => entry.updated.as_deref(),
        }
        .map(str::trim)
        .filter(|s| !s.is_empty())
    }

    pub fn gdacs_tags(&self) -> GdacsTags<'_> {
        match self {
            Self::GeoRss(item) | Self::RssCap(item) => GdacsTags {
                alert_level: item.gdacs_alert_level.as_deref(),
                event_type: item.gdacs_event_type.as_deref(),
                severity: item.gdacs_severity.as_ref().and_then(GdacsSeverity::intensity),
            },
            Self::AtomCap(_) => GdacsTags::default(),
        }
    }

    pub fn cap_info(&self) -> Option<&CapInfo> {
        let alert = match self {
            Self::GeoRss(_) => None,
            Self::RssCap(item) => item.cap_alert.as_ref(),
            Self::AtomCap(entry) => entry.cap_alert.as_ref(),
        }?;
        alert.info.first()
    }

    /// First area description the CAP block carries, if any.
    pub fn area_description(&self) -> Option<&str> {
        self.cap_info()?
            .areas
            .iter()
            .find_map(|a| a.area_desc.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn resolve_area(&self) -> Option<ResolvedArea> {
        match self {
            Self::GeoRss(item) => rss_point(item).map(ResolvedArea::Point),
            Self::AtomCap(_) => self.cap_geometry(),
            Self::RssCap(item) => self
                .cap_geometry()
                .or_else(|| {
                    let point = item.geo_point.as_ref()?;
                    let center = Coordinate::located(
                        parse_feed_number(point.lat.as_deref()?)?,
                        parse_feed_number(point.long.as_deref()?)?,
                    )?;
                    Some(ResolvedArea::Circle {
                        center,
                        radius_km: DEFAULT_POINT_RADIUS_KM,
                    })
                })
                .or_else(|| rss_point(item).map(ResolvedArea::Point)),
        }
    }

    fn cap_geometry(&self) -> Option<ResolvedArea> {
        self.cap_info()?.areas.iter().find_map(|area| {
            if let Some(polygon) = area.polygons.first() {
                parse_cap_polygon(polygon)
            } else {
                area.circles.first().and_then(|c| parse_cap_circle(c))
            }
        })
    }
}

/// `georss:point`, then the `gdacs:lat`/`gdacs:lon` pair, then whatever the
/// description and link mention.
fn rss_point(item: &RssItem) -> Option<Coordinate> {
    item.georss_point
        .as_deref()
        .and_then(parse_georss_point)
        .or_else(|| {
            Coordinate::located(
                parse_feed_number(item.gdacs_lat.as_deref()?)?,
                parse_feed_number(item.gdacs_lon.as_deref()?)?,
            )
        })
        .or_else(|| {
            coordinates_in_text(&format!(
                "{} {}",
                item.description.as_deref().unwrap_or_default(),
                item.link.as_deref().unwrap_or_default()
            ))
        })
}

/// Free-text coordinates, tried in order until one is not (0, 0):
/// `lat: x` / `lon: y` labels, a bare `x, y` pair, then `12.5°N 45°E`.
pub(crate) fn coordinates_in_text(text: &str) -> Option<Coordinate> {
    let text = text.to_lowercase();
    let number = |re: &Regex| -> f64 {
        re.captures(&text)
            .and_then(|c| parse_feed_number(c.get(1)?.as_str()))
            .unwrap_or(0.0)
    };

    let (mut lat, mut lon) = (number(&TEXT_LAT), number(&TEXT_LON));
    if lat == 0.0 && lon == 0.0 {
        if let Some(c) = TEXT_PAIR.captures(&text) {
            lat = parse_feed_number(&c[1]).unwrap_or(0.0);
            lon = parse_feed_number(&c[2]).unwrap_or(0.0);
        }
    }
    if lat == 0.0 && lon == 0.0 {
        if let Some(c) = TEXT_HEMISPHERE.captures(&text) {
            let sign = |hemisphere: &str, negative: &str| if hemisphere == negative { -1.0 } else { 1.0 };
            lat = parse_feed_number(&c[1]).unwrap_or(0.0) * sign(&c[2], "s");
            lon = parse_feed_number(&c[3]).unwrap_or(0.0) * sign(&c[4], "w");
        }
    }
    Coordinate::located(lat, lon)
}

/// `"lat lon"`, space separated.
pub(crate) fn parse_georss_point(raw: &str) -> Option<Coordinate> {
    let mut parts = raw.split_whitespace();
    let lat = parse_feed_number(parts.next()?)?;
    let lon = parse_feed_number(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Coordinate::located(lat, lon)
}

/// `"lat,lon lat,lon ..."`. Unparseable vertices are dropped; the center is
/// the arithmetic mean of the vertices, not a true centroid.
pub(crate) fn parse_cap_polygon(raw: &str) -> Option<ResolvedArea> {
    let ring: Vec<[f64; 2]> = raw
        .split_whitespace()
        .filter_map(|pair| {
            let (lat, lon) = pair.split_once(',')?;
            Some([parse_feed_number(lon)?, parse_feed_number(lat)?])
        })
        .collect();
    if ring.is_empty() {
        return None;
    }

    let n = ring.len() as f64;
    let avg_lon = ring.iter().map(|c| c[0]).sum::<f64>() / n;
    let avg_lat = ring.iter().map(|c| c[1]).sum::<f64>() / n;
    let center = Coordinate::located(avg_lat, avg_lon)?;
    Some(ResolvedArea::Polygon { ring, center })
}

/// `"lat,lon radiusKm"`.
pub(crate) fn parse_cap_circle(raw: &str) -> Option<ResolvedArea> {
    let mut parts = raw.split_whitespace();
    let (lat, lon) = parts.next()?.split_once(',')?;
    let radius_km = parse_feed_number(parts.next()?)?;
    if radius_km < 0.0 {
        return None;
    }
    let center = Coordinate::located(parse_feed_number(lat)?, parse_feed_number(lon)?)?;
    Some(ResolvedArea::Circle { center, radius_km })
}

/// Entries decoded from one document and the items that failed to decode.
#[derive(Debug, Default)]
pub(crate) struct ParsedFeed {
    pub entries: Vec<FeedEntry>,
    pub skipped: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FeedFamily {
    Rss,
    Atom,
}

impl FeedFamily {
    fn from_root(local_name: &[u8]) -> Result<Self, AppError> {
        match local_name {
            b"rss" => Ok(Self::Rss),
            b"feed" => Ok(Self::Atom),
            other => Err(AppError::Parse(format!(
                "unsupported feed root element <{}>",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    fn item_tag(self) -> &'static [u8] {
        match self {
            Self::Rss => b"item",
            Self::Atom => b"entry",
        }
    }

    fn decode(self, fragment: &str) -> Result<FeedEntry, quick_xml::DeError> {
        match self {
            Self::Rss => quick_xml::de::from_str::<RssItem>(fragment).map(FeedEntry::from_rss),
            Self::Atom => quick_xml::de::from_str::<AtomEntry>(fragment).map(FeedEntry::AtomCap),
        }
    }
}

fn malformed(err: quick_xml::Error) -> AppError {
    AppError::Parse(format!("malformed XML: {err}"))
}

/// Parses an RSS or Atom document. The root element picks the family; each
/// `<item>`/`<entry>` is then cut out of the document and decoded on its own.
pub(crate) fn parse_feed(xml: &str) -> Result<ParsedFeed, AppError> {
    let mut reader = Reader::from_str(xml);
    let mut family = None;
    let mut depth = 0usize;
    let mut parsed = ParsedFeed::default();

    loop {
        let start = reader.buffer_position() as usize;
        let (element, is_empty) = match reader.read_event().map_err(malformed)? {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let Some(feed_family) = family else {
            family = Some(FeedFamily::from_root(element.local_name().as_ref())?);
            if !is_empty {
                depth += 1;
            }
            continue;
        };

        if element.local_name().as_ref() != feed_family.item_tag() {
            if !is_empty {
                depth += 1;
            }
            continue;
        }

        if !is_empty {
            let end = element.to_end().into_owned();
            reader.read_to_end(end.name()).map_err(malformed)?;
        }
        let fragment = xml
            .get(start..reader.buffer_position() as usize)
            .unwrap_or_default();
        match feed_family.decode(fragment) {
            Ok(entry) => parsed.entries.push(entry),
            Err(err) => {
                log::warn!("Skipping malformed feed item: {err}");
                parsed.skipped += 1;
            }
        }
    }

    match family {
        None => Err(AppError::Parse("empty XML document".into())),
        Some(_) if depth > 0 => Err(AppError::Parse("unexpected end of XML document".into())),
        Some(_) => Ok(parsed),
    }
}
