//! GDACS flood-merge records (`floodmerge/data_v2.aspx`) in JSON or
//! semicolon-separated CSV form.

use serde_json::{Map, Value};

use crate::feeds::assembler::{Assembly, EventAssembler, EventDraft};
use crate::feeds::classifier::Classification;
use crate::geo::{parse_feed_number, Coordinate};
use crate::models::{AlertLevel, DisasterEvent, DisasterType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FloodSource {
    Dfo,
    Gpm,
    DfoMerge,
}

impl FloodSource {
    pub const ALL: [Self; 3] = [Self::Dfo, Self::Gpm, Self::DfoMerge];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "DFO" => Some(Self::Dfo),
            "GPM" => Some(Self::Gpm),
            "DFOMERGE" => Some(Self::DfoMerge),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Dfo => "DFO",
            Self::Gpm => "GPM",
            Self::DfoMerge => "DFOMERGE",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Dfo => "Dartmouth Flood Observatory",
            Self::Gpm => "Global Precipitation Measurement",
            Self::DfoMerge => "DFO Merged Analysis",
        }
    }

    pub fn disaster_type(self) -> DisasterType {
        match self {
            Self::Gpm => DisasterType::Precipitation,
            Self::Dfo | Self::DfoMerge => DisasterType::Flood,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FloodFormat {
    Json,
    Csv,
}

impl FloodFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    pub fn accept(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }
}

/// One flood-merge row. Every field arrives as text in CSV and as either
/// text or number in JSON, so all are kept as strings.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct FloodRecord {
    pub areaid: Option<String>,
    pub sitename: Option<String>,
    pub alertlevel: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub signal: Option<String>,
    pub date: Option<String>,
}

impl FloodRecord {
    fn from_fields<'a>(mut field: impl FnMut(&str) -> Option<&'a str>) -> Self {
        let mut take = |name: &str| {
            field(name)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            areaid: take("areaid"),
            sitename: take("sitename"),
            alertlevel: take("alertlevel"),
            lat: take("lat"),
            lon: take("lon"),
            signal: take("signal"),
            date: take("date"),
        }
    }

    fn location(&self) -> Option<Coordinate> {
        Coordinate::located(
            parse_feed_number(self.lat.as_deref()?)?,
            parse_feed_number(self.lon.as_deref()?)?,
        )
    }

    fn signal_value(&self) -> Option<f64> {
        self.signal
            .as_deref()
            .and_then(parse_feed_number)
            .filter(|s| *s > 0.0)
    }
}

fn json_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Anything other than a JSON array of objects means "no data in this
/// format" rather than an error; the upstream answers HTML when a source
/// has nothing.
pub(crate) fn parse_flood_json(body: &str) -> Vec<FloodRecord> {
    let rows: Vec<Map<String, Value>> = match serde_json::from_str(body) {
        Ok(rows) => rows,
        Err(err) => {
            log::debug!("Flood JSON body not usable: {err}");
            return Vec::new();
        }
    };
    rows.iter()
        .map(|row| {
            let scalars: Vec<(&str, String)> = row
                .iter()
                .filter_map(|(k, v)| json_scalar(v).map(|s| (k.as_str(), s)))
                .collect();
            FloodRecord::from_fields(|name| {
                scalars
                    .iter()
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| v.as_str())
            })
        })
        .collect()
}

/// Header row then `;`-separated values. Blank lines are ignored; short
/// rows leave the trailing fields empty.
pub(crate) fn parse_flood_csv(body: &str) -> Vec<FloodRecord> {
    let mut lines = body.lines().filter(|l| !l.trim().is_empty());
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<&str> = header.split(';').map(str::trim).collect();

    lines
        .map(|line| {
            let values: Vec<&str> = line.split(';').collect();
            FloodRecord::from_fields(|name| {
                let idx = columns.iter().position(|c| *c == name)?;
                values.get(idx).copied()
            })
        })
        .collect()
}

/// Records without a usable location are skipped and counted.
pub(crate) fn flood_events(
    assembler: &EventAssembler,
    records: Vec<FloodRecord>,
    source: FloodSource,
) -> Assembly<DisasterEvent> {
    let mut assembly = Assembly::default();
    for (index, record) in records.into_iter().enumerate() {
        let Some(location) = record.location() else {
            assembly.skipped += 1;
            continue;
        };

        let signal = record.signal_value();
        let area = record
            .sitename
            .clone()
            .unwrap_or_else(|| format!("Area {}", record.areaid.as_deref().unwrap_or_default()));

        assembly.items.push(assembler.finish(EventDraft {
            id: record
                .areaid
                .clone()
                .unwrap_or_else(|| format!("{}_{index}", source.code())),
            title: format!("{} Alert - {area}", source.display_name()),
            description: format!(
                "Signal: {}, Area: {}",
                record.signal.as_deref().unwrap_or("N/A"),
                record.sitename.as_deref().unwrap_or("Unknown")
            ),
            link: None,
            published: record.date.clone(),
            location,
            source: source.code().to_string(),
            classification: Classification {
                alert_level: AlertLevel::normalize(record.alertlevel.as_deref()),
                disaster_type: source.disaster_type(),
                magnitude: signal,
            },
            reported_population: None,
        }));
    }
    assembly
}
