//! Projection of joined records into what a line-chart renderer needs.

use serde::Serialize;

use crate::models::JoinedRecord;
use crate::settings::ThresholdConfig;

const MARKER_FALLBACK_TEXT: &str = "Note";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Unix seconds.
    pub time: i64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub time: i64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BandKind {
    Target,
    Hypo,
    Hyper,
    Medium,
}

impl BandKind {
    pub fn title(&self) -> &'static str {
        match self {
            BandKind::Target => "Target",
            BandKind::Hypo => "Hypo",
            BandKind::Hyper => "Hyper",
            BandKind::Medium => "Medium",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            BandKind::Target => "#4caf50",
            BandKind::Hypo | BandKind::Hyper => "#f44336",
            BandKind::Medium => "#ffc300",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLine {
    pub kind: BandKind,
    pub title: &'static str,
    pub price: f64,
    pub color: &'static str,
}

impl PriceLine {
    fn new(kind: BandKind, price: f64) -> Self {
        Self {
            kind,
            title: kind.title(),
            price,
            color: kind.color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartModel {
    pub series: Vec<SeriesPoint>,
    pub markers: Vec<Marker>,
    pub price_lines: Vec<PriceLine>,
}

impl ChartModel {
    pub fn build(records: &[JoinedRecord], levels: &ThresholdConfig) -> Self {
        let series = records
            .iter()
            .filter_map(|record| {
                record.concentration.map(|value| SeriesPoint {
                    time: record.timestamp.timestamp(),
                    value,
                })
            })
            .collect();

        let markers = records
            .iter()
            .filter(|record| record.has_annotation())
            .map(|record| Marker {
                time: record.timestamp.timestamp(),
                text: record
                    .note
                    .clone()
                    .unwrap_or_else(|| MARKER_FALLBACK_TEXT.to_string()),
            })
            .collect();

        let price_lines = vec![
            PriceLine::new(BandKind::Target, levels.target),
            PriceLine::new(BandKind::Hypo, levels.hypo),
            PriceLine::new(BandKind::Hyper, levels.hyper),
            PriceLine::new(BandKind::Medium, levels.medium),
        ];

        Self {
            series,
            markers,
            price_lines,
        }
    }
}
