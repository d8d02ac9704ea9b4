//! Field zones relative to the line of scrimmage
//!
//! The field is cut into 4 depth bands by the LOS and first-down marker and
//! 4 width bands by the hash-mark geometry, giving 16 zones labelled
//! `"{depth}-{width}"`, e.g. `LN-LI`. A value on a threshold falls into the
//! lower band.

use std::collections::BTreeMap;
use std::fmt;

use crate::data::normalize::FIELD_WIDTH;
use crate::models::{Point, TrackingRow};

/// Lateral cut points: 12 yards in from each sideline and the field center
pub const WIDTH_THRESHOLDS: [f64; 3] = [12.0, FIELD_WIDTH / 2.0, FIELD_WIDTH - 12.0];

/// Yards either side of the LOS that count as the line
const LINE_DEPTH: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DepthBand {
    Backfield,
    Line,
    Short,
    Deep,
}

impl DepthBand {
    const ALL: [DepthBand; 4] = [
        DepthBand::Backfield,
        DepthBand::Line,
        DepthBand::Short,
        DepthBand::Deep,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            DepthBand::Backfield => "BF",
            DepthBand::Line => "LN",
            DepthBand::Short => "SH",
            DepthBand::Deep => "DP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WidthBand {
    LeftOutside,
    LeftInside,
    RightInside,
    RightOutside,
}

impl WidthBand {
    const ALL: [WidthBand; 4] = [
        WidthBand::LeftOutside,
        WidthBand::LeftInside,
        WidthBand::RightInside,
        WidthBand::RightOutside,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            WidthBand::LeftOutside => "LO",
            WidthBand::LeftInside => "LI",
            WidthBand::RightInside => "RI",
            WidthBand::RightOutside => "RO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Zone {
    pub depth: DepthBand,
    pub width: WidthBand,
}

impl Zone {
    /// All 16 zones, depth-major
    pub fn all() -> impl Iterator<Item = Zone> {
        DepthBand::ALL.into_iter().flat_map(|depth| {
            WidthBand::ALL
                .into_iter()
                .map(move |width| Zone { depth, width })
        })
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.depth.code(), self.width.code())
    }
}

/// Number of thresholds strictly below `value`
fn band_index(value: f64, thresholds: &[f64; 3]) -> usize {
    thresholds.iter().take_while(|t| value > **t).count()
}

/// Zone boundaries for one play
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneGrid {
    depth_thresholds: [f64; 3],
}

impl ZoneGrid {
    pub fn new(los: Point, first_down_x: f64) -> Self {
        let line_front = los.x + LINE_DEPTH;
        Self {
            depth_thresholds: [los.x - LINE_DEPTH, line_front, first_down_x.max(line_front)],
        }
    }

    pub fn depth_thresholds(&self) -> [f64; 3] {
        self.depth_thresholds
    }

    pub fn classify(&self, x: f64, y: f64) -> Zone {
        Zone {
            depth: DepthBand::ALL[band_index(x, &self.depth_thresholds)],
            width: WidthBand::ALL[band_index(y, &WIDTH_THRESHOLDS)],
        }
    }

    pub fn assign_zones<'a>(&self, rows: &'a [TrackingRow]) -> Vec<(&'a TrackingRow, Zone)> {
        rows.iter().map(|r| (r, self.classify(r.x, r.y))).collect()
    }

    /// Rows per zone; zones nobody occupies are absent
    pub fn occupancy<'a, I>(&self, rows: I) -> BTreeMap<Zone, usize>
    where
        I: IntoIterator<Item = &'a TrackingRow>,
    {
        let mut counts = BTreeMap::new();
        for r in rows {
            *counts.entry(self.classify(r.x, r.y)).or_insert(0) += 1;
        }
        counts
    }
}
