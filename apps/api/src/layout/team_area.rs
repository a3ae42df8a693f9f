//! Team area metrics: table and seat boxes for laying out teams inside one
//! area, derived from percentage offsets, paddings, and the seat count.
//!
//! Nothing here is cached: every getter recomputes from the current
//! parameters so a live edit is reflected on the next read.
//!
//! # Box layout (horizontal)
//! ```text
//! | pad | seat | pad + sep | seat | pad + sep | seat | pad |
//! ```
//! which gives `seat_width = (table_width - (n+1)·pad - (n-1)·sep) / n`.

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::layout::error::LayoutError;

/// Vertical space kept free above the team label, before the stroke is added back.
pub const FONT_HEIGHT_RESERVE: f64 = 70.0;

/// Width-bound font size used while no team label is registered (or the
/// table has no width), so the font is bound by height alone.
pub const FONT_WIDTH_SENTINEL: f64 = 2000.0;

/// Largest seat count a team area accepts from the wire.
pub const MAX_SEAT_NUM: u32 = 1_000;

/// Axis-aligned box in area coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxMetrics {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Editable parameters of a team area plus the running label maximum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamArea {
    pub stroke_width: f64,

    /// Percentages of the area size the origin is shifted by.
    pub area_offset_x: f64,
    pub area_offset_y: f64,

    pub area_width: f64,
    pub area_height: f64,

    pub area_padding_x: f64,
    pub area_padding_y: f64,

    pub table_offset_x: f64,
    pub table_offset_y: f64,

    /// Longest registered team label, in characters. Owned by
    /// [`TeamArea::register_team_id`]; never taken from client input.
    #[serde(skip_deserializing)]
    pub max_team_length: usize,

    pub seat_sep: f64,
    pub seat_dist: f64,
    #[serde(deserialize_with = "deserialize_seat_num")]
    pub seat_num: u32,
    pub seat_height: f64,
    pub seat_padding: f64,

    pub distance_unit: String,
}

impl Default for TeamArea {
    fn default() -> Self {
        TeamArea {
            stroke_width: 3.0,
            area_offset_x: 50.0,
            area_offset_y: 0.0,
            area_width: 500.0,
            area_height: 300.0,
            area_padding_x: 0.0,
            area_padding_y: 0.0,
            table_offset_x: 0.0,
            table_offset_y: 0.0,
            max_team_length: 0,
            seat_sep: 30.0,
            seat_dist: 30.0,
            seat_num: 3,
            seat_height: 30.0,
            seat_padding: 0.0,
            distance_unit: "cm".to_string(),
        }
    }
}

/// Accepts `0..=MAX_SEAT_NUM`; negative or larger counts fail the whole
/// team area.
fn deserialize_seat_num<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let num = i64::deserialize(deserializer)?;
    if num < 0 {
        return Err(de::Error::custom(LayoutError::InvalidSequenceCount(num)));
    }
    if num > i64::from(MAX_SEAT_NUM) {
        return Err(de::Error::custom(LayoutError::SeatCountTooLarge {
            num,
            max: MAX_SEAT_NUM,
        }));
    }
    Ok(num as u32)
}

/// Snapshot of every derived value, for renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaLayout {
    pub area: BoxMetrics,
    pub table: BoxMetrics,
    pub seats: Vec<BoxMetrics>,
    pub seat_width: f64,
    pub font_size: f64,
    pub max_team_length: usize,
    pub degenerate_seats: bool,
}

impl TeamArea {
    // ── origin ──────────────────────────────────────────────────────────────

    pub fn area_x(&self) -> f64 {
        -self.area_width * self.area_offset_x / 100.0
    }

    pub fn area_y(&self) -> f64 {
        -self.area_height * self.area_offset_y / 100.0
    }

    pub fn table_x(&self) -> f64 {
        self.area_x() + self.area_padding_x - self.table_offset_x
    }

    pub fn table_y(&self) -> f64 {
        self.area_y() + self.area_padding_y - self.table_offset_y
    }

    // ── table ───────────────────────────────────────────────────────────────

    pub fn table_width(&self) -> f64 {
        self.area_width - 2.0 * self.area_padding_x
    }

    /// Area height minus padding, minus one seat row when there are seats.
    pub fn table_height(&self) -> f64 {
        let seat_row = if self.seat_num > 0 {
            self.seat_height + self.seat_dist
        } else {
            0.0
        };
        self.area_height - 2.0 * self.area_padding_y - seat_row
    }

    // ── seats ───────────────────────────────────────────────────────────────

    pub fn seat_y(&self) -> f64 {
        self.table_y() + self.table_height() + self.seat_dist
    }

    /// Width of one seat, clamped at zero. Too many seats for the table
    /// collapses them instead of failing.
    pub fn seat_width(&self) -> f64 {
        self.raw_seat_width().max(0.0)
    }

    /// Unclamped seat width; `<= 0` marks a degenerate row.
    pub fn raw_seat_width(&self) -> f64 {
        if self.seat_num == 0 {
            return 0.0;
        }
        let n = f64::from(self.seat_num);
        (self.table_width() - (n + 1.0) * self.seat_padding - (n - 1.0) * self.seat_sep) / n
    }

    pub fn seat_x(&self, index: u32) -> f64 {
        self.table_x()
            + self.seat_padding
            + f64::from(index) * (self.seat_width() + self.seat_padding + self.seat_sep)
    }

    // ── font ────────────────────────────────────────────────────────────────

    pub fn d_font_size(&self) -> f64 {
        let mut x_width = if self.max_team_length == 0 {
            FONT_WIDTH_SENTINEL
        } else {
            self.table_width() / self.max_team_length as f64
        };
        if x_width <= 0.0 {
            x_width = FONT_WIDTH_SENTINEL;
        }
        (self.table_height() - FONT_HEIGHT_RESERVE + self.stroke_width).min(x_width)
    }

    /// Raises the running maximum to this label's length. Never lowers it.
    pub fn register_team_id(&mut self, label: &str) {
        self.max_team_length = self.max_team_length.max(label.chars().count());
    }

    pub fn register_team_ids<'a>(&mut self, labels: impl IntoIterator<Item = &'a str>) {
        for label in labels {
            self.register_team_id(label);
        }
    }

    pub fn reset_team_length(&mut self) {
        self.max_team_length = 0;
    }

    /// Replaces every editable parameter with `params`, keeping the
    /// registered label maximum.
    pub fn update_parameters(&mut self, params: TeamArea) {
        let max_team_length = self.max_team_length;
        *self = TeamArea {
            max_team_length,
            ..params
        };
    }

    // ── boxes ───────────────────────────────────────────────────────────────

    pub fn area_box(&self) -> BoxMetrics {
        BoxMetrics {
            x: self.area_x(),
            y: self.area_y(),
            width: self.area_width,
            height: self.area_height,
        }
    }

    pub fn table_box(&self) -> BoxMetrics {
        BoxMetrics {
            x: self.table_x(),
            y: self.table_y(),
            width: self.table_width(),
            height: self.table_height(),
        }
    }

    pub fn seat_boxes(&self) -> Vec<BoxMetrics> {
        let width = self.seat_width();
        let y = self.seat_y();
        (0..self.seat_num)
            .map(|i| BoxMetrics {
                x: self.seat_x(i),
                y,
                width,
                height: self.seat_height,
            })
            .collect()
    }

    pub fn layout(&self) -> AreaLayout {
        AreaLayout {
            area: self.area_box(),
            table: self.table_box(),
            seats: self.seat_boxes(),
            seat_width: self.seat_width(),
            font_size: self.d_font_size(),
            max_team_length: self.max_team_length,
            degenerate_seats: self.seat_num > 0 && self.raw_seat_width() <= 0.0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::coordinate::tests::assert_close;

    fn scenario_area() -> TeamArea {
        TeamArea {
            area_width: 500.0,
            area_height: 300.0,
            area_offset_x: 50.0,
            area_offset_y: 0.0,
            area_padding_x: 0.0,
            area_padding_y: 0.0,
            seat_num: 3,
            seat_sep: 30.0,
            seat_padding: 0.0,
            ..TeamArea::default()
        }
    }

    // ── origin / table ──────────────────────────────────────────────────────

    #[test]
    fn test_area_origin_from_percent_offset() {
        let area = scenario_area();
        assert_close(area.area_x(), -250.0);
        assert_close(area.area_y(), 0.0);
    }

    #[test]
    fn test_table_origin_adds_padding_and_subtracts_offset() {
        let area = TeamArea {
            area_padding_x: 10.0,
            area_padding_y: 5.0,
            table_offset_x: 4.0,
            table_offset_y: 1.0,
            ..scenario_area()
        };
        assert_close(area.table_x(), -250.0 + 10.0 - 4.0);
        assert_close(area.table_y(), 5.0 - 1.0);
    }

    #[test]
    fn test_table_dimensions() {
        let area = TeamArea {
            area_padding_x: 20.0,
            area_padding_y: 10.0,
            ..scenario_area()
        };
        assert_close(area.table_width(), 460.0);
        // 300 - 20 - (30 seat height + 30 seat dist)
        assert_close(area.table_height(), 220.0);
    }

    #[test]
    fn test_table_height_without_seats_drops_seat_row() {
        let area = TeamArea {
            seat_num: 0,
            ..scenario_area()
        };
        assert_close(area.table_height(), 300.0);
        assert!(area.seat_boxes().is_empty());
        assert_close(area.seat_width(), 0.0);
    }

    // ── seat width ──────────────────────────────────────────────────────────

    #[test]
    fn test_scenario_seat_width() {
        let area = scenario_area();
        assert_close(area.table_width(), 500.0);
        // (500 - 4·0 - 2·30) / 3
        assert_close(area.seat_width(), 440.0 / 3.0);
    }

    #[test]
    fn test_seat_width_reserves_padding_on_both_edges() {
        let area = TeamArea {
            seat_padding: 10.0,
            seat_sep: 0.0,
            seat_num: 4,
            ..scenario_area()
        };
        assert_close(area.seat_width(), (500.0 - 50.0) / 4.0);
    }

    #[test]
    fn test_seat_width_non_increasing_in_seat_count() {
        let mut area = TeamArea {
            seat_padding: 3.0,
            ..scenario_area()
        };
        let mut previous = f64::INFINITY;
        for n in 1..40 {
            area.seat_num = n;
            let width = area.seat_width();
            assert!(width <= previous + 1e-12, "n={n}: {width} > {previous}");
            previous = width;
        }
    }

    #[test]
    fn test_overcrowded_row_clamps_to_zero() {
        let area = TeamArea {
            seat_num: 30,
            ..scenario_area()
        };
        assert!(area.raw_seat_width() < 0.0);
        assert_eq!(area.seat_width(), 0.0);
        assert!(area.layout().degenerate_seats);
    }

    #[test]
    fn test_seat_boxes_tile_the_table() {
        let area = TeamArea {
            seat_padding: 5.0,
            ..scenario_area()
        };
        let boxes = area.seat_boxes();
        assert_eq!(boxes.len(), 3);
        assert_close(boxes[0].x, area.table_x() + 5.0);
        let last = boxes[2];
        let table_right = area.table_x() + area.table_width();
        assert_close(last.x + last.width + area.seat_padding, table_right);
        assert_close(boxes[1].y, area.table_y() + area.table_height() + area.seat_dist);
    }

    // ── font size ───────────────────────────────────────────────────────────

    #[test]
    fn test_font_size_height_bound_without_labels() {
        let area = scenario_area();
        // table height 240 - 70 + 3
        assert_close(area.d_font_size(), 173.0);
    }

    #[test]
    fn test_font_size_width_bound_with_long_label() {
        let mut area = scenario_area();
        area.register_team_id("a-rather-long-team-name");
        let len = "a-rather-long-team-name".len() as f64;
        assert_close(area.d_font_size(), 500.0 / len);
    }

    #[test]
    fn test_font_size_sentinel_for_zero_width_table() {
        let mut area = TeamArea {
            area_width: 0.0,
            ..scenario_area()
        };
        area.register_team_id("abc");
        assert_close(area.d_font_size(), 173.0);
    }

    // ── register_team_id ────────────────────────────────────────────────────

    #[test]
    fn test_register_is_running_maximum_in_any_order() {
        let labels = ["bob", "a", "teamname", "xy", "teamnam"];
        let expected = labels.iter().map(|l| l.chars().count()).max().unwrap();

        let mut forward = TeamArea::default();
        forward.register_team_ids(labels);
        let mut backward = TeamArea::default();
        backward.register_team_ids(labels.iter().rev().copied());

        assert_eq!(forward.max_team_length, expected);
        assert_eq!(backward.max_team_length, expected);
    }

    #[test]
    fn test_register_never_decreases() {
        let mut area = TeamArea::default();
        area.register_team_id("longer");
        area.register_team_id("x");
        assert_eq!(area.max_team_length, 6);
        area.reset_team_length();
        assert_eq!(area.max_team_length, 0);
    }

    #[test]
    fn test_register_counts_characters_not_bytes() {
        let mut area = TeamArea::default();
        area.register_team_id("Zürich");
        assert_eq!(area.max_team_length, 6);
    }

    // ── parameters ──────────────────────────────────────────────────────────

    #[test]
    fn test_update_parameters_keeps_running_max() {
        let mut area = TeamArea::default();
        area.register_team_id("abcd");
        area.update_parameters(TeamArea {
            seat_num: 5,
            ..TeamArea::default()
        });
        assert_eq!(area.seat_num, 5);
        assert_eq!(area.max_team_length, 4);
    }

    #[test]
    fn test_deserialize_rejects_seat_num_out_of_range() {
        let err = serde_json::from_str::<TeamArea>(r#"{"seatNum": 4294967295}"#).unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"), "got: {err}");
        assert!(serde_json::from_str::<TeamArea>(r#"{"seatNum": -1}"#).is_err());

        let area: TeamArea =
            serde_json::from_str(&format!(r#"{{"seatNum": {MAX_SEAT_NUM}}}"#)).unwrap();
        assert_eq!(area.seat_num, MAX_SEAT_NUM);
    }

    #[test]
    fn test_deserialize_ignores_max_team_length_and_fills_defaults() {
        let area: TeamArea =
            serde_json::from_str(r#"{"seatNum": 6, "maxTeamLength": 99}"#).unwrap();
        assert_eq!(area.seat_num, 6);
        assert_eq!(area.max_team_length, 0);
        assert_eq!(area.area_width, 500.0);
        assert_eq!(area.distance_unit, "cm");
    }
}
