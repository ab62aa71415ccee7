//! Turns day slots into display rows. No HTML here; see `render::html`.

use super::fields::{Field, FieldSelection};
use crate::model::{DayRecord, DaySlot};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

pub const MISSING_VALUE: &str = "-";
pub const UNAVAILABLE_TEXT: &str = "Data unavailable for this day.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub field: Field,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Day { date: NaiveDate, cells: Vec<Cell> },
    /// No record for this date; one placeholder spans `span` columns.
    Unavailable { date: NaiveDate, span: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub fields: Vec<Field>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn headers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(Field::label)
    }
}

pub fn moon_phase_icon(phase: &str) -> Option<&'static str> {
    let key: String = phase
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    match key.as_str() {
        "newmoon" => Some("🌑"),
        "waxingcrescent" => Some("🌒"),
        "firstquarter" => Some("🌓"),
        "waxinggibbous" => Some("🌔"),
        "fullmoon" => Some("🌕"),
        "waninggibbous" => Some("🌖"),
        "lastquarter" => Some("🌗"),
        "waningcrescent" => Some("🌘"),
        _ => None,
    }
}

/// Upper-cases the first character only.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn format_moon_phase(phase: Option<&str>) -> String {
    let Some(phase) = phase.map(str::trim).filter(|p| !p.is_empty()) else {
        return MISSING_VALUE.to_string();
    };
    let name = capitalize(phase);
    match moon_phase_icon(phase) {
        Some(icon) => format!("{} {}", icon, name),
        None => name,
    }
}

/// Formats a provider time as 24-hour `HH:MM`.
///
/// Timestamps carrying an offset are shifted into `display_offset`; bare
/// times (`06:21 AM`, `18:46`) are already local and kept as they are.
pub fn format_clock(raw: &str, display_offset: FixedOffset) -> Option<String> {
    let raw = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.with_timezone(&display_offset).format("%H:%M").to_string());
    }
    for pattern in ["%I:%M %p", "%H:%M", "%H:%M:%S"] {
        if let Ok(time) = NaiveTime::parse_from_str(raw, pattern) {
            return Some(time.format("%H:%M").to_string());
        }
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(stamp.format("%H:%M").to_string());
        }
    }
    None
}

fn clock_cell(raw: Option<&str>, display_offset: FixedOffset) -> String {
    raw.and_then(|r| format_clock(r, display_offset))
        .unwrap_or_else(|| MISSING_VALUE.to_string())
}

fn format_cell(field: Field, date: NaiveDate, record: &DayRecord, display_offset: FixedOffset) -> String {
    match field {
        Field::Date => date.format("%d/%m/%Y").to_string(),
        Field::Sunrise => clock_cell(record.sunrise.as_deref(), display_offset),
        Field::Sunset => clock_cell(record.sunset.as_deref(), display_offset),
        Field::Moonrise => clock_cell(record.moonrise.as_deref(), display_offset),
        Field::Moonset => clock_cell(record.moonset.as_deref(), display_offset),
        Field::MoonPhase => format_moon_phase(record.moon_phase.as_deref()),
        Field::Illumination => match record.illumination_percent {
            Some(pct) if pct.is_finite() => format!("{:.0}%", pct),
            _ => MISSING_VALUE.to_string(),
        },
    }
}

pub fn build_table(slots: &[DaySlot], selection: &FieldSelection, display_offset: FixedOffset) -> Table {
    let fields = selection.fields().to_vec();
    let rows = slots
        .iter()
        .map(|slot| match &slot.record {
            Some(record) => Row::Day {
                date: slot.date,
                cells: fields
                    .iter()
                    .map(|&field| Cell {
                        field,
                        text: format_cell(field, slot.date, record, display_offset),
                    })
                    .collect(),
            },
            None => Row::Unavailable {
                date: slot.date,
                span: fields.len(),
            },
        })
        .collect();
    Table { fields, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, Utc};
    use pretty_assertions::assert_eq;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    fn record(date: &str) -> DayRecord {
        DayRecord {
            date: d(date),
            sunrise: Some("2024-03-25T06:21:00+00:00".to_string()),
            sunset: Some("06:46 PM".to_string()),
            moonrise: None,
            moonset: Some("10:05".to_string()),
            moon_phase: Some("Full Moon".to_string()),
            illumination_percent: Some(98.6),
        }
    }

    #[test]
    fn test_full_moon_gets_icon_and_capitalized_name() {
        assert_eq!(format_moon_phase(Some("Full Moon")), "🌕 Full Moon");
        assert_eq!(format_moon_phase(Some("full moon")), "🌕 Full moon");
        assert_eq!(format_moon_phase(Some("waning  Crescent")), "🌘 Waning  Crescent");
    }

    #[test]
    fn test_unknown_phase_renders_text_only() {
        assert_eq!(format_moon_phase(Some("blue moon")), "Blue moon");
        assert_eq!(format_moon_phase(Some("  ")), "-");
        assert_eq!(format_moon_phase(None), "-");
    }

    #[test]
    fn test_all_eight_phases_have_icons() {
        let phases = [
            "New Moon",
            "Waxing Crescent",
            "First Quarter",
            "Waxing Gibbous",
            "Full Moon",
            "Waning Gibbous",
            "Last Quarter",
            "Waning Crescent",
        ];
        let icons: Vec<&str> = phases.iter().filter_map(|p| moon_phase_icon(p)).collect();
        assert_eq!(icons, vec!["🌑", "🌒", "🌓", "🌔", "🌕", "🌖", "🌗", "🌘"]);
    }

    #[test]
    fn test_only_the_eight_phase_names_get_icons() {
        assert_eq!(moon_phase_icon("LAST  quarter"), Some("🌗"));
        assert_eq!(moon_phase_icon("Third Quarter"), None);
        assert_eq!(format_moon_phase(Some("third quarter")), "Third quarter");
    }

    #[test]
    fn test_clock_formats() {
        assert_eq!(format_clock("06:21 AM", utc()).as_deref(), Some("06:21"));
        assert_eq!(format_clock("06:46 PM", utc()).as_deref(), Some("18:46"));
        assert_eq!(format_clock("18:46", utc()).as_deref(), Some("18:46"));
        assert_eq!(format_clock("2024-03-25T06:21:00+00:00", utc()).as_deref(), Some("06:21"));
        assert_eq!(format_clock("2024-03-25 23:59:10", utc()).as_deref(), Some("23:59"));
        assert_eq!(format_clock("whenever", utc()), None);
    }

    #[test]
    fn test_clock_shifts_timestamps_into_display_offset() {
        let cest = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(format_clock("2024-03-25T23:30:00+00:00", cest).as_deref(), Some("01:30"));
        // bare local times are not shifted
        assert_eq!(format_clock("06:21 AM", cest).as_deref(), Some("06:21"));
    }

    #[test]
    fn test_row_cells_follow_selection() {
        let selection = FieldSelection::parse("date,sunrise,sunset,moonrise,moonset,moonphase,illumination").unwrap();
        let table = build_table(&[DaySlot::filled(record("2024-03-25"))], &selection, utc());
        let texts: Vec<&str> = match &table.rows[0] {
            Row::Day { cells, .. } => cells.iter().map(|c| c.text.as_str()).collect(),
            other => panic!("unexpected row {:?}", other),
        };
        assert_eq!(texts, vec!["25/03/2024", "06:21", "18:46", "-", "10:05", "🌕 Full Moon", "99%"]);
        let headers: Vec<&str> = table.headers().collect();
        assert_eq!(
            headers,
            vec!["Date", "Sunrise", "Sunset", "Moonrise", "Moonset", "Moon phase", "Illumination"]
        );
    }

    #[test]
    fn test_missing_day_spans_all_selected_columns() {
        let selection = FieldSelection::parse("date,moonphase,sunset").unwrap();
        let slots = vec![
            DaySlot::filled(record("2024-03-25")),
            DaySlot::missing(d("2024-03-26")),
        ];
        let table = build_table(&slots, &selection, utc());
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[1],
            Row::Unavailable {
                date: d("2024-03-26"),
                span: 3
            }
        );
    }
}
