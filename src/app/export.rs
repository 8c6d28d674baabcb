use crate::app::calendar::{is_off_day, shift_type};
use crate::domain::model::RosterDocument;
use crate::domain::ports::{ClipboardSink, Storage};
use crate::utils::error::{Result, RosterError};
use chrono::{Datelike, Duration, NaiveDate};

/// Indented JSON, the same text shown in the JSON view and copied to the clipboard.
pub fn roster_json(roster: &RosterDocument) -> Result<String> {
    Ok(roster.to_pretty_json()?)
}

pub fn copy_roster<C: ClipboardSink + ?Sized>(
    roster: &RosterDocument,
    clipboard: &mut C,
) -> Result<()> {
    let json = roster_json(roster)?;
    clipboard.copy_text(&json)?;
    tracing::info!("Roster JSON copied to the clipboard");
    Ok(())
}

/// Monday of the week containing `date`.
fn cycle_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// One row per week and day: `week,day,date,start,end,code,type,off`.
///
/// With a start date, week 1 Monday is the Monday of that date's week and
/// each later week number is offset from it.
pub fn roster_csv(roster: &RosterDocument, start_date: Option<NaiveDate>) -> Result<String> {
    let monday = start_date.map(cycle_monday);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["week", "day", "date", "start", "end", "code", "type", "off"])?;

    for week in &roster.weeks {
        for (weekday, day) in week.days() {
            let date = monday
                .map(|m| {
                    let offset = i64::from(week.week_number.saturating_sub(1)) * 7
                        + i64::from(weekday.offset());
                    (m + Duration::days(offset)).format("%Y-%m-%d").to_string()
                })
                .unwrap_or_default();
            let off = is_off_day(day);
            writer.write_record([
                week.week_number.to_string().as_str(),
                weekday.key(),
                date.as_str(),
                day.start_time().unwrap_or_default(),
                day.end_time().unwrap_or_default(),
                day.duty_code().unwrap_or_default(),
                shift_type(day),
                if off { "true" } else { "false" },
            ])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| RosterError::IoError(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| RosterError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

pub async fn save_text<S: Storage>(storage: &S, path: &str, contents: &str) -> Result<()> {
    storage.write_file(path, contents.as_bytes()).await?;
    tracing::info!("Wrote {} bytes to {}", contents.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clipboard::MemoryClipboard;
    use crate::config::cli::LocalStorage;
    use crate::domain::model::{DayEntry, WeekEntry, Weekday};

    fn roster() -> RosterDocument {
        RosterDocument {
            series_label: "FL-A".to_string(),
            period_label: "Z SUP 0".to_string(),
            weeks: vec![
                WeekEntry::new(1)
                    .with_day(Weekday::Monday, DayEntry::rest("HSBR"))
                    .with_day(
                        Weekday::Tuesday,
                        DayEntry::new(Some("22:00"), Some("01:10"), Some("FL204")),
                    ),
                WeekEntry::new(2),
            ],
        }
    }

    #[test]
    fn copied_json_parses_back_to_the_same_roster() {
        let mut clipboard = MemoryClipboard::new();
        copy_roster(&roster(), &mut clipboard).unwrap();
        let copied = clipboard.contents().unwrap();
        assert!(copied.contains("\n  \"seriesLabel\": \"FL-A\""));
        assert_eq!(RosterDocument::from_json(copied).unwrap(), roster());
    }

    #[test]
    fn csv_has_seven_rows_per_week() {
        let csv = roster_csv(&roster(), None).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 1 + 14);
        assert_eq!(lines[0], "week,day,date,start,end,code,type,off");
        assert_eq!(lines[1], "1,monday,,,,HSBR,HORS SERVICE - BRUXELLES,true");
        assert_eq!(lines[2], "1,tuesday,,22:00,01:10,FL204,CONDUITE,false");
        assert_eq!(lines[3], "1,wednesday,,,,,REPOS,true");
    }

    #[test]
    fn csv_dates_start_on_the_monday_of_the_given_week() {
        // 2025-01-08 is a Wednesday.
        let start = NaiveDate::from_ymd_opt(2025, 1, 8);
        let csv = roster_csv(&roster(), start).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines[1].starts_with("1,monday,2025-01-06,"));
        assert!(lines[8].starts_with("2,monday,2025-01-13,"));
        assert!(lines[14].starts_with("2,sunday,2025-01-19,"));
    }

    #[test]
    fn saved_json_matches_the_clipboard_text() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap());
        let json = roster_json(&roster()).unwrap();

        tokio_test::block_on(save_text(&storage, "roster.json", &json)).unwrap();

        let saved = std::fs::read_to_string(temp_dir.path().join("roster.json")).unwrap();
        assert_eq!(saved, json);
    }
}
