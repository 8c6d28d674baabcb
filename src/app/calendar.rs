//! Calendar view: one card per roster week, one tile per day.
//!
//! Times are shown exactly as stored. Night shifts are already folded into
//! next-day times when the roster is parsed, so the grid never converts them.

use crate::domain::model::{DayEntry, RosterDocument, WeekEntry, Weekday};

/// Codes, or code fragments, that mark a rest or leave day.
pub const OFF_CODE_KEYWORDS: [&str; 8] = ["REPOS", "CONGÉ", "HSBR", "CW", "RW", "RH", "RT", "RV/"];

/// Long names for the duty codes printed on rosters.
pub const CODE_LABELS: [(&str, &str); 7] = [
    ("CW", "REPOS COMPENSATOIRE"),
    ("RW", "REPOS HEBDOMADAIRE"),
    ("RT", "REPOS EN TERRITOIRE"),
    ("CV", "CONGÉ"),
    ("RES", "RÉSERVE"),
    ("HSBR", "HORS SERVICE - BRUXELLES"),
    ("F", "FORMATION"),
];

const CELL_WIDTH: usize = 11;
const MISSING_TIME: &str = "--:--";

/// A day is off when it has neither start nor end time, or when its code
/// contains a rest/leave keyword (case-insensitive).
pub fn is_off_day(day: &DayEntry) -> bool {
    if day.has_no_times() {
        return true;
    }
    day.duty_code()
        .map(|code| {
            let code = code.to_uppercase();
            OFF_CODE_KEYWORDS.iter().any(|keyword| code.contains(keyword))
        })
        .unwrap_or(false)
}

/// Kind of shift: the long name of a known code, otherwise `REPOS` for off
/// days and `CONDUITE` for driving duty.
pub fn shift_type(day: &DayEntry) -> &'static str {
    let code = day.duty_code().map(str::to_uppercase);
    if let Some(code) = code.as_deref() {
        if let Some((_, label)) = CODE_LABELS.iter().find(|(known, _)| *known == code) {
            return *label;
        }
    }
    if is_off_day(day) {
        "REPOS"
    } else {
        "CONDUITE"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTile {
    pub weekday: Weekday,
    pub badge: String,
    pub times: Option<(String, String)>,
    pub off: bool,
}

impl DayTile {
    pub fn from_day(weekday: Weekday, day: &DayEntry) -> Self {
        let off = is_off_day(day);
        let code = day.duty_code().map(str::to_string);
        if off {
            Self {
                weekday,
                badge: code.unwrap_or_else(|| "REPOS".to_string()),
                times: None,
                off,
            }
        } else {
            Self {
                weekday,
                badge: code.unwrap_or_else(|| "---".to_string()),
                times: Some((
                    day.start_time().unwrap_or(MISSING_TIME).to_string(),
                    day.end_time().unwrap_or(MISSING_TIME).to_string(),
                )),
                off,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekCard {
    pub week_number: u32,
    pub tiles: [DayTile; 7],
}

impl WeekCard {
    pub fn from_week(week: &WeekEntry) -> Self {
        Self {
            week_number: week.week_number,
            tiles: week.days().map(|(weekday, day)| DayTile::from_day(weekday, day)),
        }
    }

    pub fn tile(&self, weekday: Weekday) -> &DayTile {
        &self.tiles[weekday.offset() as usize]
    }

    pub fn off_days(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.off).count()
    }
}

fn cell(text: &str) -> String {
    let clipped: String = text.chars().take(CELL_WIDTH).collect();
    format!("{:^width$}", clipped, width = CELL_WIDTH)
}

fn row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    let cells: Vec<String> = cells.map(cell).collect();
    format!("|{}|", cells.join("|"))
}

fn separator() -> String {
    let dashes = "-".repeat(CELL_WIDTH);
    format!("+{}+", vec![dashes; 7].join("+"))
}

pub fn render_week(card: &WeekCard) -> String {
    let header = format!(
        "Week {} ({} on duty, {} off)",
        card.week_number,
        7 - card.off_days(),
        card.off_days()
    );
    let labels = row(card.tiles.iter().map(|t| t.weekday.short_label()));
    let badges = row(card.tiles.iter().map(|t| t.badge.as_str()));
    let starts = row(card.tiles.iter().map(|t| match &t.times {
        Some((start, _)) => start.as_str(),
        None => "off",
    }));
    let ends = row(card.tiles.iter().map(|t| match &t.times {
        Some((_, end)) => end.as_str(),
        None => "",
    }));

    [header, separator(), labels, separator(), badges, starts, ends, separator()].join("\n")
}

pub fn render_calendar(roster: &RosterDocument) -> String {
    let mut sections = vec![format!(
        "Series: {}    Period: {}    Weeks: {}",
        roster.series_label,
        roster.period_label,
        roster.weeks.len()
    )];
    sections.extend(
        roster
            .weeks
            .iter()
            .map(|week| render_week(&WeekCard::from_week(week))),
    );
    let mut out = sections.join("\n\n");
    out.push('\n');
    out
}
