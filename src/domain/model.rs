use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// JSON field name of the slot.
    pub fn key(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Weekday::Monday => "MON",
            Weekday::Tuesday => "TUE",
            Weekday::Wednesday => "WED",
            Weekday::Thursday => "THU",
            Weekday::Friday => "FRI",
            Weekday::Saturday => "SAT",
            Weekday::Sunday => "SUN",
        }
    }

    /// Days since Monday.
    pub fn offset(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One roster cell. Every field is nullable on the wire; a missing key reads
/// as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    #[serde(default, alias = "debut")]
    pub start: Option<String>,
    #[serde(default, alias = "fin")]
    pub end: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Folds an `H:mm` / `HH:mm` value past midnight into the next day
/// (`25:10` becomes `01:10`). Returns `None` for anything that is not a
/// clock time, and for times that are already in range.
pub fn normalize_clock(value: &str) -> Option<String> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || hours.len() > 3 || minutes.len() != 2 || !all_digits(minutes) {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    if hours < 24 {
        return None;
    }
    Some(format!("{:02}:{}", hours % 24, minutes))
}

fn normalize_slot(slot: &mut Option<String>) {
    if let Some(normalized) = slot.as_deref().and_then(normalize_clock) {
        tracing::debug!("Normalized {:?} to {}", slot, normalized);
        *slot = Some(normalized);
    }
}

impl DayEntry {
    pub fn new(start: Option<&str>, end: Option<&str>, code: Option<&str>) -> Self {
        Self {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
            code: code.map(str::to_string),
        }
    }

    pub fn rest(code: &str) -> Self {
        Self::new(None, None, Some(code))
    }

    /// Start time, treating blank strings as absent.
    pub fn start_time(&self) -> Option<&str> {
        present(&self.start)
    }

    pub fn end_time(&self) -> Option<&str> {
        present(&self.end)
    }

    pub fn duty_code(&self) -> Option<&str> {
        present(&self.code)
    }

    pub fn has_no_times(&self) -> bool {
        self.start_time().is_none() && self.end_time().is_none()
    }

    /// Rewrites start and end past 24:00 as next-day times. Codes and
    /// non-time strings are left alone.
    pub fn normalize_times(&mut self) {
        normalize_slot(&mut self.start);
        normalize_slot(&mut self.end);
    }
}

/// A roster week. The seven named slots make "exactly seven days" a property
/// of the type rather than something to check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekEntry {
    #[serde(alias = "semaine")]
    pub week_number: u32,
    #[serde(default, alias = "lundi")]
    pub monday: DayEntry,
    #[serde(default, alias = "mardi")]
    pub tuesday: DayEntry,
    #[serde(default, alias = "mercredi")]
    pub wednesday: DayEntry,
    #[serde(default, alias = "jeudi")]
    pub thursday: DayEntry,
    #[serde(default, alias = "vendredi")]
    pub friday: DayEntry,
    #[serde(default, alias = "samedi")]
    pub saturday: DayEntry,
    #[serde(default, alias = "dimanche")]
    pub sunday: DayEntry,
}

impl WeekEntry {
    pub fn new(week_number: u32) -> Self {
        Self {
            week_number,
            monday: DayEntry::default(),
            tuesday: DayEntry::default(),
            wednesday: DayEntry::default(),
            thursday: DayEntry::default(),
            friday: DayEntry::default(),
            saturday: DayEntry::default(),
            sunday: DayEntry::default(),
        }
    }

    pub fn day(&self, weekday: Weekday) -> &DayEntry {
        match weekday {
            Weekday::Monday => &self.monday,
            Weekday::Tuesday => &self.tuesday,
            Weekday::Wednesday => &self.wednesday,
            Weekday::Thursday => &self.thursday,
            Weekday::Friday => &self.friday,
            Weekday::Saturday => &self.saturday,
            Weekday::Sunday => &self.sunday,
        }
    }

    pub fn day_mut(&mut self, weekday: Weekday) -> &mut DayEntry {
        match weekday {
            Weekday::Monday => &mut self.monday,
            Weekday::Tuesday => &mut self.tuesday,
            Weekday::Wednesday => &mut self.wednesday,
            Weekday::Thursday => &mut self.thursday,
            Weekday::Friday => &mut self.friday,
            Weekday::Saturday => &mut self.saturday,
            Weekday::Sunday => &mut self.sunday,
        }
    }

    /// Builder-style setter, mostly for tests and fixtures.
    pub fn with_day(mut self, weekday: Weekday, entry: DayEntry) -> Self {
        *self.day_mut(weekday) = entry;
        self
    }

    /// All seven slots, Monday first.
    pub fn days(&self) -> [(Weekday, &DayEntry); 7] {
        Weekday::ALL.map(|weekday| (weekday, self.day(weekday)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterDocument {
    #[serde(alias = "serie")]
    pub series_label: String,
    #[serde(alias = "periode")]
    pub period_label: String,
    #[serde(alias = "semaines")]
    pub weeks: Vec<WeekEntry>,
}

impl RosterDocument {
    /// Parses the model's JSON text. Weeks are put in ascending order and
    /// times past 24:00 are folded into the next day; nothing else is checked.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let mut document: RosterDocument = serde_json::from_str(text)?;
        document.weeks.sort_by_key(|week| week.week_number);
        for week in &mut document.weeks {
            for weekday in Weekday::ALL {
                week.day_mut(weekday).normalize_times();
            }
        }
        Ok(document)
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn week(&self, week_number: u32) -> Option<&WeekEntry> {
        self.weeks.iter().find(|week| week.week_number == week_number)
    }

    /// Week numbers absent between the first and the last extracted week.
    pub fn missing_weeks(&self) -> Vec<u32> {
        let (Some(first), Some(last)) = (self.weeks.first(), self.weeks.last()) else {
            return Vec::new();
        };
        (first.week_number..=last.week_number)
            .filter(|n| self.week(*n).is_none())
            .collect()
    }
}
