//! Prompt and response schema handed to the extraction service.
//!
//! The schema mirrors [`RosterDocument`](crate::domain::model::RosterDocument)
//! field for field; changing one without the other breaks parsing.

use crate::domain::model::Weekday;
use serde_json::{json, Map, Value};

pub const SYSTEM_INSTRUCTION: &str = "\
You are the principal engineer in charge of railway duty rosters. Your job is to \
extract roster data with absolute rigour.

EXTRACTION PROTOCOL:
1. CAREFUL READING: every roster cell holds three lines (start, end, code). Minutes \
matter: 05:05 is NOT 05:15.
2. 24H+ RULE: times past 24:00 (night work) MUST be converted to the next-day value \
(25:10 becomes 01:10). Never output an hour above 23.
3. DUTY CODES:
   - HSBR, CW, RW, RT, RH, RV/ are rest or leave statuses. For these, start and end are null.
   - FL-A, FL-B... are roster series (for example early mornings).
   - RES is a reserve duty.
4. CYCLE INTEGRITY: a full roster usually spans 31 weeks. Extract every week from the \
first to the last without omission, in ascending order.
5. LABELS: copy the series and the period (for example Z SUP 0) exactly as printed.

OUTPUT: pure JSON only.";

pub const TASK_PROMPT: &str = "Analyse this duty roster and extract every week with full \
precision on times and codes.";

pub fn additional_source_prompt(text: &str) -> String {
    format!("Additional roster source: {}", text)
}

fn day_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "start": { "type": "STRING", "description": "HH:mm or null", "nullable": true },
            "end": {
                "type": "STRING",
                "description": "HH:mm (converted if past 24:00) or null",
                "nullable": true
            },
            "code": { "type": "STRING", "description": "Duty or rest code", "nullable": true }
        },
        "required": ["start", "end", "code"]
    })
}

fn week_schema() -> Value {
    let mut properties = Map::new();
    properties.insert("weekNumber".to_string(), json!({ "type": "INTEGER" }));
    let mut required = vec![Value::from("weekNumber")];
    for weekday in Weekday::ALL {
        properties.insert(weekday.key().to_string(), day_schema());
        required.push(Value::from(weekday.key()));
    }
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required
    })
}

/// Response schema for the whole roster document.
pub fn roster_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "seriesLabel": { "type": "STRING" },
            "periodLabel": { "type": "STRING" },
            "weeks": { "type": "ARRAY", "items": week_schema() }
        },
        "required": ["seriesLabel", "periodLabel", "weeks"]
    })
}
