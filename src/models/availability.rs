use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A bookable window on a single day. Start is strictly before end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", try_from = "RawSlot")]
pub struct TimeSlot {
    #[serde(serialize_with = "hhmm::serialize")]
    pub start_time: NaiveTime,
    #[serde(serialize_with = "hhmm::serialize")]
    pub end_time: NaiveTime,
}

/// Slot as sent by the backend, before the ordering check.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSlot {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl TryFrom<RawSlot> for TimeSlot {
    type Error = String;

    fn try_from(raw: RawSlot) -> Result<Self, Self::Error> {
        TimeSlot::new(raw.start_time, raw.end_time).ok_or_else(|| {
            format!(
                "slot start {} is not before end {}",
                raw.start_time.format("%H:%M"),
                raw.end_time.format("%H:%M")
            )
        })
    }
}

impl TimeSlot {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Option<Self> {
        (start_time < end_time).then_some(Self {
            start_time,
            end_time,
        })
    }

    pub fn parse(start: &str, end: &str) -> anyhow::Result<Self> {
        let start_time = parse_time(start)?;
        let end_time = parse_time(end)?;
        Self::new(start_time, end_time)
            .ok_or_else(|| anyhow::anyhow!("slot start {start} is not before end {end}"))
    }

    /// Half-open overlap: touching intervals do not overlap.
    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start_time < end && start < self.end_time
    }

    pub fn label(&self) -> String {
        format!(
            "{}-{}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// A declared closure. Both times absent blocks the whole date; both present
/// blocks only that interval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HolidayPeriod {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm_opt")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_opt")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayKind {
    FullDay,
    Partial { start: NaiveTime, end: NaiveTime },
    /// Only one boundary set. Neither disables the date nor removes slots.
    Inert,
}

impl HolidayPeriod {
    pub fn full_day(date: NaiveDate) -> Self {
        Self {
            id: None,
            date,
            start_time: None,
            end_time: None,
            description: None,
        }
    }

    pub fn partial(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            id: None,
            date,
            start_time: Some(start),
            end_time: Some(end),
            description: None,
        }
    }

    pub fn kind(&self) -> HolidayKind {
        match (self.start_time, self.end_time) {
            (None, None) => HolidayKind::FullDay,
            (Some(start), Some(end)) => HolidayKind::Partial { start, end },
            _ => HolidayKind::Inert,
        }
    }
}

pub fn parse_time(s: &str) -> anyhow::Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| anyhow::anyhow!("invalid time format: {s}"))
}

pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_time(&s).map_err(serde::de::Error::custom)
    }
}

pub mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&t.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.trim().is_empty() => super::parse_time(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
