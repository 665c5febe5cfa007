//! Weekday tokens, minute-of-day time slots, and the conflict predicate
//! (spec §3, glossary).

use std::str::FromStr;

use crate::error::{Result, SolverError};

/// Canonical weekday token (spec §6 "Day set").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl FromStr for Day {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Mon" => Ok(Day::Mon),
            "Tue" => Ok(Day::Tue),
            "Wed" => Ok(Day::Wed),
            "Thu" => Ok(Day::Thu),
            "Fri" => Ok(Day::Fri),
            "Sat" => Ok(Day::Sat),
            "Sun" => Ok(Day::Sun),
            other => Err(SolverError::invalid(format!("unknown day token: {other}"))),
        }
    }
}

pub fn parse_days(days: &[String]) -> Result<Vec<Day>> {
    days.iter().map(|d| Day::from_str(d)).collect()
}

/// Parse `"HH:MM"` into minutes-from-midnight (spec §6 "Time encoding").
/// Accepted only at the input boundary; the solver model only ever sees
/// minute integers.
pub fn parse_hhmm(s: &str) -> Result<u32> {
    let (h, m) = s
        .split_once(':')
        .ok_or_else(|| SolverError::invalid(format!("malformed HH:MM time: {s}")))?;
    let h: u32 = h
        .parse()
        .map_err(|_| SolverError::invalid(format!("malformed HH:MM time: {s}")))?;
    let m: u32 = m
        .parse()
        .map_err(|_| SolverError::invalid(format!("malformed HH:MM time: {s}")))?;
    let total = h * 60 + m;
    if total > 1439 {
        return Err(SolverError::invalid(format!("time out of range 0-1439: {s}")));
    }
    Ok(total)
}

/// A set of weekdays plus a start/end minute-of-day. Invariant: `start < end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub days: Vec<Day>,
    pub start_minute: u32,
    pub end_minute: u32,
}

impl TimeSlot {
    pub fn new(days: Vec<Day>, start_minute: u32, end_minute: u32) -> Result<Self> {
        if start_minute >= end_minute {
            return Err(SolverError::invalid(format!(
                "time slot start {start_minute} must be before end {end_minute}"
            )));
        }
        if end_minute > 1440 {
            return Err(SolverError::invalid(format!(
                "time slot end {end_minute} out of range"
            )));
        }
        Ok(TimeSlot {
            days,
            start_minute,
            end_minute,
        })
    }

    /// Two slots conflict iff their weekday sets intersect and their
    /// `[start, end)` intervals overlap.
    pub fn conflicts_with(&self, other: &TimeSlot) -> bool {
        let shares_day = self.days.iter().any(|d| other.days.contains(d));
        if !shares_day {
            return false;
        }
        self.start_minute < other.end_minute && other.start_minute < self.end_minute
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hhmm() {
        assert_eq!(parse_hhmm("09:30").unwrap(), 570);
        assert_eq!(parse_hhmm("00:00").unwrap(), 0);
        assert_eq!(parse_hhmm("23:59").unwrap(), 1439);
        assert!(parse_hhmm("24:00").is_err());
        assert!(parse_hhmm("bogus").is_err());
    }

    #[test]
    fn conflict_requires_shared_day_and_overlap() {
        let a = TimeSlot::new(vec![Day::Mon, Day::Wed], 600, 660).unwrap();
        let b = TimeSlot::new(vec![Day::Mon], 630, 690).unwrap();
        let c = TimeSlot::new(vec![Day::Tue], 600, 660).unwrap();
        let d = TimeSlot::new(vec![Day::Mon], 660, 720).unwrap();
        assert!(a.conflicts_with(&b));
        assert!(!a.conflicts_with(&c));
        assert!(!a.conflicts_with(&d));
    }

    #[test]
    fn rejects_inverted_slot() {
        assert!(TimeSlot::new(vec![Day::Mon], 700, 600).is_err());
    }
}
