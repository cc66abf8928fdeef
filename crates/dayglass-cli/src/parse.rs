//! Argument parsing helpers shared by commands.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone};
use dayglass_core::schedule::{ChainLink, TimeWindow, MAX_BLOCK_SECS};
use dayglass_core::{EnergyType, FlowState};

/// `YYYY-MM-DD`, or today when absent.
pub fn date(input: Option<&str>) -> Result<NaiveDate, String> {
    match input {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{s}' (YYYY-MM-DD): {e}")),
        None => Ok(Local::now().date_naive()),
    }
}

/// `HH:MM`.
pub fn time(input: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(input, "%H:%M")
        .map_err(|e| format!("invalid time '{input}' (HH:MM): {e}"))
}

/// Local instant for a date and `HH:MM`.
pub fn local(date: NaiveDate, hhmm: &str) -> Result<DateTime<Local>, String> {
    let t = time(hhmm)?;
    Local
        .from_local_datetime(&date.and_time(t))
        .earliest()
        .ok_or_else(|| format!("{date} {hhmm} does not exist in local time"))
}

/// A block length in minutes, between one minute and a day.
pub fn minutes(minutes: i64) -> Result<Duration, String> {
    let max = MAX_BLOCK_SECS / 60;
    if !(1..=max).contains(&minutes) {
        return Err(format!("duration must be between 1 and {max} minutes, got {minutes}"));
    }
    Ok(Duration::minutes(minutes))
}

pub fn energy(input: Option<&str>, fallback: EnergyType) -> Result<EnergyType, String> {
    input.map_or(Ok(fallback), str::parse)
}

pub fn flow(input: Option<&str>, fallback: FlowState) -> Result<FlowState, String> {
    input.map_or(Ok(fallback), str::parse)
}

/// `HH:MM-HH:MM`.
pub fn window(input: &str) -> Result<TimeWindow, String> {
    let (start, end) = input
        .split_once('-')
        .ok_or_else(|| format!("invalid window '{input}' (HH:MM-HH:MM)"))?;
    let (start, end) = (time(start.trim())?, time(end.trim())?);
    if end <= start {
        return Err(format!("window '{input}' ends before it starts"));
    }
    Ok(TimeWindow::new(start, end))
}

/// `title:minutes[:energy[:flow]]`.
pub fn step(input: &str) -> Result<ChainLink, String> {
    let mut parts = input.split(':');
    let title = parts
        .next()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| format!("invalid step '{input}' (title:minutes[:energy[:flow]])"))?;
    let length: i64 = parts
        .next()
        .ok_or_else(|| format!("step '{input}' is missing its minutes"))?
        .parse()
        .map_err(|e| format!("invalid minutes in step '{input}': {e}"))?;
    let length = minutes(length)?;
    let energy = energy(parts.next(), EnergyType::Daylight)?;
    let flow = flow(parts.next(), FlowState::Water)?;
    Ok(ChainLink::new(title.trim(), length, energy, flow))
}
