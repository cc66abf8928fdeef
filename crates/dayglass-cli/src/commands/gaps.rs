//! Free time on a day.

use dayglass_core::{find_gaps, TimeBlock, TimeSlot};

use crate::parse;
use crate::session::{CliResult, Session};

pub fn run(date: Option<String>, from: String, to: String, json: bool) -> CliResult {
    let session = Session::open()?;
    let date = parse::date(date.as_deref())?;
    let window = TimeSlot::new(parse::local(date, &from)?, parse::local(date, &to)?);
    if window.is_empty() {
        return Err(format!("window {from}-{to} is empty").into());
    }

    // staged blocks hold their place until committed or discarded
    let mut blocks: Vec<TimeBlock> =
        session.state.day(date).map(|d| d.blocks.clone()).unwrap_or_default();
    blocks.extend(
        session
            .state
            .staged
            .iter()
            .filter(|b| b.start_time.date_naive() == date)
            .cloned(),
    );

    let gaps = find_gaps(window, &blocks);
    if json {
        println!("{}", serde_json::to_string_pretty(&gaps)?);
        return Ok(());
    }
    if gaps.is_empty() {
        println!("no free time between {from} and {to} on {date}");
        return Ok(());
    }
    let free: i64 = gaps.iter().map(|g| g.duration().num_minutes()).sum();
    for gap in &gaps {
        println!(
            "{}-{}  {} min",
            gap.start.format("%H:%M"),
            gap.end.format("%H:%M"),
            gap.duration().num_minutes()
        );
    }
    println!("{free} min free");
    Ok(())
}
