//! Pattern analysis, insights and suggestions.

use chrono::Local;
use dayglass_core::{find_gaps, SchedulingContext, Suggestion, TimeSlot};

use crate::parse;
use crate::session::{runtime, CliResult, Session};

pub fn analyze(json: bool) -> CliResult {
    let mut session = Session::open()?;
    let runtime = runtime()?;
    let engine = session.engine(&runtime);
    let mode = runtime.block_on(engine.analyze_now());
    session.store_learning(&engine);
    session.save()?;

    let snapshot = engine.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!(
        "{mode:?} analysis over {} events, confidence {:.0}%",
        snapshot.analyzed_event_count,
        snapshot.confidence * 100.0
    );
    if snapshot.patterns.is_empty() {
        println!("no patterns yet; keep recording completed blocks");
    }
    for pattern in &snapshot.patterns {
        println!(
            "  {:>3.0}%  {:<9} {}",
            pattern.confidence * 100.0,
            format!("{:?}", pattern.pattern_type).to_lowercase(),
            pattern.description
        );
    }
    Ok(())
}

pub fn insights(json: bool) -> CliResult {
    let session = Session::open()?;
    let insights = &session.state.insights;
    if json {
        println!("{}", serde_json::to_string_pretty(insights)?);
    } else if insights.is_empty() {
        println!("no insights yet; run `dayglass-cli analyze` after recording some blocks");
    } else {
        for insight in insights {
            println!("{} ({:.0}%)", insight.title, insight.confidence * 100.0);
            println!("  {}", insight.description);
            println!("  -> {}", insight.actionable_text);
        }
    }
    Ok(())
}

pub fn suggest(energy: Option<String>, json: bool) -> CliResult {
    let session = Session::open()?;
    let (context, suggestions) = current_suggestions(&session, energy.as_deref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else if suggestions.is_empty() {
        println!(
            "nothing to suggest yet ({} energy, {} min free today)",
            context.current_energy.label(),
            context.available_time_secs / 60
        );
    } else {
        for (i, s) in suggestions.iter().enumerate() {
            println!(
                "{}. {}  {} ({} min, {:.0}%)",
                i + 1,
                s.suggested_time.format("%H:%M"),
                s.title,
                s.duration().num_minutes(),
                s.confidence * 100.0
            );
            println!("  {}", s.explanation);
        }
    }
    Ok(())
}

/// Suggestions for right now, from the saved patterns and today's blocks.
pub(crate) fn current_suggestions(
    session: &Session,
    energy: Option<&str>,
) -> CliResult<(SchedulingContext, Vec<Suggestion>)> {
    let now = Local::now();

    let mut context = SchedulingContext::for_now(now);
    context.current_energy = parse::energy(energy, context.current_energy)?;
    if let Some(day) = session.state.day(context.date) {
        context.existing_blocks = day.blocks.clone();
        context.mood = day.mood;
    }
    context.existing_blocks.extend(
        session
            .state
            .staged
            .iter()
            .filter(|b| b.start_time.date_naive() == context.date)
            .cloned(),
    );
    let rest_of_day = TimeSlot::new(now, parse::local(context.date, "23:59")?);
    context.available_time_secs = find_gaps(rest_of_day, &context.existing_blocks)
        .iter()
        .map(|g| g.duration().num_seconds())
        .sum();
    context.actionable_pillars = session.state.pillars.clone();

    let runtime = runtime()?;
    let suggestions = session.engine(&runtime).suggestions(&context, now);
    Ok((context, suggestions))
}
