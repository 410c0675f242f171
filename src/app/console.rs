use crate::core::history::SessionHistory;
use crate::core::triage::TriageSession;
use crate::domain::model::{TriageOutcome, TriageStatus};
use crate::domain::ports::AdviceGenerator;
use crate::utils::error::Result;
use std::fmt::Write as _;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const HISTORY_COMMAND: &str = ":history";
pub const QUIT_COMMANDS: [&str; 2] = [":quit", ":exit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn render_outcome(outcome: &TriageOutcome) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Suggested Doctor Specialties:");
    if outcome.advice.is_none() {
        let _ = writeln!(out, "  Not analysed: no advice was generated");
    } else if outcome.specialties.is_empty() {
        let _ = writeln!(out, "  No specialties found");
    } else {
        let labels: Vec<&str> = outcome.specialties.iter().map(|s| s.as_str()).collect();
        let _ = writeln!(out, "  {}", labels.join(", "));
    }

    let _ = writeln!(out, "\nNearby Doctors:");
    if outcome.doctors.is_empty() {
        let _ = writeln!(out, "  {}", empty_doctor_message(&outcome.status));
    } else {
        let name_width = outcome
            .doctors
            .iter()
            .map(|d| d.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Name".len());
        let specialty_width = outcome
            .doctors
            .iter()
            .map(|d| d.specialty.as_str().chars().count())
            .max()
            .unwrap_or(0)
            .max("Specialty".len());

        let _ = writeln!(
            out,
            "  {:<name_width$}  {:<specialty_width$}  Distance",
            "Name", "Specialty"
        );
        for doctor in &outcome.doctors {
            let _ = writeln!(
                out,
                "  {:<name_width$}  {:<specialty_width$}  {}",
                doctor.name, doctor.specialty, doctor.distance
            );
        }
    }

    if let Some(map) = &outcome.map {
        let _ = writeln!(out, "\nMap View:");
        let _ = writeln!(
            out,
            "  Center {:.5}, {:.5} (zoom {}), {} marker(s)",
            map.latitude,
            map.longitude,
            map.zoom,
            map.markers.len()
        );
        let _ = writeln!(out, "  {}", map.openstreetmap_link());
    }

    if let Some(advice) = &outcome.advice {
        let _ = writeln!(out, "\nAI Advice / Preventive Measures:");
        for line in advice.trim().lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }

    let marker = if outcome.status.is_failure() { "⚠️" } else { "ℹ️" };
    let _ = writeln!(out, "\n{} {}", marker, outcome.status.message());
    out
}

fn empty_doctor_message(status: &TriageStatus) -> String {
    match status {
        TriageStatus::DoctorsUnavailable { .. } | TriageStatus::GenerationFailed { .. } => {
            status.message()
        }
        _ => "No doctors found for these specialties.".to_string(),
    }
}

pub fn render_history(history: &SessionHistory) -> String {
    let mut out = String::new();
    if history.is_empty() {
        let _ = writeln!(out, "No analyses yet.");
        return out;
    }

    let _ = writeln!(out, "Chat History ({} of max {}):", history.len(), history.limit());
    for entry in history.entries() {
        let _ = writeln!(
            out,
            "\n-- Analysis {} [{}] --",
            entry.sequence,
            entry.recorded_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(out, "Symptoms: {}", entry.symptom);
        for line in entry.advice.trim().lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }
    out
}

fn write_outcome<W: Write>(output: &mut W, outcome: &TriageOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => write!(output, "{}", render_outcome(outcome))?,
        OutputFormat::Json => writeln!(output, "{}", serde_json::to_string_pretty(outcome)?)?,
    }
    output.flush()?;
    Ok(())
}

/// 單次分析：送出症狀並輸出結果
pub async fn run_once<G, W>(
    session: &mut TriageSession<G>,
    symptom: &str,
    output: &mut W,
    format: OutputFormat,
) -> Result<TriageOutcome>
where
    G: AdviceGenerator,
    W: Write,
{
    let outcome = session.submit(symptom).await?;
    write_outcome(output, &outcome, format)?;
    Ok(outcome)
}

/// 互動模式：逐行讀取症狀，直到 :quit 或輸入結束
pub async fn run_interactive<G, R, W>(
    session: &mut TriageSession<G>,
    input: R,
    output: &mut W,
    format: OutputFormat,
) -> Result<()>
where
    G: AdviceGenerator,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(
        output,
        "AI Health Assistant: describe your symptoms ({} to review, {} to leave).",
        HISTORY_COMMAND, QUIT_COMMANDS[0]
    )?;

    let mut lines = input.lines();
    loop {
        write!(output, "\nEnter your symptoms: ")?;
        output.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if QUIT_COMMANDS.contains(&line) {
            break;
        }
        if line == HISTORY_COMMAND {
            write!(output, "{}", render_history(session.history()))?;
            continue;
        }

        match session.submit(line).await {
            Ok(outcome) => write_outcome(output, &outcome, format)?,
            Err(e) => {
                tracing::warn!("Submission rejected: {}", e);
                writeln!(output, "❌ {}", e.user_friendly_message())?;
            }
        }
    }

    tracing::info!(
        "👋 Session ended after {} analyses",
        session.history().len()
    );
    Ok(())
}
