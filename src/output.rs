//! Output formatting for resolution results

use crate::query::{MatchCandidate, Resolution};
use crate::store::{OperatorRecord, Status};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print a resolution in human-readable form
pub fn print_resolution(resolution: &Resolution, color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_resolution(&mut stdout, resolution)
}

/// Print a resolution as one JSON line
pub fn print_json(resolution: &Resolution) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, resolution)?;
    writeln!(stdout)
}

pub fn write_resolution<W: WriteColor>(out: &mut W, resolution: &Resolution) -> io::Result<()> {
    match resolution {
        Resolution::Found { key, record } => write_record(out, key, record, None),
        Resolution::Ambiguous { candidates } => write_candidates(out, candidates),
        Resolution::NotFound => {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
            writeln!(out, "No matching operator")?;
            out.reset()
        }
    }
}

fn write_candidates<W: WriteColor>(out: &mut W, candidates: &[MatchCandidate]) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
    let noun = if candidates.len() == 1 { "match" } else { "matches" };
    writeln!(out, "{} possible {}:", candidates.len(), noun)?;
    out.reset()?;

    for (i, c) in candidates.iter().enumerate() {
        writeln!(out)?;
        write!(out, "{:>2}. ", i + 1)?;
        write_record(out, &c.key, &c.record, Some(c.score))?;
    }
    Ok(())
}

fn write_record<W: WriteColor>(
    out: &mut W,
    key: &str,
    record: &OperatorRecord,
    score: Option<f64>,
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(out, "{}", record.name)?;
    out.reset()?;

    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
    write!(out, "  [{}]", key)?;
    out.reset()?;

    if let Some(score) = score {
        write!(out, "  score {:.3}", score)?;
    }
    writeln!(out)?;

    if let Some(phone) = &record.phone {
        writeln!(out, "    Phone:    {}", phone)?;
    }
    let location = format_location(record);
    if !location.is_empty() {
        writeln!(out, "    Address:  {}", location)?;
    }
    if let Some(contact) = &record.contact_name {
        writeln!(out, "    Contact:  {}", contact)?;
    }

    write!(out, "    Status:   ")?;
    let status_color = match record.status {
        Status::Open => Color::Green,
        Status::Unknown => Color::White,
        _ => Color::Yellow,
    };
    out.set_color(ColorSpec::new().set_fg(Some(status_color)))?;
    writeln!(out, "{}", record.status)?;
    out.reset()
}

/// "address, city, state zip" with missing parts left out
fn format_location(record: &OperatorRecord) -> String {
    let state_zip = [record.state.as_deref(), record.zip.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    [record.address.as_deref(), record.city.as_deref(), Some(state_zip.as_str())]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
