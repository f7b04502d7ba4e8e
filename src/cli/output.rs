//! Terminal rendering for lockify commands.
//!
//! Status lines carry a coloured marker; warnings and errors go to stderr
//! so piped `get`/`export` output stays clean.

use chrono::{DateTime, SecondsFormat, Utc};
use comfy_table::{ContentArrangement, Table};
use console::{style, StyledObject};

use crate::vault::EntryMetadata;

#[derive(Debug, Clone, Copy)]
enum Tone {
    Success,
    Info,
    Tip,
    Warning,
    Error,
}

impl Tone {
    fn marker(self) -> StyledObject<&'static str> {
        match self {
            Tone::Success => style("\u{2713}").green().bold(),
            Tone::Info => style("\u{2139}").blue().bold(),
            Tone::Tip => style("\u{2192}").dim(),
            Tone::Warning => style("\u{26a0}").yellow().bold(),
            Tone::Error => style("\u{2717}").red().bold(),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Tone::Warning | Tone::Error)
    }
}

fn emit(tone: Tone, msg: &str) {
    let body = match tone {
        Tone::Tip => style(msg).dim().to_string(),
        _ => msg.to_string(),
    };
    if tone.to_stderr() {
        eprintln!("{} {body}", tone.marker());
    } else {
        println!("{} {body}", tone.marker());
    }
}

pub fn success(msg: &str) {
    emit(Tone::Success, msg);
}

pub fn info(msg: &str) {
    emit(Tone::Info, msg);
}

pub fn tip(msg: &str) {
    emit(Tone::Tip, msg);
}

pub fn warning(msg: &str) {
    emit(Tone::Warning, msg);
}

pub fn error(msg: &str) {
    emit(Tone::Error, msg);
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Build the metadata table for `env`. The key column header names the
/// environment and the entry count.
pub fn entries_table(env: &str, entries: &[EntryMetadata]) -> Table {
    let count = match entries.len() {
        1 => "1 entry".to_string(),
        n => format!("{n} entries"),
    };

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![format!("KEY ({env}, {count})"), "CREATED".into(), "UPDATED".into()]);

    for entry in entries {
        table.add_row(vec![
            entry.name.clone(),
            timestamp(&entry.created_at),
            timestamp(&entry.updated_at),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meta(name: &str, day: u32) -> EntryMetadata {
        let at = Utc.with_ymd_and_hms(2024, 3, day, 9, 30, 0).unwrap();
        EntryMetadata {
            name: name.into(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn table_header_names_environment_and_count() {
        let rendered = entries_table("staging", &[meta("API_KEY", 1), meta("DB_URL", 2)]).to_string();
        assert!(rendered.contains("KEY (staging, 2 entries)"));
        assert!(rendered.contains("API_KEY"));
        assert!(rendered.contains("DB_URL"));
    }

    #[test]
    fn single_entry_is_singular() {
        let rendered = entries_table("dev", &[meta("TOKEN", 5)]).to_string();
        assert!(rendered.contains("KEY (dev, 1 entry)"));
    }

    #[test]
    fn timestamps_render_as_rfc3339_utc() {
        let rendered = entries_table("dev", &[meta("TOKEN", 5)]).to_string();
        assert!(rendered.contains("2024-03-05T09:30:00Z"));
    }
}
