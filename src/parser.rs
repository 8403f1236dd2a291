use csv::{ReaderBuilder, StringRecord};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ScheduleRules;
use crate::error::{LoadError, RosterError};
use crate::schedule::{Day, FixedPreferences, PreferenceSource, Roster, ShiftType};

/// One roster line: a name plus any rankings given explicitly in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    /// Explicit rankings (best first); days missing here are generated.
    #[serde(default)]
    pub rankings: BTreeMap<Day, Vec<ShiftType>>,
}

impl RosterEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rankings: BTreeMap::new(),
        }
    }
}

/// Splits a ranking cell such as `Evening;Morning;Afternoon`.
fn parse_ranking(value: &str, line: usize) -> Result<Vec<ShiftType>, LoadError> {
    value
        .split([';', ','])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<ShiftType>().map_err(|_| LoadError::UnknownShift {
                line,
                value: part.to_string(),
            })
        })
        .collect()
}

/// Reads roster entries from CSV.
///
/// A `name` column is required. Columns headed by a day name (`monday`,
/// `Tuesday`, ...) hold optional rankings, and rows may stop short of them.
/// Rows with a blank name are skipped; row order is roster order.
pub fn read_roster_csv<R: Read>(input: R) -> Result<Vec<RosterEntry>, LoadError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.headers()?.clone();

    let name_col = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("name"))
        .ok_or(LoadError::MissingNameColumn)?;
    let day_cols: Vec<(usize, Day)> = headers
        .iter()
        .enumerate()
        .filter_map(|(col, h)| h.parse::<Day>().ok().map(|day| (col, day)))
        .collect();

    let mut entries = Vec::new();
    for result in reader.records() {
        let record = result?;
        if let Some(entry) = parse_record(&record, name_col, &day_cols)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn parse_record(
    record: &StringRecord,
    name_col: usize,
    day_cols: &[(usize, Day)],
) -> Result<Option<RosterEntry>, LoadError> {
    let name = record.get(name_col).unwrap_or("").trim();
    if name.is_empty() {
        return Ok(None);
    }
    let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

    let mut entry = RosterEntry::new(name);
    for &(col, day) in day_cols {
        let ranking = parse_ranking(record.get(col).unwrap_or(""), line)?;
        if !ranking.is_empty() {
            entry.rankings.insert(day, ranking);
        }
    }
    Ok(Some(entry))
}

/// Loads roster entries from a CSV file.
pub fn load_roster_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RosterEntry>, LoadError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_roster_csv(file)
}

/// One name per line; blank lines and `#` comments are ignored.
pub fn parse_name_list(text: &str) -> Vec<RosterEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(RosterEntry::new)
        .collect()
}

/// Loads a plain-text name list.
pub fn load_name_list<P: AsRef<Path>>(path: P) -> Result<Vec<RosterEntry>, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_name_list(&text))
}

/// Picks the reader from the file extension: `.csv` is CSV, anything else a
/// name list.
pub fn load_roster_file<P: AsRef<Path>>(path: P) -> Result<Vec<RosterEntry>, LoadError> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        load_roster_csv(path)
    } else {
        load_name_list(path)
    }
}

/// Builds a validated roster. Explicit rankings win; `fallback` generates
/// the rest.
pub fn build_roster<P: PreferenceSource>(
    entries: &[RosterEntry],
    rules: &ScheduleRules,
    fallback: P,
) -> Result<Roster, RosterError> {
    let mut source = FixedPreferences::with_fallback(fallback);
    for entry in entries {
        for (day, ranking) in &entry.rankings {
            source.set(entry.name.trim(), *day, ranking.clone());
        }
    }
    Roster::build(entries.iter().map(|e| e.name.clone()), rules, &mut source)
}

/// Roster used when no input is given.
pub fn demo_roster() -> Vec<RosterEntry> {
    [
        "Alice", "Bob", "Charlie", "David", "Eve", "Frank", "Grace", "Heidi", "Ivan", "Judy",
    ]
    .into_iter()
    .map(RosterEntry::new)
    .collect()
}
