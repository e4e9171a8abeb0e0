//! CSV loading, per-source deduplication and the left join on `id`.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::constants::{CATEGORIES_COLUMN, ID_COLUMN, LEFT_SUFFIX, RIGHT_SUFFIX};
use crate::error::{PipelineError, Result};
use crate::rowset::RowSet;
use crate::value::Value;


/// Load both CSV files and return the messages left-joined with their categories.
///
/// Missing files and malformed CSV are returned as errors untouched.
pub fn load(messages_path: &Path, categories_path: &Path) -> Result<RowSet> {
    let messages = read_table(
        File::open(messages_path)?,
        &messages_path.display().to_string(),
        &[ID_COLUMN],
    )?;
    let categories = read_table(
        File::open(categories_path)?,
        &categories_path.display().to_string(),
        &[ID_COLUMN, CATEGORIES_COLUMN],
    )?;
    merge(messages, categories)
}

/// Same as [`load`] over arbitrary readers.
pub fn load_from_readers<M: Read, C: Read>(messages: M, categories: C) -> Result<RowSet> {
    let messages = read_table(messages, "messages", &[ID_COLUMN])?;
    let categories = read_table(categories, "categories", &[ID_COLUMN, CATEGORIES_COLUMN])?;
    merge(messages, categories)
}

fn merge(messages: RowSet, categories: RowSet) -> Result<RowSet> {
    let (messages, dup_messages) = dedup_by_id(messages)?;
    let (categories, dup_categories) = dedup_by_id(categories)?;
    if dup_messages > 0 || dup_categories > 0 {
        tracing::debug!(
            messages = dup_messages,
            categories = dup_categories,
            "dropped duplicate ids before join"
        );
    }
    let combined = left_join_on_id(&messages, &categories)?;
    tracing::info!(
        messages = messages.len(),
        categories = categories.len(),
        combined = combined.len(),
        "loaded inputs"
    );
    Ok(combined)
}

/// Read a headed CSV into a row-set.
///
/// The `id` column (when present) is parsed as an integer; every other cell is
/// kept as text, with empty cells becoming `Null`. Each name in `required`
/// must appear in the header.
pub fn read_table<R: Read>(reader: R, source_name: &str, required: &[&str]) -> Result<RowSet> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();

    for column in required {
        if !columns.iter().any(|c| c == column) {
            return Err(PipelineError::MissingColumn {
                source_name: source_name.to_owned(),
                column: (*column).to_owned(),
            });
        }
    }
    let id_idx = columns.iter().position(|c| c == ID_COLUMN);

    let mut set = RowSet::new(columns);
    for record in rdr.records() {
        let record = record?;
        let mut row = Vec::with_capacity(record.len());
        for (idx, field) in record.iter().enumerate() {
            if Some(idx) == id_idx {
                let id = field.trim().parse::<i64>().map_err(|_| PipelineError::InvalidId {
                    source_name: source_name.to_owned(),
                    line: record.position().map_or(0, csv::Position::line),
                    value: field.to_owned(),
                })?;
                row.push(Value::Integer(id));
            } else {
                row.push(Value::from_field(field));
            }
        }
        set.push_row(row)?;
    }
    tracing::debug!(source = source_name, rows = set.len(), "read table");
    Ok(set)
}

/// Drop every row whose `id` was already seen earlier in the set.
///
/// Returns the deduplicated set and the number of rows removed.
pub fn dedup_by_id(mut set: RowSet) -> Result<(RowSet, usize)> {
    let idx = id_index(&set, "dedup input")?;
    let mut seen: HashSet<Value> = HashSet::new();
    let removed = set.retain_rows(|row| seen.insert(row[idx].clone()));
    Ok((set, removed))
}

/// Left outer join of `messages` with `categories` on `id`.
///
/// Output columns are the message columns followed by the category columns
/// without `id`. Non-key names present on both sides get `_x`/`_y` suffixes.
/// Messages without a category row get `Null` in every category column;
/// category rows without a message are discarded.
pub fn left_join_on_id(messages: &RowSet, categories: &RowSet) -> Result<RowSet> {
    let left_id = id_index(messages, "messages")?;
    let right_id = id_index(categories, "categories")?;

    let right_names: HashSet<&str> = categories.columns().iter().map(String::as_str).collect();
    let left_names: HashSet<&str> = messages.columns().iter().map(String::as_str).collect();

    let mut columns = Vec::with_capacity(messages.width() + categories.width());
    for name in messages.columns() {
        if name != ID_COLUMN && right_names.contains(name.as_str()) {
            columns.push(format!("{name}{LEFT_SUFFIX}"));
        } else {
            columns.push(name.clone());
        }
    }
    let right_keep: Vec<usize> = (0..categories.width()).filter(|&i| i != right_id).collect();
    for &i in &right_keep {
        let name = &categories.columns()[i];
        if left_names.contains(name.as_str()) {
            columns.push(format!("{name}{RIGHT_SUFFIX}"));
        } else {
            columns.push(name.clone());
        }
    }

    let mut by_id: HashMap<&Value, Vec<usize>> = HashMap::new();
    for (pos, row) in categories.rows().iter().enumerate() {
        by_id.entry(&row[right_id]).or_default().push(pos);
    }

    let mut joined = RowSet::new(columns);
    for left in messages.rows() {
        match by_id.get(&left[left_id]) {
            Some(matches) => {
                for &pos in matches {
                    let right = &categories.rows()[pos];
                    let mut row = left.clone();
                    row.extend(right_keep.iter().map(|&i| right[i].clone()));
                    joined.push_row(row)?;
                }
            },
            None => {
                let mut row = left.clone();
                row.resize(left.len() + right_keep.len(), Value::Null);
                joined.push_row(row)?;
            },
        }
    }
    Ok(joined)
}

fn id_index(set: &RowSet, source_name: &str) -> Result<usize> {
    set.column_index(ID_COLUMN).ok_or_else(|| PipelineError::MissingColumn {
        source_name: source_name.to_owned(),
        column: ID_COLUMN.to_owned(),
    })
}
