//! Side files read by the CLI: id mapping dumps and name transformers.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use scarif_format::IdMap;

/// Load an id mapping dump: a JSON object `{"<id>": "<name>", ...}`.
pub fn load_id_map(path: &Path) -> Result<IdMap> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_id_map(&text).with_context(|| format!("parsing id mapping {}", path.display()))
}

pub fn parse_id_map(text: &str) -> Result<IdMap> {
    let entries: BTreeMap<i16, String> = serde_json::from_str(text)?;
    Ok(entries.into_iter().collect())
}

/// Load a name transformer: one `old,new` pair per line. Lines that are not
/// exactly two fields are ignored.
pub fn load_transformer(path: &Path) -> Result<HashMap<String, String>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_transformer(&text)
}

pub fn parse_transformer(text: &str) -> Result<HashMap<String, String>> {
    let mut transformer = HashMap::new();
    for (line_no, line) in text.lines().enumerate() {
        let values: Vec<&str> = line.trim().split(',').collect();
        if values.len() != 2 {
            continue;
        }
        if transformer
            .insert(values[0].to_string(), values[1].to_string())
            .is_some()
        {
            anyhow::bail!("duplicate transformer entry for {} on line {}", values[0], line_no + 1);
        }
    }
    Ok(transformer)
}
