use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Read a label file: YAML (`names:` list or index map) for `.yaml`/`.yml`,
/// otherwise plain text with one label per line.
pub fn load_labels_file(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read labels file '{}'", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let labels = if is_yaml {
        parse_yaml_labels(&raw)
            .with_context(|| format!("invalid YAML labels file '{}'", path.display()))?
    } else {
        parse_labels(&raw)
    };
    if labels.is_empty() {
        bail!("labels file '{}' contains no labels", path.display());
    }
    Ok(labels)
}

/// Plain text labels: one per line, blank lines and `#` comments skipped.
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum YamlNames {
    List(Vec<String>),
    Indexed(BTreeMap<u32, String>),
}

#[derive(Deserialize)]
struct YamlLabels {
    names: YamlNames,
}

fn parse_yaml_labels(raw: &str) -> Result<Vec<String>> {
    let parsed: YamlLabels = serde_yaml::from_str(raw)?;
    let names = match parsed.names {
        YamlNames::List(list) => list,
        // BTreeMap keeps class-index order.
        YamlNames::Indexed(map) => map.into_values().collect(),
    };
    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

/// Drop denylisted labels (case-insensitive) while keeping the detector's order.
pub fn filter_labels(labels: Vec<String>, denylist: &[String]) -> Vec<String> {
    labels
        .into_iter()
        .filter(|label| {
            !denylist
                .iter()
                .any(|denied| denied.eq_ignore_ascii_case(label))
        })
        .collect()
}

/// Turn a class name into something a speech engine reads naturally.
pub fn spoken_label(class_name: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let separators = SEPARATORS
        .get_or_init(|| Regex::new(r"[_\s]+").expect("label separator regex should compile"));
    separators.replace_all(class_name.trim(), " ").into_owned()
}
