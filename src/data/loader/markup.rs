use std::collections::VecDeque;

use serde_json::{Map, Value};

use super::SignalParser;
use crate::config::MarkupKeys;
use crate::data::format::MarkupDialect;
use crate::data::model::{Metadata, SignalRecord};
use crate::error::{Error, Result};

const TEXT_KEY: &str = "#text";
const ATTRIBUTE_PREFIX: char = '@';

// ---------------------------------------------------------------------------
// Structured-markup parser
// ---------------------------------------------------------------------------

/// Vendor XML or JSON documents with an unknown nesting.
///
/// Both dialects are searched as the same tree. XML is first converted so
/// that attributes become `@name` keys, text beside child elements becomes
/// `#text`, repeated child tags become arrays and leaf elements become
/// strings:
///
/// ```xml
/// <FRA><Frequency unit="Hz">10 100</Frequency><Magnitude>-1 -3</Magnitude></FRA>
/// ```
/// ```json
/// {"FRA": {"Frequency": {"@unit": "Hz", "#text": "10 100"}, "Magnitude": "-1 -3"}}
/// ```
pub struct MarkupParser<'a> {
    keys: &'a MarkupKeys,
    dialect: MarkupDialect,
}

impl<'a> MarkupParser<'a> {
    pub fn new(keys: &'a MarkupKeys, dialect: MarkupDialect) -> Self {
        Self { keys, dialect }
    }

    /// Parse the raw document into the shared tree form.
    pub fn document(&self, source: &[u8]) -> Result<Value> {
        match self.dialect {
            MarkupDialect::Json => Ok(serde_json::from_slice(source)?),
            MarkupDialect::Xml => {
                let text = std::str::from_utf8(source).map_err(|e| {
                    Error::UnsupportedFormat(format!("XML document is not valid UTF-8: {e}"))
                })?;
                let doc = roxmltree::Document::parse(text)?;
                Ok(xml_to_tree(&doc))
            }
        }
    }
}

impl SignalParser for MarkupParser<'_> {
    fn parse(&self, source: &[u8]) -> Result<SignalRecord> {
        let tree = self.document(source)?;
        let search = TreeSearch::new(self.keys.max_depth);

        let freq_node = search.signal_node(&tree, &self.keys.frequency).ok_or_else(|| {
            Error::Schema(format!("no frequency node matching {:?}", self.keys.frequency))
        })?;
        let mag_node = search.signal_node(&tree, &self.keys.magnitude).ok_or_else(|| {
            Error::Schema(format!("no magnitude node matching {:?}", self.keys.magnitude))
        })?;
        let phase_node = search.signal_node(&tree, &self.keys.phase);

        let frequency = to_numbers(freq_node.1, freq_node.0)?;
        let magnitude_db = to_numbers(mag_node.1, mag_node.0)?;
        let phase_deg = phase_node.map(|(key, node)| to_numbers(node, key)).transpose()?;
        log::debug!(
            "markup nodes: frequency='{}' magnitude='{}' phase={:?}",
            freq_node.0,
            mag_node.0,
            phase_node.map(|(k, _)| k)
        );

        let mut metadata = Metadata::new();
        for key in &self.keys.metadata {
            if let Some(value) = search
                .node(&tree, std::slice::from_ref(key), true)
                .and_then(|(_, node)| metadata_text(node))
            {
                metadata.insert(key.clone(), value);
            }
        }

        SignalRecord::new(metadata, frequency, magnitude_db, phase_deg)
    }
}

// ---------------------------------------------------------------------------
// Breadth-first key search
// ---------------------------------------------------------------------------

/// Depth-bounded breadth-first visitor over nested mappings.
///
/// Within one mapping, earlier candidates beat later ones and document order
/// breaks ties; shallower mappings beat deeper ones. Exact (case-insensitive)
/// key matches anywhere in the tree are preferred over substring matches, so
/// a wrapper such as `FrequencyResponse` does not shadow a nested `Frequency`.
/// Null values (empty elements) are never matched.
pub struct TreeSearch {
    max_depth: usize,
}

impl TreeSearch {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Search element keys only; attributes never hold sample arrays.
    fn signal_node<'v>(&self, root: &'v Value, candidates: &[String]) -> Option<(&'v str, &'v Value)> {
        self.node(root, candidates, false)
    }

    pub fn node<'v>(
        &self,
        root: &'v Value,
        candidates: &[String],
        include_attributes: bool,
    ) -> Option<(&'v str, &'v Value)> {
        let candidates: Vec<String> = candidates
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();

        self.bfs(root, |map| {
            find_in_map(map, &candidates, include_attributes, |key, c| key == c)
        })
        .or_else(|| {
            self.bfs(root, |map| {
                find_in_map(map, &candidates, include_attributes, |key, c| key.contains(c))
            })
        })
    }

    fn bfs<'v, F>(&self, root: &'v Value, mut visit: F) -> Option<(&'v str, &'v Value)>
    where
        F: FnMut(&'v Map<String, Value>) -> Option<(&'v str, &'v Value)>,
    {
        let mut queue = VecDeque::from([(root, 0usize)]);
        while let Some((value, depth)) = queue.pop_front() {
            let Value::Object(map) = value else {
                continue;
            };
            if let Some(hit) = visit(map) {
                return Some(hit);
            }
            if depth < self.max_depth {
                queue.extend(map.values().filter(|v| v.is_object()).map(|v| (v, depth + 1)));
            }
        }
        None
    }
}

fn find_in_map<'v>(
    map: &'v Map<String, Value>,
    candidates: &[String],
    include_attributes: bool,
    matches: impl Fn(&str, &str) -> bool,
) -> Option<(&'v str, &'v Value)> {
    candidates.iter().find_map(|candidate| {
        map.iter()
            .filter(|(key, _)| include_attributes || !key.starts_with(ATTRIBUTE_PREFIX))
            // Empty elements (`<Phase/>`) count as absent.
            .filter(|(_, value)| !value.is_null())
            .find(|(key, _)| {
                let key = key.trim_start_matches(ATTRIBUTE_PREFIX).to_lowercase();
                matches(key.as_str(), candidate.as_str())
            })
            .map(|(key, value)| (key.as_str(), value))
    })
}

// ---------------------------------------------------------------------------
// Node → numbers
// ---------------------------------------------------------------------------

/// Convert a located node to samples. Shapes are tried in order:
/// 1. sequence of numbers / numeric strings
/// 2. whitespace-delimited string
/// 3. `#text` wrapper (e.g. an element with attributes)
/// 4. mapping of numeric values, in document order; repeated child
///    elements (arrays) are flattened and attributes ignored
pub fn to_numbers(node: &Value, key: &str) -> Result<Vec<f64>> {
    let unsupported = || {
        Error::UnsupportedFormat(format!(
            "node '{key}' is not a numeric list, string, text wrapper or numeric mapping"
        ))
    };

    match node {
        Value::Array(items) => items
            .iter()
            .map(scalar)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(unsupported),
        Value::String(text) => split_numbers(text, key),
        Value::Object(map) if map.contains_key(TEXT_KEY) => match &map[TEXT_KEY] {
            Value::String(text) => split_numbers(text, key),
            _ => Err(unsupported()),
        },
        Value::Object(map) => {
            let mut values = Vec::new();
            for (child_key, child) in map {
                if child_key.starts_with(ATTRIBUTE_PREFIX) {
                    continue;
                }
                match child {
                    Value::Array(items) => {
                        for item in items {
                            values.push(scalar(item).ok_or_else(unsupported)?);
                        }
                    }
                    other => values.push(scalar(other).ok_or_else(unsupported)?),
                }
            }
            if values.is_empty() {
                return Err(unsupported());
            }
            Ok(values)
        }
        _ => Err(unsupported()),
    }
}

fn scalar(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => map.get(TEXT_KEY).and_then(|t| t.as_str()?.trim().parse().ok()),
        _ => None,
    }
}

fn split_numbers(text: &str, key: &str) -> Result<Vec<f64>> {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<f64>().map_err(|_| {
                Error::UnsupportedFormat(format!("node '{key}': '{tok}' is not a number"))
            })
        })
        .collect()
}

fn metadata_text(node: &Value) -> Option<String> {
    match node {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => map.get(TEXT_KEY)?.as_str().map(|s| s.trim().to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// XML → tree
// ---------------------------------------------------------------------------

fn xml_to_tree(doc: &roxmltree::Document) -> Value {
    let root = doc.root_element();
    let mut map = Map::new();
    map.insert(root.tag_name().name().to_string(), element_to_value(root));
    Value::Object(map)
}

fn element_to_value(node: roxmltree::Node) -> Value {
    let mut map = Map::new();
    for attr in node.attributes() {
        map.insert(
            format!("{ATTRIBUTE_PREFIX}{}", attr.name()),
            Value::String(attr.value().to_string()),
        );
    }

    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            let name = child.tag_name().name().to_string();
            let value = element_to_value(child);
            match map.get_mut(&name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(name, value);
                }
            }
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or(""));
        }
    }

    let text = text.trim();
    if map.is_empty() {
        if text.is_empty() {
            Value::Null
        } else {
            Value::String(text.to_string())
        }
    } else {
        if !text.is_empty() {
            map.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
        }
        Value::Object(map)
    }
}
