//! Turns whatever the vision model sent back into a [`Recipe`].
//!
//! Models are asked for a JSON object but do not always comply. The reply is
//! tried as JSON first (code fences stripped, a leading sentence tolerated),
//! then as plain text tagged with `DISH_NAME:` / `RECIPE:` / `GROCERY_LIST:`
//! sections. Anything else is a [`NormalizeError::MalformedResponse`].
//!
//! Everything here is pure: no I/O, no shared state.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub dish_name: String,
    /// HTML fragment, passed through untouched.
    pub recipe: String,
    pub grocery_list: Vec<String>,
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("malformed model response: {reason}")]
    MalformedResponse { raw: String, reason: String },
}

impl NormalizeError {
    /// The model output that failed to parse.
    pub fn raw(&self) -> &str {
        match self {
            NormalizeError::MalformedResponse { raw, .. } => raw,
        }
    }
}

static SECTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*[#*]*[ \t]*(DISH_NAME|RECIPE|GROCERY_LIST)[ \t]*\**[ \t]*:\**")
        .unwrap()
});

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z0-9]*[ \t]*\r?\n?(.*?)```").unwrap());

static LIST_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•]|\d+[.)])(?:\s+|$)").unwrap());

pub fn parse_model_output(raw: &str) -> Result<Recipe, NormalizeError> {
    let json_failure = match parse_json(raw) {
        Ok(recipe) => return Ok(recipe),
        Err(reason) => reason,
    };

    parse_sections(raw).map_err(|section_failure| NormalizeError::MalformedResponse {
        raw: raw.to_string(),
        reason: format!("{json_failure}; {section_failure}"),
    })
}

fn parse_json(raw: &str) -> Result<Recipe, String> {
    let body = strip_code_fence(raw);

    let value = parse_lenient(body)
        .or_else(|| fenced_block(raw).and_then(parse_lenient))
        .or_else(|| leading_object(body))
        .or_else(|| first_object_span(body).and_then(parse_lenient))
        .ok_or_else(|| "no JSON object found".to_string())?;

    recipe_from_value(value)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // ```json\n{...}\n``` or ```json {...}```
    let body = match rest.split_once('\n') {
        Some((tag, body)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body,
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Strict parse first; on failure retry with raw control whitespace flattened,
/// since models emit literal newlines inside string values.
fn parse_lenient(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok().or_else(|| {
        let flattened = text.replace(['\n', '\r', '\t'], " ");
        serde_json::from_str(&flattened).ok()
    })
}

/// A fenced block anywhere in the reply, e.g. after a leading sentence.
fn fenced_block(text: &str) -> Option<&str> {
    FENCED_BLOCK
        .captures(text)?
        .get(1)
        .map(|body| body.as_str().trim())
}

/// The first JSON value starting at the first `{`, ignoring whatever follows it.
fn leading_object(text: &str) -> Option<Value> {
    let candidate = &text[text.find('{')?..];
    first_value(candidate).or_else(|| {
        let flattened = candidate.replace(['\n', '\r', '\t'], " ");
        first_value(&flattened)
    })
}

fn first_value(text: &str) -> Option<Value> {
    serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .next()?
        .ok()
}

fn first_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn recipe_from_value(value: Value) -> Result<Recipe, String> {
    let Value::Object(mut fields) = value else {
        return Err("JSON is not an object".to_string());
    };

    let dish_name = take_text(&mut fields, &["dishName", "dish_name"])?;
    let recipe = take_text(&mut fields, &["recipe"])?;
    let grocery_list = match take_field(&mut fields, &["groceryList", "grocery_list"]) {
        Some(value) => grocery_items(value)?,
        None => return Err("missing `groceryList`".to_string()),
    };

    Ok(Recipe {
        dish_name,
        recipe,
        grocery_list,
    })
}

fn take_field(fields: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter().find_map(|key| fields.remove(*key))
}

fn take_text(fields: &mut Map<String, Value>, keys: &[&str]) -> Result<String, String> {
    let name = keys[0];
    match take_field(fields, keys) {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text),
        Some(Value::String(_)) => Err(format!("`{name}` is blank")),
        Some(_) => Err(format!("`{name}` is not a string")),
        None => Err(format!("missing `{name}`")),
    }
}

fn grocery_items(value: Value) -> Result<Vec<String>, String> {
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(scalar_text)
            .filter_map(clean_item)
            .collect()),
        Value::Null | Value::Object(_) => Err("`groceryList` is not a list".to_string()),
        scalar => Ok(scalar_text(scalar).and_then(clean_item).into_iter().collect()),
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn clean_item(item: String) -> Option<String> {
    let trimmed = item.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    DishName,
    Recipe,
    GroceryList,
}

struct Marker {
    section: Section,
    start: usize,
    body_start: usize,
}

fn parse_sections(raw: &str) -> Result<Recipe, String> {
    let mut seen = Vec::with_capacity(3);
    // Only the first marker of each kind opens a section; a repeat such as a
    // "Recipe:" line inside the recipe stays part of the body.
    let markers: Vec<Marker> = SECTION_MARKER
        .captures_iter(raw)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let section = match caps.get(1)?.as_str().to_ascii_uppercase().as_str() {
                "DISH_NAME" => Section::DishName,
                "RECIPE" => Section::Recipe,
                _ => Section::GroceryList,
            };
            Some(Marker {
                section,
                start: whole.start(),
                body_start: whole.end(),
            })
        })
        .filter(|marker| {
            let first = !seen.contains(&marker.section);
            seen.push(marker.section);
            first
        })
        .collect();

    if markers.is_empty() {
        return Err("no section markers found".to_string());
    }

    let mut dish_name = None;
    let mut recipe = None;
    let mut groceries = None;

    for (index, marker) in markers.iter().enumerate() {
        let body_end = markers.get(index + 1).map_or(raw.len(), |next| next.start);
        let body = raw[marker.body_start..body_end].trim();

        let slot = match marker.section {
            Section::DishName => &mut dish_name,
            Section::Recipe => &mut recipe,
            Section::GroceryList => &mut groceries,
        };
        *slot = Some(body);
    }

    let dish_name = required_section(dish_name, "DISH_NAME")?;
    let recipe = required_section(recipe, "RECIPE")?;
    let groceries = groceries.ok_or_else(|| "missing GROCERY_LIST section".to_string())?;

    Ok(Recipe {
        dish_name: dish_name.to_string(),
        recipe: recipe.to_string(),
        grocery_list: grocery_section_items(groceries),
    })
}

fn required_section<'a>(body: Option<&'a str>, name: &str) -> Result<&'a str, String> {
    match body {
        Some(text) if !text.is_empty() => Ok(text),
        Some(_) => Err(format!("{name} section is empty")),
        None => Err(format!("missing {name} section")),
    }
}

fn grocery_section_items(body: &str) -> Vec<String> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(body) {
        return items
            .into_iter()
            .filter_map(scalar_text)
            .filter_map(clean_item)
            .collect();
    }

    body.lines()
        .filter_map(|line| clean_item(LIST_BULLET.replace(line.trim(), "").into_owned()))
        .collect()
}
