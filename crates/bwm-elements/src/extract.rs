//! Property-bag extraction.
//!
//! The service returns loosely-typed property bags whose schema the
//! caller does not control: the same attribute may appear under several
//! names depending on the authoring tool and model version. Each record
//! field is populated by first-match lookup against an ordered alias
//! list. The raw bag never leaves this boundary except as
//! `raw_properties`.

use serde_json::Value;

use bwm_model::{ElementProperty, ModelElement};

const ELEMENT_ID_ALIASES: [&str; 3] = ["ElementId", "Element Id", "Id"];
const EXTERNAL_ID_ALIASES: [&str; 4] =
    ["ExternalId", "External Id", "ExternalElementId", "UniqueId"];
const REVIT_ID_ALIASES: [&str; 3] = ["RevitElementId", "Revit Element Id", "Revit Id"];
const DB_ID_ALIASES: [&str; 3] = ["DbId", "ViewerDbId", "SvfDbId"];
const CATEGORY_ALIASES: [&str; 3] = ["Category", "Element Category", "CategoryName"];
const FAMILY_ALIASES: [&str; 3] = ["Family Name", "FamilyName", "Family"];
const NAME_ALIASES: [&str; 3] = ["Name", "Element Name", "Type Name"];
const TYPE_MARK_ALIASES: [&str; 2] = ["Type Mark", "TypeMark"];
const DESCRIPTION_ALIASES: [&str; 3] = ["Description", "Type Comments", "Comments"];
const MODEL_ALIASES: [&str; 3] = ["Model", "Model Name", "Source File"];
const MANUFACTURER_ALIASES: [&str; 1] = ["Manufacturer"];
const ASSEMBLY_CODE_ALIASES: [&str; 4] = [
    "Assembly Code",
    "AssemblyCode",
    "Uniformat",
    "OmniClass Number",
];
const ASSEMBLY_DESC_ALIASES: [&str; 3] = [
    "Assembly Description",
    "AssemblyDescription",
    "Uniformat Description",
];
const COUNT_ALIASES: [&str; 1] = ["Count"];

/// Normalizes one raw service record into a [`ModelElement`].
pub fn element_from_raw(raw: &Value) -> ModelElement {
    let properties = collect_properties(raw);

    let mut element = ModelElement {
        element_id: first_alias(&properties, &ELEMENT_ID_ALIASES).unwrap_or_default(),
        external_element_id: first_alias(&properties, &EXTERNAL_ID_ALIASES).unwrap_or_default(),
        revit_element_id: first_alias(&properties, &REVIT_ID_ALIASES).unwrap_or_default(),
        viewer_db_id: None,
        category: first_alias(&properties, &CATEGORY_ALIASES).unwrap_or_default(),
        family_name: first_alias(&properties, &FAMILY_ALIASES).unwrap_or_default(),
        element_name: first_alias(&properties, &NAME_ALIASES).unwrap_or_default(),
        type_mark: first_alias(&properties, &TYPE_MARK_ALIASES).unwrap_or_default(),
        description: first_alias(&properties, &DESCRIPTION_ALIASES).unwrap_or_default(),
        model: first_alias(&properties, &MODEL_ALIASES).unwrap_or_default(),
        manufacturer: first_alias(&properties, &MANUFACTURER_ALIASES).unwrap_or_default(),
        assembly_code: first_alias(&properties, &ASSEMBLY_CODE_ALIASES).unwrap_or_default(),
        assembly_description: first_alias(&properties, &ASSEMBLY_DESC_ALIASES).unwrap_or_default(),
        raw_properties: properties,
        compliance: None,
        count: 1,
    };

    if let Some(count) = first_alias(&element.raw_properties, &COUNT_ALIASES)
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|&c| c > 0)
    {
        element.count = count;
    }
    element.viewer_db_id = resolve_db_id(&element);
    element.compute_compliance();
    element
}

/// First non-null DbId candidate: the explicit DbId-shaped property,
/// then the Revit element id, then the element id. Only positive
/// integers qualify.
fn resolve_db_id(element: &ModelElement) -> Option<u64> {
    first_alias(&element.raw_properties, &DB_ID_ALIASES)
        .as_deref()
        .and_then(parse_positive)
        .or_else(|| parse_positive(&element.revit_element_id))
        .or_else(|| parse_positive(&element.element_id))
}

fn parse_positive(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|&v| v > 0)
}

/// Flattens a raw record into an ordered property list.
///
/// Scalar top-level fields become properties under their key; a nested
/// `properties` object or array (entries shaped `{name|displayName,
/// value}`) is appended after them.
fn collect_properties(raw: &Value) -> Vec<ElementProperty> {
    let mut out = Vec::new();
    let Some(object) = raw.as_object() else {
        return out;
    };
    for (key, value) in object {
        if key == "properties" {
            continue;
        }
        if let Some(text) = scalar_to_string(value) {
            out.push(ElementProperty {
                name: key.clone(),
                value: text,
            });
        }
    }
    match object.get("properties") {
        Some(Value::Object(map)) => {
            for (key, value) in map {
                if let Some(text) = scalar_to_string(value) {
                    out.push(ElementProperty {
                        name: key.clone(),
                        value: text,
                    });
                }
            }
        }
        Some(Value::Array(entries)) => {
            for entry in entries {
                let Some(entry) = entry.as_object() else {
                    continue;
                };
                let name = entry
                    .get("name")
                    .or_else(|| entry.get("displayName"))
                    .and_then(Value::as_str);
                let value = entry.get("value").and_then(scalar_to_string_ref);
                if let (Some(name), Some(value)) = (name, value) {
                    out.push(ElementProperty {
                        name: name.to_string(),
                        value,
                    });
                }
            }
        }
        _ => {}
    }
    out
}

fn scalar_to_string(value: &Value) -> Option<String> {
    scalar_to_string_ref(value)
}

fn scalar_to_string_ref(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First alias with a non-empty value wins; alias order is priority
/// order, name comparison is case-insensitive.
fn first_alias(properties: &[ElementProperty], aliases: &[&str]) -> Option<String> {
    for alias in aliases {
        for property in properties {
            if property.name.eq_ignore_ascii_case(alias) && !property.value.trim().is_empty() {
                return Some(property.value.trim().to_string());
            }
        }
    }
    None
}

/// Aggregate field-compliance statistics over a fetched element set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplianceStats {
    pub elements: usize,
    pub fully_filled: usize,
    pub mean_pct: f64,
}

/// Computes aggregate compliance over a slice of elements.
pub fn compliance_stats(elements: &[ModelElement]) -> ComplianceStats {
    let mut sum = 0.0;
    let mut fully_filled = 0;
    for element in elements {
        if let Some(compliance) = element.compliance {
            sum += compliance.pct;
            if compliance.filled == compliance.total {
                fully_filled += 1;
            }
        }
    }
    let mean_pct = if elements.is_empty() {
        0.0
    } else {
        (sum / elements.len() as f64 * 100.0).round() / 100.0
    };
    ComplianceStats {
        elements: elements.len(),
        fully_filled,
        mean_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_fields_from_nested_property_object() {
        let raw = json!({
            "id": "elem-1",
            "dbId": 501,
            "properties": {
                "Category": "Walls",
                "Family Name": "Basic Wall",
                "Assembly Code": "C1010",
                "Name": "Generic 200mm"
            }
        });
        let element = element_from_raw(&raw);
        assert_eq!(element.element_id, "elem-1");
        assert_eq!(element.category, "Walls");
        assert_eq!(element.family_name, "Basic Wall");
        assert_eq!(element.assembly_code, "C1010");
        assert_eq!(element.element_name, "Generic 200mm");
        assert_eq!(element.viewer_db_id, Some(501));
        assert_eq!(element.count, 1);
        assert!(element.compliance.is_some());
    }

    #[test]
    fn alias_priority_first_match_wins() {
        let raw = json!({
            "properties": [
                {"name": "FamilyName", "value": "Second Choice"},
                {"name": "Family Name", "value": "First Choice"}
            ]
        });
        let element = element_from_raw(&raw);
        // "Family Name" is the higher-priority alias even though
        // "FamilyName" appears first in the bag.
        assert_eq!(element.family_name, "First Choice");
    }

    #[test]
    fn db_id_falls_back_to_element_id() {
        let raw = json!({"id": "123"});
        let element = element_from_raw(&raw);
        assert_eq!(element.viewer_db_id, Some(123));

        let raw = json!({"id": "not-a-number"});
        let element = element_from_raw(&raw);
        assert_eq!(element.viewer_db_id, None);
    }

    #[test]
    fn raw_bag_is_retained() {
        let raw = json!({
            "id": "e1",
            "properties": {"Obscure Property": "kept"}
        });
        let element = element_from_raw(&raw);
        assert!(
            element
                .raw_properties
                .iter()
                .any(|p| p.name == "Obscure Property" && p.value == "kept")
        );
    }

    #[test]
    fn compliance_stats_aggregates() {
        let full = json!({
            "id": "1",
            "properties": {
                "ExternalId": "x", "Category": "Walls", "Family Name": "F",
                "Name": "N", "Type Mark": "T", "Description": "D",
                "Model": "M", "Manufacturer": "Mf",
                "Assembly Code": "C1010", "Assembly Description": "Walls"
            }
        });
        let sparse = json!({"id": "2"});
        let elements = vec![element_from_raw(&full), element_from_raw(&sparse)];
        let stats = compliance_stats(&elements);
        assert_eq!(stats.elements, 2);
        assert_eq!(stats.fully_filled, 1);
        assert_eq!(stats.mean_pct, 50.0);
    }
}
