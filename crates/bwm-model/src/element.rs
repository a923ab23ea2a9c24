//! Normalized model element records.
//!
//! Elements arrive from the remote service as loose property bags; the
//! fetch layer reduces each bag to this fixed record via ordered
//! property-name aliases. Nothing downstream touches the raw bag except
//! through [`ModelElement::raw_properties`].

use serde::{Deserialize, Serialize};

/// One raw property as returned by the element data service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementProperty {
    pub name: String,
    pub value: String,
}

/// How many of the tracked attribute fields carry a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldCompliance {
    pub filled: usize,
    pub total: usize,
    pub pct: f64,
}

impl FieldCompliance {
    pub fn from_counts(filled: usize, total: usize) -> Self {
        let pct = if total == 0 {
            0.0
        } else {
            (filled as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
        };
        Self { filled, total, pct }
    }
}

/// A single model element, normalized from the service's property bag.
///
/// At most one of the three identifiers is authoritative per record; all
/// are carried as-is. `db_id` is resolved at extraction time as the
/// first non-null of the explicit DbId property, the element's own dbId,
/// `revit_element_id`, and `element_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelElement {
    pub element_id: String,
    pub external_element_id: String,
    pub revit_element_id: String,
    /// Positive viewer DbId; only set when a DbId-shaped property was present.
    pub viewer_db_id: Option<u64>,
    pub category: String,
    pub family_name: String,
    pub element_name: String,
    pub type_mark: String,
    pub description: String,
    pub model: String,
    pub manufacturer: String,
    pub assembly_code: String,
    pub assembly_description: String,
    /// Full unprocessed property list, retained for downstream inspection.
    pub raw_properties: Vec<ElementProperty>,
    pub compliance: Option<FieldCompliance>,
    /// Instance multiplicity; defaults to 1.
    pub count: u32,
}

impl ModelElement {
    /// The tracked attribute fields counted for [`FieldCompliance`], in a
    /// fixed order.
    pub fn required_fields(&self) -> [&str; 10] {
        [
            &self.external_element_id,
            &self.category,
            &self.family_name,
            &self.element_name,
            &self.type_mark,
            &self.description,
            &self.model,
            &self.manufacturer,
            &self.assembly_code,
            &self.assembly_description,
        ]
    }

    /// Recomputes compliance from the current field values.
    pub fn compute_compliance(&mut self) {
        let fields = self.required_fields();
        let filled = fields.iter().filter(|v| !v.trim().is_empty()).count();
        self.compliance = Some(FieldCompliance::from_counts(filled, fields.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compliance_counts_filled_fields() {
        let mut element = ModelElement {
            category: "Walls".to_string(),
            element_name: "Basic Wall".to_string(),
            count: 1,
            ..Default::default()
        };
        element.compute_compliance();
        let compliance = element.compliance.unwrap();
        assert_eq!(compliance.filled, 2);
        assert_eq!(compliance.total, 10);
        assert_eq!(compliance.pct, 20.0);
    }

    #[test]
    fn compliance_pct_rounds_to_two_decimals() {
        let compliance = FieldCompliance::from_counts(1, 3);
        assert_eq!(compliance.pct, 33.33);
    }
}
