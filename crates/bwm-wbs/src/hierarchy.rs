//! Hierarchy utilities over WBS item slices.

use bwm_model::{WbsCode, WbsItem};

/// Sorts items into deterministic hierarchy order (numeric
/// segment-by-segment, parents before children).
pub fn sort_items(items: &mut [WbsItem]) {
    items.sort_by(|a, b| a.code.cmp(&b.code));
}

/// Top-level items (level 1), in hierarchy order.
pub fn roots(items: &[WbsItem]) -> Vec<&WbsItem> {
    let mut out: Vec<&WbsItem> = items.iter().filter(|item| item.level == 1).collect();
    out.sort_by(|a, b| a.code.cmp(&b.code));
    out
}

/// Direct children of `parent`, in hierarchy order.
pub fn children_of<'a>(items: &'a [WbsItem], parent: &WbsCode) -> Vec<&'a WbsItem> {
    let mut out: Vec<&WbsItem> = items
        .iter()
        .filter(|item| item.parent_code == parent.as_str())
        .collect();
    out.sort_by(|a, b| a.code.cmp(&b.code));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bwm_model::WbsCode;

    fn item(code: &str) -> WbsItem {
        WbsItem::new(WbsCode::new(code).unwrap(), format!("Activity {code}"))
    }

    #[test]
    fn sorts_numeric_not_lexicographic() {
        let mut items = vec![item("3.10"), item("3.9"), item("3"), item("10")];
        sort_items(&mut items);
        let codes: Vec<&str> = items.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["3", "3.9", "3.10", "10"]);
    }

    #[test]
    fn roots_and_children() {
        let items = vec![item("1"), item("1.2"), item("1.10"), item("1.9"), item("2")];
        let top: Vec<&str> = roots(&items).iter().map(|i| i.code.as_str()).collect();
        assert_eq!(top, vec!["1", "2"]);

        let parent = WbsCode::new("1").unwrap();
        let kids: Vec<&str> = children_of(&items, &parent)
            .iter()
            .map(|i| i.code.as_str())
            .collect();
        assert_eq!(kids, vec!["1.2", "1.9", "1.10"]);
    }
}
