// Categorized styling: stable label -> color assignment and label counts

use std::collections::HashMap;

/// Label to color assignment, kept in the order labels were supplied
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryColorMap {
    entries: Vec<(String, String)>,
}

impl CategoryColorMap {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, c)| (l.as_str(), c.as_str()))
    }

    /// Plain `HashMap` view for callers that only need lookups
    pub fn to_hash_map(&self) -> HashMap<String, String> {
        self.entries.iter().cloned().collect()
    }
}

/// Assign `ramp[i % ramp.len()]` to the i-th label. When there are more
/// labels than colors the ramp wraps, so labels may share a color.
/// Repeated labels keep their first color; an empty ramp yields an
/// empty map.
pub fn build_category_color_map<L, C>(categories: &[L], ramp: &[C]) -> CategoryColorMap
where
    L: AsRef<str>,
    C: AsRef<str>,
{
    if ramp.is_empty() {
        return CategoryColorMap::default();
    }

    let mut entries: Vec<(String, String)> = Vec::with_capacity(categories.len());
    for (i, label) in categories.iter().enumerate() {
        let label = label.as_ref();
        if entries.iter().any(|(l, _)| l == label) {
            continue;
        }
        entries.push((label.to_string(), ramp[i % ramp.len()].as_ref().to_string()));
    }
    CategoryColorMap { entries }
}

/// Per-label counts over a set of records
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryStatistics {
    /// Records that produced a label
    pub total: usize,
    /// Distinct labels in first-seen order
    pub categories: Vec<String>,
    pub counts: HashMap<String, usize>,
    /// Share of `total`, in percent, rounded to 2 decimals
    pub percentages: HashMap<String, f64>,
}

/// Count how often each label occurs. `field` extracts the label from a
/// record; records for which it returns `None` are not counted.
pub fn compute_category_statistics<T, F>(records: &[T], field: F) -> CategoryStatistics
where
    F: Fn(&T) -> Option<String>,
{
    let mut stats = CategoryStatistics::default();

    for record in records {
        let Some(label) = field(record) else {
            continue;
        };
        stats.total += 1;
        let count = stats.counts.entry(label.clone()).or_insert(0);
        if *count == 0 {
            stats.categories.push(label);
        }
        *count += 1;
    }

    if stats.total == 0 {
        return stats;
    }

    let total = stats.total as f64;
    stats.percentages = stats
        .counts
        .iter()
        .map(|(label, &count)| {
            let pct = (count as f64 / total * 100.0 * 100.0).round() / 100.0;
            (label.clone(), pct)
        })
        .collect();
    stats
}

/// Distinct labels, sorted, for deterministic color assignment
pub fn sorted_categories<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let mut distinct: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
    distinct.sort();
    distinct.dedup();
    distinct
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_map_wraps_palette() {
        let map = build_category_color_map(&["x", "y", "z", "w"], &["red", "blue"]);
        assert_eq!(map.get("x"), Some("red"));
        assert_eq!(map.get("y"), Some("blue"));
        assert_eq!(map.get("z"), Some("red"));
        assert_eq!(map.get("w"), Some("blue"));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_color_map_preserves_order() {
        let map = build_category_color_map(&["North", "South", "East"], &["#1", "#2", "#3", "#4"]);
        let labels: Vec<&str> = map.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["North", "South", "East"]);
    }

    #[test]
    fn test_color_map_is_deterministic() {
        let cats = ["b", "a", "c"];
        let ramp = ["#e41a1c", "#377eb8"];
        assert_eq!(build_category_color_map(&cats, &ramp), build_category_color_map(&cats, &ramp));
    }

    #[test]
    fn test_color_map_duplicate_label_keeps_first() {
        let map = build_category_color_map(&["a", "b", "a"], &["red", "green", "blue"]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some("red"));
    }

    #[test]
    fn test_color_map_empty_inputs() {
        let none: [&str; 0] = [];
        assert!(build_category_color_map(&["a"], &none).is_empty());
        assert!(build_category_color_map(&none, &["red"]).is_empty());
    }

    #[test]
    fn test_to_hash_map() {
        let map = build_category_color_map(&["a", "b"], &["red", "green"]);
        let hm = map.to_hash_map();
        assert_eq!(hm.get("b"), Some(&"green".to_string()));
    }

    #[test]
    fn test_category_statistics() {
        let records = vec!["forest", "water", "forest", "urban", "forest", "water"];
        let stats = compute_category_statistics(&records, |r| Some(r.to_string()));
        assert_eq!(stats.total, 6);
        assert_eq!(stats.categories, vec!["forest", "water", "urban"]);
        assert_eq!(stats.counts["forest"], 3);
        assert_eq!(stats.counts["urban"], 1);
        assert_eq!(stats.percentages["forest"], 50.0);
        assert_eq!(stats.percentages["water"], 33.33);
        assert_eq!(stats.percentages["urban"], 16.67);
    }

    #[test]
    fn test_category_percentages_sum_to_100() {
        let records: Vec<u32> = (0..37).map(|i| i % 7).collect();
        let stats = compute_category_statistics(&records, |r| Some(format!("c{}", r)));
        let sum: f64 = stats.percentages.values().sum();
        assert!((sum - 100.0).abs() < 0.05, "sum was {}", sum);
    }

    #[test]
    fn test_category_statistics_skips_missing() {
        let records = vec![Some("a"), None, Some("a"), None];
        let stats = compute_category_statistics(&records, |r| r.map(|s| s.to_string()));
        assert_eq!(stats.total, 2);
        assert_eq!(stats.percentages["a"], 100.0);
    }

    #[test]
    fn test_category_statistics_empty() {
        let records: Vec<&str> = vec![];
        let stats = compute_category_statistics(&records, |r| Some(r.to_string()));
        assert_eq!(stats.total, 0);
        assert!(stats.counts.is_empty());
        assert!(stats.percentages.is_empty());
    }

    #[test]
    fn test_sorted_categories() {
        assert_eq!(sorted_categories(&["b", "a", "b", "c"]), vec!["a", "b", "c"]);
    }
}
