use std::collections::HashMap;

use serde_json::Value;

use crate::domain::notification::Notification;
use crate::domain::tariff::TariffCode;

/// Generic description shared by catch-all tariff lines.
pub const GENERIC_PLACEHOLDER: &str = "other";

const MISSING_DESCRIPTIONS: [&str; 5] = ["", "-", "nan", "none", "null"];

/// Whether a description is a placeholder rather than a real description.
pub fn is_placeholder_description(description: &str) -> bool {
    let normalized = description.trim().to_lowercase();
    normalized == GENERIC_PLACEHOLDER || MISSING_DESCRIPTIONS.contains(&normalized.as_str())
}

/// Insertion-ordered map: re-inserting a key replaces its value in place.
#[derive(Debug)]
struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    positions: HashMap<String, usize>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    fn insert(&mut self, key: String, value: V) {
        match self.positions.get(&key) {
            Some(&position) => self.entries[position].1 = value,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    fn get(&self, key: &str) -> Option<&V> {
        self.positions.get(key).map(|&position| &self.entries[position].1)
    }
}

/// Run-scoped lookup structures shared read-only by every worker.
#[derive(Debug, Default)]
pub struct CandidateIndex {
    notifications: OrderedMap<Value>,
    codes: OrderedMap<TariffCode>,
}

impl CandidateIndex {
    /// Builds the index from the loaded notifications and tariff rows.
    ///
    /// Tariff rows with an empty code or a placeholder description are
    /// dropped.
    pub fn build<I>(notifications: &[Notification], tariff_codes: I) -> Self
    where
        I: IntoIterator<Item = TariffCode>,
    {
        let mut index = CandidateIndex::default();

        for record in notifications {
            index
                .notifications
                .insert(record.notification_no.clone(), record.id.clone());
        }

        for entry in tariff_codes {
            let code = entry.code.trim().to_string();
            let description = entry.description.trim().to_string();
            if code.is_empty() || is_placeholder_description(&description) {
                continue;
            }
            index
                .codes
                .insert(code.clone(), TariffCode::new(code, description));
        }

        index
    }

    pub fn notification_count(&self) -> usize {
        self.notifications.entries.len()
    }

    pub fn code_count(&self) -> usize {
        self.codes.entries.len()
    }

    pub fn notification_id(&self, notification_no: &str) -> Option<&Value> {
        self.notifications.get(notification_no)
    }

    pub fn contains_notification(&self, notification_no: &str) -> bool {
        self.notifications.positions.contains_key(notification_no)
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.codes.positions.contains_key(code)
    }

    /// The first `cap` notification numbers other than `current`, in load order.
    pub fn reference_candidates(&self, current: &str, cap: usize) -> Vec<&str> {
        self.notifications
            .entries
            .iter()
            .map(|(number, _)| number.as_str())
            .filter(|number| *number != current)
            .take(cap)
            .collect()
    }

    /// The first `cap` tariff codes in load order.
    pub fn tariff_candidates(&self, cap: usize) -> Vec<&TariffCode> {
        self.codes
            .entries
            .iter()
            .map(|(_, entry)| entry)
            .take(cap)
            .collect()
    }

    /// Every tariff code in load order.
    pub fn tariff_codes(&self) -> impl Iterator<Item = &TariffCode> {
        self.codes.entries.iter().map(|(_, entry)| entry)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn notifications() -> Vec<Notification> {
        vec![
            Notification::new("a", "1/2020"),
            Notification::new("b", "2/2020"),
            Notification::new("c", "3/2020"),
            Notification::new("d", "2/2020"),
        ]
    }

    #[test]
    fn duplicate_numbers_keep_position_and_last_id() {
        let index = CandidateIndex::build(&notifications(), vec![]);

        assert_eq!(index.notification_count(), 3);
        assert_eq!(index.notification_id("2/2020"), Some(&json!("d")));
        assert_eq!(
            index.reference_candidates("", 10),
            vec!["1/2020", "2/2020", "3/2020"]
        );
    }

    #[test]
    fn reference_candidates_exclude_current_and_respect_cap() {
        let index = CandidateIndex::build(&notifications(), vec![]);

        assert_eq!(index.reference_candidates("1/2020", 1), vec!["2/2020"]);
        assert_eq!(
            index.reference_candidates("2/2020", 10),
            vec!["1/2020", "3/2020"]
        );
    }

    #[test]
    fn placeholder_descriptions_are_excluded() {
        let rows = vec![
            TariffCode::new("0101", "Live horses"),
            TariffCode::new("0102", "Other"),
            TariffCode::new("0103", " OTHER "),
            TariffCode::new("0104", ""),
            TariffCode::new("0105", "nan"),
            TariffCode::new("  ", "Blank code"),
            TariffCode::new(" 0106 ", " Live sheep "),
        ];

        let index = CandidateIndex::build(&[], rows);

        let codes: Vec<_> = index.tariff_codes().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["0101", "0106"]);
        assert!(index.contains_code("0106"));
        assert_eq!(index.tariff_candidates(5)[1].description, "Live sheep");
    }

    #[test]
    fn tariff_candidates_are_a_stable_prefix() {
        let rows = (0..250).map(|i| TariffCode::new(format!("C{i:03}"), format!("Item {i}")));
        let index = CandidateIndex::build(&[], rows);

        let offered = index.tariff_candidates(100);

        assert_eq!(offered.len(), 100);
        assert_eq!(offered[0].code, "C000");
        assert_eq!(offered[99].code, "C099");
    }
}
