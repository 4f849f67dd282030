//! Candidate options for single-selection widgets.

use std::cmp::Ordering;

/// A label/value/selected triple populating a selection widget.
///
/// Options in one list are unique by `value`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>, selected: bool) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            selected,
        }
    }

    /// The blank option that lets an autocomplete widget represent "nothing chosen".
    pub fn empty() -> Self {
        Self::default()
    }
}

fn is_select_prompt(label: &str) -> bool {
    label.trim().eq_ignore_ascii_case("select")
}

/// Orders options by label, ignoring case, with the literal `select` sorting last.
///
/// Labels that differ only by case fall back to their exact text so the order is total.
pub fn compare_labels(a: &SelectOption, b: &SelectOption) -> Ordering {
    match (is_select_prompt(&a.label), is_select_prompt(&b.label)) {
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }

    a.label
        .to_lowercase()
        .cmp(&b.label.to_lowercase())
        .then_with(|| a.label.cmp(&b.label))
}

pub fn sort_options(options: &mut [SelectOption]) {
    options.sort_by(compare_labels);
}

/// Removes the first option carrying `value`. Returns whether one was removed.
pub fn remove_by_value(options: &mut Vec<SelectOption>, value: &str) -> bool {
    match options.iter().position(|o| o.value == value) {
        Some(index) => {
            options.remove(index);
            true
        }
        None => false,
    }
}

/// Option shown for an initial `label`/`value` pair.
///
/// Labels are not unique (two people can share a name), so among the options carrying
/// `label` the one whose value is `value` wins. Without such an option the last label match
/// is used; that is where an appended default option ends up after sorting.
pub fn find_initial<'a>(
    options: &'a [SelectOption],
    label: &str,
    value: &str,
) -> Option<&'a SelectOption> {
    let mut last = None;
    for option in options.iter().filter(|o| o.label == label) {
        if option.value == value {
            return Some(option);
        }
        last = Some(option);
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(options: &[SelectOption]) -> Vec<&str> {
        options.iter().map(|o| o.label.as_str()).collect()
    }

    #[test]
    fn sort_ignores_case_and_puts_select_last() {
        let mut options = vec![
            SelectOption::new("select", "", false),
            SelectOption::new("zebra ward", "3", false),
            SelectOption::new("Annex", "1", false),
            SelectOption::new("Main Clinic", "2", false),
            SelectOption::new("annex", "4", false),
        ];
        sort_options(&mut options);
        assert_eq!(
            labels(&options),
            vec!["Annex", "annex", "Main Clinic", "zebra ward", "select"]
        );
    }

    #[test]
    fn remove_by_value_removes_only_first_match() {
        let mut options = vec![
            SelectOption::new("A", "1", false),
            SelectOption::new("B", "2", false),
        ];
        assert!(remove_by_value(&mut options, "2"));
        assert!(!remove_by_value(&mut options, "2"));
        assert_eq!(labels(&options), vec!["A"]);
    }

    #[test]
    fn initial_option_prefers_matching_value_among_shared_labels() {
        let options = vec![
            SelectOption::new("John Smith", "5", false),
            SelectOption::new("John Smith", "6", true),
            SelectOption::new("John Smith", "7", false),
        ];
        assert_eq!(find_initial(&options, "John Smith", "6").unwrap().value, "6");
        assert_eq!(find_initial(&options, "John Smith", "9").unwrap().value, "7");
        assert!(find_initial(&options, "Jane Doe", "6").is_none());
    }
}
