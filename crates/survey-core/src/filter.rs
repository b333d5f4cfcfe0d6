//! Filter engine for the details view.
//!
//! Four independent criteria, applied conjunctively:
//! - `name`: case-insensitive substring of `Name`
//! - `age`: substring of the text form of `Age`
//! - `house`: case-insensitive substring of `HouseNo`
//! - `year`: exact match on the birth year; skipped when empty
//!
//! Absent fields compare as the empty string, so an empty criterion always
//! matches. The output keeps the input order.

use serde::{Deserialize, Serialize};

use crate::dates::Calendar;
use crate::record::SurveyRecord;

/// User-supplied filter criteria.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Name substring (case-insensitive).
    pub name: String,
    /// Age substring.
    pub age: String,
    /// House identifier substring (case-insensitive).
    pub house: String,
    /// Four-digit birth year, or empty to skip.
    pub year: String,
}

impl FilterCriteria {
    /// Criteria that match every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether every criterion is empty.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.age.is_empty() && self.house.is_empty() && self.year.is_empty()
    }

    /// Whether a single record satisfies all criteria.
    pub fn matches(&self, record: &SurveyRecord, calendar: &Calendar) -> bool {
        let name = self.name.to_lowercase();
        let house = self.house.to_lowercase();
        self.matches_prepared(record, calendar, &name, &house)
    }

    fn matches_prepared(
        &self,
        record: &SurveyRecord,
        calendar: &Calendar,
        name: &str,
        house: &str,
    ) -> bool {
        if !record.text("Name").to_lowercase().contains(name) {
            return false;
        }
        if !record.text("Age").contains(self.age.as_str()) {
            return false;
        }
        if !record.text("HouseNo").to_lowercase().contains(house) {
            return false;
        }
        if self.year.is_empty() {
            return true;
        }
        let dob = record.text("DOB");
        calendar.year_of(&dob).is_some_and(|year| year == self.year)
    }
}

/// Derive the filtered view of `records`. Pure in both arguments.
pub fn filter_records<'a>(
    records: &'a [SurveyRecord],
    criteria: &FilterCriteria,
    calendar: &Calendar,
) -> Vec<&'a SurveyRecord> {
    let name = criteria.name.to_lowercase();
    let house = criteria.house.to_lowercase();
    records
        .iter()
        .filter(|record| criteria.matches_prepared(record, calendar, &name, &house))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> SurveyRecord {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> Vec<SurveyRecord> {
        vec![
            record(json!({"SNo": 5, "Name": "Asha Devi", "Age": 34, "HouseNo": "12B", "DOB": "1990-05-12"})),
            record(json!({"SNo": 4, "Name": "Ravi Kumar", "Age": 41, "HouseNo": "12b", "DOB": "1983-01-02"})),
            record(json!({"SNo": 3, "Name": "ASHOK", "Age": "7", "HouseNo": "4", "DOB": "1990-11-30T18:30:00.000Z"})),
            record(json!({"SNo": 2, "Name": "Meena"})),
            record(json!({"SNo": 1, "HouseNo": "9", "DOB": "Not Filled"})),
        ]
    }

    fn names(rows: &[&SurveyRecord]) -> Vec<String> {
        rows.iter().map(|r| r.text("Name")).collect()
    }

    #[test]
    fn empty_criteria_return_everything_in_order() {
        let data = sample();
        let out = filter_records(&data, &FilterCriteria::all(), &Calendar::utc());
        assert_eq!(out.len(), data.len());
        for (a, b) in out.iter().zip(data.iter()) {
            assert_eq!(*a, b);
        }
    }

    #[test]
    fn name_is_case_insensitive_substring() {
        let data = sample();
        let criteria = FilterCriteria { name: "ash".into(), ..Default::default() };
        let out = filter_records(&data, &criteria, &Calendar::utc());
        assert_eq!(names(&out), vec!["Asha Devi", "ASHOK"]);
    }

    #[test]
    fn age_matches_text_form() {
        let data = sample();
        let criteria = FilterCriteria { age: "4".into(), ..Default::default() };
        let out = filter_records(&data, &criteria, &Calendar::utc());
        assert_eq!(names(&out), vec!["Asha Devi", "Ravi Kumar"]);
    }

    #[test]
    fn house_is_case_insensitive() {
        let data = sample();
        let criteria = FilterCriteria { house: "12B".into(), ..Default::default() };
        let out = filter_records(&data, &criteria, &Calendar::utc());
        assert_eq!(names(&out), vec!["Asha Devi", "Ravi Kumar"]);
    }

    #[test]
    fn year_is_exact_and_excludes_missing_dob() {
        let data = sample();
        let criteria = FilterCriteria { year: "1990".into(), ..Default::default() };
        let out = filter_records(&data, &criteria, &Calendar::utc());
        assert_eq!(names(&out), vec!["Asha Devi", "ASHOK"]);

        let criteria = FilterCriteria { year: "199".into(), ..Default::default() };
        assert!(filter_records(&data, &criteria, &Calendar::utc()).is_empty());
    }

    #[test]
    fn year_uses_display_offset() {
        let data = vec![record(json!({"Name": "edge", "DOB": "1989-12-31T20:00:00.000Z"}))];
        let ist = Calendar::new(Calendar::parse_offset("+05:30").unwrap());
        let criteria = FilterCriteria { year: "1990".into(), ..Default::default() };
        assert_eq!(filter_records(&data, &criteria, &ist).len(), 1);
        assert!(filter_records(&data, &criteria, &Calendar::utc()).is_empty());
    }

    #[test]
    fn criteria_are_conjunctive() {
        let data = sample();
        let criteria = FilterCriteria {
            name: "a".into(),
            house: "12".into(),
            year: "1983".into(),
            ..Default::default()
        };
        let out = filter_records(&data, &criteria, &Calendar::utc());
        assert_eq!(names(&out), vec!["Ravi Kumar"]);
    }

    #[test]
    fn absent_fields_fail_non_empty_criteria() {
        let data = sample();
        let criteria = FilterCriteria { name: "e".into(), age: "3".into(), ..Default::default() };
        let out = filter_records(&data, &criteria, &Calendar::utc());
        assert_eq!(names(&out), vec!["Asha Devi"]);
    }

    #[test]
    fn single_record_predicate_agrees_with_bulk() {
        let data = sample();
        let criteria = FilterCriteria { name: "RAVI".into(), ..Default::default() };
        let cal = Calendar::utc();
        let bulk = filter_records(&data, &criteria, &cal).len();
        let single = data.iter().filter(|r| criteria.matches(r, &cal)).count();
        assert_eq!(bulk, single);
    }

    fn arb_record() -> impl Strategy<Value = SurveyRecord> {
        (
            proptest::option::of("[a-zA-Z ]{0,8}"),
            proptest::option::of(0u32..100),
            proptest::option::of("[0-9]{1,2}[a-c]?"),
            proptest::option::of((1950i32..2020, 1u32..=12, 1u32..=28)),
        )
            .prop_map(|(name, age, house, dob)| SurveyRecord {
                name: name.map(Into::into),
                age: age.map(|a| i64::from(a).into()),
                house_no: house.map(Into::into),
                dob: dob.map(|(y, m, d)| format!("{y:04}-{m:02}-{d:02}").into()),
                ..Default::default()
            })
    }

    fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
        ("[a-z]{0,2}", "[0-9]{0,1}", "[0-9a-c]{0,1}", prop_oneof![Just(String::new()), (1950i32..2020).prop_map(|y| y.to_string())])
            .prop_map(|(name, age, house, year)| FilterCriteria { name, age, house, year })
    }

    proptest! {
        #[test]
        fn filtering_is_idempotent(records in proptest::collection::vec(arb_record(), 0..20), criteria in arb_criteria()) {
            let cal = Calendar::utc();
            let once: Vec<SurveyRecord> = filter_records(&records, &criteria, &cal).into_iter().cloned().collect();
            let twice: Vec<SurveyRecord> = filter_records(&once, &criteria, &cal).into_iter().cloned().collect();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn filtered_is_ordered_subsequence(records in proptest::collection::vec(arb_record(), 0..20), criteria in arb_criteria()) {
            let cal = Calendar::utc();
            let out = filter_records(&records, &criteria, &cal);
            let mut cursor = records.iter();
            for kept in out {
                prop_assert!(cursor.any(|r| std::ptr::eq(r, kept)));
            }
        }

        #[test]
        fn empty_criteria_keep_everything(records in proptest::collection::vec(arb_record(), 0..20)) {
            let out = filter_records(&records, &FilterCriteria::all(), &Calendar::utc());
            prop_assert_eq!(out.len(), records.len());
        }
    }
}
