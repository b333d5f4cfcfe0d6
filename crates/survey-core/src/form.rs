//! The entry form and its submission payload.

use std::fmt;
use std::str::FromStr;

use crate::dates::Calendar;

/// Marker sent in place of any blank field.
pub const NOT_FILLED: &str = "Not Filled";

/// Submittable fields, in form order. `SNo` is assigned by the sheet and is
/// not part of the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormField {
    /// Street identifier.
    GaliNo,
    /// House identifier.
    HouseNo,
    /// Resident name.
    Name,
    /// Relation to head of household.
    Relation,
    /// Date of birth (`YYYY-MM-DD`).
    Dob,
    /// Age, derived from the date of birth.
    Age,
    /// National ID number.
    AadharNo,
    /// Phone number.
    PhoneNo,
    /// Marital status.
    Married,
    /// Education level.
    Education,
    /// Caste category.
    Caste,
    /// Ration card number.
    RationCard,
    /// Family planning status.
    FamilyPlanning,
    /// Occupation.
    Occupation,
    /// Disability status.
    Disabled,
    /// Substance use status.
    Nasha,
    /// Medical insurance status.
    Mediclaim,
    /// Known diseases.
    Diseases,
    /// Ownership status.
    Owner,
}

impl FormField {
    /// Every field in form order.
    pub const ALL: [Self; 19] = [
        Self::GaliNo,
        Self::HouseNo,
        Self::Name,
        Self::Relation,
        Self::Dob,
        Self::Age,
        Self::AadharNo,
        Self::PhoneNo,
        Self::Married,
        Self::Education,
        Self::Caste,
        Self::RationCard,
        Self::FamilyPlanning,
        Self::Occupation,
        Self::Disabled,
        Self::Nasha,
        Self::Mediclaim,
        Self::Diseases,
        Self::Owner,
    ];

    /// Wire key, identical to the sheet header.
    pub const fn key(self) -> &'static str {
        match self {
            Self::GaliNo => "GaliNo",
            Self::HouseNo => "HouseNo",
            Self::Name => "Name",
            Self::Relation => "Relation",
            Self::Dob => "DOB",
            Self::Age => "Age",
            Self::AadharNo => "AadharNo",
            Self::PhoneNo => "PhoneNo",
            Self::Married => "Married",
            Self::Education => "Education",
            Self::Caste => "Caste",
            Self::RationCard => "RationCard",
            Self::FamilyPlanning => "FamilyPlanning",
            Self::Occupation => "Occupation",
            Self::Disabled => "Disabled",
            Self::Nasha => "Nasha",
            Self::Mediclaim => "Mediclaim",
            Self::Diseases => "Diseases",
            Self::Owner => "Owner",
        }
    }

    /// Prompt label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::GaliNo => "Gali No.",
            Self::HouseNo => "House No.",
            Self::Name => "Name",
            Self::Relation => "Relation",
            Self::Dob => "Date of Birth (YYYY-MM-DD)",
            Self::Age => "Age",
            Self::AadharNo => "Aadhar No.",
            Self::PhoneNo => "Phone No.",
            Self::Married => "Married",
            Self::Education => "Education",
            Self::Caste => "Caste",
            Self::RationCard => "Ration Card",
            Self::FamilyPlanning => "Family Planning",
            Self::Occupation => "Occupation",
            Self::Disabled => "Disabled",
            Self::Nasha => "Nasha",
            Self::Mediclaim => "Mediclaim",
            Self::Diseases => "Diseases",
            Self::Owner => "Owner",
        }
    }

    /// Fields answered from a fixed list; they reset to [`NOT_FILLED`]
    /// rather than to blank.
    pub const fn is_choice(self) -> bool {
        matches!(
            self,
            Self::Relation
                | Self::Married
                | Self::Education
                | Self::Caste
                | Self::FamilyPlanning
                | Self::Disabled
                | Self::Nasha
                | Self::Mediclaim
                | Self::Owner
        )
    }

    /// Fields kept between residents of the same household.
    pub const fn is_household(self) -> bool {
        matches!(self, Self::GaliNo | Self::HouseNo)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error for an unrecognised field key.
#[derive(Debug, thiserror::Error)]
#[error("unknown form field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for FormField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Ordered `key=value` pairs as posted to the gateway.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Submission {
    pairs: Vec<(String, String)>,
}

impl Submission {
    /// Pairs in form order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Value posted for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Current contents of the entry form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurveyForm {
    values: Vec<String>,
}

impl Default for SurveyForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SurveyForm {
    /// Fresh form: text fields blank, choice fields `Not Filled`.
    pub fn new() -> Self {
        let values = FormField::ALL
            .iter()
            .map(|f| if f.is_choice() { NOT_FILLED.to_string() } else { String::new() })
            .collect();
        Self { values }
    }

    /// Current value of a field.
    pub fn get(&self, field: FormField) -> &str {
        &self.values[field.index()]
    }

    /// Set a field verbatim.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    /// Set the date of birth and recompute the age. An unusable date
    /// clears the age.
    pub fn set_birth_date(&mut self, raw: &str, calendar: &Calendar) {
        self.set(FormField::Dob, raw);
        let age = calendar
            .age_today(raw)
            .map(|a| a.to_string())
            .unwrap_or_default();
        self.set(FormField::Age, age);
    }

    /// Build the gateway payload. Values that are blank after trimming become
    /// [`NOT_FILLED`]; everything else is sent as typed.
    pub fn to_submission(&self) -> Submission {
        let pairs = FormField::ALL
            .iter()
            .map(|field| {
                let value = self.get(*field);
                let value = if value.trim().is_empty() { NOT_FILLED } else { value };
                (field.key().to_string(), value.to_string())
            })
            .collect();
        Submission { pairs }
    }

    /// Prepare for the next resident of the same household: everything but
    /// the street and house identifiers is cleared.
    pub fn reset_for_next_entry(&mut self) {
        for field in FormField::ALL {
            if field.is_household() {
                continue;
            }
            let reset = if field.is_choice() { NOT_FILLED } else { "" };
            self.set(field, reset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_keys_round_trip() {
        for field in FormField::ALL {
            assert_eq!(field.key().parse::<FormField>().unwrap(), field);
        }
        assert_eq!("dob".parse::<FormField>().unwrap(), FormField::Dob);
        assert!("SNo".parse::<FormField>().is_err());
    }

    #[test]
    fn blanks_become_not_filled() {
        let mut form = SurveyForm::new();
        form.set(FormField::Name, "Asha");
        form.set(FormField::PhoneNo, "   ");
        let sub = form.to_submission();
        assert_eq!(sub.len(), 19);
        assert_eq!(sub.get("Name"), Some("Asha"));
        assert_eq!(sub.get("PhoneNo"), Some(NOT_FILLED));
        assert_eq!(sub.get("GaliNo"), Some(NOT_FILLED));
        assert_eq!(sub.get("Married"), Some(NOT_FILLED));
    }

    #[test]
    fn non_blank_values_are_not_trimmed() {
        let mut form = SurveyForm::new();
        form.set(FormField::Name, " Asha ");
        assert_eq!(form.to_submission().get("Name"), Some(" Asha "));
    }

    #[test]
    fn submission_follows_form_order() {
        let keys: Vec<String> = SurveyForm::new()
            .to_submission()
            .pairs()
            .iter()
            .map(|(k, _)| k.clone())
            .collect();
        assert_eq!(keys.first().map(String::as_str), Some("GaliNo"));
        assert_eq!(keys.last().map(String::as_str), Some("Owner"));
        assert!(!keys.iter().any(|k| k == "SNo"));
    }

    #[test]
    fn birth_date_drives_age() {
        let cal = Calendar::utc();
        let mut form = SurveyForm::new();
        form.set_birth_date("1950-01-01", &cal);
        assert!(form.get(FormField::Age).parse::<u32>().unwrap() >= 70);
        form.set_birth_date("garbage", &cal);
        assert_eq!(form.get(FormField::Age), "");
        assert_eq!(form.get(FormField::Dob), "garbage");
    }

    #[test]
    fn reset_keeps_household() {
        let mut form = SurveyForm::new();
        form.set(FormField::GaliNo, "4");
        form.set(FormField::HouseNo, "12B");
        form.set(FormField::Name, "Asha");
        form.set(FormField::Married, "Yes");
        form.reset_for_next_entry();
        assert_eq!(form.get(FormField::GaliNo), "4");
        assert_eq!(form.get(FormField::HouseNo), "12B");
        assert_eq!(form.get(FormField::Name), "");
        assert_eq!(form.get(FormField::Married), NOT_FILLED);
    }
}
