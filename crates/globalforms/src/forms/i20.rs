//! Form I-20 request.
//!
//! The heaviest form in the portal: one request can carry several reasons
//! ("selections"), each with its own required fields, plus any number of
//! F-2 dependents.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::Deserialize;
use serde_json::Value;

use super::payload::{flexible_bool, flexible_string, free_text, string_list};
use super::validate::{parse_date, FieldErrors, Validator};
use super::{FormKind, FormRequest};

/// Selection: change of academic level.
pub const CHANGE_OF_LEVEL: &str = "Change of Academic Level";
/// Selection: change of major.
pub const CHANGE_OF_MAJOR: &str = "Change of Major";
/// Selection: program extension.
pub const PROGRAM_EXTENSION: &str = "Program Extension";
/// Selection: add or remove a dependent.
pub const DEPENDENT_CHANGE: &str = "Add or Remove a F-2 Dependent";
/// Selection: free-text reason.
pub const OTHER: &str = "Other";
/// Selection: change of non-immigrant status.
pub const STATUS_CHANGE: &str = "Change of Non-Immigrant Status";
/// Selection: return after a long absence.
pub const RETURN_FROM_ABSENCE: &str = "Return from Absence of greater than 5 months";
/// Selection: return from an authorized early withdrawal.
pub const EARLY_WITHDRAWAL_RETURN: &str = "Return from Authorized Early Withdrawal";

/// Longest allowed gap between departure and planned return.
const MAX_WITHDRAWAL_DAYS: i64 = 5 * 30;

/// Prefix of the per-dependent passport file fields.
const DEPENDENT_PASSPORT_PREFIX: &str = "dependent_passport_";

/// Index of a `dependent_passport_<n>` file field.
#[must_use]
pub fn dependent_passport_index(field: &str) -> Option<usize> {
    field
        .strip_prefix(DEPENDENT_PASSPORT_PREFIX)
        .and_then(|n| n.parse().ok())
}

/// A postal address block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Address {
    /// Street line.
    pub street: String,
    /// City.
    pub city: String,
    /// State or province.
    pub state: String,
    /// Postal code.
    #[serde(deserialize_with = "flexible_string")]
    pub postal_code: String,
    /// Country (non-US addresses only).
    pub country: String,
}

/// One F-2 dependent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Dependent {
    /// Relationship to the student.
    pub relationship: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Legal sex.
    pub legal_sex: String,
    /// Date of birth.
    pub date_of_birth: String,
    /// City of birth.
    pub city_of_birth: String,
    /// Country of birth.
    pub country_of_birth: String,
    /// Country of citizenship.
    pub country_of_citizenship: String,
    /// Passport file name, when sent inline.
    #[serde(deserialize_with = "flexible_string")]
    pub passport: String,
}

fn yes() -> bool {
    true
}

/// Form I-20 request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct I20Request {
    /// `current` or `new`.
    pub student_type: String,
    /// Reasons for the request.
    #[serde(deserialize_with = "string_list")]
    pub selections: Vec<String>,

    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Legal sex.
    pub legal_sex: String,
    /// Date of birth.
    pub date_of_birth: String,
    /// City of birth.
    pub city_of_birth: String,
    /// Country of birth.
    pub country_of_birth: String,
    /// Country of citizenship.
    pub country_of_citizenship: String,

    /// Whether the student has a US address.
    #[serde(default = "yes", deserialize_with = "flexible_bool")]
    pub has_us_address: bool,
    /// Whether the student has a non-US address.
    #[serde(default = "yes", deserialize_with = "flexible_bool")]
    pub has_non_us_address: bool,
    /// US address.
    pub us_address: Address,
    /// Non-US address.
    pub non_us_address: Address,

    /// UCF email.
    pub ucf_email: String,
    /// Personal email.
    pub personal_email: String,
    /// US telephone.
    #[serde(deserialize_with = "flexible_string")]
    pub us_telephone: String,
    /// Non-US telephone.
    #[serde(deserialize_with = "flexible_string")]
    pub non_us_telephone: String,

    /// Current academic level.
    pub current_level: String,
    /// Requested academic level.
    pub new_level: String,
    /// Previous major.
    pub previous_major: String,
    /// New major.
    pub new_major: String,

    /// Requested end term of the extension.
    pub program_ext_end_term: String,
    /// Requested end year of the extension.
    #[serde(deserialize_with = "flexible_string")]
    pub program_ext_end_year: String,

    /// How the status change happens.
    pub status_change_method: String,
    /// Level after the status change.
    pub status_level: String,
    /// Major after the status change.
    pub status_major: String,
    /// Start term after the status change.
    pub status_start_term: String,
    /// Start year after the status change.
    #[serde(deserialize_with = "flexible_string")]
    pub status_start_year: String,

    /// Level on return from absence.
    pub absence_level: String,
    /// Major on return from absence.
    pub absence_major: String,
    /// Start term on return from absence.
    pub absence_start_term: String,
    /// Start year on return from absence.
    #[serde(deserialize_with = "flexible_string")]
    pub absence_start_year: String,

    /// Date of departure.
    pub departure_date: String,
    /// Planned return date.
    pub planned_return_date: String,
    /// Departure itinerary file name.
    #[serde(deserialize_with = "flexible_string")]
    pub departure_itinerary: String,
    /// Return itinerary file name.
    #[serde(deserialize_with = "flexible_string")]
    pub return_itinerary: String,

    /// `add` or `remove`.
    pub dependent_action: String,
    /// Dependents being added or removed.
    pub dependents: Vec<Dependent>,

    /// Free-text reason for "Other".
    #[serde(deserialize_with = "free_text")]
    pub other_reason: String,

    /// Certification box.
    #[serde(deserialize_with = "flexible_bool")]
    pub certification_checked: bool,

    /// Everything else, including `dependent_passport_<n>` file markers.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl I20Request {
    fn selected(&self, selection: &str) -> bool {
        self.selections.iter().any(|s| s == selection)
    }

    fn has_dependent_passport(&self, index: usize, dependent: &Dependent) -> bool {
        if !dependent.passport.trim().is_empty() {
            return true;
        }
        self.extra
            .get(&format!("{DEPENDENT_PASSPORT_PREFIX}{index}"))
            .is_some_and(|v| !super::payload::value_text(v).trim().is_empty())
    }

    fn validate_identity(&self, v: &mut Validator) {
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("given_name", &self.given_name, "Given name is required");
        v.require("family_name", &self.family_name, "Family name is required");
        v.require("legal_sex", &self.legal_sex, "Legal sex is required");
        v.require("date_of_birth", &self.date_of_birth, "Date of birth is required");
        v.require("city_of_birth", &self.city_of_birth, "City of birth is required");
        v.require(
            "country_of_birth",
            &self.country_of_birth,
            "Country of birth is required",
        );
        v.require(
            "country_of_citizenship",
            &self.country_of_citizenship,
            "Country of citizenship is required",
        );
    }

    fn validate_addresses(&self, v: &mut Validator) {
        if self.has_us_address {
            let a = &self.us_address;
            v.require("us_address.street", &a.street, "Street address is required");
            v.require("us_address.city", &a.city, "City is required");
            v.require("us_address.state", &a.state, "State is required");
            v.require("us_address.postal_code", &a.postal_code, "Postal code is required");
        }
        if self.has_non_us_address {
            let a = &self.non_us_address;
            v.require("non_us_address.street", &a.street, "Street address is required");
            v.require("non_us_address.city", &a.city, "City is required");
            v.require("non_us_address.state", &a.state, "State/Province is required");
            v.require(
                "non_us_address.postal_code",
                &a.postal_code,
                "Postal code is required",
            );
            v.require("non_us_address.country", &a.country, "Country is required");
        }
    }

    fn validate_contact(&self, v: &mut Validator) {
        v.ucf_email(
            "ucf_email",
            &self.ucf_email,
            "UCF email is required",
            "Must be a valid UCF email address",
        );
        v.email(
            "personal_email",
            &self.personal_email,
            "Personal email is required",
            "Must be a valid email address",
        );
        v.require_any(
            &[
                ("us_telephone", &self.us_telephone),
                ("non_us_telephone", &self.non_us_telephone),
            ],
            "At least one telephone number is required",
        );
    }

    fn validate_dependents(&self, v: &mut Validator) {
        if !v.require(
            "dependent_action",
            &self.dependent_action,
            "Please select whether you want to add or remove a dependent",
        ) || self.dependent_action != "add"
        {
            return;
        }

        for (i, d) in self.dependents.iter().enumerate() {
            let field = |name: &str| format!("dependents[{i}].{name}");
            let checks = [
                ("relationship", &d.relationship, "Relationship is required"),
                ("given_name", &d.given_name, "Given name is required"),
                ("family_name", &d.family_name, "Family name is required"),
                ("legal_sex", &d.legal_sex, "Legal sex is required"),
                ("date_of_birth", &d.date_of_birth, "Date of birth is required"),
                ("city_of_birth", &d.city_of_birth, "City of birth is required"),
                ("country_of_birth", &d.country_of_birth, "Country of birth is required"),
                (
                    "country_of_citizenship",
                    &d.country_of_citizenship,
                    "Country of citizenship is required",
                ),
            ];
            for (name, value, message) in checks {
                v.require(&field(name), value, message);
            }
            if !self.has_dependent_passport(i, d) {
                v.error(field("passport"), "Passport copy is required");
            }
        }
    }

    fn validate_withdrawal_return(&self, v: &mut Validator) {
        v.require(
            "departure_date",
            &self.departure_date,
            "Date of departure is required",
        );
        v.require(
            "planned_return_date",
            &self.planned_return_date,
            "Planned return date is required",
        );
        v.require(
            "departure_itinerary",
            &self.departure_itinerary,
            "Departure flight itinerary is required",
        );
        v.require(
            "return_itinerary",
            &self.return_itinerary,
            "Return flight itinerary is required",
        );

        if let (Some(departure), Some(planned)) = (
            parse_date(&self.departure_date),
            parse_date(&self.planned_return_date),
        ) {
            if planned <= departure {
                v.override_error(
                    "planned_return_date",
                    "Return date must be after departure date",
                );
            } else if planned - departure > Duration::days(MAX_WITHDRAWAL_DAYS) {
                v.override_error(
                    "planned_return_date",
                    "Must return within 5 months of departure date",
                );
            }
        }
    }
}

impl FormRequest for I20Request {
    const KIND: FormKind = FormKind::I20Request;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();

        v.require(
            "student_type",
            &self.student_type,
            "Please select your student status",
        );
        if self.student_type == "current" {
            v.require_some(
                "selections",
                &self.selections,
                "Please select at least one option",
            );
        }

        if self.selections.is_empty() {
            return v.finish();
        }

        self.validate_identity(&mut v);
        self.validate_addresses(&mut v);
        self.validate_contact(&mut v);

        if self.selected(CHANGE_OF_LEVEL) {
            v.require("current_level", &self.current_level, "Current level is required");
            v.require("new_level", &self.new_level, "New level is required");
            if self.current_level.trim() == self.new_level.trim() {
                v.override_error("new_level", "New level must be different from current level");
            }
        }

        if self.selected(CHANGE_OF_MAJOR) {
            v.require("previous_major", &self.previous_major, "Previous major is required");
            v.require("new_major", &self.new_major, "New major is required");
        }

        if self.selected(PROGRAM_EXTENSION) {
            v.require(
                "program_ext_end_term",
                &self.program_ext_end_term,
                "Please select your desired end term",
            );
            v.require(
                "program_ext_end_year",
                &self.program_ext_end_year,
                "Please select your end year",
            );
        }

        if self.selected(DEPENDENT_CHANGE) {
            self.validate_dependents(&mut v);
        }

        if self.selected(OTHER) {
            v.require(
                "other_reason",
                &self.other_reason,
                "Please provide a reason for your Form I-20 request",
            );
        }

        if self.selected(STATUS_CHANGE) {
            v.require(
                "status_change_method",
                &self.status_change_method,
                "Please select how you will change your non-immigrant status",
            );
            v.require("status_level", &self.status_level, "Level is required");
            v.require("status_major", &self.status_major, "Major/Program is required");
            v.require("status_start_term", &self.status_start_term, "Start term is required");
            v.require("status_start_year", &self.status_start_year, "Start year is required");
        }

        if self.selected(RETURN_FROM_ABSENCE) {
            v.require("absence_level", &self.absence_level, "Level is required");
            v.require("absence_major", &self.absence_major, "Major/Program is required");
            v.require(
                "absence_start_term",
                &self.absence_start_term,
                "Start term is required",
            );
            v.require(
                "absence_start_year",
                &self.absence_start_year,
                "Start year is required",
            );
        }

        if self.selected(EARLY_WITHDRAWAL_RETURN) {
            self.validate_withdrawal_return(&mut v);
        }

        v.require_true(
            "certification_checked",
            self.certification_checked,
            "You must certify that the information is correct",
        );

        v.finish()
    }

    fn student_id(&self) -> &str {
        &self.ucf_id
    }

    fn given_name(&self) -> &str {
        &self.given_name
    }

    fn family_name(&self) -> &str {
        &self.family_name
    }

    fn program(&self) -> String {
        if self.selections.is_empty() {
            Self::KIND.program().to_string()
        } else {
            self.selections.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Value {
        json!({
            "studentType": "current",
            "selections": [CHANGE_OF_MAJOR],
            "ucfId": "1234567",
            "givenName": "Ana",
            "familyName": "Silva",
            "legalSex": "Female",
            "dateOfBirth": "2000-02-02",
            "cityOfBirth": "Lima",
            "countryOfBirth": "Peru",
            "countryOfCitizenship": "Peru",
            "hasUsAddress": true,
            "hasNonUsAddress": false,
            "usAddress": {"street": "1 Gemini Blvd", "city": "Orlando", "state": "FL", "postalCode": "32816"},
            "ucfEmail": "ana@ucf.edu",
            "personalEmail": "ana@example.com",
            "usTelephone": "407-555-0100",
            "previousMajor": "Physics",
            "newMajor": "Mathematics",
            "certificationChecked": true
        })
    }

    fn errors_for(value: Value) -> FieldErrors {
        let normalized = super::super::payload::normalize_keys(value);
        let form: I20Request = serde_json::from_value(normalized).unwrap();
        form.validate()
    }

    fn with(mut value: Value, patch: Value) -> Value {
        if let (Some(target), Value::Object(patch)) = (value.as_object_mut(), patch) {
            target.extend(patch);
        }
        value
    }

    #[test]
    fn test_valid_change_of_major() {
        assert!(errors_for(base()).is_empty());
    }

    #[test]
    fn test_student_type_required() {
        let errors = errors_for(json!({}));
        assert_eq!(
            errors.get("student_type"),
            Some("Please select your student status")
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_current_student_needs_selection() {
        let errors = errors_for(json!({"studentType": "current", "selections": []}));
        assert!(errors.contains("selections"));
    }

    #[test]
    fn test_new_student_without_selections_passes() {
        assert!(errors_for(json!({"studentType": "new"})).is_empty());
    }

    #[test]
    fn test_addresses_default_to_required() {
        let mut value = base();
        value.as_object_mut().unwrap().remove("hasNonUsAddress");
        let errors = errors_for(value);
        assert_eq!(errors.get("non_us_address.country"), Some("Country is required"));
        assert_eq!(
            errors.get("non_us_address.state"),
            Some("State/Province is required")
        );
    }

    #[test]
    fn test_email_rules() {
        let errors = errors_for(with(
            base(),
            json!({"ucfEmail": "ana@knights.ucf.edu", "personalEmail": "nope"}),
        ));
        assert_eq!(errors.get("ucf_email"), Some("Must be a valid UCF email address"));
        assert_eq!(errors.get("personal_email"), Some("Must be a valid email address"));
    }

    #[test]
    fn test_one_phone_required() {
        let errors = errors_for(with(base(), json!({"usTelephone": ""})));
        assert!(errors.contains("us_telephone"));
        assert!(errors.contains("non_us_telephone"));

        let errors = errors_for(with(
            base(),
            json!({"usTelephone": "", "nonUsTelephone": "+51 1 555 0100"}),
        ));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_level_must_change() {
        let errors = errors_for(with(
            base(),
            json!({"selections": [CHANGE_OF_LEVEL], "currentLevel": "Graduate", "newLevel": "Graduate"}),
        ));
        assert_eq!(
            errors.get("new_level"),
            Some("New level must be different from current level")
        );
    }

    #[test]
    fn test_other_reason_required() {
        let errors = errors_for(with(base(), json!({"selections": [OTHER]})));
        assert!(errors.contains("other_reason"));
    }

    #[test]
    fn test_dependents_validated_when_adding() {
        let errors = errors_for(with(
            base(),
            json!({
                "selections": [DEPENDENT_CHANGE],
                "dependentAction": "add",
                "dependents": [
                    {"relationship": "Spouse", "givenName": "Luis", "familyName": "Silva",
                     "legalSex": "Male", "dateOfBirth": "1999-01-01", "cityOfBirth": "Lima",
                     "countryOfBirth": "Peru", "countryOfCitizenship": "Peru", "passport": "luis.pdf"},
                    {"relationship": "Child"}
                ]
            }),
        ));
        assert!(!errors.contains("dependents[0].given_name"));
        assert!(!errors.contains("dependents[0].passport"));
        assert_eq!(
            errors.get("dependents[1].given_name"),
            Some("Given name is required")
        );
        assert_eq!(
            errors.get("dependents[1].passport"),
            Some("Passport copy is required")
        );
    }

    #[test]
    fn test_dependent_passport_from_file_part() {
        let errors = errors_for(with(
            base(),
            json!({
                "selections": [DEPENDENT_CHANGE],
                "dependentAction": "add",
                "dependents": [
                    {"relationship": "Spouse", "givenName": "Luis", "familyName": "Silva",
                     "legalSex": "Male", "dateOfBirth": "1999-01-01", "cityOfBirth": "Lima",
                     "countryOfBirth": "Peru", "countryOfCitizenship": "Peru"}
                ],
                "dependent_passport_0": "luis.pdf"
            }),
        ));
        assert!(errors.is_empty(), "{errors}");
    }

    #[test]
    fn test_removing_dependents_skips_details() {
        let errors = errors_for(with(
            base(),
            json!({"selections": [DEPENDENT_CHANGE], "dependentAction": "remove", "dependents": [{}]}),
        ));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_withdrawal_return_window() {
        let trip = |departure: &str, planned: &str| {
            errors_for(with(
                base(),
                json!({
                    "selections": [EARLY_WITHDRAWAL_RETURN],
                    "departureDate": departure,
                    "plannedReturnDate": planned,
                    "departureItinerary": "out.pdf",
                    "returnItinerary": "back.pdf"
                }),
            ))
        };

        assert!(trip("2025-01-01", "2025-05-31").is_empty());
        assert_eq!(
            trip("2025-01-01", "2025-06-01").get("planned_return_date"),
            Some("Must return within 5 months of departure date")
        );
        assert_eq!(
            trip("2025-01-01", "2025-01-01").get("planned_return_date"),
            Some("Return date must be after departure date")
        );
    }

    #[test]
    fn test_withdrawal_return_needs_itineraries() {
        let errors = errors_for(with(base(), json!({"selections": [EARLY_WITHDRAWAL_RETURN]})));
        assert!(errors.contains("departure_itinerary"));
        assert!(errors.contains("return_itinerary"));
        assert!(errors.contains("departure_date"));
    }

    #[test]
    fn test_certification_required() {
        let errors = errors_for(with(base(), json!({"certificationChecked": "false"})));
        assert!(errors.contains("certification_checked"));
    }

    #[test]
    fn test_program_joins_selections() {
        let form: I20Request = serde_json::from_value(json!({
            "selections": [CHANGE_OF_MAJOR, OTHER]
        }))
        .unwrap();
        assert_eq!(form.program(), "Change of Major, Other");

        let empty = I20Request::default();
        assert_eq!(empty.program(), "I-20 Request");
    }

    #[test]
    fn test_dependent_passport_index() {
        assert_eq!(dependent_passport_index("dependent_passport_2"), Some(2));
        assert_eq!(dependent_passport_index("dependent_passport_"), None);
        assert_eq!(dependent_passport_index("passport"), None);
    }
}
