//! Program applications: conversation partners, English language volunteers,
//! off campus housing, and the pathway program forms.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::payload::{flexible_bool, flexible_string, free_text, str_to_bool};
use super::validate::{FieldErrors, Validator};
use super::{FormKind, FormRequest};

const AGREE: &str = "You must agree to this statement";

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => str_to_bool(s),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

/// Conversation partner volunteer application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConversationPartner {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// Email.
    pub email: String,
    /// Phone.
    #[serde(deserialize_with = "flexible_string")]
    pub phone: String,
    /// Academic level.
    pub academic_level: String,
    /// Major.
    pub major: String,
    /// Minor.
    pub minor: String,
    /// Legal sex.
    pub legal_sex: String,
    /// `yes` / `no`: speaks a foreign language.
    #[serde(deserialize_with = "flexible_string")]
    pub speaks_foreign_language: String,
    /// `yes` / `no`: open to a partner of the opposite sex.
    #[serde(deserialize_with = "flexible_string")]
    pub opposite_sex_partner: String,
    /// `yes` / `no`: willing to take several partners.
    #[serde(deserialize_with = "flexible_string")]
    pub multiple_partners: String,
    /// `yes` / `no`: needs hours signed off for a class.
    #[serde(deserialize_with = "flexible_string")]
    pub sign_off_needed: String,
    /// `yes` / `no`: commits to the full semester.
    #[serde(deserialize_with = "flexible_string")]
    pub semester_commitment: String,
    /// Agrees to the program expectations.
    #[serde(deserialize_with = "flexible_bool")]
    pub agree_to_expectations: bool,
    /// Consents to sharing the email with the partner.
    #[serde(deserialize_with = "flexible_bool")]
    pub consent_to_share_email: bool,
}

impl FormRequest for ConversationPartner {
    const KIND: FormKind = FormKind::ConversationPartner;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("first_name", &self.first_name, "First name is required");
        v.require("last_name", &self.last_name, "Last name is required");
        v.email("email", &self.email, "Email is required", "Must be a valid email address");
        v.require("academic_level", &self.academic_level, "Academic level is required");
        v.require_true(
            "agree_to_expectations",
            self.agree_to_expectations,
            "You must agree to the program expectations",
        );
        v.finish()
    }

    fn student_id(&self) -> &str {
        &self.ucf_id
    }

    fn given_name(&self) -> &str {
        &self.first_name
    }

    fn family_name(&self) -> &str {
        &self.last_name
    }
}

/// Volunteer positions offered by the English language program.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VolunteerPositions {
    /// Intensive English program box.
    #[serde(deserialize_with = "flexible_bool")]
    pub intensive_english: bool,
    /// Online English program box.
    #[serde(deserialize_with = "flexible_bool")]
    pub online_english: bool,
}

/// English language program volunteer form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnglishLanguageVolunteer {
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// UCF email.
    pub ucf_email: String,
    /// Academic level.
    pub academic_level: String,
    /// Course name.
    pub course_name: String,
    /// Course instructor.
    pub course_instructor: String,
    /// College.
    pub college: String,
    /// Term.
    pub term: String,
    /// Volunteer positions applied for.
    pub positions: VolunteerPositions,
    /// Hours per week.
    #[serde(deserialize_with = "flexible_string")]
    pub hours_per_week: String,
    /// Day → time slot → available. Stored as sent.
    pub availability: BTreeMap<String, Value>,
    /// Free-text remarks.
    #[serde(deserialize_with = "free_text")]
    pub remarks: String,
}

impl FormRequest for EnglishLanguageVolunteer {
    const KIND: FormKind = FormKind::EnglishLanguageVolunteer;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("first_name", &self.first_name, "First name is required");
        v.require("last_name", &self.last_name, "Last name is required");
        v.ucf_email(
            "ucf_email",
            &self.ucf_email,
            "UCF email is required",
            "Must be a valid UCF email address",
        );
        v.require("academic_level", &self.academic_level, "Academic level is required");
        if !self.positions.intensive_english && !self.positions.online_english {
            v.error("positions", "Please select at least one position");
        }
        v.number_at_least(
            "hours_per_week",
            &self.hours_per_week,
            0.0,
            "Hours per week must be a non-negative number",
        );
        v.finish()
    }

    fn student_id(&self) -> &str {
        &self.ucf_id
    }

    fn given_name(&self) -> &str {
        &self.first_name
    }

    fn family_name(&self) -> &str {
        &self.last_name
    }
}

/// Off campus housing application.
///
/// The payload's `program` key is the applicant's academic level, not the
/// stored program label.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OffCampusHousing {
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Date of birth.
    pub date_of_birth: String,
    /// Gender.
    pub gender: String,
    /// Email address.
    pub email_address: String,
    /// Academic level of the applicant.
    pub program: String,
    /// Term key (e.g. `spring2026_session2`) → selected.
    pub housing_selections: BTreeMap<String, Value>,
    /// Acknowledges the housing terms.
    #[serde(deserialize_with = "flexible_bool")]
    pub acknowledgement: bool,
    /// Payment status.
    pub payment_status: String,
}

impl OffCampusHousing {
    /// Term keys the applicant selected.
    #[must_use]
    pub fn selected_terms(&self) -> Vec<&str> {
        self.housing_selections
            .iter()
            .filter(|(_, selected)| truthy(selected))
            .map(|(term, _)| term.as_str())
            .collect()
    }
}

impl FormRequest for OffCampusHousing {
    const KIND: FormKind = FormKind::OffCampusHousing;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("first_name", &self.first_name, "First name is required");
        v.require("last_name", &self.last_name, "Last name is required");
        v.email(
            "email_address",
            &self.email_address,
            "Email address is required",
            "Must be a valid email address",
        );
        v.require_some(
            "housing_selections",
            &self.selected_terms(),
            "Please select at least one housing term",
        );
        v.require_true(
            "acknowledgement",
            self.acknowledgement,
            "You must acknowledge the housing terms",
        );
        v.finish()
    }

    fn student_id(&self) -> &str {
        &self.ucf_id
    }

    fn given_name(&self) -> &str {
        &self.first_name
    }

    fn family_name(&self) -> &str {
        &self.last_name
    }
}

/// Pathway programs intent to progress.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathwayIntentToProgress {
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Date of birth.
    pub date_of_birth: String,
    /// UCF Global program.
    pub ucf_global_program: String,
    /// Expected progression term.
    pub expected_progression_term: String,
    /// Academic credits earned.
    #[serde(deserialize_with = "flexible_string")]
    pub academic_credits_earned: String,
    /// Intended major.
    pub intended_major: String,
    /// SAT total score.
    #[serde(deserialize_with = "flexible_string")]
    pub sat_total_score: String,
    /// ACT total score.
    #[serde(deserialize_with = "flexible_string")]
    pub act_total_score: String,
    /// Certification box.
    #[serde(deserialize_with = "flexible_bool")]
    pub certification: bool,
}

impl FormRequest for PathwayIntentToProgress {
    const KIND: FormKind = FormKind::PathwayIntentToProgress;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("given_name", &self.given_name, "Given name is required");
        v.require("family_name", &self.family_name, "Family name is required");
        v.require(
            "ucf_global_program",
            &self.ucf_global_program,
            "UCF Global program is required",
        );
        v.require(
            "expected_progression_term",
            &self.expected_progression_term,
            "Expected progression term is required",
        );
        v.require("intended_major", &self.intended_major, "Intended major is required");
        for (field, value) in [
            ("academic_credits_earned", &self.academic_credits_earned),
            ("sat_total_score", &self.sat_total_score),
            ("act_total_score", &self.act_total_score),
        ] {
            v.number_at_least(field, value, 0.0, "Must be a non-negative number");
        }
        v.require_true(
            "certification",
            self.certification,
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
}

/// Pathway programs next steps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathwayNextSteps {
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email.
    pub email: String,
    /// Phone number.
    #[serde(deserialize_with = "flexible_string")]
    pub phone_number: String,
    /// Academic program.
    pub academic_program: String,
    /// Academic track.
    pub academic_track: String,
    /// Intended major.
    pub intended_major: String,
    /// Dietary requirements.
    pub dietary_requirements: String,
    /// Housing selection.
    pub housing_selection: String,
    /// Program acknowledgement box.
    #[serde(deserialize_with = "flexible_bool")]
    pub program_acknowledgement: bool,
    /// Acknowledges the housing terms.
    #[serde(deserialize_with = "flexible_bool")]
    pub housing_acknowledgement: bool,
    /// Health insurance acknowledgement box.
    #[serde(deserialize_with = "flexible_bool")]
    pub health_insurance_acknowledgement: bool,
}

impl FormRequest for PathwayNextSteps {
    const KIND: FormKind = FormKind::PathwayNextSteps;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("first_name", &self.first_name, "First name is required");
        v.require("last_name", &self.last_name, "Last name is required");
        v.email("email", &self.email, "Email is required", "Must be a valid email address");
        v.require(
            "academic_program",
            &self.academic_program,
            "Academic program is required",
        );
        v.require(
            "housing_selection",
            &self.housing_selection,
            "Please select a housing option",
        );
        v.require_true("program_acknowledgement", self.program_acknowledgement, AGREE);
        v.require_true("housing_acknowledgement", self.housing_acknowledgement, AGREE);
        v.require_true(
            "health_insurance_acknowledgement",
            self.health_insurance_acknowledgement,
            AGREE,
        );
        v.finish()
    }

    fn student_id(&self) -> &str {
        &self.ucf_id
    }

    fn given_name(&self) -> &str {
        &self.first_name
    }

    fn family_name(&self) -> &str {
        &self.last_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::payload::normalize_keys;
    use serde_json::json;

    fn parse<F: FormRequest>(value: Value) -> F {
        serde_json::from_value(normalize_keys(value)).unwrap()
    }

    #[test]
    fn test_conversation_partner() {
        let form: ConversationPartner = parse(json!({
            "firstName": "Ivy",
            "lastName": "Chen",
            "ucfId": "1",
            "email": "ivy@example.com",
            "academicLevel": "Undergraduate",
            "speaksForeignLanguage": "yes",
            "agreeToExpectations": true
        }));
        assert!(form.validate().is_empty());

        let errors = parse::<ConversationPartner>(json!({"email": "ivy"})).validate();
        assert_eq!(errors.get("email"), Some("Must be a valid email address"));
        assert!(errors.contains("agree_to_expectations"));
    }

    #[test]
    fn test_volunteer_needs_a_position() {
        let mut value = json!({
            "ucfId": "1",
            "firstName": "Sam",
            "lastName": "Lee",
            "ucfEmail": "sam@ucf.edu",
            "academicLevel": "Graduate",
            "positions": {"intensiveEnglish": false, "onlineEnglish": false},
            "availability": {"monday": {"morning": true, "afternoon": false}}
        });
        let errors = parse::<EnglishLanguageVolunteer>(value.clone()).validate();
        assert_eq!(errors.get("positions"), Some("Please select at least one position"));
        assert_eq!(errors.len(), 1);

        value["positions"]["onlineEnglish"] = json!("true");
        let form: EnglishLanguageVolunteer = parse(value);
        assert!(form.validate().is_empty());
        assert_eq!(form.availability["monday"]["morning"], json!(true));
    }

    #[test]
    fn test_housing_selected_terms() {
        let form: OffCampusHousing = parse(json!({
            "ucfId": "1",
            "firstName": "Ana",
            "lastName": "Lopez",
            "emailAddress": "ana@example.com",
            "program": "graduate",
            "housingSelections": {"spring2026": true, "spring2026_session2": "false", "summer2026": "yes"},
            "acknowledgement": true
        }));
        assert_eq!(form.selected_terms(), vec!["spring2026", "summer2026"]);
        assert!(form.validate().is_empty());
        assert_eq!(form.program(), "Off Campus Housing Application");
    }

    #[test]
    fn test_housing_requires_a_term() {
        let errors = parse::<OffCampusHousing>(json!({
            "housingSelections": {"spring2026": false}
        }))
        .validate();
        assert_eq!(
            errors.get("housing_selections"),
            Some("Please select at least one housing term")
        );
        assert!(errors.contains("acknowledgement"));
    }

    #[test]
    fn test_pathway_intent_scores() {
        let mut value = json!({
            "ucfId": "1",
            "givenName": "Tariq",
            "familyName": "Aziz",
            "ucfGlobalProgram": "Pathway",
            "expectedProgressionTerm": "Fall 2026",
            "intendedMajor": "Biology",
            "satTotalScore": "thirteen hundred",
            "certification": true
        });
        let errors = parse::<PathwayIntentToProgress>(value.clone()).validate();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("sat_total_score"));

        value["satTotalScore"] = json!(1300);
        assert!(parse::<PathwayIntentToProgress>(value).validate().is_empty());
    }

    #[test]
    fn test_pathway_next_steps_acknowledgements() {
        let errors = parse::<PathwayNextSteps>(json!({
            "ucfId": "1",
            "firstName": "A",
            "lastName": "B",
            "email": "a@example.com",
            "academicProgram": "Pathway",
            "housingSelection": "On campus",
            "programAcknowledgement": true
        }))
        .validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains("health_insurance_acknowledgement"));
    }
}
