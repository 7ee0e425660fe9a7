//! Record and document forms: administrative changes, document requests,
//! statutory disclosures, and third-party records release.

use serde::Deserialize;

use super::payload::{flexible_bool, flexible_string, free_text, opt_flexible_bool, string_list};
use super::validate::{FieldErrors, Validator};
use super::{FormKind, FormRequest};

/// Administrative record change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdministrativeRecord {
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// SEVIS ID.
    #[serde(deserialize_with = "flexible_string")]
    pub sevis_id: String,
    /// Date of the request.
    pub date: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Student email.
    pub student_email: String,
    /// Preferred phone.
    #[serde(deserialize_with = "flexible_string")]
    pub preferred_phone: String,
    /// Current program.
    pub current_program: String,
    /// Visa type.
    pub visa_type: String,
    /// Visa status.
    pub visa_status: String,
    /// Answer to "is your visa information correct?".
    #[serde(deserialize_with = "opt_flexible_bool")]
    pub visa_info_correct: Option<bool>,
    /// Selected actions, e.g. `Late Drop`.
    #[serde(deserialize_with = "string_list")]
    pub action_requested: Vec<String>,
    /// Certifies the information is accurate.
    #[serde(deserialize_with = "flexible_bool")]
    pub certification_checked: bool,
}

impl FormRequest for AdministrativeRecord {
    const KIND: FormKind = FormKind::AdministrativeRecord;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("sevis_id", &self.sevis_id, "SEVIS ID is required");
        v.require("date", &self.date, "Date is required");
        v.require("first_name", &self.first_name, "First name is required");
        v.require("last_name", &self.last_name, "Last name is required");
        v.ucf_email(
            "student_email",
            &self.student_email,
            "Student email is required",
            "Must be a valid UCF email address",
        );
        v.require("preferred_phone", &self.preferred_phone, "Phone number is required");
        v.require("current_program", &self.current_program, "Current program is required");
        v.require_answer(
            "visa_info_correct",
            self.visa_info_correct,
            "Please confirm if your visa information is correct",
        );
        v.require_some(
            "action_requested",
            &self.action_requested,
            "Please select at least one action",
        );
        v.require_true(
            "certification_checked",
            self.certification_checked,
            "You must certify that the information provided is accurate",
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

/// Enrollment or status document request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentRequest {
    /// Request ID.
    #[serde(deserialize_with = "flexible_string")]
    pub request_id: String,
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
    /// Date of birth.
    pub date_of_birth: String,
    /// Gender.
    pub gender: String,
    /// Document for students in a UCF Global program.
    pub global_student_document: String,
    /// Document for undergraduate students.
    pub undergrad_document: String,
    /// Delivery format.
    pub format: String,
    /// Additional information.
    #[serde(deserialize_with = "free_text")]
    pub additional_info: String,
}

impl FormRequest for DocumentRequest {
    const KIND: FormKind = FormKind::DocumentRequest;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("first_name", &self.first_name, "First Name is required");
        v.require("last_name", &self.last_name, "Last Name is required");
        if v.require("email", &self.email, "Email is required") {
            v.email_format("email", &self.email);
        }
        v.require_any(
            &[
                ("global_student_document", &self.global_student_document),
                ("undergrad_document", &self.undergrad_document),
            ],
            "Please select at least one document type",
        );
        v.require("format", &self.format, "Please select a delivery format");
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

/// Florida Statute 1010.35 disclosure for foreign researchers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FloridaStatute {
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Date of birth.
    pub date_of_birth: String,
    /// Telephone number.
    #[serde(deserialize_with = "flexible_string")]
    pub telephone_number: String,
    /// Email.
    pub email: String,
    /// SEVIS number.
    #[serde(deserialize_with = "flexible_string")]
    pub sevis_number: String,
    /// College.
    pub college: String,
    /// Department.
    pub department: String,
    /// Position.
    pub position: String,
    /// `yes` / `no`.
    #[serde(deserialize_with = "opt_flexible_bool")]
    pub has_passport: Option<bool>,
    /// `yes` / `no`.
    #[serde(deserialize_with = "opt_flexible_bool")]
    pub has_ds160: Option<bool>,
}

impl FormRequest for FloridaStatute {
    const KIND: FormKind = FormKind::FloridaStatute101035;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("given_name", &self.given_name, "Given name is required");
        v.require("family_name", &self.family_name, "Family name is required");
        v.require("date_of_birth", &self.date_of_birth, "Date of birth is required");
        v.require(
            "telephone_number",
            &self.telephone_number,
            "Telephone number is required",
        );
        v.email("email", &self.email, "Email is required", "Must be a valid email address");
        v.require("college", &self.college, "College is required");
        v.require("department", &self.department, "Department is required");
        v.require("position", &self.position, "Position is required");
        v.require_answer(
            "has_passport",
            self.has_passport,
            "Please indicate whether you have a passport",
        );
        v.require_answer(
            "has_ds160",
            self.has_ds160,
            "Please indicate whether you have a DS-160",
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

/// Consent to release UCF Global records to a third party.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecordsRelease {
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// UCF email.
    pub ucf_email: String,
    /// Personal email.
    pub personal_email: String,
    /// Records to release.
    #[serde(deserialize_with = "string_list")]
    pub records_to_release: Vec<String>,
    /// Release recipient.
    pub release_recipient: String,
    /// Authorizes the release.
    #[serde(deserialize_with = "flexible_bool")]
    pub authorization: bool,
    /// Signature.
    pub signature: String,
}

impl FormRequest for RecordsRelease {
    const KIND: FormKind = FormKind::RecordsRelease;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("first_name", &self.first_name, "First Name is required");
        v.require("last_name", &self.last_name, "Last Name is required");
        v.ucf_email(
            "ucf_email",
            &self.ucf_email,
            "UCF Email is required",
            "Must be a valid UCF email address",
        );
        v.email_format("personal_email", &self.personal_email);
        v.require_some(
            "records_to_release",
            &self.records_to_release,
            "Please select at least one record type to release",
        );
        v.require("release_recipient", &self.release_recipient, "Please select a recipient");
        v.require_true(
            "authorization",
            self.authorization,
            "Please authorize the record release",
        );
        v.require("signature", &self.signature, "Please provide your signature");
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
    use serde_json::{json, Value};

    fn parse<F: FormRequest>(value: Value) -> F {
        serde_json::from_value(normalize_keys(value)).unwrap()
    }

    #[test]
    fn test_admin_record_valid() {
        let form: AdministrativeRecord = parse(json!({
            "ucfId": "1234567",
            "sevisId": "N0001112223",
            "date": "2025-02-01",
            "firstName": "Omar",
            "lastName": "Haddad",
            "studentEmail": "omar@ucf.edu",
            "preferredPhone": 4_075_550_100_i64,
            "currentProgram": "MS Computer Science",
            "visaInfoCorrect": "no",
            "actionRequested": ["Late Drop"],
            "certificationChecked": true
        }));
        assert!(form.validate().is_empty(), "{}", form.validate());
        assert_eq!(form.visa_info_correct, Some(false));
    }

    #[test]
    fn test_admin_record_requires_answers() {
        let errors = parse::<AdministrativeRecord>(json!({
            "studentEmail": "omar@gmail.com",
            "visaInfoCorrect": "",
            "actionRequested": []
        }))
        .validate();
        assert_eq!(
            errors.get("visa_info_correct"),
            Some("Please confirm if your visa information is correct")
        );
        assert_eq!(
            errors.get("action_requested"),
            Some("Please select at least one action")
        );
        assert_eq!(
            errors.get("student_email"),
            Some("Must be a valid UCF email address")
        );
    }

    #[test]
    fn test_document_request_needs_a_document() {
        let base = json!({
            "ucfId": "1",
            "firstName": "Lea",
            "lastName": "Roux",
            "email": "lea@example.com",
            "format": "PDF"
        });
        let errors = parse::<DocumentRequest>(base.clone()).validate();
        assert!(errors.contains("global_student_document"));
        assert!(errors.contains("undergrad_document"));

        let mut with_doc = base;
        with_doc["undergradDocument"] = json!("Enrollment Verification");
        assert!(parse::<DocumentRequest>(with_doc).validate().is_empty());
    }

    #[test]
    fn test_document_request_email_format() {
        let errors = parse::<DocumentRequest>(json!({"email": "lea"})).validate();
        assert_eq!(errors.get("email"), Some("Please enter a valid email address"));
        assert_eq!(errors.get("format"), Some("Please select a delivery format"));
    }

    #[test]
    fn test_florida_statute_yes_no_answers() {
        let mut value = json!({
            "ucfId": "1",
            "givenName": "Wei",
            "familyName": "Zhang",
            "dateOfBirth": "1990-10-10",
            "telephoneNumber": "407-555-0100",
            "email": "wei@example.org",
            "college": "Engineering",
            "department": "ECE",
            "position": "Postdoc",
            "hasPassport": "yes",
            "hasDs160": "no"
        });
        assert!(parse::<FloridaStatute>(value.clone()).validate().is_empty());

        value["hasDs160"] = json!("");
        let errors = parse::<FloridaStatute>(value).validate();
        assert!(errors.contains("has_ds160"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_records_release_messages() {
        let errors = parse::<RecordsRelease>(json!({})).validate();
        assert_eq!(errors.get("first_name"), Some("First Name is required"));
        assert_eq!(errors.get("ucf_email"), Some("UCF Email is required"));
        assert_eq!(
            errors.get("records_to_release"),
            Some("Please select at least one record type to release")
        );
        assert_eq!(
            errors.get("authorization"),
            Some("Please authorize the record release")
        );
        assert_eq!(errors.get("signature"), Some("Please provide your signature"));
    }

    #[test]
    fn test_records_release_list_from_multipart_text() {
        let form: RecordsRelease = parse(json!({"recordsToRelease": "[\"Transcript\",\"I-20\"]"}));
        assert_eq!(form.records_to_release, vec!["Transcript", "I-20"]);
    }
}
