//! Work authorization forms: academic training, OPT, and the STEM extension.

use serde::Deserialize;

use super::payload::{flexible_bool, flexible_string, free_text};
use super::validate::{FieldErrors, Validator};
use super::{FormKind, FormRequest};

const AGREE: &str = "You must agree to this statement";

fn yes() -> bool {
    true
}

/// Academic training authorization (J-1).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AcademicTraining {
    /// `pre` or `post`.
    pub completion_type: String,
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// SEVIS ID.
    #[serde(deserialize_with = "flexible_string")]
    pub sevis_id: String,
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
    /// Country of legal residence.
    pub country_of_legal_residence: String,

    /// Whether the student has a US address on file.
    #[serde(default = "yes", deserialize_with = "flexible_bool")]
    pub has_us_address: bool,
    /// Street address.
    pub street_address: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Country.
    pub country: String,
    /// US telephone.
    #[serde(deserialize_with = "flexible_string")]
    pub us_telephone: String,
    /// Non-US telephone.
    #[serde(deserialize_with = "flexible_string")]
    pub non_us_telephone: String,

    /// Academic training start date.
    pub academic_training_start_date: String,
    /// Academic training end date.
    pub academic_training_end_date: String,

    /// Acknowledges the pre-completion rules.
    #[serde(deserialize_with = "flexible_bool")]
    pub understand_pre_completion: bool,
    /// Acknowledges the post-completion rules.
    #[serde(deserialize_with = "flexible_bool")]
    pub understand_post_completion: bool,
    /// Acknowledges the medical insurance requirement.
    #[serde(deserialize_with = "flexible_bool")]
    pub understand_medical_insurance: bool,
    /// Acknowledges that the authorization is employer specific.
    #[serde(deserialize_with = "flexible_bool")]
    pub understand_employer_specific: bool,
    /// Agrees to consult an advisor before changes.
    #[serde(deserialize_with = "flexible_bool")]
    pub understand_consult_advisor: bool,

    /// Free-text comments.
    #[serde(deserialize_with = "free_text")]
    pub comments: String,
    /// Certifies the information is accurate.
    #[serde(deserialize_with = "flexible_bool")]
    pub certify_information: bool,
}

impl FormRequest for AcademicTraining {
    const KIND: FormKind = FormKind::AcademicTraining;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();

        if !matches!(self.completion_type.as_str(), "pre" | "post") {
            v.error("completion_type", "Please select pre- or post-completion");
        }

        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("sevis_id", &self.sevis_id, "SEVIS ID is required");
        v.require("given_name", &self.given_name, "Given name is required");
        v.require("family_name", &self.family_name, "Family name is required");
        v.require("legal_sex", &self.legal_sex, "Legal sex is required");
        v.require("date_of_birth", &self.date_of_birth, "Date of birth is required");
        v.require("city_of_birth", &self.city_of_birth, "City of birth is required");
        v.require("country_of_birth", &self.country_of_birth, "Country of birth is required");
        v.require(
            "country_of_citizenship",
            &self.country_of_citizenship,
            "Country of citizenship is required",
        );
        v.require(
            "country_of_legal_residence",
            &self.country_of_legal_residence,
            "Country of legal permanent residence is required",
        );

        if self.has_us_address {
            v.require("street_address", &self.street_address, "Street address is required");
            v.require("city", &self.city, "City is required");
            v.require("state", &self.state, "State is required");
            v.require("country", &self.country, "Country is required");
        }

        v.require_any(
            &[
                ("us_telephone", &self.us_telephone),
                ("non_us_telephone", &self.non_us_telephone),
            ],
            "At least one telephone number is required",
        );

        let start = v.date(
            "academic_training_start_date",
            &self.academic_training_start_date,
            "Academic training start date is required",
        );
        let end = v.date(
            "academic_training_end_date",
            &self.academic_training_end_date,
            "Academic training end date is required",
        );
        v.date_after(
            "academic_training_end_date",
            start,
            end,
            "End date must be after start date",
        );

        match self.completion_type.as_str() {
            "pre" => {
                v.require_true("understand_pre_completion", self.understand_pre_completion, AGREE);
            }
            "post" => {
                v.require_true(
                    "understand_post_completion",
                    self.understand_post_completion,
                    AGREE,
                );
            }
            _ => {}
        }
        v.require_true(
            "understand_medical_insurance",
            self.understand_medical_insurance,
            AGREE,
        );
        v.require_true(
            "understand_employer_specific",
            self.understand_employer_specific,
            AGREE,
        );
        v.require_true("understand_consult_advisor", self.understand_consult_advisor, AGREE);
        v.require_true(
            "certify_information",
            self.certify_information,
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

/// Post-completion OPT request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OptRequest {
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Academic level.
    pub academic_level: String,
    /// Academic program.
    pub academic_program: String,
    /// Semester of graduation.
    pub semester_of_graduation: String,
    /// Desired OPT start date.
    pub desired_opt_start_date: String,
    /// Desired OPT end date.
    pub desired_opt_end_date: String,

    /// Confirms the information is correct.
    #[serde(deserialize_with = "flexible_bool")]
    pub information_correct: bool,
    /// Confirms the OPT workshop was completed.
    #[serde(deserialize_with = "flexible_bool")]
    pub opt_workshop_completed: bool,
    /// Acknowledges the OPT request timeline.
    #[serde(deserialize_with = "flexible_bool")]
    pub opt_request_timeline: bool,
    /// Agrees to provide a copy of the EAD card.
    #[serde(deserialize_with = "flexible_bool")]
    pub ead_card_copy: bool,
    /// Agrees to report changes.
    #[serde(deserialize_with = "flexible_bool")]
    pub report_changes: bool,
    /// Acknowledges the unemployment limit.
    #[serde(deserialize_with = "flexible_bool")]
    pub unemployment_limit: bool,
    /// Acknowledges the employment start date rules.
    #[serde(deserialize_with = "flexible_bool")]
    pub employment_start_date: bool,
}

impl FormRequest for OptRequest {
    const KIND: FormKind = FormKind::OptRequest;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");

        let checks = [
            (
                "information_correct",
                self.information_correct,
                "Please confirm that your information is correct and up to date.",
            ),
            (
                "opt_workshop_completed",
                self.opt_workshop_completed,
                "You must certify completion of the UCF Global OPT Workshop.",
            ),
            (
                "opt_request_timeline",
                self.opt_request_timeline,
                "You must understand the OPT Request timeline requirements.",
            ),
            (
                "ead_card_copy",
                self.ead_card_copy,
                "You must agree to provide a copy of your EAD card.",
            ),
            (
                "report_changes",
                self.report_changes,
                "You must agree to report changes to UCF Global.",
            ),
            (
                "unemployment_limit",
                self.unemployment_limit,
                "You must understand the unemployment limit requirements.",
            ),
            (
                "employment_start_date",
                self.employment_start_date,
                "You must understand the employment start date requirements.",
            ),
        ];
        for (field, flag, message) in checks {
            v.require_true(field, flag, message);
        }

        let start = super::validate::parse_date(&self.desired_opt_start_date);
        let end = super::validate::parse_date(&self.desired_opt_end_date);
        v.date_after(
            "desired_opt_end_date",
            start,
            end,
            "End date must be after start date",
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

/// OPT / STEM extension reporting (address and employment changes).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OptStemReport {
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// SEVIS ID.
    #[serde(deserialize_with = "flexible_string")]
    pub sevis_id: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Street address.
    pub street_address: String,
    /// Apartment number.
    #[serde(deserialize_with = "flexible_string")]
    pub apartment_number: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Postal code.
    #[serde(deserialize_with = "flexible_string")]
    pub postal_code: String,
    /// UCF email address.
    pub ucf_email_address: String,
    /// Secondary email address.
    pub secondary_email_address: String,
    /// US telephone number.
    #[serde(deserialize_with = "flexible_string")]
    pub us_telephone_number: String,
    /// Reporting under standard OPT.
    #[serde(deserialize_with = "flexible_bool")]
    pub standard_opt: bool,
    /// Reporting under the STEM extension.
    #[serde(deserialize_with = "flexible_bool")]
    pub stem_extension: bool,
}

impl FormRequest for OptStemReport {
    const KIND: FormKind = FormKind::OptStemReport;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("sevis_id", &self.sevis_id, "SEVIS ID is required");
        v.require("given_name", &self.given_name, "Given name is required");
        v.require("family_name", &self.family_name, "Family name is required");
        v.ucf_email(
            "ucf_email_address",
            &self.ucf_email_address,
            "UCF email is required",
            "Must be a valid UCF email address",
        );
        v.email_format("secondary_email_address", &self.secondary_email_address);
        if !self.standard_opt && !self.stem_extension {
            v.error("standard_opt", "Please select standard OPT or STEM extension");
            v.error("stem_extension", "Please select standard OPT or STEM extension");
        }
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

/// OPT STEM extension application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OptStemApplication {
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Date of birth.
    pub date_of_birth: String,
    /// Gender.
    pub gender: String,
    /// Country of citizenship.
    pub country_of_citizenship: String,
    /// Academic level.
    pub academic_level: String,
    /// Academic program.
    pub academic_program: String,
    /// UCF email address.
    pub ucf_email_address: String,

    /// Job title.
    pub job_title: String,
    /// Employer name.
    pub employer_name: String,
    /// Employer EIN.
    #[serde(deserialize_with = "flexible_string")]
    pub employer_ein: String,
    /// Supervisor email.
    pub supervisor_email: String,
    /// Hours per week.
    #[serde(deserialize_with = "flexible_string")]
    pub hours_per_week: String,

    /// Confirms the STEM OPT workshop was completed.
    #[serde(deserialize_with = "flexible_bool")]
    pub completed_stem_workshop: bool,
    /// Agrees to provide a copy of the EAD card.
    #[serde(deserialize_with = "flexible_bool")]
    pub provide_ead_copy: bool,
    /// Acknowledges the unemployment limits.
    #[serde(deserialize_with = "flexible_bool")]
    pub understand_unemployment_limits: bool,
    /// Agrees to notify UCF Global of changes.
    #[serde(deserialize_with = "flexible_bool")]
    pub notify_changes: bool,
    /// Agrees to submit an updated I-983.
    #[serde(deserialize_with = "flexible_bool")]
    pub submit_updated_i983: bool,
    /// Agrees to comply with the reporting requirements.
    #[serde(deserialize_with = "flexible_bool")]
    pub comply_reporting_requirements: bool,
    /// Confirms the photo requirements were reviewed.
    #[serde(deserialize_with = "flexible_bool")]
    pub reviewed_photo_requirements: bool,
    /// Confirms the fee payment instructions were reviewed.
    #[serde(deserialize_with = "flexible_bool")]
    pub reviewed_fee_payment: bool,
}

impl OptStemApplication {
    fn acknowledgements(&self) -> [(&'static str, bool); 8] {
        [
            ("completed_stem_workshop", self.completed_stem_workshop),
            ("provide_ead_copy", self.provide_ead_copy),
            ("understand_unemployment_limits", self.understand_unemployment_limits),
            ("notify_changes", self.notify_changes),
            ("submit_updated_i983", self.submit_updated_i983),
            ("comply_reporting_requirements", self.comply_reporting_requirements),
            ("reviewed_photo_requirements", self.reviewed_photo_requirements),
            ("reviewed_fee_payment", self.reviewed_fee_payment),
        ]
    }
}

impl FormRequest for OptStemApplication {
    const KIND: FormKind = FormKind::OptStemApplication;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("given_name", &self.given_name, "Given name is required");
        v.require("family_name", &self.family_name, "Family name is required");
        v.require("date_of_birth", &self.date_of_birth, "Date of birth is required");
        v.require(
            "country_of_citizenship",
            &self.country_of_citizenship,
            "Country of citizenship is required",
        );
        v.require("job_title", &self.job_title, "Job title is required");
        v.require("employer_name", &self.employer_name, "Employer name is required");
        v.require("employer_ein", &self.employer_ein, "Employer EIN is required");
        v.email_format("supervisor_email", &self.supervisor_email);
        if v.require("hours_per_week", &self.hours_per_week, "Hours per week is required") {
            v.number_at_least(
                "hours_per_week",
                &self.hours_per_week,
                20.0,
                "STEM OPT employment must be at least 20 hours per week",
            );
        }
        for (field, flag) in self.acknowledgements() {
            v.require_true(field, flag, AGREE);
        }
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
