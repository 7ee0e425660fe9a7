//! Form kinds, payload preparation, and the per-form rules.
//!
//! Every form the portal accepts is a [`FormKind`]. A submission for a kind
//! goes through [`prepare`]: the payload is normalized to snake_case,
//! deserialized into that kind's typed struct, and checked by the struct's own
//! [`FormRequest::validate`]. The rules are plain code per form; there is no
//! shared rule table.

pub mod employment;
pub mod enrollment;
pub mod i20;
pub mod payload;
pub mod programs;
pub mod records;
pub mod validate;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::submission::NewSubmission;

pub use validate::{FieldErrors, Validator, GLOBAL_FIELD};

/// Every form the portal accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormKind {
    /// Form I-20 request (level/major change, extension, dependents, ...).
    I20Request,
    /// Academic training authorization for J-1 students.
    AcademicTraining,
    /// Administrative record change.
    AdministrativeRecord,
    /// Conversation partner volunteer application.
    ConversationPartner,
    /// Post-completion OPT request.
    OptRequest,
    /// Enrollment or status document request.
    DocumentRequest,
    /// English language program volunteer form.
    EnglishLanguageVolunteer,
    /// Off campus housing application.
    OffCampusHousing,
    /// Florida Statute 1010.35 foreign-researcher disclosure.
    FloridaStatute101035,
    /// Staff leave request.
    LeaveRequest,
    /// OPT STEM extension address and employment report.
    OptStemReport,
    /// OPT STEM extension application.
    OptStemApplication,
    /// Exit form for students leaving the university.
    ExitForm,
    /// Pathway programs intent to progress.
    PathwayIntentToProgress,
    /// Pathway programs next steps.
    PathwayNextSteps,
    /// Reduced course load request.
    ReducedCourseLoad,
    /// SEVIS transfer out to another school.
    GlobalTransferOut,
    /// Release of UCF Global records to a third party.
    RecordsRelease,
    /// Virtual check-in for arriving students.
    VirtualCheckIn,
    /// Travel approval petition for trips abroad.
    TravelApprovalPetition,
}

impl FormKind {
    /// All kinds, in list-view tab order.
    pub const ALL: [FormKind; 20] = [
        Self::I20Request,
        Self::AcademicTraining,
        Self::AdministrativeRecord,
        Self::ConversationPartner,
        Self::OptRequest,
        Self::DocumentRequest,
        Self::EnglishLanguageVolunteer,
        Self::OffCampusHousing,
        Self::FloridaStatute101035,
        Self::LeaveRequest,
        Self::OptStemReport,
        Self::OptStemApplication,
        Self::ExitForm,
        Self::PathwayIntentToProgress,
        Self::PathwayNextSteps,
        Self::ReducedCourseLoad,
        Self::GlobalTransferOut,
        Self::RecordsRelease,
        Self::VirtualCheckIn,
        Self::TravelApprovalPetition,
    ];

    /// URL path segment under `/api/`.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::I20Request => "i20-requests",
            Self::AcademicTraining => "academic-training",
            Self::AdministrativeRecord => "administrative-record",
            Self::ConversationPartner => "conversation-partner",
            Self::OptRequest => "opt-requests",
            Self::DocumentRequest => "document-requests",
            Self::EnglishLanguageVolunteer => "english-language-volunteer",
            Self::OffCampusHousing => "off-campus-housing",
            Self::FloridaStatute101035 => "florida-statute-101035",
            Self::LeaveRequest => "leave-requests",
            Self::OptStemReport => "opt-stem-reports",
            Self::OptStemApplication => "opt-stem-applications",
            Self::ExitForm => "exit-forms",
            Self::PathwayIntentToProgress => "pathway-programs-intent-to-progress",
            Self::PathwayNextSteps => "pathway-programs-next-steps",
            Self::ReducedCourseLoad => "reduced-course-load",
            Self::GlobalTransferOut => "global-transfer-out",
            Self::RecordsRelease => "ucf-global-records-release",
            Self::VirtualCheckIn => "virtual-checkin",
            Self::TravelApprovalPetition => "travel-approval-petition",
        }
    }

    /// Human program label stored with each record.
    #[must_use]
    pub fn program(self) -> &'static str {
        match self {
            Self::I20Request => "I-20 Request",
            Self::AcademicTraining => "Academic Training",
            Self::AdministrativeRecord => "Administrative Record Change",
            Self::ConversationPartner => "Conversation Partner",
            Self::OptRequest => "OPT Request",
            Self::DocumentRequest => "Document Request",
            Self::EnglishLanguageVolunteer => "English Language Program Volunteer",
            Self::OffCampusHousing => "Off Campus Housing Application",
            Self::FloridaStatute101035 => "Florida Statute 1010.35",
            Self::LeaveRequest => "Leave Request",
            Self::OptStemReport => "OPT STEM Extension Reporting",
            Self::OptStemApplication => "OPT STEM Extension Application",
            Self::ExitForm => "Exit Form",
            Self::PathwayIntentToProgress => "Pathway Programs Intent to Progress",
            Self::PathwayNextSteps => "Pathway Programs Next Steps",
            Self::ReducedCourseLoad => "Reduced Course Load",
            Self::GlobalTransferOut => "Global Transfer Out",
            Self::RecordsRelease => "UCF Global Records Release",
            Self::VirtualCheckIn => "Virtual Check In",
            Self::TravelApprovalPetition => "Travel Approval Petition",
        }
    }

    /// Directory under the upload root that holds this kind's files.
    #[must_use]
    pub fn upload_dir(self) -> String {
        self.slug().replace('-', "_")
    }

    /// Multipart file fields this kind accepts by fixed name.
    #[must_use]
    pub fn file_fields(self) -> &'static [&'static str] {
        match self {
            Self::I20Request => &["departure_itinerary", "return_itinerary"],
            Self::AcademicTraining => &["offer_letter", "training_authorization"],
            Self::OptRequest => &[
                "photo2x2",
                "passport_biographical",
                "f1_visa_or_uscis_notice",
                "i94",
                "form_i765",
                "form_g1145",
                "previous_i20s",
                "previous_ead",
            ],
            Self::FloridaStatute101035 => &["passport_document"],
            Self::LeaveRequest => &["documentation"],
            Self::OptStemApplication => &[
                "photo_2x2",
                "form_i983",
                "passport",
                "f1_visa",
                "i94",
                "ead_card",
                "form_i765",
                "form_g1145",
                "diploma",
                "transcripts",
                "previous_i20s",
            ],
            Self::ExitForm => &["flight_itinerary"],
            Self::GlobalTransferOut => &["admission_letter"],
            Self::VirtualCheckIn => &["visa_notice_of_action", "form_i94", "passport", "other_documents"],
            _ => &[],
        }
    }

    /// Whether a multipart file part named `field` belongs to this kind.
    ///
    /// I-20 requests also take one passport scan per dependent, named
    /// `dependent_passport_<index>`.
    #[must_use]
    pub fn accepts_file(self, field: &str) -> bool {
        if self.file_fields().contains(&field) {
            return true;
        }
        self == Self::I20Request && i20::dependent_passport_index(field).is_some()
    }

    /// Form field also stored in the record's `notes` column.
    ///
    /// [`prepare`] reads the notes from this field of the normalized payload.
    #[must_use]
    pub fn note_field(self) -> Option<&'static str> {
        match self {
            Self::I20Request => Some("other_reason"),
            Self::AcademicTraining => Some("comments"),
            Self::ExitForm | Self::VirtualCheckIn => Some("remarks"),
            _ => None,
        }
    }

    /// Slug, program label, and file fields, as listed by the API.
    #[must_use]
    pub fn info(self) -> FormInfo {
        FormInfo {
            slug: self.slug().to_string(),
            program: self.program().to_string(),
            file_fields: self.file_fields().iter().map(|f| (*f).to_string()).collect(),
        }
    }

    /// Look a kind up by its slug.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim_matches('/');
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }
}

/// Public description of one form kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInfo {
    /// Path segment under `/api/`.
    pub slug: String,
    /// Program label.
    pub program: String,
    /// Named multipart file fields.
    pub file_fields: Vec<String>,
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for FormKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_slug(s).ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}

impl Serialize for FormKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.slug())
    }
}

impl<'de> Deserialize<'de> for FormKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let slug = String::deserialize(deserializer)?;
        Self::from_slug(&slug)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown form kind: {slug}")))
    }
}

/// A typed form that can check itself.
pub trait FormRequest: DeserializeOwned {
    /// The kind this struct deserializes.
    const KIND: FormKind;

    /// Run this form's field rules.
    fn validate(&self) -> FieldErrors;

    /// The student (or employee) identifier.
    fn student_id(&self) -> &str;

    /// Given / first name.
    fn given_name(&self) -> &str;

    /// Family / last name.
    fn family_name(&self) -> &str;

    /// Program label stored with the record.
    fn program(&self) -> String {
        Self::KIND.program().to_string()
    }
}

/// Normalize, deserialize, and validate a raw submission for `kind`.
///
/// Accepts camelCase or snake_case keys and an optional `form_data`
/// envelope. The returned submission carries the normalized payload as its
/// `form_data`.
///
/// # Errors
///
/// Returns [`Error::MalformedPayload`] when the body is not an object or a
/// field has the wrong shape, and [`Error::Validation`] when a rule fails.
pub fn prepare(kind: FormKind, raw: Value) -> Result<NewSubmission> {
    let Value::Object(map) = raw else {
        return Err(Error::malformed("expected a JSON object"));
    };
    let map = payload::unwrap_envelope(map);
    let Value::Object(data) = payload::drop_nulls(payload::normalize_keys(Value::Object(map)))
    else {
        return Err(Error::internal("normalized payload is not an object"));
    };

    match kind {
        FormKind::I20Request => build::<i20::I20Request>(data),
        FormKind::AcademicTraining => build::<employment::AcademicTraining>(data),
        FormKind::OptRequest => build::<employment::OptRequest>(data),
        FormKind::OptStemReport => build::<employment::OptStemReport>(data),
        FormKind::OptStemApplication => build::<employment::OptStemApplication>(data),
        FormKind::AdministrativeRecord => build::<records::AdministrativeRecord>(data),
        FormKind::DocumentRequest => build::<records::DocumentRequest>(data),
        FormKind::FloridaStatute101035 => build::<records::FloridaStatute>(data),
        FormKind::RecordsRelease => build::<records::RecordsRelease>(data),
        FormKind::LeaveRequest => build::<enrollment::LeaveRequest>(data),
        FormKind::ReducedCourseLoad => build::<enrollment::ReducedCourseLoad>(data),
        FormKind::ExitForm => build::<enrollment::ExitForm>(data),
        FormKind::GlobalTransferOut => build::<enrollment::GlobalTransferOut>(data),
        FormKind::VirtualCheckIn => build::<enrollment::VirtualCheckIn>(data),
        FormKind::TravelApprovalPetition => build::<enrollment::TravelApprovalPetition>(data),
        FormKind::ConversationPartner => build::<programs::ConversationPartner>(data),
        FormKind::EnglishLanguageVolunteer => build::<programs::EnglishLanguageVolunteer>(data),
        FormKind::OffCampusHousing => build::<programs::OffCampusHousing>(data),
        FormKind::PathwayIntentToProgress => build::<programs::PathwayIntentToProgress>(data),
        FormKind::PathwayNextSteps => build::<programs::PathwayNextSteps>(data),
    }
}

fn build<F: FormRequest>(data: Map<String, Value>) -> Result<NewSubmission> {
    let form_data = Value::Object(data);
    let form: F = serde_json::from_value(form_data.clone())
        .map_err(|e| Error::malformed(format!("{}: {e}", F::KIND.program())))?;

    form.validate().into_result()?;

    let mut student_id = form.student_id().trim().to_string();
    if student_id.is_empty() {
        if let Some(fallback) = form_data.get("student_id") {
            student_id = payload::value_text(fallback).trim().to_string();
        }
    }

    Ok(NewSubmission {
        kind: F::KIND,
        student_name: payload::student_name(form.given_name(), form.family_name()),
        student_id,
        program: form.program(),
        notes: F::KIND
            .note_field()
            .and_then(|field| form_data.get(field))
            .map(|value| payload::value_text(value).trim().to_string())
            .filter(|n| !n.is_empty()),
        form_data,
    })
}

/// Label shown in the request list's "Request Type" column.
#[must_use]
pub fn request_type(kind: FormKind, program: &str, form_data: &Value) -> String {
    let text = |key: &str| {
        form_data
            .get(key)
            .map(payload::value_text)
            .filter(|s| !s.trim().is_empty())
    };

    match kind {
        FormKind::AcademicTraining => {
            if text("completion_type").as_deref() == Some("pre") {
                "Academic Training: Pre-Completion".to_string()
            } else {
                "Academic Training: Post-Completion".to_string()
            }
        }
        FormKind::AdministrativeRecord => {
            let actions: Vec<String> = match form_data.get("action_requested") {
                Some(Value::Array(items)) => items.iter().map(payload::value_text).collect(),
                Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
                _ => Vec::new(),
            };
            if actions.is_empty() {
                kind.program().to_string()
            } else {
                format!("Admin Record: {}", actions.join(", "))
            }
        }
        FormKind::ConversationPartner | FormKind::OptRequest => format!(
            "{}: {}",
            kind.program(),
            text("academic_level").unwrap_or_else(|| "N/A".to_string())
        ),
        FormKind::EnglishLanguageVolunteer => format!(
            "English Language Volunteer: {}",
            text("academic_level").unwrap_or_else(|| "N/A".to_string())
        ),
        FormKind::DocumentRequest => format!(
            "Document Request: {}",
            text("global_student_document")
                .or_else(|| text("undergrad_document"))
                .unwrap_or_else(|| "N/A".to_string())
        ),
        FormKind::OffCampusHousing => format!(
            "Off Campus Housing: {}",
            text("payment_status").unwrap_or_else(|| "PENDING".to_string())
        ),
        _ => program.to_string(),
    }
}
