//! Enrollment and status forms: leave, reduced course load, exit, transfer
//! out, arrival check-in, and travel approval.

use serde::Deserialize;

use super::payload::{flexible_bool, flexible_string, free_text};
use super::validate::{parse_date, FieldErrors, Validator};
use super::{FormKind, FormRequest};

const AGREE: &str = "You must agree to this statement";

/// Class coverage entry on a leave request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassCoverage {
    /// Class start time.
    pub start_time: String,
    /// Class dates.
    pub dates: String,
    /// Classroom.
    pub room: String,
    /// Substitute instructor.
    pub substitute_name: String,
}

/// Staff leave request. Keyed by employee id rather than UCF ID.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LeaveRequest {
    /// Employee ID.
    #[serde(deserialize_with = "flexible_string")]
    pub employee_id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Leave type.
    pub leave_type: String,
    /// First day of leave.
    pub from_date: String,
    /// Leave start time.
    pub from_time: String,
    /// Last day of leave.
    pub to_date: String,
    /// Leave end time.
    pub to_time: String,
    /// Hours requested.
    #[serde(deserialize_with = "flexible_string")]
    pub hours_requested: String,
    /// Reason.
    #[serde(deserialize_with = "free_text")]
    pub reason: String,
    /// Course name.
    pub course_name: String,
    /// Classes that need coverage during the leave.
    pub classes: Vec<ClassCoverage>,
}

impl FormRequest for LeaveRequest {
    const KIND: FormKind = FormKind::LeaveRequest;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("employee_id", &self.employee_id, "Employee ID is required");
        v.require("first_name", &self.first_name, "First name is required");
        v.require("last_name", &self.last_name, "Last name is required");
        v.require("leave_type", &self.leave_type, "Please select a leave type");
        let from = v.date("from_date", &self.from_date, "Start date is required");
        if let (Some(from), Some(to)) = (from, parse_date(&self.to_date)) {
            if to < from {
                v.error("to_date", "End date cannot be before start date");
            }
        }
        v.number_at_least(
            "hours_requested",
            &self.hours_requested,
            0.0,
            "Hours requested must be a non-negative number",
        );
        v.finish()
    }

    fn student_id(&self) -> &str {
        &self.employee_id
    }

    fn given_name(&self) -> &str {
        &self.first_name
    }

    fn family_name(&self) -> &str {
        &self.last_name
    }
}

/// Reduced course load request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReducedCourseLoad {
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// SEVIS ID.
    #[serde(deserialize_with = "flexible_string")]
    pub sevis_id: String,
    /// Visa type.
    pub visa_type: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// UCF email address.
    pub ucf_email_address: String,
    /// Academic level.
    pub academic_level: String,
    /// Academic program major.
    pub academic_program_major: String,
    /// RCL term.
    pub rcl_term: String,
    /// RCL year.
    #[serde(deserialize_with = "flexible_string")]
    pub rcl_year: String,
    /// Desired credits.
    #[serde(deserialize_with = "flexible_string")]
    pub desired_credits: String,
    /// In-person credits.
    #[serde(deserialize_with = "flexible_string")]
    pub in_person_credits: String,
    /// Reason code, e.g. initial academic difficulty or final term.
    pub rcl_reason: String,
}

impl FormRequest for ReducedCourseLoad {
    const KIND: FormKind = FormKind::ReducedCourseLoad;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("sevis_id", &self.sevis_id, "SEVIS ID is required");
        v.require("given_name", &self.given_name, "Given name is required");
        v.require("family_name", &self.family_name, "Family name is required");
        v.email_format("ucf_email_address", &self.ucf_email_address);
        v.require("rcl_term", &self.rcl_term, "Please select a term");
        v.require("rcl_year", &self.rcl_year, "Please select a year");
        v.require("rcl_reason", &self.rcl_reason, "Please select a reason");
        v.number_at_least(
            "desired_credits",
            &self.desired_credits,
            0.0,
            "Desired credits must be a non-negative number",
        );
        v.number_at_least(
            "in_person_credits",
            &self.in_person_credits,
            0.0,
            "In-person credits must be a non-negative number",
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

/// Exit form for students leaving the university.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExitForm {
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// SEVIS ID.
    #[serde(deserialize_with = "flexible_string")]
    pub sevis_id: String,
    /// Visa type.
    pub visa_type: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// UCF email.
    pub ucf_email: String,
    /// Secondary email.
    pub secondary_email: String,
    /// Education level.
    pub education_level: String,
    /// Departure date.
    pub departure_date: String,
    /// Departure reason.
    pub departure_reason: String,
    /// Work authorization acknowledgment box.
    #[serde(deserialize_with = "flexible_bool")]
    pub work_authorization_acknowledgment: bool,
    /// CPT/OPT acknowledgment box.
    #[serde(deserialize_with = "flexible_bool")]
    pub cpt_opt_acknowledgment: bool,
    /// Financial obligations acknowledgment box.
    #[serde(deserialize_with = "flexible_bool")]
    pub financial_obligations_acknowledgment: bool,
    /// Free-text remarks.
    #[serde(deserialize_with = "free_text")]
    pub remarks: String,
}

impl FormRequest for ExitForm {
    const KIND: FormKind = FormKind::ExitForm;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("given_name", &self.given_name, "Given name is required");
        v.require("family_name", &self.family_name, "Family name is required");
        v.ucf_email(
            "ucf_email",
            &self.ucf_email,
            "UCF email is required",
            "Must be a valid UCF email address",
        );
        v.email_format("secondary_email", &self.secondary_email);
        v.date("departure_date", &self.departure_date, "Departure date is required");
        v.require_true(
            "work_authorization_acknowledgment",
            self.work_authorization_acknowledgment,
            AGREE,
        );
        v.require_true("cpt_opt_acknowledgment", self.cpt_opt_acknowledgment, AGREE);
        v.require_true(
            "financial_obligations_acknowledgment",
            self.financial_obligations_acknowledgment,
            AGREE,
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

/// SEVIS record transfer to another school.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GlobalTransferOut {
    /// UCF ID.
    #[serde(deserialize_with = "flexible_string")]
    pub ucf_id: String,
    /// SEVIS ID.
    #[serde(deserialize_with = "flexible_string")]
    pub sevis_id: String,
    /// Visa type.
    pub visa_type: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// UCF email address.
    pub ucf_email_address: String,
    /// UCF education level.
    pub ucf_education_level: String,
    /// New school name.
    pub new_school_name: String,
    /// New school start date.
    pub new_school_start_date: String,
    /// Desired SEVIS release date.
    pub desired_sevis_release_date: String,
    /// New school international advisor name.
    pub new_school_international_advisor_name: String,
    /// New school international advisor email.
    pub new_school_international_advisor_email: String,
    /// New school international advisor phone.
    #[serde(deserialize_with = "flexible_string")]
    pub new_school_international_advisor_phone: String,
    /// Understanding SEVIS release box.
    #[serde(deserialize_with = "flexible_bool")]
    pub understanding_sevis_release: bool,
    /// Permission to communicate box.
    #[serde(deserialize_with = "flexible_bool")]
    pub permission_to_communicate: bool,
    /// Understanding work authorization box.
    #[serde(deserialize_with = "flexible_bool")]
    pub understanding_work_authorization: bool,
    /// Understanding financial obligations box.
    #[serde(deserialize_with = "flexible_bool")]
    pub understanding_financial_obligations: bool,
}

impl FormRequest for GlobalTransferOut {
    const KIND: FormKind = FormKind::GlobalTransferOut;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("sevis_id", &self.sevis_id, "SEVIS ID is required");
        v.require("given_name", &self.given_name, "Given name is required");
        v.require("family_name", &self.family_name, "Family name is required");
        v.email_format("ucf_email_address", &self.ucf_email_address);
        v.require("new_school_name", &self.new_school_name, "New school name is required");
        v.date(
            "new_school_start_date",
            &self.new_school_start_date,
            "New school start date is required",
        );
        v.date(
            "desired_sevis_release_date",
            &self.desired_sevis_release_date,
            "Desired SEVIS release date is required",
        );
        v.email_format(
            "new_school_international_advisor_email",
            &self.new_school_international_advisor_email,
        );
        let understandings = [
            ("understanding_sevis_release", self.understanding_sevis_release),
            ("permission_to_communicate", self.permission_to_communicate),
            (
                "understanding_work_authorization",
                self.understanding_work_authorization,
            ),
            (
                "understanding_financial_obligations",
                self.understanding_financial_obligations,
            ),
        ];
        for (field, flag) in understandings {
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

/// Arrival check-in for new students.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VirtualCheckIn {
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
    /// Visa type.
    pub visa_type: String,
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
    /// US telephone.
    #[serde(deserialize_with = "flexible_string")]
    pub us_telephone: String,
    /// UCF email.
    pub ucf_email: String,
    /// Secondary email.
    pub secondary_email: String,
    /// Emergency contact given name.
    pub emergency_given_name: String,
    /// Emergency contact family name.
    pub emergency_family_name: String,
    /// Emergency contact relationship.
    pub emergency_relationship: String,
    /// Emergency contact email.
    pub emergency_email: String,
    /// Whether the student has dependents.
    #[serde(deserialize_with = "flexible_bool")]
    pub has_dependents: bool,
    /// Authorizes UCF Global to verify the information.
    #[serde(deserialize_with = "flexible_bool")]
    pub authorization_checked: bool,
    /// Free-text remarks.
    #[serde(deserialize_with = "free_text")]
    pub remarks: String,
}

impl FormRequest for VirtualCheckIn {
    const KIND: FormKind = FormKind::VirtualCheckIn;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("given_name", &self.given_name, "Given Name is required");
        v.require("family_name", &self.family_name, "Family Name/Surname is required");
        v.require("visa_type", &self.visa_type, "Visa Type is required");
        v.require("street_address", &self.street_address, "Street Address is required");
        v.require("city", &self.city, "City is required");
        v.require("state", &self.state, "State is required");
        v.require("postal_code", &self.postal_code, "Postal Code is required");
        v.ucf_email(
            "ucf_email",
            &self.ucf_email,
            "UCF Email Address is required",
            "Must be a valid UCF email address",
        );
        v.email_format("secondary_email", &self.secondary_email);
        v.email_format("emergency_email", &self.emergency_email);
        v.require_true(
            "authorization_checked",
            self.authorization_checked,
            "You must authorize UCF Global to verify your information",
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

/// Purposes a travel approval petition may name.
pub const TRAVEL_PURPOSES: [&str; 5] = [
    "research",
    "conference",
    "academic_collaboration",
    "professional_development",
    "other",
];

/// Travel approval petition for trips abroad.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TravelApprovalPetition {
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
    /// Country of citizenship.
    pub country_of_citizenship: String,
    /// Visa type.
    pub visa_type: String,
    /// Departure date.
    pub from_date: String,
    /// Return date.
    pub to_date: String,
    /// Destination country.
    pub country: String,
    /// Destination city.
    pub city: String,
    /// Where the traveler will stay.
    pub accommodation: String,
    /// Address while abroad.
    #[serde(deserialize_with = "free_text")]
    pub address: String,
    /// Host country contact.
    pub host_contact_name: String,
    /// Host contact email.
    pub host_contact_email: String,
    /// Host contact phone.
    #[serde(deserialize_with = "flexible_string")]
    pub host_contact_phone: String,
    /// Host contact address.
    #[serde(deserialize_with = "free_text")]
    pub host_contact_address: String,
    /// Relationship to the host contact.
    pub host_contact_relationship: String,
    /// One of [`TRAVEL_PURPOSES`].
    pub purpose: String,
    /// Conference or activity name.
    pub activity_name: String,
    /// Venue of the program.
    pub venue_of_program: String,
    /// Program website.
    pub website_of_program: String,
    /// Institutions to be visited.
    #[serde(deserialize_with = "free_text")]
    pub institutions: String,
    /// Trip involves international collaboration.
    #[serde(deserialize_with = "flexible_bool")]
    pub international_collaboration: bool,
    /// Needs VPN access abroad.
    #[serde(deserialize_with = "flexible_bool")]
    pub vpn_access: bool,
    /// Takes UCF equipment.
    #[serde(deserialize_with = "flexible_bool")]
    pub ucf_equipment: bool,
    /// Takes a laptop subject to export rules.
    #[serde(deserialize_with = "flexible_bool")]
    pub laptop_export: bool,
    /// Carries non-published designs.
    #[serde(deserialize_with = "flexible_bool")]
    pub non_published_design: bool,
    /// Collects field samples.
    #[serde(deserialize_with = "flexible_bool")]
    pub field_samples: bool,
    /// Ships items abroad.
    #[serde(deserialize_with = "flexible_bool")]
    pub shipping_items: bool,
}

impl FormRequest for TravelApprovalPetition {
    const KIND: FormKind = FormKind::TravelApprovalPetition;

    fn validate(&self) -> FieldErrors {
        let mut v = Validator::new();
        v.require("ucf_id", &self.ucf_id, "UCF ID is required");
        v.require("first_name", &self.first_name, "First name is required");
        v.require("last_name", &self.last_name, "Last name is required");
        v.email(
            "email",
            &self.email,
            "Email is required",
            "Please enter a valid email address",
        );
        v.require("phone_number", &self.phone_number, "Phone number is required");
        v.require(
            "country_of_citizenship",
            &self.country_of_citizenship,
            "Country of citizenship is required",
        );
        let from = v.date("from_date", &self.from_date, "Departure date is required");
        let to = v.date("to_date", &self.to_date, "Return date is required");
        if let (Some(from), Some(to)) = (from, to) {
            if to < from {
                v.error("to_date", "Return date cannot be before departure date");
            }
        }
        v.require("country", &self.country, "Destination country is required");
        v.require("city", &self.city, "Destination city is required");
        if v.require("purpose", &self.purpose, "Please select a purpose of travel")
            && !TRAVEL_PURPOSES.contains(&self.purpose.trim())
        {
            v.error("purpose", "Please select a purpose of travel");
        }
        v.email_format("host_contact_email", &self.host_contact_email);
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
    fn test_leave_request_uses_employee_id() {
        let form: LeaveRequest = parse(json!({
            "employeeId": 90210,
            "firstName": "Rosa",
            "lastName": "Diaz",
            "leaveType": "Vacation",
            "fromDate": "2025-03-10",
            "toDate": "2025-03-10",
            "hoursRequested": "8",
            "classes": [{"startTime": "09:00", "dates": "3/10", "room": "CB1 101", "substituteName": "J. Park"}]
        }));
        assert!(form.validate().is_empty(), "{}", form.validate());
        assert_eq!(form.student_id(), "90210");
        assert_eq!(form.classes[0].substitute_name, "J. Park");
    }

    #[test]
    fn test_leave_request_dates() {
        let errors = parse::<LeaveRequest>(json!({
            "employeeId": "1",
            "firstName": "Rosa",
            "lastName": "Diaz",
            "leaveType": "Sick",
            "fromDate": "2025-03-10",
            "toDate": "2025-03-09"
        }))
        .validate();
        assert_eq!(
            errors.get("to_date"),
            Some("End date cannot be before start date")
        );

        let errors = parse::<LeaveRequest>(json!({})).validate();
        assert!(errors.contains("employee_id"));
        assert!(errors.contains("from_date"));
        assert!(!errors.contains("ucf_id"));
    }

    #[test]
    fn test_reduced_course_load_credits() {
        let mut value = json!({
            "ucfId": "1",
            "sevisId": "N1",
            "givenName": "A",
            "familyName": "B",
            "rclTerm": "Fall",
            "rclYear": 2025,
            "rclReason": "Final term",
            "desiredCredits": "-3"
        });
        let errors = parse::<ReducedCourseLoad>(value.clone()).validate();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("desired_credits"));

        value["desiredCredits"] = json!(6);
        assert!(parse::<ReducedCourseLoad>(value).validate().is_empty());
    }

    #[test]
    fn test_exit_form() {
        let form: ExitForm = parse(json!({
            "ucfId": "1",
            "givenName": "A",
            "familyName": "B",
            "ucfEmail": "ab@ucf.edu",
            "departureDate": "2025-12-20",
            "workAuthorizationAcknowledgment": true,
            "cptOptAcknowledgment": true,
            "financialObligationsAcknowledgment": "true",
            "remarks": "Graduated"
        }));
        assert!(form.validate().is_empty(), "{}", form.validate());
        assert_eq!(form.remarks, "Graduated");

        let errors = parse::<ExitForm>(json!({"departureDate": "soon"})).validate();
        assert!(errors.contains("cpt_opt_acknowledgment"));
        assert!(errors.get("departure_date").unwrap().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_global_transfer_out_advisor_email() {
        let errors = parse::<GlobalTransferOut>(json!({
            "ucfId": "1",
            "sevisId": "N1",
            "givenName": "A",
            "familyName": "B",
            "newSchoolName": "State University",
            "newSchoolStartDate": "2026-01-10",
            "desiredSevisReleaseDate": "2025-12-15",
            "newSchoolInternationalAdvisorEmail": "advisor-at-state",
            "understandingSevisRelease": true,
            "permissionToCommunicate": true,
            "understandingWorkAuthorization": true,
            "understandingFinancialObligations": true
        }))
        .validate();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("new_school_international_advisor_email"));
    }

    #[test]
    fn test_virtual_checkin_messages() {
        let errors = parse::<VirtualCheckIn>(json!({})).validate();
        assert_eq!(
            errors.get("family_name"),
            Some("Family Name/Surname is required")
        );
        assert_eq!(errors.get("postal_code"), Some("Postal Code is required"));
        assert_eq!(errors.get("ucf_email"), Some("UCF Email Address is required"));
        assert!(errors.contains("authorization_checked"));
    }

    #[test]
    fn test_virtual_checkin_valid() {
        let form: VirtualCheckIn = parse(json!({
            "ucfId": "1",
            "givenName": "A",
            "familyName": "B",
            "visaType": "F-1",
            "streetAddress": "4000 Central Florida Blvd",
            "city": "Orlando",
            "state": "FL",
            "postalCode": 32816,
            "ucfEmail": "ab@ucf.edu",
            "authorizationChecked": "on"
        }));
        assert!(form.validate().is_empty(), "{}", form.validate());
    }

    fn travel_petition() -> Value {
        json!({
            "ucfId": 5550101,
            "firstName": "Ines",
            "lastName": "Okafor",
            "email": "ines@ucf.edu",
            "phoneNumber": "407-555-0101",
            "countryOfCitizenship": "Canada",
            "fromDate": "2025-06-01",
            "toDate": "2025-06-14",
            "country": "Germany",
            "city": "Berlin",
            "purpose": "conference",
            "hostContactEmail": "",
            "vpnAccess": "true",
            "laptopExport": "false"
        })
    }

    #[test]
    fn test_travel_petition_valid() {
        let form: TravelApprovalPetition = parse(travel_petition());
        assert!(form.validate().is_empty(), "{}", form.validate());
        assert_eq!(form.student_id(), "5550101");
        assert!(form.vpn_access);
        assert!(!form.laptop_export);
    }

    #[test]
    fn test_travel_petition_required_fields() {
        let errors = parse::<TravelApprovalPetition>(json!({})).validate();
        for field in [
            "ucf_id",
            "first_name",
            "last_name",
            "email",
            "phone_number",
            "country_of_citizenship",
            "from_date",
            "to_date",
            "country",
            "city",
            "purpose",
        ] {
            assert!(errors.contains(field), "missing error for {field}");
        }
        assert!(!errors.contains("visa_type"));
        assert!(!errors.contains("host_contact_email"));
    }

    #[test]
    fn test_travel_petition_return_before_departure() {
        let mut value = travel_petition();
        value["toDate"] = json!("2025-05-31");
        let errors = parse::<TravelApprovalPetition>(value.clone()).validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("to_date"),
            Some("Return date cannot be before departure date")
        );

        value["toDate"] = json!("2025-06-01");
        assert!(parse::<TravelApprovalPetition>(value).validate().is_empty());
    }

    #[test]
    fn test_travel_petition_purpose_and_contact() {
        let mut value = travel_petition();
        value["purpose"] = json!("tourism");
        value["hostContactEmail"] = json!("not-an-email");
        let errors = parse::<TravelApprovalPetition>(value).validate();
        assert_eq!(errors.get("purpose"), Some("Please select a purpose of travel"));
        assert!(errors.contains("host_contact_email"));
        assert_eq!(errors.len(), 2);
    }
}
