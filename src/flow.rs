use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::applications::LoanApplicationCreate;
use crate::decimal::{percent, Money, Rate};
use crate::errors::{LendingError, Result};
use crate::payments::PaymentSchedule;
use crate::types::{EmploymentStatus, ValuationId, VehicleId};

/// applicant contact step, fields filled in as the user types
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfoDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_phone: Option<String>,
}

/// income step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmploymentInfoDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<EmploymentStatus>,
}

/// requested loan step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanDetailsDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_amount: Option<Money>,
    #[serde(with = "percent::option", skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PersonalInfoDraft {
    /// overwrite only the fields present in `other`
    pub fn merge(&mut self, other: PersonalInfoDraft) {
        merge_field(&mut self.applicant_name, other.applicant_name);
        merge_field(&mut self.applicant_email, other.applicant_email);
        merge_field(&mut self.applicant_phone, other.applicant_phone);
    }
}

impl EmploymentInfoDraft {
    pub fn merge(&mut self, other: EmploymentInfoDraft) {
        merge_field(&mut self.monthly_income, other.monthly_income);
        merge_field(&mut self.employment_status, other.employment_status);
    }
}

impl LoanDetailsDraft {
    pub fn merge(&mut self, other: LoanDetailsDraft) {
        merge_field(&mut self.loan_amount, other.loan_amount);
        merge_field(&mut self.interest_rate, other.interest_rate);
        merge_field(&mut self.term_months, other.term_months);
        merge_field(&mut self.notes, other.notes);
    }
}

/// create request with any field possibly missing, used to resume editing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialApplication {
    pub vehicle_id: Option<VehicleId>,
    pub valuation_id: Option<ValuationId>,
    pub applicant_name: Option<String>,
    pub applicant_email: Option<String>,
    pub applicant_phone: Option<String>,
    pub monthly_income: Option<Money>,
    pub employment_status: Option<EmploymentStatus>,
    pub loan_amount: Option<Money>,
    #[serde(with = "percent::option", skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Rate>,
    pub term_months: Option<u32>,
    pub notes: Option<String>,
}

impl From<LoanApplicationCreate> for PartialApplication {
    fn from(create: LoanApplicationCreate) -> Self {
        Self {
            vehicle_id: Some(create.vehicle_id),
            valuation_id: Some(create.valuation_id),
            applicant_name: Some(create.applicant_name),
            applicant_email: Some(create.applicant_email),
            applicant_phone: Some(create.applicant_phone),
            monthly_income: Some(create.monthly_income),
            employment_status: Some(create.employment_status),
            loan_amount: Some(create.loan_amount),
            interest_rate: Some(create.interest_rate),
            term_months: Some(create.term_months),
            notes: create.notes,
        }
    }
}

/// term used when a resumed application has none
const DEFAULT_TERM_MONTHS: u32 = 12;

fn merge_field<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// in-progress multi-step loan application
///
/// Owned by the caller and passed to whatever handles each step. Nothing is
/// persisted implicitly: use [`ApplicationFlow::save`] and
/// [`ApplicationFlow::load`] at process boundaries. Per-step validation
/// flags are session state and are never written out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationFlow {
    pub current_step: u32,
    pub completed_steps: BTreeSet<u32>,
    pub personal_info: PersonalInfoDraft,
    pub employment_info: EmploymentInfoDraft,
    pub loan_details: LoanDetailsDraft,
    pub selected_vehicle_id: Option<VehicleId>,
    pub selected_valuation_id: Option<ValuationId>,
    #[serde(skip)]
    step_validation: BTreeMap<u32, bool>,
}

impl Default for ApplicationFlow {
    fn default() -> Self {
        Self {
            current_step: 1,
            completed_steps: BTreeSet::new(),
            personal_info: PersonalInfoDraft::default(),
            employment_info: EmploymentInfoDraft::default(),
            loan_details: LoanDetailsDraft::default(),
            selected_vehicle_id: None,
            selected_valuation_id: None,
            step_validation: BTreeMap::new(),
        }
    }
}

impl ApplicationFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_current_step(&mut self, step: u32) {
        self.current_step = step;
    }

    pub fn mark_step_completed(&mut self, step: u32) {
        self.completed_steps.insert(step);
    }

    pub fn is_step_completed(&self, step: u32) -> bool {
        self.completed_steps.contains(&step)
    }

    pub fn set_personal_info(&mut self, data: PersonalInfoDraft) {
        self.personal_info.merge(data);
    }

    pub fn set_employment_info(&mut self, data: EmploymentInfoDraft) {
        self.employment_info.merge(data);
    }

    pub fn set_loan_details(&mut self, data: LoanDetailsDraft) {
        self.loan_details.merge(data);
    }

    /// `None` clears the selection
    pub fn select_vehicle(&mut self, vehicle_id: Option<VehicleId>) {
        self.selected_vehicle_id = vehicle_id;
    }

    pub fn select_valuation(&mut self, valuation_id: Option<ValuationId>) {
        self.selected_valuation_id = valuation_id;
    }

    pub fn set_step_valid(&mut self, step: u32, valid: bool) {
        self.step_validation.insert(step, valid);
    }

    /// false for steps never marked
    pub fn is_step_valid(&self, step: u32) -> bool {
        self.step_validation.get(&step).copied().unwrap_or(false)
    }

    /// back to a blank application at step 1
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// resume editing an existing application
    ///
    /// Every step is filled: missing text becomes empty, missing numbers
    /// zero, employment defaults to employed and the term to 12 months.
    /// Vehicle and valuation stay unselected when absent.
    pub fn load_application(&mut self, data: PartialApplication) {
        self.personal_info = PersonalInfoDraft {
            applicant_name: Some(data.applicant_name.unwrap_or_default()),
            applicant_email: Some(data.applicant_email.unwrap_or_default()),
            applicant_phone: Some(data.applicant_phone.unwrap_or_default()),
        };
        self.employment_info = EmploymentInfoDraft {
            monthly_income: Some(data.monthly_income.unwrap_or(Money::ZERO)),
            employment_status: Some(data.employment_status.unwrap_or_default()),
        };
        self.loan_details = LoanDetailsDraft {
            loan_amount: Some(data.loan_amount.unwrap_or(Money::ZERO)),
            interest_rate: Some(data.interest_rate.unwrap_or(Rate::ZERO)),
            term_months: Some(
                data.term_months
                    .filter(|&term| term > 0)
                    .unwrap_or(DEFAULT_TERM_MONTHS),
            ),
            notes: Some(data.notes.unwrap_or_default()),
        };
        self.selected_vehicle_id = data.vehicle_id;
        self.selected_valuation_id = data.valuation_id;
        self.current_step = 0;
        self.completed_steps.clear();
    }

    /// assemble the create request, failing on the first missing field
    pub fn to_create_request(&self) -> Result<LoanApplicationCreate> {
        Ok(LoanApplicationCreate {
            vehicle_id: required(self.selected_vehicle_id, "vehicleId")?,
            valuation_id: required(self.selected_valuation_id, "valuationId")?,
            applicant_name: required(self.personal_info.applicant_name.clone(), "applicantName")?,
            applicant_email: required(self.personal_info.applicant_email.clone(), "applicantEmail")?,
            applicant_phone: required(self.personal_info.applicant_phone.clone(), "applicantPhone")?,
            monthly_income: required(self.employment_info.monthly_income, "monthlyIncome")?,
            employment_status: required(self.employment_info.employment_status, "employmentStatus")?,
            loan_amount: required(self.loan_details.loan_amount, "loanAmount")?,
            interest_rate: required(self.loan_details.interest_rate, "interestRate")?,
            term_months: required(self.loan_details.term_months, "termMonths")?,
            notes: self.loan_details.notes.clone(),
        })
    }

    /// live payment preview once amount, rate and term are all entered
    pub fn payment_preview(&self) -> Option<PaymentSchedule> {
        let details = &self.loan_details;
        Some(PaymentSchedule::compute(
            details.loan_amount?,
            details.interest_rate?,
            details.term_months?,
        ))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// write the flow to `path`, replacing any previous save atomically
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(self.to_json()?.as_bytes())?;
        file.persist(path).map_err(|e| LendingError::Io(e.error))?;

        tracing::info!(path = %path.display(), step = self.current_step, "saved application flow");
        Ok(())
    }

    /// read a saved flow, or start fresh when nothing was saved yet
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                let flow = Self::from_json(&raw)?;
                tracing::info!(path = %path.display(), step = flow.current_step, "loaded application flow");
                Ok(flow)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no saved application flow, starting fresh");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T> {
    value.ok_or(LendingError::IncompleteApplication { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn filled_flow() -> ApplicationFlow {
        let mut flow = ApplicationFlow::new();
        flow.select_vehicle(Some(Uuid::new_v4()));
        flow.select_valuation(Some(Uuid::new_v4()));
        flow.set_personal_info(PersonalInfoDraft {
            applicant_name: Some("Tunde Bakare".to_string()),
            applicant_email: Some("tunde@example.com".to_string()),
            applicant_phone: Some("08031234567".to_string()),
        });
        flow.set_employment_info(EmploymentInfoDraft {
            monthly_income: Some(Money::from_major(600_000)),
            employment_status: Some(EmploymentStatus::Employed),
        });
        flow.set_loan_details(LoanDetailsDraft {
            loan_amount: Some(Money::from_major(10_000)),
            interest_rate: Some(Rate::from_percentage(6)),
            term_months: Some(36),
            notes: None,
        });
        flow
    }

    #[test]
    fn test_initial_state() {
        let flow = ApplicationFlow::new();
        assert_eq!(flow.current_step, 1);
        assert!(flow.completed_steps.is_empty());
        assert!(flow.payment_preview().is_none());
        assert!(!flow.is_step_valid(1));
    }

    #[test]
    fn test_step_tracking() {
        let mut flow = ApplicationFlow::new();
        flow.mark_step_completed(1);
        flow.mark_step_completed(1);
        flow.mark_step_completed(2);
        flow.set_current_step(3);

        assert_eq!(flow.completed_steps.len(), 2);
        assert!(flow.is_step_completed(2));
        assert_eq!(flow.current_step, 3);

        flow.set_step_valid(3, true);
        assert!(flow.is_step_valid(3));
        flow.set_step_valid(3, false);
        assert!(!flow.is_step_valid(3));
    }

    #[test]
    fn test_partial_updates_merge() {
        let mut flow = ApplicationFlow::new();
        flow.set_personal_info(PersonalInfoDraft {
            applicant_name: Some("Ngozi".to_string()),
            ..PersonalInfoDraft::default()
        });
        flow.set_personal_info(PersonalInfoDraft {
            applicant_email: Some("ngozi@example.com".to_string()),
            ..PersonalInfoDraft::default()
        });

        assert_eq!(flow.personal_info.applicant_name.as_deref(), Some("Ngozi"));
        assert_eq!(flow.personal_info.applicant_email.as_deref(), Some("ngozi@example.com"));
    }

    #[test]
    fn test_selection_can_be_cleared() {
        let mut flow = filled_flow();
        flow.select_vehicle(None);
        assert!(flow.selected_vehicle_id.is_none());
        assert!(matches!(
            flow.to_create_request(),
            Err(LendingError::IncompleteApplication { field: "vehicleId" })
        ));
    }

    #[test]
    fn test_first_missing_field_reported() {
        let mut flow = filled_flow();
        flow.personal_info.applicant_phone = None;
        flow.loan_details.term_months = None;

        assert!(matches!(
            flow.to_create_request(),
            Err(LendingError::IncompleteApplication { field: "applicantPhone" })
        ));
    }

    #[test]
    fn test_create_request_and_preview() {
        let flow = filled_flow();
        let request = flow.to_create_request().unwrap();

        assert_eq!(request.term_months, 36);
        assert_eq!(request.interest_rate.as_decimal(), dec!(0.06));

        let preview = flow.payment_preview().unwrap().rounded(2);
        assert_eq!(preview.monthly_payment, Money::from_str_exact("304.22").unwrap());
    }

    #[test]
    fn test_load_application_and_clear() {
        let request = filled_flow().to_create_request().unwrap();

        let mut flow = ApplicationFlow::new();
        flow.mark_step_completed(1);
        flow.load_application(request.clone().into());

        assert_eq!(flow.current_step, 0);
        assert!(flow.completed_steps.is_empty());
        assert_eq!(
            flow.to_create_request().unwrap(),
            LoanApplicationCreate {
                notes: Some(String::new()),
                ..request
            }
        );

        flow.set_step_valid(2, true);
        flow.clear();
        assert_eq!(flow, ApplicationFlow::default());
        assert!(!flow.is_step_valid(2));
    }

    #[test]
    fn test_load_partial_application_fills_defaults() {
        let partial: PartialApplication = serde_json::from_str(
            r#"{"applicantName": "Ifeoma Nwosu", "loanAmount": "2500000", "termMonths": 0}"#,
        )
        .unwrap();

        let mut flow = filled_flow();
        flow.load_application(partial);

        assert_eq!(flow.personal_info.applicant_name.as_deref(), Some("Ifeoma Nwosu"));
        assert_eq!(flow.personal_info.applicant_email.as_deref(), Some(""));
        assert_eq!(flow.employment_info.monthly_income, Some(Money::ZERO));
        assert_eq!(flow.employment_info.employment_status, Some(EmploymentStatus::Employed));
        assert_eq!(flow.loan_details.loan_amount, Some(Money::from_major(2_500_000)));
        assert_eq!(flow.loan_details.interest_rate, Some(Rate::ZERO));
        assert_eq!(flow.loan_details.term_months, Some(12));
        assert_eq!(flow.loan_details.notes.as_deref(), Some(""));
        assert!(flow.selected_vehicle_id.is_none());
        assert_eq!(flow.current_step, 0);

        assert!(matches!(
            flow.to_create_request(),
            Err(LendingError::IncompleteApplication { field: "vehicleId" })
        ));
    }

    #[test]
    fn test_json_omits_step_validation() {
        let mut flow = filled_flow();
        flow.mark_step_completed(1);
        flow.set_step_valid(1, true);

        let json = flow.to_json().unwrap();
        assert!(!json.contains("stepValidation"));
        assert!(json.contains("\"interestRate\": \"6\""));

        let restored = ApplicationFlow::from_json(&json).unwrap();
        assert!(!restored.is_step_valid(1));
        assert_eq!(restored.completed_steps, flow.completed_steps);
        assert_eq!(restored.to_create_request().unwrap(), flow.to_create_request().unwrap());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flows").join("application.json");

        let fresh = ApplicationFlow::load(&path).unwrap();
        assert_eq!(fresh, ApplicationFlow::default());

        let mut flow = filled_flow();
        flow.set_current_step(3);
        flow.save(&path).unwrap();

        let loaded = ApplicationFlow::load(&path).unwrap();
        assert_eq!(loaded.current_step, 3);
        assert_eq!(loaded.selected_vehicle_id, flow.selected_vehicle_id);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ApplicationFlow::load(&path),
            Err(LendingError::Serialization(_))
        ));
    }
}
