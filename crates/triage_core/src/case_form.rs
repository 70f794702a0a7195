//! Case form - validates the escalation form and builds the submission.
//!
//! The submission is what a real ticketing integration would receive; here
//! it ends at id generation, which is the mocked case sink.

use crate::record::CaseRecord;
use serde::{Deserialize, Serialize};

/// Prefix for generated case identifiers.
pub const CASE_ID_PREFIX: &str = "TKT-";

/// Required-field labels, exactly as reported to the user.
pub const LABEL_FULL_NAME: &str = "Full Name";
pub const LABEL_EMAIL: &str = "Email Address";
pub const LABEL_PRODUCT_MODEL: &str = "Product Model / Device Name";

/// User-entered escalation form. Phone is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub product_model: String,
}

impl CaseForm {
    /// Check required fields, trimming first: whitespace-only counts as
    /// blank. Returns the missing labels in form order.
    pub fn validate(&self) -> Result<(), Vec<&'static str>> {
        let required = [
            (LABEL_FULL_NAME, self.full_name.as_str()),
            (LABEL_EMAIL, self.email.as_str()),
            (LABEL_PRODUCT_MODEL, self.product_model.as_str()),
        ];

        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| *label)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}

/// Validated payload handed to the (mocked) ticketing sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSubmission {
    pub case_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub product_model: String,
    pub problem_statement: String,
    pub selected_causes: Vec<String>,
    pub suggested_cause: String,
    pub suggested_action: String,
}

/// Validate the form against the record and assemble the submission,
/// assigning a fresh case id.
pub fn build_submission(form: &CaseForm, record: &CaseRecord) -> Result<CaseSubmission, Vec<&'static str>> {
    form.validate()?;

    Ok(CaseSubmission {
        case_id: generate_case_id(),
        full_name: form.full_name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        product_model: form.product_model.trim().to_string(),
        problem_statement: record.working_statement.clone(),
        selected_causes: record.selected_causes.clone(),
        suggested_cause: record.suggested_cause.clone(),
        suggested_action: record.suggested_action.clone(),
    })
}

/// Short random case identifier: `TKT-` plus 8 uppercase hex chars.
/// Collisions are out of scope for single-session usage.
pub fn generate_case_id() -> String {
    let bytes: [u8; 4] = rand::random();
    format!("{}{}", CASE_ID_PREFIX, hex::encode(bytes).to_uppercase())
}
