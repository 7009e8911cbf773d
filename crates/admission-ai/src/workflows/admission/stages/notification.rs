use tracing::warn;

use super::super::domain::{
    ApplicationRecord, CommunicationStatus, EligibilityCriteria, ValidationStatus,
};
use super::super::mailer::{MailError, Mailer, OutboundMessage};
use super::super::pipeline::PipelineContext;
use super::StageError;

/// The body paragraph chosen for a status message. Conditions are checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    LoanDocumentsRequested,
    LoanIncomeIneligible,
    NoLoanRequested,
    NotValidated,
}

impl NoticeKind {
    pub fn for_record(record: &ApplicationRecord, criteria: &EligibilityCriteria) -> Self {
        if record.validation_status != ValidationStatus::Valid {
            return NoticeKind::NotValidated;
        }
        if !record.loan_requested {
            return NoticeKind::NoLoanRequested;
        }
        match record.family_income_lpa {
            Some(income) if income < criteria.max_income_for_loan_lpa => {
                NoticeKind::LoanDocumentsRequested
            }
            _ => NoticeKind::LoanIncomeIneligible,
        }
    }

    fn paragraph(self, criteria: &EligibilityCriteria) -> String {
        let threshold = criteria.max_income_for_loan_lpa;
        match self {
            NoticeKind::LoanDocumentsRequested => format!(
                "Since your family income is below {threshold} LPA, please mail your last year \
                 ITR file and income certificate to the loan sanction cell to complete your \
                 loan processing."
            ),
            NoticeKind::LoanIncomeIneligible => format!(
                "You are not eligible for a loan due to income being {threshold} LPA or above."
            ),
            NoticeKind::NoLoanRequested => {
                "Thank you for submitting your application. You have not requested a loan."
                    .to_string()
            }
            NoticeKind::NotValidated => "Unfortunately, your application could not be \
                 validated due to missing or incorrect information."
                .to_string(),
        }
    }
}

/// Build the status message for the applicant. Fails only when no address is on file.
pub fn compose_message(
    record: &ApplicationRecord,
    criteria: &EligibilityCriteria,
) -> Result<OutboundMessage, MailError> {
    let to = record
        .applicant_email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .ok_or(MailError::MissingRecipient)?;

    let notice = NoticeKind::for_record(record, criteria);
    let body = format!(
        "Hello {name},\n\nYour application (ID: {id}) has been {status}.\n\n{paragraph}\n\nThank you,\nAdmissions Team",
        name = record.display_name(),
        id = record.app_id,
        status = record.validation_status.label(),
        paragraph = notice.paragraph(criteria),
    );

    Ok(OutboundMessage {
        to: to.to_string(),
        subject: format!("Application Status - ID {}", record.app_id),
        body,
    })
}

/// Delivery failures are recorded on the record and never abort the run.
pub fn notify<M: Mailer + ?Sized>(
    ctx: &mut PipelineContext<'_>,
    mailer: &M,
) -> Result<(), StageError> {
    let outcome = compose_message(ctx.record()?, ctx.criteria())
        .and_then(|message| mailer.send(&message));

    let record = ctx.record_mut()?;
    let line = match outcome {
        Ok(()) => {
            record.communication_status = CommunicationStatus::EmailSent;
            record.communication_error = None;
            "Email sent successfully.".to_string()
        }
        Err(err) => {
            warn!(app_id = %record.app_id, error = %err, "status email not delivered");
            record.communication_status = CommunicationStatus::FailedToSend;
            record.communication_error = Some(err.to_string());
            format!("Email error: {err}")
        }
    };
    ctx.log(line);
    Ok(())
}
