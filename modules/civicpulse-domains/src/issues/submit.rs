//! Submission pipeline: validate → resolve reporter → verify evidence →
//! persist → compose response.

use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use civicpulse_common::{geo, CivicError, Result, Verdict};

use crate::issues::model::{InsertIssue, Issue};
use crate::issues::validate::{validate, NewIssuePayload};
use crate::users::AnonymousReporter;
use crate::verification::EvidenceVerifier;

/// The composed result of a submission: the persisted issue plus the verdict
/// that was attached to it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedIssue {
    #[serde(flatten)]
    pub issue: Issue,
    pub ai_verification: Verdict,
}

/// Create a new issue from a raw submission.
///
/// Validation failures are reported before any external call or write. The
/// verifier is called at most once, synchronously, and cannot fail the
/// submission; a persistence failure after verification surfaces as
/// `SubmissionFailed`; the verdict is not separately recoverable, so a retry
/// re-runs verification.
pub async fn submit_issue(
    payload: NewIssuePayload,
    caller: Option<Uuid>,
    verifier: &EvidenceVerifier,
    anonymous: &AnonymousReporter,
    pool: &PgPool,
) -> Result<SubmittedIssue> {
    let valid = validate(payload)?;

    let reporter = match caller {
        Some(id) => id,
        None => anonymous.resolve(pool).await?,
    };

    let evidence_url = valid.images.first().map(String::as_str);
    let verdict = verifier.verify(evidence_url, &valid.description).await;

    let location_ewkt = geo::encode_point(valid.longitude, valid.latitude)?;

    let id = Uuid::new_v4();
    let issue = Issue::insert(
        InsertIssue {
            id,
            title: valid.title,
            description: valid.description,
            category: valid.category,
            reported_by: reporter,
            location_ewkt,
            images: valid.images,
            verdict: verdict.clone(),
        },
        pool,
    )
    .await
    .map_err(|e| match e {
        CivicError::Database(source) => CivicError::SubmissionFailed(source),
        other => other,
    })?;

    info!(
        issue_id = %issue.id,
        reporter = %reporter,
        ai_status = ?verdict.status,
        "Issue submitted"
    );

    Ok(SubmittedIssue {
        issue,
        ai_verification: verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use civicpulse_common::{IssueStatus, VerdictStatus};
    use chrono::Utc;

    #[test]
    fn submitted_issue_flattens_into_one_object() {
        let issue = Issue {
            id: Uuid::new_v4(),
            title: "Pothole on Main St".to_string(),
            description: String::new(),
            category: "Road".to_string(),
            status: IssueStatus::Reported,
            reported_by: Uuid::new_v4(),
            location: civicpulse_common::GeoPoint {
                longitude: -74.0060,
                latitude: 40.7128,
            },
            images: vec![],
            ai_status: VerdictStatus::Uncertain,
            ai_confidence: 0.0,
            ai_analysis: "No evidence provided for analysis.".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let submitted = SubmittedIssue {
            issue: issue.clone(),
            ai_verification: Verdict::uncertain("No evidence provided for analysis."),
        };

        let json = serde_json::to_value(&submitted).unwrap();
        assert_eq!(json["id"], issue.id.to_string());
        assert_eq!(json["status"], "REPORTED");
        assert_eq!(json["aiVerification"]["status"], "UNCERTAIN");
        assert_eq!(json["aiVerification"]["confidence"], 0.0);
    }
}
