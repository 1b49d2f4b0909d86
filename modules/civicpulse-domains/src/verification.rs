//! Best-effort authenticity check of submitted evidence.
//!
//! The verifier never raises to its caller: every failure mode (fetch error,
//! classifier outage, malformed reply, timeout) degrades to an UNCERTAIN
//! verdict so that issue submission is never blocked by verification
//! unavailability.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::warn;

use ai_client::util::{strip_code_blocks, truncate_to_char_boundary};
use ai_client::Gemini;
use civicpulse_common::{Verdict, VerdictStatus};

/// Analysis text of the verdict returned when a submission carries no
/// evidence. A short-circuit, not a failure.
pub const NO_EVIDENCE_ANALYSIS: &str = "No evidence provided for analysis.";

/// Analysis text of the degraded verdict returned when verification cannot
/// complete.
pub const UNAVAILABLE_ANALYSIS: &str = "AI verification unavailable at this time.";

const DEFAULT_MIME_TYPE: &str = "image/jpeg";
const MAX_DESCRIPTION_BYTES: usize = 2_000;

/// Seam to the external classification service. The production
/// implementation is Gemini; tests substitute a stub.
#[async_trait]
pub trait EvidenceClassifier: Send + Sync {
    /// Classify media bytes against an instruction prompt and return the raw
    /// text reply.
    async fn classify(&self, bytes: &[u8], mime_type: &str, prompt: &str) -> Result<String>;
}

#[async_trait]
impl EvidenceClassifier for Gemini {
    async fn classify(&self, bytes: &[u8], mime_type: &str, prompt: &str) -> Result<String> {
        self.classify_media(bytes, mime_type, prompt).await
    }
}

pub struct EvidenceVerifier {
    http: reqwest::Client,
    classifier: Arc<dyn EvidenceClassifier>,
}

impl EvidenceVerifier {
    /// `http` should carry the application-wide timeout: it bounds the
    /// evidence fetch, and the classifier is expected to share it.
    pub fn new(http: reqwest::Client, classifier: Arc<dyn EvidenceClassifier>) -> Self {
        Self { http, classifier }
    }

    /// Produce an authenticity verdict for the first piece of evidence.
    /// Makes at most one external classification call and never fails.
    pub async fn verify(&self, evidence_url: Option<&str>, description: &str) -> Verdict {
        let Some(url) = evidence_url else {
            return Verdict::uncertain(NO_EVIDENCE_ANALYSIS);
        };

        match self.check(url, description).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(url, error = %e, "Evidence verification degraded");
                Verdict::uncertain(UNAVAILABLE_ANALYSIS)
            }
        }
    }

    async fn check(&self, url: &str, description: &str) -> Result<Verdict> {
        let (bytes, mime_type) = self.fetch_evidence(url).await?;
        let prompt = build_prompt(description);
        let reply = self.classifier.classify(&bytes, &mime_type, &prompt).await?;
        parse_verdict(&reply).ok_or_else(|| anyhow!("unusable classifier reply: {reply}"))
    }

    /// Fetch the evidence bytes and their declared content type.
    async fn fetch_evidence(&self, url: &str) -> Result<(Vec<u8>, String)> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            bail!("evidence fetch failed with status {}", response.status());
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        let bytes = response.bytes().await?.to_vec();
        Ok((bytes, mime_type))
    }
}

/// The fixed classification instruction, with the reporter's description as
/// context.
fn build_prompt(description: &str) -> String {
    let description = truncate_to_char_boundary(description, MAX_DESCRIPTION_BYTES);
    format!(
        "Analyze this image or video of a reported civic issue (e.g. pothole, garbage, \
         broken street light). Judge whether it shows a REAL civic issue or looks \
         FAKE / AI-generated / unrelated to the report.\n\
         \n\
         Reporter's description: \"{description}\"\n\
         \n\
         Return a single JSON object with exactly these keys:\n\
         - status: \"REAL\" | \"FAKE\" | \"UNCERTAIN\"\n\
         - confidence: number between 0.0 and 1.0\n\
         - analysis: a short explanation (max 1 sentence)\n\
         \n\
         JSON only."
    )
}

/// Validate the untrusted reply into a typed verdict. `None` means the reply
/// is unusable and the caller degrades.
fn parse_verdict(reply: &str) -> Option<Verdict> {
    let cleaned = strip_code_blocks(reply);
    let value: serde_json::Value = serde_json::from_str(cleaned).ok()?;

    let status = VerdictStatus::from_str(value.get("status")?.as_str()?).ok()?;
    let confidence = value.get("confidence")?.as_f64()?;
    if !confidence.is_finite() {
        return None;
    }
    let analysis = value.get("analysis")?.as_str()?.to_string();

    Some(Verdict {
        status,
        confidence: confidence.clamp(0.0, 1.0),
        analysis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Classifier stub returning a canned reply (or an error) and counting
    /// invocations.
    struct StubClassifier {
        reply: Result<String, String>,
        calls: AtomicUsize,
    }

    impl StubClassifier {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EvidenceClassifier for StubClassifier {
        async fn classify(&self, _bytes: &[u8], _mime: &str, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(message) => Err(anyhow!("{message}")),
            }
        }
    }

    fn verifier_with(stub: Arc<StubClassifier>) -> EvidenceVerifier {
        EvidenceVerifier::new(reqwest::Client::new(), stub)
    }

    #[tokio::test]
    async fn no_evidence_short_circuits_without_external_call() {
        let stub = Arc::new(StubClassifier::replying("{}"));
        let verifier = verifier_with(stub.clone());

        let verdict = verifier.verify(None, "pothole").await;

        assert_eq!(verdict.status, VerdictStatus::Uncertain);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.analysis, NO_EVIDENCE_ANALYSIS);
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn unfetchable_evidence_degrades_without_classification() {
        let stub = Arc::new(StubClassifier::replying("{}"));
        let verifier = verifier_with(stub.clone());

        let verdict = verifier.verify(Some("not a valid url"), "pothole").await;

        assert_eq!(verdict.status, VerdictStatus::Uncertain);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.analysis, UNAVAILABLE_ANALYSIS);
        assert_eq!(stub.call_count(), 0);
    }

    #[test]
    fn parses_plain_json_reply() {
        let verdict = parse_verdict(
            r#"{"status":"REAL","confidence":0.92,"analysis":"Visible pothole matches description."}"#,
        )
        .unwrap();
        assert_eq!(verdict.status, VerdictStatus::Real);
        assert_eq!(verdict.confidence, 0.92);
        assert_eq!(verdict.analysis, "Visible pothole matches description.");
    }

    #[test]
    fn parses_fenced_reply() {
        let verdict = parse_verdict(
            "```json\n{\"status\":\"FAKE\",\"confidence\":0.8,\"analysis\":\"Rendered image.\"}\n```",
        )
        .unwrap();
        assert_eq!(verdict.status, VerdictStatus::Fake);
    }

    #[test]
    fn rejects_malformed_replies() {
        assert!(parse_verdict("I think this is probably real").is_none());
        assert!(parse_verdict(r#"{"status":"MAYBE","confidence":0.5,"analysis":"?"}"#).is_none());
        assert!(parse_verdict(r#"{"status":"REAL","analysis":"missing confidence"}"#).is_none());
        assert!(parse_verdict(r#"{"status":"REAL","confidence":"high","analysis":"x"}"#).is_none());
        assert!(parse_verdict("").is_none());
    }

    #[test]
    fn clamps_confidence_into_unit_interval() {
        let verdict =
            parse_verdict(r#"{"status":"REAL","confidence":1.7,"analysis":"x"}"#).unwrap();
        assert_eq!(verdict.confidence, 1.0);
        let verdict =
            parse_verdict(r#"{"status":"REAL","confidence":-0.2,"analysis":"x"}"#).unwrap();
        assert_eq!(verdict.confidence, 0.0);
    }

    #[test]
    fn prompt_carries_description_and_contract() {
        let prompt = build_prompt("Large pothole near the bus stop");
        assert!(prompt.contains("Large pothole near the bus stop"));
        assert!(prompt.contains("\"REAL\" | \"FAKE\" | \"UNCERTAIN\""));
        assert!(prompt.contains("JSON only."));
    }

    #[test]
    fn prompt_truncates_oversized_description() {
        let prompt = build_prompt(&"x".repeat(10_000));
        assert!(prompt.len() < 4_000);
    }
}
