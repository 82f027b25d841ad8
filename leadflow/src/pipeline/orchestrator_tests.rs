//! Campaign run behaviour across success, fallback and fault mixes.

use super::{CampaignPipeline, CancellationToken};
use crate::core::{Lead, Priority, RunSummary, SendStatus};
use crate::errors::GenerationError;
use crate::events::{CampaignEvent, CollectingEventSink, EventSink};
use crate::services::{Mailer, MockMailer};
use crate::stages::FALLBACK_NOTES;
use crate::testing::{
    enrichment_json, outreach_json, sample_lead, sample_leads, scoring_json, MockTextClient,
    RecordingMailer,
};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Answers each stage by recognising its prompt; fails for `Company {fail}`.
fn responder_failing_for(fail: usize) -> MockTextClient {
    let marker = format!("Company {fail}");
    MockTextClient::new().with_responder(move |prompt| {
        if prompt.contains(&marker) {
            Err(GenerationError::Network("reset by peer".into()))
        } else if prompt.contains("priority assessment") {
            Ok(scoring_json("High", 8))
        } else if prompt.contains("buyer persona") {
            Ok(enrichment_json("Technical Decision Maker"))
        } else {
            Ok(outreach_json("Hello from us"))
        }
    })
}

fn pipeline(client: MockTextClient, mailer: impl Mailer + 'static) -> CampaignPipeline {
    CampaignPipeline::new(Arc::new(client), Arc::new(mailer))
}

#[tokio::test]
async fn test_reference_lead_with_every_call_failing() {
    let client = Arc::new(MockTextClient::new().always_failing());
    let mailer = Arc::new(RecordingMailer::new());
    let pipeline = CampaignPipeline::new(client.clone(), mailer.clone());

    let (leads, summary) = pipeline.run(vec![sample_lead()], false).await;

    let lead = &leads[0];
    assert_eq!(lead.priority, Some(Priority::Medium));
    assert_eq!(lead.priority_score, Some(5));
    assert_eq!(lead.ai_persona.as_deref(), Some("General Business Contact"));
    assert!(lead.email_subject.as_deref().unwrap().contains("Acme"));
    assert_eq!(lead.email_status, SendStatus::Draft);
    assert_eq!(lead.email_sent_at, None);

    assert_eq!(client.call_count(), 3);
    assert_eq!(mailer.attempts(), 0);
    assert_eq!(summary.total, 1);
    assert_eq!(summary.medium, 1);
}

#[tokio::test]
async fn test_all_calls_failing_still_returns_every_lead() {
    let pipeline = pipeline(MockTextClient::new().always_failing(), RecordingMailer::new());

    let (leads, summary) = pipeline.run(sample_leads(4), true).await;

    assert_eq!(leads.len(), 4);
    for lead in &leads {
        assert_eq!(lead.priority_score, Some(5));
        assert_eq!(lead.ai_persona.as_deref(), Some("General Business Contact"));
        assert!(lead.email_body.as_deref().unwrap().starts_with("Hi Lead,"));
        assert_eq!(lead.email_status, SendStatus::Sent);
    }
    assert_eq!(summary.sent, 4);
}

#[tokio::test]
async fn test_empty_input_makes_no_calls() {
    let client = Arc::new(MockTextClient::new());
    let pipeline = CampaignPipeline::new(client.clone(), Arc::new(RecordingMailer::new()));

    let (leads, summary) = pipeline.run(Vec::new(), true).await;

    assert!(leads.is_empty());
    assert_eq!(summary, RunSummary::default());
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_one_send_failure_among_three() {
    let mailer = RecordingMailer::new().failing_for("lead1@example.com");
    let pipeline = pipeline(MockTextClient::new().always_failing(), mailer);

    let (leads, summary) = pipeline.run(sample_leads(3), true).await;

    let statuses: Vec<_> = leads.iter().map(|l| l.email_status).collect();
    assert_eq!(
        statuses,
        vec![SendStatus::Sent, SendStatus::Failed, SendStatus::Sent]
    );
    assert!(leads[0].email_sent_at.is_some());
    assert!(leads[1].email_sent_at.is_none());
    assert_eq!((summary.sent, summary.failed, summary.errors), (2, 1, 0));
}

#[tokio::test]
async fn test_order_preserved_with_mixed_outcomes() {
    let input = sample_leads(5);
    let pipeline = pipeline(responder_failing_for(2), RecordingMailer::new());

    let (leads, summary) = pipeline.run(input.clone(), false).await;

    let emails: Vec<_> = leads.iter().map(|l| l.email.clone()).collect();
    let expected: Vec<_> = input.iter().map(|l| l.email.clone()).collect();
    assert_eq!(emails, expected);

    assert_eq!(leads[1].priority, Some(Priority::High));
    assert_eq!(leads[1].ai_persona.as_deref(), Some("Technical Decision Maker"));
    assert_eq!(leads[2].priority, Some(Priority::Medium));
    assert_eq!(leads[2].email_subject.as_deref(), Some("Quick question for Company 2"));
    assert_eq!((summary.high, summary.medium), (4, 1));
}

#[tokio::test]
async fn test_outreach_failure_keeps_earlier_fields() {
    let client = MockTextClient::new()
        .with_response(scoring_json("Low", 3))
        .with_response(enrichment_json("Budget Holder"))
        .with_response("not json at all");

    let (leads, _) = pipeline(client, RecordingMailer::new())
        .run(vec![sample_lead()], false)
        .await;

    let lead = &leads[0];
    assert_eq!(lead.priority, Some(Priority::Low));
    assert_eq!(lead.priority_score, Some(3));
    assert_eq!(lead.ai_persona.as_deref(), Some("Budget Holder"));
    assert!(lead
        .enrichment_notes
        .as_deref()
        .unwrap()
        .contains("| Approach: Lead with engineering time saved"));
    assert_eq!(lead.email_subject.as_deref(), Some("Quick question for Acme"));
}

#[tokio::test]
async fn test_outreach_prompt_sees_enrichment() {
    let client = Arc::new(
        MockTextClient::new()
            .with_response(scoring_json("High", 9))
            .with_response(enrichment_json("Innovation Champion"))
            .with_response(outreach_json("Hi")),
    );
    let pipeline = CampaignPipeline::new(client.clone(), Arc::new(RecordingMailer::new()));

    pipeline.run(vec![sample_lead()], false).await;

    let calls = client.calls();
    assert!(calls[1].prompt.contains("Priority: High (score 9/10)"));
    assert!(calls[2].prompt.contains("Persona: Innovation Champion"));
    assert!(calls.iter().all(|c| c.structured_output));
}

#[tokio::test]
async fn test_panic_marks_lead_as_error_and_run_continues() {
    let client = MockTextClient::new()
        .with_response(scoring_json("High", 7))
        .with_panic("stage blew up")
        .always_failing();
    let sink = Arc::new(CollectingEventSink::new());
    let pipeline = pipeline(client, RecordingMailer::new()).with_event_sink(sink.clone());

    let (leads, summary) = pipeline.run(sample_leads(2), true).await;

    assert_eq!(leads[0].email_status, SendStatus::Error);
    assert_eq!(leads[0].priority, Some(Priority::High));
    assert_eq!(leads[0].email_subject, None);
    assert_eq!(leads[1].email_status, SendStatus::Sent);
    assert_eq!((summary.errors, summary.sent), (1, 1));

    assert!(sink.events().iter().any(|e| matches!(
        e,
        CampaignEvent::LeadFailed { index: 0, error, .. } if error == "stage blew up"
    )));
}

#[tokio::test]
async fn test_send_disabled_never_calls_mailer() {
    let mut mailer = MockMailer::new();
    mailer.expect_send().times(0);

    let (leads, _) = pipeline(MockTextClient::new().always_failing(), mailer)
        .run(sample_leads(2), false)
        .await;

    assert!(leads.iter().all(|l| l.email_status == SendStatus::Draft));
}

#[tokio::test]
async fn test_mailer_receives_drafted_lead() {
    let mut mailer = MockMailer::new();
    mailer
        .expect_send()
        .withf(|lead: &Lead| lead.email_subject.as_deref() == Some("Quick question for Acme"))
        .times(1)
        .returning(|_| true);

    let (leads, _) = pipeline(MockTextClient::new().always_failing(), mailer)
        .run(vec![sample_lead()], true)
        .await;

    assert_eq!(leads[0].email_status, SendStatus::Sent);
}

#[tokio::test]
async fn test_cancelled_before_start_returns_leads_untouched() {
    let client = Arc::new(MockTextClient::new());
    let pipeline = CampaignPipeline::new(client.clone(), Arc::new(RecordingMailer::new()));
    let token = CancellationToken::new();
    token.cancel("operator stop");

    let input = sample_leads(3);
    let (leads, summary) = pipeline.run_with_cancel(input.clone(), true, &token).await;

    assert_eq!(leads, input);
    assert!(summary.cancelled);
    assert_eq!(summary.total, 3);
    assert_eq!(client.call_count(), 0);
}

/// Cancels the run once the first lead completes.
struct CancelAfterFirst(Arc<CancellationToken>);

#[async_trait]
impl EventSink for CancelAfterFirst {
    async fn emit(&self, event: &CampaignEvent) {
        if matches!(event, CampaignEvent::LeadCompleted { index: 0, .. }) {
            self.0.cancel("enough");
        }
    }
}

#[tokio::test]
async fn test_cancel_between_leads() {
    let token = Arc::new(CancellationToken::new());
    let pipeline = pipeline(MockTextClient::new().always_failing(), RecordingMailer::new())
        .with_event_sink(Arc::new(CancelAfterFirst(token.clone())));

    let (leads, summary) = pipeline.run_with_cancel(sample_leads(3), false, &token).await;

    assert_eq!(leads.len(), 3);
    assert_eq!(leads[0].email_status, SendStatus::Draft);
    assert_eq!(leads[1].email_status, SendStatus::Pending);
    assert_eq!(leads[2].priority, None);
    assert!(summary.cancelled);
    assert_eq!(summary.medium, 1);
}

#[tokio::test]
async fn test_event_sequence_for_one_lead() {
    let sink = Arc::new(CollectingEventSink::new());
    let pipeline = pipeline(MockTextClient::new().always_failing(), RecordingMailer::new())
        .with_event_sink(sink.clone());

    pipeline.run(vec![sample_lead()], false).await;

    assert_eq!(
        sink.event_types(),
        vec![
            "campaign.started",
            "lead.started",
            "lead.completed",
            "campaign.completed"
        ]
    );
}

#[tokio::test]
async fn test_delay_only_between_leads() {
    let pipeline = pipeline(MockTextClient::new().always_failing(), RecordingMailer::new())
        .with_lead_delay(Duration::from_millis(30));

    let start = Instant::now();
    pipeline.run(vec![sample_lead()], false).await;
    assert!(start.elapsed() < Duration::from_millis(30));

    let start = Instant::now();
    pipeline.run(sample_leads(3), false).await;
    assert!(start.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn test_fallback_draft_notes_are_not_copied_to_lead() {
    let (leads, _) = pipeline(MockTextClient::new().always_failing(), RecordingMailer::new())
        .run(vec![sample_lead()], false)
        .await;

    let lead = &leads[0];
    assert!(!lead.email_body.as_deref().unwrap().contains(FALLBACK_NOTES));
    assert!(!lead.enrichment_notes.as_deref().unwrap().contains(FALLBACK_NOTES));
}
