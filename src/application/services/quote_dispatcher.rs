//! Quote Dispatcher (C8, spec.md §4.2) — the fan-out engine. Mode A sends
//! one open quote-request wave per session; Mode B runs wave-based job
//! assignment with the five-step locked acceptance protocol.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::application::services::audit_service::AuditService;
use crate::config::AppConfig;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::job::{Job, JobRepository, JobStatus, PaymentStatus};
use crate::domain::message::{Message, MessageRepository};
use crate::domain::offer::{Offer, OfferRepository, OfferScope, OfferStatus};
use crate::domain::ports::lock::LockService;
use crate::domain::ports::payment::PaymentGateway;
use crate::domain::ports::sms::{OutboundSms, SmsGateway};
use crate::domain::provider::{Provider, ProviderRepository};
use crate::domain::session::{Session, SessionRepository};
use crate::shared::Cents;

pub struct QuoteDispatcher {
    offers: Arc<dyn OfferRepository>,
    jobs: Arc<dyn JobRepository>,
    providers: Arc<dyn ProviderRepository>,
    messages: Arc<dyn MessageRepository>,
    sessions: Arc<dyn SessionRepository>,
    sms: Arc<dyn SmsGateway>,
    lock: Arc<dyn LockService>,
    payment: Arc<dyn PaymentGateway>,
    audit: Arc<AuditService>,
    config: AppConfig,
}

impl QuoteDispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        offers: Arc<dyn OfferRepository>,
        jobs: Arc<dyn JobRepository>,
        providers: Arc<dyn ProviderRepository>,
        messages: Arc<dyn MessageRepository>,
        sessions: Arc<dyn SessionRepository>,
        sms: Arc<dyn SmsGateway>,
        lock: Arc<dyn LockService>,
        payment: Arc<dyn PaymentGateway>,
        audit: Arc<AuditService>,
        config: AppConfig,
    ) -> Self {
        Self {
            offers,
            jobs,
            providers,
            messages,
            sessions,
            sms,
            lock,
            payment,
            audit,
            config,
        }
    }

    async fn log_outbound(&self, to: &str, body: &str, provider_message_id: Option<String>) {
        let message = Message::new_outbound(
            Uuid::new_v4().to_string(),
            to.to_string(),
            self.config.sms.from.clone(),
            body.to_string(),
            provider_message_id,
        );
        if let Err(e) = self.messages.insert(message).await {
            warn!(to, error = %e, "failed to log outbound message");
        }
    }

    async fn send_and_log(&self, to: &str, body: &str) -> Option<String> {
        let outbound = OutboundSms {
            to: to.to_string(),
            from: self.config.sms.from.clone(),
            body: body.to_string(),
        };
        match self.sms.send(outbound).await {
            Ok(sid) => {
                self.log_outbound(to, body, Some(sid.clone())).await;
                Some(sid)
            }
            Err(e) => {
                warn!(to, error = %e, "sms send failed");
                None
            }
        }
    }

    /// Mode A: triggered synchronously by `SessionEngine::select_service`.
    pub async fn broadcast_quote_requests(&self, session: &Session) -> DomainResult<usize> {
        let service_type = session.service.service_type.ok_or(DomainError::Validation {
            field: "service_type",
            message: "session has no service selected".to_string(),
        })?;
        let urgency = session.service.urgency.ok_or(DomainError::Validation {
            field: "urgency",
            message: "session has no urgency selected".to_string(),
        })?;
        let city = session.location.city.clone().unwrap_or_default();
        let address = session.location.address.clone().unwrap_or_default();

        let providers = self.providers.find_eligible(&city, service_type, &[], None).await?;
        let urgency_label = if urgency.is_emergency() { "EMERGENCY" } else { "standard" };
        let body = format!(
            "New {} request — {urgency_label}. Location: {address}. Reply `Y $<price>` to quote or `N` to decline.",
            service_type.display_name()
        );

        let mut sent = 0usize;
        for provider in &providers {
            let mut offer = Offer::new_session_offer(
                Uuid::new_v4().to_string(),
                session.id.clone(),
                provider.id.clone(),
            );
            let inserted = self.offers.insert(offer.clone()).await?;
            offer.id = inserted.id;

            if let Some(sid) = self.send_and_log(&provider.phone, &body).await {
                offer.provider_message_id = Some(sid);
                self.offers.save(offer).await?;
                sent += 1;
            } else {
                self.audit
                    .record_system(
                        "offer",
                        &offer.id,
                        "quote_send_failed",
                        json!({ "provider_id": provider.id }),
                    )
                    .await;
            }
        }

        self.audit
            .record_system(
                "session",
                &session.id,
                "quotes_broadcast",
                json!({ "eligible": providers.len(), "sent": sent }),
            )
            .await;

        Ok(sent)
    }

    /// Mode B: triggered by Job creation (or an admin restart command).
    pub async fn start_assignment_wave(&self, job: &Job) -> DomainResult<()> {
        let transitioned = self
            .jobs
            .compare_and_transition(
                &job.id,
                &[JobStatus::Created],
                Box::new(|j: &mut Job| {
                    j.status = JobStatus::Dispatching;
                    j.dispatch_started_at = Some(chrono::Utc::now());
                }),
            )
            .await?;

        if transitioned.is_none() {
            return Ok(());
        }

        self.audit
            .record_system("job", &job.id, "dispatch_started", json!({}))
            .await;

        self.send_wave(&job.id).await
    }

    /// Re-read the job, contact up to `WAVE_SIZE` new eligible providers, or
    /// fail the job if the eligible pool is exhausted.
    async fn send_wave(&self, job_id: &str) -> DomainResult<()> {
        let job = self
            .jobs
            .find_by_id(job_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "job",
                field: "id",
                value: job_id.to_string(),
            })?;

        if !job.status.is_dispatchable() {
            return Ok(());
        }

        let contacted = self.offers.find_contacted_provider_ids(job_id).await?;
        let city = job.city.clone().unwrap_or_default();
        let candidates = self
            .providers
            .find_eligible(&city, job.service_type, &contacted, Some(self.config.dispatch.wave_size))
            .await?;

        if candidates.is_empty() {
            return self.fail_job(&job).await;
        }

        let wave_number = job.current_wave + 1;
        let expires_at = chrono::Utc::now() + chrono::Duration::seconds(self.config.dispatch.wave_delay_seconds);

        let offers: Vec<Offer> = candidates
            .iter()
            .map(|p| {
                Offer::new_job_offer(
                    Uuid::new_v4().to_string(),
                    job_id.to_string(),
                    p.id.clone(),
                    wave_number,
                    expires_at,
                )
            })
            .collect();
        let inserted = self.offers.insert_many(offers).await?;

        self.jobs
            .compare_and_transition(
                job_id,
                &[JobStatus::Dispatching, JobStatus::Offered],
                Box::new(move |j: &mut Job| {
                    j.status = JobStatus::Offered;
                    j.current_wave = wave_number;
                }),
            )
            .await?;

        self.audit
            .record_system(
                "job",
                job_id,
                "wave_sent",
                json!({ "wave_number": wave_number, "provider_count": candidates.len() }),
            )
            .await;

        let urgency_label = if job.urgency.is_emergency() { "EMERGENCY" } else { "standard" };
        let address = job.address.clone().unwrap_or_default();
        let body = format!(
            "Job available: {} — {urgency_label}. {address}. Reply YES to accept or NO to decline.",
            job.service_type.display_name()
        );

        for (provider, offer) in candidates.iter().zip(inserted.into_iter()) {
            if let Some(sid) = self.send_and_log(&provider.phone, &body).await {
                let mut offer = offer;
                offer.provider_message_id = Some(sid);
                self.offers.save(offer).await?;
            }
        }

        Ok(())
    }

    async fn fail_job(&self, job: &Job) -> DomainResult<()> {
        let failed = self
            .jobs
            .compare_and_transition(
                &job.id,
                &[JobStatus::Created, JobStatus::Dispatching, JobStatus::Offered],
                Box::new(|j: &mut Job| j.status = JobStatus::Failed),
            )
            .await?;

        let Some(job) = failed else {
            return Ok(());
        };

        self.audit
            .record_system("job", &job.id, "dispatch_exhausted", json!({}))
            .await;

        match self.payment.refund(&job.payment_intent_id, None, "dispatch_exhausted").await {
            Ok(refund_id) => {
                self.jobs
                    .compare_and_transition(
                        &job.id,
                        &[JobStatus::Failed],
                        Box::new(move |j: &mut Job| {
                            j.refund_id = Some(refund_id);
                            j.refund_amount = Some(j.deposit_amount);
                            j.payment_status = PaymentStatus::Refunded;
                        }),
                    )
                    .await?;
                self.audit
                    .record_system("job", &job.id, "refund_issued", json!({}))
                    .await;
            }
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "refund failed after dispatch exhaustion");
            }
        }

        let body = "We're sorry, we couldn't find an available locksmith for your request. Your deposit will be refunded.".to_string();
        self.send_and_log(&job.customer_phone, &body).await;

        Ok(())
    }

    /// Routes an `Accept` command (spec.md §4.2). Applies the ambiguous
    /// dual-pending tie-break: the most recently sent Pending offer across
    /// both scopes is the target.
    pub async fn handle_accept(&self, provider: &Provider, price: Option<Cents>) -> DomainResult<String> {
        let offer = self.offers.find_latest_pending_for_provider(&provider.id, None).await?;
        let Some(offer) = offer else {
            return Ok("You have no pending offers right now.".to_string());
        };

        match offer.scope {
            OfferScope::Session(_) => {
                let Some(price) = price else {
                    return Err(DomainError::Validation {
                        field: "price",
                        message: "reply with a price, e.g. Y $75.00".to_string(),
                    }
                    .into());
                };
                self.accept_session_offer(offer, price).await
            }
            OfferScope::Job(_) => self.accept_job_offer(offer, provider).await,
        }
    }

    async fn accept_session_offer(&self, offer: Offer, price: Cents) -> DomainResult<String> {
        let mut updated = offer.clone();
        updated.status = OfferStatus::Accepted;
        updated.quoted_price = Some(price);
        updated.responded_at = Some(chrono::Utc::now());
        self.offers.save(updated.clone()).await?;

        self.audit
            .record_system("offer", &updated.id, "offer_accepted", json!({ "quoted_price": price.0 }))
            .await;

        if let Some(session_id) = updated.scope.session_id() {
            if let Some(session) = self.sessions.find_by_id(session_id).await? {
                let body = format!(
                    "Good news! A locksmith quoted {price} for your request. Visit {} to review your quotes.",
                    self.config.frontend_url
                );
                self.send_and_log(&session.customer.phone, &body).await;
            }
        }

        Ok(format!("Quote of {price} recorded. We'll let the customer know."))
    }

    async fn accept_job_offer(&self, offer: Offer, provider: &Provider) -> DomainResult<String> {
        let job_id = offer.scope.job_id().unwrap().to_string();
        let lock_key = format!("job_assignment:{job_id}");

        let Some(token) = self.lock.try_acquire(&lock_key, Duration::from_secs(30)).await else {
            self.cancel_offer(&offer, "lock contended").await?;
            return Ok("Job already assigned.".to_string());
        };

        let result = self.accept_job_offer_locked(&job_id, &offer, provider).await;
        self.lock.release(&lock_key, &token).await;
        result
    }

    async fn accept_job_offer_locked(
        &self,
        job_id: &str,
        offer: &Offer,
        provider: &Provider,
    ) -> DomainResult<String> {
        let job = self
            .jobs
            .find_by_id(job_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "job",
                field: "id",
                value: job_id.to_string(),
            })?;

        if !job.status.is_dispatchable() {
            self.cancel_offer(offer, "job no longer available").await?;
            return Ok("Job no longer available.".to_string());
        }

        let provider_id = provider.id.clone();
        let now = chrono::Utc::now();
        let updated_job = self
            .jobs
            .compare_and_transition(
                job_id,
                &[JobStatus::Dispatching, JobStatus::Offered],
                Box::new(move |j: &mut Job| {
                    j.status = JobStatus::Assigned;
                    j.assigned_provider_id = Some(provider_id);
                    j.assigned_at = Some(now);
                }),
            )
            .await?;

        let Some(updated_job) = updated_job else {
            self.cancel_offer(offer, "job already assigned").await?;
            return Ok("Job already assigned.".to_string());
        };

        let mut accepted = offer.clone();
        accepted.status = OfferStatus::Accepted;
        accepted.responded_at = Some(now);
        self.offers.save(accepted).await?;
        self.offers.cancel_other_pending_for_job(job_id, &offer.id).await?;

        self.audit
            .record_system("job", job_id, "job_assigned", json!({ "provider_id": provider.id }))
            .await;

        let provider_body = format!(
            "You're assigned! {} at {}. Customer: {}.",
            updated_job.service_type.display_name(),
            updated_job.address.clone().unwrap_or_default(),
            updated_job.customer_phone
        );
        self.send_and_log(&provider.phone, &provider_body).await;

        let customer_body = "A locksmith has been assigned to your request and will be in touch shortly.".to_string();
        self.send_and_log(&updated_job.customer_phone, &customer_body).await;

        Ok("You're confirmed for this job!".to_string())
    }

    async fn cancel_offer(&self, offer: &Offer, reason: &str) -> DomainResult<()> {
        let mut canceled = offer.clone();
        canceled.status = OfferStatus::Canceled;
        canceled.responded_at = Some(chrono::Utc::now());
        self.offers.save(canceled).await?;
        self.audit
            .record_system("offer", &offer.id, "offer_canceled", json!({ "reason": reason }))
            .await;
        Ok(())
    }

    /// Routes a `Decline` command. For job-scoped offers, evaluates wave
    /// progression once the whole wave is resolved.
    pub async fn handle_decline(&self, provider: &Provider) -> DomainResult<String> {
        let offer = self.offers.find_latest_pending_for_provider(&provider.id, None).await?;
        let Some(offer) = offer else {
            return Ok("Thanks, noted.".to_string());
        };

        let mut declined = offer.clone();
        declined.status = OfferStatus::Declined;
        declined.responded_at = Some(chrono::Utc::now());
        self.offers.save(declined).await?;

        self.audit
            .record_system("offer", &offer.id, "offer_declined", json!({}))
            .await;

        if let OfferScope::Job(job_id) = &offer.scope {
            self.progress_wave_if_resolved(job_id, offer.wave_number).await?;
        }

        Ok("Thanks, we'll contact the next provider.".to_string())
    }

    /// Demotes stale Pending offers to Expired and records an audit event
    /// per offer. Does not itself progress any wave — callers that need
    /// `count_unresolved_in_wave` to reflect expiry call this first, then
    /// make their own progression decision, so this never recurses into
    /// `progress_wave_if_resolved` for the wave the caller is already
    /// resolving.
    async fn expire_and_audit(&self, now: chrono::DateTime<chrono::Utc>) -> DomainResult<Vec<Offer>> {
        let expired = self.offers.expire_pending_older_than(now).await?;
        for offer in &expired {
            self.audit
                .record_system("offer", &offer.id, "offer_expired", json!({}))
                .await;
        }
        Ok(expired)
    }

    /// Runs the expiry sweep (spec.md §5) before checking whether `wave_number`
    /// is now fully resolved, so a wave containing only non-responding
    /// providers still progresses instead of stalling forever.
    async fn progress_wave_if_resolved(&self, job_id: &str, wave_number: i32) -> DomainResult<()> {
        self.expire_and_audit(chrono::Utc::now()).await?;

        let unresolved = self.offers.count_unresolved_in_wave(job_id, wave_number).await?;
        if unresolved > 0 {
            return Ok(());
        }
        let job = self
            .jobs
            .find_by_id(job_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "job",
                field: "id",
                value: job_id.to_string(),
            })?;
        if !job.status.is_dispatchable() {
            return Ok(());
        }
        self.send_wave(job_id).await
    }

    /// Lazy sweep (spec.md §5): demotes stale Pending offers to Expired and
    /// advances wave progression for any job whose wave is now fully
    /// resolved as a result. Called at the top of every wave decision point
    /// (via `progress_wave_if_resolved`); also callable directly by an
    /// admin/cron caller or a periodic background task for jobs whose
    /// providers never reply at all (so `handle_decline` is never triggered).
    pub async fn expire_stale_offers(&self) -> DomainResult<usize> {
        let expired = self.expire_and_audit(chrono::Utc::now()).await?;

        let mut waves_to_check: HashSet<(String, i32)> = HashSet::new();
        for offer in &expired {
            if let Some(job_id) = offer.scope.job_id() {
                waves_to_check.insert((job_id.to_string(), offer.wave_number));
            }
        }
        for (job_id, wave_number) in waves_to_check {
            self.progress_wave_if_resolved(&job_id, wave_number).await?;
        }

        Ok(expired.len())
    }

    /// Admin dispatch-control: re-opens a `Failed` job (or no-ops on an
    /// already-active one) and sends the next wave immediately, instead of
    /// waiting on the lazy sweep.
    pub async fn admin_restart_wave(&self, job_id: &str, actor_email: Option<&str>) -> DomainResult<()> {
        let reopened = self
            .jobs
            .compare_and_transition(
                job_id,
                &[JobStatus::Failed],
                Box::new(|j: &mut Job| j.status = JobStatus::Dispatching),
            )
            .await?;

        if reopened.is_some() {
            self.audit
                .record(
                    "job",
                    job_id,
                    "dispatch_reopened",
                    crate::domain::audit::ActorType::Admin,
                    actor_email,
                    json!({}),
                )
                .await;
        }

        self.send_wave(job_id).await
    }

    /// Admin override: force-assigns `provider_id` to the job regardless of
    /// wave state, canceling any still-Pending offers. Bypasses the SMS
    /// accept protocol entirely, so no lock is needed — this is the only
    /// writer invoked from the trusted admin surface for this job.
    pub async fn admin_assign(
        &self,
        job_id: &str,
        provider_id: &str,
        actor_email: Option<&str>,
    ) -> DomainResult<Job> {
        let provider = self
            .providers
            .find_by_id(provider_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "provider",
                field: "id",
                value: provider_id.to_string(),
            })?;

        let now = chrono::Utc::now();
        let assigned_id = provider_id.to_string();
        let updated = self
            .jobs
            .compare_and_transition(
                job_id,
                &[JobStatus::Created, JobStatus::Dispatching, JobStatus::Offered],
                Box::new(move |j: &mut Job| {
                    j.status = JobStatus::Assigned;
                    j.assigned_provider_id = Some(assigned_id);
                    j.assigned_at = Some(now);
                }),
            )
            .await?
            .ok_or(DomainError::PreconditionFailed {
                entity: "job",
                status: "not in a dispatchable state".to_string(),
                expected: "created, dispatching, or offered",
            })?;

        self.offers.cancel_all_pending_for_job(job_id).await?;

        self.audit
            .record(
                "job",
                job_id,
                "admin_assigned",
                crate::domain::audit::ActorType::Admin,
                actor_email,
                json!({ "provider_id": provider_id }),
            )
            .await;

        let provider_body = format!(
            "You're assigned! {} at {}. Customer: {}.",
            updated.service_type.display_name(),
            updated.address.clone().unwrap_or_default(),
            updated.customer_phone
        );
        self.send_and_log(&provider.phone, &provider_body).await;

        let customer_body = "A locksmith has been assigned to your request and will be in touch shortly.".to_string();
        self.send_and_log(&updated.customer_phone, &customer_body).await;

        Ok(updated)
    }

    /// Admin override: cancels a job outright, canceling any Pending offers.
    /// Does not issue a refund — use `admin_refund` for that, since the two
    /// are independent admin actions (a job may be canceled for reasons that
    /// don't warrant a refund, e.g. customer no-show after assignment).
    pub async fn admin_cancel_job(
        &self,
        job_id: &str,
        reason: &str,
        actor_email: Option<&str>,
    ) -> DomainResult<Job> {
        let updated = self
            .jobs
            .compare_and_transition(
                job_id,
                &[
                    JobStatus::Created,
                    JobStatus::Dispatching,
                    JobStatus::Offered,
                    JobStatus::Assigned,
                    JobStatus::EnRoute,
                ],
                Box::new(|j: &mut Job| j.status = JobStatus::Canceled),
            )
            .await?
            .ok_or(DomainError::PreconditionFailed {
                entity: "job",
                status: "already in a terminal state".to_string(),
                expected: "not yet canceled or completed",
            })?;

        self.offers.cancel_all_pending_for_job(job_id).await?;

        self.audit
            .record(
                "job",
                job_id,
                "admin_canceled",
                crate::domain::audit::ActorType::Admin,
                actor_email,
                json!({ "reason": reason }),
            )
            .await;

        Ok(updated)
    }

    /// Admin override: issues a full or partial refund against the job's
    /// payment intent and records the result on the job row.
    pub async fn admin_refund(
        &self,
        job_id: &str,
        amount: Option<Cents>,
        reason: &str,
        actor_email: Option<&str>,
    ) -> DomainResult<Job> {
        let job = self
            .jobs
            .find_by_id(job_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "job",
                field: "id",
                value: job_id.to_string(),
            })?;

        let refund_id = self.payment.refund(&job.payment_intent_id, amount, reason).await?;
        let refund_amount = amount.unwrap_or(job.deposit_amount);
        let is_partial = refund_amount.0 < job.deposit_amount.0;

        let updated = self
            .jobs
            .compare_and_transition(
                job_id,
                &[
                    JobStatus::Created,
                    JobStatus::Dispatching,
                    JobStatus::Offered,
                    JobStatus::Assigned,
                    JobStatus::EnRoute,
                    JobStatus::Completed,
                    JobStatus::Canceled,
                    JobStatus::Failed,
                ],
                Box::new(move |j: &mut Job| {
                    j.refund_id = Some(refund_id.clone());
                    j.refund_amount = Some(refund_amount);
                    j.payment_status = if is_partial {
                        PaymentStatus::PartiallyRefunded
                    } else {
                        PaymentStatus::Refunded
                    };
                }),
            )
            .await?
            .ok_or(DomainError::NotFound {
                entity: "job",
                field: "id",
                value: job_id.to_string(),
            })?;

        self.audit
            .record(
                "job",
                job_id,
                "admin_refund_issued",
                crate::domain::audit::ActorType::Admin,
                actor_email,
                json!({ "amount_cents": refund_amount.0, "reason": reason }),
            )
            .await;

        Ok(updated)
    }
}
