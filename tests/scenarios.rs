//! End-to-end scenario tests (spec.md §8, S1-S6) run against in-memory fake
//! repositories and adapters, wired through the real application services —
//! no database, no network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use locksmith_dispatch::application::services::audit_service::AuditService;
use locksmith_dispatch::application::services::command_parser::CommandParser;
use locksmith_dispatch::application::services::job_factory::JobFactory;
use locksmith_dispatch::application::services::quote_dispatcher::QuoteDispatcher;
use locksmith_dispatch::application::services::session_engine::{
    CustomerInfo, LocationInput, RequestMetadata, SessionEngine,
};
use locksmith_dispatch::config::AppConfig;
use locksmith_dispatch::domain::audit::{AuditEvent, AuditRepository};
use locksmith_dispatch::domain::error::{DomainError, DomainResult};
use locksmith_dispatch::domain::job::{Job, JobRepository, JobStatus};
use locksmith_dispatch::domain::message::{Message, MessageRepository};
use locksmith_dispatch::domain::offer::{Offer, OfferRepository, OfferScope, OfferStatus};
use locksmith_dispatch::domain::photo::{Photo, PhotoRepository};
use locksmith_dispatch::domain::ports::geocoder::{ForwardGeocodeResult, Geocoder, ReverseGeocodeResult};
use locksmith_dispatch::domain::ports::lock::LockService as LockServiceTrait;
use locksmith_dispatch::domain::ports::object_store::ObjectStore;
use locksmith_dispatch::domain::ports::payment::{PaymentGateway, PaymentIntent, PaymentWebhookEvent};
use locksmith_dispatch::domain::ports::sms::{OutboundSms, SmsGateway};
use locksmith_dispatch::domain::provider::{Capabilities, Provider, ProviderRepository};
use locksmith_dispatch::domain::session::model::{ServiceType, SessionStatus, Urgency};
use locksmith_dispatch::domain::session::{Session, SessionRepository};
use locksmith_dispatch::infrastructure::adapters::lock::InProcessLockService;
use locksmith_dispatch::shared::{Cents, Phone};

// ---- fake repositories -----------------------------------------------

#[derive(Default)]
struct FakeSessionRepo {
    rows: Mutex<HashMap<String, Session>>,
}

#[async_trait]
impl SessionRepository for FakeSessionRepo {
    async fn insert(&self, session: Session) -> DomainResult<Session> {
        self.rows.lock().unwrap().insert(session.id.clone(), session.clone());
        Ok(session)
    }
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Session>> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }
    async fn find_all(&self) -> DomainResult<Vec<Session>> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }
    async fn find_latest_by_customer_phone(&self, phone: &str) -> DomainResult<Option<Session>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.customer.phone == phone)
            .max_by_key(|s| s.created_at)
            .cloned())
    }
    async fn find_by_payment_intent_id(&self, payment_intent_id: &str) -> DomainResult<Option<Session>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|s| s.payment_intent_id.as_deref() == Some(payment_intent_id))
            .cloned())
    }
    async fn save(&self, session: Session) -> DomainResult<()> {
        self.rows.lock().unwrap().insert(session.id.clone(), session);
        Ok(())
    }
    async fn compare_and_transition(
        &self,
        id: &str,
        from: &[SessionStatus],
        to: SessionStatus,
        mutate: Box<dyn FnOnce(&mut Session) + Send>,
    ) -> DomainResult<Option<Session>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(current) = rows.get_mut(id) else {
            return Ok(None);
        };
        if !from.contains(&current.status) {
            return Ok(None);
        }
        mutate(current);
        current.status = to;
        current.updated_at = Utc::now();
        Ok(Some(current.clone()))
    }
}

#[derive(Default)]
struct FakeOfferRepo {
    rows: Mutex<HashMap<String, Offer>>,
}

#[async_trait]
impl OfferRepository for FakeOfferRepo {
    async fn insert(&self, offer: Offer) -> DomainResult<Offer> {
        self.rows.lock().unwrap().insert(offer.id.clone(), offer.clone());
        Ok(offer)
    }
    async fn insert_many(&self, offers: Vec<Offer>) -> DomainResult<Vec<Offer>> {
        let mut rows = self.rows.lock().unwrap();
        for offer in &offers {
            rows.insert(offer.id.clone(), offer.clone());
        }
        Ok(offers)
    }
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Offer>> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }
    async fn find_by_session(&self, session_id: &str) -> DomainResult<Vec<Offer>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.scope.session_id() == Some(session_id))
            .cloned()
            .collect())
    }
    async fn find_by_job(&self, job_id: &str) -> DomainResult<Vec<Offer>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.scope.job_id() == Some(job_id))
            .cloned()
            .collect())
    }
    async fn find_latest_pending_for_provider(
        &self,
        provider_id: &str,
        session_scoped_only: Option<bool>,
    ) -> DomainResult<Option<Offer>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.provider_id == provider_id && o.status == OfferStatus::Pending)
            .filter(|o| match session_scoped_only {
                Some(true) => o.scope.session_id().is_some(),
                Some(false) => o.scope.job_id().is_some(),
                None => true,
            })
            .max_by_key(|o| o.sent_at)
            .cloned())
    }
    async fn find_contacted_provider_ids(&self, job_id: &str) -> DomainResult<Vec<String>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.scope.job_id() == Some(job_id))
            .map(|o| o.provider_id.clone())
            .collect())
    }
    async fn save(&self, offer: Offer) -> DomainResult<()> {
        self.rows.lock().unwrap().insert(offer.id.clone(), offer);
        Ok(())
    }
    async fn cancel_other_pending_for_job(&self, job_id: &str, keep_id: &str) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        for offer in rows.values_mut() {
            if offer.scope.job_id() == Some(job_id) && offer.id != keep_id && offer.status == OfferStatus::Pending {
                offer.status = OfferStatus::Canceled;
                offer.responded_at = Some(Utc::now());
            }
        }
        Ok(())
    }
    async fn cancel_all_pending_for_job(&self, job_id: &str) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        for offer in rows.values_mut() {
            if offer.scope.job_id() == Some(job_id) && offer.status == OfferStatus::Pending {
                offer.status = OfferStatus::Canceled;
                offer.responded_at = Some(Utc::now());
            }
        }
        Ok(())
    }
    async fn expire_pending_older_than(&self, now: DateTime<Utc>) -> DomainResult<Vec<Offer>> {
        let mut rows = self.rows.lock().unwrap();
        let mut expired = vec![];
        for offer in rows.values_mut() {
            if offer.is_expired(now) {
                offer.status = OfferStatus::Expired;
                expired.push(offer.clone());
            }
        }
        Ok(expired)
    }
    async fn count_unresolved_in_wave(&self, job_id: &str, wave_number: i32) -> DomainResult<i64> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.scope.job_id() == Some(job_id) && o.wave_number == wave_number && o.status == OfferStatus::Pending)
            .count() as i64)
    }
    async fn find_by_provider_message_id(&self, provider_message_id: &str) -> DomainResult<Option<Offer>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|o| o.provider_message_id.as_deref() == Some(provider_message_id))
            .cloned())
    }
}

#[derive(Default)]
struct FakeJobRepo {
    rows: Mutex<HashMap<String, Job>>,
}

#[async_trait]
impl JobRepository for FakeJobRepo {
    async fn insert(&self, job: Job) -> DomainResult<Job> {
        self.rows.lock().unwrap().insert(job.id.clone(), job.clone());
        Ok(job)
    }
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Job>> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }
    async fn find_all(&self) -> DomainResult<Vec<Job>> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }
    async fn find_by_payment_intent_id(&self, payment_intent_id: &str) -> DomainResult<Option<Job>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|j| j.payment_intent_id == payment_intent_id)
            .cloned())
    }
    async fn save(&self, job: Job) -> DomainResult<()> {
        self.rows.lock().unwrap().insert(job.id.clone(), job);
        Ok(())
    }
    async fn compare_and_transition(
        &self,
        id: &str,
        from: &[JobStatus],
        mutate: Box<dyn FnOnce(&mut Job) + Send>,
    ) -> DomainResult<Option<Job>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(current) = rows.get_mut(id) else {
            return Ok(None);
        };
        if !from.contains(&current.status) {
            return Ok(None);
        }
        mutate(current);
        current.updated_at = Utc::now();
        Ok(Some(current.clone()))
    }
}

#[derive(Default)]
struct FakeProviderRepo {
    rows: Mutex<HashMap<String, Provider>>,
}

#[async_trait]
impl ProviderRepository for FakeProviderRepo {
    async fn insert(&self, provider: Provider) -> DomainResult<Provider> {
        self.rows.lock().unwrap().insert(provider.id.clone(), provider.clone());
        Ok(provider)
    }
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Provider>> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }
    async fn find_by_phone(&self, phone: &str) -> DomainResult<Option<Provider>> {
        Ok(self.rows.lock().unwrap().values().find(|p| p.phone == phone).cloned())
    }
    async fn find_all(&self) -> DomainResult<Vec<Provider>> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }
    async fn update(&self, provider: Provider) -> DomainResult<()> {
        self.rows.lock().unwrap().insert(provider.id.clone(), provider);
        Ok(())
    }
    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.rows.lock().unwrap().remove(id);
        Ok(())
    }
    async fn find_eligible(
        &self,
        city: &str,
        service_type: ServiceType,
        exclude_ids: &[String],
        limit: Option<u64>,
    ) -> DomainResult<Vec<Provider>> {
        let rows = self.rows.lock().unwrap();
        let mut matches: Vec<Provider> = rows
            .values()
            .filter(|p| p.is_eligible_for(city, service_type) && !exclude_ids.contains(&p.id))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(limit) = limit {
            matches.truncate(limit as usize);
        }
        Ok(matches)
    }
}

#[derive(Default)]
struct FakeMessageRepo {
    rows: Mutex<Vec<Message>>,
}

#[async_trait]
impl MessageRepository for FakeMessageRepo {
    async fn insert(&self, message: Message) -> DomainResult<Message> {
        self.rows.lock().unwrap().push(message.clone());
        Ok(message)
    }
    async fn find_all(&self) -> DomainResult<Vec<Message>> {
        Ok(self.rows.lock().unwrap().clone())
    }
    async fn find_by_provider_message_id(&self, provider_message_id: &str) -> DomainResult<Option<Message>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.provider_message_id.as_deref() == Some(provider_message_id))
            .cloned())
    }
}

#[derive(Default)]
struct FakePhotoRepo {
    rows: Mutex<HashMap<String, Photo>>,
}

#[async_trait]
impl PhotoRepository for FakePhotoRepo {
    async fn insert(&self, photo: Photo) -> DomainResult<Photo> {
        self.rows.lock().unwrap().insert(photo.id.clone(), photo.clone());
        Ok(photo)
    }
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Photo>> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }
    async fn find_by_session(&self, session_id: &str) -> DomainResult<Vec<Photo>> {
        use locksmith_dispatch::domain::photo::PhotoScope;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|p| matches!(&p.scope, PhotoScope::Session(s) if s == session_id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct FakeAuditRepo {
    rows: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepo {
    async fn insert(&self, event: AuditEvent) -> DomainResult<()> {
        self.rows.lock().unwrap().push(event);
        Ok(())
    }
    async fn find_by_entity(&self, entity_type: &str, entity_id: &str) -> DomainResult<Vec<AuditEvent>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.entity_type == entity_type && e.entity_id == entity_id)
            .cloned()
            .collect())
    }
}

// ---- fake adapters -----------------------------------------------------

#[derive(Default)]
struct FakeSms {
    sent: Mutex<Vec<OutboundSms>>,
}

#[async_trait]
impl SmsGateway for FakeSms {
    async fn send(&self, message: OutboundSms) -> DomainResult<String> {
        let mut sent = self.sent.lock().unwrap();
        let sid = format!("SM{}", sent.len());
        sent.push(message);
        Ok(sid)
    }
}

struct FakeGeocoder;

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn forward(&self, address: &str) -> Option<ForwardGeocodeResult> {
        if address.contains("Washington") {
            return Some(ForwardGeocodeResult {
                address: address.to_string(),
                city: "Washington".to_string(),
                latitude: 38.89,
                longitude: -77.03,
            });
        }
        Some(ForwardGeocodeResult {
            address: address.to_string(),
            city: "Laredo".to_string(),
            latitude: 27.5,
            longitude: -99.5,
        })
    }
    async fn reverse(&self, latitude: f64, longitude: f64) -> Option<ReverseGeocodeResult> {
        Some(ReverseGeocodeResult {
            address: format!("{latitude},{longitude}"),
            city: "Laredo".to_string(),
        })
    }
}

struct FakePayment {
    refunds: Mutex<Vec<String>>,
}

impl FakePayment {
    fn new() -> Self {
        Self {
            refunds: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl PaymentGateway for FakePayment {
    async fn create_intent(&self, session_id: &str, _amount: Cents) -> DomainResult<PaymentIntent> {
        Ok(PaymentIntent {
            client_secret: format!("secret_{session_id}"),
            intent_id: format!("pi_{session_id}"),
        })
    }
    async fn confirm(&self, _intent_id: &str) -> DomainResult<bool> {
        Ok(true)
    }
    async fn refund(&self, payment_intent_id: &str, _amount: Option<Cents>, _reason: &str) -> DomainResult<String> {
        self.refunds.lock().unwrap().push(payment_intent_id.to_string());
        Ok(format!("re_{payment_intent_id}"))
    }
    fn verify_and_parse_webhook(&self, _body: &[u8], _signature_header: &str) -> DomainResult<PaymentWebhookEvent> {
        Err(DomainError::ExternalPermanent {
            service: "payment",
            message: "not used in these tests".to_string(),
        }
        .into())
    }
}

#[derive(Default)]
struct FakeObjectStore {
    uploaded: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn upload(&self, key: &str, bytes: &[u8], _content_type: &str) -> DomainResult<()> {
        self.uploaded.lock().unwrap().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
    async fn signed_view_url(&self, key: &str, ttl_seconds: u32) -> DomainResult<String> {
        let ttl_seconds = ttl_seconds.clamp(60, 3600);
        Ok(format!("https://fake-bucket/{key}?ttl={ttl_seconds}"))
    }
}

// ---- harness -------------------------------------------------------------

struct Harness {
    session_engine: Arc<SessionEngine>,
    dispatcher: Arc<QuoteDispatcher>,
    command_parser: Arc<CommandParser>,
    providers: Arc<FakeProviderRepo>,
    offers: Arc<FakeOfferRepo>,
    jobs: Arc<FakeJobRepo>,
    sms: Arc<FakeSms>,
    payment: Arc<FakePayment>,
    object_store: Arc<FakeObjectStore>,
    photos: Arc<FakePhotoRepo>,
    audit_repo: Arc<FakeAuditRepo>,
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.service_areas = vec!["Laredo".to_string()];
    config.dispatch.wave_size = 3;
    config.dispatch.wave_delay_seconds = 120;
    config
}

fn build_harness() -> Harness {
    let sessions: Arc<dyn SessionRepository> = Arc::new(FakeSessionRepo::default());
    let offers = Arc::new(FakeOfferRepo::default());
    let jobs = Arc::new(FakeJobRepo::default());
    let providers = Arc::new(FakeProviderRepo::default());
    let messages: Arc<dyn MessageRepository> = Arc::new(FakeMessageRepo::default());
    let photos = Arc::new(FakePhotoRepo::default());
    let audit_repo = Arc::new(FakeAuditRepo::default());
    let audit_repo_dyn: Arc<dyn AuditRepository> = audit_repo.clone();

    let sms = Arc::new(FakeSms::default());
    let geocoder: Arc<dyn Geocoder> = Arc::new(FakeGeocoder);
    let payment = Arc::new(FakePayment::new());
    let lock: Arc<dyn LockServiceTrait> = Arc::new(InProcessLockService::new());
    let object_store = Arc::new(FakeObjectStore::default());

    let audit = Arc::new(AuditService::new(audit_repo_dyn));
    let config = test_config();

    let dispatcher = Arc::new(QuoteDispatcher::new(
        offers.clone() as Arc<dyn OfferRepository>,
        jobs.clone() as Arc<dyn JobRepository>,
        providers.clone() as Arc<dyn ProviderRepository>,
        messages.clone(),
        sessions.clone(),
        sms.clone() as Arc<dyn SmsGateway>,
        lock,
        payment.clone() as Arc<dyn PaymentGateway>,
        audit.clone(),
        config.clone(),
    ));

    let job_factory = Arc::new(JobFactory::new(jobs.clone() as Arc<dyn JobRepository>));

    let session_engine = Arc::new(SessionEngine::new(
        sessions,
        geocoder,
        payment.clone() as Arc<dyn PaymentGateway>,
        audit.clone(),
        job_factory,
        dispatcher.clone(),
        config,
    ));

    let command_parser = Arc::new(CommandParser::new(
        providers.clone() as Arc<dyn ProviderRepository>,
        messages,
        dispatcher.clone(),
        audit,
    ));

    Harness {
        session_engine,
        dispatcher,
        command_parser,
        providers,
        offers,
        jobs,
        sms,
        payment,
        object_store,
        photos,
        audit_repo,
    }
}

fn active_provider(id: &str, phone: &str, city: &str, caps: Capabilities) -> Provider {
    Provider {
        id: id.to_string(),
        display_name: format!("Locksmith {id}"),
        phone: phone.to_string(),
        home_city: city.to_string(),
        capabilities: caps,
        is_active: true,
        is_available: true,
        notes: None,
        onboarded_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn home_lockout_caps() -> Capabilities {
    Capabilities {
        home_lockout: true,
        car_lockout: false,
        rekey: false,
        smart_lock: false,
    }
}

// ---- S1: happy path, single quote ---------------------------------------

#[tokio::test]
async fn s1_happy_path_single_quote() {
    let h = build_harness();
    h.providers
        .insert(active_provider("P1", "+19565550900", "Laredo", home_lockout_caps()))
        .await
        .unwrap();

    let session = h
        .session_engine
        .create_session(RequestMetadata::default())
        .await
        .unwrap();

    let session = h
        .session_engine
        .validate_location(
            &session.id,
            CustomerInfo {
                name: "Jane".to_string(),
                phone: Phone::normalize("9565550101").0,
                email: None,
            },
            LocationInput::Address("123 Main St, Laredo".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(session.status, SessionStatus::LocationValidated);
    assert_eq!(session.location.is_in_service_area, Some(true));

    let session = h
        .session_engine
        .select_service(&session.id, ServiceType::HomeLockout, Urgency::Standard, None, None, false)
        .await
        .unwrap();
    assert_eq!(session.status, SessionStatus::PendingApproval);
    assert_eq!(session.service.deposit_amount, Cents(4900));

    let offers = h.offers.find_by_session(&session.id).await.unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].status, OfferStatus::Pending);

    let provider = h.providers.find_by_id("P1").await.unwrap().unwrap();
    let reply = h.dispatcher.handle_accept(&provider, Some(Cents(7500))).await.unwrap();
    assert!(reply.contains("Quote"));

    let offers = h.offers.find_by_session(&session.id).await.unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].status, OfferStatus::Accepted);
    assert_eq!(offers[0].quoted_price, Some(Cents(7500)));
    assert_eq!(offers[0].quoted_price.unwrap().to_string(), "$75.00");

    let sent = h.sms.sent.lock().unwrap();
    assert!(sent.iter().any(|m| m.to == "+19565550101"));
}

// ---- S2: emergency surcharge --------------------------------------------

#[tokio::test]
async fn s2_emergency_surcharge_rounds_to_one_point_five_x() {
    let h = build_harness();
    h.providers
        .insert(active_provider(
            "P1",
            "+19565550900",
            "Laredo",
            Capabilities {
                home_lockout: false,
                car_lockout: false,
                rekey: false,
                smart_lock: true,
            },
        ))
        .await
        .unwrap();

    let session = h.session_engine.create_session(RequestMetadata::default()).await.unwrap();
    let session = h
        .session_engine
        .validate_location(
            &session.id,
            CustomerInfo {
                name: "Jane".to_string(),
                phone: "9565550101".to_string(),
                email: None,
            },
            LocationInput::Address("123 Main St, Laredo".to_string()),
        )
        .await
        .unwrap();

    let session = h
        .session_engine
        .select_service(&session.id, ServiceType::SmartLock, Urgency::Emergency, None, None, false)
        .await
        .unwrap();

    assert_eq!(session.service.deposit_amount, Cents(14850));
}

// ---- S3: out of service area --------------------------------------------

#[tokio::test]
async fn s3_out_of_service_area_rejects_location() {
    let h = build_harness();
    let session = h.session_engine.create_session(RequestMetadata::default()).await.unwrap();

    let session = h
        .session_engine
        .validate_location(
            &session.id,
            CustomerInfo {
                name: "Jane".to_string(),
                phone: "9565550101".to_string(),
                email: None,
            },
            LocationInput::Address("1600 Pennsylvania Ave, Washington".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(session.status, SessionStatus::LocationRejected);
    assert_eq!(session.location.is_in_service_area, Some(false));
}

// ---- S4: race on acceptance ----------------------------------------------

#[tokio::test]
async fn s4_race_on_job_acceptance_exactly_one_wins() {
    let h = build_harness();
    let caps = home_lockout_caps();
    h.providers
        .insert(active_provider("P1", "+19565550901", "Laredo", caps.clone()))
        .await
        .unwrap();
    h.providers
        .insert(active_provider("P2", "+19565550902", "Laredo", caps))
        .await
        .unwrap();

    let job = paid_job(&h, "Laredo").await;
    h.dispatcher.start_assignment_wave(&job).await.unwrap();

    let p1 = h.providers.find_by_id("P1").await.unwrap().unwrap();
    let p2 = h.providers.find_by_id("P2").await.unwrap().unwrap();

    let (r1, r2) = tokio::join!(
        h.dispatcher.handle_accept(&p1, None),
        h.dispatcher.handle_accept(&p2, None),
    );
    let r1 = r1.unwrap();
    let r2 = r2.unwrap();

    let winner_replies = [r1.clone(), r2.clone()]
        .iter()
        .filter(|r| r.contains("confirmed"))
        .count();
    assert_eq!(winner_replies, 1, "exactly one provider should be confirmed: {r1:?} {r2:?}");

    let job = h.jobs.find_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Assigned);
    assert!(job.assigned_provider_id.is_some());

    let offers = h.offers.find_by_job(&job.id).await.unwrap();
    let accepted = offers.iter().filter(|o| o.status == OfferStatus::Accepted).count();
    let pending = offers.iter().filter(|o| o.status == OfferStatus::Pending).count();
    assert_eq!(accepted, 1);
    assert_eq!(pending, 0, "no pending offers should remain for the job");
}

// ---- S5: all decline, next wave, then failure ----------------------------

#[tokio::test]
async fn s5_all_decline_then_next_wave_then_dispatch_exhausted() {
    let h = build_harness();
    let caps = home_lockout_caps();
    for (id, phone) in [("P1", "+19565550901"), ("P2", "+19565550902"), ("P3", "+19565550903")] {
        h.providers
            .insert(active_provider(id, phone, "Laredo", caps.clone()))
            .await
            .unwrap();
    }

    let job = paid_job(&h, "Laredo").await;
    h.dispatcher.start_assignment_wave(&job).await.unwrap();

    let job_after_wave1 = h.jobs.find_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(job_after_wave1.status, JobStatus::Offered);
    assert_eq!(job_after_wave1.current_wave, 1);

    for id in ["P1", "P2", "P3"] {
        let provider = h.providers.find_by_id(id).await.unwrap().unwrap();
        h.dispatcher.handle_decline(&provider).await.unwrap();
    }

    // wave exhausted all eligible providers (no new ones to contact) -> Failed
    let job_after = h.jobs.find_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(job_after.status, JobStatus::Failed);

    let refunds = h.payment.refunds.lock().unwrap();
    assert_eq!(refunds.len(), 1);
    assert_eq!(refunds[0], job.payment_intent_id);

    let sent = h.sms.sent.lock().unwrap();
    assert!(sent.iter().any(|m| m.body.to_lowercase().contains("refund")));
}

// ---- S6: photo path reconstruction + signed view URL --------------------

#[tokio::test]
async fn s6_photo_object_key_and_signed_view_url_ttl() {
    let h = build_harness();

    let photo = Photo {
        id: "P".to_string(),
        scope: locksmith_dispatch::domain::photo::PhotoScope::Session("S".to_string()),
        source: locksmith_dispatch::domain::photo::PhotoSource::WebUpload,
        bucket: "locksmith-photos".to_string(),
        content_type: "image/jpeg".to_string(),
        byte_count: 2048,
        mms_media_id: None,
        created_at: Utc::now(),
    };
    let key = photo.object_key("");
    assert_eq!(key, "sessions/S/P.jpg");

    h.object_store.upload(&key, b"fake jpeg bytes", "image/jpeg").await.unwrap();
    h.photos.insert(photo).await.unwrap();

    let default_url = h.object_store.signed_view_url(&key, 300).await.unwrap();
    assert!(default_url.contains("ttl=300"));

    let short_url = h.object_store.signed_view_url(&key, 60).await.unwrap();
    assert!(short_url.contains("ttl=60"));

    // below the floor gets clamped up to 60s
    let clamped_url = h.object_store.signed_view_url(&key, 5).await.unwrap();
    assert!(clamped_url.contains("ttl=60"));
}

// ---- helpers --------------------------------------------------------------

/// Builds a `Job` already in `Created` status as if produced by
/// `JobFactory::create_from_session`, without going through the full funnel —
/// S4/S5 only care about dispatch-wave behavior downstream of job creation.
async fn paid_job(h: &Harness, city: &str) -> Job {
    let job = Job {
        id: uuid::Uuid::new_v4().to_string(),
        session_id: "S".to_string(),
        customer_name: "Jane".to_string(),
        customer_phone: "+19565550101".to_string(),
        address: Some("123 Main St".to_string()),
        city: Some(city.to_string()),
        latitude: Some(27.5),
        longitude: Some(-99.5),
        service_type: ServiceType::HomeLockout,
        urgency: Urgency::Standard,
        description: None,
        vehicle: None,
        deposit_amount: Cents(4900),
        payment_intent_id: "pi_test".to_string(),
        payment_status: locksmith_dispatch::domain::job::PaymentStatus::Succeeded,
        refund_amount: None,
        refund_id: None,
        assigned_provider_id: None,
        assigned_at: None,
        status: JobStatus::Created,
        current_wave: 0,
        dispatch_started_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    h.jobs.insert(job.clone()).await.unwrap();
    job
}

#[tokio::test]
async fn command_parser_accept_routes_through_dispatcher_for_job_scoped_offer() {
    let h = build_harness();
    let caps = home_lockout_caps();
    h.providers
        .insert(active_provider("P1", "+19565550901", "Laredo", caps))
        .await
        .unwrap();

    let job = paid_job(&h, "Laredo").await;
    h.dispatcher.start_assignment_wave(&job).await.unwrap();

    let reply = h
        .command_parser
        .handle_inbound("+19565550901", "+19565550000", "YES", "SM-first")
        .await
        .unwrap();
    assert!(reply.contains("confirmed"));

    // Redelivery of the same provider message id is idempotent.
    let replay = h
        .command_parser
        .handle_inbound("+19565550901", "+19565550000", "YES", "SM-first")
        .await
        .unwrap();
    assert!(replay.contains("Already processed"));
}

// ---- invariant 4: every state-transitioning mutation writes exactly one
// AuditEvent -------------------------------------------------------------

#[tokio::test]
async fn invariant_every_session_transition_writes_one_audit_event() {
    let h = build_harness();
    let session = h.session_engine.create_session(RequestMetadata::default()).await.unwrap();

    let created = h.audit_repo.find_by_entity("session", &session.id).await.unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].event_type, "session_created");

    h.session_engine
        .validate_location(
            &session.id,
            CustomerInfo {
                name: "Jane".to_string(),
                phone: "9565550101".to_string(),
                email: None,
            },
            LocationInput::Address("123 Main St, Laredo".to_string()),
        )
        .await
        .unwrap();

    let events = h.audit_repo.find_by_entity("session", &session.id).await.unwrap();
    assert_eq!(events.len(), 2, "location_validated should append exactly one more event");
    assert_eq!(events[1].event_type, "location_validated");
}
