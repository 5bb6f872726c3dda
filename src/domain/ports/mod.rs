//! Outbound adapter ports (C2–C6), injected into the application services
//! as `Arc<dyn Trait>` — no global singletons, per spec.md §9.

pub mod geocoder;
pub mod lock;
pub mod object_store;
pub mod payment;
pub mod sms;

pub use geocoder::Geocoder;
pub use lock::LockService;
pub use object_store::ObjectStore;
pub use payment::PaymentGateway;
pub use sms::SmsGateway;
