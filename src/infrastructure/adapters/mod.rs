//! Outbound adapter implementations for C3–C6 and the C2 Lock Service.

pub mod geocoder;
pub mod lock;
pub mod object_store;
pub mod payment;
pub mod sms;

pub use geocoder::HttpGeocoder;
pub use lock::InProcessLockService;
pub use object_store::HttpObjectStore;
pub use payment::StripeLikePaymentGateway;
pub use sms::TwilioLikeSmsGateway;
