//! Environment-driven application configuration (spec.md §6).
//!
//! Every external credential and tunable is read once at startup and
//! injected into services/adapters as plain structs — there is no
//! global config singleton (spec.md §9).

use std::collections::HashMap;

use crate::domain::session::model::ServiceType;
use crate::shared::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub account: String,
    pub token: String,
    pub from: String,
    /// Base URL of the SMS gateway's REST API; overridable for testing
    /// against a local stub.
    pub api_base_url: String,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub secret: String,
    pub webhook_secret: String,
    pub api_base_url: String,
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub api_key: String,
    pub api_base_url: String,
}

#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub photo_prefix: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub wave_size: u64,
    pub wave_delay_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_env: AppEnv,
    pub server: ServerConfig,
    pub database_url: String,
    /// Lock-service backend identifier. Read and logged per spec.md §6, but
    /// the shipped `LockService` is an in-process `DashMap` — see
    /// SPEC_FULL.md §4.7 and DESIGN.md's Open Question resolutions.
    pub redis_url: String,
    pub sms: SmsConfig,
    pub payment: PaymentConfig,
    pub geocoder: GeocoderConfig,
    pub object_store: ObjectStoreConfig,
    pub dispatch: DispatchConfig,
    pub base_url: String,
    pub frontend_url: String,
    pub service_areas: Vec<String>,
    pub deposit_amounts: HashMap<ServiceType, Cents>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn default_deposit_amounts() -> HashMap<ServiceType, Cents> {
    let mut map = HashMap::new();
    map.insert(ServiceType::HomeLockout, Cents(4900));
    map.insert(ServiceType::CarLockout, Cents(5900));
    map.insert(ServiceType::Rekey, Cents(7900));
    map.insert(ServiceType::SmartLock, Cents(9900));
    map
}

/// Parses `DEPOSIT_AMOUNTS="home_lockout:4900,car_lockout:5900,..."` into
/// the base-price map, falling back to spec.md §6's defaults for any
/// service type the env var doesn't mention.
fn parse_deposit_amounts(raw: &str) -> HashMap<ServiceType, Cents> {
    let mut map = default_deposit_amounts();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let Some((key, value)) = entry.split_once(':') else {
            continue;
        };
        let Some(service_type) = ServiceType::from_str(key.trim()) else {
            continue;
        };
        let Ok(cents) = value.trim().parse::<i64>() else {
            continue;
        };
        map.insert(service_type, Cents(cents));
    }
    map
}

impl AppConfig {
    pub fn from_env() -> Self {
        let app_env = match env_or("APP_ENV", "development").as_str() {
            "production" => AppEnv::Production,
            _ => AppEnv::Development,
        };

        let service_areas = std::env::var("SERVICE_AREAS")
            .unwrap_or_else(|_| "Laredo".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let deposit_amounts = match std::env::var("DEPOSIT_AMOUNTS") {
            Ok(raw) => parse_deposit_amounts(&raw),
            Err(_) => default_deposit_amounts(),
        };

        Self {
            app_env,
            server: ServerConfig {
                host: env_or("HOST", "0.0.0.0"),
                port: env_u64("PORT", 8080) as u16,
            },
            database_url: env_or("DATABASE_URL", "sqlite://./locksmith.db?mode=rwc"),
            redis_url: env_or("REDIS_URL", "redis://127.0.0.1:6379"),
            sms: SmsConfig {
                account: env_or("SMS_ACCOUNT", ""),
                token: env_or("SMS_TOKEN", ""),
                from: env_or("SMS_FROM", ""),
                api_base_url: env_or("SMS_API_BASE_URL", "https://api.twilio.com"),
            },
            payment: PaymentConfig {
                secret: env_or("PAYMENT_SECRET", ""),
                webhook_secret: env_or("PAYMENT_WEBHOOK_SECRET", ""),
                api_base_url: env_or("PAYMENT_API_BASE_URL", "https://api.stripe.com"),
            },
            geocoder: GeocoderConfig {
                api_key: env_or("GEOCODER_KEY", ""),
                api_base_url: env_or(
                    "GEOCODER_API_BASE_URL",
                    "https://maps.googleapis.com/maps/api/geocode",
                ),
            },
            object_store: ObjectStoreConfig {
                bucket: env_or("BUCKET", "locksmith-photos"),
                photo_prefix: env_or("PHOTO_PREFIX", ""),
                region: env_or("REGION", "us-east-1"),
                access_key: std::env::var("ACCESS_KEY").ok(),
                secret: std::env::var("SECRET").ok(),
            },
            dispatch: DispatchConfig {
                wave_size: env_u64("WAVE_SIZE", 3),
                wave_delay_seconds: env_i64("WAVE_DELAY_SECONDS", 120),
            },
            base_url: env_or("BASE_URL", "http://localhost:8080"),
            frontend_url: env_or("FRONTEND_URL", "http://localhost:3000"),
            service_areas,
            deposit_amounts,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_env: AppEnv::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database_url: "sqlite://./locksmith.db?mode=rwc".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            sms: SmsConfig {
                account: String::new(),
                token: String::new(),
                from: String::new(),
                api_base_url: "https://api.twilio.com".to_string(),
            },
            payment: PaymentConfig {
                secret: String::new(),
                webhook_secret: String::new(),
                api_base_url: "https://api.stripe.com".to_string(),
            },
            geocoder: GeocoderConfig {
                api_key: String::new(),
                api_base_url: "https://maps.googleapis.com/maps/api/geocode".to_string(),
            },
            object_store: ObjectStoreConfig {
                bucket: "locksmith-photos".to_string(),
                photo_prefix: String::new(),
                region: "us-east-1".to_string(),
                access_key: None,
                secret: None,
            },
            dispatch: DispatchConfig {
                wave_size: 3,
                wave_delay_seconds: 120,
            },
            base_url: "http://localhost:8080".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            service_areas: vec!["Laredo".to_string()],
            deposit_amounts: default_deposit_amounts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_deposit_amounts_overriding_only_mentioned_types() {
        let map = parse_deposit_amounts("home_lockout:5000");
        assert_eq!(map.get(&ServiceType::HomeLockout), Some(&Cents(5000)));
        assert_eq!(map.get(&ServiceType::CarLockout), Some(&Cents(5900)));
    }
}
