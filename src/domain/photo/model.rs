//! Photo domain entity (spec.md §3, §4.6).

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSource {
    WebUpload,
    Mms,
}

impl PhotoSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebUpload => "web_upload",
            Self::Mms => "mms",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "web_upload" => Self::WebUpload,
            "mms" => Self::Mms,
            _ => return None,
        })
    }
}

/// Exactly one of `session_id`/`job_id` is set, matching Offer's scope rule.
#[derive(Debug, Clone)]
pub enum PhotoScope {
    Session(String),
    Job(String),
    None,
}

#[derive(Debug, Clone)]
pub struct Photo {
    pub id: String,
    pub scope: PhotoScope,
    pub source: PhotoSource,
    pub bucket: String,
    pub content_type: String,
    pub byte_count: i64,
    pub mms_media_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Photo {
    /// The object key is a pure function of `(id, scope)` — the single
    /// source of truth for path construction (spec.md §4.6, invariant 5).
    /// Never persisted; always recomputed.
    pub fn object_key(&self, prefix: &str) -> String {
        match &self.scope {
            PhotoScope::Session(session_id) => {
                format!("{prefix}sessions/{session_id}/{}.jpg", self.id)
            }
            PhotoScope::Job(job_id) => format!("{prefix}jobs/{job_id}/{}.jpg", self.id),
            PhotoScope::None => format!("{prefix}{}.jpg", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_is_pure_function_of_id_and_scope() {
        let photo = Photo {
            id: "P".to_string(),
            scope: PhotoScope::Session("S".to_string()),
            source: PhotoSource::WebUpload,
            bucket: "bucket".to_string(),
            content_type: "image/jpeg".to_string(),
            byte_count: 1024,
            mms_media_id: None,
            created_at: Utc::now(),
        };
        assert_eq!(photo.object_key(""), "sessions/S/P.jpg");
        assert_eq!(photo.object_key("prefix/"), "prefix/sessions/S/P.jpg");
    }
}
