//! Identity-provider webhook consumption: signature verification, event
//! parsing, and the profile mutations that mirror user lifecycle changes
//! into the `profiles` table. Transport/hosting is external; everything
//! here is expressed over raw header values and payload bytes, for the
//! host's request handler to drive.

#![allow(dead_code)]

use crate::api::{ApiResult, DataClient};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Events older (or newer) than this are rejected outright.
const TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum WebhookError {
    BadSecret,
    BadTimestamp,
    StaleTimestamp,
    BadSignature,
    BadPayload(String),
}

impl std::fmt::Display for WebhookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookError::BadSecret => write!(f, "webhook secret is not valid base64"),
            WebhookError::BadTimestamp => write!(f, "webhook timestamp header is not a number"),
            WebhookError::StaleTimestamp => write!(f, "webhook timestamp outside tolerance"),
            WebhookError::BadSignature => write!(f, "webhook signature mismatch"),
            WebhookError::BadPayload(e) => write!(f, "webhook payload rejected: {e}"),
        }
    }
}

/// Verifies the provider's signature scheme: HMAC-SHA256 over
/// `"{id}.{timestamp}.{payload}"`, base64, sent as a space-separated list
/// of `v1,<signature>` candidates.
#[derive(Debug)]
pub(crate) struct WebhookVerifier {
    keyed: HmacSha256,
}

impl WebhookVerifier {
    /// Secrets are distributed as `whsec_<base64 key>`.
    pub fn new(secret: &str) -> Result<Self, WebhookError> {
        let encoded = secret.strip_prefix("whsec_").unwrap_or(secret);
        let key = BASE64.decode(encoded).map_err(|_| WebhookError::BadSecret)?;
        let keyed = HmacSha256::new_from_slice(&key).map_err(|_| WebhookError::BadSecret)?;
        Ok(Self { keyed })
    }

    fn mac(&self, msg_id: &str, timestamp: i64, payload: &[u8]) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac
    }

    pub fn sign(&self, msg_id: &str, timestamp: i64, payload: &[u8]) -> String {
        let tag = self.mac(msg_id, timestamp, payload).finalize().into_bytes();
        format!("v1,{}", BASE64.encode(tag))
    }

    pub fn verify(
        &self,
        msg_id: &str,
        timestamp_header: &str,
        signature_header: &str,
        payload: &[u8],
        now_secs: i64,
    ) -> Result<(), WebhookError> {
        let timestamp: i64 = timestamp_header
            .trim()
            .parse()
            .map_err(|_| WebhookError::BadTimestamp)?;

        if (now_secs - timestamp).abs() > TIMESTAMP_TOLERANCE_SECS {
            return Err(WebhookError::StaleTimestamp);
        }

        for candidate in signature_header.split_whitespace() {
            let Some(encoded) = candidate.strip_prefix("v1,") else {
                continue;
            };
            let Ok(sig) = BASE64.decode(encoded) else {
                continue;
            };
            if self
                .mac(msg_id, timestamp, payload)
                .verify_slice(&sig)
                .is_ok()
            {
                return Ok(());
            }
        }

        Err(WebhookError::BadSignature)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum IdentityEvent {
    UserUpdated {
        user_id: String,
        email: Option<String>,
        icon_url: Option<String>,
    },
    UserDeleted {
        user_id: String,
    },
    Unhandled {
        event_type: String,
    },
}

/// Parse a verified payload into a lifecycle event. The provider sends the
/// primary email as an id reference into the address list.
pub(crate) fn parse_event(payload: &[u8]) -> Result<IdentityEvent, WebhookError> {
    let v: serde_json::Value =
        serde_json::from_slice(payload).map_err(|e| WebhookError::BadPayload(e.to_string()))?;

    let event_type = v
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or_else(|| WebhookError::BadPayload("missing event type".to_string()))?
        .to_string();

    let data = v.get("data").cloned().unwrap_or(serde_json::Value::Null);
    let user_id = data
        .get("id")
        .and_then(|id| id.as_str())
        .map(|s| s.to_string());

    match event_type.as_str() {
        "user.deleted" => {
            let user_id = user_id
                .ok_or_else(|| WebhookError::BadPayload("user.deleted without id".to_string()))?;
            Ok(IdentityEvent::UserDeleted { user_id })
        }
        "user.updated" => {
            let user_id = user_id
                .ok_or_else(|| WebhookError::BadPayload("user.updated without id".to_string()))?;

            let primary_id = data.get("primary_email_address_id").and_then(|p| p.as_str());
            let email = data
                .get("email_addresses")
                .and_then(|a| a.as_array())
                .and_then(|addresses| {
                    addresses.iter().find(|a| {
                        a.get("id").and_then(|id| id.as_str()) == primary_id && primary_id.is_some()
                    })
                })
                .and_then(|a| a.get("email_address"))
                .and_then(|e| e.as_str())
                .map(|s| s.to_string());

            let icon_url = data
                .get("image_url")
                .and_then(|u| u.as_str())
                .filter(|u| !u.trim().is_empty())
                .map(|s| s.to_string());

            Ok(IdentityEvent::UserUpdated {
                user_id,
                email,
                icon_url,
            })
        }
        _ => Ok(IdentityEvent::Unhandled { event_type }),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ProfileMutation {
    Patch {
        user_id: String,
        fields: serde_json::Value,
    },
    Delete {
        user_id: String,
    },
}

/// The profile change an event implies, if any. `user.updated` with
/// neither email nor icon carries nothing to mirror.
pub(crate) fn profile_mutation(event: &IdentityEvent) -> Option<ProfileMutation> {
    match event {
        IdentityEvent::UserDeleted { user_id } => Some(ProfileMutation::Delete {
            user_id: user_id.clone(),
        }),
        IdentityEvent::UserUpdated {
            user_id,
            email,
            icon_url,
        } => {
            let mut fields = serde_json::Map::new();
            if let Some(email) = email {
                fields.insert("email".to_string(), serde_json::Value::String(email.clone()));
            }
            if let Some(icon_url) = icon_url {
                fields.insert(
                    "icon_url".to_string(),
                    serde_json::Value::String(icon_url.clone()),
                );
            }
            if fields.is_empty() {
                return None;
            }
            Some(ProfileMutation::Patch {
                user_id: user_id.clone(),
                fields: serde_json::Value::Object(fields),
            })
        }
        IdentityEvent::Unhandled { .. } => None,
    }
}

/// Apply a parsed event against the profiles table. No partial processing:
/// the single mutation either lands or the error propagates.
pub(crate) async fn apply_event(client: &DataClient, event: &IdentityEvent) -> ApiResult<()> {
    match profile_mutation(event) {
        Some(ProfileMutation::Delete { user_id }) => client.delete_profile(&user_id).await,
        Some(ProfileMutation::Patch { user_id, fields }) => {
            client.patch_profile(&user_id, fields).await
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // base64 of a fixed 32-byte key.
    const SECRET: &str = "whsec_MjQ2OGFiY2RlZmdoaWprbG1ub3BxcnN0dXZ3eHl6MTI=";

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(SECRET).expect("secret should decode")
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let v = verifier();
        let payload = br#"{"type":"user.deleted","data":{"id":"u1"}}"#;
        let sig = v.sign("msg_1", 1_700_000_000, payload);
        v.verify("msg_1", "1700000000", &sig, payload, 1_700_000_000)
            .expect("signature should verify");
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let v = verifier();
        let sig = v.sign("msg_1", 1_700_000_000, b"original");
        let err = v
            .verify("msg_1", "1700000000", &sig, b"tampered", 1_700_000_000)
            .unwrap_err();
        assert_eq!(err, WebhookError::BadSignature);
    }

    #[test]
    fn test_any_candidate_signature_may_match() {
        let v = verifier();
        let payload = b"payload";
        let good = v.sign("msg_1", 1_700_000_000, payload);
        let header = format!("v1,AAAA {good}");
        v.verify("msg_1", "1700000000", &header, payload, 1_700_000_000)
            .expect("second candidate should verify");
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let v = verifier();
        let payload = b"payload";
        let sig = v.sign("msg_1", 1_700_000_000, payload);
        let err = v
            .verify(
                "msg_1",
                "1700000000",
                &sig,
                payload,
                1_700_000_000 + TIMESTAMP_TOLERANCE_SECS + 1,
            )
            .unwrap_err();
        assert_eq!(err, WebhookError::StaleTimestamp);
    }

    #[test]
    fn test_non_numeric_timestamp_rejected() {
        let v = verifier();
        let err = v
            .verify("msg_1", "yesterday", "v1,AAAA", b"p", 1_700_000_000)
            .unwrap_err();
        assert_eq!(err, WebhookError::BadTimestamp);
    }

    #[test]
    fn test_bad_secret_rejected() {
        assert_eq!(
            WebhookVerifier::new("whsec_!!!").unwrap_err(),
            WebhookError::BadSecret
        );
    }

    #[test]
    fn test_parse_user_updated_resolves_primary_email() {
        let payload = br#"{
            "type": "user.updated",
            "data": {
                "id": "u1",
                "image_url": "https://img.example/u1.png",
                "primary_email_address_id": "e2",
                "email_addresses": [
                    {"id": "e1", "email_address": "old@example.com"},
                    {"id": "e2", "email_address": "new@example.com"}
                ]
            }
        }"#;
        let event = parse_event(payload).expect("event should parse");
        assert_eq!(
            event,
            IdentityEvent::UserUpdated {
                user_id: "u1".to_string(),
                email: Some("new@example.com".to_string()),
                icon_url: Some("https://img.example/u1.png".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_user_deleted() {
        let payload = br#"{"type":"user.deleted","data":{"id":"u9"}}"#;
        assert_eq!(
            parse_event(payload).unwrap(),
            IdentityEvent::UserDeleted {
                user_id: "u9".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_event_types_pass_through_unhandled() {
        let payload = br#"{"type":"session.created","data":{"id":"s1"}}"#;
        assert_eq!(
            parse_event(payload).unwrap(),
            IdentityEvent::Unhandled {
                event_type: "session.created".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_payload_rejected_without_processing() {
        assert!(matches!(
            parse_event(b"not json"),
            Err(WebhookError::BadPayload(_))
        ));
        assert!(matches!(
            parse_event(br#"{"data":{"id":"u1"}}"#),
            Err(WebhookError::BadPayload(_))
        ));
    }

    #[test]
    fn test_updated_event_mutation_mirrors_email_and_icon() {
        let event = IdentityEvent::UserUpdated {
            user_id: "u1".to_string(),
            email: Some("new@example.com".to_string()),
            icon_url: None,
        };
        let m = profile_mutation(&event).expect("mutation expected");
        match m {
            ProfileMutation::Patch { user_id, fields } => {
                assert_eq!(user_id, "u1");
                assert_eq!(fields["email"], "new@example.com");
                assert!(fields.get("icon_url").is_none());
            }
            other => panic!("expected Patch, got {other:?}"),
        }
    }

    #[test]
    fn test_updated_event_without_changes_is_a_no_op() {
        let event = IdentityEvent::UserUpdated {
            user_id: "u1".to_string(),
            email: None,
            icon_url: None,
        };
        assert_eq!(profile_mutation(&event), None);

        let event = IdentityEvent::Unhandled {
            event_type: "x".to_string(),
        };
        assert_eq!(profile_mutation(&event), None);
    }

    #[test]
    fn test_deleted_event_mutation_removes_profile_row() {
        let event = IdentityEvent::UserDeleted {
            user_id: "u9".to_string(),
        };
        assert_eq!(
            profile_mutation(&event),
            Some(ProfileMutation::Delete {
                user_id: "u9".to_string()
            })
        );
    }
}
