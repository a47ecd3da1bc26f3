//! Stateless purpose-bound tokens.
//!
//! Wire format: `base64url(payload) "." base64url(mac)`, where the payload is
//!
//! ```text
//! version (1) | purpose (1) | account id (16) | issued at (8, BE) | expires at (8, BE)
//! ```
//!
//! and `mac = HMAC-SHA256(secret, payload || security stamp)`. Rotating the
//! security stamp therefore voids every token issued before the rotation.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use jiff::{SignedDuration, Timestamp};
use sha2::Sha256;
use uuid::Uuid;

use super::{MIN_SECRET_LEN, TokenError, TokenPurpose, TokenResult};
use crate::account::{Account, AccountId};
use crate::security::SecurityStampAuthority;
use crate::{Error, Result, TRACING_TARGET_PURPOSE_TOKEN as TRACING_TARGET};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_VERSION: u8 = 1;
const PAYLOAD_LEN: usize = 1 + 1 + 16 + 8 + 8;
const MAC_LEN: usize = 32;

/// Decoded contents of a validated purpose token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurposeTokenClaims {
    pub account_id: AccountId,
    pub purpose: TokenPurpose,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

impl PurposeTokenClaims {
    fn encode(&self) -> [u8; PAYLOAD_LEN] {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[0] = TOKEN_VERSION;
        payload[1] = self.purpose.as_byte();
        payload[2..18].copy_from_slice(self.account_id.as_uuid().as_bytes());
        payload[18..26].copy_from_slice(&self.issued_at.as_second().to_be_bytes());
        payload[26..34].copy_from_slice(&self.expires_at.as_second().to_be_bytes());
        payload
    }

    fn decode(payload: &[u8]) -> TokenResult<Self> {
        let payload: &[u8; PAYLOAD_LEN] = payload.try_into().map_err(|_| TokenError::Malformed)?;
        if payload[0] != TOKEN_VERSION {
            return Err(TokenError::Malformed);
        }

        let purpose = TokenPurpose::from_byte(payload[1]).ok_or(TokenError::Malformed)?;
        let mut account_id = [0u8; 16];
        account_id.copy_from_slice(&payload[2..18]);

        let timestamp = |range: std::ops::Range<usize>| -> TokenResult<Timestamp> {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&payload[range]);
            Timestamp::from_second(i64::from_be_bytes(bytes)).map_err(|_| TokenError::Malformed)
        };

        Ok(Self {
            account_id: Uuid::from_bytes(account_id).into(),
            purpose,
            issued_at: timestamp(18..26)?,
            expires_at: timestamp(26..34)?,
        })
    }
}

/// Issues and validates purpose-bound tokens with a server-held secret.
#[derive(Clone)]
pub struct PurposeTokenIssuer {
    mac: HmacSha256,
    stamps: SecurityStampAuthority,
}

impl PurposeTokenIssuer {
    /// Creates an issuer keyed with the given secret.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error when the secret is shorter than
    /// [`MIN_SECRET_LEN`] bytes.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::invalid_input(format!(
                "Purpose token secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| Error::invalid_input("Invalid purpose token secret").with_source(e))?;

        Ok(Self {
            mac,
            stamps: SecurityStampAuthority::new(),
        })
    }

    /// Issues a token for the account, valid for `ttl` from now.
    pub fn issue(&self, account: &Account, purpose: TokenPurpose, ttl: SignedDuration) -> Result<String> {
        self.issue_at(account, purpose, ttl, Timestamp::now())
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        account: &Account,
        purpose: TokenPurpose,
        ttl: SignedDuration,
        now: Timestamp,
    ) -> Result<String> {
        let expires_at = now.checked_add(ttl).map_err(|e| {
            Error::unexpected("purpose_token", "Token lifetime is out of range").with_source(e)
        })?;

        let claims = PurposeTokenClaims {
            account_id: account.id,
            purpose,
            issued_at: now,
            expires_at,
        };

        let payload = claims.encode();
        let mac = self.compute(&payload, account).finalize().into_bytes();

        tracing::debug!(
            target: TRACING_TARGET,
            account_id = %account.id,
            purpose = %purpose,
            expires_at = %expires_at,
            "purpose token issued"
        );

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode(mac)
        ))
    }

    /// Validates a token for the account and purpose at the current time.
    pub fn validate(
        &self,
        token: &str,
        account: &Account,
        purpose: TokenPurpose,
    ) -> TokenResult<PurposeTokenClaims> {
        self.validate_at(token, account, purpose, Timestamp::now())
    }

    /// Validates a token as if the current time were `now`.
    ///
    /// Checks run in order: structure, account binding and MAC against the
    /// account's current security stamp, purpose, then expiry. The token is
    /// valid through `expires_at` inclusive.
    pub fn validate_at(
        &self,
        token: &str,
        account: &Account,
        purpose: TokenPurpose,
        now: Timestamp,
    ) -> TokenResult<PurposeTokenClaims> {
        let result = self.check(token, account, purpose, now);

        if let Err(reason) = &result {
            tracing::debug!(
                target: TRACING_TARGET,
                account_id = %account.id,
                purpose = %purpose,
                reason = %reason,
                "purpose token rejected"
            );
        }

        result
    }

    fn check(
        &self,
        token: &str,
        account: &Account,
        purpose: TokenPurpose,
        now: Timestamp,
    ) -> TokenResult<PurposeTokenClaims> {
        let (payload, mac) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let mac = URL_SAFE_NO_PAD
            .decode(mac)
            .map_err(|_| TokenError::Malformed)?;

        if mac.len() != MAC_LEN {
            return Err(TokenError::Malformed);
        }

        let claims = PurposeTokenClaims::decode(&payload)?;

        if claims.account_id != account.id {
            return Err(TokenError::SignatureInvalid);
        }

        self.compute(&payload, account)
            .verify_slice(&mac)
            .map_err(|_| TokenError::SignatureInvalid)?;

        if claims.purpose != purpose {
            return Err(TokenError::PurposeMismatch);
        }

        if now.as_second() > claims.expires_at.as_second() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn compute(&self, payload: &[u8], account: &Account) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(payload);
        mac.update(self.stamps.current_stamp(account).as_bytes());
        mac
    }
}

impl fmt::Debug for PurposeTokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PurposeTokenIssuer").finish_non_exhaustive()
    }
}
