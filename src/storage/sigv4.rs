// ABOUTME: AWS Signature Version 4 signing for object store PUT and DELETE requests
// ABOUTME: HMAC-SHA256 key derivation and canonical request hashing with ring
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Aeterna Health

//! Header-based `SigV4` signing for single-chunk S3 requests.
//!
//! Only what the image store sends is covered: no query strings and a fully
//! buffered payload whose SHA-256 goes into `x-amz-content-sha256`.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, HOST};
use ring::{digest, hmac};
use url::Url;

use crate::config::AwsCredentials;
use crate::errors::{AppError, AppResult};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

/// Header carrying the payload hash
pub const CONTENT_SHA256: &str = "x-amz-content-sha256";
/// Header carrying the request timestamp
pub const AMZ_DATE: &str = "x-amz-date";
/// Header carrying the session token of temporary credentials
pub const SECURITY_TOKEN: &str = "x-amz-security-token";

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(digest::digest(&digest::SHA256, data).as_ref())
}

fn hmac_sha256(key: &[u8], data: &str) -> Vec<u8> {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    hmac::sign(&key, data.as_bytes()).as_ref().to_vec()
}

/// Derive the signing key for one day, region and service
#[must_use]
pub fn signing_key(secret_access_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret_access_key}").as_bytes(), date);
    let k_region = hmac_sha256(&k_date, region);
    let k_service = hmac_sha256(&k_region, service);
    hmac_sha256(&k_service, "aws4_request")
}

fn host_header(url: &Url) -> AppResult<String> {
    let host = url
        .host_str()
        .ok_or_else(|| AppError::storage(format!("Object URL has no host: {url}")))?;
    Ok(url
        .port()
        .map_or_else(|| host.to_owned(), |port| format!("{host}:{port}")))
}

fn header_value(value: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::storage(format!("Invalid signing header value: {e}")))
}

/// Signs requests for one bucket region
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: AwsCredentials,
    region: String,
}

impl SigV4Signer {
    /// Signer for `region`
    #[must_use]
    pub const fn new(credentials: AwsCredentials, region: String) -> Self {
        Self {
            credentials,
            region,
        }
    }

    /// Add `host`, `x-amz-*` and `Authorization` headers for a request
    ///
    /// Every header already in `headers` is signed, so set `content-type`
    /// and `x-amz-acl` before calling this.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the URL has no host or a header value is
    /// not valid.
    pub fn sign(
        &self,
        method: &str,
        url: &Url,
        headers: &mut HeaderMap,
        payload: &[u8],
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let payload_hash = sha256_hex(payload);

        headers.insert(HOST, header_value(&host_header(url)?)?);
        headers.insert(
            HeaderName::from_static(CONTENT_SHA256),
            header_value(&payload_hash)?,
        );
        headers.insert(HeaderName::from_static(AMZ_DATE), header_value(&amz_date)?);
        if let Some(token) = &self.credentials.session_token {
            headers.insert(HeaderName::from_static(SECURITY_TOKEN), header_value(token)?);
        }

        let mut signed: Vec<(String, String)> = headers
            .iter()
            .filter(|(name, _)| name.as_str() != AUTHORIZATION.as_str())
            .map(|(name, value)| {
                let value = String::from_utf8_lossy(value.as_bytes()).trim().to_owned();
                (name.as_str().to_owned(), value)
            })
            .collect();
        signed.sort();

        let canonical_headers: String = signed
            .iter()
            .map(|(name, value)| format!("{name}:{value}\n"))
            .collect();
        let signed_headers = signed
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let canonical_request = format!(
            "{method}\n{path}\n\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
            path = url.path(),
        );
        let scope = format!("{date}/{}/{SERVICE}/aws4_request", self.region);
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        let key = signing_key(
            &self.credentials.secret_access_key,
            &date,
            &self.region,
            SERVICE,
        );
        let signature = hex::encode(hmac_sha256(&key, &string_to_sign));

        headers.insert(
            AUTHORIZATION,
            header_value(&format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                self.credentials.access_key_id
            ))?,
        );
        Ok(())
    }
}
