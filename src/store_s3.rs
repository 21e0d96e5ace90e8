//! S3 [`BlobStore`] backend.
//!
//! Speaks the S3 REST API directly with AWS Signature V4 authentication,
//! using only pure-Rust dependencies (`hmac`, `sha2`) for signing. Supports
//! custom endpoints for S3-compatible services (MinIO, LocalStack) and
//! paginated `ListObjectsV2` for prefix deletion on large projects.
//!
//! # Configuration
//!
//! ```toml
//! [store.s3]
//! bucket = "acme-labeling"
//! region = "us-east-1"
//! # endpoint_url = "http://localhost:9000"   # MinIO
//! ```
//!
//! # Environment Variables
//!
//! Credentials are read from environment variables:
//! - `AWS_ACCESS_KEY_ID` (required)
//! - `AWS_SECRET_ACCESS_KEY` (required)
//! - `AWS_SESSION_TOKEN` (optional, temporary credentials / IAM roles)

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::{Digest, Sha256};

use crate::config::S3StoreConfig;
use crate::error::{Error, Result};
use crate::store::BlobStore;

type HmacSha256 = Hmac<Sha256>;

/// AWS credentials loaded from environment variables.
struct AwsCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl AwsCredentials {
    fn from_env() -> Result<Self> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID")
            .map_err(|_| Error::Config("AWS_ACCESS_KEY_ID environment variable not set".into()))?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").map_err(|_| {
            Error::Config("AWS_SECRET_ACCESS_KEY environment variable not set".into())
        })?;
        let session_token = std::env::var("AWS_SESSION_TOKEN").ok();

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token,
        })
    }
}

/// Blob store backed by an S3 bucket.
pub struct S3Store {
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
    creds: AwsCredentials,
    client: reqwest::Client,
}

impl S3Store {
    /// Create a store for the configured bucket, reading credentials from
    /// the environment.
    pub fn new(config: &S3StoreConfig) -> Result<Self> {
        Ok(Self {
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            endpoint_url: config.endpoint_url.clone(),
            creds: AwsCredentials::from_env()?,
            client: reqwest::Client::new(),
        })
    }

    fn host(&self) -> String {
        s3_host(&self.bucket, &self.region, self.endpoint_url.as_deref())
    }

    /// Send one SigV4-signed request.
    ///
    /// `key` is the object key (`None` addresses the bucket root, used by
    /// `ListObjectsV2`). `query` must already be in canonical (sorted)
    /// order. The payload is hashed into the signature and sent as the
    /// request body when non-empty.
    async fn signed_request(
        &self,
        method: Method,
        key: Option<&str>,
        query: &[(String, String)],
        payload: Vec<u8>,
    ) -> std::result::Result<reqwest::Response, String> {
        let host = self.host();
        let canonical_uri = match key {
            Some(key) => format!(
                "/{}",
                key.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
            ),
            None => "/".to_string(),
        };
        let canonical_querystring: String = query
            .iter()
            .map(|(k, v)| format!("{}={}", uri_encode(k), uri_encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let now = Utc::now();
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = hex_sha256(&payload);

        let mut headers = vec![
            ("host".to_string(), host.clone()),
            ("x-amz-content-sha256".to_string(), payload_hash.clone()),
            ("x-amz-date".to_string(), amz_date.clone()),
        ];
        if let Some(ref token) = self.creds.session_token {
            headers.push(("x-amz-security-token".to_string(), token.clone()));
        }
        headers.sort_by(|a, b| a.0.cmp(&b.0));

        let signed_headers: String = headers
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";");
        let canonical_headers: String = headers
            .iter()
            .map(|(k, v)| format!("{}:{}\n", k, v))
            .collect();

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            method.as_str(),
            canonical_uri,
            canonical_querystring,
            canonical_headers,
            signed_headers,
            payload_hash
        );

        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            credential_scope,
            hex_sha256(canonical_request.as_bytes())
        );

        let signing_key = derive_signing_key(
            &self.creds.secret_access_key,
            &date_stamp,
            &self.region,
            "s3",
        );
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            self.creds.access_key_id, credential_scope, signed_headers, signature
        );

        let scheme = scheme_for(self.endpoint_url.as_deref());
        let url = if canonical_querystring.is_empty() {
            format!("{}://{}{}", scheme, host, canonical_uri)
        } else {
            format!("{}://{}{}?{}", scheme, host, canonical_uri, canonical_querystring)
        };

        let mut req = self
            .client
            .request(method, &url)
            .header("Authorization", &authorization)
            .header("x-amz-content-sha256", &payload_hash)
            .header("x-amz-date", &amz_date);
        if let Some(ref token) = self.creds.session_token {
            req = req.header("x-amz-security-token", token);
        }
        if !payload.is_empty() {
            req = req.body(payload);
        }

        req.send().await.map_err(|e| e.to_string())
    }

    /// List all object keys under `prefix`, following pagination.
    async fn list_keys(&self, prefix: &str) -> std::result::Result<Vec<String>, String> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            // Canonical order: continuation-token < list-type < max-keys < prefix.
            let mut query = Vec::new();
            if let Some(ref token) = continuation_token {
                query.push(("continuation-token".to_string(), token.clone()));
            }
            query.push(("list-type".to_string(), "2".to_string()));
            query.push(("max-keys".to_string(), "1000".to_string()));
            query.push(("prefix".to_string(), prefix.to_string()));

            let resp = self
                .signed_request(Method::GET, None, &query, Vec::new())
                .await?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(format!(
                    "ListObjectsV2 failed (HTTP {}): {}",
                    status,
                    body.chars().take(500).collect::<String>()
                ));
            }

            let xml = resp.text().await.map_err(|e| e.to_string())?;
            let (batch, is_truncated, next_token) = parse_list_keys(&xml);
            keys.extend(batch);

            if is_truncated {
                continuation_token = next_token;
            } else {
                break;
            }
        }

        Ok(keys)
    }
}

#[async_trait]
impl BlobStore for S3Store {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let resp = self
            .signed_request(Method::PUT, Some(path), &[], bytes.to_vec())
            .await
            .map_err(|reason| Error::Upload {
                path: path.to_string(),
                reason,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Upload {
                path: path.to_string(),
                reason: format!("PutObject failed (HTTP {})", status),
            });
        }
        Ok(())
    }

    async fn download_string(&self, path: &str) -> Result<String> {
        let resp = self
            .signed_request(Method::GET, Some(path), &[], Vec::new())
            .await
            .map_err(|reason| Error::Download {
                path: path.to_string(),
                reason,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Download {
                path: path.to_string(),
                reason: format!("GetObject failed (HTTP {})", status),
            });
        }
        let bytes = resp.bytes().await.map_err(|e| Error::Download {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<()> {
        let keys = self
            .list_keys(prefix)
            .await
            .map_err(|reason| Error::DirectoryDelete {
                path: prefix.to_string(),
                reason,
            })?;
        if keys.is_empty() {
            return Err(Error::DirectoryDelete {
                path: prefix.to_string(),
                reason: "no objects under prefix".to_string(),
            });
        }

        for key in &keys {
            let resp = self
                .signed_request(Method::DELETE, Some(key), &[], Vec::new())
                .await
                .map_err(|reason| Error::DirectoryDelete {
                    path: prefix.to_string(),
                    reason,
                })?;
            let status = resp.status();
            if !status.is_success() {
                return Err(Error::DirectoryDelete {
                    path: prefix.to_string(),
                    reason: format!("DeleteObject failed for '{}' (HTTP {})", key, status),
                });
            }
        }

        tracing::debug!(prefix, deleted = keys.len(), "deleted project objects");
        Ok(())
    }
}

// ============ SigV4 Helpers ============

/// Compute the S3 hostname for a bucket and region.
///
/// A custom `endpoint_url` (MinIO, LocalStack) replaces the standard
/// `<bucket>.s3.<region>.amazonaws.com` virtual-host form.
fn s3_host(bucket: &str, region: &str, endpoint_url: Option<&str>) -> String {
    match endpoint_url {
        Some(endpoint) => endpoint
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string(),
        None => format!("{}.s3.{}.amazonaws.com", bucket, region),
    }
}

fn scheme_for(endpoint_url: Option<&str>) -> &'static str {
    match endpoint_url {
        Some(endpoint) if endpoint.starts_with("http://") => "http",
        _ => "https",
    }
}

fn hex_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn hex_hmac_sha256(key: &[u8], data: &[u8]) -> String {
    hex::encode(hmac_sha256(key, data))
}

/// Derive the AWS SigV4 signing key for a date, region, and service.
///
/// ```text
/// kDate    = HMAC("AWS4" + secret, dateStamp)
/// kRegion  = HMAC(kDate, region)
/// kService = HMAC(kRegion, service)
/// kSigning = HMAC(kService, "aws4_request")
/// ```
fn derive_signing_key(secret_key: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(
        format!("AWS4{}", secret_key).as_bytes(),
        date_stamp.as_bytes(),
    );
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// URI-encode a string per RFC 3986 (SigV4 canonical requests).
fn uri_encode(s: &str) -> String {
    let mut result = String::new();
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            _ => {
                result.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    result
}

// ============ XML Parsing (minimal, no extra deps) ============

/// Parse a `ListObjectsV2` XML response into object keys plus pagination
/// state (`IsTruncated`, `NextContinuationToken`).
fn parse_list_keys(xml: &str) -> (Vec<String>, bool, Option<String>) {
    let is_truncated = extract_xml_value(xml, "IsTruncated")
        .map(|v| v == "true")
        .unwrap_or(false);
    let next_token = extract_xml_value(xml, "NextContinuationToken");

    let mut keys = Vec::new();
    let mut remaining = xml;
    while let Some(start) = remaining.find("<Contents>") {
        let block_start = start + "<Contents>".len();
        let Some(end) = remaining[block_start..].find("</Contents>") else {
            break;
        };
        let block = &remaining[block_start..block_start + end];
        if let Some(key) = extract_xml_value(block, "Key") {
            if !key.is_empty() {
                keys.push(key);
            }
        }
        remaining = &remaining[block_start + end + "</Contents>".len()..];
    }

    (keys, is_truncated, next_token)
}

/// Extract the text content of a simple, non-nested XML tag.
fn extract_xml_value(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)?;
    Some(xml[start..start + end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_key_matches_aws_documented_vector() {
        // Example from the AWS SigV4 signing documentation.
        let key = derive_signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20150830",
            "us-east-1",
            "iam",
        );
        assert_eq!(
            hex::encode(key),
            "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
        );
    }

    #[test]
    fn uri_encode_leaves_unreserved_characters_alone() {
        assert_eq!(uri_encode("abc-123_~.X"), "abc-123_~.X");
        assert_eq!(uri_encode("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn host_prefers_custom_endpoint() {
        assert_eq!(
            s3_host("bucket", "us-east-1", None),
            "bucket.s3.us-east-1.amazonaws.com"
        );
        assert_eq!(
            s3_host("bucket", "us-east-1", Some("http://localhost:9000/")),
            "localhost:9000"
        );
        assert_eq!(scheme_for(Some("http://localhost:9000/")), "http");
        assert_eq!(scheme_for(None), "https");
    }

    #[test]
    fn parse_list_keys_reads_keys_and_pagination() {
        let xml = "<ListBucketResult>\
            <IsTruncated>true</IsTruncated>\
            <NextContinuationToken>tok123</NextContinuationToken>\
            <Contents><Key>1/p/tags.csv</Key><Size>10</Size></Contents>\
            <Contents><Key>1/p/data.csv</Key><Size>20</Size></Contents>\
            </ListBucketResult>";
        let (keys, truncated, token) = parse_list_keys(xml);
        assert_eq!(keys, vec!["1/p/tags.csv", "1/p/data.csv"]);
        assert!(truncated);
        assert_eq!(token.as_deref(), Some("tok123"));
    }

    #[test]
    fn parse_list_keys_handles_final_page() {
        let xml = "<ListBucketResult><IsTruncated>false</IsTruncated></ListBucketResult>";
        let (keys, truncated, token) = parse_list_keys(xml);
        assert!(keys.is_empty());
        assert!(!truncated);
        assert!(token.is_none());
    }
}
