//! EIP-4361 message parsing

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use super::error::SiweError;

const PREAMBLE_SUFFIX: &str = " wants you to sign in with your Ethereum account:";

/// A parsed Sign-In with Ethereum message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiweMessage {
    pub domain: String,
    pub address: String,
    pub statement: Option<String>,
    pub uri: String,
    pub version: String,
    pub chain_id: u64,
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
    pub expiration_time: Option<DateTime<Utc>>,
    pub not_before: Option<DateTime<Utc>>,
    pub request_id: Option<String>,
    pub resources: Vec<String>,
}

fn parse_time(field: &str, value: &str) -> Result<DateTime<Utc>, SiweError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SiweError::InvalidMessage(format!("Invalid {field}: {e}")))
}

impl SiweMessage {
    /// Parses the text the wallet signed
    ///
    /// # Errors
    /// Returns `SiweError::InvalidMessage` if a required line is missing or malformed.
    pub fn parse(message: &str) -> Result<Self, SiweError> {
        let mut lines = message.lines();

        let domain = lines
            .next()
            .and_then(|line| line.strip_suffix(PREAMBLE_SUFFIX))
            .filter(|domain| !domain.is_empty())
            .ok_or_else(|| SiweError::InvalidMessage("Missing preamble".to_string()))?
            .to_string();

        let address = lines
            .next()
            .filter(|line| line.starts_with("0x"))
            .ok_or_else(|| SiweError::InvalidMessage("Missing address".to_string()))?
            .to_string();

        let mut statement = None;
        let mut uri = None;
        let mut version = None;
        let mut chain_id = None;
        let mut nonce = None;
        let mut issued_at = None;
        let mut expiration_time = None;
        let mut not_before = None;
        let mut request_id = None;
        let mut resources = Vec::new();
        let mut in_resources = false;

        for line in lines {
            if in_resources {
                if let Some(resource) = line.strip_prefix("- ") {
                    resources.push(resource.to_string());
                    continue;
                }
                in_resources = false;
            }

            if line.is_empty() {
                continue;
            }

            match line.split_once(": ") {
                Some(("URI", value)) => uri = Some(value.to_string()),
                Some(("Version", value)) => version = Some(value.to_string()),
                Some(("Chain ID", value)) => {
                    chain_id = Some(value.parse::<u64>().map_err(|e| {
                        SiweError::InvalidMessage(format!("Invalid Chain ID: {e}"))
                    })?);
                }
                Some(("Nonce", value)) => nonce = Some(value.to_string()),
                Some(("Issued At", value)) => issued_at = Some(parse_time("Issued At", value)?),
                Some(("Expiration Time", value)) => {
                    expiration_time = Some(parse_time("Expiration Time", value)?);
                }
                Some(("Not Before", value)) => {
                    not_before = Some(parse_time("Not Before", value)?);
                }
                Some(("Request ID", value)) => request_id = Some(value.to_string()),
                _ if line == "Resources:" => in_resources = true,
                _ if uri.is_none() && statement.is_none() => statement = Some(line.to_string()),
                _ => {
                    return Err(SiweError::InvalidMessage(format!(
                        "Unexpected line: {line}"
                    )))
                }
            }
        }

        let missing = |field: &str| SiweError::InvalidMessage(format!("Missing {field}"));

        let version = version.ok_or_else(|| missing("Version"))?;
        if version != "1" {
            return Err(SiweError::InvalidMessage(format!(
                "Unsupported version {version}"
            )));
        }

        Ok(Self {
            domain,
            address,
            statement,
            uri: uri.ok_or_else(|| missing("URI"))?,
            version,
            chain_id: chain_id.ok_or_else(|| missing("Chain ID"))?,
            nonce: nonce.ok_or_else(|| missing("Nonce"))?,
            issued_at: issued_at.ok_or_else(|| missing("Issued At"))?,
            expiration_time,
            not_before,
            request_id,
            resources,
        })
    }

    /// Checks the validity window against `now`
    ///
    /// # Errors
    /// - `SiweError::Expired` when `now` is at or past `Expiration Time`
    /// - `SiweError::NotYetValid` when `now` is before `Not Before`
    pub fn check_time(&self, now: DateTime<Utc>) -> Result<(), SiweError> {
        if let Some(expiration_time) = self.expiration_time {
            if now >= expiration_time {
                return Err(SiweError::Expired);
            }
        }
        if let Some(not_before) = self.not_before {
            if now < not_before {
                return Err(SiweError::NotYetValid);
            }
        }
        Ok(())
    }
}

impl fmt::Display for SiweMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = |t: &DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Millis, true);

        writeln!(f, "{}{PREAMBLE_SUFFIX}", self.domain)?;
        writeln!(f, "{}", self.address)?;
        writeln!(f)?;
        if let Some(statement) = &self.statement {
            writeln!(f, "{statement}")?;
            writeln!(f)?;
        }
        writeln!(f, "URI: {}", self.uri)?;
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Chain ID: {}", self.chain_id)?;
        writeln!(f, "Nonce: {}", self.nonce)?;
        write!(f, "Issued At: {}", time(&self.issued_at))?;
        if let Some(expiration_time) = &self.expiration_time {
            write!(f, "\nExpiration Time: {}", time(expiration_time))?;
        }
        if let Some(not_before) = &self.not_before {
            write!(f, "\nNot Before: {}", time(not_before))?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, "\nRequest ID: {request_id}")?;
        }
        if !self.resources.is_empty() {
            write!(f, "\nResources:")?;
            for resource in &self.resources {
                write!(f, "\n- {resource}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const SAMPLE: &str = "marriage-dao.example wants you to sign in with your Ethereum account:
0x52908400098527886E0F7030069857D2E4169EE7

Sign in to Marriage DAO to create your on-chain marriage proof

URI: https://marriage-dao.example/
Version: 1
Chain ID: 480
Nonce: abc123xy
Issued At: 2026-01-01T00:00:00.000Z
Expiration Time: 2026-01-08T00:00:00.000Z
Not Before: 2025-12-31T00:00:00.000Z
Request ID: 0";

    #[test]
    fn test_parse_sample_message() {
        let message = SiweMessage::parse(SAMPLE).unwrap();
        assert_eq!(message.domain, "marriage-dao.example");
        assert_eq!(message.address, "0x52908400098527886E0F7030069857D2E4169EE7");
        assert_eq!(
            message.statement.as_deref(),
            Some("Sign in to Marriage DAO to create your on-chain marriage proof")
        );
        assert_eq!(message.uri, "https://marriage-dao.example/");
        assert_eq!(message.chain_id, 480);
        assert_eq!(message.nonce, "abc123xy");
        assert_eq!(message.request_id.as_deref(), Some("0"));
        assert!(message.expiration_time.is_some());
        assert!(message.not_before.is_some());
    }

    #[test]
    fn test_display_round_trips() {
        let message = SiweMessage::parse(SAMPLE).unwrap();
        assert_eq!(message.to_string(), SAMPLE);
        assert_eq!(SiweMessage::parse(&message.to_string()).unwrap(), message);
    }

    #[test]
    fn test_parse_without_statement_and_with_resources() {
        let text = "example.com wants you to sign in with your Ethereum account:
0x0000000000000000000000000000000000000001

URI: https://example.com
Version: 1
Chain ID: 1
Nonce: 12345678
Issued At: 2026-01-01T00:00:00Z
Resources:
- ipfs://one
- https://two";

        let message = SiweMessage::parse(text).unwrap();
        assert_eq!(message.statement, None);
        assert_eq!(message.resources, vec!["ipfs://one", "https://two"]);
        assert_eq!(message.expiration_time, None);
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let without_nonce = SAMPLE.replace("Nonce: abc123xy\n", "");
        match SiweMessage::parse(&without_nonce) {
            Err(SiweError::InvalidMessage(msg)) => assert!(msg.contains("Nonce")),
            other => panic!("Expected InvalidMessage, got {other:?}"),
        }

        assert!(SiweMessage::parse("hello").is_err());
        assert!(SiweMessage::parse(&SAMPLE.replace("Version: 1", "Version: 2")).is_err());
    }

    #[test]
    fn test_check_time_window() {
        let message = SiweMessage::parse(SAMPLE).unwrap();
        let issued = message.issued_at;

        assert!(message.check_time(issued).is_ok());
        assert!(matches!(
            message.check_time(issued + Duration::days(7)),
            Err(SiweError::Expired)
        ));
        assert!(matches!(
            message.check_time(issued - Duration::days(2)),
            Err(SiweError::NotYetValid)
        ));
    }
}
