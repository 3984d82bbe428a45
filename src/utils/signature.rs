//! Client-secret signing for the commerce API token exchange.
//!
//! The password `"{client_id}_{timestamp_ms}"` is bcrypt-hashed using the client
//! secret itself as the salt string (`$2a$<cost>$<22 salt chars>`), and the full
//! modular-crypt output is base64 encoded.

use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use bcrypt::Version;
use crate::error::{Error, Result};

const BCRYPT_SALT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

const SALT_CHARS: usize = 22;

/// A client secret parsed into its bcrypt salt components.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BcryptSalt {
    version: &'static str,
    cost: u32,
    salt: [u8; 16],
}

impl BcryptSalt {
    fn parse(secret: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            Error::Configuration(format!("client secret is not a bcrypt salt: {reason}"))
        };

        let mut parts = secret.splitn(4, '$');
        if parts.next() != Some("") {
            return Err(invalid("missing leading '$'"));
        }

        let version = match parts.next() {
            Some("2a") => "2a",
            Some("2b") => "2b",
            Some("2x") => "2x",
            Some("2y") => "2y",
            _ => return Err(invalid("unsupported version")),
        };

        let cost_text = parts.next().ok_or_else(|| invalid("missing cost"))?;
        if cost_text.len() != 2 {
            return Err(invalid("cost must be two digits"));
        }
        let cost: u32 = cost_text.parse().map_err(|_| invalid("cost is not a number"))?;
        if !(4..=31).contains(&cost) {
            return Err(invalid("cost out of range"));
        }

        let salt_text = parts.next().ok_or_else(|| invalid("missing salt"))?;
        // crypt() ignores anything past the salt, e.g. a full hash used as the salt.
        let salt_text = salt_text
            .get(..SALT_CHARS)
            .ok_or_else(|| invalid("salt shorter than 22 characters"))?;

        let bytes = BCRYPT_SALT
            .decode(salt_text)
            .map_err(|_| invalid("salt contains characters outside the bcrypt alphabet"))?;
        let salt: [u8; 16] = bytes
            .try_into()
            .map_err(|_| invalid("salt does not decode to 16 bytes"))?;

        Ok(Self { version, cost, salt })
    }

    fn bcrypt_version(&self) -> Version {
        match self.version {
            "2b" => Version::TwoB,
            "2x" => Version::TwoX,
            "2y" => Version::TwoY,
            _ => Version::TwoA,
        }
    }
}

/// Produces the `client_secret_sign` value for one token request.
pub fn sign(client_id: &str, client_secret: &str, timestamp_ms: i64) -> Result<String> {
    let salt = BcryptSalt::parse(client_secret)?;
    let password = format!("{client_id}_{timestamp_ms}");

    let hashed = bcrypt::hash_with_salt(password.as_bytes(), salt.cost, salt.salt)
        .map_err(|e| Error::Configuration(format!("bcrypt hashing failed: {e}")))?
        .format_for_version(salt.bcrypt_version());

    if hashed.is_empty() {
        return Err(Error::Configuration("bcrypt produced an empty hash".to_string()));
    }

    Ok(STANDARD.encode(hashed))
}
