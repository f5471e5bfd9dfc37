//! RTC access token builder (version "006").
//!
//! Produces the credential format the RTC transport expects when joining a
//! channel:
//!
//! ```text
//! message   = salt:u32 || ts:u32 || privileges:map<u16, u32>
//! signature = HMAC-SHA256(app_certificate, app_id || channel || uid || message)
//! content   = bytes(signature) || crc32(channel):u32 || crc32(uid):u32 || bytes(message)
//! token     = "006" || app_id || base64(content)
//! ```
//!
//! All integers are little-endian. `bytes(x)` is a `u16` length prefix
//! followed by the raw bytes. Maps are a `u16` entry count followed by the
//! entries sorted by key. The uid string is empty for uid 0.

use crate::errors::TokenServiceError;
use base64::{engine::general_purpose, Engine as _};
use common::types::{ChannelName, ParticipantId};
use ring::{
    hmac,
    rand::{SecureRandom, SystemRandom},
};
use std::collections::BTreeMap;

/// Token format version prefix.
pub const VERSION: &str = "006";

/// Offset applied to the message timestamp (24 hours).
const MESSAGE_TS_OFFSET_SECONDS: u32 = 24 * 3600;

/// Upper bound (inclusive) of the random salt.
const MAX_SALT: u32 = 99_999_999;

/// Privileges that can be granted by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Privilege {
    JoinChannel,
    PublishAudioStream,
    PublishVideoStream,
    PublishDataStream,
}

impl Privilege {
    /// Wire key of the privilege.
    pub fn key(self) -> u16 {
        match self {
            Privilege::JoinChannel => 1,
            Privilege::PublishAudioStream => 2,
            Privilege::PublishVideoStream => 3,
            Privilege::PublishDataStream => 4,
        }
    }
}

/// Role a participant joins with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtcRole {
    /// May join and publish audio, video and data.
    Publisher,
    /// May only join and subscribe. The service always issues
    /// `Publisher`; this role is part of the token format and is kept so
    /// its privilege map stays covered.
    Subscriber,
}

impl RtcRole {
    /// Privileges granted to this role.
    pub fn privileges(self) -> &'static [Privilege] {
        match self {
            RtcRole::Publisher => &[
                Privilege::JoinChannel,
                Privilege::PublishAudioStream,
                Privilege::PublishVideoStream,
                Privilege::PublishDataStream,
            ],
            RtcRole::Subscriber => &[Privilege::JoinChannel],
        }
    }
}

/// An unsigned token under construction.
pub struct AccessToken<'a> {
    app_id: &'a str,
    app_certificate: &'a str,
    channel_name: &'a str,
    uid: String,
    salt: u32,
    ts: u32,
    privileges: BTreeMap<u16, u32>,
}

impl<'a> AccessToken<'a> {
    /// Create a token with explicit salt and message timestamp.
    pub fn new(
        app_id: &'a str,
        app_certificate: &'a str,
        channel_name: &'a str,
        uid: ParticipantId,
        salt: u32,
        ts: u32,
    ) -> Self {
        Self {
            app_id,
            app_certificate,
            channel_name,
            uid: uid_string(uid),
            salt,
            ts,
            privileges: BTreeMap::new(),
        }
    }

    /// Grant `privilege` until `expires_at` (unix seconds).
    pub fn add_privilege(&mut self, privilege: Privilege, expires_at: u32) {
        self.privileges.insert(privilege.key(), expires_at);
    }

    /// Sign and encode the token.
    pub fn build(&self) -> Result<String, TokenServiceError> {
        let mut message = Packer::default();
        message.put_u32(self.salt);
        message.put_u32(self.ts);
        message.put_map(&self.privileges)?;
        let message = message.into_bytes();

        let mut to_sign = Vec::with_capacity(
            self.app_id.len() + self.channel_name.len() + self.uid.len() + message.len(),
        );
        to_sign.extend_from_slice(self.app_id.as_bytes());
        to_sign.extend_from_slice(self.channel_name.as_bytes());
        to_sign.extend_from_slice(self.uid.as_bytes());
        to_sign.extend_from_slice(&message);

        let key = hmac::Key::new(hmac::HMAC_SHA256, self.app_certificate.as_bytes());
        let signature = hmac::sign(&key, &to_sign);

        let mut content = Packer::default();
        content.put_bytes(signature.as_ref())?;
        content.put_u32(crc32(self.channel_name.as_bytes()));
        content.put_u32(crc32(self.uid.as_bytes()));
        content.put_bytes(&message)?;

        Ok(format!(
            "{}{}{}",
            VERSION,
            self.app_id,
            general_purpose::STANDARD.encode(content.into_bytes())
        ))
    }
}

/// Build a token for `uid` in `channel` with the privileges of `role`.
///
/// Every privilege expires at `privilege_expires_at`. `now` is the issuance
/// time in unix seconds; the salt is drawn from the system CSPRNG.
pub fn build_token_with_uid(
    app_id: &str,
    app_certificate: &str,
    channel: &ChannelName,
    uid: ParticipantId,
    role: RtcRole,
    privilege_expires_at: u32,
    now: u32,
) -> Result<String, TokenServiceError> {
    let salt = random_salt()?;
    let ts = now.saturating_add(MESSAGE_TS_OFFSET_SECONDS);

    let mut token = AccessToken::new(app_id, app_certificate, channel.as_str(), uid, salt, ts);
    for privilege in role.privileges() {
        token.add_privilege(*privilege, privilege_expires_at);
    }

    token.build()
}

/// Uid as it appears in the signed payload: empty for 0, decimal otherwise.
pub fn uid_string(uid: ParticipantId) -> String {
    match uid.value() {
        0 => String::new(),
        n => n.to_string(),
    }
}

fn random_salt() -> Result<u32, TokenServiceError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 4];
    rng.fill(&mut bytes)
        .map_err(|_| TokenServiceError::Internal("CSPRNG failure while generating salt".to_string()))?;

    Ok(u32::from_le_bytes(bytes) % MAX_SALT + 1)
}

#[derive(Default)]
struct Packer {
    buf: Vec<u8>,
}

impl Packer {
    fn put_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), TokenServiceError> {
        let len = u16::try_from(bytes.len()).map_err(|_| {
            TokenServiceError::Internal(format!("field of {} bytes exceeds u16 length", bytes.len()))
        })?;
        self.put_u16(len);
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn put_map(&mut self, map: &BTreeMap<u16, u32>) -> Result<(), TokenServiceError> {
        let count = u16::try_from(map.len())
            .map_err(|_| TokenServiceError::Internal("too many privileges".to_string()))?;
        self.put_u16(count);
        for (key, value) in map {
            self.put_u16(*key);
            self.put_u32(*value);
        }
        Ok(())
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// IEEE CRC-32 lookup table (reflected polynomial 0xEDB88320).
const CRC32_TABLE: [u32; 256] = generate_crc32_table();

#[allow(clippy::indexing_slicing)] // bounded by the loop condition; const fn cannot use get_mut
const fn generate_crc32_table() -> [u32; 256] {
    const POLYNOMIAL: u32 = 0xEDB8_8320;
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLYNOMIAL;
            } else {
                crc >>= 1;
            }
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for byte in data {
        let index = ((crc ^ u32::from(*byte)) & 0xFF) as usize;
        crc = CRC32_TABLE.get(index).copied().unwrap_or(0) ^ (crc >> 8);
    }
    !crc
}
