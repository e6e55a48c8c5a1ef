//! Credential hashing.
//!
//! Accounts never store a plain password. The hasher is a collaborator passed
//! in through [`crate::context::Context`]. [`Sha256Hasher`] is the default
//! for stand-alone use; a deployment facing real users should plug in a
//! memory-hard scheme through [`CredentialHasher`].

use sha2::{Digest, Sha256};
use uuid::Uuid;

pub trait CredentialHasher {
    /// One-way hash of `secret`, including whatever salt the scheme needs.
    fn hash(&self, secret: &str) -> String;

    fn verify(&self, secret: &str, hashed: &str) -> bool;
}

/// Salted SHA-256, stored as `sha256$<salt>$<hex digest>`.
///
/// A single fast hash round; not suited to protecting passwords at rest.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

const SCHEME: &str = "sha256";

fn digest(salt: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Byte comparison whose running time depends only on the lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl CredentialHasher for Sha256Hasher {
    fn hash(&self, secret: &str) -> String {
        let salt = Uuid::new_v4().simple().to_string();
        format!("{SCHEME}${salt}${}", digest(&salt, secret))
    }

    fn verify(&self, secret: &str, hashed: &str) -> bool {
        let mut parts = hashed.splitn(3, '$');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(SCHEME), Some(salt), Some(expected)) => {
                constant_time_eq(digest(salt, secret).as_bytes(), expected.as_bytes())
            }
            _ => false,
        }
    }
}
