//! RSA PKCS#1 v1.5 signing and verification.
//!
//! Private keys are accepted as PKCS#1 (`RSA PRIVATE KEY`) or PKCS#8
//! (`PRIVATE KEY`) DER. Public keys are PKCS#1 `RSAPublicKey` DER, which is
//! what an X.509 `subjectPublicKey` bit string carries for RSA.

use aws_lc_rs::{
    rand::SystemRandom,
    signature::{self, KeyPair, RsaKeyPair, UnparsedPublicKey},
};

use crate::{algorithm::RsaAlgorithm, error::CryptoError};

fn load_key_pair(key_der: &[u8]) -> Result<RsaKeyPair, CryptoError> {
    RsaKeyPair::from_der(key_der)
        .or_else(|_| RsaKeyPair::from_pkcs8(key_der))
        .map_err(|e| CryptoError::InvalidKey(format!("Invalid RSA key: {e}")))
}

/// Signs data using RSA PKCS#1 v1.5.
///
/// # Arguments
///
/// * `key_der` - RSA private key in DER format (PKCS#1 or PKCS#8)
/// * `data` - Data to sign
/// * `algorithm` - Signature algorithm
///
/// # Errors
///
/// Returns an error if the key cannot be parsed, the algorithm is SHA-1, or
/// signing fails.
pub fn rsa_sign(
    key_der: &[u8],
    data: &[u8],
    algorithm: RsaAlgorithm,
) -> Result<Vec<u8>, CryptoError> {
    let padding = match algorithm {
        RsaAlgorithm::Sha1 => {
            return Err(CryptoError::UnsupportedAlgorithm(
                "rsa-sha1 is accepted for verification only".to_string(),
            ))
        }
        RsaAlgorithm::Sha256 => &signature::RSA_PKCS1_SHA256,
        RsaAlgorithm::Sha384 => &signature::RSA_PKCS1_SHA384,
        RsaAlgorithm::Sha512 => &signature::RSA_PKCS1_SHA512,
    };

    let key_pair = load_key_pair(key_der)?;
    let rng = SystemRandom::new();
    let mut sig = vec![0u8; key_pair.public_modulus_len()];

    key_pair
        .sign(padding, &rng, data, &mut sig)
        .map_err(|e| CryptoError::Signing(format!("RSA signing failed: {e}")))?;

    Ok(sig)
}

/// Verifies an RSA PKCS#1 v1.5 signature.
///
/// Returns `false` for any mismatch, including a malformed key.
#[must_use]
pub fn rsa_verify(public_key_der: &[u8], data: &[u8], sig: &[u8], algorithm: RsaAlgorithm) -> bool {
    let verification_alg: &dyn signature::VerificationAlgorithm = match algorithm {
        RsaAlgorithm::Sha1 => &signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY,
        RsaAlgorithm::Sha256 => &signature::RSA_PKCS1_2048_8192_SHA256,
        RsaAlgorithm::Sha384 => &signature::RSA_PKCS1_2048_8192_SHA384,
        RsaAlgorithm::Sha512 => &signature::RSA_PKCS1_2048_8192_SHA512,
    };

    UnparsedPublicKey::new(verification_alg, public_key_der)
        .verify(data, sig)
        .is_ok()
}

/// Returns the PKCS#1 `RSAPublicKey` DER matching a private key.
///
/// # Errors
///
/// Returns an error if the key cannot be parsed.
pub fn rsa_public_key(key_der: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let key_pair = load_key_pair(key_der)?;
    Ok(key_pair.public_key().as_ref().to_vec())
}
