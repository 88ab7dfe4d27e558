//! Minimal PEM decoding.

use base64::Engine;

/// A decoded PEM block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemBlock {
    /// The label between `-----BEGIN ` and `-----`.
    pub label: String,
    /// The DER payload.
    pub der: Vec<u8>,
}

impl PemBlock {
    /// Decodes the first PEM block found in `pem`.
    #[must_use]
    pub fn parse(pem: &str) -> Option<Self> {
        let start = pem.find("-----BEGIN ")? + "-----BEGIN ".len();
        let label_end = start + pem[start..].find("-----")?;
        let label = pem[start..label_end].to_string();
        let der = pem_to_der(pem, &label)?;
        Some(Self { label, der })
    }
}

/// Extracts DER data from a PEM string with the given label.
#[must_use]
pub fn pem_to_der(pem: &str, label: &str) -> Option<Vec<u8>> {
    let begin = format!("-----BEGIN {label}-----");
    let end = format!("-----END {label}-----");

    let start = pem.find(&begin)? + begin.len();
    let end_pos = pem.find(&end)?;
    if end_pos < start {
        return None;
    }

    let b64_data: String = pem[start..end_pos]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    base64::engine::general_purpose::STANDARD.decode(&b64_data).ok()
}
