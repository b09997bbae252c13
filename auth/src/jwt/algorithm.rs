use std::fmt;

use jsonwebtoken::Algorithm;

/// Signing algorithms tokens may declare.
///
/// Closed on purpose: a header naming anything outside this set is refused
/// before any signature is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256.
    #[default]
    Hs256,
}

impl SigningAlgorithm {
    /// Header `alg` value.
    pub fn name(&self) -> &'static str {
        match self {
            SigningAlgorithm::Hs256 => "HS256",
        }
    }

    /// Map a declared `alg` value onto a supported algorithm.
    ///
    /// Matching is exact; `"none"`, `"hs256"` and other HMAC widths yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "HS256" => Some(SigningAlgorithm::Hs256),
            _ => None,
        }
    }

    pub(crate) fn to_jsonwebtoken(self) -> Algorithm {
        match self {
            SigningAlgorithm::Hs256 => Algorithm::HS256,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
