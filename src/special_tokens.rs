//! Reserved tokens that occupy the first ids of every vocabulary.

use serde::{Deserialize, Serialize};

use crate::vocab::TokenId;

/// Padding token, id 0.
pub const PAD: &str = "<pad>";
/// Masking token for masked-language-model training, id 1.
pub const MASK: &str = "<mask>";
/// Out-of-vocabulary replacement, id 2.
pub const UNK: &str = "<unk>";

/// Reserved tokens in id order.
pub const RESERVED: [&str; 3] = [PAD, MASK, UNK];

/// One of the three reserved tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservedToken {
    /// `<pad>`
    Pad,
    /// `<mask>`
    Mask,
    /// `<unk>`
    Unknown,
}

impl ReservedToken {
    /// All reserved tokens in id order.
    pub const ALL: [ReservedToken; 3] = [Self::Pad, Self::Mask, Self::Unknown];

    /// Fixed id of the token in every vocabulary.
    #[must_use]
    pub const fn id(self) -> TokenId {
        match self {
            Self::Pad => 0,
            Self::Mask => 1,
            Self::Unknown => 2,
        }
    }

    /// Token string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pad => PAD,
            Self::Mask => MASK,
            Self::Unknown => UNK,
        }
    }

    /// Looks up the reserved token spelled `token`.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|reserved| reserved.as_str() == token)
    }
}

/// Returns true when `token` is one of the reserved tokens.
#[must_use]
pub fn is_reserved(token: &str) -> bool {
    ReservedToken::from_token(token).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_reserved_order() {
        for (idx, reserved) in ReservedToken::ALL.into_iter().enumerate() {
            assert_eq!(reserved.id() as usize, idx);
            assert_eq!(RESERVED[idx], reserved.as_str());
            assert_eq!(ReservedToken::from_token(reserved.as_str()), Some(reserved));
        }
        assert!(!is_reserved("_"));
    }
}
