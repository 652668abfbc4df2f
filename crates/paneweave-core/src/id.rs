#![forbid(unsafe_code)]

//! Typed identifiers for panes, split nodes, and content references.
//!
//! Generated tokens follow the scheme `<kind>_<8 hex chars>`, optionally with
//! a caller prefix between the two: `<kind>_<prefix>_<8 hex chars>`. The hex
//! suffix is a bijective mix of a process-wide counter, so two tokens minted
//! by the same process never collide until 2^32 tokens have been issued.
//!
//! Tokens received from outside (deserialized layouts, host supplied content
//! references) only have to be non-empty. [`validate`] checks the generated
//! scheme syntactically; it says nothing about tree membership.

use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

static NEXT_TOKEN: AtomicU32 = AtomicU32::new(0);
static PROCESS_SEED: OnceLock<u32> = OnceLock::new();

const HEX_LEN: usize = 8;

/// Identifier families. Each maps to one typed identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdKind {
    Pane,
    Node,
    Content,
}

impl IdKind {
    /// Leading tag of generated tokens.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Pane => "pane",
            Self::Node => "node",
            Self::Content => "content",
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("{kind} identifier must not be empty")]
    Empty { kind: IdKind },
}

/// Mint a fresh token for `kind`.
///
/// `prefix` is sanitized to `[a-z0-9-]`; an empty or fully-stripped prefix is
/// omitted.
#[must_use]
pub fn generate(kind: IdKind, prefix: Option<&str>) -> String {
    let seed = *PROCESS_SEED.get_or_init(process_seed);
    let counter = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
    let suffix = mix32(counter.wrapping_add(seed));

    let prefix = prefix.map(sanitize_prefix).unwrap_or_default();
    if prefix.is_empty() {
        format!("{}_{suffix:08x}", kind.tag())
    } else {
        format!("{}_{prefix}_{suffix:08x}", kind.tag())
    }
}

/// Check that `id` has the generated shape for `kind`.
#[must_use]
pub fn validate(id: &str, kind: IdKind) -> bool {
    let Some(rest) = id
        .strip_prefix(kind.tag())
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };
    if rest.len() < HEX_LEN || !rest.is_ascii() {
        return false;
    }
    let (head, hex) = rest.split_at(rest.len() - HEX_LEN);
    if !hex
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return false;
    }
    if head.is_empty() {
        return true;
    }
    let Some(prefix) = head.strip_suffix('_') else {
        return false;
    };
    !prefix.is_empty() && prefix.bytes().all(is_prefix_byte)
}

fn is_prefix_byte(b: u8) -> bool {
    b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-'
}

fn sanitize_prefix(prefix: &str) -> String {
    prefix
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii() && is_prefix_byte(*c as u8))
        .collect()
}

fn process_seed() -> u32 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos() ^ (elapsed.as_secs() as u32))
        .unwrap_or(0);
    mix32(nanos ^ std::process::id().rotate_left(16))
}

/// lowbias32 finalizer; every step is a bijection on u32.
const fn mix32(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    x
}

macro_rules! typed_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Identifier family of this type.
            pub const KIND: IdKind = $kind;

            /// Wrap an existing token, rejecting the empty string.
            pub fn new(raw: impl Into<String>) -> Result<Self, IdentifierError> {
                let raw = raw.into();
                if raw.is_empty() {
                    return Err(IdentifierError::Empty { kind: Self::KIND });
                }
                Ok(Self(raw))
            }

            /// Mint a fresh process-unique identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(generate(Self::KIND, None))
            }

            /// Mint a fresh identifier carrying a readable prefix.
            #[must_use]
            pub fn generate_with_prefix(prefix: &str) -> Self {
                Self(generate(Self::KIND, Some(prefix)))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the token follows the generated scheme.
            #[must_use]
            pub fn is_well_formed(&self) -> bool {
                validate(&self.0, Self::KIND)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdentifierError;

            fn try_from(raw: &str) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

typed_identifier!(
    /// Identifier of a leaf pane.
    PaneId,
    IdKind::Pane
);

typed_identifier!(
    /// Identifier of a split (tree-internal) node.
    NodeId,
    IdKind::Node
);

typed_identifier!(
    /// Reference to host-supplied content shown in a pane.
    ///
    /// Opaque to the layout engine; handed to the content factory verbatim.
    ContentId,
    IdKind::Content
);
