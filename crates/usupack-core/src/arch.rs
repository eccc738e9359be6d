use serde::Serialize;

pub const PRIMARY_BINARY: &str = "su";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchTag {
    Aarch64,
    Armv7l,
    Unsupported,
}

impl ArchTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aarch64 => "aarch64",
            Self::Armv7l => "armv7l",
            Self::Unsupported => "unsupported",
        }
    }

    pub fn payload_subtree(self) -> Option<&'static str> {
        match self {
            Self::Aarch64 => Some("aarch64"),
            Self::Armv7l => Some("armv7l"),
            Self::Unsupported => None,
        }
    }

    pub fn is_supported(self) -> bool {
        self != Self::Unsupported
    }
}

pub fn classify(abi: &str) -> ArchTag {
    if abi.contains("arm64") || abi.contains("aarch64") {
        ArchTag::Aarch64
    } else if abi.contains("armeabi") {
        ArchTag::Armv7l
    } else {
        ArchTag::Unsupported
    }
}

// Only the first list element is consulted; the legacy single-ABI string is
// the fallback for hosts that expose no ordered list.
pub fn resolve(abi_list: &[String], legacy_abi: &str) -> ArchTag {
    match abi_list.first() {
        Some(abi) => classify(abi),
        None => classify(legacy_abi),
    }
}
