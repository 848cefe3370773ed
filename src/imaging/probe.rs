//! Capability probe and backend selection.
//!
//! Whether the native codec path is usable is decided once per process and
//! then exposed as an immutable [`Capabilities`] value. Selection never
//! re-probes and never panics: a missing native path is an ordinary outcome
//! that routes every call to the portable backend.

use super::backend::CodecAdapter;
#[cfg(feature = "native")]
use super::native_backend::NativeCodec;
use super::portable_backend::PortableCodec;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProbeError {
    #[error("native codec backend requested but not available in this build")]
    BackendUnavailable,
}

/// Which backend the caller wants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Native when the probe finds it, portable otherwise.
    #[default]
    Auto,
    Native,
    Portable,
}

/// Result of the one-time capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub native: bool,
}

static CAPABILITIES: OnceLock<Capabilities> = OnceLock::new();

#[cfg(feature = "native")]
static NATIVE: NativeCodec = NativeCodec;
static PORTABLE: PortableCodec = PortableCodec;

fn probe_native() -> bool {
    #[cfg(feature = "native")]
    {
        NativeCodec::is_available()
    }
    #[cfg(not(feature = "native"))]
    {
        false
    }
}

/// Process-wide capabilities, computed on first call.
pub fn capabilities() -> &'static Capabilities {
    CAPABILITIES.get_or_init(|| {
        let caps = Capabilities {
            native: probe_native(),
        };
        if caps.native {
            tracing::debug!("native codec backend available");
        } else {
            tracing::info!("native codec backend unavailable, using portable codecs");
        }
        caps
    })
}

fn native_backend() -> Option<&'static dyn CodecAdapter> {
    #[cfg(feature = "native")]
    {
        Some(&NATIVE)
    }
    #[cfg(not(feature = "native"))]
    {
        None
    }
}

/// Resolve a backend choice against the given capabilities.
pub fn select_with(
    caps: &Capabilities,
    choice: BackendChoice,
) -> Result<&'static dyn CodecAdapter, ProbeError> {
    let native = if caps.native { native_backend() } else { None };
    match choice {
        BackendChoice::Auto => Ok(native.unwrap_or(&PORTABLE)),
        BackendChoice::Native => native.ok_or(ProbeError::BackendUnavailable),
        BackendChoice::Portable => Ok(&PORTABLE),
    }
}

/// Resolve a backend choice against this process's capabilities.
pub fn select(choice: BackendChoice) -> Result<&'static dyn CodecAdapter, ProbeError> {
    select_with(capabilities(), choice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_are_memoized() {
        let a = capabilities() as *const Capabilities;
        let b = capabilities() as *const Capabilities;
        assert_eq!(a, b);
    }

    #[test]
    fn portable_always_selectable() {
        let caps = Capabilities { native: false };
        assert_eq!(
            select_with(&caps, BackendChoice::Portable).unwrap().name(),
            "portable"
        );
    }

    #[test]
    fn auto_falls_back_without_native() {
        let caps = Capabilities { native: false };
        assert_eq!(
            select_with(&caps, BackendChoice::Auto).unwrap().name(),
            "portable"
        );
    }

    #[test]
    fn explicit_native_without_native_errors() {
        let caps = Capabilities { native: false };
        assert_eq!(
            select_with(&caps, BackendChoice::Native).err(),
            Some(ProbeError::BackendUnavailable)
        );
    }

    #[cfg(feature = "native")]
    #[test]
    fn auto_prefers_native_when_present() {
        let caps = Capabilities { native: true };
        assert_eq!(select_with(&caps, BackendChoice::Auto).unwrap().name(), "native");
    }

    #[test]
    fn backend_choice_parses_lowercase() {
        let choice: BackendChoice = serde_json::from_str("\"portable\"").unwrap();
        assert_eq!(choice, BackendChoice::Portable);
    }
}
