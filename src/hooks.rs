//! Caller-supplied hooks and their composition with the array codec.
//!
//! Composition order is fixed:
//! - encode: the array path runs first (a [`CustomValue`] exposing the
//!   array capability is always encoded natively); only values the
//!   array encoder does not recognise reach the caller's fallback, and
//!   the fallback's own error behaviour is preserved unchanged.
//! - decode: the caller's object hook runs first on every parsed
//!   mapping; its result is then re-examined for the sentinel key, so
//!   the array decoder has the final say on recognised fragments.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::ArrayJsonResult;
use crate::value::{CustomValue, Value};

/// Fallback consulted for opaque values the array encoder does not
/// recognise. Returns the plain JSON to emit for the value.
pub type EncodeFallback =
    Arc<dyn Fn(&dyn CustomValue) -> ArrayJsonResult<serde_json::Value> + Send + Sync>;

/// Hook applied to every parsed mapping, innermost first, before the
/// array decoder inspects it.
pub type ObjectHook = Arc<dyn Fn(BTreeMap<String, Value>) -> Value + Send + Sync>;

// ---------------------------------------------------------------------------
// Per-call hook sets
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct EncodeHooks {
    pub fallback: Option<EncodeFallback>,
}

impl EncodeHooks {
    pub fn new() -> EncodeHooks {
        EncodeHooks::default()
    }

    pub fn with_fallback<F>(fallback: F) -> EncodeHooks
    where
        F: Fn(&dyn CustomValue) -> ArrayJsonResult<serde_json::Value> + Send + Sync + 'static,
    {
        EncodeHooks {
            fallback: Some(Arc::new(fallback)),
        }
    }
}

impl fmt::Debug for EncodeHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodeHooks")
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct DecodeHooks {
    pub object_hook: Option<ObjectHook>,
}

impl DecodeHooks {
    pub fn new() -> DecodeHooks {
        DecodeHooks::default()
    }

    pub fn with_object_hook<F>(hook: F) -> DecodeHooks
    where
        F: Fn(BTreeMap<String, Value>) -> Value + Send + Sync + 'static,
    {
        DecodeHooks {
            object_hook: Some(Arc::new(hook)),
        }
    }
}

impl fmt::Debug for DecodeHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeHooks")
            .field("object_hook", &self.object_hook.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Process-wide defaults
// ---------------------------------------------------------------------------

static DEFAULT_HOOKS: OnceLock<(EncodeHooks, DecodeHooks)> = OnceLock::new();

/// Install process-wide default hooks, consulted by the bare entry
/// points ([`crate::to_string`], [`crate::from_str`], ...) whenever no
/// explicit hooks are passed.
///
/// Installation is irreversible: the first call wins for the lifetime of
/// the process and later calls have no effect. Concurrent first calls
/// race; which one wins is unspecified. Callers needing isolation should
/// use the `*_with` entry points, which never touch this state.
pub fn install_default_hooks(encode: EncodeHooks, decode: DecodeHooks) {
    let _ = DEFAULT_HOOKS.set((encode, decode));
}

pub(crate) fn default_encode_hooks() -> EncodeHooks {
    DEFAULT_HOOKS
        .get()
        .map(|(e, _)| e.clone())
        .unwrap_or_default()
}

pub(crate) fn default_decode_hooks() -> DecodeHooks {
    DEFAULT_HOOKS
        .get()
        .map(|(_, d)| d.clone())
        .unwrap_or_default()
}
