// SPDX-License-Identifier: MIT OR Apache-2.0
//! Process-unique emission symbols.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(0);

/// Mint a fresh symbol (`__s{n}`), never handed out twice per process
pub fn fresh_symbol() -> String {
    let n = NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed);
    tracing::trace!(symbol = n, "Allocated symbol");
    format!("__s{n}")
}
