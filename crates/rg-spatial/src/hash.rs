//! Hash collection aliases.
//!
//! Cell ids are small integer pairs, so FxHash is markedly faster than the
//! default SipHash for the per-tick reservation set and the A* maps.  The
//! `fx-hash` feature switches every alias at once; both variants construct
//! with `Default::default()`.

use rg_core::CellId;

#[cfg(feature = "fx-hash")]
pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
pub type FastMap<K, V> = std::collections::HashMap<K, V>;

#[cfg(feature = "fx-hash")]
pub type FastSet<K> = rustc_hash::FxHashSet<K>;
#[cfg(not(feature = "fx-hash"))]
pub type FastSet<K> = std::collections::HashSet<K>;

/// A set of cell identities (reservations, occupancy).
pub type CellSet = FastSet<CellId>;
