//! The document collaborator's shape, mocked in-core.
//!
//! Real builds substitute the full Worldographer document model produced by
//! the codec pipeline; scripts only rely on the shape defined here. The VM
//! borrows a `MapRoot` for the duration of one execution and mutates it in
//! place.

/// Root name every assignable document path starts from.
pub const MAP_ROOT: &str = "map";

/// The one iterable document path scripts may name directly. The parser
/// flattens dotted expressions into a single identifier, so `map.hexes`
/// arrives at the checker and the VM as this exact string. Both recognize
/// it through this constant and nowhere else.
pub const MAP_HEXES: &str = "map.hexes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hex {
    pub terrain: String,
}

impl Hex {
    pub fn new(terrain: impl Into<String>) -> Self {
        Self { terrain: terrain.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapRoot {
    pub hexes: Vec<Hex>,
}

impl MapRoot {
    /// The stand-in document used by the REPL and by `load` until the real
    /// codec pipeline is wired in.
    pub fn mock() -> Self {
        Self {
            hexes: vec![Hex::new("forest"), Hex::new("plains")],
        }
    }
}
