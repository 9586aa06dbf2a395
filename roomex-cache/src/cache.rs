use lazy_static::lazy_static;
use std::sync::RwLock;
pub use string_cache::DefaultAtom as Atom;

lazy_static! {
    static ref ASSET_INTERNER: RwLock<Vec<Atom>> = RwLock::new(Vec::new());
}

/// Handle to an interned asset URL. Every room shares the same texture sets,
/// so surfaces refer to URLs by id instead of carrying strings around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(usize);

impl AssetId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Intern a URL and return its id. Interning the same URL twice yields the
/// same id.
pub fn intern_asset(url: &str) -> AssetId {
    let atom = Atom::from(url);
    if let Some(idx) = read().iter().position(|a| *a == atom) {
        return AssetId(idx);
    }
    let mut v = ASSET_INTERNER.write().unwrap_or_else(|e| e.into_inner());
    // another thread may have interned it between the two locks
    match v.iter().position(|a| *a == atom) {
        Some(idx) => AssetId(idx),
        None => {
            v.push(atom);
            AssetId(v.len() - 1)
        }
    }
}

/// Number of distinct URLs seen so far
pub fn asset_count() -> usize {
    read().len()
}

pub fn asset_url(id: AssetId) -> Option<Atom> {
    read().get(id.0).cloned()
}

fn read() -> std::sync::RwLockReadGuard<'static, Vec<Atom>> {
    ASSET_INTERNER.read().unwrap_or_else(|e| e.into_inner())
}
