pub mod error;
mod set_store;

pub use set_store::JsonSetStore;

use crate::infrastructure::directories::ResolvedPaths;

/// The two persisted sets the server classifies against.
#[derive(Debug)]
pub struct Stores {
    pub bad_urls: JsonSetStore,
    pub members: JsonSetStore,
}

impl Stores {
    pub fn new(bad_urls: JsonSetStore, members: JsonSetStore) -> Self {
        Self { bad_urls, members }
    }

    pub fn open(paths: &ResolvedPaths) -> Self {
        Self::new(
            JsonSetStore::new("bad_urls", paths.bad_urls_path.clone()),
            JsonSetStore::new("members", paths.members_path.clone()),
        )
    }
}
