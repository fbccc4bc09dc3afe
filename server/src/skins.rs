//! Remembered skin variant per identity

use crate::storage::{load_json, persist_json, Store, StoreError};
use log::info;
use shared::SKIN_VARIANTS;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const SKIN_PICKS_KEY: &str = "quakk-picks";

pub struct SkinPicks {
    store: Arc<dyn Store>,
    picks: Mutex<BTreeMap<String, u32>>,
}

impl SkinPicks {
    pub fn load(store: Arc<dyn Store>) -> Result<Self, StoreError> {
        let picks: BTreeMap<String, u32> = load_json(store.as_ref(), SKIN_PICKS_KEY)?;
        Ok(Self {
            store,
            picks: Mutex::new(picks),
        })
    }

    pub async fn get(&self, username: &str) -> Option<u32> {
        self.picks.lock().await.get(username).copied()
    }

    ///Returns false when `variant` is not a known skin
    pub async fn select(&self, username: &str, variant: u32) -> Result<bool, StoreError> {
        if variant >= SKIN_VARIANTS {
            return Ok(false);
        }

        let mut picks = self.picks.lock().await;
        let mut next = picks.clone();
        next.insert(username.to_string(), variant);
        persist_json(&self.store, SKIN_PICKS_KEY, &next).await?;
        *picks = next;

        info!("{} picked skin {}", username, variant);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_select_and_get() {
        let store = Arc::new(MemoryStore::new());
        let skins = SkinPicks::load(store.clone()).unwrap();

        assert_eq!(skins.get("@a").await, None);
        assert!(skins.select("@a", 4).await.unwrap());
        assert!(skins.select("@a", 2).await.unwrap());
        assert_eq!(skins.get("@a").await, Some(2));

        let reloaded = SkinPicks::load(store).unwrap();
        assert_eq!(reloaded.get("@a").await, Some(2));
    }

    #[tokio::test]
    async fn test_unknown_variant_rejected() {
        let skins = SkinPicks::load(Arc::new(MemoryStore::new())).unwrap();

        assert!(!skins.select("@a", SKIN_VARIANTS).await.unwrap());
        assert_eq!(skins.get("@a").await, None);
    }
}
