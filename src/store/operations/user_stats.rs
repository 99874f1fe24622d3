use serde::{Deserialize, Serialize};

use crate::constants::MAX_CAS_RETRIES;
use crate::store::keys;
use crate::store::{Store, StoreError};

/// 每个用户唯一的一条练习统计记录，四个计数器按难度划分。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user_id: String,
    pub training: u64,
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
}

impl UserStats {
    pub fn zeroed(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            training: 0,
            easy: 0,
            medium: 0,
            hard: 0,
        }
    }

    pub fn value(&self, field: StatField) -> u64 {
        match field {
            StatField::Training => self.training,
            StatField::Easy => self.easy,
            StatField::Medium => self.medium,
            StatField::Hard => self.hard,
        }
    }

    pub fn set_value(&mut self, field: StatField, value: u64) {
        match field {
            StatField::Training => self.training = value,
            StatField::Easy => self.easy = value,
            StatField::Medium => self.medium = value,
            StatField::Hard => self.hard = value,
        }
    }
}

/// 可单独更新的统计字段，封闭枚举即是白名单。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatField {
    Training,
    Easy,
    Medium,
    Hard,
}

impl StatField {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "training" => Some(Self::Training),
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl Store {
    /// Plain read, no side effects. Route handlers use
    /// [`Store::get_or_create_user_stats`]; this is for probes and internals.
    pub fn get_user_stats(&self, user_id: &str) -> Result<Option<UserStats>, StoreError> {
        let key = keys::user_stats_key(user_id);
        match self.user_stats.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// Read-or-default-create: returns the stored record, atomically
    /// materializing a zero-valued one on first read.
    ///
    /// Insert-if-absent runs as a compare-and-swap against a missing key, so
    /// two concurrent first-reads for the same unseen `user_id` cannot both
    /// insert; the loser re-reads the winner's record.
    pub fn get_or_create_user_stats(&self, user_id: &str) -> Result<UserStats, StoreError> {
        let key = keys::user_stats_key(user_id);

        for _ in 0..MAX_CAS_RETRIES {
            if let Some(raw) = self.user_stats.get(key.as_bytes())? {
                return Self::deserialize(&raw);
            }

            let fresh = UserStats::zeroed(user_id);
            let bytes = Self::serialize(&fresh)?;
            match self
                .user_stats
                .compare_and_swap(key.as_bytes(), None::<&[u8]>, Some(bytes))?
            {
                Ok(()) => return Ok(fresh),
                // Lost the insert race (or raced a delete); re-read.
                Err(_) => continue,
            }
        }

        Err(StoreError::CasRetryExhausted {
            entity: "user_stats".to_string(),
            key: user_id.to_string(),
            attempts: MAX_CAS_RETRIES,
        })
    }

    /// 全量列表，无过滤、无分页。
    pub fn list_user_stats(&self) -> Result<Vec<UserStats>, StoreError> {
        let mut all = Vec::new();
        for item in self.user_stats.iter() {
            let (_, value) = item?;
            all.push(Self::deserialize::<UserStats>(&value)?);
        }
        Ok(all)
    }

    /// Full-document overwrite. Does not create: returns `false` when no
    /// record exists for `stats.user_id`.
    pub fn replace_user_stats(&self, stats: &UserStats) -> Result<bool, StoreError> {
        let key = keys::user_stats_key(&stats.user_id);

        for _ in 0..MAX_CAS_RETRIES {
            let Some(current) = self.user_stats.get(key.as_bytes())? else {
                return Ok(false);
            };
            let next = Self::serialize(stats)?;
            match self.user_stats.compare_and_swap(
                key.as_bytes(),
                Some(&current),
                Some(next),
            )? {
                Ok(()) => return Ok(true),
                Err(_) => continue,
            }
        }

        Err(StoreError::CasRetryExhausted {
            entity: "user_stats".to_string(),
            key: stats.user_id.clone(),
            attempts: MAX_CAS_RETRIES,
        })
    }

    /// Single-counter update via CAS loop; other fields are carried over
    /// from the current document unchanged.
    pub fn set_user_stat(
        &self,
        user_id: &str,
        field: StatField,
        value: u64,
    ) -> Result<UserStats, StoreError> {
        let key = keys::user_stats_key(user_id);

        for _ in 0..MAX_CAS_RETRIES {
            let Some(current) = self.user_stats.get(key.as_bytes())? else {
                return Err(StoreError::NotFound {
                    entity: "user_stats".to_string(),
                    key: user_id.to_string(),
                });
            };
            let mut stats: UserStats = Self::deserialize(&current)?;
            stats.set_value(field, value);
            let next = Self::serialize(&stats)?;
            match self.user_stats.compare_and_swap(
                key.as_bytes(),
                Some(&current),
                Some(next),
            )? {
                Ok(()) => return Ok(stats),
                Err(_) => continue,
            }
        }

        Err(StoreError::CasRetryExhausted {
            entity: "user_stats".to_string(),
            key: user_id.to_string(),
            attempts: MAX_CAS_RETRIES,
        })
    }

    pub fn delete_user_stats(&self, user_id: &str) -> Result<(), StoreError> {
        let key = keys::user_stats_key(user_id);
        match self.user_stats.remove(key.as_bytes())? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                entity: "user_stats".to_string(),
                key: user_id.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::tempdir;

    use super::*;

    fn open_store(name: &str) -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join(name).to_str().unwrap()).unwrap();
        (dir, store)
    }

    #[test]
    fn first_read_creates_zeroed_record() {
        let (_dir, store) = open_store("stats-db");

        let stats = store.get_or_create_user_stats("u1").unwrap();
        assert_eq!(stats, UserStats::zeroed("u1"));

        let listed = store.list_user_stats().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user_id, "u1");
    }

    #[test]
    fn second_read_returns_stored_record() {
        let (_dir, store) = open_store("stats-db2");

        store.get_or_create_user_stats("u1").unwrap();
        store
            .set_user_stat("u1", StatField::Easy, 7)
            .unwrap();

        let again = store.get_or_create_user_stats("u1").unwrap();
        assert_eq!(again.easy, 7);
        assert_eq!(store.list_user_stats().unwrap().len(), 1);
    }

    #[test]
    fn concurrent_first_reads_insert_once() {
        let (_dir, store) = open_store("stats-race");
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.get_or_create_user_stats("racer").unwrap())
            })
            .collect();

        for handle in handles {
            let stats = handle.join().unwrap();
            assert_eq!(stats, UserStats::zeroed("racer"));
        }

        assert_eq!(store.list_user_stats().unwrap().len(), 1);
    }

    #[test]
    fn set_field_leaves_others_unchanged() {
        let (_dir, store) = open_store("stats-db3");

        store.get_or_create_user_stats("u1").unwrap();
        let updated = store.set_user_stat("u1", StatField::Training, 5).unwrap();

        assert_eq!(updated.training, 5);
        assert_eq!(updated.easy, 0);
        assert_eq!(updated.medium, 0);
        assert_eq!(updated.hard, 0);
    }

    #[test]
    fn set_field_on_missing_record_is_not_found() {
        let (_dir, store) = open_store("stats-db4");

        let err = store
            .set_user_stat("ghost", StatField::Hard, 1)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn replace_overwrites_whole_document() {
        let (_dir, store) = open_store("stats-db5");

        store.get_or_create_user_stats("u1").unwrap();
        let replacement = UserStats {
            user_id: "u1".to_string(),
            training: 1,
            easy: 2,
            medium: 3,
            hard: 4,
        };
        assert!(store.replace_user_stats(&replacement).unwrap());

        let got = store.get_user_stats("u1").unwrap().unwrap();
        assert_eq!(got, replacement);
    }

    #[test]
    fn replace_does_not_create() {
        let (_dir, store) = open_store("stats-db6");

        let replacement = UserStats::zeroed("ghost");
        assert!(!store.replace_user_stats(&replacement).unwrap());
        assert!(store.get_user_stats("ghost").unwrap().is_none());
    }

    #[test]
    fn delete_then_read_recreates_fresh_record() {
        let (_dir, store) = open_store("stats-db7");

        store.get_or_create_user_stats("u1").unwrap();
        store.set_user_stat("u1", StatField::Medium, 9).unwrap();
        store.delete_user_stats("u1").unwrap();

        let fresh = store.get_or_create_user_stats("u1").unwrap();
        assert_eq!(fresh, UserStats::zeroed("u1"));
    }

    #[test]
    fn delete_missing_record_is_not_found() {
        let (_dir, store) = open_store("stats-db8");

        let err = store.delete_user_stats("ghost").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn stat_field_parse_rejects_unknown_names() {
        assert_eq!(StatField::parse("training"), Some(StatField::Training));
        assert_eq!(StatField::parse("easy"), Some(StatField::Easy));
        assert_eq!(StatField::parse("medium"), Some(StatField::Medium));
        assert_eq!(StatField::parse("hard"), Some(StatField::Hard));
        assert_eq!(StatField::parse("bogus"), None);
        assert_eq!(StatField::parse("Training"), None);
    }

    #[test]
    fn user_stats_serializes_camel_case() {
        let json = serde_json::to_value(UserStats::zeroed("u1")).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["training"], 0);
        assert!(json.get("user_id").is_none());
    }
}
