use std::collections::BTreeMap;

/// Where [`EnvLoader::load`](crate::EnvLoader::load) writes accepted
/// assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEnv {
    /// `None` means the process environment.
    vars: Option<BTreeMap<String, String>>,
}

impl Default for TargetEnv {
    fn default() -> Self {
        Self::memory()
    }
}

impl From<BTreeMap<String, String>> for TargetEnv {
    fn from(vars: BTreeMap<String, String>) -> Self {
        Self::from_memory(vars)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TargetEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect::<BTreeMap<_, _>>()
            .into()
    }
}

impl TargetEnv {
    /// Target the process environment through [`std::env::set_var`].
    ///
    /// # Safety
    ///
    /// Nothing else may read or write the process environment on another
    /// thread while a loader writes to this target.
    pub unsafe fn process() -> Self {
        Self { vars: None }
    }

    pub fn memory() -> Self {
        Self::from_memory(BTreeMap::new())
    }

    /// An in-memory target whose existing keys count as already set.
    pub fn from_memory(vars: BTreeMap<String, String>) -> Self {
        Self { vars: Some(vars) }
    }

    pub fn is_process(&self) -> bool {
        self.vars.is_none()
    }

    /// Current value of `key`. Non-UTF-8 process values are lossily converted.
    pub fn get(&self, key: &str) -> Option<String> {
        match &self.vars {
            Some(vars) => vars.get(key).cloned(),
            None => std::env::var_os(key).map(|value| value.to_string_lossy().into_owned()),
        }
    }

    pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
        self.vars.as_ref()
    }

    pub fn into_memory(self) -> Option<BTreeMap<String, String>> {
        self.vars
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        match &self.vars {
            Some(vars) => vars.contains_key(key),
            None => std::env::var_os(key).is_some(),
        }
    }

    pub(crate) fn set_var(&mut self, key: &str, value: &str) {
        match &mut self.vars {
            Some(vars) => {
                vars.insert(key.to_owned(), value.to_owned());
            }
            // SAFETY: upheld by the caller of `TargetEnv::process`.
            None => unsafe { std::env::set_var(key, value) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn memory_target_tracks_inserted_keys() {
        let mut target = TargetEnv::memory();
        assert!(!target.contains_key("A"));

        target.set_var("A", "1");
        assert!(target.contains_key("A"));
        assert_eq!(target.get("A").as_deref(), Some("1"));
        assert!(!target.is_process());
    }

    #[test]
    fn collects_seeded_targets_from_pairs() {
        let target: TargetEnv = [("B", "2"), ("A", "1")].into_iter().collect();
        let keys: Vec<_> = target
            .as_memory()
            .map(|vars| vars.keys().cloned().collect())
            .unwrap_or_default();

        assert_eq!(keys, vec!["A".to_owned(), "B".to_owned()]);
        assert_eq!(target.get("B").as_deref(), Some("2"));
    }

    #[test]
    fn process_target_has_no_memory_view() {
        // SAFETY: the target is never written to.
        let target = unsafe { TargetEnv::process() };
        assert!(target.is_process());
        assert!(target.as_memory().is_none());
        assert!(target.into_memory().is_none());
    }
}
