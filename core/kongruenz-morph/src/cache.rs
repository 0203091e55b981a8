use std::collections::HashMap;
use std::sync::RwLock;

use kongruenz_protocol::Synthesizer;

/// Memoizes `(lemma, tag)` lookups of another synthesizer.
///
/// Safe to share across threads checking sentences concurrently; a
/// poisoned lock only disables the cache, never the lookup.
pub struct CachedSynthesizer<S> {
    inner: S,
    cache: RwLock<HashMap<(String, String), Vec<String>>>,
}

impl<S: Synthesizer> CachedSynthesizer<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, cache: RwLock::new(HashMap::new()) }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }
}

impl<S: Synthesizer> Synthesizer for CachedSynthesizer<S> {
    fn synthesize(&self, lemma: &str, tag: &str) -> Vec<String> {
        let key = (lemma.to_string(), tag.to_string());
        if let Ok(cache) = self.cache.read() {
            if let Some(forms) = cache.get(&key) {
                return forms.clone();
            }
        }

        let forms = self.inner.synthesize(lemma, tag);
        if let Ok(mut cache) = self.cache.write() {
            cache.entry(key).or_insert_with(|| forms.clone());
        }
        forms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(AtomicUsize);

    impl Synthesizer for Counting {
        fn synthesize(&self, lemma: &str, tag: &str) -> Vec<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            vec![format!("{}/{}", lemma, tag)]
        }
    }

    #[test]
    fn test_repeated_lookup_hits_cache() {
        let cached = CachedSynthesizer::new(Counting(AtomicUsize::new(0)));
        assert_eq!(cached.synthesize("der", "ART:DEF:NOM:SIN:NEU"), vec!["der/ART:DEF:NOM:SIN:NEU"]);
        assert_eq!(cached.synthesize("der", "ART:DEF:NOM:SIN:NEU"), vec!["der/ART:DEF:NOM:SIN:NEU"]);
        assert_eq!(cached.inner().0.load(Ordering::SeqCst), 1);
        assert_eq!(cached.cached_entries(), 1);
    }

    #[test]
    fn test_concurrent_lookups_agree() {
        let cached = CachedSynthesizer::new(Counting(AtomicUsize::new(0)));
        let tags = ["SUB:NOM:SIN:NEU", "SUB:DAT:PLU:NEU", "SUB:GEN:SIN:NEU"];

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for tag in tags {
                        assert_eq!(cached.synthesize("Haus", tag), vec![format!("Haus/{}", tag)]);
                    }
                });
            }
        });

        assert_eq!(cached.cached_entries(), tags.len());
    }
}
