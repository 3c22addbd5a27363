use crate::ast::CompiledFunction;
use crate::error::CompileError;
use log::trace;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    expression: String,
    variables: Vec<String>,
    // Sorted by name; values compared bitwise.
    constants: Vec<(String, u64)>,
}

impl CacheKey {
    fn new(expression: &str, variables: &[String], constants: &HashMap<String, f64>) -> Self {
        let mut constants: Vec<(String, u64)> = constants
            .iter()
            .map(|(name, value)| (name.clone(), value.to_bits()))
            .collect();
        constants.sort();
        Self {
            expression: expression.trim().to_string(),
            variables: variables.to_vec(),
            constants,
        }
    }
}

/// Bounded least-recently-used cache of compiled functions, so each distinct
/// expression is compiled once however many sections or threads ask for it.
pub struct FunctionCache {
    entries: Mutex<LruCache<CacheKey, Arc<CompiledFunction>>>,
}

impl FunctionCache {
    /// Creates a cache holding at most `max_cache_size` functions (at least one).
    pub fn new(max_cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(max_cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the cached function for these inputs, compiling it on a miss.
    /// Compile errors are returned and not cached.
    pub fn get_or_compile<V>(
        &self,
        expression: &str,
        variables: V,
        constants: &HashMap<String, f64>,
    ) -> Result<Arc<CompiledFunction>, CompileError>
    where
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let variables: Vec<String> = variables
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .collect();
        let key = CacheKey::new(expression, &variables, constants);

        if let Some(function) = self.lock().get(&key) {
            trace!("Function cache hit: {}", expression);
            return Ok(Arc::clone(function));
        }

        // Compile outside the lock; a concurrent miss on the same key only
        // costs a duplicate compile.
        trace!("Function cache miss: {}", expression);
        let function = Arc::new(CompiledFunction::compile(expression, &variables, constants)?);
        self.lock().put(key, Arc::clone(&function));
        Ok(function)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<CacheKey, Arc<CompiledFunction>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FunctionCache {
    fn default() -> Self {
        Self::new(100)
    }
}
