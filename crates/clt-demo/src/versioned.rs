// -------------------------------------------------------------------
// Versioned
// -------------------------------------------------------------------

/// A value with a counter bumped on every write, so derived data can
/// tell whether it is stale.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    version: u64,
    data: T,
}

impl<T> Versioned<T> {
    pub fn new(data: T) -> Self {
        Self { version: 0, data }
    }
    pub fn get(&self) -> &T {
        &self.data
    }
    pub fn get_mut(&mut self) -> &mut T {
        self.version = self.version.wrapping_add(1);
        &mut self.data
    }
    pub fn set(&mut self, data: T) {
        self.data = data;
        self.version = self.version.wrapping_add(1);
    }
    pub fn version(&self) -> u64 {
        self.version
    }
}

// -------------------------------------------------------------------
// Memoized
// -------------------------------------------------------------------

pub struct Memoized<S, K, V> {
    version: u64,
    last: Option<(K, V)>,
    get_key: Box<dyn Fn(&S) -> K>,
    calc: Box<dyn Fn(&S) -> V>,
}

impl<S, K, V> Memoized<S, K, V>
where
    K: PartialEq,
{
    pub fn new(
        get_key: impl Fn(&S) -> K + 'static,
        calc: impl Fn(&S) -> V + 'static,
    ) -> Self {
        Self {
            version: 0,
            last: None,
            get_key: Box::new(get_key),
            calc: Box::new(calc),
        }
    }

    /// Recompute only if the key changed.
    pub fn get<'a>(&'a mut self, store: &S) -> &'a V {
        let key = (self.get_key)(store);
        let entry = match self.last.take() {
            Some((k, v)) if k == key => (k, v),
            _ => {
                self.version = self.version.wrapping_add(1);
                let value = (self.calc)(store);
                (key, value)
            }
        };
        &self.last.insert(entry).1
    }

    /// Incremented each time the value is recomputed.
    pub fn version(&self) -> u64 {
        self.version
    }
}
