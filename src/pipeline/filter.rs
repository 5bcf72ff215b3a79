/// One processing stage applied to a data unit and its metadata.
///
/// Closures `Fn(&mut T, &M)` are filters too, so ad-hoc stages need no
/// wrapper type.
pub trait Filter<T, M>: Send + Sync {
    fn apply(&self, data: &mut T, metadata: &M);
}

impl<T, M, F> Filter<T, M> for F
where
    F: Fn(&mut T, &M) + Send + Sync,
{
    fn apply(&self, data: &mut T, metadata: &M) {
        self(data, metadata)
    }
}

/// Filter that leaves its input untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpFilter;

impl<T, M> Filter<T, M> for NoOpFilter {
    fn apply(&self, _data: &mut T, _metadata: &M) {}
}
