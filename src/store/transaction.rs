use std::ops::{Deref, DerefMut};

/// Something whose state can be captured and later put back.
pub trait Snapshot {
    type State;

    fn snapshot(&self) -> Self::State;
    fn restore(&mut self, state: Self::State);

    /// Start a speculative edit.  Unless the returned guard is committed, dropping it puts the
    /// state back the way it was here.
    fn begin_change(&mut self) -> Transaction<'_, Self>
    where
        Self: Sized,
    {
        Transaction::begin(self)
    }

    /// Run `change` inside a transaction, keeping its edits only if it returns `Ok`.
    fn try_change<T, E>(&mut self, change: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        Self: Sized,
    {
        let mut transaction = self.begin_change();
        let value = change(&mut *transaction)?;
        transaction.commit();
        Ok(value)
    }
}

/// Guard returned by [`Snapshot::begin_change`]
pub struct Transaction<'a, S: Snapshot> {
    target: &'a mut S,
    saved: Option<S::State>,
}

impl<'a, S: Snapshot> Transaction<'a, S> {
    pub fn begin(target: &'a mut S) -> Self {
        let saved = Some(target.snapshot());
        Self { target, saved }
    }

    /// Keep the edits made so far.
    pub fn commit(mut self) {
        self.saved = None;
    }
}

impl<S: Snapshot> Deref for Transaction<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.target
    }
}

impl<S: Snapshot> DerefMut for Transaction<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.target
    }
}

impl<S: Snapshot> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.target.restore(saved);
        }
    }
}
