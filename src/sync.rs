//! Sync - Maps abstract CRUD methods onto store operations and fans the
//! outcome out to callback consumers and the returned future.

use crate::error::StoreError;
use crate::record::{record_id, Record};
use crate::store::Store;

/// The abstract method names the modeling framework dispatches with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMethod {
    Read,
    Create,
    Update,
    Delete,
}

/// A successful sync outcome: one record, or the whole collection for an
/// id-less read.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncValue<R> {
    One(R),
    Many(Vec<R>),
}

type SuccessFn<R> = Box<dyn FnOnce(&SyncValue<R>) + Send>;
type ErrorFn = Box<dyn FnOnce(&str) + Send>;
type CompleteFn<R> = Box<dyn FnOnce(Option<&SyncValue<R>>) + Send>;

/// Optional callback consumers for a sync call.
///
/// The callback channel exists alongside the returned `Result` because
/// callers may consume either style; both observe the same outcome, computed
/// once. `complete` always fires, after `success` or `error`.
pub struct SyncOptions<R> {
    success: Option<SuccessFn<R>>,
    error: Option<ErrorFn>,
    complete: Option<CompleteFn<R>>,
}

impl<R> Default for SyncOptions<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> SyncOptions<R> {
    pub fn new() -> Self {
        Self {
            success: None,
            error: None,
            complete: None,
        }
    }

    /// Invoked with the outcome value on success.
    pub fn on_success(mut self, callback: impl FnOnce(&SyncValue<R>) + Send + 'static) -> Self {
        self.success = Some(Box::new(callback));
        self
    }

    /// Invoked with the error message on failure.
    pub fn on_error(mut self, callback: impl FnOnce(&str) + Send + 'static) -> Self {
        self.error = Some(Box::new(callback));
        self
    }

    /// Invoked regardless of outcome, with the value when there was one.
    pub fn on_complete(
        mut self,
        callback: impl FnOnce(Option<&SyncValue<R>>) + Send + 'static,
    ) -> Self {
        self.complete = Some(Box::new(callback));
        self
    }
}

impl<R: Record + 'static> Store<R> {
    /// Dispatch an abstract CRUD method against this store.
    ///
    /// The outcome is computed exactly once, delivered to the registered
    /// callbacks before this future resolves, and returned. An operation that
    /// completes without data routes through the error path as
    /// [`StoreError::NotFound`]; a quota failure against an empty backend is
    /// reported as [`StoreError::EnvironmentUnsupported`].
    pub async fn sync(
        &mut self,
        method: SyncMethod,
        record: &mut R,
        options: SyncOptions<R>,
    ) -> Result<SyncValue<R>, StoreError> {
        let outcome = self.dispatch(method, record).await;
        let outcome = self.classify(outcome).await;

        match &outcome {
            Ok(value) => {
                if let Some(success) = options.success {
                    success(value);
                }
            }
            Err(err) => {
                if let Some(error) = options.error {
                    error(&err.to_string());
                }
            }
        }
        if let Some(complete) = options.complete {
            complete(outcome.as_ref().ok());
        }

        outcome
    }

    async fn dispatch(
        &mut self,
        method: SyncMethod,
        record: &mut R,
    ) -> Result<SyncValue<R>, StoreError> {
        match method {
            SyncMethod::Read => {
                if record_id(record).is_some() {
                    self.find(record)
                        .await?
                        .map(SyncValue::One)
                        .ok_or(StoreError::NotFound)
                } else {
                    let records = self.find_all().await?;
                    if records.is_empty() {
                        Err(StoreError::NotFound)
                    } else {
                        Ok(SyncValue::Many(records))
                    }
                }
            }
            SyncMethod::Create => self.create(record).await.map(SyncValue::One),
            SyncMethod::Update => self.update(record).await.map(SyncValue::One),
            SyncMethod::Delete => self.destroy(record).await.map(SyncValue::One),
        }
    }

    /// A quota failure while the backend holds nothing at all means the
    /// environment never let a write through; everything else forwards
    /// unchanged.
    async fn classify(
        &self,
        outcome: Result<SyncValue<R>, StoreError>,
    ) -> Result<SyncValue<R>, StoreError> {
        match outcome {
            Err(StoreError::Quota) => {
                if matches!(self.storage_size().await, Ok(0)) {
                    Err(StoreError::EnvironmentUnsupported)
                } else {
                    Err(StoreError::Quota)
                }
            }
            other => other,
        }
    }
}
