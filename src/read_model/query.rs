//! Lazy, composable queries over a read model collection.

use std::cmp::Ordering;
use std::marker::PhantomData;

use super::ReadModel;
use crate::document::{Bson, Filter};
use crate::error::Result;
use crate::store::DocumentCollection;

type Predicate<M> = Box<dyn Fn(&M) -> bool + Send + Sync>;
type Comparator<M> = Box<dyn Fn(&M, &M) -> Ordering + Send + Sync>;

/// A deferred query over every document of a collection.
///
/// Building and composing a query touches no storage; only the terminal
/// methods (`fetch`, `first`, `count`, `exists`) run it, once per call.
/// Steps apply in a fixed order: store filter, predicates, sort, skip, take.
pub struct Query<M, C> {
    collection: C,
    filter: Filter,
    predicates: Vec<Predicate<M>>,
    order: Option<Comparator<M>>,
    skip: usize,
    take: Option<usize>,
    _marker: PhantomData<fn() -> M>,
}

impl<M: ReadModel, C: DocumentCollection> Query<M, C> {
    pub(crate) fn new(collection: C) -> Self {
        Self {
            collection,
            filter: Filter::All,
            predicates: Vec::new(),
            order: None,
            skip: 0,
            take: None,
            _marker: PhantomData,
        }
    }

    /// Keep documents whose stored `field` equals `value`. Evaluated by the store.
    pub fn where_eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.filter = self.filter.and(Filter::eq(field, value));
        self
    }

    /// Keep models matching a predicate. Evaluated after loading.
    pub fn filter<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&M) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Sort by a comparator. The sort is stable; a later call replaces an earlier one.
    pub fn order_by<F>(mut self, compare: F) -> Self
    where
        F: Fn(&M, &M) -> Ordering + Send + Sync + 'static,
    {
        self.order = Some(Box::new(compare));
        self
    }

    /// Sort ascending by a key.
    pub fn order_by_key<K, F>(self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&M) -> K + Send + Sync + 'static,
    {
        self.order_by(move |a, b| key(a).cmp(&key(b)))
    }

    /// Drop the first `n` results. Repeated calls add up.
    pub fn skip(mut self, n: usize) -> Self {
        self.skip = self.skip.saturating_add(n);
        self
    }

    /// Keep at most `n` results. Repeated calls keep the smallest limit.
    pub fn take(mut self, n: usize) -> Self {
        self.take = Some(self.take.map_or(n, |current| current.min(n)));
        self
    }

    /// Project each result. The projection is as lazy as the query.
    pub fn select<R, F>(self, selector: F) -> Projection<M, C, R>
    where
        F: Fn(M) -> R + Send + Sync + 'static,
    {
        Projection {
            query: self,
            selector: Box::new(selector),
        }
    }

    /// The filter that will be sent to the store.
    pub fn store_filter(&self) -> &Filter {
        &self.filter
    }

    /// Run the query.
    pub fn fetch(&self) -> Result<Vec<M>> {
        let documents = self.collection.find(&self.filter)?;

        let mut models = Vec::with_capacity(documents.len());
        for document in documents {
            let model: M = bson::from_document(document)?;
            if self.predicates.iter().all(|p| p(&model)) {
                models.push(model);
            }
        }

        if let Some(compare) = &self.order {
            models.sort_by(|a, b| compare(a, b));
        }

        let limit = self.take.unwrap_or(usize::MAX);
        Ok(models.into_iter().skip(self.skip).take(limit).collect())
    }

    /// Run the query and keep the first result, if any.
    pub fn first(&self) -> Result<Option<M>> {
        Ok(self.fetch()?.into_iter().next())
    }

    /// Number of results.
    ///
    /// Without predicates, skip or take the store counts the matching
    /// documents itself and nothing is deserialized.
    pub fn count(&self) -> Result<usize> {
        if self.predicates.is_empty() && self.skip == 0 && self.take.is_none() {
            return Ok(self.collection.count(&self.filter)? as usize);
        }
        Ok(self.fetch()?.len())
    }

    /// Whether the query yields at least one result.
    pub fn exists(&self) -> Result<bool> {
        Ok(self.count()? > 0)
    }
}

/// A query with a projection applied to each result.
pub struct Projection<M, C, R> {
    query: Query<M, C>,
    selector: Box<dyn Fn(M) -> R + Send + Sync>,
}

impl<M: ReadModel, C: DocumentCollection, R> Projection<M, C, R> {
    pub fn fetch(&self) -> Result<Vec<R>> {
        Ok(self
            .query
            .fetch()?
            .into_iter()
            .map(|model| (self.selector)(model))
            .collect())
    }

    pub fn first(&self) -> Result<Option<R>> {
        Ok(self.query.first()?.map(|model| (self.selector)(model)))
    }
}
