/// Per-screen entity collections.
///
/// An `EntityList` is the last collection fetched for one resource. It lives
/// only as long as the screen that owns it.

use crate::gateway::{Gateway, Resource};
use crate::models::Id;
use tracing::warn;

pub struct EntityList<R: Resource> {
    items: Vec<R>,
    loading: bool,
    error: Option<String>,
    fallback: &'static str,
}

impl<R: Resource> EntityList<R> {
    /// `fallback` is shown when a reload fails without backend detail.
    pub fn new(fallback: &'static str) -> Self {
        EntityList {
            items: Vec::new(),
            loading: false,
            error: None,
            fallback,
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn find(&self, id: Id) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub(crate) fn find_mut(&mut self, id: Id) -> Option<&mut R> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// First element in the order the backend returned.
    pub fn first_id(&self) -> Option<Id> {
        self.items.first().map(Resource::id)
    }

    /// Refetch the whole collection.
    ///
    /// On failure the previous items stay visible and the error is recorded.
    pub async fn reload(&mut self, gateway: &Gateway) -> bool {
        self.loading = true;
        let outcome = gateway.list::<R>().await;
        self.loading = false;
        match outcome {
            Ok(items) => {
                self.items = items;
                self.error = None;
                true
            }
            Err(err) => {
                warn!(resource = R::NAME, "reload failed: {}", err);
                self.error = Some(err.user_message(self.fallback));
                false
            }
        }
    }
}
