use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::feed::documents::{posts_collection, Post, FIELD_CREATED_AT};
use crate::feed::live_query::LiveQuery;
use crate::feed::post::PostViewModel;
use crate::session::ViewerSession;
use crate::store::{DocumentStore, OrderDirection, Query, StoreResult};

/// Projection of one post for the rendering surface.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeedItem {
    pub id: String,
    pub author_name: String,
    pub author_image_url: Option<String>,
    pub image_url: Option<String>,
    pub caption: String,
}

impl FeedItem {
    fn from_post(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            author_name: post.author_name.clone(),
            author_image_url: post.author_image_url.clone(),
            image_url: post.image_url.clone(),
            caption: post.caption.clone(),
        }
    }
}

#[derive(Default)]
struct FeedState {
    items: Vec<FeedItem>,
    posts: BTreeMap<String, Arc<PostViewModel>>,
}

/// The whole-feed view model: one subscription over the posts collection,
/// newest first, projected into ordered [`FeedItem`]s with one retained
/// [`PostViewModel`] per post id.
///
/// View models are created when an id first appears, kept (same instance)
/// while it stays in the result set, and detached when it disappears, so a
/// post scrolling out of existence releases its subscriptions.
pub struct FeedViewModel {
    state: Arc<Mutex<FeedState>>,
    query: Mutex<LiveQuery<Post>>,
}

impl FeedViewModel {
    pub fn attach(
        store: Arc<dyn DocumentStore>,
        viewer: Option<ViewerSession>,
    ) -> StoreResult<Self> {
        let state = Arc::new(Mutex::new(FeedState::default()));

        let callback_state = Arc::clone(&state);
        let callback_store = Arc::clone(&store);
        let query = Query::collection(posts_collection())
            .order_by(FIELD_CREATED_AT, OrderDirection::Descending);
        let live = LiveQuery::open(store.as_ref(), query, move |posts: Vec<Post>| {
            let discarded = {
                let mut state = callback_state.lock().unwrap();
                state.items = posts.iter().map(FeedItem::from_post).collect();

                let mut retained = BTreeMap::new();
                for post in &posts {
                    if let Some(existing) = state.posts.remove(&post.id) {
                        retained.insert(post.id.clone(), existing);
                        continue;
                    }
                    match PostViewModel::attach(
                        Arc::clone(&callback_store),
                        &post.id,
                        viewer.clone(),
                    ) {
                        Ok(view_model) => {
                            retained.insert(post.id.clone(), view_model);
                        }
                        Err(err) => {
                            log::warn!("could not attach a view model for post {}: {err}", post.id)
                        }
                    }
                }
                std::mem::replace(&mut state.posts, retained)
            };
            // Whatever was not retained has left the feed.
            for (_, view_model) in discarded {
                view_model.detach();
            }
        })?;

        Ok(Self {
            state,
            query: Mutex::new(live),
        })
    }

    /// The latest feed projection, in server order (newest first).
    pub fn items(&self) -> Vec<FeedItem> {
        self.state.lock().unwrap().items.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().items.is_empty()
    }

    /// The retained view model for `post_id`, if the post is in the feed.
    pub fn post(&self, post_id: &str) -> Option<Arc<PostViewModel>> {
        self.state.lock().unwrap().posts.get(post_id).cloned()
    }

    /// Closes the feed subscription and every retained post view model.
    pub fn detach(&self) {
        self.query.lock().unwrap().close();
        let posts = {
            let mut state = self.state.lock().unwrap();
            std::mem::take(&mut state.posts)
        };
        for (_, view_model) in posts {
            view_model.detach();
        }
    }
}
