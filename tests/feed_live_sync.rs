use std::sync::Arc;

use bytes::Bytes;

use feedsync::blob::MemoryBlobStore;
use feedsync::feed::{FeedViewModel, UploadViewModel};
use feedsync::session::ViewerSession;
use feedsync::store::{DocumentStore, MemoryDocumentStore};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n not really a picture";

fn ada() -> ViewerSession {
    ViewerSession::new("uid-ada", "Ada").with_image_url("https://example.test/ada.png")
}

fn grace() -> ViewerSession {
    ViewerSession::new("uid-grace", "Grace")
}

struct Client {
    feed: FeedViewModel,
    upload: UploadViewModel,
}

fn client(
    store: &Arc<MemoryDocumentStore>,
    blobs: &Arc<MemoryBlobStore>,
    viewer: ViewerSession,
) -> Client {
    let feed = FeedViewModel::attach(store.clone(), Some(viewer.clone())).expect("attach feed");
    let upload = UploadViewModel::new(store.clone(), blobs.clone(), Some(viewer));
    Client { feed, upload }
}

#[tokio::test(flavor = "multi_thread")]
async fn two_clients_converge_on_the_same_feed() {
    let store = Arc::new(MemoryDocumentStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let ada_client = client(&store, &blobs, ada());
    let grace_client = client(&store, &blobs, grace());

    // Ada publishes a post with an image.
    ada_client
        .upload
        .stage_image(Bytes::from_static(PNG_BYTES))
        .expect("stage");
    let post_id = ada_client
        .upload
        .submit("first light")
        .await
        .expect("submit")
        .expect("accepted");

    // Both feeds observe the same projection.
    for feed in [&ada_client.feed, &grace_client.feed] {
        let items = feed.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, post_id);
        assert_eq!(items[0].caption, "first light");
        assert_eq!(items[0].author_name, "Ada");
        assert!(items[0].image_url.is_some());
    }

    // Grace likes the post; both clients see the like, but only Grace
    // has_liked.
    let grace_post = grace_client.feed.post(&post_id).expect("grace's view");
    grace_post.toggle_like().await.expect("like");
    let ada_post = ada_client.feed.post(&post_id).expect("ada's view");
    assert_eq!(ada_post.like_count(), 1);
    assert!(!ada_post.has_liked());
    assert!(grace_post.has_liked());

    // Toggling again removes the entry everywhere.
    grace_post.toggle_like().await.expect("unlike");
    assert_eq!(ada_post.like_count(), 0);
    assert!(!grace_post.has_liked());

    // Comments appear newest first on every client.
    grace_post.set_draft_comment("beautiful");
    grace_post.submit_comment().await.expect("comment");
    ada_post.set_draft_comment("thanks!");
    ada_post.submit_comment().await.expect("comment");

    let texts: Vec<String> = grace_post
        .comments()
        .iter()
        .map(|comment| comment.text.clone())
        .collect();
    assert_eq!(texts, vec!["thanks!".to_string(), "beautiful".to_string()]);
    assert_eq!(
        grace_post.comments()[0].author_name,
        "Ada".to_string()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn newer_posts_enter_at_the_top_and_removal_releases_state() {
    let store = Arc::new(MemoryDocumentStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let ada_client = client(&store, &blobs, ada());

    for caption in ["one", "two", "three"] {
        ada_client
            .upload
            .stage_image(Bytes::from_static(PNG_BYTES))
            .expect("stage");
        ada_client
            .upload
            .submit(caption)
            .await
            .expect("submit")
            .expect("accepted");
    }

    let items = ada_client.feed.items();
    let captions: Vec<&str> = items.iter().map(|item| item.caption.as_str()).collect();
    assert_eq!(captions, vec!["three", "two", "one"]);

    // Deleting the newest post drops it from the feed and discards its
    // view model; the survivors keep their identity.
    let doomed = items[0].id.clone();
    let survivor = items[1].id.clone();
    let survivor_vm = ada_client.feed.post(&survivor).expect("retained");

    store
        .delete(&feedsync::feed::documents::post_document(&doomed).unwrap())
        .await
        .expect("delete post");

    assert_eq!(ada_client.feed.len(), 2);
    assert!(ada_client.feed.post(&doomed).is_none());
    let same = ada_client.feed.post(&survivor).expect("still retained");
    assert!(Arc::ptr_eq(&survivor_vm, &same));
}

#[tokio::test(flavor = "multi_thread")]
async fn detached_feed_stops_observing() {
    let store = Arc::new(MemoryDocumentStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let ada_client = client(&store, &blobs, ada());

    ada_client.feed.detach();

    ada_client
        .upload
        .stage_image(Bytes::from_static(PNG_BYTES))
        .expect("stage");
    ada_client
        .upload
        .submit("unseen")
        .await
        .expect("submit")
        .expect("accepted");

    assert!(ada_client.feed.is_empty());
}
