use domains::{CommunityId, DomainError, PostId, SortOrder, VoteState};
use integration_tests::{seeded_store, viewer};
use storage_adapters::seed::{seed_community_id, seed_post_id};

fn votes(posts: &[domains::Post]) -> Vec<i64> {
    posts.iter().map(|p| p.vote_count).collect()
}

#[tokio::test]
async fn top_feed_orders_by_votes() {
    let store = seeded_store();
    let feed = store.list_posts(SortOrder::Top).await.unwrap();
    assert_eq!(votes(&feed), vec![352, 203, 128, 95, 78, 67, 42]);
}

#[tokio::test]
async fn new_feed_orders_by_creation_time() {
    let store = seeded_store();
    let feed = store.list_posts(SortOrder::New).await.unwrap();
    let ids: Vec<PostId> = feed.iter().map(|p| p.id).collect();
    let expected: Vec<PostId> = (1..=7).rev().map(seed_post_id).collect();
    assert_eq!(ids, expected);
    assert!(feed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
async fn community_feed_only_holds_its_posts() {
    let store = seeded_store();
    let programming = seed_community_id(1);
    let feed = store
        .posts_by_community(programming, SortOrder::Top)
        .await
        .unwrap();
    assert_eq!(votes(&feed), vec![78, 42]);
    assert!(feed.iter().all(|p| p.community_id == programming));

    let none = store
        .posts_by_community(CommunityId::new(), SortOrder::Top)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn lookups_report_absence_without_error() {
    let store = seeded_store();
    assert!(store.get_post(PostId::new()).await.unwrap().is_none());
    assert!(store.get_community(CommunityId::new()).await.unwrap().is_none());
    let post = store.get_post(seed_post_id(2)).await.unwrap().unwrap();
    assert_eq!(post.url.as_deref(), Some("https://tech-news-example.com/ai-coding"));
}

#[tokio::test]
async fn new_posts_carry_the_authors_upvote() {
    let store = seeded_store();
    let user = viewer();
    let post = store
        .create_post(
            "Show off your setup".into(),
            Some("Desk pics welcome".into()),
            None,
            seed_community_id(4),
            Some(&user),
        )
        .await
        .unwrap();

    assert_eq!(post.vote_count, 1);
    assert_eq!(post.viewer_vote, VoteState::Up);
    assert_eq!(post.comment_count, 0);
    assert_eq!(post.author_id, user.id);
    assert_eq!(store.get_post(post.id).await.unwrap(), Some(post.clone()));

    // Newest post leads the "new" feed.
    let feed = store.list_posts(SortOrder::New).await.unwrap();
    assert_eq!(feed[0].id, post.id);

    let mine = store.posts_by_author(&user.id, SortOrder::Top).await.unwrap();
    assert_eq!(mine, vec![post]);
}

#[tokio::test]
async fn link_posts_need_an_absolute_url() {
    let store = seeded_store();
    let user = viewer();
    let err = store
        .create_post(
            "A link".into(),
            None,
            Some("www.example.com/page".into()),
            seed_community_id(2),
            Some(&user),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref e) if e.contains("url")));

    let post = store
        .create_post(
            "A link".into(),
            None,
            Some("https://www.example.com/page".into()),
            seed_community_id(2),
            Some(&user),
        )
        .await
        .unwrap();
    assert!(post.body.is_none());
}

#[tokio::test]
async fn unknown_community_is_not_found() {
    let store = seeded_store();
    let before = store.repository().snapshot().await;
    let missing = CommunityId::new();
    let err = store
        .create_post("Hello".into(), None, None, missing, Some(&viewer()))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::not_found("community", missing));
    assert_eq!(store.repository().snapshot().await, before);
}

#[tokio::test]
async fn anonymous_users_cannot_post() {
    let store = seeded_store();
    let before = store.repository().snapshot().await;
    let err = store
        .create_post("Hello".into(), None, None, seed_community_id(1), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AuthRequired { .. }));
    assert_eq!(store.repository().snapshot().await, before);
}

#[tokio::test]
async fn titles_are_bounded() {
    let store = seeded_store();
    let user = viewer();
    for title in ["", "   ", "t".repeat(301).as_str()] {
        let err = store
            .create_post(title.to_string(), None, None, seed_community_id(1), Some(&user))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.contains("title")));
    }
    store
        .create_post("t".repeat(300), None, None, seed_community_id(1), Some(&user))
        .await
        .unwrap();
}

#[tokio::test]
async fn title_limit_applies_after_trimming() {
    let store = seeded_store();
    let padded = format!(" {} ", "t".repeat(300));
    let post = store
        .create_post(padded, None, None, seed_community_id(1), Some(&viewer()))
        .await
        .unwrap();
    assert_eq!(post.title.chars().count(), 300);
}

#[tokio::test]
async fn equal_votes_list_the_newest_post_first() {
    let store = seeded_store();
    let user = viewer();
    for title in ["first", "second"] {
        store
            .create_post(title.into(), None, None, seed_community_id(1), Some(&user))
            .await
            .unwrap();
    }

    let fresh: Vec<String> = store
        .list_posts(SortOrder::Top)
        .await
        .unwrap()
        .into_iter()
        .filter(|p| p.vote_count == 1)
        .map(|p| p.title)
        .collect();
    assert_eq!(fresh, vec!["second", "first"]);

    let community: Vec<String> = store
        .posts_by_community(seed_community_id(1), SortOrder::Top)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(community[2..], ["second", "first"]);
}
