mod common;

use common::{new_story, FakeServer};
use hack_or_snooze::api::StoryPayload;
use hack_or_snooze::{ApiErrorKind, AppState, ClientError, Session, StoryId, StoryList};

fn logged_in(server: &FakeServer, username: &str) -> AppState {
    let mut state = AppState::default();
    state.session.login(server, username, "hunter2").unwrap();
    state.reload_stories(server).unwrap();
    state
}

fn ids(stories: &[hack_or_snooze::Story]) -> Vec<StoryId> {
    stories.iter().map(|story| story.id.clone()).collect()
}

#[test_log::test]
fn load_preserves_server_order() {
    let server = FakeServer::new();
    server.seed_story("First", "https://first.example", "ada");
    server.seed_story("Second", "https://second.example", "ada");
    server.seed_story("Third", "https://www.third.example/x", "bob");

    let list = StoryList::load(&server).unwrap();

    assert_eq!(ids(list.stories()), server.story_ids());
    assert_eq!(list.stories()[0].title, "Third");
    assert_eq!(list.stories()[0].host_name.as_deref(), Some("third.example"));
}

#[test]
fn load_drops_duplicate_ids() {
    let server = FakeServer::new();
    let id = server.seed_story("Original", "https://a.example", "ada");
    server.push_raw(StoryPayload {
        story_id: id.clone(),
        title: "Copy".into(),
        author: "Someone".into(),
        url: "https://b.example".into(),
        username: "bob".into(),
        created_at: "2024-06-01T00:00:00Z".parse().unwrap(),
    });

    let list = StoryList::load(&server).unwrap();

    assert_eq!(list.len(), 1);
    assert_eq!(list.get(&id).unwrap().title, "Original");
}

#[test]
fn load_surfaces_network_errors() {
    let server = FakeServer::new();
    server.set_offline(true);

    let err = StoryList::load(&server).unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}

#[test_log::test]
fn add_then_delete_restores_both_collections() {
    let server = FakeServer::new().with_account("ada", "hunter2", "Ada");
    server.seed_story("Existing", "https://existing.example", "bob");
    let mut state = logged_in(&server, "ada");

    let stories_before = state.stories.clone();
    let own_before = state.session.user().unwrap().own_stories().to_vec();

    let story = state
        .submit_story(&server, &new_story("Fresh", "https://fresh.example/post"))
        .unwrap();

    // Appended locally, not re-fetched
    assert_eq!(state.stories.stories().last().unwrap().id, story.id);
    assert_eq!(state.stories.len(), stories_before.len() + 1);
    assert!(state.session.user().unwrap().owns(&story.id));
    assert_eq!(story.host_name.as_deref(), Some("fresh.example"));

    state.delete_story(&server, &story.id).unwrap();

    assert_eq!(state.stories, stories_before);
    assert_eq!(state.session.user().unwrap().own_stories(), own_before.as_slice());
}

#[test]
fn rejected_add_changes_nothing() {
    let server = FakeServer::new().with_account("ada", "hunter2", "Ada");
    let mut state = logged_in(&server, "ada");
    let before = state.clone();

    server.revoke_tokens();
    let err = state
        .submit_story(&server, &new_story("Fresh", "https://fresh.example"))
        .unwrap_err();

    assert_eq!(err.api_kind(), Some(ApiErrorKind::Unauthorized));
    assert_eq!(state, before);
}

#[test]
fn delete_of_story_missing_from_own_cache_still_updates_global_list() {
    let server = FakeServer::new().with_account("ada", "hunter2", "Ada");
    let mut state = logged_in(&server, "ada");

    // Submitted by ada from somewhere else after this client logged in
    let id = server.seed_story("Elsewhere", "https://elsewhere.example", "ada");
    state.reload_stories(&server).unwrap();
    assert!(state.stories.contains(&id));
    assert!(!state.session.user().unwrap().owns(&id));

    state.delete_story(&server, &id).unwrap();

    assert!(!state.stories.contains(&id));
    assert!(!server.story_ids().contains(&id));
}

#[test]
fn delete_rejected_with_not_found_leaves_collections_alone() {
    let server = FakeServer::new().with_account("ada", "hunter2", "Ada");
    let mut state = logged_in(&server, "ada");
    state
        .submit_story(&server, &new_story("Mine", "https://mine.example"))
        .unwrap();
    let before = state.clone();

    let err = state
        .delete_story(&server, &StoryId::from("no-such-story"))
        .unwrap_err();

    match err {
        ClientError::Api { status, kind, .. } => {
            assert_eq!(status, 404);
            assert_eq!(kind, ApiErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(state, before);
}

#[test]
fn deleting_someone_elses_story_is_unauthorized() {
    let server = FakeServer::new().with_account("ada", "hunter2", "Ada");
    let id = server.seed_story("Bob's", "https://bob.example", "bob");
    let mut state = logged_in(&server, "ada");

    let err = state.delete_story(&server, &id).unwrap_err();

    assert_eq!(err.api_kind(), Some(ApiErrorKind::Unauthorized));
    assert!(state.stories.contains(&id));
}

#[test]
fn anonymous_cannot_submit_or_delete() {
    let server = FakeServer::new();
    let mut state = AppState::default();
    assert_eq!(state.session, Session::Anonymous);

    let err = state
        .submit_story(&server, &new_story("Nope", "https://nope.example"))
        .unwrap_err();
    assert!(matches!(err, ClientError::NotLoggedIn));

    let err = state.delete_story(&server, &StoryId::from("x")).unwrap_err();
    assert!(matches!(err, ClientError::NotLoggedIn));

    // Never reached the server
    assert!(server.calls().is_empty());
}
