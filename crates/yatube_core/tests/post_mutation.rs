use rusqlite::Connection;
use yatube_core::db::open_db_in_memory;
use yatube_core::{
    Actor, Destination, Group, GroupFilter, GroupRepository, Post, PostDraft, PostFilter,
    PostInputError, PostOutcome, PostRepository, PostService, PostServiceError, Session,
    SqliteGroupRepository, SqlitePostRepository, SqliteUserRepository, User, UserRepository,
};
use uuid::Uuid;

/// Two authors, two groups, one post per author.
struct Fixture {
    conn: Connection,
    author: Actor,
    author_3: Actor,
    group_1: Group,
    group_2: Group,
    post: Post,
}

impl Fixture {
    fn new() -> Self {
        let conn = open_db_in_memory().unwrap();
        let author = User::new("author");
        let author_3 = User::new("author_3");
        let group_1 = Group::new("group_test_1", "Первая тестовая группа");
        let group_2 = Group::new("group_test_2", "Вторая тестовая группа");
        {
            let users = SqliteUserRepository::try_new(&conn).unwrap();
            users.create_user(&author).unwrap();
            users.create_user(&author_3).unwrap();
            let groups = SqliteGroupRepository::try_new(&conn).unwrap();
            groups.create_group(&group_1).unwrap();
            groups.create_group(&group_2).unwrap();
        }

        let author = Actor::authenticated(author);
        let author_3 = Actor::authenticated(author_3);
        let post = Post::new(&author, "Тестовый пост", Some(group_1.id));
        {
            let posts = SqlitePostRepository::try_new(&conn).unwrap();
            posts.create_post(&post).unwrap();
            posts
                .create_post(&Post::new(&author_3, "Тестовый пост", Some(group_2.id)))
                .unwrap();
        }

        Self {
            conn,
            author,
            author_3,
            group_1,
            group_2,
            post,
        }
    }

    fn service(&self) -> PostService<SqlitePostRepository<'_>> {
        PostService::new(SqlitePostRepository::try_new(&self.conn).unwrap())
    }

    fn raw_post_row(&self, post: &Post) -> (String, String, Option<String>, i64) {
        self.conn
            .query_row(
                "SELECT text, author_uuid, group_uuid, pub_date FROM posts WHERE uuid = ?1;",
                [post.id().to_string()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap()
    }
}

#[test]
fn create_post_stores_record_and_routes_to_profile() {
    let fx = Fixture::new();
    let service = fx.service();
    let before = service.count_posts().unwrap();

    let outcome = service
        .create_post(
            &fx.author,
            &PostDraft::new("Еще один пост", Some(fx.group_1.id)),
        )
        .unwrap();

    assert!(matches!(outcome, PostOutcome::Created(_)));
    assert_eq!(
        outcome.destination(),
        Destination::Profile {
            username: "author".to_string()
        }
    );
    assert_eq!(service.count_posts().unwrap(), before + 1);
    assert!(service
        .post_exists(&PostFilter {
            text: Some("Еще один пост".to_string()),
            author: Some(fx.author.id()),
            group: GroupFilter::Exactly(fx.group_1.id),
        })
        .unwrap());

    let created = outcome.post();
    assert!(created.is_authored_by(&fx.author));
    assert_eq!(created.group(), Some(fx.group_1.id));
    assert_eq!(service.get_post(created.id()).unwrap().as_ref(), Some(created));
}

#[test]
fn create_post_without_group() {
    let fx = Fixture::new();
    let service = fx.service();

    let outcome = service
        .create_post(&fx.author_3, &PostDraft::new("hello", None))
        .unwrap();

    assert_eq!(outcome.post().group(), None);
    assert_eq!(
        outcome.destination(),
        Destination::Profile {
            username: "author_3".to_string()
        }
    );
}

#[test]
fn create_post_strips_surrounding_whitespace() {
    let fx = Fixture::new();
    let service = fx.service();

    let outcome = service
        .create_post(&fx.author, &PostDraft::new("  hello \n", None))
        .unwrap();

    assert_eq!(outcome.post().text(), "hello");
}

#[test]
fn create_post_rejects_blank_text_without_writing() {
    let fx = Fixture::new();
    let service = fx.service();
    let before = service.count_posts().unwrap();

    let err = service
        .create_post(&fx.author, &PostDraft::new("   ", Some(fx.group_1.id)))
        .unwrap_err();

    assert!(matches!(
        err,
        PostServiceError::InvalidInput(PostInputError::EmptyText)
    ));
    assert_eq!(service.count_posts().unwrap(), before);
}

#[test]
fn create_post_rejects_unknown_group_without_writing() {
    let fx = Fixture::new();
    let service = fx.service();
    let before = service.count_posts().unwrap();
    let unknown = Uuid::new_v4();

    let err = service
        .create_post(&fx.author, &PostDraft::new("text", Some(unknown)))
        .unwrap_err();

    assert!(matches!(
        err,
        PostServiceError::InvalidInput(PostInputError::GroupNotFound(id)) if id == unknown
    ));
    assert_eq!(service.count_posts().unwrap(), before);
}

#[test]
fn anonymous_session_cannot_reach_create() {
    let fx = Fixture::new();
    let service = fx.service();
    let before = service.count_posts().unwrap();

    let session = Session::Anonymous;
    if let Some(actor) = session.actor() {
        service
            .create_post(actor, &PostDraft::new("anonymous post", None))
            .unwrap();
    }

    assert!(!session.is_authenticated());
    assert_eq!(service.count_posts().unwrap(), before);
}

#[test]
fn logged_in_session_creates_through_its_actor() {
    let fx = Fixture::new();
    let service = fx.service();
    let session = Session::Authenticated(fx.author.clone());

    let actor = session.actor().expect("authenticated session");
    let outcome = service
        .create_post(actor, &PostDraft::new("from session", None))
        .unwrap();

    assert!(outcome.post().is_authored_by(&fx.author));
}

#[test]
fn author_edit_applies_and_routes_to_post_detail() {
    let fx = Fixture::new();
    let service = fx.service();
    let before = service.count_posts().unwrap();

    let outcome = service
        .edit_post(
            &fx.author,
            fx.post.id(),
            &PostDraft::new("Измененный текст поста", Some(fx.group_2.id)),
        )
        .unwrap();

    assert!(matches!(outcome, PostOutcome::Updated(_)));
    assert_eq!(
        outcome.destination(),
        Destination::PostDetail {
            post_id: fx.post.id()
        }
    );
    assert_eq!(service.count_posts().unwrap(), before);

    let stored = service.get_post(fx.post.id()).unwrap().unwrap();
    assert_eq!(stored.text(), "Измененный текст поста");
    assert_eq!(stored.group(), Some(fx.group_2.id));
    assert_eq!(stored.author(), fx.post.author());
    assert_eq!(stored.pub_date(), fx.post.pub_date());
    assert_eq!(&stored, outcome.post());
}

#[test]
fn author_edit_can_clear_group() {
    let fx = Fixture::new();
    let service = fx.service();

    service
        .edit_post(&fx.author, fx.post.id(), &PostDraft::new("no group", None))
        .unwrap();

    let stored = service.get_post(fx.post.id()).unwrap().unwrap();
    assert_eq!(stored.group(), None);
}

#[test]
fn non_author_edit_is_a_no_op_with_same_destination() {
    let fx = Fixture::new();
    let service = fx.service();
    let before_count = service.count_posts().unwrap();
    let before_row = fx.raw_post_row(&fx.post);

    let outcome = service
        .edit_post(
            &fx.author_3,
            fx.post.id(),
            &PostDraft::new("Измененный текст поста", Some(fx.group_2.id)),
        )
        .unwrap();

    assert_eq!(outcome, PostOutcome::Unauthorized(fx.post.clone()));
    assert!(!outcome.is_applied());
    assert_eq!(
        outcome.destination(),
        Destination::PostDetail {
            post_id: fx.post.id()
        }
    );
    assert_eq!(service.count_posts().unwrap(), before_count);
    assert_eq!(fx.raw_post_row(&fx.post), before_row);

    let stored = service.get_post(fx.post.id()).unwrap().unwrap();
    assert_eq!(stored.text(), "Тестовый пост");
    assert_eq!(stored.group(), Some(fx.group_1.id));
}

#[test]
fn non_author_edit_is_unauthorized_even_with_invalid_input() {
    let fx = Fixture::new();
    let service = fx.service();
    let before_row = fx.raw_post_row(&fx.post);

    let outcome = service
        .edit_post(
            &fx.author_3,
            fx.post.id(),
            &PostDraft::new("", Some(Uuid::new_v4())),
        )
        .unwrap();

    assert!(matches!(outcome, PostOutcome::Unauthorized(_)));
    assert_eq!(fx.raw_post_row(&fx.post), before_row);
}

#[test]
fn both_edit_outcomes_route_to_same_destination() {
    let fx = Fixture::new();
    let service = fx.service();
    let draft = PostDraft::new("Измененный текст поста", Some(fx.group_2.id));

    let denied = service
        .edit_post(&fx.author_3, fx.post.id(), &draft)
        .unwrap();
    let applied = service.edit_post(&fx.author, fx.post.id(), &draft).unwrap();

    assert_eq!(denied.destination(), applied.destination());
    assert_ne!(denied.post(), applied.post());
}

#[test]
fn author_edit_with_current_values_changes_nothing() {
    let fx = Fixture::new();
    let service = fx.service();
    let before_row = fx.raw_post_row(&fx.post);

    let outcome = service
        .edit_post(
            &fx.author,
            fx.post.id(),
            &PostDraft::new(fx.post.text(), fx.post.group()),
        )
        .unwrap();

    assert!(matches!(outcome, PostOutcome::Updated(_)));
    assert_eq!(outcome.post(), &fx.post);
    assert_eq!(fx.raw_post_row(&fx.post), before_row);
}

#[test]
fn edit_of_missing_post_is_not_found() {
    let fx = Fixture::new();
    let service = fx.service();
    let missing = Uuid::new_v4();

    let err = service
        .edit_post(&fx.author, missing, &PostDraft::new("text", None))
        .unwrap_err();

    assert!(matches!(err, PostServiceError::NotFound(id) if id == missing));
}

#[test]
fn author_edit_with_invalid_input_leaves_post_unchanged() {
    let fx = Fixture::new();
    let service = fx.service();
    let before_row = fx.raw_post_row(&fx.post);

    let blank = service
        .edit_post(&fx.author, fx.post.id(), &PostDraft::new("\n", None))
        .unwrap_err();
    assert!(matches!(
        blank,
        PostServiceError::InvalidInput(PostInputError::EmptyText)
    ));

    let unknown_group = service
        .edit_post(
            &fx.author,
            fx.post.id(),
            &PostDraft::new("text", Some(Uuid::new_v4())),
        )
        .unwrap_err();
    assert!(matches!(
        unknown_group,
        PostServiceError::InvalidInput(PostInputError::GroupNotFound(_))
    ));

    assert_eq!(fx.raw_post_row(&fx.post), before_row);
}

#[test]
fn repeated_author_edits_keep_identity() {
    let fx = Fixture::new();
    let service = fx.service();

    for round in 0..3 {
        let outcome = service
            .edit_post(
                &fx.author,
                fx.post.id(),
                &PostDraft::new(format!("edit {round}"), Some(fx.group_2.id)),
            )
            .unwrap();
        assert_eq!(outcome.post().id(), fx.post.id());
        assert!(outcome.post().is_authored_by(&fx.author));
    }

    let stored = service.get_post(fx.post.id()).unwrap().unwrap();
    assert_eq!(stored.text(), "edit 2");
}

#[test]
fn outcome_serializes_with_tag_and_post() {
    let fx = Fixture::new();
    let service = fx.service();

    let outcome = service
        .edit_post(&fx.author_3, fx.post.id(), &PostDraft::new("x", None))
        .unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["outcome"], "unauthorized");
    assert_eq!(json["post"]["text"], "Тестовый пост");
    assert_eq!(json["post"]["author"]["username"], "author");

    let destination = serde_json::to_value(outcome.destination()).unwrap();
    assert_eq!(destination["kind"], "post_detail");
    assert_eq!(destination["post_id"], fx.post.id().to_string());
}
