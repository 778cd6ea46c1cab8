use blogger_core::domain::{PageRequest, Post};
use blogger_core::error::RepoError;
use blogger_core::ports::{BaseRepository, CommentRepository, PostRepository};
use chrono::{SubsecRound, Utc};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, QueryTrait};
use uuid::Uuid;

use super::entity::{comment, post};
use super::postgres_base::map_db_err;
use super::postgres_repo::{PostgresCommentRepository, PostgresPostRepository, comments_of};

fn post_model(title: &str, slug: &str) -> post::Model {
    let now = Utc::now().trunc_subsecs(6);
    post::Model {
        id: Uuid::new_v4(),
        author_id: Uuid::new_v4(),
        title: title.to_owned(),
        title_slug: slug.to_owned(),
        content: "Content".to_owned(),
        created: now.into(),
        modified: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let model = post_model("Test Post", "test-post");
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.expect("post should be found");
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
}

#[tokio::test]
async fn test_find_post_by_slug_maps_all_fields() {
    let model = post_model("My Title", "my-title");
    let expected = model.clone();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let post = repo.find_by_slug("my-title").await.unwrap().unwrap();

    assert_eq!(post.title_slug, "my-title");
    assert_eq!(post.author_id, expected.author_id);
    assert_eq!(post.created, post.modified);
}

#[tokio::test]
async fn test_find_post_by_unknown_slug() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    assert!(repo.find_by_slug("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_insert_post_returns_stored_row() {
    let model = post_model("Fresh", "fresh");
    let domain: Post = model.clone().into();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let saved = repo.insert(domain.clone()).await.unwrap();

    assert_eq!(saved, domain);
}

#[tokio::test]
async fn test_find_page_keeps_database_order() {
    let newer = post_model("Newer", "newer");
    let older = post_model("Older", "older");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![newer, older]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let posts = repo.find_page(None, PageRequest::new(1, 10)).await.unwrap();

    let slugs: Vec<_> = posts.iter().map(|p| p.title_slug.as_str()).collect();
    assert_eq!(slugs, vec!["newer", "older"]);
}

#[tokio::test]
async fn test_delete_with_comments_commits() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    assert!(repo.delete_with_comments(Uuid::new_v4()).await.is_ok());
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let result = repo.delete_with_comments(Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_comments_by_post() {
    let post_id = Uuid::new_v4();
    let now = Utc::now().trunc_subsecs(6);
    let model = comment::Model {
        id: Uuid::new_v4(),
        post_id,
        author_id: Uuid::new_v4(),
        comment_text: "nice!".to_owned(),
        created: now.into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();
    let repo = PostgresCommentRepository::new(db);

    let comments = repo.find_by_post(post_id).await.unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment_text, "nice!");
}

#[test]
fn test_comments_query_breaks_timestamp_ties_by_id() {
    let sql = comments_of(Uuid::new_v4())
        .build(DatabaseBackend::Postgres)
        .to_string();

    assert!(
        sql.contains(r#"ORDER BY "comments"."created" ASC, "comments"."id" ASC"#),
        "unexpected ordering in {sql}"
    );
}

#[test]
fn test_record_not_updated_maps_to_not_found() {
    assert!(matches!(
        map_db_err(DbErr::RecordNotUpdated),
        RepoError::NotFound
    ));
}

#[test]
fn test_other_errors_map_to_query() {
    assert!(matches!(
        map_db_err(DbErr::Custom("boom".to_string())),
        RepoError::Query(_)
    ));
}
