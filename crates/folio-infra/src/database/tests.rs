use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use folio_core::domain::{Post, PublishState, Role};
use folio_core::error::RepoError;
use folio_core::ports::{BaseRepository, CategoryRepository, PostRepository, RoleRepository};

use super::entity::{category, post, user_role};
use super::postgres_repo::{
    PostgresCategoryRepository, PostgresPostRepository, PostgresRoleRepository,
};

fn post_row(is_published: bool, published_at: Option<chrono::DateTime<Utc>>) -> post::Model {
    let now = Utc::now();
    post::Model {
        id: Uuid::new_v4(),
        title: "The Future of Data Analytics".to_owned(),
        slug: "future-of-data-analytics".to_owned(),
        excerpt: None,
        content: "<p>Body</p>".to_owned(),
        featured_image: None,
        author_id: None,
        category_id: None,
        tags: vec!["Analytics".to_owned(), "Trends".to_owned()],
        read_time: 6,
        is_published,
        published_at: published_at.map(Into::into),
        created_at: (now - Duration::days(3)).into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let published_at = Utc::now() - Duration::days(1);
    let row = post_row(true, Some(published_at));
    let post_id = row.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![row]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.id, post_id);
    assert_eq!(post.title, "The Future of Data Analytics");
    assert_eq!(post.read_time_minutes, 6);
    assert_eq!(post.tags.len(), 2);
    assert_eq!(
        post.published_at().map(|at| at.timestamp()),
        Some(published_at.timestamp())
    );
}

#[tokio::test]
async fn test_published_row_without_date_uses_created_at() {
    let row = post_row(true, None);
    let created_at = row.created_at;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![row]])
        .into_connection();

    let post = PostgresPostRepository::new(db)
        .find_published_by_slug("future-of-data-analytics")
        .await
        .unwrap()
        .unwrap();

    match post.state {
        PublishState::Published { at } => assert_eq!(at, created_at),
        PublishState::Draft => panic!("expected a published post"),
    }
}

#[tokio::test]
async fn test_draft_row_ignores_stray_date() {
    let row = post_row(false, Some(Utc::now()));

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![row]])
        .into_connection();

    let posts = PostgresPostRepository::new(db)
        .list_newest_first()
        .await
        .unwrap();

    assert_eq!(posts[0].state, PublishState::Draft);
    assert_eq!(posts[0].published_at(), None);
}

#[tokio::test]
async fn test_unique_violation_maps_to_duplicate() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors(vec![DbErr::Custom(
            "duplicate key value violates unique constraint \"categories_slug_key\"".to_owned(),
        )])
        .into_connection();

    let category = folio_core::domain::Category::new(folio_core::domain::CategoryInput {
        name: "Data Culture".to_owned(),
        slug: None,
        description: None,
    })
    .unwrap();

    let err = PostgresCategoryRepository::new(db)
        .insert(category)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));
}

#[tokio::test]
async fn test_delete_missing_row_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let err = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
async fn test_count_posts() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![BTreeMap::from([(
            "num_items",
            Into::<Value>::into(4i64),
        )])]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let count = BaseRepository::<Post, Uuid>::count(&repo).await.unwrap();
    assert_eq!(count, 4);
}

#[tokio::test]
async fn test_find_category_by_slug() {
    let id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![category::Model {
            id,
            name: "Artificial Intelligence".to_owned(),
            slug: "ai".to_owned(),
            description: None,
            created_at: Utc::now().into(),
        }]])
        .into_connection();

    let found = PostgresCategoryRepository::new(db)
        .find_by_slug("ai")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, id);
    assert_eq!(found.name, "Artificial Intelligence");
}

#[tokio::test]
async fn test_roles_for_user_skips_unknown_roles() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            user_role::Model {
                user_id,
                role: "editor".to_owned(),
            },
            user_role::Model {
                user_id,
                role: "moderator".to_owned(),
            },
        ]])
        .into_connection();

    let roles = PostgresRoleRepository::new(db)
        .roles_for_user(user_id)
        .await
        .unwrap();
    assert_eq!(roles, vec![Role::Editor]);
}
