//! Post entity for SeaORM.
//!
//! The table keeps `is_published` and `published_at` as separate columns; the
//! conversions below fold them into a single `PublishState`.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use folio_core::domain::PublishState;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub excerpt: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub featured_image: Option<String>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub read_time: i32,
    pub is_published: bool,
    pub published_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::author::Entity",
        from = "Column::AuthorId",
        to = "super::author::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for folio_core::domain::Post {
    fn from(model: Model) -> Self {
        let created_at = model.created_at.into();
        // Rows written outside this service may be published without a date.
        let state = match (model.is_published, model.published_at) {
            (true, Some(at)) => PublishState::Published { at: at.into() },
            (true, None) => PublishState::Published { at: created_at },
            (false, _) => PublishState::Draft,
        };

        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            excerpt: model.excerpt,
            body: model.content,
            featured_image_url: model.featured_image,
            author_id: model.author_id,
            category_id: model.category_id,
            tags: model.tags.into_iter().collect(),
            read_time_minutes: u32::try_from(model.read_time).unwrap_or(1).max(1),
            state,
            created_at,
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<folio_core::domain::Post> for ActiveModel {
    fn from(post: folio_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            slug: Set(post.slug),
            excerpt: Set(post.excerpt),
            content: Set(post.body),
            featured_image: Set(post.featured_image_url),
            author_id: Set(post.author_id),
            category_id: Set(post.category_id),
            tags: Set(post.tags.into_iter().collect()),
            read_time: Set(i32::try_from(post.read_time_minutes).unwrap_or(i32::MAX)),
            is_published: Set(post.state.is_published()),
            published_at: Set(post.state.published_at().map(Into::into)),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
