//! Lesson database entity.

use sea_orm::entity::prelude::*;

use crate::domain::Lesson;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lessons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub course_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub video_url: String,
    pub video_id: String,
    #[sea_orm(column_type = "Text")]
    pub script: String,
    pub duration: i32,
    pub sequence: i32,
    pub is_published: bool,
    pub is_free: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id",
        on_delete = "Cascade"
    )]
    Course,
    #[sea_orm(has_many = "super::user_lesson::Entity")]
    Progress,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::user_lesson::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Progress.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Lesson {
    fn from(model: Model) -> Self {
        Lesson {
            id: model.id,
            course_id: model.course_id,
            title: model.title,
            description: model.description,
            video_url: model.video_url,
            video_id: model.video_id,
            script: model.script,
            duration: model.duration,
            sequence: model.sequence,
            is_published: model.is_published,
            is_free: model.is_free,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
