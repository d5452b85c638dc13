//! Status database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Status;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "statuses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Status {
    fn from(model: Model) -> Self {
        Status {
            id: model.id,
            name: model.name,
        }
    }
}
