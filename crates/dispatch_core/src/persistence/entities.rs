//! `sea-orm` entity models for the schema of spec.md §6, grounded on
//! `stateset-api::entities::order`'s `DeriveEntityModel` shape. Schema
//! migrations are explicitly out of scope (spec.md §1) — these entities
//! describe the tables `SeaOrmStore` reads and writes, not how they get
//! created.

use sea_orm::entity::prelude::*;

pub mod order {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "orders")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub creator_id: i64,
        pub customer_name: String,
        pub customer_phone: String,
        pub delivery_address: Json,
        pub lat: f64,
        pub lon: f64,
        pub desired_delivery_time: DateTimeUtc,
        pub items: Json,
        pub status: String,
        pub created_at: DateTimeUtc,
        pub estimated_prep_time: Option<i64>,
        pub priority: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod driver {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "drivers")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        #[sea_orm(unique)]
        pub user_id: i64,
        pub full_name: String,
        pub is_active: bool,
        pub status: String,
        pub lat: Option<f64>,
        pub lon: Option<f64>,
        pub current_route: Option<Json>,
        pub estimated_finish_time: Option<DateTimeUtc>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod order_cluster {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "order_clusters")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub time_window: DateTimeUtc,
        pub total_items: i64,
        pub earliest_delivery_time: DateTimeUtc,
        pub cluster_route: Option<Json>,
        pub cluster_status: String,
        pub relaxed_constraints: Option<Json>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod order_cluster_association {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "order_cluster_association")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub cluster_id: String,
        #[sea_orm(primary_key)]
        pub order_id: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
