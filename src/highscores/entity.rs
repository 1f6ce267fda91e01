//! Leaderboard tables shared by every game

pub mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub username: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::scores::Entity")]
        Scores,
    }

    impl Related<super::scores::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Scores.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod games {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "games")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(unique)]
        pub game_name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::scores::Entity")]
        Scores,
    }

    impl Related<super::scores::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Scores.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod scores {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "scores")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub user_id: i32,
        pub game_id: i32,
        pub score: i64,
        /// RFC 3339 timestamp in UTC
        #[sea_orm(column_type = "Text")]
        pub created_at: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::users::Entity",
            from = "Column::UserId",
            to = "super::users::Column::Id",
            on_delete = "Cascade"
        )]
        Users,
        #[sea_orm(
            belongs_to = "super::games::Entity",
            from = "Column::GameId",
            to = "super::games::Column::Id",
            on_delete = "Cascade"
        )]
        Games,
    }

    impl Related<super::users::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Users.def()
        }
    }

    impl Related<super::games::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Games.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}
