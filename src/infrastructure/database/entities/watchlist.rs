// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "watchlists")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub domain_pattern: Option<String>,
    pub tld_filter: Option<String>,
    pub min_length: Option<i32>,
    pub max_length: Option<i32>,
    pub charset_filter: Option<String>,
    pub min_quality_score: Option<i32>,
    pub notify_email: bool,
    pub notify_telegram: bool,
    pub notify_discord: bool,
    pub notify_webhook: bool,
    pub is_active: bool,
    pub last_notified_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
