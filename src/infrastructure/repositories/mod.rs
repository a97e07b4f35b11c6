// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 基于 SeaORM 的领域仓库接口实现
pub mod dropped_domain_repo_impl;
pub mod job_run_log_repo_impl;
pub mod scheduled_job_repo_impl;
pub mod tld_repo_impl;
pub mod watchlist_repo_impl;
