// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义领域层的数据访问抽象，具体实现位于基础设施层
pub mod dropped_domain_repository;
pub mod job_run_log_repository;
pub mod scheduled_job_repository;
pub mod tld_repository;
pub mod watchlist_repository;
