// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 领域层接口的技术实现：数据库连接与实体、仓库实现、
/// 区域快照来源、通知下游以及指标导出。
pub mod database;
pub mod metrics;
pub mod repositories;
pub mod services;
