// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 顶级域名（tld）：区域快照所属的顶级域名及导入元数据
/// - 掉落域名（dropped_domain）：相邻两日快照差集中的域名
/// - 关注列表（watchlist）：用户定义的过滤条件
/// - 定时任务（scheduled_job）：每个顶级域名的每日流水线任务
/// - 运行日志（job_run_log）：单次任务执行的记录
/// - 告警（alert）：匹配结果分组与通知渠道
pub mod alert;
pub mod dropped_domain;
pub mod job_run_log;
pub mod scheduled_job;
pub mod tld;
pub mod watchlist;
