// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含掉落检测流水线的核心业务逻辑：
/// - 区域解析（zone_parser）：区域文件文本 → 二级标签集合
/// - 掉落检测（drop_detector）：集合差与幂等持久化
/// - 质量评分（quality_scorer）：确定性的域名质量评分
/// - 关注列表匹配（watchlist_matcher）：过滤、分组与告警发送
/// - 区域来源（zone_source）与通知下游（notification_service）：外部协作方接口
pub mod drop_detector;
pub mod notification_service;
pub mod quality_scorer;
pub mod watchlist_matcher;
pub mod zone_parser;
pub mod zone_source;
