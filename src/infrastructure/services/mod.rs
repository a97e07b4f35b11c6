// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 外部服务适配器
///
/// 区域快照来源与通知下游的实现
pub mod file_zone_source;
pub mod log_notification_sink;
pub mod webhook_notification_sink;
