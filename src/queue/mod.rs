// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 调度模块
///
/// 按每日 `hour:minute` 触发定时任务，通过通道把到期任务 ID 交给工作管理器
pub mod scheduler;
