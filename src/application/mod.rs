// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 面向外部调用方的定时任务管理用例与请求对象
pub mod dto;
pub mod use_cases;
