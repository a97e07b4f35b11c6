// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 工作管理器负责并发控制与同任务合并，流水线编排器负责单次任务执行
pub mod manager;
pub mod pipeline_worker;

pub use manager::{JobDispatcher, WorkerManager};
pub use pipeline_worker::PipelineOrchestrator;
