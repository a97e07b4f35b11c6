// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use dashmap::DashSet;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

/// 任务分发特质
///
/// 在触发时按任务 ID 加载配置并执行
#[async_trait]
pub trait JobDispatcher: Send + Sync {
    async fn dispatch(&self, job_id: Uuid);
}

/// 执行结束（包括 panic）时把任务 ID 移出在途集合
struct InFlightGuard {
    in_flight: Arc<DashSet<Uuid>>,
    job_id: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.job_id);
    }
}

/// 工作管理器
///
/// 从分发通道消费任务 ID，以固定数量的执行槽并发执行；
/// 同一任务 ID 同时至多一个执行，重复触发直接合并
pub struct WorkerManager {
    dispatcher: Arc<dyn JobDispatcher>,
    slots: Arc<Semaphore>,
    in_flight: Arc<DashSet<Uuid>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    /// 创建新的工作管理器
    ///
    /// # 参数
    ///
    /// * `dispatcher` - 任务分发目标
    /// * `worker_slots` - 并发执行槽数量
    pub fn new(dispatcher: Arc<dyn JobDispatcher>, worker_slots: usize) -> Self {
        Self {
            dispatcher,
            slots: Arc::new(Semaphore::new(worker_slots.max(1))),
            in_flight: Arc::new(DashSet::new()),
            handles: Vec::new(),
        }
    }

    /// 启动消费循环
    pub fn start(&mut self, mut receiver: mpsc::Receiver<Uuid>) {
        let dispatcher = self.dispatcher.clone();
        let slots = self.slots.clone();
        let in_flight = self.in_flight.clone();

        let handle = tokio::spawn(async move {
            while let Some(job_id) = receiver.recv().await {
                if !in_flight.insert(job_id) {
                    debug!(%job_id, "Job already in flight, coalescing fire");
                    continue;
                }
                let guard = InFlightGuard {
                    in_flight: in_flight.clone(),
                    job_id,
                };

                let permit = match slots.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };

                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    let _guard = guard;
                    dispatcher.dispatch(job_id).await;
                });
            }
            info!("Dispatch channel closed, worker loop exiting");
        });

        self.handles.push(handle);
        info!(slots = self.slots.available_permits(), "Worker manager started");
    }

    /// 当前在途（执行中或等待执行槽）的任务数
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_in_flight(&self, job_id: Uuid) -> bool {
        self.in_flight.contains(&job_id)
    }

    /// 停止消费循环
    pub fn shutdown(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        info!("Workers shut down");
    }

    /// 等待关闭信号并停止消费循环
    pub async fn wait_for_shutdown(&mut self) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }
        self.shutdown();
    }
}
