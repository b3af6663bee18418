use anyhow::{Result, bail};
use log::{error, info, warn};
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// 可被排程器啟動的外部編碼工作
pub trait EncodeJob {
    /// 顯示與記錄用的標籤
    fn label(&self) -> String;
    /// 組出要啟動的外部程序
    fn build_command(&self) -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug)]
pub struct TranscodeTask<J> {
    pub job: J,
    pub status: TaskStatus,
    pub error_message: Option<String>,
}

struct Slot {
    child: Child,
    task_index: usize,
}

/// 固定槽位的併發轉檔排程器
///
/// 持有 concurrency 個槽位，每個槽位同時間至多掛一個外部程序。
/// 主迴圈輪詢所有槽位：已結束的槽位清空並記錄結果，
/// 空槽位依佇列順序補上下一個待處理工作；每輪之間固定休眠，
/// 避免空轉吃滿 CPU。待處理佇列耗盡後持續輪詢到所有槽位清空。
///
/// 單一工作以非零狀態結束只標記該工作失敗，不會中止整批；
/// 失敗清單可在結束後透過 `failed_tasks` 取得。
pub struct TaskScheduler<J: EncodeJob> {
    tasks: Vec<TranscodeTask<J>>,
    slots: Vec<Option<Slot>>,
    next_pending: usize,
    poll_interval: Duration,
    shutdown_signal: Arc<AtomicBool>,
}

impl<J: EncodeJob> TaskScheduler<J> {
    pub fn new(
        jobs: Vec<J>,
        concurrency: usize,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Result<Self> {
        if concurrency == 0 {
            bail!("併發數必須至少為 1");
        }

        let tasks = jobs
            .into_iter()
            .map(|job| TranscodeTask {
                job,
                status: TaskStatus::Pending,
                error_message: None,
            })
            .collect();

        Ok(Self {
            tasks,
            slots: (0..concurrency).map(|_| None).collect(),
            next_pending: 0,
            poll_interval: Duration::from_millis(500),
            shutdown_signal,
        })
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// 執行到所有工作都啟動過一次且所有槽位清空為止
    pub fn run(&mut self) -> Result<()> {
        info!(
            "開始轉檔任務，共 {} 個，併發上限 {}",
            self.tasks.len(),
            self.slots.len()
        );

        loop {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                self.handle_shutdown();
                return Ok(());
            }

            self.reap_finished_slots();
            self.fill_empty_slots();

            if self.is_all_completed() {
                break;
            }

            self.print_status();
            thread::sleep(self.poll_interval);
        }

        info!("所有轉檔任務已完成");
        Ok(())
    }

    fn is_all_completed(&self) -> bool {
        self.next_pending >= self.tasks.len() && self.slots.iter().all(Option::is_none)
    }

    /// 回收已結束的程序並記錄結果，槽位立即可再指派
    fn reap_finished_slots(&mut self) {
        for slot_index in 0..self.slots.len() {
            let Some(slot) = self.slots[slot_index].as_mut() else {
                continue;
            };

            let success = match slot.child.try_wait() {
                Ok(Some(status)) => status.success(),
                Ok(None) => continue,
                Err(e) => {
                    warn!("無法檢查程序狀態: {e}");
                    false
                }
            };

            if let Some(mut finished) = self.slots[slot_index].take() {
                let task = &mut self.tasks[finished.task_index];

                if success {
                    task.status = TaskStatus::Completed;
                    info!("轉檔完成: {}", task.job.label());
                } else {
                    let stderr = finished.child.stderr.take();
                    let error_msg = stderr
                        .map(|s| {
                            BufReader::new(s)
                                .lines()
                                .map_while(Result::ok)
                                .collect::<Vec<_>>()
                                .join("\n")
                        })
                        .unwrap_or_else(|| "未知錯誤".to_string());

                    task.status = TaskStatus::Failed;
                    task.error_message = Some(error_msg.clone());
                    error!("轉檔失敗 [{}]: {error_msg}", task.job.label());
                }
            }
        }
    }

    /// 依佇列順序把待處理工作補進空槽位
    fn fill_empty_slots(&mut self) {
        for slot_index in 0..self.slots.len() {
            if self.slots[slot_index].is_some() {
                continue;
            }
            if self.next_pending >= self.tasks.len() {
                break;
            }

            let task_index = self.next_pending;
            self.next_pending += 1;

            let task = &mut self.tasks[task_index];
            let mut command = task.job.build_command();
            command.stdout(Stdio::null());
            command.stderr(Stdio::piped());

            match command.spawn() {
                Ok(child) => {
                    task.status = TaskStatus::Running;
                    info!("啟動轉檔任務 [{}]: {}", child.id(), task.job.label());
                    self.slots[slot_index] = Some(Slot { child, task_index });
                }
                Err(e) => {
                    // 啟動失敗同樣只消耗這一個工作，不重試
                    task.status = TaskStatus::Failed;
                    task.error_message = Some(format!("無法啟動程序: {e}"));
                    error!("無法啟動轉檔任務 [{}]: {e}", task.job.label());
                }
            }
        }
    }

    fn handle_shutdown(&mut self) {
        warn!("收到中斷信號，正在停止所有任務...");

        for slot in &mut self.slots {
            if let Some(mut running) = slot.take() {
                warn!("終止程序 [{}]", running.child.id());
                let _ = running.child.kill();
                let _ = running.child.wait();

                let task = &mut self.tasks[running.task_index];
                task.status = TaskStatus::Failed;
                task.error_message = Some("使用者中斷".to_string());
            }
        }
    }

    fn print_status(&self) {
        let pending = self.tasks.len().saturating_sub(self.next_pending);
        let running = self.slots.iter().filter(|s| s.is_some()).count();
        let completed = self
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let failed = self
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .count();

        println!(
            "\r\x1b[K[狀態] 等待: {pending} | 執行中: {running} | 完成: {completed} | 失敗: {failed}"
        );
    }

    #[must_use]
    pub fn tasks(&self) -> &[TranscodeTask<J>] {
        &self.tasks
    }

    /// 以非零狀態結束（或無法啟動）的工作清單
    #[must_use]
    pub fn failed_tasks(&self) -> Vec<&TranscodeTask<J>> {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .collect()
    }
}
