//! 本地任务存储 - 业务能力层
//!
//! 任务列表以 JSON 保存在单个文件中：`{"ace_exam_jpa_tasks": [...]}`

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::{initial_tasks, Task};

/// 存储键
pub const STORAGE_KEY: &str = "ace_exam_jpa_tasks";

/// 任务文件存储
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取任务列表；文件不存在或没有存储键时返回空列表
    pub async fn load(&self) -> Result<Vec<Task>, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("任务文件不存在: {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StorageError::ReadFailed {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut slots: BTreeMap<String, Vec<Task>> =
            serde_json::from_str(&content).map_err(|source| StorageError::ParseFailed {
                path: self.path.clone(),
                source,
            })?;

        Ok(slots.remove(STORAGE_KEY).unwrap_or_default())
    }

    /// 写入完整任务列表
    pub async fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        let mut slots = BTreeMap::new();
        slots.insert(STORAGE_KEY, tasks);
        let content = serde_json::to_string_pretty(&slots)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::WriteFailed {
                    path: self.path.clone(),
                    source,
                })?;
        }

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|source| StorageError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;

        debug!("已保存 {} 个任务到 {}", tasks.len(), self.path.display());
        Ok(())
    }

    /// 删除任务文件；文件不存在视为成功
    pub async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::DeleteFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// 读取任务；为空时用学习计划初始化并写回
    pub async fn load_or_seed(&self) -> Result<Vec<Task>, StorageError> {
        let tasks = self.load().await?;
        if !tasks.is_empty() {
            info!("✓ 已加载 {} 个任务", tasks.len());
            return Ok(tasks);
        }

        let tasks = initial_tasks();
        self.save(&tasks).await?;
        info!("✓ 首次启动，已按学习计划初始化 {} 个任务", tasks.len());
        Ok(tasks)
    }
}
