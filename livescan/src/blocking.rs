use std::time::Duration;

use anyhow::{anyhow, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, TryRecvError};
use livescan_core::constraints::RenderTarget;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use crate::internal::runtime;
use crate::session::{ScanSession, SessionStatus};

/// 指令：调用方线程发送给后台会话的命令
enum Command {
    /// 停止扫描并释放摄像头
    Stop,
}

/// 响应：后台会话发回的数据
enum Update {
    /// 会话已进入 Running
    Started,
    /// 一个通过去重门的码
    Accepted(String),
    /// 会话失败 (初始化失败或运行期故障)
    Failed(String),
    /// 会话已按要求停止
    Stopped,
}

/// 同步风格的连续扫描器
///
/// 把 `ScanSession` 放到后台 Runtime 上运行，调用方线程通过通道拿到被接受的码。
/// 适合没有 async 上下文的宿主 (UI 主循环、FFI)。
#[derive(Debug)]
pub struct BlockingScanner {
    cmd_tx: UnboundedSender<Command>,
    update_rx: Receiver<Update>,
    log: Vec<String>,
    error: Option<String>,
    is_running: bool,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Stop")
    }
}

impl std::fmt::Debug for Update {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Update::Started => f.write_str("Started"),
            Update::Accepted(code) => write!(f, "Accepted({})", code),
            Update::Failed(msg) => write!(f, "Failed({})", msg),
            Update::Stopped => f.write_str("Stopped"),
        }
    }
}

impl BlockingScanner {
    /// 在后台初始化会话，阻塞直到会话进入 Running 或失败
    pub fn open(session: ScanSession, target: RenderTarget) -> Result<Self> {
        let (cmd_tx, mut cmd_rx) = unbounded_channel::<Command>();
        let (update_tx, update_rx) = unbounded::<Update>();

        let rt = runtime::get_runtime().map_err(|e| anyhow!("Failed to start runtime: {}", e))?;

        // 后台任务一直运行，直到收到 Stop、会话失败或者 BlockingScanner 被 Drop
        rt.spawn(async move {
            let mut session = session;

            if let Err(e) = session.initialize(&target).await {
                let _ = update_tx.send(Update::Failed(e.to_string()));
                return;
            }
            let _ = update_tx.send(Update::Started);

            loop {
                tokio::select! {
                    // Stop 或者发送端被 Drop
                    _ = cmd_rx.recv() => {
                        session.stop().await;
                        let _ = update_tx.send(Update::Stopped);
                        break;
                    }
                    accepted = session.next_accepted() => match accepted {
                        Some(code) => {
                            if update_tx.send(Update::Accepted(code)).is_err() {
                                // 调用方已经不在了
                                session.stop().await;
                                break;
                            }
                        }
                        None => {
                            let SessionStatus { error, .. } = session.status();
                            session.stop().await;
                            let _ = update_tx.send(Update::Failed(
                                error.unwrap_or_else(|| "Scanner stopped".into()),
                            ));
                            break;
                        }
                    }
                }
            }
        });

        // 阻塞等待启动结果
        match update_rx.recv() {
            Ok(Update::Started) => Ok(Self {
                cmd_tx,
                update_rx,
                log: Vec::new(),
                error: None,
                is_running: true,
            }),
            Ok(Update::Failed(msg)) => Err(anyhow!(msg)),
            Ok(other) => Err(anyhow!("Unexpected scanner update: {:?}", other)),
            Err(_) => Err(anyhow!("Background worker is dead")),
        }
    }

    /// 等待下一个被接受的码
    ///
    /// # 返回值
    /// * `Ok(Some(code))` - 新的码
    /// * `Ok(None)` - 超时，或扫描器已停止
    /// * `Err(e)` - 会话故障
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<String>> {
        if !self.is_running {
            return Ok(None);
        }
        match self.update_rx.recv_timeout(timeout) {
            Ok(update) => self.apply(update),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => self.worker_gone(),
        }
    }

    /// 非阻塞地取一个已经到达的码
    pub fn try_recv(&mut self) -> Result<Option<String>> {
        if !self.is_running {
            return Ok(None);
        }
        match self.update_rx.try_recv() {
            Ok(update) => self.apply(update),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => self.worker_gone(),
        }
    }

    /// 停止扫描，幂等
    ///
    /// 停止前已经被接受的码仍然会进入 `scan_log`。
    pub fn stop(&mut self) -> Result<()> {
        if !self.is_running {
            return Ok(());
        }
        let _ = self.cmd_tx.send(Command::Stop);

        // 排空通道直到后台确认停止
        loop {
            match self.update_rx.recv() {
                Ok(Update::Accepted(code)) => self.log.push(code),
                Ok(Update::Stopped) | Err(_) => break,
                Ok(Update::Failed(msg)) => {
                    self.error = Some(msg);
                    break;
                }
                Ok(Update::Started) => {}
            }
        }
        self.is_running = false;
        Ok(())
    }

    fn apply(&mut self, update: Update) -> Result<Option<String>> {
        match update {
            Update::Accepted(code) => {
                self.log.push(code.clone());
                Ok(Some(code))
            }
            Update::Failed(msg) => {
                self.is_running = false;
                self.error = Some(msg.clone());
                Err(anyhow!("Scanner failed: {}", msg))
            }
            Update::Stopped => {
                self.is_running = false;
                Ok(None)
            }
            Update::Started => Ok(None),
        }
    }

    fn worker_gone(&mut self) -> Result<Option<String>> {
        self.is_running = false;
        Err(anyhow!("Background worker is dead"))
    }

    /// 调用方已经收到的码 (顺序与会话一致)
    pub fn scan_log(&self) -> &[String] {
        &self.log
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

// 析构函数：通知后台会话停止并释放摄像头
impl Drop for BlockingScanner {
    fn drop(&mut self) {
        // 忽略错误，因为后台任务可能已经退出了
        let _ = self.cmd_tx.send(Command::Stop);
    }
}
