use std::io;
use std::sync::OnceLock;
use tokio::runtime::Runtime;

// 全局单例 Runtime
static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// 获取全局 Runtime，如果不存在则创建
/// 这允许用户不写 #[tokio::main] 也能跑扫描会话
pub(crate) fn get_runtime() -> io::Result<&'static Runtime> {
    if let Some(rt) = RUNTIME.get() {
        return Ok(rt);
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(1) // 会话是单消费者的，一个线程足矣
        .thread_name("livescan-bg-worker")
        .build()?;

    // 并发初始化时多建的那个会被直接丢弃
    Ok(RUNTIME.get_or_init(|| rt))
}
