//! 停止フラグ付きのバックグラウンドスレッド

use std::io;
use std::sync::Arc;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::thread::{
    self,
    JoinHandle,
};
use std::time::{
    Duration,
    Instant,
};

/// join 待ちで完了を確認する間隔
const JOIN_POLL: Duration = Duration::from_millis(10);

/// ループ側から見た停止要求
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn request(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// 協調的に停止するバックグラウンドスレッド
///
/// ループは周期ごとに [`StopSignal::is_stopped`] を確認して抜ける。
/// [`BackgroundTask::stop`] は期限付きで終了を待ち、間に合わなければスレッドを
/// 切り離して先に進む（強制終了はしない）。
#[derive(Debug)]
pub struct BackgroundTask {
    name: String,
    stop: StopSignal,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundTask {
    /// 名前付きスレッドで `body` を開始する
    ///
    /// # Errors
    /// スレッドを生成できなかった場合
    pub fn spawn<F>(name: &str, body: F) -> io::Result<Self>
    where
        F: FnOnce(StopSignal) + Send + 'static,
    {
        let stop = StopSignal::default();
        let signal = stop.clone();
        let handle = thread::Builder::new().name(name.to_string()).spawn(move || body(signal))?;
        tracing::debug!(task = name, "Background task started");
        Ok(Self { name: name.to_string(), stop, handle: Some(handle) })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 停止を要求し、`timeout` まで終了を待つ
    ///
    /// 期限内に終了すれば `true`。
    pub fn stop(mut self, timeout: Duration) -> bool {
        self.stop.request();
        let Some(handle) = self.handle.take() else {
            return true;
        };

        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                tracing::warn!(task = %self.name, ?timeout, "Background task did not stop in time; abandoning");
                return false;
            }
            thread::sleep(JOIN_POLL);
        }

        if handle.join().is_err() {
            tracing::error!(task = %self.name, "Background task panicked");
        } else {
            tracing::debug!(task = %self.name, "Background task stopped");
        }
        true
    }
}

impl Drop for BackgroundTask {
    fn drop(&mut self) {
        self.stop.request();
    }
}
