//! 再読み込みホットキーのポーリング

use std::io;
use std::thread;
use std::time::Duration;

use super::task::BackgroundTask;

/// キーが離されるのを待つ間隔
const RELEASE_POLL: Duration = Duration::from_millis(10);

/// ホットキーの押下状態
///
/// OS のキーボード状態の取得は呼び出し側が実装する。
pub trait KeyState: Send {
    fn is_pressed(&self) -> bool;
}

/// ホットキーのポーリングスレッドを開始する
///
/// 押されたらキーが離されるまで待ってから `on_press` を呼ぶので、1 回の押下で 1 回だけ発火する。
///
/// # Errors
/// スレッドを生成できなかった場合
pub fn spawn_hotkey_poller<F>(key: Box<dyn KeyState>, poll: Duration, on_press: F) -> io::Result<BackgroundTask>
where
    F: Fn() + Send + 'static,
{
    BackgroundTask::spawn("tl-hotkey", move |stop| {
        while !stop.is_stopped() {
            if key.is_pressed() {
                while key.is_pressed() && !stop.is_stopped() {
                    thread::sleep(RELEASE_POLL);
                }
                if stop.is_stopped() {
                    break;
                }
                tracing::info!("Reload hotkey pressed");
                on_press();
            }
            thread::sleep(poll);
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{
        AtomicBool,
        AtomicUsize,
        Ordering,
    };
    use std::time::Instant;

    use googletest::prelude::*;

    use super::*;

    /// テスト用のキー
    #[derive(Debug, Clone, Default)]
    struct FakeKey(Arc<AtomicBool>);

    impl FakeKey {
        fn set(&self, pressed: bool) {
            self.0.store(pressed, Ordering::SeqCst);
        }
    }

    impl KeyState for FakeKey {
        fn is_pressed(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn start(key: &FakeKey) -> (BackgroundTask, Arc<AtomicUsize>) {
        let presses = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&presses);
        let task = spawn_hotkey_poller(Box::new(key.clone()), Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        (task, presses)
    }

    fn wait_for(condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    #[googletest::test]
    fn fires_once_after_release() {
        let key = FakeKey::default();
        let (task, presses) = start(&key);

        key.set(true);
        thread::sleep(Duration::from_millis(100));
        let while_held = presses.load(Ordering::SeqCst);
        key.set(false);
        let fired = wait_for(|| presses.load(Ordering::SeqCst) == 1);
        thread::sleep(Duration::from_millis(50));

        expect_that!(while_held, eq(0));
        expect_that!(fired, eq(true));
        expect_that!(presses.load(Ordering::SeqCst), eq(1));
        expect_that!(task.stop(Duration::from_secs(1)), eq(true));
    }

    #[googletest::test]
    fn stop_while_held_does_not_fire() {
        let key = FakeKey::default();
        let (task, presses) = start(&key);

        key.set(true);
        thread::sleep(Duration::from_millis(50));
        let stopped = task.stop(Duration::from_secs(1));

        expect_that!(stopped, eq(true));
        expect_that!(presses.load(Ordering::SeqCst), eq(0));
    }
}
