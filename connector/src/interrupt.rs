//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Advisory cancellation signal

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// One-shot cancellation flag shared between an attempt and its owner.
///
/// Raising the flag does not stop anything by itself. The worker checks it at
/// its own suspension points.
#[derive(Debug, Default)]
pub struct InterruptFlag {
    raised: AtomicBool,
    notify: Notify,
}

impl InterruptFlag {
    /// Creates a lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag and wakes everything waiting in [`interrupted`](Self::interrupted).
    pub fn interrupt(&self) {
        if !self.raised.swap(true, Ordering::AcqRel) {
            self.notify.notify_waiters();
        }
    }

    /// Whether the flag has been raised.
    pub fn is_interrupted(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Completes once the flag is raised.
    pub async fn interrupted(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking so a concurrent interrupt is not missed.
        notified.as_mut().enable();
        if self.is_interrupted() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn interrupted_completes_when_already_raised() {
        let flag = InterruptFlag::new();
        flag.interrupt();
        tokio::time::timeout(Duration::from_secs(1), flag.interrupted())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn interrupted_wakes_waiter() {
        let flag = Arc::new(InterruptFlag::new());
        let waiter = {
            let flag = flag.clone();
            tokio::spawn(async move { flag.interrupted().await })
        };
        tokio::task::yield_now().await;
        assert!(!flag.is_interrupted());
        flag.interrupt();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(flag.is_interrupted());
    }
}
