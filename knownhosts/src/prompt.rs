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

//! Interactive confirmation and verification callback traits

use crate::HostKeyInfo;
use async_trait::async_trait;

/// User answer to a yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    /// Explicit agreement
    Yes,
    /// Explicit refusal
    No,
    /// The question was dismissed or could not be shown
    Cancel,
}

/// Surface able to ask the user to confirm a changed host key.
///
/// The store awaits the answer from the connection worker. Implementations
/// backed by a UI must hand the question over to the UI thread and never run
/// it on the worker itself.
#[async_trait]
pub trait HostKeyPrompt: Send + Sync + 'static {
    /// Shows `message` and waits for the answer.
    async fn ask_yes_no(&self, message: &str) -> PromptAnswer;
}

/// Prompt for unattended use: every changed key is refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectChangedKeys;

#[async_trait]
impl HostKeyPrompt for RejectChangedKeys {
    async fn ask_yes_no(&self, _message: &str) -> PromptAnswer {
        PromptAnswer::No
    }
}

/// Decides whether a host key presented by a server is trusted.
///
/// This is the callback an SSH engine invokes during key exchange.
#[async_trait]
pub trait HostKeyVerifier: Send + Sync + 'static {
    /// Returns `true` to continue connecting, `false` to abort.
    async fn verify(&self, info: &HostKeyInfo) -> bool;
}
