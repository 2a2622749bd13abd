//! Mock model implementation for testing.

use crate::agents::base::{AgentError, ModelRequest, ModelTurn, VisionModel};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// A scripted [`VisionModel`].
///
/// Each call to `generate` pops the next scripted reply. Once the script is
/// exhausted the `fallback` reply (if any) is returned for every further
/// call; without a fallback the mock reports `NotAvailable`.
#[derive(Clone)]
pub struct MockModel {
    state: Arc<Mutex<MockState>>,
}

struct MockState {
    script: VecDeque<Result<ModelTurn, AgentError>>,
    fallback: Option<Result<ModelTurn, AgentError>>,
    requests: Vec<ModelRequest>,
}

impl MockModel {
    pub fn new(script: Vec<Result<ModelTurn, AgentError>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                script: script.into(),
                fallback: None,
                requests: Vec::new(),
            })),
        }
    }

    /// A model that returns the given turns in order.
    pub fn scripted(turns: Vec<ModelTurn>) -> Self {
        Self::new(turns.into_iter().map(Ok).collect())
    }

    /// A model that returns the same turn forever.
    pub fn repeating(turn: ModelTurn) -> Self {
        Self::new(Vec::new()).with_fallback(Ok(turn))
    }

    /// A model whose every call fails with the given error.
    pub fn failing(error: AgentError) -> Self {
        Self::new(Vec::new()).with_fallback(Err(error))
    }

    pub fn with_fallback(self, reply: Result<ModelTurn, AgentError>) -> Self {
        self.lock().fallback = Some(reply);
        self
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.lock().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl VisionModel for MockModel {
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, request: &ModelRequest) -> Result<ModelTurn, AgentError> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        if let Some(reply) = state.script.pop_front() {
            return reply;
        }

        match &state.fallback {
            Some(reply) => reply.clone(),
            None => Err(AgentError::NotAvailable(
                "Mock model script exhausted".to_string(),
            )),
        }
    }
}
