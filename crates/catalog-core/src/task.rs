//! Task - リスナーが作り、ワーカーが完了させる 1 リクエスト分の仕事

use std::fmt;

use crate::domain::{Priority, Request};
use crate::impls::PriorityDispatchQueue;
use crate::ports::Responder;

/// A decoded request plus the handle to answer it on.
///
/// Lives for exactly one request/response cycle.
pub struct Task {
    pub request: Request,
    pub responder: Box<dyn Responder>,
}

impl Task {
    pub fn new(request: Request, responder: Box<dyn Responder>) -> Self {
        Self { request, responder }
    }

    pub fn priority(&self) -> Priority {
        self.request.priority()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("request", &self.request)
            .field("peer", &self.responder.peer())
            .finish()
    }
}

/// The queue shared by the listener (producer) and the workers (consumers).
pub type DispatchQueue = PriorityDispatchQueue<Task>;

/// Classify and enqueue. Returns the assigned sequence number.
pub async fn submit(queue: &DispatchQueue, request: Request, responder: Box<dyn Responder>) -> u64 {
    let task = Task::new(request, responder);
    let priority = task.priority();
    queue.push(priority, task).await
}
