use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::FormField;

use super::CaptureFailure;

/// Read-only controller state passed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerContext {
    pub generating: bool,
    pub generation: u64,
    pub has_artifact: bool,
}

/// Transitions observers are told about, after they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerEvent {
    FieldUpdated { field: FormField },
    GenerationStarted { generation: u64 },
    CaptureRetry { generation: u64, attempts: u32 },
    CaptureSucceeded { generation: u64, bytes: usize },
    CaptureFailed { generation: u64, failure: CaptureFailure },
    Downloaded { generation: u64, filename: String },
}

/// Hook for hosts that mirror controller state (button enablement,
/// notifications). Observers cannot mutate the controller.
pub trait StarMapObserver {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &ControllerEvent, context: ControllerContext);
}

/// Observer that buffers events for dispatch after the controller borrow
/// ends. Clones share one queue, so a host keeps a clone and hands another
/// to [`super::StarMapController::add_observer`].
#[derive(Debug, Clone)]
pub struct EventQueue {
    id: String,
    pending: Rc<RefCell<VecDeque<(ControllerEvent, ControllerContext)>>>,
}

impl EventQueue {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pending: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    pub fn pop(&self) -> Option<(ControllerEvent, ControllerContext)> {
        self.pending.borrow_mut().pop_front()
    }

    /// Removes and returns everything buffered so far, oldest first.
    pub fn drain(&self) -> Vec<(ControllerEvent, ControllerContext)> {
        self.pending.borrow_mut().drain(..).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

impl StarMapObserver for EventQueue {
    fn id(&self) -> &str {
        &self.id
    }

    fn on_event(&mut self, event: &ControllerEvent, context: ControllerContext) {
        self.pending.borrow_mut().push_back((event.clone(), context));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_fifo() {
        let queue = EventQueue::new("queue");
        let mut sink = queue.clone();
        let context = ControllerContext {
            generating: true,
            generation: 1,
            has_artifact: false,
        };
        sink.on_event(&ControllerEvent::GenerationStarted { generation: 1 }, context);
        sink.on_event(
            &ControllerEvent::CaptureRetry {
                generation: 1,
                attempts: 1,
            },
            context,
        );

        assert_eq!(queue.len(), 2);
        assert_eq!(
            queue.pop().map(|(event, _)| event),
            Some(ControllerEvent::GenerationStarted { generation: 1 })
        );
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.is_empty());
    }
}
