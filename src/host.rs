use crate::config::WindowConfig;
use crate::view::{View, ViewContext, ViewError};
use crossbeam::channel::{self, Receiver, Sender};
use perch_core::{
    DrawContext, DrawOp, Event, EventContext, Registry, Size, Task, Window, WindowRef,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Sends input events to a host from any thread.
pub type EventSender = Sender<Event>;

/// The window a host draws into.
///
/// Deferred tasks are run by the host once the view has handled the frame's events, before it
/// draws.
pub struct HostWindow {
    title: Mutex<String>,
    invalidated: AtomicBool,
    deferred: Mutex<VecDeque<Task>>,
}

impl HostWindow {
    fn new(title: &str) -> HostWindow {
        HostWindow {
            title: Mutex::new(title.to_string()),
            // the first frame is always wanted
            invalidated: AtomicBool::new(true),
            deferred: Mutex::new(VecDeque::new()),
        }
    }

    /// Runs deferred tasks in the order they were queued, including tasks queued while running.
    /// Returns how many ran.
    fn run_deferred(&self) -> usize {
        let mut count = 0;
        loop {
            // the queue must not stay locked while the task runs
            let task = self.deferred.lock().pop_front();
            match task {
                Some(task) => task(),
                None => return count,
            }
            count += 1;
        }
    }

    pub fn set_title(&self, title: &str) {
        *self.title.lock() = title.to_string();
    }

    /// Returns whether a frame was requested since the last call, and clears the request.
    pub fn take_invalidated(&self) -> bool {
        self.invalidated.swap(false, Ordering::SeqCst)
    }
}

impl Window for HostWindow {
    fn invalidate(&self) {
        self.invalidated.store(true, Ordering::SeqCst);
    }

    fn title(&self) -> String {
        self.title.lock().clone()
    }

    fn defer(&self, task: Task) {
        self.deferred.lock().push_back(task);
        self.invalidate();
    }
}

impl fmt::Debug for HostWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("HostWindow")
            .field("title", &*self.title.lock())
            .field("invalidated", &self.invalidated)
            .field("deferred", &self.deferred.lock().len())
            .finish()
    }
}

/// The result of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// The size the frame was drawn at.
    pub size: Size,
    /// Everything that was drawn, in order.
    pub ops: Vec<DrawOp>,
}

/// Drives a view: delivers input to it and draws it, one frame at a time.
///
/// Events may be sent from any thread through an [`EventSender`]; they are delivered on the next
/// frame.
pub struct Host {
    config: WindowConfig,
    registry: Arc<Registry>,
    window: Arc<HostWindow>,
    event_send: EventSender,
    event_recv: Receiver<Event>,

    view: Option<Box<dyn View>>,
    new_view: Option<Box<dyn View>>,
    view_initialized: bool,

    on_close: Option<Box<dyn FnOnce() + Send>>,
    closed: bool,
}

impl Host {
    /// Creates a host. Nothing is shown until a view is set and a frame is requested.
    pub fn new(config: WindowConfig, registry: Arc<Registry>) -> Host {
        let (event_send, event_recv) = channel::unbounded();
        let window = Arc::new(HostWindow::new(&config.title));

        Host {
            config,
            registry,
            window,
            event_send,
            event_recv,
            view: None,
            new_view: None,
            view_initialized: false,
            on_close: None,
            closed: false,
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn window(&self) -> &Arc<HostWindow> {
        &self.window
    }

    pub fn sender(&self) -> EventSender {
        self.event_send.clone()
    }

    /// Sets a callback that runs once when the host is closed.
    pub fn on_close(&mut self, f: impl FnOnce() + Send + 'static) {
        self.on_close = Some(Box::new(f));
    }

    /// Replaces the view. The swap happens at the start of the next frame, where the old view is
    /// destroyed and the new one initialized.
    pub fn set_view(&mut self, view: Box<dyn View>) {
        self.new_view = Some(view);
        self.view_initialized = false;
        self.window.invalidate();
    }

    pub fn view(&self) -> Option<&dyn View> {
        self.view.as_deref()
    }

    pub fn view_mut(&mut self) -> Option<&mut (dyn View + 'static)> {
        self.view.as_deref_mut()
    }

    /// Runs one frame at the given size.
    pub fn frame(&mut self, size: Size) -> Result<Frame, ViewError> {
        if self.closed {
            return Err(ViewError::Closed);
        }

        let events = self.poll();
        let window: WindowRef = self.window.clone();

        self.swap_view(&window)?;
        self.init_view(&window)?;

        let mut draw = DrawContext::new(size);
        if let Some(view) = &mut self.view {
            trace!(events = events.len(), "frame");
            // work queued by other threads since the last frame
            self.window.run_deferred();
            let mut ctx = EventContext::new(events, Some(Arc::clone(&window)));
            view.handle_events(&mut ctx);
            let deferred = self.window.run_deferred();
            if deferred > 0 {
                trace!(deferred, "ran deferred tasks");
            }
            view.draw(&mut draw);
        }

        Ok(Frame {
            size,
            ops: draw.into_ops(),
        })
    }

    /// Destroys the view and runs the close callback. Does nothing if already closed.
    pub fn close(&mut self) -> Result<(), ViewError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.new_view = None;

        let window: WindowRef = self.window.clone();
        let result = match &mut self.view {
            Some(view) => view.destroy(&ViewContext {
                window: Some(&window),
                registry: &self.registry,
            }),
            None => Ok(()),
        };
        self.view = None;

        if let Some(on_close) = self.on_close.take() {
            on_close();
        }
        debug!(title = %self.window.title(), "host closed");
        result
    }

    /// Receives all queued events.
    fn poll(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        loop {
            match self.event_recv.try_recv() {
                Ok(event) => events.push(event),
                // the host holds a sender itself, so the channel is only ever empty
                Err(_) => break,
            }
        }
        events
    }

    fn swap_view(&mut self, window: &WindowRef) -> Result<(), ViewError> {
        let new_view = match self.new_view.take() {
            Some(view) => view,
            None => return Ok(()),
        };

        if let Some(mut old) = self.view.take() {
            debug!(old = old.id(), new = new_view.id(), "swapping view");
            old.destroy(&ViewContext {
                window: Some(window),
                registry: &self.registry,
            })?;
        }
        self.view = Some(new_view);
        self.view_initialized = false;
        Ok(())
    }

    fn init_view(&mut self, window: &WindowRef) -> Result<(), ViewError> {
        if self.view_initialized {
            return Ok(());
        }
        if let Some(view) = &mut self.view {
            view.initialize(&ViewContext {
                window: Some(window),
                registry: &self.registry,
            })?;
            self.view_initialized = true;
        }
        Ok(())
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "failed to destroy view on drop");
        }
    }
}
