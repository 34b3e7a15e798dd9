//! A kitchen timer: a worker thread advances the progress of a boiling egg while the user starts
//! and stops it from the UI.

use cgmath::Vector2;
use parking_lot::Mutex;
use perch::perch_core::{
    Binding, BindingTable, BindingWatcher, Bindable, Color, DrawOp, Element, Event, Function,
    PointerPhase, Size, StaticSource, TypedElement,
};
use perch::widget::Button;
use perch::{
    impl_composed_view, ComposedView, Frame, Host, Ticker, View, ViewContext, ViewError,
    ViewModel, ViewScreen, WindowConfig,
};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

const DOCUMENT: &str = r#"
type = "layout.Flex"
axis = "Vertical"

[[children]]
type = "widget.Graphic"
id = "egg"
drawFunction = "drawEgg"
weight = 1

[[children]]
type = "layout.Inset"
top = 8
bottom = 8
left = 16
right = 16
[children.child]
type = "widget.Input"
id = "timeInput"
hint = "Minutes"
inputType = "Numeric"
binding = "Time Remaining"

[[children]]
type = "widget.ProgressBar"
id = "progressBar"
binding = "Progress"

[[children]]
type = "layout.Inset"
top = 8
bottom = 8
left = 16
right = 16
[children.child]
type = "widget.Button"
id = "startButton"
label = "Start"
onClicked = "onButtonStartClicked"
"#;

struct TimerState {
    progress: Arc<Binding<f32>>,
    boiling: Arc<Binding<bool>>,
    time_remaining: Arc<Binding<String>>,
    tick: Duration,
    /// How long a "minute" lasts.
    minute: Duration,
    boil_duration: Mutex<Duration>,
}

impl TimerState {
    fn reset(&self) {
        self.boiling.set(false);
        self.progress.set(0.);
        self.time_remaining.set(String::new());
    }

    fn advance(&self) {
        if !self.boiling.get() {
            return;
        }
        let progress = self.progress.get();
        if progress < 1. {
            let inc = self.tick.as_secs_f64() / self.boil_duration.lock().as_secs_f64();
            self.progress.set(progress + inc as f32);
        } else {
            self.reset();
        }
    }
}

struct Timer {
    state: Arc<TimerState>,
    bindings: BindingTable,
    ticker: Mutex<Option<Ticker>>,
}

impl Timer {
    fn new(tick: Duration, minute: Duration) -> Timer {
        let state = Arc::new(TimerState {
            progress: Binding::new("Progress", 0.),
            boiling: Binding::new("Boiling", false),
            time_remaining: Binding::new("Time Remaining", String::new()),
            tick,
            minute,
            boil_duration: Mutex::new(minute * 5),
        });
        let mut bindings = BindingTable::new();
        bindings.insert(state.progress.clone());
        bindings.insert(state.boiling.clone());
        bindings.insert(state.time_remaining.clone());
        Timer {
            state,
            bindings,
            ticker: Mutex::new(None),
        }
    }

    fn toggle_boiling(&self) {
        let state = &self.state;
        state.boiling.set(!state.boiling.get());
        if !state.boiling.get() {
            state.reset();
            return;
        }
        match state.time_remaining.get().parse::<f64>() {
            Ok(minutes) => *state.boil_duration.lock() = state.minute.mul_f64(minutes),
            Err(_) => state.reset(),
        }
    }
}

impl ViewModel for Timer {
    fn initialize(&self) -> anyhow::Result<()> {
        let state = Arc::clone(&self.state);
        let ticker = Ticker::spawn(state.tick, move || state.advance());
        if let Some(mut old) = self.ticker.lock().replace(ticker) {
            old.stop();
        }
        Ok(())
    }

    fn destroy(&self) -> anyhow::Result<()> {
        if let Some(mut ticker) = self.ticker.lock().take() {
            ticker.stop();
        }
        Ok(())
    }

    fn binding(&self, name: &str) -> Option<Arc<dyn Bindable>> {
        self.bindings.get(name)
    }
}

/// Shows "Stop" on the start button while the egg is boiling.
struct StartButtonLabel {
    boiling: Arc<Binding<bool>>,
    button: TypedElement<Button>,
}

impl BindingWatcher for StartButtonLabel {
    fn binding_changed(&self, _: &dyn Bindable) {
        let label = if self.boiling.get() { "Stop" } else { "Start" };
        // may run inside a click handler, while the button itself is locked
        self.button.update(move |button| button.set_label(label));
    }
}

struct TimerView {
    view: ComposedView,
    timer: Arc<Timer>,
    start_label: Option<Arc<StartButtonLabel>>,
}

impl TimerView {
    fn new(timer: Arc<Timer>, source: Arc<StaticSource>) -> TimerView {
        let mut view = ComposedView::new(
            timer.clone(),
            Some(ViewScreen::new(source, "timer.toml")),
        );

        let progress = timer.state.progress.clone();
        view.export_function(
            "drawEgg",
            Function::painter(move |ctx, id| {
                let p = f64::from(progress.get()).clamp(0., 1.);
                let size = ctx.constraints.min;
                let bounds = ctx.rect(size);
                ctx.push(DrawOp::Fill {
                    element: id.to_string(),
                    bounds,
                    color: Color {
                        r: 1.,
                        g: 239. / 255. * (1. - p),
                        b: 174. / 255. * (1. - p),
                        a: 1.,
                    },
                });
                size
            }),
        );

        let t = Arc::clone(&timer);
        view.export_function(
            "onButtonStartClicked",
            Function::handler(move |_, _| t.toggle_boiling()),
        );

        TimerView {
            view,
            timer,
            start_label: None,
        }
    }
}

impl_composed_view!(TimerView, view);

impl View for TimerView {
    fn initialize(&mut self, ctx: &ViewContext) -> Result<(), ViewError> {
        self.view.initialize(ctx)?;
        self.start_label = self
            .view
            .element_by_id_as::<Button>("startButton")
            .map(|button| {
                Arc::new(StartButtonLabel {
                    boiling: self.timer.state.boiling.clone(),
                    button,
                })
            });
        if let Some(start_label) = &self.start_label {
            let watcher: Weak<StartButtonLabel> = Arc::downgrade(start_label);
            self.timer.state.boiling.watch(watcher);
        }
        Ok(())
    }

    fn destroy(&mut self, ctx: &ViewContext) -> Result<(), ViewError> {
        self.start_label = None;
        self.view.destroy(ctx)
    }
}

impl fmt::Debug for TimerView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TimerView").field("view", &self.view).finish()
    }
}

fn texts(frame: &Frame) -> Vec<&str> {
    frame
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn wait_for(what: &str, mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !done() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

fn click(host: &Host, target: &str) {
    for phase in [PointerPhase::Enter, PointerPhase::Press, PointerPhase::Release] {
        host.sender()
            .send(Event::Pointer {
                target: target.into(),
                phase,
            })
            .unwrap();
    }
}

#[test]
fn egg_boils_and_resets() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let config = WindowConfig::from_toml_str(
        r#"
            title = "Egg Timer"
            size = { width = 400, height = 600 }
        "#,
    )
    .unwrap();
    let size: Size = config.initial_size().unwrap();

    let closed = Arc::new(AtomicBool::new(false));
    let mut host = Host::new(config, Arc::new(perch::registry()));
    let c = Arc::clone(&closed);
    host.on_close(move || c.store(true, Ordering::SeqCst));

    let timer = Arc::new(Timer::new(Duration::from_millis(1), Duration::from_millis(60)));
    let source = Arc::new(StaticSource::new().with("timer.toml", DOCUMENT));
    host.set_view(Box::new(TimerView::new(Arc::clone(&timer), source)));

    let frame = host.frame(size).unwrap();
    assert_eq!(frame.size, Vector2::new(400., 600.));
    assert_eq!(texts(&frame), ["Minutes", "Start"]);
    assert_eq!(host.view().map(|v| v.id()), Some("timer.toml"));

    host.sender()
        .send(Event::Text {
            target: "timeInput".into(),
            text: "0.5 min".into(),
        })
        .unwrap();
    let frame = host.frame(size).unwrap();
    assert_eq!(timer.state.time_remaining.get(), "0.5");
    assert_eq!(texts(&frame), ["0.5", "Start"]);

    click(&host, "startButton");
    let frame = host.frame(size).unwrap();
    assert!(timer.state.boiling.get());
    assert_eq!(*timer.state.boil_duration.lock(), Duration::from_millis(30));
    // relabeled from within the click, drawn in the same frame
    assert_eq!(texts(&frame)[1], "Stop");
    host.window().take_invalidated();

    wait_for("progress", || timer.state.progress.get() > 0.);
    wait_for("the egg to be done", || !timer.state.boiling.get());
    assert!(host.window().take_invalidated());

    let frame = host.frame(size).unwrap();
    assert_eq!(texts(&frame), ["Minutes", "Start"]);
    // the worker's reset was not overwritten by the input's stale copy
    assert_eq!(timer.state.time_remaining.get(), "");

    host.close().unwrap();
    assert!(closed.load(Ordering::SeqCst));
    assert!(timer.ticker.lock().is_none());
    assert!(matches!(host.frame(size), Err(ViewError::Closed)));
}

#[test]
fn starting_without_a_time_resets() {
    let timer = Arc::new(Timer::new(Duration::from_millis(5), Duration::from_millis(10)));
    let source = Arc::new(StaticSource::new().with("timer.toml", DOCUMENT));
    let mut host = Host::new(WindowConfig::default(), Arc::new(perch::registry()));
    host.set_view(Box::new(TimerView::new(Arc::clone(&timer), source)));
    let size = Vector2::new(300., 300.);
    host.frame(size).unwrap();

    click(&host, "startButton");
    let frame = host.frame(size).unwrap();
    assert!(!timer.state.boiling.get());
    assert_eq!(timer.state.progress.get(), 0.);
    // "Stop" then "Start", in that order
    assert_eq!(texts(&frame)[1], "Start");
}
