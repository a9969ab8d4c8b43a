//! Annotation session controller.
//!
//! One [`Annotator`] lives for one video-review session. It owns the live
//! scene, the tool state, the gesture in progress and the undo history, and
//! borrows the [`FrameStore`] from its owner for the session's lifetime.
//! Every host interaction (pointer input, playback time, toolbar commands,
//! clock ticks) goes through it, one call at a time.

use crate::config::AnnotatorConfig;
use crate::frame_clock::FrameIndex;
use crate::frame_store::{FrameDrawing, FrameStore, SaveOutcome};
use crate::guard::{SyncGuard, SyncState};
use crate::history::History;
use crate::input::PointerEvent;
use crate::playback::{FrameChange, PlaybackSync};
use crate::scene::{Scene, SerializedScene};
use crate::scheduler::Debouncer;
use crate::shapes::{ColorError, SerializableColor, Shape, ShapeStyle};
use crate::tools::{ShapeBuilder, ToolKind, ToolState};
use kurbo::Point;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Notifications for the host UI, drained with [`Annotator::drain_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotatorEvent {
    /// Playback crossed into another frame.
    FrameChanged {
        from: Option<FrameIndex>,
        to: FrameIndex,
    },
    /// A frame's drawing was written to the store.
    FrameSaved { frame: FrameIndex, objects: usize },
    /// A frame's drawing was deleted from the store.
    FrameRemoved { frame: FrameIndex },
    /// The live scene was hydrated for a frame.
    FrameLoaded { frame: FrameIndex, objects: usize },
    /// A stored drawing could not be decoded; the frame shows empty.
    LoadFailed { frame: FrameIndex, reason: String },
    /// Undo/redo availability may have changed.
    HistoryChanged { can_undo: bool, can_redo: bool },
    ToolChanged(ToolKind),
    ColorChanged(SerializableColor),
    /// The live scene or its preview changed and should be redrawn.
    RenderRequested,
}

/// A load whose hydrate step has not run yet.
#[derive(Debug, Clone, Copy)]
struct PendingLoad {
    frame: FrameIndex,
    due: Instant,
}

/// Controller for one review session.
pub struct Annotator {
    config: AnnotatorConfig,
    store: FrameStore,
    scene: Scene,
    tools: ToolState,
    builder: ShapeBuilder,
    history: History,
    playback: PlaybackSync,
    guard: SyncGuard,
    saves: Debouncer<FrameIndex>,
    pending_load: Option<PendingLoad>,
    current_frame: FrameIndex,
    now: Instant,
    events: Vec<AnnotatorEvent>,
}

impl Annotator {
    /// Start a session over `store`, positioned on frame 0.
    pub fn new(store: FrameStore, config: AnnotatorConfig) -> Self {
        let tools = ToolState {
            active_tool: ToolKind::default(),
            active_color: config.initial_color(),
        };
        let mut annotator = Self {
            store,
            scene: Scene::new(),
            tools,
            builder: ShapeBuilder::new(config.builder_limits()),
            history: History::new(config.history_limit),
            playback: PlaybackSync::new(config.frame_clock()),
            guard: SyncGuard::new(),
            saves: Debouncer::new(config.save_debounce()),
            pending_load: None,
            current_frame: 0,
            now: Instant::now(),
            events: Vec::new(),
            config,
        };

        log::info!(
            "Annotation session started at {} fps with {} stored frame(s)",
            annotator.config.frame_rate,
            annotator.store.len()
        );
        annotator.playback.mark_observed(0);
        annotator.load_frame(0);
        annotator
    }

    /// End the session and hand the frame store back to its owner.
    ///
    /// A pending debounced save is cancelled, not flushed; call
    /// [`Annotator::force_save`] first to keep the latest edit.
    pub fn dispose(mut self) -> FrameStore {
        if let Some(frame) = self.saves.cancel_all() {
            log::debug!("Cancelled pending save of frame {frame} on teardown");
        }
        self.pending_load = None;
        log::info!(
            "Annotation session ended with {} stored frame(s)",
            self.store.len()
        );
        self.store
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// The live scene, including the preview of a gesture in progress.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn tool_state(&self) -> ToolState {
        self.tools
    }

    /// Whether the surface is in continuous free-draw capture mode.
    pub fn is_free_draw(&self) -> bool {
        self.tools.active_tool.is_free_draw()
    }

    pub fn current_frame(&self) -> FrameIndex {
        self.current_frame
    }

    pub fn sync_state(&self) -> SyncState {
        self.guard.state()
    }

    pub fn is_loading(&self) -> bool {
        self.guard.is_loading()
    }

    pub fn has_pending_save(&self) -> bool {
        self.saves.is_pending()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Last instant supplied through [`Annotator::tick`].
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<AnnotatorEvent> {
        std::mem::take(&mut self.events)
    }

    // Tool/control surface

    /// Select the active tool. A gesture in progress is abandoned.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.abandon_gesture();
        self.tools.active_tool = tool;
        log::debug!("Tool set to {tool}");
        self.emit(AnnotatorEvent::ToolChanged(tool));
    }

    /// Select the active color from a `#rrggbb`-style string.
    pub fn set_color(&mut self, color: &str) -> Result<(), ColorError> {
        let color = SerializableColor::from_hex(color)?;
        self.set_color_value(color);
        Ok(())
    }

    pub fn set_color_value(&mut self, color: SerializableColor) {
        self.tools.active_color = color;
        self.emit(AnnotatorEvent::ColorChanged(color));
    }

    /// Erase the current frame's drawing.
    pub fn clear(&mut self) {
        self.clear_frame(self.current_frame);
    }

    /// Step back one committed edit. Returns false if nothing changed.
    pub fn undo(&mut self) -> bool {
        self.step_history(History::undo)
    }

    /// Re-apply an undone edit. Returns false if nothing changed.
    pub fn redo(&mut self) -> bool {
        self.step_history(History::redo)
    }

    /// True if the live scene has objects or the current frame has a record.
    pub fn has_drawings_for_current_frame(&self) -> bool {
        let live = !self.guard.is_loading() && !self.scene.is_empty();
        live || self.store.contains(self.current_frame)
    }

    /// Cancel any debounced save and write the current frame now.
    pub fn force_save(&mut self) -> bool {
        let frame = self.saves.run_now(self.current_frame);
        self.save_frame(frame)
    }

    /// Every stored drawing, ordered by frame.
    pub fn all_frame_drawings(&self) -> Vec<FrameDrawing> {
        self.store.all()
    }

    /// Frames that carry a drawing.
    pub fn annotated_frames(&self) -> Vec<FrameIndex> {
        self.store.frames().collect()
    }

    /// First annotated frame after `from`.
    pub fn next_annotated_frame(&self, from: FrameIndex) -> Option<FrameIndex> {
        self.store.next_annotated(from)
    }

    /// Last annotated frame before `from`.
    pub fn previous_annotated_frame(&self, from: FrameIndex) -> Option<FrameIndex> {
        self.store.previous_annotated(from)
    }

    // Pointer input

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        if !event.is_primary() {
            return;
        }
        match event {
            PointerEvent::Down { position, .. } => self.pointer_down(position),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position, .. } => self.pointer_up(position),
        }
    }

    pub fn pointer_down(&mut self, point: Point) {
        if self.guard.is_loading() {
            log::debug!("Ignoring pointer-down while frame {} loads", self.current_frame);
            return;
        }
        let style = ShapeStyle::new(self.tools.active_color, self.config.stroke_width);
        self.builder.begin(point, self.tools.active_tool, style);
    }

    pub fn pointer_move(&mut self, point: Point) {
        if let Some(preview) = self.builder.update(point) {
            self.scene.set_preview(Some(preview));
            self.emit(AnnotatorEvent::RenderRequested);
        }
    }

    pub fn pointer_up(&mut self, point: Point) {
        if !self.builder.is_active() {
            return;
        }
        self.scene.take_preview();
        let shapes = self.builder.end(point);
        if !shapes.is_empty() {
            self.commit(shapes);
        }
        self.emit(AnnotatorEvent::RenderRequested);
    }

    // Playback

    /// Feed the playback position. On a frame boundary the outgoing frame is
    /// saved synchronously before the incoming frame is loaded.
    pub fn update_time(&mut self, time_seconds: f64) -> Option<FrameChange> {
        let change = self.playback.observe(time_seconds)?;
        log::debug!("Frame change {:?} -> {}", change.from, change.to);

        if let Some(from) = change.from {
            let frame = self.saves.run_now(from);
            self.save_frame(frame);
        }

        self.current_frame = change.to;
        self.history.reset();
        self.emit(AnnotatorEvent::FrameChanged {
            from: change.from,
            to: change.to,
        });
        self.emit_history();

        let due = self.now + self.config.settle_delay();
        self.begin_load_at(change.to, due);
        if self.config.settle_delay().is_zero() {
            self.finish_load();
        }
        Some(change)
    }

    /// Advance the session clock, running any load or save that fell due.
    pub fn tick(&mut self, now: Instant) {
        self.now = now;

        if self.pending_load.is_some_and(|p| now >= p.due) {
            self.finish_load();
        }
        if let Some(frame) = self.saves.poll(now) {
            self.save_frame(frame);
        }
    }

    // Frame store operations

    /// Write the live scene to `frame`; an empty scene deletes the record.
    /// Dropped (returns false) while a load is in progress.
    pub fn save_frame(&mut self, frame: FrameIndex) -> bool {
        if let Err(e) = self.guard.begin_save() {
            log::warn!("Dropping save of frame {frame}: {e}");
            return false;
        }

        match self.store.save(frame, &self.scene) {
            Ok(SaveOutcome::Stored { objects }) => {
                log::debug!("Saved {objects} object(s) on frame {frame}");
                self.emit(AnnotatorEvent::FrameSaved { frame, objects });
            }
            Ok(SaveOutcome::Removed) => {
                log::debug!("Removed drawing on frame {frame}");
                self.emit(AnnotatorEvent::FrameRemoved { frame });
            }
            Ok(SaveOutcome::Unchanged) => {}
            Err(e) => log::error!("Failed to serialize frame {frame}: {e}"),
        }

        if let Err(e) = self.guard.finish_save() {
            log::error!("{e}");
            self.guard.reset();
        }
        true
    }

    /// Replace the live scene with `frame`'s stored drawing, or empty it.
    pub fn load_frame(&mut self, frame: FrameIndex) {
        self.begin_load(frame);
        self.finish_load();
    }

    /// First half of a load: take the guard and stop edits. Saves requested
    /// until [`Annotator::finish_load`] are dropped.
    pub fn begin_load(&mut self, frame: FrameIndex) {
        let now = self.now;
        self.begin_load_at(frame, now);
    }

    /// Second half of a load: decode and hydrate. Returns false if no load
    /// was pending.
    pub fn finish_load(&mut self) -> bool {
        let Some(pending) = self.pending_load.take() else {
            return false;
        };

        let data = self.store.get(pending.frame).map(|d| d.scene.clone());
        self.hydrate(pending.frame, data.as_ref());

        if let Err(e) = self.guard.finish_load() {
            log::error!("{e}");
            self.guard.reset();
        }
        log::debug!(
            "Loaded {} object(s) on frame {}",
            self.scene.len(),
            pending.frame
        );
        self.emit(AnnotatorEvent::FrameLoaded {
            frame: pending.frame,
            objects: self.scene.len(),
        });
        self.emit(AnnotatorEvent::RenderRequested);
        true
    }

    /// Delete `frame`'s record. On the current frame this also empties the
    /// live scene and overrides an in-progress load.
    pub fn clear_frame(&mut self, frame: FrameIndex) {
        let removed = self.store.remove(frame).is_some();
        if removed {
            self.emit(AnnotatorEvent::FrameRemoved { frame });
        }
        if frame != self.current_frame {
            return;
        }

        // While a load is pending the scene still shows the previous frame,
        // which is not an undoable state of this one.
        let overridden = self.pending_load.take().is_some();
        if overridden {
            log::debug!("Clear on frame {frame} overrides pending load");
            self.guard.reset();
        }
        self.saves.cancel_all();
        self.abandon_gesture();

        if !self.scene.is_empty() {
            if !overridden {
                self.snapshot_history();
            }
            self.scene.clear();
        }
        self.emit(AnnotatorEvent::RenderRequested);
    }

    // Internals

    fn begin_load_at(&mut self, frame: FrameIndex, due: Instant) {
        if let Err(e) = self.guard.begin_load() {
            log::error!("Cannot load frame {frame}: {e}");
            return;
        }
        if let Some(stale) = self.saves.cancel_all() {
            log::debug!("Cancelled pending save of frame {stale} before load");
        }
        self.abandon_gesture();
        self.pending_load = Some(PendingLoad { frame, due });
    }

    /// Replace the scene with decoded objects. Runs under the loading guard,
    /// so the object-added path neither snapshots nor saves.
    fn hydrate(&mut self, frame: FrameIndex, data: Option<&SerializedScene>) {
        self.scene.clear();
        let Some(data) = data else {
            return;
        };

        match Scene::deserialize(data) {
            Ok(decoded) => {
                for shape in decoded.objects().iter().cloned() {
                    self.add_object(shape);
                }
            }
            Err(e) => {
                log::warn!("Drawing on frame {frame} is unreadable, showing empty frame: {e}");
                self.emit(AnnotatorEvent::LoadFailed {
                    frame,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn step_history(
        &mut self,
        step: fn(&mut History, SerializedScene) -> Option<SerializedScene>,
    ) -> bool {
        if !self.guard.is_idle() {
            log::debug!("Ignoring history step while {:?}", self.guard.state());
            return false;
        }
        let current = match self.scene.serialize() {
            Ok(current) => current,
            Err(e) => {
                log::error!("Failed to serialize scene for history: {e}");
                return false;
            }
        };
        let Some(target) = step(&mut self.history, current) else {
            return false;
        };

        self.abandon_gesture();
        if let Err(e) = self.guard.begin_load() {
            log::error!("{e}");
            return false;
        }
        self.hydrate(self.current_frame, Some(&target));
        if let Err(e) = self.guard.finish_load() {
            log::error!("{e}");
            self.guard.reset();
        }

        self.emit_history();
        self.emit(AnnotatorEvent::RenderRequested);
        true
    }

    fn commit(&mut self, shapes: Vec<Shape>) {
        self.snapshot_history();
        for shape in shapes {
            self.add_object(shape);
        }
    }

    /// Object-added side effect shared by user commits and hydration.
    fn add_object(&mut self, shape: Shape) {
        self.scene.push(shape);
        self.request_save();
    }

    fn request_save(&mut self) {
        if self.guard.is_loading() {
            log::trace!("Ignoring save request during load");
            return;
        }
        self.saves.schedule(self.current_frame, self.now);
    }

    fn snapshot_history(&mut self) {
        if !self.guard.is_idle() {
            return;
        }
        match self.scene.serialize() {
            Ok(state) => self.history.snapshot(state),
            Err(e) => log::error!("Failed to snapshot scene: {e}"),
        }
        self.emit_history();
    }

    fn abandon_gesture(&mut self) {
        self.builder.cancel();
        if self.scene.take_preview().is_some() {
            self.emit(AnnotatorEvent::RenderRequested);
        }
    }

    fn emit_history(&mut self) {
        self.emit(AnnotatorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn emit(&mut self, event: AnnotatorEvent) {
        if event == AnnotatorEvent::RenderRequested
            && self.events.last() == Some(&AnnotatorEvent::RenderRequested)
        {
            return;
        }
        self.events.push(event);
    }
}
