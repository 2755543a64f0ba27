//! The interactive polygon editor.
//!
//! `Editor` ties the store, history, transform, and mode state machine
//! together behind a single UI-agnostic event interface. A shell feeds it
//! pointer and key events in screen coordinates; the editor converts them
//! to image space, dispatches through the mode transition table, and
//! reports what changed as a list of signals. It never draws anything
//! itself.

mod dispatch;
mod interaction;
mod mode;

pub use dispatch::{Action, HitKind, HitTarget, transition};
pub use interaction::{InteractionState, PanState, VertexDrag};
pub use mode::EditMode;

use crate::config::EditorConfig;
use crate::constants::MIN_POLYGON_POINTS;
use crate::error::MutationError;
use crate::geometry::{self, VertexRef, slice_polygon};
use crate::history::{History, HistoryConfig};
use crate::keybindings::Key;
use crate::model::{Point, Polygon};
use crate::reload::ReloadOutcome;
use crate::store::PolygonStore;
use crate::transform::{Transform, ZoomDirection};

// ============================================================================
// Events & Signals
// ============================================================================

/// Pointer button of a press event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Input events the editor consumes. Pointer positions are in screen
/// space; the editor applies the current transform itself.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        pos: Point,
        button: PointerButton,
        shift: bool,
    },
    PointerMove {
        pos: Point,
    },
    PointerUp {
        pos: Point,
    },
    Wheel {
        pos: Point,
        direction: ZoomDirection,
    },
    KeyDown(Key),
}

/// An entry the editor offers in a right-click context menu. The shell
/// shows the menu and feeds the chosen entry back via
/// [`Editor::menu_action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Remove a single vertex (rejected at the 3-point minimum).
    DeleteVertex(VertexRef),
    /// Remove a whole polygon.
    DeletePolygon(String),
}

/// What handling an event changed. The shell maps these onto redraws and
/// notifications; order within one event is not significant.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// The selection changed to the contained id (or to nothing).
    SelectionChanged(Option<String>),
    /// The polygon collection was mutated.
    PolygonsChanged,
    /// The edit mode changed.
    ModeChanged(EditMode),
    /// Pan or zoom changed.
    TransformChanged,
    /// Transient gesture state changed (drag offset, pending points).
    OverlayChanged,
    /// A right-click happened; show a menu with these entries at `pos`
    /// (screen space). The press must not fall through to selection.
    ContextMenu { pos: Point, actions: Vec<MenuAction> },
    /// A user-visible, non-fatal problem.
    Warning(String),
}

// ============================================================================
// Editor
// ============================================================================

/// The polygon editing engine.
pub struct Editor {
    store: PolygonStore,
    history: History,
    mode: EditMode,
    interaction: InteractionState,
    transform: Transform,
    config: EditorConfig,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let history = History::with_config(HistoryConfig {
            max_depth: config.history_depth,
        });
        Self {
            store: PolygonStore::new(),
            history,
            mode: EditMode::default(),
            interaction: InteractionState::default(),
            transform: Transform::default(),
            config,
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    /// The live polygon collection and selection.
    pub fn store(&self) -> &PolygonStore {
        &self.store
    }

    /// The active edit mode.
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// The current pan/zoom transform.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// In-progress gesture state, for overlay rendering.
    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Set the transform directly (e.g. fit-to-window on image load).
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    // ========================================================================
    // Collection lifecycle
    // ========================================================================

    /// Install a freshly loaded collection. Drops all history: the undo
    /// baseline is the loaded state.
    pub fn load_polygons(&mut self, polygons: Vec<Polygon>) -> Vec<Signal> {
        let mut signals = Vec::new();
        self.install_collection(polygons, &mut signals);
        signals
    }

    /// Apply the outcome of a segmentation reload.
    ///
    /// A cancelled reload is silent; a failed one only warns, leaving the
    /// current collection untouched.
    pub fn apply_reload(&mut self, outcome: ReloadOutcome) -> Vec<Signal> {
        let mut signals = Vec::new();
        match outcome {
            ReloadOutcome::Loaded(parsed) => {
                if !parsed.rejected.is_empty() {
                    signals.push(Signal::Warning(format!(
                        "{} polygon(s) were skipped while loading",
                        parsed.rejected.len()
                    )));
                }
                self.install_collection(parsed.polygons, &mut signals);
            }
            ReloadOutcome::NotFound => {
                log::debug!("no segmentation available, clearing collection");
                self.install_collection(Vec::new(), &mut signals);
            }
            ReloadOutcome::Cancelled => {}
            ReloadOutcome::Failed(err) => {
                signals.push(Signal::Warning(format!("reload failed: {err}")));
            }
        }
        signals
    }

    fn install_collection(&mut self, polygons: Vec<Polygon>, signals: &mut Vec<Signal>) {
        self.interaction.clear();
        self.store.set_polygons(polygons);
        self.history.clear();
        signals.push(Signal::PolygonsChanged);
        signals.push(Signal::SelectionChanged(
            self.store.selected().map(String::from),
        ));
    }

    // ========================================================================
    // Event handling
    // ========================================================================

    /// Handle one input event and report what changed.
    pub fn handle_event(&mut self, event: InputEvent) -> Vec<Signal> {
        let mut signals = Vec::new();
        match event {
            InputEvent::PointerDown {
                pos,
                button: PointerButton::Primary,
                shift,
            } => self.pointer_down_primary(pos, shift, &mut signals),
            InputEvent::PointerDown {
                pos,
                button: PointerButton::Secondary,
                ..
            } => self.pointer_down_secondary(pos, &mut signals),
            InputEvent::PointerMove { pos } => self.pointer_move(pos, &mut signals),
            InputEvent::PointerUp { .. } => self.pointer_up(&mut signals),
            InputEvent::Wheel { pos, direction } => {
                self.transform =
                    self.transform
                        .zoom_step(pos, direction, self.config.zoom_min, self.config.zoom_max);
                signals.push(Signal::TransformChanged);
            }
            InputEvent::KeyDown(key) => self.key_down(key, &mut signals),
        }
        signals
    }

    /// Switch modes. Abandons any in-progress gesture; entering View also
    /// clears the selection.
    pub fn set_mode(&mut self, mode: EditMode) -> Vec<Signal> {
        let mut signals = Vec::new();
        if mode == self.mode {
            return signals;
        }
        if !self.interaction.is_idle() {
            self.interaction.clear();
            signals.push(Signal::OverlayChanged);
        }
        if mode == EditMode::View {
            self.change_selection(None, &mut signals);
        }
        self.change_mode(mode, &mut signals);
        signals
    }

    /// Undo the last completed operation.
    pub fn undo(&mut self) -> Vec<Signal> {
        let mut signals = Vec::new();
        let current = self.store.snapshot();
        if let Some(previous) = self.history.undo(current) {
            self.interaction.clear();
            self.store.restore(previous);
            signals.push(Signal::PolygonsChanged);
            signals.push(Signal::SelectionChanged(
                self.store.selected().map(String::from),
            ));
        }
        signals
    }

    /// Redo a previously undone operation.
    pub fn redo(&mut self) -> Vec<Signal> {
        let mut signals = Vec::new();
        let current = self.store.snapshot();
        if let Some(next) = self.history.redo(current) {
            self.interaction.clear();
            self.store.restore(next);
            signals.push(Signal::PolygonsChanged);
            signals.push(Signal::SelectionChanged(
                self.store.selected().map(String::from),
            ));
        }
        signals
    }

    /// Execute a context-menu entry previously offered in a
    /// [`Signal::ContextMenu`].
    pub fn menu_action(&mut self, action: MenuAction) -> Vec<Signal> {
        let mut signals = Vec::new();
        match action {
            MenuAction::DeleteVertex(vertex) => {
                let before = self.store.snapshot();
                match self
                    .store
                    .delete_vertex(&vertex.polygon_id, vertex.vertex_index)
                {
                    Ok(()) => {
                        self.history.record(before);
                        signals.push(Signal::PolygonsChanged);
                    }
                    Err(MutationError::TooFewPoints { .. }) => {
                        signals.push(Signal::Warning(
                            "a polygon needs at least 3 points".to_string(),
                        ));
                    }
                    Err(err) => log::warn!("vertex delete dropped: {err}"),
                }
            }
            MenuAction::DeletePolygon(id) => self.delete_polygon(&id, &mut signals),
        }
        signals
    }

    // ========================================================================
    // Pointer handling
    // ========================================================================

    fn pointer_down_primary(&mut self, pos: Point, shift: bool, signals: &mut Vec<Signal>) {
        let image_pt = self.transform.to_image(pos);
        let tolerance = self.config.hit_tolerance_at(self.transform.zoom);
        let target = self.hit_test(&image_pt, tolerance);

        // Shift-click on a vertex jumps straight into an add-points chain
        // anchored there.
        if shift
            && self.mode == EditMode::EditVertices
            && let HitTarget::Vertex(vertex) = &target
        {
            self.begin_add_chain(vertex.clone(), signals);
            return;
        }

        match transition(self.mode, target.kind()) {
            Action::SelectAndEdit => {
                if let Some(id) = owner_id(&target) {
                    self.change_selection(Some(&id), signals);
                    self.change_mode(EditMode::EditVertices, signals);
                }
            }
            Action::Select => {
                if let Some(id) = owner_id(&target) {
                    let changed = self.change_selection(Some(&id), signals);
                    // Cut points belong to the previously selected outline
                    if changed && self.interaction.slice_start.take().is_some() {
                        signals.push(Signal::OverlayChanged);
                    }
                }
            }
            Action::SelectUnlessSlicing => {
                if self.interaction.slice_start.is_none()
                    && let Some(id) = owner_id(&target)
                {
                    self.change_selection(Some(&id), signals);
                }
            }
            Action::ClearSelection => {
                self.change_selection(None, signals);
                self.interaction.pan = Some(PanState { last_screen: pos });
            }
            Action::ClearSelectionToView => {
                self.change_selection(None, signals);
                self.change_mode(EditMode::View, signals);
                self.interaction.clear();
                self.interaction.pan = Some(PanState { last_screen: pos });
            }
            Action::BeginDrag => {
                if let HitTarget::Vertex(vertex) = target {
                    self.begin_drag(vertex, image_pt, signals);
                }
            }
            Action::DeletePolygon => {
                if let Some(id) = owner_id(&target) {
                    self.delete_polygon(&id, signals);
                }
            }
            Action::AddSlicePoint => self.add_slice_point(image_pt, tolerance, signals),
            Action::CommitAddChain => {
                if let HitTarget::Vertex(vertex) = target {
                    self.anchor_or_commit_chain(vertex, signals);
                }
            }
            Action::AppendTempPoint => {
                self.interaction.temp_points.push(image_pt);
                signals.push(Signal::OverlayChanged);
            }
            Action::CreatePoint => self.create_point(image_pt, tolerance, signals),
            Action::Ignore => {}
        }
    }

    fn pointer_down_secondary(&mut self, pos: Point, signals: &mut Vec<Signal>) {
        let image_pt = self.transform.to_image(pos);
        let tolerance = self.config.hit_tolerance_at(self.transform.zoom);

        // A right-click only opens a menu; selection and mode stay put.
        let actions = match self.classify(&image_pt, tolerance) {
            HitTarget::Vertex(vertex) => vec![
                MenuAction::DeleteVertex(vertex.clone()),
                MenuAction::DeletePolygon(vertex.polygon_id),
            ],
            HitTarget::Polygon(id) => vec![MenuAction::DeletePolygon(id)],
            HitTarget::Canvas => Vec::new(),
        };
        signals.push(Signal::ContextMenu { pos, actions });
    }

    fn pointer_move(&mut self, pos: Point, signals: &mut Vec<Signal>) {
        let image_pt = self.transform.to_image(pos);
        if let Some(drag) = &mut self.interaction.drag {
            drag.dx = image_pt.x - drag.grab.x;
            drag.dy = image_pt.y - drag.grab.y;
            signals.push(Signal::OverlayChanged);
        } else if let Some(pan) = &mut self.interaction.pan {
            let dx = pos.x - pan.last_screen.x;
            let dy = pos.y - pan.last_screen.y;
            pan.last_screen = pos;
            self.transform = self.transform.pan_by(dx, dy);
            signals.push(Signal::TransformChanged);
        }
    }

    fn pointer_up(&mut self, signals: &mut Vec<Signal>) {
        self.interaction.pan = None;
        if let Some(drag) = self.interaction.drag.take() {
            signals.push(Signal::OverlayChanged);
            // A press-release with zero net offset is not an edit
            if !drag.has_moved() {
                return;
            }
            let before = self.store.snapshot();
            match self.store.move_vertex(
                &drag.target.polygon_id,
                drag.target.vertex_index,
                drag.current(),
            ) {
                Ok(()) => {
                    self.history.record(before);
                    signals.push(Signal::PolygonsChanged);
                }
                Err(err) => log::warn!("drag commit dropped: {err}"),
            }
        }
    }

    // ========================================================================
    // Keyboard handling
    // ========================================================================

    fn key_down(&mut self, key: Key, signals: &mut Vec<Signal>) {
        if key == Key::Escape {
            if !self.interaction.is_idle() {
                self.interaction.clear();
                signals.push(Signal::OverlayChanged);
            }
            self.change_selection(None, signals);
            self.change_mode(EditMode::View, signals);
            return;
        }
        if key == Key::Enter {
            if self.mode == EditMode::CreatePolygon
                && self.interaction.temp_points.len() >= MIN_POLYGON_POINTS
            {
                self.close_polygon(signals);
            }
            return;
        }
        if key == Key::Delete {
            if let Some(id) = self.store.selected().map(String::from) {
                self.delete_polygon(&id, signals);
            }
            return;
        }

        let bindings = self.config.keybindings.clone();
        if key == bindings.undo {
            let out = self.undo();
            signals.extend(out);
        } else if key == bindings.redo {
            let out = self.redo();
            signals.extend(out);
        } else if let Some(mode) = bindings.mode_for_key(key) {
            let out = self.set_mode(mode);
            signals.extend(out);
        }
    }

    // ========================================================================
    // Gesture execution
    // ========================================================================

    fn begin_drag(&mut self, vertex: VertexRef, grab: Point, signals: &mut Vec<Signal>) {
        let id = vertex.polygon_id.clone();
        let original = self
            .store
            .get(&id)
            .and_then(|p| p.points.get(vertex.vertex_index))
            .copied();
        if let Some(original) = original {
            self.change_selection(Some(&id), signals);
            self.interaction.drag = Some(VertexDrag::new(vertex, original, grab));
            signals.push(Signal::OverlayChanged);
        }
    }

    fn delete_polygon(&mut self, id: &str, signals: &mut Vec<Signal>) {
        let was_selected = self.store.selected() == Some(id);
        let before = self.store.snapshot();
        match self.store.delete_polygon(id) {
            Ok(_) => {
                self.history.record(before);
                signals.push(Signal::PolygonsChanged);
                if was_selected {
                    signals.push(Signal::SelectionChanged(None));
                }
            }
            Err(err) => log::warn!("polygon delete dropped: {err}"),
        }
    }

    fn add_slice_point(&mut self, image_pt: Point, tolerance: f64, signals: &mut Vec<Signal>) {
        let Some(selected) = self.store.selected().map(String::from) else {
            signals.push(Signal::Warning("select a polygon to slice first".to_string()));
            return;
        };
        match self.interaction.slice_start.take() {
            None => {
                self.interaction.slice_start = Some(image_pt);
                signals.push(Signal::OverlayChanged);
            }
            Some(start) => {
                self.attempt_slice(&selected, &start, &image_pt, tolerance, signals);
            }
        }
    }

    fn attempt_slice(
        &mut self,
        id: &str,
        cut_a: &Point,
        cut_b: &Point,
        tolerance: f64,
        signals: &mut Vec<Signal>,
    ) {
        // Both cut points are consumed either way: a failed slice resets
        // the gesture rather than leaving a stale first cut around.
        signals.push(Signal::OverlayChanged);
        let Some(polygon) = self.store.get(id) else {
            log::warn!("slice dropped: polygon '{id}' no longer exists");
            return;
        };
        match slice_polygon(polygon, cut_a, cut_b, tolerance) {
            Ok(children) => {
                let first = children.0.id.clone();
                let before = self.store.snapshot();
                match self.store.replace_with_slice(id, children) {
                    Ok(_) => {
                        self.history.record(before);
                        self.store.select(Some(&first));
                        signals.push(Signal::PolygonsChanged);
                        signals.push(Signal::SelectionChanged(Some(first)));
                        self.change_mode(EditMode::EditVertices, signals);
                    }
                    Err(err) => log::warn!("slice dropped: {err}"),
                }
            }
            Err(err) => {
                signals.push(Signal::Warning(format!("slice failed: {err}")));
            }
        }
    }

    fn begin_add_chain(&mut self, vertex: VertexRef, signals: &mut Vec<Signal>) {
        let id = vertex.polygon_id.clone();
        self.interaction.clear();
        self.interaction.add_start = Some(vertex);
        self.change_selection(Some(&id), signals);
        self.change_mode(EditMode::AddPoints, signals);
        signals.push(Signal::OverlayChanged);
    }

    /// A vertex click in AddPoints mode: the first anchors the chain, the
    /// second splices it into the boundary.
    fn anchor_or_commit_chain(&mut self, vertex: VertexRef, signals: &mut Vec<Signal>) {
        let Some(start) = self.interaction.add_start.take() else {
            let id = vertex.polygon_id.clone();
            self.interaction.add_start = Some(vertex);
            self.change_selection(Some(&id), signals);
            signals.push(Signal::OverlayChanged);
            return;
        };

        if start.polygon_id != vertex.polygon_id {
            self.interaction.add_start = Some(start);
            signals.push(Signal::Warning(
                "the chain must start and end on the same polygon".to_string(),
            ));
            return;
        }
        if self.interaction.temp_points.is_empty() {
            // Nothing drawn yet: treat the click as re-anchoring
            self.interaction.add_start = Some(vertex);
            signals.push(Signal::OverlayChanged);
            return;
        }

        let chain = std::mem::take(&mut self.interaction.temp_points);
        let before = self.store.snapshot();
        match self.store.splice_between(
            &start.polygon_id,
            start.vertex_index,
            vertex.vertex_index,
            &chain,
        ) {
            Ok(()) => {
                self.history.record(before);
                signals.push(Signal::PolygonsChanged);
                signals.push(Signal::OverlayChanged);
                self.change_selection(Some(start.polygon_id.as_str()), signals);
                self.change_mode(EditMode::EditVertices, signals);
            }
            Err(err) => {
                // Keep the chain so the user can pick another end anchor
                self.interaction.temp_points = chain;
                self.interaction.add_start = Some(start);
                signals.push(Signal::Warning(format!("cannot insert points: {err}")));
            }
        }
    }

    fn create_point(&mut self, image_pt: Point, tolerance: f64, signals: &mut Vec<Signal>) {
        let closes = self.interaction.temp_points.len() >= MIN_POLYGON_POINTS
            && self
                .interaction
                .temp_points
                .first()
                .is_some_and(|first| first.distance_to(&image_pt) <= tolerance);
        if closes {
            self.close_polygon(signals);
        } else {
            self.interaction.temp_points.push(image_pt);
            signals.push(Signal::OverlayChanged);
        }
    }

    fn close_polygon(&mut self, signals: &mut Vec<Signal>) {
        if self.interaction.temp_points.len() < MIN_POLYGON_POINTS {
            return;
        }
        let points = std::mem::take(&mut self.interaction.temp_points);
        let before = self.store.snapshot();
        let id = self.store.add_polygon(Polygon::external(points));
        self.history.record(before);
        self.store.select(Some(&id));
        signals.push(Signal::PolygonsChanged);
        signals.push(Signal::SelectionChanged(Some(id)));
        signals.push(Signal::OverlayChanged);
        self.change_mode(EditMode::EditVertices, signals);
    }

    // ========================================================================
    // Hit testing & state helpers
    // ========================================================================

    /// Classify a press, then apply the slice-mode refinement: a press
    /// within snap range of the selected outline counts as a cut point
    /// even when it lands just inside the polygon.
    fn hit_test(&self, point: &Point, tolerance: f64) -> HitTarget {
        if self.mode == EditMode::Slice
            && let Some(polygon) = self.store.selected().and_then(|id| self.store.get(id))
            && geometry::find_closest_segment(point, polygon, tolerance).is_some()
        {
            return HitTarget::Canvas;
        }
        self.classify(point, tolerance)
    }

    /// Plain press classification: vertex beats polygon beats canvas.
    fn classify(&self, point: &Point, tolerance: f64) -> HitTarget {
        if let Some(vertex) = geometry::find_closest_vertex(point, self.store.polygons(), tolerance)
        {
            return HitTarget::Vertex(vertex);
        }
        if let Some(polygon) = geometry::topmost_polygon_at(point, self.store.polygons()) {
            return HitTarget::Polygon(polygon.id.clone());
        }
        HitTarget::Canvas
    }

    /// Apply a selection change and report it if anything changed.
    fn change_selection(&mut self, id: Option<&str>, signals: &mut Vec<Signal>) -> bool {
        let before = self.store.selected().map(String::from);
        self.store.select(id);
        let after = self.store.selected().map(String::from);
        if before == after {
            return false;
        }
        signals.push(Signal::SelectionChanged(after));
        true
    }

    fn change_mode(&mut self, mode: EditMode, signals: &mut Vec<Signal>) {
        if self.mode != mode {
            self.mode = mode;
            log::debug!("mode -> {}", mode.name());
            signals.push(Signal::ModeChanged(mode));
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

fn owner_id(target: &HitTarget) -> Option<String> {
    match target {
        HitTarget::Vertex(vertex) => Some(vertex.polygon_id.clone()),
        HitTarget::Polygon(id) => Some(id.clone()),
        HitTarget::Canvas => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
