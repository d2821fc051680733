//! The editor controller.
//!
//! [`Editor`] owns the diagram and all interaction state, and turns pointer
//! and keyboard events into calls on the drawing machine, the selection and
//! the viewport. Event positions are screen coordinates; the editor converts
//! them to canvas coordinates before anything else sees them.

use std::path::Path;

use log::{debug, info};

use tailrace_core::geometry::Point;

use crate::{
    config::AppConfig,
    diagnostic::{Diagnostic, DiagnosticCode},
    drawing::{CandidateEdge, ClickOutcome, DrawingMachine},
    error::{DrawingError, ModelError, TailraceError},
    model::{Diagram, EdgeDetails, EdgeId, EdgePatch, NodeId, NodePatch, NodeSpec},
    persistence,
    render::{FrameContext, Renderer, Scene, SinkPolicy, Viewport},
    selection::{DeleteReport, Selection},
};

/// What primary clicks do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorMode {
    /// Clicks select; dragging a selected node moves it.
    #[default]
    Select,
    /// Clicks draw edges.
    Connect,
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    /// Cancels drawing, otherwise clears the selection.
    Escape,
    /// Removes the last waypoint while drawing.
    Backspace,
    Delete,
    SelectAll,
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

/// Input events, positions in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorEvent {
    /// Primary button pressed. `toggle` is set while the multi-select
    /// modifier is held.
    PointerDown { position: Point, toggle: bool },
    /// Secondary button pressed. Drops the path being drawn or the edge
    /// waiting for details.
    SecondaryDown { position: Point },
    PointerMove { position: Point },
    PointerUp { position: Point },
    Key(EditorKey),
    /// Wheel zoom; positive `delta` zooms in around `position`.
    Wheel { delta: f32, position: Point },
    /// Pans the view by `delta` pixels.
    Scroll { delta: Point },
}

/// How the caller should react to an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorResponse {
    /// Nothing visible changed.
    None,
    /// The scene must be redrawn.
    Redraw,
    /// A drawn path is complete. The caller collects [`EdgeDetails`] and
    /// resumes with [`Editor::submit_edge_details`] or
    /// [`Editor::abandon_edge_details`].
    EdgeDetailsRequested(CandidateEdge),
    /// Elements were deleted.
    Deleted(DeleteReport),
}

/// All state of one editing session.
#[derive(Debug, Clone)]
pub struct Editor {
    diagram: Diagram,
    selection: Selection,
    drawing: DrawingMachine,
    viewport: Viewport,
    config: AppConfig,
    renderer: Renderer,
    mode: EditorMode,
    load_warnings: Vec<Diagnostic>,
    dirty: bool,
}

impl Editor {
    /// Creates an editor with an empty diagram.
    ///
    /// # Errors
    ///
    /// Returns [`TailraceError::Config`] if the render section names an
    /// invalid color.
    pub fn new(config: AppConfig) -> Result<Self, TailraceError> {
        let renderer = Renderer::new(config.render().clone(), SinkPolicy::from(config.sink()))?;
        Ok(Self {
            diagram: Diagram::default(),
            selection: Selection::new(),
            drawing: DrawingMachine::new(),
            viewport: Viewport::from_config(config.render()),
            config,
            renderer,
            mode: EditorMode::default(),
            load_warnings: Vec::new(),
            dirty: false,
        })
    }

    /// Replaces the diagram, resetting selection and drawing state.
    pub fn with_diagram(mut self, diagram: Diagram) -> Self {
        self.replace_diagram(diagram, Vec::new());
        self
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn drawing(&self) -> &DrawingMachine {
        &self.drawing
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Returns `true` if the diagram changed since it was opened or saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Switches the click mode. Leaving connect mode drops any path in
    /// progress.
    pub fn set_mode(&mut self, mode: EditorMode) {
        if self.mode == mode {
            return;
        }
        if mode == EditorMode::Select {
            self.drawing.cancel();
            self.drawing.abandon();
        } else {
            self.selection.end_drag();
        }
        debug!(mode:? = mode; "Editor mode changed");
        self.mode = mode;
    }

    /// Handles one input event.
    pub fn handle(&mut self, event: EditorEvent) -> Result<EditorResponse, TailraceError> {
        match event {
            EditorEvent::PointerDown { position, toggle } => {
                let point = self.viewport.screen_to_canvas(position);
                Ok(self.pointer_down(point, toggle))
            }
            EditorEvent::SecondaryDown { .. } => {
                Ok(if self.drawing.cancel() || self.drawing.abandon() {
                    EditorResponse::Redraw
                } else {
                    EditorResponse::None
                })
            }
            EditorEvent::PointerMove { position } => {
                let point = self.viewport.screen_to_canvas(position);
                self.pointer_move(point)
            }
            EditorEvent::PointerUp { .. } => Ok(if self.selection.end_drag() {
                EditorResponse::Redraw
            } else {
                EditorResponse::None
            }),
            EditorEvent::Key(key) => self.key(key),
            EditorEvent::Wheel { delta, position } => {
                if delta == 0.0 {
                    return Ok(EditorResponse::None);
                }
                let step = self.config.render().zoom_step();
                let factor = if delta > 0.0 { step } else { 1.0 / step };
                self.viewport.zoom_at(factor, position);
                Ok(EditorResponse::Redraw)
            }
            EditorEvent::Scroll { delta } => {
                self.viewport.scroll_by(delta);
                Ok(EditorResponse::Redraw)
            }
        }
    }

    fn pointer_down(&mut self, point: Point, toggle: bool) -> EditorResponse {
        if self.drawing.candidate().is_some() {
            return EditorResponse::None;
        }
        let tolerance = self.config.selection().edge_tolerance();
        let graph = self.diagram.graph();

        match self.mode {
            EditorMode::Connect => {
                match self.drawing.click(graph, self.config.snap(), point) {
                    ClickOutcome::Ignored => EditorResponse::None,
                    ClickOutcome::Started(_) | ClickOutcome::WaypointAdded(_) => {
                        EditorResponse::Redraw
                    }
                    ClickOutcome::AwaitingDetails => match self.drawing.candidate() {
                        Some(candidate) => EditorResponse::EdgeDetailsRequested(candidate.clone()),
                        None => EditorResponse::Redraw,
                    },
                }
            }
            EditorMode::Select if toggle => {
                self.selection.toggle_edge_at(graph, point, tolerance);
                EditorResponse::Redraw
            }
            EditorMode::Select => {
                self.selection.select_at(graph, point, tolerance);
                self.selection.begin_drag(graph, point);
                EditorResponse::Redraw
            }
        }
    }

    fn pointer_move(&mut self, point: Point) -> Result<EditorResponse, TailraceError> {
        if self.drawing.is_drawing() {
            self.drawing.hover(point);
            return Ok(EditorResponse::Redraw);
        }
        if self.selection.drag_to(self.diagram.graph_mut(), point)? {
            self.dirty = true;
            return Ok(EditorResponse::Redraw);
        }
        Ok(EditorResponse::None)
    }

    fn key(&mut self, key: EditorKey) -> Result<EditorResponse, TailraceError> {
        let response = match key {
            EditorKey::Escape => {
                if !(self.drawing.cancel() || self.drawing.abandon()) {
                    self.selection.clear();
                }
                EditorResponse::Redraw
            }
            EditorKey::Backspace => match self.drawing.undo_waypoint() {
                Some(_) => EditorResponse::Redraw,
                None => EditorResponse::None,
            },
            EditorKey::Delete => {
                if !self.drawing.is_idle() {
                    return Ok(EditorResponse::None);
                }
                let report = self.selection.delete_selection(self.diagram.graph_mut())?;
                if report.is_empty() {
                    EditorResponse::None
                } else {
                    self.dirty = true;
                    EditorResponse::Deleted(report)
                }
            }
            EditorKey::SelectAll => {
                self.selection.select_all_edges(self.diagram.graph());
                EditorResponse::Redraw
            }
            EditorKey::ZoomIn => {
                let zoom = self.viewport.zoom() * self.config.render().zoom_step();
                self.viewport.set_zoom(zoom);
                EditorResponse::Redraw
            }
            EditorKey::ZoomOut => {
                let zoom = self.viewport.zoom() / self.config.render().zoom_step();
                self.viewport.set_zoom(zoom);
                EditorResponse::Redraw
            }
            EditorKey::ZoomReset => {
                self.viewport.reset_zoom();
                EditorResponse::Redraw
            }
        };
        Ok(response)
    }

    /// Commits the edge waiting for details.
    ///
    /// The drawing machine is idle afterwards whether or not the commit
    /// succeeds; a failed commit leaves the diagram unchanged.
    pub fn submit_edge_details(&mut self, details: EdgeDetails) -> Result<EdgeId, DrawingError> {
        let id = self.drawing.complete(self.diagram.graph_mut(), details)?;
        self.dirty = true;
        Ok(id)
    }

    /// Discards the edge waiting for details.
    pub fn abandon_edge_details(&mut self) -> bool {
        self.drawing.abandon()
    }

    pub fn add_node(&mut self, spec: NodeSpec) -> Result<NodeId, ModelError> {
        let id = self.diagram.graph_mut().add_node(spec)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn update_node(&mut self, id: &str, patch: &NodePatch) -> Result<(), ModelError> {
        self.diagram.graph_mut().update_node(id, patch)?;
        self.dirty = true;
        Ok(())
    }

    pub fn update_edge(&mut self, id: &str, patch: &EdgePatch) -> Result<(), ModelError> {
        self.diagram.graph_mut().update_edge(id, patch)?;
        self.dirty = true;
        Ok(())
    }

    /// Volume entry point for the external volume loader. Call
    /// [`Editor::notify_data_changed`] once a batch of updates is done.
    pub fn update_edge_volume(&mut self, id: &str, volume: Option<f64>) -> Result<(), ModelError> {
        self.diagram.graph_mut().update_edge_volume(id, volume)?;
        self.dirty = true;
        Ok(())
    }

    /// Reconciles interaction state after the diagram changed outside an
    /// event handler.
    pub fn notify_data_changed(&mut self) -> EditorResponse {
        self.selection.prune(self.diagram.graph());
        EditorResponse::Redraw
    }

    /// Draws the current frame: the diagram at the viewport zoom, with the
    /// selection and any path in progress.
    pub fn render(&self) -> Scene {
        let preview = self.drawing.preview();
        let mut frame = FrameContext::new(self.viewport.zoom()).with_selection(&self.selection);
        if let Some(preview) = &preview {
            frame = frame.with_preview(preview);
        }
        self.renderer.render(self.diagram.graph(), &frame)
    }

    /// Loads a diagram file and makes it current. On error the current
    /// diagram is kept.
    ///
    /// Returns the diagnostics of the loaded diagram.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<Vec<Diagnostic>, TailraceError> {
        let (diagram, diagnostics) = persistence::load_file(path)?;
        let load_warnings = diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.code() == DiagnosticCode::W101)
            .cloned()
            .collect();
        self.replace_diagram(diagram, load_warnings);
        Ok(diagnostics)
    }

    /// Saves the diagram atomically.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), TailraceError> {
        persistence::save_file(path, &self.diagram)?;
        self.dirty = false;
        Ok(())
    }

    /// Warnings from the last load followed by the diagram's current
    /// consistency warnings.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let tolerance = self.config.snap().junction_radius();
        self.load_warnings
            .iter()
            .cloned()
            .chain(self.diagram.diagnostics_with_tolerance(tolerance))
            .collect()
    }

    fn replace_diagram(&mut self, diagram: Diagram, load_warnings: Vec<Diagnostic>) {
        info!(
            nodes = diagram.graph().node_count(),
            edges = diagram.graph().edge_count();
            "Diagram opened in editor"
        );
        self.diagram = diagram;
        self.load_warnings = load_warnings;
        self.selection = Selection::new();
        self.drawing = DrawingMachine::new();
        self.dirty = false;
    }
}
