use log::warn;

use tailrace_core::geometry::project_onto_polyline;

use crate::{
    diagnostic::{Diagnostic, DiagnosticCode},
    model::{ElementRef, Graph},
    snap::SnapConfig,
};

/// A complete diagram: header fields plus the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagram {
    area_code: String,
    title: String,
    graph: Graph,
}

impl Diagram {
    pub fn new(area_code: impl Into<String>, title: impl Into<String>, graph: Graph) -> Self {
        Self {
            area_code: area_code.into(),
            title: title.into(),
            graph,
        }
    }

    pub fn area_code(&self) -> &str {
        &self.area_code
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_area_code(&mut self, area_code: impl Into<String>) {
        self.area_code = area_code.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Data-quality warnings using the default junction radius.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics_with_tolerance(SnapConfig::default().junction_radius())
    }

    /// Data-quality warnings for junction edges.
    ///
    /// Reports `W201` for junction edges without a host and `W202` for
    /// junctions lying further than `tolerance` from their host's route.
    pub fn diagnostics_with_tolerance(&self, tolerance: f32) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for edge in self.graph.edges() {
            let Some(junction) = edge.to().junction() else {
                continue;
            };
            let element = ElementRef::Edge(edge.id().clone());

            let Some(host) = junction.host().and_then(|host| self.graph.edge(host.as_str())) else {
                warn!(edge = edge.id().as_str(), to = junction.reference(); "Junction edge has no host");
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::W201,
                        format!(
                            "junction edge `{}` ends on `{}`, which is not an edge in this diagram",
                            edge.id(),
                            junction.reference()
                        ),
                    )
                    .with_element(element),
                );
                continue;
            };

            let route = self.graph.route(host);
            let off_path = project_onto_polyline(&route, junction.position())
                .is_none_or(|projection| projection.distance > tolerance);
            if off_path {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::W202,
                        format!(
                            "junction of edge `{}` is no longer on edge `{}`",
                            edge.id(),
                            host.id()
                        ),
                    )
                    .with_element(element),
                );
            }
        }
        diagnostics
    }
}
