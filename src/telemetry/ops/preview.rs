use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Preview;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Parse, Filter, Render }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Parse => "parse", Phase::Filter => "filter", Phase::Render => "render" } }
    fn span(&self) -> Span { match self { Phase::Parse => info_span!("parse"), Phase::Filter => info_span!("filter"), Phase::Render => info_span!("render") } }
}

impl OpMarker for Preview {
    const NAME: &'static str = "preview";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("preview") }
}
