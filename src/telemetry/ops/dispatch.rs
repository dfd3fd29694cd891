use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Dispatch;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, ScanPage, Record, Publish }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::ScanPage => "scan_page",
        Phase::Record => "record",
        Phase::Publish => "publish",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::ScanPage => info_span!("scan_page"),
        Phase::Record => info_span!("record"),
        Phase::Publish => info_span!("publish"),
    }}
}

impl OpMarker for Dispatch {
    const NAME: &'static str = "dispatch";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("dispatch") }
}
