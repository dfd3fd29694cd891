use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Process;

// Mirrors the per-item state machine: received -> parsing -> filtering -> publishing -> acknowledged.
#[derive(Copy, Clone, Debug)]
pub enum Phase { Receive, Item, Parse, Filter, Publish, Ack }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Receive => "receive",
        Phase::Item => "item",
        Phase::Parse => "parse",
        Phase::Filter => "filter",
        Phase::Publish => "publish",
        Phase::Ack => "ack",
    }}
    fn span(&self) -> Span { match self {
        Phase::Receive => info_span!("receive"),
        Phase::Item => info_span!("item"),
        Phase::Parse => info_span!("parse"),
        Phase::Filter => info_span!("filter"),
        Phase::Publish => info_span!("publish"),
        Phase::Ack => info_span!("ack"),
    }}
}

impl OpMarker for Process {
    const NAME: &'static str = "process";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("process") }
}
