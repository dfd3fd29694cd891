use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::Instant;
use tracing::{info, debug, warn, error, Span};

use crate::output::{Emitter, Envelope, Stage};

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.span(ph);
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), phase = ph.name(), "span_start");
        } else {
            info!(op = %self.op_name(), phase = ph.name(), details = %details, "span_start");
        }
        span
    }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }
    pub fn debug(&self, msg: impl AsRef<str>) { if self.json { debug!(op = %self.op_name(), "{}", msg.as_ref()); } else { debug!("{}", msg.as_ref()); } }
    pub fn warn(&self, msg: impl AsRef<str>) { if self.json { warn!(op = %self.op_name(), "{}", msg.as_ref()); } else { warn!("{}", msg.as_ref()); } }
    pub fn error(&self, msg: impl AsRef<str>) { if self.json { error!(op = %self.op_name(), "{}", msg.as_ref()); } else { error!("{}", msg.as_ref()); } }

    pub fn debug_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); debug!(op = %self.op_name(), details = %details, "{}", msg); }
        else { debug!("{}", msg); }
    }

    /// `target` names the catalog, queue or source the envelope is about.
    pub fn plan<T: Serialize>(&self, target: &str, plan: &T) -> Result<()> {
        Emitter::from_env().emit(&Envelope::new(self.op_name(), Stage::Plan, target, plan)?)
    }
    pub fn result<T: Serialize>(&self, target: &str, result: &T) -> Result<()> {
        Emitter::from_env().emit(&Envelope::new(self.op_name(), Stage::Result, target, result)?)
    }
    pub fn result_timed<T: Serialize>(&self, target: &str, result: &T, started: Instant) -> Result<()> {
        Emitter::from_env().emit(&Envelope::new(self.op_name(), Stage::Result, target, result)?.timed(started))
    }
}

// Op-specific summaries stay on the typed contexts
impl LogCtx<crate::telemetry::ops::dispatch::Dispatch> {
    pub fn totals(&self, pages: usize, scanned: usize, enqueued: usize, failed: usize) {
        if self.json { info!(op = %self.op_name(), pages, scanned, enqueued, failed, "dispatch_totals"); }
        else { info!("📊 Dispatch totals — pages={} scanned={} enqueued={} failed={}", pages, scanned, enqueued, failed); }
    }
}

impl LogCtx<crate::telemetry::ops::process::Process> {
    pub fn item_summary(&self, message_id: &str, key: &str, kept: usize, total: usize) {
        if self.json { info!(op = %self.op_name(), message_id, key, kept, total, "item_published"); }
        else { info!("✅ Message {} → {} ({} of {} entries)", message_id, key, kept, total); }
    }

    pub fn batch_totals(&self, received: usize, published: usize, failed: usize) {
        if self.json { info!(op = %self.op_name(), received, published, failed, "batch_totals"); }
        else { info!("📊 Batch totals — received={} published={} failed={}", received, published, failed); }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}
