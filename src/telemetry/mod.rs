pub mod config;
pub mod ctx;
pub mod ops;

use ctx::LogCtx;

pub fn init() -> LogCtx<ops::init::Init> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn source() -> LogCtx<ops::source::Source> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn dispatch() -> LogCtx<ops::dispatch::Dispatch> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn process() -> LogCtx<ops::process::Process> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn preview() -> LogCtx<ops::preview::Preview> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
