use serde::Serialize;

use crate::catalog::SourceRecord;

#[derive(Debug, Clone, Serialize)]
pub struct SourceAdd {
    pub catalog: String,
    pub source: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub filter: Vec<String>,
}

#[derive(Serialize)]
pub struct SourceAddPlan<'a> {
    pub action: &'static str,
    pub source: &'a SourceAdd,
}

#[derive(Serialize)]
pub struct SourceAddResult {
    pub inserted: bool,
    pub source: String,
}

#[derive(Serialize)]
pub struct SourceRmResult {
    pub removed: bool,
    pub source: String,
}

#[derive(Serialize)]
pub struct SourceList {
    pub sources: Vec<SourceRecord>,
}
