// `--json` output: a single envelope on stdout, logs stay on stderr.

use std::io::{self, Write};

use anyhow::Result;

mod envelope;

pub use envelope::{Envelope, Stage};

pub struct Emitter {
    pretty: bool,
}

impl Emitter {
    /// `RSSFAN_OUTPUT_PRETTY=1|true` indents the document.
    pub fn from_env() -> Self {
        let pretty = std::env::var("RSSFAN_OUTPUT_PRETTY")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Emitter { pretty }
    }

    pub fn write_to(&self, env: &Envelope, w: &mut dyn Write) -> Result<()> {
        if self.pretty { serde_json::to_writer_pretty(&mut *w, env)?; } else { serde_json::to_writer(&mut *w, env)?; }
        writeln!(w)?;
        Ok(())
    }

    pub fn emit(&self, env: &Envelope) -> Result<()> {
        let mut out = io::stdout().lock();
        self.write_to(env, &mut out)?;
        out.flush()?;
        Ok(())
    }
}
