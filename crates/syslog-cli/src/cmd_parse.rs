/// Implementation of `syslog parse`.
///
/// Streams the input through the parser and prints one line per valid
/// message. Invalid lines are logged and skipped.
///
/// # Output
///
/// ```text
/// $ printf '<34>1 2003-10-11T22:14:15.003Z mymachine su - ID47 - hi\n' | syslog parse
/// {"pri":34,"facility":"auth","severity":"crit","timestamp":"2003-10-11T22:14:15.003Z",
///  "host":"mymachine","app":"su","proc_id":null,"msg_id":"ID47","structured_data":{},"msg":"hi"}
///
/// $ ... | syslog parse --format text
/// <34>1 2003-10-11T22:14:15.003Z mymachine su - ID47 - hi
/// ```
use std::collections::BTreeMap;
use std::io::{self, BufWriter, Write};

use anyhow::{Result, bail};
use chrono::SecondsFormat;
use serde::Serialize;
use syslog_types::Message;
use syslog_types::structured_data::Params;

use crate::session::{Line, Session};
use crate::{GlobalOptions, ParseArgs};

/// JSON shape of one message.
#[derive(Serialize)]
struct Record<'a> {
    pri: u32,
    facility: &'static str,
    severity: &'static str,
    timestamp: Option<String>,
    host: Option<&'a str>,
    app: Option<&'a str>,
    proc_id: Option<u64>,
    msg_id: Option<&'a str>,
    structured_data: BTreeMap<&'a str, &'a Params>,
    msg: &'a str,
}

impl<'a> Record<'a> {
    fn new(message: &'a Message, msg: &'a str) -> Self {
        Self {
            pri: message.pri,
            facility: message.facility().name(),
            severity: message.severity().name(),
            timestamp: message
                .timestamp
                .map(|ts| ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            host: message.host.as_deref(),
            app: message.app.as_deref(),
            proc_id: message.proc_id,
            msg_id: message.msg_id.as_deref(),
            structured_data: message.structured_data.iter().collect(),
            msg,
        }
    }
}

/// Run the `syslog parse` command.
///
/// # Errors
///
/// Returns an error for an unknown `--format`, an unreadable input, a
/// fatal parser error, or a failed write to stdout.
pub async fn run(args: &ParseArgs, options: &GlobalOptions) -> Result<()> {
    let json = match args.format.as_str() {
        "json" => true,
        "text" => false,
        other => bail!("unknown format {other:?} (expected json or text)"),
    };

    let mut session = Session::open(args.file.as_deref(), options).await?;
    let mut out = BufWriter::new(io::stdout().lock());
    let mut body = String::new();
    let mut rejected = 0u64;

    while let Some(line) = session.next(&mut body).await? {
        if line == Line::Rejected {
            rejected += 1;
            continue;
        }
        let message = session.parser().message();
        if json {
            serde_json::to_writer(&mut out, &Record::new(message, &body))?;
            writeln!(out)?;
        } else {
            writeln!(out, "{message} {body}")?;
        }
    }
    out.flush()?;

    let lines = session.line();
    session.finish().await?;
    tracing::info!(lines, rejected, "parse finished");
    Ok(())
}
