use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::enums::{Facility, Severity};
use crate::structured_data::StructuredData;

/// Header and structured data of one RFC 5424 message.
///
/// ```text
///   <123>1 2018-01-01T00:00:00Z localhost myapp 1 - [x@1 test="1\"2"] msg1
///    └─┬┘  └────────┬─────────┘ └───┬───┘ └─┬─┘ │ │ └───────┬────────┘
///     pri       timestamp          host    app  │ msg_id  structured_data
///                                          proc_id
/// ```
///
/// `None` stands for the nil value `-`. The MSG body after the structured
/// data is not part of the record.
///
/// A parser fills one `Message` in place and reuses it for the next
/// message, so fields must be copied out before parsing again. After a
/// failed parse the content is unspecified.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
  /// Raw PRI value: `facility * 8 + severity`.
  pub pri: u32,
  pub timestamp: Option<DateTime<FixedOffset>>,
  pub host: Option<String>,
  pub app: Option<String>,
  pub proc_id: Option<u64>,
  pub msg_id: Option<String>,
  pub structured_data: StructuredData,
}

impl Message {
  #[must_use]
  pub fn facility(&self) -> Facility {
    Facility::from_code(self.pri >> 3)
  }

  #[must_use]
  pub fn severity(&self) -> Severity {
    Severity::from_code(self.pri & 7)
  }

  /// Return every field to its nil value.
  pub fn reset(&mut self) {
    self.pri = 0;
    self.timestamp = None;
    self.host = None;
    self.app = None;
    self.proc_id = None;
    self.msg_id = None;
    self.structured_data.clear();
  }
}

/// Renders the header back in RFC 5424 syntax, without a MSG body.
/// Quoted values escape `"` and `\`.
impl fmt::Display for Message {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "<{}>1 ", self.pri)?;
    match &self.timestamp {
      Some(ts) => f.write_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))?,
      None => f.write_str("-")?,
    }
    for field in [&self.host, &self.app] {
      write!(f, " {}", field.as_deref().unwrap_or("-"))?;
    }
    match self.proc_id {
      Some(id) => write!(f, " {id}")?,
      None => f.write_str(" -")?,
    }
    write!(f, " {} ", self.msg_id.as_deref().unwrap_or("-"))?;

    if self.structured_data.is_empty() {
      return f.write_str("-");
    }
    for (id, params) in self.structured_data.iter() {
      write!(f, "[{id}")?;
      for (name, value) in params {
        write!(f, " {name}=\"")?;
        for c in value.chars() {
          if c == '"' || c == '\\' {
            f.write_str("\\")?;
          }
          write!(f, "{c}")?;
        }
        f.write_str("\"")?;
      }
      f.write_str("]")?;
    }
    Ok(())
  }
}
