use std::fmt;

// ── Macro for priority-code enum boilerplate ──────────────────────────
//
// Facility and severity are both fixed tables of named codes decoded from
// the PRI value. Out-of-range codes are not an error: they decode to an
// extra `Unknown` variant the macro appends.

macro_rules! code_enum {
  (
    $(#[$meta:meta])*
    pub enum $name:ident {
      $( $(#[$vmeta:meta])* $variant:ident = $code:literal => $label:literal ),+ $(,)?
    }
  ) => {
    $(#[$meta])*
    pub enum $name {
      $( $(#[$vmeta])* $variant, )+
      /// A code outside the defined range.
      Unknown,
    }

    impl $name {
      /// Map a numeric code to its variant, `Unknown` when out of range.
      #[must_use]
      pub fn from_code(code: u32) -> Self {
        match code {
          $( $code => Self::$variant, )+
          _ => Self::Unknown,
        }
      }

      /// The numeric code, or `None` for `Unknown`.
      #[must_use]
      pub fn code(self) -> Option<u8> {
        match self {
          $( Self::$variant => Some($code), )+
          Self::Unknown => None,
        }
      }

      /// Conventional lower-case keyword, as used by syslog daemons.
      #[must_use]
      pub fn name(self) -> &'static str {
        match self {
          $( Self::$variant => $label, )+
          Self::Unknown => "unknown",
        }
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
      }
    }
  };
}

// ── Facility ──────────────────────────────────────────────────────────

code_enum! {
  /// Originating subsystem, `PRI >> 3`.
  ///
  /// ```text
  /// ┌──────┬──────────┐   ┌──────┬──────────┐
  /// │ Code │ Facility │   │ Code │ Facility │
  /// ├──────┼──────────┤   ├──────┼──────────┤
  /// │  0   │ kern     │   │ 12   │ ntp      │
  /// │  1   │ user     │   │ 13   │ security │
  /// │  2   │ mail     │   │ 14   │ console  │
  /// │  3   │ daemon   │   │ 15   │ cron2    │
  /// │  4   │ auth     │   │ 16   │ local0   │
  /// │  5   │ syslog   │   │ ...  │ ...      │
  /// │ ...  │ ...      │   │ 23   │ local7   │
  /// └──────┴──────────┘   └──────┴──────────┘
  /// ```
  #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
  pub enum Facility {
    Kern = 0 => "kern",
    User = 1 => "user",
    Mail = 2 => "mail",
    Daemon = 3 => "daemon",
    Auth = 4 => "auth",
    Syslog = 5 => "syslog",
    Lpr = 6 => "lpr",
    News = 7 => "news",
    Uucp = 8 => "uucp",
    Cron = 9 => "cron",
    AuthPriv = 10 => "authpriv",
    Ftp = 11 => "ftp",
    Ntp = 12 => "ntp",
    /// Log audit.
    Security = 13 => "security",
    /// Log alert.
    Console = 14 => "console",
    /// Clock daemon.
    Cron2 = 15 => "cron2",
    Local0 = 16 => "local0",
    Local1 = 17 => "local1",
    Local2 = 18 => "local2",
    Local3 = 19 => "local3",
    Local4 = 20 => "local4",
    Local5 = 21 => "local5",
    Local6 = 22 => "local6",
    Local7 = 23 => "local7",
  }
}

// ── Severity ──────────────────────────────────────────────────────────

code_enum! {
  /// Message severity, `PRI & 7`. Lower codes are more severe.
  #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
  pub enum Severity {
    Emerg = 0 => "emerg",
    Alert = 1 => "alert",
    Crit = 2 => "crit",
    Err = 3 => "err",
    Warning = 4 => "warning",
    Notice = 5 => "notice",
    Info = 6 => "info",
    Debug = 7 => "debug",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pri_123_is_cron2_err() {
    assert_eq!(Facility::from_code(123 >> 3), Facility::Cron2);
    assert_eq!(Severity::from_code(123 & 7), Severity::Err);
  }

  #[test]
  fn out_of_range_is_unknown() {
    assert_eq!(Facility::from_code(24), Facility::Unknown);
    assert_eq!(Facility::Unknown.code(), None);
    assert_eq!(Severity::from_code(8), Severity::Unknown);
  }

  #[test]
  fn codes_and_names_line_up() {
    for code in 0..24 {
      let facility = Facility::from_code(code);
      assert_eq!(facility.code().map(u32::from), Some(code));
    }
    assert_eq!(Facility::Local7.to_string(), "local7");
    assert_eq!(Severity::Warning.name(), "warning");
  }
}
