/// Implementation of `syslog validate`.
///
/// Parses every line and reports the ones that are not valid RFC 5424.
/// Exits with code 0 when every line parsed and 1 otherwise (the main
/// dispatcher turns `Err` into exit code 1).
///
/// # Output
///
/// ```text
/// ✗ line 3: not RFC 5424
/// ✗ line 7: not RFC 5424
/// ✓ Messages: 10 parsed, 2 invalid
/// ```
use anyhow::{Result, anyhow};

use crate::session::{Line, Session};
use crate::{GlobalOptions, ValidateArgs};

/// Run the `syslog validate` command.
///
/// # Errors
///
/// Returns an error if the input cannot be read, the parser hits a fatal
/// error, or any line is invalid.
pub async fn run(args: &ValidateArgs, options: &GlobalOptions) -> Result<()> {
    let mut session = Session::open(args.file.as_deref(), options).await?;
    let mut body = String::new();
    let mut parsed = 0u64;
    let mut invalid = 0u64;

    while let Some(line) = session.next(&mut body).await? {
        match line {
            Line::Parsed => parsed += 1,
            Line::Rejected => {
                invalid += 1;
                println!("✗ line {}: not RFC 5424", session.line());
                if args.fail_fast {
                    break;
                }
            }
        }
    }
    session.finish().await?;

    let mark = if invalid == 0 { '✓' } else { '✗' };
    println!(
        "{mark} Messages: {parsed} parsed, {invalid} invalid{}",
        if args.fail_fast && invalid > 0 { " (stopped early)" } else { "" }
    );

    if invalid > 0 {
        return Err(anyhow!("validation failed"));
    }
    Ok(())
}
