//! Terminal presentation helpers shared by both roles.
//!
//! All writers are generic over [`AsyncWrite`] so the session tests can
//! capture output in a buffer instead of a real terminal.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::select;

use crate::interrupt::InterruptWatch;
use crate::message::{Message, LINE_ENDINGS};

pub async fn print_line<W>(out: &mut W, text: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

pub async fn banner<W>(out: &mut W, text: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    print_line(out, &format!("*** {text}")).await
}

pub async fn show_message<W>(out: &mut W, message: &Message) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    print_line(out, &message.to_string()).await
}

/// Asks a yes/no question and reads one answer line.
///
/// Only `y` or `Y` (with nothing but the line ending after it) counts as
/// yes; anything else, including end-of-input or an interrupt, is no.
pub async fn prompt_yes_no<R, W>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
    mut interrupt: InterruptWatch,
) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    out.write_all(prompt.as_bytes()).await?;
    out.flush().await?;

    let mut answer = String::new();
    select! {
        read = input.read_line(&mut answer) => {
            if read? == 0 {
                return Ok(false);
            }
            Ok(answer.trim_end_matches(LINE_ENDINGS).eq_ignore_ascii_case("y"))
        }
        _ = interrupt.recv() => Ok(false),
    }
}
