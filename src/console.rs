// Line-oriented terminal I/O
//
// Stdin is read on its own thread, outside tokio's blocking pool, so a pending read
// never holds up runtime shutdown.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::mpsc;

/// Source of input lines, without their line terminator
#[async_trait]
pub trait LineSource: Send {
    /// `None` at end of input
    async fn next_line(&mut self) -> io::Result<Option<String>>;
}

pub struct StdinLines {
    rx: mpsc::UnboundedReceiver<io::Result<String>>,
}

impl StdinLines {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { rx }
    }
}

#[async_trait]
impl LineSource for StdinLines {
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.rx.recv().await.transpose()
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> LineSource for Lines<R> {
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        Lines::next_line(self).await
    }
}

pub struct Console<L, W> {
    input: L,
    output: W,
}

pub type Terminal = Console<StdinLines, io::Stdout>;

impl Terminal {
    pub fn stdio() -> Self {
        Console::new(StdinLines::spawn(), io::stdout())
    }
}

impl<L: LineSource, W: Write + Send> Console<L, W> {
    pub fn new(input: L, output: W) -> Self {
        Self { input, output }
    }

    /// Print `message` without a newline and read the answer
    pub async fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;
        self.input.next_line().await
    }

    /// Print one line
    pub fn say(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncBufReadExt;

    #[tokio::test]
    async fn test_prompt_and_say() {
        let input: &[u8] = b"first\r\nsecond\n";
        let mut console = Console::new(AsyncBufReadExt::lines(input), Vec::new());

        assert_eq!(console.prompt("> ").await.unwrap().as_deref(), Some("first"));
        console.say("hello").unwrap();
        assert_eq!(console.prompt("> ").await.unwrap().as_deref(), Some("second"));
        assert_eq!(console.prompt("> ").await.unwrap(), None);

        assert_eq!(
            String::from_utf8(console.into_output()).unwrap(),
            "> hello\n> > "
        );
    }
}
