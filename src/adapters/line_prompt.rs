use async_trait::async_trait;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};

use crate::ports::prompt::{InteractivePrompt, PromptError, PromptResult};

/// Line based prompt over any async reader / writer pair.
///
/// The binary uses stdin / stdout; tests feed a byte slice and capture a `Vec<u8>`.
pub struct LinePrompt<R, W> {
    reader: R,
    writer: W,
}

impl LinePrompt<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LinePrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    async fn next_line(&mut self) -> PromptResult<String> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(PromptError::InputExhausted);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn write(&mut self, text: &str) -> PromptResult<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<R, W> InteractivePrompt for LinePrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn present(&mut self, title: &str, choices: &[String]) -> PromptResult<()> {
        let mut listing = format!("{title}:\n");
        for (i, choice) in choices.iter().enumerate() {
            listing.push_str(&format!("[{}] {}\n", i + 1, choice));
        }
        self.write(&listing).await
    }

    async fn select_index(&mut self, count: usize) -> PromptResult<usize> {
        self.write("enter number > ").await?;
        loop {
            let line = self.next_line().await?;
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => {
                    self.write(&format!("You selected: {n}\n")).await?;
                    return Ok(n);
                }
                Ok(n) => {
                    self.write(&format!("[{n}] is unknown number. enter number > "))
                        .await?
                }
                Err(_) => {
                    self.write(&format!("[{line}] is illegal format. enter number > "))
                        .await?
                }
            }
        }
    }

    async fn read_line(&mut self, label: &str) -> PromptResult<String> {
        self.write(&format!("enter {label} > ")).await?;
        self.next_line().await
    }
}
