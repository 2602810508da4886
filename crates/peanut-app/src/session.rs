//! Line-oriented conversation loop.
//!
//! Each input line stands in for one speech-to-text result and each output
//! line for one spoken reply. Interim replies are followed by waiting for the
//! resolver's final reply before the next line is read.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use peanut_core::error::PeanutError;
use peanut_dialogue::{normalize_utterance, DialogueEngine, DialogueError};

pub const LISTENING_PROMPT: &str = "Hi, I'm Peanut. I'm listening.";
pub const REPEAT_PROMPT: &str = "I didn't catch that. Could you please repeat?";
pub const TOO_LONG_PROMPT: &str = "That was a bit long for me. Could you say it more briefly?";
pub const STOP_MESSAGE: &str = "Goodbye! Stopping Peanut service.";

/// Restart the conversation with fresh dialogue state.
pub const RESET_COMMAND: &str = "/reset";
/// Stop the assistant.
pub const QUIT_COMMAND: &str = "/quit";

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user said goodbye.
    Farewell,
    /// The quit command was entered.
    Quit,
    /// Input reached end of file.
    InputClosed,
}

/// Drives a [`DialogueEngine`] from a line reader.
pub struct Session<R, W> {
    engine: DialogueEngine,
    input: R,
    output: W,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(engine: DialogueEngine, input: R, output: W) -> Self {
        Self {
            engine,
            input,
            output,
        }
    }

    async fn speak(&mut self, text: &str) -> Result<(), PeanutError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }

    /// Run until farewell, quit, or end of input.
    pub async fn run(&mut self) -> Result<SessionEnd, PeanutError> {
        self.speak(LISTENING_PROMPT).await?;
        let mut line = String::new();

        loop {
            line.clear();
            if self.input.read_line(&mut line).await? == 0 {
                tracing::info!("Input closed");
                return Ok(SessionEnd::InputClosed);
            }

            let utterance = normalize_utterance(&line);
            match utterance.as_str() {
                "" => {
                    self.speak(REPEAT_PROMPT).await?;
                    continue;
                }
                RESET_COMMAND => {
                    self.engine.reset_conversation();
                    self.speak(LISTENING_PROMPT).await?;
                    continue;
                }
                QUIT_COMMAND => {
                    self.speak(STOP_MESSAGE).await?;
                    return Ok(SessionEnd::Quit);
                }
                _ => {}
            }

            let reply = match self.engine.process_turn(&utterance) {
                Ok(reply) => reply,
                Err(DialogueError::UtteranceTooLong { len, max }) => {
                    tracing::warn!(len, max, "Utterance rejected as too long");
                    self.speak(TOO_LONG_PROMPT).await?;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            tracing::debug!(intent = %reply.intent, kind = ?reply.kind, "Turn handled");
            self.speak(&reply.text).await?;

            if reply.kind.expects_async_reply() {
                if let Some(done) = self.engine.next_async_reply().await {
                    self.speak(&done.text).await?;
                }
            } else if !reply.kind.keeps_listening() {
                return Ok(SessionEnd::Farewell);
            }
        }
    }
}
