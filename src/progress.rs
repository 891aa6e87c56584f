//! Loading spinner shown while a lookup blocks on the network
//!
//! The spinner runs as a tokio task that draws a frame every 100ms until it
//! receives a shutdown message. [`Spinner::stop`] waits for the task to
//! finish, so nothing is drawn after it returns.

use std::io::Write;
use std::time::Duration;

use crossterm::{
    cursor::MoveToColumn,
    queue,
    terminal::{Clear, ClearType},
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Animation cycle
pub const FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Delay between two frames
pub const FRAME_INTERVAL: Duration = Duration::from_millis(100);

const LABEL: &str = "Loading...";

/// Handle to a running spinner
///
/// Stopping consumes the handle, so a spinner cannot be stopped twice. If the
/// handle is dropped without calling [`stop`](Self::stop), the shutdown
/// channel closes and the task ends on its own after its current frame.
pub struct Spinner {
    /// Signals the render loop to finish
    shutdown_tx: mpsc::Sender<()>,
    /// The render loop
    task: JoinHandle<()>,
}

impl Spinner {
    /// Spawns the render loop writing to `out`
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<W>(out: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let task = tokio::spawn(render_loop(out, shutdown_rx));
        Self { shutdown_tx, task }
    }

    /// Stops the spinner and waits until its line has been erased
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            debug!("Spinner task ended abnormally: {}", e);
        }
    }
}

async fn render_loop<W: Write>(mut out: W, mut shutdown_rx: mpsc::Receiver<()>) {
    let mut interval = tokio::time::interval(FRAME_INTERVAL);
    let mut frame = 0;

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                break;
            }
            _ = interval.tick() => {
                // Terminal write errors only cost us the animation
                let _ = draw_frame(&mut out, FRAMES[frame]);
                frame = (frame + 1) % FRAMES.len();
            }
        }
    }

    let _ = erase(&mut out);
}

fn draw_frame<W: Write>(out: &mut W, glyph: &str) -> std::io::Result<()> {
    write!(out, "\r{} {}", LABEL, glyph)?;
    out.flush()
}

/// Returns the cursor to column 0 and clears the spinner line
fn erase<W: Write>(out: &mut W) -> std::io::Result<()> {
    queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Writer that records everything into a shared buffer
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_spinner_cycles_through_frames() {
        let buffer = SharedBuffer::default();
        let spinner = Spinner::start(buffer.clone());

        tokio::time::sleep(Duration::from_millis(450)).await;
        spinner.stop().await;

        let output = buffer.contents();
        for glyph in FRAMES {
            assert!(
                output.contains(&format!("\r{} {}", LABEL, glyph)),
                "frame {:?} missing from {:?}",
                glyph,
                output
            );
        }
    }

    #[tokio::test]
    async fn test_no_output_after_stop_returns() {
        let buffer = SharedBuffer::default();
        let spinner = Spinner::start(buffer.clone());

        tokio::time::sleep(Duration::from_millis(250)).await;
        spinner.stop().await;
        let after_stop = buffer.contents();

        tokio::time::sleep(FRAME_INTERVAL * 3).await;
        assert_eq!(buffer.contents(), after_stop, "spinner kept drawing after stop");
    }

    #[tokio::test]
    async fn test_stop_right_after_start_erases_line() {
        let buffer = SharedBuffer::default();
        let spinner = Spinner::start(buffer.clone());
        spinner.stop().await;

        let mut expected_tail = Vec::new();
        erase(&mut expected_tail).unwrap();
        let expected_tail = String::from_utf8(expected_tail).unwrap();

        assert!(buffer.contents().ends_with(&expected_tail));
    }

    #[tokio::test]
    async fn test_dropped_handle_ends_task() {
        let buffer = SharedBuffer::default();
        let spinner = Spinner::start(buffer.clone());
        let Spinner { shutdown_tx, task } = spinner;
        drop(shutdown_tx);

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("task should end once the channel closes")
            .expect("task should not panic");
    }
}
