//! Interpreter Process Spawning
//!
//! Launches an interpreter with piped standard streams and bridges them to
//! async code: one reader thread per output stream, one writer thread for
//! stdin.

use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use super::streams::{SessionStreams, SharedTranscript, StreamMessage, StreamSource};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::languages::LaunchCommand;
use crate::models::InterpreterProcess;

/// Spawn an interpreter and wire up its streams
pub fn spawn_interpreter(
    launch: &LaunchCommand,
    session: &SessionConfig,
    transcript: SharedTranscript,
) -> Result<(Child, InterpreterProcess, SessionStreams)> {
    let mut command = Command::new(&launch.program);
    command
        .args(&launch.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if !session.inherit_env {
        command.env_clear();
    }
    command.envs(&session.environment);

    if let Some(dir) = &session.working_directory {
        command.current_dir(dir);
    }

    // Own process group, so a kill also reaches commands the interpreter ran
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut child = command.spawn().map_err(|e| Error::SpawnFailed {
        command: launch.to_string(),
        reason: e.to_string(),
    })?;

    let mut process = InterpreterProcess::new(
        launch.program.to_string_lossy().into_owned(),
        launch.args.clone(),
    );
    process.mark_started(child.id());
    debug!("Spawned interpreter: {}", process);

    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (Some(stdin), Some(stdout), Some(stderr)) = (stdin, stdout, stderr) else {
        // Pipes were requested above, so this only happens on a broken spawn
        let _ = child.kill();
        let _ = child.wait();
        return Err(Error::PipeUnavailable {
            stream: "stdio".to_string(),
        });
    };

    let streams = create_session_streams(stdin, stdout, stderr, transcript);
    Ok((child, process, streams))
}

/// Start the I/O threads for a child's pipes
fn create_session_streams(
    stdin: ChildStdin,
    stdout: impl Read + Send + 'static,
    stderr: impl Read + Send + 'static,
    transcript: SharedTranscript,
) -> SessionStreams {
    // Channel: interpreter output -> async consumer
    let (tx_out, rx_out) = unbounded_channel::<StreamMessage>();
    // Channel: async producer (stdin) -> writer thread
    let (tx_stdin, rx_stdin) = channel::<Vec<u8>>();

    spawn_reader(
        StreamSource::Stdout,
        stdout,
        tx_out.clone(),
        transcript.clone(),
    );
    spawn_reader(StreamSource::Stderr, stderr, tx_out.clone(), transcript);
    spawn_writer(stdin, rx_stdin, tx_out);

    SessionStreams::from_channels(rx_out, tx_stdin)
}

/// Reader thread: forward complete lines until EOF, then report closure
fn spawn_reader(
    source: StreamSource,
    stream: impl Read + Send + 'static,
    tx: UnboundedSender<StreamMessage>,
    transcript: SharedTranscript,
) {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        let mut consecutive_errors = 0;
        const MAX_CONSECUTIVE_ERRORS: u32 = 5;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    debug!("Interpreter {} reached EOF", source);
                    break;
                }
                Ok(_) => {
                    consecutive_errors = 0;
                    let text = line_text(&buf);

                    if let Ok(mut transcript) = transcript.lock() {
                        transcript.push_line(&text);
                    }

                    trace!("{} <- {:?}", source, text);
                    if tx.send(StreamMessage::Line { source, text }).is_err() {
                        debug!("Interpreter {}: receiver dropped, stopping reader", source);
                        return;
                    }
                }
                Err(e) => {
                    if e.kind() == std::io::ErrorKind::Interrupted {
                        continue;
                    }

                    consecutive_errors += 1;
                    warn!(
                        "Interpreter {} read error ({}): {} (attempt {}/{})",
                        source,
                        e.kind(),
                        e,
                        consecutive_errors,
                        MAX_CONSECUTIVE_ERRORS
                    );

                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        break;
                    }
                    std::thread::sleep(std::time::Duration::from_millis(50));
                }
            }
        }

        let _ = tx.send(StreamMessage::Closed(source));
        debug!("Interpreter {} reader thread exiting", source);
    });
}

/// Writer thread: one `write_all` + `flush` per submission
fn spawn_writer(
    mut stdin: ChildStdin,
    rx: Receiver<Vec<u8>>,
    tx: UnboundedSender<StreamMessage>,
) {
    thread::spawn(move || {
        while let Ok(data) = rx.recv() {
            let written = stdin.write_all(&data).and_then(|()| stdin.flush());
            match written {
                Ok(()) => trace!("stdin <- {} bytes", data.len()),
                Err(e) => {
                    warn!("Interpreter stdin write error ({}): {}", e.kind(), e);
                    let _ = tx.send(StreamMessage::WriteFailed(e.to_string()));
                    break;
                }
            }
        }
        debug!("Interpreter writer thread exiting");
    });
}

/// Decode a raw line, dropping its `\n` / `\r\n` terminator
fn line_text(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && raw[end - 1] == b'\r' {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
