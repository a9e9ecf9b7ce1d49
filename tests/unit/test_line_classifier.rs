//! Unit tests for output line classification
//!
//! The marker protocol is shared by every adapter; the Python adapter adds
//! prompt filtering on top.

use linecast::languages::markers::{self, active_line_marker, END_OF_EXECUTION};
use linecast::languages::{
    LanguageAdapter, LaunchCommand, PosixShellAdapter, PowerShellAdapter, PythonAdapter,
};
use linecast::process::StreamSource;
use linecast::{Language, LineEvent};

fn adapters() -> Vec<Box<dyn LanguageAdapter>> {
    vec![
        Box::new(PythonAdapter::new(LaunchCommand::new("python3", vec![]))),
        Box::new(PowerShellAdapter::new(LaunchCommand::new("pwsh", vec![]))),
        Box::new(PosixShellAdapter::new(
            Language::Shell,
            LaunchCommand::new("bash", vec![]),
        )),
    ]
}

fn output(text: &str) -> LineEvent {
    LineEvent::OutputText(text.to_string())
}

#[cfg(test)]
mod marker_tests {
    use super::*;

    #[test]
    fn test_active_line_markers() {
        assert_eq!(markers::classify("##active_line1##"), LineEvent::ActiveLine(1));
        assert_eq!(
            markers::classify(&active_line_marker(250)),
            LineEvent::ActiveLine(250)
        );
    }

    #[test]
    fn test_marker_embedded_in_other_text() {
        assert_eq!(
            markers::classify("PS> ##active_line3## trailing"),
            LineEvent::ActiveLine(3)
        );
    }

    #[test]
    fn test_end_marker() {
        assert_eq!(markers::classify(END_OF_EXECUTION), LineEvent::EndOfExecution);
        assert_eq!(
            markers::classify("  ##end_of_execution##  "),
            LineEvent::EndOfExecution
        );
    }

    #[test]
    fn test_malformed_markers_are_output() {
        for text in ["##active_line##", "##active_lineabc##", "##active_line-1##", "##end_of_exec"] {
            assert_eq!(markers::classify(text), output(text), "input: {}", text);
        }
    }

    #[test]
    fn test_ordinary_output() {
        assert_eq!(markers::classify(""), output(""));
        assert_eq!(markers::classify("hello world"), output("hello world"));
        assert_eq!(markers::classify("## heading ##"), output("## heading ##"));
    }

    #[test]
    fn test_strip_marker_lines_keeps_everything_else() {
        let text = format!(
            "{}\nfirst\n{}\nsecond\n{}",
            active_line_marker(1),
            active_line_marker(2),
            END_OF_EXECUTION
        );
        assert_eq!(markers::strip_marker_lines(&text), "first\nsecond");
    }
}

#[cfg(test)]
mod adapter_tests {
    use super::*;

    #[test]
    fn test_every_adapter_understands_markers() {
        for adapter in adapters() {
            assert_eq!(
                adapter.classify_line("##active_line7##"),
                LineEvent::ActiveLine(7),
                "adapter: {}",
                adapter.name()
            );
            assert_eq!(
                adapter.classify_line(END_OF_EXECUTION),
                LineEvent::EndOfExecution,
                "adapter: {}",
                adapter.name()
            );
            assert_eq!(adapter.classify_line("42"), output("42"));
        }
    }

    #[test]
    fn test_python_prompt_echoes_are_discarded() {
        let python = PythonAdapter::new(LaunchCommand::new("python3", vec![]));
        assert_eq!(python.classify_line(">>>"), LineEvent::Discard);
        assert_eq!(python.classify_line(">>> "), LineEvent::Discard);
        assert_eq!(python.classify_line("... ... "), LineEvent::Discard);
    }

    #[test]
    fn test_python_prompts_in_front_of_real_output_are_removed() {
        let python = PythonAdapter::new(LaunchCommand::new("python3", vec![]));
        assert_eq!(
            python.classify_line(">>> ... ##active_line2##"),
            LineEvent::ActiveLine(2)
        );
        assert_eq!(
            python.classify_line(">>> ##end_of_execution##"),
            LineEvent::EndOfExecution
        );
        assert_eq!(
            python.classify_line("... ValueError: boom"),
            output("ValueError: boom")
        );
    }

    #[test]
    fn test_python_keeps_output_that_only_looks_like_a_prompt() {
        let python = PythonAdapter::new(LaunchCommand::new("python3", vec![]));
        assert_eq!(python.classify_line(">>>x"), output(">>>x"));
        assert_eq!(python.classify_line("loading..."), output("loading..."));
    }

    #[test]
    fn test_python_stdout_is_never_treated_as_a_prompt() {
        let python = PythonAdapter::new(LaunchCommand::new("python3", vec![]));
        for text in [">>> x", "...", "... loading", ">>>"] {
            assert_eq!(
                python.classify_output(text, StreamSource::Stdout),
                output(text),
                "input: {}",
                text
            );
        }
        assert_eq!(
            python.classify_output("##active_line4##", StreamSource::Stdout),
            LineEvent::ActiveLine(4)
        );
    }

    #[test]
    fn test_python_stderr_prompts_are_filtered() {
        let python = PythonAdapter::new(LaunchCommand::new("python3", vec![]));
        assert_eq!(
            python.classify_output(">>> ... ", StreamSource::Stderr),
            LineEvent::Discard
        );
        assert_eq!(
            python.classify_output(">>> Traceback (most recent call last):", StreamSource::Stderr),
            output("Traceback (most recent call last):")
        );
    }

    #[test]
    fn test_shells_do_not_filter_prompts() {
        let shell = PosixShellAdapter::new(Language::Shell, LaunchCommand::new("bash", vec![]));
        assert_eq!(shell.classify_line(">>> "), output(">>> "));
        let pwsh = PowerShellAdapter::new(LaunchCommand::new("pwsh", vec![]));
        assert_eq!(pwsh.classify_line("... "), output("... "));
    }
}
