//! Property-based tests for output line classification
//!
//! Arbitrary interpreter output must classify without panicking, and text
//! that carries no marker must come back unchanged as output.

use linecast::languages::markers::{self, active_line_marker, END_OF_EXECUTION};
use linecast::languages::{LanguageAdapter, LaunchCommand, PythonAdapter};
use linecast::LineEvent;
use proptest::prelude::*;

fn python() -> PythonAdapter {
    PythonAdapter::new(LaunchCommand::new("python3", vec![]))
}

proptest! {
    #[test]
    fn test_classify_never_panics(s in "\\PC*") {
        let _ = markers::classify(&s);
        let _ = python().classify_line(&s);
    }

    #[test]
    fn test_marker_number_survives_surrounding_text(
        line in 1usize..1_000_000,
        before in "[a-z >.]{0,20}",
        after in "[a-z ]{0,20}",
    ) {
        let text = format!("{}{}{}", before, active_line_marker(line), after);
        prop_assert_eq!(markers::classify(&text), LineEvent::ActiveLine(line));
    }

    #[test]
    fn test_text_without_markers_is_output(s in "[a-zA-Z0-9 #_.,:;()\\[\\]{}'\"-]{0,200}") {
        prop_assume!(!s.contains("##active_line") && !s.contains(END_OF_EXECUTION));
        prop_assert_eq!(markers::classify(&s), LineEvent::OutputText(s.clone()));
    }

    #[test]
    fn test_end_marker_anywhere_ends_the_turn(before in "[a-z ]{0,20}", after in "[a-z ]{0,20}") {
        let text = format!("{}{}{}", before, END_OF_EXECUTION, after);
        prop_assert_eq!(markers::classify(&text), LineEvent::EndOfExecution);
    }

    #[test]
    fn test_python_output_without_prompts_is_untouched(s in "[a-zA-Z0-9 =+*/]{1,100}") {
        prop_assume!(!s.trim_start().starts_with(">>>") && !s.trim_start().starts_with("..."));
        prop_assert_eq!(python().classify_line(&s), LineEvent::OutputText(s.clone()));
    }

    #[test]
    fn test_python_prompt_only_lines_are_discarded(prompts in prop::collection::vec(prop_oneof![Just(">>>"), Just("...")], 1..5)) {
        let line = format!("{} ", prompts.join(" "));
        prop_assert_eq!(python().classify_line(&line), LineEvent::Discard);
    }
}
