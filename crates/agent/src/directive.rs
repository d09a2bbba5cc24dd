//! Extraction of `Action: <name>: <argument>` directives.
//!
//! The completion is split on `\n` and each line is matched against
//! `^Action: (\w+): (.*)$`. The first matching line wins; later directives
//! in the same completion are ignored.

use std::sync::LazyLock;

use inkloop_core::tool::ActionRequest;
use regex_lite::Regex;

static ACTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    // literal pattern, always compiles
    Regex::new(r"^Action: (\w+): (.*)$").expect("action pattern")
});

/// The first action directive in `text`, if any.
pub fn parse_action(text: &str) -> Option<ActionRequest> {
    text.split('\n').find_map(|line| {
        let caps = ACTION_LINE.captures(line)?;
        Some(ActionRequest::new(&caps[1], &caps[2]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_name_and_raw_argument() {
        let text = "Thought: I should look the dogs weight using average_dog_weight\n\
                    Action: average_dog_weight: Bulldog\n";
        let action = parse_action(text).unwrap();
        assert_eq!(action.name, "average_dog_weight");
        assert_eq!(action.argument, "Bulldog");
    }

    #[test]
    fn first_match_wins() {
        let text = "Action: calculate: 1 + 1\nAction: average_dog_weight: Collie";
        assert_eq!(parse_action(text).unwrap(), ActionRequest::new("calculate", "1 + 1"));
    }

    #[test]
    fn argument_keeps_inner_colons_and_spaces() {
        let action = parse_action("Action: calculate: (4 * 7) / 3 : ok ").unwrap();
        assert_eq!(action.argument, "(4 * 7) / 3 : ok ");
    }

    #[test]
    fn directive_must_start_the_line() {
        assert!(parse_action("Thought: maybe Action: calculate: 1").is_none());
        assert!(parse_action("  Action: calculate: 1").is_none());
    }

    #[test]
    fn malformed_directives_are_ignored() {
        for text in [
            "Answer: A bulldog weighs 51 lbs",
            "Action: calculate 1 + 1",
            "Action:calculate: 1",
            "Action: two words: x",
            "",
        ] {
            assert!(parse_action(text).is_none(), "{text:?} matched");
        }
    }

    #[test]
    fn empty_argument_is_allowed() {
        let action = parse_action("Action: average_dog_weight: ").unwrap();
        assert_eq!(action.argument, "");
    }
}
