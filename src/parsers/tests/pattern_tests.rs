use crate::parsers::{extract, patterns};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_bold_patterns() {
        let answer = "Here are the patterns.\n\n\
            **Pattern 1: Explore homepage**\n- Click nav link\n- Wait 2s\n\
            Expected outcome: user finds product page\n\n\
            **Pattern 2: Scroll browsing**\n- Scroll down\n- Pause";
        let found = extract(answer).patterns;

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].number, 1);
        assert_eq!(found[0].title, "Explore homepage");
        assert_eq!(found[0].steps, vec!["Click nav link", "Wait 2s"]);
        assert_eq!(
            found[0].expected_outcome.as_deref(),
            Some("user finds product page")
        );
        assert_eq!(found[1].number, 2);
        assert_eq!(found[1].title, "Scroll browsing");
        assert_eq!(found[1].steps, vec!["Scroll down", "Pause"]);
        assert_eq!(found[1].expected_outcome, None);
    }

    #[test]
    fn test_no_pattern_markers() {
        let answer = "The site is a simple landing page with a contact form.";
        assert!(patterns::segment(answer).is_empty());
    }

    #[test]
    fn test_numbers_kept_verbatim_and_in_source_order() {
        let answer = "**Pattern 2: Second first**\n- a\n**Pattern 1: First second**\n- b";
        let found = patterns::segment(answer);
        let numbers: Vec<u32> = found.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![2, 1]);
    }

    #[test]
    fn test_repeated_numbers_are_not_deduplicated() {
        let answer = "**Pattern 1: A**\n- a\n**Pattern 1: B**\n- b\n**Pattern 4: C**";
        let found = patterns::segment(answer);
        let numbers: Vec<u32> = found.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 1, 4]);
        assert!(found[2].steps.is_empty());
    }

    #[test]
    fn test_pattern_body_stops_before_final_answer_section() {
        let answer = "**Pattern 1: Reader**\n- Scroll\nFinal Answer: see above";
        let found = patterns::segment(answer);
        assert_eq!(found[0].description, "- Scroll");
    }

    #[test]
    fn test_oversized_number_keeps_its_own_body() {
        let answer = "**Pattern 1: A**\n- a\n**Pattern 99999999999: B**\n- b";
        let found = extract(answer).patterns;

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].number, 1);
        assert_eq!(found[0].steps, vec!["a"]);
    }
}
