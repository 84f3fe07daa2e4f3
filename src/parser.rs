use crate::models::{deadline_to_date, Priority};
use chrono::{Duration, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, PartialEq)]
pub struct ParsedTask {
    pub title: String,
    pub priority: Option<Priority>,
    pub deadline: Option<NaiveDate>,
}

fn priority_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(^|\s)!(\w+)").expect("priority pattern"))
}

fn deadline_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(^|\s)@(\S+)").expect("deadline pattern"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern"))
}

/// Pulls `!priority` and `@deadline` tokens out of a quick-add title.
/// The first recognised token of each kind wins; unrecognised `!` tokens are
/// dropped, unrecognised `@` tokens stay in the title.
pub fn parse_task_input(input: &str, today: NaiveDate) -> ParsedTask {
    let mut priority = None;

    // Priority
    for caps in priority_re().captures_iter(input) {
        if let Some(token) = caps.get(2) {
            if let Some(p) = Priority::from_token(token.as_str()) {
                if priority.is_none() {
                    priority = Some(p);
                }
            }
        }
    }
    let title = priority_re().replace_all(input, "$1");

    // Deadline
    let mut deadline = None;
    let title = deadline_re().replace_all(&title, |caps: &regex::Captures| {
        let token = &caps[2];
        match parse_deadline(token, today) {
            Some(date) => {
                if deadline.is_none() {
                    deadline = Some(date);
                }
                caps[1].to_string()
            }
            None => caps[0].to_string(),
        }
    });

    let title = whitespace_re().replace_all(&title, " ").trim().to_string();

    ParsedTask {
        title,
        priority,
        deadline,
    }
}

/// Accepts `today`, `tomorrow`, `yesterday`, `+N`, `+Nd`, `+Nw`, `YYYY-MM-DD`
/// or an ISO timestamp.
pub fn parse_deadline(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let input = input.trim().to_ascii_lowercase();
    match input.as_str() {
        "today" => return Some(today),
        "tomorrow" => return today.succ_opt(),
        "yesterday" => return today.pred_opt(),
        _ => {}
    }

    if let Some(offset) = input.strip_prefix('+') {
        let (digits, unit_days) = match offset.strip_suffix('w') {
            Some(weeks) => (weeks, 7),
            None => (offset.strip_suffix('d').unwrap_or(offset), 1),
        };
        let amount = digits.parse::<i64>().ok()?;
        let offset = Duration::try_days(amount.checked_mul(unit_days)?)?;
        return today.checked_add_signed(offset);
    }

    match input.as_bytes().get(10) {
        None | Some(b't') => deadline_to_date(&input),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_parse_with_priority_in_middle() {
        let input = "Update !high software documentation";
        let expected = ParsedTask {
            title: "Update software documentation".to_string(),
            priority: Some(Priority::High),
            deadline: None,
        };
        let result = parse_task_input(input, today());
        assert_eq!(result, expected);
    }

    #[test]
    fn test_parse_with_extra_spaces_after_priority() {
        let input = "Fix bugs !2    in the code";
        let result = parse_task_input(input, today());
        assert_eq!(result.title, "Fix bugs in the code");
        assert_eq!(result.priority, Some(Priority::Medium));
    }

    #[test]
    fn test_parse_with_multiple_spaces_between_words() {
        let input = "Write   tests !low for the   parser";
        let result = parse_task_input(input, today());
        assert_eq!(result.title, "Write tests for the parser");
        assert_eq!(result.priority, Some(Priority::Low));
    }

    #[test]
    fn test_parse_with_multiple_priorities_and_spaces() {
        let input = "  !high  !low Organize    team building !med event ";
        let result = parse_task_input(input, today());
        assert_eq!(result.title, "Organize team building event");
        assert_eq!(result.priority, Some(Priority::High));
    }

    #[test]
    fn test_parse_with_invalid_priority_and_spaces() {
        let input = "Check logs !urgent    immediately";
        let result = parse_task_input(input, today());
        assert_eq!(result.title, "Check logs immediately");
        assert_eq!(result.priority, None);
    }

    #[test]
    fn test_exclamation_inside_word_is_kept() {
        let result = parse_task_input("Say hi!", today());
        assert_eq!(result.title, "Say hi!");
        assert_eq!(result.priority, None);
    }

    #[test]
    fn test_parse_deadline_token() {
        let result = parse_task_input("Pay rent @tomorrow !high", today());
        assert_eq!(result.title, "Pay rent");
        assert_eq!(result.deadline, NaiveDate::from_ymd_opt(2026, 10, 20));
        assert_eq!(result.priority, Some(Priority::High));
    }

    #[test]
    fn test_parse_deadline_iso_token_at_start() {
        let result = parse_task_input("@2026-12-24 wrap presents", today());
        assert_eq!(result.title, "wrap presents");
        assert_eq!(result.deadline, NaiveDate::from_ymd_opt(2026, 12, 24));
    }

    #[test]
    fn test_unrecognised_at_token_and_emails_stay() {
        let result = parse_task_input("Email bob@example.com @someday", today());
        assert_eq!(result.title, "Email bob@example.com @someday");
        assert_eq!(result.deadline, None);
    }

    #[test]
    fn test_parse_deadline_keywords_and_offsets() {
        let t = today();
        assert_eq!(parse_deadline("today", t), Some(t));
        assert_eq!(parse_deadline("Tomorrow", t), NaiveDate::from_ymd_opt(2026, 10, 20));
        assert_eq!(parse_deadline("yesterday", t), NaiveDate::from_ymd_opt(2026, 10, 18));
        assert_eq!(parse_deadline("+3", t), NaiveDate::from_ymd_opt(2026, 10, 22));
        assert_eq!(parse_deadline("+3d", t), NaiveDate::from_ymd_opt(2026, 10, 22));
        assert_eq!(parse_deadline("+2w", t), NaiveDate::from_ymd_opt(2026, 11, 2));
    }

    #[test]
    fn test_parse_deadline_dates() {
        let t = today();
        assert_eq!(parse_deadline("2027-01-05", t), NaiveDate::from_ymd_opt(2027, 1, 5));
        assert_eq!(
            parse_deadline("2025-03-01T10:00:00.000Z", t),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(parse_deadline("2027-13-05", t), None);
        assert_eq!(parse_deadline("2027-01-05x", t), None);
        assert_eq!(parse_deadline("next week", t), None);
        assert_eq!(parse_deadline("+", t), None);
    }

    #[test]
    fn test_huge_offsets_are_rejected() {
        let t = today();
        assert_eq!(parse_deadline("+999999999999999", t), None);
        assert_eq!(parse_deadline("+99999999999999w", t), None);
        assert_eq!(parse_deadline("+9223372036854775807w", t), None);
        assert_eq!(parse_deadline("+99999999", t), None);
    }

    #[test]
    fn test_huge_offset_token_stays_in_title() {
        let result = parse_task_input("Buy milk @+99999999999999w", today());
        assert_eq!(result.title, "Buy milk @+99999999999999w");
        assert_eq!(result.deadline, None);
    }
}
