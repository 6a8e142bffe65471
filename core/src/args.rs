//! Command-line scanning for `cdup START [OPTIONS...] [[--] UPWARD_RULE]`.
//!
//! Options and the rule token may be interleaved. Options that take a value
//! accept it merged (`-sbuild`) or as the following token (`-s build`). After
//! `--` only rule tokens are recognized.

use crate::request::Invocation;
use crate::request::NavigationRequest;
use crate::request::Rule;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ArgsError {
    message: String,
}

impl ArgsError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn missing(what: &str) -> Self {
        Self::new(format!("{what} missing"))
    }
}

/// One unit of meaning produced by [`step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Help,
    Subsequent(String),
    ListOnly,
    EndOfOptions,
    Rule(Rule),
}

/// Scans the token at `cursor`. Returns the cursor of the next unread token
/// together with what was recognized, or `None` once the tokens run out.
pub fn step(
    tokens: &[String],
    cursor: usize,
    rules_only: bool,
) -> Result<Option<(usize, Fragment)>, ArgsError> {
    let Some(token) = tokens.get(cursor) else {
        return Ok(None);
    };
    let token = token.as_str();

    if !rules_only {
        match token {
            "-h" | "--help" => return Ok(Some((cursor + 1, Fragment::Help))),
            "-l" => return Ok(Some((cursor + 1, Fragment::ListOnly))),
            "--" => return Ok(Some((cursor + 1, Fragment::EndOfOptions))),
            _ => {}
        }
        if let Some(rest) = token.strip_prefix("-s") {
            let (next, value) = option_value(tokens, cursor, rest, "DIR")?;
            return Ok(Some((next, Fragment::Subsequent(value))));
        }
    }

    let (next, rule) = if let Some(rest) = token.strip_prefix("-r") {
        let (next, value) = option_value(tokens, cursor, rest, "NAME")?;
        (next, Rule::Raw(value))
    } else if let Some(rest) = token.strip_prefix("-g") {
        let (next, value) = option_value(tokens, cursor, rest, "PATTERN")?;
        (next, Rule::Glob(value))
    } else if let Some(rest) = token.strip_prefix("-E") {
        let (next, value) = option_value(tokens, cursor, rest, "REGEX")?;
        (next, Rule::Regex(value))
    } else if token == "-m" {
        (cursor + 1, Rule::Marker)
    } else if let Some(digits) = token.strip_prefix('-')
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
    {
        let levels = digits
            .parse::<usize>()
            .map_err(|_| ArgsError::new(format!("level count out of range: {digits}")))?;
        (cursor + 1, Rule::Count(levels))
    } else {
        (cursor + 1, Rule::Raw(token.to_string()))
    };
    Ok(Some((next, Fragment::Rule(rule))))
}

fn option_value(
    tokens: &[String],
    cursor: usize,
    merged: &str,
    what: &str,
) -> Result<(usize, String), ArgsError> {
    if !merged.is_empty() {
        return Ok((cursor + 1, merged.to_string()));
    }
    match tokens.get(cursor + 1) {
        Some(value) => Ok((cursor + 2, value.clone())),
        None => Err(ArgsError::missing(what)),
    }
}

/// Builds the invocation from the raw tokens (program name excluded). The
/// first token is the starting directory.
pub fn parse_args(tokens: &[String]) -> Result<Invocation, ArgsError> {
    let Some(start) = tokens.first() else {
        return Err(ArgsError::missing("starting directory"));
    };
    match start.as_str() {
        "" => return Err(ArgsError::missing("starting directory")),
        "-h" | "--help" => return Ok(Invocation::Help),
        _ => {}
    }

    let mut request = NavigationRequest::new(start);
    let mut rule: Option<Rule> = None;
    let mut rules_only = false;
    let mut cursor = 1;
    while let Some((next, fragment)) = step(tokens, cursor, rules_only)? {
        cursor = next;
        match fragment {
            Fragment::Help => return Ok(Invocation::Help),
            Fragment::Subsequent(dir) => request.subsequent = Some(dir),
            Fragment::ListOnly => request.list_only = true,
            Fragment::EndOfOptions => rules_only = true,
            Fragment::Rule(selected) => {
                if rule.is_some() {
                    return Err(ArgsError::new("UPWARD_RULE has already been specified"));
                }
                rule = Some(selected);
            }
        }
    }
    request.rule = rule.unwrap_or_default();
    Ok(Invocation::Navigate(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    fn navigate(raw: &[&str]) -> NavigationRequest {
        match parse_args(&tokens(raw)) {
            Ok(Invocation::Navigate(request)) => request,
            other => panic!("expected a navigation request, got {other:?}"),
        }
    }

    fn parse_err(raw: &[&str]) -> String {
        parse_args(&tokens(raw)).unwrap_err().to_string()
    }

    #[test]
    fn no_rule_defaults_to_one_level() {
        let request = navigate(&["/hello/world"]);
        assert_eq!(request.start_directory, PathBuf::from("/hello/world"));
        assert_eq!(request.rule, Rule::Count(1));
        assert_eq!(request.subsequent, None);
        assert!(!request.list_only);
    }

    #[test]
    fn merged_glob_value() {
        let request = navigate(&["/hello/world", "-gP*s"]);
        assert_eq!(request.rule, Rule::Glob("P*s".to_string()));
    }

    #[test]
    fn options_interleave_with_rule() {
        let request = navigate(&["/hello/world", "-E", "P", "-sagain", "-l"]);
        assert_eq!(request.rule, Rule::Regex("P".to_string()));
        assert_eq!(request.subsequent.as_deref(), Some("again"));
        assert!(request.list_only);

        let request = navigate(&["/hello/world", "-l", "-s", "build*", "src"]);
        assert_eq!(request.rule, Rule::Raw("src".to_string()));
        assert_eq!(request.subsequent.as_deref(), Some("build*"));
        assert!(request.list_only);
    }

    #[test]
    fn unknown_dash_token_is_a_name() {
        let request = navigate(&["/hello/world", "--xxx"]);
        assert_eq!(request.rule, Rule::Raw("--xxx".to_string()));

        let request = navigate(&["/hello/world", "-12a"]);
        assert_eq!(request.rule, Rule::Raw("-12a".to_string()));

        let request = navigate(&["/hello/world", "-"]);
        assert_eq!(request.rule, Rule::Raw("-".to_string()));

        let request = navigate(&["/hello/world", "-lx"]);
        assert_eq!(request.rule, Rule::Raw("-lx".to_string()));
    }

    #[test]
    fn double_dash_ends_option_scanning() {
        let request = navigate(&["/hello/world", "--", "-s"]);
        assert_eq!(request.rule, Rule::Raw("-s".to_string()));
        assert_eq!(request.subsequent, None);

        let request = navigate(&["/hello/world", "--", "-h"]);
        assert_eq!(request.rule, Rule::Raw("-h".to_string()));

        let request = navigate(&["/hello/world", "--", "--"]);
        assert_eq!(request.rule, Rule::Raw("--".to_string()));
    }

    #[test]
    fn rule_flags_still_apply_after_double_dash() {
        let request = navigate(&["/hello/world", "--", "-g", "*.d"]);
        assert_eq!(request.rule, Rule::Glob("*.d".to_string()));

        let request = navigate(&["/hello/world", "--", "-3"]);
        assert_eq!(request.rule, Rule::Count(3));
    }

    #[test]
    fn raw_flag_disambiguates_dash_names() {
        let request = navigate(&["/hello/world", "-r-sagain", "-s", "from"]);
        assert_eq!(request.rule, Rule::Raw("-sagain".to_string()));
        assert_eq!(request.subsequent.as_deref(), Some("from"));

        let request = navigate(&["/hello/world", "-r", "-2"]);
        assert_eq!(request.rule, Rule::Raw("-2".to_string()));
    }

    #[test]
    fn numeric_rule() {
        assert_eq!(navigate(&["/a/b/c", "-2"]).rule, Rule::Count(2));
        assert_eq!(navigate(&["/a/b/c", "-0"]).rule, Rule::Count(0));
        assert_eq!(
            parse_err(&["/a", "-99999999999999999999999999"]),
            "level count out of range: 99999999999999999999999999"
        );
    }

    #[test]
    fn marker_rule_takes_no_value() {
        let request = navigate(&["/repo/src", "-m", "-l"]);
        assert_eq!(request.rule, Rule::Marker);
        assert!(request.list_only);

        let request = navigate(&["/repo/src", "-mx"]);
        assert_eq!(request.rule, Rule::Raw("-mx".to_string()));
    }

    #[test]
    fn second_rule_is_rejected() {
        assert_eq!(
            parse_err(&["/a", "foo", "-g", "b*"]),
            "UPWARD_RULE has already been specified"
        );
        assert_eq!(
            parse_err(&["/a", "-2", "--", "x"]),
            "UPWARD_RULE has already been specified"
        );
    }

    #[test]
    fn missing_values_are_reported() {
        assert_eq!(parse_err(&["/a", "-s"]), "DIR missing");
        assert_eq!(parse_err(&["/a", "-r"]), "NAME missing");
        assert_eq!(parse_err(&["/a", "-g"]), "PATTERN missing");
        assert_eq!(parse_err(&["/a", "-E"]), "REGEX missing");
        assert_eq!(parse_err(&[]), "starting directory missing");
        assert_eq!(parse_err(&[""]), "starting directory missing");
    }

    #[test]
    fn help_wins_when_seen() {
        assert_eq!(
            parse_args(&tokens(&["/a", "-l", "--help", "foo", "bar"])),
            Ok(Invocation::Help)
        );
        assert_eq!(parse_args(&tokens(&["-h"])), Ok(Invocation::Help));
    }

    #[test]
    fn step_threads_the_cursor() {
        let toks = tokens(&["/start", "-s", "dir", "-gx*", "-l"]);
        assert_eq!(
            step(&toks, 1, false),
            Ok(Some((3, Fragment::Subsequent("dir".to_string()))))
        );
        assert_eq!(
            step(&toks, 3, false),
            Ok(Some((4, Fragment::Rule(Rule::Glob("x*".to_string())))))
        );
        assert_eq!(step(&toks, 4, false), Ok(Some((5, Fragment::ListOnly))));
        assert_eq!(step(&toks, 5, false), Ok(None));
        assert_eq!(
            step(&toks, 4, true),
            Ok(Some((5, Fragment::Rule(Rule::Raw("-l".to_string())))))
        );
    }
}
