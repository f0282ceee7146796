//! Tokenizer - Splits a command line into a name and argument tokens
//!
//! Grammar, applied to the text after the command character:
//! the name is the leading run of non-whitespace characters; each argument is
//! either a double-quoted literal (no escapes, may contain whitespace) or a
//! bare run of non-whitespace characters. A closing quote must be followed by
//! whitespace or the end of the line.

use crate::application::errors::TokenizeError;

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<String>,
}

pub fn tokenize(line: &str) -> Result<Invocation, TokenizeError> {
    let name_end = line.find(char::is_whitespace).unwrap_or(line.len());
    if name_end == 0 {
        return Err(TokenizeError::MissingName);
    }
    let name = line[..name_end].to_string();

    let mut args = Vec::new();
    let mut pos = name_end;
    loop {
        let rest = &line[pos..];
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        pos += rest.len() - trimmed.len();

        if let Some(quoted) = trimmed.strip_prefix('"') {
            let close = quoted
                .find('"')
                .ok_or(TokenizeError::UnterminatedQuote(pos))?;
            args.push(quoted[..close].to_string());
            // opening quote + content + closing quote
            pos += close + 2;
            if line[pos..].starts_with(|c: char| !c.is_whitespace()) {
                return Err(TokenizeError::TrailingQuote(pos));
            }
        } else {
            let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
            args.push(trimmed[..end].to_string());
            pos += end;
        }
    }

    Ok(Invocation { name, args })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        tokenize(line).unwrap().args
    }

    #[test]
    fn test_name_only() {
        let parsed = tokenize("help").unwrap();
        assert_eq!(parsed.name, "help");
        assert!(parsed.args.is_empty());
    }

    #[test]
    fn test_bare_tokens() {
        assert_eq!(args("id yes no  maybe"), vec!["yes", "no", "maybe"]);
    }

    #[test]
    fn test_quoted_token() {
        assert_eq!(args("id \"ban capo ?\" yes yes"), vec!["ban capo ?", "yes", "yes"]);
        assert_eq!(args("id \"\" x"), vec!["", "x"]);
    }

    #[test]
    fn test_quote_inside_bare_token() {
        assert_eq!(args("id ab\"c"), vec!["ab\"c"]);
    }

    #[test]
    fn test_trailing_whitespace_tolerated() {
        assert_eq!(args("apply builder  "), vec!["builder"]);
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(tokenize("id \"abc"), Err(TokenizeError::UnterminatedQuote(3)));
        assert_eq!(tokenize("id ok \"never closed"), Err(TokenizeError::UnterminatedQuote(6)));
    }

    #[test]
    fn test_quote_must_end_token() {
        assert_eq!(tokenize("id \"\"\""), Err(TokenizeError::TrailingQuote(5)));
        assert_eq!(tokenize("id \"a\"b"), Err(TokenizeError::TrailingQuote(6)));
    }

    #[test]
    fn test_missing_name() {
        assert_eq!(tokenize(""), Err(TokenizeError::MissingName));
        assert_eq!(tokenize(" apply"), Err(TokenizeError::MissingName));
    }

    #[test]
    fn test_unicode_tokens() {
        assert_eq!(args("poll \"café ☕\" ja"), vec!["café ☕", "ja"]);
    }
}
