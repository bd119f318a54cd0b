//! Token scanner for statement lines.
//!
//! A line is split into a stream of [`Token`]s: dates, amounts and the text
//! runs between them. Dates and amounts only start and end at word
//! boundaries, so digits glued to letters (`#455SAN`, `X12`) stay text.
//!
//! Token grammar (ASCII only):
//!
//! ```text
//! date   := D{1,2} SEP D{1,2} [SEP D{2,4}]  |  D{4} SEP D{1,2} SEP D{1,2}
//! amount := [+-] [$] D+ (,DDD)* [.DD [SUFFIX]]  |  '(' [$] D+ (,DDD)* [.DD] ')'
//! SEP    := '/' | '-'
//! ```
//!
//! `SUFFIX` is one of [`AMOUNT_SUFFIXES`], glued to the amount.

use std::ops::Range;

use tracing::trace;

use super::patterns::AMOUNT_SUFFIXES;

/// A date-shaped token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateToken<'a> {
    pub text: &'a str,
    pub span: Range<usize>,
}

/// A currency-shaped token, sign and `$` included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountToken<'a> {
    pub text: &'a str,
    pub span: Range<usize>,
}

/// Anything that is neither a date nor an amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Date(DateToken<'a>),
    Amount(AmountToken<'a>),
    Text(TextRun<'a>),
}

impl Token<'_> {
    pub fn span(&self) -> &Range<usize> {
        match self {
            Token::Date(t) => &t.span,
            Token::Amount(t) => &t.span,
            Token::Text(t) => &t.span,
        }
    }
}

/// Scanned form of one line.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    line: &'a str,
    tokens: Vec<Token<'a>>,
}

impl<'a> TokenStream<'a> {
    /// Scan a line into tokens.
    pub fn scan(line: &'a str) -> Self {
        let bytes = line.as_bytes();
        let mut tokens = Vec::new();
        let mut text_start: Option<usize> = None;
        let mut i = 0;

        while i < bytes.len() {
            let at_boundary = !prev_is_word(line, i);

            // A date shape glued to a word is not retried as an amount.
            let matched = if at_boundary && could_start_token(bytes, i) {
                match scan_date(bytes, i) {
                    Some(end) if !next_is_word(line, end) => Some((true, end)),
                    Some(_) => None,
                    None => scan_amount(bytes, i)
                        .filter(|&end| !next_is_word(line, end))
                        .map(|end| (false, end)),
                }
            } else {
                None
            };

            match matched {
                Some((is_date, end)) => {
                    if let Some(start) = text_start.take() {
                        tokens.push(Token::Text(TextRun { text: &line[start..i], span: start..i }));
                    }
                    let text = &line[i..end];
                    tokens.push(if is_date {
                        Token::Date(DateToken { text, span: i..end })
                    } else {
                        Token::Amount(AmountToken { text, span: i..end })
                    });
                    i = end;
                }
                None => {
                    text_start.get_or_insert(i);
                    // A failed token start swallows the rest of its word so the
                    // tail of e.g. `12.999` is not read as a separate amount.
                    i = if at_boundary && could_start_token(bytes, i) && bytes[i] != b'(' {
                        skip_word(line, i)
                    } else {
                        next_char_boundary(line, i)
                    };
                }
            }
        }

        if let Some(start) = text_start {
            tokens.push(Token::Text(TextRun { text: &line[start..], span: start..line.len() }));
        }

        trace!("scanned {} tokens from {:?}", tokens.len(), line);
        Self { line, tokens }
    }

    pub fn line(&self) -> &'a str {
        self.line
    }

    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    pub fn dates(&self) -> impl Iterator<Item = &DateToken<'a>> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Date(d) => Some(d),
            _ => None,
        })
    }

    pub fn amounts(&self) -> impl Iterator<Item = &AmountToken<'a>> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Amount(a) => Some(a),
            _ => None,
        })
    }

    /// The date is the first date token in the line.
    pub fn first_date(&self) -> Option<&DateToken<'a>> {
        self.dates().next()
    }

    /// The transaction amount is the last amount token: statements put
    /// reference numbers and balances before it.
    pub fn last_amount(&self) -> Option<&AmountToken<'a>> {
        self.amounts().last()
    }

    pub fn has_date(&self) -> bool {
        self.first_date().is_some()
    }

    pub fn has_amount(&self) -> bool {
        self.amounts().next().is_some()
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn prev_is_word(line: &str, i: usize) -> bool {
    line[..i].chars().next_back().is_some_and(is_word)
}

fn next_is_word(line: &str, i: usize) -> bool {
    line[i..].chars().next().is_some_and(is_word)
}

fn next_char_boundary(line: &str, i: usize) -> usize {
    line[i..].chars().next().map_or(line.len(), |c| i + c.len_utf8())
}

fn skip_word(line: &str, i: usize) -> usize {
    line[i..]
        .find(char::is_whitespace)
        .map_or(line.len(), |off| i + off)
}

fn could_start_token(bytes: &[u8], i: usize) -> bool {
    match bytes[i] {
        b'0'..=b'9' | b'$' => true,
        b'-' | b'+' | b'(' => matches!(bytes.get(i + 1), Some(b'$') | Some(b'0'..=b'9')),
        _ => false,
    }
}

fn digit_run(bytes: &[u8], i: usize) -> usize {
    bytes
        .get(i..)
        .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
}

fn is_sep(bytes: &[u8], i: usize) -> bool {
    matches!(bytes.get(i), Some(b'/') | Some(b'-'))
}

fn scan_date(bytes: &[u8], i: usize) -> Option<usize> {
    let first = digit_run(bytes, i);

    if first == 4 {
        // YYYY-MM-DD needs all three parts.
        let mut j = i + 4;
        for _ in 0..2 {
            if !is_sep(bytes, j) {
                return None;
            }
            let n = digit_run(bytes, j + 1);
            if !(1..=2).contains(&n) {
                return None;
            }
            j += 1 + n;
        }
        return Some(j);
    }

    if !(1..=2).contains(&first) {
        return None;
    }

    let mut j = i + first;
    if !is_sep(bytes, j) {
        return None;
    }
    let second = digit_run(bytes, j + 1);
    if !(1..=2).contains(&second) {
        return None;
    }
    j += 1 + second;

    if is_sep(bytes, j) {
        let third = digit_run(bytes, j + 1);
        if (2..=4).contains(&third) {
            j += 1 + third;
        }
    }

    Some(j)
}

fn scan_amount(bytes: &[u8], i: usize) -> Option<usize> {
    let mut j = i;
    let parenthesized = bytes[j] == b'(';
    if parenthesized || matches!(bytes[j], b'-' | b'+') {
        j += 1;
    }
    if bytes.get(j) == Some(&b'$') {
        j += 1;
    }

    let integer = digit_run(bytes, j);
    if integer == 0 {
        return None;
    }
    j += integer;

    while bytes.get(j) == Some(&b',') && digit_run(bytes, j + 1) == 3 {
        j += 4;
    }

    let mut fraction = false;
    if bytes.get(j) == Some(&b'.') {
        match digit_run(bytes, j + 1) {
            0 => {}
            2 => {
                j += 3;
                fraction = true;
            }
            _ => return None,
        }
    }

    if parenthesized {
        return (bytes.get(j) == Some(&b')')).then_some(j + 1);
    }
    if fraction {
        j += suffix_len(bytes, j);
    }

    Some(j)
}

/// Length of an amount suffix starting at `j`, or 0.
fn suffix_len(bytes: &[u8], j: usize) -> usize {
    let letters = bytes
        .get(j..)
        .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_alphabetic()).count());
    let word = &bytes[j..j + letters];
    if AMOUNT_SUFFIXES
        .iter()
        .any(|s| s.as_bytes().eq_ignore_ascii_case(word))
    {
        letters
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(line: &str) -> Vec<(char, &str)> {
        TokenStream::scan(line)
            .tokens()
            .iter()
            .map(|t| match t {
                Token::Date(d) => ('D', d.text),
                Token::Amount(a) => ('A', a.text),
                Token::Text(r) => ('T', r.text),
            })
            .collect()
    }

    #[test]
    fn test_scan_simple_line() {
        assert_eq!(
            kinds("01/15/2024 SPOTIFY PREMIUM $12.99"),
            vec![
                ('D', "01/15/2024"),
                ('T', " SPOTIFY PREMIUM "),
                ('A', "$12.99"),
            ]
        );
    }

    #[test]
    fn test_last_amount_wins() {
        let stream = TokenStream::scan("01/16 FOOD LION #1234 $45.67");
        assert_eq!(stream.first_date().unwrap().text, "01/16");
        assert_eq!(stream.last_amount().unwrap().text, "$45.67");
        assert_eq!(stream.amounts().count(), 2);
    }

    #[test]
    fn test_glued_digits_are_text() {
        let stream = TokenStream::scan("H-E-B #455SAN MARCOSTX5.82");
        assert!(!stream.has_amount());
        assert!(!stream.has_date());
    }

    #[test]
    fn test_grouped_and_signed_amounts() {
        assert_eq!(
            kinds("REFUND -$1,234.56"),
            vec![('T', "REFUND "), ('A', "-$1,234.56")]
        );
        assert_eq!(kinds("+20.00"), vec![('A', "+20.00")]);
    }

    #[test]
    fn test_hyphen_inside_word_is_not_sign() {
        let stream = TokenStream::scan("ACH-12.00");
        assert_eq!(stream.last_amount().unwrap().text, "12.00");
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(
            kinds("2024-01-15 RENT 1500.00"),
            vec![('D', "2024-01-15"), ('T', " RENT "), ('A', "1500.00")]
        );
    }

    #[test]
    fn test_bad_fraction_swallows_word() {
        assert_eq!(kinds("12.999 X"), vec![('T', "12.999 X")]);
    }

    #[test]
    fn test_non_ascii_text() {
        let stream = TokenStream::scan("01/02 CAFÉ 3,50 €4.00");
        assert_eq!(stream.first_date().unwrap().text, "01/02");
        assert_eq!(stream.last_amount().unwrap().text, "4.00");
    }

    #[test]
    fn test_spans_cover_line() {
        let line = "01/16 FOOD LION #1234 $45.67";
        let stream = TokenStream::scan(line);
        let rebuilt: String = stream.tokens().iter().map(|t| &line[t.span().clone()]).collect();
        assert_eq!(rebuilt, line);
    }

    #[test]
    fn test_amount_with_balance_marker() {
        assert_eq!(
            kinds("01/15/2024 PAYROLL ACME 1,250.00CR"),
            vec![('D', "01/15/2024"), ('T', " PAYROLL ACME "), ('A', "1,250.00CR")]
        );
        assert_eq!(TokenStream::scan("FEE 12.99USD").last_amount().unwrap().text, "12.99USD");
        // Unknown letters keep the whole word as text.
        assert!(!TokenStream::scan("REF 12.99ABC").has_amount());
    }

    #[test]
    fn test_parenthesized_amount() {
        assert_eq!(
            kinds("01/20 CHARGEBACK (45.00)"),
            vec![('D', "01/20"), ('T', " CHARGEBACK "), ('A', "(45.00)")]
        );
        // An unclosed parenthesis is not part of the amount.
        assert_eq!(TokenStream::scan("(2 ITEMS 3.00").amounts().count(), 2);
    }
}
