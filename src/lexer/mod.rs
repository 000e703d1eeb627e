//! Lexer (§4.B): drives the DFA over source text with maximal munch, classifies
//! identifier-shaped lexemes as keywords, and surfaces lexical errors with context.
//! ≈10% of the front-end's share of the core.
use crate::automaton::{self, Dfa};
use crate::diagnostic::{Diagnostic, DiagnosticBag};
use crate::token::{classify_identifier, Token, TokenKind};
use crate::trace::CompileTrace;
use crate::trace_phase;
use crate::util::{Code, Log};

pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    code: Code<'src>,
    dfa: Dfa,
    pos: usize,
    line: usize,
    column: usize,
    diagnostics: DiagnosticBag,
    debug: Log<&'static str>,
}

/// Known "wrong-ecosystem" glyphs get a tailored suggestion (§4.B "Diagnostic
/// envelope").
fn wrong_ecosystem_suggestion(b: u8) -> Option<&'static str> {
    match b {
        b'@' => Some("'@' is not a DataLang operator; aggregate calls are plain identifiers like sum(...)"),
        b'#' => Some("'#' is not a DataLang operator; use '//' for a line comment"),
        b'\'' => Some("string literals use double quotes, not single quotes"),
        _ if b >= 0x80 => Some("non-ASCII bytes are only valid inside string literals and comments"),
        _ => None,
    }
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            code: Code::from(source),
            dfa: automaton::build_dfa(),
            pos: 0,
            line: 1,
            column: 1,
            diagnostics: DiagnosticBag::new(),
            debug: Log::None,
        }
    }

    pub fn with_debug(mut self, level: Log<&'static str>) -> Self {
        self.debug = level;
        self
    }

    pub fn tokenize(mut self, trace: &CompileTrace) -> (Vec<Token>, DiagnosticBag) {
        let mut tokens = Vec::new();
        while self.pos < self.bytes.len() {
            self.scan_one(&mut tokens);
        }
        let (eof_line, eof_col) = (self.line, self.column);
        tokens.push(Token::eof(eof_line, eof_col));
        trace_phase!(
            trace,
            "lexer: produced {} structural token(s), {} diagnostic(s)",
            tokens.iter().filter(|t| t.kind.is_structural()).count(),
            self.diagnostics.len()
        );
        (tokens, self.diagnostics)
    }

    fn current_line_text(&self) -> String {
        let start = self.bytes[..self.pos]
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let end = self.bytes[self.pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| self.pos + i)
            .unwrap_or(self.bytes.len());
        String::from_utf8_lossy(&self.bytes[start..end]).into_owned()
    }

    fn advance_position(&mut self, consumed: &[u8]) {
        for &b in consumed {
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += consumed.len();
    }

    /// Maximal munch: walk the DFA remembering the last accepting position; consume
    /// up to it. Returns `None` when no accepting state was ever reached.
    fn maximal_munch(&self) -> Option<(usize, TokenKind)> {
        let mut state = self.dfa.start;
        let mut last_accept = self.dfa.accept_of(state).map(|k| (self.pos, k));
        let mut cursor = self.pos;
        while cursor < self.bytes.len() {
            match self.dfa.step(state, self.bytes[cursor]) {
                Some(next) => {
                    state = next;
                    cursor += 1;
                    if let Some(kind) = self.dfa.accept_of(state) {
                        last_accept = Some((cursor, kind));
                    }
                }
                None => break,
            }
        }
        last_accept
    }

    fn scan_one(&mut self, tokens: &mut Vec<Token>) {
        if let Some((end, kind)) = self.maximal_munch() {
            if end > self.pos {
                self.emit(tokens, end, kind);
                return;
            }
        }

        // DFA error sink: handled externally, per family.
        if self.bytes[self.pos] == b'"' {
            self.recover_unterminated_string(tokens);
        } else if self.bytes[self.pos..].starts_with(b"/*") {
            self.recover_unterminated_block_comment(tokens);
        } else {
            self.recover_single_byte_error(tokens);
        }
    }

    fn emit(&mut self, tokens: &mut Vec<Token>, end: usize, kind: TokenKind) {
        let start = self.pos;
        let line = self.line;
        let column = self.column;
        let raw = &self.source[start..end];

        let final_kind = match kind {
            TokenKind::Identifier => classify_identifier(raw).unwrap_or(TokenKind::Identifier),
            other => other,
        };

        self.debug.trace_success(Log::Success(()), (final_kind, raw), crate::util::Position { line, column });
        self.advance_position(&self.bytes[start..end]);

        if final_kind.is_structural() {
            tokens.push(Token::new(final_kind, raw, line, column));
        }
    }

    fn recover_unterminated_string(&mut self, tokens: &mut Vec<Token>) {
        let start = self.pos;
        let line = self.line;
        let column = self.column;
        let rest = &self.bytes[start..];
        let newline_at = rest.iter().position(|&b| b == b'\n');
        let end = start + newline_at.unwrap_or(rest.len());

        let message = "unterminated string literal: a string must close on the same line it opens";
        let diag = Diagnostic::error(line, column, message)
            .with_lexeme(String::from_utf8_lossy(&self.bytes[start..end]).into_owned())
            .with_context_line(self.current_line_text())
            .with_suggestion("close the string with a matching '\"' before the end of the line");
        self.diagnostics.push(diag);
        self.debug.trace_failure(Log::Success(()), start, &self.code);

        self.advance_position(&self.bytes[start..end]);
        tokens.push(Token::new(TokenKind::Error, "", line, column));
    }

    fn recover_unterminated_block_comment(&mut self, tokens: &mut Vec<Token>) {
        let start = self.pos;
        let line = self.line;
        let column = self.column;
        let end = self.bytes.len();

        let diag = Diagnostic::error(line, column, "unterminated block comment")
            .with_context_line(self.current_line_text())
            .with_suggestion("close the comment with a matching '*/'");
        self.diagnostics.push(diag);
        self.debug.trace_failure(Log::Success(()), start, &self.code);

        self.advance_position(&self.bytes[start..end]);
        tokens.push(Token::new(TokenKind::Error, "", line, column));
    }

    fn recover_single_byte_error(&mut self, tokens: &mut Vec<Token>) {
        let start = self.pos;
        let line = self.line;
        let column = self.column;
        // Advance a full UTF-8 char so later bytes of a multi-byte sequence don't
        // each trigger their own diagnostic.
        let width = utf8_char_width(self.bytes[start]).min(self.bytes.len() - start);
        let end = start + width.max(1);
        let lexeme = String::from_utf8_lossy(&self.bytes[start..end]).into_owned();

        let mut diag = Diagnostic::error(line, column, "unrecognized character").with_lexeme(lexeme)
            .with_context_line(self.current_line_text());
        if let Some(suggestion) = wrong_ecosystem_suggestion(self.bytes[start]) {
            diag = diag.with_suggestion(suggestion);
        }
        self.diagnostics.push(diag);
        self.debug.trace_failure(Log::Success(()), start, &self.code);

        self.advance_position(&self.bytes[start..end]);
        tokens.push(Token::new(TokenKind::Error, "", line, column));
    }
}

fn utf8_char_width(first_byte: u8) -> usize {
    if first_byte < 0x80 {
        1
    } else if first_byte >> 5 == 0b110 {
        2
    } else if first_byte >> 4 == 0b1110 {
        3
    } else if first_byte >> 3 == 0b11110 {
        4
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token> {
        Lexer::new(src).tokenize(&CompileTrace::silent()).0
    }

    #[test]
    fn identifier_is_one_token() {
        let tokens = lex("row_count");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme, "row_count");
    }

    #[test]
    fn keyword_post_classified() {
        let tokens = lex("filter");
        assert_eq!(tokens[0].kind, TokenKind::Filter);
    }

    #[test]
    fn type_keyword_post_classified() {
        let tokens = lex("DataFrame");
        assert_eq!(tokens[0].kind, TokenKind::TypeDataFrame);
    }

    #[test]
    fn boolean_literal_is_dedicated_kind() {
        let tokens = lex("true false");
        assert_eq!(tokens[0].kind, TokenKind::Boolean);
        assert_eq!(tokens[1].kind, TokenKind::Boolean);
    }

    #[test]
    fn integer_vs_float_vs_dot() {
        assert_eq!(lex("42")[0].kind, TokenKind::Integer);
        assert_eq!(lex("3.14")[0].kind, TokenKind::Float);
        let dot_split = lex("3.");
        assert_eq!(dot_split[0].kind, TokenKind::Integer);
        assert_eq!(dot_split[1].kind, TokenKind::Dot);
    }

    #[test]
    fn maximal_munch_on_equality() {
        let tokens = lex("==");
        assert_eq!(tokens.len(), 2); // EqEq + Eof
        assert_eq!(tokens[0].kind, TokenKind::EqEq);
    }

    #[test]
    fn whitespace_and_comments_are_filtered() {
        let tokens = lex("let  // a comment\nx = 1;");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert!(!kinds.contains(&TokenKind::Whitespace));
        assert!(!kinds.contains(&TokenKind::LineComment));
        assert_eq!(kinds[0], TokenKind::Let);
    }

    #[test]
    fn unterminated_string_is_one_diagnostic() {
        let (_, diagnostics) = Lexer::new("\"hi\nthere\"").tokenize(&CompileTrace::silent());
        assert_eq!(diagnostics.error_count(), 1);
    }

    #[test]
    fn matched_string_is_one_token() {
        let tokens = lex("\"hello world\"");
        assert_eq!(tokens[0].kind, TokenKind::StringLit);
        assert_eq!(tokens[0].lexeme, "\"hello world\"");
    }

    #[test]
    fn unterminated_block_comment_is_fatal() {
        let (_, diagnostics) = Lexer::new("/* never closes").tokenize(&CompileTrace::silent());
        assert_eq!(diagnostics.error_count(), 1);
    }

    #[test]
    fn unknown_glyph_gets_suggestion() {
        let (_, diagnostics) = Lexer::new("let x = @sum;").tokenize(&CompileTrace::silent());
        assert_eq!(diagnostics.error_count(), 1);
        let diag = diagnostics.iter().next().unwrap();
        assert!(diag.suggestion.is_some());
    }

    #[test]
    fn position_tracks_lines_and_columns() {
        let tokens = lex("let x = 1;\nlet y = 2;");
        let second_let = tokens.iter().filter(|t| t.kind == TokenKind::Let).nth(1).unwrap();
        assert_eq!(second_let.line, 2);
        assert_eq!(second_let.column, 1);
    }
}
