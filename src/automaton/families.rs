//! Per-token-family NFA fragments for DataLang (§4.A "Unification of token families").
//! Each family is built independently, then wired onto a shared root state via an
//! ε-transition, exactly as described: "placing a fresh initial state q0, then for
//! each family appending its states with a unique offset and adding an ε-transition
//! from q0 to that family's initial state."
use super::builder::{self, Fragment};
use super::nfa::Nfa;
use crate::token::TokenKind;

fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}
fn is_alpha(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}
fn is_alnum(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// The two-character operators that must outbind their single-character prefixes
/// via the DFA's longest match (§4.B "Operator disambiguation"), paired with their
/// single-character operators and delimiters.
const PUNCTUATION: &[(&str, TokenKind)] = &[
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("<=", TokenKind::Le),
    (">=", TokenKind::Ge),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    ("|>", TokenKind::PipeGt),
    ("=>", TokenKind::FatArrow),
    ("..", TokenKind::DotDot),
    ("->", TokenKind::Arrow),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("=", TokenKind::Eq),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("!", TokenKind::Bang),
    ("|", TokenKind::Pipe),
    (".", TokenKind::Dot),
    (",", TokenKind::Comma),
    (":", TokenKind::Colon),
    (";", TokenKind::Semicolon),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
];

/// Build the unified NFA recognizing every DataLang token family and return it
/// together with its root state.
pub fn build_token_nfa() -> Nfa {
    let mut nfa = Nfa::new(0);
    let root = nfa.new_state();

    for &(lexeme, kind) in PUNCTUATION {
        let frag = builder::literal(&mut nfa, lexeme);
        nfa.mark_accepting(frag.end, kind);
        nfa.add_epsilon(root, frag.start);
    }

    build_identifier(&mut nfa, root);
    build_number(&mut nfa, root);
    build_string(&mut nfa, root);
    build_line_comment(&mut nfa, root);
    build_block_comment(&mut nfa, root);
    build_whitespace(&mut nfa, root);

    nfa.start = root;
    nfa
}

fn build_identifier(nfa: &mut Nfa, root: usize) {
    let head = builder::class(nfa, is_alpha);
    let tail = builder::star(nfa, builder::class(nfa, is_alnum));
    let frag = builder::concat(nfa, head, tail);
    nfa.mark_accepting(frag.end, TokenKind::Identifier);
    nfa.add_epsilon(root, frag.start);
}

/// The numeric recognizer subtlety (§4.A): `3.` followed by a non-digit tokenizes as
/// `Integer` then `.`, while `3.14` is one `Float` token, because the `.` only leads
/// to a non-accepting intermediate that reaches the accepting float state iff at
/// least one digit follows. Scientific notation is accepted only after a digit
/// stream (integer or float mantissa), never bare.
fn build_number(nfa: &mut Nfa, root: usize) {
    let digits = |nfa: &mut Nfa| -> Fragment {
        let first = builder::class(nfa, is_digit);
        let rest = builder::class(nfa, is_digit);
        builder::plus(nfa, first, rest)
    };

    let int_digits = digits(nfa);
    nfa.mark_accepting(int_digits.end, TokenKind::Integer);
    nfa.add_epsilon(root, int_digits.start);

    // `.` after an integer digit stream, only accepting once a digit follows.
    let dot_state = nfa.new_state();
    nfa.add_transition(int_digits.end, b'.', dot_state);
    let frac_digits = digits(nfa);
    nfa.add_epsilon(dot_state, frac_digits.start);
    nfa.mark_accepting(frac_digits.end, TokenKind::Float);

    // Scientific notation, reachable from either digit-stream accept state.
    let exponent = |nfa: &mut Nfa, from: usize| {
        let e = builder::class(nfa, |b| b == b'e' || b == b'E');
        let sign = builder::optional(nfa, builder::class(nfa, |b| b == b'+' || b == b'-'));
        let exp_digits = digits(nfa);
        let frag = builder::concat(nfa, e, builder::concat(nfa, sign, exp_digits));
        nfa.add_epsilon(from, frag.start);
        nfa.mark_accepting(frag.end, TokenKind::Float);
    };
    exponent(nfa, int_digits.end);
    exponent(nfa, frac_digits.end);
}

/// Recognized escapes (`\" \\ \n \t \r`) are a parser-level concern (§10.5): the
/// lexer's string family accepts `\` followed by any non-newline byte so that an
/// unrecognized escape does not abort tokenization, while a raw, unescaped newline
/// inside the quotes is excluded from the body class so the DFA simply cannot reach
/// an accepting state across it — the lexer reports that case externally (§4.B).
fn build_string(nfa: &mut Nfa, root: usize) {
    let quote = builder::byte(nfa, b'"');
    let plain_char = builder::class(nfa, |b| b != b'"' && b != b'\\' && b != b'\n');
    let escape = builder::concat(nfa, builder::byte(nfa, b'\\'), builder::class(nfa, |b| b != b'\n'));
    let body_char = builder::union(nfa, &[plain_char, escape]);
    let body = builder::star(nfa, body_char);
    let closing_quote = builder::byte(nfa, b'"');
    let frag = builder::concat(
        nfa,
        quote,
        builder::concat(nfa, body, closing_quote),
    );
    nfa.mark_accepting(frag.end, TokenKind::StringLit);
    nfa.add_epsilon(root, frag.start);
}

fn build_line_comment(nfa: &mut Nfa, root: usize) {
    let slashes = builder::literal(nfa, "//");
    let rest = builder::star(nfa, builder::class(nfa, |b| b != b'\n'));
    let frag = builder::concat(nfa, slashes, rest);
    nfa.mark_accepting(frag.end, TokenKind::LineComment);
    nfa.add_epsilon(root, frag.start);
}

/// Block comments (`/* ... */`, no nesting) are the one family that cannot be
/// expressed as a simple concatenation of star-closures: the body must exclude the
/// closing delimiter itself. Built directly from states/transitions rather than the
/// fragment combinators, following the classic 3-state "anything not containing the
/// delimiter" pattern.
fn build_block_comment(nfa: &mut Nfa, root: usize) {
    let open = builder::literal(nfa, "/*");
    let body = nfa.new_state();
    let maybe_close = nfa.new_state();
    let accept = nfa.new_state();
    nfa.add_epsilon(open.end, body);
    for b in 0u8..=255 {
        if b != b'*' {
            nfa.add_transition(body, b, body);
        }
    }
    nfa.add_transition(body, b'*', maybe_close);
    nfa.add_transition(maybe_close, b'*', maybe_close);
    nfa.add_transition(maybe_close, b'/', accept);
    for b in 0u8..=255 {
        if b != b'*' && b != b'/' {
            nfa.add_transition(maybe_close, b, body);
        }
    }
    nfa.mark_accepting(accept, TokenKind::BlockComment);
    nfa.add_epsilon(root, open.start);
}

fn build_whitespace(nfa: &mut Nfa, root: usize) {
    let ws = builder::class(nfa, |b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'));
    let frag = builder::plus(nfa, ws, builder::class(nfa, |b| matches!(b, b' ' | b'\t' | b'\r' | b'\n')));
    nfa.mark_accepting(frag.end, TokenKind::Whitespace);
    nfa.add_epsilon(root, frag.start);
}
