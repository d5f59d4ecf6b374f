// Integration tests for the shift/reduce parser

use rbparse::parser::ast::{Block, Expr, Main, Operator, Statement};
use rbparse::parser::grammar::{Assoc, Grammar};
use rbparse::parser::lexer::{Token, TokenKind};
use rbparse::parser::{
    parse_source, parse_tokens, ParseError, ParseOptions, ParseTable, RadixDetection,
    DEFAULT_MAX_DEPTH,
};

fn table() -> ParseTable {
    ParseTable::build(&Grammar::ruby_subset()).expect("Table construction failed")
}

fn tok(kind: TokenKind, text: &str, line: usize) -> Token {
    Token::new(kind, text, line)
}

fn parse(tokens: Vec<Token>) -> Result<Main, ParseError> {
    parse_tokens(&table(), tokens, ParseOptions::default())
}

const ALL_OPERATORS: [TokenKind; 6] = [
    TokenKind::Plus,
    TokenKind::Div,
    TokenKind::Modulo,
    TokenKind::EqEqEq,
    TokenKind::EqualTilde,
    TokenKind::ExclamationTilde,
];

#[test]
fn test_two_statements() {
    let main = parse(vec![
        tok(TokenKind::Number, "1", 1),
        tok(TokenKind::Plus, "+", 1),
        tok(TokenKind::Number, "2", 1),
        tok(TokenKind::LineEnd, "\n", 1),
        tok(TokenKind::Number, "3", 2),
        tok(TokenKind::Eof, "", 2),
    ])
    .expect("Parsing failed");

    let expected = Main::new(Block::new(vec![
        Statement::new(Expr::binop(Operator::Plus, Expr::int(1), Expr::int(2), 1)),
        Statement::new(Expr::int(3)),
    ]));
    assert_eq!(main, expected);
}

#[test]
fn test_match_chain_is_right_associative() {
    let main = parse(vec![
        tok(TokenKind::Number, "1", 1),
        tok(TokenKind::EqualTilde, "=~", 1),
        tok(TokenKind::Number, "2", 1),
        tok(TokenKind::ExclamationTilde, "!~", 1),
        tok(TokenKind::Number, "3", 1),
        tok(TokenKind::Eof, "", 1),
    ])
    .expect("Parsing failed");

    let expected = Expr::binop(
        Operator::Match,
        Expr::int(1),
        Expr::not(Expr::binop(Operator::Match, Expr::int(2), Expr::int(3), 1)),
        1,
    );
    assert_eq!(main.body.statements, vec![Statement::new(expected)]);
}

#[test]
fn test_mixed_operators_share_one_level() {
    let table = table();
    let main = parse_source(&table, "8 / 4 + 2 % 3", ParseOptions::default()).unwrap();

    let expected = Expr::binop(
        Operator::Div,
        Expr::int(8),
        Expr::binop(
            Operator::Plus,
            Expr::int(4),
            Expr::binop(Operator::Modulo, Expr::int(2), Expr::int(3), 1),
            1,
        ),
        1,
    );
    assert_eq!(main.body.statements[0].expr, expected);
}

#[test]
fn test_case_equality() {
    let table = table();
    let main = parse_source(&table, "1 === 1.0", ParseOptions::default()).unwrap();

    assert_eq!(
        main.body.statements[0].expr,
        Expr::binop(Operator::CaseEq, Expr::int(1), Expr::ConstantFloat(1.0), 1)
    );
}

#[test]
fn test_left_associative_declaration() {
    let mut grammar = Grammar::ruby_subset();
    // a later declaration overrides the earlier level for these terminals
    grammar.precedence(Assoc::Left, &ALL_OPERATORS);
    let table = ParseTable::build(&grammar).unwrap();

    let main = parse_source(&table, "1 =~ 2 !~ 3", ParseOptions::default()).unwrap();
    let expected = Expr::not(Expr::binop(
        Operator::Match,
        Expr::binop(Operator::Match, Expr::int(1), Expr::int(2), 1),
        Expr::int(3),
        1,
    ));
    assert_eq!(main.body.statements[0].expr, expected);
}

#[test]
fn test_precedence_levels() {
    let mut grammar = Grammar::ruby_subset();
    grammar
        .precedence(
            Assoc::NonAssoc,
            &[TokenKind::EqEqEq, TokenKind::EqualTilde, TokenKind::ExclamationTilde],
        )
        .precedence(Assoc::Left, &[TokenKind::Plus])
        .precedence(Assoc::Left, &[TokenKind::Div, TokenKind::Modulo]);
    let table = ParseTable::build(&grammar).unwrap();

    let main = parse_source(&table, "1 + 6 / 3 + 2", ParseOptions::default()).unwrap();
    let expected = Expr::binop(
        Operator::Plus,
        Expr::binop(
            Operator::Plus,
            Expr::int(1),
            Expr::binop(Operator::Div, Expr::int(6), Expr::int(3), 1),
            1,
        ),
        Expr::int(2),
        1,
    );
    assert_eq!(main.body.statements[0].expr, expected);

    // nonassociative operators cannot be chained
    let err = parse_source(&table, "1 === 2 =~ 3", ParseOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnexpectedToken {
            kind: TokenKind::EqualTilde,
            ..
        }
    ));
}

#[test]
fn test_only_line_ends() {
    let main = parse(vec![
        tok(TokenKind::LineEnd, "\n", 1),
        tok(TokenKind::LineEnd, "\n", 2),
        tok(TokenKind::LineEnd, ";", 3),
        tok(TokenKind::Eof, "", 4),
    ])
    .unwrap();
    assert_eq!(main, Main::new(Block::new(Vec::new())));

    let empty = parse(vec![tok(TokenKind::Eof, "", 1)]).unwrap();
    assert!(empty.body.is_empty());
}

#[test]
fn test_statement_order_and_separators() {
    let table = table();
    let main = parse_source(&table, "\n\n1\n\n2; 3;\n4\n\n", ParseOptions::default()).unwrap();

    let values: Vec<Expr> = main.body.statements.into_iter().map(|s| s.expr).collect();
    assert_eq!(
        values,
        vec![Expr::int(1), Expr::int(2), Expr::int(3), Expr::int(4)]
    );
}

#[test]
fn test_operator_line_numbers() {
    let main = parse(vec![
        tok(TokenKind::Number, "1", 1),
        tok(TokenKind::Plus, "+", 2),
        tok(TokenKind::Number, "2", 3),
        tok(TokenKind::ExclamationTilde, "!~", 4),
        tok(TokenKind::Number, "3", 5),
        tok(TokenKind::Eof, "", 5),
    ])
    .unwrap();

    let Expr::BinOp { line, right, .. } = &main.body.statements[0].expr else {
        panic!("Expected binary operation");
    };
    assert_eq!(*line, 2);
    let Expr::Not(inner) = &**right else {
        panic!("Expected negated match");
    };
    assert!(matches!(&**inner, Expr::BinOp { op: Operator::Match, line: 4, .. }));
}

#[test]
fn test_missing_eof() {
    let err = parse(vec![
        tok(TokenKind::Number, "1", 1),
        tok(TokenKind::Plus, "+", 1),
        tok(TokenKind::Number, "2", 3),
    ])
    .unwrap_err();

    assert_eq!(err, ParseError::UnexpectedEndOfStream { line: 3 });
    assert!(err.is_syntax_error());

    let err = parse(Vec::new()).unwrap_err();
    assert_eq!(err, ParseError::UnexpectedEndOfStream { line: 1 });
}

#[test]
fn test_premature_eof() {
    let err = parse(vec![
        tok(TokenKind::Number, "1", 1),
        tok(TokenKind::Plus, "+", 1),
        tok(TokenKind::Eof, "", 2),
    ])
    .unwrap_err();

    assert_eq!(
        err,
        ParseError::UnexpectedToken {
            kind: TokenKind::Eof,
            text: String::new(),
            line: 2,
        }
    );
}

#[test]
fn test_adjacent_numbers() {
    let table = table();
    let err = parse_source(&table, "1 2", ParseOptions::default()).unwrap_err();

    assert_eq!(err.line(), Some(1));
    assert_eq!(
        err.to_string(),
        "syntax error at line 1: unexpected NUMBER \"2\""
    );
}

#[test]
fn test_two_decimal_points() {
    let err = parse(vec![
        tok(TokenKind::Number, "1", 1),
        tok(TokenKind::LineEnd, "\n", 1),
        tok(TokenKind::Number, "1.2.3", 2),
        tok(TokenKind::Eof, "", 2),
    ])
    .unwrap_err();

    assert!(matches!(
        err,
        ParseError::NumberFormat { ref text, line: 2, .. } if text == "1.2.3"
    ));
    assert!(!err.is_syntax_error());
}

#[test]
fn test_radix_detection_option() {
    let table = table();
    let tokens = || {
        vec![
            tok(TokenKind::Number, "0XE", 1),
            tok(TokenKind::Eof, "", 1),
        ]
    };

    let err = parse_tokens(&table, tokens(), ParseOptions::default()).unwrap_err();
    assert!(matches!(err, ParseError::NumberFormat { .. }));

    let prefix = ParseOptions::default().with_radix_detection(RadixDetection::Prefix);
    let main = parse_tokens(&table, tokens(), prefix).unwrap();
    assert_eq!(main.body.statements[0].expr, Expr::int(14));
}

fn plus_chain(operators: usize) -> String {
    vec!["1"; operators + 1].join(" + ")
}

#[test]
fn test_long_chain_within_depth_limit() {
    let table = table();
    let options = ParseOptions::default().with_max_depth(150_000);
    let main = parse_source(&table, &plus_chain(100_000), options).unwrap();

    // the tree nests 100k levels; only look at its top and let it drop
    assert_eq!(main.body.statements.len(), 1);
    assert!(matches!(
        main.body.statements[0].expr,
        Expr::BinOp { op: Operator::Plus, line: 1, .. }
    ));
    drop(main);
}

#[test]
fn test_chain_deeper_than_limit() {
    let table = table();

    let result = parse_source(&table, &plus_chain(100_000), ParseOptions::default());
    assert!(matches!(
        result,
        Err(ParseError::TooDeep { line: 1, limit: DEFAULT_MAX_DEPTH })
    ));

    let at_limit = parse_source(&table, &plus_chain(DEFAULT_MAX_DEPTH), ParseOptions::default());
    assert!(at_limit.is_ok());

    // a negated match counts two levels
    let options = ParseOptions::default().with_max_depth(3);
    assert!(parse_source(&table, "1 + 2 !~ 3", options).is_ok());
    let err = parse_source(&table, "1 !~ 2 !~ 3", options).unwrap_err();
    assert_eq!(err, ParseError::TooDeep { line: 1, limit: 3 });
    assert!(!err.is_syntax_error());
}

#[test]
fn test_lex_errors_surface() {
    let table = table();
    let err = parse_source(&table, "1 +\n2 * 3", ParseOptions::default()).unwrap_err();

    assert!(matches!(err, ParseError::Lex(_)));
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_idempotent() {
    let table = table();
    let source = "1 + 0b11 / 0o7\n2.5E3 !~ 4 === 0xff\n\n6 % 7";

    let first = parse_source(&table, source, ParseOptions::default()).unwrap();
    let second = parse_source(&table, source, ParseOptions::default()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.body.statements.len(), 3);
}

#[test]
fn test_table_shared_between_threads() {
    let table = table();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let table = &table;
                scope.spawn(move || {
                    let source = format!("{} + {}", i, i);
                    parse_source(table, &source, ParseOptions::default()).unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let main = handle.join().unwrap();
            assert_eq!(
                main.body.statements[0].expr,
                Expr::binop(Operator::Plus, Expr::int(i as i64), Expr::int(i as i64), 1)
            );
        }
    });
}
